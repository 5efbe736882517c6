//! Core triangle mesh type with SoA (Structure of Arrays) layout.
//!
//! The SoA layout stores each coordinate channel contiguously:
//! - `pos_x: [x0, x1, x2, ...]`
//! - `pos_y: [y0, y1, y2, ...]`
//! - `pos_z: [z0, z1, z2, ...]`
//!
//! Influence-coefficient loops in the flow solver sweep all nodes per
//! channel, so contiguous channels plus a bandwidth-reduced node order keep
//! those sweeps cache friendly.

use aerosurf_math::DVec3;
use aerosurf_types::{AeroError, AeroResult, SurfaceId};
use serde::{Deserialize, Serialize};

/// A triangle mesh stored in Structure-of-Arrays layout.
///
/// All position, normal, and parameter data is stored in separate
/// per-channel contiguous arrays. Triangle indices reference into these
/// arrays.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TriangleMesh {
    // --- Node data (SoA) ---
    /// X coordinates of all nodes.
    pub pos_x: Vec<f64>,
    /// Y coordinates of all nodes.
    pub pos_y: Vec<f64>,
    /// Z coordinates of all nodes.
    pub pos_z: Vec<f64>,

    /// X components of node normals.
    pub normal_x: Vec<f64>,
    /// Y components of node normals.
    pub normal_y: Vec<f64>,
    /// Z components of node normals.
    pub normal_z: Vec<f64>,

    /// Surface parameter `u` of each node.
    pub uv_u: Vec<f64>,
    /// Surface parameter `v` of each node.
    pub uv_v: Vec<f64>,

    // --- Triangle data ---
    /// Triangle indices, each triangle is [n0, n1, n2].
    /// Stored flat: `[t0n0, t0n1, t0n2, t1n0, t1n1, t1n2, ...]`
    pub indices: Vec<u32>,

    /// Per-triangle owning surface.
    pub surface_ids: Vec<SurfaceId>,
}

impl TriangleMesh {
    /// Returns the number of nodes.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.pos_x.len()
    }

    /// Returns the number of triangles.
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Returns the position of node `i` as `[x, y, z]`.
    #[inline]
    pub fn position(&self, i: usize) -> [f64; 3] {
        [self.pos_x[i], self.pos_y[i], self.pos_z[i]]
    }

    /// Returns the position as a `DVec3`.
    #[inline]
    pub fn position_vec3(&self, i: usize) -> DVec3 {
        DVec3::new(self.pos_x[i], self.pos_y[i], self.pos_z[i])
    }

    /// Returns the normal of node `i` as a `DVec3`.
    #[inline]
    pub fn normal_vec3(&self, i: usize) -> DVec3 {
        DVec3::new(self.normal_x[i], self.normal_y[i], self.normal_z[i])
    }

    /// Returns the three node indices of triangle `t`.
    #[inline]
    pub fn triangle(&self, t: usize) -> [u32; 3] {
        let base = t * 3;
        [self.indices[base], self.indices[base + 1], self.indices[base + 2]]
    }

    /// Sets the position of node `i`.
    #[inline]
    pub fn set_position(&mut self, i: usize, p: DVec3) {
        self.pos_x[i] = p.x;
        self.pos_y[i] = p.y;
        self.pos_z[i] = p.z;
    }

    /// Sets the normal of node `i`.
    #[inline]
    pub fn set_normal(&mut self, i: usize, n: DVec3) {
        self.normal_x[i] = n.x;
        self.normal_y[i] = n.y;
        self.normal_z[i] = n.z;
    }

    /// Appends a node and returns its index.
    pub fn push_node(&mut self, p: DVec3, n: DVec3, u: f64, v: f64) -> u32 {
        let id = self.pos_x.len() as u32;
        self.pos_x.push(p.x);
        self.pos_y.push(p.y);
        self.pos_z.push(p.z);
        self.normal_x.push(n.x);
        self.normal_y.push(n.y);
        self.normal_z.push(n.z);
        self.uv_u.push(u);
        self.uv_v.push(v);
        id
    }

    /// Appends a triangle.
    pub fn push_triangle(&mut self, tri: [u32; 3], surface: SurfaceId) {
        self.indices.extend_from_slice(&tri);
        self.surface_ids.push(surface);
    }

    /// Area-scaled normal `(b − a) × (c − a)` of triangle `t` (length = 2 × area).
    #[inline]
    pub fn triangle_cross(&self, t: usize) -> DVec3 {
        let [a, b, c] = self.triangle(t);
        let pa = self.position_vec3(a as usize);
        let pb = self.position_vec3(b as usize);
        let pc = self.position_vec3(c as usize);
        (pb - pa).cross(pc - pa)
    }

    /// Area of triangle `t`.
    #[inline]
    pub fn triangle_area(&self, t: usize) -> f64 {
        0.5 * self.triangle_cross(t).length()
    }

    /// Unit normal of triangle `t` (zero for a degenerate triangle).
    #[inline]
    pub fn triangle_normal(&self, t: usize) -> DVec3 {
        self.triangle_cross(t).normalize_or_zero()
    }

    /// Centroid of triangle `t`.
    #[inline]
    pub fn triangle_centroid(&self, t: usize) -> DVec3 {
        let [a, b, c] = self.triangle(t);
        (self.position_vec3(a as usize)
            + self.position_vec3(b as usize)
            + self.position_vec3(c as usize))
            / 3.0
    }

    /// Total triangle area (wetted area of the surface).
    pub fn total_area(&self) -> f64 {
        (0..self.triangle_count()).map(|t| self.triangle_area(t)).sum()
    }

    /// Axis-aligned bounding box `(min, max)`; `None` for an empty mesh.
    pub fn bounding_box(&self) -> Option<(DVec3, DVec3)> {
        if self.vertex_count() == 0 {
            return None;
        }
        let mut lo = DVec3::splat(f64::INFINITY);
        let mut hi = DVec3::splat(f64::NEG_INFINITY);
        for i in 0..self.vertex_count() {
            let p = self.position_vec3(i);
            lo = lo.min(p);
            hi = hi.max(p);
        }
        Some((lo, hi))
    }

    /// Creates an empty mesh with pre-allocated capacity.
    pub fn with_capacity(vertex_capacity: usize, triangle_capacity: usize) -> Self {
        Self {
            pos_x: Vec::with_capacity(vertex_capacity),
            pos_y: Vec::with_capacity(vertex_capacity),
            pos_z: Vec::with_capacity(vertex_capacity),
            normal_x: Vec::with_capacity(vertex_capacity),
            normal_y: Vec::with_capacity(vertex_capacity),
            normal_z: Vec::with_capacity(vertex_capacity),
            uv_u: Vec::with_capacity(vertex_capacity),
            uv_v: Vec::with_capacity(vertex_capacity),
            indices: Vec::with_capacity(triangle_capacity * 3),
            surface_ids: Vec::with_capacity(triangle_capacity),
        }
    }

    /// Validates mesh integrity.
    ///
    /// Checks:
    /// - All SoA arrays have the same length
    /// - Triangle indices are within bounds
    /// - No degenerate triangles (repeated node indices)
    /// - All coordinates are finite
    pub fn validate(&self) -> AeroResult<()> {
        let n = self.pos_x.len();

        // Check SoA consistency
        if self.pos_y.len() != n || self.pos_z.len() != n {
            return Err(AeroError::Mesh(
                "Position arrays have inconsistent lengths".into(),
            ));
        }
        if self.normal_x.len() != n || self.normal_y.len() != n || self.normal_z.len() != n {
            return Err(AeroError::Mesh(
                "Normal arrays have inconsistent lengths".into(),
            ));
        }
        if self.uv_u.len() != n || self.uv_v.len() != n {
            return Err(AeroError::Mesh("UV arrays have inconsistent lengths".into()));
        }

        // Check indices
        if self.indices.len() % 3 != 0 {
            return Err(AeroError::Mesh("Index count is not divisible by 3".into()));
        }

        let tri_count = self.triangle_count();
        if self.surface_ids.len() != tri_count {
            return Err(AeroError::Mesh(format!(
                "Surface IDs count ({}) != triangle count ({})",
                self.surface_ids.len(),
                tri_count
            )));
        }

        for (i, &idx) in self.indices.iter().enumerate() {
            if idx as usize >= n {
                return Err(AeroError::Mesh(format!(
                    "Index {} at position {} is out of range (node count: {})",
                    idx, i, n
                )));
            }
        }

        // Check for degenerate triangles
        for t in 0..tri_count {
            let [a, b, c] = self.triangle(t);
            if a == b || b == c || a == c {
                return Err(AeroError::Mesh(format!(
                    "Triangle {} has repeated node indices: [{}, {}, {}]",
                    t, a, b, c
                )));
            }
        }

        if (0..n).any(|i| !self.position_vec3(i).is_finite()) {
            return Err(AeroError::Mesh("Node coordinates must be finite".into()));
        }

        Ok(())
    }

    /// Constructs a mesh from interleaved AoS position data.
    ///
    /// Converts `[x0, y0, z0, x1, y1, z1, ...]` to SoA layout. This is the
    /// entry point for already-triangulated (Cart3D-style) components.
    pub fn from_interleaved(
        positions: &[f64],
        indices: &[u32],
        uvs: &[f64],
        surface: SurfaceId,
    ) -> AeroResult<Self> {
        if positions.len() % 3 != 0 {
            return Err(AeroError::Mesh(
                "Interleaved positions length not divisible by 3".into(),
            ));
        }

        let n = positions.len() / 3;
        let mut mesh = Self::with_capacity(n, indices.len() / 3);

        // Deinterleave positions
        for i in 0..n {
            mesh.pos_x.push(positions[i * 3]);
            mesh.pos_y.push(positions[i * 3 + 1]);
            mesh.pos_z.push(positions[i * 3 + 2]);
        }

        // Deinterleave UVs (or fill zeros)
        if uvs.len() == n * 2 {
            for i in 0..n {
                mesh.uv_u.push(uvs[i * 2]);
                mesh.uv_v.push(uvs[i * 2 + 1]);
            }
        } else {
            mesh.uv_u.resize(n, 0.0);
            mesh.uv_v.resize(n, 0.0);
        }

        // Initialize normals to zero (recompute later)
        mesh.normal_x.resize(n, 0.0);
        mesh.normal_y.resize(n, 0.0);
        mesh.normal_z.resize(n, 0.0);

        mesh.indices = indices.to_vec();
        mesh.surface_ids = vec![surface; indices.len() / 3];

        mesh.validate()?;
        Ok(mesh)
    }
}
