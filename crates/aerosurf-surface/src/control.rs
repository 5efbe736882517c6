//! Control surfaces.
//!
//! A control surface is a box in `(u, v)` parameter space plus a hinge
//! line given by two parametric endpoints. Locating the hinge finds the
//! nearest lattice nodes and the interpolated 3-D endpoints on the patch.

use aerosurf_math::{DVec2, DVec3, RigidTransform};
use serde::{Deserialize, Serialize};

use crate::patch::StructuredPatch;

/// Axis-aligned box in parameter space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UvBox {
    pub min: DVec2,
    pub max: DVec2,
}

impl UvBox {
    /// Box spanning two corners given in any order.
    pub fn new(a: DVec2, b: DVec2) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    #[inline]
    pub fn contains(&self, u: f64, v: f64) -> bool {
        (self.min.x..=self.max.x).contains(&u) && (self.min.y..=self.max.y).contains(&v)
    }
}

/// One control surface of a component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlSurface {
    pub name: String,
    pub region: UvBox,
    /// Parametric hinge endpoints.
    pub hinge_uv: [DVec2; 2],
    /// Hinge endpoints on the surface; set by [`ControlSurface::locate_hinge_line`].
    pub hinge_xyz: [DVec3; 2],
    /// Lattice nodes `(i, j)` nearest to the hinge endpoints.
    pub hinge_nodes: [(usize, usize); 2],
    /// Deflection angle in degrees.
    pub deflection_deg: f64,
}

impl ControlSurface {
    pub fn new(name: impl Into<String>, region: UvBox, hinge_uv: [DVec2; 2]) -> Self {
        Self {
            name: name.into(),
            region,
            hinge_uv,
            hinge_xyz: [DVec3::ZERO; 2],
            hinge_nodes: [(1, 1); 2],
            deflection_deg: 0.0,
        }
    }

    /// Finds the hinge on `patch`.
    pub fn locate_hinge_line(&mut self, patch: &StructuredPatch) {
        for (k, uv) in self.hinge_uv.iter().enumerate() {
            self.hinge_nodes[k] = nearest_lattice_node(patch, *uv);
            self.hinge_xyz[k] = patch.interpolate_xyz_from_uv(uv.x, uv.y);
        }
        tracing::debug!(
            name = %self.name,
            from = ?self.hinge_xyz[0],
            to = ?self.hinge_xyz[1],
            "hinge located"
        );
    }

    /// Unit hinge direction, zero if the endpoints coincide.
    pub fn hinge_axis(&self) -> DVec3 {
        (self.hinge_xyz[1] - self.hinge_xyz[0]).normalize_or_zero()
    }

    pub fn transform(&mut self, t: &RigidTransform) {
        for p in self.hinge_xyz.iter_mut() {
            *p = t.apply_point(*p);
        }
    }
}

/// Lattice node whose `(u, v)` is closest to `uv`.
fn nearest_lattice_node(patch: &StructuredPatch, uv: DVec2) -> (usize, usize) {
    let mut best = (1, 1);
    let mut best_d = f64::INFINITY;
    for (i, j) in patch.u.indices() {
        let d = DVec2::new(*patch.u.get(i, j), *patch.v.get(i, j)).distance_squared(uv);
        if d < best_d {
            best_d = d;
            best = (i, j);
        }
    }
    best
}
