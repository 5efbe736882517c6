//! Structured patch → triangle mesh.
//!
//! Nodes are welded first: a collapsed row becomes a single pole node and,
//! on a lattice closed in `j`, column `nj` reuses the nodes of column 1.
//! Each quad is then split along one diagonal, chosen per surface kind, and
//! the whole surface is oriented to agree with the input normals.

use aerosurf_math::DVec3;
use aerosurf_mesh::normals::compute_vertex_normals;
use aerosurf_mesh::TriangleMesh;
use aerosurf_types::{AeroError, AeroResult, SurfaceId};
use serde::{Deserialize, Serialize};

use crate::analyzer::XSectionReport;
use crate::lattice::Lattice;
use crate::patch::StructuredPatch;

/// Topology family of a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SurfaceKind {
    /// Lifting surface: open sheet or airfoil wrapped around in `j`.
    Wing,
    /// Body of revolution style surface, usually with pole rows.
    Body,
    /// Already triangulated input.
    Cart3d,
}

/// Quad diagonal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Diagonal {
    /// `(i, j)`–`(i+1, j+1)`
    A,
    /// `(i+1, j)`–`(i, j+1)`
    B,
}

/// Output of triangulating a structured patch.
#[derive(Debug, Clone)]
pub struct Triangulation {
    pub mesh: TriangleMesh,
    /// Mesh node of every geometric lattice point.
    pub lattice_to_node: Lattice<u32>,
    /// Triangles dropped for having (near) zero area.
    pub collapsed_panels: usize,
    /// Lattice closed in `j`.
    pub wrapped: bool,
    /// Every triangle was reversed to match the input normals.
    pub flipped: bool,
}

/// Triangulates a wing patch, choosing the convex diagonal of each quad.
pub fn create_wing_tri_mesh(
    patch: &StructuredPatch,
    sections: &XSectionReport,
    tol: f64,
    surface: SurfaceId,
) -> AeroResult<Triangulation> {
    triangulate(patch, sections, tol, surface, SurfaceKind::Wing)
}

/// Triangulates a body patch, welding collapsed nose/tail rows into poles.
pub fn create_body_tri_mesh(
    patch: &StructuredPatch,
    sections: &XSectionReport,
    tol: f64,
    surface: SurfaceId,
) -> AeroResult<Triangulation> {
    triangulate(patch, sections, tol, surface, SurfaceKind::Body)
}

fn triangulate(
    patch: &StructuredPatch,
    sections: &XSectionReport,
    tol: f64,
    surface: SurfaceId,
    kind: SurfaceKind,
) -> AeroResult<Triangulation> {
    let (ni, nj) = (patch.surface_num_i(), patch.surface_num_j());
    if ni < 2 || nj < 2 {
        return Err(AeroError::Geometry(format!(
            "structured patch must be at least 2 × 2, got {ni} × {nj}"
        )));
    }
    let wrapped = patch.is_wrapped(tol);
    let (mut mesh, lattice_to_node) = weld_nodes(patch, sections, wrapped);
    let min_area = tol * tol;

    // Corner input normal of each node, for orientation checks
    let input_normal = |n: u32| mesh.normal_vec3(n as usize);

    let mut triangles: Vec<[u32; 3]> = Vec::with_capacity(2 * (ni - 1) * (nj - 1));
    let mut collapsed = 0usize;
    for i in 1..ni {
        for j in 1..nj {
            let n00 = *lattice_to_node.get(i, j);
            let n10 = *lattice_to_node.get(i + 1, j);
            let n11 = *lattice_to_node.get(i + 1, j + 1);
            let n01 = *lattice_to_node.get(i, j + 1);

            // Cyclic corner order matching the diagonal splits below
            let mut ring = vec![n00, n01, n11, n10];
            ring.dedup();
            if ring.len() > 1 && ring.first() == ring.last() {
                ring.pop();
            }

            let candidates: Vec<[u32; 3]> = match ring.len() {
                4 => {
                    let quad = Quad::new(&mesh, [n00, n10, n11, n01]);
                    let diagonal = match kind {
                        SurfaceKind::Body => quad.body_diagonal(min_area),
                        _ => quad.wing_diagonal(min_area, tol, &input_normal),
                    };
                    quad.split(diagonal).to_vec()
                }
                3 => vec![[ring[0], ring[1], ring[2]]],
                _ => Vec::new(),
            };

            for tri in candidates {
                if triangle_area(&mesh, tri) < min_area {
                    collapsed += 1;
                } else {
                    triangles.push(tri);
                }
            }
        }
    }

    if triangles.is_empty() {
        return Err(AeroError::Geometry(
            "triangulation produced no triangles".into(),
        ));
    }

    let flipped = orient(&mesh, &mut triangles)?;
    for tri in triangles {
        mesh.push_triangle(tri, surface);
    }
    compute_vertex_normals(&mut mesh);
    mesh.validate()?;

    tracing::info!(
        nodes = mesh.vertex_count(),
        triangles = mesh.triangle_count(),
        collapsed,
        wrapped,
        ?kind,
        "triangulated"
    );

    Ok(Triangulation {
        mesh,
        lattice_to_node,
        collapsed_panels: collapsed,
        wrapped,
        flipped,
    })
}

/// Creates mesh nodes for the lattice, welding poles and the wrap seam.
fn weld_nodes(
    patch: &StructuredPatch,
    sections: &XSectionReport,
    wrapped: bool,
) -> (TriangleMesh, Lattice<u32>) {
    let (ni, nj) = (patch.surface_num_i(), patch.surface_num_j());
    let mut mesh = TriangleMesh::with_capacity(ni * nj, 2 * (ni - 1) * (nj - 1));
    let mut map: Lattice<u32> = Lattice::new(ni, nj);

    for i in 1..=ni {
        if sections.is_degenerate(i) {
            let normal = (1..=nj)
                .map(|j| *patch.normal.get(i, j))
                .sum::<DVec3>()
                .normalize_or_zero();
            let normal = if normal == DVec3::ZERO {
                *patch.normal.get(i, 1)
            } else {
                normal
            };
            let node = mesh.push_node(
                patch.point(i, 1),
                normal,
                *patch.u.get(i, 1),
                *patch.v.get(i, 1),
            );
            for j in 1..=nj {
                map.set(i, j, node);
            }
            continue;
        }
        for j in 1..=nj {
            let node = if wrapped && j == nj {
                *map.get(i, 1)
            } else {
                mesh.push_node(
                    patch.point(i, j),
                    *patch.normal.get(i, j),
                    *patch.u.get(i, j),
                    *patch.v.get(i, j),
                )
            };
            map.set(i, j, node);
        }
    }
    (mesh, map)
}

fn triangle_area(mesh: &TriangleMesh, [a, b, c]: [u32; 3]) -> f64 {
    let pa = mesh.position_vec3(a as usize);
    0.5 * (mesh.position_vec3(b as usize) - pa)
        .cross(mesh.position_vec3(c as usize) - pa)
        .length()
}

fn triangle_cross(mesh: &TriangleMesh, [a, b, c]: [u32; 3]) -> DVec3 {
    let pa = mesh.position_vec3(a as usize);
    (mesh.position_vec3(b as usize) - pa).cross(mesh.position_vec3(c as usize) - pa)
}

/// A quad with four distinct nodes, corners `[n00, n10, n11, n01]`.
struct Quad {
    nodes: [u32; 4],
    points: [DVec3; 4],
}

impl Quad {
    fn new(mesh: &TriangleMesh, nodes: [u32; 4]) -> Self {
        Self {
            nodes,
            points: nodes.map(|n| mesh.position_vec3(n as usize)),
        }
    }

    fn split(&self, diagonal: Diagonal) -> [[u32; 3]; 2] {
        let [n00, n10, n11, n01] = self.nodes;
        match diagonal {
            Diagonal::A => [[n00, n11, n10], [n00, n01, n11]],
            Diagonal::B => [[n00, n01, n10], [n10, n01, n11]],
        }
    }

    fn crosses(&self, diagonal: Diagonal) -> [DVec3; 2] {
        let [p00, p10, p11, p01] = self.points;
        match diagonal {
            Diagonal::A => [(p11 - p00).cross(p10 - p00), (p01 - p00).cross(p11 - p00)],
            Diagonal::B => [(p01 - p00).cross(p10 - p00), (p01 - p10).cross(p11 - p10)],
        }
    }

    /// Both triangles have area and their normals agree.
    fn is_valid(&self, diagonal: Diagonal, min_area: f64) -> bool {
        let [c1, c2] = self.crosses(diagonal);
        0.5 * c1.length() >= min_area && 0.5 * c2.length() >= min_area && c1.dot(c2) > 0.0
    }

    /// Height of the off-plane corner above the first triangle, measured
    /// along the outward side given by `outward`.
    fn fold(&self, diagonal: Diagonal, outward: DVec3) -> f64 {
        let [p00, p10, p11, p01] = self.points;
        let [c1, _] = self.crosses(diagonal);
        let n = c1.normalize_or_zero();
        let n = if n.dot(outward) < 0.0 { -n } else { n };
        match diagonal {
            Diagonal::A => (p01 - p00).dot(n),
            Diagonal::B => (p11 - p10).dot(n),
        }
    }

    fn outward(&self, input_normal: &impl Fn(u32) -> DVec3) -> DVec3 {
        self.nodes.iter().map(|&n| input_normal(n)).sum()
    }

    fn wing_diagonal(&self, min_area: f64, tol: f64, input_normal: &impl Fn(u32) -> DVec3) -> Diagonal {
        let outward = self.outward(input_normal);
        let valid_a = self.is_valid(Diagonal::A, min_area);
        let valid_b = self.is_valid(Diagonal::B, min_area);

        // Planar quads keep the fixed diagonal
        if valid_a && self.fold(Diagonal::A, outward).abs() <= tol {
            return Diagonal::A;
        }
        let convex = |d: Diagonal| self.fold(d, outward) <= tol;
        match (valid_a, valid_b) {
            (true, _) if convex(Diagonal::A) => Diagonal::A,
            (_, true) if convex(Diagonal::B) => Diagonal::B,
            (true, _) => Diagonal::A,
            (false, true) => Diagonal::B,
            (false, false) => Diagonal::A,
        }
    }

    fn body_diagonal(&self, min_area: f64) -> Diagonal {
        if !self.is_valid(Diagonal::A, min_area) && self.is_valid(Diagonal::B, min_area) {
            Diagonal::B
        } else {
            Diagonal::A
        }
    }
}

/// Orients every triangle to agree with the summed input normals of its
/// corners. Returns whether the surface was flipped.
fn orient(mesh: &TriangleMesh, triangles: &mut [[u32; 3]]) -> AeroResult<bool> {
    let agreement = |tri: [u32; 3]| {
        let reference: DVec3 = tri.iter().map(|&n| mesh.normal_vec3(n as usize)).sum();
        triangle_cross(mesh, tri).dot(reference)
    };

    let disagree = triangles.iter().filter(|&&t| agreement(t) < 0.0).count();
    let agree = triangles.iter().filter(|&&t| agreement(t) > 0.0).count();
    let flipped = disagree > agree;
    if flipped {
        for tri in triangles.iter_mut() {
            tri.swap(1, 2);
        }
    }

    if let Some(bad) = triangles.iter().position(|&t| agreement(t) < 0.0) {
        return Err(AeroError::Mesh(format!(
            "triangle {bad} is wound against the surface normals"
        )));
    }
    Ok(flipped)
}
