//! Node normal computation from triangle mesh data.
//!
//! Computes area-weighted node normals by accumulating
//! face normals from each adjacent triangle.

use aerosurf_math::DVec3;

use crate::mesh::TriangleMesh;

/// Recompute node normals from triangle geometry (area-weighted).
///
/// Each triangle's face normal (weighted by its area) is accumulated
/// at each node and the result normalized. Nodes whose contributions
/// cancel (a zero-thickness fold) keep a zero normal.
///
/// This modifies the mesh's `normal_x`, `normal_y`, `normal_z` arrays in place.
pub fn compute_vertex_normals(mesh: &mut TriangleMesh) {
    let n = mesh.vertex_count();
    let mut acc = vec![DVec3::ZERO; n];

    // Cross product magnitude = 2 × triangle area
    for t in 0..mesh.triangle_count() {
        let cross = mesh.triangle_cross(t);
        for node in mesh.triangle(t) {
            acc[node as usize] += cross;
        }
    }

    for (i, a) in acc.into_iter().enumerate() {
        let len = a.length();
        let unit = if len > 1e-14 { a / len } else { DVec3::ZERO };
        mesh.set_normal(i, unit);
    }
}

/// Per-triangle unit normals and areas, in triangle order.
pub fn triangle_normals_and_areas(mesh: &TriangleMesh) -> (Vec<DVec3>, Vec<f64>) {
    let tri_count = mesh.triangle_count();
    let mut normals = Vec::with_capacity(tri_count);
    let mut areas = Vec::with_capacity(tri_count);
    for t in 0..tri_count {
        let cross = mesh.triangle_cross(t);
        normals.push(cross.normalize_or_zero());
        areas.push(0.5 * cross.length());
    }
    (normals, areas)
}
