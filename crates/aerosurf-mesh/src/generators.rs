//! Procedural mesh generators for tests and benchmarks.
//!
//! These generators produce deterministic, resolution-configurable meshes
//! with correct winding order and (u, v) parameters.

use aerosurf_math::DVec3;
use aerosurf_types::SurfaceId;

use crate::mesh::TriangleMesh;

/// Generates a flat rectangular quad grid in the XY plane, split into triangles.
///
/// The grid spans `[-width/2, width/2]` in X and `[-height/2, height/2]` in Y,
/// centered at the origin at Z=0, with normals along +Z.
///
/// # Arguments
/// - `cols`: Number of quads along X (node count = cols + 1).
/// - `rows`: Number of quads along Y (node count = rows + 1).
/// - `width`: Total extent in X.
/// - `height`: Total extent in Y.
///
/// # Example
/// ```
/// use aerosurf_mesh::generators::quad_grid;
/// let mesh = quad_grid(2, 2, 1.0, 1.0);
/// assert_eq!(mesh.vertex_count(), 9);  // 3×3 nodes
/// assert_eq!(mesh.triangle_count(), 8); // 2×2 quads × 2 tris each
/// ```
pub fn quad_grid(cols: usize, rows: usize, width: f64, height: f64) -> TriangleMesh {
    let verts_x = cols + 1;
    let verts_y = rows + 1;
    let mut mesh = TriangleMesh::with_capacity(verts_x * verts_y, cols * rows * 2);

    let half_w = width / 2.0;
    let half_h = height / 2.0;

    for j in 0..verts_y {
        for i in 0..verts_x {
            let u = i as f64 / cols as f64;
            let v = j as f64 / rows as f64;

            mesh.pos_x.push(-half_w + u * width);
            mesh.pos_y.push(-half_h + v * height);
            mesh.pos_z.push(0.0);

            mesh.normal_x.push(0.0);
            mesh.normal_y.push(0.0);
            mesh.normal_z.push(1.0);

            mesh.uv_u.push(u);
            mesh.uv_v.push(v);
        }
    }

    // Two triangles per quad, counter-clockwise seen from +Z
    for j in 0..rows {
        for i in 0..cols {
            let bot_left = (j * verts_x + i) as u32;
            let bot_right = bot_left + 1;
            let top_left = bot_left + verts_x as u32;
            let top_right = top_left + 1;

            mesh.push_triangle([bot_left, bot_right, top_right], SurfaceId(0));
            mesh.push_triangle([bot_left, top_right, top_left], SurfaceId(0));
        }
    }

    mesh
}

/// Generates a strip of `cells` quads folded along its centre line.
///
/// The strip runs along Y. The half with `x <= 0` lies in the Z=0 plane;
/// the other half is rotated by `fold_deg` about the Y axis. A fold of 0°
/// is a flat strip.
pub fn folded_strip(cells: usize, fold_deg: f64) -> TriangleMesh {
    let rows = cells + 1;
    let mut mesh = TriangleMesh::with_capacity(rows * 3, cells * 4);
    let (s, c) = fold_deg.to_radians().sin_cos();

    for j in 0..rows {
        let y = j as f64 / cells as f64;
        for (k, p) in [
            DVec3::new(-1.0, y, 0.0),
            DVec3::new(0.0, y, 0.0),
            DVec3::new(c, y, s),
        ]
        .into_iter()
        .enumerate()
        {
            mesh.push_node(p, DVec3::Z, k as f64 / 2.0, y);
        }
    }

    for j in 0..cells as u32 {
        let base = j * 3;
        let next = base + 3;
        for k in 0..2 {
            mesh.push_triangle([base + k, base + k + 1, next + k + 1], SurfaceId(0));
            mesh.push_triangle([base + k, next + k + 1, next + k], SurfaceId(0));
        }
    }

    mesh
}
