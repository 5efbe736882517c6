//! Geometry analysis of a structured patch and its triangulation.
//!
//! - Degenerate cross-sections (rows collapsed to a point: closed nose or tail)
//! - Degenerate span sections (columns collapsed along `i`: fatal)
//! - Sharp trailing edges and the Kutta nodes on them
//! - Local convexity of a node's triangle fan

use aerosurf_math::DVec3;
use aerosurf_mesh::{Topology, TriangleMesh};
use aerosurf_types::{AeroError, AeroResult, EdgeId, NodeId};
use serde::{Deserialize, Serialize};

use crate::patch::StructuredPatch;

/// Result of the cross-section scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct XSectionReport {
    /// Per row: every point coincides with the row's first point.
    pub degenerate_rows: Vec<bool>,
    /// Per row: number of neighbouring point pairs closer than the tolerance.
    pub coincident_points: Vec<u32>,
    pub nose_is_closed: bool,
    pub tail_is_closed: bool,
}

impl XSectionReport {
    pub fn degenerate_row_count(&self) -> usize {
        self.degenerate_rows.iter().filter(|&&d| d).count()
    }

    /// Row `i` (1-based) collapsed to a point.
    #[inline]
    pub fn is_degenerate(&self, i: usize) -> bool {
        self.degenerate_rows[i - 1]
    }
}

/// A node on a sharp trailing edge with its (up to two) trailing-edge edges,
/// ordered by their lowest adjacent triangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KuttaNode {
    pub node: NodeId,
    pub edge1: EdgeId,
    pub edge2: Option<EdgeId>,
}

fn check_size(patch: &StructuredPatch) -> AeroResult<()> {
    let (ni, nj) = (patch.surface_num_i(), patch.surface_num_j());
    if ni < 2 || nj < 2 {
        return Err(AeroError::Geometry(format!(
            "structured patch must be at least 2 × 2, got {ni} × {nj}"
        )));
    }
    Ok(())
}

/// Scans every row for collapsed or partly coincident cross-sections.
///
/// Fails if the patch is smaller than 2 × 2 or every row has collapsed.
pub fn check_for_degenerate_x_sections(
    patch: &StructuredPatch,
    tol: f64,
) -> AeroResult<XSectionReport> {
    check_size(patch)?;
    let (ni, nj) = (patch.surface_num_i(), patch.surface_num_j());

    let mut report = XSectionReport::default();
    for i in 1..=ni {
        let first = patch.point(i, 1);
        let degenerate = (2..=nj).all(|j| patch.point(i, j).distance(first) <= tol);
        let coincident = (1..nj)
            .filter(|&j| patch.point(i, j).distance(patch.point(i, j + 1)) <= tol)
            .count() as u32;
        report.degenerate_rows.push(degenerate);
        report.coincident_points.push(coincident);
    }
    report.nose_is_closed = report.degenerate_rows[0];
    report.tail_is_closed = report.degenerate_rows[ni - 1];

    if report.degenerate_row_count() == ni {
        return Err(AeroError::Geometry(
            "every cross-section is degenerate".into(),
        ));
    }
    tracing::debug!(
        degenerate = report.degenerate_row_count(),
        nose_closed = report.nose_is_closed,
        tail_closed = report.tail_is_closed,
        "cross-section scan"
    );
    Ok(report)
}

/// Fails if any column has collapsed to a single point along `i`.
pub fn check_for_degenerate_span_sections(patch: &StructuredPatch, tol: f64) -> AeroResult<()> {
    check_size(patch)?;
    let (ni, nj) = (patch.surface_num_i(), patch.surface_num_j());
    for j in 1..=nj {
        let first = patch.point(1, j);
        if (2..=ni).all(|i| patch.point(i, j).distance(first) <= tol) {
            return Err(AeroError::Geometry(format!(
                "span section {j} is degenerate"
            )));
        }
    }
    Ok(())
}

/// Angle in degrees between two face normals.
pub fn dihedral_angle(n1: DVec3, n2: DVec3) -> f64 {
    n1.normalize_or_zero()
        .dot(n2.normalize_or_zero())
        .clamp(-1.0, 1.0)
        .acos()
        .to_degrees()
}

/// Convexity of the triangle fan around `node`.
///
/// With `N` the area-weighted normal of the incident triangles, the node is
/// convex when `Σ area_t · N·(centroid_t − p) <= tol · Σ area_t`, i.e. the
/// area-weighted height of the fan above the node's tangent plane is at
/// most `tol`. A fan whose normals cancel (a zero-thickness fold) counts as
/// convex.
pub fn surface_at_node_is_convex(mesh: &TriangleMesh, topo: &Topology, node: u32, tol: f64) -> bool {
    let tris = topo.node_to_tri_list(node);
    let summed = tris
        .iter()
        .map(|&t| 0.5 * mesh.triangle_cross(t as usize))
        .sum::<DVec3>();
    let fan_area: f64 = tris.iter().map(|&t| mesh.triangle_area(t as usize)).sum();
    // A fan folded flat onto itself has no outward side
    if summed.length() <= 1e-9 * fan_area {
        return true;
    }
    let n = summed.normalize();
    let p = mesh.position_vec3(node as usize);
    let signed: f64 = tris
        .iter()
        .map(|&t| mesh.triangle_area(t as usize) * n.dot(mesh.triangle_centroid(t as usize) - p))
        .sum();
    signed <= tol * fan_area
}

/// Finds the Kutta nodes among `te_nodes`.
///
/// A trailing-edge edge joins two trailing-edge nodes; it is sharp when its
/// two triangles' normals differ by at least `angle_deg`. Open boundary
/// edges are never sharp.
pub fn find_sharp_edges(
    mesh: &TriangleMesh,
    topo: &Topology,
    te_nodes: &[u32],
    angle_deg: f64,
    tol: f64,
) -> Vec<KuttaNode> {
    let is_te = |n: u32| te_nodes.contains(&n);
    let mut kutta = Vec::new();

    for &node in te_nodes {
        // Trailing-edge edges at this node, keyed by lowest adjacent triangle
        let mut te_edges: Vec<(u32, u32, bool)> = Vec::new();
        for &t in topo.node_to_tri_list(node) {
            for &e in &topo.triangle_edges[t as usize] {
                let [a, b] = topo.edges[e as usize];
                if (a != node && b != node) || te_edges.iter().any(|&(_, id, _)| id == e) {
                    continue;
                }
                let other = if a == node { b } else { a };
                if !is_te(other) {
                    continue;
                }
                let tris = &topo.edge_triangles[e as usize];
                let sharp = tris.len() == 2
                    && dihedral_angle(
                        mesh.triangle_cross(tris[0] as usize),
                        mesh.triangle_cross(tris[1] as usize),
                    ) >= angle_deg;
                te_edges.push((tris[0], e, sharp));
            }
        }
        te_edges.sort_unstable();

        if !te_edges.iter().any(|&(_, _, sharp)| sharp)
            || !surface_at_node_is_convex(mesh, topo, node, tol)
        {
            continue;
        }
        kutta.push(KuttaNode {
            node: NodeId(node),
            edge1: EdgeId(te_edges[0].1),
            edge2: te_edges.get(1).map(|&(_, e, _)| EdgeId(e)),
        });
    }

    tracing::debug!(count = kutta.len(), "kutta nodes");
    kutta
}
