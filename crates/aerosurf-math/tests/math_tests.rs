//! Integration tests for aerosurf-math.

use aerosurf_math::interp::{bilinear_weights, locate_interval};
use aerosurf_math::{CsrGraph, DQuat, DVec3, RigidTransform};

// ─── CsrGraph Tests ───────────────────────────────────────────

#[test]
fn graph_from_edges_is_symmetric() {
    let g = CsrGraph::from_edges(4, &[(0, 1), (1, 2), (2, 3)]);
    assert_eq!(g.neighbors(0), &[1]);
    assert_eq!(g.neighbors(1), &[0, 2]);
    assert_eq!(g.neighbors(3), &[2]);
    assert_eq!(g.nnz(), 6);
}

#[test]
fn graph_drops_duplicates_and_self_loops() {
    let g = CsrGraph::from_edges(3, &[(0, 1), (1, 0), (0, 1), (2, 2)]);
    assert_eq!(g.degree(0), 1);
    assert_eq!(g.degree(1), 1);
    assert_eq!(g.degree(2), 0);
}

#[test]
fn graph_bandwidth() {
    let g = CsrGraph::from_edges(5, &[(0, 4), (1, 2)]);
    assert_eq!(g.bandwidth(), 4);
    // Renumber 4 → 1 and 1 → 4: edges become (0,1) and (4,2)
    let relabel = |v: usize| match v {
        1 => 4,
        4 => 1,
        other => other,
    };
    assert_eq!(g.bandwidth_with(relabel), 2);
}

#[test]
fn empty_graph() {
    let g = CsrGraph::new(3);
    assert_eq!(g.bandwidth(), 0);
    assert_eq!(g.neighbors(2).len(), 0);
}

// ─── Interpolation Tests ──────────────────────────────────────

#[test]
fn locate_inside_ascending() {
    let axis = [0.0, 0.25, 0.5, 1.0];
    let (k, t) = locate_interval(&axis, 0.75);
    assert_eq!(k, 2);
    assert!((t - 0.5).abs() < 1e-12);
}

#[test]
fn locate_on_sample() {
    let axis = [0.0, 1.0, 2.0];
    let (k, t) = locate_interval(&axis, 1.0);
    // Either side of the shared sample is acceptable, but the point must match.
    let x = axis[k] + t * (axis[k + 1] - axis[k]);
    assert!((x - 1.0).abs() < 1e-12);
}

#[test]
fn locate_clamps_outside() {
    let axis = [0.0, 1.0, 2.0];
    assert_eq!(locate_interval(&axis, -5.0), (0, 0.0));
    let (k, t) = locate_interval(&axis, 9.0);
    assert_eq!(k, 1);
    assert!((t - 1.0).abs() < 1e-12);
}

#[test]
fn locate_descending_axis() {
    let axis = [1.0, 0.5, 0.0];
    let (k, t) = locate_interval(&axis, 0.25);
    assert_eq!(k, 1);
    assert!((t - 0.5).abs() < 1e-12);
}

#[test]
fn bilinear_partition_of_unity() {
    for &(s, t) in &[(0.0, 0.0), (0.3, 0.7), (1.0, 0.5), (0.5, 1.0)] {
        let w = bilinear_weights(s, t);
        let sum: f64 = w.iter().sum();
        assert!((sum - 1.0).abs() < 1e-12);
    }
    assert_eq!(bilinear_weights(1.0, 1.0), [0.0, 0.0, 1.0, 0.0]);
}

// ─── RigidTransform Tests ─────────────────────────────────────

#[test]
fn identity_leaves_points() {
    let p = DVec3::new(1.0, -2.0, 3.0);
    assert_eq!(RigidTransform::IDENTITY.apply_point(p), p);
}

#[test]
fn rotation_about_origin_point() {
    let origin = DVec3::new(1.0, 0.0, 0.0);
    let t = RigidTransform::from_rotation(
        DVec3::ZERO,
        origin,
        DQuat::from_rotation_z(std::f64::consts::FRAC_PI_2),
    );
    let p = t.apply_point(DVec3::new(2.0, 0.0, 0.0));
    assert!((p - DVec3::new(1.0, 1.0, 0.0)).length() < 1e-12);
    // The origin itself is a fixed point.
    assert!((t.apply_point(origin) - origin).length() < 1e-12);
}

#[test]
fn vectors_ignore_translation() {
    let t = RigidTransform::translation(DVec3::new(10.0, 0.0, 0.0));
    assert_eq!(t.apply_vector(DVec3::Z), DVec3::Z);
    assert_eq!(t.apply_point(DVec3::Z), DVec3::new(10.0, 0.0, 1.0));
}

#[test]
fn rotation_about_y_matches_glam() {
    let t = RigidTransform::rotation_about_y(0.3, DVec3::ZERO);
    let v = DVec3::new(1.0, 2.0, 3.0);
    let expected = DQuat::from_rotation_y(0.3) * v;
    assert!((t.apply_vector(v) - expected).length() < 1e-12);
}

#[test]
fn transform_is_serializable() {
    let t = RigidTransform::rotation_about_y(0.1, DVec3::X);
    let json = serde_json::to_string(&t).unwrap();
    let back: RigidTransform = serde_json::from_str(&json).unwrap();
    assert!((back.apply_point(DVec3::Y) - t.apply_point(DVec3::Y)).length() < 1e-12);
}
