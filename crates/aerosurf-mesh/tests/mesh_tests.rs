//! Integration tests for aerosurf-mesh.

use aerosurf_math::DVec3;
use aerosurf_mesh::agglomerate::{agglomerate, partition, AgglomerationParams};
use aerosurf_mesh::generators::{folded_strip, quad_grid};
use aerosurf_mesh::grid::{GridHierarchy, GridLevel};
use aerosurf_mesh::normals::{compute_vertex_normals, triangle_normals_and_areas};
use aerosurf_mesh::reorder::{
    apply_to_mesh, node_graph, reorder_mesh, reverse_cuthill_mckee, Permutation,
};
use aerosurf_mesh::topology::Topology;
use aerosurf_mesh::TriangleMesh;
use aerosurf_types::SurfaceId;

// ─── TriangleMesh Tests ───────────────────────────────────────

fn make_single_triangle() -> TriangleMesh {
    TriangleMesh {
        pos_x: vec![0.0, 1.0, 0.0],
        pos_y: vec![0.0, 0.0, 1.0],
        pos_z: vec![0.0, 0.0, 0.0],
        normal_x: vec![0.0, 0.0, 0.0],
        normal_y: vec![0.0, 0.0, 0.0],
        normal_z: vec![1.0, 1.0, 1.0],
        uv_u: vec![0.0, 1.0, 0.0],
        uv_v: vec![0.0, 0.0, 1.0],
        indices: vec![0, 1, 2],
        surface_ids: vec![SurfaceId(0)],
    }
}

#[test]
fn basic_counts() {
    let mesh = make_single_triangle();
    assert_eq!(mesh.vertex_count(), 3);
    assert_eq!(mesh.triangle_count(), 1);
}

#[test]
fn triangle_geometry() {
    let mesh = make_single_triangle();
    assert!((mesh.triangle_area(0) - 0.5).abs() < 1e-14);
    assert!((mesh.triangle_normal(0) - DVec3::Z).length() < 1e-14);
    let c = mesh.triangle_centroid(0);
    assert!((c - DVec3::new(1.0 / 3.0, 1.0 / 3.0, 0.0)).length() < 1e-14);
}

#[test]
fn validate_ok() {
    assert!(make_single_triangle().validate().is_ok());
}

#[test]
fn validate_catches_inconsistent_lengths() {
    let mut mesh = make_single_triangle();
    mesh.pos_y.push(99.0);
    assert!(mesh.validate().is_err());
}

#[test]
fn validate_catches_oob_index() {
    let mut mesh = make_single_triangle();
    mesh.indices[2] = 99;
    assert!(mesh.validate().is_err());
}

#[test]
fn validate_catches_repeated_node() {
    let mut mesh = make_single_triangle();
    mesh.indices = vec![0, 0, 1];
    assert!(mesh.validate().is_err());
}

#[test]
fn validate_catches_non_finite() {
    let mut mesh = make_single_triangle();
    mesh.pos_x[1] = f64::NAN;
    assert!(mesh.validate().is_err());
}

#[test]
fn from_interleaved() {
    let positions = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
    let mesh = TriangleMesh::from_interleaved(&positions, &[0, 1, 2], &[], SurfaceId(3)).unwrap();
    assert_eq!(mesh.vertex_count(), 3);
    assert_eq!(mesh.position(1), [1.0, 0.0, 0.0]);
    assert_eq!(mesh.surface_ids, vec![SurfaceId(3)]);
    assert_eq!(mesh.uv_u, vec![0.0; 3]);
}

#[test]
fn from_interleaved_rejects_ragged_positions() {
    let result = TriangleMesh::from_interleaved(&[0.0, 1.0], &[], &[], SurfaceId(0));
    assert!(result.is_err());
}

#[test]
fn bounding_box_and_area() {
    let mesh = quad_grid(4, 2, 2.0, 1.0);
    let (lo, hi) = mesh.bounding_box().unwrap();
    assert!((lo - DVec3::new(-1.0, -0.5, 0.0)).length() < 1e-14);
    assert!((hi - DVec3::new(1.0, 0.5, 0.0)).length() < 1e-14);
    assert!((mesh.total_area() - 2.0).abs() < 1e-12);
    assert!(TriangleMesh::default().bounding_box().is_none());
}

// ─── Generator Tests ──────────────────────────────────────────

#[test]
fn quad_grid_counts() {
    let mesh = quad_grid(4, 1, 4.0, 1.0);
    assert_eq!(mesh.vertex_count(), 10);
    assert_eq!(mesh.triangle_count(), 8);
    assert!(mesh.validate().is_ok());
}

#[test]
fn quad_grid_winding_faces_plus_z() {
    let mesh = quad_grid(3, 3, 1.0, 1.0);
    for t in 0..mesh.triangle_count() {
        assert!(mesh.triangle_normal(t).z > 0.999);
    }
}

#[test]
fn folded_strip_flat_when_unfolded() {
    let mesh = folded_strip(3, 0.0);
    assert_eq!(mesh.triangle_count(), 12);
    for t in 0..mesh.triangle_count() {
        assert!((mesh.triangle_normal(t) - DVec3::Z).length() < 1e-12);
    }
}

// ─── Topology Tests ───────────────────────────────────────────

#[test]
fn topology_single_quad() {
    let mesh = quad_grid(1, 1, 1.0, 1.0);
    let topo = Topology::build(&mesh);
    assert_eq!(topo.edges.len(), 5);
    assert_eq!(topo.edge_triangles.iter().filter(|t| t.len() == 2).count(), 1);
    assert_eq!(topo.boundary_edge_count(), 4);
    assert!(!topo.is_closed());
}

#[test]
fn edge_numbering_follows_triangle_order() {
    // Triangles [0, 1, 3] and [0, 3, 2]
    let mesh = quad_grid(1, 1, 1.0, 1.0);
    let topo = Topology::build(&mesh);
    assert_eq!(topo.edges[0], [0, 1]);
    assert_eq!(topo.edges[1], [1, 3]);
    assert_eq!(topo.edges[2], [0, 3]);
    assert_eq!(topo.edge_index(3, 0), Some(2));
    assert_eq!(topo.edge_index(1, 2), None);
    assert_eq!(topo.triangle_edges[1], [2, 3, 4]);
    assert_eq!(topo.neighbor_across(0, 2), Some(1));
    assert_eq!(topo.neighbor_across(0, 0), None);
}

#[test]
fn node_to_triangle_adjacency() {
    let mesh = quad_grid(2, 2, 1.0, 1.0);
    let topo = Topology::build(&mesh);
    // Centre node touches six triangles
    assert_eq!(topo.number_of_tris_for_node(4), 6);
    let tris = topo.node_to_tri_list(4);
    assert!(tris.windows(2).all(|w| w[0] < w[1]));
}

// ─── Normal Tests ─────────────────────────────────────────────

#[test]
fn flat_grid_normals() {
    let mut mesh = quad_grid(3, 3, 1.0, 1.0);
    for i in 0..mesh.vertex_count() {
        mesh.set_normal(i, DVec3::ZERO);
    }
    compute_vertex_normals(&mut mesh);
    for i in 0..mesh.vertex_count() {
        assert!((mesh.normal_vec3(i) - DVec3::Z).length() < 1e-12);
    }
}

#[test]
fn triangle_areas_sum_to_total() {
    let mesh = quad_grid(5, 2, 3.0, 2.0);
    let (normals, areas) = triangle_normals_and_areas(&mesh);
    assert_eq!(normals.len(), mesh.triangle_count());
    assert!((areas.iter().sum::<f64>() - 6.0).abs() < 1e-12);
}

// ─── Reorder Tests ────────────────────────────────────────────

#[test]
fn permutation_from_order_checks_bijection() {
    let p = Permutation::from_new_to_old(vec![2, 0, 1]).unwrap();
    assert!(p.is_bijection());
    assert_eq!(p.old_to_new, vec![1, 2, 0]);
    assert!(Permutation::from_new_to_old(vec![0, 0, 1]).is_none());
    assert!(Permutation::from_new_to_old(vec![0, 3, 1]).is_none());
}

#[test]
fn permutation_inverse_round_trip() {
    let p = Permutation::from_new_to_old(vec![3, 1, 0, 2]).unwrap();
    let data = vec!['a', 'b', 'c', 'd'];
    let moved = p.apply(&data);
    assert_eq!(moved, vec!['d', 'b', 'a', 'c']);
    assert_eq!(p.inverse().apply(&moved), data);
    assert!(p.then(&p.inverse()).is_identity());
}

#[test]
fn rcm_is_bijection() {
    let mesh = quad_grid(7, 5, 1.0, 1.0);
    let perm = reverse_cuthill_mckee(&node_graph(&mesh));
    assert_eq!(perm.len(), mesh.vertex_count());
    assert!(perm.is_bijection());
}

#[test]
fn rcm_reduces_bandwidth_of_rectangular_strip() {
    // Row-major numbering of a 2 × 5 node strip has bandwidth 6
    let mut mesh = quad_grid(4, 1, 4.0, 1.0);
    let before = node_graph(&mesh).bandwidth();
    assert_eq!(before, 6);
    let (perm, report) = reorder_mesh(&mut mesh);
    assert!(report.applied);
    assert!(report.bandwidth_after < before);
    assert_eq!(node_graph(&mesh).bandwidth(), report.bandwidth_after);
    assert!(perm.is_bijection());
}

#[test]
fn rcm_never_widens_the_band() {
    for (cols, rows) in [(1, 1), (2, 9), (9, 2), (6, 6)] {
        let mut mesh = quad_grid(cols, rows, 1.0, 1.0);
        let before = node_graph(&mesh).bandwidth();
        let (_, report) = reorder_mesh(&mut mesh);
        assert!(report.bandwidth_after <= before);
        assert_eq!(node_graph(&mesh).bandwidth(), report.bandwidth_after);
    }
}

#[test]
fn rcm_handles_disconnected_components() {
    // Two separate triangles
    let positions = [
        0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, //
        5.0, 0.0, 0.0, 6.0, 0.0, 0.0, 5.0, 1.0, 0.0,
    ];
    let mesh =
        TriangleMesh::from_interleaved(&positions, &[0, 1, 2, 3, 4, 5], &[], SurfaceId(0)).unwrap();
    let perm = reverse_cuthill_mckee(&node_graph(&mesh));
    assert!(perm.is_bijection());
    assert_eq!(perm.len(), 6);
}

#[test]
fn reorder_preserves_triangle_geometry() {
    let mesh = quad_grid(6, 3, 2.0, 1.0);
    let mut reordered = mesh.clone();
    let perm = reverse_cuthill_mckee(&node_graph(&mesh));
    apply_to_mesh(&mut reordered, &perm);
    assert!(reordered.validate().is_ok());
    for t in 0..mesh.triangle_count() {
        assert!((mesh.triangle_centroid(t) - reordered.triangle_centroid(t)).length() < 1e-14);
        assert!((mesh.triangle_cross(t) - reordered.triangle_cross(t)).length() < 1e-14);
    }
    for old in 0..mesh.vertex_count() {
        let new = perm.map(old as u32) as usize;
        assert_eq!(mesh.position(old), reordered.position(new));
    }
}

// ─── Grid Tests ───────────────────────────────────────────────

#[test]
fn fine_level_mirrors_mesh() {
    let mesh = quad_grid(2, 2, 1.0, 1.0);
    let h = GridHierarchy::new(mesh, DVec3::X);
    let fine = h.fine_grid();
    assert_eq!(fine.number_of_loops(), 8);
    assert_eq!(fine.number_of_edges(), h.topology.edges.len());
    assert!(fine.fine_to_coarse.is_empty());
    assert!((fine.total_area() - 1.0).abs() < 1e-12);
    for (t, lp) in fine.loops.iter().enumerate() {
        assert_eq!(lp.triangles, vec![t as u32]);
    }
}

#[test]
fn grid_level_json_round_trip() {
    let h = GridHierarchy::new(quad_grid(2, 1, 2.0, 1.0), DVec3::X);
    let json = serde_json::to_string(h.fine_grid()).unwrap();
    let back: GridLevel = serde_json::from_str(&json).unwrap();
    assert_eq!(back.number_of_loops(), h.fine_grid().number_of_loops());
    assert_eq!(back.number_of_edges(), h.fine_grid().number_of_edges());
    assert!((back.total_area() - 2.0).abs() < 1e-12);

    let json = serde_json::to_string(&h.mesh).unwrap();
    let mesh: TriangleMesh = serde_json::from_str(&json).unwrap();
    assert_eq!(mesh.indices, h.mesh.indices);
    assert_eq!(mesh.uv_u, h.mesh.uv_u);
}

#[test]
fn upwind_follows_flow_direction() {
    let h = GridHierarchy::new(quad_grid(4, 3, 4.0, 3.0), DVec3::X);
    let fine = h.fine_grid();
    for edge in &fine.edges {
        match (edge.upwind, edge.downwind) {
            (Some(up), Some(down)) => {
                assert!(!edge.is_boundary());
                assert!(fine.loops[up as usize].centroid.x <= fine.loops[down as usize].centroid.x);
            }
            (Some(up), None) => {
                assert!(edge.is_boundary());
                assert!(edge.midpoint.x > fine.loops[up as usize].centroid.x);
            }
            (None, Some(down)) => {
                assert!(edge.is_boundary());
                assert!(edge.midpoint.x <= fine.loops[down as usize].centroid.x);
            }
            (None, None) => panic!("edge without classification"),
        }
    }
}

#[test]
fn trailing_boundary_edges_are_upwind_of_their_panel() {
    let h = GridHierarchy::new(quad_grid(2, 2, 2.0, 2.0), DVec3::X);
    let fine = h.fine_grid();
    let trailing: Vec<_> = fine
        .edges
        .iter()
        .filter(|e| e.is_boundary() && (e.midpoint.x - 1.0).abs() < 1e-12)
        .collect();
    assert_eq!(trailing.len(), 2);
    assert!(trailing.iter().all(|e| e.upwind == Some(e.left)));
}

#[test]
fn upwind_neighbor_query() {
    let h = GridHierarchy::new(quad_grid(2, 1, 2.0, 1.0), DVec3::X);
    let fine = h.fine_grid();
    let interior = fine
        .edges
        .iter()
        .position(|e| !e.is_boundary())
        .unwrap() as u32;
    let e = &fine.edges[interior as usize];
    let (up, down) = (e.upwind.unwrap(), e.downwind.unwrap());
    assert_eq!(fine.upwind_neighbor(down, interior), Some(up));
    assert_eq!(fine.upwind_neighbor(up, interior), None);
}

#[test]
fn partition_rejects_bad_map() {
    let h = GridHierarchy::new(quad_grid(2, 1, 2.0, 1.0), DVec3::X);
    let fine = h.fine_grid();
    let result = GridLevel::from_partition(fine, vec![0, 0, 1], 2, &h.mesh, &h.topology, DVec3::X);
    assert!(result.is_err());
}

// ─── Agglomeration Tests ──────────────────────────────────────

#[test]
fn rectangular_strip_agglomerates_to_pairs() {
    let mut h = GridHierarchy::new(quad_grid(4, 1, 4.0, 1.0), DVec3::X);
    let levels = agglomerate(&mut h, &AgglomerationParams::default());
    // 8 → 4; a further level would have only 2 panels
    assert_eq!(levels, 2);
    let coarse = h.grid(1);
    assert_eq!(coarse.number_of_loops(), 4);
    assert!(coarse.loops.iter().all(|l| l.triangles.len() == 2));
}

#[test]
fn every_fine_panel_maps_to_one_coarse_panel() {
    let mut h = GridHierarchy::new(quad_grid(8, 8, 1.0, 1.0), DVec3::X);
    agglomerate(&mut h, &AgglomerationParams::default());
    assert!(h.number_of_levels() >= 2);
    for k in 1..h.number_of_levels() {
        let (fine, coarse) = (&h.levels[k - 1], &h.levels[k]);
        assert_eq!(coarse.fine_to_coarse.len(), fine.number_of_loops());
        let mut counts = vec![0usize; coarse.number_of_loops()];
        for &c in &coarse.fine_to_coarse {
            counts[c as usize] += 1;
        }
        assert!(counts.iter().all(|&n| n >= 1));
        let mut all: Vec<u32> = coarse.loops.iter().flat_map(|l| l.triangles.clone()).collect();
        all.sort_unstable();
        assert_eq!(all, (0..128).collect::<Vec<u32>>());
    }
}

#[test]
fn agglomeration_conserves_area() {
    let mut h = GridHierarchy::new(quad_grid(8, 6, 2.0, 1.5), DVec3::X);
    agglomerate(&mut h, &AgglomerationParams::default());
    let fine_area = h.fine_grid().total_area();
    for level in &h.levels {
        assert!((level.total_area() - fine_area).abs() < 1e-12);
    }
}

#[test]
fn agglomeration_respects_level_cap() {
    let mut h = GridHierarchy::new(quad_grid(16, 16, 1.0, 1.0), DVec3::X);
    let params = AgglomerationParams {
        max_levels: 2,
        ..Default::default()
    };
    assert_eq!(agglomerate(&mut h, &params), 2);
}

#[test]
fn agglomeration_does_not_merge_across_a_fold() {
    // A 180° fold puts the two halves back to back
    let h = GridHierarchy::new(folded_strip(4, 180.0), DVec3::Y);
    let fine = h.fine_grid();
    let (map, _) = partition(fine, &AgglomerationParams::default());
    for (a, la) in fine.loops.iter().enumerate() {
        for (b, lb) in fine.loops.iter().enumerate() {
            if map[a] == map[b] {
                assert!(la.normal.dot(lb.normal) >= 0.5);
            }
        }
    }
}

#[test]
fn too_small_surface_stays_single_level() {
    let mut h = GridHierarchy::new(quad_grid(1, 1, 1.0, 1.0), DVec3::X);
    assert_eq!(agglomerate(&mut h, &AgglomerationParams::default()), 1);
    // Saturating access
    assert_eq!(h.grid(5).number_of_loops(), 2);
}

#[test]
fn coarse_geometry_follows_mesh_motion() {
    let mut h = GridHierarchy::new(quad_grid(4, 4, 1.0, 1.0), DVec3::X);
    agglomerate(&mut h, &AgglomerationParams::default());
    let shift = DVec3::new(0.0, 0.0, 2.0);
    for i in 0..h.mesh.vertex_count() {
        let p = h.mesh.position_vec3(i);
        h.mesh.set_position(i, p + shift);
    }
    h.refresh_geometry();
    for level in &h.levels {
        for lp in &level.loops {
            assert!((lp.centroid.z - 2.0).abs() < 1e-12);
        }
        for e in &level.edges {
            assert!((e.midpoint.z - 2.0).abs() < 1e-12);
        }
    }
}
