//! Integration tests for aerosurf-bench.

use aerosurf_bench::metrics::BenchmarkMetrics;
use aerosurf_bench::runner::BenchmarkRunner;
use aerosurf_bench::scenarios::{Scenario, ScenarioKind};
use aerosurf_surface::generators::thick_wing;
use aerosurf_surface::{MeshConfig, SurfaceKind};

// ─── Scenario Tests ───────────────────────────────────────────

#[test]
fn flat_wing_setup() {
    let s = Scenario::flat_wing();
    assert_eq!(s.kind, ScenarioKind::FlatWing);
    assert_eq!(s.surface_kind, SurfaceKind::Wing);
    assert_eq!(s.patch.surface_num_i(), 40);
    assert_eq!(s.patch.surface_num_j(), 12);
    assert!(s.fem.is_none());
}

#[test]
fn fuselage_setup() {
    let s = Scenario::fuselage();
    assert_eq!(s.surface_kind, SurfaceKind::Body);
    assert_eq!(s.patch.surface_num_i(), 40);
    assert!(s.patch.plate_xyz.is_empty());
}

#[test]
fn bent_wing_has_field() {
    let s = Scenario::bent_wing();
    let fem = s.fem.as_ref().unwrap();
    assert_eq!(fem.nu(), 11);
    assert_eq!(fem.nv(), 5);
    // Tip deflection 0.5 plus twist 0.025 at v = 1
    assert!((fem.max_displacement() - 0.525).abs() < 1e-12);
}

#[test]
fn all_scenarios() {
    assert_eq!(ScenarioKind::all().len(), 4);
    for &kind in ScenarioKind::all() {
        assert_eq!(ScenarioKind::from_name(kind.name()), Some(kind));
    }
    assert_eq!(ScenarioKind::from_name("glider"), None);
}

// ─── Runner Tests ─────────────────────────────────────────────

fn small(kind: ScenarioKind) -> Scenario {
    let mut s = Scenario::from_kind(kind);
    if kind != ScenarioKind::Fuselage {
        s.patch = thick_wing(4.0, 1.0, 0.12, 6, 7);
        s.undeform_samples = s.undeform_samples.min(8);
    }
    s
}

#[test]
fn run_flat_wing() {
    let metrics = BenchmarkRunner::run(&Scenario::flat_wing()).unwrap();
    assert_eq!(metrics.scenario, "flat_wing");
    assert_eq!(metrics.nodes, 480);
    assert_eq!(metrics.triangles, 39 * 11 * 2);
    assert_eq!(metrics.kutta_nodes, 0);
    assert!(metrics.grid_levels >= 1);
    assert!(metrics.bandwidth_after <= metrics.bandwidth_before);
    assert_eq!(metrics.deform_time, 0.0);
    assert!(metrics.total_wall_time > 0.0);
}

#[test]
fn run_thick_wing_finds_trailing_edge() {
    let metrics = BenchmarkRunner::run(&small(ScenarioKind::ThickWing)).unwrap();
    assert!(metrics.kutta_nodes > 0);
    assert_eq!(metrics.max_displacement, 0.0);
}

#[test]
fn run_bent_wing_round_trips() {
    let metrics = BenchmarkRunner::run(&small(ScenarioKind::BentWing)).unwrap();
    assert!(metrics.max_displacement > 0.0);
    assert!(metrics.max_undeform_error < 1e-6);
}

#[test]
fn run_single_level() {
    let s = small(ScenarioKind::ThickWing).with_config(MeshConfig::single_level());
    let metrics = BenchmarkRunner::run(&s).unwrap();
    assert_eq!(metrics.grid_levels, 1);
}

// ─── Metrics Tests ────────────────────────────────────────────

fn sample_metrics() -> BenchmarkMetrics {
    BenchmarkMetrics {
        scenario: "test".into(),
        nodes: 480,
        triangles: 858,
        kutta_nodes: 0,
        grid_levels: 3,
        coarsest_loops: 40,
        bandwidth_before: 13,
        bandwidth_after: 12,
        mesh_time: 0.002,
        agglomerate_time: 0.001,
        deform_time: 0.0,
        avg_undeform_time: 0.0,
        max_undeform_error: 0.0,
        max_displacement: 0.0,
        total_wall_time: 0.004,
    }
}

#[test]
fn metrics_csv_output() {
    let csv = BenchmarkMetrics::to_csv(&[sample_metrics()]);
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("scenario,nodes,triangles"));
    assert!(lines[1].starts_with("test,480,858,0,3,40,13,12,2.0000,1.0000"));
    assert_eq!(
        lines[0].split(',').count(),
        lines[1].split(',').count()
    );
}

#[test]
fn metrics_csv_empty() {
    let csv = BenchmarkMetrics::to_csv(&[]);
    assert_eq!(csv, BenchmarkMetrics::to_csv_header());
}
