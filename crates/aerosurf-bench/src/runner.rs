//! Benchmark runner: builds a surface from a scenario, times each stage
//! and collects metrics.

use std::time::Instant;

use aerosurf_math::DVec3;
use aerosurf_surface::Surface;
use aerosurf_types::{AeroError, AeroResult, SurfaceId};

use crate::metrics::BenchmarkMetrics;
use crate::scenarios::{Scenario, ScenarioKind};

/// Runs benchmark scenarios and collects metrics.
pub struct BenchmarkRunner;

impl BenchmarkRunner {
    /// Run a single scenario.
    ///
    /// Stages: `create_mesh`, `agglomerate_mesh`, then (with FEM data)
    /// `fem_deform_geometry` and inverse deformation of sampled nodes.
    pub fn run(scenario: &Scenario) -> AeroResult<BenchmarkMetrics> {
        let total_start = Instant::now();
        let mut surface = Surface::new(
            scenario.kind.name(),
            scenario.surface_kind,
            scenario.patch.clone(),
            scenario.config.clone(),
        )?;

        let start = Instant::now();
        surface.create_mesh(SurfaceId(0))?;
        let mesh_time = start.elapsed().as_secs_f64();

        let start = Instant::now();
        surface.agglomerate_mesh()?;
        let agglomerate_time = start.elapsed().as_secs_f64();

        let mut deform_time = 0.0;
        let mut avg_undeform_time = 0.0;
        let mut max_undeform_error: f64 = 0.0;
        let mut max_displacement = 0.0;
        if let Some(fem) = &scenario.fem {
            surface.load_fem_deformation_data(fem.clone())?;

            // Interior samples, taken before deforming
            let (ni, nj) = (surface.patch().surface_num_i(), surface.patch().surface_num_j());
            let originals: Vec<((usize, usize), DVec3)> = (0..scenario.undeform_samples)
                .map(|k| {
                    let (i, j) = (1 + (7 * k) % ni, 2 + (13 * k) % nj.saturating_sub(2).max(1));
                    ((i, j), surface.patch().point(i, j))
                })
                .collect();

            let start = Instant::now();
            max_displacement = surface.fem_deform_geometry()?;
            deform_time = start.elapsed().as_secs_f64();

            let start = Instant::now();
            for &((i, j), original) in &originals {
                let back = surface.fem_undeform_geometry(surface.patch().point(i, j))?;
                max_undeform_error = max_undeform_error.max(back.distance(original));
            }
            if !originals.is_empty() {
                avg_undeform_time = start.elapsed().as_secs_f64() / originals.len() as f64;
            }
        }

        let report = surface
            .report()
            .ok_or_else(|| AeroError::Mesh("benchmark surface has no mesh".into()))?;
        let metrics = BenchmarkMetrics {
            scenario: scenario.kind.name().to_string(),
            nodes: report.nodes,
            triangles: report.triangles,
            kutta_nodes: report.kutta_nodes,
            grid_levels: report.grid_levels,
            coarsest_loops: report.loops_per_level.last().copied().unwrap_or(0),
            bandwidth_before: report.bandwidth_before,
            bandwidth_after: report.bandwidth_after,
            mesh_time,
            agglomerate_time,
            deform_time,
            avg_undeform_time,
            max_undeform_error,
            max_displacement,
            total_wall_time: total_start.elapsed().as_secs_f64(),
        };
        tracing::info!(
            scenario = %metrics.scenario,
            triangles = metrics.triangles,
            levels = metrics.grid_levels,
            wall = metrics.total_wall_time,
            "benchmark finished"
        );
        Ok(metrics)
    }

    /// Run all scenarios and return metrics for each.
    pub fn run_all() -> AeroResult<Vec<BenchmarkMetrics>> {
        ScenarioKind::all()
            .iter()
            .map(|&kind| Self::run(&Scenario::from_kind(kind)))
            .collect()
    }
}
