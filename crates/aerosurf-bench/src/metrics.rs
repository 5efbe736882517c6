//! Benchmark metrics: data collected during a benchmark run.

use serde::{Deserialize, Serialize};

/// Metrics collected from a benchmark scenario run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkMetrics {
    /// Scenario name.
    pub scenario: String,
    pub nodes: usize,
    pub triangles: usize,
    pub kutta_nodes: usize,
    pub grid_levels: usize,
    /// Loop count of the coarsest level.
    pub coarsest_loops: usize,
    pub bandwidth_before: usize,
    pub bandwidth_after: usize,
    /// `create_mesh` wall time (seconds).
    pub mesh_time: f64,
    /// `agglomerate_mesh` wall time (seconds).
    pub agglomerate_time: f64,
    /// `fem_deform_geometry` wall time (seconds); zero without FEM data.
    pub deform_time: f64,
    /// Average `fem_undeform_geometry` time per sample (seconds).
    pub avg_undeform_time: f64,
    /// Largest distance between a sample and its undeformed round trip.
    pub max_undeform_error: f64,
    /// Largest applied displacement.
    pub max_displacement: f64,
    /// Total wall-clock time (seconds).
    pub total_wall_time: f64,
}

impl BenchmarkMetrics {
    /// CSV header line.
    pub fn to_csv_header() -> String {
        "scenario,nodes,triangles,kutta_nodes,grid_levels,coarsest_loops,bandwidth_before,bandwidth_after,mesh_ms,agglomerate_ms,deform_ms,avg_undeform_us,max_undeform_error,max_displacement,total_wall_time_s".to_string()
    }

    /// Format this metrics instance as a CSV data row.
    pub fn to_csv_row(&self) -> String {
        format!(
            "{},{},{},{},{},{},{},{},{:.4},{:.4},{:.4},{:.3},{:.3e},{:.6},{:.6}",
            self.scenario,
            self.nodes,
            self.triangles,
            self.kutta_nodes,
            self.grid_levels,
            self.coarsest_loops,
            self.bandwidth_before,
            self.bandwidth_after,
            self.mesh_time * 1000.0,
            self.agglomerate_time * 1000.0,
            self.deform_time * 1000.0,
            self.avg_undeform_time * 1.0e6,
            self.max_undeform_error,
            self.max_displacement,
            self.total_wall_time,
        )
    }

    /// Format multiple metrics as a complete CSV string.
    pub fn to_csv(metrics: &[BenchmarkMetrics]) -> String {
        let mut csv = Self::to_csv_header();
        for m in metrics {
            csv.push('\n');
            csv.push_str(&m.to_csv_row());
        }
        csv
    }
}
