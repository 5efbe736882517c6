//! Serializable meshing summary.

use aerosurf_types::SurfaceId;
use serde::{Deserialize, Serialize};

use crate::triangulate::SurfaceKind;

/// What `create_mesh` and `agglomerate_mesh` produced for one surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshReport {
    pub surface_id: SurfaceId,
    pub name: String,
    pub kind: SurfaceKind,
    pub nodes: usize,
    pub triangles: usize,
    pub collapsed_panels: usize,
    pub degenerate_rows: usize,
    pub nose_is_closed: bool,
    pub tail_is_closed: bool,
    pub wrapped: bool,
    pub bandwidth_before: usize,
    pub bandwidth_after: usize,
    pub kutta_nodes: usize,
    pub grid_levels: usize,
    /// Loop count per level, finest first.
    pub loops_per_level: Vec<usize>,
    pub wetted_area: f64,
}
