//! Meshing event types.
//!
//! Events are lightweight value types tagged with the surface they concern.

use aerosurf_types::SurfaceId;
use serde::{Deserialize, Serialize};

/// An event emitted while building or updating a surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshEvent {
    pub surface_id: SurfaceId,
    pub kind: EventKind,
}

/// Event payload variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventKind {
    /// Degenerate cross-section scan finished.
    CrossSectionsChecked {
        degenerate_rows: u32,
        nose_is_closed: bool,
        tail_is_closed: bool,
    },

    /// Structured patch converted to triangles.
    Triangulated {
        nodes: u32,
        triangles: u32,
        /// Zero-area panels dropped during triangulation.
        collapsed_panels: u32,
    },

    /// Node renumbering finished.
    Reordered {
        bandwidth_before: u32,
        bandwidth_after: u32,
    },

    /// Sharp trailing-edge scan finished.
    KuttaNodesFound { count: u32 },

    /// Multigrid hierarchy built.
    Agglomerated {
        levels: u32,
        /// Loop count per level, finest first.
        loops_per_level: Vec<u32>,
    },

    /// FEM displacement applied.
    Deformed {
        /// Largest node displacement magnitude.
        max_displacement: f64,
    },

    /// Surface dropped from the run.
    Excluded { reason: String },

    /// Custom event for extensibility.
    Custom {
        label: String,
        /// JSON-encoded payload.
        payload: String,
    },
}

impl MeshEvent {
    pub fn new(surface_id: SurfaceId, kind: EventKind) -> Self {
        Self { surface_id, kind }
    }
}
