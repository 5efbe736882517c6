//! Multi-surface meshing pipeline.
//!
//! Runs `create_mesh` then `agglomerate_mesh` on every surface in order,
//! reporting each stage on an [`EventBus`]. A surface whose geometry or
//! mesh is unusable is excluded from the run; any other error aborts it.

use aerosurf_telemetry::{EventBus, EventKind, MeshEvent};
use aerosurf_types::{AeroResult, SurfaceId};
use serde::{Deserialize, Serialize};

use crate::report::MeshReport;
use crate::surface::Surface;

/// A surface dropped from a pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exclusion {
    pub surface_id: SurfaceId,
    pub name: String,
    pub reason: String,
}

/// Result of a pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineOutcome {
    pub reports: Vec<MeshReport>,
    pub excluded: Vec<Exclusion>,
}

/// Sequential mesher for a set of surfaces.
#[derive(Default)]
pub struct MeshPipeline {
    bus: EventBus,
}

impl MeshPipeline {
    pub fn new(bus: EventBus) -> Self {
        Self { bus }
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut EventBus {
        &mut self.bus
    }

    /// Meshes and agglomerates every surface. Surface `k` gets id `k`.
    pub fn run(&mut self, surfaces: &mut [Surface]) -> AeroResult<PipelineOutcome> {
        let mut outcome = PipelineOutcome::default();

        for (k, surface) in surfaces.iter_mut().enumerate() {
            let id = SurfaceId(k as u32);
            match self.mesh_one(id, surface) {
                Ok(report) => outcome.reports.push(report),
                Err(e) if e.is_fatal_for_surface() => {
                    tracing::warn!(surface = %surface.name(), error = %e, "surface excluded");
                    self.bus.emit(MeshEvent::new(
                        id,
                        EventKind::Excluded {
                            reason: e.to_string(),
                        },
                    ));
                    outcome.excluded.push(Exclusion {
                        surface_id: id,
                        name: surface.name().to_string(),
                        reason: e.to_string(),
                    });
                }
                Err(e) => {
                    self.bus.flush();
                    return Err(e);
                }
            }
            self.bus.flush();
        }

        tracing::info!(
            meshed = outcome.reports.len(),
            excluded = outcome.excluded.len(),
            "pipeline finished"
        );
        Ok(outcome)
    }

    fn mesh_one(&mut self, id: SurfaceId, surface: &mut Surface) -> AeroResult<MeshReport> {
        surface.create_mesh(id)?;
        surface.agglomerate_mesh()?;
        let report = surface
            .report()
            .ok_or_else(|| aerosurf_types::AeroError::Mesh("mesh missing after creation".into()))?;

        if surface.x_sections().is_some() {
            self.bus.emit(MeshEvent::new(
                id,
                EventKind::CrossSectionsChecked {
                    degenerate_rows: report.degenerate_rows as u32,
                    nose_is_closed: report.nose_is_closed,
                    tail_is_closed: report.tail_is_closed,
                },
            ));
        }
        self.bus.emit(MeshEvent::new(
            id,
            EventKind::Triangulated {
                nodes: report.nodes as u32,
                triangles: report.triangles as u32,
                collapsed_panels: report.collapsed_panels as u32,
            },
        ));
        self.bus.emit(MeshEvent::new(
            id,
            EventKind::Reordered {
                bandwidth_before: report.bandwidth_before as u32,
                bandwidth_after: report.bandwidth_after as u32,
            },
        ));
        self.bus.emit(MeshEvent::new(
            id,
            EventKind::KuttaNodesFound {
                count: report.kutta_nodes as u32,
            },
        ));
        self.bus.emit(MeshEvent::new(
            id,
            EventKind::Agglomerated {
                levels: report.grid_levels as u32,
                loops_per_level: report.loops_per_level.iter().map(|&n| n as u32).collect(),
            },
        ));
        Ok(report)
    }

    /// Applies the loaded FEM deformation to `surface` and reports it.
    pub fn deform(&mut self, surface: &mut Surface) -> AeroResult<f64> {
        let max_displacement = surface.fem_deform_geometry()?;
        self.bus.emit(MeshEvent::new(
            surface.surface_id(),
            EventKind::Deformed { max_displacement },
        ));
        self.bus.flush();
        Ok(max_displacement)
    }

    /// Flushes and finalizes every sink.
    pub fn finish(&mut self) {
        self.bus.finish();
    }
}
