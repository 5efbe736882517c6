//! Input/output contract types.
//!
//! These records are the JSON boundary of the surface core: the CLI and any
//! geometry front end describe components with them, and mesh summaries
//! come back out in the same form. Lattice arrays are row-major in `i`
//! (entry `(i, j)` at `(i - 1) * nj + (j - 1)`).

use std::path::Path;

use aerosurf_math::{DVec2, DVec3};
use aerosurf_mesh::TriangleMesh;
use aerosurf_surface::{
    ControlSurface, Exclusion, FemGrid, MeshConfig, MeshReport, PipelineOutcome,
    StructuredPatch, Surface, SurfaceKind, UvBox,
};
use aerosurf_types::{AeroError, AeroResult, SurfaceId};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::validator::{validate_lattice, validate_surface};

/// A set of components to mesh together.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelInput {
    pub surfaces: Vec<SurfaceInput>,
}

/// One component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurfaceInput {
    pub name: String,
    pub kind: SurfaceKind,
    #[serde(default)]
    pub component_id: u32,
    /// Defaults to `true` for wings, `false` otherwise.
    #[serde(default)]
    pub lifting: Option<bool>,
    /// Geometric lattice; required for wings and bodies.
    #[serde(default)]
    pub geometry: Option<LatticeInput>,
    /// Flat-plate lattice; wings only.
    #[serde(default)]
    pub plate: Option<LatticeInput>,
    /// Per-span-station section data.
    #[serde(default)]
    pub sections: Option<SectionInput>,
    /// Already triangulated geometry; required for Cart3D components.
    #[serde(default)]
    pub triangulation: Option<TriangulatedInput>,
    #[serde(default)]
    pub control_surfaces: Vec<ControlSurfaceInput>,
}

/// A point lattice with optional normals and parameters.
///
/// Missing normals are derived by differencing; missing `u`/`v` are
/// spaced uniformly on `[0, 1]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatticeInput {
    pub ni: usize,
    pub nj: usize,
    pub xyz: Vec<[f64; 3]>,
    #[serde(default)]
    pub normals: Option<Vec<[f64; 3]>>,
    #[serde(default)]
    pub u: Option<Vec<f64>>,
    #[serde(default)]
    pub v: Option<Vec<f64>>,
}

impl LatticeInput {
    /// Entry count implied by the declared size.
    pub fn len(&self) -> usize {
        self.ni * self.nj
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn param(&self, k: usize) -> (f64, f64) {
        let (i, j) = (k / self.nj.max(1), k % self.nj.max(1));
        let uniform = |idx: usize, n: usize| {
            if n > 1 {
                idx as f64 / (n - 1) as f64
            } else {
                0.0
            }
        };
        let u = self
            .u
            .as_ref()
            .map_or_else(|| uniform(i, self.ni), |u| u[k]);
        let v = self
            .v
            .as_ref()
            .map_or_else(|| uniform(j, self.nj), |v| v[k]);
        (u, v)
    }

    fn normal(&self, k: usize) -> DVec3 {
        self.normals
            .as_ref()
            .map_or(DVec3::ZERO, |n| DVec3::from_array(n[k]))
    }
}

/// Section data supplied by the geometry source, one value per span station.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SectionInput {
    #[serde(default)]
    pub thickness_to_chord: Vec<f64>,
    #[serde(default)]
    pub location_of_max_thickness: Vec<f64>,
    #[serde(default)]
    pub radius_to_chord: Vec<f64>,
}

/// Interleaved triangle data for a Cart3D component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriangulatedInput {
    /// `[x0, y0, z0, x1, ...]`
    pub positions: Vec<f64>,
    pub indices: Vec<u32>,
    /// `[u0, v0, u1, ...]`; zeros when empty.
    #[serde(default)]
    pub uvs: Vec<f64>,
}

/// A control surface in parameter space.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlSurfaceInput {
    pub name: String,
    pub uv_min: [f64; 2],
    pub uv_max: [f64; 2],
    pub hinge_start: [f64; 2],
    pub hinge_end: [f64; 2],
    #[serde(default)]
    pub deflection_deg: f64,
}

/// Structural displacements on a `u.len() × v.len()` grid, row-major in `u`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FemInput {
    pub u: Vec<f64>,
    pub v: Vec<f64>,
    pub displacement: Vec<[f64; 3]>,
}

impl FemInput {
    pub fn into_grid(self) -> AeroResult<FemGrid> {
        let displacement = self
            .displacement
            .into_iter()
            .map(DVec3::from_array)
            .collect();
        FemGrid::new(self.u, self.v, displacement)
    }
}

impl ControlSurfaceInput {
    pub fn to_control_surface(&self) -> ControlSurface {
        let mut control = ControlSurface::new(
            self.name.clone(),
            UvBox::new(DVec2::from_array(self.uv_min), DVec2::from_array(self.uv_max)),
            [
                DVec2::from_array(self.hinge_start),
                DVec2::from_array(self.hinge_end),
            ],
        );
        control.deflection_deg = self.deflection_deg;
        control
    }
}

impl SurfaceInput {
    /// Builds the structured patch described by `geometry` and `plate`.
    pub fn to_patch(&self, tol: f64) -> AeroResult<StructuredPatch> {
        let geometry = self.geometry.as_ref().ok_or_else(|| {
            AeroError::Geometry(format!("surface '{}' has no geometry lattice", self.name))
        })?;
        validate_lattice(&self.name, "geometry", geometry)?;
        if let Some(plate) = &self.plate {
            validate_lattice(&self.name, "plate", plate)?;
        }

        let mut patch = StructuredPatch::new();
        patch.size_geometry_lists(geometry.ni, geometry.nj);
        for (k, (i, j)) in patch.xyz.indices().collect::<Vec<_>>().into_iter().enumerate() {
            let (u, v) = geometry.param(k);
            let p = DVec3::from_array(geometry.xyz[k]);
            patch.set_point(i, j, p, geometry.normal(k), u, v);
        }
        if geometry.normals.is_none() {
            patch.derive_normals(tol * patch.reference_length());
        }
        patch.compute_point_areas();

        if let Some(plate) = &self.plate {
            patch.size_flat_plate_lists(plate.ni, plate.nj);
            for (k, (i, j)) in patch
                .plate_xyz
                .indices()
                .collect::<Vec<_>>()
                .into_iter()
                .enumerate()
            {
                let (u, v) = plate.param(k);
                let p = DVec3::from_array(plate.xyz[k]);
                patch.set_plate_point(i, j, p, plate.normal(k), u, v);
            }
            if plate.normals.is_none() {
                patch.derive_plate_normals();
            }
        }
        Ok(patch)
    }

    /// Converts the record into a surface ready for `create_mesh`.
    pub fn into_surface(self, config: &MeshConfig) -> AeroResult<Surface> {
        validate_surface(&self)?;
        let mut surface = match self.kind {
            SurfaceKind::Cart3d => {
                let tri = self.triangulation.as_ref().ok_or_else(|| {
                    AeroError::Geometry(format!(
                        "Cart3D surface '{}' has no triangulation",
                        self.name
                    ))
                })?;
                let mut mesh = TriangleMesh::from_interleaved(
                    &tri.positions,
                    &tri.indices,
                    &tri.uvs,
                    SurfaceId(0),
                )?;
                aerosurf_mesh::normals::compute_vertex_normals(&mut mesh);
                Surface::from_triangulation(self.name.clone(), mesh, config.clone())?
            }
            kind => {
                let patch = self.to_patch(config.coincidence_tolerance)?;
                Surface::new(self.name.clone(), kind, patch, config.clone())?
            }
        };

        surface.set_component_id(self.component_id);
        if let Some(lifting) = self.lifting {
            surface.set_lifting_surface(lifting);
        }
        if let Some(sections) = &self.sections {
            surface.edges_mut().set_section_data(
                &sections.thickness_to_chord,
                &sections.location_of_max_thickness,
                &sections.radius_to_chord,
            );
        }
        for control in &self.control_surfaces {
            surface.add_control_surface(control.to_control_surface())?;
        }
        Ok(surface)
    }
}

impl ModelInput {
    /// Converts every record, stopping at the first failure.
    pub fn into_surfaces(self, config: &MeshConfig) -> AeroResult<Vec<Surface>> {
        tracing::debug!(surfaces = self.surfaces.len(), "converting model");
        self.surfaces
            .into_iter()
            .map(|s| s.into_surface(config))
            .collect()
    }
}

/// Result of meshing a model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshSummary {
    pub surfaces: Vec<MeshReport>,
    pub excluded: Vec<Exclusion>,
    /// Wall-clock time of the whole run.
    pub wall_time_seconds: f64,
}

impl MeshSummary {
    pub fn from_outcome(outcome: PipelineOutcome, wall_time_seconds: f64) -> Self {
        Self {
            surfaces: outcome.reports,
            excluded: outcome.excluded,
            wall_time_seconds,
        }
    }

    pub fn total_triangles(&self) -> usize {
        self.surfaces.iter().map(|r| r.triangles).sum()
    }

    pub fn total_kutta_nodes(&self) -> usize {
        self.surfaces.iter().map(|r| r.kutta_nodes).sum()
    }
}

/// Reads any contract record from a JSON file.
pub fn read_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> AeroResult<T> {
    let text = std::fs::read_to_string(path)?;
    serde_json::from_str(&text).map_err(|e| AeroError::Serialization(e.to_string()))
}

/// Writes any contract record as pretty-printed JSON.
pub fn write_json<T: Serialize>(path: impl AsRef<Path>, value: &T) -> AeroResult<()> {
    let text =
        serde_json::to_string_pretty(value).map_err(|e| AeroError::Serialization(e.to_string()))?;
    std::fs::write(path, text)?;
    Ok(())
}

/// Encodes a structured patch as a geometry record, for round trips
/// through the contract.
pub fn lattice_input_from_patch(patch: &StructuredPatch) -> LatticeInput {
    LatticeInput {
        ni: patch.surface_num_i(),
        nj: patch.surface_num_j(),
        xyz: patch.xyz.as_slice().iter().map(|p| p.to_array()).collect(),
        normals: Some(patch.normal.as_slice().iter().map(|n| n.to_array()).collect()),
        u: Some(patch.u.as_slice().to_vec()),
        v: Some(patch.v.as_slice().to_vec()),
    }
}

/// Encodes the flat-plate lattice of `patch`; `None` when it is empty.
pub fn plate_input_from_patch(patch: &StructuredPatch) -> Option<LatticeInput> {
    if patch.plate_xyz.is_empty() {
        return None;
    }
    Some(LatticeInput {
        ni: patch.plate_num_i(),
        nj: patch.plate_num_j(),
        xyz: patch.plate_xyz.as_slice().iter().map(|p| p.to_array()).collect(),
        normals: Some(
            patch
                .flat_plate_normal
                .as_slice()
                .iter()
                .map(|n| n.to_array())
                .collect(),
        ),
        u: Some(patch.u_plate.as_slice().to_vec()),
        v: Some(patch.v_plate.as_slice().to_vec()),
    })
}
