//! Input validation.
//!
//! Checks contract records before they are turned into surfaces, so
//! malformed arrays are reported with the surface name instead of failing
//! deep inside the mesher.

use aerosurf_surface::SurfaceKind;
use aerosurf_types::{AeroError, AeroResult};

use crate::contract::{FemInput, LatticeInput, ModelInput, SurfaceInput};

/// Validates every surface of a model and checks that names are unique.
pub fn validate_model(model: &ModelInput) -> AeroResult<()> {
    if model.surfaces.is_empty() {
        return Err(AeroError::InvalidConfig("model has no surfaces".into()));
    }
    for (k, surface) in model.surfaces.iter().enumerate() {
        validate_surface(surface)?;
        if model.surfaces[..k].iter().any(|s| s.name == surface.name) {
            return Err(AeroError::InvalidConfig(format!(
                "duplicate surface name '{}'",
                surface.name
            )));
        }
    }
    Ok(())
}

/// Validates one surface record.
///
/// Checks:
/// - Wings and bodies carry a geometry lattice of consistent size
/// - Cart3D surfaces carry a triangulation
/// - Bodies have no flat-plate lattice
/// - Control-surface boxes and hinges are finite
pub fn validate_surface(input: &SurfaceInput) -> AeroResult<()> {
    let name = &input.name;
    match input.kind {
        SurfaceKind::Wing | SurfaceKind::Body => {
            let geometry = input.geometry.as_ref().ok_or_else(|| {
                AeroError::Geometry(format!("surface '{name}' has no geometry lattice"))
            })?;
            validate_lattice(name, "geometry", geometry)?;
            if let Some(plate) = &input.plate {
                if input.kind == SurfaceKind::Body {
                    return Err(AeroError::InvalidConfig(format!(
                        "body '{name}' cannot carry a flat-plate lattice"
                    )));
                }
                validate_lattice(name, "plate", plate)?;
            }
        }
        SurfaceKind::Cart3d => {
            let tri = input.triangulation.as_ref().ok_or_else(|| {
                AeroError::Geometry(format!("Cart3D surface '{name}' has no triangulation"))
            })?;
            if tri.indices.is_empty() || tri.indices.len() % 3 != 0 {
                return Err(AeroError::Mesh(format!(
                    "surface '{name}': index count {} is not a positive multiple of 3",
                    tri.indices.len()
                )));
            }
            if !tri.uvs.is_empty() && tri.uvs.len() * 3 != tri.positions.len() * 2 {
                return Err(AeroError::Mesh(format!(
                    "surface '{name}': {} uv values for {} positions",
                    tri.uvs.len(),
                    tri.positions.len() / 3
                )));
            }
        }
    }

    for control in &input.control_surfaces {
        let mut values = control
            .uv_min
            .iter()
            .chain(&control.uv_max)
            .chain(&control.hinge_start)
            .chain(&control.hinge_end);
        if values.any(|x| !x.is_finite()) || !control.deflection_deg.is_finite() {
            return Err(AeroError::InvalidConfig(format!(
                "surface '{name}': control surface '{}' has non-finite values",
                control.name
            )));
        }
    }
    Ok(())
}

/// Validates one lattice record.
///
/// When present, `u` must be strictly monotonic along `i` on every column
/// and `v` along `j` on every row.
pub fn validate_lattice(surface: &str, which: &str, lattice: &LatticeInput) -> AeroResult<()> {
    let n = lattice.len();
    if lattice.ni < 2 || lattice.nj < 2 {
        return Err(AeroError::Geometry(format!(
            "surface '{surface}': {which} lattice must be at least 2 × 2, got {} × {}",
            lattice.ni, lattice.nj
        )));
    }
    let mismatch = |what: &str, len: usize| {
        AeroError::Geometry(format!(
            "surface '{surface}': {which} lattice has {len} {what} for {} × {}",
            lattice.ni, lattice.nj
        ))
    };
    if lattice.xyz.len() != n {
        return Err(mismatch("points", lattice.xyz.len()));
    }
    if let Some(normals) = &lattice.normals {
        if normals.len() != n {
            return Err(mismatch("normals", normals.len()));
        }
    }
    for (what, param) in [("u values", &lattice.u), ("v values", &lattice.v)] {
        if let Some(values) = param {
            if values.len() != n {
                return Err(mismatch(what, values.len()));
            }
            if values.iter().any(|x| !x.is_finite()) {
                return Err(AeroError::Geometry(format!(
                    "surface '{surface}': {which} lattice has non-finite {what}"
                )));
            }
        }
    }
    let (ni, nj) = (lattice.ni, lattice.nj);
    if let Some(u) = &lattice.u {
        let column = |j: usize| (0..ni).map(move |i| u[i * nj + j]);
        if let Some(j) = (0..nj).find(|&j| !strictly_monotonic(column(j))) {
            return Err(AeroError::Geometry(format!(
                "surface '{surface}': {which} lattice u is not monotonic along i at j = {}",
                j + 1
            )));
        }
    }
    if let Some(v) = &lattice.v {
        let row = |i: usize| v[i * nj..(i + 1) * nj].iter().copied();
        if let Some(i) = (0..ni).find(|&i| !strictly_monotonic(row(i))) {
            return Err(AeroError::Geometry(format!(
                "surface '{surface}': {which} lattice v is not monotonic along j at i = {}",
                i + 1
            )));
        }
    }
    if lattice.xyz.iter().flatten().any(|x| !x.is_finite()) {
        return Err(AeroError::Geometry(format!(
            "surface '{surface}': {which} lattice has non-finite points"
        )));
    }
    Ok(())
}

/// Validates a FEM displacement record.
pub fn validate_fem(input: &FemInput) -> AeroResult<()> {
    let expected = input.u.len() * input.v.len();
    if input.displacement.len() != expected {
        return Err(AeroError::Deformation(format!(
            "FEM record has {} displacements for a {} × {} grid",
            input.displacement.len(),
            input.u.len(),
            input.v.len()
        )));
    }
    if input.displacement.iter().flatten().any(|x| !x.is_finite()) {
        return Err(AeroError::Deformation(
            "FEM displacements must be finite".into(),
        ));
    }
    Ok(())
}

fn strictly_monotonic(values: impl Iterator<Item = f64>) -> bool {
    let steps: Vec<f64> = values
        .collect::<Vec<_>>()
        .windows(2)
        .map(|w| w[1] - w[0])
        .collect();
    steps.iter().all(|&d| d > 0.0) || steps.iter().all(|&d| d < 0.0)
}
