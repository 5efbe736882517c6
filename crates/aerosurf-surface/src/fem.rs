//! Structural displacement fields.
//!
//! A [`FemGrid`] carries nodal displacements on a structured `(u, v)` grid.
//! Displacement at an arbitrary parametric point is found by locating the
//! containing element on each monotonic axis and blending its four nodes
//! with bilinear shape functions. Points outside the grid are clamped to
//! the boundary element.

use aerosurf_math::interp::{bilinear_weights, locate_interval};
use aerosurf_math::{DVec3, RigidTransform};
use aerosurf_types::{AeroError, AeroResult};
use serde::{Deserialize, Serialize};

/// Anything that can report a displacement at a surface parameter.
pub trait DisplacementField {
    fn displacement_at(&self, u: f64, v: f64) -> DVec3;
}

/// Nodal displacements on a `u.len() × v.len()` grid, row-major in `u`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FemGrid {
    pub u: Vec<f64>,
    pub v: Vec<f64>,
    pub displacement: Vec<DVec3>,
}

impl FemGrid {
    /// Builds and validates a grid.
    pub fn new(u: Vec<f64>, v: Vec<f64>, displacement: Vec<DVec3>) -> AeroResult<Self> {
        let grid = Self { u, v, displacement };
        grid.validate()?;
        Ok(grid)
    }

    /// A zero field over the given axes.
    pub fn zero(u: Vec<f64>, v: Vec<f64>) -> AeroResult<Self> {
        let n = u.len() * v.len();
        Self::new(u, v, vec![DVec3::ZERO; n])
    }

    /// Samples `f(u, v)` at every grid node.
    pub fn from_fn(u: Vec<f64>, v: Vec<f64>, f: impl Fn(f64, f64) -> DVec3) -> AeroResult<Self> {
        let displacement = u
            .iter()
            .flat_map(|&uu| v.iter().map(move |&vv| (uu, vv)))
            .map(|(uu, vv)| f(uu, vv))
            .collect();
        Self::new(u, v, displacement)
    }

    #[inline]
    pub fn nu(&self) -> usize {
        self.u.len()
    }

    #[inline]
    pub fn nv(&self) -> usize {
        self.v.len()
    }

    #[inline]
    fn node(&self, k: usize, l: usize) -> DVec3 {
        self.displacement[k * self.nv() + l]
    }

    pub fn validate(&self) -> AeroResult<()> {
        if self.nu() < 2 || self.nv() < 2 {
            return Err(AeroError::Deformation(format!(
                "FEM grid must be at least 2 × 2, got {} × {}",
                self.nu(),
                self.nv()
            )));
        }
        if self.displacement.len() != self.nu() * self.nv() {
            return Err(AeroError::Deformation(format!(
                "FEM grid has {} displacements for a {} × {} grid",
                self.displacement.len(),
                self.nu(),
                self.nv()
            )));
        }
        for (name, axis) in [("u", &self.u), ("v", &self.v)] {
            let increasing = axis.windows(2).all(|w| w[1] > w[0]);
            let decreasing = axis.windows(2).all(|w| w[1] < w[0]);
            if !(increasing || decreasing) || axis.iter().any(|a| !a.is_finite()) {
                return Err(AeroError::Deformation(format!(
                    "FEM {name} axis must be strictly monotonic and finite"
                )));
            }
        }
        if self.displacement.iter().any(|d| !d.is_finite()) {
            return Err(AeroError::Deformation(
                "FEM displacements must be finite".into(),
            ));
        }
        Ok(())
    }

    /// Largest nodal displacement magnitude.
    pub fn max_displacement(&self) -> f64 {
        self.displacement
            .iter()
            .map(|d| d.length())
            .fold(0.0, f64::max)
    }

    /// Rotates every displacement vector with a rigid-body move.
    pub fn transform(&mut self, t: &RigidTransform) {
        for d in self.displacement.iter_mut() {
            *d = t.apply_vector(*d);
        }
    }
}

impl DisplacementField for FemGrid {
    fn displacement_at(&self, u: f64, v: f64) -> DVec3 {
        let (k, s) = locate_interval(&self.u, u);
        let (l, t) = locate_interval(&self.v, v);
        let w = bilinear_weights(s, t);
        w[0] * self.node(k, l)
            + w[1] * self.node(k + 1, l)
            + w[2] * self.node(k + 1, l + 1)
            + w[3] * self.node(k, l + 1)
    }
}
