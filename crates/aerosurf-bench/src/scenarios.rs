//! Benchmark scenarios: a procedural surface, a meshing configuration and
//! an optional structural displacement field.
//!
//! Canonical scenarios for regression testing:
//! 1. **Flat wing**: open rectangular plate, no Kutta nodes
//! 2. **Thick wing**: wrapped 12% symmetric section, sharp trailing edge
//! 3. **Fuselage**: body of revolution with nose and tail poles
//! 4. **Bent wing**: thick wing deformed by a quadratic tip deflection

use serde::{Deserialize, Serialize};

use aerosurf_math::DVec3;
use aerosurf_surface::generators::{body_of_revolution, rectangular_wing, thick_wing};
use aerosurf_surface::{FemGrid, MeshConfig, StructuredPatch, SurfaceKind};

/// Which benchmark scenario to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScenarioKind {
    FlatWing,
    ThickWing,
    Fuselage,
    BentWing,
}

impl ScenarioKind {
    /// Returns all scenario kinds.
    pub fn all() -> &'static [ScenarioKind] {
        &[
            ScenarioKind::FlatWing,
            ScenarioKind::ThickWing,
            ScenarioKind::Fuselage,
            ScenarioKind::BentWing,
        ]
    }

    /// Returns a human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioKind::FlatWing => "flat_wing",
            ScenarioKind::ThickWing => "thick_wing",
            ScenarioKind::Fuselage => "fuselage",
            ScenarioKind::BentWing => "bent_wing",
        }
    }

    /// Parses a name produced by [`ScenarioKind::name`].
    pub fn from_name(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|k| k.name() == name)
    }
}

/// A fully specified benchmark scenario.
pub struct Scenario {
    pub kind: ScenarioKind,
    pub surface_kind: SurfaceKind,
    pub patch: StructuredPatch,
    pub config: MeshConfig,
    /// Displacement applied after meshing, if any.
    pub fem: Option<FemGrid>,
    /// Points pushed through the inverse deformation.
    pub undeform_samples: usize,
}

impl Scenario {
    /// A 10 × 2 flat plate at 40 × 12 resolution.
    pub fn flat_wing() -> Self {
        Self {
            kind: ScenarioKind::FlatWing,
            surface_kind: SurfaceKind::Wing,
            patch: rectangular_wing(10.0, 2.0, 40, 12),
            config: MeshConfig::default(),
            fem: None,
            undeform_samples: 0,
        }
    }

    /// A 10 m span, 2 m chord NACA 0012 wing, 30 span rows, 25 points per side.
    pub fn thick_wing() -> Self {
        Self {
            kind: ScenarioKind::ThickWing,
            surface_kind: SurfaceKind::Wing,
            patch: thick_wing(10.0, 2.0, 0.12, 30, 25),
            config: MeshConfig::fine_hierarchy(),
            fem: None,
            undeform_samples: 0,
        }
    }

    /// An 8 m body of 0.6 m maximum radius, 40 stations by 33 around.
    pub fn fuselage() -> Self {
        Self {
            kind: ScenarioKind::Fuselage,
            surface_kind: SurfaceKind::Body,
            patch: body_of_revolution(8.0, 0.6, 40, 33),
            config: MeshConfig::default(),
            fem: None,
            undeform_samples: 0,
        }
    }

    /// The thick wing with a `0.5 u²` tip deflection and a small twist.
    pub fn bent_wing() -> Self {
        let u: Vec<f64> = (0..=10).map(|k| k as f64 / 10.0).collect();
        let v: Vec<f64> = (0..=4).map(|k| k as f64 / 4.0).collect();
        let fem = FemGrid::from_fn(u, v, |u, v| {
            DVec3::new(0.0, 0.0, 0.5 * u * u + 0.05 * u * (v - 0.5))
        })
        .ok();
        Self {
            kind: ScenarioKind::BentWing,
            surface_kind: SurfaceKind::Wing,
            patch: thick_wing(10.0, 2.0, 0.12, 20, 17),
            config: MeshConfig::default(),
            fem,
            undeform_samples: 50,
        }
    }

    /// Create a scenario by kind.
    pub fn from_kind(kind: ScenarioKind) -> Self {
        match kind {
            ScenarioKind::FlatWing => Self::flat_wing(),
            ScenarioKind::ThickWing => Self::thick_wing(),
            ScenarioKind::Fuselage => Self::fuselage(),
            ScenarioKind::BentWing => Self::bent_wing(),
        }
    }

    /// Replaces the meshing configuration.
    pub fn with_config(mut self, config: MeshConfig) -> Self {
        self.config = config;
        self
    }
}
