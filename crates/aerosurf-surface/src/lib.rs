//! # aerosurf-surface
//!
//! One aerodynamic component of a panel-method model: its structured
//! patch, the triangulated mesh and multigrid hierarchy built from it,
//! Kutta nodes, control surfaces, FEM deformation and rigid-body motion.
//!
//! ## Pipeline
//!
//! ```text
//! StructuredPatch → analyzer → triangulate → RCM reorder → grid hierarchy
//!                                                 └→ Kutta scan  └→ agglomerate
//! ```

pub mod analyzer;
pub mod config;
pub mod control;
pub mod edges;
pub mod fem;
pub mod generators;
pub mod ground;
pub mod lattice;
pub mod patch;
pub mod pipeline;
pub mod report;
pub mod surface;
pub mod triangulate;

pub use analyzer::{KuttaNode, XSectionReport};
pub use config::MeshConfig;
pub use control::{ControlSurface, UvBox};
pub use edges::EdgeSpans;
pub use fem::{DisplacementField, FemGrid};
pub use ground::GroundEffects;
pub use lattice::Lattice;
pub use patch::StructuredPatch;
pub use pipeline::{Exclusion, MeshPipeline, PipelineOutcome};
pub use report::MeshReport;
pub use surface::Surface;
pub use triangulate::SurfaceKind;
