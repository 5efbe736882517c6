//! # aerosurf-io
//!
//! Surface input/output contract and input validation.
//!
//! Defines the JSON records that external tools (CLI, geometry front ends)
//! use to hand components to the surface core and read mesh summaries back.

pub mod contract;
pub mod validator;

pub use contract::{
    FemInput, LatticeInput, MeshSummary, ModelInput, SurfaceInput, TriangulatedInput,
};
pub use validator::{validate_fem, validate_model, validate_surface};
