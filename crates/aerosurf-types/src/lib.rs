//! # aerosurf-types
//!
//! Shared types, identifiers, error types, and geometric tolerances
//! for the aerosurf surface meshing workspace.
//!
//! This crate has zero domain logic; it defines the vocabulary
//! that all other aerosurf crates share.

pub mod constants;
pub mod error;
pub mod ids;

pub use error::{AeroError, AeroResult};
pub use ids::{EdgeId, NodeId, SurfaceId};
