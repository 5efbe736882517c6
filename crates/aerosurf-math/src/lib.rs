//! # aerosurf-math
//!
//! Math primitives for the aerosurf geometry pipeline.
//!
//! Provides:
//! - Re-exports of double-precision `glam` types (`DVec3`, `DQuat`, etc.)
//! - Compressed adjacency graph (CSR pattern) with degree and bandwidth queries
//! - Parametric interval location and bilinear shape functions
//! - Quaternion rigid-body transform with a caller-supplied inverse

pub mod interp;
pub mod sparse;
pub mod transform;

// Re-export glam types as the canonical math types for aerosurf.
pub use glam::{DMat3, DQuat, DVec2, DVec3};

pub use sparse::CsrGraph;
pub use transform::RigidTransform;
