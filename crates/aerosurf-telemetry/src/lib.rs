//! # aerosurf-telemetry
//!
//! Event bus for meshing telemetry. Each surface stage (cross-section
//! checks, triangulation, reordering, Kutta detection, agglomeration,
//! deformation) emits a structured event that pluggable sinks consume.

pub mod bus;
pub mod events;
pub mod sinks;

pub use bus::EventBus;
pub use events::{EventKind, MeshEvent};
pub use sinks::{EventSink, TracingSink, VecSink};
