//! # aerosurf-mesh
//!
//! Triangle mesh representation with Structure-of-Arrays (SoA) layout,
//! plus the mesh-level algorithms the flow solver depends on.
//!
//! ## Key Types
//!
//! - [`TriangleMesh`] holds node positions, normals, (u, v) parameters and
//!   triangle connectivity in contiguous SoA buffers.
//! - [`Topology`]: Adjacency queries (node-to-triangle, edges, edge neighbors).
//! - [`Permutation`]: Bandwidth-reducing node renumbering (reverse Cuthill–McKee).
//! - [`GridHierarchy`]: Multigrid levels (level 0 = finest) with upwind-edge data.
//! - Procedural generators for test meshes.

pub mod agglomerate;
pub mod generators;
pub mod grid;
pub mod mesh;
pub mod normals;
pub mod reorder;
pub mod topology;

pub use agglomerate::AgglomerationParams;
pub use grid::{GridEdge, GridHierarchy, GridLevel, Loop};
pub use mesh::TriangleMesh;
pub use reorder::Permutation;
pub use topology::Topology;
