//! Strongly-typed identifiers for mesh entities.
//!
//! Newtype wrappers prevent accidental mixing of node, edge and
//! surface numbers.

use serde::{Deserialize, Serialize};

/// Index into the mesh node arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

/// Index into a grid level's edge array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeId(pub u32);

/// Solver-wide surface number stamped on every emitted triangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SurfaceId(pub u32);

impl NodeId {
    /// Returns the raw index as `usize` for array indexing.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl EdgeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl SurfaceId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for NodeId {
    fn from(val: u32) -> Self {
        Self(val)
    }
}

impl From<u32> for EdgeId {
    fn from(val: u32) -> Self {
        Self(val)
    }
}

impl From<u32> for SurfaceId {
    fn from(val: u32) -> Self {
        Self(val)
    }
}
