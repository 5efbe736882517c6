//! Geometric tolerances and meshing defaults.

/// Relative coincidence tolerance. Multiplied by the patch reference
/// length (bounding-box diagonal) before use.
pub const DEFAULT_COINCIDENCE_TOLERANCE: f64 = 1.0e-6;

/// Dihedral angle (degrees, between adjacent face normals) at or above
/// which a trailing-edge node is treated as a Kutta node.
pub const DEFAULT_SHARP_EDGE_ANGLE_DEG: f64 = 120.0;

/// Default `MaxNumberOfGridLevels`, counting the fine level.
pub const DEFAULT_MAX_GRID_LEVELS: usize = 6;

/// A coarse level with fewer panels than this ends the hierarchy.
pub const DEFAULT_MIN_COARSE_PANELS: usize = 4;

/// A coarse level keeping more than this fraction of its parent's panels ends the hierarchy.
pub const DEFAULT_MAX_MERGE_RATIO: f64 = 0.75;

/// Minimum cosine between two panel normals for them to be merged.
pub const DEFAULT_MIN_NORMAL_ALIGNMENT: f64 = 0.5;

/// Maximum number of parent panels folded into one coarse panel.
pub const DEFAULT_MAX_AGGLOMERATE_SIZE: usize = 3;

/// Soft limit on control surfaces per surface.
pub const DEFAULT_MAX_CONTROL_SURFACES: usize = 100;
