//! Meshing configuration.
//!
//! Tolerances, angle thresholds and multigrid controls. Loaded from TOML or
//! built from presets; every value is checked by [`MeshConfig::validate`]
//! before a surface uses it.

use std::path::Path;

use aerosurf_math::DVec3;
use aerosurf_mesh::AgglomerationParams;
use aerosurf_types::constants::{
    DEFAULT_COINCIDENCE_TOLERANCE, DEFAULT_MAX_AGGLOMERATE_SIZE, DEFAULT_MAX_CONTROL_SURFACES,
    DEFAULT_MAX_GRID_LEVELS, DEFAULT_MAX_MERGE_RATIO, DEFAULT_MIN_COARSE_PANELS,
    DEFAULT_MIN_NORMAL_ALIGNMENT, DEFAULT_SHARP_EDGE_ANGLE_DEG,
};
use aerosurf_types::{AeroError, AeroResult};
use serde::{Deserialize, Serialize};

/// Configuration for building and updating one surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshConfig {
    /// Relative coincidence tolerance, scaled by the patch reference length.
    pub coincidence_tolerance: f64,

    /// Face-normal angle (degrees) at or above which a trailing edge is sharp.
    pub sharp_edge_angle_deg: f64,

    /// Free-stream direction for upwind classification.
    pub flow_direction: [f64; 3],

    /// Maximum number of grid levels, counting the fine level.
    pub max_grid_levels: usize,

    /// A coarse level with fewer panels ends the hierarchy.
    pub min_coarse_panels: usize,

    /// A coarse level keeping more than this fraction of its parent's panels ends the hierarchy.
    pub max_merge_ratio: f64,

    /// Minimum normal cosine for two panels to merge.
    pub min_normal_alignment: f64,

    /// Maximum number of parent panels merged into one coarse panel.
    pub max_agglomerate_size: usize,

    /// Run the bandwidth-reducing node reorder.
    pub reorder_nodes: bool,

    /// Soft limit on control surfaces per surface.
    pub max_control_surfaces: usize,

    /// Gauss–Newton iterations for inverse deformation.
    pub undeform_max_iterations: u32,

    /// Convergence tolerance on the parametric Gauss–Newton step.
    pub undeform_tolerance: f64,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            coincidence_tolerance: DEFAULT_COINCIDENCE_TOLERANCE,
            sharp_edge_angle_deg: DEFAULT_SHARP_EDGE_ANGLE_DEG,
            flow_direction: [1.0, 0.0, 0.0],
            max_grid_levels: DEFAULT_MAX_GRID_LEVELS,
            min_coarse_panels: DEFAULT_MIN_COARSE_PANELS,
            max_merge_ratio: DEFAULT_MAX_MERGE_RATIO,
            min_normal_alignment: DEFAULT_MIN_NORMAL_ALIGNMENT,
            max_agglomerate_size: DEFAULT_MAX_AGGLOMERATE_SIZE,
            reorder_nodes: true,
            max_control_surfaces: DEFAULT_MAX_CONTROL_SURFACES,
            undeform_max_iterations: 30,
            undeform_tolerance: 1e-10,
        }
    }
}

impl MeshConfig {
    /// Fine mesh only, no multigrid levels.
    pub fn single_level() -> Self {
        Self {
            max_grid_levels: 1,
            ..Default::default()
        }
    }

    /// Deeper hierarchy that keeps coarsening down to very few panels.
    pub fn fine_hierarchy() -> Self {
        Self {
            max_grid_levels: 10,
            min_coarse_panels: 2,
            ..Default::default()
        }
    }

    /// Parses a TOML document; missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> AeroResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| AeroError::Serialization(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> AeroResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> AeroResult<String> {
        toml::to_string(self).map_err(|e| AeroError::Serialization(e.to_string()))
    }

    /// Unit free-stream direction.
    pub fn flow_direction(&self) -> DVec3 {
        DVec3::from_array(self.flow_direction).normalize_or_zero()
    }

    /// Coarsening controls derived from this configuration.
    pub fn agglomeration_params(&self) -> AgglomerationParams {
        AgglomerationParams {
            max_levels: self.max_grid_levels,
            min_coarse_panels: self.min_coarse_panels,
            max_merge_ratio: self.max_merge_ratio,
            min_normal_alignment: self.min_normal_alignment,
            max_agglomerate_size: self.max_agglomerate_size,
        }
    }

    pub fn validate(&self) -> AeroResult<()> {
        fn invalid(msg: String) -> AeroResult<()> {
            Err(AeroError::InvalidConfig(msg))
        }

        if !(self.coincidence_tolerance > 0.0 && self.coincidence_tolerance < 1.0) {
            return invalid(format!(
                "coincidence_tolerance must lie in (0, 1), got {}",
                self.coincidence_tolerance
            ));
        }
        if !(self.sharp_edge_angle_deg > 0.0 && self.sharp_edge_angle_deg <= 180.0) {
            return invalid(format!(
                "sharp_edge_angle_deg must lie in (0, 180], got {}",
                self.sharp_edge_angle_deg
            ));
        }
        if !self.flow_direction.iter().all(|c| c.is_finite())
            || self.flow_direction().length_squared() == 0.0
        {
            return invalid("flow_direction must be a finite non-zero vector".into());
        }
        if self.max_grid_levels == 0 {
            return invalid("max_grid_levels must be at least 1".into());
        }
        if !(self.max_merge_ratio > 0.0 && self.max_merge_ratio <= 1.0) {
            return invalid(format!(
                "max_merge_ratio must lie in (0, 1], got {}",
                self.max_merge_ratio
            ));
        }
        if !(-1.0..=1.0).contains(&self.min_normal_alignment) {
            return invalid(format!(
                "min_normal_alignment must lie in [-1, 1], got {}",
                self.min_normal_alignment
            ));
        }
        if self.max_agglomerate_size < 2 {
            return invalid("max_agglomerate_size must be at least 2".into());
        }
        if self.undeform_max_iterations == 0 || !(self.undeform_tolerance > 0.0) {
            return invalid("undeform iteration controls must be positive".into());
        }
        Ok(())
    }
}
