//! Ground-effect analysis parameters.

use aerosurf_math::{DQuat, DVec3, RigidTransform};
use serde::{Deserialize, Serialize};

/// Attitude and height used to place a component above the ground plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroundEffects {
    pub enabled: bool,
    /// Rotation about the Y axis through the CG, degrees.
    pub rotation_angle_deg: f64,
    pub cg_location: DVec3,
    /// Target height of the CG above `z = 0`.
    pub height_above_ground: f64,
}

impl Default for GroundEffects {
    fn default() -> Self {
        Self {
            enabled: false,
            rotation_angle_deg: 0.0,
            cg_location: DVec3::ZERO,
            height_above_ground: 0.0,
        }
    }
}

impl GroundEffects {
    /// Rotation about Y through the CG followed by the vertical move that
    /// puts the CG at the configured height.
    pub fn placement(&self) -> RigidTransform {
        let q = DQuat::from_rotation_y(self.rotation_angle_deg.to_radians());
        let lift = DVec3::new(0.0, 0.0, self.height_above_ground - self.cg_location.z);
        RigidTransform::from_rotation(lift, self.cg_location, q)
    }
}
