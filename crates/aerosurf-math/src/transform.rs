//! Rigid-body transform expressed as a quaternion sandwich.
//!
//! Points map as `p' = q·(p − O)·q⁻¹ + O + T`; direction vectors only see
//! the rotation. The inverse quaternion is stored as supplied by the caller
//! so that externally composed rotations are applied exactly as given.

use glam::{DQuat, DVec3};
use serde::{Deserialize, Serialize};

/// Translation about an origin plus a rotation and its inverse.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RigidTransform {
    /// Translation applied after rotation.
    pub translation: DVec3,
    /// Centre of rotation.
    pub origin: DVec3,
    /// Rotation quaternion `q`.
    pub rotation: DQuat,
    /// Inverse rotation `q⁻¹`.
    pub inverse: DQuat,
}

impl RigidTransform {
    /// Identity transform.
    pub const IDENTITY: Self = Self {
        translation: DVec3::ZERO,
        origin: DVec3::ZERO,
        rotation: DQuat::IDENTITY,
        inverse: DQuat::IDENTITY,
    };

    /// Creates a transform from a caller-supplied rotation/inverse pair.
    pub fn new(translation: DVec3, origin: DVec3, rotation: DQuat, inverse: DQuat) -> Self {
        Self {
            translation,
            origin,
            rotation,
            inverse,
        }
    }

    /// Creates a transform, deriving the inverse from `rotation`.
    pub fn from_rotation(translation: DVec3, origin: DVec3, rotation: DQuat) -> Self {
        Self::new(translation, origin, rotation, rotation.inverse())
    }

    /// Pure translation.
    pub fn translation(translation: DVec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    /// Rotation by `angle` radians about the Y axis through `origin`.
    pub fn rotation_about_y(angle: f64, origin: DVec3) -> Self {
        Self::from_rotation(DVec3::ZERO, origin, DQuat::from_rotation_y(angle))
    }

    /// Rotates a direction vector (`q·v·q⁻¹`).
    #[inline]
    pub fn apply_vector(&self, v: DVec3) -> DVec3 {
        let pure = DQuat::from_xyzw(v.x, v.y, v.z, 0.0);
        let r = self.rotation * pure * self.inverse;
        DVec3::new(r.x, r.y, r.z)
    }

    /// Transforms a point.
    #[inline]
    pub fn apply_point(&self, p: DVec3) -> DVec3 {
        self.apply_vector(p - self.origin) + self.origin + self.translation
    }
}

impl Default for RigidTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}
