use glam::{DQuat, DVec3, EulerRot};
use serde::{Deserialize, Serialize};

/// Rigid transform (no scale). Rotation is kept normalized.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub translation: DVec3,
    pub rotation: DQuat,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: DVec3::ZERO,
        rotation: DQuat::IDENTITY,
    };

    pub fn new(translation: DVec3, rotation: DQuat) -> Self {
        Self {
            translation,
            rotation: rotation.normalize(),
        }
    }

    pub fn from_translation(translation: DVec3) -> Self {
        Self {
            translation,
            rotation: DQuat::IDENTITY,
        }
    }

    /// `self` applied after `child`: the world transform of a node whose
    /// parent sits at `self`.
    pub fn mul_transform(&self, child: &Transform) -> Transform {
        Transform {
            translation: self.translation + self.rotation * child.translation,
            rotation: (self.rotation * child.rotation).normalize(),
        }
    }

    pub fn transform_point(&self, point: DVec3) -> DVec3 {
        self.translation + self.rotation * point
    }

    pub fn up(&self) -> DVec3 {
        self.rotation * DVec3::Y
    }
}

/// Moves `current` toward `target` by at most `max_delta`.
pub fn move_towards(current: f64, target: f64, max_delta: f64) -> f64 {
    let diff = target - current;
    if diff.abs() <= max_delta {
        target
    } else {
        current + diff.signum() * max_delta
    }
}

/// Rotation from pitch (about X), yaw (about Y) and roll (about Z) in degrees.
/// Roll is applied first, then pitch, then yaw.
pub fn euler_degrees(pitch: f64, yaw: f64, roll: f64) -> DQuat {
    DQuat::from_euler(
        EulerRot::YXZ,
        yaw.to_radians(),
        pitch.to_radians(),
        roll.to_radians(),
    )
}

/// Pitch and yaw (degrees) whose forward axis (`rotation * Z`) points along
/// `direction`. A zero direction yields `(0, 0)`.
pub fn look_angles(direction: DVec3) -> (f64, f64) {
    let dir = direction.normalize_or_zero();
    if dir == DVec3::ZERO {
        return (0.0, 0.0);
    }
    let pitch = (-dir.y).clamp(-1.0, 1.0).asin().to_degrees();
    let yaw = dir.x.atan2(dir.z).to_degrees();
    (pitch, yaw)
}
