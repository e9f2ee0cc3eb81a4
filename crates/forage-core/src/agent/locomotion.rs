use super::ForagingAgent;
use crate::math::move_towards;
use glam::DVec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Length of the action vector: 0 = x, 1 = y, 2 = z, 3 = pitch, 4 = yaw.
pub const ACTION_SIZE: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("action vector has {actual} components, expected {expected}", expected = ACTION_SIZE)]
    WrongLength { actual: usize },
}

/// One step's instruction, every component in `[-1, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// World-space translation instruction.
    pub translation: DVec3,
    /// +1 pitches the nose down, -1 up.
    pub pitch: f64,
    /// +1 turns right, -1 left.
    pub yaw: f64,
}

impl Action {
    pub const IDLE: Self = Self {
        translation: DVec3::ZERO,
        pitch: 0.0,
        yaw: 0.0,
    };

    /// Components outside `[-1, 1]` are clipped, non-finite ones zeroed.
    pub fn from_array(values: [f32; ACTION_SIZE]) -> Self {
        let clip = |v: f32| {
            if v.is_finite() {
                f64::from(v).clamp(-1.0, 1.0)
            } else {
                0.0
            }
        };
        Self {
            translation: DVec3::new(clip(values[0]), clip(values[1]), clip(values[2])),
            pitch: clip(values[3]),
            yaw: clip(values[4]),
        }
    }

    pub fn try_from_slice(values: &[f32]) -> Result<Self, ActionError> {
        let array: [f32; ACTION_SIZE] = values
            .try_into()
            .map_err(|_| ActionError::WrongLength {
                actual: values.len(),
            })?;
        Ok(Self::from_array(array))
    }

    pub fn to_array(&self) -> [f32; ACTION_SIZE] {
        [
            self.translation.x as f32,
            self.translation.y as f32,
            self.translation.z as f32,
            self.pitch as f32,
            self.yaw as f32,
        ]
    }
}

impl ForagingAgent {
    /// Applies one action over a fixed step of `dt` seconds. Frozen agents
    /// ignore actions entirely.
    pub fn apply_action(&mut self, action: &Action, dt: f64) {
        if self.frozen {
            return;
        }
        self.body
            .add_force(action.translation * self.config.move_force);

        let max_rate_change = self.config.rate_smoothing * dt;
        self.smoothed_pitch_rate =
            move_towards(self.smoothed_pitch_rate, action.pitch, max_rate_change);
        self.smoothed_yaw_rate = move_towards(self.smoothed_yaw_rate, action.yaw, max_rate_change);

        let max_pitch = self.config.max_pitch_degrees;
        self.pitch = (self.pitch + self.smoothed_pitch_rate * dt * self.config.pitch_speed)
            .clamp(-max_pitch, max_pitch);
        self.yaw += self.smoothed_yaw_rate * dt * self.config.yaw_speed;
    }
}
