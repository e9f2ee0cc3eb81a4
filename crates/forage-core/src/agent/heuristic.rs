use super::Action;
use glam::{DQuat, DVec3};

/// Keyboard state for manual control.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeyState {
    /// W
    pub forward: bool,
    /// S
    pub backward: bool,
    /// A
    pub left: bool,
    /// D
    pub right: bool,
    /// E
    pub up: bool,
    /// C
    pub down: bool,
    /// Up arrow
    pub pitch_up: bool,
    /// Down arrow
    pub pitch_down: bool,
    /// Left arrow
    pub yaw_left: bool,
    /// Right arrow
    pub yaw_right: bool,
}

fn axis(positive: bool, negative: bool) -> f64 {
    if positive {
        1.0
    } else if negative {
        -1.0
    } else {
        0.0
    }
}

/// Translates keys into the same action vector a policy produces. Movement
/// follows the agent's own axes and is normalized; within each key pair the
/// first-listed key wins.
pub fn heuristic_action(keys: &KeyState, rotation: DQuat) -> Action {
    let forward = rotation * DVec3::Z * axis(keys.forward, keys.backward);
    let right = rotation * DVec3::X * -axis(keys.left, keys.right);
    let up = rotation * DVec3::Y * axis(keys.up, keys.down);
    Action {
        translation: (forward + right + up).normalize_or_zero(),
        pitch: axis(keys.pitch_up, keys.pitch_down),
        yaw: -axis(keys.yaw_left, keys.yaw_right),
    }
}
