use super::ForagingAgent;
use crate::area::ResourceArea;

/// Length of the observation vector handed to the policy.
pub const OBSERVATION_SIZE: usize = 10;

pub type Observation = [f32; OBSERVATION_SIZE];

impl ForagingAgent {
    /// Encodes the agent's view of its target:
    ///
    /// | idx  | value |
    /// |------|-------|
    /// | 0..4 | rotation quaternion (x, y, z, w) |
    /// | 4..7 | unit direction mouth → target |
    /// | 7    | direction · −target normal (mouth in front of the surface) |
    /// | 8    | forward · −target normal (beak pointing at the surface) |
    /// | 9    | mouth → target distance / area diameter |
    ///
    /// All zeros without a target.
    pub fn observe(&self, area: &ResourceArea) -> Observation {
        let mut obs = [0.0f32; OBSERVATION_SIZE];
        let Some(id) = self.nearest else {
            return obs;
        };
        let target = area.resource(id);

        let rotation = self.rotation().normalize();
        let to_target = target.position() - self.mouth_position();
        let direction = to_target.normalize_or_zero();
        let inward = -target.up().normalize_or_zero();

        obs[0] = rotation.x as f32;
        obs[1] = rotation.y as f32;
        obs[2] = rotation.z as f32;
        obs[3] = rotation.w as f32;
        obs[4] = direction.x as f32;
        obs[5] = direction.y as f32;
        obs[6] = direction.z as f32;
        obs[7] = direction.dot(inward) as f32;
        obs[8] = self.forward().normalize_or_zero().dot(inward) as f32;
        obs[9] = (to_target.length() / area.diameter()) as f32;
        obs
    }
}
