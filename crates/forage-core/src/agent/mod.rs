mod feeding;
mod heuristic;
mod locomotion;
mod observation;
mod spawn;
mod targeting;
#[cfg(test)]
mod tests;

pub use feeding::{Contact, ContactPhase, FeedOutcome, MouthContact};
pub use heuristic::{heuristic_action, KeyState};
pub use locomotion::{Action, ActionError, ACTION_SIZE};
pub use observation::{Observation, OBSERVATION_SIZE};
pub use spawn::{find_safe_spawn, SpawnError, SpawnPose};

use crate::area::ResourceArea;
use crate::body::RigidBody;
use crate::config::{AgentConfig, FeedingConfig, ForageConfig};
use crate::math::euler_degrees;
use crate::resource::ResourceId;
use glam::{DQuat, DVec3};
use rand::Rng;
use tracing::info;

/// A mobile forager. Pooled across episodes: [`ForagingAgent::begin_episode`]
/// resets its per-episode state instead of recreating it.
#[derive(Clone, Debug)]
pub struct ForagingAgent {
    index: usize,
    config: AgentConfig,
    feeding: FeedingConfig,
    training_mode: bool,
    body: RigidBody,
    /// Degrees, clamped to `±max_pitch_degrees`.
    pitch: f64,
    /// Degrees, unbounded.
    yaw: f64,
    smoothed_pitch_rate: f64,
    smoothed_yaw_rate: f64,
    episode_amount_obtained: f64,
    nearest: Option<ResourceId>,
    frozen: bool,
    pending_reward: f32,
    episode_reward: f32,
    feed_events: usize,
    mouth: MouthContact,
}

impl ForagingAgent {
    pub fn new(index: usize, config: &ForageConfig) -> Self {
        Self {
            index,
            config: config.agent.clone(),
            feeding: config.feeding.clone(),
            training_mode: config.training_mode,
            body: RigidBody::new(DVec3::ZERO, config.agent.mass, config.agent.linear_damping),
            pitch: 0.0,
            yaw: 0.0,
            smoothed_pitch_rate: 0.0,
            smoothed_yaw_rate: 0.0,
            episode_amount_obtained: 0.0,
            nearest: None,
            frozen: false,
            pending_reward: 0.0,
            episode_reward: 0.0,
            feed_events: 0,
            mouth: MouthContact::default(),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn training_mode(&self) -> bool {
        self.training_mode
    }

    pub fn body(&self) -> &RigidBody {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut RigidBody {
        &mut self.body
    }

    pub fn position(&self) -> DVec3 {
        self.body.position
    }

    pub fn pitch(&self) -> f64 {
        self.pitch
    }

    pub fn yaw(&self) -> f64 {
        self.yaw
    }

    pub fn smoothed_rates(&self) -> (f64, f64) {
        (self.smoothed_pitch_rate, self.smoothed_yaw_rate)
    }

    pub fn rotation(&self) -> DQuat {
        euler_degrees(self.pitch, self.yaw, 0.0)
    }

    pub fn forward(&self) -> DVec3 {
        self.rotation() * DVec3::Z
    }

    pub fn mouth_position(&self) -> DVec3 {
        self.body.position + self.rotation() * self.config.mouth_offset
    }

    pub fn nearest_resource(&self) -> Option<ResourceId> {
        self.nearest
    }

    pub fn episode_amount_obtained(&self) -> f64 {
        self.episode_amount_obtained
    }

    pub fn episode_reward(&self) -> f32 {
        self.episode_reward
    }

    pub fn feed_events(&self) -> usize {
        self.feed_events
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn touching_food(&self) -> bool {
        self.mouth.touching_food()
    }

    pub fn add_reward(&mut self, reward: f32) {
        self.pending_reward += reward;
        self.episode_reward += reward;
    }

    /// Reward accumulated since the last call.
    pub fn take_reward(&mut self) -> f32 {
        std::mem::take(&mut self.pending_reward)
    }

    /// Places the agent, keeping its pitch inside the allowed band.
    pub fn teleport(&mut self, pose: SpawnPose) {
        let max = self.config.max_pitch_degrees;
        self.body.position = pose.position;
        self.pitch = pose.pitch.clamp(-max, max);
        self.yaw = pose.yaw;
    }

    /// Clears per-episode state, spawns at a safe position and picks the
    /// nearest resource. `occupied` lists other agents' positions.
    ///
    /// The area itself is reset by the host, once per area.
    pub fn begin_episode<R: Rng + ?Sized>(
        &mut self,
        area: &ResourceArea,
        occupied: &[DVec3],
        rng: &mut R,
    ) -> Result<(), SpawnError> {
        self.episode_amount_obtained = 0.0;
        self.episode_reward = 0.0;
        self.pending_reward = 0.0;
        self.feed_events = 0;
        self.smoothed_pitch_rate = 0.0;
        self.smoothed_yaw_rate = 0.0;
        self.mouth = MouthContact::default();
        self.body.stop();

        // Training spawns in front of a resource half of the time.
        let in_front = !self.training_mode || rng.random::<f64>() > 0.5;
        let pose = find_safe_spawn(area, &self.config.spawn, in_front, occupied, rng)?;
        self.teleport(pose);

        self.nearest = None;
        self.update_nearest_resource(area);
        info!(
            agent = self.index,
            in_front,
            nearest = ?self.nearest,
            "episode started"
        );
        Ok(())
    }

    /// Stops acting and puts the body to sleep.
    ///
    /// # Panics
    /// In training mode.
    pub fn freeze(&mut self) {
        assert!(
            !self.training_mode,
            "freeze/unfreeze is not supported in training mode"
        );
        self.frozen = true;
        self.body.sleep();
    }

    /// # Panics
    /// In training mode.
    pub fn unfreeze(&mut self) {
        assert!(
            !self.training_mode,
            "freeze/unfreeze is not supported in training mode"
        );
        self.frozen = false;
        self.body.wake_up();
    }

    /// Per-fixed-step maintenance: re-targets once the current target is
    /// gone, empty or no longer inside the height band.
    pub fn on_fixed_step(&mut self, area: &ResourceArea) {
        let stale = match self.nearest {
            Some(id) => !self.is_candidate(area.resource(id)),
            None => true,
        };
        if stale {
            self.update_nearest_resource(area);
        }
    }
}
