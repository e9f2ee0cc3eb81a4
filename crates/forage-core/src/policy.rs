use crate::agent::{heuristic_action, Action, ForagingAgent, KeyState, Observation};
use glam::DVec3;

/// Produces one action per agent per fixed step. Learned policies should
/// only read `observation`; scripted ones may inspect the agent itself.
pub trait Policy {
    fn act(&mut self, agent: &ForagingAgent, observation: &Observation) -> Action;
}

impl<F> Policy for F
where
    F: FnMut(&ForagingAgent, &Observation) -> Action,
{
    fn act(&mut self, agent: &ForagingAgent, observation: &Observation) -> Action {
        self(agent, observation)
    }
}

/// Never moves.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdlePolicy;

impl Policy for IdlePolicy {
    fn act(&mut self, _agent: &ForagingAgent, _observation: &Observation) -> Action {
        Action::IDLE
    }
}

/// Scripted baseline: thrusts along the observed mouth-to-target direction,
/// easing off as the normalized distance shrinks.
#[derive(Clone, Copy, Debug)]
pub struct SeekPolicy {
    /// Normalized distance at which thrust starts to taper.
    pub slow_radius: f64,
    pub min_throttle: f64,
}

impl Default for SeekPolicy {
    fn default() -> Self {
        Self {
            slow_radius: 0.05,
            min_throttle: 0.15,
        }
    }
}

impl Policy for SeekPolicy {
    fn act(&mut self, _agent: &ForagingAgent, observation: &Observation) -> Action {
        let direction = DVec3::new(
            f64::from(observation[4]),
            f64::from(observation[5]),
            f64::from(observation[6]),
        );
        if direction == DVec3::ZERO {
            return Action::IDLE;
        }
        let distance = f64::from(observation[9]);
        let throttle = (distance / self.slow_radius).clamp(self.min_throttle, 1.0);
        Action {
            translation: direction * throttle,
            ..Action::IDLE
        }
    }
}

/// Manual control: replays the current key state, steering along the
/// agent's own body axes whether or not it has a target.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeuristicPolicy {
    pub keys: KeyState,
}

impl Policy for HeuristicPolicy {
    fn act(&mut self, agent: &ForagingAgent, _observation: &Observation) -> Action {
        heuristic_action(&self.keys, agent.rotation())
    }
}
