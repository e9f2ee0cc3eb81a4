use super::metrics::StepMetrics;
use super::{EnvError, ForageEnv};
use crate::agent::{Action, Contact, ContactPhase, Observation};
use crate::resource::SurfaceId;
use glam::DVec3;
use rayon::prelude::*;
use tracing::{debug, info};

#[derive(Clone, Debug)]
pub struct StepOutcome {
    pub observations: Vec<Observation>,
    /// Reward each agent earned during this step.
    pub rewards: Vec<f32>,
    /// The episode hit its step limit; the host should begin a new one.
    pub done: bool,
    pub metrics: StepMetrics,
}

/// Mouth-to-target segment for the host's debug overlay.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TargetLine {
    pub agent: usize,
    pub from: DVec3,
    pub to: DVec3,
}

#[derive(Clone, Copy, Debug, Default)]
struct ContactTally {
    feed_events: usize,
    amount: f64,
}

impl ForageEnv {
    /// Starts the first episode.
    pub fn initialize(&mut self) -> Result<Vec<Observation>, EnvError> {
        self.begin_episode()
    }

    /// Resets the area (training mode only, once for all agents), then
    /// respawns every agent clear of the ones already placed.
    pub fn begin_episode(&mut self) -> Result<Vec<Observation>, EnvError> {
        if self.config.training_mode {
            self.area.reset_all(&mut self.rng);
        }
        let mut placed: Vec<DVec3> = Vec::with_capacity(self.agents.len());
        for agent in &mut self.agents {
            agent.begin_episode(&self.area, &placed, &mut self.rng)?;
            placed.push(agent.position());
        }
        for contacts in &mut self.contacts {
            contacts.clear();
        }
        self.episode_step = 0;
        self.episode_index += 1;
        info!(
            episode = self.episode_index,
            agents = self.agents.len(),
            resources = self.area.len(),
            "episode begun"
        );
        Ok(self.observe_all())
    }

    /// One fixed simulation step. `actions[i]` drives agent `i`.
    pub fn on_fixed_step(&mut self, actions: &[Action]) -> Result<StepOutcome, EnvError> {
        if actions.len() != self.agents.len() {
            return Err(EnvError::ActionCount {
                expected: self.agents.len(),
                actual: actions.len(),
            });
        }
        self.step_index = self.step_index.saturating_add(1);
        self.episode_step = self.episode_step.saturating_add(1);
        let dt = self.config.fixed_dt;

        self.step_action_phase(actions, dt);
        let (regrowths, area_reset) = self.step_area_phase();
        let tally = self.step_contact_phase();
        for agent in &mut self.agents {
            agent.on_fixed_step(&self.area);
        }

        let observations = self.observe_all();
        let rewards: Vec<f32> = self.agents.iter_mut().map(|a| a.take_reward()).collect();
        let done = self.config.training_mode
            && self.config.max_steps > 0
            && self.episode_step >= self.config.max_steps;

        let metrics = StepMetrics {
            step: self.step_index,
            episode_step: self.episode_step,
            feed_events: tally.feed_events,
            amount_withdrawn: tally.amount,
            reward_total: rewards.iter().sum(),
            depleted_resources: self.area.depleted_count(),
            remaining_capacity: self.area.remaining_capacity(),
            regrowths,
            area_reset,
        };
        if done {
            info!(
                episode = self.episode_index,
                steps = self.episode_step,
                "episode reached step limit"
            );
        }
        Ok(StepOutcome {
            observations,
            rewards,
            done,
            metrics,
        })
    }

    /// Per-frame read-only view: one line from each agent's mouth to its
    /// current target.
    pub fn on_frame(&self) -> Vec<TargetLine> {
        self.agents
            .iter()
            .filter_map(|agent| {
                agent.nearest_resource().map(|id| TargetLine {
                    agent: agent.index(),
                    from: agent.mouth_position(),
                    to: self.area.resource(id).position(),
                })
            })
            .collect()
    }

    pub fn observe_all(&self) -> Vec<Observation> {
        let area = &self.area;
        self.agents.par_iter().map(|agent| agent.observe(area)).collect()
    }

    fn step_action_phase(&mut self, actions: &[Action], dt: f64) {
        for (agent, action) in self.agents.iter_mut().zip(actions) {
            agent.apply_action(action, dt);
            agent.body_mut().integrate(dt);
        }
    }

    /// Advances regrow timers and applies the optional depletion-triggered
    /// area reset.
    fn step_area_phase(&mut self) -> (usize, bool) {
        let regrowths = self.area.on_fixed_step();
        let mut reset = false;
        if self.config.reset_area_when_first_depleted && self.area.first_depleted() {
            self.area.reset_all(&mut self.rng);
            self.area_resets += 1;
            reset = true;
            debug!(step = self.step_index, "area reset after first resource emptied");
        }
        (regrowths, reset)
    }

    /// Derives enter/stay/exit events from mouth overlaps and feeds them to
    /// each agent in index order.
    fn step_contact_phase(&mut self) -> ContactTally {
        let mouth_radius = self.config.feeding.mouth_collider_radius;
        let mut tally = ContactTally::default();

        for (agent, previous) in self.agents.iter_mut().zip(self.contacts.iter_mut()) {
            let mouth = agent.mouth_position();
            let touching = self
                .area
                .surface_index()
                .overlapping(self.area.resources(), mouth, mouth_radius);
            let current: Vec<SurfaceId> = touching
                .iter()
                .map(|id| self.area.resource(*id).surface())
                .collect();

            for surface in previous.iter().filter(|s| !current.contains(*s)) {
                let exit = Contact {
                    surface: *surface,
                    phase: ContactPhase::Exit,
                    closest_point: mouth,
                };
                agent.on_contact(&mut self.area, &exit);
            }

            for (id, surface) in touching.iter().zip(&current) {
                let phase = if previous.contains(surface) {
                    ContactPhase::Stay
                } else {
                    ContactPhase::Enter
                };
                let contact = Contact {
                    surface: *surface,
                    phase,
                    closest_point: self.area.resource(*id).closest_point(mouth),
                };
                if let Some(outcome) = agent.on_contact(&mut self.area, &contact) {
                    tally.feed_events += 1;
                    tally.amount += outcome.amount;
                }
            }
            *previous = current;
        }
        tally
    }
}
