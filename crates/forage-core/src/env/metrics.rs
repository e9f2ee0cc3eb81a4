use super::{EnvError, ExperimentError, ForageEnv};
use crate::policy::Policy;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StepMetrics {
    pub step: usize,
    pub episode_step: usize,
    pub feed_events: usize,
    pub amount_withdrawn: f64,
    pub reward_total: f32,
    pub depleted_resources: usize,
    pub remaining_capacity: f64,
    pub regrowths: usize,
    pub area_reset: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct AgentSummary {
    pub agent: usize,
    pub amount_obtained: f64,
    pub cumulative_reward: f32,
    pub feed_events: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EpisodeSummary {
    pub episode: usize,
    pub steps: usize,
    pub agents: Vec<AgentSummary>,
    pub remaining_capacity: f64,
    pub depleted_resources: usize,
    pub total_regrowths: usize,
    pub area_resets: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub samples: Vec<StepMetrics>,
}

impl EpisodeSummary {
    pub fn amount_obtained(&self) -> f64 {
        self.agents.iter().map(|a| a.amount_obtained).sum()
    }
}

fn default_schema_version() -> u32 {
    1
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunSummary {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub episodes: Vec<EpisodeSummary>,
    pub total_steps: usize,
    /// Mean over episodes of the amount all agents obtained together.
    pub mean_amount_obtained: f64,
}

impl ForageEnv {
    fn validate_run(
        episodes: usize,
        max_episode_steps: usize,
        sample_every: usize,
    ) -> Result<(), ExperimentError> {
        if sample_every == 0 {
            return Err(ExperimentError::InvalidSampleEvery);
        }
        if max_episode_steps > Self::MAX_EPISODE_STEPS {
            return Err(ExperimentError::TooManySteps {
                max: Self::MAX_EPISODE_STEPS,
                actual: max_episode_steps,
            });
        }
        if episodes > Self::MAX_EPISODES {
            return Err(ExperimentError::TooManyEpisodes {
                max: Self::MAX_EPISODES,
                actual: episodes,
            });
        }
        let per_episode = if max_episode_steps == 0 {
            0
        } else {
            ((max_episode_steps - 1) / sample_every) + 1
        };
        let estimated = per_episode.saturating_mul(episodes);
        if estimated > Self::MAX_SAMPLES {
            return Err(ExperimentError::TooManySamples {
                max: Self::MAX_SAMPLES,
                actual: estimated,
            });
        }
        Ok(())
    }

    pub(crate) fn collect_agent_summaries(&self) -> Vec<AgentSummary> {
        self.agents
            .iter()
            .map(|a| AgentSummary {
                agent: a.index(),
                amount_obtained: a.episode_amount_obtained(),
                cumulative_reward: a.episode_reward(),
                feed_events: a.feed_events(),
            })
            .collect()
    }

    /// Begins an episode and steps it with `policy` until it is done or
    /// `max_episode_steps` have run, sampling every `sample_every` steps
    /// (and always on the last).
    pub fn run_episode<P: Policy + ?Sized>(
        &mut self,
        policy: &mut P,
        max_episode_steps: usize,
        sample_every: usize,
    ) -> Result<EpisodeSummary, EnvError> {
        Self::validate_run(1, max_episode_steps, sample_every)?;
        self.run_episode_unchecked(policy, max_episode_steps, sample_every)
    }

    fn run_episode_unchecked<P: Policy + ?Sized>(
        &mut self,
        policy: &mut P,
        max_episode_steps: usize,
        sample_every: usize,
    ) -> Result<EpisodeSummary, EnvError> {
        let resets_before = self.area_resets;
        let regrowths_before = self.area.total_regrowths();
        let mut observations = self.begin_episode()?;
        let mut samples = Vec::new();

        for step in 1..=max_episode_steps {
            let actions: Vec<_> = self
                .agents
                .iter()
                .zip(&observations)
                .map(|(agent, obs)| policy.act(agent, obs))
                .collect();
            let outcome = self.on_fixed_step(&actions)?;
            let last = outcome.done || step == max_episode_steps;
            if step % sample_every == 0 || last {
                samples.push(outcome.metrics);
            }
            observations = outcome.observations;
            if outcome.done {
                break;
            }
        }

        let summary = EpisodeSummary {
            episode: self.episode_index,
            steps: self.episode_step,
            agents: self.collect_agent_summaries(),
            remaining_capacity: self.area.remaining_capacity(),
            depleted_resources: self.area.depleted_count(),
            total_regrowths: self.area.total_regrowths() - regrowths_before,
            area_resets: self.area_resets - resets_before,
            samples,
        };
        info!(
            episode = summary.episode,
            steps = summary.steps,
            amount = summary.amount_obtained(),
            "episode finished"
        );
        Ok(summary)
    }

    pub fn run_experiment<P: Policy + ?Sized>(
        &mut self,
        episodes: usize,
        max_episode_steps: usize,
        sample_every: usize,
        policy: &mut P,
    ) -> Result<RunSummary, EnvError> {
        Self::validate_run(episodes, max_episode_steps, sample_every)?;
        let mut summaries = Vec::with_capacity(episodes);
        for _ in 0..episodes {
            summaries.push(self.run_episode_unchecked(policy, max_episode_steps, sample_every)?);
        }
        let total_steps = summaries.iter().map(|e| e.steps).sum();
        let mean_amount_obtained = if summaries.is_empty() {
            0.0
        } else {
            summaries.iter().map(EpisodeSummary::amount_obtained).sum::<f64>()
                / summaries.len() as f64
        };
        Ok(RunSummary {
            schema_version: 1,
            episodes: summaries,
            total_steps,
            mean_amount_obtained,
        })
    }
}
