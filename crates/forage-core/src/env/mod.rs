pub mod lifecycle;
pub mod metrics;

pub use lifecycle::{StepOutcome, TargetLine};
pub use metrics::*;

use crate::agent::{ForagingAgent, SpawnError};
use crate::area::{AreaError, ResourceArea};
use crate::config::{ConfigError, ForageConfig};
use crate::layout::generate_scene;
use crate::resource::SurfaceId;
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EnvError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Area(#[from] AreaError),
    #[error(transparent)]
    Spawn(#[from] SpawnError),
    #[error(transparent)]
    Experiment(#[from] ExperimentError),
    #[error("got {actual} actions for {expected} agents")]
    ActionCount { expected: usize, actual: usize },
    #[error("agent index {index} out of range ({count} agents)")]
    NoSuchAgent { index: usize, count: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExperimentError {
    #[error("sample_every must be positive")]
    InvalidSampleEvery,
    #[error("episode steps ({actual}) exceed supported maximum ({max})")]
    TooManySteps { max: usize, actual: usize },
    #[error("episodes ({actual}) exceed supported maximum ({max})")]
    TooManyEpisodes { max: usize, actual: usize },
    #[error("sample count ({actual}) exceeds supported maximum ({max})")]
    TooManySamples { max: usize, actual: usize },
}

/// Headless host: owns one area and its pooled agents, generates contacts,
/// integrates bodies and drives the fixed-step loop.
pub struct ForageEnv {
    pub(crate) config: ForageConfig,
    pub(crate) area: ResourceArea,
    pub(crate) agents: Vec<ForagingAgent>,
    /// Surfaces each agent's mouth touched on the previous fixed step.
    pub(crate) contacts: Vec<Vec<SurfaceId>>,
    pub(crate) rng: ChaCha12Rng,
    pub(crate) step_index: usize,
    pub(crate) episode_step: usize,
    pub(crate) episode_index: usize,
    pub(crate) area_resets: usize,
}

impl ForageEnv {
    pub const MAX_EPISODE_STEPS: usize = 1_000_000;
    pub const MAX_EPISODES: usize = 100_000;
    pub const MAX_SAMPLES: usize = 50_000;

    pub fn new(config: ForageConfig) -> Self {
        Self::try_new(config).unwrap_or_else(|e| panic!("{e}"))
    }

    /// Builds an env over a procedurally generated area.
    pub fn try_new(config: ForageConfig) -> Result<Self, EnvError> {
        config.validate()?;
        // Layout gets its own stream so changing the agent count or spawn
        // settings does not move the plants.
        let mut layout_rng = ChaCha12Rng::seed_from_u64(config.seed.wrapping_add(1));
        let scene = generate_scene(&config.layout, &mut layout_rng);
        let area = ResourceArea::scan(&scene, config.area_diameter, config.fixed_dt)?;
        Self::with_area(config, area)
    }

    /// Builds an env over a host-supplied area.
    pub fn with_area(config: ForageConfig, area: ResourceArea) -> Result<Self, EnvError> {
        config.validate()?;
        let agents = (0..config.num_agents)
            .map(|idx| ForagingAgent::new(idx, &config))
            .collect();
        Ok(Self {
            contacts: vec![Vec::new(); config.num_agents],
            rng: ChaCha12Rng::seed_from_u64(config.seed),
            agents,
            area,
            config,
            step_index: 0,
            episode_step: 0,
            episode_index: 0,
            area_resets: 0,
        })
    }

    pub fn config(&self) -> &ForageConfig {
        &self.config
    }

    pub fn area(&self) -> &ResourceArea {
        &self.area
    }

    pub fn area_mut(&mut self) -> &mut ResourceArea {
        &mut self.area
    }

    pub fn agents(&self) -> &[ForagingAgent] {
        &self.agents
    }

    pub fn agent(&self, index: usize) -> Result<&ForagingAgent, EnvError> {
        self.agents.get(index).ok_or(EnvError::NoSuchAgent {
            index,
            count: self.agents.len(),
        })
    }

    pub fn agent_mut(&mut self, index: usize) -> Result<&mut ForagingAgent, EnvError> {
        let count = self.agents.len();
        self.agents
            .get_mut(index)
            .ok_or(EnvError::NoSuchAgent { index, count })
    }

    pub fn step_index(&self) -> usize {
        self.step_index
    }

    pub fn episode_step(&self) -> usize {
        self.episode_step
    }

    pub fn episode_index(&self) -> usize {
        self.episode_index
    }

    /// Pauses one agent. Panics in training mode.
    pub fn freeze_agent(&mut self, index: usize) -> Result<(), EnvError> {
        self.agent_mut(index)?.freeze();
        Ok(())
    }

    /// Resumes one agent. Panics in training mode.
    pub fn unfreeze_agent(&mut self, index: usize) -> Result<(), EnvError> {
        self.agent_mut(index)?.unfreeze();
        Ok(())
    }
}
