//! Foraging core: depletable resources, the area that owns them, and agents
//! that seek, feed on and are rewarded for them.
//!
//! Everything here is driven by a host loop through explicit calls
//! (`initialize`, `on_fixed_step`, `on_frame`); the crate never assumes a
//! particular engine. [`env::ForageEnv`] is a headless host that generates
//! contacts and integrates bodies itself.

pub mod agent;
pub mod area;
pub mod body;
pub mod config;
pub mod env;
pub mod layout;
pub mod math;
pub mod policy;
pub mod resource;
pub mod spatial;

pub use agent::{Action, ForagingAgent, Observation, ACTION_SIZE, OBSERVATION_SIZE};
pub use area::{AreaBuilder, PlantId, ResourceArea};
pub use config::ForageConfig;
pub use env::ForageEnv;
pub use resource::{Resource, ResourceId, SurfaceId};
