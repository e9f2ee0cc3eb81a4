use glam::DVec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::resource::Rgb;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{field} must be finite and positive (got {value})")]
    NotPositive { field: &'static str, value: f64 },
    #[error("{field} must be finite and non-negative (got {value})")]
    Negative { field: &'static str, value: f64 },
    #[error("{field} range is empty or inverted ({min}..{max})")]
    InvalidRange {
        field: &'static str,
        min: f64,
        max: f64,
    },
    #[error("num_agents must be at least 1")]
    NoAgents,
    #[error("num_agents ({actual}) exceeds supported maximum ({max})")]
    TooManyAgents { max: usize, actual: usize },
    #[error("spawn.max_attempts must be at least 1")]
    NoSpawnAttempts,
    #[error("invalid config json: {0}")]
    Json(String),
}

/// Inclusive `[min, max]` interval.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }

    fn validate(&self, field: &'static str) -> Result<(), ConfigError> {
        if !self.min.is_finite() || !self.max.is_finite() || self.min > self.max {
            return Err(ConfigError::InvalidRange {
                field,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    pub max_attempts: usize,
    /// Nothing may lie within this radius of a candidate position.
    pub clearance: f64,
    pub front_distance: Range,
    pub height: Range,
    pub radius: Range,
    pub max_start_pitch_degrees: f64,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            max_attempts: 100,
            clearance: 0.05,
            front_distance: Range::new(0.1, 0.2),
            height: Range::new(1.2, 2.5),
            radius: Range::new(2.0, 7.0),
            max_start_pitch_degrees: 60.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub move_force: f64,
    pub pitch_speed: f64,
    pub yaw_speed: f64,
    pub max_pitch_degrees: f64,
    /// Largest change of a smoothed turn rate per second.
    pub rate_smoothing: f64,
    /// Mouth (beak tip) position in body space.
    pub mouth_offset: DVec3,
    pub mass: f64,
    pub linear_damping: f64,
    /// Restrict targeting to resources whose height lies in this band.
    pub height_band: Option<Range>,
    pub spawn: SpawnConfig,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            move_force: 2.0,
            pitch_speed: 100.0,
            yaw_speed: 100.0,
            max_pitch_degrees: 80.0,
            rate_smoothing: 2.0,
            mouth_offset: DVec3::new(0.0, 0.0, 0.1),
            mass: 1.0,
            linear_damping: 1.0,
            height_band: None,
            spawn: SpawnConfig::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedingConfig {
    /// Contacts whose closest point is this far or farther from the mouth are ignored.
    pub beak_tip_radius: f64,
    pub feed_amount: f64,
    pub base_reward: f64,
    pub alignment_bonus: f64,
    pub mouth_collider_radius: f64,
}

impl Default for FeedingConfig {
    fn default() -> Self {
        Self {
            beak_tip_radius: 0.008,
            feed_amount: 0.01,
            base_reward: 0.01,
            alignment_bonus: 0.02,
            mouth_collider_radius: 0.02,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub plants: usize,
    pub resources_per_plant: usize,
    pub plant_radius: Range,
    pub resource_height: Range,
    pub stem_offset: Range,
    pub surface_radius: f64,
    pub regrow_delay_seconds: Option<f64>,
    pub full_color: Rgb,
    pub empty_color: Rgb,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            plants: 6,
            resources_per_plant: 3,
            plant_radius: Range::new(2.0, 7.0),
            resource_height: Range::new(1.2, 2.5),
            stem_offset: Range::new(0.1, 0.3),
            surface_radius: 0.05,
            regrow_delay_seconds: None,
            full_color: Rgb([1.0, 0.0, 0.3]),
            empty_color: Rgb([0.5, 0.0, 1.0]),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForageConfig {
    pub seed: u64,
    pub fixed_dt: f64,
    pub num_agents: usize,
    pub training_mode: bool,
    /// Episode length in training mode; 0 plays forever.
    pub max_steps: usize,
    pub area_diameter: f64,
    pub reset_area_when_first_depleted: bool,
    pub agent: AgentConfig,
    pub feeding: FeedingConfig,
    pub layout: LayoutConfig,
}

impl Default for ForageConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            fixed_dt: 0.02,
            num_agents: 1,
            training_mode: false,
            max_steps: 5000,
            area_diameter: 20.0,
            reset_area_when_first_depleted: false,
            agent: AgentConfig::default(),
            feeding: FeedingConfig::default(),
            layout: LayoutConfig::default(),
        }
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}

impl ForageConfig {
    pub const MAX_AGENTS: usize = 1024;

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Json(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("fixed_dt", self.fixed_dt)?;
        positive("area_diameter", self.area_diameter)?;
        if self.num_agents == 0 {
            return Err(ConfigError::NoAgents);
        }
        if self.num_agents > Self::MAX_AGENTS {
            return Err(ConfigError::TooManyAgents {
                max: Self::MAX_AGENTS,
                actual: self.num_agents,
            });
        }

        let agent = &self.agent;
        non_negative("agent.move_force", agent.move_force)?;
        non_negative("agent.pitch_speed", agent.pitch_speed)?;
        non_negative("agent.yaw_speed", agent.yaw_speed)?;
        if !(agent.max_pitch_degrees.is_finite()
            && agent.max_pitch_degrees > 0.0
            && agent.max_pitch_degrees < 90.0)
        {
            return Err(ConfigError::InvalidRange {
                field: "agent.max_pitch_degrees",
                min: 0.0,
                max: agent.max_pitch_degrees,
            });
        }
        positive("agent.rate_smoothing", agent.rate_smoothing)?;
        positive("agent.mass", agent.mass)?;
        non_negative("agent.linear_damping", agent.linear_damping)?;
        if let Some(band) = agent.height_band {
            band.validate("agent.height_band")?;
        }

        let spawn = &agent.spawn;
        if spawn.max_attempts == 0 {
            return Err(ConfigError::NoSpawnAttempts);
        }
        non_negative("agent.spawn.clearance", spawn.clearance)?;
        spawn.front_distance.validate("agent.spawn.front_distance")?;
        spawn.height.validate("agent.spawn.height")?;
        spawn.radius.validate("agent.spawn.radius")?;
        non_negative(
            "agent.spawn.max_start_pitch_degrees",
            spawn.max_start_pitch_degrees,
        )?;

        let feeding = &self.feeding;
        positive("feeding.beak_tip_radius", feeding.beak_tip_radius)?;
        non_negative("feeding.feed_amount", feeding.feed_amount)?;
        non_negative("feeding.base_reward", feeding.base_reward)?;
        non_negative("feeding.alignment_bonus", feeding.alignment_bonus)?;
        non_negative("feeding.mouth_collider_radius", feeding.mouth_collider_radius)?;

        let layout = &self.layout;
        layout.plant_radius.validate("layout.plant_radius")?;
        layout.resource_height.validate("layout.resource_height")?;
        layout.stem_offset.validate("layout.stem_offset")?;
        positive("layout.surface_radius", layout.surface_radius)?;
        if let Some(delay) = layout.regrow_delay_seconds {
            non_negative("layout.regrow_delay_seconds", delay)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(ForageConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_zero_dt() {
        let config = ForageConfig {
            fixed_dt: 0.0,
            ..ForageConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotPositive {
                field: "fixed_dt",
                ..
            })
        ));
    }

    #[test]
    fn rejects_inverted_height_band() {
        let mut config = ForageConfig::default();
        config.agent.height_band = Some(Range::new(2.0, 1.0));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidRange { .. })
        ));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config =
            ForageConfig::from_json_str(r#"{"training_mode": true, "feeding": {"feed_amount": 0.05}}"#)
                .expect("valid json");
        assert!(config.training_mode);
        assert_eq!(config.feeding.feed_amount, 0.05);
        assert_eq!(config.feeding.beak_tip_radius, 0.008);
        assert_eq!(config.num_agents, 1);
    }

    #[test]
    fn malformed_json_is_reported() {
        assert!(matches!(
            ForageConfig::from_json_str("{not json"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn height_band_is_inclusive() {
        let band = Range::new(1.0, 2.0);
        assert!(band.contains(1.0));
        assert!(band.contains(2.0));
        assert!(!band.contains(2.000_001));
    }
}
