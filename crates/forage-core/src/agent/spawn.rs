use crate::area::ResourceArea;
use crate::config::SpawnConfig;
use crate::math::{euler_degrees, look_angles};
use glam::DVec3;
use rand::Rng;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpawnError {
    #[error("cannot spawn in front of a resource: the area has none")]
    NoResources,
    #[error("no safe spawn position found after {attempts} attempts")]
    NoSafePosition { attempts: usize },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnPose {
    pub position: DVec3,
    /// Degrees.
    pub pitch: f64,
    /// Degrees.
    pub yaw: f64,
}

/// Picks a collision-free starting pose, retrying at most
/// `config.max_attempts` times.
///
/// In front: 0.1–0.2 out along a random resource's normal, looking at it.
/// Otherwise: a random point on a ring around the area origin with random
/// pitch and yaw. A candidate is safe when no feeding surface and no
/// position in `occupied` lies within `config.clearance`.
pub fn find_safe_spawn<R: Rng + ?Sized>(
    area: &ResourceArea,
    config: &SpawnConfig,
    in_front: bool,
    occupied: &[DVec3],
    rng: &mut R,
) -> Result<SpawnPose, SpawnError> {
    if in_front && area.is_empty() {
        return Err(SpawnError::NoResources);
    }

    for _ in 0..config.max_attempts {
        let pose = if in_front {
            let target = &area.resources()[rng.random_range(0..area.len())];
            let distance =
                rng.random_range(config.front_distance.min..=config.front_distance.max);
            let position = target.position() + target.up() * distance;
            let (pitch, yaw) = look_angles(target.position() - position);
            SpawnPose {
                position,
                pitch,
                yaw,
            }
        } else {
            let height = rng.random_range(config.height.min..=config.height.max);
            let radius = rng.random_range(config.radius.min..=config.radius.max);
            let heading = euler_degrees(0.0, rng.random_range(-180.0..180.0), 0.0);
            let position = DVec3::Y * height + heading * DVec3::Z * radius;
            let max_pitch = config.max_start_pitch_degrees;
            SpawnPose {
                position,
                pitch: rng.random_range(-max_pitch..=max_pitch),
                yaw: rng.random_range(-180.0..180.0),
            }
        };

        let blocked_by_surface =
            area.surface_index()
                .any_within(area.resources(), pose.position, config.clearance);
        let blocked_by_agent = occupied
            .iter()
            .any(|other| other.distance(pose.position) <= config.clearance);
        if !blocked_by_surface && !blocked_by_agent {
            return Ok(pose);
        }
    }

    warn!(
        attempts = config.max_attempts,
        in_front, "no safe spawn position found"
    );
    Err(SpawnError::NoSafePosition {
        attempts: config.max_attempts,
    })
}
