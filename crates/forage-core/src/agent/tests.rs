use super::*;
use crate::area::{AreaBuilder, ResourceArea};
use crate::config::{ForageConfig, Range};
use crate::math::Transform;
use crate::resource::{ResourceId, ResourceSpec, SurfaceId};
use glam::{DQuat, DVec3};
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;

/// Agent config whose mouth sits at the body origin.
fn config(training: bool) -> ForageConfig {
    let mut config = ForageConfig {
        training_mode: training,
        ..ForageConfig::default()
    };
    config.agent.mouth_offset = DVec3::ZERO;
    config
}

/// Resources at the given positions, outward normal +Y, no plants.
fn area_at(positions: &[DVec3]) -> ResourceArea {
    let mut builder = AreaBuilder::new();
    for (idx, p) in positions.iter().enumerate() {
        builder
            .resource(
                None,
                Transform::from_translation(*p),
                ResourceSpec::new(SurfaceId(idx as u64 + 1)),
            )
            .expect("register");
    }
    builder.build(20.0, 0.02).expect("build")
}

fn agent_at(position: DVec3, training: bool) -> ForagingAgent {
    let mut agent = ForagingAgent::new(0, &config(training));
    agent.teleport(SpawnPose {
        position,
        pitch: 0.0,
        yaw: 0.0,
    });
    agent
}

fn contact(surface: u64, closest_point: DVec3) -> Contact {
    Contact {
        surface: SurfaceId(surface),
        phase: ContactPhase::Stay,
        closest_point,
    }
}

// --- targeting ---

#[test]
fn picks_the_closer_of_two_resources() {
    let area = area_at(&[DVec3::new(2.0, 0.0, 0.0), DVec3::new(1.0, 0.0, 0.0)]);
    let mut agent = agent_at(DVec3::ZERO, false);
    agent.update_nearest_resource(&area);
    assert_eq!(agent.nearest_resource(), Some(ResourceId(1)));
}

#[test]
fn sole_resource_with_content_always_wins() {
    let mut area = area_at(&[
        DVec3::new(0.5, 0.0, 0.0),
        DVec3::new(9.0, 0.0, 0.0),
        DVec3::new(1.0, 0.0, 0.0),
    ]);
    area.withdraw(ResourceId(0), 1.0);
    area.withdraw(ResourceId(2), 1.0);
    for start in [None, Some(ResourceId(0)), Some(ResourceId(2))] {
        let mut agent = agent_at(DVec3::ZERO, false);
        agent.nearest = start;
        agent.update_nearest_resource(&area);
        assert_eq!(agent.nearest_resource(), Some(ResourceId(1)));
    }
}

#[test]
fn no_content_anywhere_leaves_no_target() {
    let mut area = area_at(&[DVec3::X, DVec3::Y]);
    area.withdraw(ResourceId(0), 1.0);
    area.withdraw(ResourceId(1), 1.0);
    let mut agent = agent_at(DVec3::ZERO, false);
    agent.nearest = Some(ResourceId(0));
    agent.update_nearest_resource(&area);
    assert_eq!(agent.nearest_resource(), None);
    assert_eq!(agent.observe(&area), [0.0; OBSERVATION_SIZE]);
}

#[test]
fn equal_distance_keeps_first_in_scan_order() {
    let area = area_at(&[DVec3::X, -DVec3::X]);
    let mut agent = agent_at(DVec3::ZERO, false);
    agent.update_nearest_resource(&area);
    assert_eq!(agent.nearest_resource(), Some(ResourceId(0)));
}

#[test]
fn height_band_filters_candidates_inclusively() {
    let area = area_at(&[
        DVec3::new(0.0, 0.5, 0.0),
        DVec3::new(0.0, 3.0, 0.0),
        DVec3::new(0.0, 2.0, 4.0),
    ]);
    let mut cfg = config(false);
    cfg.agent.height_band = Some(Range::new(1.0, 2.0));
    let mut agent = ForagingAgent::new(0, &cfg);
    agent.update_nearest_resource(&area);
    assert_eq!(agent.nearest_resource(), Some(ResourceId(2)));
}

#[test]
fn fixed_step_retargets_after_depletion() {
    let mut area = area_at(&[DVec3::X, DVec3::new(3.0, 0.0, 0.0)]);
    let mut agent = agent_at(DVec3::ZERO, false);
    agent.update_nearest_resource(&area);
    assert_eq!(agent.nearest_resource(), Some(ResourceId(0)));
    area.withdraw(ResourceId(0), 1.0);
    agent.on_fixed_step(&area);
    assert_eq!(agent.nearest_resource(), Some(ResourceId(1)));
}

#[test]
fn fixed_step_drops_target_that_left_height_band() {
    let area = area_at(&[DVec3::new(1.0, 1.5, 0.0), DVec3::new(3.0, 1.0, 0.0)]);
    let mut agent = agent_at(DVec3::new(0.0, 1.5, 0.0), false);
    agent.update_nearest_resource(&area);
    assert_eq!(agent.nearest_resource(), Some(ResourceId(0)));

    // The target still has content but is no longer a candidate.
    agent.config.height_band = Some(Range::new(0.5, 1.2));
    agent.on_fixed_step(&area);
    assert_eq!(agent.nearest_resource(), Some(ResourceId(1)));
}

// --- locomotion ---

#[test]
fn turn_rates_are_smoothed() {
    let mut agent = agent_at(DVec3::ZERO, false);
    let action = Action {
        pitch: 1.0,
        yaw: -1.0,
        ..Action::IDLE
    };
    agent.apply_action(&action, 0.02);
    let (pitch_rate, yaw_rate) = agent.smoothed_rates();
    assert!((pitch_rate - 0.04).abs() < 1e-12);
    assert!((yaw_rate + 0.04).abs() < 1e-12);
    // 0.04 * 0.02 s * 100 deg/s
    assert!((agent.pitch() - 0.08).abs() < 1e-9);
    assert!((agent.yaw() + 0.08).abs() < 1e-9);
}

#[test]
fn pitch_is_clamped_and_yaw_is_not() {
    let mut agent = agent_at(DVec3::ZERO, false);
    let action = Action {
        pitch: 1.0,
        yaw: 1.0,
        ..Action::IDLE
    };
    for _ in 0..2000 {
        agent.apply_action(&action, 0.02);
    }
    assert_eq!(agent.pitch(), 80.0);
    assert!(agent.yaw() > 360.0);
}

#[test]
fn translation_becomes_scaled_force() {
    let mut agent = agent_at(DVec3::ZERO, false);
    let action = Action::from_array([1.0, 0.0, -0.5, 0.0, 0.0]);
    agent.apply_action(&action, 0.02);
    assert_eq!(agent.body().pending_force(), DVec3::new(2.0, 0.0, -1.0));
}

#[test]
fn action_array_contract() {
    let action = Action::from_array([0.1, -0.2, 3.0, f32::NAN, -7.0]);
    assert_eq!(action.translation, DVec3::new(0.1f32 as f64, -0.2f32 as f64, 1.0));
    assert_eq!(action.pitch, 0.0);
    assert_eq!(action.yaw, -1.0);
    assert!(matches!(
        Action::try_from_slice(&[0.0; 4]),
        Err(ActionError::WrongLength { actual: 4 })
    ));
    assert_eq!(
        Action::try_from_slice(&[0.0, 0.0, 1.0, 0.5, -0.5]).map(|a| a.to_array()),
        Ok([0.0, 0.0, 1.0, 0.5, -0.5])
    );
}

#[test]
fn frozen_agent_ignores_actions() {
    let mut agent = agent_at(DVec3::ZERO, false);
    agent.freeze();
    assert!(agent.is_frozen());
    assert!(agent.body().is_sleeping());
    let action = Action::from_array([1.0, 1.0, 1.0, 1.0, 1.0]);
    agent.apply_action(&action, 0.02);
    assert_eq!(agent.body().pending_force(), DVec3::ZERO);
    assert_eq!(agent.pitch(), 0.0);
    agent.unfreeze();
    assert!(!agent.body().is_sleeping());
    agent.apply_action(&action, 0.02);
    assert!(agent.pitch() > 0.0);
}

#[test]
#[should_panic(expected = "training mode")]
fn freeze_in_training_mode_panics() {
    agent_at(DVec3::ZERO, true).freeze();
}

// --- observation ---

#[test]
fn observation_layout() {
    // Resource straight ahead (+Z), its normal facing back at the agent.
    let mut builder = AreaBuilder::new();
    builder
        .resource(
            None,
            Transform::new(
                DVec3::new(0.0, 0.0, 2.0),
                DQuat::from_rotation_arc(DVec3::Y, -DVec3::Z),
            ),
            ResourceSpec::new(SurfaceId(1)),
        )
        .expect("register");
    let area = builder.build(20.0, 0.02).expect("build");
    let mut agent = agent_at(DVec3::ZERO, false);
    agent.update_nearest_resource(&area);

    let obs = agent.observe(&area);
    assert_eq!(obs.len(), 10);
    assert_eq!(&obs[0..4], &[0.0, 0.0, 0.0, 1.0]);
    assert!((obs[4] - 0.0).abs() < 1e-6);
    assert!((obs[5] - 0.0).abs() < 1e-6);
    assert!((obs[6] - 1.0).abs() < 1e-6);
    assert!((obs[7] - 1.0).abs() < 1e-6);
    assert!((obs[8] - 1.0).abs() < 1e-6);
    assert!((obs[9] - 0.1).abs() < 1e-6);
}

#[test]
fn observation_without_target_is_all_zero() {
    let area = area_at(&[]);
    let agent = agent_at(DVec3::ZERO, false);
    assert_eq!(agent.observe(&area), [0.0f32; 10]);
}

// --- feeding ---

#[test]
fn feed_contact_radius_is_strict() {
    let mut area = area_at(&[DVec3::new(1.0, 0.0, 0.0)]);
    let mut agent = agent_at(DVec3::ZERO, false);
    agent.update_nearest_resource(&area);

    assert_eq!(agent.on_contact(&mut area, &contact(1, DVec3::new(0.008, 0.0, 0.0))), None);
    assert_eq!(area.resource(ResourceId(0)).capacity(), 1.0);

    let outcome = agent
        .on_contact(&mut area, &contact(1, DVec3::new(0.007, 0.0, 0.0)))
        .expect("accepted");
    assert_eq!(outcome.amount, 0.01);
    assert_eq!(outcome.reward, 0.0);
    assert!((agent.episode_amount_obtained() - 0.01).abs() < 1e-12);
}

#[test]
fn exit_contact_clears_touching_and_never_feeds() {
    let mut area = area_at(&[DVec3::ZERO]);
    let mut agent = agent_at(DVec3::ZERO, false);
    agent.on_contact(&mut area, &contact(1, DVec3::ZERO));
    assert!(agent.touching_food());
    let exit = Contact {
        phase: ContactPhase::Exit,
        ..contact(1, DVec3::ZERO)
    };
    assert_eq!(agent.on_contact(&mut area, &exit), None);
    assert!(!agent.touching_food());
    assert_eq!(agent.feed_events(), 1);
}

#[test]
fn training_reward_includes_alignment_bonus() {
    // Normal +Y; an agent pitched straight down (forward = -Y) is perfectly aligned.
    let mut area = area_at(&[DVec3::ZERO]);
    let mut agent = ForagingAgent::new(0, &config(true));
    agent.teleport(SpawnPose {
        position: DVec3::ZERO,
        pitch: 80.0,
        yaw: 0.0,
    });
    let outcome = agent
        .on_contact(&mut area, &contact(1, DVec3::ZERO))
        .expect("accepted");
    let expected = 0.01 + 0.02 * 80f64.to_radians().sin();
    assert!((f64::from(outcome.reward) - expected).abs() < 1e-6);
    assert!((f64::from(agent.take_reward()) - expected).abs() < 1e-6);
    assert_eq!(agent.take_reward(), 0.0);
}

#[test]
fn misaligned_agent_gets_base_reward_only() {
    // Forward +Z is perpendicular to the +Y normal.
    let mut area = area_at(&[DVec3::ZERO]);
    let mut agent = agent_at(DVec3::ZERO, true);
    let outcome = agent
        .on_contact(&mut area, &contact(1, DVec3::ZERO))
        .expect("accepted");
    assert!((f64::from(outcome.reward) - 0.01).abs() < 1e-7);
}

#[test]
fn hundred_feeds_empty_a_resource_and_retarget() {
    let mut area = area_at(&[DVec3::ZERO, DVec3::new(0.0, 0.0, 5.0)]);
    let mut agent = agent_at(DVec3::ZERO, false);
    agent.update_nearest_resource(&area);
    assert_eq!(agent.nearest_resource(), Some(ResourceId(0)));

    let mut last = None;
    for _ in 0..100 {
        last = agent.on_contact(&mut area, &contact(1, DVec3::ZERO));
    }
    let last = last.expect("100th feed accepted");
    assert!(last.depleted);
    assert!(last.amount <= 0.01 && (last.amount - 0.01).abs() < 1e-9);
    assert!((agent.episode_amount_obtained() - 1.0).abs() < 1e-9);
    assert_eq!(agent.nearest_resource(), Some(ResourceId(1)));
}

#[test]
#[should_panic(expected = "not registered")]
fn contact_with_unregistered_surface_panics() {
    let mut area = area_at(&[DVec3::ZERO]);
    let mut agent = agent_at(DVec3::ZERO, false);
    agent.on_contact(&mut area, &contact(42, DVec3::ZERO));
}

// --- episode lifecycle ---

#[test]
fn begin_episode_resets_state_and_targets() {
    let mut area = area_at(&[DVec3::new(0.0, 1.5, 0.0), DVec3::new(4.0, 1.5, 0.0)]);
    let mut agent = ForagingAgent::new(0, &config(false));
    let mut rng = ChaCha12Rng::seed_from_u64(11);
    agent.on_contact(&mut area, &contact(1, agent.mouth_position()));
    agent.add_reward(1.0);
    agent
        .begin_episode(&area, &[], &mut rng)
        .expect("spawn succeeds");
    assert_eq!(agent.episode_amount_obtained(), 0.0);
    assert_eq!(agent.episode_reward(), 0.0);
    assert_eq!(agent.take_reward(), 0.0);
    assert!(agent.nearest_resource().is_some());
    // Outside training the agent always starts in front of a resource.
    let closest = area
        .resources()
        .iter()
        .map(|r| r.position().distance(agent.position()))
        .fold(f64::INFINITY, f64::min);
    assert!((0.1..=0.2 + 1e-9).contains(&closest));
}

#[test]
fn spawn_reports_exhaustion() {
    let area = area_at(&[DVec3::ZERO]);
    let mut cfg = config(false).agent.spawn;
    cfg.max_attempts = 3;
    cfg.clearance = 10.0;
    let mut rng = ChaCha12Rng::seed_from_u64(5);
    assert_eq!(
        find_safe_spawn(&area, &cfg, true, &[], &mut rng),
        Err(SpawnError::NoSafePosition { attempts: 3 })
    );
    let empty = area_at(&[]);
    assert_eq!(
        find_safe_spawn(&empty, &cfg, true, &[], &mut rng),
        Err(SpawnError::NoResources)
    );
}

#[test]
fn ring_spawn_avoids_other_agents() {
    let area = area_at(&[]);
    let cfg = config(false).agent.spawn;
    let mut rng = ChaCha12Rng::seed_from_u64(9);
    let occupied = [DVec3::new(0.0, 1.5, 3.0)];
    for _ in 0..50 {
        let pose = find_safe_spawn(&area, &cfg, false, &occupied, &mut rng).expect("ring spawn");
        let horizontal = DVec3::new(pose.position.x, 0.0, pose.position.z).length();
        assert!((2.0..=7.0 + 1e-9).contains(&horizontal));
        assert!((1.2..=2.5).contains(&pose.position.y));
        assert!(pose.pitch.abs() <= 60.0);
        assert!(occupied[0].distance(pose.position) > 0.05);
    }
}

// --- heuristic input ---

#[test]
fn heuristic_keys_map_to_body_axes() {
    let keys = KeyState {
        forward: true,
        backward: true,
        yaw_left: true,
        yaw_right: true,
        pitch_down: true,
        ..KeyState::default()
    };
    let action = heuristic_action(&keys, DQuat::IDENTITY);
    assert_eq!(action.translation, DVec3::Z);
    assert_eq!(action.pitch, -1.0);
    assert_eq!(action.yaw, -1.0);

    let diagonal = KeyState {
        right: true,
        up: true,
        ..KeyState::default()
    };
    let action = heuristic_action(&diagonal, DQuat::IDENTITY);
    let expected = DVec3::new(1.0, 1.0, 0.0).normalize();
    assert!((action.translation - expected).length() < 1e-12);
    assert_eq!(heuristic_action(&KeyState::default(), DQuat::IDENTITY), Action::IDLE);
}
