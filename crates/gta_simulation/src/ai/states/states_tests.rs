//! Tests for concrete AI states (без ECS, через NavAgent как adapter).

use bevy::prelude::*;

use super::*;
use crate::ai::{
    AIContext, AIStateType, AITargetType, AITriggerEventType, Obstacle, ObstacleKind, PatrolMode,
    SensorVolume, StateContext, WaypointNetwork,
};
use crate::navigation::{NavAgent, NavigationAgent};

fn square_network() -> WaypointNetwork {
    WaypointNetwork::from_positions([
        Vec3::new(0.0, 0.0, -10.0),
        Vec3::new(10.0, 0.0, -10.0),
        Vec3::new(10.0, 0.0, 0.0),
    ])
}

fn context() -> AIContext {
    let mut ai = AIContext::new(square_network(), PatrolMode::Sequential, 1.0, 7);
    ai.set_sensor(SensorVolume {
        trigger: Some(Entity::from_raw(100)),
        offset: Vec3::ZERO,
        radius: 10.0,
    });
    ai.begin_tick(Vec3::ZERO, Quat::IDENTITY, 0.1);
    ai
}

fn player_at(position: Vec3) -> Obstacle {
    Obstacle {
        entity: Entity::from_raw(1),
        kind: ObstacleKind::Player,
        position,
    }
}

fn noise_at(position: Vec3, radius: f32) -> Obstacle {
    Obstacle {
        entity: Entity::from_raw(2),
        kind: ObstacleKind::AudioEmitter { radius },
        position,
    }
}

// ----------------------------------------------------------------------
// Perception
// ----------------------------------------------------------------------

#[test]
fn test_player_in_front_becomes_visual_threat() {
    let mut ai = context();

    perceive(&mut ai, AITriggerEventType::Enter, &player_at(Vec3::new(0.0, 0.0, -5.0)), 90.0);

    assert_eq!(ai.visual_threat.kind, AITargetType::VisualPlayer);
    assert!((ai.visual_threat.distance - 5.0).abs() < 1e-4);
}

#[test]
fn test_player_behind_is_not_seen() {
    let mut ai = context();

    perceive(&mut ai, AITriggerEventType::Stay, &player_at(Vec3::new(0.0, 0.0, 5.0)), 90.0);

    assert!(ai.visual_threat.is_none());
}

#[test]
fn test_exit_event_is_ignored() {
    let mut ai = context();

    perceive(&mut ai, AITriggerEventType::Exit, &player_at(Vec3::new(0.0, 0.0, -5.0)), 90.0);

    assert!(ai.visual_threat.is_none());
}

#[test]
fn test_closer_player_replaces_visual_threat() {
    let mut ai = context();

    perceive(&mut ai, AITriggerEventType::Stay, &player_at(Vec3::new(0.0, 0.0, -8.0)), 90.0);
    perceive(&mut ai, AITriggerEventType::Stay, &player_at(Vec3::new(0.0, 0.0, -3.0)), 90.0);
    perceive(&mut ai, AITriggerEventType::Stay, &player_at(Vec3::new(0.0, 0.0, -6.0)), 90.0);

    assert!((ai.visual_threat.position.z + 3.0).abs() < 1e-4);
}

#[test]
fn test_audio_ignored_while_player_visible() {
    let mut ai = context();

    perceive(&mut ai, AITriggerEventType::Stay, &player_at(Vec3::new(0.0, 0.0, -5.0)), 90.0);
    perceive(&mut ai, AITriggerEventType::Stay, &noise_at(Vec3::new(2.0, 0.0, 0.0), 10.0), 90.0);

    assert!(ai.audio_threat.is_none());
}

#[test]
fn test_audio_heard_only_within_emitter_radius() {
    let mut ai = context();

    perceive(&mut ai, AITriggerEventType::Stay, &noise_at(Vec3::new(6.0, 0.0, 0.0), 5.0), 90.0);
    assert!(ai.audio_threat.is_none());

    // Звук слышен и сзади (FOV не применяется)
    perceive(&mut ai, AITriggerEventType::Stay, &noise_at(Vec3::new(0.0, 0.0, 4.0), 5.0), 90.0);
    assert_eq!(ai.audio_threat.kind, AITargetType::Audio);
}

// ----------------------------------------------------------------------
// Idle
// ----------------------------------------------------------------------

#[test]
fn test_idle_enter_stops_and_clears_target() {
    let mut ai = context();
    let mut nav = NavAgent::default();
    nav.move_toward(Vec3::X);
    ai.set_target(AITargetType::Waypoint, None, Vec3::X, 1.0);

    let mut idle = IdleState::default();
    idle.on_enter(&mut StateContext { ai: &mut ai, nav: &mut nav });

    assert_eq!(nav.destination(), None);
    assert!(ai.target().is_none());
    assert!(!ai.arrival().enabled);
    assert!((10.0..=60.0).contains(&idle.idle_time()));
}

#[test]
fn test_idle_times_out_into_wander_state() {
    let mut ai = context();
    let mut nav = NavAgent::default();
    let mut idle = IdleState::new(IdleConfig {
        idle_time_range: Vec2::new(1.0, 1.0),
        wander_state: AIStateType::Walk,
        ..default()
    });
    idle.on_enter(&mut StateContext { ai: &mut ai, nav: &mut nav });

    ai.begin_tick(Vec3::ZERO, Quat::IDENTITY, 0.6);
    let first = idle.on_update(&mut StateContext { ai: &mut ai, nav: &mut nav });
    ai.begin_tick(Vec3::ZERO, Quat::IDENTITY, 0.6);
    let second = idle.on_update(&mut StateContext { ai: &mut ai, nav: &mut nav });

    assert_eq!(first, AIStateType::Idle);
    assert_eq!(second, AIStateType::Walk);
}

#[test]
fn test_idle_any_threat_goes_alerted() {
    let mut ai = context();
    let mut nav = NavAgent::default();
    let mut idle = IdleState::default();
    idle.on_enter(&mut StateContext { ai: &mut ai, nav: &mut nav });

    let noise = noise_at(Vec3::new(3.0, 0.0, 0.0), 5.0);
    idle.on_trigger_event(&mut StateContext { ai: &mut ai, nav: &mut nav }, AITriggerEventType::Enter, &noise);
    let next = idle.on_update(&mut StateContext { ai: &mut ai, nav: &mut nav });

    assert_eq!(next, AIStateType::Alerted);
    assert_eq!(ai.target_type(), AITargetType::Audio);
    assert_eq!(ai.target_position(), Vec3::new(3.0, 0.0, 0.0));
}

// ----------------------------------------------------------------------
// Patrol / Walk
// ----------------------------------------------------------------------

#[test]
fn test_patrol_enter_heads_to_first_waypoint() {
    let mut ai = context();
    let mut nav = NavAgent::default();
    let mut patrol = PatrolState::patrol();

    patrol.on_enter(&mut StateContext { ai: &mut ai, nav: &mut nav });

    assert_eq!(nav.destination(), Some(Vec3::new(0.0, 0.0, -10.0)));
    assert_eq!(nav.speed, 2.0);
    assert_eq!(ai.current_waypoint(), Some(0));
    assert_eq!(ai.target_type(), AITargetType::Waypoint);
}

#[test]
fn test_patrol_advances_on_arrival() {
    let mut ai = context();
    let mut nav = NavAgent::default();
    let mut patrol = PatrolState::patrol();
    patrol.on_enter(&mut StateContext { ai: &mut ai, nav: &mut nav });

    patrol.on_destination_reached(&mut StateContext { ai: &mut ai, nav: &mut nav }, true);

    assert_eq!(ai.current_waypoint(), Some(1));
    assert_eq!(nav.destination(), Some(Vec3::new(10.0, 0.0, -10.0)));
}

#[test]
fn test_patrol_ignores_leaving_arrival_volume() {
    let mut ai = context();
    let mut nav = NavAgent::default();
    let mut patrol = PatrolState::patrol();
    patrol.on_enter(&mut StateContext { ai: &mut ai, nav: &mut nav });

    patrol.on_destination_reached(&mut StateContext { ai: &mut ai, nav: &mut nav }, false);

    assert_eq!(ai.current_waypoint(), Some(0));
}

#[test]
fn test_walk_uses_slower_speed() {
    let mut ai = context();
    let mut nav = NavAgent::default();
    let mut walk = PatrolState::walk();

    walk.on_enter(&mut StateContext { ai: &mut ai, nav: &mut nav });

    assert_eq!(walk.state_type(), AIStateType::Walk);
    assert_eq!(nav.speed, 1.0);
    assert_eq!(walk.on_update(&mut StateContext { ai: &mut ai, nav: &mut nav }), AIStateType::Walk);
}

#[test]
fn test_patrol_with_empty_network_falls_back_to_idle() {
    let mut ai = AIContext::new(WaypointNetwork::default(), PatrolMode::Sequential, 1.0, 7);
    let mut nav = NavAgent::default();
    let mut patrol = PatrolState::patrol();

    patrol.on_enter(&mut StateContext { ai: &mut ai, nav: &mut nav });
    let next = patrol.on_update(&mut StateContext { ai: &mut ai, nav: &mut nav });

    assert_eq!(next, AIStateType::Idle);
    assert_eq!(nav.destination(), None);
}

#[test]
fn test_patrol_visual_goes_pursuit_audio_goes_alerted() {
    let mut ai = context();
    let mut nav = NavAgent::default();
    let mut patrol = PatrolState::patrol();
    patrol.on_enter(&mut StateContext { ai: &mut ai, nav: &mut nav });

    ai.audio_threat.set(AITargetType::Audio, None, Vec3::X, 1.0);
    assert_eq!(
        patrol.on_update(&mut StateContext { ai: &mut ai, nav: &mut nav }),
        AIStateType::Alerted
    );

    ai.visual_threat.set(AITargetType::VisualPlayer, None, Vec3::NEG_Z, 1.0);
    assert_eq!(
        patrol.on_update(&mut StateContext { ai: &mut ai, nav: &mut nav }),
        AIStateType::Pursuit
    );
    assert_eq!(ai.target_type(), AITargetType::VisualPlayer);
}

// ----------------------------------------------------------------------
// Alerted
// ----------------------------------------------------------------------

#[test]
fn test_alerted_holds_root_rotation_while_active() {
    let mut ai = context();
    let mut nav = NavAgent::default();
    let mut alerted = AlertedState::default();

    alerted.on_enter(&mut StateContext { ai: &mut ai, nav: &mut nav });
    assert_eq!(ai.root_motion_ref_counts(), (0, 1));
    assert!(ai.use_root_rotation());

    alerted.on_exit(&mut StateContext { ai: &mut ai, nav: &mut nav });
    assert_eq!(ai.root_motion_ref_counts(), (0, 0));

    // Повторный exit не уводит счётчик в минус
    alerted.on_exit(&mut StateContext { ai: &mut ai, nav: &mut nav });
    assert_eq!(ai.root_motion_ref_counts(), (0, 0));
}

#[test]
fn test_alerted_times_out_into_patrol() {
    let mut ai = context();
    let mut nav = NavAgent::default();
    let mut alerted = AlertedState::new(AlertedConfig {
        max_duration: 1.0,
        ..default()
    });
    alerted.on_enter(&mut StateContext { ai: &mut ai, nav: &mut nav });

    ai.begin_tick(Vec3::ZERO, Quat::IDENTITY, 0.5);
    assert_eq!(alerted.on_update(&mut StateContext { ai: &mut ai, nav: &mut nav }), AIStateType::Alerted);
    ai.begin_tick(Vec3::ZERO, Quat::IDENTITY, 0.5);
    assert_eq!(alerted.on_update(&mut StateContext { ai: &mut ai, nav: &mut nav }), AIStateType::Patrol);
}

#[test]
fn test_alerted_new_noise_restarts_timer() {
    let mut ai = context();
    let mut nav = NavAgent::default();
    let mut alerted = AlertedState::new(AlertedConfig {
        max_duration: 1.0,
        ..default()
    });
    alerted.on_enter(&mut StateContext { ai: &mut ai, nav: &mut nav });

    ai.begin_tick(Vec3::ZERO, Quat::IDENTITY, 0.8);
    ai.audio_threat.set(AITargetType::Audio, None, Vec3::new(-4.0, 0.0, 0.0), 4.0);
    alerted.on_update(&mut StateContext { ai: &mut ai, nav: &mut nav });

    assert_eq!(alerted.remaining(), 1.0);
    assert_eq!(ai.target_position(), Vec3::new(-4.0, 0.0, 0.0));
}

#[test]
fn test_alerted_seeking_sign_points_toward_target() {
    let mut ai = context();
    let mut nav = NavAgent::default();
    let mut alerted = AlertedState::default();
    alerted.on_enter(&mut StateContext { ai: &mut ai, nav: &mut nav });

    // Forward = -Z, цель слева (-X)
    ai.set_target(AITargetType::Audio, None, Vec3::new(-5.0, 0.0, 0.0), 5.0);
    alerted.on_update(&mut StateContext { ai: &mut ai, nav: &mut nav });
    assert_eq!(ai.seeking, -1);

    ai.set_target(AITargetType::Audio, None, Vec3::new(5.0, 0.0, 0.0), 5.0);
    alerted.on_update(&mut StateContext { ai: &mut ai, nav: &mut nav });
    assert_eq!(ai.seeking, 1);

    ai.set_target(AITargetType::Audio, None, Vec3::new(0.0, 0.0, -5.0), 5.0);
    alerted.on_update(&mut StateContext { ai: &mut ai, nav: &mut nav });
    assert_eq!(ai.seeking, 0);
}

#[test]
fn test_alerted_sees_player_goes_pursuit() {
    let mut ai = context();
    let mut nav = NavAgent::default();
    let mut alerted = AlertedState::default();
    alerted.on_enter(&mut StateContext { ai: &mut ai, nav: &mut nav });

    ai.visual_threat.set(AITargetType::VisualPlayer, None, Vec3::NEG_Z * 3.0, 3.0);

    assert_eq!(alerted.on_update(&mut StateContext { ai: &mut ai, nav: &mut nav }), AIStateType::Pursuit);
}

// ----------------------------------------------------------------------
// Pursuit
// ----------------------------------------------------------------------

#[test]
fn test_pursuit_follows_visual_threat() {
    let mut ai = context();
    let mut nav = NavAgent::default();
    let mut pursuit = PursuitState::default();
    pursuit.on_enter(&mut StateContext { ai: &mut ai, nav: &mut nav });

    ai.visual_threat.set(AITargetType::VisualPlayer, None, Vec3::new(0.0, 0.0, -7.0), 7.0);
    let next = pursuit.on_update(&mut StateContext { ai: &mut ai, nav: &mut nav });

    assert_eq!(next, AIStateType::Pursuit);
    assert_eq!(nav.destination(), Some(Vec3::new(0.0, 0.0, -7.0)));
    assert_eq!(nav.speed, 4.0);
}

#[test]
fn test_pursuit_loses_sight_into_idle() {
    let mut ai = context();
    let mut nav = NavAgent::default();
    let mut pursuit = PursuitState::new(PursuitConfig {
        lose_sight_timeout: 1.0,
        ..default()
    });
    pursuit.on_enter(&mut StateContext { ai: &mut ai, nav: &mut nav });

    ai.begin_tick(Vec3::ZERO, Quat::IDENTITY, 0.6);
    assert_eq!(pursuit.on_update(&mut StateContext { ai: &mut ai, nav: &mut nav }), AIStateType::Pursuit);
    ai.begin_tick(Vec3::ZERO, Quat::IDENTITY, 0.6);
    assert_eq!(pursuit.on_update(&mut StateContext { ai: &mut ai, nav: &mut nav }), AIStateType::Idle);
}

#[test]
fn test_pursuit_loses_sight_but_hears_goes_alerted() {
    let mut ai = context();
    let mut nav = NavAgent::default();
    let mut pursuit = PursuitState::new(PursuitConfig {
        lose_sight_timeout: 0.5,
        ..default()
    });
    pursuit.on_enter(&mut StateContext { ai: &mut ai, nav: &mut nav });

    ai.begin_tick(Vec3::ZERO, Quat::IDENTITY, 1.0);
    ai.audio_threat.set(AITargetType::Audio, None, Vec3::X, 1.0);

    assert_eq!(pursuit.on_update(&mut StateContext { ai: &mut ai, nav: &mut nav }), AIStateType::Alerted);
    assert_eq!(ai.target_type(), AITargetType::Audio);
}

#[test]
fn test_pursuit_ik_looks_at_player() {
    let mut ai = context();
    let mut nav = NavAgent::default();
    let mut pursuit = PursuitState::default();
    ai.set_target(AITargetType::VisualPlayer, None, Vec3::new(0.0, 0.0, -4.0), 4.0);

    pursuit.on_animator_ik_synced(&mut StateContext { ai: &mut ai, nav: &mut nav });
    let look_at = ai.look_at.expect("look-at goal");
    assert_eq!(look_at.position, Vec3::new(0.0, 1.6, -4.0));

    pursuit.on_exit(&mut StateContext { ai: &mut ai, nav: &mut nav });
    assert!(ai.look_at.is_none());
}

#[test]
fn test_pursuit_turns_toward_target_without_root_rotation() {
    let mut ai = context();
    let mut nav = NavAgent::default();
    let mut pursuit = PursuitState::default();
    ai.set_target(AITargetType::VisualPlayer, None, Vec3::new(5.0, 0.0, 0.0), 5.0);

    pursuit.on_animator_synced(&mut StateContext { ai: &mut ai, nav: &mut nav });
    assert!(ai.desired_facing.is_some());

    ai.desired_facing = None;
    ai.request_root_motion(0, 1);
    pursuit.on_animator_synced(&mut StateContext { ai: &mut ai, nav: &mut nav });
    assert!(ai.desired_facing.is_none());
}

// ----------------------------------------------------------------------
// Dead
// ----------------------------------------------------------------------

#[test]
fn test_every_state_reports_dead_after_kill() {
    let mut ai = context();
    let mut nav = NavAgent::default();
    ai.kill();

    for mut state in default_states() {
        let next = state.on_update(&mut StateContext { ai: &mut ai, nav: &mut nav });
        assert_eq!(next, AIStateType::Dead, "{:?} ignored death", state.state_type());
    }
}

#[test]
fn test_dead_enter_resets_outputs() {
    let mut ai = context();
    let mut nav = NavAgent::default();
    nav.move_toward(Vec3::X);
    ai.seeking = 1;
    ai.desired_facing = Some(Quat::IDENTITY);

    DeadState.on_enter(&mut StateContext { ai: &mut ai, nav: &mut nav });

    assert_eq!(nav.destination(), None);
    assert_eq!(ai.seeking, 0);
    assert!(ai.desired_facing.is_none());
    assert!(ai.target().is_none());
}
