//! Rapier integration test
//!
//! Тот же AI, но trigger события и лучи foot IK идут через rapier colliders
//! (`TriggerSource::Rapier`). Rapier шагает внутри `AISet::Triggers`.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;
use gta_simulation::ai::{
    spawn_ai_agent, AIStateMachine, AIStateType, AgentSpawn, StateMachineConfig, WaypointNetwork,
};
use gta_simulation::animation::{AvatarIkGoal, HumanBone};
use gta_simulation::physics::{environment_groups, RapierTriggerPairs};
use gta_simulation::player::{spawn_player, PlayerMovementConfig};
use gta_simulation::*;

fn create_rapier_app(seed: u64) -> App {
    let mut app = create_headless_app(seed);
    app.add_plugins(SimulationPlugin {
        triggers: TriggerSource::Rapier,
    });
    // Как App::run
    app.finish();
    app.cleanup();
    app
}

fn spawn_agent(app: &mut App, spawn: AgentSpawn) -> Entity {
    let agent = spawn_ai_agent(&mut app.world_mut().commands(), spawn);
    app.world_mut().flush();
    agent
}

fn machine(app: &App, agent: Entity) -> &AIStateMachine {
    app.world()
        .get::<AIStateMachine>(agent)
        .expect("agent has a state machine")
}

fn square_route() -> WaypointNetwork {
    WaypointNetwork::from_positions([
        Vec3::new(4.0, 0.0, 0.0),
        Vec3::new(4.0, 0.0, 4.0),
        Vec3::new(0.0, 0.0, 4.0),
    ])
}

fn patrol_spawn() -> AgentSpawn {
    AgentSpawn::new(Vec3::ZERO, square_route()).with_config(StateMachineConfig {
        initial_state: AIStateType::Patrol,
        ..default()
    })
}

/// Земля: верх плиты на y = -0.2
fn spawn_ground(app: &mut App) {
    app.world_mut().spawn((
        Transform::from_xyz(0.0, -0.3, 0.0),
        Collider::cuboid(20.0, 0.1, 20.0),
        environment_groups(),
    ));
}

fn spawn_posed_player(app: &mut App, position: Vec3) -> Entity {
    let player = spawn_player(
        &mut app.world_mut().commands(),
        position,
        PlayerMovementConfig::default(),
        FootIkConfig::default(),
    );
    app.world_mut().flush();

    let mut rig = app.world_mut().get_mut::<AnimatorRig>(player).expect("rig");
    rig.apply_pose(
        [
            (HumanBone::LeftFoot, position + Vec3::new(-0.1, 0.1, 0.0)),
            (HumanBone::RightFoot, position + Vec3::new(0.1, 0.1, 0.0)),
        ],
        position + Vec3::Y,
    );

    player
}

#[test]
fn test_agent_colliders_are_not_rigid_bodies() {
    let mut app = create_rapier_app(42);
    let agent = spawn_agent(&mut app, patrol_spawn());

    run_fixed_tick(&mut app);

    assert!(app.world().get::<Collider>(agent).is_some());
    assert!(app.world().get::<RigidBody>(agent).is_none());
}

#[test]
fn test_rapier_patrol_moves_agent() {
    let mut app = create_rapier_app(42);
    let agent = spawn_agent(&mut app, patrol_spawn());

    for _ in 0..30 {
        run_fixed_tick(&mut app);
    }

    let position = app.world().get::<Transform>(agent).expect("transform").translation;
    assert!(position.x > 0.5, "agent did not move: {:?}", position);
    assert!(position.z.abs() < 1e-3);
}

#[test]
fn test_rapier_patrol_advances_waypoint_cursor() {
    let mut app = create_rapier_app(42);
    let agent = spawn_agent(&mut app, patrol_spawn());

    let mut visited = Vec::new();
    let mut arrived = false;
    for _ in 0..1200 {
        run_fixed_tick(&mut app);

        arrived |= app.world().resource::<RapierTriggerPairs>().arrival_pairs() > 0;
        let cursor = machine(&app, agent).snapshot().current_waypoint;
        if visited.last() != Some(&cursor) {
            visited.push(cursor);
        }
    }

    assert!(arrived, "arrival volume never touched the body");
    assert_eq!(machine(&app, agent).current_state_type(), AIStateType::Patrol);
    assert!(visited.len() >= 4, "visited: {:?}", visited);
    assert_eq!(&visited[..4], &[Some(0), Some(1), Some(2), Some(0)]);
}

#[test]
fn test_rapier_sensor_sees_player() {
    let mut app = create_rapier_app(42);
    let agent = spawn_agent(&mut app, AgentSpawn::new(Vec3::ZERO, square_route()));

    // Агент смотрит в -Z, игрок прямо перед ним
    spawn_posed_player(&mut app, Vec3::new(0.0, 0.0, -5.0));

    for _ in 0..10 {
        run_fixed_tick(&mut app);
    }

    assert!(app.world().resource::<RapierTriggerPairs>().sensor_pairs() > 0);
    assert_eq!(machine(&app, agent).current_state_type(), AIStateType::Pursuit);
}

#[test]
fn test_feet_land_on_rapier_ground() {
    let mut app = create_rapier_app(42);
    spawn_ground(&mut app);
    let grounded = spawn_posed_player(&mut app, Vec3::ZERO);
    // За краем плиты луч ничего не находит
    let off_edge = spawn_posed_player(&mut app, Vec3::new(100.0, 0.0, 0.0));

    for _ in 0..30 {
        run_fixed_tick(&mut app);
    }

    let solver = app.world().get::<FootIkSolver>(grounded).expect("solver");
    let left = solver.foot(AvatarIkGoal::LeftFoot);
    assert!(left.has_target());
    assert!((left.ik_position.y + 0.2).abs() < 1e-3, "hit y = {}", left.ik_position.y);
    assert!(solver.foot(AvatarIkGoal::RightFoot).has_target());

    // Кость на 0.1 над root, offset сошёлся к -0.2
    let rig = app.world().get::<AnimatorRig>(grounded).expect("rig");
    let target = rig.goal(AvatarIkGoal::LeftFoot).position.expect("left IK target");
    assert!((target.y + 0.1).abs() < 1e-3, "left y = {}", target.y);

    let solver = app.world().get::<FootIkSolver>(off_edge).expect("solver");
    assert!(!solver.foot(AvatarIkGoal::LeftFoot).has_target());
    let rig = app.world().get::<AnimatorRig>(off_edge).expect("rig");
    let left = rig.goal(AvatarIkGoal::LeftFoot).position.expect("left IK target");
    assert!(left.abs_diff_eq(Vec3::new(99.9, 0.1, 0.0), 1e-4), "left = {:?}", left);
}
