//! Headless симуляция
//!
//! Патрульный NPC, игрок идёт ему навстречу. Логирует переходы AI states.

use bevy::prelude::*;
use gta_simulation::ai::{spawn_ai_agent, AIStateChanged, AIStateType, AgentSpawn, StateMachineConfig, WaypointNetwork};
use gta_simulation::player::{spawn_player, PlayerInput, PlayerMovementConfig};
use gta_simulation::{create_headless_app, log_info, run_fixed_tick, FlatGround, FootIkConfig, SimulationPlugin};

fn log_state_changes(mut changes: EventReader<AIStateChanged>) {
    for change in changes.read() {
        log_info(&format!(
            "Agent {:?}: {:?} → {:?} (active {:?})",
            change.agent, change.from, change.requested, change.active
        ));
    }
}

fn setup(mut commands: Commands) {
    let waypoints = WaypointNetwork::from_positions([
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(10.0, 0.0, 0.0),
        Vec3::new(10.0, 0.0, 10.0),
        Vec3::new(0.0, 0.0, 10.0),
    ]);

    spawn_ai_agent(
        &mut commands,
        AgentSpawn::new(Vec3::new(0.0, 0.0, 0.0), waypoints).with_config(StateMachineConfig {
            initial_state: AIStateType::Patrol,
            ..default()
        }),
    );

    let player = spawn_player(
        &mut commands,
        Vec3::new(5.0, 0.0, 40.0),
        PlayerMovementConfig::default(),
        FootIkConfig::default(),
    );

    // Игрок идёт к патрулю (camera forward = -Z)
    commands.entity(player).insert(PlayerInput {
        axis_z: 1.0,
        ..default()
    });
}

fn main() {
    let seed = 42;
    let mut app = create_headless_app(seed);
    log_info(&format!("Starting headless simulation (seed: {})", seed));

    app.add_plugins(SimulationPlugin::default())
        .insert_resource(FlatGround::default())
        .add_systems(Startup, setup)
        .add_systems(FixedPostUpdate, log_state_changes);

    // Полный update на тик (ручное время): события сбрасываются в First
    for tick in 0..2000 {
        run_fixed_tick(&mut app);

        if tick % 300 == 0 {
            let entity_count = app.world().entities().len();
            log_info(&format!("Tick {}: {} entities", tick, entity_count));
        }
    }

    log_info("Simulation complete!");
}
