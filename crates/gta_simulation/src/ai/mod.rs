//! AI decision-making module
//!
//! State machine для NPC: Idle / Walk / Patrol / Alerted / Pursuit / Dead.
//! Ядро (`AIStateMachine`, states) не зависит от ECS — системы в
//! `ai::systems` только снабжают его позой, событиями и navigation adapter'ом.

use bevy::prelude::*;

pub mod agent;
pub mod context;
pub mod error;
pub mod events;
pub mod machine;
pub mod registry;
pub mod root_motion;
pub mod state;
pub mod states;
pub mod systems;
pub mod target;
pub mod waypoint;


// Re-export основных типов
pub use agent::{
    spawn_ai_agent, AISensorCollider, AgentSpawn, ArrivalTriggerCollider, PendingStates, Stimulus,
};
pub use context::{AIContext, ArrivalVolume, SensorVolume, MAX_STOPPING_DISTANCE};
pub use error::AIConfigError;
pub use events::{AIStateChanged, AgentKilled, ArrivalTriggerEvent, SensorTriggerEvent};
pub use machine::{
    AIStateMachine, AIStateTransition, AgentColliders, StateMachineConfig, StateMachineSnapshot,
};
pub use registry::SceneRegistry;
pub use root_motion::RootMotionRequest;
pub use state::{AIState, AIStateType, AITriggerEventType, Obstacle, ObstacleKind, StateContext};
pub use target::{AITarget, AITargetType};
pub use waypoint::{PatrolMode, Waypoint, WaypointNetwork};

/// Фазы AI тика (FixedUpdate, выполняются по порядку)
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AISet {
    /// Старт новых машин, clear perception, снимок позы
    BeginTick,
    /// Physics pass: trigger события → state machines
    Triggers,
    /// on_update + transition protocol
    Decide,
    /// Навигация двигает агентов
    Navigate,
    /// "Pose applied": root motion + on_animator_synced
    Animate,
    /// "IK resolution": look-at, foot IK
    Ik,
}

/// AI Plugin
///
/// Регистрирует AI системы в FixedUpdate для детерминизма.
/// Источник trigger событий (rapier bridge или headless proximity)
/// подключается отдельно — он пишет события в `AISet::Triggers`.
pub struct AIPlugin;

impl Plugin for AIPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SceneRegistry>()
            .add_event::<SensorTriggerEvent>()
            .add_event::<ArrivalTriggerEvent>()
            .add_event::<AgentKilled>()
            .add_event::<AIStateChanged>()
            .register_type::<AIStateType>()
            .register_type::<AITarget>()
            .register_type::<Stimulus>()
            .register_type::<AgentColliders>()
            .configure_sets(
                FixedUpdate,
                (
                    AISet::BeginTick,
                    AISet::Triggers,
                    AISet::Decide,
                    AISet::Navigate,
                    AISet::Animate,
                    AISet::Ik,
                )
                    .chain(),
            )
            .configure_sets(FixedUpdate, TriggerSourceSet.in_set(AISet::Triggers))
            .add_systems(
                FixedUpdate,
                (systems::start_state_machines, systems::begin_ai_tick)
                    .chain()
                    .in_set(AISet::BeginTick),
            )
            .add_systems(
                FixedUpdate,
                (
                    systems::apply_agent_kills,
                    systems::dispatch_sensor_triggers,
                    systems::dispatch_arrival_triggers,
                )
                    .chain()
                    .in_set(AISet::Triggers)
                    .after(TriggerSourceSet),
            )
            .add_systems(FixedUpdate, systems::update_ai_states.in_set(AISet::Decide))
            .add_systems(
                FixedUpdate,
                crate::navigation::drive_nav_agents.in_set(AISet::Navigate),
            )
            .add_systems(FixedUpdate, systems::sync_animator_pose.in_set(AISet::Animate))
            .add_systems(FixedUpdate, systems::sync_animator_ik.in_set(AISet::Ik));
    }
}

/// Системы-источники trigger событий (внутри `AISet::Triggers`, до dispatch)
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TriggerSourceSet;
