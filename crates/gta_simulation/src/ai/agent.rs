//! Spawn AI агентов и маркеры их collider'ов
//!
//! Агент = entity с `AIStateMachine` (+ required `NavAgent`, `Transform`),
//! отдельные entity под sensor и arrival volume. Тело агента — сам agent
//! entity. Все три регистрируются в `SceneRegistry` при старте машины.

use bevy::prelude::*;

use crate::ai::{
    AIState, AIStateMachine, AgentColliders, ObstacleKind, StateMachineConfig, WaypointNetwork,
};
use crate::animation::AnimatorRig;

/// Sensor collider агента (зрение/слух)
#[derive(Component, Debug, Clone, Copy)]
pub struct AISensorCollider {
    pub machine: Entity,
}

/// Arrival-detection volume агента
#[derive(Component, Debug, Clone, Copy)]
pub struct ArrivalTriggerCollider {
    pub machine: Entity,
}

/// То, что sensor агента может заметить
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub enum Stimulus {
    Player,
    /// Источник шума, слышен в пределах `radius`
    Audio { radius: f32 },
}

impl Stimulus {
    pub fn obstacle_kind(&self) -> ObstacleKind {
        match *self {
            Stimulus::Player => ObstacleKind::Player,
            Stimulus::Audio { radius } => ObstacleKind::AudioEmitter { radius },
        }
    }
}

/// States, которые `start_state_machines` зарегистрирует на машине
///
/// Component удаляется после старта. Нет компонента → `default_states()`.
#[derive(Component)]
pub struct PendingStates(pub Vec<Box<dyn AIState>>);

/// Параметры spawn'а агента
pub struct AgentSpawn {
    pub position: Vec3,
    pub rotation: Quat,
    pub config: StateMachineConfig,
    pub waypoints: WaypointNetwork,
    /// None = стандартный набор states
    pub states: Option<Vec<Box<dyn AIState>>>,
}

impl AgentSpawn {
    pub fn new(position: Vec3, waypoints: WaypointNetwork) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
            config: StateMachineConfig::default(),
            waypoints,
            states: None,
        }
    }

    pub fn with_config(mut self, config: StateMachineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_states(mut self, states: Vec<Box<dyn AIState>>) -> Self {
        self.states = Some(states);
        self
    }
}

/// Spawn helper: агент + sensor + arrival volume
///
/// RNG машины пересевается из `DeterministicRng` при старте.
pub fn spawn_ai_agent(commands: &mut Commands, spawn: AgentSpawn) -> Entity {
    let AgentSpawn {
        position,
        rotation,
        config,
        waypoints,
        states,
    } = spawn;

    let sensor_position = position + rotation * config.sensor_offset;

    let agent = commands
        .spawn((
            Transform::from_translation(position).with_rotation(rotation),
            AIStateMachine::new(config, waypoints, 0),
            AnimatorRig::default(),
        ))
        .id();

    if let Some(states) = states {
        commands.entity(agent).insert(PendingStates(states));
    }

    let sensor = commands
        .spawn((Transform::from_translation(sensor_position), AISensorCollider { machine: agent }))
        .id();

    let arrival = commands
        .spawn((Transform::from_translation(position), ArrivalTriggerCollider { machine: agent }))
        .id();

    commands.entity(agent).insert(AgentColliders {
        body: Some(agent),
        sensor: Some(sensor),
        arrival: Some(arrival),
    });

    agent
}
