//! AI Events — engine → AI и AI → остальной мир
//!
//! Trigger события производит physics pass (rapier bridge или headless
//! proximity detector), маршрутизирует `ai::systems::triggers` через
//! `SceneRegistry`.

use bevy::prelude::*;

use crate::ai::{AIStateType, AITriggerEventType, Obstacle};

/// Что-то вошло/находится/вышло из sensor'а агента
#[derive(Event, Debug, Clone, Copy)]
pub struct SensorTriggerEvent {
    /// Sensor collider (ключ в SceneRegistry)
    pub sensor: Entity,
    pub event: AITriggerEventType,
    pub other: Obstacle,
}

/// Тело агента пересеклось с trigger volume
///
/// Машина реагирует, только если `trigger` это её arrival volume.
#[derive(Event, Debug, Clone, Copy)]
pub struct ArrivalTriggerEvent {
    /// Body collider агента (ключ в SceneRegistry)
    pub body: Entity,
    pub event: AITriggerEventType,
    pub trigger: Entity,
}

/// Агент убит (шлёт damage/gameplay код)
#[derive(Event, Debug, Clone, Copy)]
pub struct AgentKilled {
    pub agent: Entity,
}

/// State machine сменила state (для аналитики/анимации/тестов)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AIStateChanged {
    pub agent: Entity,
    pub from: AIStateType,
    pub requested: AIStateType,
    /// None = машина стала inert
    pub active: Option<AIStateType>,
}
