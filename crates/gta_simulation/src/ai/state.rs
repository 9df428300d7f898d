//! AIState — полиморфный behavior unit, привязанный к одной state machine.
//!
//! Machine хранит states как `Box<dyn AIState>` по ключу `AIStateType`
//! и никогда не знает конкретный тип. Каждый hook получает `StateContext`:
//! контекст машины (targets, ref-counts, waypoints) + navigation adapter.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::ai::AIContext;
use crate::navigation::NavigationAgent;

/// Тип состояния (ключ регистрации + tag "последний запрошенный")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect, Serialize, Deserialize)]
pub enum AIStateType {
    #[default]
    None,
    Idle,
    Walk,
    Alerted,
    Patrol,
    Pursuit,
    Dead,
}

/// Фаза trigger callback'а (sensor / arrival volume)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum AITriggerEventType {
    Enter,
    Stay,
    Exit,
}

/// Что за объект попал в sensor
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub enum ObstacleKind {
    Player,
    /// Источник звука, слышен в пределах `radius`
    AudioEmitter { radius: f32 },
    Other,
}

/// Collider, о котором сообщает trigger callback
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct Obstacle {
    pub entity: Entity,
    pub kind: ObstacleKind,
    pub position: Vec3,
}

/// То, что видит state в каждом hook'е
pub struct StateContext<'a> {
    pub ai: &'a mut AIContext,
    pub nav: &'a mut dyn NavigationAgent,
}

/// Контракт состояния
///
/// Все hooks кроме `state_type`/`on_update` по умолчанию no-op.
pub trait AIState: Send + Sync + 'static {
    fn state_type(&self) -> AIStateType;

    fn on_enter(&mut self, _ctx: &mut StateContext<'_>) {}

    /// Вызывается каждый тик, возвращает желаемый следующий state
    fn on_update(&mut self, ctx: &mut StateContext<'_>) -> AIStateType;

    fn on_exit(&mut self, _ctx: &mut StateContext<'_>) {}

    fn on_trigger_event(
        &mut self,
        _ctx: &mut StateContext<'_>,
        _event: AITriggerEventType,
        _other: &Obstacle,
    ) {
    }

    fn on_destination_reached(&mut self, _ctx: &mut StateContext<'_>, _reached: bool) {}

    /// "Pose applied": после применения анимации (root motion уже учтён)
    fn on_animator_synced(&mut self, _ctx: &mut StateContext<'_>) {}

    /// "IK resolution": до финализации позы
    fn on_animator_ik_synced(&mut self, _ctx: &mut StateContext<'_>) {}
}
