//! Alerted — ограниченное по времени расследование угрозы.
//!
//! Стоим на месте и разворачиваемся к цели turn-анимацией (root rotation
//! держится всё время пребывания в state). Visual threat → Pursuit,
//! таймаут → Patrol.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::ai::states::{perceive, DEFAULT_FIELD_OF_VIEW};
use crate::ai::{
    AIState, AIStateType, AITriggerEventType, Obstacle, RootMotionRequest, StateContext,
};

#[derive(Debug, Clone, Reflect, Serialize, Deserialize)]
pub struct AlertedConfig {
    /// Сколько секунд длится расследование
    pub max_duration: f32,
    /// Угол до цели (градусы), меньше которого считаем что уже развернулись
    pub facing_threshold: f32,
    pub field_of_view: f32,
}

impl Default for AlertedConfig {
    fn default() -> Self {
        Self {
            max_duration: 10.0,
            facing_threshold: 5.0,
            field_of_view: DEFAULT_FIELD_OF_VIEW,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AlertedState {
    pub config: AlertedConfig,
    timer: f32,
    root_rotation: RootMotionRequest,
}

impl Default for AlertedState {
    fn default() -> Self {
        Self::new(AlertedConfig::default())
    }
}

impl AlertedState {
    pub fn new(config: AlertedConfig) -> Self {
        Self {
            config,
            timer: 0.0,
            root_rotation: RootMotionRequest::rotation_only(),
        }
    }

    pub fn remaining(&self) -> f32 {
        self.timer
    }

    /// Знак поворота к цели: -1 (влево), 1 (вправо), 0 (уже смотрим)
    fn seeking_sign(&self, ctx: &StateContext<'_>) -> i32 {
        if ctx.ai.target().is_none() {
            return 0;
        }

        let mut to_target = ctx.ai.target_position() - ctx.ai.position();
        to_target.y = 0.0;
        if to_target.length_squared() < f32::EPSILON {
            return 0;
        }

        let mut forward = ctx.ai.forward();
        forward.y = 0.0;

        let angle = forward.angle_between(to_target).to_degrees();
        if angle <= self.config.facing_threshold {
            return 0;
        }

        // cross.y > 0 → цель слева (против часовой вокруг +Y)
        if forward.cross(to_target).y > 0.0 {
            -1
        } else {
            1
        }
    }
}

impl AIState for AlertedState {
    fn state_type(&self) -> AIStateType {
        AIStateType::Alerted
    }

    fn on_enter(&mut self, ctx: &mut StateContext<'_>) {
        self.timer = self.config.max_duration;
        ctx.nav.stop();
        self.root_rotation.acquire(ctx.ai);
    }

    fn on_update(&mut self, ctx: &mut StateContext<'_>) -> AIStateType {
        if ctx.ai.is_dead() {
            return AIStateType::Dead;
        }

        self.timer -= ctx.ai.delta();

        if ctx.ai.visual_threat.is_some() {
            let threat = ctx.ai.visual_threat;
            ctx.ai.set_target_from(threat);
            return AIStateType::Pursuit;
        }

        if ctx.ai.audio_threat.is_some() {
            // Новый звук: перенаправляемся, таймер заново
            let threat = ctx.ai.audio_threat;
            ctx.ai.set_target_from(threat);
            self.timer = self.config.max_duration;
        }

        if self.timer <= 0.0 {
            return AIStateType::Patrol;
        }

        ctx.ai.seeking = self.seeking_sign(ctx);

        AIStateType::Alerted
    }

    fn on_exit(&mut self, ctx: &mut StateContext<'_>) {
        ctx.ai.seeking = 0;
        self.root_rotation.release(ctx.ai);
    }

    fn on_trigger_event(&mut self, ctx: &mut StateContext<'_>, event: AITriggerEventType, other: &Obstacle) {
        perceive(ctx.ai, event, other, self.config.field_of_view);
    }
}
