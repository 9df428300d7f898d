//! Patrol / Walk — обход waypoint network.
//!
//! Одна реализация под двумя tag'ами: Patrol (быстрее) и Walk (прогулочный
//! темп). По прибытии на waypoint запрашивает следующий.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::ai::states::{perceive, DEFAULT_FIELD_OF_VIEW};
use crate::ai::{AIState, AIStateType, AITargetType, AITriggerEventType, Obstacle, StateContext};
use crate::logger;

#[derive(Debug, Clone, Reflect, Serialize, Deserialize)]
pub struct PatrolConfig {
    /// Скорость навигации (m/s)
    pub speed: f32,
    pub field_of_view: f32,
}

impl Default for PatrolConfig {
    fn default() -> Self {
        Self {
            speed: 2.0,
            field_of_view: DEFAULT_FIELD_OF_VIEW,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PatrolState {
    state_type: AIStateType,
    pub config: PatrolConfig,
    /// Сеть пустая или курсор битый, уходим в Idle
    misconfigured: bool,
}

impl PatrolState {
    pub fn new(state_type: AIStateType, config: PatrolConfig) -> Self {
        Self {
            state_type,
            config,
            misconfigured: false,
        }
    }

    pub fn patrol() -> Self {
        Self::new(AIStateType::Patrol, PatrolConfig::default())
    }

    pub fn walk() -> Self {
        Self::new(
            AIStateType::Walk,
            PatrolConfig {
                speed: 1.0,
                ..default()
            },
        )
    }

    fn head_to_waypoint(&mut self, ctx: &mut StateContext<'_>, advance: bool) {
        match ctx.ai.get_waypoint_position(advance) {
            Ok(position) => ctx.nav.move_toward(position),
            Err(err) => {
                logger::log_error(&format!("AI {:?}: cannot patrol: {}", self.state_type, err));
                self.misconfigured = true;
            }
        }
    }
}

impl AIState for PatrolState {
    fn state_type(&self) -> AIStateType {
        self.state_type
    }

    fn on_enter(&mut self, ctx: &mut StateContext<'_>) {
        self.misconfigured = false;
        ctx.nav.set_speed(self.config.speed);
        self.head_to_waypoint(ctx, false);
    }

    fn on_update(&mut self, ctx: &mut StateContext<'_>) -> AIStateType {
        if ctx.ai.is_dead() {
            return AIStateType::Dead;
        }

        if ctx.ai.visual_threat.is_some() {
            let threat = ctx.ai.visual_threat;
            ctx.ai.set_target_from(threat);
            return AIStateType::Pursuit;
        }

        if ctx.ai.audio_threat.is_some() {
            let threat = ctx.ai.audio_threat;
            ctx.ai.set_target_from(threat);
            return AIStateType::Alerted;
        }

        if self.misconfigured {
            return AIStateType::Idle;
        }

        // Цель перебили (clear_target снаружи), возвращаемся к текущему waypoint
        if ctx.ai.target_type() != AITargetType::Waypoint {
            self.head_to_waypoint(ctx, false);
        } else if ctx.nav.destination() != Some(ctx.ai.target_position()) {
            ctx.nav.move_toward(ctx.ai.target_position());
        }

        self.state_type
    }

    fn on_trigger_event(&mut self, ctx: &mut StateContext<'_>, event: AITriggerEventType, other: &Obstacle) {
        perceive(ctx.ai, event, other, self.config.field_of_view);
    }

    fn on_destination_reached(&mut self, ctx: &mut StateContext<'_>, reached: bool) {
        if reached && ctx.ai.target_type() == AITargetType::Waypoint {
            self.head_to_waypoint(ctx, true);
        }
    }
}
