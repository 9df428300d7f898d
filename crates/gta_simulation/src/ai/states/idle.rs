//! Idle — стоим на месте случайное время, потом идём патрулировать.

use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::ai::states::{perceive, DEFAULT_FIELD_OF_VIEW};
use crate::ai::{AIState, AIStateType, AITriggerEventType, Obstacle, StateContext};

#[derive(Debug, Clone, Reflect, Serialize, Deserialize)]
pub struct IdleConfig {
    /// Диапазон времени простоя (секунды), выбирается случайно на входе
    pub idle_time_range: Vec2,
    /// Куда уходим по таймауту (Patrol или Walk)
    pub wander_state: AIStateType,
    pub field_of_view: f32,
}

impl Default for IdleConfig {
    fn default() -> Self {
        Self {
            idle_time_range: Vec2::new(10.0, 60.0),
            wander_state: AIStateType::Patrol,
            field_of_view: DEFAULT_FIELD_OF_VIEW,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct IdleState {
    pub config: IdleConfig,
    idle_time: f32,
    timer: f32,
}

impl IdleState {
    pub fn new(config: IdleConfig) -> Self {
        Self {
            config,
            idle_time: 0.0,
            timer: 0.0,
        }
    }

    pub fn idle_time(&self) -> f32 {
        self.idle_time
    }
}

impl AIState for IdleState {
    fn state_type(&self) -> AIStateType {
        AIStateType::Idle
    }

    fn on_enter(&mut self, ctx: &mut StateContext<'_>) {
        let (min, max) = (self.config.idle_time_range.x, self.config.idle_time_range.y);
        self.idle_time = if max > min {
            ctx.ai.rng().gen_range(min..=max)
        } else {
            min.max(0.0)
        };
        self.timer = 0.0;

        ctx.nav.stop();
        ctx.ai.clear_target();
    }

    fn on_update(&mut self, ctx: &mut StateContext<'_>) -> AIStateType {
        if ctx.ai.is_dead() {
            return AIStateType::Dead;
        }

        // Любая угроза → Alerted (visual приоритетнее audio)
        let threat = if ctx.ai.visual_threat.is_some() {
            Some(ctx.ai.visual_threat)
        } else if ctx.ai.audio_threat.is_some() {
            Some(ctx.ai.audio_threat)
        } else {
            None
        };

        if let Some(threat) = threat {
            ctx.ai.set_target_from(threat);
            return AIStateType::Alerted;
        }

        self.timer += ctx.ai.delta();
        if self.timer > self.idle_time {
            return self.config.wander_state;
        }

        AIStateType::Idle
    }

    fn on_trigger_event(&mut self, ctx: &mut StateContext<'_>, event: AITriggerEventType, other: &Obstacle) {
        perceive(ctx.ai, event, other, self.config.field_of_view);
    }
}
