//! Pursuit — преследование visual threat.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::ai::states::{look_rotation, perceive, DEFAULT_FIELD_OF_VIEW};
use crate::ai::{AIState, AIStateType, AITargetType, AITriggerEventType, Obstacle, StateContext};
use crate::animation::LookAtGoal;

#[derive(Debug, Clone, Reflect, Serialize, Deserialize)]
pub struct PursuitConfig {
    /// Скорость бега (m/s)
    pub speed: f32,
    /// Минимальный интервал между перестроениями пути (секунды)
    pub repath_interval: f32,
    /// Сколько секунд без визуального контакта до потери цели
    pub lose_sight_timeout: f32,
    /// Скорость доворота к цели без root rotation (rad/s)
    pub turn_speed: f32,
    /// Высота глаз цели для look-at IK
    pub look_at_height: f32,
    pub look_at_weight: f32,
    pub field_of_view: f32,
}

impl Default for PursuitConfig {
    fn default() -> Self {
        Self {
            speed: 4.0,
            repath_interval: 0.5,
            lose_sight_timeout: 3.0,
            turn_speed: std::f32::consts::PI,
            look_at_height: 1.6,
            look_at_weight: 1.0,
            // В погоне смотрим шире, чем в патруле
            field_of_view: DEFAULT_FIELD_OF_VIEW * 1.5,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PursuitState {
    pub config: PursuitConfig,
    repath_timer: f32,
    lost_timer: f32,
}

impl PursuitState {
    pub fn new(config: PursuitConfig) -> Self {
        Self {
            config,
            repath_timer: 0.0,
            lost_timer: 0.0,
        }
    }
}

impl AIState for PursuitState {
    fn state_type(&self) -> AIStateType {
        AIStateType::Pursuit
    }

    fn on_enter(&mut self, ctx: &mut StateContext<'_>) {
        self.repath_timer = self.config.repath_interval;
        self.lost_timer = 0.0;

        ctx.nav.set_speed(self.config.speed);
        if ctx.ai.target().is_some() {
            ctx.nav.move_toward(ctx.ai.target_position());
        }
    }

    fn on_update(&mut self, ctx: &mut StateContext<'_>) -> AIStateType {
        if ctx.ai.is_dead() {
            return AIStateType::Dead;
        }

        let delta = ctx.ai.delta();

        if ctx.ai.visual_threat.is_some() {
            let threat = ctx.ai.visual_threat;
            ctx.ai.set_target_from(threat);
            self.lost_timer = 0.0;

            self.repath_timer -= delta;
            if self.repath_timer <= 0.0 || ctx.nav.destination().is_none() {
                ctx.nav.move_toward(threat.position);
                self.repath_timer = self.config.repath_interval;
            }

            return AIStateType::Pursuit;
        }

        self.lost_timer += delta;
        if self.lost_timer < self.config.lose_sight_timeout {
            // Бежим к последней известной позиции
            return AIStateType::Pursuit;
        }

        if ctx.ai.audio_threat.is_some() {
            let threat = ctx.ai.audio_threat;
            ctx.ai.set_target_from(threat);
            return AIStateType::Alerted;
        }

        AIStateType::Idle
    }

    fn on_exit(&mut self, ctx: &mut StateContext<'_>) {
        ctx.ai.look_at = None;
    }

    fn on_trigger_event(&mut self, ctx: &mut StateContext<'_>, event: AITriggerEventType, other: &Obstacle) {
        perceive(ctx.ai, event, other, self.config.field_of_view);
    }

    fn on_animator_synced(&mut self, ctx: &mut StateContext<'_>) {
        // С root rotation поворачивает анимация, иначе доворачиваем сами
        if ctx.ai.use_root_rotation() || ctx.ai.target().is_none() {
            return;
        }

        let Some(wanted) = look_rotation(ctx.ai.position(), ctx.ai.target_position()) else {
            return;
        };

        let current = ctx.ai.rotation();
        let angle = current.angle_between(wanted);
        let facing = if angle > f32::EPSILON {
            let t = (self.config.turn_speed * ctx.ai.delta() / angle).min(1.0);
            current.slerp(wanted, t)
        } else {
            wanted
        };
        ctx.ai.desired_facing = Some(facing);
    }

    fn on_animator_ik_synced(&mut self, ctx: &mut StateContext<'_>) {
        ctx.ai.look_at = if ctx.ai.target_type() == AITargetType::VisualPlayer {
            Some(LookAtGoal {
                position: ctx.ai.target_position() + Vec3::Y * self.config.look_at_height,
                weight: self.config.look_at_weight,
            })
        } else {
            None
        };
    }
}
