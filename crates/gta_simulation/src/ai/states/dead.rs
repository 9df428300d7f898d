//! Dead — терминальный state, исходящих переходов нет.

use crate::ai::{AIState, AIStateType, StateContext};

#[derive(Debug, Clone, Copy, Default)]
pub struct DeadState;

impl AIState for DeadState {
    fn state_type(&self) -> AIStateType {
        AIStateType::Dead
    }

    fn on_enter(&mut self, ctx: &mut StateContext<'_>) {
        ctx.nav.stop();
        ctx.ai.clear_target();
        ctx.ai.desired_facing = None;
        ctx.ai.look_at = None;
        ctx.ai.seeking = 0;
    }

    fn on_update(&mut self, _ctx: &mut StateContext<'_>) -> AIStateType {
        AIStateType::Dead
    }
}
