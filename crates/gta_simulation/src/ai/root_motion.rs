//! Root motion requests
//!
//! Несколько states/behaviours могут одновременно хотеть, чтобы агента
//! двигала анимация (root motion), а не навигация. Поэтому это ref-count,
//! а не флаг: authority возвращается навигации, только когда все отпустили.
//!
//! `RootMotionRequest` — токен, который state держит у себя: acquire/release
//! идемпотентны, поэтому ранний return из `on_update` не может дать
//! лишний +1 или двойной −1.

use crate::ai::AIContext;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RootMotionRequest {
    position: bool,
    rotation: bool,
    held: bool,
}

impl RootMotionRequest {
    pub const fn new(position: bool, rotation: bool) -> Self {
        Self {
            position,
            rotation,
            held: false,
        }
    }

    pub const fn rotation_only() -> Self {
        Self::new(false, true)
    }

    pub const fn position_only() -> Self {
        Self::new(true, false)
    }

    pub fn is_held(&self) -> bool {
        self.held
    }

    pub fn acquire(&mut self, ctx: &mut AIContext) {
        if self.held {
            return;
        }
        ctx.request_root_motion(self.position as i32, self.rotation as i32);
        self.held = true;
    }

    pub fn release(&mut self, ctx: &mut AIContext) {
        if !self.held {
            return;
        }
        ctx.request_root_motion(-(self.position as i32), -(self.rotation as i32));
        self.held = false;
    }
}
