//! AI systems — ECS обвязка вокруг `AIStateMachine`
//!
//! Порядок фаз задаёт `AISet` (см. `ai::AIPlugin`).

pub mod animator;
pub mod lifecycle;
pub mod tick;
pub mod triggers;

// Re-export all systems
pub use animator::*;
pub use lifecycle::*;
pub use tick::*;
pub use triggers::*;
