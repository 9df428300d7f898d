//! Конкретные AI states
//!
//! Idle → (threat) Alerted → (visual) Pursuit
//! Idle → (timeout) Patrol/Walk → (threat) Alerted/Pursuit
//! Любой → (killed) Dead (терминальный)

use bevy::prelude::*;

use crate::ai::{AIContext, AIState, AITargetType, AITriggerEventType, Obstacle, ObstacleKind};

pub mod alerted;
pub mod dead;
pub mod idle;
pub mod patrol;
pub mod pursuit;

#[cfg(test)]
mod states_tests;

pub use alerted::{AlertedConfig, AlertedState};
pub use dead::DeadState;
pub use idle::{IdleConfig, IdleState};
pub use patrol::{PatrolConfig, PatrolState};
pub use pursuit::{PursuitConfig, PursuitState};

/// Поле зрения по умолчанию (градусы, полный угол конуса)
pub const DEFAULT_FIELD_OF_VIEW: f32 = 90.0;

/// Стандартный набор states для NPC
pub fn default_states() -> Vec<Box<dyn AIState>> {
    vec![
        Box::new(IdleState::default()),
        Box::new(PatrolState::patrol()),
        Box::new(PatrolState::walk()),
        Box::new(AlertedState::default()),
        Box::new(PursuitState::default()),
        Box::new(DeadState),
    ]
}

/// Общая perception логика (sensor Enter/Stay)
///
/// - Player в FOV → VisualThreat (если ближе текущей)
/// - AudioEmitter в пределах своего radius → AudioThreat,
///   только пока visual threat не выставлена (и если ближе текущей)
pub fn perceive(ai: &mut AIContext, event: AITriggerEventType, other: &Obstacle, field_of_view: f32) {
    if event == AITriggerEventType::Exit {
        return;
    }

    let sensor_position = ai.sensor_position();
    let distance = sensor_position.distance(other.position);

    match other.kind {
        ObstacleKind::Player => {
            let closer = ai.visual_threat.kind != AITargetType::VisualPlayer
                || distance < ai.visual_threat.distance;

            if closer && in_field_of_view(ai, other.position, field_of_view) {
                ai.visual_threat
                    .set(AITargetType::VisualPlayer, Some(other.entity), other.position, distance);
            }
        }
        ObstacleKind::AudioEmitter { radius } => {
            if ai.visual_threat.kind == AITargetType::VisualPlayer || distance > radius {
                return;
            }

            let closer = ai.audio_threat.kind != AITargetType::Audio || distance < ai.audio_threat.distance;
            if closer {
                ai.audio_threat
                    .set(AITargetType::Audio, Some(other.entity), other.position, distance);
            }
        }
        ObstacleKind::Other => {}
    }
}

/// Угол между forward агента и направлением на точку (XZ) ≤ fov/2
pub fn in_field_of_view(ai: &AIContext, point: Vec3, field_of_view: f32) -> bool {
    let mut to_point = point - ai.position();
    to_point.y = 0.0;
    if to_point.length_squared() < f32::EPSILON {
        return true;
    }

    let mut forward = ai.forward();
    forward.y = 0.0;

    let angle = forward.angle_between(to_point).to_degrees();
    angle <= field_of_view * 0.5
}

/// Поворот "смотреть на точку" (XZ), None если точка совпадает с позицией
pub fn look_rotation(from: Vec3, to: Vec3) -> Option<Quat> {
    let mut direction = to - from;
    direction.y = 0.0;
    if direction.length_squared() < f32::EPSILON {
        return None;
    }
    Some(Transform::IDENTITY.looking_to(direction, Vec3::Y).rotation)
}
