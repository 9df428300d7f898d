//! Player control marker component и spawn игрока
//!
//! Отмечает entity которым управляет игрок через input (в отличие от AI).

use bevy::prelude::*;

use crate::ai::Stimulus;
use crate::animation::AnimatorRig;
use crate::ik::{FootIkConfig, FootIkSolver};
use crate::player::{PlayerCamera, PlayerInput, PlayerMovement, PlayerMovementConfig};

/// Marker component для player-controlled entity
///
/// Акторы С этим компонентом получают команды от player input systems,
/// AI sensor'ы видят их как `Stimulus::Player`.
///
/// # Possession
/// Для переключения контроля между акторами:
/// ```ignore
/// commands.entity(old_actor).remove::<Player>();
/// commands.entity(new_actor).insert(Player);
/// ```
#[derive(Component, Debug, Clone, Copy, Default)]
#[require(PlayerInput, PlayerMovement, PlayerCamera, AnimatorRig, Transform)]
pub struct Player;

/// Spawn игрока: locomotion, foot IK, видимость для AI sensor'ов
pub fn spawn_player(
    commands: &mut Commands,
    position: Vec3,
    movement: PlayerMovementConfig,
    foot_ik: FootIkConfig,
) -> Entity {
    commands
        .spawn((
            Player,
            Transform::from_translation(position),
            PlayerMovement::new(movement),
            FootIkSolver::new(foot_ik),
            Stimulus::Player,
        ))
        .id()
}
