//! Player module
//!
//! Locomotion игрока: input → animator параметры + camera-relative движение.
//! Выполняется до physics pass AI, чтобы sensor'ы видели свежую позицию.

use bevy::prelude::*;

pub mod locomotion;
pub mod player;


pub use locomotion::{player_locomotion, PlayerCamera, PlayerInput, PlayerMovement, PlayerMovementConfig};
pub use player::{spawn_player, Player};

use crate::ai::AISet;

/// Player Plugin
pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<PlayerInput>()
            .register_type::<PlayerCamera>()
            .register_type::<PlayerMovement>()
            .add_systems(
                FixedUpdate,
                player_locomotion
                    .after(AISet::BeginTick)
                    .before(AISet::Triggers),
            );
    }
}
