//! Player locomotion: input → animator параметры, поворот, движение
//!
//! Направление движения относительно камеры (forward/right на плоскости XZ),
//! масштабируется delta тика. Кнопки slide/equip срабатывают по фронту
//! нажатия, а не пока кнопка зажата.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::animation::AnimatorRig;
use crate::player::Player;

// Имена параметров аниматора
pub const INPUT_X: &str = "InputX";
pub const INPUT_Z: &str = "InputZ";
pub const INPUT_MAGNITUDE: &str = "InputMagnitude";
pub const IS_RUNNING: &str = "isRunning";
pub const IS_SLIDING: &str = "isSliding";
pub const IS_CROUCHING: &str = "isCrouching";
pub const IS_JUMPING: &str = "isJumping";
pub const IS_ARMED: &str = "isArmed";

/// Состояние input'а игрока за тик (пишет input layer движка)
///
/// Кнопки — текущее "зажато", фронт вычисляет `PlayerMovement`.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct PlayerInput {
    /// Horizontal axis (-1..1)
    pub axis_x: f32,
    /// Vertical axis (-1..1)
    pub axis_z: f32,
    pub running: bool,
    pub slide: bool,
    pub crouching: bool,
    pub jumping: bool,
    pub equip: bool,
}

/// Камера, относительно которой игрок двигается
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct PlayerCamera {
    pub rotation: Quat,
}

impl Default for PlayerCamera {
    fn default() -> Self {
        Self {
            rotation: Quat::IDENTITY,
        }
    }
}

impl PlayerCamera {
    /// Forward камеры на плоскости XZ (нулевой, если камера смотрит вертикально)
    pub fn flat_forward(&self) -> Vec3 {
        flatten(self.rotation * Vec3::NEG_Z)
    }

    pub fn flat_right(&self) -> Vec3 {
        flatten(self.rotation * Vec3::X)
    }
}

fn flatten(direction: Vec3) -> Vec3 {
    Vec3::new(direction.x, 0.0, direction.z).normalize_or_zero()
}

#[derive(Debug, Clone, Reflect, Serialize, Deserialize)]
pub struct PlayerMovementConfig {
    /// Slerp factor поворота за секунду
    pub desired_rotation_speed: f32,
    /// Множитель скорости перемещения (m/s при полном отклонении оси)
    pub move_speed: f32,
}

impl Default for PlayerMovementConfig {
    fn default() -> Self {
        Self {
            desired_rotation_speed: 10.0,
            move_speed: 1.0,
        }
    }
}

/// Locomotion state игрока
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct PlayerMovement {
    pub config: PlayerMovementConfig,
    /// Смещение за последний тик (world space)
    pub desired_move_direction: Vec3,
    /// Угол направления движения относительно forward мира, градусы
    pub angle_to_target: f32,
    /// Квадрат отклонения осей
    pub input_magnitude: f32,
    pub armed: bool,
    // Прошлый тик, для фронтов нажатия
    slide_was_held: bool,
    equip_was_held: bool,
}

impl PlayerMovement {
    pub fn new(config: PlayerMovementConfig) -> Self {
        Self {
            config,
            ..default()
        }
    }

    /// Один тик locomotion
    pub fn step(
        &mut self,
        input: &PlayerInput,
        camera: &PlayerCamera,
        transform: &mut Transform,
        animator: &mut AnimatorRig,
        delta: f32,
    ) {
        let slide_pressed = input.slide && !self.slide_was_held;
        let equip_pressed = input.equip && !self.equip_was_held;
        self.slide_was_held = input.slide;
        self.equip_was_held = input.equip;

        if equip_pressed {
            self.armed = !self.armed;
        }

        self.input_magnitude = Vec2::new(input.axis_x, input.axis_z).length_squared();

        animator.set_float(INPUT_X, input.axis_x);
        animator.set_float(INPUT_Z, input.axis_z);
        animator.set_float(INPUT_MAGNITUDE, self.input_magnitude);
        animator.set_bool(IS_RUNNING, input.running);
        animator.set_bool(IS_SLIDING, input.running && slide_pressed);
        animator.set_bool(IS_CROUCHING, input.crouching);
        animator.set_bool(IS_JUMPING, input.jumping);
        animator.set_bool(IS_ARMED, self.armed);

        let scale = delta * self.config.move_speed;
        self.desired_move_direction =
            (camera.flat_forward() * input.axis_z + camera.flat_right() * input.axis_x) * scale;

        let flat = flatten(self.desired_move_direction);
        if flat == Vec3::ZERO {
            // Нет ввода: ориентацию не трогаем
            return;
        }

        // Right = +90°, назад = ±180°
        self.angle_to_target = flat.x.atan2(-flat.z).to_degrees();

        let look = Transform::IDENTITY.looking_to(flat, Vec3::Y).rotation;
        let t = (self.config.desired_rotation_speed * delta).clamp(0.0, 1.0);
        transform.rotation = transform.rotation.slerp(look, t);
        transform.translation += self.desired_move_direction;
    }
}

/// Система: locomotion всех player-controlled entity
pub fn player_locomotion(
    mut players: Query<
        (
            &PlayerInput,
            &PlayerCamera,
            &mut PlayerMovement,
            &mut Transform,
            &mut AnimatorRig,
        ),
        With<Player>,
    >,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for (input, camera, mut movement, mut transform, mut animator) in players.iter_mut() {
        movement.step(input, camera, &mut transform, &mut animator, delta);
    }
}
