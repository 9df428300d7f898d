//! Navigation adapter
//!
//! Pathfinding — внешний коллаборатор: AI отдаёт destination и читает
//! reached / not reached. `NavAgent` — headless stand-in (прямая линия,
//! без navmesh), в игре его заменяет NavigationAgent движка.
//!
//! Position/rotation authority: если AI state machine держит root motion,
//! навигация НЕ двигает/вращает агента (это делает анимация).

use bevy::prelude::*;

/// Контракт навигационного агента, который видят AI states
pub trait NavigationAgent {
    /// Идти к точке (перезаписывает текущий destination)
    fn move_toward(&mut self, destination: Vec3);

    /// Сбросить путь и остановиться
    fn stop(&mut self);

    /// Кто управляет position/rotation: навигация (true) или root motion (false)
    fn set_position_rotation_control(&mut self, position: bool, rotation: bool);

    fn set_speed(&mut self, speed: f32);

    fn destination(&self) -> Option<Vec3>;

    /// Агент дошёл до destination (в пределах stopping distance)
    fn is_reached(&self) -> bool;
}

/// Straight-line навигация для headless симуляции
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct NavAgent {
    pub destination: Option<Vec3>,
    /// Скорость (m/s)
    pub speed: f32,
    /// Скорость поворота (rad/s)
    pub angular_speed: f32,
    pub stopping_distance: f32,
    pub update_position: bool,
    pub update_rotation: bool,
    pub reached: bool,
}

impl Default for NavAgent {
    fn default() -> Self {
        Self {
            destination: None,
            speed: 2.0,
            angular_speed: std::f32::consts::TAU,
            stopping_distance: 0.1,
            update_position: true,
            update_rotation: true,
            reached: false,
        }
    }
}

impl NavigationAgent for NavAgent {
    fn move_toward(&mut self, destination: Vec3) {
        if self.destination != Some(destination) {
            self.reached = false;
        }
        self.destination = Some(destination);
    }

    fn stop(&mut self) {
        self.destination = None;
        self.reached = false;
    }

    fn set_position_rotation_control(&mut self, position: bool, rotation: bool) {
        self.update_position = position;
        self.update_rotation = rotation;
    }

    fn set_speed(&mut self, speed: f32) {
        self.speed = speed.max(0.0);
    }

    fn destination(&self) -> Option<Vec3> {
        self.destination
    }

    fn is_reached(&self) -> bool {
        self.reached
    }
}

impl NavAgent {
    /// Один шаг движения к destination (XZ-плоскость, Y не трогаем)
    pub fn step(&mut self, transform: &mut Transform, delta: f32) {
        let Some(destination) = self.destination else {
            return;
        };

        let mut to_target = destination - transform.translation;
        to_target.y = 0.0;
        let distance = to_target.length();

        if distance <= self.stopping_distance {
            self.reached = true;
            return;
        }
        self.reached = false;

        let direction = to_target / distance;

        if self.update_rotation {
            let target_rotation = Transform::IDENTITY.looking_to(direction, Vec3::Y).rotation;
            let angle = transform.rotation.angle_between(target_rotation);
            if angle > f32::EPSILON {
                let t = (self.angular_speed * delta / angle).min(1.0);
                transform.rotation = transform.rotation.slerp(target_rotation, t);
            }
        }

        if self.update_position {
            let step = (self.speed * delta).min(distance);
            transform.translation += direction * step;
        }
    }
}

/// Система: двигает NavAgent'ов к destination (FixedUpdate)
pub fn drive_nav_agents(mut agents: Query<(&mut NavAgent, &mut Transform)>, time: Res<Time<Fixed>>) {
    let delta = time.delta_secs();

    for (mut agent, mut transform) in agents.iter_mut() {
        agent.step(&mut transform, delta);
    }
}
