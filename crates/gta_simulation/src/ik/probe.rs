//! Ground probing для foot IK
//!
//! Solver не знает про физику: луч вниз кидает `GroundProbe`.
//! В игре это rapier (`physics::RapierGroundProbe`), headless — `FlatGround`.

use bevy::prelude::*;

/// Точка контакта луча с землёй
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundHit {
    pub point: Vec3,
    pub normal: Vec3,
}

pub trait GroundProbe {
    /// Луч строго вниз из `origin` длиной `max_distance` (только environment слой)
    fn cast_down(&self, origin: Vec3, max_distance: f32) -> Option<GroundHit>;
}

/// Бесконечная горизонтальная плоскость (headless симуляция, тесты)
#[derive(Resource, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Resource)]
pub struct FlatGround {
    pub height: f32,
}

impl Default for FlatGround {
    fn default() -> Self {
        Self { height: 0.0 }
    }
}

impl GroundProbe for FlatGround {
    fn cast_down(&self, origin: Vec3, max_distance: f32) -> Option<GroundHit> {
        let drop = origin.y - self.height;
        if drop < 0.0 || drop > max_distance {
            return None;
        }

        Some(GroundHit {
            point: Vec3::new(origin.x, self.height, origin.z),
            normal: Vec3::Y,
        })
    }
}

/// Луч никогда ни во что не попадает
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGround;

impl GroundProbe for NoGround {
    fn cast_down(&self, _origin: Vec3, _max_distance: f32) -> Option<GroundHit> {
        None
    }
}
