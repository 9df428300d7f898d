//! AITarget — то, что сейчас интересует агента (угроза или waypoint).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Тип цели
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect, Serialize, Deserialize)]
pub enum AITargetType {
    #[default]
    None,
    Waypoint,
    VisualPlayer,
    Audio,
}

/// Цель агента
///
/// Инвариант: при `kind == None` position/obstacle не имеют смысла,
/// distance валиден только для `kind != None`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Reflect)]
pub struct AITarget {
    pub kind: AITargetType,
    pub position: Vec3,
    /// Collider/obstacle цели (None для waypoint'ов)
    pub obstacle: Option<Entity>,
    pub distance: f32,
}

impl AITarget {
    pub fn new(kind: AITargetType, obstacle: Option<Entity>, position: Vec3, distance: f32) -> Self {
        Self {
            kind,
            position,
            obstacle,
            distance,
        }
    }

    /// Атомарно заменяет все поля
    pub fn set(&mut self, kind: AITargetType, obstacle: Option<Entity>, position: Vec3, distance: f32) {
        *self = Self::new(kind, obstacle, position, distance);
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_none(&self) -> bool {
        self.kind == AITargetType::None
    }

    pub fn is_some(&self) -> bool {
        !self.is_none()
    }
}
