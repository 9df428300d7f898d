//! Waypoint network — упорядоченный набор точек патруля.
//!
//! Сеть read-only для AI: её авторит level designer (или spawn код),
//! state machine хранит только курсор.

use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::ai::AIConfigError;

/// Режим обхода сети
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect, Serialize, Deserialize)]
pub enum PatrolMode {
    #[default]
    Sequential,
    Random,
}

#[derive(Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
pub struct Waypoint {
    pub name: String,
    pub position: Vec3,
}

#[derive(Debug, Clone, Default, PartialEq, Reflect, Serialize, Deserialize)]
pub struct WaypointNetwork {
    pub nodes: Vec<Waypoint>,
}

impl WaypointNetwork {
    pub fn new(nodes: Vec<Waypoint>) -> Self {
        Self { nodes }
    }

    /// Сеть из позиций с автоматическими именами `Waypoint_N`
    pub fn from_positions(positions: impl IntoIterator<Item = Vec3>) -> Self {
        let nodes = positions
            .into_iter()
            .enumerate()
            .map(|(i, position)| Waypoint {
                name: format!("Waypoint_{}", i),
                position,
            })
            .collect();
        Self { nodes }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<&Waypoint, AIConfigError> {
        self.nodes.get(index).ok_or(AIConfigError::WaypointOutOfRange {
            index,
            len: self.nodes.len(),
        })
    }

    /// Начальный индекс курсора (курсор ещё не выставлен)
    pub fn first_index(&self, mode: PatrolMode, rng: &mut impl Rng) -> Result<usize, AIConfigError> {
        if self.is_empty() {
            return Err(AIConfigError::EmptyWaypointNetwork);
        }

        Ok(match mode {
            PatrolMode::Random => rng.gen_range(0..self.len()),
            PatrolMode::Sequential => 0,
        })
    }

    /// Следующий индекс после `current`
    ///
    /// Random: случайный индекс != current (если узлов > 1).
    /// Sequential: current + 1 с wraparound.
    /// `current` вне сети → `WaypointOutOfRange`.
    pub fn next_index(
        &self,
        current: usize,
        mode: PatrolMode,
        rng: &mut impl Rng,
    ) -> Result<usize, AIConfigError> {
        let len = self.len();
        if len == 0 {
            return Err(AIConfigError::EmptyWaypointNetwork);
        }
        // Курсор за пределами сети (сеть укоротили, битый config): не wrap'аем
        if current >= len {
            return Err(AIConfigError::WaypointOutOfRange { index: current, len });
        }

        if mode == PatrolMode::Random && len > 1 {
            // Сдвиг на 1..len гарантирует index != current за один бросок
            let offset = rng.gen_range(1..len);
            return Ok((current + offset) % len);
        }

        Ok(if current + 1 == len { 0 } else { current + 1 })
    }
}
