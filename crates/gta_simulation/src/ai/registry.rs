//! SceneRegistry — collider → владеющая state machine.
//!
//! Trigger callbacks приходят с collider entity; через registry находим
//! agent entity с `AIStateMachine`. Заполняется при старте машины,
//! ядро записи не удаляет (despawn'нутый агент просто не найдётся в Query).

use std::collections::HashMap;

use bevy::prelude::*;

#[derive(Resource, Debug, Default)]
pub struct SceneRegistry {
    machines: HashMap<Entity, Entity>,
}

impl SceneRegistry {
    /// Регистрирует collider. Повторная регистрация перезаписывает владельца.
    pub fn register(&mut self, collider: Entity, machine: Entity) {
        if let Some(previous) = self.machines.insert(collider, machine) {
            if previous != machine {
                crate::logger::log_warning(&format!(
                    "SceneRegistry: collider {:?} moved from {:?} to {:?}",
                    collider, previous, machine
                ));
            }
        }
    }

    pub fn machine_for(&self, collider: Entity) -> Option<Entity> {
        self.machines.get(&collider).copied()
    }

    pub fn len(&self) -> usize {
        self.machines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.machines.is_empty()
    }
}
