//! Старт state machines новых агентов.

use bevy::prelude::*;
use rand::Rng;

use crate::ai::states::default_states;
use crate::ai::{AIStateMachine, AgentColliders, PendingStates, SceneRegistry};
use crate::navigation::NavAgent;
use crate::DeterministicRng;

/// Система: регистрирует colliders в SceneRegistry, добавляет states,
/// входит в initial state
///
/// Seed машины берётся из `DeterministicRng` (порядок spawn'а → одинаковые seeds).
pub fn start_state_machines(
    mut commands: Commands,
    mut machines: Query<
        (
            Entity,
            &mut AIStateMachine,
            &mut NavAgent,
            &Transform,
            Option<&AgentColliders>,
            Option<&mut PendingStates>,
        ),
        Added<AIStateMachine>,
    >,
    mut registry: ResMut<SceneRegistry>,
    mut rng: Option<ResMut<DeterministicRng>>,
) {
    for (entity, mut machine, mut nav, transform, colliders, pending) in machines.iter_mut() {
        if let Some(rng) = rng.as_mut() {
            let seed: u64 = rng.rng.gen();
            machine.context_mut().reseed(seed);
        }

        let colliders = colliders.copied().unwrap_or(AgentColliders {
            body: Some(entity),
            ..default()
        });
        for collider in [colliders.body, colliders.sensor, colliders.arrival].into_iter().flatten() {
            registry.register(collider, entity);
        }

        let states = match pending {
            Some(mut pending) => {
                commands.entity(entity).remove::<PendingStates>();
                std::mem::take(&mut pending.0)
            }
            None => default_states(),
        };

        // Поза нужна уже в on_enter (Patrol берёт distance до waypoint'а)
        machine.begin_tick(transform.translation, transform.rotation, 0.0);
        machine.initialize(&colliders, states, nav.as_mut());

        crate::logger::log_info(&format!(
            "AI agent {:?} started in {:?} (colliders: {:?})",
            entity,
            machine.active_state_type(),
            colliders
        ));
    }
}
