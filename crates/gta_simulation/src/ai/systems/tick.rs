//! Фазы тика: begin (до physics pass) и decide (после).

use bevy::prelude::*;

use crate::ai::{AIStateChanged, AIStateMachine};
use crate::navigation::NavAgent;

/// Система: clear perception, снимок позы, distance до цели, reset reached
pub fn begin_ai_tick(mut machines: Query<(&mut AIStateMachine, &Transform)>, time: Res<Time<Fixed>>) {
    let delta = time.delta_secs();

    for (mut machine, transform) in machines.iter_mut() {
        machine.begin_tick(transform.translation, transform.rotation, delta);
    }
}

/// Система: on_update текущего state + transition protocol
///
/// Переходы уходят в `AIStateChanged`.
pub fn update_ai_states(
    mut machines: Query<(Entity, &mut AIStateMachine, &mut NavAgent)>,
    mut changed: EventWriter<AIStateChanged>,
) {
    for (agent, mut machine, mut nav) in machines.iter_mut() {
        let Some(transition) = machine.update(nav.as_mut()) else {
            continue;
        };

        changed.write(AIStateChanged {
            agent,
            from: transition.from,
            requested: transition.requested,
            active: transition.active,
        });
    }
}
