//! Routing trigger событий physics pass'а в state machines.

use bevy::prelude::*;

use crate::ai::{AIStateMachine, AgentKilled, ArrivalTriggerEvent, SceneRegistry, SensorTriggerEvent};
use crate::navigation::NavAgent;

/// Система: sensor Enter/Stay/Exit → `on_trigger_event` владельца sensor'а
pub fn dispatch_sensor_triggers(
    mut events: EventReader<SensorTriggerEvent>,
    registry: Res<SceneRegistry>,
    mut machines: Query<(&mut AIStateMachine, &mut NavAgent)>,
) {
    for trigger in events.read() {
        let Some(owner) = registry.machine_for(trigger.sensor) else {
            continue;
        };

        // Агент не реагирует на собственное тело
        if registry.machine_for(trigger.other.entity) == Some(owner) {
            continue;
        }

        let Ok((mut machine, mut nav)) = machines.get_mut(owner) else {
            continue;
        };

        machine.on_trigger_event(trigger.event, &trigger.other, nav.as_mut());
    }
}

/// Система: тело агента в arrival volume → target reached
pub fn dispatch_arrival_triggers(
    mut events: EventReader<ArrivalTriggerEvent>,
    registry: Res<SceneRegistry>,
    mut machines: Query<(&mut AIStateMachine, &mut NavAgent)>,
) {
    for trigger in events.read() {
        let Some(owner) = registry.machine_for(trigger.body) else {
            continue;
        };

        let Ok((mut machine, mut nav)) = machines.get_mut(owner) else {
            continue;
        };

        machine.on_arrival_trigger(trigger.event, trigger.trigger, nav.as_mut());
    }
}

/// Система: AgentKilled → машина переходит в Dead на ближайшем update
pub fn apply_agent_kills(mut events: EventReader<AgentKilled>, mut machines: Query<&mut AIStateMachine>) {
    for killed in events.read() {
        let Ok(mut machine) = machines.get_mut(killed.agent) else {
            continue;
        };

        if !machine.context().is_dead() {
            machine.kill();
            crate::logger::log(&format!("AI agent {:?} killed", killed.agent));
        }
    }
}
