//! Headless trigger source: сферы sensor'ов и arrival volumes без физики
//!
//! Каждый тик сравнивает текущие пересечения с прошлыми и шлёт
//! Enter (новое) / Stay (продолжается) / Exit (пропало). Порядок событий
//! детерминирован (BTreeMap по Entity).

use std::collections::BTreeMap;

use bevy::prelude::*;

use crate::ai::{
    AIStateMachine, AITriggerEventType, AgentColliders, ArrivalTriggerEvent, Obstacle, SensorTriggerEvent,
    Stimulus, TriggerSourceSet,
};

/// Пересечения прошлого тика
#[derive(Resource, Debug, Default)]
pub struct ProximityTriggers {
    /// (sensor, stimulus) → последний известный obstacle
    sensors: BTreeMap<(Entity, Entity), Obstacle>,
    /// (body, arrival trigger)
    arrivals: BTreeMap<(Entity, Entity), ()>,
}

impl ProximityTriggers {
    pub fn sensor_pairs(&self) -> usize {
        self.sensors.len()
    }

    pub fn arrival_pairs(&self) -> usize {
        self.arrivals.len()
    }
}

/// Радиус stimulus'а для пересечения со сферой sensor'а
fn stimulus_extent(stimulus: &Stimulus) -> f32 {
    match *stimulus {
        Stimulus::Player => 0.0,
        Stimulus::Audio { radius } => radius,
    }
}

/// Система: пересечения sensor/stimulus и body/arrival volume → trigger события
pub fn detect_proximity_triggers(
    machines: Query<(&AIStateMachine, &Transform, &AgentColliders)>,
    stimuli: Query<(Entity, &Stimulus, &Transform)>,
    mut state: ResMut<ProximityTriggers>,
    mut sensor_events: EventWriter<SensorTriggerEvent>,
    mut arrival_events: EventWriter<ArrivalTriggerEvent>,
) {
    let mut sensors = BTreeMap::new();
    let mut arrivals = BTreeMap::new();

    for (machine, transform, colliders) in machines.iter() {
        let context = machine.context();

        if let Some(sensor) = colliders.sensor {
            let volume = context.sensor();
            let center = transform.translation + transform.rotation * volume.offset;

            for (entity, stimulus, stimulus_transform) in stimuli.iter() {
                if Some(entity) == colliders.body {
                    continue;
                }

                let position = stimulus_transform.translation;
                if center.distance(position) > volume.radius + stimulus_extent(stimulus) {
                    continue;
                }

                sensors.insert(
                    (sensor, entity),
                    Obstacle {
                        entity,
                        kind: stimulus.obstacle_kind(),
                        position,
                    },
                );
            }
        }

        if let (Some(body), Some(trigger)) = (colliders.body, colliders.arrival) {
            if context.arrival().contains(transform.translation) {
                arrivals.insert((body, trigger), ());
            }
        }
    }

    for (&(sensor, _), obstacle) in sensors.iter() {
        let event = if state.sensors.contains_key(&(sensor, obstacle.entity)) {
            AITriggerEventType::Stay
        } else {
            AITriggerEventType::Enter
        };
        sensor_events.write(SensorTriggerEvent {
            sensor,
            event,
            other: *obstacle,
        });
    }
    for (&(sensor, other), obstacle) in state.sensors.iter() {
        if !sensors.contains_key(&(sensor, other)) {
            sensor_events.write(SensorTriggerEvent {
                sensor,
                event: AITriggerEventType::Exit,
                other: *obstacle,
            });
        }
    }

    for &(body, trigger) in arrivals.keys() {
        let event = if state.arrivals.contains_key(&(body, trigger)) {
            AITriggerEventType::Stay
        } else {
            AITriggerEventType::Enter
        };
        arrival_events.write(ArrivalTriggerEvent { body, event, trigger });
    }
    for &(body, trigger) in state.arrivals.keys() {
        if !arrivals.contains_key(&(body, trigger)) {
            arrival_events.write(ArrivalTriggerEvent {
                body,
                event: AITriggerEventType::Exit,
                trigger,
            });
        }
    }

    state.sensors = sensors;
    state.arrivals = arrivals;
}

/// Headless trigger source (без rapier)
pub struct ProximityTriggerPlugin;

impl Plugin for ProximityTriggerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ProximityTriggers>()
            .add_systems(FixedUpdate, detect_proximity_triggers.in_set(TriggerSourceSet));
    }
}
