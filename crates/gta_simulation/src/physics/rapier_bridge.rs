//! Rapier bridge: colliders для AI volumes, CollisionEvent → AI trigger события,
//! лучи foot IK.
//!
//! Rapier сообщает только Started/Stopped. Stay синтезируется из активных
//! пар каждый тик (как OnTriggerStay у движка).
//!
//! Rapier шагает в FixedUpdate внутри `AISet::Triggers`:
//! volumes → SyncBackend → StepSimulation → Writeback → `TriggerSourceSet`.
//! Позиции к этому моменту уже сдвинуты `AISet::Navigate` прошлого тика
//! и player locomotion, события читаются в том же тике.
//!
//! Colliders AI без RigidBody: Transform пишут только navigation и
//! locomotion, rapier их обратно не перезаписывает.

use std::collections::BTreeMap;

use bevy::prelude::*;
use bevy_rapier3d::plugin::PhysicsSet;
use bevy_rapier3d::prelude::*;

use crate::ai::{
    AISensorCollider, AIStateMachine, AITriggerEventType, AgentColliders, ArrivalTriggerCollider,
    ArrivalTriggerEvent, AISet, Obstacle, SensorTriggerEvent, Stimulus, TriggerSourceSet,
};
use crate::animation::AnimatorRig;
use crate::ik::{systems::probe_feet, FootIkSet, FootIkSolver, GroundHit, GroundProbe};
use crate::physics::groups;

/// Минимальный радиус collider'а (rapier не любит вырожденные шары)
const MIN_VOLUME_RADIUS: f32 = 0.01;

/// Активные пары rapier (для синтеза Stay)
#[derive(Resource, Debug, Default)]
pub struct RapierTriggerPairs {
    sensors: BTreeMap<(Entity, Entity), ()>,
    arrivals: BTreeMap<(Entity, Entity), ()>,
}

impl RapierTriggerPairs {
    pub fn sensor_pairs(&self) -> usize {
        self.sensors.len()
    }

    pub fn arrival_pairs(&self) -> usize {
        self.arrivals.len()
    }
}

/// Лучи foot IK через rapier query pipeline
pub struct RapierGroundProbe<'a, 'w> {
    context: &'a RapierContext<'w>,
}

impl<'a, 'w> RapierGroundProbe<'a, 'w> {
    pub fn new(context: &'a RapierContext<'w>) -> Self {
        Self { context }
    }
}

impl GroundProbe for RapierGroundProbe<'_, '_> {
    fn cast_down(&self, origin: Vec3, max_distance: f32) -> Option<GroundHit> {
        self.context
            .cast_ray_and_get_normal(origin, Vec3::NEG_Y, max_distance, true, groups::ground_ray_filter())
            .map(|(_, intersection)| GroundHit {
                point: intersection.point,
                normal: intersection.normal,
            })
    }
}

// ============================================================================
// Collider setup
// ============================================================================

/// Система: colliders для новых агентов, их volumes и stimuli
pub fn attach_ai_colliders(
    mut commands: Commands,
    bodies: Query<Entity, (Added<AIStateMachine>, Without<Collider>)>,
    sensors: Query<(Entity, &AISensorCollider), Added<AISensorCollider>>,
    arrivals: Query<Entity, Added<ArrivalTriggerCollider>>,
    stimuli: Query<(Entity, &Stimulus, Has<Collider>), Added<Stimulus>>,
    machines: Query<&AIStateMachine>,
) {
    for body in bodies.iter() {
        commands.entity(body).insert((
            Collider::capsule_y(0.5, 0.4),
            groups::actor_groups(),
            ActiveEvents::COLLISION_EVENTS,
            ActiveCollisionTypes::all(),
        ));
    }

    for (entity, sensor) in sensors.iter() {
        let radius = machines
            .get(sensor.machine)
            .map(|machine| machine.context().sensor().radius)
            .unwrap_or(0.0);

        commands.entity(entity).insert((
            Collider::ball(radius.max(MIN_VOLUME_RADIUS)),
            Sensor,
            groups::sensor_groups(),
            ActiveEvents::COLLISION_EVENTS,
            ActiveCollisionTypes::all(),
        ));
    }

    for entity in arrivals.iter() {
        // Пока цели нет, volume выключен
        commands.entity(entity).insert((
            Collider::ball(MIN_VOLUME_RADIUS),
            Sensor,
            ColliderDisabled,
            groups::arrival_groups(),
            ActiveEvents::COLLISION_EVENTS,
            ActiveCollisionTypes::all(),
        ));
    }

    for (entity, stimulus, has_collider) in stimuli.iter() {
        match *stimulus {
            Stimulus::Player => {
                if !has_collider {
                    commands.entity(entity).insert(Collider::capsule_y(0.5, 0.4));
                }
                commands.entity(entity).insert((
                    groups::player_groups(),
                    ActiveEvents::COLLISION_EVENTS,
                    ActiveCollisionTypes::all(),
                ));
            }
            Stimulus::Audio { radius } => {
                commands.entity(entity).insert((
                    Collider::ball(radius.max(MIN_VOLUME_RADIUS)),
                    groups::stimulus_groups(),
                    ActiveEvents::COLLISION_EVENTS,
                    ActiveCollisionTypes::all(),
                ));
            }
        }
    }
}

/// Система: sensor следует за агентом, arrival volume за целью
///
/// Выключенный arrival volume получает `ColliderDisabled`.
pub fn sync_ai_volumes(
    mut commands: Commands,
    machines: Query<(&AIStateMachine, &Transform, &AgentColliders)>,
    mut volumes: Query<(&mut Transform, Option<&Collider>, Has<ColliderDisabled>), Without<AIStateMachine>>,
) {
    for (machine, transform, colliders) in machines.iter() {
        let context = machine.context();

        if let Some(sensor) = colliders.sensor {
            if let Ok((mut sensor_transform, _, _)) = volumes.get_mut(sensor) {
                sensor_transform.translation = transform.translation + transform.rotation * context.sensor().offset;
                sensor_transform.rotation = transform.rotation;
            }
        }

        let Some(arrival) = colliders.arrival else {
            continue;
        };
        let Ok((mut arrival_transform, collider, disabled)) = volumes.get_mut(arrival) else {
            continue;
        };

        let volume = context.arrival();
        if volume.enabled {
            arrival_transform.translation = volume.center;

            let radius = volume.radius.max(MIN_VOLUME_RADIUS);
            let current = collider.and_then(|c| c.as_ball()).map(|ball| ball.radius());
            if current.map_or(true, |r| (r - radius).abs() > f32::EPSILON) {
                commands.entity(arrival).insert(Collider::ball(radius));
            }
            if disabled {
                commands.entity(arrival).remove::<ColliderDisabled>();
            }
        } else if !disabled {
            commands.entity(arrival).insert(ColliderDisabled);
        }
    }
}

/// Система: GlobalTransform root colliders = Transform
///
/// TransformPlugin пересчитывает GlobalTransform только в PostUpdate, а
/// SyncBackend читает его сразу после Navigate/locomotion и `sync_ai_volumes`.
pub fn sync_collider_globals(
    mut colliders: Query<(&Transform, &mut GlobalTransform), (With<Collider>, Without<ChildOf>, Changed<Transform>)>,
) {
    for (transform, mut global) in colliders.iter_mut() {
        *global = GlobalTransform::from(*transform);
    }
}

// ============================================================================
// Events
// ============================================================================

/// Система: rapier CollisionEvent → Sensor/ArrivalTriggerEvent (+ синтез Stay)
pub fn emit_rapier_triggers(
    mut collisions: EventReader<CollisionEvent>,
    mut pairs: ResMut<RapierTriggerPairs>,
    sensors: Query<(), With<AISensorCollider>>,
    arrivals: Query<(), With<ArrivalTriggerCollider>>,
    stimuli: Query<(&Stimulus, &Transform)>,
    mut sensor_events: EventWriter<SensorTriggerEvent>,
    mut arrival_events: EventWriter<ArrivalTriggerEvent>,
) {
    let mut started_sensors = Vec::new();
    let mut started_arrivals = Vec::new();

    for collision in collisions.read() {
        let (a, b, started) = match *collision {
            CollisionEvent::Started(a, b, _) => (a, b, true),
            CollisionEvent::Stopped(a, b, _) => (a, b, false),
        };

        for (first, second) in [(a, b), (b, a)] {
            if sensors.contains(first) && stimuli.contains(second) {
                let key = (first, second);
                if started {
                    pairs.sensors.insert(key, ());
                    started_sensors.push(key);
                } else if pairs.sensors.remove(&key).is_some() {
                    emit_sensor(&mut sensor_events, &stimuli, key, AITriggerEventType::Exit);
                }
            }

            if arrivals.contains(first) && !arrivals.contains(second) {
                // Ключ (body, trigger)
                let key = (second, first);
                if started {
                    pairs.arrivals.insert(key, ());
                    started_arrivals.push(key);
                } else if pairs.arrivals.remove(&key).is_some() {
                    arrival_events.write(ArrivalTriggerEvent {
                        body: key.0,
                        event: AITriggerEventType::Exit,
                        trigger: key.1,
                    });
                }
            }
        }
    }

    for &key in pairs.sensors.keys() {
        let event = if started_sensors.contains(&key) {
            AITriggerEventType::Enter
        } else {
            AITriggerEventType::Stay
        };
        emit_sensor(&mut sensor_events, &stimuli, key, event);
    }

    for &(body, trigger) in pairs.arrivals.keys() {
        let event = if started_arrivals.contains(&(body, trigger)) {
            AITriggerEventType::Enter
        } else {
            AITriggerEventType::Stay
        };
        arrival_events.write(ArrivalTriggerEvent { body, event, trigger });
    }
}

fn emit_sensor(
    events: &mut EventWriter<SensorTriggerEvent>,
    stimuli: &Query<(&Stimulus, &Transform)>,
    (sensor, other): (Entity, Entity),
    event: AITriggerEventType,
) {
    // Stimulus despawn'нут → событие не шлём
    let Ok((stimulus, transform)) = stimuli.get(other) else {
        return;
    };

    events.write(SensorTriggerEvent {
        sensor,
        event,
        other: Obstacle {
            entity: other,
            kind: stimulus.obstacle_kind(),
            position: transform.translation,
        },
    });
}

/// Система: лучи foot IK через rapier
pub fn probe_feet_with_rapier(
    mut solvers: Query<(&mut FootIkSolver, &Transform, &AnimatorRig)>,
    rapier: ReadRapierContext,
) {
    let Ok(context) = rapier.single() else {
        return;
    };

    probe_feet(&mut solvers, &RapierGroundProbe::new(&context));
}

/// Rapier Physics Bridge Plugin
///
/// Подключает rapier (FixedUpdate, `AISet::Triggers`), если его ещё нет,
/// и заменяет headless proximity detection реальными colliders.
/// Rapier, добавленный снаружи в другой schedule, шагает после тика:
/// события приходят на тик позже.
pub struct RapierPhysicsBridgePlugin;

impl Plugin for RapierPhysicsBridgePlugin {
    fn build(&self, app: &mut App) {
        if !app.is_plugin_added::<bevy::transform::TransformPlugin>() {
            app.add_plugins(bevy::transform::TransformPlugin);
        }
        if !app.is_plugin_added::<RapierPhysicsPlugin<NoUserData>>() {
            app.add_plugins(RapierPhysicsPlugin::<NoUserData>::default().in_schedule(FixedUpdate));
        }

        app.init_resource::<RapierTriggerPairs>()
            // Navigate (прошлый тик) → physics step → trigger события
            .configure_sets(
                FixedUpdate,
                (PhysicsSet::SyncBackend, PhysicsSet::StepSimulation, PhysicsSet::Writeback)
                    .chain()
                    .in_set(AISet::Triggers)
                    .before(TriggerSourceSet),
            )
            .add_systems(
                FixedUpdate,
                (attach_ai_colliders, sync_ai_volumes, sync_collider_globals)
                    .chain()
                    .in_set(AISet::Triggers)
                    .before(PhysicsSet::SyncBackend),
            )
            .add_systems(FixedUpdate, emit_rapier_triggers.in_set(TriggerSourceSet))
            .add_systems(FixedUpdate, probe_feet_with_rapier.in_set(FootIkSet::Probe));
    }
}
