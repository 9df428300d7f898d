//! AIContext — данные state machine, доступные states.
//!
//! Отделено от `AIStateMachine`, чтобы state мог получить `&mut` контекст,
//! пока machine держит `&mut` на сам state (disjoint borrows).

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::ai::{AIConfigError, AITarget, AITargetType, PatrolMode, WaypointNetwork};
use crate::animation::LookAtGoal;
use crate::logger;

/// Верхняя граница stopping distance
pub const MAX_STOPPING_DISTANCE: f32 = 15.0;

/// Arrival-detection volume: сфера вокруг текущей цели
#[derive(Debug, Clone, Copy, PartialEq, Default, Reflect)]
pub struct ArrivalVolume {
    /// Collider volume'а (None = trigger не сконфигурирован, arrival не детектится)
    pub trigger: Option<Entity>,
    pub center: Vec3,
    pub radius: f32,
    pub enabled: bool,
}

impl ArrivalVolume {
    pub fn contains(&self, point: Vec3) -> bool {
        self.enabled && self.center.distance(point) <= self.radius
    }
}

/// Sensor агента (зрение/слух)
#[derive(Debug, Clone, Copy, PartialEq, Default, Reflect)]
pub struct SensorVolume {
    pub trigger: Option<Entity>,
    /// Offset центра sensor'а в local space агента
    pub offset: Vec3,
    pub radius: f32,
}

#[derive(Debug, Clone)]
pub struct AIContext {
    pub visual_threat: AITarget,
    pub audio_threat: AITarget,

    target: AITarget,
    root_position_ref_count: i32,
    root_rotation_ref_count: i32,
    is_target_reached: bool,

    waypoint_network: WaypointNetwork,
    current_waypoint: Option<usize>,
    patrol_mode: PatrolMode,
    stopping_distance: f32,

    arrival: ArrivalVolume,
    sensor: SensorVolume,

    // Снимок позы агента на начало тика
    position: Vec3,
    rotation: Quat,
    delta: f32,

    dead: bool,
    rng: ChaCha8Rng,

    /// Желаемый поворот (AI states пишут в pose-applied фазе)
    pub desired_facing: Option<Quat>,
    /// Look-at goal для головы (AI states пишут в IK фазе)
    pub look_at: Option<LookAtGoal>,
    /// Знак поворота на месте для turn-анимаций (-1, 0, 1)
    pub seeking: i32,
}

impl AIContext {
    pub fn new(
        waypoint_network: WaypointNetwork,
        patrol_mode: PatrolMode,
        stopping_distance: f32,
        seed: u64,
    ) -> Self {
        Self {
            visual_threat: AITarget::default(),
            audio_threat: AITarget::default(),
            target: AITarget::default(),
            root_position_ref_count: 0,
            root_rotation_ref_count: 0,
            is_target_reached: false,
            waypoint_network,
            current_waypoint: None,
            patrol_mode,
            stopping_distance: stopping_distance.clamp(0.0, MAX_STOPPING_DISTANCE),
            arrival: ArrivalVolume::default(),
            sensor: SensorVolume::default(),
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            delta: 0.0,
            dead: false,
            rng: ChaCha8Rng::seed_from_u64(seed),
            desired_facing: None,
            look_at: None,
            seeking: 0,
        }
    }

    // ------------------------------------------------------------------
    // Tick
    // ------------------------------------------------------------------

    /// Начало тика: clear perception → distance → reset reached
    pub(crate) fn begin_tick(&mut self, position: Vec3, rotation: Quat, delta: f32) {
        self.visual_threat.clear();
        self.audio_threat.clear();

        self.position = position;
        self.rotation = rotation;
        self.delta = delta;

        if self.target.is_some() {
            self.target.distance = position.distance(self.target.position);
        }

        self.is_target_reached = false;
    }

    pub(crate) fn set_target_reached(&mut self, reached: bool) {
        self.is_target_reached = reached;
    }

    pub fn is_target_reached(&self) -> bool {
        self.is_target_reached
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    /// Forward агента (Bevy: -Z)
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    pub fn delta(&self) -> f32 {
        self.delta
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    pub(crate) fn kill(&mut self) {
        self.dead = true;
    }

    pub fn rng(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }

    pub(crate) fn reseed(&mut self, seed: u64) {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
    }

    // ------------------------------------------------------------------
    // Target
    // ------------------------------------------------------------------

    pub fn target(&self) -> &AITarget {
        &self.target
    }

    pub fn target_type(&self) -> AITargetType {
        self.target.kind
    }

    pub fn target_position(&self) -> Vec3 {
        self.target.position
    }

    pub fn stopping_distance(&self) -> f32 {
        self.stopping_distance
    }

    pub fn set_stopping_distance(&mut self, distance: f32) {
        self.stopping_distance = distance.clamp(0.0, MAX_STOPPING_DISTANCE);
    }

    /// Заменяет цель и ставит arrival volume (радиус = stopping distance)
    pub fn set_target(&mut self, kind: AITargetType, obstacle: Option<Entity>, position: Vec3, distance: f32) {
        let stopping_distance = self.stopping_distance;
        self.set_target_with_stopping_distance(kind, obstacle, position, distance, stopping_distance);
    }

    pub fn set_target_with_stopping_distance(
        &mut self,
        kind: AITargetType,
        obstacle: Option<Entity>,
        position: Vec3,
        distance: f32,
        stopping_distance: f32,
    ) {
        self.target.set(kind, obstacle, position, distance);
        self.arrival.center = position;
        self.arrival.radius = stopping_distance.max(0.0);
        self.arrival.enabled = true;
    }

    /// Копирует готовый target (обычно одну из threat)
    pub fn set_target_from(&mut self, target: AITarget) {
        self.set_target(target.kind, target.obstacle, target.position, target.distance);
    }

    pub fn clear_target(&mut self) {
        self.target.clear();
        self.arrival.enabled = false;
    }

    pub fn arrival(&self) -> &ArrivalVolume {
        &self.arrival
    }

    pub(crate) fn set_arrival_trigger(&mut self, trigger: Option<Entity>) {
        self.arrival.trigger = trigger;
    }

    // ------------------------------------------------------------------
    // Sensor
    // ------------------------------------------------------------------

    pub fn sensor(&self) -> &SensorVolume {
        &self.sensor
    }

    pub(crate) fn set_sensor(&mut self, sensor: SensorVolume) {
        self.sensor = sensor;
    }

    /// World-space центр sensor'а (ZERO если sensor не сконфигурирован)
    pub fn sensor_position(&self) -> Vec3 {
        if self.sensor.trigger.is_none() {
            return Vec3::ZERO;
        }
        self.position + self.rotation * self.sensor.offset
    }

    pub fn sensor_radius(&self) -> f32 {
        if self.sensor.trigger.is_none() {
            return 0.0;
        }
        self.sensor.radius
    }

    // ------------------------------------------------------------------
    // Root motion
    // ------------------------------------------------------------------

    pub fn use_root_position(&self) -> bool {
        self.root_position_ref_count > 0
    }

    pub fn use_root_rotation(&self) -> bool {
        self.root_rotation_ref_count > 0
    }

    pub fn root_motion_ref_counts(&self) -> (i32, i32) {
        (self.root_position_ref_count, self.root_rotation_ref_count)
    }

    /// Signed deltas к ref-count'ам. Каждый +1 должен иметь парный −1.
    pub fn request_root_motion(&mut self, position: i32, rotation: i32) {
        self.root_position_ref_count = apply_ref_delta(self.root_position_ref_count, position, "position");
        self.root_rotation_ref_count = apply_ref_delta(self.root_rotation_ref_count, rotation, "rotation");
    }

    // ------------------------------------------------------------------
    // Waypoints
    // ------------------------------------------------------------------

    pub fn waypoint_network(&self) -> &WaypointNetwork {
        &self.waypoint_network
    }

    pub fn current_waypoint(&self) -> Option<usize> {
        self.current_waypoint
    }

    pub fn set_current_waypoint(&mut self, cursor: Option<usize>) {
        self.current_waypoint = cursor;
    }

    pub fn patrol_mode(&self) -> PatrolMode {
        self.patrol_mode
    }

    pub fn set_patrol_mode(&mut self, mode: PatrolMode) {
        self.patrol_mode = mode;
    }

    /// Позиция текущего (или следующего, если `advance`) waypoint'а
    ///
    /// Курсор не выставлен → первый индекс (0 или random).
    /// Цель агента становится этим waypoint'ом.
    pub fn get_waypoint_position(&mut self, advance: bool) -> Result<Vec3, AIConfigError> {
        let index = match self.current_waypoint {
            None => self.waypoint_network.first_index(self.patrol_mode, &mut self.rng)?,
            Some(current) if advance => {
                self.waypoint_network
                    .next_index(current, self.patrol_mode, &mut self.rng)?
            }
            Some(current) => current,
        };

        let position = self.waypoint_network.get(index)?.position;
        self.current_waypoint = Some(index);

        let distance = self.position.distance(position);
        self.set_target(AITargetType::Waypoint, None, position, distance);

        Ok(position)
    }
}

fn apply_ref_delta(count: i32, delta: i32, label: &str) -> i32 {
    let next = count + delta;
    if next < 0 {
        logger::log_error(&format!(
            "AI: root {} ref-count underflow ({} + {}), clamped to 0",
            label, count, delta
        ));
        return 0;
    }
    next
}
