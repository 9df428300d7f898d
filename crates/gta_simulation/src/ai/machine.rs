//! AIStateMachine — владелец active state, perception targets,
//! waypoint курсора и root-motion ref-count'ов.
//!
//! Engine-independent: ECS системы (`ai::systems`) только снабжают машину
//! позой агента, delta, trigger событиями и navigation adapter'ом.
//!
//! Тик = `begin_tick` (clear perception, distance, reset reached)
//!     → trigger callbacks (physics pass)
//!     → `update` (on_update + transition protocol).

use std::collections::HashMap;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::ai::{
    AIConfigError, AIContext, AIState, AIStateType, AITarget, AITargetType, AITriggerEventType,
    Obstacle, PatrolMode, SensorVolume, StateContext, WaypointNetwork,
};
use crate::logger;
use crate::navigation::{NavAgent, NavigationAgent};

/// Конфигурация машины (инспектируемые/персистентные поля)
#[derive(Debug, Clone, Reflect, Serialize, Deserialize)]
pub struct StateMachineConfig {
    pub initial_state: AIStateType,
    pub stopping_distance: f32,
    pub patrol_mode: PatrolMode,
    /// Сохранённый курсор waypoint'а (None = не выставлен)
    pub current_waypoint: Option<usize>,
    /// Offset центра sensor'а в local space агента
    pub sensor_offset: Vec3,
    pub sensor_radius: f32,
}

impl Default for StateMachineConfig {
    fn default() -> Self {
        Self {
            initial_state: AIStateType::Idle,
            stopping_distance: 1.0,
            patrol_mode: PatrolMode::Sequential,
            current_waypoint: None,
            sensor_offset: Vec3::new(0.0, 1.5, 0.0),
            sensor_radius: 10.0,
        }
    }
}

/// Colliders агента, которые engine callbacks маршрутизируют в машину
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct AgentColliders {
    /// Физическое тело агента (входит в arrival volume)
    pub body: Option<Entity>,
    /// Sensor (зрение/слух)
    pub sensor: Option<Entity>,
    /// Arrival-detection volume (ставится в позицию цели)
    pub arrival: Option<Entity>,
}

/// Снимок для инспектора/сохранения
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateMachineSnapshot {
    pub current_state_type: AIStateType,
    pub stopping_distance: f32,
    pub patrol_mode: PatrolMode,
    pub current_waypoint: Option<usize>,
}

/// Результат transition protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AIStateTransition {
    pub from: AIStateType,
    pub requested: AIStateType,
    /// Какой state реально активен после перехода (None = inert)
    pub active: Option<AIStateType>,
}

#[derive(Component)]
#[require(NavAgent, Transform)]
pub struct AIStateMachine {
    states: HashMap<AIStateType, Box<dyn AIState>>,
    /// Ключ active state (None = inert)
    current: Option<AIStateType>,
    /// Tag "последний запрошенный" (может не совпадать с active)
    current_state_type: AIStateType,
    started: bool,
    ctx: AIContext,
}

impl AIStateMachine {
    pub fn new(config: StateMachineConfig, waypoints: WaypointNetwork, seed: u64) -> Self {
        let mut ctx = AIContext::new(waypoints, config.patrol_mode, config.stopping_distance, seed);
        ctx.set_current_waypoint(config.current_waypoint);
        ctx.set_sensor(SensorVolume {
            trigger: None,
            offset: config.sensor_offset,
            radius: config.sensor_radius,
        });

        Self {
            states: HashMap::new(),
            current: None,
            current_state_type: config.initial_state,
            started: false,
            ctx,
        }
    }

    /// Builder-вариант `register_state`
    pub fn with_states(mut self, states: impl IntoIterator<Item = Box<dyn AIState>>) -> Self {
        for state in states {
            self.register_state(state);
        }
        self
    }

    /// Регистрирует state; первый зарегистрированный на tag выигрывает
    pub fn register_state(&mut self, state: Box<dyn AIState>) -> bool {
        let state_type = state.state_type();
        if self.states.contains_key(&state_type) {
            logger::log_warning(&format!(
                "AI: duplicate {:?} state ignored (first registration wins)",
                state_type
            ));
            return false;
        }
        self.states.insert(state_type, state);
        true
    }

    /// Привязывает collider identities (arrival trigger + sensor)
    pub fn bind_colliders(&mut self, colliders: &AgentColliders) {
        self.ctx.set_arrival_trigger(colliders.arrival);
        let mut sensor = *self.ctx.sensor();
        sensor.trigger = colliders.sensor;
        self.ctx.set_sensor(sensor);
    }

    /// Регистрирует states и активирует initial state
    pub fn initialize(
        &mut self,
        colliders: &AgentColliders,
        states: impl IntoIterator<Item = Box<dyn AIState>>,
        nav: &mut dyn NavigationAgent,
    ) {
        self.bind_colliders(colliders);
        for state in states {
            self.register_state(state);
        }
        self.start(nav);
    }

    /// Вход в initial state (один раз). Незарегистрированный initial → inert.
    pub fn start(&mut self, nav: &mut dyn NavigationAgent) {
        if self.started {
            return;
        }
        self.started = true;

        let initial = self.current_state_type;
        let Some(state) = self.states.get_mut(&initial) else {
            logger::log_warning(&format!(
                "AI: {}; machine stays inert",
                AIConfigError::UnregisteredState(initial)
            ));
            self.current = None;
            return;
        };

        state.on_enter(&mut StateContext { ai: &mut self.ctx, nav });
        self.current = Some(initial);
        logger::log(&format!("AI: started in {:?}", initial));
    }

    // ------------------------------------------------------------------
    // Tick
    // ------------------------------------------------------------------

    /// Начало тика (до physics/trigger pass)
    pub fn begin_tick(&mut self, position: Vec3, rotation: Quat, delta: f32) {
        self.ctx.begin_tick(position, rotation, delta);
    }

    /// on_update текущего state + transition protocol
    pub fn update(&mut self, nav: &mut dyn NavigationAgent) -> Option<AIStateTransition> {
        let current = self.current?;
        let state = self.states.get_mut(&current)?;

        let requested = state.on_update(&mut StateContext { ai: &mut self.ctx, nav: &mut *nav });

        let transition = if requested != self.current_state_type {
            Some(self.transition_to(requested, nav))
        } else {
            None
        };

        self.sync_navigation_control(nav);
        transition
    }

    /// begin_tick + update (без trigger pass между ними)
    pub fn tick(
        &mut self,
        position: Vec3,
        rotation: Quat,
        delta: f32,
        nav: &mut dyn NavigationAgent,
    ) -> Option<AIStateTransition> {
        self.begin_tick(position, rotation, delta);
        self.update(nav)
    }

    fn transition_to(&mut self, requested: AIStateType, nav: &mut dyn NavigationAgent) -> AIStateTransition {
        let from = self.current_state_type;

        if let Some(current) = self.current.take() {
            if let Some(state) = self.states.get_mut(&current) {
                state.on_exit(&mut StateContext { ai: &mut self.ctx, nav: &mut *nav });
            }
        }

        let next = if self.states.contains_key(&requested) {
            Some(requested)
        } else if self.states.contains_key(&AIStateType::Idle) {
            logger::log_warning(&format!(
                "AI: {}; falling back to Idle",
                AIConfigError::UnregisteredState(requested)
            ));
            Some(AIStateType::Idle)
        } else {
            logger::log_error(&format!(
                "AI: {} and no Idle fallback; machine is inert",
                AIConfigError::UnregisteredState(requested)
            ));
            None
        };

        if let Some(next) = next {
            if let Some(state) = self.states.get_mut(&next) {
                state.on_enter(&mut StateContext { ai: &mut self.ctx, nav: &mut *nav });
            }
        }

        self.current = next;
        // Tag = "последний запрошенный", даже если lookup не удался
        self.current_state_type = requested;

        logger::log(&format!("AI: {:?} → {:?} (active: {:?})", from, requested, next));

        AIStateTransition {
            from,
            requested,
            active: next,
        }
    }

    /// Root motion держит кто-то → навигация не двигает/не вращает агента
    fn sync_navigation_control(&self, nav: &mut dyn NavigationAgent) {
        nav.set_position_rotation_control(!self.ctx.use_root_position(), !self.ctx.use_root_rotation());
    }

    // ------------------------------------------------------------------
    // Engine callbacks
    // ------------------------------------------------------------------

    /// Sensor trigger → текущий state (no-op у inert машины)
    pub fn on_trigger_event(&mut self, event: AITriggerEventType, other: &Obstacle, nav: &mut dyn NavigationAgent) {
        let Some(state) = self.current.and_then(|t| self.states.get_mut(&t)) else {
            return;
        };
        state.on_trigger_event(&mut StateContext { ai: &mut self.ctx, nav }, event, other);
    }

    /// Arrival volume trigger. События от чужих collider'ов игнорируются.
    pub fn on_arrival_trigger(&mut self, event: AITriggerEventType, other: Entity, nav: &mut dyn NavigationAgent) {
        if self.ctx.arrival().trigger != Some(other) {
            return;
        }

        let notify = match event {
            AITriggerEventType::Enter => {
                self.ctx.set_target_reached(true);
                Some(true)
            }
            AITriggerEventType::Stay => {
                self.ctx.set_target_reached(true);
                None
            }
            AITriggerEventType::Exit => {
                self.ctx.set_target_reached(false);
                Some(false)
            }
        };

        let Some(reached) = notify else {
            return;
        };

        if let Some(state) = self.current.and_then(|t| self.states.get_mut(&t)) {
            state.on_destination_reached(&mut StateContext { ai: &mut self.ctx, nav }, reached);
        }
    }

    /// "Pose applied" callback
    pub fn on_animator_move(&mut self, nav: &mut dyn NavigationAgent) {
        if let Some(state) = self.current.and_then(|t| self.states.get_mut(&t)) {
            state.on_animator_synced(&mut StateContext { ai: &mut self.ctx, nav });
        }
    }

    /// "IK resolution" callback
    pub fn on_animator_ik(&mut self, nav: &mut dyn NavigationAgent) {
        if let Some(state) = self.current.and_then(|t| self.states.get_mut(&t)) {
            state.on_animator_ik_synced(&mut StateContext { ai: &mut self.ctx, nav });
        }
    }

    /// Агент убит (damage system снаружи). В Dead переходит на следующем update.
    pub fn kill(&mut self) {
        self.ctx.kill();
    }

    // ------------------------------------------------------------------
    // Target / root motion / waypoints (делегаты контекста)
    // ------------------------------------------------------------------

    pub fn set_target(&mut self, kind: AITargetType, obstacle: Option<Entity>, position: Vec3, distance: f32) {
        self.ctx.set_target(kind, obstacle, position, distance);
    }

    pub fn set_target_with_stopping_distance(
        &mut self,
        kind: AITargetType,
        obstacle: Option<Entity>,
        position: Vec3,
        distance: f32,
        stopping_distance: f32,
    ) {
        self.ctx
            .set_target_with_stopping_distance(kind, obstacle, position, distance, stopping_distance);
    }

    pub fn set_target_from(&mut self, target: AITarget) {
        self.ctx.set_target_from(target);
    }

    pub fn clear_target(&mut self) {
        self.ctx.clear_target();
    }

    pub fn request_root_motion(&mut self, position: i32, rotation: i32) {
        self.ctx.request_root_motion(position, rotation);
    }

    pub fn get_waypoint_position(&mut self, advance: bool) -> Result<Vec3, AIConfigError> {
        self.ctx.get_waypoint_position(advance)
    }

    // ------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------

    pub fn context(&self) -> &AIContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut AIContext {
        &mut self.ctx
    }

    /// Tag "последний запрошенный state"
    pub fn current_state_type(&self) -> AIStateType {
        self.current_state_type
    }

    /// Реально активный state (None = inert)
    pub fn active_state_type(&self) -> Option<AIStateType> {
        self.current
    }

    pub fn is_inert(&self) -> bool {
        self.current.is_none()
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn has_state(&self, state_type: AIStateType) -> bool {
        self.states.contains_key(&state_type)
    }

    pub fn use_root_position(&self) -> bool {
        self.ctx.use_root_position()
    }

    pub fn use_root_rotation(&self) -> bool {
        self.ctx.use_root_rotation()
    }

    pub fn is_target_reached(&self) -> bool {
        self.ctx.is_target_reached()
    }

    pub fn snapshot(&self) -> StateMachineSnapshot {
        StateMachineSnapshot {
            current_state_type: self.current_state_type,
            stopping_distance: self.ctx.stopping_distance(),
            patrol_mode: self.ctx.patrol_mode(),
            current_waypoint: self.ctx.current_waypoint(),
        }
    }
}
