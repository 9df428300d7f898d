//! GTA Simulation Core
//!
//! ECS-симуляция на Bevy 0.16: AI state machine для NPC, foot IK,
//! player locomotion. Всё крутится в FixedUpdate (60Hz) для детерминизма.
//!
//! Порядок тика:
//! - `AISet::BeginTick`: старт машин, clear perception, снимок позы
//! - player locomotion
//! - `AISet::Triggers`: trigger source (proximity / rapier) → dispatch
//! - `AISet::Decide` → `Navigate` → `Animate` → `Ik` (look-at, foot IK)

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod ai;
pub mod animation;
pub mod ik;
pub mod logger;
pub mod navigation;
pub mod physics;
pub mod player;

// Re-export основных типов для удобства
pub use ai::{AIPlugin, AISet, AIState, AIStateMachine, AIStateType, AgentSpawn, StateMachineConfig};
pub use animation::{Animator, AnimatorRig};
pub use ik::{FlatGround, FootIkConfig, FootIkPlugin, FootIkSolver};
pub use logger::{init_logger, log, log_error, log_info, log_warning};
pub use navigation::{NavAgent, NavigationAgent};
pub use physics::{ProximityTriggerPlugin, RapierPhysicsBridgePlugin};
pub use player::{Player, PlayerInput, PlayerPlugin};

/// Откуда приходят trigger события AI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TriggerSource {
    /// Headless: пересечение сфер без физики
    #[default]
    Proximity,
    /// Rapier colliders + CollisionEvent
    Rapier,
}

/// Главный plugin симуляции (объединяет все подсистемы)
#[derive(Default)]
pub struct SimulationPlugin {
    pub triggers: TriggerSource,
}

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app
            // Fixed timestep 60Hz для simulation tick
            .insert_resource(Time::<Fixed>::from_hz(FIXED_HZ))
            .add_plugins((AIPlugin, FootIkPlugin, PlayerPlugin));

        // Seed мог выставить create_headless_app
        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(42));
        }

        match self.triggers {
            TriggerSource::Proximity => {
                app.add_plugins(ProximityTriggerPlugin);
            }
            TriggerSource::Rapier => {
                app.add_plugins(RapierPhysicsBridgePlugin);
            }
        }
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Частота simulation tick
pub const FIXED_HZ: f64 = 60.0;

/// Сколько `App::update` ждём один fixed тик (первый update тика не даёт)
const MAX_UPDATES_PER_TICK: usize = 4;

/// Создаёт minimal Bevy App для headless симуляции
///
/// Время ручное: каждый `App::update` сдвигает часы ровно на fixed timestep,
/// wall clock не участвует.
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();

    let fixed = Time::<Fixed>::from_hz(FIXED_HZ);
    let timestep: Duration = fixed.timestep();

    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(fixed)
        .insert_resource(TimeUpdateStrategy::ManualDuration(timestep));

    app
}

/// Один simulation tick через полный `App::update`
///
/// First (swap event буферов) → FixedMain (FixedUpdate + FixedPostUpdate) →
/// PostUpdate. Самый первый update только запускает часы, поэтому крутим
/// update, пока `Time<Fixed>` не продвинется.
pub fn run_fixed_tick(app: &mut App) {
    let before = app.world().resource::<Time<Fixed>>().elapsed();

    for _ in 0..MAX_UPDATES_PER_TICK {
        app.update();
        if app.world().resource::<Time<Fixed>>().elapsed() != before {
            return;
        }
    }

    log_warning("run_fixed_tick: Time<Fixed> не продвинулся (нет TimeUpdateStrategy::ManualDuration?)");
}
