//! Foot IK — ступни по рельефу, pelvis по нижней ступне
//!
//! `FootIkSet::Probe` (лучи) → `FootIkSet::Resolve` (IK targets в AnimatorRig).
//! Обе фазы внутри `AISet::Ik`, после root motion и AI hooks.

use bevy::prelude::*;

pub mod probe;
pub mod solver;
pub mod systems;


pub use probe::{FlatGround, GroundHit, GroundProbe, NoGround};
pub use solver::{FootIkConfig, FootIkSolver, FootIkState, RotationWeightSource};

use crate::ai::AISet;

#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FootIkSet {
    Probe,
    Resolve,
}

/// Foot IK Plugin
///
/// Headless лучи идут в `FlatGround` (если ресурс есть); с rapier
/// probe система добавляется `RapierPhysicsBridgePlugin`.
pub struct FootIkPlugin;

impl Plugin for FootIkPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<FootIkSolver>()
            .register_type::<FlatGround>()
            .configure_sets(
                FixedUpdate,
                (FootIkSet::Probe, FootIkSet::Resolve)
                    .chain()
                    .in_set(AISet::Ik),
            )
            .add_systems(
                FixedUpdate,
                systems::probe_feet_on_flat_ground
                    .run_if(resource_exists::<FlatGround>)
                    .in_set(FootIkSet::Probe),
            )
            .add_systems(FixedUpdate, systems::resolve_feet.in_set(FootIkSet::Resolve));
    }
}
