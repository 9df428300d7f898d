//! Foot IK systems.

use bevy::prelude::*;

use crate::animation::AnimatorRig;
use crate::ik::{FlatGround, FootIkSolver, GroundProbe};

/// Общий probe pass для любого источника лучей
pub fn probe_feet(
    solvers: &mut Query<(&mut FootIkSolver, &Transform, &AnimatorRig)>,
    ground: &impl GroundProbe,
) {
    for (mut solver, transform, rig) in solvers.iter_mut() {
        solver.probe(transform, rig, ground);
    }
}

/// Система: лучи в бесконечную плоскость (headless)
pub fn probe_feet_on_flat_ground(
    mut solvers: Query<(&mut FootIkSolver, &Transform, &AnimatorRig)>,
    ground: Res<FlatGround>,
) {
    probe_feet(&mut solvers, ground.as_ref());
}

/// Система: pelvis + IK targets ступней
pub fn resolve_feet(mut solvers: Query<(&mut FootIkSolver, &Transform, &mut AnimatorRig)>) {
    for (mut solver, transform, mut rig) in solvers.iter_mut() {
        solver.resolve(transform, rig.as_mut());
    }
}
