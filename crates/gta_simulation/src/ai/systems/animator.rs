//! Animator hooks: "pose applied" и "IK resolution".

use bevy::prelude::*;

use crate::ai::AIStateMachine;
use crate::animation::AnimatorRig;
use crate::navigation::NavAgent;

/// Animator параметр для turn-анимаций (-1, 0, 1)
pub const SEEKING_PARAMETER: &str = "Seeking";

/// Система: root motion → Transform, потом `on_animator_synced`
///
/// Root motion применяется только по тем осям, которые держит машина;
/// иначе его применяет навигация. `desired_facing` от states пишется
/// в rotation, только пока root rotation не используется.
pub fn sync_animator_pose(
    mut agents: Query<(&mut AIStateMachine, &mut NavAgent, &mut Transform, Option<&mut AnimatorRig>)>,
) {
    for (mut machine, mut nav, mut transform, mut rig) in agents.iter_mut() {
        if let Some(rig) = rig.as_mut() {
            let (delta_position, delta_rotation) = rig.take_root_motion();
            if machine.use_root_position() {
                transform.translation += delta_position;
            }
            if machine.use_root_rotation() {
                transform.rotation = (delta_rotation * transform.rotation).normalize();
            }
        }

        machine.on_animator_move(nav.as_mut());

        let use_root_rotation = machine.use_root_rotation();
        let context = machine.context_mut();
        if let Some(facing) = context.desired_facing.take() {
            if !use_root_rotation {
                transform.rotation = facing;
            }
        }

        if let Some(rig) = rig.as_mut() {
            let seeking = context.seeking as f32;
            rig.set_float(SEEKING_PARAMETER, seeking);
        }
    }
}

/// Система: `on_animator_ik_synced` → look-at goal в AnimatorRig
pub fn sync_animator_ik(mut agents: Query<(&mut AIStateMachine, &mut NavAgent, Option<&mut AnimatorRig>)>) {
    for (mut machine, mut nav, rig) in agents.iter_mut() {
        machine.on_animator_ik(nav.as_mut());

        if let Some(mut rig) = rig {
            rig.look_at = machine.context().look_at;
        }
    }
}
