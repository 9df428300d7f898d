//! Foot IK integration test
//!
//! Игрок на FlatGround: probe → resolve внутри AISet::Ik каждый fixed тик.

use bevy::prelude::*;
use gta_simulation::animation::{AvatarIkGoal, HumanBone};
use gta_simulation::player::{spawn_player, PlayerMovementConfig};
use gta_simulation::*;

fn spawn_posed_player(app: &mut App) -> Entity {
    let player = spawn_player(
        &mut app.world_mut().commands(),
        Vec3::ZERO,
        PlayerMovementConfig::default(),
        FootIkConfig::default(),
    );
    app.world_mut().flush();

    let mut rig = app.world_mut().get_mut::<AnimatorRig>(player).expect("rig");
    rig.apply_pose(
        [
            (HumanBone::LeftFoot, Vec3::new(-0.1, 0.1, 0.0)),
            (HumanBone::RightFoot, Vec3::new(0.1, 0.1, 0.0)),
        ],
        Vec3::new(0.0, 1.0, 0.0),
    );

    player
}

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-4
}

#[test]
fn test_feet_follow_flat_ground() {
    let mut app = create_headless_app(42);
    app.add_plugins(SimulationPlugin::default())
        .insert_resource(FlatGround { height: -0.2 });
    let player = spawn_posed_player(&mut app);

    run_fixed_tick(&mut app);
    {
        let rig = app.world().get::<AnimatorRig>(player).expect("rig");
        let left = rig.goal(AvatarIkGoal::LeftFoot).position.expect("left IK target");
        assert!(approx(left.y, 0.0), "left y = {}", left.y);
        // Первый тик только снимает baseline pelvis
        assert!(approx(rig.body_position.y, 1.0));
    }

    run_fixed_tick(&mut app);
    let rig = app.world().get::<AnimatorRig>(player).expect("rig");
    let left = rig.goal(AvatarIkGoal::LeftFoot).position.expect("left IK target");
    assert!(approx(left.y, -0.05), "left y = {}", left.y);
    assert!(approx(rig.body_position.y, 0.944), "pelvis y = {}", rig.body_position.y);

    let solver = app.world().get::<FootIkSolver>(player).expect("solver");
    assert!(solver.foot(AvatarIkGoal::RightFoot).has_target());
}

#[test]
fn test_without_ground_feet_keep_animation() {
    let mut app = create_headless_app(42);
    app.add_plugins(SimulationPlugin::default());
    let player = spawn_posed_player(&mut app);

    run_fixed_tick(&mut app);
    run_fixed_tick(&mut app);

    let rig = app.world().get::<AnimatorRig>(player).expect("rig");
    assert_eq!(
        rig.goal(AvatarIkGoal::LeftFoot).position,
        Some(Vec3::new(-0.1, 0.1, 0.0))
    );
    assert_eq!(rig.body_position, Vec3::new(0.0, 1.0, 0.0));
}
