//! Foot IK solver — ставит ступни на землю и опускает pelvis.
//!
//! Две фазы за тик:
//! 1. `probe` (physics tick): sky point над каждой ступнёй → луч вниз →
//!    IK position/rotation. Промах = `Vec3::ZERO` (sentinel "нет коррекции").
//! 2. `resolve` (IK callback): pelvis по нижней ступне, затем сглаженный
//!    вертикальный offset каждой ступни в local space персонажа.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::animation::{Animator, AvatarIkGoal};
use crate::ik::GroundProbe;

/// Откуда брать rotation weight ступней
#[derive(Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
pub enum RotationWeightSource {
    Fixed(f32),
    /// Animation curves (float параметры аниматора) по имени
    Curves { left_foot: String, right_foot: String },
}

impl Default for RotationWeightSource {
    fn default() -> Self {
        RotationWeightSource::Fixed(1.0)
    }
}

impl RotationWeightSource {
    fn weight(&self, animator: &impl Animator, goal: AvatarIkGoal) -> f32 {
        match self {
            RotationWeightSource::Fixed(weight) => *weight,
            RotationWeightSource::Curves { left_foot, right_foot } => match goal {
                AvatarIkGoal::LeftFoot => animator.float_parameter(left_foot),
                AvatarIkGoal::RightFoot => animator.float_parameter(right_foot),
            },
        }
    }
}

#[derive(Debug, Clone, Reflect, Serialize, Deserialize)]
pub struct FootIkConfig {
    pub enabled: bool,
    /// Высота sky point над root'ом персонажа
    pub height_from_ground_raycast: f32,
    /// Насколько ниже root'а ещё ищем землю
    pub raycast_down_distance: f32,
    /// Подъём ступни над точкой контакта
    pub pelvis_offset: f32,
    /// Lerp factor pelvis (0..1 за тик)
    pub pelvis_up_and_down_speed: f32,
    /// Lerp factor вертикального offset'а ступней (0..1 за тик)
    pub feet_to_ik_position_speed: f32,
    pub rotation_weight: RotationWeightSource,
}

impl Default for FootIkConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            height_from_ground_raycast: 1.14,
            raycast_down_distance: 1.5,
            pelvis_offset: 0.0,
            pelvis_up_and_down_speed: 0.28,
            feet_to_ik_position_speed: 0.5,
            rotation_weight: RotationWeightSource::default(),
        }
    }
}

/// Состояние одной ступни между фазами
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct FootIkState {
    /// World-space IK target (ZERO = нет валидного контакта)
    pub ik_position: Vec3,
    pub ik_rotation: Quat,
    /// Сглаженный local-space Y offset прошлого тика
    pub last_y: f32,
}

impl Default for FootIkState {
    fn default() -> Self {
        Self {
            ik_position: Vec3::ZERO,
            ik_rotation: Quat::IDENTITY,
            last_y: 0.0,
        }
    }
}

impl FootIkState {
    pub fn has_target(&self) -> bool {
        self.ik_position != Vec3::ZERO
    }
}

#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct FootIkSolver {
    pub config: FootIkConfig,
    left: FootIkState,
    right: FootIkState,
    /// Baseline pelvis Y (None = ещё не снят)
    last_pelvis_y: Option<f32>,
}

impl FootIkSolver {
    pub fn new(config: FootIkConfig) -> Self {
        Self {
            config,
            ..default()
        }
    }

    pub fn foot(&self, goal: AvatarIkGoal) -> &FootIkState {
        match goal {
            AvatarIkGoal::LeftFoot => &self.left,
            AvatarIkGoal::RightFoot => &self.right,
        }
    }

    fn foot_mut(&mut self, goal: AvatarIkGoal) -> &mut FootIkState {
        match goal {
            AvatarIkGoal::LeftFoot => &mut self.left,
            AvatarIkGoal::RightFoot => &mut self.right,
        }
    }

    pub fn last_pelvis_y(&self) -> Option<f32> {
        self.last_pelvis_y
    }

    /// Sky point: XZ анимированной кости, Y = root + height_from_ground_raycast
    pub fn sky_point(&self, bone_position: Vec3, root: &Transform) -> Vec3 {
        Vec3::new(
            bone_position.x,
            root.translation.y + self.config.height_from_ground_raycast,
            bone_position.z,
        )
    }

    /// Physics фаза: луч вниз из sky point каждой ступни
    pub fn probe(&mut self, root: &Transform, animator: &impl Animator, ground: &impl GroundProbe) {
        if !self.config.enabled {
            return;
        }

        let max_distance = self.config.raycast_down_distance + self.config.height_from_ground_raycast;

        for goal in [AvatarIkGoal::RightFoot, AvatarIkGoal::LeftFoot] {
            let hit = animator.bone_position(goal.bone()).and_then(|bone| {
                let sky = self.sky_point(bone, root);
                ground.cast_down(sky, max_distance).map(|hit| (sky, hit))
            });

            let (position, rotation) = match hit {
                Some((sky, hit)) => (
                    Vec3::new(sky.x, hit.point.y + self.config.pelvis_offset, sky.z),
                    Quat::from_rotation_arc(Vec3::Y, hit.normal.normalize_or(Vec3::Y)) * root.rotation,
                ),
                // Промах: sentinel, rotation оставляем прошлой
                None => (Vec3::ZERO, self.foot(goal).ik_rotation),
            };

            let foot = self.foot_mut(goal);
            foot.ik_position = position;
            foot.ik_rotation = rotation;
        }
    }

    /// IK фаза: pelvis, веса, финальные IK targets ступней
    pub fn resolve(&mut self, root: &Transform, animator: &mut impl Animator) {
        if !self.config.enabled {
            return;
        }

        self.move_pelvis_height(root, animator);

        for goal in [AvatarIkGoal::RightFoot, AvatarIkGoal::LeftFoot] {
            animator.set_ik_position_weight(goal, 1.0);
            let rotation_weight = self.config.rotation_weight.weight(&*animator, goal);
            animator.set_ik_rotation_weight(goal, rotation_weight);

            self.move_foot_to_ik_point(goal, root, animator);
        }
    }

    fn move_pelvis_height(&mut self, root: &Transform, animator: &mut impl Animator) {
        let body = animator.body_position();

        let baseline = match self.last_pelvis_y {
            Some(y) if self.left.has_target() && self.right.has_target() => y,
            _ => {
                // Нет контакта у какой-то ступни: снимаем baseline, без коррекции
                self.last_pelvis_y = Some(body.y);
                return;
            }
        };

        let left_offset = self.left.ik_position.y - root.translation.y;
        let right_offset = self.right.ik_position.y - root.translation.y;
        let total_offset = left_offset.min(right_offset);

        // От анимированного body Y, не от root Y: анимация уже несёт высоту pelvis над root
        let target_y = body.y + total_offset;
        let pelvis_y = lerp(baseline, target_y, self.config.pelvis_up_and_down_speed);

        animator.set_body_position(Vec3::new(body.x, pelvis_y, body.z));
        self.last_pelvis_y = Some(pelvis_y);
    }

    fn move_foot_to_ik_point(&mut self, goal: AvatarIkGoal, root: &Transform, animator: &mut impl Animator) {
        let animated = animator
            .bone_position(goal.bone())
            .unwrap_or_else(|| animator.ik_position(goal));
        let speed = self.config.feet_to_ik_position_speed;
        let foot = self.foot_mut(goal);

        if !foot.has_target() {
            animator.set_ik_position(goal, animated);
            return;
        }

        let to_local = root.compute_affine().inverse();
        let mut target_local = to_local.transform_point3(animated);
        let holder_local = to_local.transform_point3(foot.ik_position);

        let y = lerp(foot.last_y, holder_local.y, speed);
        target_local.y += y;
        foot.last_y = y;

        let rotation = foot.ik_rotation;
        animator.set_ik_position(goal, root.transform_point(target_local));
        animator.set_ik_rotation(goal, rotation);
    }
}

fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}
