//! Animation collaborator
//!
//! Скелетная анимация живёт снаружи (движок), симуляции нужно только:
//! - bone transforms по имени (feet, pelvis)
//! - IK goals per limb (position/rotation + weights)
//! - animator параметры (float/bool), которые пишут player/AI системы
//! - root motion deltas текущего кадра
//!
//! `AnimatorRig` — ECS компонент, через который движок и симуляция
//! обмениваются этими данными.

use bevy::prelude::*;
use std::collections::HashMap;

/// Кости, которые интересуют симуляцию
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum HumanBone {
    Hips,
    LeftFoot,
    RightFoot,
    Head,
}

/// IK goals (конечности)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum AvatarIkGoal {
    LeftFoot,
    RightFoot,
}

impl AvatarIkGoal {
    pub fn bone(self) -> HumanBone {
        match self {
            AvatarIkGoal::LeftFoot => HumanBone::LeftFoot,
            AvatarIkGoal::RightFoot => HumanBone::RightFoot,
        }
    }
}

/// Контракт аниматора для IK solver'а
pub trait Animator {
    /// World-space позиция кости (None если кости нет в rig'е)
    fn bone_position(&self, bone: HumanBone) -> Option<Vec3>;

    /// Позиция центра масс тела (pelvis) в world space
    fn body_position(&self) -> Vec3;
    fn set_body_position(&mut self, position: Vec3);

    /// Текущая IK позиция goal'а (до IK равна анимированной позиции кости)
    fn ik_position(&self, goal: AvatarIkGoal) -> Vec3;
    fn set_ik_position(&mut self, goal: AvatarIkGoal, position: Vec3);
    fn set_ik_rotation(&mut self, goal: AvatarIkGoal, rotation: Quat);
    fn set_ik_position_weight(&mut self, goal: AvatarIkGoal, weight: f32);
    fn set_ik_rotation_weight(&mut self, goal: AvatarIkGoal, weight: f32);

    /// Float параметр (в т.ч. animation curves). Неизвестный параметр = 0.0
    fn float_parameter(&self, name: &str) -> f32;
}

/// Выход IK для одной конечности
#[derive(Debug, Clone, Copy, Default, PartialEq, Reflect)]
pub struct IkGoalState {
    pub position: Option<Vec3>,
    pub rotation: Option<Quat>,
    pub position_weight: f32,
    pub rotation_weight: f32,
}

/// Look-at goal (голова), выставляется AI в IK-фазе
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct LookAtGoal {
    pub position: Vec3,
    pub weight: f32,
}

/// ECS-сторона аниматора
#[derive(Component, Debug, Clone, Default)]
pub struct AnimatorRig {
    /// Анимированные позиции костей (world space), пишет движок
    pub bones: HashMap<HumanBone, Vec3>,
    pub body_position: Vec3,
    pub left_foot_goal: IkGoalState,
    pub right_foot_goal: IkGoalState,
    pub look_at: Option<LookAtGoal>,
    pub floats: HashMap<String, f32>,
    pub bools: HashMap<String, bool>,
    /// Root motion текущего кадра (пишет движок после evaluation)
    pub root_delta_position: Vec3,
    pub root_delta_rotation: Quat,
}

impl AnimatorRig {
    /// Новый анимированный pose: IK goals кадра сбрасываются
    pub fn apply_pose(&mut self, bones: impl IntoIterator<Item = (HumanBone, Vec3)>, body_position: Vec3) {
        self.bones.extend(bones);
        self.body_position = body_position;
        self.left_foot_goal = IkGoalState::default();
        self.right_foot_goal = IkGoalState::default();
        self.look_at = None;
    }

    pub fn goal(&self, goal: AvatarIkGoal) -> &IkGoalState {
        match goal {
            AvatarIkGoal::LeftFoot => &self.left_foot_goal,
            AvatarIkGoal::RightFoot => &self.right_foot_goal,
        }
    }

    fn goal_mut(&mut self, goal: AvatarIkGoal) -> &mut IkGoalState {
        match goal {
            AvatarIkGoal::LeftFoot => &mut self.left_foot_goal,
            AvatarIkGoal::RightFoot => &mut self.right_foot_goal,
        }
    }

    pub fn set_float(&mut self, name: &str, value: f32) {
        self.floats.insert(name.to_string(), value);
    }

    pub fn set_bool(&mut self, name: &str, value: bool) {
        self.bools.insert(name.to_string(), value);
    }

    pub fn bool_parameter(&self, name: &str) -> bool {
        self.bools.get(name).copied().unwrap_or(false)
    }

    /// Забирает root motion кадра (дальше он 0 до следующей evaluation)
    pub fn take_root_motion(&mut self) -> (Vec3, Quat) {
        let motion = (self.root_delta_position, self.root_delta_rotation);
        self.root_delta_position = Vec3::ZERO;
        self.root_delta_rotation = Quat::IDENTITY;
        motion
    }
}

impl Animator for AnimatorRig {
    fn bone_position(&self, bone: HumanBone) -> Option<Vec3> {
        self.bones.get(&bone).copied()
    }

    fn body_position(&self) -> Vec3 {
        self.body_position
    }

    fn set_body_position(&mut self, position: Vec3) {
        self.body_position = position;
    }

    fn ik_position(&self, goal: AvatarIkGoal) -> Vec3 {
        self.goal(goal)
            .position
            .or_else(|| self.bone_position(goal.bone()))
            .unwrap_or(Vec3::ZERO)
    }

    fn set_ik_position(&mut self, goal: AvatarIkGoal, position: Vec3) {
        self.goal_mut(goal).position = Some(position);
    }

    fn set_ik_rotation(&mut self, goal: AvatarIkGoal, rotation: Quat) {
        self.goal_mut(goal).rotation = Some(rotation);
    }

    fn set_ik_position_weight(&mut self, goal: AvatarIkGoal, weight: f32) {
        self.goal_mut(goal).position_weight = weight.clamp(0.0, 1.0);
    }

    fn set_ik_rotation_weight(&mut self, goal: AvatarIkGoal, weight: f32) {
        self.goal_mut(goal).rotation_weight = weight.clamp(0.0, 1.0);
    }

    fn float_parameter(&self, name: &str) -> f32 {
        self.floats.get(name).copied().unwrap_or(0.0)
    }
}
