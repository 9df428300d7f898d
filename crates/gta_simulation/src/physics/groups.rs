//! Collision groups — централизованные константы для всего проекта
//!
//! - Membership: на каком слое объект находится
//! - Filter: с какими слоями объект пересекается
//!
//! AI volumes (sensor, arrival) живут на отдельном слое и не участвуют
//! в физике тел, только генерируют trigger события.

use bevy_rapier3d::prelude::*;

/// Actors (NPC + player тела)
pub const GROUP_ACTORS: Group = Group::GROUP_2;

/// Environment (стены, рельеф): только в него бьют лучи foot IK
pub const GROUP_ENVIRONMENT: Group = Group::GROUP_3;

/// AI trigger volumes (sensor, arrival)
pub const GROUP_AI_TRIGGERS: Group = Group::GROUP_5;

/// Stimuli (player, источники шума), видимые sensor'ам
pub const GROUP_STIMULI: Group = Group::GROUP_6;

/// Тела акторов: actors + environment + AI triggers
pub fn actor_groups() -> CollisionGroups {
    CollisionGroups::new(GROUP_ACTORS, GROUP_ACTORS | GROUP_ENVIRONMENT | GROUP_AI_TRIGGERS)
}

/// Player: актор, который ещё и stimulus
pub fn player_groups() -> CollisionGroups {
    CollisionGroups::new(
        GROUP_ACTORS | GROUP_STIMULI,
        GROUP_ACTORS | GROUP_ENVIRONMENT | GROUP_AI_TRIGGERS,
    )
}

pub fn environment_groups() -> CollisionGroups {
    CollisionGroups::new(GROUP_ENVIRONMENT, GROUP_ACTORS)
}

/// Sensor агента видит только stimuli
pub fn sensor_groups() -> CollisionGroups {
    CollisionGroups::new(GROUP_AI_TRIGGERS, GROUP_STIMULI)
}

/// Arrival volume ловит только тела акторов
pub fn arrival_groups() -> CollisionGroups {
    CollisionGroups::new(GROUP_AI_TRIGGERS, GROUP_ACTORS)
}

/// Источник шума: пересекается только с AI triggers
pub fn stimulus_groups() -> CollisionGroups {
    CollisionGroups::new(GROUP_STIMULI, GROUP_AI_TRIGGERS)
}

/// Фильтр лучей foot IK: только environment, sensors игнорируются
pub fn ground_ray_filter<'a>() -> QueryFilter<'a> {
    QueryFilter::new()
        .exclude_sensors()
        .groups(CollisionGroups::new(Group::ALL, GROUP_ENVIRONMENT))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sensor_sees_player_but_not_npc_bodies() {
        let sensor = sensor_groups();
        let player = player_groups();
        let npc = actor_groups();

        assert!(sensor.filters.contains(GROUP_STIMULI) && player.memberships.contains(GROUP_STIMULI));
        assert!(!sensor.filters.intersects(npc.memberships));
    }

    #[test]
    fn test_arrival_ignores_stimuli_layer() {
        let arrival = arrival_groups();

        assert!(arrival.filters.intersects(actor_groups().memberships));
        assert!(!arrival.filters.intersects(stimulus_groups().memberships));
    }
}
