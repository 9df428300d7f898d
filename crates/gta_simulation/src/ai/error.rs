//! Ошибки конфигурации AI (никогда не фатальны для тика)

use thiserror::Error;

use crate::ai::AIStateType;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AIConfigError {
    #[error("waypoint network is empty")]
    EmptyWaypointNetwork,

    #[error("waypoint cursor {index} is out of range (network has {len} nodes)")]
    WaypointOutOfRange { index: usize, len: usize },

    #[error("state {0:?} is not registered on this state machine")]
    UnregisteredState(AIStateType),
}
