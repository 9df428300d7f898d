//! Physics integration
//!
//! AI ядро физику не знает: ему нужны только trigger события (sensor,
//! arrival volume) и лучи вниз для foot IK. Два источника:
//! - `RapierPhysicsBridgePlugin` — реальные colliders rapier;
//! - `ProximityTriggerPlugin` — headless сферы без физики (тесты, сервер).

pub mod groups;
pub mod proximity;
pub mod rapier_bridge;

// Re-export основных типов
pub use groups::*;
pub use proximity::{detect_proximity_triggers, ProximityTriggerPlugin, ProximityTriggers};
pub use rapier_bridge::{RapierGroundProbe, RapierPhysicsBridgePlugin, RapierTriggerPairs};
