// Library exports for the snake agent
// This allows the replay tool and the integration tests to drive the core
// planning logic directly

pub mod agent;
pub mod config;
pub mod debug_logger;
pub mod errors;
pub mod game;
pub mod mapping;
pub mod planner;
pub mod replay;
pub mod search;
pub mod transport;
pub mod types;
