pub mod autopilot;
pub mod collision;
pub mod config;
pub mod constants;
pub mod engine;
pub mod entity;
pub mod error;
pub mod logging;
pub mod protocol;
pub mod rng;
pub mod stats;
pub mod types;
pub mod world;
