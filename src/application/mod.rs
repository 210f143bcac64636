//! Application layer: Use cases and services.
//!
//! This module orchestrates domain logic with ports to implement
//! the risk assessment use case.

mod config;
mod engine;

pub use config::EngineConfig;
pub use engine::RiskEngine;
