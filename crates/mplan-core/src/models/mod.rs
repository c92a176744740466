//! Data models: configuration and extracted media plans.

pub mod config;
pub mod plan;
