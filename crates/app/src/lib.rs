//! `barpark` application wiring: configuration and the scripted demo that
//! drives the view-models against the seeded in-memory services.

pub mod config;
pub mod demo;

pub use config::{AppConfig, ConfigError, LogFormat};
pub use demo::DemoReport;
