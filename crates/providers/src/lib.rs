//! Model provider implementations for RoboTutor.
//!
//! All providers implement the `robotutor_core::Provider` trait.
//! `build_from_config` picks and configures one from `AppConfig`.

pub mod builder;
pub mod openrouter;

pub use builder::build_from_config;
pub use openrouter::OpenRouterProvider;
