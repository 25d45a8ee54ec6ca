//! Configuration management for the API client
//!
//! This module handles loading and managing configuration settings
//! for both the library and the CLI.

pub mod loader;
pub mod settings;

pub use loader::ConfigLoader;
pub use settings::{
    ApiSettings, CredentialSettings, LoggingSettings, NetworkSettings, RateLimitSettings, Settings,
};
