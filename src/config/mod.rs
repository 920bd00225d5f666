//! Configuration module for VitalDesk
//!
//! This module provides configuration management including:
//! - Data, backup and export path resolution
//! - User settings persistence

pub mod paths;
pub mod settings;

pub use paths::VitalPaths;
pub use settings::Settings;
