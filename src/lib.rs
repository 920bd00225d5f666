//! VitalDesk - inpatient and vital sign register
//!
//! This library provides the core functionality of the VitalDesk clinic
//! desk tool: a register of inpatients, their periodic vital-sign
//! measurements, and a complete CSV backup that can be restored into a
//! fresh installation.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Patients, vital signs and their ids
//! - `storage`: JSON file storage layer and the store traits
//! - `audit`: Audit logging system
//! - `export`: The CSV codec and plain list exports
//! - `backup`: Complete backup, restore and retention
//! - `services`: Business logic layer
//! - `display`: Terminal formatting
//! - `cli`: Command handlers
//!
//! # Example
//!
//! ```rust,ignore
//! use vitaldesk::config::{paths::VitalPaths, settings::Settings};
//! use vitaldesk::services::BackupService;
//! use vitaldesk::storage::Storage;
//!
//! let paths = VitalPaths::new()?;
//! let mut storage = Storage::new(paths)?;
//! storage.load_all()?;
//! let backup = BackupService::new(&storage).create()?;
//! ```

pub mod audit;
pub mod backup;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod models;
pub mod services;
pub mod storage;

pub use error::VitalError;
