//! `ownerdash` - A local, editable dashboard over a landowner dataset
//!
//! This library loads the owner CSV, keeps the `Rv_Owner` and `Packer` edit
//! maps on disk, and serves a single HTML page for editing them.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod dashboard;
pub mod dataset;
pub mod error;
pub mod export;
pub mod logging;
pub mod render;
pub mod server;
pub mod store;

pub use config::Config;
pub use dashboard::{Dashboard, DashboardRow};
pub use dataset::{load_dataset, DatasetSummary, OwnerRecord};
pub use error::{Error, Result};
pub use logging::init_logging;
pub use store::{EditField, EditFile, EditMap, EditStore, Edits, SaveOutcome, SaveRequest};
