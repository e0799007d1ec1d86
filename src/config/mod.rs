//! Configuration module for the activity designer.
//!
//! Provides CLI argument parsing plus the activity configuration model and
//! its template/schema loaders.

mod activity;
mod settings;

pub use activity::{Account, Accounts, ActivityConfig, Board, Visibility, load_schema};
pub use settings::AppConfig;
