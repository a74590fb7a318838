//! Environment tooling for the spotweb streaming server
//!
//! - `Launcher`: exec the entry script with the environment's interpreter
//! - `Provisioner`: create the virtual environment and install its packages

pub mod config;
pub mod error;
pub mod launch;
pub mod layout;
pub mod provision;
pub mod record;
pub mod venv;

pub use config::{Package, ProvisionConfig, default_packages};
pub use error::{EnvError, Result};
pub use launch::Launcher;
pub use layout::Layout;
pub use provision::{ProvisionReport, Provisioner};
pub use record::ProvisionRecord;
pub use venv::{Creation, VirtualEnv};
