//! Provisioning record kept alongside the environment.

use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name of the record inside the environment directory.
pub const RECORD_FILE: &str = "spotweb-provision.json";

/// What the last successful provisioning run installed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvisionRecord {
    /// Output of `python --version`, e.g. "Python 3.11.11".
    pub python_version: String,

    /// pip requirements installed, in install order.
    pub packages: Vec<String>,

    pub provisioned_at: DateTime<Utc>,
}

impl ProvisionRecord {
    pub fn new(python_version: impl Into<String>, packages: Vec<String>) -> Self {
        Self {
            python_version: python_version.into(),
            packages,
            provisioned_at: Utc::now(),
        }
    }

    pub fn path(env_dir: &Path) -> PathBuf {
        env_dir.join(RECORD_FILE)
    }

    /// Load the record, or `None` if the environment has none.
    pub fn load(env_dir: &Path) -> Result<Option<Self>> {
        let path = Self::path(env_dir);
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    pub fn save(&self, env_dir: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(Self::path(env_dir), content)?;
        Ok(())
    }
}
