//! Filesystem layout of an installed spotweb tree.
//!
//! ```text
//! <base>/spotweb            launcher executable
//! <base>/env/               virtual environment
//! <base>/env/bin/python     interpreter
//! <base>/src/spotweb.py     application entry point
//! ```

use crate::error::{EnvError, Result};
use std::path::{Path, PathBuf};

/// Name of the environment directory under the base directory.
pub const ENV_DIR_NAME: &str = "env";

/// Directory holding the application sources.
pub const SOURCE_DIR_NAME: &str = "src";

/// Application entry point launched inside the environment.
pub const ENTRY_SCRIPT: &str = "spotweb.py";

/// Paths derived from the directory the launcher lives in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    base: PathBuf,
}

impl Layout {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// Layout rooted at the directory containing the running executable.
    pub fn from_current_exe() -> Result<Self> {
        let exe = std::env::current_exe()?;
        let base = exe.parent().ok_or(EnvError::MissingPath { path: exe.clone() })?;
        Ok(Self::new(base))
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn env_dir(&self) -> PathBuf {
        self.base.join(ENV_DIR_NAME)
    }

    pub fn interpreter(&self) -> PathBuf {
        interpreter_in(&self.env_dir())
    }

    pub fn script(&self) -> PathBuf {
        self.base.join(SOURCE_DIR_NAME).join(ENTRY_SCRIPT)
    }
}

/// Interpreter path inside a virtual environment root.
pub fn interpreter_in(env_dir: &Path) -> PathBuf {
    if cfg!(windows) {
        env_dir.join("Scripts").join("python.exe")
    } else {
        env_dir.join("bin").join("python")
    }
}

/// pip path inside a virtual environment root.
pub fn pip_in(env_dir: &Path) -> PathBuf {
    if cfg!(windows) {
        env_dir.join("Scripts").join("pip.exe")
    } else {
        env_dir.join("bin").join("pip")
    }
}
