use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EnvError {
    #[error("Cannot find {}", .path.display())]
    MissingPath { path: PathBuf },

    #[error("{program} failed{}", failure_detail(*code, stderr))]
    Subprocess {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("Failed to run {program}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Python interpreter '{name}' not found on PATH")]
    InterpreterNotFound {
        name: String,
        #[source]
        source: which::Error,
    },

    #[error("Package verification failed: cannot import '{module}'")]
    VerificationFailed { module: String },

    #[error("Could not determine home directory")]
    NoHomeDir,

    #[error("IO error")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration")]
    TomlParse(#[from] toml::de::Error),

    #[error("Invalid provisioning record")]
    Json(#[from] serde_json::Error),
}

impl EnvError {
    /// Process exit status for this error.
    ///
    /// A failed sub-step passes its own exit code through; anything else is 1.
    pub fn exit_code(&self) -> u8 {
        match self {
            EnvError::Subprocess { code, .. } => exit_status_code(*code).max(1),
            _ => 1,
        }
    }
}

/// Map a child's exit code onto the 0..=255 a process can report.
///
/// Zero stays zero; any other code stays non-zero. A missing code (killed by
/// a signal) is 1.
pub fn exit_status_code(code: Option<i32>) -> u8 {
    match code {
        Some(0) => 0,
        Some(c) => c.clamp(1, 255) as u8,
        None => 1,
    }
}

fn failure_detail(code: Option<i32>, stderr: &str) -> String {
    let mut detail = code.map(|c| format!(" (exit code {})", c)).unwrap_or_default();
    if !stderr.is_empty() {
        detail.push_str(": ");
        detail.push_str(stderr);
    }
    detail
}

pub type Result<T> = std::result::Result<T, EnvError>;
