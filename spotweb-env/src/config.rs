//! Provisioning configuration: ~/.config/cli-programs/spotweb.toml

use crate::error::{EnvError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const DEFAULT_PYTHON: &str = "python3";
const DEFAULT_ENV_NAME: &str = "spotweb";

/// A package to install, with the module name used to verify it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    /// Anything `pip install` accepts.
    pub requirement: String,

    /// Import name. Defaults to the requirement's project name; URL and path
    /// requirements have none and are not import-checked unless this is set.
    #[serde(default)]
    pub module: Option<String>,
}

impl Package {
    pub fn new(requirement: &str, module: Option<&str>) -> Self {
        Self {
            requirement: requirement.to_string(),
            module: module.map(str::to_string),
        }
    }

    /// Project name without version specifiers ("bottle>=0.12" -> "bottle").
    ///
    /// None for bare URLs and paths ("git+https://...", "./pkg").
    pub fn name(&self) -> Option<&str> {
        let requirement = self.requirement.trim();
        if !requirement.starts_with(|c: char| c.is_ascii_alphanumeric()) {
            return None;
        }

        let end = requirement
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.'))
            .unwrap_or(requirement.len());
        match requirement[end..].chars().next() {
            Some('+' | ':' | '/' | '\\') => None,
            _ => Some(&requirement[..end]),
        }
    }

    /// Short label for progress output.
    pub fn label(&self) -> &str {
        self.name().unwrap_or(self.requirement.trim())
    }

    pub fn module(&self) -> Option<String> {
        match &self.module {
            Some(module) => Some(module.clone()),
            None => self.name().map(|name| name.replace('-', "_").to_lowercase()),
        }
    }
}

/// Packages the server imports: CLI parsing, the Spotify binding, and the WSGI layer.
pub fn default_packages() -> Vec<Package> {
    vec![
        Package::new("clize", None),
        Package::new("pyspotify", Some("spotify")),
        Package::new("bottle", None),
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvisionConfig {
    /// Interpreter used to create new environments.
    #[serde(default = "default_python")]
    pub python: String,

    /// Directory holding named environments. None means ~/.virtualenvs.
    #[serde(default)]
    pub env_root: Option<PathBuf>,

    #[serde(default = "default_env_name")]
    pub env_name: String,

    #[serde(default = "default_true")]
    pub upgrade_pip: bool,

    #[serde(default = "default_true")]
    pub verify_imports: bool,

    #[serde(default = "default_packages")]
    pub packages: Vec<Package>,
}

fn default_python() -> String {
    DEFAULT_PYTHON.to_string()
}

fn default_env_name() -> String {
    DEFAULT_ENV_NAME.to_string()
}

fn default_true() -> bool {
    true
}

impl Default for ProvisionConfig {
    fn default() -> Self {
        Self {
            python: default_python(),
            env_root: None,
            env_name: default_env_name(),
            upgrade_pip: true,
            verify_imports: true,
            packages: default_packages(),
        }
    }
}

impl ProvisionConfig {
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("cli-programs")
            .join("spotweb.toml")
    }

    /// Load config from file, returning default if file doesn't exist
    pub fn load() -> Result<Self> {
        let path = Self::config_path();

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Environment directory used when none is given on the command line.
    pub fn default_target(&self) -> Result<PathBuf> {
        let root = match &self.env_root {
            Some(root) => root.clone(),
            None => dirs::home_dir()
                .ok_or(EnvError::NoHomeDir)?
                .join(".virtualenvs"),
        };
        Ok(root.join(&self.env_name))
    }
}
