//! Environment provisioning: create the venv if absent, then install packages.

use crate::config::ProvisionConfig;
use crate::error::{EnvError, Result};
use crate::record::ProvisionRecord;
use crate::venv::{Creation, VirtualEnv};
use std::path::{Path, PathBuf};

/// Summary of a provisioning run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionReport {
    pub target: PathBuf,
    pub created: bool,
    pub installed: Vec<String>,
    pub verified: bool,
}

pub struct Provisioner {
    config: ProvisionConfig,
    venv: VirtualEnv,
}

impl Provisioner {
    pub fn new(config: ProvisionConfig, target: &Path) -> Self {
        Self {
            config,
            venv: VirtualEnv::new(target),
        }
    }

    /// Provisioner for the configured default target.
    pub fn with_default_target(config: ProvisionConfig) -> Result<Self> {
        let target = config.default_target()?;
        Ok(Self::new(config, &target))
    }

    pub fn venv(&self) -> &VirtualEnv {
        &self.venv
    }

    /// Run every step, stopping at the first failure.
    pub fn run(&self) -> Result<ProvisionReport> {
        let total = self.step_count();
        let mut step = 0;
        let mut next_step = |label: &str| {
            step += 1;
            log::info!("[{}/{}] {}", step, total, label);
        };

        next_step("Setting up Python environment...");
        let created = match self.venv.create(&self.config.python, true)? {
            Creation::Created => true,
            Creation::AlreadyPresent => {
                if !self.venv.is_ready() {
                    log::warn!(
                        "  {} has no working interpreter at {}; pip will likely fail",
                        self.venv.root().display(),
                        self.venv.interpreter().display()
                    );
                }
                false
            }
        };

        if self.config.upgrade_pip {
            next_step("Upgrading pip...");
            self.venv.pip_install("pip", true)?;
        }

        next_step("Installing packages...");
        self.venv.install_packages(&self.config.packages, |msg| {
            log::info!("  {}", msg);
        })?;

        let verified = if self.config.verify_imports {
            next_step("Verifying packages...");
            self.verify()?;
            true
        } else {
            false
        };

        let installed: Vec<String> = self
            .config
            .packages
            .iter()
            .map(|p| p.requirement.clone())
            .collect();
        ProvisionRecord::new(self.venv.python_version()?, installed.clone())
            .save(self.venv.root())?;

        Ok(ProvisionReport {
            target: self.venv.root().to_path_buf(),
            created,
            installed,
            verified,
        })
    }

    fn step_count(&self) -> usize {
        2 + usize::from(self.config.upgrade_pip) + usize::from(self.config.verify_imports)
    }

    /// Import every package's module inside the environment.
    fn verify(&self) -> Result<()> {
        for package in &self.config.packages {
            let Some(module) = package.module() else {
                log::warn!(
                    "  skipping import check for '{}': set `module` to verify it",
                    package.requirement
                );
                continue;
            };
            if !self.venv.can_import(&module)? {
                return Err(EnvError::VerificationFailed { module });
            }
            log::debug!("  import {} ok", module);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Package;
    use std::fs;
    use tempfile::TempDir;

    fn bare_config() -> ProvisionConfig {
        ProvisionConfig {
            python: "definitely-not-a-python-3f9a".to_string(),
            upgrade_pip: false,
            verify_imports: false,
            packages: Vec::new(),
            ..ProvisionConfig::default()
        }
    }

    #[test]
    fn test_default_target_from_config() {
        let config = ProvisionConfig {
            env_root: Some(PathBuf::from("/srv/envs")),
            ..ProvisionConfig::default()
        };
        let provisioner = Provisioner::with_default_target(config).unwrap();
        assert_eq!(provisioner.venv().root(), Path::new("/srv/envs/spotweb"));
    }

    #[test]
    fn test_missing_base_python() {
        let temp_dir = TempDir::new().unwrap();
        let provisioner = Provisioner::new(bare_config(), &temp_dir.path().join("env"));
        let err = provisioner.run().unwrap_err();
        assert!(matches!(err, EnvError::InterpreterNotFound { .. }));
        assert!(!temp_dir.path().join("env").exists());
    }

    #[test]
    fn test_step_count() {
        let temp_dir = TempDir::new().unwrap();
        assert_eq!(Provisioner::new(bare_config(), temp_dir.path()).step_count(), 2);
        let full = Provisioner::new(ProvisionConfig::default(), temp_dir.path());
        assert_eq!(full.step_count(), 4);
    }

    #[cfg(unix)]
    fn write_script(path: &Path, body: &str) {
        use std::os::unix::fs::PermissionsExt;
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    /// An environment whose python and pip are shell scripts.
    #[cfg(unix)]
    fn fake_env(root: &Path, pip_body: &str) -> VirtualEnv {
        let venv = VirtualEnv::new(root);
        write_script(
            &venv.interpreter(),
            "if [ \"$1\" = \"--version\" ]; then echo 'Python 3.11.11'; fi\nexit 0",
        );
        write_script(&venv.pip(), pip_body);
        venv
    }

    #[cfg(unix)]
    #[test]
    fn test_rerun_on_existing_env() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("env");
        let log = temp_dir.path().join("pip.log");
        fake_env(&root, &format!("echo \"$@\" >> '{}'", log.display()));

        let config = ProvisionConfig {
            packages: vec![Package::new("clize", None), Package::new("bottle", None)],
            verify_imports: true,
            upgrade_pip: true,
            ..bare_config()
        };
        let provisioner = Provisioner::new(config, &root);

        // the base python does not exist, so creation must be skipped both times
        let first = provisioner.run().unwrap();
        let second = provisioner.run().unwrap();
        assert!(!first.created);
        assert!(!second.created);
        assert!(second.verified);
        assert_eq!(second.installed, vec!["clize", "bottle"]);

        let calls = fs::read_to_string(&log).unwrap();
        assert_eq!(calls.lines().filter(|l| *l == "install --upgrade pip").count(), 2);
        assert_eq!(calls.lines().filter(|l| *l == "install clize").count(), 2);

        let record = ProvisionRecord::load(&root).unwrap().unwrap();
        assert_eq!(record.python_version, "Python 3.11.11");
        assert_eq!(record.packages, vec!["clize", "bottle"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_install_failure_stops_run() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("env");
        fake_env(&root, "exit 3");

        let config = ProvisionConfig {
            packages: vec![Package::new("pyspotify", Some("spotify"))],
            ..bare_config()
        };
        let err = Provisioner::new(config, &root).run().unwrap_err();
        assert_eq!(err.exit_code(), 3);
        assert!(ProvisionRecord::load(&root).unwrap().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_verification_failure() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("env");
        let venv = fake_env(&root, "exit 0");
        write_script(&venv.interpreter(), "exit 1");

        let config = ProvisionConfig {
            packages: vec![Package::new("pyspotify", Some("spotify"))],
            verify_imports: true,
            ..bare_config()
        };
        match Provisioner::new(config, &root).run() {
            Err(EnvError::VerificationFailed { module }) => assert_eq!(module, "spotify"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_url_requirement_skips_import_check() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("env");
        let venv = fake_env(&root, "exit 0");
        // --version works, every import fails
        write_script(
            &venv.interpreter(),
            "if [ \"$1\" = \"--version\" ]; then echo 'Python 3.11.11'; exit 0; fi\nexit 1",
        );

        let config = ProvisionConfig {
            packages: vec![Package::new("git+https://github.com/mopidy/pyspotify.git", None)],
            verify_imports: true,
            ..bare_config()
        };
        let report = Provisioner::new(config, &root).run().unwrap();
        assert!(report.verified);
        assert_eq!(report.installed, vec!["git+https://github.com/mopidy/pyspotify.git"]);
    }

    #[test]
    fn test_existing_target_without_interpreter_is_not_recreated() {
        let temp_dir = TempDir::new().unwrap();
        let provisioner = Provisioner::new(bare_config(), temp_dir.path());
        assert!(!provisioner.venv().is_ready());

        // no pip in the directory either, so the run stops at the first pip call
        let config = ProvisionConfig {
            upgrade_pip: true,
            ..bare_config()
        };
        let err = Provisioner::new(config, temp_dir.path()).run().unwrap_err();
        assert!(matches!(err, EnvError::Spawn { .. }));
        assert!(temp_dir.path().exists());
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }
}
