//! Virtual environment creation and pip installs.

use crate::config::Package;
use crate::error::{EnvError, Result};
use crate::layout::{interpreter_in, pip_in};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Outcome of [`VirtualEnv::create`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Creation {
    Created,
    AlreadyPresent,
}

/// A virtual environment rooted at a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualEnv {
    root: PathBuf,
}

impl VirtualEnv {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn interpreter(&self) -> PathBuf {
        interpreter_in(&self.root)
    }

    pub fn pip(&self) -> PathBuf {
        pip_in(&self.root)
    }

    pub fn exists(&self) -> bool {
        self.root.exists()
    }

    /// Check if the environment has a working interpreter.
    pub fn is_ready(&self) -> bool {
        let python = self.interpreter();
        if !python.exists() {
            return false;
        }

        match Command::new(&python).arg("--version").output() {
            Ok(o) => o.status.success(),
            Err(_) => false,
        }
    }

    /// Create the environment with `python -m venv` unless the directory exists.
    ///
    /// `python` is resolved on PATH only when creation is needed. An existing
    /// directory is left untouched, whatever it contains.
    pub fn create(&self, python: &str, with_pip: bool) -> Result<Creation> {
        if self.exists() {
            log::info!("Environment {} already exists", self.root.display());
            return Ok(Creation::AlreadyPresent);
        }

        let python = find_python(python)?;

        log::info!(
            "Creating virtual environment at {} with {}",
            self.root.display(),
            python.display()
        );

        let mut command = Command::new(&python);
        command.args(["-m", "venv"]);
        if !with_pip {
            command.arg("--without-pip");
        }
        command.arg(&self.root);

        run(&mut command, &format!("{} -m venv", python.display()))?;
        Ok(Creation::Created)
    }

    /// Install a package using pip.
    pub fn pip_install(&self, requirement: &str, upgrade: bool) -> Result<()> {
        let mut args = vec!["install"];
        if upgrade {
            args.push("--upgrade");
        }
        args.push(requirement);

        let mut command = Command::new(self.pip());
        command.args(&args);
        run(&mut command, &format!("pip {}", args.join(" ")))?;
        Ok(())
    }

    /// Install packages in order, reporting progress before each one.
    pub fn install_packages(
        &self,
        packages: &[Package],
        progress_callback: impl Fn(&str),
    ) -> Result<()> {
        for (i, package) in packages.iter().enumerate() {
            progress_callback(&format!(
                "Installing {} ({}/{})...",
                package.label(),
                i + 1,
                packages.len()
            ));
            self.pip_install(&package.requirement, false)?;
        }
        Ok(())
    }

    /// Check that a module imports inside the environment.
    pub fn can_import(&self, module: &str) -> Result<bool> {
        let output = Command::new(self.interpreter())
            .args(["-c", &format!("import {}", module)])
            .output()
            .map_err(|source| EnvError::Spawn {
                program: self.interpreter().display().to_string(),
                source,
            })?;
        Ok(output.status.success())
    }

    /// Interpreter version string, e.g. "Python 3.11.11".
    pub fn python_version(&self) -> Result<String> {
        let mut command = Command::new(self.interpreter());
        command.arg("--version");
        let output = run(&mut command, "python --version")?;

        // Python 2 printed its version on stderr
        let stdout = String::from_utf8_lossy(&output.stdout);
        let version = if stdout.trim().is_empty() {
            String::from_utf8_lossy(&output.stderr).trim().to_string()
        } else {
            stdout.trim().to_string()
        };
        Ok(version)
    }
}

/// Run a command to completion, turning a non-zero exit into an error.
fn run(command: &mut Command, description: &str) -> Result<Output> {
    log::debug!("running {:?}", command);

    let output = command.output().map_err(|source| EnvError::Spawn {
        program: command.get_program().to_string_lossy().into_owned(),
        source,
    })?;

    if !output.status.success() {
        return Err(EnvError::Subprocess {
            program: description.to_string(),
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(output)
}

/// Resolve an interpreter name or path the way a shell would.
pub fn find_python(name: &str) -> Result<PathBuf> {
    which::which(name).map_err(|source| EnvError::InterpreterNotFound {
        name: name.to_string(),
        source,
    })
}
