//! Launch the entry script inside its virtual environment.

use crate::error::{EnvError, Result};
use crate::layout::Layout;
use crate::record::ProvisionRecord;
use std::ffi::OsString;
use std::process::{Command, ExitCode};

/// Runs `<env>/bin/python <base>/src/spotweb.py ARGS...`.
#[derive(Debug, Clone)]
pub struct Launcher {
    layout: Layout,
}

impl Launcher {
    pub fn new(layout: Layout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Check the interpreter, then the script.
    pub fn check(&self) -> Result<()> {
        for path in [self.layout.interpreter(), self.layout.script()] {
            if !path.exists() {
                return Err(EnvError::MissingPath { path });
            }
        }
        Ok(())
    }

    /// Build the interpreter command. Arguments are passed through untouched.
    pub fn command<I>(&self, args: I) -> Command
    where
        I: IntoIterator<Item = OsString>,
    {
        let mut command = Command::new(self.layout.interpreter());
        command.arg(self.layout.script()).args(args);
        command
    }

    /// Replace the current process with the entry script.
    ///
    /// On Unix this only returns on failure. Elsewhere the script runs as a
    /// child and its exit code is forwarded.
    pub fn launch<I>(&self, args: I) -> Result<ExitCode>
    where
        I: IntoIterator<Item = OsString>,
    {
        self.check()?;

        match ProvisionRecord::load(&self.layout.env_dir()) {
            Ok(Some(record)) => log::debug!(
                "environment provisioned at {} with {}",
                record.provisioned_at,
                record.python_version
            ),
            Ok(None) => {}
            Err(e) => log::debug!("ignoring unreadable provisioning record: {:?}", e),
        }

        let mut command = self.command(args);
        log::debug!("launching {:?}", command);
        replace_process(&mut command, &self.layout.interpreter().display().to_string())
    }
}

#[cfg(unix)]
fn replace_process(command: &mut Command, program: &str) -> Result<ExitCode> {
    use std::os::unix::process::CommandExt;
    // exec only returns on error
    let source = command.exec();
    Err(EnvError::Spawn {
        program: program.to_string(),
        source,
    })
}

#[cfg(not(unix))]
fn replace_process(command: &mut Command, program: &str) -> Result<ExitCode> {
    let status = command.status().map_err(|source| EnvError::Spawn {
        program: program.to_string(),
        source,
    })?;
    Ok(ExitCode::from(crate::error::exit_status_code(status.code())))
}
