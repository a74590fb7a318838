//! spotweb-provision - create the spotweb virtual environment and install its packages

use anyhow::{Context, Result};
use clap::Parser;
use spotweb_env::{EnvError, ProvisionConfig, Provisioner};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "spotweb-provision")]
#[command(about = "Create the spotweb virtual environment and install its packages", long_about = None)]
#[command(version)]
struct Args {
    /// Environment directory (default: ~/.virtualenvs/spotweb)
    target_dir: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            let code = e
                .downcast_ref::<EnvError>()
                .map(EnvError::exit_code)
                .unwrap_or(1);
            ExitCode::from(code)
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let config = ProvisionConfig::load().with_context(|| {
        format!(
            "Failed to load {}",
            ProvisionConfig::config_path().display()
        )
    })?;

    let provisioner = match &args.target_dir {
        Some(target) => Provisioner::new(config, target),
        None => Provisioner::with_default_target(config)?,
    };

    let report = provisioner.run()?;

    log::info!(
        "Environment ready at {} ({}, {} package(s){})",
        report.target.display(),
        if report.created { "created" } else { "existing" },
        report.installed.len(),
        if report.verified { ", verified" } else { "" }
    );
    Ok(())
}
