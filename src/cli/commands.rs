// ABOUTME: Command implementation for the kompoze CLI
// ABOUTME: Builds render settings from flags and configuration and runs the scheduler

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{error, info};

use super::args::Args;
use super::config::Config;
use crate::engine::{RenderOptions, RenderScheduler, RenderSettings, RunSummary};
use crate::template::Delimiters;

/// Make the base path absolute, defaulting to the working directory
pub fn resolve_base_path(base_path: Option<&Path>) -> Result<PathBuf> {
    let cwd = std::env::current_dir().context("Invalid base path")?;
    Ok(match base_path {
        Some(path) if path.is_absolute() => path.to_path_buf(),
        Some(path) => cwd.join(path),
        None => cwd,
    })
}

/// Flags win over configuration; the native pair is the fallback
pub fn resolve_delimiters(args: &Args, config: &Config) -> Result<Delimiters> {
    match args.delims.as_deref().or(config.delimiters.as_deref()) {
        Some(raw) => Ok(raw.parse()?),
        None => Ok(Delimiters::default()),
    }
}

pub fn build_settings(args: &Args, config: &Config) -> Result<RenderSettings> {
    let base_path = resolve_base_path(args.base_path.as_deref())?;
    let delimiters = resolve_delimiters(args, config)?;

    Ok(RenderSettings::new(base_path)
        .with_delimiters(delimiters)
        .with_options(RenderOptions {
            force_stdout: args.stdout,
            no_overwrite: args.no_overwrite,
        }))
}

/// Render every definition and fail when any of them failed
pub async fn render_definitions(
    definitions: Vec<PathBuf>,
    settings: RenderSettings,
    max_concurrent: usize,
    fail_fast: bool,
) -> Result<RunSummary> {
    info!(
        "Base path: {}, delimiters: {}",
        settings.base_path.display(),
        settings.delimiters
    );

    let report = RenderScheduler::new(max_concurrent)
        .with_fail_fast(fail_fast)
        .run(definitions, settings)
        .await;

    let summary = report.summary();
    if report.is_success() {
        info!("{}", summary);
        return Ok(summary);
    }

    let failures: Vec<String> = report
        .failures
        .iter()
        .filter(|f| !f.error.is_cancelled())
        .map(|f| format!("{}: {}", f.definition.display(), f.error))
        .collect();

    error!("{}", summary);
    Err(anyhow::anyhow!(
        "Error found! Aborting execution: {}",
        failures.join("; ")
    ))
}
