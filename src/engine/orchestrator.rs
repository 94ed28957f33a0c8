// ABOUTME: Drives the rendering of one definition file from load to last template
// ABOUTME: Resolves global and per-template variables, then renders templates in declared order

use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use super::error::{EngineError, Result};
use super::renderer::{RenderOptions, TemplateRenderer};
use super::result::{DefinitionReport, TemplateReport};
use crate::parser::Definition;
use crate::template::Delimiters;
use crate::vars::{absolute_path, resolve_include_vars, resolved_scope};

/// Run-wide settings shared read-only by every definition task
#[derive(Debug, Clone)]
pub struct RenderSettings {
    pub base_path: PathBuf,
    pub delimiters: Delimiters,
    pub options: RenderOptions,
}

impl RenderSettings {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            delimiters: Delimiters::default(),
            options: RenderOptions::default(),
        }
    }

    pub fn with_delimiters(mut self, delimiters: Delimiters) -> Self {
        self.delimiters = delimiters;
        self
    }

    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }
}

/// Render every template of the definition at `path`.
///
/// Relative definition paths resolve against the base path. The token is
/// checked before each template so a cancelled run stops before its next write.
#[instrument(skip(settings, cancel), fields(definition = %path.display()))]
pub fn render_definition(
    path: &Path,
    settings: &RenderSettings,
    cancel: &CancellationToken,
) -> Result<DefinitionReport> {
    let definition_path = absolute_path(&settings.base_path, path);
    info!("Rendering definition {}", definition_path.display());

    let definition = Definition::load(&definition_path)?;
    let global = resolve_include_vars(
        &settings.base_path,
        &definition.vars.include,
        &definition.vars.global,
    )?;
    debug!("Resolved {} global variable(s)", global.len());

    let mut renderer = TemplateRenderer::new(&settings.base_path);
    let mut report = DefinitionReport::new(definition_path.clone());

    for spec in &definition.templates {
        if cancel.is_cancelled() {
            info!("Cancelled before rendering {}", spec.src);
            return Err(EngineError::Cancelled {
                definition: definition_path,
            });
        }

        let local = resolve_include_vars(&settings.base_path, &spec.include_vars, &spec.local_vars)?;
        let scope = resolved_scope(&local, &global);

        info!("Rendering template {} -> {}", spec.src, display_dest(&spec.dest));
        let outcome = renderer.render(spec, &scope, &settings.delimiters, settings.options)?;
        report.templates.push(TemplateReport {
            src: spec.src.clone(),
            outcome,
        });
    }

    info!("Finished rendering {} template(s)", report.templates.len());
    Ok(report)
}

fn display_dest(dest: &str) -> &str {
    if dest.is_empty() {
        "stdout"
    } else {
        dest
    }
}
