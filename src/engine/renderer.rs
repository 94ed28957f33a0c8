// ABOUTME: Renders a single template spec to its destination file or standard output
// ABOUTME: Handles overwrite policy, parent directory creation, and metadata preservation

use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::error::{EngineError, Result};
use super::metadata::ReferenceMetadata;
use crate::parser::TemplateSpec;
use crate::template::{Delimiters, TemplateEngine};
use crate::vars::{absolute_path, VarMap};

/// Output policy flags, named so they cannot be transposed at a call site
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Write every template to standard output regardless of `dest`
    pub force_stdout: bool,
    /// Leave existing destinations untouched
    pub no_overwrite: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderTarget {
    Stdout,
    File(PathBuf),
}

impl fmt::Display for RenderTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderTarget::Stdout => write!(f, "stdout"),
            RenderTarget::File(path) => write!(f, "{}", path.display()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    Rendered(RenderTarget),
    /// The destination already existed and `no_overwrite` was set
    Skipped { dest: PathBuf },
}

impl RenderOutcome {
    pub fn is_rendered(&self) -> bool {
        matches!(self, RenderOutcome::Rendered(_))
    }
}

/// Renders template specs belonging to one definition
pub struct TemplateRenderer {
    engine: TemplateEngine,
    base_path: PathBuf,
}

impl TemplateRenderer {
    pub fn new(base_path: &Path) -> Self {
        Self {
            engine: TemplateEngine::new(base_path),
            base_path: base_path.to_path_buf(),
        }
    }

    pub fn render(
        &mut self,
        spec: &TemplateSpec,
        scope: &VarMap,
        delimiters: &Delimiters,
        options: RenderOptions,
    ) -> Result<RenderOutcome> {
        let src = absolute_path(&self.base_path, &spec.src);
        let dest = (!spec.writes_to_stdout()).then(|| absolute_path(&self.base_path, &spec.dest));

        let source = fs::read_to_string(&src).map_err(|source| EngineError::SourceRead {
            path: src.clone(),
            source,
        })?;

        let name = src.to_string_lossy().into_owned();
        self.engine.compile(&name, &source, delimiters)?;

        if let Some(dest) = &dest {
            if options.no_overwrite && dest.exists() {
                warn!(
                    "Skipping {}: destination {} already exists",
                    spec.src,
                    dest.display()
                );
                return Ok(RenderOutcome::Skipped { dest: dest.clone() });
            }
        }

        match dest {
            Some(dest) if !options.force_stdout => {
                self.render_to_file(&name, scope, &dest)?;
                info!("Rendered {} to {}", spec.src, dest.display());
                Ok(RenderOutcome::Rendered(RenderTarget::File(dest)))
            }
            _ => {
                self.render_to_stdout(&name, scope)?;
                debug!("Rendered {} to stdout", spec.src);
                Ok(RenderOutcome::Rendered(RenderTarget::Stdout))
            }
        }
    }

    fn render_to_stdout(&self, name: &str, scope: &VarMap) -> Result<()> {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        self.engine.render_to_write(name, scope, &mut handle)?;
        handle.flush().map_err(|source| EngineError::Write {
            target: RenderTarget::Stdout.to_string(),
            source,
        })
    }

    fn render_to_file(&self, name: &str, scope: &VarMap, dest: &Path) -> Result<()> {
        if let Some(parent) = dest.parent() {
            if !parent.exists() {
                debug!("Creating directory {}", parent.display());
                fs::create_dir_all(parent).map_err(|source| EngineError::CreateDir {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        // Must be read before File::create truncates the destination
        let reference = ReferenceMetadata::capture(dest);

        let file = File::create(dest).map_err(|source| EngineError::CreateFile {
            path: dest.to_path_buf(),
            source,
        })?;

        let mut writer = BufWriter::new(&file);
        self.engine.render_to_write(name, scope, &mut writer)?;
        writer.flush().map_err(|source| EngineError::Write {
            target: dest.display().to_string(),
            source,
        })?;
        drop(writer);

        if let Some(reference) = reference {
            reference.apply(&file)?;
        }

        Ok(())
    }
}
