// ABOUTME: Render result types for templates, definitions, and whole runs
// ABOUTME: Aggregates per-template outcomes and per-definition failures into a run summary

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

use super::error::EngineError;
use super::renderer::RenderOutcome;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateReport {
    pub src: String,
    pub outcome: RenderOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinitionReport {
    pub definition: PathBuf,
    pub templates: Vec<TemplateReport>,
}

impl DefinitionReport {
    pub fn new(definition: PathBuf) -> Self {
        Self {
            definition,
            templates: Vec::new(),
        }
    }

    pub fn rendered_count(&self) -> usize {
        self.templates
            .iter()
            .filter(|t| t.outcome.is_rendered())
            .count()
    }

    pub fn skipped_count(&self) -> usize {
        self.templates.len() - self.rendered_count()
    }
}

#[derive(Debug)]
pub struct DefinitionFailure {
    pub definition: PathBuf,
    pub error: EngineError,
}

/// Outcome of one scheduler run; both lists keep the input order of definitions
#[derive(Debug, Default)]
pub struct RunReport {
    pub definitions: Vec<DefinitionReport>,
    pub failures: Vec<DefinitionFailure>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub definitions: usize,
    pub rendered: usize,
    pub skipped: usize,
    pub failed: usize,
    pub cancelled: usize,
}

impl RunReport {
    pub fn summary(&self) -> RunSummary {
        let cancelled = self
            .failures
            .iter()
            .filter(|f| f.error.is_cancelled())
            .count();

        RunSummary {
            definitions: self.definitions.len() + self.failures.len(),
            rendered: self.definitions.iter().map(|d| d.rendered_count()).sum(),
            skipped: self.definitions.iter().map(|d| d.skipped_count()).sum(),
            failed: self.failures.len() - cancelled,
            cancelled,
        }
    }

    /// Skips are not failures
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} definition(s): {} rendered, {} skipped, {} failed",
            self.definitions, self.rendered, self.skipped, self.failed
        )?;
        if self.cancelled > 0 {
            write!(f, ", {} cancelled", self.cancelled)?;
        }
        Ok(())
    }
}
