// ABOUTME: Rendering engine module for kompoze
// ABOUTME: Renders templates to destinations, drives definitions, and fans out across files

pub mod error;
pub mod metadata;
pub mod orchestrator;
pub mod renderer;
pub mod result;
pub mod scheduler;

pub use error::{EngineError, Result};
pub use metadata::ReferenceMetadata;
pub use orchestrator::{render_definition, RenderSettings};
pub use renderer::{RenderOptions, RenderOutcome, RenderTarget, TemplateRenderer};
pub use result::{DefinitionFailure, DefinitionReport, RunReport, RunSummary, TemplateReport};
pub use scheduler::RenderScheduler;
