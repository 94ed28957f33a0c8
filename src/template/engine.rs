// ABOUTME: Main template engine implementation using Handlebars
// ABOUTME: Compiles template sources under configurable delimiters and renders them to writers

use handlebars::Handlebars;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tracing::debug;

use super::delimiters::{translate, Delimiters};
use super::error::{Result, TemplateError};
use super::helpers;

#[derive(Clone)]
pub struct TemplateEngine {
    handlebars: Handlebars<'static>,
}

impl TemplateEngine {
    /// Create a template engine with the full helper table.
    ///
    /// `base_path` anchors relative paths passed to the `exists` helper.
    pub fn new(base_path: &Path) -> Self {
        let mut handlebars = Handlebars::new();

        // Missing variables render empty rather than failing
        handlebars.set_strict_mode(false);
        handlebars.set_dev_mode(false);

        // Output is config files, not HTML
        handlebars.register_escape_fn(handlebars::no_escape);

        helpers::register_helpers(&mut handlebars, base_path);

        Self { handlebars }
    }

    /// Parse `source` under `delimiters` and register it as `name`
    pub fn compile(&mut self, name: &str, source: &str, delimiters: &Delimiters) -> Result<()> {
        let native = translate(source, delimiters)?;
        debug!("Compiling template {} ({} bytes)", name, native.len());

        self.handlebars
            .register_template_string(name, native)
            .map_err(|e| TemplateError::SyntaxError {
                name: name.to_string(),
                message: e.to_string(),
            })
    }

    /// Evaluate a compiled template against `scope`, streaming output into `writer`
    pub fn render_to_write<T, W>(&self, name: &str, scope: &T, writer: W) -> Result<()>
    where
        T: Serialize,
        W: Write,
    {
        self.handlebars
            .render_to_write(name, scope, writer)
            .map_err(|source| TemplateError::RenderError {
                name: name.to_string(),
                source,
            })
    }

    /// Compile and evaluate `source` in one step
    pub fn render_str<T: Serialize>(
        &self,
        source: &str,
        delimiters: &Delimiters,
        scope: &T,
    ) -> Result<String> {
        let native = translate(source, delimiters)?;
        self.handlebars
            .render_template(&native, scope)
            .map_err(|source| TemplateError::RenderError {
                name: "<inline>".to_string(),
                source,
            })
    }
}
