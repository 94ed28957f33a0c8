// ABOUTME: Template engine module for kompoze
// ABOUTME: Delimiter handling, helper functions, and Handlebars-backed rendering

pub mod delimiters;
pub mod engine;
pub mod error;
pub mod helpers;

pub use delimiters::{translate, Delimiters};
pub use engine::TemplateEngine;
pub use error::{Result, TemplateError};
