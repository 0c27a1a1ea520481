//! Error types for fivem-script-crafter

use crate::capability::CapabilityError;
use crate::schema::{SchemaMismatchError, ValidationError};
use thiserror::Error;

/// Result type for crafter operations
pub type Result<T> = std::result::Result<T, CrafterError>;

/// Errors that can occur while generating or improving scripts
#[derive(Error, Debug)]
pub enum CrafterError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Capability error: {0}")]
    Capability(#[from] CapabilityError),

    #[error(transparent)]
    SchemaMismatch(#[from] SchemaMismatchError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Template error: {0}")]
    Template(#[from] handlebars::TemplateError),

    #[error("Render error: {0}")]
    Render(#[from] handlebars::RenderError),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Template validation error: {0}")]
    TemplateValidation(String),
}
