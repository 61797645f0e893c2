//! Error types for templates.

use thiserror::Error;

/// Result type alias for template operations.
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Errors that can occur during template operations.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TemplateError {
    #[error("Template {template} references unknown field: {field}")]
    UnknownField { template: String, field: String },

    #[error("Variable not provided for template {template}: {variable}")]
    MissingVariable { template: String, variable: String },

    #[error("Unknown CI service: {0} (supported: travis)")]
    UnknownCiService(String),
}
