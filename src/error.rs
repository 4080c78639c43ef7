//! Error types for pddlsmith
//!
//! Centralized error handling using thiserror. Recoverable conditions inside
//! the refinement loop (parse failures, validator rejections) never surface
//! here; they are turned into feedback for the next attempt.

use thiserror::Error;

use crate::parser::ParseError;

/// All infrastructure errors that can escape a construction run
#[derive(Debug, Error)]
pub enum PddlsmithError {
    /// Prompt template could not be loaded or rendered
    #[error("Template error: {0}")]
    Template(String),

    /// LLM API error
    #[error("LLM error: {0}")]
    Llm(String),

    /// Domain description or configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// Model output could not be parsed
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type alias for pddlsmith operations
pub type Result<T> = std::result::Result<T, PddlsmithError>;
