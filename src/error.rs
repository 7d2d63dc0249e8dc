//! Error types for odata-core operations.

use thiserror::Error;

use crate::binder::BindError;
use crate::evaluator::EvalError;

/// Result type alias using [`ODataError`].
pub type Result<T> = std::result::Result<T, ODataError>;

/// Error types for odata-core operations.
#[derive(Debug, Error)]
pub enum ODataError {
    /// Model registration errors (duplicate type, unknown base type, bad key, etc.).
    #[error("Schema error: {0}")]
    SchemaError(String),

    /// Invalid binder or evaluator configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ==================== Query Binding ====================
    /// Binding error (lexical tokens to semantic nodes).
    #[error("Bind error: {0}")]
    BindError(#[from] BindError),

    // ==================== Expression Evaluation ====================
    /// Evaluation error (EDM value expressions and type conformance).
    #[error("Evaluation error: {0}")]
    EvalError(#[from] EvalError),
}
