//! Binder module for semantic analysis of OData queries.
//!
//! The binder turns the lexical [`QueryToken`](crate::syntax::QueryToken)
//! tree produced by a URI tokenizer into semantic [`QueryNode`]s, resolving:
//! - Entity sets, service operations and key values against the model
//! - Properties against the type of the range variable or parent node
//! - Operand promotion and built-in function overloads
//!
//! The output is a typed query tree for an evaluator or a query provider.

mod error;
pub mod functions;
mod literal;
mod node;
mod options;
pub mod promotion;
mod scope;
mod semantic;

use crate::error::{ODataError, Result};

pub use error::BindError;
pub use literal::parse_uri_literal;
pub use node::{
    CollectionNode, CustomQueryOptionNode, KeyPropertyValue, ParameterNode, QueryDescriptorNode,
    QueryNode, ServiceOperationNode, ServiceOperationParameter, SingleValueNode,
};
pub use options::{DefaultQueryOptionHandler, QueryOptionHandler};
pub use semantic::MetadataBinder;

/// Default maximum nesting depth of bound tokens.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Configuration for the metadata binder.
#[derive(Debug, Clone)]
pub struct BinderConfig {
    /// Maximum nesting depth of tokens before binding fails.
    pub max_depth: usize,
}

impl Default for BinderConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl BinderConfig {
    /// Creates a new binder configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum nesting depth.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if `max_depth` is zero.
    pub fn validate(&self) -> Result<()> {
        if self.max_depth == 0 {
            return Err(ODataError::InvalidConfig(
                "max_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
