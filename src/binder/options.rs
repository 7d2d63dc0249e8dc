//! Binding of query options left over after the clauses are bound.

use crate::syntax::QueryOptionToken;

use super::error::BindError;
use super::node::{CustomQueryOptionNode, QueryNode};

/// Binds query options that no clause or service operation consumed.
///
/// Protocol extensions implement this to recognise their own options.
/// Returning `Ok(None)` is a handler bug and fails binding with
/// [`BindError::BoundNodeCannotBeNull`].
pub trait QueryOptionHandler: Send + Sync {
    /// Binds one query option.
    ///
    /// # Errors
    ///
    /// Returns a [`BindError`] if the option cannot be bound.
    fn bind_query_option(&self, option: &QueryOptionToken) -> Result<Option<QueryNode>, BindError>;
}

/// Rejects unknown system (`$`-prefixed) options and passes every other
/// option through as a custom query option.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultQueryOptionHandler;

impl QueryOptionHandler for DefaultQueryOptionHandler {
    fn bind_query_option(&self, option: &QueryOptionToken) -> Result<Option<QueryNode>, BindError> {
        if option.name.starts_with('$') {
            return Err(BindError::UnsupportedSystemQueryOption(option.name.clone()));
        }
        Ok(Some(QueryNode::CustomQueryOption(CustomQueryOptionNode {
            name: option.name.clone(),
            value: option.value.clone(),
        })))
    }
}
