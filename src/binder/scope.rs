//! Per-query binding state.

use tracing::trace;

use crate::syntax::QueryOptionToken;

use super::error::BindError;
use super::node::ParameterNode;

/// Mutable state of a single bind call.
///
/// Created fresh for every query, so a binder holds no state between
/// calls. Tracks the query options not consumed yet, the implicit range
/// variable in scope and the current recursion depth.
#[derive(Debug)]
pub(crate) struct BindingState {
    /// Query options not consumed by a clause or service operation.
    query_options: Vec<QueryOptionToken>,
    /// Range variable of the enclosing filter or order-by.
    parameter: Option<ParameterNode>,
    depth: usize,
    max_depth: usize,
}

impl BindingState {
    /// Creates a state over a copy of the query options.
    pub(crate) fn new(query_options: &[QueryOptionToken], max_depth: usize) -> Self {
        BindingState {
            query_options: query_options.to_vec(),
            parameter: None,
            depth: 0,
            max_depth,
        }
    }

    /// Returns the range variable in scope.
    pub(crate) fn parameter(&self) -> Option<&ParameterNode> {
        self.parameter.as_ref()
    }

    /// Brings a range variable into scope, returning the one it shadows.
    pub(crate) fn enter_parameter(&mut self, parameter: ParameterNode) -> Option<ParameterNode> {
        trace!(item_type = ?parameter.type_ref, "range variable in scope");
        self.parameter.replace(parameter)
    }

    /// Restores the range variable that was in scope before.
    pub(crate) fn exit_parameter(&mut self, previous: Option<ParameterNode>) {
        self.parameter = previous;
    }

    /// Enters one level of recursion.
    pub(crate) fn enter(&mut self) -> Result<(), BindError> {
        if self.depth >= self.max_depth {
            return Err(BindError::RecursionLimitExceeded(self.max_depth));
        }
        self.depth += 1;
        Ok(())
    }

    /// Leaves one level of recursion.
    pub(crate) fn exit(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Removes and returns the value of the option named `name`.
    ///
    /// # Errors
    ///
    /// Returns [`BindError::QueryOptionSpecifiedMoreThanOnce`] if the option
    /// occurs more than once.
    pub(crate) fn take_option(&mut self, name: &str) -> Result<Option<String>, BindError> {
        let mut matching = self.query_options.iter().filter(|o| o.name == name);
        match (matching.next(), matching.next()) {
            (None, _) => Ok(None),
            (Some(_), Some(_)) => Err(BindError::QueryOptionSpecifiedMoreThanOnce(name.to_string())),
            (Some(_), None) => {
                let position = self.query_options.iter().position(|o| o.name == name);
                Ok(position.map(|index| self.query_options.remove(index).value))
            }
        }
    }

    /// Takes all remaining query options.
    pub(crate) fn take_remaining_options(&mut self) -> Vec<QueryOptionToken> {
        std::mem::take(&mut self.query_options)
    }
}
