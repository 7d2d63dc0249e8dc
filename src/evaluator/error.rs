//! Evaluation errors.

use thiserror::Error;

use crate::expression::ExprId;

/// Errors raised while evaluating EDM value expressions or asserting types.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// A path was evaluated without a context value.
    #[error("Evaluating a path requires a context value")]
    MissingContext,

    /// A path hop matched no property.
    #[error("Path segment '{0}' could not be bound")]
    UnboundPath(String),

    /// A function application could not be resolved.
    #[error("Function '{0}' could not be bound")]
    UnboundFunction(String),

    /// A value does not conform to the asserted type.
    #[error("The value does not conform to type '{0}'")]
    TypeAssertionFailed(String),

    /// An if expression's test did not evaluate to a boolean.
    #[error("The condition of an if expression evaluated to {0}, expected Boolean")]
    NonBooleanCondition(String),

    /// The expression kind is not supported by the evaluator.
    #[error("Evaluating a {0} expression is not implemented")]
    NotImplemented(&'static str),

    /// An expression id does not resolve to an expression.
    #[error("Unrecognized expression {0}")]
    UnrecognizedExpression(ExprId),

    /// A labeled reference does not point at a labeled expression.
    #[error("Expression {0} is not a labeled expression")]
    InvalidLabeledReference(ExprId),

    /// A delayed value was forced while it was being evaluated.
    #[error("Cyclic reference while evaluating a delayed value")]
    CyclicDelayedValue,

    /// A function implementation reported a failure.
    #[error("Function '{name}' failed: {message}")]
    FunctionFailed { name: String, message: String },
}
