//! odata-core - semantic core of an OData implementation
//!
//! Binds lexical query tokens to typed query trees, evaluates EDM value
//! expressions lazily, and checks runtime values against model types.

pub mod binder;
pub mod conformance;
pub mod edm;
pub mod error;
pub mod evaluator;
pub mod expression;
pub mod syntax;
pub mod types;

pub use binder::{BindError, BinderConfig, MetadataBinder, QueryDescriptorNode, QueryNode};
pub use conformance::TypeConformance;
pub use edm::{Model, PrimitiveKind, TypeDefinition, TypeId, TypeReference};
pub use error::{ODataError, Result};
pub use evaluator::{EvalError, Evaluator, EvaluatorBuilder};
pub use expression::{ExprArena, ExprId, Expression};
pub use syntax::{QueryDescriptorToken, QueryToken};
pub use types::{DelayedValue, EdmValue};
