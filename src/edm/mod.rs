//! Entity Data Model: the read-only type system consumed by the binder and
//! the evaluator.
//!
//! Named schema types (complex, entity, enum) live in a [`Model`] arena and
//! are addressed by [`TypeId`]. Everything else is described by a
//! [`TypeReference`], which pairs a [`TypeDefinition`] with nullability and
//! facets.

mod model;
mod types;

pub use model::{
    EntitySet, EnumType, Model, OperationParameter, Property, PropertyKind, SchemaType,
    ServiceOperation, ServiceOperationResultKind, StructuredType,
};
pub use types::{PrimitiveKind, TypeDefinition, TypeId, TypeReference};
