//! Semantic query nodes produced by the binder.

use crate::edm::{EntitySet, PrimitiveKind, TypeReference};
use crate::syntax::{BinaryOperatorKind, LiteralValue, OrderByDirection, UnaryOperatorKind};

/// A bound query node.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryNode {
    /// Node producing a single value.
    SingleValue(SingleValueNode),
    /// Node producing a collection.
    Collection(CollectionNode),
    /// Service operation whose result cannot be composed further.
    UncomposableServiceOperation(ServiceOperationNode),
    /// Custom query option passed through unchanged.
    CustomQueryOption(CustomQueryOptionNode),
}

impl QueryNode {
    /// Returns the static type of the node; `None` means unknown or open.
    #[must_use]
    pub fn type_reference(&self) -> Option<TypeReference> {
        match self {
            QueryNode::SingleValue(node) => node.type_reference(),
            QueryNode::Collection(node) => Some(TypeReference::collection(node.item_type().clone())),
            QueryNode::UncomposableServiceOperation(node) => node.return_type.clone(),
            QueryNode::CustomQueryOption(_) => None,
        }
    }

    /// Returns the node as a single value node.
    #[must_use]
    pub fn as_single_value(&self) -> Option<&SingleValueNode> {
        match self {
            QueryNode::SingleValue(node) => Some(node),
            _ => None,
        }
    }

    /// Returns the node as a collection node.
    #[must_use]
    pub fn as_collection(&self) -> Option<&CollectionNode> {
        match self {
            QueryNode::Collection(node) => Some(node),
            _ => None,
        }
    }
}

/// Node producing a single value.
#[derive(Debug, Clone, PartialEq)]
pub enum SingleValueNode {
    /// Constant.
    Constant {
        value: LiteralValue,
        /// `None` for the null literal.
        type_ref: Option<TypeReference>,
    },
    /// Conversion of a value to another type, checked on evaluation.
    Convert {
        source: Box<SingleValueNode>,
        target_type: TypeReference,
    },
    /// Binary operator application.
    BinaryOperator {
        op: BinaryOperatorKind,
        left: Box<SingleValueNode>,
        right: Box<SingleValueNode>,
        type_ref: Option<TypeReference>,
    },
    /// Unary operator application.
    UnaryOperator {
        op: UnaryOperatorKind,
        operand: Box<SingleValueNode>,
        type_ref: Option<TypeReference>,
    },
    /// Property of a single structured value.
    PropertyAccess {
        source: Box<SingleValueNode>,
        property: String,
        type_ref: TypeReference,
    },
    /// The implicit range variable of a filter or order-by.
    Parameter(ParameterNode),
    /// Call of a built-in function.
    FunctionCall {
        name: String,
        arguments: Vec<SingleValueNode>,
        return_type: TypeReference,
    },
    /// Entity selected by key from a collection.
    KeyLookup {
        collection: Box<CollectionNode>,
        key_values: Vec<KeyPropertyValue>,
    },
    /// Service operation returning a single value or entity.
    ServiceOperation(ServiceOperationNode),
}

impl SingleValueNode {
    /// Returns the static type of the node; `None` means unknown or open.
    #[must_use]
    pub fn type_reference(&self) -> Option<TypeReference> {
        match self {
            SingleValueNode::Constant { type_ref, .. }
            | SingleValueNode::BinaryOperator { type_ref, .. }
            | SingleValueNode::UnaryOperator { type_ref, .. } => type_ref.clone(),
            SingleValueNode::Convert { target_type, .. } => Some(target_type.clone()),
            SingleValueNode::PropertyAccess { type_ref, .. } => Some(type_ref.clone()),
            SingleValueNode::Parameter(parameter) => Some(parameter.type_ref.clone()),
            SingleValueNode::FunctionCall { return_type, .. } => Some(return_type.clone()),
            SingleValueNode::KeyLookup { collection, .. } => Some(collection.item_type().clone()),
            SingleValueNode::ServiceOperation(node) => node.return_type.clone(),
        }
    }

    /// Creates a constant node for a literal.
    #[must_use]
    pub fn constant(value: LiteralValue) -> Self {
        SingleValueNode::Constant {
            type_ref: value.type_reference(),
            value,
        }
    }

    /// Creates a constant `Edm.Int32` node.
    #[must_use]
    pub fn int32(value: i32) -> Self {
        SingleValueNode::Constant {
            value: LiteralValue::Int32(value),
            type_ref: Some(TypeReference::primitive(PrimitiveKind::Int32, false)),
        }
    }
}

/// The implicit range variable.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterNode {
    /// Type of the collection items the variable ranges over.
    pub type_ref: TypeReference,
}

/// Bound value of one key property.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyPropertyValue {
    pub property: String,
    pub value: SingleValueNode,
}

/// Node producing a collection.
#[derive(Debug, Clone, PartialEq)]
pub enum CollectionNode {
    /// Entity set.
    EntitySet {
        entity_set: EntitySet,
        item_type: TypeReference,
    },
    /// Filtered collection.
    Filter {
        collection: Box<CollectionNode>,
        parameter: ParameterNode,
        expression: Box<SingleValueNode>,
    },
    /// Ordered collection.
    OrderBy {
        collection: Box<CollectionNode>,
        parameter: ParameterNode,
        expression: Box<SingleValueNode>,
        direction: OrderByDirection,
    },
    /// Collection with leading items skipped.
    Skip {
        collection: Box<CollectionNode>,
        amount: Box<SingleValueNode>,
    },
    /// Collection truncated to leading items.
    Top {
        collection: Box<CollectionNode>,
        amount: Box<SingleValueNode>,
    },
    /// Service operation returning a queryable collection.
    ServiceOperation {
        operation: ServiceOperationNode,
        item_type: TypeReference,
    },
}

impl CollectionNode {
    /// Returns the type of the items of the collection.
    #[must_use]
    pub fn item_type(&self) -> &TypeReference {
        match self {
            CollectionNode::EntitySet { item_type, .. }
            | CollectionNode::ServiceOperation { item_type, .. } => item_type,
            CollectionNode::Filter { collection, .. }
            | CollectionNode::OrderBy { collection, .. }
            | CollectionNode::Skip { collection, .. }
            | CollectionNode::Top { collection, .. } => collection.item_type(),
        }
    }
}

/// Invocation of a service operation.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceOperationNode {
    pub operation: String,
    /// Parameter values in declaration order; missing nullable parameters
    /// are bound to a null constant.
    pub parameters: Vec<ServiceOperationParameter>,
    pub return_type: Option<TypeReference>,
}

/// Bound service operation parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceOperationParameter {
    pub name: String,
    pub value: SingleValueNode,
}

/// Custom query option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomQueryOptionNode {
    pub name: String,
    pub value: String,
}

/// Bound query.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryDescriptorNode {
    /// Bound path with filter, order-by, skip and top applied.
    pub query: QueryNode,
    /// Bound remaining query options, in input order.
    pub custom_query_options: Vec<QueryNode>,
}
