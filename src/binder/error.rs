//! Binding errors.

use thiserror::Error;

/// Errors that can occur while binding query tokens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    // ==================== Dispatch ====================
    #[error("A token of kind '{0}' cannot be bound here")]
    UnsupportedTokenKind(&'static str),

    #[error("Binding a token produced no node")]
    BoundNodeCannotBeNull,

    #[error("Binding {0} is not implemented")]
    NotImplemented(String),

    #[error("Recursion limit of {0} exceeded while binding")]
    RecursionLimitExceeded(usize),

    // ==================== Path and keys ====================
    #[error("Resource not found for the segment '{0}'")]
    RootSegmentResourceNotFound(String),

    #[error("Key values can only be applied to a collection of entities, found '{0}'")]
    KeyValueApplicableOnlyToEntityType(String),

    #[error("An unnamed key value was used on type '{0}' which has more than one key property")]
    UnnamedKeyValueOnTypeWithMultipleKeyProperties(String),

    #[error("Property '{property}' is not declared on type '{type_name}' or is not a key property")]
    PropertyNotDeclaredOrNotKeyInKeyValue { property: String, type_name: String },

    #[error("Key property '{0}' was specified more than once")]
    DuplicateKeyPropertyInKeyValues(String),

    #[error("Not all key properties of type '{0}' were specified")]
    NotAllKeyPropertiesSpecified(String),

    // ==================== Operators and conversion ====================
    #[error("An operand of operator '{operator}' is not a single value")]
    OperandNotSingleValue { operator: String },

    #[error("Operator '{operator}' is incompatible with operand types '{left}' and '{right}'")]
    IncompatibleOperands {
        left: String,
        right: String,
        operator: String,
    },

    #[error("Operator '{operator}' is incompatible with operand type '{operand}'")]
    IncompatibleOperand { operand: String, operator: String },

    #[error("Cannot convert a value of type '{source_type}' to type '{target_type}'")]
    CannotConvertToType {
        source_type: String,
        target_type: String,
    },

    // ==================== Properties ====================
    #[error("A property access without a parent requires a range variable in scope")]
    PropertyAccessWithoutParentParameter,

    #[error("The parent of property '{0}' is not a single value")]
    PropertyAccessSourceNotSingleValue(String),

    #[error("Property '{property}' is not declared on type '{type_name}'")]
    PropertyNotDeclared { type_name: String, property: String },

    #[error("Multi-valued property '{0}' cannot be used in an expression")]
    MultiValuePropertyNotSupportedInExpression(String),

    // ==================== Functions ====================
    #[error("Unknown function '{0}'")]
    UnknownFunction(String),

    #[error("An argument of function '{0}' is not a single value")]
    FunctionArgumentNotSingleValue(String),

    #[error("No applicable overload of function '{name}' was found; candidates: {signatures}")]
    NoApplicableFunctionFound { name: String, signatures: String },

    // ==================== Query options ====================
    #[error("$filter can only be applied to a collection of entities")]
    FilterNotApplicable,

    #[error("The $filter expression must be a single Boolean value")]
    FilterExpressionNotSingleValue,

    #[error("$orderby can only be applied to a collection of entities")]
    OrderByNotApplicable,

    #[error("The $orderby expression must be a single primitive value")]
    OrderByExpressionNotSingleValue,

    #[error("$skip can only be applied to a collection")]
    SkipNotApplicable,

    #[error("$top can only be applied to a collection")]
    TopNotApplicable,

    #[error("$skip requires a non-negative integer, found {0}")]
    SkipRequiresNonNegativeInteger(i64),

    #[error("$top requires a non-negative integer, found {0}")]
    TopRequiresNonNegativeInteger(i64),

    #[error("The system query option '{0}' is not supported")]
    UnsupportedSystemQueryOption(String),

    #[error("Query option '{0}' was specified more than once")]
    QueryOptionSpecifiedMoreThanOnce(String),

    // ==================== Service operations ====================
    #[error("Service operation '{0}' does not declare a result kind")]
    ServiceOperationWithoutResultKind(String),

    #[error("Service operation '{operation}' with result kind '{result_kind}' must return entities, found '{return_type}'")]
    QueryServiceOperationOfNonEntityType {
        operation: String,
        result_kind: String,
        return_type: String,
    },

    #[error("Key values cannot be applied to service operation '{0}' because it does not return a queryable collection")]
    NonQueryableServiceOperationWithKeyLookup(String),

    #[error("Parameter '{parameter}' of service operation '{operation}' is missing")]
    ServiceOperationParameterMissing { operation: String, parameter: String },

    #[error("Value '{value}' of parameter '{parameter}' of service operation '{operation}' is not a valid '{type_name}'")]
    ServiceOperationParameterInvalidType {
        parameter: String,
        value: String,
        operation: String,
        type_name: String,
    },
}
