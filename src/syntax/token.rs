//! Lexical query tokens.
//!
//! Tokens are produced by a URI tokenizer and carry no type information.
//! The binder only reads them.

use serde::{Deserialize, Serialize};

use super::literal::LiteralValue;

/// A lexical query token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum QueryToken {
    /// Path segment, optionally with key values.
    Segment(SegmentToken),
    /// Literal.
    Literal(LiteralToken),
    /// Binary operator application.
    BinaryOperator {
        op: BinaryOperatorKind,
        left: Box<QueryToken>,
        right: Box<QueryToken>,
    },
    /// Unary operator application.
    UnaryOperator {
        op: UnaryOperatorKind,
        operand: Box<QueryToken>,
    },
    /// Property access; without a parent it refers to the implicit range variable.
    PropertyAccess {
        name: String,
        parent: Option<Box<QueryToken>>,
    },
    /// Function call.
    FunctionCall {
        name: String,
        arguments: Vec<QueryToken>,
    },
    /// Query option (`name=value`).
    QueryOption(QueryOptionToken),
    /// Order-by clause; only meaningful inside a query descriptor.
    OrderBy(OrderByToken),
}

impl QueryToken {
    /// Returns a short name of the token kind.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            QueryToken::Segment(_) => "Segment",
            QueryToken::Literal(_) => "Literal",
            QueryToken::BinaryOperator { .. } => "BinaryOperator",
            QueryToken::UnaryOperator { .. } => "UnaryOperator",
            QueryToken::PropertyAccess { .. } => "PropertyAccess",
            QueryToken::FunctionCall { .. } => "FunctionCall",
            QueryToken::QueryOption(_) => "QueryOption",
            QueryToken::OrderBy(_) => "OrderBy",
        }
    }

    /// Creates a literal token.
    #[must_use]
    pub fn literal(value: LiteralValue) -> Self {
        QueryToken::Literal(LiteralToken {
            original_text: value.to_string(),
            value,
        })
    }

    /// Creates a property access on the implicit range variable.
    #[must_use]
    pub fn property(name: &str) -> Self {
        QueryToken::PropertyAccess {
            name: name.to_string(),
            parent: None,
        }
    }

    /// Creates a property access on an explicit parent.
    #[must_use]
    pub fn property_of(parent: QueryToken, name: &str) -> Self {
        QueryToken::PropertyAccess {
            name: name.to_string(),
            parent: Some(Box::new(parent)),
        }
    }

    /// Creates a binary operator token.
    #[must_use]
    pub fn binary(op: BinaryOperatorKind, left: QueryToken, right: QueryToken) -> Self {
        QueryToken::BinaryOperator {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Creates a unary operator token.
    #[must_use]
    pub fn unary(op: UnaryOperatorKind, operand: QueryToken) -> Self {
        QueryToken::UnaryOperator {
            op,
            operand: Box::new(operand),
        }
    }

    /// Creates a function call token.
    #[must_use]
    pub fn call(name: &str, arguments: Vec<QueryToken>) -> Self {
        QueryToken::FunctionCall {
            name: name.to_string(),
            arguments,
        }
    }
}

/// Path segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentToken {
    /// Segment name (entity set, service operation, property...).
    pub name: String,
    /// Preceding segment; `None` for a root segment.
    pub parent: Option<Box<SegmentToken>>,
    /// Key values in parentheses. `None` when no parentheses were given.
    pub named_values: Option<Vec<NamedValue>>,
}

impl SegmentToken {
    /// Creates a root segment.
    #[must_use]
    pub fn root(name: &str) -> Self {
        SegmentToken {
            name: name.to_string(),
            parent: None,
            named_values: None,
        }
    }

    /// Creates a segment following `parent`.
    #[must_use]
    pub fn child(parent: SegmentToken, name: &str) -> Self {
        SegmentToken {
            name: name.to_string(),
            parent: Some(Box::new(parent)),
            named_values: None,
        }
    }

    /// Attaches key values.
    #[must_use]
    pub fn with_key_values(mut self, values: Vec<NamedValue>) -> Self {
        self.named_values = Some(values);
        self
    }
}

/// Named (`Key=value`) or positional key value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedValue {
    /// Key property name; `None` for a positional value.
    pub name: Option<String>,
    /// The value.
    pub value: LiteralToken,
}

impl NamedValue {
    /// Creates a named key value.
    #[must_use]
    pub fn named(name: &str, value: LiteralValue) -> Self {
        NamedValue {
            name: Some(name.to_string()),
            value: LiteralToken::new(value),
        }
    }

    /// Creates a positional key value.
    #[must_use]
    pub fn positional(value: LiteralValue) -> Self {
        NamedValue {
            name: None,
            value: LiteralToken::new(value),
        }
    }
}

/// Literal with its original URI text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiteralToken {
    pub value: LiteralValue,
    pub original_text: String,
}

impl LiteralToken {
    /// Creates a literal token, rendering the original text from the value.
    #[must_use]
    pub fn new(value: LiteralValue) -> Self {
        LiteralToken {
            original_text: value.to_string(),
            value,
        }
    }
}

/// Query option (`name=value`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryOptionToken {
    pub name: String,
    pub value: String,
}

impl QueryOptionToken {
    /// Creates a query option token.
    #[must_use]
    pub fn new(name: &str, value: &str) -> Self {
        QueryOptionToken {
            name: name.to_string(),
            value: value.to_string(),
        }
    }
}

/// Order-by clause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderByToken {
    pub expression: Box<QueryToken>,
    pub direction: OrderByDirection,
}

impl OrderByToken {
    /// Creates an order-by clause.
    #[must_use]
    pub fn new(expression: QueryToken, direction: OrderByDirection) -> Self {
        OrderByToken {
            expression: Box::new(expression),
            direction,
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OrderByDirection {
    #[default]
    Ascending,
    Descending,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOperatorKind {
    Or,
    And,
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
}

impl BinaryOperatorKind {
    /// Returns the operator name used in messages.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            BinaryOperatorKind::Or => "Or",
            BinaryOperatorKind::And => "And",
            BinaryOperatorKind::Equal => "Equal",
            BinaryOperatorKind::NotEqual => "NotEqual",
            BinaryOperatorKind::GreaterThan => "GreaterThan",
            BinaryOperatorKind::GreaterThanOrEqual => "GreaterThanOrEqual",
            BinaryOperatorKind::LessThan => "LessThan",
            BinaryOperatorKind::LessThanOrEqual => "LessThanOrEqual",
            BinaryOperatorKind::Add => "Add",
            BinaryOperatorKind::Subtract => "Subtract",
            BinaryOperatorKind::Multiply => "Multiply",
            BinaryOperatorKind::Divide => "Divide",
            BinaryOperatorKind::Modulo => "Modulo",
        }
    }

    /// Returns the URI keyword of this operator.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOperatorKind::Or => "or",
            BinaryOperatorKind::And => "and",
            BinaryOperatorKind::Equal => "eq",
            BinaryOperatorKind::NotEqual => "ne",
            BinaryOperatorKind::GreaterThan => "gt",
            BinaryOperatorKind::GreaterThanOrEqual => "ge",
            BinaryOperatorKind::LessThan => "lt",
            BinaryOperatorKind::LessThanOrEqual => "le",
            BinaryOperatorKind::Add => "add",
            BinaryOperatorKind::Subtract => "sub",
            BinaryOperatorKind::Multiply => "mul",
            BinaryOperatorKind::Divide => "div",
            BinaryOperatorKind::Modulo => "mod",
        }
    }

    /// Returns true for `and`/`or`.
    #[must_use]
    pub fn is_logical(&self) -> bool {
        matches!(self, BinaryOperatorKind::And | BinaryOperatorKind::Or)
    }

    /// Returns true for `eq`/`ne`.
    #[must_use]
    pub fn is_equality(&self) -> bool {
        matches!(self, BinaryOperatorKind::Equal | BinaryOperatorKind::NotEqual)
    }

    /// Returns true for `gt`/`ge`/`lt`/`le`.
    #[must_use]
    pub fn is_relational(&self) -> bool {
        matches!(
            self,
            BinaryOperatorKind::GreaterThan
                | BinaryOperatorKind::GreaterThanOrEqual
                | BinaryOperatorKind::LessThan
                | BinaryOperatorKind::LessThanOrEqual
        )
    }

    /// Returns true for arithmetic operators.
    #[must_use]
    pub fn is_arithmetic(&self) -> bool {
        !(self.is_logical() || self.is_equality() || self.is_relational())
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOperatorKind {
    Negate,
    Not,
}

impl UnaryOperatorKind {
    /// Returns the operator name used in messages.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            UnaryOperatorKind::Negate => "Negate",
            UnaryOperatorKind::Not => "Not",
        }
    }
}

/// A complete query: path plus query options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryDescriptorToken {
    /// Resource path.
    pub path: QueryToken,
    /// `$filter` expression.
    pub filter: Option<QueryToken>,
    /// `$orderby` clauses, first clause first.
    pub order_by: Vec<OrderByToken>,
    /// `$skip` amount.
    pub skip: Option<i64>,
    /// `$top` amount.
    pub top: Option<i64>,
    /// Remaining query options.
    pub query_options: Vec<QueryOptionToken>,
}

impl QueryDescriptorToken {
    /// Creates a query over a path.
    #[must_use]
    pub fn new(path: QueryToken) -> Self {
        QueryDescriptorToken {
            path,
            filter: None,
            order_by: Vec::new(),
            skip: None,
            top: None,
            query_options: Vec::new(),
        }
    }

    /// Creates a query over a root segment.
    #[must_use]
    pub fn for_segment(name: &str) -> Self {
        Self::new(QueryToken::Segment(SegmentToken::root(name)))
    }

    /// Sets the filter expression.
    #[must_use]
    pub fn with_filter(mut self, filter: QueryToken) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Appends an order-by clause.
    #[must_use]
    pub fn with_order_by(mut self, expression: QueryToken, direction: OrderByDirection) -> Self {
        self.order_by.push(OrderByToken::new(expression, direction));
        self
    }

    /// Sets the skip amount.
    #[must_use]
    pub fn with_skip(mut self, skip: i64) -> Self {
        self.skip = Some(skip);
        self
    }

    /// Sets the top amount.
    #[must_use]
    pub fn with_top(mut self, top: i64) -> Self {
        self.top = Some(top);
        self
    }

    /// Appends a query option.
    #[must_use]
    pub fn with_option(mut self, name: &str, value: &str) -> Self {
        self.query_options.push(QueryOptionToken::new(name, value));
        self
    }
}
