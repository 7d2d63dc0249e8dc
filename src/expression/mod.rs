//! EDM value expressions (model-level, e.g. vocabulary annotations).
//!
//! Expressions live in an [`ExprArena`] and refer to each other by
//! [`ExprId`]. A labeled expression is identified by its id, which is what
//! labeled references point at and what the evaluator memoizes on.

use std::fmt;

use crate::edm::TypeReference;
use crate::evaluator::EvalError;
use crate::types::EdmValue;

/// Index of an expression in an [`ExprArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExprId(pub(crate) u32);

impl ExprId {
    /// Returns the arena index.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ExprId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Callee of a function application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FunctionRef {
    /// Function statically resolved by qualified name.
    Bound(String),
    /// Function that could not be resolved when the expression was built.
    Bad(String),
}

impl FunctionRef {
    /// Returns the fully qualified name of the callee.
    #[must_use]
    pub fn full_name(&self) -> &str {
        match self {
            FunctionRef::Bound(name) | FunctionRef::Bad(name) => name,
        }
    }
}

/// An EDM value expression.
#[derive(Debug, Clone)]
pub enum Expression {
    /// Constant of any primitive kind, or null.
    Constant(EdmValue),
    /// Property path walked from the context value.
    Path(Vec<String>),
    /// Function application.
    Apply {
        function: FunctionRef,
        arguments: Vec<ExprId>,
    },
    /// Conditional.
    If {
        test: ExprId,
        if_true: ExprId,
        if_false: ExprId,
    },
    /// Type test.
    IsType {
        operand: ExprId,
        type_ref: TypeReference,
    },
    /// Type assertion.
    AssertType {
        operand: ExprId,
        type_ref: TypeReference,
    },
    /// Record construction.
    Record {
        /// Declared type of the record, if any.
        type_ref: Option<TypeReference>,
        properties: Vec<(String, ExprId)>,
    },
    /// Collection construction.
    Collection {
        /// Declared type of the collection, if any.
        type_ref: Option<TypeReference>,
        elements: Vec<ExprId>,
    },
    /// Labeled expression definition.
    Labeled { name: String, body: ExprId },
    /// Reference to a labeled expression.
    LabeledReference(ExprId),
    /// Reference to a function parameter.
    ParameterReference(String),
    /// Reference to a function.
    FunctionReference(String),
    /// Reference to a property of a base expression.
    PropertyReference { base: ExprId, name: String },
    /// Reference to a value term applied to a base expression.
    ValueTermReference {
        base: ExprId,
        term: String,
        qualifier: Option<String>,
    },
    /// Reference to an entity set.
    EntitySetReference(String),
    /// Reference to an enumeration member.
    EnumMemberReference { enum_type: String, member: String },
}

impl Expression {
    /// Returns a short name for the expression kind.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Expression::Constant(_) => "constant",
            Expression::Path(_) => "path",
            Expression::Apply { .. } => "function application",
            Expression::If { .. } => "if",
            Expression::IsType { .. } => "is type",
            Expression::AssertType { .. } => "assert type",
            Expression::Record { .. } => "record",
            Expression::Collection { .. } => "collection",
            Expression::Labeled { .. } => "labeled expression",
            Expression::LabeledReference(_) => "labeled expression reference",
            Expression::ParameterReference(_) => "parameter reference",
            Expression::FunctionReference(_) => "function reference",
            Expression::PropertyReference { .. } => "property reference",
            Expression::ValueTermReference { .. } => "value term reference",
            Expression::EntitySetReference(_) => "entity set reference",
            Expression::EnumMemberReference { .. } => "enum member reference",
        }
    }
}

/// Append-only storage for expressions.
#[derive(Debug, Clone, Default)]
pub struct ExprArena {
    nodes: Vec<Expression>,
}

impl ExprArena {
    /// Creates an empty arena.
    #[must_use]
    pub fn new() -> Self {
        ExprArena::default()
    }

    /// Adds an expression and returns its id.
    pub fn add(&mut self, expression: Expression) -> ExprId {
        let id = ExprId(self.nodes.len() as u32);
        self.nodes.push(expression);
        id
    }

    /// Returns the expression with the given id.
    #[must_use]
    pub fn get(&self, id: ExprId) -> Option<&Expression> {
        self.nodes.get(id.index())
    }

    /// Returns the number of expressions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the arena is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn constant(&mut self, value: impl Into<EdmValue>) -> ExprId {
        self.add(Expression::Constant(value.into()))
    }

    pub fn null(&mut self) -> ExprId {
        self.add(Expression::Constant(EdmValue::Null))
    }

    pub fn path(&mut self, segments: &[&str]) -> ExprId {
        self.add(Expression::Path(
            segments.iter().map(ToString::to_string).collect(),
        ))
    }

    pub fn apply(&mut self, function: &str, arguments: Vec<ExprId>) -> ExprId {
        self.add(Expression::Apply {
            function: FunctionRef::Bound(function.to_string()),
            arguments,
        })
    }

    pub fn bad_apply(&mut self, function: &str, arguments: Vec<ExprId>) -> ExprId {
        self.add(Expression::Apply {
            function: FunctionRef::Bad(function.to_string()),
            arguments,
        })
    }

    pub fn if_else(&mut self, test: ExprId, if_true: ExprId, if_false: ExprId) -> ExprId {
        self.add(Expression::If {
            test,
            if_true,
            if_false,
        })
    }

    pub fn is_type(&mut self, operand: ExprId, type_ref: TypeReference) -> ExprId {
        self.add(Expression::IsType { operand, type_ref })
    }

    pub fn assert_type(&mut self, operand: ExprId, type_ref: TypeReference) -> ExprId {
        self.add(Expression::AssertType { operand, type_ref })
    }

    pub fn record(
        &mut self,
        type_ref: Option<TypeReference>,
        properties: Vec<(&str, ExprId)>,
    ) -> ExprId {
        self.add(Expression::Record {
            type_ref,
            properties: properties
                .into_iter()
                .map(|(name, id)| (name.to_string(), id))
                .collect(),
        })
    }

    pub fn collection(&mut self, type_ref: Option<TypeReference>, elements: Vec<ExprId>) -> ExprId {
        self.add(Expression::Collection { type_ref, elements })
    }

    pub fn labeled(&mut self, name: &str, body: ExprId) -> ExprId {
        self.add(Expression::Labeled {
            name: name.to_string(),
            body,
        })
    }

    /// Adds a reference to a labeled expression.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::InvalidLabeledReference`] if `target` is not a
    /// labeled expression of this arena.
    pub fn labeled_reference(&mut self, target: ExprId) -> Result<ExprId, EvalError> {
        match self.get(target) {
            Some(Expression::Labeled { .. }) => Ok(self.add(Expression::LabeledReference(target))),
            _ => Err(EvalError::InvalidLabeledReference(target)),
        }
    }

    /// Finds a labeled expression by name.
    #[must_use]
    pub fn find_label(&self, name: &str) -> Option<ExprId> {
        self.nodes
            .iter()
            .position(|e| matches!(e, Expression::Labeled { name: n, .. } if n == name))
            .map(|index| ExprId(index as u32))
    }
}
