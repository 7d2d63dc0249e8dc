//! Expression evaluator for EDM value expressions.
//!
//! The evaluator walks an [`ExprArena`] against an optional context value.
//! Records and collections are produced lazily: each property or element is
//! a [`DelayedValue`] that captures the context and is evaluated on first
//! access. Labeled expressions are memoized per evaluator, keyed by the
//! [`ExprId`] of their definition, so every reference observes one shared
//! evaluation. A record or collection holds on to the labeled values its
//! properties and elements refer to, so the sharing lasts as long as the
//! value does, even past the evaluator.

mod error;

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::conformance::TypeConformance;
use crate::edm::{Model, TypeReference};
use crate::expression::{ExprArena, ExprId, Expression, FunctionRef};
use crate::types::{
    CollectionValue, DelayedValue, EdmValue, PropertyValue, StructuredValue, ValueSlot,
};

pub use error::EvalError;

/// Implementation of a built-in function. Arguments are already evaluated.
pub type FunctionImpl = Arc<dyn Fn(&[EdmValue]) -> Result<EdmValue, EvalError> + Send + Sync>;

/// Fallback for function applications that are not statically bound.
///
/// Receives the fully qualified function name and the evaluated arguments.
/// Returning `None` declines the call.
pub type LastChanceResolver = Arc<dyn Fn(&str, &[EdmValue]) -> Option<EdmValue> + Send + Sync>;

type RetainedLabels = Mutex<Vec<Arc<DelayedValue>>>;

/// Builder for [`Evaluator`].
pub struct EvaluatorBuilder {
    model: Arc<Model>,
    arena: Arc<ExprArena>,
    functions: HashMap<String, FunctionImpl>,
    last_chance: Option<LastChanceResolver>,
}

impl EvaluatorBuilder {
    /// Registers a built-in function under its qualified name.
    #[must_use]
    pub fn with_function<F>(mut self, name: impl Into<String>, function: F) -> Self
    where
        F: Fn(&[EdmValue]) -> Result<EdmValue, EvalError> + Send + Sync + 'static,
    {
        self.functions.insert(name.into(), Arc::new(function));
        self
    }

    /// Sets the last-chance resolver.
    #[must_use]
    pub fn with_last_chance<F>(mut self, resolver: F) -> Self
    where
        F: Fn(&str, &[EdmValue]) -> Option<EdmValue> + Send + Sync + 'static,
    {
        self.last_chance = Some(Arc::new(resolver));
        self
    }

    /// Builds the evaluator.
    #[must_use]
    pub fn build(self) -> Evaluator {
        let retained = Arc::new(Mutex::new(Vec::new()));
        Evaluator {
            engine: Arc::new(Engine {
                conformance: TypeConformance::new(self.model),
                arena: self.arena,
                functions: self.functions,
                last_chance: self.last_chance,
                labeled: Mutex::new(HashMap::new()),
                retained: Arc::downgrade(&retained),
            }),
            retained,
        }
    }
}

/// Evaluates EDM value expressions.
///
/// An evaluator owns the labeled-value memoization map. It is not meant
/// for concurrent evaluations; independent evaluators share nothing.
pub struct Evaluator {
    engine: Arc<Engine>,
    /// Keeps labeled values alive between evaluations.
    retained: Arc<RetainedLabels>,
}

impl Evaluator {
    /// Creates an evaluator without built-in functions or last-chance resolver.
    #[must_use]
    pub fn new(model: Arc<Model>, arena: Arc<ExprArena>) -> Self {
        Self::builder(model, arena).build()
    }

    /// Returns a builder for an evaluator over the model and arena.
    #[must_use]
    pub fn builder(model: Arc<Model>, arena: Arc<ExprArena>) -> EvaluatorBuilder {
        EvaluatorBuilder {
            model,
            arena,
            functions: HashMap::new(),
            last_chance: None,
        }
    }

    /// Evaluates an expression.
    ///
    /// `context` is the structured value paths are resolved against.
    ///
    /// # Errors
    ///
    /// Returns an [`EvalError`] if any part of the expression fails to
    /// evaluate. Failures inside records and collections surface when the
    /// affected property or element is accessed.
    pub fn evaluate(&self, expr: ExprId, context: Option<&EdmValue>) -> Result<EdmValue, EvalError> {
        self.engine.evaluate(expr, context)
    }

    /// Evaluates an expression and asserts the result against `target`.
    ///
    /// # Errors
    ///
    /// Returns an [`EvalError`] if evaluation fails or the result does not
    /// conform to `target`.
    pub fn evaluate_as(
        &self,
        expr: ExprId,
        context: Option<&EdmValue>,
        target: &TypeReference,
    ) -> Result<EdmValue, EvalError> {
        let value = self.engine.evaluate(expr, context)?;
        self.engine.conformance.assert_type(target, value)
    }

    /// Forgets all memoized labeled values.
    ///
    /// Later evaluations start from an empty memo. Records and collections
    /// already handed out keep the labeled values they were built with,
    /// forced or not, so their references still observe one evaluation;
    /// they just no longer share it with evaluations after the reset.
    pub fn reset(&self) {
        let drained = std::mem::take(&mut *self.engine.labeled.lock());
        drop(drained);
        let retained = std::mem::take(&mut *self.retained.lock());
        drop(retained);
    }

    /// Returns the expression arena.
    #[must_use]
    pub fn arena(&self) -> &ExprArena {
        &self.engine.arena
    }

    /// Returns the conformance engine used for type tests and assertions.
    #[must_use]
    pub fn conformance(&self) -> &TypeConformance {
        &self.engine.conformance
    }
}

impl fmt::Debug for Evaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Evaluator")
            .field("expressions", &self.engine.arena.len())
            .field("functions", &self.engine.functions.len())
            .field("last_chance", &self.engine.last_chance.is_some())
            .finish_non_exhaustive()
    }
}

struct Engine {
    arena: Arc<ExprArena>,
    conformance: TypeConformance,
    functions: HashMap<String, FunctionImpl>,
    last_chance: Option<LastChanceResolver>,
    /// Labeled definition id -> shared delayed value. Delayed values hold
    /// the engine, so the memo only holds them weakly; the evaluator and
    /// the values built from them keep them alive.
    labeled: Mutex<HashMap<ExprId, Weak<DelayedValue>>>,
    retained: Weak<RetainedLabels>,
}

impl Engine {
    fn evaluate(
        self: &Arc<Self>,
        id: ExprId,
        context: Option<&EdmValue>,
    ) -> Result<EdmValue, EvalError> {
        let Some(expression) = self.arena.get(id) else {
            return Err(EvalError::UnrecognizedExpression(id));
        };
        trace!(expr = %id, kind = expression.kind_name(), "evaluating expression");

        match expression {
            Expression::Constant(value) => Ok(value.clone()),
            Expression::Path(segments) => Self::evaluate_path(segments, context),
            Expression::Apply {
                function,
                arguments,
            } => self.evaluate_apply(function, arguments, context),
            Expression::If {
                test,
                if_true,
                if_false,
            } => match self.evaluate(*test, context)? {
                EdmValue::Boolean(true) => self.evaluate(*if_true, context),
                EdmValue::Boolean(false) => self.evaluate(*if_false, context),
                other => Err(EvalError::NonBooleanCondition(other.kind().to_string())),
            },
            Expression::IsType { operand, type_ref } => {
                let value = self.evaluate(*operand, context)?;
                Ok(EdmValue::Boolean(self.conformance.matches(type_ref, &value)?))
            }
            Expression::AssertType { operand, type_ref } => {
                let value = self.evaluate(*operand, context)?;
                self.conformance.assert_type(type_ref, value)
            }
            Expression::Record {
                type_ref,
                properties,
            } => {
                let properties = properties
                    .iter()
                    .map(|(name, expr)| {
                        PropertyValue::delayed(name.clone(), self.slot_value(*expr, context))
                    })
                    .collect();
                Ok(EdmValue::Structured(StructuredValue::new(
                    type_ref.clone(),
                    properties,
                )))
            }
            Expression::Collection { type_ref, elements } => {
                let slots = elements
                    .iter()
                    .map(|element| ValueSlot::Delayed(self.slot_value(*element, context)))
                    .collect();
                Ok(EdmValue::Collection(CollectionValue::from_slots(
                    type_ref.clone(),
                    slots,
                )))
            }
            Expression::Labeled { .. } => self.labeled_value(id, context)?.value(),
            Expression::LabeledReference(target) => self.labeled_value(*target, context)?.value(),
            Expression::ParameterReference(_)
            | Expression::FunctionReference(_)
            | Expression::PropertyReference { .. }
            | Expression::ValueTermReference { .. }
            | Expression::EntitySetReference(_)
            | Expression::EnumMemberReference { .. } => {
                Err(EvalError::NotImplemented(expression.kind_name()))
            }
        }
    }

    fn evaluate_path(segments: &[String], context: Option<&EdmValue>) -> Result<EdmValue, EvalError> {
        let Some(context) = context else {
            return Err(EvalError::MissingContext);
        };
        let mut current = context.clone();
        for segment in segments {
            let property = current
                .as_structured()
                .and_then(|structured| structured.find_property(segment))
                .ok_or_else(|| EvalError::UnboundPath(segment.clone()))?;
            current = property.value()?;
        }
        Ok(current)
    }

    fn evaluate_apply(
        self: &Arc<Self>,
        function: &FunctionRef,
        arguments: &[ExprId],
        context: Option<&EdmValue>,
    ) -> Result<EdmValue, EvalError> {
        let arguments = arguments
            .iter()
            .map(|argument| self.evaluate(*argument, context))
            .collect::<Result<Vec<_>, _>>()?;

        if let FunctionRef::Bound(name) = function {
            if let Some(implementation) = self.functions.get(name) {
                return implementation(&arguments);
            }
        }

        let name = function.full_name();
        if let Some(resolver) = &self.last_chance {
            debug!(
                function = name,
                arguments = arguments.len(),
                "delegating function to last-chance resolver"
            );
            if let Some(value) = resolver(name, &arguments) {
                return Ok(value);
            }
        }
        Err(EvalError::UnboundFunction(name.to_string()))
    }

    /// Creates a private delayed value over `expr` and the context.
    ///
    /// `pinned` labeled values are kept alive as long as the delayed value.
    fn delayed(
        self: &Arc<Self>,
        expr: ExprId,
        context: Option<&EdmValue>,
        pinned: Vec<Arc<DelayedValue>>,
    ) -> Arc<DelayedValue> {
        let engine = Arc::clone(self);
        let context = context.cloned();
        Arc::new(DelayedValue::new(move || {
            let _pinned = &pinned;
            engine.evaluate(expr, context.as_ref())
        }))
    }

    /// Builds the delayed value of a record property or collection element.
    ///
    /// Labeled definitions and references share the labeled value. Any other
    /// expression gets a private delayed value pinning the labeled values
    /// its subtree refers to. Bad references stay private so the error
    /// surfaces on access.
    fn slot_value(self: &Arc<Self>, expr: ExprId, context: Option<&EdmValue>) -> Arc<DelayedValue> {
        let label = match self.arena.get(expr) {
            Some(Expression::Labeled { .. }) => Some(expr),
            Some(Expression::LabeledReference(target)) => Some(*target),
            _ => None,
        };
        if let Some(shared) = label.and_then(|label| self.labeled_value(label, context).ok()) {
            return shared;
        }

        let pinned = self
            .referenced_labels(expr)
            .into_iter()
            .filter_map(|label| self.labeled_value(label, context).ok())
            .collect();
        self.delayed(expr, context, pinned)
    }

    /// Collects the labeled expressions reachable from `root` without
    /// entering labeled bodies.
    fn referenced_labels(&self, root: ExprId) -> Vec<ExprId> {
        let mut labels = Vec::new();
        let mut visited = HashSet::new();
        let mut pending = vec![root];

        while let Some(id) = pending.pop() {
            if !visited.insert(id) {
                continue;
            }
            let label = match self.arena.get(id) {
                Some(Expression::Labeled { .. }) => id,
                Some(Expression::LabeledReference(target)) => *target,
                Some(Expression::Apply { arguments, .. }) => {
                    pending.extend(arguments.iter().copied());
                    continue;
                }
                Some(Expression::If {
                    test,
                    if_true,
                    if_false,
                }) => {
                    pending.extend([*test, *if_true, *if_false]);
                    continue;
                }
                Some(Expression::IsType { operand, .. } | Expression::AssertType { operand, .. }) => {
                    pending.push(*operand);
                    continue;
                }
                Some(Expression::Record { properties, .. }) => {
                    pending.extend(properties.iter().map(|(_, expr)| *expr));
                    continue;
                }
                Some(Expression::Collection { elements, .. }) => {
                    pending.extend(elements.iter().copied());
                    continue;
                }
                _ => continue,
            };
            if !labels.contains(&label) {
                labels.push(label);
            }
        }
        labels
    }

    /// Returns the shared delayed value of a labeled expression, creating it
    /// on first encounter from either the definition or a reference.
    fn labeled_value(
        self: &Arc<Self>,
        label: ExprId,
        context: Option<&EdmValue>,
    ) -> Result<Arc<DelayedValue>, EvalError> {
        let (name, body) = match self.arena.get(label) {
            Some(Expression::Labeled { name, body }) => (name, *body),
            Some(_) => return Err(EvalError::InvalidLabeledReference(label)),
            None => return Err(EvalError::UnrecognizedExpression(label)),
        };

        let mut labeled = self.labeled.lock();
        if let Some(existing) = labeled.get(&label).and_then(Weak::upgrade) {
            return Ok(existing);
        }
        debug!(label = %name, expr = %label, "creating labeled value");
        let delayed = self.delayed(body, context, Vec::new());
        labeled.insert(label, Arc::downgrade(&delayed));
        drop(labeled);

        if let Some(retained) = self.retained.upgrade() {
            retained.lock().push(Arc::clone(&delayed));
        }
        Ok(delayed)
    }
}
