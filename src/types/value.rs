//! EDM runtime values.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeDelta};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::conformance::TypeConformance;
use crate::edm::TypeReference;
use crate::evaluator::EvalError;

use super::delayed::DelayedValue;

/// Value kinds, used for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Boolean,
    Integer,
    Floating,
    Decimal,
    String,
    Binary,
    DateTime,
    DateTimeOffset,
    Time,
    Guid,
    Enum,
    Structured,
    Collection,
}

impl ValueKind {
    /// Returns the name of the value kind.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            ValueKind::Null => "Null",
            ValueKind::Boolean => "Boolean",
            ValueKind::Integer => "Integer",
            ValueKind::Floating => "Floating",
            ValueKind::Decimal => "Decimal",
            ValueKind::String => "String",
            ValueKind::Binary => "Binary",
            ValueKind::DateTime => "DateTime",
            ValueKind::DateTimeOffset => "DateTimeOffset",
            ValueKind::Time => "Time",
            ValueKind::Guid => "Guid",
            ValueKind::Enum => "Enum",
            ValueKind::Structured => "Structured",
            ValueKind::Collection => "Collection",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Runtime value produced by evaluation.
///
/// Cloning is cheap for structured and collection values: their contents
/// are shared, including any cached delayed results.
#[derive(Debug, Clone)]
pub enum EdmValue {
    /// Null value.
    Null,
    /// Boolean value.
    Boolean(bool),
    /// Integral value of any width.
    Integer(i64),
    /// Floating point value.
    Floating(f64),
    /// Decimal value.
    Decimal(Decimal),
    /// String value.
    String(String),
    /// Binary value.
    Binary(Vec<u8>),
    /// Date and time without offset.
    DateTime(NaiveDateTime),
    /// Date and time with offset.
    DateTimeOffset(DateTime<FixedOffset>),
    /// Duration.
    Time(TimeDelta),
    /// Globally unique identifier.
    Guid(Uuid),
    /// Enumeration member value.
    Enum(EnumValue),
    /// Value with named properties.
    Structured(StructuredValue),
    /// Ordered collection of values.
    Collection(CollectionValue),
}

impl EdmValue {
    /// Returns the kind of this value.
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            EdmValue::Null => ValueKind::Null,
            EdmValue::Boolean(_) => ValueKind::Boolean,
            EdmValue::Integer(_) => ValueKind::Integer,
            EdmValue::Floating(_) => ValueKind::Floating,
            EdmValue::Decimal(_) => ValueKind::Decimal,
            EdmValue::String(_) => ValueKind::String,
            EdmValue::Binary(_) => ValueKind::Binary,
            EdmValue::DateTime(_) => ValueKind::DateTime,
            EdmValue::DateTimeOffset(_) => ValueKind::DateTimeOffset,
            EdmValue::Time(_) => ValueKind::Time,
            EdmValue::Guid(_) => ValueKind::Guid,
            EdmValue::Enum(_) => ValueKind::Enum,
            EdmValue::Structured(_) => ValueKind::Structured,
            EdmValue::Collection(_) => ValueKind::Collection,
        }
    }

    /// Returns the nominal type carried by the value, if any.
    ///
    /// Primitive values carry no nominal type, so they are always checked
    /// against facets such as max length.
    #[must_use]
    pub fn nominal_type(&self) -> Option<&TypeReference> {
        match self {
            EdmValue::Enum(value) => Some(&value.type_ref),
            EdmValue::Structured(value) => value.type_ref.as_ref(),
            EdmValue::Collection(value) => value.type_ref.as_ref(),
            _ => None,
        }
    }

    /// Returns true if this value is null.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, EdmValue::Null)
    }

    /// Attempts to extract a bool value.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            EdmValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Attempts to extract an integer value.
    #[must_use]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            EdmValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Attempts to extract a floating point value.
    #[must_use]
    pub fn as_floating(&self) -> Option<f64> {
        match self {
            EdmValue::Floating(f) => Some(*f),
            _ => None,
        }
    }

    /// Attempts to extract a string reference.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            EdmValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Attempts to extract a structured value.
    #[must_use]
    pub fn as_structured(&self) -> Option<&StructuredValue> {
        match self {
            EdmValue::Structured(s) => Some(s),
            _ => None,
        }
    }

    /// Attempts to extract a collection value.
    #[must_use]
    pub fn as_collection(&self) -> Option<&CollectionValue> {
        match self {
            EdmValue::Collection(c) => Some(c),
            _ => None,
        }
    }
}

impl From<bool> for EdmValue {
    fn from(value: bool) -> Self {
        EdmValue::Boolean(value)
    }
}

impl From<i64> for EdmValue {
    fn from(value: i64) -> Self {
        EdmValue::Integer(value)
    }
}

impl From<i32> for EdmValue {
    fn from(value: i32) -> Self {
        EdmValue::Integer(i64::from(value))
    }
}

impl From<f64> for EdmValue {
    fn from(value: f64) -> Self {
        EdmValue::Floating(value)
    }
}

impl From<&str> for EdmValue {
    fn from(value: &str) -> Self {
        EdmValue::String(value.to_string())
    }
}

impl From<String> for EdmValue {
    fn from(value: String) -> Self {
        EdmValue::String(value)
    }
}

/// Enumeration member value.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumValue {
    /// Enumeration type.
    pub type_ref: TypeReference,
    /// Underlying member value.
    pub value: i64,
}

/// Storage for a property or element value: either computed or delayed.
#[derive(Debug, Clone)]
pub enum ValueSlot {
    /// Already computed.
    Ready(EdmValue),
    /// Computed on first access and cached.
    Delayed(Arc<DelayedValue>),
}

impl ValueSlot {
    /// Returns the value, forcing a delayed slot.
    ///
    /// # Errors
    ///
    /// Returns the evaluation error of a delayed slot.
    pub fn get(&self) -> Result<EdmValue, EvalError> {
        match self {
            ValueSlot::Ready(value) => Ok(value.clone()),
            ValueSlot::Delayed(delayed) => delayed.value(),
        }
    }

    /// Returns true if the slot holds a computed value.
    #[must_use]
    pub fn is_evaluated(&self) -> bool {
        match self {
            ValueSlot::Ready(_) => true,
            ValueSlot::Delayed(delayed) => delayed.is_evaluated(),
        }
    }
}

/// Named property of a structured value.
#[derive(Debug, Clone)]
pub struct PropertyValue {
    name: String,
    slot: ValueSlot,
}

impl PropertyValue {
    /// Creates a property holding a computed value.
    #[must_use]
    pub fn new(name: impl Into<String>, value: EdmValue) -> Self {
        PropertyValue {
            name: name.into(),
            slot: ValueSlot::Ready(value),
        }
    }

    /// Creates a property holding a delayed value.
    #[must_use]
    pub fn delayed(name: impl Into<String>, value: Arc<DelayedValue>) -> Self {
        PropertyValue {
            name: name.into(),
            slot: ValueSlot::Delayed(value),
        }
    }

    /// Returns the property name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the property value, forcing it if delayed.
    ///
    /// # Errors
    ///
    /// Returns the evaluation error of a delayed property.
    pub fn value(&self) -> Result<EdmValue, EvalError> {
        self.slot.get()
    }

    /// Returns the underlying slot.
    #[must_use]
    pub fn slot(&self) -> &ValueSlot {
        &self.slot
    }
}

/// Value with named properties, optionally associated with a structured type.
#[derive(Debug, Clone)]
pub struct StructuredValue {
    type_ref: Option<TypeReference>,
    properties: Arc<[PropertyValue]>,
}

impl StructuredValue {
    /// Creates a structured value.
    #[must_use]
    pub fn new(type_ref: Option<TypeReference>, properties: Vec<PropertyValue>) -> Self {
        StructuredValue {
            type_ref,
            properties: properties.into(),
        }
    }

    /// Returns the nominal type.
    #[must_use]
    pub fn type_reference(&self) -> Option<&TypeReference> {
        self.type_ref.as_ref()
    }

    /// Returns all properties in order.
    #[must_use]
    pub fn properties(&self) -> &[PropertyValue] {
        &self.properties
    }

    /// Finds a property by name.
    #[must_use]
    pub fn find_property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.iter().find(|p| p.name == name)
    }
}

/// Iterator over collection elements; forcing happens per `next()`.
pub type Elements<'a> = Box<dyn Iterator<Item = Result<EdmValue, EvalError>> + 'a>;

#[derive(Debug, Clone)]
enum CollectionElements {
    Slots(Arc<[ValueSlot]>),
    Asserted(Box<AssertedElements>),
}

#[derive(Debug, Clone)]
struct AssertedElements {
    source: CollectionValue,
    element_type: TypeReference,
    conformance: TypeConformance,
}

/// Ordered collection of values.
///
/// Elements may be delayed; iterating forces them one at a time. A
/// collection produced by a type assertion is a view over its source that
/// asserts each element as it is reached, so it never enumerates the
/// source ahead of the consumer. Collections are restartable: every call
/// to [`CollectionValue::iter`] starts a new pass, reusing cached elements.
#[derive(Debug, Clone)]
pub struct CollectionValue {
    type_ref: Option<TypeReference>,
    elements: CollectionElements,
}

impl CollectionValue {
    /// Creates a collection of computed values.
    #[must_use]
    pub fn new(type_ref: Option<TypeReference>, elements: Vec<EdmValue>) -> Self {
        Self::from_slots(type_ref, elements.into_iter().map(ValueSlot::Ready).collect())
    }

    /// Creates a collection from value slots.
    #[must_use]
    pub fn from_slots(type_ref: Option<TypeReference>, slots: Vec<ValueSlot>) -> Self {
        CollectionValue {
            type_ref,
            elements: CollectionElements::Slots(slots.into()),
        }
    }

    /// Creates a view that asserts each element of `source` against the
    /// element type of `target` on access.
    pub(crate) fn asserted(
        conformance: TypeConformance,
        target: TypeReference,
        element_type: TypeReference,
        source: CollectionValue,
    ) -> Self {
        CollectionValue {
            type_ref: Some(target),
            elements: CollectionElements::Asserted(Box::new(AssertedElements {
                source,
                element_type,
                conformance,
            })),
        }
    }

    /// Returns the nominal type.
    #[must_use]
    pub fn type_reference(&self) -> Option<&TypeReference> {
        self.type_ref.as_ref()
    }

    /// Returns the number of elements without forcing any of them.
    #[must_use]
    pub fn len(&self) -> usize {
        match &self.elements {
            CollectionElements::Slots(slots) => slots.len(),
            CollectionElements::Asserted(view) => view.source.len(),
        }
    }

    /// Returns true if the collection has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a lazy iterator over the elements.
    #[must_use]
    pub fn iter(&self) -> Elements<'_> {
        match &self.elements {
            CollectionElements::Slots(slots) => Box::new(slots.iter().map(ValueSlot::get)),
            CollectionElements::Asserted(view) => {
                let AssertedElements {
                    source,
                    element_type,
                    conformance,
                } = view.as_ref();
                Box::new(source.iter().map(move |element| {
                    element.and_then(|value| conformance.assert_type(element_type, value))
                }))
            }
        }
    }

    /// Forces every element, returning them in order.
    ///
    /// # Errors
    ///
    /// Returns the first element error encountered.
    pub fn to_vec(&self) -> Result<Vec<EdmValue>, EvalError> {
        self.iter().collect()
    }
}
