//! Type conformance: deciding whether a runtime value fits a type reference,
//! and asserting values against a type.
//!
//! Both [`TypeConformance::matches`] and [`TypeConformance::assert_type`]
//! return a `Result` because structured and collection values may hold
//! delayed slots, which are forced during the check and can fail.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::edm::{Model, PrimitiveKind, TypeReference};
use crate::evaluator::EvalError;
use crate::types::{CollectionValue, EdmValue, PropertyValue, StructuredValue};

/// Conformance checks against a shared model.
#[derive(Clone)]
pub struct TypeConformance {
    model: Arc<Model>,
}

impl TypeConformance {
    /// Creates a conformance engine for the model.
    #[must_use]
    pub fn new(model: Arc<Model>) -> Self {
        TypeConformance { model }
    }

    /// Returns the model checks are performed against.
    #[must_use]
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Returns whether `value` conforms to `target`, validating nested
    /// property types.
    ///
    /// # Errors
    ///
    /// Returns the error of any delayed property or element forced during
    /// the check.
    pub fn matches(&self, target: &TypeReference, value: &EdmValue) -> Result<bool, EvalError> {
        self.matches_with(target, value, true)
    }

    /// Returns whether `value` conforms to `target` without validating the
    /// types of nested properties (only their presence).
    ///
    /// # Errors
    ///
    /// Returns the error of any delayed element forced during the check.
    pub fn matches_shallow(
        &self,
        target: &TypeReference,
        value: &EdmValue,
    ) -> Result<bool, EvalError> {
        self.matches_with(target, value, false)
    }

    /// Asserts `value` against `target`.
    ///
    /// Values whose nominal type already derives from the target are
    /// returned as they are. Collections become a view that asserts each
    /// element when it is reached. Structured values are rebuilt eagerly
    /// with the target as their nominal type; properties the target does
    /// not declare are carried over untouched.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::TypeAssertionFailed`] with the target's display
    /// name if the value does not conform, or the error of a delayed value
    /// forced during the check.
    pub fn assert_type(&self, target: &TypeReference, value: EdmValue) -> Result<EdmValue, EvalError> {
        if self.nominal_fast_path(target, &value) {
            return Ok(value);
        }

        match value {
            EdmValue::Collection(collection) if target.is_collection() => {
                let Some(element_type) = target.element_type() else {
                    return Err(self.assertion_failed(target));
                };
                Ok(EdmValue::Collection(CollectionValue::asserted(
                    self.clone(),
                    target.clone(),
                    element_type.clone(),
                    collection,
                )))
            }
            EdmValue::Structured(structured) if target.is_structured() => {
                match self.assert_structured(target, &structured)? {
                    Some(properties) => Ok(EdmValue::Structured(StructuredValue::new(
                        Some(target.clone()),
                        properties,
                    ))),
                    None => Err(self.assertion_failed(target)),
                }
            }
            other => {
                if self.matches(target, &other)? {
                    Ok(other)
                } else {
                    Err(self.assertion_failed(target))
                }
            }
        }
    }

    fn assertion_failed(&self, target: &TypeReference) -> EvalError {
        EvalError::TypeAssertionFailed(self.model.display_name(target))
    }

    /// A non-null value whose nominal type is or derives from the target
    /// definition conforms without further checks.
    fn nominal_fast_path(&self, target: &TypeReference, value: &EdmValue) -> bool {
        if value.is_null() {
            return false;
        }
        value.nominal_type().is_some_and(|nominal| {
            self.model
                .is_or_inherits_from(nominal.definition(), target.definition())
        })
    }

    fn matches_with(
        &self,
        target: &TypeReference,
        value: &EdmValue,
        check_nested: bool,
    ) -> Result<bool, EvalError> {
        if self.nominal_fast_path(target, value) {
            return Ok(true);
        }

        let kind = target.primitive_kind();
        let matched = match value {
            EdmValue::Null => target.is_nullable(),
            EdmValue::Boolean(_) => kind == Some(PrimitiveKind::Boolean),
            EdmValue::DateTime(_) => kind == Some(PrimitiveKind::DateTime),
            EdmValue::DateTimeOffset(_) => kind == Some(PrimitiveKind::DateTimeOffset),
            EdmValue::Decimal(_) => kind == Some(PrimitiveKind::Decimal),
            EdmValue::Guid(_) => kind == Some(PrimitiveKind::Guid),
            EdmValue::Time(_) => kind == Some(PrimitiveKind::Time),
            EdmValue::String(s) => {
                kind == Some(PrimitiveKind::String) && fits_max_length(target, s.chars().count())
            }
            EdmValue::Binary(bytes) => {
                kind == Some(PrimitiveKind::Binary) && fits_max_length(target, bytes.len())
            }
            EdmValue::Floating(f) => match kind {
                Some(PrimitiveKind::Double) => true,
                Some(PrimitiveKind::Single) => fits_in_single(*f),
                _ => false,
            },
            EdmValue::Integer(i) => kind.is_some_and(|kind| integer_fits(kind, *i)),
            EdmValue::Enum(e) => e.type_ref.definition().is_equivalent_to(target.definition()),
            EdmValue::Collection(collection) => {
                let Some(element_type) = target.element_type() else {
                    return Ok(false);
                };
                for element in collection.iter() {
                    if !self.matches_with(element_type, &element?, check_nested)? {
                        return Ok(false);
                    }
                }
                true
            }
            EdmValue::Structured(structured) => {
                self.structured_matches(target, structured, check_nested)?
            }
        };
        Ok(matched)
    }

    /// Checks the nominal type relation and property presence. Structural
    /// properties are type checked when `check_nested` is set; navigation
    /// properties only get a shallow check so associations do not recurse.
    fn structured_matches(
        &self,
        target: &TypeReference,
        value: &StructuredValue,
        check_nested: bool,
    ) -> Result<bool, EvalError> {
        let Some(target_id) = target.structured_id() else {
            return Ok(false);
        };
        if let Some(nominal_id) = value.type_reference().and_then(TypeReference::structured_id) {
            if !self.model.inherits_from_or_equals(target_id, nominal_id) {
                return Ok(false);
            }
        }

        for property in self.model.structural_properties(target_id) {
            let Some(candidate) = value.find_property(&property.name) else {
                return Ok(false);
            };
            if check_nested && !self.matches_with(&property.type_ref, &candidate.value()?, true)? {
                return Ok(false);
            }
        }

        if target.is_entity() {
            for property in self.model.navigation_properties(target_id) {
                let Some(candidate) = value.find_property(&property.name) else {
                    return Ok(false);
                };
                if check_nested
                    && !self.matches_with(&property.type_ref, &candidate.value()?, false)?
                {
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }

    /// Builds the property list of an asserted structured value, or `None`
    /// when the value does not conform.
    fn assert_structured(
        &self,
        target: &TypeReference,
        value: &StructuredValue,
    ) -> Result<Option<Vec<PropertyValue>>, EvalError> {
        let Some(target_id) = target.structured_id() else {
            return Ok(None);
        };
        if let Some(nominal_id) = value.type_reference().and_then(TypeReference::structured_id) {
            if !self.model.inherits_from_or_equals(target_id, nominal_id) {
                return Ok(None);
            }
        }

        let mut visited: HashSet<&str> = HashSet::new();
        let mut properties = Vec::with_capacity(value.properties().len());

        for property in self.model.structural_properties(target_id) {
            let Some(candidate) = value.find_property(&property.name) else {
                return Ok(None);
            };
            let asserted = self.assert_type(&property.type_ref, candidate.value()?)?;
            properties.push(PropertyValue::new(candidate.name(), asserted));
            visited.insert(candidate.name());
        }

        if target.is_entity() {
            for property in self.model.navigation_properties(target_id) {
                let Some(candidate) = value.find_property(&property.name) else {
                    return Ok(None);
                };
                if !self.matches_shallow(&property.type_ref, &candidate.value()?)? {
                    return Ok(None);
                }
                properties.push(candidate.clone());
                visited.insert(candidate.name());
            }
        }

        properties.extend(
            value
                .properties()
                .iter()
                .filter(|p| !visited.contains(p.name()))
                .cloned(),
        );
        Ok(Some(properties))
    }
}

impl fmt::Debug for TypeConformance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeConformance").finish_non_exhaustive()
    }
}

/// A length fits unless the target declares a smaller maximum length.
fn fits_max_length(target: &TypeReference, len: usize) -> bool {
    if target.is_unbounded() {
        return true;
    }
    target
        .max_length()
        .map_or(true, |max| usize::try_from(max).map_or(true, |max| max >= len))
}

/// Returns whether an integer value is in range for a primitive kind.
///
/// Int64, Single and Double accept every integer value.
#[must_use]
pub fn integer_fits(kind: PrimitiveKind, value: i64) -> bool {
    match kind {
        PrimitiveKind::Byte => u8::try_from(value).is_ok(),
        PrimitiveKind::SByte => i8::try_from(value).is_ok(),
        PrimitiveKind::Int16 => i16::try_from(value).is_ok(),
        PrimitiveKind::Int32 => i32::try_from(value).is_ok(),
        PrimitiveKind::Int64 | PrimitiveKind::Single | PrimitiveKind::Double => true,
        _ => false,
    }
}

/// Returns whether a floating point value is within single-precision range.
#[must_use]
pub fn fits_in_single(value: f64) -> bool {
    value.abs() <= f64::from(f32::MAX)
}
