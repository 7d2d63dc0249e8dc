//! Operand type promotion, convertibility and overload resolution.
//!
//! Promotion follows the standard numeric widening: Byte and SByte widen to
//! Int16, Int16 to Int32, Int32 to Int64, Int64 to Single, Single to Double,
//! and every integral kind to Decimal. A missing type (the null literal or an
//! open property) is compatible with every parameter.

use crate::edm::{Model, PrimitiveKind, TypeDefinition, TypeReference};
use crate::syntax::{BinaryOperatorKind, UnaryOperatorKind};

use super::functions::FunctionSignature;

use PrimitiveKind::{
    Binary, Boolean, DateTime, DateTimeOffset, Decimal, Double, Guid, Int32, Int64, Single, Time,
};

const LOGICAL_SIGNATURES: &[&[PrimitiveKind]] = &[&[Boolean, Boolean]];

const ARITHMETIC_SIGNATURES: &[&[PrimitiveKind]] = &[
    &[Int32, Int32],
    &[Int64, Int64],
    &[Single, Single],
    &[Double, Double],
    &[Decimal, Decimal],
];

const COMPARISON_SIGNATURES: &[&[PrimitiveKind]] = &[
    &[Int32, Int32],
    &[Int64, Int64],
    &[Single, Single],
    &[Double, Double],
    &[Decimal, Decimal],
    &[Boolean, Boolean],
    &[PrimitiveKind::String, PrimitiveKind::String],
    &[Guid, Guid],
    &[DateTime, DateTime],
    &[DateTimeOffset, DateTimeOffset],
    &[Time, Time],
    &[Binary, Binary],
];

const NEGATE_SIGNATURES: &[&[PrimitiveKind]] = &[&[Int32], &[Int64], &[Single], &[Double], &[Decimal]];

const NOT_SIGNATURES: &[&[PrimitiveKind]] = &[&[Boolean]];

/// Returns whether a value of kind `from` can be implicitly widened to `to`.
#[must_use]
pub fn can_promote(from: PrimitiveKind, to: PrimitiveKind) -> bool {
    if from == to {
        return true;
    }
    match from {
        PrimitiveKind::Byte | PrimitiveKind::SByte => matches!(
            to,
            PrimitiveKind::Int16 | Int32 | Int64 | Single | Double | Decimal
        ),
        PrimitiveKind::Int16 => matches!(to, Int32 | Int64 | Single | Double | Decimal),
        Int32 => matches!(to, Int64 | Single | Double | Decimal),
        Int64 => matches!(to, Single | Double | Decimal),
        Single => to == Double,
        _ => false,
    }
}

/// Computes the operand types of a binary operator.
///
/// On success both references are replaced by the promoted operand types.
/// Promoted types keep the nullability of the operand; an untyped operand
/// becomes a nullable reference to the parameter type. Equality between an
/// untyped operand and a typed one takes the typed operand's type.
pub fn promote_operand_types(
    op: BinaryOperatorKind,
    left: &mut Option<TypeReference>,
    right: &mut Option<TypeReference>,
) -> bool {
    if left.is_none() && right.is_none() {
        return true;
    }

    if op.is_equality() {
        match (left.as_ref(), right.as_ref()) {
            (None, Some(r)) => {
                *left = Some(r.clone());
                return true;
            }
            (Some(l), None) => {
                *right = Some(l.clone());
                return true;
            }
            _ => {}
        }
    }

    let signatures = if op.is_logical() {
        LOGICAL_SIGNATURES
    } else if op.is_arithmetic() {
        ARITHMETIC_SIGNATURES
    } else {
        COMPARISON_SIGNATURES
    };

    let arguments = [left.clone(), right.clone()];
    let Some(best) = best_parameter_list(signatures, &arguments).map(|index| signatures[index]) else {
        return false;
    };
    *left = Some(promoted(&arguments[0], best[0]));
    *right = Some(promoted(&arguments[1], best[1]));
    true
}

/// Computes the operand type of a unary operator.
pub fn promote_operand_type(op: UnaryOperatorKind, operand: &mut Option<TypeReference>) -> bool {
    if operand.is_none() {
        return true;
    }
    let signatures = match op {
        UnaryOperatorKind::Negate => NEGATE_SIGNATURES,
        UnaryOperatorKind::Not => NOT_SIGNATURES,
    };
    let arguments = [operand.clone()];
    let Some(best) = best_parameter_list(signatures, &arguments).map(|index| signatures[index]) else {
        return false;
    };
    *operand = Some(promoted(&arguments[0], best[0]));
    true
}

/// Returns whether a value of type `source` may be converted to `target`.
#[must_use]
pub fn can_convert_to(model: &Model, source: &TypeReference, target: &TypeReference) -> bool {
    if source.is_equivalent_to(target) {
        return true;
    }
    match (source.definition(), target.definition()) {
        (TypeDefinition::Primitive(from), TypeDefinition::Primitive(to)) => can_promote(*from, *to),
        (TypeDefinition::Entity(_) | TypeDefinition::Complex(_), _) => {
            model.is_or_inherits_from(source.definition(), target.definition())
        }
        _ => source.definition().is_equivalent_to(target.definition()),
    }
}

/// Selects the signature whose parameters best match the argument types.
///
/// A signature applies when it has one parameter per argument and every
/// typed argument can be promoted to its parameter. Among several
/// applicable signatures the one that is at least as specific as every
/// other wins; if none is, the call is ambiguous and `None` is returned.
#[must_use]
pub fn find_best_function_signature<'a>(
    signatures: &'a [FunctionSignature],
    argument_types: &[Option<TypeReference>],
) -> Option<&'a FunctionSignature> {
    let lists: Vec<&[PrimitiveKind]> = signatures.iter().map(|s| s.parameters).collect();
    best_parameter_list(&lists, argument_types).map(|index| &signatures[index])
}

fn promoted(argument: &Option<TypeReference>, kind: PrimitiveKind) -> TypeReference {
    let nullable = argument.as_ref().map_or(true, TypeReference::is_nullable);
    TypeReference::primitive(kind, nullable)
}

fn is_applicable(parameters: &[PrimitiveKind], arguments: &[Option<TypeReference>]) -> bool {
    parameters.len() == arguments.len()
        && parameters
            .iter()
            .zip(arguments)
            .all(|(parameter, argument)| match argument {
                None => true,
                Some(argument) => argument
                    .primitive_kind()
                    .is_some_and(|kind| can_promote(kind, *parameter)),
            })
}

/// `candidate` is at least as specific as `other` when each of its
/// parameters widens to the corresponding parameter of `other`.
fn is_at_least_as_specific(candidate: &[PrimitiveKind], other: &[PrimitiveKind]) -> bool {
    candidate
        .iter()
        .zip(other)
        .all(|(c, o)| can_promote(*c, *o))
}

/// Returns the index of the best applicable parameter list.
fn best_parameter_list(
    candidates: &[&[PrimitiveKind]],
    arguments: &[Option<TypeReference>],
) -> Option<usize> {
    let applicable: Vec<usize> = (0..candidates.len())
        .filter(|&index| is_applicable(candidates[index], arguments))
        .collect();

    match applicable.as_slice() {
        [] => None,
        [only] => Some(*only),
        _ => applicable.iter().copied().find(|&candidate| {
            applicable.iter().all(|&other| {
                other == candidate
                    || is_at_least_as_specific(candidates[candidate], candidates[other])
            })
        }),
    }
}
