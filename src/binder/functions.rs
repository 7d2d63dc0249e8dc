//! Signatures of the built-in query functions.

use crate::edm::PrimitiveKind::{
    self, Boolean, DateTime, DateTimeOffset, Decimal, Double, Int32, Time,
};

const STR: PrimitiveKind = PrimitiveKind::String;

/// One overload of a built-in function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionSignature {
    /// Parameter kinds, in order.
    pub parameters: &'static [PrimitiveKind],
    /// Kind of the result.
    pub return_type: PrimitiveKind,
}

const fn sig(parameters: &'static [PrimitiveKind], return_type: PrimitiveKind) -> FunctionSignature {
    FunctionSignature {
        parameters,
        return_type,
    }
}

const STRING_PREDICATE: &[FunctionSignature] = &[sig(&[STR, STR], Boolean)];
const LENGTH: &[FunctionSignature] = &[sig(&[STR], Int32)];
const INDEXOF: &[FunctionSignature] = &[sig(&[STR, STR], Int32)];
const REPLACE: &[FunctionSignature] = &[sig(&[STR, STR, STR], STR)];
const SUBSTRING: &[FunctionSignature] = &[
    sig(&[STR, Int32], STR),
    sig(&[STR, Int32, Int32], STR),
];
const STRING_TRANSFORM: &[FunctionSignature] = &[sig(&[STR], STR)];
const CONCAT: &[FunctionSignature] = &[sig(&[STR, STR], STR)];
const DATE_PART: &[FunctionSignature] = &[sig(&[DateTime], Int32), sig(&[DateTimeOffset], Int32)];
const TIME_PART: &[FunctionSignature] = &[
    sig(&[DateTime], Int32),
    sig(&[DateTimeOffset], Int32),
    sig(&[Time], Int32),
];
const ROUNDING: &[FunctionSignature] = &[sig(&[Double], Double), sig(&[Decimal], Decimal)];

/// Returns the overloads of a built-in function, or `None` if the name is unknown.
#[must_use]
pub fn signatures_for(name: &str) -> Option<&'static [FunctionSignature]> {
    let signatures = match name {
        "substringof" | "endswith" | "startswith" => STRING_PREDICATE,
        "length" => LENGTH,
        "indexof" => INDEXOF,
        "replace" => REPLACE,
        "substring" => SUBSTRING,
        "tolower" | "toupper" | "trim" => STRING_TRANSFORM,
        "concat" => CONCAT,
        "year" | "month" | "day" => DATE_PART,
        "hour" | "minute" | "second" => TIME_PART,
        "round" | "floor" | "ceiling" => ROUNDING,
        _ => return None,
    };
    Some(signatures)
}

/// Returns whether the name is reserved for type functions.
#[must_use]
pub fn is_type_function(name: &str) -> bool {
    matches!(name, "cast" | "isof")
}

/// Renders all overloads of a function, e.g. `substring(Edm.String, Edm.Int32); ...`.
#[must_use]
pub fn describe_signatures(name: &str, signatures: &[FunctionSignature]) -> String {
    signatures
        .iter()
        .map(|signature| {
            let parameters: Vec<&str> = signature.parameters.iter().map(PrimitiveKind::name).collect();
            format!("{name}({})", parameters.join(", "))
        })
        .collect::<Vec<_>>()
        .join("; ")
}
