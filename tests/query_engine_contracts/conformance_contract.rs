//! Contract tests for type conformance.
//!
//! These tests verify the conformance contracts:
//! - Primitive values respect ranges, nullability and length facets
//! - Structured values need every declared property; navigation
//!   properties only get a shallow check
//! - Assertion rebuilds structured values and asserts collections lazily

use std::sync::Arc;

use odata_core::conformance::TypeConformance;
use odata_core::edm::{Model, PrimitiveKind, TypeReference};
use odata_core::evaluator::EvalError;
use odata_core::types::{
    CollectionValue, DelayedValue, EdmValue, EnumValue, PropertyValue, StructuredValue, ValueSlot,
};

use super::{create_test_model, prim};

fn conformance() -> TypeConformance {
    TypeConformance::new(Arc::new(create_test_model()))
}

fn entity(model: &Model, name: &str) -> TypeReference {
    TypeReference::entity(model.find_type(name).unwrap(), false)
}

fn strings(values: &[&str]) -> EdmValue {
    EdmValue::Collection(CollectionValue::new(
        None,
        values.iter().map(|v| EdmValue::from(*v)).collect(),
    ))
}

fn line(quantity: EdmValue) -> EdmValue {
    EdmValue::Structured(StructuredValue::new(
        None,
        vec![
            PropertyValue::new("OrderID", EdmValue::from(1)),
            PropertyValue::new("LineNo", EdmValue::from(1)),
            PropertyValue::new("Quantity", quantity),
        ],
    ))
}

fn person(type_ref: Option<TypeReference>, lines: Vec<EdmValue>) -> EdmValue {
    EdmValue::Structured(StructuredValue::new(
        type_ref,
        vec![
            PropertyValue::new("ID", EdmValue::from(1)),
            PropertyValue::new("Name", EdmValue::from("Ada")),
            PropertyValue::new("Age", EdmValue::from(36)),
            PropertyValue::new("Address", EdmValue::Null),
            PropertyValue::new("Tags", strings(&["math"])),
            PropertyValue::new("Lines", EdmValue::Collection(CollectionValue::new(None, lines))),
            PropertyValue::new("Nickname", EdmValue::from("Countess")),
        ],
    ))
}

#[test]
fn test_integer_ranges() {
    let conformance = conformance();
    let check = |kind, value: i64| {
        conformance
            .matches(&prim(kind, false), &EdmValue::Integer(value))
            .unwrap()
    };
    assert!(check(PrimitiveKind::Byte, 255));
    assert!(!check(PrimitiveKind::Byte, 256));
    assert!(!check(PrimitiveKind::Byte, -1));
    assert!(check(PrimitiveKind::SByte, -128));
    assert!(!check(PrimitiveKind::Int16, 40_000));
    assert!(check(PrimitiveKind::Int64, i64::MAX));
    assert!(check(PrimitiveKind::Double, 7));
    assert!(!check(PrimitiveKind::String, 7));
}

#[test]
fn test_floating_ranges() {
    let conformance = conformance();
    let single = prim(PrimitiveKind::Single, false);
    assert!(conformance.matches(&single, &EdmValue::Floating(1.5)).unwrap());
    assert!(!conformance.matches(&single, &EdmValue::Floating(1e300)).unwrap());
    assert!(conformance
        .matches(&prim(PrimitiveKind::Double, false), &EdmValue::Floating(1e300))
        .unwrap());
}

#[test]
fn test_null_requires_nullable() {
    let conformance = conformance();
    assert!(!conformance
        .matches(&prim(PrimitiveKind::Int32, false), &EdmValue::Null)
        .unwrap());
    assert!(conformance
        .matches(&prim(PrimitiveKind::Int32, true), &EdmValue::Null)
        .unwrap());
}

#[test]
fn test_string_length_facets() {
    let conformance = conformance();
    let short = prim(PrimitiveKind::String, true).with_max_length(3);
    assert!(conformance.matches(&short, &EdmValue::from("abc")).unwrap());
    assert!(!conformance.matches(&short, &EdmValue::from("abcd")).unwrap());

    let unbounded = prim(PrimitiveKind::String, true).with_unbounded_length();
    let long = "x".repeat(10_000);
    assert!(conformance.matches(&unbounded, &EdmValue::from(long.as_str())).unwrap());
    assert!(conformance
        .matches(&prim(PrimitiveKind::String, true), &EdmValue::from(long.as_str()))
        .unwrap());
}

#[test]
fn test_nested_facet_checked() {
    let model = create_test_model();
    let address = TypeReference::complex(model.find_type("NS.Address").unwrap(), false);
    let conformance = TypeConformance::new(Arc::new(model));
    let value = |zip: &str| {
        EdmValue::Structured(StructuredValue::new(
            None,
            vec![
                PropertyValue::new("City", EdmValue::from("Oslo")),
                PropertyValue::new("Zip", EdmValue::from(zip)),
            ],
        ))
    };
    assert!(conformance.matches(&address, &value("0150")).unwrap());
    assert!(!conformance.matches(&address, &value("015000")).unwrap());
    // The shallow check only looks at property presence.
    assert!(conformance.matches_shallow(&address, &value("015000")).unwrap());
}

#[test]
fn test_enum_values() {
    let model = create_test_model();
    let color = TypeReference::enumeration(model.find_type("NS.Color").unwrap(), false);
    let size = TypeReference::enumeration(model.find_type("NS.Size").unwrap(), false);
    let conformance = TypeConformance::new(Arc::new(model));
    let green = EdmValue::Enum(EnumValue {
        type_ref: color.clone(),
        value: 1,
    });
    assert!(conformance.matches(&color, &green).unwrap());
    assert!(!conformance.matches(&size, &green).unwrap());
}

#[test]
fn test_structured_requires_declared_properties() {
    let model = create_test_model();
    let person_type = entity(&model, "NS.Person");
    let conformance = TypeConformance::new(Arc::new(model));

    assert!(conformance.matches(&person_type, &person(None, Vec::new())).unwrap());

    let incomplete = EdmValue::Structured(StructuredValue::new(
        None,
        vec![PropertyValue::new("ID", EdmValue::from(1))],
    ));
    assert!(!conformance.matches(&person_type, &incomplete).unwrap());
}

#[test]
fn test_nominal_type_relations() {
    let model = create_test_model();
    let person_type = entity(&model, "NS.Person");
    let employee_type = entity(&model, "NS.Employee");
    let line_type = entity(&model, "NS.OrderLine");
    let conformance = TypeConformance::new(Arc::new(model));

    // A value typed as a derived type conforms to its base without checks.
    let employee = EdmValue::Structured(StructuredValue::new(Some(employee_type.clone()), Vec::new()));
    assert!(conformance.matches(&person_type, &employee).unwrap());

    let typed_person = person(Some(person_type), Vec::new());
    assert!(!conformance.matches(&employee_type, &typed_person).unwrap());
    assert!(!conformance.matches(&line_type, &typed_person).unwrap());
}

#[test]
fn test_navigation_checked_shallowly() {
    let model = create_test_model();
    let person_type = entity(&model, "NS.Person");
    let line_type = entity(&model, "NS.OrderLine");
    let conformance = TypeConformance::new(Arc::new(model));

    let odd_line = line(EdmValue::from("many"));
    assert!(!conformance.matches(&line_type, &odd_line).unwrap());

    let value = person(None, vec![odd_line]);
    assert!(conformance.matches(&person_type, &value).unwrap());

    let missing_key = EdmValue::Structured(StructuredValue::new(
        None,
        vec![PropertyValue::new("Quantity", EdmValue::from(1))],
    ));
    assert!(!conformance
        .matches(&person_type, &person(None, vec![missing_key]))
        .unwrap());
}

#[test]
fn test_assert_structured_rebuilds_value() {
    let model = create_test_model();
    let person_type = entity(&model, "NS.Person");
    let conformance = TypeConformance::new(Arc::new(model));

    let asserted = conformance
        .assert_type(&person_type, person(None, vec![line(EdmValue::from(2))]))
        .unwrap();
    assert_eq!(asserted.nominal_type(), Some(&person_type));

    let structured = asserted.as_structured().unwrap();
    let names: Vec<&str> = structured.properties().iter().map(PropertyValue::name).collect();
    assert_eq!(
        names,
        vec!["ID", "Name", "Age", "Address", "Tags", "Lines", "Nickname"]
    );
    let tags = structured.find_property("Tags").unwrap().value().unwrap();
    assert!(tags.nominal_type().is_some_and(TypeReference::is_collection));
}

#[test]
fn test_assert_failure_names_target() {
    let model = create_test_model();
    let address = TypeReference::complex(model.find_type("NS.Address").unwrap(), false);
    let conformance = TypeConformance::new(Arc::new(model));
    assert_eq!(
        conformance.assert_type(&address, EdmValue::from(3)).unwrap_err(),
        EvalError::TypeAssertionFailed("NS.Address".to_string())
    );
}

#[test]
fn test_open_target_still_checks_declared_properties() {
    let model = create_test_model();
    let bag = entity(&model, "NS.Bag");
    let conformance = TypeConformance::new(Arc::new(model));

    let missing_id = EdmValue::Structured(StructuredValue::new(
        None,
        vec![PropertyValue::new("Color", EdmValue::from("red"))],
    ));
    assert!(!conformance.matches(&bag, &missing_id).unwrap());
    assert_eq!(
        conformance.assert_type(&bag, missing_id).unwrap_err(),
        EvalError::TypeAssertionFailed("NS.Bag".to_string())
    );

    assert!(conformance.assert_type(&bag, EdmValue::from(1)).is_err());
}

#[test]
fn test_open_target_keeps_extra_properties() {
    let model = create_test_model();
    let bag = entity(&model, "NS.Bag");
    let conformance = TypeConformance::new(Arc::new(model));

    let value = EdmValue::Structured(StructuredValue::new(
        None,
        vec![
            PropertyValue::new("Color", EdmValue::from("red")),
            PropertyValue::new("ID", EdmValue::from(4)),
        ],
    ));
    assert!(conformance.matches(&bag, &value).unwrap());

    let asserted = conformance.assert_type(&bag, value).unwrap();
    assert_eq!(asserted.nominal_type(), Some(&bag));
    let structured = asserted.as_structured().unwrap();
    let names: Vec<&str> = structured.properties().iter().map(PropertyValue::name).collect();
    assert_eq!(names, vec!["ID", "Color"]);
    let color = structured.find_property("Color").unwrap().value().unwrap();
    assert_eq!(color.as_str(), Some("red"));
}

#[test]
fn test_collection_assertion_is_lazy() {
    let conformance = conformance();
    let failing = Arc::new(DelayedValue::new(|| Err(EvalError::CyclicDelayedValue)));
    let collection = EdmValue::Collection(CollectionValue::from_slots(
        None,
        vec![
            ValueSlot::Ready(EdmValue::from(1)),
            ValueSlot::Delayed(Arc::clone(&failing)),
            ValueSlot::Ready(EdmValue::from("two")),
        ],
    ));
    let target = TypeReference::collection(prim(PrimitiveKind::Int32, false));

    let asserted = conformance.assert_type(&target, collection).unwrap();
    assert!(!failing.is_evaluated());

    let elements: Vec<_> = asserted.as_collection().unwrap().iter().collect();
    assert_eq!(elements.len(), 3);
    assert_eq!(elements[0].as_ref().unwrap().as_integer(), Some(1));
    assert_eq!(elements[1].as_ref().unwrap_err(), &EvalError::CyclicDelayedValue);
    assert_eq!(
        elements[2].as_ref().unwrap_err(),
        &EvalError::TypeAssertionFailed("Edm.Int32".to_string())
    );
}

#[test]
fn test_assert_is_idempotent() {
    let model = create_test_model();
    let person_type = entity(&model, "NS.Person");
    let conformance = TypeConformance::new(Arc::new(model));

    let once = conformance
        .assert_type(&person_type, person(None, Vec::new()))
        .unwrap();
    let twice = conformance.assert_type(&person_type, once.clone()).unwrap();
    let names = |value: &EdmValue| -> Vec<String> {
        value
            .as_structured()
            .unwrap()
            .properties()
            .iter()
            .map(|p| p.name().to_string())
            .collect()
    };
    assert_eq!(names(&once), names(&twice));
    assert_eq!(twice.nominal_type(), Some(&person_type));
}
