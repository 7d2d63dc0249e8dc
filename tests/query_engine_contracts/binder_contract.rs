//! Contract tests for the metadata binder.
//!
//! These tests verify the binding contracts:
//! - Skip and top amounts are validated and carried as constants
//! - Unknown system query options are rejected, custom ones pass through
//! - Key values must cover the key exactly, in any order
//! - The range variable of a filter never leaks out of it
//! - Service operations are bound according to their result kind

use odata_core::binder::{
    BindError, CollectionNode, CustomQueryOptionNode, MetadataBinder, QueryNode,
    QueryOptionHandler, SingleValueNode,
};
use odata_core::edm::PrimitiveKind;
use odata_core::error::ODataError;
use odata_core::syntax::{
    BinaryOperatorKind, LiteralValue, NamedValue, OrderByDirection, QueryDescriptorToken,
    QueryOptionToken, QueryToken, SegmentToken, UnaryOperatorKind,
};

use super::{create_test_model, prim};

fn segment(name: &str, keys: Vec<NamedValue>) -> QueryToken {
    QueryToken::Segment(SegmentToken::root(name).with_key_values(keys))
}

fn bind_error(query: &QueryDescriptorToken) -> BindError {
    let model = create_test_model();
    match MetadataBinder::new(&model).bind_query(query) {
        Err(ODataError::BindError(err)) => err,
        other => panic!("expected a bind error, got {other:?}"),
    }
}

fn filter_people(filter: QueryToken) -> QueryDescriptorToken {
    QueryDescriptorToken::for_segment("People").with_filter(filter)
}

// ==================== Skip and top ====================

#[test]
fn test_negative_skip_rejected() {
    let err = bind_error(&QueryDescriptorToken::for_segment("People").with_skip(-1));
    assert_eq!(err, BindError::SkipRequiresNonNegativeInteger(-1));
    assert_eq!(err.to_string(), "$skip requires a non-negative integer, found -1");
}

#[test]
fn test_negative_top_rejected() {
    let err = bind_error(&QueryDescriptorToken::for_segment("People").with_top(-1));
    assert_eq!(err.to_string(), "$top requires a non-negative integer, found -1");
}

#[test]
fn test_zero_skip_produces_zero_amount() {
    let model = create_test_model();
    let query = QueryDescriptorToken::for_segment("People").with_skip(0);
    let bound = MetadataBinder::new(&model).bind_query(&query).unwrap();

    let Some(CollectionNode::Skip { amount, collection }) = bound.query.as_collection() else {
        panic!("expected a skip node");
    };
    assert_eq!(amount.as_ref(), &SingleValueNode::int32(0));
    assert!(matches!(collection.as_ref(), CollectionNode::EntitySet { .. }));
}

#[test]
fn test_top_wraps_skip() {
    let model = create_test_model();
    let query = QueryDescriptorToken::for_segment("People").with_skip(5).with_top(10);
    let bound = MetadataBinder::new(&model).bind_query(&query).unwrap();

    let Some(CollectionNode::Top { amount, collection }) = bound.query.as_collection() else {
        panic!("expected a top node");
    };
    assert_eq!(amount.as_ref(), &SingleValueNode::int32(10));
    assert!(matches!(collection.as_ref(), CollectionNode::Skip { .. }));
}

#[test]
fn test_skip_on_uncomposable_rejected() {
    let err = bind_error(&QueryDescriptorToken::for_segment("Ping").with_skip(1));
    assert_eq!(err, BindError::SkipNotApplicable);
}

// ==================== Query options ====================

#[test]
fn test_unknown_system_option_rejected() {
    let err = bind_error(&QueryDescriptorToken::for_segment("People").with_option("$foo", "1"));
    assert_eq!(err, BindError::UnsupportedSystemQueryOption("$foo".to_string()));
    assert_eq!(err.to_string(), "The system query option '$foo' is not supported");
}

#[test]
fn test_custom_option_passes_through() {
    let model = create_test_model();
    let query = QueryDescriptorToken::for_segment("People")
        .with_option("foo", "bar")
        .with_option("baz", "");
    let bound = MetadataBinder::new(&model).bind_query(&query).unwrap();

    assert_eq!(
        bound.custom_query_options,
        vec![
            QueryNode::CustomQueryOption(CustomQueryOptionNode {
                name: "foo".to_string(),
                value: "bar".to_string(),
            }),
            QueryNode::CustomQueryOption(CustomQueryOptionNode {
                name: "baz".to_string(),
                value: String::new(),
            }),
        ]
    );
}

struct SilentHandler;

impl QueryOptionHandler for SilentHandler {
    fn bind_query_option(&self, _option: &QueryOptionToken) -> Result<Option<QueryNode>, BindError> {
        Ok(None)
    }
}

#[test]
fn test_handler_returning_nothing_fails() {
    let model = create_test_model();
    let binder = MetadataBinder::new(&model).with_query_option_handler(SilentHandler);
    let query = QueryDescriptorToken::for_segment("People").with_option("foo", "bar");
    assert!(matches!(
        binder.bind_query(&query),
        Err(ODataError::BindError(BindError::BoundNodeCannotBeNull))
    ));
}

#[test]
fn test_query_option_token_bound_through_handler() {
    let model = create_test_model();
    let token = QueryToken::QueryOption(QueryOptionToken::new("x", "1"));
    let bound = MetadataBinder::new(&model).bind(&token).unwrap();
    assert!(matches!(bound, QueryNode::CustomQueryOption(_)));
}

// ==================== Path and keys ====================

#[test]
fn test_special_segments_not_implemented() {
    assert!(matches!(
        bind_error(&QueryDescriptorToken::for_segment("$metadata")),
        BindError::NotImplemented(_)
    ));
    assert!(matches!(
        bind_error(&QueryDescriptorToken::for_segment("$batch")),
        BindError::NotImplemented(_)
    ));
}

#[test]
fn test_non_root_segment_not_implemented() {
    let path = QueryToken::Segment(SegmentToken::child(SegmentToken::root("People"), "Lines"));
    assert!(matches!(
        bind_error(&QueryDescriptorToken::new(path)),
        BindError::NotImplemented(_)
    ));
}

#[test]
fn test_composite_key_order_independent() {
    let model = create_test_model();
    let binder = MetadataBinder::new(&model);
    let forward = segment(
        "OrderLines",
        vec![
            NamedValue::named("OrderID", LiteralValue::Int32(1)),
            NamedValue::named("LineNo", LiteralValue::Int32(2)),
        ],
    );
    let backward = segment(
        "OrderLines",
        vec![
            NamedValue::named("LineNo", LiteralValue::Int32(2)),
            NamedValue::named("OrderID", LiteralValue::Int32(1)),
        ],
    );

    let forward = binder.bind(&forward).unwrap();
    let backward = binder.bind(&backward).unwrap();
    assert_eq!(forward, backward);

    let Some(SingleValueNode::KeyLookup { key_values, .. }) = forward.as_single_value() else {
        panic!("expected a key lookup");
    };
    let names: Vec<&str> = key_values.iter().map(|k| k.property.as_str()).collect();
    assert_eq!(names, vec!["OrderID", "LineNo"]);
}

#[test]
fn test_composite_key_arity() {
    let partial = segment("OrderLines", vec![NamedValue::named("OrderID", LiteralValue::Int32(1))]);
    assert_eq!(
        bind_error(&QueryDescriptorToken::new(partial)),
        BindError::NotAllKeyPropertiesSpecified("NS.OrderLine".to_string())
    );

    let positional = segment("OrderLines", vec![NamedValue::positional(LiteralValue::Int32(1))]);
    assert_eq!(
        bind_error(&QueryDescriptorToken::new(positional)),
        BindError::UnnamedKeyValueOnTypeWithMultipleKeyProperties("NS.OrderLine".to_string())
    );

    let duplicate = segment(
        "OrderLines",
        vec![
            NamedValue::named("OrderID", LiteralValue::Int32(1)),
            NamedValue::named("OrderID", LiteralValue::Int32(2)),
        ],
    );
    assert_eq!(
        bind_error(&QueryDescriptorToken::new(duplicate)),
        BindError::DuplicateKeyPropertyInKeyValues("OrderID".to_string())
    );

    let non_key = segment(
        "OrderLines",
        vec![
            NamedValue::named("OrderID", LiteralValue::Int32(1)),
            NamedValue::named("Quantity", LiteralValue::Int32(2)),
        ],
    );
    assert_eq!(
        bind_error(&QueryDescriptorToken::new(non_key)),
        BindError::PropertyNotDeclaredOrNotKeyInKeyValue {
            property: "Quantity".to_string(),
            type_name: "NS.OrderLine".to_string(),
        }
    );
}

#[test]
fn test_empty_key_values_leave_collection() {
    let model = create_test_model();
    let bound = MetadataBinder::new(&model)
        .bind(&segment("People", Vec::new()))
        .unwrap();
    assert!(matches!(
        bound.as_collection(),
        Some(CollectionNode::EntitySet { .. })
    ));
}

#[test]
fn test_key_value_converted_to_key_type() {
    let model = create_test_model();
    let binder = MetadataBinder::new(&model);

    let bound = binder
        .bind(&segment("People", vec![NamedValue::positional(LiteralValue::Byte(7))]))
        .unwrap();
    let Some(SingleValueNode::KeyLookup { key_values, .. }) = bound.as_single_value() else {
        panic!("expected a key lookup");
    };
    assert!(matches!(
        &key_values[0].value,
        SingleValueNode::Convert { target_type, .. } if target_type == &prim(PrimitiveKind::Int32, false)
    ));

    let err = binder
        .bind(&segment("People", vec![NamedValue::positional(LiteralValue::String("x".to_string()))]))
        .unwrap_err();
    assert!(matches!(
        err,
        ODataError::BindError(BindError::CannotConvertToType { ref source_type, ref target_type })
            if source_type == "Edm.String" && target_type == "Edm.Int32"
    ));
}

#[test]
fn test_key_lookup_type_is_entity() {
    let model = create_test_model();
    let bound = MetadataBinder::new(&model)
        .bind(&segment("People", vec![NamedValue::named("ID", LiteralValue::Int32(1))]))
        .unwrap();
    let type_ref = bound.type_reference().unwrap();
    assert!(type_ref.is_entity());
    assert_eq!(model.display_name(&type_ref), "NS.Person");
}

// ==================== Filter and order-by ====================

#[test]
fn test_filter_range_variable_scoped() {
    let model = create_test_model();
    let binder = MetadataBinder::new(&model);
    let query = filter_people(QueryToken::binary(
        BinaryOperatorKind::Equal,
        QueryToken::property("Name"),
        QueryToken::literal(LiteralValue::String("Bob".to_string())),
    ));
    let bound = binder.bind_query(&query).unwrap();

    let Some(CollectionNode::Filter { parameter, expression, collection }) = bound.query.as_collection()
    else {
        panic!("expected a filter node");
    };
    assert_eq!(&parameter.type_ref, collection.item_type());
    let SingleValueNode::BinaryOperator { left, .. } = expression.as_ref() else {
        panic!("expected a binary operator");
    };
    let SingleValueNode::PropertyAccess { source, .. } = left.as_ref() else {
        panic!("expected a property access");
    };
    assert_eq!(source.as_ref(), &SingleValueNode::Parameter(parameter.clone()));

    // Nothing stays in scope once the filter is bound.
    assert!(matches!(
        binder.bind(&QueryToken::property("Name")),
        Err(ODataError::BindError(BindError::PropertyAccessWithoutParentParameter))
    ));
}

#[test]
fn test_failed_filter_does_not_leak_scope() {
    let model = create_test_model();
    let binder = MetadataBinder::new(&model);
    let query = filter_people(QueryToken::property("Missing"));
    assert!(binder.bind_query(&query).is_err());
    assert!(matches!(
        binder.bind(&QueryToken::property("Name")),
        Err(ODataError::BindError(BindError::PropertyAccessWithoutParentParameter))
    ));
}

#[test]
fn test_filter_requires_entity_collection() {
    let single = QueryDescriptorToken::new(segment(
        "People",
        vec![NamedValue::positional(LiteralValue::Int32(1))],
    ))
    .with_filter(QueryToken::literal(LiteralValue::Boolean(true)));
    assert_eq!(bind_error(&single), BindError::FilterNotApplicable);

    let enumeration = QueryDescriptorToken::for_segment("Names")
        .with_filter(QueryToken::literal(LiteralValue::Boolean(true)));
    assert_eq!(bind_error(&enumeration), BindError::FilterNotApplicable);
}

#[test]
fn test_filter_null_literal_accepted() {
    let model = create_test_model();
    let query = filter_people(QueryToken::literal(LiteralValue::Null));
    assert!(MetadataBinder::new(&model).bind_query(&query).is_ok());
}

#[test]
fn test_equality_with_null_converts_null() {
    let model = create_test_model();
    let query = filter_people(QueryToken::binary(
        BinaryOperatorKind::Equal,
        QueryToken::property("Name"),
        QueryToken::literal(LiteralValue::Null),
    ));
    let bound = MetadataBinder::new(&model).bind_query(&query).unwrap();

    let Some(CollectionNode::Filter { expression, .. }) = bound.query.as_collection() else {
        panic!("expected a filter node");
    };
    let SingleValueNode::BinaryOperator { right, type_ref, .. } = expression.as_ref() else {
        panic!("expected a binary operator");
    };
    assert_eq!(type_ref, &Some(prim(PrimitiveKind::Boolean, true)));
    assert!(matches!(
        right.as_ref(),
        SingleValueNode::Convert { target_type, .. } if target_type == &prim(PrimitiveKind::String, true)
    ));
}

#[test]
fn test_arithmetic_type_is_promoted_left() {
    let model = create_test_model();
    let query = filter_people(QueryToken::binary(
        BinaryOperatorKind::GreaterThan,
        QueryToken::binary(
            BinaryOperatorKind::Add,
            QueryToken::property("Age"),
            QueryToken::literal(LiteralValue::Double(0.5)),
        ),
        QueryToken::literal(LiteralValue::Int32(30)),
    ));
    let bound = MetadataBinder::new(&model).bind_query(&query).unwrap();

    let Some(CollectionNode::Filter { expression, .. }) = bound.query.as_collection() else {
        panic!("expected a filter node");
    };
    let SingleValueNode::BinaryOperator { left, .. } = expression.as_ref() else {
        panic!("expected a binary operator");
    };
    assert_eq!(left.type_reference(), Some(prim(PrimitiveKind::Double, false)));
}

#[test]
fn test_incompatible_operands() {
    let query = filter_people(QueryToken::binary(
        BinaryOperatorKind::Equal,
        QueryToken::binary(
            BinaryOperatorKind::Add,
            QueryToken::property("Name"),
            QueryToken::literal(LiteralValue::Int32(1)),
        ),
        QueryToken::literal(LiteralValue::Int32(1)),
    ));
    assert_eq!(
        bind_error(&query),
        BindError::IncompatibleOperands {
            left: "Edm.String".to_string(),
            right: "Edm.Int32".to_string(),
            operator: "Add".to_string(),
        }
    );
}

#[test]
fn test_not_requires_boolean() {
    let query = filter_people(QueryToken::unary(
        UnaryOperatorKind::Not,
        QueryToken::property("Age"),
    ));
    assert!(matches!(
        bind_error(&query),
        BindError::IncompatibleOperand { ref operand, .. } if operand == "Edm.Int32"
    ));
}

#[test]
fn test_order_by_requires_primitive() {
    let query = QueryDescriptorToken::for_segment("People")
        .with_order_by(QueryToken::property("Address"), OrderByDirection::Ascending);
    assert_eq!(bind_error(&query), BindError::OrderByExpressionNotSingleValue);
}

#[test]
fn test_order_by_over_filter() {
    let model = create_test_model();
    let query = filter_people(QueryToken::literal(LiteralValue::Boolean(true)))
        .with_order_by(QueryToken::property("Age"), OrderByDirection::Descending);
    let bound = MetadataBinder::new(&model).bind_query(&query).unwrap();

    let Some(CollectionNode::OrderBy { collection, direction, .. }) = bound.query.as_collection()
    else {
        panic!("expected an order-by node");
    };
    assert_eq!(*direction, OrderByDirection::Descending);
    assert!(matches!(collection.as_ref(), CollectionNode::Filter { .. }));
}

// ==================== Properties ====================

#[test]
fn test_nested_complex_property() {
    let model = create_test_model();
    let query = filter_people(QueryToken::binary(
        BinaryOperatorKind::Equal,
        QueryToken::property_of(QueryToken::property("Address"), "City"),
        QueryToken::literal(LiteralValue::String("Oslo".to_string())),
    ));
    assert!(MetadataBinder::new(&model).bind_query(&query).is_ok());
}

#[test]
fn test_property_restrictions() {
    let navigation = filter_people(QueryToken::binary(
        BinaryOperatorKind::Equal,
        QueryToken::property("Lines"),
        QueryToken::literal(LiteralValue::Null),
    ));
    assert!(matches!(bind_error(&navigation), BindError::NotImplemented(_)));

    let multi_valued = filter_people(QueryToken::binary(
        BinaryOperatorKind::Equal,
        QueryToken::property("Tags"),
        QueryToken::literal(LiteralValue::Null),
    ));
    assert_eq!(
        bind_error(&multi_valued),
        BindError::MultiValuePropertyNotSupportedInExpression("Tags".to_string())
    );

    let through_primitive = filter_people(QueryToken::binary(
        BinaryOperatorKind::Equal,
        QueryToken::property_of(QueryToken::property("Name"), "Length"),
        QueryToken::literal(LiteralValue::Int32(1)),
    ));
    assert_eq!(
        bind_error(&through_primitive),
        BindError::PropertyNotDeclared {
            type_name: "Edm.String".to_string(),
            property: "Length".to_string(),
        }
    );
}

#[test]
fn test_open_property_not_implemented() {
    let query = QueryDescriptorToken::for_segment("Bags").with_filter(QueryToken::binary(
        BinaryOperatorKind::Equal,
        QueryToken::property("Color"),
        QueryToken::literal(LiteralValue::String("red".to_string())),
    ));
    assert!(matches!(bind_error(&query), BindError::NotImplemented(_)));
}

#[test]
fn test_inherited_property_on_derived_set() {
    let model = create_test_model();
    let query = QueryDescriptorToken::for_segment("Employees").with_filter(QueryToken::binary(
        BinaryOperatorKind::GreaterThan,
        QueryToken::property("Age"),
        QueryToken::literal(LiteralValue::Int32(40)),
    ));
    assert!(MetadataBinder::new(&model).bind_query(&query).is_ok());
}

// ==================== Functions ====================

#[test]
fn test_function_errors() {
    let cast = filter_people(QueryToken::call(
        "isof",
        vec![QueryToken::literal(LiteralValue::String("NS.Person".to_string()))],
    ));
    assert!(matches!(bind_error(&cast), BindError::NotImplemented(_)));

    let unknown = filter_people(QueryToken::call("frobnicate", Vec::new()));
    assert_eq!(bind_error(&unknown), BindError::UnknownFunction("frobnicate".to_string()));

    let wrong_arity = filter_people(QueryToken::call("length", Vec::new()));
    let err = bind_error(&wrong_arity);
    assert_eq!(
        err,
        BindError::NoApplicableFunctionFound {
            name: "length".to_string(),
            signatures: "length(Edm.String)".to_string(),
        }
    );
}

#[test]
fn test_function_call_typed() {
    let model = create_test_model();
    let query = filter_people(QueryToken::binary(
        BinaryOperatorKind::GreaterThan,
        QueryToken::call("length", vec![QueryToken::property("Name")]),
        QueryToken::literal(LiteralValue::Int32(3)),
    ));
    let bound = MetadataBinder::new(&model).bind_query(&query).unwrap();

    let Some(CollectionNode::Filter { expression, .. }) = bound.query.as_collection() else {
        panic!("expected a filter node");
    };
    let SingleValueNode::BinaryOperator { left, .. } = expression.as_ref() else {
        panic!("expected a binary operator");
    };
    assert!(matches!(
        left.as_ref(),
        SingleValueNode::FunctionCall { name, return_type, .. }
            if name == "length" && return_type.primitive_kind() == Some(PrimitiveKind::Int32)
    ));
}

// ==================== Service operations ====================

#[test]
fn test_nullable_parameter_defaults_to_null() {
    let model = create_test_model();
    let bound = MetadataBinder::new(&model)
        .bind_query(&QueryDescriptorToken::for_segment("PeopleByName"))
        .unwrap();

    let Some(CollectionNode::ServiceOperation { operation, item_type }) = bound.query.as_collection()
    else {
        panic!("expected a service operation collection");
    };
    assert!(item_type.is_entity());
    assert_eq!(
        operation.parameters[0].value,
        SingleValueNode::Constant {
            value: LiteralValue::Null,
            type_ref: Some(prim(PrimitiveKind::String, true)),
        }
    );
}

#[test]
fn test_parameter_parsed_from_option() {
    let model = create_test_model();
    let query = QueryDescriptorToken::for_segment("PeopleByName").with_option("name", "'Bob'");
    let bound = MetadataBinder::new(&model).bind_query(&query).unwrap();

    let Some(CollectionNode::ServiceOperation { operation, .. }) = bound.query.as_collection() else {
        panic!("expected a service operation collection");
    };
    assert_eq!(
        operation.parameters[0].value,
        SingleValueNode::Constant {
            value: LiteralValue::String("Bob".to_string()),
            type_ref: Some(prim(PrimitiveKind::String, true)),
        }
    );
    assert!(bound.custom_query_options.is_empty());
}

#[test]
fn test_parameter_errors() {
    let invalid = QueryDescriptorToken::for_segment("Oldest").with_option("minAge", "old");
    assert_eq!(
        bind_error(&invalid),
        BindError::ServiceOperationParameterInvalidType {
            parameter: "minAge".to_string(),
            value: "old".to_string(),
            operation: "Oldest".to_string(),
            type_name: "Edm.Int32".to_string(),
        }
    );

    let missing = QueryDescriptorToken::for_segment("Oldest");
    assert_eq!(
        bind_error(&missing),
        BindError::ServiceOperationParameterMissing {
            operation: "Oldest".to_string(),
            parameter: "minAge".to_string(),
        }
    );

    let repeated = QueryDescriptorToken::for_segment("Oldest")
        .with_option("minAge", "1")
        .with_option("minAge", "2");
    assert_eq!(
        bind_error(&repeated),
        BindError::QueryOptionSpecifiedMoreThanOnce("minAge".to_string())
    );
}

#[test]
fn test_result_kinds() {
    let model = create_test_model();
    let binder = MetadataBinder::new(&model);
    let bind = |query: QueryDescriptorToken| binder.bind_query(&query).unwrap().query;

    let single = bind(QueryDescriptorToken::for_segment("Oldest").with_option("minAge", "30"));
    assert!(matches!(single, QueryNode::SingleValue(SingleValueNode::ServiceOperation(_))));

    let direct = bind(QueryDescriptorToken::for_segment("CountPeople"));
    assert!(matches!(direct, QueryNode::SingleValue(SingleValueNode::ServiceOperation(_))));

    let enumeration = bind(QueryDescriptorToken::for_segment("Names"));
    assert!(matches!(enumeration, QueryNode::UncomposableServiceOperation(_)));

    let void = bind(QueryDescriptorToken::for_segment("Ping"));
    assert!(matches!(void, QueryNode::UncomposableServiceOperation(ref node) if node.return_type.is_none()));
}

#[test]
fn test_result_kind_errors() {
    assert_eq!(
        bind_error(&QueryDescriptorToken::for_segment("Unannotated")),
        BindError::ServiceOperationWithoutResultKind("Unannotated".to_string())
    );
    assert_eq!(
        bind_error(&QueryDescriptorToken::for_segment("TagQuery")),
        BindError::QueryServiceOperationOfNonEntityType {
            operation: "TagQuery".to_string(),
            result_kind: "QueryWithMultipleResults".to_string(),
            return_type: "Collection(Edm.String)".to_string(),
        }
    );
    assert_eq!(
        bind_error(&QueryDescriptorToken::for_segment("PersonQuery")),
        BindError::QueryServiceOperationOfNonEntityType {
            operation: "PersonQuery".to_string(),
            result_kind: "QueryWithMultipleResults".to_string(),
            return_type: "NS.Person".to_string(),
        }
    );

    let keyed_single = QueryDescriptorToken::new(segment(
        "Oldest",
        vec![NamedValue::positional(LiteralValue::Int32(1))],
    ))
    .with_option("minAge", "30");
    assert_eq!(
        bind_error(&keyed_single),
        BindError::NonQueryableServiceOperationWithKeyLookup("Oldest".to_string())
    );
}

#[test]
fn test_key_lookup_on_queryable_operation() {
    let model = create_test_model();
    let query = QueryDescriptorToken::new(segment(
        "PeopleByName",
        vec![NamedValue::positional(LiteralValue::Int32(4))],
    ));
    let bound = MetadataBinder::new(&model).bind_query(&query).unwrap();
    assert!(matches!(
        bound.query.as_single_value(),
        Some(SingleValueNode::KeyLookup { collection, .. })
            if matches!(collection.as_ref(), CollectionNode::ServiceOperation { .. })
    ));
}
