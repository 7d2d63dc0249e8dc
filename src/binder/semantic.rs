//! Metadata binder: turns lexical query tokens into typed semantic nodes.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::edm::{
    Model, OperationParameter, PrimitiveKind, PropertyKind, ServiceOperation,
    ServiceOperationResultKind, TypeReference,
};
use crate::error::Result;
use crate::syntax::{
    BinaryOperatorKind, LiteralValue, NamedValue, OrderByToken, QueryDescriptorToken,
    QueryOptionToken, QueryToken, SegmentToken, UnaryOperatorKind,
};

use super::error::BindError;
use super::functions::{describe_signatures, is_type_function, signatures_for};
use super::literal::parse_uri_literal;
use super::node::{
    CollectionNode, KeyPropertyValue, ParameterNode, QueryDescriptorNode, QueryNode,
    ServiceOperationNode, ServiceOperationParameter, SingleValueNode,
};
use super::options::{DefaultQueryOptionHandler, QueryOptionHandler};
use super::promotion::{can_convert_to, find_best_function_signature, promote_operand_type, promote_operand_types};
use super::scope::BindingState;
use super::BinderConfig;

type BindResult<T> = std::result::Result<T, BindError>;

/// Binds query tokens against a [`Model`].
///
/// A binder holds no per-query state; every call to [`bind_query`] or
/// [`bind`] starts from a fresh binding state, so one binder can serve
/// any number of queries.
///
/// [`bind_query`]: MetadataBinder::bind_query
/// [`bind`]: MetadataBinder::bind
pub struct MetadataBinder<'m> {
    /// Model the tokens are resolved against.
    model: &'m Model,
    config: BinderConfig,
    /// Binds the query options left over after the clauses.
    options: Arc<dyn QueryOptionHandler>,
}

impl std::fmt::Debug for MetadataBinder<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataBinder")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<'m> MetadataBinder<'m> {
    /// Creates a binder with the default configuration and query option handler.
    #[must_use]
    pub fn new(model: &'m Model) -> Self {
        MetadataBinder {
            model,
            config: BinderConfig::default(),
            options: Arc::new(DefaultQueryOptionHandler),
        }
    }

    /// Replaces the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn with_config(mut self, config: BinderConfig) -> Result<Self> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    /// Replaces the handler for query options no clause consumed.
    #[must_use]
    pub fn with_query_option_handler(mut self, handler: impl QueryOptionHandler + 'static) -> Self {
        self.options = Arc::new(handler);
        self
    }

    /// Returns the model the binder resolves against.
    #[must_use]
    pub fn model(&self) -> &'m Model {
        self.model
    }

    /// Binds a complete query.
    ///
    /// The path is bound first, consuming the parameters of a service
    /// operation from the query options. Then the filter, order-by, skip
    /// and top clauses are applied in that order, and every query option
    /// still left is handed to the query option handler.
    ///
    /// # Errors
    ///
    /// Returns a bind error describing the first token that could not be
    /// bound.
    pub fn bind_query(&self, query: &QueryDescriptorToken) -> Result<QueryDescriptorNode> {
        debug!(
            path = query.path.kind_name(),
            options = query.query_options.len(),
            "binding query"
        );
        let mut state = BindingState::new(&query.query_options, self.config.max_depth);

        let mut node = self.bind_token(&query.path, &mut state)?;
        if let Some(filter) = &query.filter {
            node = self.bind_filter(node, filter, &mut state)?;
        }
        // The first clause is the primary sort key, so it wraps the others.
        for order_by in query.order_by.iter().rev() {
            node = self.bind_order_by(node, order_by, &mut state)?;
        }
        if let Some(skip) = query.skip {
            node = bind_skip(node, skip)?;
        }
        if let Some(top) = query.top {
            node = bind_top(node, top)?;
        }

        let custom_query_options = state
            .take_remaining_options()
            .iter()
            .map(|option| self.bind_query_option(option))
            .collect::<BindResult<Vec<_>>>()?;

        debug!(custom_options = custom_query_options.len(), "query bound");
        Ok(QueryDescriptorNode {
            query: node,
            custom_query_options,
        })
    }

    /// Binds a single token outside of any query.
    ///
    /// No range variable is in scope and no query options are available.
    ///
    /// # Errors
    ///
    /// Returns a bind error if the token cannot be bound.
    pub fn bind(&self, token: &QueryToken) -> Result<QueryNode> {
        let mut state = BindingState::new(&[], self.config.max_depth);
        Ok(self.bind_token(token, &mut state)?)
    }

    // ==================== Dispatch ====================

    fn bind_token(&self, token: &QueryToken, state: &mut BindingState) -> BindResult<QueryNode> {
        state.enter()?;
        let result = self.dispatch(token, state);
        state.exit();
        result
    }

    fn dispatch(&self, token: &QueryToken, state: &mut BindingState) -> BindResult<QueryNode> {
        trace!(kind = token.kind_name(), "binding token");
        match token {
            QueryToken::Segment(segment) => self.bind_segment(segment, state),
            QueryToken::Literal(literal) => Ok(QueryNode::SingleValue(SingleValueNode::constant(
                literal.value.clone(),
            ))),
            QueryToken::BinaryOperator { op, left, right } => self
                .bind_binary_operator(*op, left, right, state)
                .map(QueryNode::SingleValue),
            QueryToken::UnaryOperator { op, operand } => self
                .bind_unary_operator(*op, operand, state)
                .map(QueryNode::SingleValue),
            QueryToken::PropertyAccess { name, parent } => self
                .bind_property_access(name, parent.as_deref(), state)
                .map(QueryNode::SingleValue),
            QueryToken::FunctionCall { name, arguments } => self
                .bind_function_call(name, arguments, state)
                .map(QueryNode::SingleValue),
            QueryToken::QueryOption(option) => self.bind_query_option(option),
            QueryToken::OrderBy(_) => Err(BindError::UnsupportedTokenKind(token.kind_name())),
        }
    }

    fn bind_query_option(&self, option: &QueryOptionToken) -> BindResult<QueryNode> {
        self.options
            .bind_query_option(option)?
            .ok_or(BindError::BoundNodeCannotBeNull)
    }

    // ==================== Path ====================

    fn bind_segment(&self, segment: &SegmentToken, state: &mut BindingState) -> BindResult<QueryNode> {
        if segment.parent.is_some() {
            return Err(BindError::NotImplemented(format!(
                "the non-root segment '{}'",
                segment.name
            )));
        }
        if matches!(segment.name.as_str(), "$metadata" | "$batch") {
            return Err(BindError::NotImplemented(format!("the '{}' segment", segment.name)));
        }

        if let Some(operation) = self.model.service_operation(&segment.name) {
            debug!(operation = %operation.name, "root segment is a service operation");
            return self.bind_service_operation(segment, operation, state);
        }

        if let Some(entity_set) = self.model.entity_set(&segment.name) {
            debug!(entity_set = %entity_set.name, "root segment is an entity set");
            let collection = CollectionNode::EntitySet {
                item_type: TypeReference::entity(entity_set.entity_type, false),
                entity_set: entity_set.clone(),
            };
            return self.bind_key_values(collection, segment.named_values.as_deref());
        }

        Err(BindError::RootSegmentResourceNotFound(segment.name.clone()))
    }

    /// Applies key values to a collection.
    ///
    /// Without parentheses, or with empty ones, the collection is returned
    /// unchanged. Bound key values are ordered by key declaration.
    fn bind_key_values(
        &self,
        collection: CollectionNode,
        named_values: Option<&[NamedValue]>,
    ) -> BindResult<QueryNode> {
        let Some(named_values) = named_values else {
            return Ok(QueryNode::Collection(collection));
        };

        let item_type = collection.item_type();
        let entity_id = match item_type.structured_id() {
            Some(id) if item_type.is_entity() => id,
            _ => {
                return Err(BindError::KeyValueApplicableOnlyToEntityType(
                    self.model.display_name(item_type),
                ))
            }
        };
        let type_name = self.model.display_name(item_type);
        let keys = self.model.key_properties(entity_id);

        let mut seen = HashSet::new();
        let mut key_values = Vec::with_capacity(named_values.len());
        for named_value in named_values {
            let key = match &named_value.name {
                None => match keys.as_slice() {
                    [only] => *only,
                    _ => {
                        return Err(BindError::UnnamedKeyValueOnTypeWithMultipleKeyProperties(
                            type_name,
                        ))
                    }
                },
                Some(name) => keys.iter().copied().find(|key| key.name == *name).ok_or_else(|| {
                    BindError::PropertyNotDeclaredOrNotKeyInKeyValue {
                        property: name.clone(),
                        type_name: type_name.clone(),
                    }
                })?,
            };
            if !seen.insert(key.name.as_str()) {
                return Err(BindError::DuplicateKeyPropertyInKeyValues(key.name.clone()));
            }
            let value = self.convert_to_type(
                SingleValueNode::constant(named_value.value.value.clone()),
                &key.type_ref,
            )?;
            key_values.push(KeyPropertyValue {
                property: key.name.clone(),
                value,
            });
        }

        if key_values.is_empty() {
            return Ok(QueryNode::Collection(collection));
        }
        if key_values.len() != keys.len() {
            return Err(BindError::NotAllKeyPropertiesSpecified(type_name));
        }

        key_values.sort_by_key(|value| {
            keys.iter()
                .position(|key| key.name == value.property)
                .unwrap_or(usize::MAX)
        });
        trace!(keys = key_values.len(), "key lookup bound");
        Ok(QueryNode::SingleValue(SingleValueNode::KeyLookup {
            collection: Box::new(collection),
            key_values,
        }))
    }

    // ==================== Service operations ====================

    fn bind_service_operation(
        &self,
        segment: &SegmentToken,
        operation: &ServiceOperation,
        state: &mut BindingState,
    ) -> BindResult<QueryNode> {
        let Some(result_kind) = operation.result_kind else {
            return Err(BindError::ServiceOperationWithoutResultKind(operation.name.clone()));
        };

        let parameters = operation
            .parameters
            .iter()
            .map(|parameter| self.bind_service_operation_parameter(operation, parameter, state))
            .collect::<BindResult<Vec<_>>>()?;
        let node = ServiceOperationNode {
            operation: operation.name.clone(),
            parameters,
            return_type: operation.return_type.clone(),
        };

        if segment.named_values.is_some()
            && result_kind != ServiceOperationResultKind::QueryWithMultipleResults
        {
            return Err(BindError::NonQueryableServiceOperationWithKeyLookup(
                operation.name.clone(),
            ));
        }

        match result_kind {
            ServiceOperationResultKind::QueryWithMultipleResults => {
                // Only a collection of entities is queryable; a single entity is not.
                let item_type = operation
                    .return_type
                    .as_ref()
                    .and_then(TypeReference::element_type)
                    .filter(|item_type| item_type.is_entity())
                    .cloned()
                    .ok_or_else(|| self.non_entity_operation(operation, result_kind))?;
                let collection = CollectionNode::ServiceOperation {
                    operation: node,
                    item_type,
                };
                self.bind_key_values(collection, segment.named_values.as_deref())
            }
            ServiceOperationResultKind::QueryWithSingleResult => {
                if !operation.return_type.as_ref().is_some_and(TypeReference::is_entity) {
                    return Err(self.non_entity_operation(operation, result_kind));
                }
                Ok(QueryNode::SingleValue(SingleValueNode::ServiceOperation(node)))
            }
            ServiceOperationResultKind::DirectValue => {
                if operation.return_type.as_ref().is_some_and(TypeReference::is_primitive) {
                    Ok(QueryNode::SingleValue(SingleValueNode::ServiceOperation(node)))
                } else {
                    Ok(QueryNode::UncomposableServiceOperation(node))
                }
            }
            ServiceOperationResultKind::Enumeration | ServiceOperationResultKind::Void => {
                Ok(QueryNode::UncomposableServiceOperation(node))
            }
        }
    }

    /// Binds one parameter from the query option of the same name.
    ///
    /// An absent or empty option binds a typed null for nullable parameters.
    fn bind_service_operation_parameter(
        &self,
        operation: &ServiceOperation,
        parameter: &OperationParameter,
        state: &mut BindingState,
    ) -> BindResult<ServiceOperationParameter> {
        let text = state.take_option(&parameter.name)?.filter(|text| !text.is_empty());
        let value = match text {
            None => {
                if !parameter.type_ref.is_nullable() {
                    return Err(BindError::ServiceOperationParameterMissing {
                        operation: operation.name.clone(),
                        parameter: parameter.name.clone(),
                    });
                }
                LiteralValue::Null
            }
            Some(text) => parse_uri_literal(&text, &parameter.type_ref).ok_or_else(|| {
                BindError::ServiceOperationParameterInvalidType {
                    parameter: parameter.name.clone(),
                    value: text.clone(),
                    operation: operation.name.clone(),
                    type_name: self.model.display_name(&parameter.type_ref),
                }
            })?,
        };
        Ok(ServiceOperationParameter {
            name: parameter.name.clone(),
            value: SingleValueNode::Constant {
                value,
                type_ref: Some(parameter.type_ref.clone()),
            },
        })
    }

    fn non_entity_operation(
        &self,
        operation: &ServiceOperation,
        result_kind: ServiceOperationResultKind,
    ) -> BindError {
        BindError::QueryServiceOperationOfNonEntityType {
            operation: operation.name.clone(),
            result_kind: result_kind.name().to_string(),
            return_type: self.type_name(operation.return_type.as_ref()),
        }
    }

    // ==================== Query options ====================

    fn bind_filter(
        &self,
        node: QueryNode,
        filter: &QueryToken,
        state: &mut BindingState,
    ) -> BindResult<QueryNode> {
        let collection = entity_collection(node).ok_or(BindError::FilterNotApplicable)?;
        let parameter = ParameterNode {
            type_ref: collection.item_type().clone(),
        };

        let previous = state.enter_parameter(parameter.clone());
        let bound = self.bind_token(filter, state);
        state.exit_parameter(previous);

        let expression = match bound? {
            QueryNode::SingleValue(expression)
                if expression
                    .type_reference()
                    .map_or(true, |t| t.primitive_kind() == Some(PrimitiveKind::Boolean)) =>
            {
                expression
            }
            _ => return Err(BindError::FilterExpressionNotSingleValue),
        };

        Ok(QueryNode::Collection(CollectionNode::Filter {
            collection: Box::new(collection),
            parameter,
            expression: Box::new(expression),
        }))
    }

    fn bind_order_by(
        &self,
        node: QueryNode,
        order_by: &OrderByToken,
        state: &mut BindingState,
    ) -> BindResult<QueryNode> {
        let collection = entity_collection(node).ok_or(BindError::OrderByNotApplicable)?;
        let parameter = ParameterNode {
            type_ref: collection.item_type().clone(),
        };

        let previous = state.enter_parameter(parameter.clone());
        let bound = self.bind_token(&order_by.expression, state);
        state.exit_parameter(previous);

        let expression = match bound? {
            QueryNode::SingleValue(expression)
                if expression
                    .type_reference()
                    .map_or(true, |t| t.is_primitive()) =>
            {
                expression
            }
            _ => return Err(BindError::OrderByExpressionNotSingleValue),
        };

        Ok(QueryNode::Collection(CollectionNode::OrderBy {
            collection: Box::new(collection),
            parameter,
            expression: Box::new(expression),
            direction: order_by.direction,
        }))
    }

    // ==================== Expressions ====================

    fn bind_single_value(
        &self,
        token: &QueryToken,
        state: &mut BindingState,
        error: impl FnOnce() -> BindError,
    ) -> BindResult<SingleValueNode> {
        match self.bind_token(token, state)? {
            QueryNode::SingleValue(node) => Ok(node),
            _ => Err(error()),
        }
    }

    fn bind_binary_operator(
        &self,
        op: BinaryOperatorKind,
        left: &QueryToken,
        right: &QueryToken,
        state: &mut BindingState,
    ) -> BindResult<SingleValueNode> {
        let operand_error = || BindError::OperandNotSingleValue {
            operator: op.name().to_string(),
        };
        let left = self.bind_single_value(left, state, operand_error)?;
        let right = self.bind_single_value(right, state, operand_error)?;

        let mut left_type = left.type_reference();
        let mut right_type = right.type_reference();
        if !promote_operand_types(op, &mut left_type, &mut right_type) {
            return Err(BindError::IncompatibleOperands {
                left: self.type_name(left.type_reference().as_ref()),
                right: self.type_name(right.type_reference().as_ref()),
                operator: op.name().to_string(),
            });
        }
        let left = self.convert_to_promoted(left, left_type.as_ref())?;
        let right = self.convert_to_promoted(right, right_type.as_ref())?;

        let type_ref = if op.is_arithmetic() {
            left.type_reference()
        } else {
            let nullable = [&left, &right]
                .iter()
                .any(|operand| operand.type_reference().map_or(true, |t| t.is_nullable()));
            Some(TypeReference::primitive(PrimitiveKind::Boolean, nullable))
        };

        Ok(SingleValueNode::BinaryOperator {
            op,
            left: Box::new(left),
            right: Box::new(right),
            type_ref,
        })
    }

    fn bind_unary_operator(
        &self,
        op: UnaryOperatorKind,
        operand: &QueryToken,
        state: &mut BindingState,
    ) -> BindResult<SingleValueNode> {
        let operand = self.bind_single_value(operand, state, || BindError::OperandNotSingleValue {
            operator: op.name().to_string(),
        })?;

        let mut operand_type = operand.type_reference();
        if !promote_operand_type(op, &mut operand_type) {
            return Err(BindError::IncompatibleOperand {
                operand: self.type_name(operand.type_reference().as_ref()),
                operator: op.name().to_string(),
            });
        }
        let operand = self.convert_to_promoted(operand, operand_type.as_ref())?;

        Ok(SingleValueNode::UnaryOperator {
            op,
            type_ref: operand.type_reference(),
            operand: Box::new(operand),
        })
    }

    fn bind_property_access(
        &self,
        name: &str,
        parent: Option<&QueryToken>,
        state: &mut BindingState,
    ) -> BindResult<SingleValueNode> {
        let source = match parent {
            None => SingleValueNode::Parameter(
                state
                    .parameter()
                    .cloned()
                    .ok_or(BindError::PropertyAccessWithoutParentParameter)?,
            ),
            Some(parent) => self.bind_single_value(parent, state, || {
                BindError::PropertyAccessSourceNotSingleValue(name.to_string())
            })?,
        };

        let Some(source_type) = source.type_reference() else {
            return Err(BindError::NotImplemented(format!("the open property '{name}'")));
        };
        let not_declared = || BindError::PropertyNotDeclared {
            type_name: self.model.display_name(&source_type),
            property: name.to_string(),
        };
        let structured_id = source_type.structured_id().ok_or_else(not_declared)?;

        let Some(property) = self.model.find_property(structured_id, name) else {
            if self.model.is_open(structured_id) {
                return Err(BindError::NotImplemented(format!("the open property '{name}'")));
            }
            return Err(not_declared());
        };
        if property.kind == PropertyKind::Navigation {
            return Err(BindError::NotImplemented(format!("the navigation property '{name}'")));
        }
        if property.type_ref.is_non_entity_collection() {
            return Err(BindError::MultiValuePropertyNotSupportedInExpression(name.to_string()));
        }

        Ok(SingleValueNode::PropertyAccess {
            source: Box::new(source),
            property: name.to_string(),
            type_ref: property.type_ref.clone(),
        })
    }

    fn bind_function_call(
        &self,
        name: &str,
        arguments: &[QueryToken],
        state: &mut BindingState,
    ) -> BindResult<SingleValueNode> {
        let bound = arguments
            .iter()
            .map(|argument| self.bind_token(argument, state))
            .collect::<BindResult<Vec<_>>>()?;

        if is_type_function(name) {
            return Err(BindError::NotImplemented(format!("the '{name}' function")));
        }
        let signatures = signatures_for(name).ok_or_else(|| BindError::UnknownFunction(name.to_string()))?;

        let arguments = bound
            .into_iter()
            .map(|node| match node {
                QueryNode::SingleValue(node) => Ok(node),
                _ => Err(BindError::FunctionArgumentNotSingleValue(name.to_string())),
            })
            .collect::<BindResult<Vec<_>>>()?;
        let argument_types: Vec<Option<TypeReference>> =
            arguments.iter().map(SingleValueNode::type_reference).collect();

        let signature = find_best_function_signature(signatures, &argument_types).ok_or_else(|| {
            BindError::NoApplicableFunctionFound {
                name: name.to_string(),
                signatures: describe_signatures(name, signatures),
            }
        })?;
        trace!(function = name, return_type = signature.return_type.name(), "function resolved");

        let arguments = arguments
            .into_iter()
            .zip(signature.parameters)
            .map(|(argument, kind)| {
                let nullable = argument.type_reference().map_or(true, |t| t.is_nullable());
                self.convert_to_type(argument, &TypeReference::primitive(*kind, nullable))
            })
            .collect::<BindResult<Vec<_>>>()?;

        Ok(SingleValueNode::FunctionCall {
            name: name.to_string(),
            arguments,
            return_type: TypeReference::primitive(signature.return_type, true),
        })
    }

    // ==================== Conversion ====================

    /// Wraps `source` in a conversion to `target` unless the types already agree.
    ///
    /// An untyped source is always wrapped; the conversion is checked when
    /// the value is known.
    fn convert_to_type(&self, source: SingleValueNode, target: &TypeReference) -> BindResult<SingleValueNode> {
        match source.type_reference() {
            Some(source_type) if source_type.is_equivalent_to(target) => Ok(source),
            Some(source_type) if !can_convert_to(self.model, &source_type, target) => {
                Err(BindError::CannotConvertToType {
                    source_type: self.model.display_name(&source_type),
                    target_type: self.model.display_name(target),
                })
            }
            _ => Ok(SingleValueNode::Convert {
                source: Box::new(source),
                target_type: target.clone(),
            }),
        }
    }

    fn convert_to_promoted(
        &self,
        source: SingleValueNode,
        promoted: Option<&TypeReference>,
    ) -> BindResult<SingleValueNode> {
        match promoted {
            Some(target) => self.convert_to_type(source, target),
            None => Ok(source),
        }
    }

    fn type_name(&self, type_ref: Option<&TypeReference>) -> String {
        type_ref.map_or_else(|| "<null>".to_string(), |t| self.model.display_name(t))
    }
}

/// Returns the node as a collection of entities.
fn entity_collection(node: QueryNode) -> Option<CollectionNode> {
    match node {
        QueryNode::Collection(collection) if collection.item_type().is_entity() => Some(collection),
        _ => None,
    }
}

/// Amounts beyond the `Edm.Int32` range are carried as `Edm.Int64`.
fn amount_node(amount: i64) -> SingleValueNode {
    match i32::try_from(amount) {
        Ok(amount) => SingleValueNode::int32(amount),
        Err(_) => SingleValueNode::constant(LiteralValue::Int64(amount)),
    }
}

fn bind_skip(node: QueryNode, amount: i64) -> BindResult<QueryNode> {
    let QueryNode::Collection(collection) = node else {
        return Err(BindError::SkipNotApplicable);
    };
    if amount < 0 {
        return Err(BindError::SkipRequiresNonNegativeInteger(amount));
    }
    Ok(QueryNode::Collection(CollectionNode::Skip {
        collection: Box::new(collection),
        amount: Box::new(amount_node(amount)),
    }))
}

fn bind_top(node: QueryNode, amount: i64) -> BindResult<QueryNode> {
    let QueryNode::Collection(collection) = node else {
        return Err(BindError::TopNotApplicable);
    };
    if amount < 0 {
        return Err(BindError::TopRequiresNonNegativeInteger(amount));
    }
    Ok(QueryNode::Collection(CollectionNode::Top {
        collection: Box::new(collection),
        amount: Box::new(amount_node(amount)),
    }))
}
