//! Model registry: schema types, entity sets and service operations.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{ODataError, Result};

use super::types::{PrimitiveKind, TypeDefinition, TypeId, TypeReference};

/// Central registry of all schema elements of a service.
///
/// Types are appended to an arena and never removed, so a [`TypeId`] stays
/// valid for the lifetime of the model. A base type must be registered
/// before its derived types, which keeps the inheritance graph acyclic.
#[derive(Debug, Clone, Default)]
pub struct Model {
    /// Schema types, indexed by [`TypeId`].
    types: Vec<SchemaType>,
    /// Qualified name -> type id.
    type_names: HashMap<String, TypeId>,
    /// Entity sets of the default container.
    entity_sets: HashMap<String, EntitySet>,
    /// Service operations (function imports) of the default container.
    service_operations: HashMap<String, ServiceOperation>,
}

impl Model {
    /// Creates a new empty model.
    #[must_use]
    pub fn new() -> Self {
        Model::default()
    }

    fn register(&mut self, name: &str, schema_type: SchemaType) -> Result<TypeId> {
        if self.type_names.contains_key(name) || PrimitiveKind::from_name(name).is_some() {
            return Err(ODataError::SchemaError(format!(
                "Type '{name}' already exists"
            )));
        }
        let id = TypeId(self.types.len() as u32);
        self.types.push(schema_type);
        self.type_names.insert(name.to_string(), id);
        Ok(id)
    }

    fn check_base(&self, ty: &StructuredType, entity: bool) -> Result<()> {
        let Some(base) = ty.base else {
            return Ok(());
        };
        match (self.types.get(base.index()), entity) {
            (Some(SchemaType::Entity(_)), true) | (Some(SchemaType::Complex(_)), false) => Ok(()),
            _ => Err(ODataError::SchemaError(format!(
                "Base type of '{}' is not a registered {} type",
                ty.name,
                if entity { "entity" } else { "complex" }
            ))),
        }
    }

    fn check_property_names(&self, ty: &StructuredType) -> Result<()> {
        let mut seen: HashSet<&str> = HashSet::new();
        if let Some(base) = ty.base {
            seen.extend(self.properties(base).map(|p| p.name.as_str()));
        }
        for property in &ty.properties {
            if !seen.insert(&property.name) {
                return Err(ODataError::SchemaError(format!(
                    "Duplicate property name '{}' on type '{}'",
                    property.name, ty.name
                )));
            }
        }
        Ok(())
    }

    /// Registers a complex type.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is taken, the base type is not a complex
    /// type, or property names collide.
    pub fn add_complex_type(&mut self, ty: StructuredType) -> Result<TypeId> {
        self.check_base(&ty, false)?;
        self.check_property_names(&ty)?;
        if !ty.key.is_empty() {
            return Err(ODataError::SchemaError(format!(
                "Complex type '{}' cannot declare a key",
                ty.name
            )));
        }
        let name = ty.name.clone();
        self.register(&name, SchemaType::Complex(ty))
    }

    /// Registers an entity type.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The name is taken or the base type is not an entity type
    /// - Property names collide
    /// - A root type declares no key, a derived type redeclares one, or a key
    ///   names something other than a declared primitive property
    pub fn add_entity_type(&mut self, ty: StructuredType) -> Result<TypeId> {
        self.check_base(&ty, true)?;
        self.check_property_names(&ty)?;

        match (ty.base.is_some(), ty.key.is_empty()) {
            (true, false) => {
                return Err(ODataError::SchemaError(format!(
                    "Derived entity type '{}' cannot redeclare a key",
                    ty.name
                )));
            }
            (false, true) => {
                return Err(ODataError::SchemaError(format!(
                    "Entity type '{}' must declare at least one key property",
                    ty.name
                )));
            }
            _ => {}
        }
        for key in &ty.key {
            let declared = ty
                .properties
                .iter()
                .find(|p| &p.name == key && p.kind == PropertyKind::Structural);
            if !declared.is_some_and(|p| p.type_ref.is_primitive()) {
                return Err(ODataError::SchemaError(format!(
                    "Key property '{key}' not found among primitive properties of '{}'",
                    ty.name
                )));
            }
        }

        let name = ty.name.clone();
        self.register(&name, SchemaType::Entity(ty))
    }

    /// Registers an enumeration type.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is taken or the underlying type is not integral.
    pub fn add_enum_type(&mut self, ty: EnumType) -> Result<TypeId> {
        if !ty.underlying.is_integral() {
            return Err(ODataError::SchemaError(format!(
                "Underlying type of enum '{}' must be integral",
                ty.name
            )));
        }
        let name = ty.name.clone();
        self.register(&name, SchemaType::Enum(ty))
    }

    /// Adds a navigation property to a registered entity type.
    ///
    /// Navigation properties are added after registration so that entity
    /// types can reference each other.
    ///
    /// # Errors
    ///
    /// Returns an error if the owner is not an entity type, the target is not
    /// an entity (or collection of entities), or the name collides.
    pub fn add_navigation_property(
        &mut self,
        owner: TypeId,
        name: &str,
        target: TypeReference,
    ) -> Result<()> {
        let target_is_entity = target.is_entity()
            || target.element_type().is_some_and(TypeReference::is_entity);
        if !target_is_entity {
            return Err(ODataError::SchemaError(format!(
                "Navigation property '{name}' must target an entity type"
            )));
        }
        if self.find_property(owner, name).is_some() {
            return Err(ODataError::SchemaError(format!(
                "Duplicate property name '{name}'"
            )));
        }
        match self.types.get_mut(owner.index()) {
            Some(SchemaType::Entity(ty)) => {
                ty.properties.push(Property {
                    name: name.to_string(),
                    type_ref: target,
                    kind: PropertyKind::Navigation,
                });
                Ok(())
            }
            _ => Err(ODataError::SchemaError(format!(
                "Navigation property '{name}' can only be declared on an entity type"
            ))),
        }
    }

    /// Registers an entity set.
    ///
    /// # Errors
    ///
    /// Returns an error if the set exists or the element type is not an entity type.
    pub fn add_entity_set(&mut self, name: &str, entity_type: TypeId) -> Result<()> {
        if self.entity_sets.contains_key(name) {
            return Err(ODataError::SchemaError(format!(
                "Entity set '{name}' already exists"
            )));
        }
        if !matches!(self.schema_type(entity_type), Some(SchemaType::Entity(_))) {
            return Err(ODataError::SchemaError(format!(
                "Element type of entity set '{name}' is not an entity type"
            )));
        }
        self.entity_sets.insert(
            name.to_string(),
            EntitySet {
                name: name.to_string(),
                entity_type,
            },
        );
        Ok(())
    }

    /// Registers a service operation.
    ///
    /// # Errors
    ///
    /// Returns an error if an operation with the same name exists or
    /// parameter names collide.
    pub fn add_service_operation(&mut self, operation: ServiceOperation) -> Result<()> {
        if self.service_operations.contains_key(&operation.name) {
            return Err(ODataError::SchemaError(format!(
                "Service operation '{}' already exists",
                operation.name
            )));
        }
        let mut seen = HashSet::new();
        for parameter in &operation.parameters {
            if !seen.insert(&parameter.name) {
                return Err(ODataError::SchemaError(format!(
                    "Duplicate parameter '{}' on service operation '{}'",
                    parameter.name, operation.name
                )));
            }
        }
        self.service_operations
            .insert(operation.name.clone(), operation);
        Ok(())
    }

    /// Looks up a schema type by qualified name.
    #[must_use]
    pub fn find_type(&self, name: &str) -> Option<TypeId> {
        self.type_names.get(name).copied()
    }

    /// Returns the schema type with the given id.
    #[must_use]
    pub fn schema_type(&self, id: TypeId) -> Option<&SchemaType> {
        self.types.get(id.index())
    }

    /// Returns the structured (complex or entity) type with the given id.
    #[must_use]
    pub fn structured_type(&self, id: TypeId) -> Option<&StructuredType> {
        match self.schema_type(id)? {
            SchemaType::Complex(ty) | SchemaType::Entity(ty) => Some(ty),
            SchemaType::Enum(_) => None,
        }
    }

    /// Resolves an entity set by name.
    #[must_use]
    pub fn entity_set(&self, name: &str) -> Option<&EntitySet> {
        self.entity_sets.get(name)
    }

    /// Resolves a service operation by name.
    #[must_use]
    pub fn service_operation(&self, name: &str) -> Option<&ServiceOperation> {
        self.service_operations.get(name)
    }

    /// Iterates the type and its ancestors, most derived first.
    fn lineage(&self, id: TypeId) -> impl Iterator<Item = &StructuredType> {
        std::iter::successors(self.structured_type(id), move |ty| {
            ty.base.and_then(|base| self.structured_type(base))
        })
    }

    /// All properties of a structured type, inherited ones first.
    fn properties(&self, id: TypeId) -> impl Iterator<Item = &Property> {
        let mut chain: Vec<&StructuredType> = self.lineage(id).collect();
        chain.reverse();
        chain.into_iter().flat_map(|ty| ty.properties.iter())
    }

    /// Returns the declared and inherited structural properties of a type.
    #[must_use]
    pub fn structural_properties(&self, id: TypeId) -> Vec<&Property> {
        self.properties(id)
            .filter(|p| p.kind == PropertyKind::Structural)
            .collect()
    }

    /// Returns the declared and inherited navigation properties of a type.
    #[must_use]
    pub fn navigation_properties(&self, id: TypeId) -> Vec<&Property> {
        self.properties(id)
            .filter(|p| p.kind == PropertyKind::Navigation)
            .collect()
    }

    /// Returns the key properties of an entity type in declaration order.
    #[must_use]
    pub fn key_properties(&self, id: TypeId) -> Vec<&Property> {
        let Some(root) = self.lineage(id).last() else {
            return Vec::new();
        };
        root.key
            .iter()
            .filter_map(|key| root.properties.iter().find(|p| &p.name == key))
            .collect()
    }

    /// Finds a declared or inherited property by name.
    #[must_use]
    pub fn find_property(&self, id: TypeId, name: &str) -> Option<&Property> {
        self.lineage(id)
            .find_map(|ty| ty.properties.iter().find(|p| p.name == name))
    }

    /// Returns whether the structured type (or one of its ancestors) is open.
    #[must_use]
    pub fn is_open(&self, id: TypeId) -> bool {
        self.lineage(id).any(|ty| ty.is_open)
    }

    /// Returns whether `derived` is `base` or inherits from it.
    #[must_use]
    pub fn inherits_from_or_equals(&self, derived: TypeId, base: TypeId) -> bool {
        derived == base
            || std::iter::successors(Some(derived), |id| {
                self.structured_type(*id).and_then(|ty| ty.base)
            })
            .any(|id| id == base)
    }

    /// Definition-level `IsOrInheritsFrom`: equivalent definitions, or
    /// structured definitions related by inheritance.
    #[must_use]
    pub fn is_or_inherits_from(&self, derived: &TypeDefinition, base: &TypeDefinition) -> bool {
        match (derived, base) {
            (TypeDefinition::Entity(d), TypeDefinition::Entity(b))
            | (TypeDefinition::Complex(d), TypeDefinition::Complex(b)) => {
                self.inherits_from_or_equals(*d, *b)
            }
            _ => derived.is_equivalent_to(base),
        }
    }

    /// Returns the qualified name of a definition (`Collection(...)` for collections).
    #[must_use]
    pub fn definition_name(&self, definition: &TypeDefinition) -> String {
        match definition {
            TypeDefinition::Primitive(kind) => kind.name().to_string(),
            TypeDefinition::Collection(element) => {
                format!("Collection({})", self.definition_name(element.definition()))
            }
            TypeDefinition::Complex(id) | TypeDefinition::Entity(id) | TypeDefinition::Enum(id) => {
                self.schema_type(*id)
                    .map_or_else(|| format!("<unknown type {}>", id.0), |ty| ty.name().to_string())
            }
        }
    }

    /// Returns the display name of a type reference.
    #[must_use]
    pub fn display_name(&self, type_ref: &TypeReference) -> String {
        self.definition_name(type_ref.definition())
    }
}

/// A named schema type.
#[derive(Debug, Clone)]
pub enum SchemaType {
    /// Complex type.
    Complex(StructuredType),
    /// Entity type.
    Entity(StructuredType),
    /// Enumeration type.
    Enum(EnumType),
}

impl SchemaType {
    /// Returns the qualified name of the type.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            SchemaType::Complex(ty) | SchemaType::Entity(ty) => &ty.name,
            SchemaType::Enum(ty) => &ty.name,
        }
    }
}

/// Complex or entity type definition.
#[derive(Debug, Clone)]
pub struct StructuredType {
    /// Qualified name (e.g. `NS.Customer`).
    pub name: String,
    /// Base type.
    pub base: Option<TypeId>,
    /// Open types admit undeclared (dynamic) properties.
    pub is_open: bool,
    /// Declared properties, in declaration order.
    pub properties: Vec<Property>,
    /// Key property names (entity root types only).
    pub key: Vec<String>,
}

impl StructuredType {
    /// Creates a new structured type with no properties.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        StructuredType {
            name: name.into(),
            base: None,
            is_open: false,
            properties: Vec::new(),
            key: Vec::new(),
        }
    }

    /// Sets the base type.
    #[must_use]
    pub fn with_base(mut self, base: TypeId) -> Self {
        self.base = Some(base);
        self
    }

    /// Marks the type as open.
    #[must_use]
    pub fn open(mut self) -> Self {
        self.is_open = true;
        self
    }

    /// Adds a structural property.
    #[must_use]
    pub fn with_property(mut self, name: &str, type_ref: TypeReference) -> Self {
        self.properties.push(Property {
            name: name.to_string(),
            type_ref,
            kind: PropertyKind::Structural,
        });
        self
    }

    /// Sets the key property names.
    #[must_use]
    pub fn with_key(mut self, key: &[&str]) -> Self {
        self.key = key.iter().map(ToString::to_string).collect();
        self
    }
}

/// Property of a structured type.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    /// Property name.
    pub name: String,
    /// Declared type.
    pub type_ref: TypeReference,
    /// Structural or navigation.
    pub kind: PropertyKind,
}

/// Property kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyKind {
    /// Value-holding property.
    Structural,
    /// Association to another entity (or collection of entities).
    Navigation,
}

/// Enumeration type definition.
#[derive(Debug, Clone)]
pub struct EnumType {
    /// Qualified name.
    pub name: String,
    /// Underlying integral kind.
    pub underlying: PrimitiveKind,
    /// Member names and values.
    pub members: Vec<(String, i64)>,
}

impl EnumType {
    /// Creates an enum type backed by `Edm.Int32`.
    #[must_use]
    pub fn new(name: impl Into<String>, members: &[(&str, i64)]) -> Self {
        EnumType {
            name: name.into(),
            underlying: PrimitiveKind::Int32,
            members: members
                .iter()
                .map(|(member, value)| ((*member).to_string(), *value))
                .collect(),
        }
    }
}

/// Entity set of the default container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySet {
    /// Set name.
    pub name: String,
    /// Element entity type.
    pub entity_type: TypeId,
}

/// Result kind classification of a service operation, controlling composability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceOperationResultKind {
    /// Queryable collection of entities; supports a key lookup.
    QueryWithMultipleResults,
    /// Queryable single entity.
    QueryWithSingleResult,
    /// A single value returned directly.
    DirectValue,
    /// A non-queryable enumeration.
    Enumeration,
    /// No result.
    Void,
}

impl ServiceOperationResultKind {
    /// Returns the name of the result kind.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            ServiceOperationResultKind::QueryWithMultipleResults => "QueryWithMultipleResults",
            ServiceOperationResultKind::QueryWithSingleResult => "QueryWithSingleResult",
            ServiceOperationResultKind::DirectValue => "DirectValue",
            ServiceOperationResultKind::Enumeration => "Enumeration",
            ServiceOperationResultKind::Void => "Void",
        }
    }
}

/// Parameter of a service operation.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationParameter {
    /// Parameter name (matched against query option names).
    pub name: String,
    /// Declared type.
    pub type_ref: TypeReference,
}

/// Service operation (function import) of the default container.
#[derive(Debug, Clone)]
pub struct ServiceOperation {
    /// Operation name.
    pub name: String,
    /// Parameters in declaration order.
    pub parameters: Vec<OperationParameter>,
    /// Return type (`None` for void operations).
    pub return_type: Option<TypeReference>,
    /// Result kind; `None` models an operation missing its annotation.
    pub result_kind: Option<ServiceOperationResultKind>,
}

impl ServiceOperation {
    /// Creates a service operation with the given result kind.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        result_kind: ServiceOperationResultKind,
        return_type: Option<TypeReference>,
    ) -> Self {
        ServiceOperation {
            name: name.into(),
            parameters: Vec::new(),
            return_type,
            result_kind: Some(result_kind),
        }
    }

    /// Adds a parameter.
    #[must_use]
    pub fn with_parameter(mut self, name: &str, type_ref: TypeReference) -> Self {
        self.parameters.push(OperationParameter {
            name: name.to_string(),
            type_ref,
        });
        self
    }
}
