//! Primitive kinds, type definitions and type references.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Primitive kinds of the Entity Data Model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveKind {
    /// Variable-length byte array.
    Binary,
    /// Boolean.
    Boolean,
    /// Unsigned 8-bit integer.
    Byte,
    /// Date and time without offset.
    DateTime,
    /// Date and time with an offset from UTC.
    DateTimeOffset,
    /// Fixed-precision decimal.
    Decimal,
    /// 64-bit floating point.
    Double,
    /// 128-bit globally unique identifier.
    Guid,
    /// Signed 16-bit integer.
    Int16,
    /// Signed 32-bit integer.
    Int32,
    /// Signed 64-bit integer.
    Int64,
    /// Signed 8-bit integer.
    SByte,
    /// 32-bit floating point.
    Single,
    /// UTF-8 string.
    String,
    /// Duration.
    Time,
}

impl PrimitiveKind {
    /// Returns the qualified EDM name of this kind (e.g. `Edm.Int32`).
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            PrimitiveKind::Binary => "Edm.Binary",
            PrimitiveKind::Boolean => "Edm.Boolean",
            PrimitiveKind::Byte => "Edm.Byte",
            PrimitiveKind::DateTime => "Edm.DateTime",
            PrimitiveKind::DateTimeOffset => "Edm.DateTimeOffset",
            PrimitiveKind::Decimal => "Edm.Decimal",
            PrimitiveKind::Double => "Edm.Double",
            PrimitiveKind::Guid => "Edm.Guid",
            PrimitiveKind::Int16 => "Edm.Int16",
            PrimitiveKind::Int32 => "Edm.Int32",
            PrimitiveKind::Int64 => "Edm.Int64",
            PrimitiveKind::SByte => "Edm.SByte",
            PrimitiveKind::Single => "Edm.Single",
            PrimitiveKind::String => "Edm.String",
            PrimitiveKind::Time => "Edm.Time",
        }
    }

    /// Resolves a qualified EDM primitive name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let kind = match name {
            "Edm.Binary" => PrimitiveKind::Binary,
            "Edm.Boolean" => PrimitiveKind::Boolean,
            "Edm.Byte" => PrimitiveKind::Byte,
            "Edm.DateTime" => PrimitiveKind::DateTime,
            "Edm.DateTimeOffset" => PrimitiveKind::DateTimeOffset,
            "Edm.Decimal" => PrimitiveKind::Decimal,
            "Edm.Double" => PrimitiveKind::Double,
            "Edm.Guid" => PrimitiveKind::Guid,
            "Edm.Int16" => PrimitiveKind::Int16,
            "Edm.Int32" => PrimitiveKind::Int32,
            "Edm.Int64" => PrimitiveKind::Int64,
            "Edm.SByte" => PrimitiveKind::SByte,
            "Edm.Single" => PrimitiveKind::Single,
            "Edm.String" => PrimitiveKind::String,
            "Edm.Time" => PrimitiveKind::Time,
            _ => return None,
        };
        Some(kind)
    }

    /// Returns whether this kind is an integral number.
    #[must_use]
    pub fn is_integral(&self) -> bool {
        matches!(
            self,
            PrimitiveKind::Byte
                | PrimitiveKind::SByte
                | PrimitiveKind::Int16
                | PrimitiveKind::Int32
                | PrimitiveKind::Int64
        )
    }

    /// Returns whether this kind is numeric.
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        self.is_integral()
            || matches!(
                self,
                PrimitiveKind::Single | PrimitiveKind::Double | PrimitiveKind::Decimal
            )
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Identifier of a named schema type registered in a [`Model`](super::Model).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub(crate) u32);

impl TypeId {
    /// Returns the arena index of this type.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// The definition a type reference points at.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeDefinition {
    /// Primitive type.
    Primitive(PrimitiveKind),
    /// Complex (structured, keyless) type.
    Complex(TypeId),
    /// Entity type.
    Entity(TypeId),
    /// Enumeration type.
    Enum(TypeId),
    /// Collection of the element type.
    Collection(Box<TypeReference>),
}

impl TypeDefinition {
    /// Compares definitions structurally, ignoring element facets of collections
    /// other than nullability.
    #[must_use]
    pub fn is_equivalent_to(&self, other: &TypeDefinition) -> bool {
        match (self, other) {
            (TypeDefinition::Collection(a), TypeDefinition::Collection(b)) => {
                a.is_equivalent_to(b)
            }
            _ => self == other,
        }
    }

    /// Returns the schema type id for named (non-primitive, non-collection) definitions.
    #[must_use]
    pub fn schema_type_id(&self) -> Option<TypeId> {
        match self {
            TypeDefinition::Complex(id) | TypeDefinition::Entity(id) | TypeDefinition::Enum(id) => {
                Some(*id)
            }
            TypeDefinition::Primitive(_) | TypeDefinition::Collection(_) => None,
        }
    }
}

/// A reference to a type together with nullability and facets.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeReference {
    definition: TypeDefinition,
    nullable: bool,
    max_length: Option<u32>,
    unbounded: bool,
}

impl TypeReference {
    fn with_definition(definition: TypeDefinition, nullable: bool) -> Self {
        TypeReference {
            definition,
            nullable,
            max_length: None,
            unbounded: false,
        }
    }

    /// Creates a primitive type reference.
    #[must_use]
    pub fn primitive(kind: PrimitiveKind, nullable: bool) -> Self {
        Self::with_definition(TypeDefinition::Primitive(kind), nullable)
    }

    /// Creates a complex type reference.
    #[must_use]
    pub fn complex(id: TypeId, nullable: bool) -> Self {
        Self::with_definition(TypeDefinition::Complex(id), nullable)
    }

    /// Creates an entity type reference.
    #[must_use]
    pub fn entity(id: TypeId, nullable: bool) -> Self {
        Self::with_definition(TypeDefinition::Entity(id), nullable)
    }

    /// Creates an enumeration type reference.
    #[must_use]
    pub fn enumeration(id: TypeId, nullable: bool) -> Self {
        Self::with_definition(TypeDefinition::Enum(id), nullable)
    }

    /// Creates a non-nullable collection type reference.
    #[must_use]
    pub fn collection(element: TypeReference) -> Self {
        Self::with_definition(TypeDefinition::Collection(Box::new(element)), false)
    }

    /// Sets the maximum length facet (strings and binaries).
    #[must_use]
    pub fn with_max_length(mut self, max_length: u32) -> Self {
        self.max_length = Some(max_length);
        self.unbounded = false;
        self
    }

    /// Marks the reference as explicitly unbounded (`MaxLength="Max"`).
    #[must_use]
    pub fn with_unbounded_length(mut self) -> Self {
        self.max_length = None;
        self.unbounded = true;
        self
    }

    /// Returns a copy with the given nullability.
    #[must_use]
    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Returns the referenced definition.
    #[must_use]
    pub fn definition(&self) -> &TypeDefinition {
        &self.definition
    }

    /// Returns whether the reference admits null.
    #[must_use]
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Returns the maximum length facet, if declared.
    #[must_use]
    pub fn max_length(&self) -> Option<u32> {
        self.max_length
    }

    /// Returns whether the length is explicitly unbounded.
    #[must_use]
    pub fn is_unbounded(&self) -> bool {
        self.unbounded
    }

    /// Returns the primitive kind, if this is a primitive reference.
    #[must_use]
    pub fn primitive_kind(&self) -> Option<PrimitiveKind> {
        match self.definition {
            TypeDefinition::Primitive(kind) => Some(kind),
            _ => None,
        }
    }

    /// Returns true for primitive references.
    #[must_use]
    pub fn is_primitive(&self) -> bool {
        self.primitive_kind().is_some()
    }

    /// Returns true for entity references.
    #[must_use]
    pub fn is_entity(&self) -> bool {
        matches!(self.definition, TypeDefinition::Entity(_))
    }

    /// Returns true for complex or entity references.
    #[must_use]
    pub fn is_structured(&self) -> bool {
        self.structured_id().is_some()
    }

    /// Returns true for collection references.
    #[must_use]
    pub fn is_collection(&self) -> bool {
        matches!(self.definition, TypeDefinition::Collection(_))
    }

    /// Returns true for collections whose elements are not entities.
    #[must_use]
    pub fn is_non_entity_collection(&self) -> bool {
        self.element_type().is_some_and(|element| !element.is_entity())
    }

    /// Returns the schema id of a complex or entity reference.
    #[must_use]
    pub fn structured_id(&self) -> Option<TypeId> {
        match self.definition {
            TypeDefinition::Complex(id) | TypeDefinition::Entity(id) => Some(id),
            _ => None,
        }
    }

    /// Returns the element type of a collection reference.
    #[must_use]
    pub fn element_type(&self) -> Option<&TypeReference> {
        match &self.definition {
            TypeDefinition::Collection(element) => Some(element),
            _ => None,
        }
    }

    /// Equivalence: same definition and same nullability. Facets are not compared.
    #[must_use]
    pub fn is_equivalent_to(&self, other: &TypeReference) -> bool {
        self.nullable == other.nullable && self.definition.is_equivalent_to(&other.definition)
    }
}
