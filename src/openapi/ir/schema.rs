//! Schema nodes: the tagged union the resolver matches on.
//!
//! Raw serde [`Schema`] values allow any combination of keywords. A
//! [`SchemaNode`] has exactly one active variant, chosen by a fixed
//! precedence: `$ref`, `enum`/`const`, `allOf`, `oneOf`/`anyOf`, multi-type
//! `type` arrays, arrays and tuples, objects, then primitives.

use indexmap::IndexMap;

use crate::openapi::spec::{AdditionalProperties, EnumValue, Items, Schema, SchemaType, ref_name};

/// One schema with exactly one active kind.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaNode {
    /// Active variant.
    pub kind: SchemaKind,
    /// `nullable: true`, a `null` type entry or a `null` enum value.
    pub nullable: bool,
    /// Description, carried into doc comments.
    pub description: Option<String>,
    /// `readOnly: true`.
    pub read_only: bool,
}

/// The active variant of a [`SchemaNode`].
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaKind {
    /// A declared base type with optional format.
    Primitive {
        /// Declared type.
        kind: PrimitiveKind,
        /// `format` keyword.
        format: Option<String>,
    },
    /// Reference to a named schema (final pointer segment).
    Reference(String),
    /// Homogeneous array.
    Array(Box<SchemaNode>),
    /// Fixed-length tuple.
    Tuple(Vec<SchemaNode>),
    /// Object with properties and additional-property rules.
    Object(ObjectSchema),
    /// Intersection of members.
    AllOf(Vec<SchemaNode>),
    /// Exclusive union of members.
    OneOf(Vec<SchemaNode>),
    /// Inclusive union of members.
    AnyOf(Vec<SchemaNode>),
    /// Closed set of literal values, `null` excluded.
    Enum {
        /// Values in declaration order.
        values: Vec<EnumValue>,
        /// Shared kind of the values.
        value_kind: EnumValueKind,
    },
    /// A schema that constrains nothing (`{}`).
    Any,
}

/// Declared primitive type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimitiveKind {
    /// `string`.
    String,
    /// `integer`.
    Integer,
    /// `number`.
    Number,
    /// `boolean`.
    Boolean,
    /// `null`.
    Null,
    /// Swagger 2.0 `file`.
    File,
    /// Anything else; resolved to `unknown` with a warning.
    Other(String),
}

impl PrimitiveKind {
    fn parse(name: &str) -> Self {
        match name {
            "string" => Self::String,
            "integer" => Self::Integer,
            "number" => Self::Number,
            "boolean" => Self::Boolean,
            "null" => Self::Null,
            "file" => Self::File,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Value kind of an enum after `null` values are split off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumValueKind {
    /// Every value is a string.
    String,
    /// Every value is a number.
    Numeric,
    /// Strings, numbers or booleans together.
    Mixed,
}

/// `additionalProperties` as declared.
#[derive(Debug, Clone, PartialEq)]
pub enum Additional {
    /// Not declared.
    Unspecified,
    /// `true` or `false`.
    Allowed(bool),
    /// A value schema.
    Schema(Box<SchemaNode>),
}

/// Object keywords.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectSchema {
    /// Properties in declaration order.
    pub properties: IndexMap<String, SchemaNode>,
    /// Names listed in `required`.
    pub required: Vec<String>,
    /// `additionalProperties` keyword.
    pub additional: Additional,
}

impl ObjectSchema {
    /// Whether `name` is listed in `required`.
    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }
}

impl SchemaNode {
    /// A node of the given kind with no modifiers.
    pub fn new(kind: SchemaKind) -> Self {
        Self {
            kind,
            nullable: false,
            description: None,
            read_only: false,
        }
    }

    /// Shorthand for a primitive node.
    pub fn primitive(kind: PrimitiveKind, format: Option<&str>) -> Self {
        Self::new(SchemaKind::Primitive {
            kind,
            format: format.map(str::to_string),
        })
    }

    /// Shorthand for a reference node.
    pub fn reference(target: impl Into<String>) -> Self {
        Self::new(SchemaKind::Reference(target.into()))
    }

    /// `string` with `binary` format: uploaded file content.
    pub fn is_binary_string(&self) -> bool {
        match &self.kind {
            SchemaKind::Primitive { kind: PrimitiveKind::File, .. } => true,
            SchemaKind::Primitive { kind: PrimitiveKind::String, format } => {
                format.as_deref() == Some("binary")
            }
            _ => false,
        }
    }

    /// Declared format, for primitives.
    pub fn format(&self) -> Option<&str> {
        match &self.kind {
            SchemaKind::Primitive { format, .. } => format.as_deref(),
            _ => None,
        }
    }

    /// Build a node from a raw schema.
    pub fn from_schema(schema: &Schema) -> Self {
        let (declared, has_null) = schema.declared_types();
        let mut node = Self::new(Self::kind_of(schema, &declared));
        node.nullable = schema.nullable.unwrap_or(false) || has_null;
        node.description = schema.description.clone();
        node.read_only = schema.read_only.unwrap_or(false);

        if let SchemaKind::Enum { values, .. } = &mut node.kind
            && values.contains(&EnumValue::Null)
        {
            values.retain(|v| *v != EnumValue::Null);
            node.nullable = true;
        }
        if let SchemaKind::Enum { values, value_kind } = &mut node.kind {
            *value_kind = enum_value_kind(values);
        }
        node
    }

    fn kind_of(schema: &Schema, declared: &[&str]) -> SchemaKind {
        if let Some(ref_path) = &schema.ref_path {
            return SchemaKind::Reference(ref_name(ref_path).unwrap_or_else(|| ref_path.clone()));
        }

        if let Some(values) = schema.enum_values.as_ref().filter(|v| !v.is_empty()) {
            return SchemaKind::Enum {
                values: values.clone(),
                value_kind: EnumValueKind::Mixed,
            };
        }
        if let Some(value) = &schema.const_value {
            return SchemaKind::Enum {
                values: vec![value.clone()],
                value_kind: EnumValueKind::Mixed,
            };
        }

        if let Some(members) = schema.all_of.as_ref().filter(|m| !m.is_empty()) {
            return SchemaKind::AllOf(members.iter().map(Self::from_schema).collect());
        }
        if let Some(members) = schema.one_of.as_ref().filter(|m| !m.is_empty()) {
            return SchemaKind::OneOf(members.iter().map(Self::from_schema).collect());
        }
        if let Some(members) = schema.any_of.as_ref().filter(|m| !m.is_empty()) {
            return SchemaKind::AnyOf(members.iter().map(Self::from_schema).collect());
        }

        if declared.len() > 1 {
            let members = declared
                .iter()
                .map(|t| {
                    let single = Schema {
                        schema_type: Some(SchemaType::Single((*t).to_string())),
                        nullable: None,
                        description: None,
                        ..schema.clone()
                    };
                    Self::from_schema(&single)
                })
                .collect();
            return SchemaKind::AnyOf(members);
        }

        let declared = declared.first().copied();

        if let Some(prefix) = &schema.prefix_items {
            return SchemaKind::Tuple(prefix.iter().map(Self::from_schema).collect());
        }
        if declared == Some("array") || schema.items.is_some() {
            return match &schema.items {
                Some(Items::Tuple(items)) => {
                    SchemaKind::Tuple(items.iter().map(Self::from_schema).collect())
                }
                Some(Items::Single(item)) => SchemaKind::Array(Box::new(Self::from_schema(item))),
                None => SchemaKind::Array(Box::new(Self::new(SchemaKind::Any))),
            };
        }

        if declared == Some("object")
            || schema.properties.is_some()
            || schema.additional_properties.is_some()
        {
            let properties = schema
                .properties
                .iter()
                .flatten()
                .map(|(name, prop)| (name.clone(), Self::from_schema(prop)))
                .collect();
            let additional = match &schema.additional_properties {
                None => Additional::Unspecified,
                Some(AdditionalProperties::Bool(allowed)) => Additional::Allowed(*allowed),
                Some(AdditionalProperties::Schema(value)) => {
                    Additional::Schema(Box::new(Self::from_schema(value)))
                }
            };
            return SchemaKind::Object(ObjectSchema {
                properties,
                required: schema.required.clone().unwrap_or_default(),
                additional,
            });
        }

        match declared {
            Some(name) => SchemaKind::Primitive {
                kind: PrimitiveKind::parse(name),
                format: schema.format.clone(),
            },
            // `type: null` alone, or no type at all
            None if schema.schema_type.is_some() => SchemaKind::Primitive {
                kind: PrimitiveKind::Null,
                format: None,
            },
            None => SchemaKind::Any,
        }
    }
}

fn enum_value_kind(values: &[EnumValue]) -> EnumValueKind {
    if values.iter().all(|v| matches!(v, EnumValue::String(_))) {
        EnumValueKind::String
    } else if values
        .iter()
        .all(|v| matches!(v, EnumValue::Integer(_) | EnumValue::Float(_)))
    {
        EnumValueKind::Numeric
    } else {
        EnumValueKind::Mixed
    }
}

/// Build named nodes for a whole schema table, keeping declaration order.
pub fn build_definitions(schemas: Option<&IndexMap<String, Schema>>) -> IndexMap<String, SchemaNode> {
    schemas
        .into_iter()
        .flatten()
        .map(|(name, schema)| (name.clone(), SchemaNode::from_schema(schema)))
        .collect()
}
