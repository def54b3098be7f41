//! Schema resolver: schema nodes to TypeScript type expressions.
//!
//! Resolution registers every named schema it reaches in the [`TypeRegistry`].
//! Cycles terminate through two guards: the `visited` set carried down each
//! resolution path, and the registry slot reserved before a definition is
//! generated. Recoverable problems become warnings and a placeholder type.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::Deserialize;
use tracing::debug;

use super::registry::TypeRegistry;
use super::schema::{Additional, EnumValueKind, ObjectSchema, PrimitiveKind, SchemaKind, SchemaNode};
use super::types::{EnumMember, TsLiteral, TsPrimitive, TsProp, TsType, TsTypeDef, TypeDefKind};
use super::utils::{
    enum_key, enum_value_to_literal, make_string_record, make_unknown_record, pascal_case_type,
};
use crate::openapi::config::{
    AdditionalPropertiesPolicy, DateType, EnumStyle, GeneratorConfig, NullableStyle,
};
use crate::openapi::error::Diagnostics;
use crate::openapi::spec::EnumValue;

/// Label entry of the numeric enum payload carried in a schema description.
#[derive(Debug, Deserialize)]
struct EnumLabel {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Value")]
    value: serde_json::Value,
}

/// Resolves schema nodes against a table of named definitions.
#[derive(Debug)]
pub struct SchemaResolver<'a> {
    definitions: &'a IndexMap<String, SchemaNode>,
    config: &'a GeneratorConfig,
    registry: TypeRegistry,
    diagnostics: Diagnostics,
    /// Entity names for warnings, innermost last.
    subjects: Vec<String>,
}

impl<'a> SchemaResolver<'a> {
    /// Create a resolver over named definitions keyed by their source name.
    pub fn new(definitions: &'a IndexMap<String, SchemaNode>, config: &'a GeneratorConfig) -> Self {
        Self {
            definitions,
            config,
            registry: TypeRegistry::new(),
            diagnostics: Diagnostics::default(),
            subjects: Vec::new(),
        }
    }

    /// Canonical registry name of a source schema name.
    pub fn canonical_name(source: &str) -> String {
        pascal_case_type(source)
    }

    /// Named definition table.
    pub fn definitions(&self) -> &'a IndexMap<String, SchemaNode> {
        self.definitions
    }

    /// The registry built so far.
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Warnings recorded so far.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Give up the registry and the warnings.
    pub fn into_parts(self) -> (TypeRegistry, Diagnostics) {
        (self.registry, self.diagnostics)
    }

    /// Register every named definition in declaration order.
    pub fn register_all(&mut self) {
        let definitions = self.definitions;
        for name in definitions.keys() {
            let mut visited = HashSet::new();
            self.resolve_reference(name, &mut visited);
        }
    }

    /// Resolve a node on behalf of `subject` (an operation, parameter, ...).
    pub fn resolve_for(&mut self, subject: &str, node: &SchemaNode) -> TsType {
        self.subjects.push(subject.to_string());
        let mut visited = HashSet::new();
        let ty = self.resolve(node, &mut visited);
        self.subjects.pop();
        ty
    }

    /// Follow a chain of references to the node it ends at.
    pub fn dereference<'n>(&self, node: &'n SchemaNode) -> Option<&'n SchemaNode>
    where
        'a: 'n,
    {
        let mut current = node;
        let mut seen = HashSet::new();
        while let SchemaKind::Reference(target) = &current.kind {
            if !seen.insert(target.as_str()) {
                return None;
            }
            current = self.definitions.get(target)?;
        }
        Some(current)
    }

    /// Resolve a node to a type expression, registering named types it reaches.
    pub fn resolve(&mut self, node: &SchemaNode, visited: &mut HashSet<String>) -> TsType {
        let base = match &node.kind {
            SchemaKind::Reference(target) => self.resolve_reference(target, visited),
            SchemaKind::Enum { values, .. } => literal_union(values),
            SchemaKind::AllOf(members) => {
                let mut parts = self.resolve_members(members, visited);
                match parts.len() {
                    0 => make_unknown_record(),
                    1 => parts.remove(0),
                    _ => TsType::Intersection(parts),
                }
            }
            SchemaKind::OneOf(members) | SchemaKind::AnyOf(members) => {
                let mut parts = self.resolve_members(members, visited);
                match parts.len() {
                    0 => TsType::unknown(),
                    1 => parts.remove(0),
                    _ => TsType::Union(parts),
                }
            }
            SchemaKind::Array(item) => TsType::Array(Box::new(self.resolve(item, visited))),
            SchemaKind::Tuple(items) => {
                TsType::Tuple(items.iter().map(|item| self.resolve(item, visited)).collect())
            }
            SchemaKind::Object(object) => self.resolve_object(object, visited),
            SchemaKind::Primitive { kind, format } => self.resolve_primitive(kind, format.as_deref()),
            SchemaKind::Any => TsType::unknown(),
        };

        if node.nullable {
            self.make_nullable(base)
        } else {
            base
        }
    }

    /// Resolve a reference target to its canonical name, generating the
    /// definition the first time the name is reached.
    pub fn resolve_reference(&mut self, target: &str, visited: &mut HashSet<String>) -> TsType {
        let canonical = Self::canonical_name(target);
        if self.registry.is_unresolved(target) {
            return TsType::unknown();
        }
        let nullable_enum = self
            .definitions
            .get(target)
            .is_some_and(|node| self.is_nullable_enum(node));
        if visited.contains(&canonical) || self.registry.contains(&canonical) {
            if let Some(previous) = self.registry.claim(&canonical, target) {
                let message = format!(
                    "schemas '{previous}' and '{target}' share the type name '{canonical}'; '{target}' reuses the first definition"
                );
                self.diagnostics.warn(canonical.clone(), message);
            }
            return self.named(canonical, nullable_enum);
        }

        let definitions = self.definitions;
        let Some(node) = definitions.get(target) else {
            if self.registry.mark_unresolved(target) {
                let subject = self.subject();
                self.diagnostics.warn(
                    subject,
                    format!("unresolved reference '{target}'; using unknown"),
                );
            }
            return TsType::unknown();
        };

        self.registry.claim(&canonical, target);
        self.registry.reserve(&canonical);
        visited.insert(canonical.clone());
        debug!(schema = %target, name = %canonical, "Generating type.");

        self.subjects.push(canonical.clone());
        let def = self.build_definition(&canonical, node, visited);
        self.subjects.pop();

        self.registry.define(def);
        visited.remove(&canonical);
        self.named(canonical, nullable_enum)
    }

    /// Named numeric enums are declared without their null variant; it is
    /// appended where the name is used.
    fn is_nullable_enum(&self, node: &SchemaNode) -> bool {
        node.nullable
            && self.config.enum_style == EnumStyle::Enum
            && matches!(
                node.kind,
                SchemaKind::Enum {
                    value_kind: EnumValueKind::Numeric,
                    ..
                }
            )
    }

    fn named(&self, canonical: String, nullable: bool) -> TsType {
        let ty = TsType::Ref(canonical);
        if nullable { self.make_nullable(ty) } else { ty }
    }

    fn subject(&self) -> String {
        self.subjects
            .last()
            .cloned()
            .unwrap_or_else(|| "<inline>".to_string())
    }

    fn build_definition(
        &mut self,
        name: &str,
        node: &SchemaNode,
        visited: &mut HashSet<String>,
    ) -> TsTypeDef {
        let docs = node.description.clone();
        match &node.kind {
            SchemaKind::Object(object) if !node.nullable && object.properties.is_empty() => {
                if matches!(object.additional, Additional::Unspecified) {
                    self.diagnostics.warn(
                        name,
                        "object schema declares no properties and no additionalProperties; emitted as an empty interface",
                    );
                    return TsTypeDef {
                        name: name.to_string(),
                        docs,
                        kind: TypeDefKind::Interface {
                            properties: Vec::new(),
                        },
                    };
                }
                let ty = self.resolve(node, visited);
                alias(name, docs, ty)
            }
            SchemaKind::Object(object) if !node.nullable => {
                let properties = self.resolve_properties(object, visited);
                match self.index_signature(object, visited) {
                    Some(record) => {
                        alias(name, docs, TsType::Intersection(vec![TsType::Object(properties), record]))
                    }
                    None => TsTypeDef {
                        name: name.to_string(),
                        docs,
                        kind: TypeDefKind::Interface { properties },
                    },
                }
            }
            SchemaKind::Enum {
                values,
                value_kind: EnumValueKind::Numeric,
            } if self.config.enum_style == EnumStyle::Enum => {
                let (members, labelled) =
                    self.enum_members(name, values, node.description.as_deref());
                TsTypeDef {
                    name: name.to_string(),
                    docs: if labelled { None } else { docs },
                    kind: TypeDefKind::Enum { members },
                }
            }
            _ => {
                let ty = self.resolve(node, visited);
                alias(name, docs, ty)
            }
        }
    }

    fn resolve_members(
        &mut self,
        members: &[SchemaNode],
        visited: &mut HashSet<String>,
    ) -> Vec<TsType> {
        members
            .iter()
            .map(|member| self.resolve(member, visited))
            .filter(|ty| !ty.is_placeholder())
            .collect()
    }

    fn resolve_properties(
        &mut self,
        object: &ObjectSchema,
        visited: &mut HashSet<String>,
    ) -> Vec<TsProp> {
        object
            .properties
            .iter()
            .map(|(name, prop)| TsProp {
                name: name.clone(),
                ty: self.resolve(prop, visited),
                optional: !object.is_required(name),
                readonly: prop.read_only,
                docs: prop.description.clone(),
            })
            .collect()
    }

    /// Keyed map of extra properties, when the policy asks for one.
    fn index_signature(
        &mut self,
        object: &ObjectSchema,
        visited: &mut HashSet<String>,
    ) -> Option<TsType> {
        if self.config.additional_properties != AdditionalPropertiesPolicy::IndexSignature {
            return None;
        }
        match &object.additional {
            Additional::Schema(value) => Some(make_string_record(self.resolve(value, visited))),
            Additional::Allowed(true) => Some(make_unknown_record()),
            Additional::Allowed(false) | Additional::Unspecified => None,
        }
    }

    fn resolve_object(&mut self, object: &ObjectSchema, visited: &mut HashSet<String>) -> TsType {
        if object.properties.is_empty() {
            return match &object.additional {
                Additional::Schema(value) => make_string_record(self.resolve(value, visited)),
                Additional::Allowed(false) => {
                    make_string_record(TsType::Primitive(TsPrimitive::Never))
                }
                Additional::Allowed(true) => make_unknown_record(),
                Additional::Unspecified => {
                    let subject = self.subject();
                    self.diagnostics.warn(
                        subject,
                        "object schema declares no properties and no additionalProperties; using an empty object type",
                    );
                    TsType::Object(Vec::new())
                }
            };
        }

        let properties = TsType::Object(self.resolve_properties(object, visited));
        match self.index_signature(object, visited) {
            Some(record) => TsType::Intersection(vec![properties, record]),
            None => properties,
        }
    }

    fn resolve_primitive(&mut self, kind: &PrimitiveKind, format: Option<&str>) -> TsType {
        let primitive = match kind {
            PrimitiveKind::String => match format {
                Some("date" | "date-time") if self.config.date_type == DateType::Date => {
                    TsPrimitive::Date
                }
                Some("binary") => TsPrimitive::Blob,
                _ => TsPrimitive::String,
            },
            PrimitiveKind::Integer | PrimitiveKind::Number => TsPrimitive::Number,
            PrimitiveKind::Boolean => TsPrimitive::Boolean,
            PrimitiveKind::Null => TsPrimitive::Null,
            PrimitiveKind::File => TsPrimitive::Blob,
            PrimitiveKind::Other(name) => {
                let subject = self.subject();
                self.diagnostics.warn(
                    subject,
                    format!("unrecognized schema type '{name}'; using unknown"),
                );
                TsPrimitive::Unknown
            }
        };
        TsType::Primitive(primitive)
    }

    /// Append the configured null-capable variants.
    fn make_nullable(&self, ty: TsType) -> TsType {
        let additions: &[TsPrimitive] = match self.config.nullable_style {
            NullableStyle::Null => &[TsPrimitive::Null],
            NullableStyle::Undefined => &[TsPrimitive::Undefined],
            NullableStyle::Both => &[TsPrimitive::Null, TsPrimitive::Undefined],
        };

        let mut members = match ty {
            TsType::Union(members) => members,
            other => vec![other],
        };
        for addition in additions {
            let variant = TsType::Primitive(*addition);
            if !members.contains(&variant) {
                members.push(variant);
            }
        }
        if members.len() == 1 {
            members.remove(0)
        } else {
            TsType::Union(members)
        }
    }

    /// Members of a numeric enum and whether they came from the description payload.
    fn enum_members(
        &mut self,
        name: &str,
        values: &[EnumValue],
        description: Option<&str>,
    ) -> (Vec<EnumMember>, bool) {
        if self.config.enum_from_description
            && let Some(payload) = description
        {
            match labelled_members(values, payload) {
                Ok(members) => return (members, true),
                Err(reason) => self.diagnostics.warn(
                    name,
                    format!("malformed enum label payload in description ({reason}); using value-derived labels"),
                ),
            }
        }
        (derived_members(values), false)
    }
}

fn alias(name: &str, docs: Option<String>, ty: TsType) -> TsTypeDef {
    TsTypeDef {
        name: name.to_string(),
        docs,
        kind: TypeDefKind::TypeAlias { ty },
    }
}

fn literal_union(values: &[EnumValue]) -> TsType {
    let mut literals: Vec<TsType> = values
        .iter()
        .map(|v| TsType::Literal(enum_value_to_literal(v)))
        .collect();
    match literals.len() {
        0 => TsType::Primitive(TsPrimitive::Never),
        1 => literals.remove(0),
        _ => TsType::Union(literals),
    }
}

fn enum_value_as_f64(value: &EnumValue) -> Option<f64> {
    match value {
        EnumValue::Integer(n) => Some(*n as f64),
        EnumValue::Float(f) => Some(*f),
        _ => None,
    }
}

fn labelled_members(values: &[EnumValue], payload: &str) -> Result<Vec<EnumMember>, String> {
    let labels: Vec<EnumLabel> = serde_json::from_str(payload).map_err(|e| e.to_string())?;
    values
        .iter()
        .map(|value| {
            let wanted = enum_value_as_f64(value);
            labels
                .iter()
                .find(|label| label.value.as_f64().is_some() && label.value.as_f64() == wanted)
                .map(|label| EnumMember {
                    name: label.name.clone(),
                    value: enum_value_to_literal(value),
                })
                .ok_or_else(|| format!("no label for value {}", literal_text(value)))
        })
        .collect()
}

fn derived_members(values: &[EnumValue]) -> Vec<EnumMember> {
    let mut taken = HashSet::new();
    values
        .iter()
        .map(|value| {
            let base = enum_key(&literal_text(value));
            let mut name = base.clone();
            let mut n = 2;
            while !taken.insert(name.clone()) {
                name = format!("{base}_{n}");
                n += 1;
            }
            EnumMember {
                name,
                value: enum_value_to_literal(value),
            }
        })
        .collect()
}

fn literal_text(value: &EnumValue) -> String {
    match enum_value_to_literal(value) {
        TsLiteral::String(s) => s,
        TsLiteral::Number(f) => f.to_string(),
        TsLiteral::Int(i) => i.to_string(),
        TsLiteral::Bool(b) => b.to_string(),
        TsLiteral::Null => "null".to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::openapi::ir::schema::build_definitions;
    use crate::openapi::spec::Schema;

    fn table(json: &str) -> IndexMap<String, SchemaNode> {
        let schemas: IndexMap<String, Schema> = serde_json::from_str(json).unwrap();
        build_definitions(Some(&schemas))
    }

    fn node(json: &str) -> SchemaNode {
        let schema: Schema = serde_json::from_str(json).unwrap();
        SchemaNode::from_schema(&schema)
    }

    fn prim(p: TsPrimitive) -> TsType {
        TsType::Primitive(p)
    }

    #[test]
    fn test_cycle_registers_each_name_once() {
        let defs = table(
            r##"{
                "A": {"type":"object","properties":{"b":{"$ref":"#/components/schemas/B"}}},
                "B": {"type":"object","properties":{"a":{"$ref":"#/components/schemas/A"}}}
            }"##,
        );
        let config = GeneratorConfig::default();
        let mut resolver = SchemaResolver::new(&defs, &config);
        resolver.register_all();
        resolver.register_all();

        let registry = resolver.registry();
        let names: Vec<_> = registry.names().collect();
        assert_eq!(names, ["A", "B"]);
        let TypeDefKind::Interface { properties } = &registry.get("A").unwrap().kind else {
            unreachable!("A should be an interface");
        };
        assert_eq!(properties[0].ty, TsType::Ref("B".into()));
    }

    #[test]
    fn test_self_reference_terminates() {
        let defs = table(
            r##"{"Node":{"type":"object","properties":{"children":{"type":"array","items":{"$ref":"#/components/schemas/Node"}}}}}"##,
        );
        let config = GeneratorConfig::default();
        let mut resolver = SchemaResolver::new(&defs, &config);
        resolver.register_all();
        assert_eq!(resolver.registry().len(), 1);
    }

    #[test]
    fn test_string_enum_is_literal_union() {
        let defs = IndexMap::new();
        let config = GeneratorConfig::default();
        let mut resolver = SchemaResolver::new(&defs, &config);
        let ty = resolver.resolve_for("t", &node(r#"{"type":"string","enum":["Active","Inactive"]}"#));
        assert_eq!(
            ty,
            TsType::Union(vec![
                TsType::string_literal("Active"),
                TsType::string_literal("Inactive"),
            ])
        );
    }

    #[test]
    fn test_numeric_enum_labels_from_description() {
        let defs = table(
            r#"{"Switch":{"type":"integer","enum":[0,1],"description":"[{\"Name\":\"Off\",\"Value\":0},{\"Name\":\"On\",\"Value\":1}]"}}"#,
        );
        let config = GeneratorConfig {
            enum_from_description: true,
            ..GeneratorConfig::default()
        };
        let mut resolver = SchemaResolver::new(&defs, &config);
        resolver.register_all();

        let def = resolver.registry().get("Switch").unwrap();
        assert_eq!(def.docs, None);
        assert_eq!(
            def.kind,
            TypeDefKind::Enum {
                members: vec![
                    EnumMember { name: "Off".into(), value: TsLiteral::Int(0) },
                    EnumMember { name: "On".into(), value: TsLiteral::Int(1) },
                ]
            }
        );
        assert!(resolver.diagnostics().warnings().is_empty());
    }

    #[test]
    fn test_numeric_enum_malformed_payload_falls_back() {
        let defs = table(r#"{"Switch":{"type":"integer","enum":[0,1],"description":"not json"}}"#);
        let config = GeneratorConfig {
            enum_from_description: true,
            ..GeneratorConfig::default()
        };
        let mut resolver = SchemaResolver::new(&defs, &config);
        resolver.register_all();

        let TypeDefKind::Enum { members } = &resolver.registry().get("Switch").unwrap().kind else {
            unreachable!("Switch should be an enum");
        };
        let names: Vec<_> = members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["_0", "_1"]);
        assert_eq!(resolver.diagnostics().warnings().len(), 1);
        assert_eq!(resolver.diagnostics().warnings()[0].subject, "Switch");
    }

    #[test]
    fn test_numeric_enum_feature_disabled_uses_derived_labels() {
        let defs = table(
            r#"{"Switch":{"type":"integer","enum":[0,1],"description":"[{\"Name\":\"Off\",\"Value\":0}]"}}"#,
        );
        let config = GeneratorConfig::default();
        let mut resolver = SchemaResolver::new(&defs, &config);
        resolver.register_all();

        let TypeDefKind::Enum { members } = &resolver.registry().get("Switch").unwrap().kind else {
            unreachable!("Switch should be an enum");
        };
        assert_eq!(members[0].name, "_0");
        assert!(resolver.diagnostics().warnings().is_empty());
    }

    #[test]
    fn test_numeric_enum_union_style() {
        let defs = table(r#"{"Level":{"type":"integer","enum":[1,2]}}"#);
        let config = GeneratorConfig {
            enum_style: EnumStyle::Union,
            ..GeneratorConfig::default()
        };
        let mut resolver = SchemaResolver::new(&defs, &config);
        resolver.register_all();
        assert_eq!(
            resolver.registry().get("Level").unwrap().kind,
            TypeDefKind::TypeAlias {
                ty: TsType::Union(vec![
                    TsType::Literal(TsLiteral::Int(1)),
                    TsType::Literal(TsLiteral::Int(2)),
                ])
            }
        );
    }

    #[test]
    fn test_nullable_numeric_enum_stays_named() {
        let defs = table(
            r#"{
                "Level": {"type":"integer","enum":[0,1,null]},
                "Tier": {"type":"integer","nullable":true,"enum":[0,1],"description":"[{\"Name\":\"Free\",\"Value\":0},{\"Name\":\"Paid\",\"Value\":1}]"}
            }"#,
        );
        let nullable_ref = |name: &str| {
            TsType::Union(vec![TsType::Ref(name.into()), prim(TsPrimitive::Null)])
        };

        for enum_from_description in [false, true] {
            let config = GeneratorConfig {
                enum_from_description,
                ..GeneratorConfig::default()
            };
            let mut resolver = SchemaResolver::new(&defs, &config);
            resolver.register_all();

            let member_names = |name: &str| -> Vec<String> {
                let TypeDefKind::Enum { members } = &resolver.registry().get(name).unwrap().kind else {
                    unreachable!("{name} should be a named enum");
                };
                members.iter().map(|m| m.name.clone()).collect()
            };
            assert_eq!(member_names("Level"), ["_0", "_1"]);
            let tier = if enum_from_description { ["Free", "Paid"] } else { ["_0", "_1"] };
            assert_eq!(member_names("Tier"), tier);

            assert_eq!(
                resolver.resolve_for("t", &node(r##"{"$ref":"#/components/schemas/Level"}"##)),
                nullable_ref("Level")
            );
            assert_eq!(
                resolver.resolve_for("t", &node(r##"{"$ref":"#/components/schemas/Tier"}"##)),
                nullable_ref("Tier")
            );
            assert!(resolver.diagnostics().warnings().is_empty());
        }
    }

    #[test]
    fn test_all_of_drops_placeholders() {
        let defs = table(r#"{"Base":{"type":"object","properties":{"id":{"type":"integer"}}}}"#);
        let config = GeneratorConfig::default();
        let mut resolver = SchemaResolver::new(&defs, &config);

        let ty = resolver.resolve_for(
            "t",
            &node(r##"{"allOf":[{"$ref":"#/components/schemas/Base"},{}]}"##),
        );
        assert_eq!(ty, TsType::Ref("Base".into()));

        let ty = resolver.resolve_for(
            "t",
            &node(r##"{"allOf":[{"$ref":"#/components/schemas/Base"},{"type":"object","properties":{"x":{"type":"string"}}}]}"##),
        );
        assert!(matches!(ty, TsType::Intersection(ref parts) if parts.len() == 2));
    }

    #[test]
    fn test_composites_of_only_placeholders_use_fallbacks() {
        let defs = IndexMap::new();
        let config = GeneratorConfig::default();
        let mut resolver = SchemaResolver::new(&defs, &config);

        assert_eq!(
            resolver.resolve_for("t", &node(r#"{"allOf":[{},{}]}"#)),
            make_unknown_record()
        );
        assert_eq!(
            resolver.resolve_for("t", &node(r#"{"oneOf":[{}]}"#)),
            TsType::unknown()
        );
        assert_eq!(
            resolver.resolve_for("t", &node(r#"{"anyOf":[{"type":"string"},{}]}"#)),
            prim(TsPrimitive::String)
        );
    }

    #[test]
    fn test_unresolved_reference_warns_once() {
        let defs = IndexMap::new();
        let config = GeneratorConfig::default();
        let mut resolver = SchemaResolver::new(&defs, &config);
        let missing = node(r##"{"$ref":"#/components/schemas/Ghost"}"##);

        assert_eq!(resolver.resolve_for("GET /a", &missing), TsType::unknown());
        assert_eq!(resolver.resolve_for("GET /b", &missing), TsType::unknown());
        let warnings = resolver.diagnostics().warnings();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].subject, "GET /a");
        assert!(resolver.registry().is_empty());
    }

    #[test]
    fn test_tuple_and_array() {
        let defs = IndexMap::new();
        let config = GeneratorConfig::default();
        let mut resolver = SchemaResolver::new(&defs, &config);
        assert_eq!(
            resolver.resolve_for("t", &node(r#"{"type":"array","items":[{"type":"string"},{"type":"integer"}]}"#)),
            TsType::Tuple(vec![prim(TsPrimitive::String), prim(TsPrimitive::Number)])
        );
        assert_eq!(
            resolver.resolve_for("t", &node(r#"{"type":"array","items":{"type":"boolean"}}"#)),
            TsType::Array(Box::new(prim(TsPrimitive::Boolean)))
        );
    }

    #[test]
    fn test_additional_properties_forms() {
        let defs = IndexMap::new();
        let config = GeneratorConfig::default();
        let mut resolver = SchemaResolver::new(&defs, &config);

        assert_eq!(
            resolver.resolve_for("t", &node(r#"{"type":"object","additionalProperties":{"type":"integer"}}"#)),
            make_string_record(prim(TsPrimitive::Number))
        );
        assert_eq!(
            resolver.resolve_for("t", &node(r#"{"type":"object","additionalProperties":false}"#)),
            make_string_record(prim(TsPrimitive::Never))
        );
        assert_eq!(
            resolver.resolve_for("t", &node(r#"{"type":"object","additionalProperties":true}"#)),
            make_unknown_record()
        );
        assert!(resolver.diagnostics().warnings().is_empty());

        assert_eq!(
            resolver.resolve_for("t", &node(r#"{"type":"object"}"#)),
            TsType::Object(Vec::new())
        );
        assert_eq!(resolver.diagnostics().warnings().len(), 1);
    }

    #[test]
    fn test_index_signature_policy() {
        let defs = table(
            r#"{"Bag":{"type":"object","properties":{"id":{"type":"string"}},"additionalProperties":{"type":"number"}}}"#,
        );
        let config = GeneratorConfig {
            additional_properties: AdditionalPropertiesPolicy::IndexSignature,
            ..GeneratorConfig::default()
        };
        let mut resolver = SchemaResolver::new(&defs, &config);
        resolver.register_all();
        assert!(matches!(
            resolver.registry().get("Bag").unwrap().kind,
            TypeDefKind::TypeAlias { ty: TsType::Intersection(_) }
        ));
    }

    #[test]
    fn test_empty_named_object_warns() {
        let defs = table(r#"{"Marker":{"type":"object"}}"#);
        let config = GeneratorConfig::default();
        let mut resolver = SchemaResolver::new(&defs, &config);
        resolver.register_all();

        assert_eq!(
            resolver.registry().get("Marker").unwrap().kind,
            TypeDefKind::Interface { properties: Vec::new() }
        );
        assert_eq!(resolver.diagnostics().warnings()[0].subject, "Marker");
    }

    #[test]
    fn test_primitives_and_formats() {
        let defs = IndexMap::new();
        let config = GeneratorConfig {
            date_type: DateType::Date,
            ..GeneratorConfig::default()
        };
        let mut resolver = SchemaResolver::new(&defs, &config);

        assert_eq!(
            resolver.resolve_for("t", &node(r#"{"type":"string","format":"date-time"}"#)),
            prim(TsPrimitive::Date)
        );
        assert_eq!(
            resolver.resolve_for("t", &node(r#"{"type":"string","format":"binary"}"#)),
            prim(TsPrimitive::Blob)
        );
        assert_eq!(
            resolver.resolve_for("t", &node(r#"{"type":"integer","format":"int64"}"#)),
            prim(TsPrimitive::Number)
        );
        assert_eq!(resolver.resolve_for("t", &node("{}")), TsType::unknown());
        assert!(resolver.diagnostics().warnings().is_empty());

        assert_eq!(
            resolver.resolve_for("t", &node(r#"{"type":"decimal"}"#)),
            TsType::unknown()
        );
        assert_eq!(resolver.diagnostics().warnings().len(), 1);
    }

    #[test]
    fn test_nullable_styles() {
        let defs = IndexMap::new();
        let config = GeneratorConfig {
            nullable_style: NullableStyle::Both,
            ..GeneratorConfig::default()
        };
        let mut resolver = SchemaResolver::new(&defs, &config);

        assert_eq!(
            resolver.resolve_for("t", &node(r#"{"type":"string","nullable":true}"#)),
            TsType::Union(vec![
                prim(TsPrimitive::String),
                prim(TsPrimitive::Null),
                prim(TsPrimitive::Undefined),
            ])
        );
        assert_eq!(
            resolver.resolve_for("t", &node(r#"{"type":"string","enum":["a","b"],"nullable":true}"#)),
            TsType::Union(vec![
                TsType::string_literal("a"),
                TsType::string_literal("b"),
                prim(TsPrimitive::Null),
                prim(TsPrimitive::Undefined),
            ])
        );
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let defs = table(
            r##"{"Pet":{"type":"object","properties":{"owner":{"$ref":"#/components/schemas/Owner"}}},"Owner":{"type":"object","properties":{"name":{"type":"string"}}}}"##,
        );
        let config = GeneratorConfig::default();

        let run = || {
            let mut resolver = SchemaResolver::new(&defs, &config);
            resolver.register_all();
            resolver.into_parts().0.into_definitions()
        };
        assert_eq!(run(), run());
    }
}
