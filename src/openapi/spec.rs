//! OpenAPI / Swagger document structs for serde deserialization.
//!
//! This module defines the subset of OpenAPI 3.x and Swagger 2.0 that the
//! generator needs: paths and operations, parameters, request bodies,
//! responses and the JSON Schema dialect used by both. Maps are `IndexMap`s
//! so declaration order survives parsing.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;

use super::error::GenerateError;

/// Root API description (OpenAPI 3.x or Swagger 2.0).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpenApiSpec {
    /// `openapi` version string (OpenAPI 3.x).
    pub openapi: Option<String>,
    /// `swagger` version string (Swagger 2.0).
    pub swagger: Option<String>,
    /// Path table in declaration order.
    #[serde(default)]
    pub paths: IndexMap<String, PathItem>,
    /// OpenAPI 3.x reusable components.
    pub components: Option<Components>,
    /// Swagger 2.0 schema definitions.
    pub definitions: Option<IndexMap<String, Schema>>,
    /// Swagger 2.0 reusable parameters.
    pub parameters: Option<IndexMap<String, Parameter>>,
    /// Swagger 2.0 reusable responses.
    pub responses: Option<IndexMap<String, Response>>,
    /// Swagger 2.0 document-wide request media types.
    pub consumes: Option<Vec<String>>,
    /// Swagger 2.0 document-wide response media types.
    pub produces: Option<Vec<String>>,
}

/// Components section containing reusable objects.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Components {
    /// Reusable schemas.
    pub schemas: Option<IndexMap<String, Schema>>,
    /// Reusable parameters.
    pub parameters: Option<IndexMap<String, Parameter>>,
    /// Reusable request bodies.
    pub request_bodies: Option<IndexMap<String, RequestBody>>,
    /// Reusable responses.
    pub responses: Option<IndexMap<String, Response>>,
}

/// Either a `$ref` object or an inline value.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RefOr<T> {
    /// `{ "$ref": "#/components/…" }`
    Ref {
        /// The reference string.
        #[serde(rename = "$ref")]
        ref_path: String,
    },
    /// An inline object.
    Item(T),
}

/// A path item containing operations for the seven recognized HTTP verbs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathItem {
    /// `GET` operation.
    pub get: Option<Operation>,
    /// `PUT` operation.
    pub put: Option<Operation>,
    /// `POST` operation.
    pub post: Option<Operation>,
    /// `DELETE` operation.
    pub delete: Option<Operation>,
    /// `OPTIONS` operation.
    pub options: Option<Operation>,
    /// `HEAD` operation.
    pub head: Option<Operation>,
    /// `PATCH` operation.
    pub patch: Option<Operation>,
    /// Path-level parameters shared by all operations.
    #[serde(default)]
    pub parameters: Vec<RefOr<Parameter>>,
}

/// An API operation (endpoint).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    /// Unique operation identifier.
    pub operation_id: Option<String>,
    /// Short summary.
    pub summary: Option<String>,
    /// Long description.
    pub description: Option<String>,
    /// Grouping tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Deprecation marker.
    #[serde(default)]
    pub deprecated: bool,
    /// Operation-level parameters.
    #[serde(default)]
    pub parameters: Vec<RefOr<Parameter>>,
    /// OpenAPI 3.x request body.
    pub request_body: Option<RefOr<RequestBody>>,
    /// Responses keyed by status code.
    #[serde(default)]
    pub responses: IndexMap<String, RefOr<Response>>,
    /// Swagger 2.0 request media types.
    pub consumes: Option<Vec<String>>,
    /// Swagger 2.0 response media types.
    pub produces: Option<Vec<String>>,
}

/// A parameter (path, query, header, cookie; Swagger 2.0 adds body and formData).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    /// Parameter name.
    pub name: String,
    /// Location (`in`).
    #[serde(rename = "in")]
    pub location: String,
    /// Whether the parameter is required.
    #[serde(default)]
    pub required: bool,
    /// Parameter description.
    pub description: Option<String>,
    /// Value schema (OpenAPI 3.x, Swagger 2.0 body parameters).
    pub schema: Option<Schema>,

    // Swagger 2.0 non-body parameters describe their type inline.
    /// Inline type.
    #[serde(rename = "type")]
    pub param_type: Option<String>,
    /// Inline format.
    pub format: Option<String>,
    /// Inline array items.
    pub items: Option<Box<Schema>>,
    /// Inline enum values.
    #[serde(rename = "enum")]
    pub enum_values: Option<Vec<EnumValue>>,
}

/// A request body definition.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestBody {
    /// Whether a body must be sent.
    #[serde(default)]
    pub required: bool,
    /// Body description.
    pub description: Option<String>,
    /// Media types in declaration order.
    #[serde(default)]
    pub content: IndexMap<String, MediaType>,
}

/// A response definition.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Response {
    /// Response description.
    pub description: Option<String>,
    /// OpenAPI 3.x media types in declaration order.
    pub content: Option<IndexMap<String, MediaType>>,
    /// Swagger 2.0 response schema.
    pub schema: Option<Schema>,
}

/// Media type content (e.g., application/json).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MediaType {
    /// Payload schema.
    pub schema: Option<Schema>,
}

/// JSON Schema definition used in OpenAPI.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    /// The type of the schema (string, number, integer, boolean, object, array).
    #[serde(rename = "type")]
    pub schema_type: Option<SchemaType>,

    /// Reference to another schema.
    #[serde(rename = "$ref")]
    pub ref_path: Option<String>,

    /// Format hint (e.g., date-time, binary).
    pub format: Option<String>,

    /// Free-form description; may carry the numeric enum label payload.
    pub description: Option<String>,

    /// Properties for object types, in declaration order.
    pub properties: Option<IndexMap<String, Schema>>,

    /// Required property names for object types.
    pub required: Option<Vec<String>>,

    /// Item schema for array types (single schema or tuple form).
    pub items: Option<Items>,

    /// OpenAPI 3.1 tuple items.
    pub prefix_items: Option<Vec<Schema>>,

    /// Enum values (can be strings, integers, floats, booleans, or null).
    #[serde(rename = "enum")]
    pub enum_values: Option<Vec<EnumValue>>,

    /// Constant value - schema matches only this exact value.
    #[serde(rename = "const")]
    pub const_value: Option<EnumValue>,

    /// Intersection type (all of these schemas combined).
    pub all_of: Option<Vec<Schema>>,

    /// Union type (exactly one of these schemas).
    pub one_of: Option<Vec<Schema>>,

    /// Union type (any of these schemas).
    pub any_of: Option<Vec<Schema>>,

    /// Additional properties for object types (for Record/dict types).
    pub additional_properties: Option<AdditionalProperties>,

    /// OpenAPI 3.0 nullable flag (3.1 uses type arrays instead).
    pub nullable: Option<bool>,

    /// Read-only property marker.
    pub read_only: Option<bool>,
}

/// Enum value can be string, integer, float, boolean, or null.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum EnumValue {
    /// String value.
    String(String),
    /// Integer value.
    Integer(i64),
    /// Non-integer number.
    Float(f64),
    /// Boolean value.
    Bool(bool),
    /// `null`.
    Null,
}

/// Schema type can be a single type or an array of types (for nullable).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SchemaType {
    /// `"type": "string"`
    Single(String),
    /// `"type": ["string", "null"]`
    Multiple(Vec<String>),
}

/// Array items: one schema, or a list of schemas for fixed tuples.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Items {
    /// Swagger-style tuple list.
    Tuple(Vec<Schema>),
    /// Item schema shared by every element.
    Single(Box<Schema>),
}

/// Additional properties can be a boolean or a schema.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    /// `true` or `false`.
    Bool(bool),
    /// Value schema.
    Schema(Box<Schema>),
}

impl OpenApiSpec {
    /// Parse an API description from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Parse an API description from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Read and parse an API description file. YAML is chosen by extension,
    /// everything else is parsed as JSON.
    pub fn load(path: &Path) -> Result<Self, GenerateError> {
        let contents = fs::read_to_string(path).map_err(|source| GenerateError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

        let parsed = if is_yaml {
            Self::from_yaml(&contents).map_err(|e| e.to_string())
        } else {
            Self::from_json(&contents).map_err(|e| e.to_string())
        };

        parsed.map_err(|message| GenerateError::Parse {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Named schema table: `components.schemas` (OpenAPI 3) or `definitions` (Swagger 2).
    pub fn schemas(&self) -> Option<&IndexMap<String, Schema>> {
        self.components
            .as_ref()
            .and_then(|c| c.schemas.as_ref())
            .or(self.definitions.as_ref())
    }

    /// True for Swagger 2.0 documents.
    pub fn is_swagger2(&self) -> bool {
        self.swagger.is_some() && self.openapi.is_none()
    }

    /// Look up a reusable parameter by `$ref`.
    pub fn parameter_by_ref(&self, ref_path: &str) -> Option<&Parameter> {
        let name = ref_name(ref_path)?;
        self.components
            .as_ref()
            .and_then(|c| c.parameters.as_ref())
            .or(self.parameters.as_ref())
            .and_then(|table| table.get(name.as_str()))
    }

    /// Look up a reusable request body by `$ref`.
    pub fn request_body_by_ref(&self, ref_path: &str) -> Option<&RequestBody> {
        let name = ref_name(ref_path)?;
        self.components
            .as_ref()
            .and_then(|c| c.request_bodies.as_ref())
            .and_then(|table| table.get(name.as_str()))
    }

    /// Look up a reusable response by `$ref`.
    pub fn response_by_ref(&self, ref_path: &str) -> Option<&Response> {
        let name = ref_name(ref_path)?;
        self.components
            .as_ref()
            .and_then(|c| c.responses.as_ref())
            .or(self.responses.as_ref())
            .and_then(|table| table.get(name.as_str()))
    }
}

impl Schema {
    /// The non-null type names declared by `type`, plus whether `null` was among them.
    pub fn declared_types(&self) -> (Vec<&str>, bool) {
        match &self.schema_type {
            Some(SchemaType::Single(t)) if t == "null" => (Vec::new(), true),
            Some(SchemaType::Single(t)) => (vec![t.as_str()], false),
            Some(SchemaType::Multiple(types)) => {
                let has_null = types.iter().any(|t| t == "null");
                let non_null = types
                    .iter()
                    .filter(|t| *t != "null")
                    .map(String::as_str)
                    .collect();
                (non_null, has_null)
            }
            None => (Vec::new(), false),
        }
    }
}

/// Final segment of a JSON-pointer reference, with `~1`/`~0` unescaped.
///
/// `#/components/schemas/User` and `#/definitions/User` both yield `User`.
pub fn ref_name(ref_path: &str) -> Option<String> {
    let last = ref_path.rsplit('/').next()?;
    if last.is_empty() || last == "#" {
        return None;
    }
    Some(last.replace("~1", "/").replace("~0", "~"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_paths_keep_declaration_order() {
        let spec = OpenApiSpec::from_json(
            r#"{"openapi":"3.0.0","paths":{"/z":{},"/a":{},"/m":{}}}"#,
        )
        .unwrap();
        let keys: Vec<_> = spec.paths.keys().map(String::as_str).collect();
        assert_eq!(keys, ["/z", "/a", "/m"]);
    }

    #[test]
    fn test_ref_or_distinguishes_references() {
        let op: Operation = serde_json::from_str(
            r##"{"parameters":[{"$ref":"#/components/parameters/Limit"},{"name":"q","in":"query"}]}"##,
        )
        .unwrap();
        assert!(matches!(&op.parameters[0], RefOr::Ref { ref_path } if ref_path.ends_with("Limit")));
        assert!(matches!(&op.parameters[1], RefOr::Item(p) if p.name == "q"));
    }

    #[test]
    fn test_items_tuple_and_single() {
        let tuple: Schema =
            serde_json::from_str(r#"{"type":"array","items":[{"type":"string"},{"type":"integer"}]}"#)
                .unwrap();
        assert!(matches!(tuple.items, Some(Items::Tuple(ref v)) if v.len() == 2));

        let single: Schema =
            serde_json::from_str(r#"{"type":"array","items":{"type":"string"}}"#).unwrap();
        assert!(matches!(single.items, Some(Items::Single(_))));
    }

    #[test]
    fn test_declared_types_with_null() {
        let schema: Schema = serde_json::from_str(r#"{"type":["string","null"]}"#).unwrap();
        assert_eq!(schema.declared_types(), (vec!["string"], true));
    }

    #[test]
    fn test_ref_name() {
        assert_eq!(ref_name("#/components/schemas/User").as_deref(), Some("User"));
        assert_eq!(ref_name("#/definitions/a~1b").as_deref(), Some("a/b"));
        assert_eq!(ref_name("#/"), None);
    }

    #[test]
    fn test_schemas_fall_back_to_definitions() {
        let spec = OpenApiSpec::from_json(
            r#"{"swagger":"2.0","paths":{},"definitions":{"Pet":{"type":"object"}}}"#,
        )
        .unwrap();
        assert!(spec.is_swagger2());
        assert!(spec.schemas().unwrap().contains_key("Pet"));
    }

    #[test]
    fn test_load_yaml_by_extension() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(b"openapi: 3.0.0\npaths:\n  /pets:\n    get:\n      operationId: listPets\n")
            .unwrap();
        let spec = OpenApiSpec::load(file.path()).unwrap();
        assert_eq!(spec.openapi.as_deref(), Some("3.0.0"));
        assert!(spec.paths["/pets"].get.is_some());
    }

    #[test]
    fn test_load_reports_parse_error_with_path() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(b"{ not json").unwrap();
        let err = OpenApiSpec::load(file.path()).unwrap_err();
        assert!(matches!(err, GenerateError::Parse { .. }));
        assert!(err.to_string().contains(&file.path().display().to_string()));
    }

    #[test]
    fn test_load_missing_file() {
        let err = OpenApiSpec::load(Path::new("/nonexistent/spec.json")).unwrap_err();
        assert!(matches!(err, GenerateError::Read { .. }));
    }
}
