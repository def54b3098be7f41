//! Generator configuration.
//!
//! The configuration is received once per run and never consulted through
//! globals: behavior hooks (method-name transform, content-type overrides)
//! travel as plain values inside [`GeneratorConfig`].

use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;
use regex::Regex;
use serde::Deserialize;

use super::error::GenerateError;

/// How numeric enums are represented.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnumStyle {
    /// A TypeScript `enum` declaration with labelled members.
    #[default]
    Enum,
    /// A closed literal union of the values.
    Union,
}

/// Representation of `date` / `date-time` strings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum DateType {
    /// Keep dates as `string`.
    #[default]
    #[serde(rename = "string")]
    String,
    /// Map dates to the `Date` class.
    #[serde(rename = "Date")]
    Date,
}

/// What a nullable schema appends to its type expression.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NullableStyle {
    /// `T | null`
    #[default]
    Null,
    /// `T | undefined`
    Undefined,
    /// `T | null | undefined`
    Both,
}

/// Policy for objects declaring both `properties` and `additionalProperties`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AdditionalPropertiesPolicy {
    /// Only declared properties are typed.
    #[default]
    Ignore,
    /// Declared properties are intersected with a keyed map of the extra values.
    IndexSignature,
}

/// Angular `responseType` values a media type can be mapped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseKind {
    /// Parsed JSON body.
    Json,
    /// Raw text body.
    Text,
    /// Binary body as a `Blob`.
    Blob,
    /// Binary body as an `ArrayBuffer`.
    ArrayBuffer,
}

impl ResponseKind {
    /// Binary kinds need an explicit response-type hint on the request.
    pub fn is_binary(self) -> bool {
        matches!(self, Self::Blob | Self::ArrayBuffer)
    }

    /// The literal passed as Angular's `responseType`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Text => "text",
            Self::Blob => "blob",
            Self::ArrayBuffer => "arraybuffer",
        }
    }
}

/// Strategy turning an operation id into a method name.
#[derive(Clone)]
pub struct MethodNameTransform(Arc<dyn Fn(&str) -> String + Send + Sync>);

impl MethodNameTransform {
    /// Wrap a naming function.
    pub fn new(f: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Apply the transform to an operation id.
    pub fn apply(&self, operation_id: &str) -> String {
        (self.0)(operation_id)
    }
}

impl fmt::Debug for MethodNameTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MethodNameTransform(..)")
    }
}

const DEFAULT_HEADER: &str = "/**\n * Generated by ngen. Do not edit by hand.\n */\n";

/// Static configuration for one generation run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct GeneratorConfig {
    /// How enum schemas become TypeScript declarations.
    pub enum_style: EnumStyle,
    /// Label numeric enum members from the JSON payload in the schema description.
    pub enum_from_description: bool,
    /// TypeScript type of `date` and `date-time` strings.
    pub date_type: DateType,
    /// How nullability is rendered on properties.
    pub nullable_style: NullableStyle,
    /// Index signature policy for objects without declared additional properties.
    pub additional_properties: AdditionalPropertiesPolicy,
    /// Separator in the `^(\w+?)<separator>` operation-id prefix pattern.
    pub operation_id_separator: String,
    /// Per-content-type response handling overrides.
    pub response_type_mapping: IndexMap<String, ResponseKind>,
    /// `text/*` media types that are not treated as text.
    pub text_exclusions: Vec<String>,
    /// Group used when no tag, operation-id prefix or path segment applies.
    pub default_group: String,
    /// Name of the base-path injection token.
    pub base_path_token: String,
    /// Banner written at the top of every generated file.
    pub header_comment: String,
    /// Replaces the derived method name with one computed from the operation id.
    #[serde(skip)]
    pub method_name_transform: Option<MethodNameTransform>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            enum_style: EnumStyle::default(),
            enum_from_description: false,
            date_type: DateType::default(),
            nullable_style: NullableStyle::default(),
            additional_properties: AdditionalPropertiesPolicy::default(),
            operation_id_separator: "_".to_string(),
            response_type_mapping: IndexMap::new(),
            text_exclusions: vec!["text/rtf".to_string(), "text/cache-manifest".to_string()],
            default_group: "Default".to_string(),
            base_path_token: "BASE_PATH".to_string(),
            header_comment: DEFAULT_HEADER.to_string(),
            method_name_transform: None,
        }
    }
}

impl GeneratorConfig {
    /// Load a configuration file. `.toml` files use TOML, everything else JSON.
    pub fn load(path: &Path) -> Result<Self, GenerateError> {
        let config_error = |message: String| GenerateError::Config {
            path: path.to_path_buf(),
            message,
        };

        let contents = fs::read_to_string(path).map_err(|e| config_error(e.to_string()))?;
        let is_toml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

        if is_toml {
            toml::from_str(&contents).map_err(|e| config_error(e.to_string()))
        } else {
            serde_json::from_str(&contents).map_err(|e| config_error(e.to_string()))
        }
    }

    /// Install a method-name transform.
    pub fn with_method_name_transform(
        mut self,
        f: impl Fn(&str) -> String + Send + Sync + 'static,
    ) -> Self {
        self.method_name_transform = Some(MethodNameTransform::new(f));
        self
    }

    /// Compile the operation-id prefix pattern: a leading identifier followed by the separator.
    pub fn operation_id_pattern(&self) -> Result<Regex, GenerateError> {
        let pattern = format!(r"^(\w+?){}", regex::escape(&self.operation_id_separator));
        Regex::new(&pattern).map_err(|source| GenerateError::InvalidSeparator {
            separator: self.operation_id_separator.clone(),
            source,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = GeneratorConfig::default();
        assert_eq!(config.enum_style, EnumStyle::Enum);
        assert_eq!(config.nullable_style, NullableStyle::Null);
        assert_eq!(config.operation_id_separator, "_");
        assert_eq!(config.text_exclusions, ["text/rtf", "text/cache-manifest"]);
        assert!(config.method_name_transform.is_none());
    }

    #[test]
    fn test_load_toml_keeps_defaults_for_missing_keys() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(
            br#"
enum_style = "union"
date_type = "Date"
operation_id_separator = "Controller_"

[response_type_mapping]
"text/csv" = "text"
"application/zip" = "blob"
"#,
        )
        .unwrap();

        let config = GeneratorConfig::load(file.path()).unwrap();
        assert_eq!(config.enum_style, EnumStyle::Union);
        assert_eq!(config.date_type, DateType::Date);
        assert_eq!(config.operation_id_separator, "Controller_");
        assert_eq!(config.response_type_mapping["text/csv"], ResponseKind::Text);
        assert_eq!(config.default_group, "Default");
    }

    #[test]
    fn test_load_json_rejects_unknown_kind() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(br#"{"response_type_mapping": {"text/csv": "csv"}}"#)
            .unwrap();
        let err = GeneratorConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, GenerateError::Config { .. }));
    }

    #[test]
    fn test_operation_id_pattern_takes_shortest_prefix() {
        let pattern = GeneratorConfig::default().operation_id_pattern().unwrap();
        let caps = pattern.captures("Invoice_create_item").unwrap();
        assert_eq!(&caps[1], "Invoice");
        assert!(pattern.captures("createInvoice").is_none());
        assert_eq!(pattern.replace("UserController_get_by_id", ""), "get_by_id");
    }

    #[test]
    fn test_operation_id_pattern_escapes_separator() {
        let config = GeneratorConfig {
            operation_id_separator: ".".to_string(),
            ..GeneratorConfig::default()
        };
        let pattern = config.operation_id_pattern().unwrap();
        assert!(pattern.captures("Users.list").is_some());
        assert!(pattern.captures("Users_list").is_none());
    }

    #[test]
    fn test_method_name_transform_is_applied() {
        let config =
            GeneratorConfig::default().with_method_name_transform(|id| format!("do_{id}"));
        let transform = config.method_name_transform.unwrap();
        assert_eq!(transform.apply("list"), "do_list");
    }
}
