//! Content-type classification.
//!
//! Maps a media type (and the schema declared for it) to the handling mode
//! the generated client uses: parsed JSON, text, or a binary body.

use std::collections::HashSet;

use indexmap::IndexMap;

use super::api::ResponseDescriptor;
use super::schema::{SchemaKind, SchemaNode};
use crate::openapi::config::{GeneratorConfig, ResponseKind};

/// Status codes whose binary content switches the request to a binary response type.
pub const SUCCESS_STATUSES: [&str; 4] = ["200", "201", "202", "204"];

/// Media type with its parameters (`; charset=...`) removed, lower-cased.
pub fn normalize_media_type(media_type: &str) -> String {
    media_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Whether a media type is JSON-family (`application/json`, `application/problem+json`, ...).
pub fn is_json_media_type(media_type: &str) -> bool {
    normalize_media_type(media_type).contains("json")
}

/// Classifies media types against the configured overrides and exclusions.
#[derive(Debug, Clone, Copy)]
pub struct ContentClassifier<'a> {
    config: &'a GeneratorConfig,
    definitions: Option<&'a IndexMap<String, SchemaNode>>,
}

impl<'a> ContentClassifier<'a> {
    /// Create a classifier for one run.
    pub fn new(config: &'a GeneratorConfig) -> Self {
        Self {
            config,
            definitions: None,
        }
    }

    /// Follow `$ref` schemas through named definitions before reading their format.
    pub fn with_definitions(mut self, definitions: &'a IndexMap<String, SchemaNode>) -> Self {
        self.definitions = Some(definitions);
        self
    }

    /// Classify a single media type. First match wins: configured override,
    /// binary schema format, then inference from the media type itself.
    pub fn classify(&self, media_type: &str, schema: Option<&SchemaNode>) -> ResponseKind {
        if let Some(kind) = self.override_for(media_type) {
            return kind;
        }

        if schema
            .map(|schema| self.dereference(schema))
            .and_then(SchemaNode::format)
            .is_some_and(|format| format == "binary" || format == "byte")
        {
            return ResponseKind::Blob;
        }

        self.infer(media_type)
    }

    /// Classify a content map by its first media type; an empty map is JSON.
    pub fn classify_content(&self, content: &IndexMap<String, Option<SchemaNode>>) -> ResponseKind {
        content
            .first()
            .map_or(ResponseKind::Json, |(media_type, schema)| {
                self.classify(media_type, schema.as_ref())
            })
    }

    /// True if any success response has at least one binary media type.
    pub fn is_binary_operation(&self, responses: &[ResponseDescriptor]) -> bool {
        responses
            .iter()
            .filter(|response| SUCCESS_STATUSES.contains(&response.status.as_str()))
            .flat_map(|response| response.content.iter())
            .any(|(media_type, schema)| self.classify(media_type, schema.as_ref()).is_binary())
    }

    /// Target of a reference chain; the node itself when it cannot be followed.
    fn dereference<'n>(&self, node: &'n SchemaNode) -> &'n SchemaNode
    where
        'a: 'n,
    {
        let Some(definitions) = self.definitions else {
            return node;
        };
        let mut current = node;
        let mut seen = HashSet::new();
        while let SchemaKind::Reference(target) = &current.kind {
            if !seen.insert(target.as_str()) {
                return node;
            }
            match definitions.get(target) {
                Some(next) => current = next,
                None => return node,
            }
        }
        current
    }

    fn override_for(&self, media_type: &str) -> Option<ResponseKind> {
        let mapping = &self.config.response_type_mapping;
        if let Some(kind) = mapping.get(media_type) {
            return Some(*kind);
        }
        let normalized = normalize_media_type(media_type);
        mapping
            .iter()
            .find(|(key, _)| normalize_media_type(key) == normalized)
            .map(|(_, kind)| *kind)
    }

    fn infer(&self, media_type: &str) -> ResponseKind {
        let normalized = normalize_media_type(media_type);

        if normalized.contains("json") {
            return ResponseKind::Json;
        }
        if normalized.starts_with("text/") {
            let excluded = self
                .config
                .text_exclusions
                .iter()
                .any(|excluded| normalize_media_type(excluded) == normalized);
            if !excluded {
                return ResponseKind::Text;
            }
        }
        if normalized.contains("xml") {
            return ResponseKind::Text;
        }
        if normalized == "multipart/form-data" {
            return ResponseKind::Json;
        }
        ResponseKind::Blob
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::openapi::ir::schema::PrimitiveKind;

    fn response(status: &str, media_type: &str) -> ResponseDescriptor {
        let mut content = IndexMap::new();
        content.insert(media_type.to_string(), None);
        ResponseDescriptor {
            status: status.to_string(),
            description: None,
            content,
        }
    }

    #[test]
    fn test_generic_inference() {
        let config = GeneratorConfig::default();
        let classifier = ContentClassifier::new(&config);

        assert_eq!(classifier.classify("application/json", None), ResponseKind::Json);
        assert_eq!(
            classifier.classify("application/problem+json; charset=utf-8", None),
            ResponseKind::Json
        );
        assert_eq!(classifier.classify("text/plain", None), ResponseKind::Text);
        assert_eq!(classifier.classify("application/xml", None), ResponseKind::Text);
        assert_eq!(classifier.classify("application/pdf", None), ResponseKind::Blob);
        assert_eq!(classifier.classify("image/png", None), ResponseKind::Blob);
        assert_eq!(classifier.classify("multipart/mixed", None), ResponseKind::Blob);
        assert_eq!(classifier.classify("multipart/form-data", None), ResponseKind::Json);
    }

    #[test]
    fn test_text_exclusions_are_binary() {
        let config = GeneratorConfig::default();
        let classifier = ContentClassifier::new(&config);
        assert_eq!(classifier.classify("text/rtf", None), ResponseKind::Blob);
        assert_eq!(classifier.classify("text/csv", None), ResponseKind::Text);
    }

    #[test]
    fn test_binary_format_beats_inference() {
        let config = GeneratorConfig::default();
        let classifier = ContentClassifier::new(&config);
        let binary = SchemaNode::primitive(PrimitiveKind::String, Some("binary"));
        let byte = SchemaNode::primitive(PrimitiveKind::String, Some("byte"));
        assert_eq!(classifier.classify("application/json", Some(&binary)), ResponseKind::Blob);
        assert_eq!(classifier.classify("text/plain", Some(&byte)), ResponseKind::Blob);
    }

    #[test]
    fn test_binary_format_behind_reference() {
        let config = GeneratorConfig::default();
        let mut definitions = IndexMap::new();
        definitions.insert(
            "File".to_string(),
            SchemaNode::primitive(PrimitiveKind::String, Some("binary")),
        );
        definitions.insert("Upload".to_string(), SchemaNode::reference("File"));
        let to_file = SchemaNode::reference("Upload");

        let plain = ContentClassifier::new(&config);
        assert_eq!(plain.classify("application/json", Some(&to_file)), ResponseKind::Json);

        let classifier = ContentClassifier::new(&config).with_definitions(&definitions);
        assert_eq!(classifier.classify("application/json", Some(&to_file)), ResponseKind::Blob);
        assert!(classifier.is_binary_operation(&[ResponseDescriptor {
            status: "200".to_string(),
            description: None,
            content: IndexMap::from([("application/json".to_string(), Some(to_file.clone()))]),
        }]));

        let dangling = SchemaNode::reference("Missing");
        assert_eq!(classifier.classify("application/json", Some(&dangling)), ResponseKind::Json);
    }

    #[test]
    fn test_override_beats_everything() {
        let mut config = GeneratorConfig::default();
        config
            .response_type_mapping
            .insert("application/octet-stream".into(), ResponseKind::ArrayBuffer);
        config
            .response_type_mapping
            .insert("Text/CSV".into(), ResponseKind::Blob);
        let classifier = ContentClassifier::new(&config);
        let binary = SchemaNode::primitive(PrimitiveKind::String, Some("binary"));

        assert_eq!(
            classifier.classify("application/octet-stream", Some(&binary)),
            ResponseKind::ArrayBuffer
        );
        assert_eq!(classifier.classify("text/csv; charset=utf-8", None), ResponseKind::Blob);
    }

    #[test]
    fn test_classify_content_uses_first_media_type() {
        let config = GeneratorConfig::default();
        let classifier = ContentClassifier::new(&config);
        let mut content = IndexMap::new();
        content.insert("text/plain".to_string(), None);
        content.insert("application/json".to_string(), None);
        assert_eq!(classifier.classify_content(&content), ResponseKind::Text);
        assert_eq!(classifier.classify_content(&IndexMap::new()), ResponseKind::Json);
    }

    #[test]
    fn test_binary_operation_predicate() {
        let config = GeneratorConfig::default();
        let classifier = ContentClassifier::new(&config);

        assert!(classifier.is_binary_operation(&[response("200", "application/pdf")]));
        assert!(classifier.is_binary_operation(&[
            response("200", "application/json"),
            response("202", "application/zip"),
        ]));
        assert!(!classifier.is_binary_operation(&[response("200", "application/json")]));
        assert!(!classifier.is_binary_operation(&[response("404", "application/pdf")]));
    }
}
