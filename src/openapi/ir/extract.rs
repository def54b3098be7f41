//! Operation extraction and grouping.
//!
//! Walks the path table in declaration order and builds one
//! [`OperationDescriptor`] per (path, verb): path-level and operation-level
//! parameters are merged, component references are followed, and the
//! Swagger 2.0 `body`/`formData` parameter forms are folded into a request
//! body. Operations are then bundled into named groups.

use indexmap::IndexMap;
use regex::Regex;
use tracing::debug;

use super::api::{
    ContentMap, GroupDescriptor, HttpMethod, OperationDescriptor, ParamLocation,
    ParameterDescriptor, RequestBodyDescriptor, ResponseDescriptor,
};
use super::schema::{Additional, ObjectSchema, SchemaKind, SchemaNode};
use super::utils::pascal_case;
use crate::openapi::config::GeneratorConfig;
use crate::openapi::error::Diagnostics;
use crate::openapi::spec::{
    Items, MediaType, OpenApiSpec, Operation, Parameter, PathItem, RefOr, RequestBody, Response,
    Schema, SchemaType,
};

const DEFAULT_MEDIA_TYPE: &str = "application/json";
const MULTIPART_FORM_DATA: &str = "multipart/form-data";

/// Operations of a path item in extraction order.
fn operations_of(item: &PathItem) -> [(HttpMethod, Option<&Operation>); 7] {
    [
        (HttpMethod::Get, item.get.as_ref()),
        (HttpMethod::Post, item.post.as_ref()),
        (HttpMethod::Put, item.put.as_ref()),
        (HttpMethod::Patch, item.patch.as_ref()),
        (HttpMethod::Delete, item.delete.as_ref()),
        (HttpMethod::Options, item.options.as_ref()),
        (HttpMethod::Head, item.head.as_ref()),
    ]
}

/// Builds operation descriptors from a parsed document.
#[derive(Debug)]
pub struct OperationExtractor<'a> {
    spec: &'a OpenApiSpec,
    diagnostics: Diagnostics,
}

impl<'a> OperationExtractor<'a> {
    /// Create an extractor for one document.
    pub fn new(spec: &'a OpenApiSpec) -> Self {
        Self {
            spec,
            diagnostics: Diagnostics::default(),
        }
    }

    /// Warnings recorded during extraction.
    pub fn into_diagnostics(self) -> Diagnostics {
        self.diagnostics
    }

    /// Every operation of the document, in path order then verb order.
    pub fn extract(&mut self) -> Vec<OperationDescriptor> {
        let spec = self.spec;
        let mut operations = Vec::new();
        for (path, item) in &spec.paths {
            for (method, op) in operations_of(item) {
                if let Some(op) = op {
                    operations.push(self.extract_operation(path, method, item, op));
                }
            }
        }
        debug!(count = operations.len(), "Extracted operations.");
        operations
    }

    fn extract_operation(
        &mut self,
        path: &str,
        method: HttpMethod,
        item: &'a PathItem,
        op: &'a Operation,
    ) -> OperationDescriptor {
        let label = format!("{method} {path}");
        let merged = self.merge_parameters(&label, &item.parameters, &op.parameters);

        let mut parameters = Vec::new();
        let mut body_param = None;
        let mut form_params = Vec::new();
        for param in merged {
            match param.location.as_str() {
                "body" => body_param = Some(param),
                "formData" => form_params.push(param),
                location => match ParamLocation::parse(location) {
                    Some(location) => parameters.push(parameter_descriptor(param, location)),
                    None => self.diagnostics.warn(
                        format!("{label} parameter '{}'", param.name),
                        format!("unknown parameter location '{location}'; parameter skipped"),
                    ),
                },
            }
        }

        let request_body = match &op.request_body {
            Some(body) => self.request_body(&label, body),
            None => match body_param {
                Some(param) => Some(self.swagger_body(op, param)),
                None if !form_params.is_empty() => Some(swagger_form_body(&form_params)),
                None => None,
            },
        };

        let responses = op
            .responses
            .iter()
            .filter_map(|(status, response)| self.response(&label, op, status, response))
            .collect();

        OperationDescriptor {
            path: path.to_string(),
            method,
            operation_id: op.operation_id.clone(),
            summary: op.summary.clone(),
            description: op.description.clone(),
            deprecated: op.deprecated,
            tags: op.tags.clone(),
            parameters,
            request_body,
            responses,
        }
    }

    /// Path-level parameters first; an operation-level entry with the same
    /// (name, location) replaces the path-level one in place.
    fn merge_parameters(
        &mut self,
        label: &str,
        path_level: &'a [RefOr<Parameter>],
        op_level: &'a [RefOr<Parameter>],
    ) -> Vec<&'a Parameter> {
        let mut merged: Vec<&'a Parameter> = Vec::new();
        for param in path_level {
            if let Some(param) = self.parameter(label, param) {
                merged.push(param);
            }
        }
        for param in op_level {
            let Some(param) = self.parameter(label, param) else {
                continue;
            };
            let existing = merged
                .iter()
                .position(|p| p.name == param.name && p.location == param.location);
            match existing {
                Some(index) => {
                    if parameter_schema(merged[index]) != parameter_schema(param) {
                        self.diagnostics.warn(
                            format!("{label} parameter '{}'", param.name),
                            format!(
                                "operation-level declaration overrides the path-level '{}' parameter with a different schema",
                                param.location
                            ),
                        );
                    }
                    merged[index] = param;
                }
                None => merged.push(param),
            }
        }
        merged
    }

    fn parameter(&mut self, label: &str, param: &'a RefOr<Parameter>) -> Option<&'a Parameter> {
        match param {
            RefOr::Item(param) => Some(param),
            RefOr::Ref { ref_path } => {
                let found = self.spec.parameter_by_ref(ref_path);
                if found.is_none() {
                    self.diagnostics.warn(
                        label,
                        format!("unresolved parameter reference '{ref_path}'; parameter skipped"),
                    );
                }
                found
            }
        }
    }

    fn request_body(
        &mut self,
        label: &str,
        body: &'a RefOr<RequestBody>,
    ) -> Option<RequestBodyDescriptor> {
        let body = match body {
            RefOr::Item(body) => body,
            RefOr::Ref { ref_path } => {
                let Some(body) = self.spec.request_body_by_ref(ref_path) else {
                    self.diagnostics.warn(
                        label,
                        format!("unresolved request body reference '{ref_path}'; body skipped"),
                    );
                    return None;
                };
                body
            }
        };
        Some(RequestBodyDescriptor {
            content: content_map(&body.content),
            required: body.required,
            description: body.description.clone(),
        })
    }

    /// Swagger 2.0 `in: body` parameter.
    fn swagger_body(&self, op: &Operation, param: &Parameter) -> RequestBodyDescriptor {
        let schema = param.schema.as_ref().map(SchemaNode::from_schema);
        let mut media_types: Vec<&str> = op
            .consumes
            .as_ref()
            .or(self.spec.consumes.as_ref())
            .into_iter()
            .flatten()
            .map(String::as_str)
            .filter(|m| *m != MULTIPART_FORM_DATA && *m != "application/x-www-form-urlencoded")
            .collect();
        if media_types.is_empty() {
            media_types.push(DEFAULT_MEDIA_TYPE);
        }
        RequestBodyDescriptor {
            content: media_types
                .into_iter()
                .map(|m| (m.to_string(), schema.clone()))
                .collect(),
            required: param.required,
            description: param.description.clone(),
        }
    }

    fn response(
        &mut self,
        label: &str,
        op: &Operation,
        status: &str,
        response: &'a RefOr<Response>,
    ) -> Option<ResponseDescriptor> {
        let response = match response {
            RefOr::Item(response) => response,
            RefOr::Ref { ref_path } => {
                let Some(response) = self.spec.response_by_ref(ref_path) else {
                    self.diagnostics.warn(
                        label,
                        format!("unresolved response reference '{ref_path}' for status {status}; response skipped"),
                    );
                    return None;
                };
                response
            }
        };

        let content = match (&response.content, &response.schema) {
            (Some(content), _) => content_map(content),
            (None, Some(schema)) => {
                let node = SchemaNode::from_schema(schema);
                let produces: Vec<&str> = op
                    .produces
                    .as_ref()
                    .or(self.spec.produces.as_ref())
                    .into_iter()
                    .flatten()
                    .map(String::as_str)
                    .collect();
                if produces.is_empty() {
                    IndexMap::from([(DEFAULT_MEDIA_TYPE.to_string(), Some(node))])
                } else {
                    produces
                        .into_iter()
                        .map(|m| (m.to_string(), Some(node.clone())))
                        .collect()
                }
            }
            (None, None) => IndexMap::new(),
        };

        Some(ResponseDescriptor {
            status: status.to_string(),
            description: response.description.clone(),
            content,
        })
    }
}

fn content_map(content: &IndexMap<String, MediaType>) -> ContentMap {
    content
        .iter()
        .map(|(media_type, media)| {
            (
                media_type.clone(),
                media.schema.as_ref().map(SchemaNode::from_schema),
            )
        })
        .collect()
}

/// Schema of a parameter: the `schema` object, or the Swagger 2.0 inline
/// `type`/`format`/`items`/`enum` keywords.
fn parameter_schema(param: &Parameter) -> SchemaNode {
    if let Some(schema) = &param.schema {
        return SchemaNode::from_schema(schema);
    }
    if param.param_type.is_none() && param.enum_values.is_none() {
        return SchemaNode::new(SchemaKind::Any);
    }
    let inline = Schema {
        schema_type: param.param_type.clone().map(SchemaType::Single),
        format: param.format.clone(),
        items: param.items.clone().map(Items::Single),
        enum_values: param.enum_values.clone(),
        ..Schema::default()
    };
    SchemaNode::from_schema(&inline)
}

fn parameter_descriptor(param: &Parameter, location: ParamLocation) -> ParameterDescriptor {
    ParameterDescriptor {
        name: param.name.clone(),
        location,
        required: param.required || location == ParamLocation::Path,
        schema: parameter_schema(param),
        description: param.description.clone(),
    }
}

/// Swagger 2.0 `in: formData` parameters as one multipart object body.
fn swagger_form_body(params: &[&Parameter]) -> RequestBodyDescriptor {
    let mut properties = IndexMap::new();
    let mut required = Vec::new();
    for param in params {
        let mut node = parameter_schema(param);
        node.description.clone_from(&param.description);
        properties.insert(param.name.clone(), node);
        if param.required {
            required.push(param.name.clone());
        }
    }
    let schema = SchemaNode::new(SchemaKind::Object(ObjectSchema {
        properties,
        required,
        additional: Additional::Unspecified,
    }));
    RequestBodyDescriptor {
        content: IndexMap::from([(MULTIPART_FORM_DATA.to_string(), Some(schema))]),
        required: params.iter().any(|p| p.required),
        description: None,
    }
}

/// Group an operation belongs to. First match wins: first tag, operation-id
/// prefix, second non-parameter path segment, configured default.
pub fn group_name(op: &OperationDescriptor, config: &GeneratorConfig, pattern: &Regex) -> String {
    let raw = op
        .tags
        .first()
        .filter(|tag| !tag.is_empty())
        .cloned()
        .or_else(|| {
            op.operation_id
                .as_deref()
                .and_then(|id| pattern.captures(id))
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string())
        })
        .or_else(|| {
            op.path
                .split('/')
                .filter(|segment| !segment.is_empty() && !segment.starts_with('{'))
                .nth(1)
                .map(str::to_string)
        })
        .unwrap_or_else(|| config.default_group.clone());
    pascal_case(&raw)
}

/// Bundle operations into groups; groups and their members keep first-seen order.
pub fn group_operations(
    operations: Vec<OperationDescriptor>,
    config: &GeneratorConfig,
    pattern: &Regex,
) -> Vec<GroupDescriptor> {
    let mut groups: IndexMap<String, Vec<OperationDescriptor>> = IndexMap::new();
    for op in operations {
        let name = group_name(&op, config, pattern);
        debug!(operation = %op.label(), group = %name, "Grouped operation.");
        groups.entry(name).or_default().push(op);
    }
    groups
        .into_iter()
        .map(|(name, operations)| GroupDescriptor { name, operations })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::openapi::ir::schema::PrimitiveKind;

    fn extract(json: &str) -> (Vec<OperationDescriptor>, Diagnostics) {
        let spec = OpenApiSpec::from_json(json).unwrap();
        let mut extractor = OperationExtractor::new(&spec);
        let ops = extractor.extract();
        (ops, extractor.into_diagnostics())
    }

    fn op(path: &str, id: Option<&str>, tags: &[&str]) -> OperationDescriptor {
        OperationDescriptor {
            path: path.into(),
            method: HttpMethod::Get,
            operation_id: id.map(str::to_string),
            summary: None,
            description: None,
            deprecated: false,
            tags: tags.iter().map(|t| (*t).to_string()).collect(),
            parameters: Vec::new(),
            request_body: None,
            responses: Vec::new(),
        }
    }

    #[test]
    fn test_extraction_order() {
        let (ops, _) = extract(
            r#"{"openapi":"3.0.0","paths":{
                "/b":{"delete":{},"get":{}},
                "/a":{"post":{}}
            }}"#,
        );
        let labels: Vec<_> = ops.iter().map(OperationDescriptor::label).collect();
        assert_eq!(labels, ["GET /b", "DELETE /b", "POST /a"]);
    }

    #[test]
    fn test_operation_parameter_replaces_path_parameter_in_place() {
        let (ops, diagnostics) = extract(
            r#"{"openapi":"3.0.0","paths":{"/items/{id}":{
                "parameters":[
                    {"name":"id","in":"path","schema":{"type":"string"}},
                    {"name":"verbose","in":"query","schema":{"type":"boolean"}}
                ],
                "get":{"parameters":[
                    {"name":"id","in":"path","required":true,"schema":{"type":"integer"}},
                    {"name":"id","in":"query","schema":{"type":"string"}}
                ]}
            }}}"#,
        );
        let params = &ops[0].parameters;
        let names: Vec<_> = params.iter().map(|p| (p.name.as_str(), p.location)).collect();
        assert_eq!(
            names,
            [
                ("id", ParamLocation::Path),
                ("verbose", ParamLocation::Query),
                ("id", ParamLocation::Query),
            ]
        );
        assert_eq!(params[0].schema, SchemaNode::primitive(PrimitiveKind::Integer, None));
        assert_eq!(diagnostics.warnings().len(), 1);
    }

    #[test]
    fn test_path_parameters_are_required() {
        let (ops, _) = extract(
            r#"{"openapi":"3.0.0","paths":{"/u/{id}":{"get":{"parameters":[{"name":"id","in":"path","schema":{"type":"string"}}]}}}}"#,
        );
        assert!(ops[0].parameters[0].required);
    }

    #[test]
    fn test_component_references_are_followed() {
        let (ops, diagnostics) = extract(
            r##"{"openapi":"3.0.0",
                "components":{
                    "parameters":{"Limit":{"name":"limit","in":"query","schema":{"type":"integer"}}},
                    "requestBodies":{"Note":{"required":true,"content":{"application/json":{"schema":{"type":"string"}}}}},
                    "responses":{"Ok":{"description":"ok","content":{"text/plain":{}}}}
                },
                "paths":{"/notes":{"post":{
                    "parameters":[{"$ref":"#/components/parameters/Limit"},{"$ref":"#/components/parameters/Missing"}],
                    "requestBody":{"$ref":"#/components/requestBodies/Note"},
                    "responses":{"200":{"$ref":"#/components/responses/Ok"}}
                }}}}"##,
        );
        let op = &ops[0];
        assert_eq!(op.parameters[0].name, "limit");
        assert!(op.request_body.as_ref().unwrap().required);
        assert!(op.response("200").unwrap().content.contains_key("text/plain"));
        assert_eq!(diagnostics.warnings().len(), 1);
    }

    #[test]
    fn test_swagger2_body_form_and_response_schema() {
        let (ops, _) = extract(
            r##"{"swagger":"2.0","produces":["application/json"],"paths":{
                "/pets":{"post":{
                    "consumes":["application/json"],
                    "parameters":[{"name":"pet","in":"body","required":true,"schema":{"$ref":"#/definitions/Pet"}}],
                    "responses":{"200":{"description":"ok","schema":{"$ref":"#/definitions/Pet"}}}
                }},
                "/pets/{id}/photo":{"post":{
                    "parameters":[
                        {"name":"id","in":"path","type":"integer"},
                        {"name":"photo","in":"formData","type":"file","required":true},
                        {"name":"note","in":"formData","type":"string"}
                    ]
                }}
            }}"##,
        );

        let body = ops[0].request_body.as_ref().unwrap();
        assert_eq!(body.content.keys().collect::<Vec<_>>(), ["application/json"]);
        assert_eq!(body.content[0], Some(SchemaNode::reference("Pet")));
        assert!(ops[0].response("200").unwrap().content.contains_key("application/json"));

        let form = ops[1].request_body.as_ref().unwrap();
        let Some(SchemaKind::Object(object)) =
            form.content[MULTIPART_FORM_DATA].as_ref().map(|n| &n.kind)
        else {
            unreachable!("formData should become an object body");
        };
        assert!(object.properties["photo"].is_binary_string());
        assert!(object.is_required("photo"));
        assert!(!object.is_required("note"));
        assert_eq!(ops[1].parameters[0].schema, SchemaNode::primitive(PrimitiveKind::Integer, None));
    }

    #[test]
    fn test_grouping_precedence() {
        let config = GeneratorConfig::default();
        let pattern = config.operation_id_pattern().unwrap();

        assert_eq!(group_name(&op("/x", Some("Invoice_create"), &["Billing"]), &config, &pattern), "Billing");
        assert_eq!(group_name(&op("/x", Some("Invoice_create"), &[]), &config, &pattern), "Invoice");
        assert_eq!(group_name(&op("/api/user-accounts/{id}", Some("list"), &[]), &config, &pattern), "UserAccounts");
        assert_eq!(group_name(&op("/users/{id}", None, &[]), &config, &pattern), "Default");
    }

    #[test]
    fn test_groups_keep_first_seen_order() {
        let config = GeneratorConfig::default();
        let pattern = config.operation_id_pattern().unwrap();
        let groups = group_operations(
            vec![
                op("/a", Some("b1"), &["beta"]),
                op("/b", Some("a1"), &["alpha"]),
                op("/c", Some("b2"), &["beta"]),
            ],
            &config,
            &pattern,
        );
        let names: Vec<_> = groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, ["Beta", "Alpha"]);
        let ids: Vec<_> = groups[0]
            .operations
            .iter()
            .map(|o| o.operation_id.as_deref().unwrap())
            .collect();
        assert_eq!(ids, ["b1", "b2"]);
    }
}
