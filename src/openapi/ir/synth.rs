//! Method synthesis.
//!
//! Turns one [`OperationDescriptor`] into a [`MethodShape`]: the client
//! method name, the ordered parameter list, the three observe overloads,
//! the request-construction plan and the decoded return type.

use std::collections::HashSet;

use indexmap::IndexMap;
use regex::Regex;
use tracing::debug;

use super::api::{
    BodySource, ContentMap, FormEntry, GroupDescriptor, MethodParam, MethodShape, Observe,
    OperationDescriptor, Overload, ParamLocation, ParamRole, QueryEntry, RequestStep,
    ResponseDescriptor, ServiceIR, UrlPart,
};
use super::classify::{ContentClassifier, is_json_media_type, normalize_media_type};
use super::resolve::SchemaResolver;
use super::schema::{SchemaKind, SchemaNode};
use super::types::{TsPrimitive, TsType};
use super::utils::{camel_case, needs_bracket_notation, pascal_case, sanitize_ts_identifier};
use crate::openapi::config::{GeneratorConfig, ResponseKind};
use crate::openapi::error::{Diagnostics, GenerateError};

const OPTIONS_PARAM: &str = "options";
const REQUEST_OPTIONS: &str = "RequestOptions";
const MULTIPART_FORM_DATA: &str = "multipart/form-data";

/// Status codes consulted, in order, for the decoded return type.
const RETURN_STATUSES: [&str; 3] = ["200", "201", "204"];

/// `RequestOptions<observe, responseType>` with a literal response type.
pub fn request_options_type(observe: TsType, kind: ResponseKind) -> TsType {
    TsType::generic(
        REQUEST_OPTIONS,
        vec![observe, TsType::string_literal(kind.as_str())],
    )
}

/// Union of every observe literal, used by the implementation signature.
pub fn any_observe() -> TsType {
    TsType::Union(
        Observe::ALL
            .iter()
            .map(|observe| TsType::string_literal(observe.as_str()))
            .collect(),
    )
}

/// Wrap the decoded body type for one observe mode.
pub fn observable_of(observe: Observe, body: TsType) -> TsType {
    let inner = match observe {
        Observe::Body => body,
        Observe::Response => TsType::generic("HttpResponse", vec![body]),
        Observe::Events => TsType::generic("HttpEvent", vec![body]),
    };
    TsType::generic("Observable", vec![inner])
}

/// Builds method shapes for the operations of a run.
#[derive(Debug)]
pub struct MethodSynthesizer<'a> {
    config: &'a GeneratorConfig,
    classifier: ContentClassifier<'a>,
    pattern: &'a Regex,
    diagnostics: Diagnostics,
}

impl<'a> MethodSynthesizer<'a> {
    /// `pattern` is the compiled operation-id prefix pattern of the run.
    pub fn new(config: &'a GeneratorConfig, pattern: &'a Regex) -> Self {
        Self {
            config,
            classifier: ContentClassifier::new(config),
            pattern,
            diagnostics: Diagnostics::default(),
        }
    }

    /// Classify `$ref` response schemas by the definitions they point to.
    pub fn with_definitions(mut self, definitions: &'a IndexMap<String, SchemaNode>) -> Self {
        self.classifier = self.classifier.with_definitions(definitions);
        self
    }

    /// Warnings recorded during synthesis.
    pub fn into_diagnostics(self) -> Diagnostics {
        self.diagnostics
    }

    /// Synthesize every method of a group.
    pub fn synthesize_group(
        &mut self,
        resolver: &mut SchemaResolver<'_>,
        group: &GroupDescriptor,
    ) -> Result<ServiceIR, GenerateError> {
        let mut methods = Vec::with_capacity(group.operations.len());
        let mut seen = HashSet::new();

        for op in &group.operations {
            let shape = self.synthesize(resolver, op)?;
            if !seen.insert(shape.name.clone()) {
                self.diagnostics.warn(
                    group.name.clone(),
                    format!(
                        "method name '{}' is generated more than once ({})",
                        shape.name,
                        op.label()
                    ),
                );
            }
            methods.push(shape);
        }

        Ok(ServiceIR {
            name: group.name.clone(),
            methods,
        })
    }

    /// Synthesize the method shape of one operation.
    pub fn synthesize(
        &mut self,
        resolver: &mut SchemaResolver<'_>,
        op: &OperationDescriptor,
    ) -> Result<MethodShape, GenerateError> {
        let name = self.method_name(op)?;
        let label = op.label();
        debug!(operation = %label, method = %name, "Synthesizing method.");

        let binary = self.classifier.is_binary_operation(&op.responses);
        let selected = RETURN_STATUSES.iter().find_map(|status| op.response(status));
        let mut response_kind = selected.map_or(ResponseKind::Json, |response| {
            self.classifier.classify_content(&response.content)
        });
        if binary && !response_kind.is_binary() {
            response_kind = ResponseKind::Blob;
        }
        let return_type = self.return_type(resolver, &label, selected, response_kind);

        let params = self.parameters(resolver, op, response_kind);
        let overloads = overloads(&params, &return_type, response_kind);
        let plan = self.plan(op, &params, binary.then_some(response_kind));

        Ok(MethodShape {
            name,
            method: op.method,
            path: op.path.clone(),
            summary: op.summary.clone(),
            description: op.description.clone(),
            deprecated: op.deprecated,
            params,
            overloads,
            return_type,
            response_kind,
            plan,
        })
    }

    /// Client method name of an operation.
    ///
    /// A configured transform receives the operation id and fails the run
    /// when there is none. Otherwise the id loses its group prefix and is
    /// camel-cased; without an id the name is the verb plus the last
    /// non-parameter path segment.
    pub fn method_name(&self, op: &OperationDescriptor) -> Result<String, GenerateError> {
        if let Some(transform) = &self.config.method_name_transform {
            let id = op
                .operation_id
                .as_deref()
                .ok_or_else(|| GenerateError::MissingOperationId {
                    method: op.method.to_string(),
                    path: op.path.clone(),
                })?;
            return Ok(transform.apply(id));
        }

        let name = match op.operation_id.as_deref() {
            Some(id) => {
                let stripped = camel_case(&self.pattern.replace(id, ""));
                if stripped.is_empty() { camel_case(id) } else { stripped }
            }
            None => {
                let resource = op
                    .path
                    .split('/')
                    .rfind(|segment| !segment.is_empty() && !segment.starts_with('{'))
                    .unwrap_or("resource");
                format!("{}{}", op.method.as_lower(), pascal_case(resource))
            }
        };

        Ok(if needs_bracket_notation(&name) {
            sanitize_ts_identifier(&name)
        } else {
            name
        })
    }

    // =========================================================================
    // Parameters
    // =========================================================================

    /// Ordered parameters: path, form fields or body, query, options.
    fn parameters(
        &mut self,
        resolver: &mut SchemaResolver<'_>,
        op: &OperationDescriptor,
        response_kind: ResponseKind,
    ) -> Vec<MethodParam> {
        let label = op.label();
        let mut params = Vec::new();
        let mut taken = HashSet::from([OPTIONS_PARAM.to_string()]);

        for param in op.parameters_in(ParamLocation::Path) {
            let name = self.unique_name(&label, &mut taken, &param.name);
            params.push(MethodParam {
                name,
                wire_name: param.name.clone(),
                ty: resolver.resolve_for(&label, &param.schema),
                optional: !param.required,
                role: ParamRole::Path,
                docs: param.description.clone(),
            });
        }

        if let Some(body) = &op.request_body {
            if let Some(schema) = multipart_schema(&body.content) {
                self.form_fields(resolver, &label, schema, &mut taken, &mut params);
            } else if !body.content.is_empty() {
                // Every other media type is sent as one body argument, typed from
                // the first JSON-family schema, else the first declared one.
                let schema = body
                    .content
                    .iter()
                    .find(|(media_type, schema)| is_json_media_type(media_type) && schema.is_some())
                    .or_else(|| body.content.first())
                    .and_then(|(_, schema)| schema.as_ref());
                let ty = schema.map_or_else(TsType::any, |schema| resolver.resolve_for(&label, schema));
                let base = ty.ref_name().map_or_else(|| "body".to_string(), camel_case);
                let name = self.unique_name(&label, &mut taken, &base);
                params.push(MethodParam {
                    wire_name: name.clone(),
                    name,
                    ty,
                    optional: !body.required,
                    role: ParamRole::Body,
                    docs: body.description.clone(),
                });
            }
        }

        for param in op.parameters_in(ParamLocation::Query) {
            let name = self.unique_name(&label, &mut taken, &param.name);
            params.push(MethodParam {
                name,
                wire_name: param.name.clone(),
                ty: resolver.resolve_for(&label, &param.schema),
                optional: !param.required,
                role: ParamRole::Query,
                docs: param.description.clone(),
            });
        }

        params.push(MethodParam {
            name: OPTIONS_PARAM.to_string(),
            wire_name: OPTIONS_PARAM.to_string(),
            ty: request_options_type(any_observe(), response_kind),
            optional: true,
            role: ParamRole::Options,
            docs: None,
        });
        params
    }

    /// One parameter per property of the multipart object, in property order.
    fn form_fields(
        &mut self,
        resolver: &mut SchemaResolver<'_>,
        label: &str,
        schema: Option<&SchemaNode>,
        taken: &mut HashSet<String>,
        params: &mut Vec<MethodParam>,
    ) {
        let object = match schema.and_then(|schema| resolver.dereference(schema)).map(|node| &node.kind) {
            Some(SchemaKind::Object(object)) => object,
            _ => {
                self.diagnostics.warn(
                    label,
                    "multipart body schema is not an object; no form fields generated",
                );
                return;
            }
        };

        for (field, node) in &object.properties {
            let file = resolver
                .dereference(node)
                .is_some_and(SchemaNode::is_binary_string);
            let name = self.unique_name(label, taken, field);
            params.push(MethodParam {
                name,
                wire_name: field.clone(),
                ty: resolver.resolve_for(label, node),
                optional: !object.is_required(field),
                role: ParamRole::FormField { file },
                docs: node.description.clone(),
            });
        }
    }

    /// Sanitized identifier, suffixed when it collides with an earlier argument.
    fn unique_name(&mut self, label: &str, taken: &mut HashSet<String>, raw: &str) -> String {
        let base = sanitize_ts_identifier(raw);
        let mut name = base.clone();
        let mut n = 2;
        while !taken.insert(name.clone()) {
            name = format!("{base}{n}");
            n += 1;
        }
        if name != base {
            self.diagnostics.warn(
                label,
                format!("argument '{raw}' collides with another argument; renamed to '{name}'"),
            );
        }
        name
    }

    // =========================================================================
    // Request plan
    // =========================================================================

    fn plan(
        &mut self,
        op: &OperationDescriptor,
        params: &[MethodParam],
        response_type: Option<ResponseKind>,
    ) -> Vec<RequestStep> {
        let mut plan = vec![RequestStep::BuildUrl {
            parts: self.url_parts(op, params),
        }];

        let query: Vec<QueryEntry> = params
            .iter()
            .filter(|p| p.role == ParamRole::Query)
            .map(|p| QueryEntry {
                key: p.wire_name.clone(),
                arg: p.name.clone(),
                array: is_array_type(&p.ty),
            })
            .collect();
        let has_query = !query.is_empty();
        if has_query {
            plan.push(RequestStep::BuildQuery { entries: query });
        }

        let multipart = op
            .request_body
            .as_ref()
            .is_some_and(|body| multipart_schema(&body.content).is_some());
        let body = if multipart {
            let entries = params
                .iter()
                .filter_map(|p| match p.role {
                    ParamRole::FormField { file } => Some(FormEntry {
                        key: p.wire_name.clone(),
                        arg: p.name.clone(),
                        file,
                    }),
                    _ => None,
                })
                .collect();
            plan.push(RequestStep::BuildForm { entries });
            Some(BodySource::Form)
        } else {
            params
                .iter()
                .find(|p| p.role == ParamRole::Body)
                .map(|p| BodySource::Value(p.name.clone()))
        };

        plan.push(RequestStep::AssembleOptions {
            response_type,
            params: has_query,
            body,
        });
        plan.push(RequestStep::Dispatch { method: op.method });
        plan
    }

    /// Split the path template; placeholders naming a path parameter are substituted.
    fn url_parts(&mut self, op: &OperationDescriptor, params: &[MethodParam]) -> Vec<UrlPart> {
        let mut parts = Vec::new();
        let mut rest = op.path.as_str();

        while let Some(open) = rest.find('{') {
            let Some(close) = rest[open..].find('}').map(|i| open + i) else {
                break;
            };
            push_static(&mut parts, &rest[..open]);
            let placeholder = &rest[open + 1..close];
            match params
                .iter()
                .find(|p| p.role == ParamRole::Path && p.wire_name == placeholder)
            {
                Some(param) => parts.push(UrlPart::Param(param.name.clone())),
                None => {
                    self.diagnostics.warn(
                        op.label(),
                        format!("path placeholder '{{{placeholder}}}' has no matching path parameter; left as literal"),
                    );
                    push_static(&mut parts, &rest[open..=close]);
                }
            }
            rest = &rest[close + 1..];
        }
        push_static(&mut parts, rest);
        parts
    }

    // =========================================================================
    // Return type
    // =========================================================================

    fn return_type(
        &self,
        resolver: &mut SchemaResolver<'_>,
        label: &str,
        selected: Option<&ResponseDescriptor>,
        kind: ResponseKind,
    ) -> TsType {
        let Some(response) = selected else {
            return TsType::unknown();
        };
        if response.content.is_empty() && !kind.is_binary() {
            return TsType::Primitive(TsPrimitive::Void);
        }

        match kind {
            ResponseKind::Blob => TsType::Primitive(TsPrimitive::Blob),
            ResponseKind::ArrayBuffer => TsType::Primitive(TsPrimitive::ArrayBuffer),
            ResponseKind::Text => TsType::Primitive(TsPrimitive::String),
            ResponseKind::Json => response
                .content
                .iter()
                .filter(|(media_type, schema)| {
                    self.classifier.classify(media_type, schema.as_ref()) == ResponseKind::Json
                })
                .find_map(|(_, schema)| schema.as_ref())
                .map_or_else(TsType::any, |schema| resolver.resolve_for(label, schema)),
        }
    }
}

/// Schema of the multipart media type of a body; `Some(None)` when it declares none.
fn multipart_schema(content: &ContentMap) -> Option<Option<&SchemaNode>> {
    content
        .iter()
        .find(|(media_type, _)| normalize_media_type(media_type) == MULTIPART_FORM_DATA)
        .map(|(_, schema)| schema.as_ref())
}

/// Arrays, including nullable ones.
fn is_array_type(ty: &TsType) -> bool {
    match ty {
        TsType::Array(_) => true,
        TsType::Union(members) => {
            members.iter().any(|m| matches!(m, TsType::Array(_)))
                && members.iter().all(|m| {
                    matches!(
                        m,
                        TsType::Array(_)
                            | TsType::Primitive(TsPrimitive::Null | TsPrimitive::Undefined)
                    )
                })
        }
        _ => false,
    }
}

fn push_static(parts: &mut Vec<UrlPart>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(UrlPart::Static(last)) = parts.last_mut() {
        last.push_str(text);
    } else {
        parts.push(UrlPart::Static(text.to_string()));
    }
}

/// One overload per observe mode; the specialized options replace the base entry.
fn overloads(params: &[MethodParam], body: &TsType, kind: ResponseKind) -> Vec<Overload> {
    Observe::ALL
        .iter()
        .map(|&observe| {
            let options = MethodParam {
                name: OPTIONS_PARAM.to_string(),
                wire_name: OPTIONS_PARAM.to_string(),
                ty: request_options_type(TsType::string_literal(observe.as_str()), kind),
                optional: true,
                role: ParamRole::Options,
                docs: None,
            };
            Overload {
                observe,
                params: merge_params(params, options),
                return_type: observable_of(observe, body.clone()),
            }
        })
        .collect()
}

/// Replace the entry sharing `specialized`'s name in place, or append it.
fn merge_params(base: &[MethodParam], specialized: MethodParam) -> Vec<MethodParam> {
    let mut merged: Vec<MethodParam> = base.to_vec();
    match merged.iter_mut().find(|p| p.name == specialized.name) {
        Some(slot) => *slot = specialized,
        None => merged.push(specialized),
    }
    merged
}
