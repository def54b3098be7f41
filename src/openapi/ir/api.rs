//! API-level IR: operation descriptors, groups and synthesized method shapes.
//!
//! Descriptors are the normalized view of the document (merged parameters,
//! resolved component references). Method shapes are what the emitter
//! renders: names, ordered parameters, overloads, the request plan and the
//! return type.

use std::fmt;

use indexmap::IndexMap;

use super::schema::SchemaNode;
use super::types::{TsType, TsTypeDef};
use crate::openapi::config::ResponseKind;
use crate::openapi::error::Warning;

/// The seven recognized HTTP verbs, in path-item order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// `GET`.
    Get,
    /// `PUT`.
    Put,
    /// `POST`.
    Post,
    /// `DELETE`.
    Delete,
    /// `OPTIONS`.
    Options,
    /// `HEAD`.
    Head,
    /// `PATCH`.
    Patch,
}

impl HttpMethod {
    /// Upper-case verb, as dispatched.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Put => "PUT",
            Self::Post => "POST",
            Self::Delete => "DELETE",
            Self::Options => "OPTIONS",
            Self::Head => "HEAD",
            Self::Patch => "PATCH",
        }
    }

    /// Lower-case verb, used as a method-name prefix.
    pub fn as_lower(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Put => "put",
            Self::Post => "post",
            Self::Delete => "delete",
            Self::Options => "options",
            Self::Head => "head",
            Self::Patch => "patch",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a parameter travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamLocation {
    /// Substituted into the path template.
    Path,
    /// Appended to the query string.
    Query,
    /// Request header; not exposed on generated methods.
    Header,
    /// Cookie; not exposed on generated methods.
    Cookie,
}

impl ParamLocation {
    /// Parse an `in` value; `body` and `formData` are not parameter locations.
    pub fn parse(location: &str) -> Option<Self> {
        match location {
            "path" => Some(Self::Path),
            "query" => Some(Self::Query),
            "header" => Some(Self::Header),
            "cookie" => Some(Self::Cookie),
            _ => None,
        }
    }
}

/// One merged parameter of an operation.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDescriptor {
    /// Name on the wire.
    pub name: String,
    /// `in` value.
    pub location: ParamLocation,
    /// Path parameters are always required.
    pub required: bool,
    /// Value schema; Swagger 2.0 inline type keywords are folded in.
    pub schema: SchemaNode,
    /// Carried into the method's doc comment.
    pub description: Option<String>,
}

/// Media type -> schema, in declaration order.
pub type ContentMap = IndexMap<String, Option<SchemaNode>>;

/// Request body of an operation.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestBodyDescriptor {
    /// Declared media types.
    pub content: ContentMap,
    /// Whether the caller must pass a body.
    pub required: bool,
    /// Carried onto the body parameter.
    pub description: Option<String>,
}

/// One declared response.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseDescriptor {
    /// Status code key as written (`200`, `4XX`, `default`).
    pub status: String,
    /// Response description.
    pub description: Option<String>,
    /// Declared media types; empty when the response has no body.
    pub content: ContentMap,
}

/// Normalized view of one (path, verb) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationDescriptor {
    /// Path template as declared, placeholders included.
    pub path: String,
    /// HTTP verb.
    pub method: HttpMethod,
    /// `operationId`, if declared.
    pub operation_id: Option<String>,
    /// One-line summary.
    pub summary: Option<String>,
    /// Long description.
    pub description: Option<String>,
    /// `deprecated: true`.
    pub deprecated: bool,
    /// Tags in declaration order; the first one names the group.
    pub tags: Vec<String>,
    /// Path-item parameters merged with operation parameters.
    pub parameters: Vec<ParameterDescriptor>,
    /// Request body, if any.
    pub request_body: Option<RequestBodyDescriptor>,
    /// Responses in declaration order.
    pub responses: Vec<ResponseDescriptor>,
}

impl OperationDescriptor {
    /// `METHOD /path`, used as a warning subject.
    pub fn label(&self) -> String {
        format!("{} {}", self.method, self.path)
    }

    /// Response declared for a status code.
    pub fn response(&self, status: &str) -> Option<&ResponseDescriptor> {
        self.responses.iter().find(|r| r.status == status)
    }

    /// Parameters at one location, in declaration order.
    pub fn parameters_in(
        &self,
        location: ParamLocation,
    ) -> impl Iterator<Item = &ParameterDescriptor> {
        self.parameters.iter().filter(move |p| p.location == location)
    }
}

/// Operations assigned to one named group, in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupDescriptor {
    /// Normalized group name.
    pub name: String,
    /// Members in source order.
    pub operations: Vec<OperationDescriptor>,
}

// =============================================================================
// Method shapes
// =============================================================================

/// Role of a method parameter in the request plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamRole {
    /// Path placeholder value.
    Path,
    /// Multipart form field; file fields are appended without conversion.
    FormField {
        /// Binary field.
        file: bool,
    },
    /// Structured request body.
    Body,
    /// Query string value.
    Query,
    /// Trailing request options.
    Options,
}

/// One parameter of a synthesized method.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodParam {
    /// Identifier used in the generated signature.
    pub name: String,
    /// Name on the wire (path placeholder, query key, form field).
    pub wire_name: String,
    /// Declared type.
    pub ty: TsType,
    /// Rendered with `?`.
    pub optional: bool,
    /// How the request plan uses the value.
    pub role: ParamRole,
    /// Description for the `@param` tag.
    pub docs: Option<String>,
}

/// Overload discriminator: what the caller observes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observe {
    /// The decoded body.
    Body,
    /// The full response envelope.
    Response,
    /// The progress event stream.
    Events,
}

impl Observe {
    /// Every discriminator, in overload order.
    pub const ALL: [Observe; 3] = [Observe::Body, Observe::Response, Observe::Events];

    /// Literal used in `RequestOptions<observe, ...>`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Body => "body",
            Self::Response => "response",
            Self::Events => "events",
        }
    }
}

/// A call-shape variant of a method.
#[derive(Debug, Clone, PartialEq)]
pub struct Overload {
    /// Discriminator carried by the options parameter.
    pub observe: Observe,
    /// Parameters, options typed for this discriminator.
    pub params: Vec<MethodParam>,
    /// Full return type, e.g. `Observable<HttpResponse<User>>`.
    pub return_type: TsType,
}

/// A segment of a URL template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlPart {
    /// Literal text.
    Static(String),
    /// Argument substituted (encoded) into the URL.
    Param(String),
}

/// One query entry: wire key and the argument holding the value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryEntry {
    /// Query key.
    pub key: String,
    /// Argument name.
    pub arg: String,
    /// Array values are appended once per item.
    pub array: bool,
}

/// One form field append.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormEntry {
    /// Form field name.
    pub key: String,
    /// Argument name.
    pub arg: String,
    /// Appended as-is instead of stringified.
    pub file: bool,
}

/// Payload sent as the request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodySource {
    /// A structured value passed by the caller.
    Value(String),
    /// The form accumulator built from the multipart fields.
    Form,
}

/// One step of the request-construction plan, in execution order.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestStep {
    /// Join the base path and the URL template.
    BuildUrl {
        /// Template segments in order.
        parts: Vec<UrlPart>,
    },
    /// Accumulate query parameters, skipping absent values.
    BuildQuery {
        /// Query entries in declaration order.
        entries: Vec<QueryEntry>,
    },
    /// Accumulate multipart form fields, skipping absent values.
    BuildForm {
        /// Form entries in declaration order.
        entries: Vec<FormEntry>,
    },
    /// Merge the accumulators into the caller's options.
    AssembleOptions {
        /// Set only when the operation responds with a binary body.
        response_type: Option<ResponseKind>,
        /// Whether query parameters were built.
        params: bool,
        /// Request payload, if any.
        body: Option<BodySource>,
    },
    /// Issue the request.
    Dispatch {
        /// HTTP verb.
        method: HttpMethod,
    },
}

/// Everything the emitter needs to render one client method.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodShape {
    /// Method identifier.
    pub name: String,
    /// HTTP verb.
    pub method: HttpMethod,
    /// Path template, shown in the doc comment.
    pub path: String,
    /// Operation summary.
    pub summary: Option<String>,
    /// Operation description.
    pub description: Option<String>,
    /// Rendered as `@deprecated`.
    pub deprecated: bool,
    /// Base parameter list, trailing options included.
    pub params: Vec<MethodParam>,
    /// Observe overloads in [`Observe::ALL`] order.
    pub overloads: Vec<Overload>,
    /// Type of the decoded response body.
    pub return_type: TsType,
    /// Handling mode used as the overloads' response-type literal.
    pub response_kind: ResponseKind,
    /// Request-construction steps.
    pub plan: Vec<RequestStep>,
}

/// One service: a group and its method shapes.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceIR {
    /// Normalized group name.
    pub name: String,
    /// Methods in source order.
    pub methods: Vec<MethodShape>,
}

/// Result of one run: registry entries, services and warnings.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiIR {
    /// Registry entries in emission order.
    pub types: Vec<TsTypeDef>,
    /// Services in group order.
    pub services: Vec<ServiceIR>,
    /// Recoverable problems in stage order.
    pub warnings: Vec<Warning>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_observe_literals_follow_overload_order() {
        let literals: Vec<&str> = Observe::ALL.iter().map(|o| o.as_str()).collect();
        assert_eq!(literals, ["body", "response", "events"]);
    }

    #[test]
    fn test_param_location_parse() {
        assert_eq!(ParamLocation::parse("cookie"), Some(ParamLocation::Cookie));
        assert_eq!(ParamLocation::parse("formData"), None);
    }
}
