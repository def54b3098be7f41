//! Code generation from API IR to TypeScript AST.
//!
//! This module transforms the API IR (registry entries and method shapes)
//! into TypeScript module ASTs: one models module, one Angular service class
//! per group, and the shared support modules the services import.
//!
//! The generated AST can then be emitted to strings via the `Emit` trait.

use std::collections::BTreeSet;

use super::api::{ApiIR, BodySource, MethodParam, MethodShape, RequestStep, ServiceIR, UrlPart};
use super::synth::any_observe;
use super::types::{
    BinOp, ObjectEntry, TemplatePart, TsClass, TsExport, TsExpr, TsField, TsImport, TsLiteral,
    TsMethod, TsModule, TsParam, TsPrimitive, TsProp, TsSignature, TsStmt, TsType, TsTypeDef,
    TsTypeParam, TypeDefKind, VarKind,
};
use super::utils::kebab_case;
use crate::openapi::config::{GeneratorConfig, ResponseKind};

/// Path of the models module, relative to the output directory.
pub const MODELS_INDEX: &str = "models/index.ts";
/// Directory holding the service modules.
pub const SERVICES_DIR: &str = "services";

const REQUEST_OPTIONS: &str = "RequestOptions";
const ANGULAR_CORE: &str = "@angular/core";
const ANGULAR_HTTP: &str = "@angular/common/http";

/// A module and where it is written, relative to the output directory.
#[derive(Debug, Clone)]
pub struct ModuleFile {
    /// Output-relative path with `/` separators.
    pub path: String,
    /// Module contents.
    pub module: TsModule,
}

/// Generate every module of the client: models first, then services.
pub fn codegen_files(api: &ApiIR, config: &GeneratorConfig) -> Vec<ModuleFile> {
    let mut files = vec![codegen_models(api, config)];
    files.extend(codegen_services(api, config));
    files
}

/// Generate the models module: every registry entry, in registry order.
pub fn codegen_models(api: &ApiIR, config: &GeneratorConfig) -> ModuleFile {
    ModuleFile {
        path: MODELS_INDEX.to_string(),
        module: TsModule {
            header: config.header_comment.clone(),
            types: api.types.clone(),
            ..TsModule::default()
        },
    }
}

/// Generate the service modules, the shared support modules and the services index.
pub fn codegen_services(api: &ApiIR, config: &GeneratorConfig) -> Vec<ModuleFile> {
    let mut files: Vec<ModuleFile> = api
        .services
        .iter()
        .map(|service| codegen_service(service, config))
        .collect();

    files.push(ModuleFile {
        path: format!("{SERVICES_DIR}/request-options.ts"),
        module: codegen_request_options(config),
    });
    files.push(ModuleFile {
        path: format!("{SERVICES_DIR}/tokens.ts"),
        module: codegen_tokens(config),
    });

    let mut exports: Vec<TsExport> = api
        .services
        .iter()
        .map(|service| TsExport {
            items: Vec::new(),
            from: format!("./{}", service_stem(&service.name)),
        })
        .collect();
    exports.push(TsExport {
        items: Vec::new(),
        from: "./request-options".into(),
    });
    exports.push(TsExport {
        items: Vec::new(),
        from: "./tokens".into(),
    });
    files.push(ModuleFile {
        path: format!("{SERVICES_DIR}/index.ts"),
        module: TsModule {
            header: config.header_comment.clone(),
            exports,
            ..TsModule::default()
        },
    });

    files
}

/// `user-accounts.service` for group `UserAccounts`.
fn service_stem(group: &str) -> String {
    format!("{}.service", kebab_case(group))
}

// =============================================================================
// Services
// =============================================================================

/// Generate the module of one service class.
pub fn codegen_service(service: &ServiceIR, config: &GeneratorConfig) -> ModuleFile {
    let mut refs = BTreeSet::new();
    for method in &service.methods {
        for param in &method.params {
            param.ty.collect_refs(&mut refs);
        }
        method.return_type.collect_refs(&mut refs);
    }
    let uses_query = service
        .methods
        .iter()
        .flat_map(|m| &m.plan)
        .any(|step| matches!(step, RequestStep::BuildQuery { .. }));

    let mut http_items = vec!["HttpClient", "HttpEvent"];
    if uses_query {
        http_items.push("HttpParams");
    }
    http_items.push("HttpResponse");

    let mut imports = vec![
        import(&["Injectable", "inject"], ANGULAR_CORE, false),
        import(&http_items, ANGULAR_HTTP, false),
        import(&["Observable"], "rxjs", false),
        import(&[config.base_path_token.as_str()], "./tokens", false),
        import(&[REQUEST_OPTIONS], "./request-options", true),
    ];
    if !refs.is_empty() {
        imports.push(TsImport {
            items: refs.into_iter().collect(),
            from: "../models".into(),
            type_only: true,
        });
    }

    let class = TsClass {
        name: format!("{}Service", service.name),
        decorators: vec![TsExpr::ident("Injectable").call(vec![TsExpr::Object(vec![
            ObjectEntry::Prop("providedIn".into(), TsExpr::string("root")),
        ])])],
        fields: vec![
            TsField {
                name: "httpClient".into(),
                private: true,
                readonly: true,
                init: TsExpr::ident("inject").call(vec![TsExpr::ident("HttpClient")]),
            },
            TsField {
                name: "basePath".into(),
                private: true,
                readonly: true,
                init: TsExpr::ident("inject").call(vec![TsExpr::ident(&config.base_path_token)]),
            },
        ],
        methods: service.methods.iter().map(codegen_method).collect(),
    };

    ModuleFile {
        path: format!("{SERVICES_DIR}/{}.ts", service_stem(&service.name)),
        module: TsModule {
            header: config.header_comment.clone(),
            imports,
            classes: vec![class],
            ..TsModule::default()
        },
    }
}

fn import(items: &[&str], from: &str, type_only: bool) -> TsImport {
    TsImport {
        items: items.iter().map(|item| (*item).to_string()).collect(),
        from: from.to_string(),
        type_only,
    }
}

/// Generate overload signatures, implementation signature and body of one method.
fn codegen_method(shape: &MethodShape) -> TsMethod {
    TsMethod {
        name: shape.name.clone(),
        docs: method_docs(shape),
        overloads: shape
            .overloads
            .iter()
            .map(|overload| TsSignature {
                params: ts_params(&overload.params),
                return_type: overload.return_type.clone(),
            })
            .collect(),
        implementation: TsSignature {
            params: ts_params(&shape.params),
            return_type: TsType::generic("Observable", vec![TsType::any()]),
        },
        body: codegen_body(shape),
    }
}

fn method_docs(shape: &MethodShape) -> Vec<String> {
    let mut docs = Vec::new();
    if let Some(summary) = &shape.summary {
        docs.push(summary.clone());
    }
    if let Some(description) = &shape.description
        && shape.summary.as_ref() != Some(description)
    {
        docs.push(description.clone());
    }
    for param in &shape.params {
        if let Some(first) = param.docs.as_deref().and_then(|d| d.lines().next()) {
            docs.push(format!("@param {} {}", param.name, first.trim()));
        }
    }
    if shape.deprecated {
        docs.push("@deprecated".into());
    }
    docs
}

/// Signature parameters. An optional parameter followed by a required one
/// keeps its position and is typed `T | undefined` instead of `name?`.
fn ts_params(params: &[MethodParam]) -> Vec<TsParam> {
    let last_required = params.iter().rposition(|p| !p.optional);
    params
        .iter()
        .enumerate()
        .map(|(i, param)| {
            let trailing = last_required.is_none_or(|last| i > last);
            if param.optional && !trailing {
                TsParam {
                    name: param.name.clone(),
                    ty: Some(with_undefined(param.ty.clone())),
                    optional: false,
                }
            } else {
                TsParam {
                    name: param.name.clone(),
                    ty: Some(param.ty.clone()),
                    optional: param.optional,
                }
            }
        })
        .collect()
}

fn with_undefined(ty: TsType) -> TsType {
    let undefined = TsType::Primitive(TsPrimitive::Undefined);
    let mut members = match ty {
        TsType::Union(members) => members,
        other => vec![other],
    };
    if !members.contains(&undefined) {
        members.push(undefined);
    }
    TsType::Union(members)
}

/// `arg !== undefined && arg !== null`
fn is_present(arg: &str) -> TsExpr {
    TsExpr::ident(arg)
        .bin(BinOp::StrictNotEqual, TsExpr::ident("undefined"))
        .bin(
            BinOp::And,
            TsExpr::ident(arg).bin(BinOp::StrictNotEqual, TsExpr::Literal(TsLiteral::Null)),
        )
}

fn stringify(expr: TsExpr) -> TsExpr {
    TsExpr::ident("String").call(vec![expr])
}

/// Translate the request plan into statements.
fn codegen_body(shape: &MethodShape) -> Vec<TsStmt> {
    let mut stmts = Vec::new();

    for step in &shape.plan {
        match step {
            RequestStep::BuildUrl { parts } => {
                let mut template = vec![TemplatePart::Dynamic(
                    TsExpr::ident("this").member("basePath"),
                )];
                template.extend(parts.iter().map(|part| match part {
                    UrlPart::Static(text) => TemplatePart::Static(text.clone()),
                    UrlPart::Param(arg) => TemplatePart::Dynamic(
                        TsExpr::ident("encodeURIComponent").call(vec![stringify(TsExpr::ident(arg))]),
                    ),
                }));
                stmts.push(TsStmt::VarDecl {
                    kind: VarKind::Const,
                    name: "url".into(),
                    ty: None,
                    init: TsExpr::Template(template),
                });
            }
            RequestStep::BuildQuery { entries } => {
                stmts.push(TsStmt::VarDecl {
                    kind: VarKind::Let,
                    name: "params".into(),
                    ty: None,
                    init: TsExpr::New {
                        callee: Box::new(TsExpr::ident("HttpParams")),
                        type_args: Vec::new(),
                        args: Vec::new(),
                    },
                });
                for entry in entries {
                    let value = if entry.array {
                        // params = tags.reduce((acc, v) => acc.append("tags", String(v)), params)
                        TsExpr::ident(&entry.arg).member("reduce").call(vec![
                            TsExpr::Arrow {
                                params: vec![untyped("acc"), untyped("v")],
                                body: Box::new(TsExpr::ident("acc").member("append").call(vec![
                                    TsExpr::string(&entry.key),
                                    stringify(TsExpr::ident("v")),
                                ])),
                            },
                            TsExpr::ident("params"),
                        ])
                    } else {
                        TsExpr::ident("params").member("set").call(vec![
                            TsExpr::string(&entry.key),
                            stringify(TsExpr::ident(&entry.arg)),
                        ])
                    };
                    stmts.push(TsStmt::If {
                        cond: is_present(&entry.arg),
                        then_body: vec![TsStmt::Assign {
                            target: "params".into(),
                            value,
                        }],
                    });
                }
            }
            RequestStep::BuildForm { entries } => {
                stmts.push(TsStmt::VarDecl {
                    kind: VarKind::Const,
                    name: "formData".into(),
                    ty: None,
                    init: TsExpr::New {
                        callee: Box::new(TsExpr::ident("FormData")),
                        type_args: Vec::new(),
                        args: Vec::new(),
                    },
                });
                for entry in entries {
                    let value = if entry.file {
                        TsExpr::ident(&entry.arg)
                    } else {
                        stringify(TsExpr::ident(&entry.arg))
                    };
                    stmts.push(TsStmt::If {
                        cond: is_present(&entry.arg),
                        then_body: vec![TsStmt::Expr(
                            TsExpr::ident("formData")
                                .member("append")
                                .call(vec![TsExpr::string(&entry.key), value]),
                        )],
                    });
                }
            }
            RequestStep::AssembleOptions {
                response_type,
                params,
                body,
            } => {
                let mut entries = vec![ObjectEntry::Spread(TsExpr::ident("options"))];
                if let Some(kind) = response_type {
                    entries.push(ObjectEntry::Prop(
                        "responseType".into(),
                        TsExpr::string(kind.as_str()),
                    ));
                }
                if *params {
                    entries.push(ObjectEntry::Shorthand("params".into()));
                }
                match body {
                    Some(BodySource::Value(arg)) => {
                        entries.push(ObjectEntry::Prop("body".into(), TsExpr::ident(arg)));
                    }
                    Some(BodySource::Form) => {
                        entries.push(ObjectEntry::Prop("body".into(), TsExpr::ident("formData")));
                    }
                    None => {}
                }
                stmts.push(TsStmt::VarDecl {
                    kind: VarKind::Const,
                    name: "requestOptions".into(),
                    ty: Some(TsType::any()),
                    init: TsExpr::Object(entries),
                });
            }
            RequestStep::Dispatch { method } => {
                stmts.push(TsStmt::Return(Some(
                    TsExpr::ident("this").member("httpClient").member("request").call(vec![
                        TsExpr::string(method.as_str()),
                        TsExpr::ident("url"),
                        TsExpr::ident("requestOptions"),
                    ]),
                )));
            }
        }
    }

    stmts
}

fn untyped(name: &str) -> TsParam {
    TsParam {
        name: name.to_string(),
        ty: None,
        optional: false,
    }
}

// =============================================================================
// Support modules
// =============================================================================

fn literal_union(values: &[&str]) -> TsType {
    TsType::Union(values.iter().map(|v| TsType::string_literal(*v)).collect())
}

fn optional_prop(name: &str, ty: TsType) -> TsProp {
    TsProp {
        name: name.to_string(),
        ty,
        optional: true,
        readonly: false,
        docs: None,
    }
}

/// `RequestOptions<TObserve, TResponseType>`: per-call overrides of every service method.
fn codegen_request_options(config: &GeneratorConfig) -> TsModule {
    let kinds = [
        ResponseKind::Json,
        ResponseKind::Text,
        ResponseKind::Blob,
        ResponseKind::ArrayBuffer,
    ]
    .map(ResponseKind::as_str);
    let scalar = TsType::Union(vec![
        TsType::Primitive(TsPrimitive::String),
        TsType::Primitive(TsPrimitive::Number),
        TsType::Primitive(TsPrimitive::Boolean),
    ]);
    let string_map = |value: TsType| TsType::Record {
        key: Box::new(TsType::Primitive(TsPrimitive::String)),
        value: Box::new(value),
    };

    let properties = vec![
        optional_prop(
            "headers",
            TsType::Union(vec![
                TsType::Ref("HttpHeaders".into()),
                string_map(TsType::Union(vec![
                    TsType::Primitive(TsPrimitive::String),
                    TsType::Array(Box::new(TsType::Primitive(TsPrimitive::String))),
                ])),
            ]),
        ),
        optional_prop(
            "params",
            TsType::Union(vec![
                TsType::Ref("HttpParams".into()),
                string_map(TsType::Union(vec![
                    scalar.clone(),
                    TsType::generic("ReadonlyArray", vec![scalar]),
                ])),
            ]),
        ),
        optional_prop("context", TsType::Ref("HttpContext".into())),
        optional_prop("reportProgress", TsType::Primitive(TsPrimitive::Boolean)),
        optional_prop("withCredentials", TsType::Primitive(TsPrimitive::Boolean)),
        optional_prop("observe", TsType::Ref("TObserve".into())),
        optional_prop("responseType", TsType::Ref("TResponseType".into())),
    ];

    let options = TsTypeDef {
        name: REQUEST_OPTIONS.into(),
        docs: Some("Per-call overrides accepted by every generated service method.".into()),
        kind: TypeDefKind::GenericAlias {
            params: vec![
                TsTypeParam {
                    name: "TObserve".into(),
                    constraint: Some(any_observe()),
                    default: Some(TsType::string_literal("body")),
                },
                TsTypeParam {
                    name: "TResponseType".into(),
                    constraint: Some(literal_union(&kinds)),
                    default: Some(TsType::string_literal(ResponseKind::Json.as_str())),
                },
            ],
            ty: TsType::Object(properties),
        },
    };

    TsModule {
        header: config.header_comment.clone(),
        imports: vec![import(&["HttpContext", "HttpHeaders", "HttpParams"], ANGULAR_HTTP, true)],
        types: vec![options],
        ..TsModule::default()
    }
}

/// The base-path injection token, defaulting to the empty string.
fn codegen_tokens(config: &GeneratorConfig) -> TsModule {
    let token = &config.base_path_token;
    let init = TsExpr::New {
        callee: Box::new(TsExpr::ident("InjectionToken")),
        type_args: vec![TsType::Primitive(TsPrimitive::String)],
        args: vec![
            TsExpr::string(token),
            TsExpr::Object(vec![
                ObjectEntry::Prop("providedIn".into(), TsExpr::string("root")),
                ObjectEntry::Prop(
                    "factory".into(),
                    TsExpr::Arrow {
                        params: Vec::new(),
                        body: Box::new(TsExpr::string("")),
                    },
                ),
            ]),
        ],
    };

    TsModule {
        header: config.header_comment.clone(),
        imports: vec![import(&["InjectionToken"], ANGULAR_CORE, false)],
        statements: vec![TsStmt::Export(Box::new(TsStmt::VarDecl {
            kind: VarKind::Const,
            name: token.clone(),
            ty: None,
            init,
        }))],
        ..TsModule::default()
    }
}
