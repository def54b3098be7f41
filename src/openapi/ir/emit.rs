//! TypeScript code emission via the Emit trait.
//!
//! Each AST type renders itself to a string. Emission is purely mechanical:
//! every naming, ordering and typing decision was made before the AST was built.

use std::fmt::Write as _;

use super::types::{
    BinOp, EnumMember, ObjectEntry, TemplatePart, TsClass, TsExport, TsExpr, TsField, TsImport,
    TsLiteral, TsMethod, TsModule, TsParam, TsPrimitive, TsProp, TsSignature, TsStmt, TsType,
    TsTypeDef, TsTypeParam, TypeDefKind, VarKind,
};
use super::utils::{escape_js_string, quote_if_needed};

/// Trait for emitting TypeScript code from AST nodes.
pub trait Emit {
    /// Convert the AST node to its TypeScript string representation.
    fn emit(&self) -> String;
}

fn join<T: Emit>(items: &[T], sep: &str) -> String {
    items.iter().map(Emit::emit).collect::<Vec<_>>().join(sep)
}

/// Render documentation lines as a JSDoc block at the given indentation.
pub fn jsdoc(lines: &[String], indent: usize) -> String {
    let lines: Vec<&str> = lines
        .iter()
        .flat_map(|line| line.lines())
        .collect();
    if lines.is_empty() {
        return String::new();
    }

    let prefix = "  ".repeat(indent);
    let mut output = format!("{prefix}/**\n");
    for line in lines {
        let line = line.trim_end().replace("*/", "*\\/");
        if line.is_empty() {
            let _ = writeln!(output, "{prefix} *");
        } else {
            let _ = writeln!(output, "{prefix} * {line}");
        }
    }
    let _ = writeln!(output, "{prefix} */");
    output
}

fn docs_of(docs: Option<&String>) -> Vec<String> {
    docs.cloned().into_iter().collect()
}

// =============================================================================
// Primitive Types
// =============================================================================

impl Emit for TsPrimitive {
    fn emit(&self) -> String {
        match self {
            TsPrimitive::String => "string",
            TsPrimitive::Number => "number",
            TsPrimitive::Boolean => "boolean",
            TsPrimitive::Null => "null",
            TsPrimitive::Undefined => "undefined",
            TsPrimitive::Void => "void",
            TsPrimitive::Unknown => "unknown",
            TsPrimitive::Any => "any",
            TsPrimitive::Never => "never",
            TsPrimitive::Blob => "Blob",
            TsPrimitive::ArrayBuffer => "ArrayBuffer",
            TsPrimitive::Date => "Date",
        }
        .to_string()
    }
}

impl Emit for TsLiteral {
    fn emit(&self) -> String {
        match self {
            TsLiteral::String(s) => format!("\"{}\"", escape_js_string(s)),
            TsLiteral::Number(n) => n.to_string(),
            TsLiteral::Int(i) => i.to_string(),
            TsLiteral::Bool(b) => b.to_string(),
            TsLiteral::Null => "null".to_string(),
        }
    }
}

// =============================================================================
// Types
// =============================================================================

impl Emit for TsType {
    fn emit(&self) -> String {
        match self {
            TsType::Primitive(p) => p.emit(),
            TsType::Array(inner) => {
                let inner_str = inner.emit();
                if matches!(**inner, TsType::Union(_) | TsType::Intersection(_)) {
                    format!("({inner_str})[]")
                } else {
                    format!("{inner_str}[]")
                }
            }
            TsType::Tuple(items) => format!("[{}]", join(items, ", ")),
            TsType::Union(types) => join(types, " | "),
            TsType::Intersection(types) => types
                .iter()
                .map(|t| {
                    let s = t.emit();
                    if matches!(t, TsType::Union(_)) {
                        format!("({s})")
                    } else {
                        s
                    }
                })
                .collect::<Vec<_>>()
                .join(" & "),
            TsType::Object(props) => {
                if props.is_empty() {
                    "{}".to_string()
                } else {
                    format!("{{ {} }}", join(props, "; "))
                }
            }
            TsType::Record { key, value } => {
                format!("Record<{}, {}>", key.emit(), value.emit())
            }
            TsType::Literal(lit) => lit.emit(),
            TsType::Ref(name) => name.clone(),
            TsType::Generic { name, args } => format!("{name}<{}>", join(args, ", ")),
        }
    }
}

impl Emit for TsProp {
    fn emit(&self) -> String {
        let readonly = if self.readonly { "readonly " } else { "" };
        let opt = if self.optional { "?" } else { "" };
        format!("{readonly}{}{opt}: {}", quote_if_needed(&self.name), self.ty.emit())
    }
}

// =============================================================================
// Type Definitions
// =============================================================================

impl Emit for EnumMember {
    fn emit(&self) -> String {
        format!("{} = {}", quote_if_needed(&self.name), self.value.emit())
    }
}

impl Emit for TsTypeParam {
    fn emit(&self) -> String {
        let mut output = self.name.clone();
        if let Some(constraint) = &self.constraint {
            let _ = write!(output, " extends {}", constraint.emit());
        }
        if let Some(default) = &self.default {
            let _ = write!(output, " = {}", default.emit());
        }
        output
    }
}

fn emit_members(output: &mut String, properties: &[TsProp]) {
    for prop in properties {
        output.push_str(&jsdoc(&docs_of(prop.docs.as_ref()), 1));
        let _ = writeln!(output, "  {};", prop.emit());
    }
}

impl Emit for TsTypeDef {
    fn emit(&self) -> String {
        let mut output = jsdoc(&docs_of(self.docs.as_ref()), 0);
        match &self.kind {
            TypeDefKind::Interface { properties } => {
                let _ = writeln!(output, "export interface {} {{", self.name);
                emit_members(&mut output, properties);
                output.push_str("}\n");
            }
            TypeDefKind::TypeAlias { ty } => {
                let _ = writeln!(output, "export type {} = {};", self.name, ty.emit());
            }
            TypeDefKind::Enum { members } => {
                let _ = writeln!(output, "export enum {} {{", self.name);
                for member in members {
                    let _ = writeln!(output, "  {},", member.emit());
                }
                output.push_str("}\n");
            }
            TypeDefKind::GenericAlias { params, ty } => {
                let params = if params.is_empty() {
                    String::new()
                } else {
                    format!("<{}>", join(params, ", "))
                };
                let _ = write!(output, "export type {}{params}", self.name);
                match ty {
                    TsType::Object(properties) if !properties.is_empty() => {
                        output.push_str(" = {\n");
                        emit_members(&mut output, properties);
                        output.push_str("};\n");
                    }
                    other => {
                        let _ = writeln!(output, " = {};", other.emit());
                    }
                }
            }
        }
        output
    }
}

// =============================================================================
// Expressions
// =============================================================================

impl Emit for BinOp {
    fn emit(&self) -> String {
        match self {
            BinOp::StrictNotEqual => "!==".to_string(),
            BinOp::And => "&&".to_string(),
        }
    }
}

impl Emit for ObjectEntry {
    fn emit(&self) -> String {
        match self {
            ObjectEntry::Prop(key, value) => format!("{}: {}", quote_if_needed(key), value.emit()),
            ObjectEntry::Shorthand(name) => name.clone(),
            ObjectEntry::Spread(expr) => format!("...{}", expr.emit()),
        }
    }
}

impl Emit for TsExpr {
    fn emit(&self) -> String {
        match self {
            TsExpr::Ident(name) => name.clone(),
            TsExpr::Literal(lit) => lit.emit(),
            TsExpr::Call { callee, args } => format!("{}({})", callee.emit(), join(args, ", ")),
            TsExpr::Arrow { params, body } => format!("({}) => {}", join(params, ", "), body.emit()),
            TsExpr::Object(entries) => {
                if entries.is_empty() {
                    "{}".to_string()
                } else {
                    format!("{{ {} }}", join(entries, ", "))
                }
            }
            TsExpr::Member { object, prop } => format!("{}.{prop}", object.emit()),
            TsExpr::Template(parts) => {
                let content: String = parts
                    .iter()
                    .map(|p| match p {
                        TemplatePart::Static(s) => s.replace('`', "\\`").replace("${", "\\${"),
                        TemplatePart::Dynamic(e) => format!("${{{}}}", e.emit()),
                    })
                    .collect();
                format!("`{content}`")
            }
            TsExpr::BinOp { left, op, right } => {
                format!("{} {} {}", left.emit(), op.emit(), right.emit())
            }
            TsExpr::New {
                callee,
                type_args,
                args,
            } => {
                let type_args = if type_args.is_empty() {
                    String::new()
                } else {
                    format!("<{}>", join(type_args, ", "))
                };
                format!("new {}{type_args}({})", callee.emit(), join(args, ", "))
            }
        }
    }
}

impl Emit for TsParam {
    fn emit(&self) -> String {
        let opt = if self.optional { "?" } else { "" };
        match &self.ty {
            Some(ty) => format!("{}{opt}: {}", self.name, ty.emit()),
            None => format!("{}{opt}", self.name),
        }
    }
}

// =============================================================================
// Statements
// =============================================================================

impl Emit for VarKind {
    fn emit(&self) -> String {
        match self {
            VarKind::Const => "const".to_string(),
            VarKind::Let => "let".to_string(),
        }
    }
}

impl Emit for TsStmt {
    fn emit(&self) -> String {
        self.emit_indented(0)
    }
}

impl TsStmt {
    /// Emit with specified indentation level (2 spaces per level)
    pub fn emit_indented(&self, indent: usize) -> String {
        let prefix = "  ".repeat(indent);
        match self {
            TsStmt::VarDecl { kind, name, ty, init } => {
                let ty_str = ty.as_ref().map(|t| format!(": {}", t.emit())).unwrap_or_default();
                format!("{prefix}{} {name}{ty_str} = {};\n", kind.emit(), init.emit())
            }
            TsStmt::Assign { target, value } => format!("{prefix}{target} = {};\n", value.emit()),
            TsStmt::Expr(expr) => format!("{prefix}{};\n", expr.emit()),
            TsStmt::Return(expr) => match expr {
                Some(e) => format!("{prefix}return {};\n", e.emit()),
                None => format!("{prefix}return;\n"),
            },
            TsStmt::If { cond, then_body } => {
                let mut output = format!("{prefix}if ({}) {{\n", cond.emit());
                for stmt in then_body {
                    output.push_str(&stmt.emit_indented(indent + 1));
                }
                let _ = writeln!(output, "{prefix}}}");
                output
            }
            TsStmt::Export(inner) => format!("{prefix}export {}", inner.emit_indented(0)),
            TsStmt::Blank => "\n".to_string(),
        }
    }
}

// =============================================================================
// Classes
// =============================================================================

impl Emit for TsSignature {
    fn emit(&self) -> String {
        format!("({}): {}", join(&self.params, ", "), self.return_type.emit())
    }
}

impl Emit for TsField {
    fn emit(&self) -> String {
        let private = if self.private { "private " } else { "" };
        let readonly = if self.readonly { "readonly " } else { "" };
        format!("  {private}{readonly}{} = {};\n", self.name, self.init.emit())
    }
}

impl Emit for TsMethod {
    fn emit(&self) -> String {
        let mut output = jsdoc(&self.docs, 1);
        for overload in &self.overloads {
            let _ = writeln!(output, "  {}{};", self.name, overload.emit());
        }
        let _ = writeln!(output, "  {}{} {{", self.name, self.implementation.emit());
        for stmt in &self.body {
            output.push_str(&stmt.emit_indented(2));
        }
        output.push_str("  }\n");
        output
    }
}

impl Emit for TsClass {
    fn emit(&self) -> String {
        let mut output = String::new();
        for decorator in &self.decorators {
            let _ = writeln!(output, "@{}", decorator.emit());
        }
        let _ = writeln!(output, "export class {} {{", self.name);
        for field in &self.fields {
            output.push_str(&field.emit());
        }
        for method in &self.methods {
            output.push('\n');
            output.push_str(&method.emit());
        }
        output.push_str("}\n");
        output
    }
}

// =============================================================================
// Imports and exports
// =============================================================================

impl Emit for TsImport {
    fn emit(&self) -> String {
        let type_keyword = if self.type_only { "type " } else { "" };
        format!(
            "import {type_keyword}{{ {} }} from \"{}\";\n",
            self.items.join(", "),
            self.from
        )
    }
}

impl Emit for TsExport {
    fn emit(&self) -> String {
        if self.items.is_empty() {
            format!("export * from \"{}\";\n", self.from)
        } else {
            format!("export {{ {} }} from \"{}\";\n", self.items.join(", "), self.from)
        }
    }
}

// =============================================================================
// Module
// =============================================================================

impl Emit for TsModule {
    fn emit(&self) -> String {
        let mut sections = Vec::new();

        if !self.header.is_empty() {
            sections.push(self.header.trim_end().to_string() + "\n");
        }
        if !self.imports.is_empty() {
            sections.push(join(&self.imports, ""));
        }
        for type_def in &self.types {
            sections.push(type_def.emit());
        }
        if !self.statements.is_empty() {
            sections.push(join(&self.statements, ""));
        }
        for class in &self.classes {
            sections.push(class.emit());
        }
        if !self.exports.is_empty() {
            sections.push(join(&self.exports, ""));
        }

        sections.join("\n")
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn prop(name: &str, ty: TsType, optional: bool) -> TsProp {
        TsProp {
            name: name.into(),
            ty,
            optional,
            readonly: false,
            docs: None,
        }
    }

    #[test]
    fn test_emit_literal() {
        assert_eq!(TsLiteral::String("say \"hi\"".into()).emit(), "\"say \\\"hi\\\"\"");
        assert_eq!(TsLiteral::Number(2.5).emit(), "2.5");
        assert_eq!(TsLiteral::Int(-3).emit(), "-3");
        assert_eq!(TsLiteral::Null.emit(), "null");
    }

    #[test]
    fn test_emit_union_array_and_intersection() {
        let union = TsType::Union(vec![
            TsType::Primitive(TsPrimitive::String),
            TsType::Primitive(TsPrimitive::Null),
        ]);
        assert_eq!(TsType::Array(Box::new(union.clone())).emit(), "(string | null)[]");

        let intersection = TsType::Intersection(vec![TsType::Ref("Base".into()), union]);
        assert_eq!(intersection.emit(), "Base & (string | null)");
    }

    #[test]
    fn test_emit_tuple_record_and_generic() {
        let tuple = TsType::Tuple(vec![
            TsType::Primitive(TsPrimitive::Number),
            TsType::Primitive(TsPrimitive::String),
        ]);
        assert_eq!(tuple.emit(), "[number, string]");

        let record = TsType::Record {
            key: Box::new(TsType::Primitive(TsPrimitive::String)),
            value: Box::new(TsType::Primitive(TsPrimitive::Never)),
        };
        assert_eq!(record.emit(), "Record<string, never>");

        let observable = TsType::generic(
            "Observable",
            vec![TsType::generic("HttpEvent", vec![TsType::Ref("User".into())])],
        );
        assert_eq!(observable.emit(), "Observable<HttpEvent<User>>");
    }

    #[test]
    fn test_emit_object_type() {
        let ty = TsType::Object(vec![
            prop("id", TsType::Primitive(TsPrimitive::Number), false),
            prop("x-trace", TsType::Primitive(TsPrimitive::String), true),
        ]);
        assert_eq!(ty.emit(), "{ id: number; \"x-trace\"?: string }");
    }

    #[test]
    fn test_emit_interface_with_docs() {
        let mut owner = prop("owner", TsType::Ref("Owner".into()), true);
        owner.docs = Some("Current owner.".into());
        owner.readonly = true;
        let def = TsTypeDef {
            name: "Pet".into(),
            docs: Some("A pet.\nSecond line.".into()),
            kind: TypeDefKind::Interface {
                properties: vec![prop("id", TsType::Primitive(TsPrimitive::Number), false), owner],
            },
        };
        let expected = "/**\n * A pet.\n * Second line.\n */\nexport interface Pet {\n  id: number;\n  /**\n   * Current owner.\n   */\n  readonly owner?: Owner;\n}\n";
        assert_eq!(def.emit(), expected);
    }

    #[test]
    fn test_emit_enum() {
        let def = TsTypeDef {
            name: "Status".into(),
            docs: None,
            kind: TypeDefKind::Enum {
                members: vec![
                    EnumMember { name: "ACTIVE".into(), value: TsLiteral::Int(0) },
                    EnumMember { name: "ON_HOLD".into(), value: TsLiteral::Int(1) },
                ],
            },
        };
        assert_eq!(def.emit(), "export enum Status {\n  ACTIVE = 0,\n  ON_HOLD = 1,\n}\n");
    }

    #[test]
    fn test_emit_generic_alias() {
        let def = TsTypeDef {
            name: "Options".into(),
            docs: None,
            kind: TypeDefKind::GenericAlias {
                params: vec![TsTypeParam {
                    name: "T".into(),
                    constraint: Some(TsType::Primitive(TsPrimitive::String)),
                    default: Some(TsType::string_literal("json")),
                }],
                ty: TsType::Object(vec![prop("kind", TsType::Ref("T".into()), true)]),
            },
        };
        assert_eq!(
            def.emit(),
            "export type Options<T extends string = \"json\"> = {\n  kind?: T;\n};\n"
        );
    }

    #[test]
    fn test_emit_statements() {
        let stmt = TsStmt::If {
            cond: TsExpr::ident("page")
                .bin(BinOp::StrictNotEqual, TsExpr::ident("undefined"))
                .bin(BinOp::And, TsExpr::ident("page").bin(BinOp::StrictNotEqual, TsExpr::Literal(TsLiteral::Null))),
            then_body: vec![TsStmt::Assign {
                target: "params".into(),
                value: TsExpr::ident("params").member("set").call(vec![
                    TsExpr::string("page"),
                    TsExpr::ident("String").call(vec![TsExpr::ident("page")]),
                ]),
            }],
        };
        assert_eq!(
            stmt.emit_indented(1),
            "  if (page !== undefined && page !== null) {\n    params = params.set(\"page\", String(page));\n  }\n"
        );

        let decl = TsStmt::Export(Box::new(TsStmt::VarDecl {
            kind: VarKind::Const,
            name: "BASE_PATH".into(),
            ty: None,
            init: TsExpr::New {
                callee: Box::new(TsExpr::ident("InjectionToken")),
                type_args: vec![TsType::Primitive(TsPrimitive::String)],
                args: vec![TsExpr::string("BASE_PATH")],
            },
        }));
        assert_eq!(
            decl.emit(),
            "export const BASE_PATH = new InjectionToken<string>(\"BASE_PATH\");\n"
        );
    }

    #[test]
    fn test_emit_template_and_object() {
        let url = TsExpr::Template(vec![
            TemplatePart::Dynamic(TsExpr::ident("this").member("basePath")),
            TemplatePart::Static("/users/".into()),
            TemplatePart::Dynamic(TsExpr::ident("id")),
        ]);
        assert_eq!(url.emit(), "`${this.basePath}/users/${id}`");

        let options = TsExpr::Object(vec![
            ObjectEntry::Spread(TsExpr::ident("options")),
            ObjectEntry::Prop("responseType".into(), TsExpr::string("blob")),
            ObjectEntry::Shorthand("params".into()),
        ]);
        assert_eq!(options.emit(), "{ ...options, responseType: \"blob\", params }");
    }

    #[test]
    fn test_emit_class_with_overloads() {
        let sig = |ret: &str| TsSignature {
            params: vec![TsParam {
                name: "id".into(),
                ty: Some(TsType::Primitive(TsPrimitive::Number)),
                optional: false,
            }],
            return_type: TsType::Ref(ret.into()),
        };
        let class = TsClass {
            name: "PetsService".into(),
            decorators: vec![TsExpr::ident("Injectable").call(Vec::new())],
            fields: vec![TsField {
                name: "httpClient".into(),
                private: true,
                readonly: true,
                init: TsExpr::ident("inject").call(vec![TsExpr::ident("HttpClient")]),
            }],
            methods: vec![TsMethod {
                name: "get".into(),
                docs: vec!["Fetch a pet.".into(), "@deprecated".into()],
                overloads: vec![sig("A")],
                implementation: sig("B"),
                body: vec![TsStmt::Return(Some(TsExpr::ident("x")))],
            }],
        };
        let expected = "@Injectable()\nexport class PetsService {\n  private readonly httpClient = inject(HttpClient);\n\n  /**\n   * Fetch a pet.\n   * @deprecated\n   */\n  get(id: number): A;\n  get(id: number): B {\n    return x;\n  }\n}\n";
        assert_eq!(class.emit(), expected);
    }

    #[test]
    fn test_emit_module_sections() {
        let module = TsModule {
            header: "/* generated */\n".into(),
            imports: vec![TsImport {
                items: vec!["Pet".into()],
                from: "../models".into(),
                type_only: true,
            }],
            exports: vec![
                TsExport { items: Vec::new(), from: "./pets.service".into() },
                TsExport { items: vec!["BASE_PATH".into()], from: "./tokens".into() },
            ],
            ..TsModule::default()
        };
        assert_eq!(
            module.emit(),
            "/* generated */\n\nimport type { Pet } from \"../models\";\n\nexport * from \"./pets.service\";\nexport { BASE_PATH } from \"./tokens\";\n"
        );
    }

    #[test]
    fn test_jsdoc_escapes_comment_terminator() {
        assert_eq!(jsdoc(&["a */ b".into()], 0), "/**\n * a *\\/ b\n */\n");
        assert_eq!(jsdoc(&[], 0), "");
    }
}
