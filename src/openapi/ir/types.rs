//! TypeScript IR types for code generation.
//!
//! This module defines the TypeScript side of the pipeline:
//! - TsType: type expressions (primitives, arrays, tuples, unions, objects, ...)
//! - TsTypeDef: registry entries (interfaces, aliases, enums)
//! - TsExpr / TsStmt / TsClass: the small statement AST used for service classes

use std::collections::BTreeSet;

/// TypeScript type representation
#[derive(Debug, Clone, PartialEq)]
pub enum TsType {
    /// Primitive and built-in types: string, number, Blob, ...
    Primitive(TsPrimitive),
    /// Array type: T[]
    Array(Box<TsType>),
    /// Fixed-length tuple: [A, B]
    Tuple(Vec<TsType>),
    /// Union type: A | B | C
    Union(Vec<TsType>),
    /// Intersection type: A & B & C
    Intersection(Vec<TsType>),
    /// Object type: { foo: string; bar?: number }
    Object(Vec<TsProp>),
    /// Record type: Record<K, V>
    Record {
        /// Key type
        key: Box<TsType>,
        /// Value type
        value: Box<TsType>,
    },
    /// Literal type: "foo", 42, true
    Literal(TsLiteral),
    /// Named reference to a registry entry
    Ref(String),
    /// Generic application: Observable<T>, RequestOptions<"body", "json">
    Generic {
        /// Generic type name
        name: String,
        /// Type arguments
        args: Vec<TsType>,
    },
}

impl TsType {
    /// The `unknown` placeholder.
    pub fn unknown() -> Self {
        TsType::Primitive(TsPrimitive::Unknown)
    }

    /// The `any` placeholder.
    pub fn any() -> Self {
        TsType::Primitive(TsPrimitive::Any)
    }

    /// True for the `unknown`/`any` placeholders that composite joins discard.
    pub fn is_placeholder(&self) -> bool {
        matches!(
            self,
            TsType::Primitive(TsPrimitive::Unknown | TsPrimitive::Any)
        )
    }

    /// Generic application helper.
    pub fn generic(name: impl Into<String>, args: Vec<TsType>) -> Self {
        TsType::Generic {
            name: name.into(),
            args,
        }
    }

    /// String literal type helper.
    pub fn string_literal(value: impl Into<String>) -> Self {
        TsType::Literal(TsLiteral::String(value.into()))
    }

    /// Registry name when this is a plain reference.
    pub fn ref_name(&self) -> Option<&str> {
        match self {
            TsType::Ref(name) => Some(name),
            _ => None,
        }
    }

    /// Collect every registry name referenced anywhere inside this type.
    pub fn collect_refs(&self, out: &mut BTreeSet<String>) {
        match self {
            TsType::Ref(name) => {
                out.insert(name.clone());
            }
            TsType::Array(inner) => inner.collect_refs(out),
            TsType::Tuple(items) | TsType::Union(items) | TsType::Intersection(items) => {
                for item in items {
                    item.collect_refs(out);
                }
            }
            TsType::Object(props) => {
                for prop in props {
                    prop.ty.collect_refs(out);
                }
            }
            TsType::Record { key, value } => {
                key.collect_refs(out);
                value.collect_refs(out);
            }
            TsType::Generic { args, .. } => {
                for arg in args {
                    arg.collect_refs(out);
                }
            }
            TsType::Primitive(_) | TsType::Literal(_) => {}
        }
    }
}

/// TypeScript primitive and built-in types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TsPrimitive {
    /// `string`
    String,
    /// `number`
    Number,
    /// `boolean`
    Boolean,
    /// `null`
    Null,
    /// `undefined`
    Undefined,
    /// `void`
    Void,
    /// `unknown`
    Unknown,
    /// `any`
    Any,
    /// `never`
    Never,
    /// `Blob`
    Blob,
    /// `ArrayBuffer`
    ArrayBuffer,
    /// `Date`
    Date,
}

/// Object property definition
#[derive(Debug, Clone, PartialEq)]
pub struct TsProp {
    /// Property key; quoted on output when not an identifier.
    pub name: String,
    /// Property type
    pub ty: TsType,
    /// Rendered with `?`
    pub optional: bool,
    /// Rendered with `readonly`
    pub readonly: bool,
    /// Doc comment text
    pub docs: Option<String>,
}

/// TypeScript literal values
#[derive(Debug, Clone, PartialEq)]
pub enum TsLiteral {
    /// "text"
    String(String),
    /// 1.5
    Number(f64),
    /// 42
    Int(i64),
    /// true
    Bool(bool),
    /// null
    Null,
}

/// A labelled member of a TypeScript `enum`.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumMember {
    /// Member label
    pub name: String,
    /// Initializer
    pub value: TsLiteral,
}

/// Type definition kind
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDefKind {
    /// interface Foo { ... }
    Interface {
        /// Properties in declaration order
        properties: Vec<TsProp>,
    },
    /// type Foo = ...
    TypeAlias {
        /// Aliased type
        ty: TsType,
    },
    /// enum Foo { A = 0, B = 1 }
    Enum {
        /// Members in declaration order
        members: Vec<EnumMember>,
    },
    /// type Foo<T extends X = Y> = ...
    GenericAlias {
        /// Type parameters
        params: Vec<TsTypeParam>,
        /// Aliased type
        ty: TsType,
    },
}

/// Type parameter of a generic alias.
#[derive(Debug, Clone, PartialEq)]
pub struct TsTypeParam {
    /// Parameter name
    pub name: String,
    /// `extends` bound
    pub constraint: Option<TsType>,
    /// Default type
    pub default: Option<TsType>,
}

/// A registry entry: one named, exported type.
#[derive(Debug, Clone, PartialEq)]
pub struct TsTypeDef {
    /// Canonical name
    pub name: String,
    /// Doc comment text
    pub docs: Option<String>,
    /// Declaration form
    pub kind: TypeDefKind,
}

// =============================================================================
// Statement AST (service classes)
// =============================================================================

/// TypeScript expression
#[derive(Debug, Clone)]
pub enum TsExpr {
    /// Identifier: foo
    Ident(String),
    /// Literal value: "bar", 42
    Literal(TsLiteral),
    /// Function call: foo(a, b)
    Call {
        /// Called expression
        callee: Box<TsExpr>,
        /// Arguments
        args: Vec<TsExpr>,
    },
    /// Arrow function with an expression body: () => ""
    Arrow {
        /// Parameters
        params: Vec<TsParam>,
        /// Returned expression
        body: Box<TsExpr>,
    },
    /// Object literal: { ...options, params, body: formData }
    Object(Vec<ObjectEntry>),
    /// Member access: foo.bar
    Member {
        /// Accessed object
        object: Box<TsExpr>,
        /// Property name
        prop: String,
    },
    /// Template literal: `${foo}/bar`
    Template(Vec<TemplatePart>),
    /// Binary expression: a !== undefined
    BinOp {
        /// Left operand
        left: Box<TsExpr>,
        /// Operator
        op: BinOp,
        /// Right operand
        right: Box<TsExpr>,
    },
    /// Constructor call: new HttpParams()
    New {
        /// Constructed class
        callee: Box<TsExpr>,
        /// Generic arguments
        type_args: Vec<TsType>,
        /// Constructor arguments
        args: Vec<TsExpr>,
    },
}

impl TsExpr {
    /// Identifier helper.
    pub fn ident(name: impl Into<String>) -> Self {
        TsExpr::Ident(name.into())
    }

    /// String literal helper.
    pub fn string(value: impl Into<String>) -> Self {
        TsExpr::Literal(TsLiteral::String(value.into()))
    }

    /// `object.prop`
    pub fn member(self, prop: impl Into<String>) -> Self {
        TsExpr::Member {
            object: Box::new(self),
            prop: prop.into(),
        }
    }

    /// `self(args)`
    pub fn call(self, args: Vec<TsExpr>) -> Self {
        TsExpr::Call {
            callee: Box::new(self),
            args,
        }
    }

    /// `left op right`
    pub fn bin(self, op: BinOp, right: TsExpr) -> Self {
        TsExpr::BinOp {
            left: Box::new(self),
            op,
            right: Box::new(right),
        }
    }
}

/// Entry of an object literal
#[derive(Debug, Clone)]
pub enum ObjectEntry {
    /// key: value
    Prop(String, TsExpr),
    /// Shorthand property: { params }
    Shorthand(String),
    /// Spread: ...options
    Spread(TsExpr),
}

/// Binary operators
#[derive(Debug, Clone, Copy)]
pub enum BinOp {
    /// !==
    StrictNotEqual,
    /// &&
    And,
}

/// Function or method parameter
#[derive(Debug, Clone)]
pub struct TsParam {
    /// Parameter name
    pub name: String,
    /// Annotation, omitted when `None`
    pub ty: Option<TsType>,
    /// Rendered with `?`
    pub optional: bool,
}

/// Template literal part
#[derive(Debug, Clone)]
pub enum TemplatePart {
    /// Static string part
    Static(String),
    /// Dynamic expression part: ${expr}
    Dynamic(TsExpr),
}

/// Statement in a method body
#[derive(Debug, Clone)]
pub enum TsStmt {
    /// const/let declaration
    VarDecl {
        /// const or let
        kind: VarKind,
        /// Declared name
        name: String,
        /// Annotation
        ty: Option<TsType>,
        /// Initializer
        init: TsExpr,
    },
    /// Assignment: params = params.set(...)
    Assign {
        /// Assigned variable
        target: String,
        /// New value
        value: TsExpr,
    },
    /// Expression statement
    Expr(TsExpr),
    /// Return statement
    Return(Option<TsExpr>),
    /// If statement without else
    If {
        /// Condition
        cond: TsExpr,
        /// Statements run when the condition holds
        then_body: Vec<TsStmt>,
    },
    /// `export` applied to a declaration
    Export(Box<TsStmt>),
    /// Empty line separating statement groups
    Blank,
}

/// Variable declaration kind
#[derive(Debug, Clone, Copy)]
pub enum VarKind {
    /// const
    Const,
    /// let
    Let,
}

/// One callable signature of a class method
#[derive(Debug, Clone)]
pub struct TsSignature {
    /// Parameters
    pub params: Vec<TsParam>,
    /// Return annotation
    pub return_type: TsType,
}

/// Class method: overload signatures followed by the implementation
#[derive(Debug, Clone)]
pub struct TsMethod {
    /// Method name
    pub name: String,
    /// Doc comment lines
    pub docs: Vec<String>,
    /// Overload signatures, emitted without bodies
    pub overloads: Vec<TsSignature>,
    /// Signature of the implementation
    pub implementation: TsSignature,
    /// Implementation body
    pub body: Vec<TsStmt>,
}

/// Class field with an initializer
#[derive(Debug, Clone)]
pub struct TsField {
    /// Field name
    pub name: String,
    /// Rendered with `private`
    pub private: bool,
    /// Rendered with `readonly`
    pub readonly: bool,
    /// Initializer
    pub init: TsExpr,
}

/// Exported class
#[derive(Debug, Clone)]
pub struct TsClass {
    /// Class name
    pub name: String,
    /// Decorator expressions, without the `@`
    pub decorators: Vec<TsExpr>,
    /// Fields in order
    pub fields: Vec<TsField>,
    /// Methods in order
    pub methods: Vec<TsMethod>,
}

// =============================================================================
// Module-Level IR (for printer)
// =============================================================================

/// Import statement
#[derive(Debug, Clone)]
pub struct TsImport {
    /// Items to import
    pub items: Vec<String>,
    /// Module path
    pub from: String,
    /// Whether this is a type-only import
    pub type_only: bool,
}

/// Re-export statement; an empty item list re-exports everything.
#[derive(Debug, Clone)]
pub struct TsExport {
    /// Re-exported names
    pub items: Vec<String>,
    /// Module path
    pub from: String,
}

/// Complete TypeScript module
#[derive(Debug, Clone, Default)]
pub struct TsModule {
    /// Banner comment
    pub header: String,
    /// Import statements
    pub imports: Vec<TsImport>,
    /// Exported type declarations
    pub types: Vec<TsTypeDef>,
    /// Top-level statements
    pub statements: Vec<TsStmt>,
    /// Exported classes
    pub classes: Vec<TsClass>,
    /// Re-export statements
    pub exports: Vec<TsExport>,
}
