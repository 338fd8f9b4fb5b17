use crate::discover::DiscoveryError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

/// Resolved view of a program's declared types.
///
/// The graph is read-only once built. Types are kept in declaration order,
/// which is the order discovery reports controllers in.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SymbolGraph {
    pub types: Vec<TypeDecl>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl SymbolGraph {
    pub fn new(types: Vec<TypeDecl>) -> Self {
        let mut graph = Self {
            types,
            index: HashMap::new(),
        };
        graph.rebuild_index();
        graph
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Err(DiscoveryError::EmptyGraphInput.into());
        }
        let mut graph: SymbolGraph = serde_json::from_str(raw).context("parse symbol graph")?;
        for param in graph
            .types
            .iter_mut()
            .flat_map(|ty| ty.methods.iter_mut())
            .flat_map(|method| method.parameters.iter_mut())
        {
            if let Some(ConstantExpr::Constant(value)) = &mut param.default_value {
                *value = std::mem::replace(value, Constant::Null).for_type(&param.ty);
            }
        }
        Ok(Self::new(graph.types))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = crate::util::read_to_string(path)?;
        Self::from_json_str(&raw).with_context(|| format!("load {}", path.display()))
    }

    /// Look up a type by its fully qualified name.
    pub fn get(&self, full_name: &str) -> Option<&TypeDecl> {
        if let Some(idx) = self.index.get(full_name) {
            return self.types.get(*idx);
        }
        // Graphs deserialized without `new` have no index yet.
        if self.index.is_empty() {
            return self.types.iter().find(|ty| ty.full_name() == full_name);
        }
        None
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    fn rebuild_index(&mut self) {
        self.index.clear();
        for (idx, ty) in self.types.iter().enumerate() {
            // First declaration wins for partial or duplicate names.
            self.index.entry(ty.full_name()).or_insert(idx);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    Class,
    Struct,
    Interface,
    Record,
    Enum,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Accessibility {
    Public,
    Internal,
    Protected,
    ProtectedInternal,
    PrivateProtected,
    #[default]
    Private,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeDecl {
    /// Simple name; nested types carry their containers, e.g. `Outer.Inner`.
    pub name: String,
    #[serde(default)]
    pub namespace: String,
    pub kind: TypeKind,
    #[serde(default)]
    pub accessibility: Accessibility,
    #[serde(default)]
    pub is_abstract: bool,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub is_generic: bool,
    /// Fully qualified generic definition name of the base class.
    #[serde(default)]
    pub base_type: Option<String>,
    #[serde(default)]
    pub interfaces: Vec<String>,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    #[serde(default)]
    pub methods: Vec<MethodDecl>,
}

impl TypeDecl {
    pub fn full_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }

    /// Name without any containing type prefix.
    pub fn short_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodKind {
    #[default]
    Ordinary,
    Constructor,
    StaticConstructor,
    Destructor,
    PropertyAccessor,
    EventAccessor,
    Operator,
    Conversion,
}

impl MethodKind {
    pub fn is_special(self) -> bool {
        !matches!(self, MethodKind::Ordinary)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodDecl {
    pub name: String,
    #[serde(default)]
    pub kind: MethodKind,
    #[serde(default)]
    pub accessibility: Accessibility,
    #[serde(default)]
    pub is_static: bool,
    /// Declares its own type parameters, e.g. `Go<T>()`.
    #[serde(default)]
    pub is_generic: bool,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    #[serde(default)]
    pub parameters: Vec<ParameterDecl>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    /// Declared default. `Some(Unresolved)` when the declaration has one that
    /// could not be evaluated to a constant.
    #[serde(default)]
    pub default_value: Option<ConstantExpr>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attribute {
    /// Fully qualified attribute type name, e.g. `Microsoft.AspNetCore.Mvc.AreaAttribute`.
    pub name: String,
    #[serde(default)]
    pub arguments: Vec<ConstantExpr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstantExpr {
    Constant(Constant),
    Unresolved(String),
}

impl ConstantExpr {
    pub fn as_constant(&self) -> Option<&Constant> {
        match self {
            ConstantExpr::Constant(value) => Some(value),
            ConstantExpr::Unresolved(_) => None,
        }
    }
}

/// An already evaluated compile-time constant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Constant {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    String(String),
    Char(char),
}

impl Constant {
    /// The value as a parameter of type `ty` holds it: integers widen to
    /// floating point, and a one-character string becomes a `char`.
    ///
    /// Graph JSON writes chars as strings, so loading relies on this to
    /// recover `Char` defaults.
    pub fn for_type(self, ty: &TypeRef) -> Constant {
        let target = match ty {
            TypeRef::Primitive { primitive } => Some(*primitive),
            TypeRef::Nullable { underlying } => match underlying.as_ref() {
                TypeRef::Primitive { primitive } => Some(*primitive),
                _ => None,
            },
            _ => None,
        };
        match (target, self) {
            (Some(Primitive::Double | Primitive::Float | Primitive::Decimal), Constant::Int(v)) => {
                Constant::Float(v as f64)
            }
            (Some(Primitive::Double | Primitive::Float | Primitive::Decimal), Constant::UInt(v)) => {
                Constant::Float(v as f64)
            }
            (Some(Primitive::Char), Constant::String(value)) => {
                let mut chars = value.chars();
                match (chars.next(), chars.next()) {
                    (Some(ch), None) => Constant::Char(ch),
                    _ => Constant::String(value),
                }
            }
            (_, other) => other,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Constant::String(value) => Some(value),
            _ => None,
        }
    }
}

impl From<&str> for Constant {
    fn from(value: &str) -> Self {
        Constant::String(value.to_string())
    }
}

impl From<i64> for Constant {
    fn from(value: i64) -> Self {
        Constant::Int(value)
    }
}

impl From<bool> for Constant {
    fn from(value: bool) -> Self {
        Constant::Bool(value)
    }
}

/// Built-in types that render with their keyword alias.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Primitive {
    Bool,
    Byte,
    SByte,
    Char,
    Decimal,
    Double,
    Float,
    Int,
    UInt,
    Long,
    ULong,
    Short,
    UShort,
    Object,
    String,
    NInt,
    NUInt,
}

static PRIMITIVES: &[(Primitive, &str, &str)] = &[
    (Primitive::Bool, "bool", "System.Boolean"),
    (Primitive::Byte, "byte", "System.Byte"),
    (Primitive::SByte, "sbyte", "System.SByte"),
    (Primitive::Char, "char", "System.Char"),
    (Primitive::Decimal, "decimal", "System.Decimal"),
    (Primitive::Double, "double", "System.Double"),
    (Primitive::Float, "float", "System.Single"),
    (Primitive::Int, "int", "System.Int32"),
    (Primitive::UInt, "uint", "System.UInt32"),
    (Primitive::Long, "long", "System.Int64"),
    (Primitive::ULong, "ulong", "System.UInt64"),
    (Primitive::Short, "short", "System.Int16"),
    (Primitive::UShort, "ushort", "System.UInt16"),
    (Primitive::Object, "object", "System.Object"),
    (Primitive::String, "string", "System.String"),
    (Primitive::NInt, "nint", "System.IntPtr"),
    (Primitive::NUInt, "nuint", "System.UIntPtr"),
];

impl Primitive {
    pub fn keyword(self) -> &'static str {
        PRIMITIVES
            .iter()
            .find(|(prim, _, _)| *prim == self)
            .map(|(_, keyword, _)| *keyword)
            .unwrap_or("object")
    }

    pub fn from_keyword(raw: &str) -> Option<Self> {
        PRIMITIVES
            .iter()
            .find(|(_, keyword, _)| *keyword == raw)
            .map(|(prim, _, _)| *prim)
    }

    pub fn from_full_name(raw: &str) -> Option<Self> {
        PRIMITIVES
            .iter()
            .find(|(_, _, full)| *full == raw)
            .map(|(prim, _, _)| *prim)
    }
}

/// Shape of a parameter's type reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum TypeRef {
    Primitive { primitive: Primitive },
    Named { full_name: String },
    Generic { full_name: String, arguments: Vec<TypeRef> },
    Array { element: Box<TypeRef>, rank: usize },
    Nullable { underlying: Box<TypeRef> },
}

impl TypeRef {
    pub fn primitive(primitive: Primitive) -> Self {
        TypeRef::Primitive { primitive }
    }

    pub fn named(full_name: impl Into<String>) -> Self {
        // Framework names for built-ins still render as their alias.
        let full_name = full_name.into();
        match Primitive::from_full_name(&full_name) {
            Some(primitive) => TypeRef::Primitive { primitive },
            None => TypeRef::Named { full_name },
        }
    }

    pub fn generic(full_name: impl Into<String>, arguments: Vec<TypeRef>) -> Self {
        TypeRef::Generic {
            full_name: full_name.into(),
            arguments,
        }
    }

    pub fn array(element: TypeRef) -> Self {
        TypeRef::Array {
            element: Box::new(element),
            rank: 1,
        }
    }

    pub fn nullable(underlying: TypeRef) -> Self {
        TypeRef::Nullable {
            underlying: Box::new(underlying),
        }
    }
}

/// Canonical text: keyword aliases for built-ins, fully qualified names
/// otherwise, applied recursively through generic arguments and arrays.
impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Primitive { primitive } => f.write_str(primitive.keyword()),
            TypeRef::Named { full_name } => f.write_str(full_name),
            TypeRef::Generic {
                full_name,
                arguments,
            } => {
                f.write_str(full_name)?;
                f.write_str("<")?;
                for (idx, arg) in arguments.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(">")
            }
            TypeRef::Array { element, rank } => {
                write!(f, "{element}[")?;
                for _ in 1..(*rank).max(1) {
                    f.write_str(",")?;
                }
                f.write_str("]")
            }
            TypeRef::Nullable { underlying } => write!(f, "{underlying}?"),
        }
    }
}
