use crate::csharp::literal;
use crate::csharp::syntax::{
    RawAttribute, RawFile, RawMethod, RawType, RawTypeSyntax, Scope, accessibility_from_modifiers,
};
use crate::symbols::{
    Accessibility, Attribute, MethodDecl, ParameterDecl, Primitive, SymbolGraph, TypeDecl,
    TypeKind, TypeRef,
};
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KnownKind {
    Class,
    Interface,
}

struct KnownNamespace {
    namespace: &'static str,
    classes: &'static [&'static str],
    interfaces: &'static [&'static str],
}

/// Framework and base-library types a source-only front end cannot see.
static KNOWN_TYPES: &[KnownNamespace] = &[
    KnownNamespace {
        namespace: "System",
        classes: &[
            "Boolean", "Byte", "SByte", "Char", "Decimal", "Double", "Single", "Int16", "UInt16",
            "Int32", "UInt32", "Int64", "UInt64", "IntPtr", "UIntPtr", "Object", "String", "Guid",
            "DateTime", "DateTimeOffset", "DateOnly", "TimeOnly", "TimeSpan", "Uri", "Nullable",
            "Attribute", "Exception", "Version", "Tuple", "ValueTuple", "Lazy", "Func", "Action",
        ],
        interfaces: &["IDisposable", "IAsyncDisposable", "IComparable", "IEquatable"],
    },
    KnownNamespace {
        namespace: "System.Collections.Generic",
        classes: &[
            "List", "Dictionary", "HashSet", "SortedDictionary", "SortedList", "SortedSet",
            "LinkedList", "Queue", "Stack", "KeyValuePair",
        ],
        interfaces: &[
            "IEnumerable", "ICollection", "IList", "IDictionary", "ISet", "IReadOnlyCollection",
            "IReadOnlyList", "IReadOnlyDictionary", "IReadOnlySet", "IAsyncEnumerable",
        ],
    },
    KnownNamespace {
        namespace: "System.Threading",
        classes: &["CancellationToken"],
        interfaces: &[],
    },
    KnownNamespace {
        namespace: "System.Threading.Tasks",
        classes: &["Task", "ValueTask"],
        interfaces: &[],
    },
    KnownNamespace {
        namespace: "Microsoft.AspNetCore.Mvc",
        classes: &[
            "Controller", "ControllerBase", "AreaAttribute", "NonActionAttribute",
            "NonControllerAttribute", "ActionNameAttribute", "RouteAttribute", "HttpGetAttribute",
            "HttpPostAttribute", "HttpPutAttribute", "HttpDeleteAttribute", "HttpPatchAttribute",
            "FromQueryAttribute", "FromRouteAttribute", "FromBodyAttribute", "FromFormAttribute",
            "FromServicesAttribute", "FromHeaderAttribute", "ApiControllerAttribute",
            "ActionResult", "ViewResult", "JsonResult", "ContentResult", "RedirectResult",
        ],
        interfaces: &["IActionResult", "IUrlHelper"],
    },
    KnownNamespace {
        namespace: "Microsoft.AspNetCore.Mvc.Filters",
        classes: &[],
        interfaces: &[
            "IActionFilter", "IAsyncActionFilter", "IResultFilter", "IAsyncResultFilter",
            "IExceptionFilter", "IAsyncExceptionFilter", "IAuthorizationFilter",
        ],
    },
    KnownNamespace {
        namespace: "Microsoft.AspNetCore.Http",
        classes: &["HttpContext", "HttpRequest", "HttpResponse"],
        interfaces: &["IFormFile", "IFormFileCollection", "IFormCollection", "IResult"],
    },
];

fn known_kind(full_name: &str) -> Option<KnownKind> {
    let (namespace, name) = full_name.rsplit_once('.')?;
    let entry = KNOWN_TYPES.iter().find(|ns| ns.namespace == namespace)?;
    if entry.classes.contains(&name) {
        Some(KnownKind::Class)
    } else if entry.interfaces.contains(&name) {
        Some(KnownKind::Interface)
    } else {
        None
    }
}

/// Resolves written names to fully qualified ones and assembles the graph.
pub struct Resolver<'a> {
    files: &'a [RawFile],
    global_usings: Vec<String>,
    declared: HashMap<String, TypeKind>,
}

impl<'a> Resolver<'a> {
    pub fn new(files: &'a [RawFile]) -> Self {
        let mut declared = HashMap::new();
        let mut global_usings = Vec::new();
        for file in files {
            for using in &file.global_usings {
                if !global_usings.contains(using) {
                    global_usings.push(using.clone());
                }
            }
            for ty in &file.types {
                declared
                    .entry(full_name_of(ty))
                    .or_insert(ty.kind);
            }
        }
        Self {
            files,
            global_usings,
            declared,
        }
    }

    pub fn build(&self) -> SymbolGraph {
        let mut types: Vec<TypeDecl> = Vec::new();
        let mut by_name: HashMap<String, usize> = HashMap::new();
        for file in self.files {
            for raw in &file.types {
                let decl = self.type_decl(raw);
                let full_name = decl.full_name();
                match by_name.get(&full_name) {
                    // Partial declarations fold into the first part.
                    Some(idx) => merge_partial(&mut types[*idx], decl),
                    None => {
                        by_name.insert(full_name, types.len());
                        types.push(decl);
                    }
                }
            }
        }
        SymbolGraph::new(types)
    }

    fn type_decl(&self, raw: &RawType) -> TypeDecl {
        let (base_type, interfaces) = self.split_bases(raw);
        TypeDecl {
            name: raw.nested_name(),
            namespace: raw.scope.namespace_name(),
            kind: raw.kind,
            accessibility: raw.accessibility(),
            is_abstract: raw.has_modifier("abstract"),
            is_static: raw.has_modifier("static"),
            is_generic: raw.is_generic,
            base_type,
            interfaces,
            attributes: self.attributes(&raw.attributes, &raw.scope),
            methods: raw
                .methods
                .iter()
                .map(|method| self.method_decl(raw, method))
                .collect(),
        }
    }

    fn split_bases(&self, raw: &RawType) -> (Option<String>, Vec<String>) {
        let mut resolved: Vec<String> = raw
            .bases
            .iter()
            .filter_map(|base| base.dotted_name())
            .map(|name| self.resolve_name(&name, &raw.scope))
            .collect();
        if resolved.is_empty() {
            return (None, resolved);
        }
        let class_like = matches!(raw.kind, TypeKind::Class | TypeKind::Record);
        if class_like && !self.is_interface(&resolved[0]) {
            let base = resolved.remove(0);
            return (Some(base), resolved);
        }
        (None, resolved)
    }

    fn is_interface(&self, full_name: &str) -> bool {
        if let Some(kind) = self.declared.get(full_name) {
            return *kind == TypeKind::Interface;
        }
        if let Some(kind) = known_kind(full_name) {
            return kind == KnownKind::Interface;
        }
        // Unknown external types fall back on the I-prefix convention.
        let short = full_name.rsplit('.').next().unwrap_or(full_name);
        let mut chars = short.chars();
        matches!(
            (chars.next(), chars.next()),
            (Some('I'), Some(second)) if second.is_ascii_uppercase()
        )
    }

    fn method_decl(&self, owner: &RawType, method: &RawMethod) -> MethodDecl {
        let default = if owner.kind == TypeKind::Interface {
            Accessibility::Public
        } else {
            Accessibility::Private
        };
        let mut scope = owner.scope.clone();
        scope.enclosing.push(owner.name.clone());
        MethodDecl {
            name: method.name.clone(),
            kind: method.kind,
            accessibility: accessibility_from_modifiers(&method.modifiers, default),
            is_static: method.modifiers.iter().any(|m| m == "static"),
            is_generic: method.is_generic,
            attributes: self.attributes(&method.attributes, &scope),
            parameters: method
                .parameters
                .iter()
                .map(|param| {
                    let ty = self.type_ref(&param.ty, &scope);
                    let default_value = param
                        .default_value
                        .clone()
                        .map(|value| literal::convert_to(value, &ty));
                    ParameterDecl {
                        name: param.name.clone(),
                        ty,
                        default_value,
                    }
                })
                .collect(),
        }
    }

    fn attributes(&self, attrs: &[RawAttribute], scope: &Scope) -> Vec<Attribute> {
        attrs
            .iter()
            .map(|attr| Attribute {
                name: self.resolve_attribute_name(&attr.name, scope),
                arguments: attr.arguments.clone(),
            })
            .collect()
    }

    /// `[Area]` may name `AreaAttribute` or `Area`; the suffixed form wins.
    fn resolve_attribute_name(&self, written: &str, scope: &Scope) -> String {
        if !written.ends_with("Attribute") {
            let suffixed = format!("{written}Attribute");
            if let Some(found) = self.try_resolve(&suffixed, scope) {
                return found;
            }
        }
        self.try_resolve(written, scope)
            .unwrap_or_else(|| written.to_string())
    }

    pub fn type_ref(&self, syntax: &RawTypeSyntax, scope: &Scope) -> TypeRef {
        match syntax {
            RawTypeSyntax::Predefined(keyword) => match Primitive::from_keyword(keyword) {
                Some(primitive) => TypeRef::primitive(primitive),
                None => TypeRef::Named {
                    full_name: keyword.clone(),
                },
            },
            RawTypeSyntax::Name(segments) => {
                let dotted = syntax.dotted_name().unwrap_or_default();
                let full_name = self.resolve_name(&dotted, scope);
                let mut arguments: Vec<TypeRef> = segments
                    .last()
                    .map(|last| {
                        last.arguments
                            .iter()
                            .map(|arg| self.type_ref(arg, scope))
                            .collect()
                    })
                    .unwrap_or_default();
                if arguments.is_empty() {
                    TypeRef::named(full_name)
                } else if full_name == "System.Nullable" && arguments.len() == 1 {
                    TypeRef::nullable(arguments.remove(0))
                } else {
                    TypeRef::generic(full_name, arguments)
                }
            }
            RawTypeSyntax::Array { element, rank } => TypeRef::Array {
                element: Box::new(self.type_ref(element, scope)),
                rank: *rank,
            },
            RawTypeSyntax::Nullable(inner) => TypeRef::nullable(self.type_ref(inner, scope)),
            RawTypeSyntax::Verbatim(text) => TypeRef::Named {
                full_name: text.clone(),
            },
        }
    }

    pub fn resolve_name(&self, written: &str, scope: &Scope) -> String {
        self.try_resolve(written, scope).unwrap_or_else(|| {
            debug!(name = written, "unresolved type name");
            written.to_string()
        })
    }

    fn try_resolve(&self, written: &str, scope: &Scope) -> Option<String> {
        let (head, rest) = match written.split_once('.') {
            Some((head, rest)) => (head, Some(rest)),
            None => (written, None),
        };
        if let Some((_, target)) = scope.aliases.iter().find(|(alias, _)| alias == head) {
            return Some(match rest {
                Some(rest) => format!("{target}.{rest}"),
                None => target.clone(),
            });
        }

        // Nested types of the enclosing types, innermost first.
        let namespace = scope.namespace_name();
        for depth in (1..=scope.enclosing.len()).rev() {
            let container = scope.enclosing[..depth].join(".");
            let candidate = join_name(&join_name(&namespace, &container), written);
            if self.declared.contains_key(&candidate) {
                return Some(candidate);
            }
        }

        // Enclosing namespaces, innermost first, then the global namespace.
        for depth in (0..=scope.namespace.len()).rev() {
            let prefix = scope.namespace[..depth].join(".");
            let candidate = join_name(&prefix, written);
            if self.declared.contains_key(&candidate) {
                return Some(candidate);
            }
        }

        for using in scope.usings.iter().chain(self.global_usings.iter()) {
            let candidate = join_name(using, written);
            if self.declared.contains_key(&candidate) || known_kind(&candidate).is_some() {
                return Some(candidate);
            }
        }

        if rest.is_some() && known_kind(written).is_some() {
            return Some(written.to_string());
        }
        None
    }
}

fn join_name(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

fn full_name_of(raw: &RawType) -> String {
    join_name(&raw.scope.namespace_name(), &raw.nested_name())
}

fn merge_partial(first: &mut TypeDecl, other: TypeDecl) {
    first.is_abstract |= other.is_abstract;
    first.is_static |= other.is_static;
    if first.accessibility == Accessibility::Internal && other.accessibility != Accessibility::Internal
    {
        first.accessibility = other.accessibility;
    }
    if first.base_type.is_none() {
        first.base_type = other.base_type;
    }
    for iface in other.interfaces {
        if !first.interfaces.contains(&iface) {
            first.interfaces.push(iface);
        }
    }
    first.attributes.extend(other.attributes);
    first.methods.extend(other.methods);
}
