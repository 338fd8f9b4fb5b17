use crate::csharp::literal;
use crate::symbols::{Accessibility, ConstantExpr, MethodKind, TypeKind};
use tree_sitter::Node;

/// Declarations of one source file before name resolution.
#[derive(Debug, Default)]
pub struct RawFile {
    pub label: String,
    pub global_usings: Vec<String>,
    pub types: Vec<RawType>,
}

/// What a name inside a declaration can see.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    pub namespace: Vec<String>,
    /// Enclosing type names, outermost first.
    pub enclosing: Vec<String>,
    pub usings: Vec<String>,
    pub aliases: Vec<(String, String)>,
}

impl Scope {
    pub fn namespace_name(&self) -> String {
        self.namespace.join(".")
    }
}

#[derive(Debug)]
pub struct RawType {
    pub name: String,
    pub kind: TypeKind,
    pub modifiers: Vec<String>,
    pub is_generic: bool,
    pub enclosing_public: bool,
    pub bases: Vec<RawTypeSyntax>,
    pub attributes: Vec<RawAttribute>,
    pub methods: Vec<RawMethod>,
    pub scope: Scope,
}

impl RawType {
    /// Name including enclosing types, e.g. `Outer.Inner`.
    pub fn nested_name(&self) -> String {
        let mut parts = self.scope.enclosing.clone();
        parts.push(self.name.clone());
        parts.join(".")
    }

    pub fn accessibility(&self) -> Accessibility {
        let default = if self.scope.enclosing.is_empty() {
            Accessibility::Internal
        } else {
            Accessibility::Private
        };
        let declared = accessibility_from_modifiers(&self.modifiers, default);
        if declared == Accessibility::Public && !self.enclosing_public {
            Accessibility::Internal
        } else {
            declared
        }
    }

    pub fn has_modifier(&self, modifier: &str) -> bool {
        self.modifiers.iter().any(|m| m == modifier)
    }
}

#[derive(Debug)]
pub struct RawMethod {
    pub name: String,
    pub kind: MethodKind,
    pub is_generic: bool,
    pub modifiers: Vec<String>,
    pub attributes: Vec<RawAttribute>,
    pub parameters: Vec<RawParameter>,
}

#[derive(Debug)]
pub struct RawParameter {
    pub name: String,
    pub ty: RawTypeSyntax,
    pub default_value: Option<ConstantExpr>,
}

#[derive(Debug, Clone)]
pub struct RawAttribute {
    pub name: String,
    pub arguments: Vec<ConstantExpr>,
}

/// A type as written in source.
#[derive(Debug, Clone, PartialEq)]
pub enum RawTypeSyntax {
    Predefined(String),
    Name(Vec<RawSegment>),
    Array { element: Box<RawTypeSyntax>, rank: usize },
    Nullable(Box<RawTypeSyntax>),
    Verbatim(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawSegment {
    pub name: String,
    pub arguments: Vec<RawTypeSyntax>,
}

impl RawTypeSyntax {
    /// Dotted name without type arguments, for name-shaped syntax.
    pub fn dotted_name(&self) -> Option<String> {
        match self {
            RawTypeSyntax::Name(segments) => Some(
                segments
                    .iter()
                    .map(|s| s.name.as_str())
                    .collect::<Vec<_>>()
                    .join("."),
            ),
            _ => None,
        }
    }
}

pub fn accessibility_from_modifiers(modifiers: &[String], default: Accessibility) -> Accessibility {
    let has = |m: &str| modifiers.iter().any(|value| value == m);
    if has("public") {
        Accessibility::Public
    } else if has("protected") && has("internal") {
        Accessibility::ProtectedInternal
    } else if has("private") && has("protected") {
        Accessibility::PrivateProtected
    } else if has("protected") {
        Accessibility::Protected
    } else if has("internal") {
        Accessibility::Internal
    } else if has("private") {
        Accessibility::Private
    } else {
        default
    }
}

const MODIFIER_KEYWORDS: &[&str] = &[
    "public", "private", "protected", "internal", "static", "abstract", "sealed", "partial",
    "virtual", "override", "async", "extern", "new", "readonly", "unsafe", "file", "required",
];

#[derive(Clone)]
struct Context {
    scope: Scope,
    enclosing_public: bool,
    enclosing_generic: bool,
}

pub fn collect_file(root: Node<'_>, source: &str, label: &str) -> RawFile {
    let mut output = RawFile {
        label: label.to_string(),
        ..RawFile::default()
    };
    let ctx = Context {
        scope: Scope::default(),
        enclosing_public: true,
        enclosing_generic: false,
    };
    if root.kind() == "compilation_unit" {
        walk_compilation_unit(root, &ctx, source, &mut output);
    } else {
        walk_declarations(root, &ctx, source, &mut output);
    }
    output
}

fn walk_compilation_unit(node: Node<'_>, ctx: &Context, source: &str, output: &mut RawFile) {
    let mut next_ctx = ctx.clone();
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "using_directive" => apply_using(child, &mut next_ctx.scope, source, output),
            "file_scoped_namespace_declaration" => {
                if let Some(name) = namespace_name(child, source) {
                    next_ctx.scope.namespace = namespace_parts(&name);
                }
            }
            _ => {}
        }
    }

    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() == "file_scoped_namespace_declaration" {
            // Some grammar versions nest the members under the declaration.
            walk_declarations(child, &next_ctx, source, output);
            continue;
        }
        walk_node(child, &next_ctx, source, output);
    }
}

fn walk_declarations(node: Node<'_>, ctx: &Context, source: &str, output: &mut RawFile) {
    let mut next_ctx = ctx.clone();
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() == "using_directive" {
            apply_using(child, &mut next_ctx.scope, source, output);
        }
    }
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        walk_node(child, &next_ctx, source, output);
    }
}

fn walk_node(node: Node<'_>, ctx: &Context, source: &str, output: &mut RawFile) {
    match node.kind() {
        "namespace_declaration" => handle_namespace(node, ctx, source, output),
        "class_declaration" => handle_type(node, ctx, source, output, TypeKind::Class),
        "struct_declaration" => handle_type(node, ctx, source, output, TypeKind::Struct),
        "interface_declaration" => handle_type(node, ctx, source, output, TypeKind::Interface),
        "record_declaration" | "record_struct_declaration" => {
            handle_type(node, ctx, source, output, TypeKind::Record)
        }
        "enum_declaration" => handle_type(node, ctx, source, output, TypeKind::Enum),
        "declaration_list" => walk_declarations(node, ctx, source, output),
        _ => {}
    }
}

fn handle_namespace(node: Node<'_>, ctx: &Context, source: &str, output: &mut RawFile) {
    let Some(name) = namespace_name(node, source) else {
        return;
    };
    let mut next_ctx = ctx.clone();
    next_ctx.scope.namespace.extend(namespace_parts(&name));
    if let Some(body) = node.child_by_field_name("body") {
        walk_declarations(body, &next_ctx, source, output);
    }
}

fn apply_using(node: Node<'_>, scope: &mut Scope, source: &str, output: &mut RawFile) {
    let mut is_global = false;
    let mut is_static = false;
    let mut has_equals = false;
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "global" => is_global = true,
            "static" => is_static = true,
            "=" => has_equals = true,
            _ => {}
        }
    }
    if is_static {
        return;
    }
    let mut cursor = node.walk();
    let named: Vec<Node<'_>> = node.named_children(&mut cursor).collect();
    let Some(target) = named.last() else {
        return;
    };
    let target = node_text(*target, source);
    if target.is_empty() {
        return;
    }
    if has_equals {
        let alias = node
            .child_by_field_name("name")
            .or_else(|| named.first().copied())
            .map(|n| node_text(n, source));
        if let Some(alias) = alias.filter(|a| !a.is_empty() && *a != target) {
            scope.aliases.push((alias, strip_global(&target)));
        }
        return;
    }
    let target = strip_global(&target);
    if is_global {
        output.global_usings.push(target.clone());
    }
    scope.usings.push(target);
}

fn handle_type(
    node: Node<'_>,
    ctx: &Context,
    source: &str,
    output: &mut RawFile,
    kind: TypeKind,
) {
    let Some(name_node) = node.child_by_field_name("name") else {
        return;
    };
    let name = node_text(name_node, source);
    if name.is_empty() {
        return;
    }
    let modifiers = modifiers_for_node(node, source);
    let is_generic = ctx.enclosing_generic || has_child_kind(node, "type_parameter_list");
    let raw = RawType {
        name: name.clone(),
        kind,
        modifiers,
        is_generic,
        enclosing_public: ctx.enclosing_public,
        bases: base_list_types(node, source),
        attributes: attributes_for_node(node, source, "type"),
        methods: Vec::new(),
        scope: ctx.scope.clone(),
    };
    let is_public = raw.accessibility() == Accessibility::Public;
    let idx = output.types.len();
    output.types.push(raw);

    let mut next_ctx = ctx.clone();
    next_ctx.scope.enclosing.push(name);
    next_ctx.enclosing_public = is_public;
    next_ctx.enclosing_generic = is_generic;
    let Some(body) = node.child_by_field_name("body") else {
        return;
    };
    let mut cursor = body.walk();
    for member in body.named_children(&mut cursor) {
        let method_kind = match member.kind() {
            "method_declaration" => MethodKind::Ordinary,
            "constructor_declaration" => {
                if has_modifier(member, source, "static") {
                    MethodKind::StaticConstructor
                } else {
                    MethodKind::Constructor
                }
            }
            "destructor_declaration" => MethodKind::Destructor,
            "operator_declaration" => MethodKind::Operator,
            "conversion_operator_declaration" => MethodKind::Conversion,
            _ => {
                walk_node(member, &next_ctx, source, output);
                continue;
            }
        };
        if let Some(method) = method_from_node(member, method_kind, source) {
            output.types[idx].methods.push(method);
        }
    }
}

fn method_from_node(node: Node<'_>, kind: MethodKind, source: &str) -> Option<RawMethod> {
    let name = match kind {
        MethodKind::Ordinary => {
            if node.child_by_field_name("explicit_interface_specifier").is_some()
                || has_child_kind(node, "explicit_interface_specifier")
            {
                // Explicit interface implementations are never public members.
                return None;
            }
            node_text(node.child_by_field_name("name")?, source)
        }
        MethodKind::Constructor | MethodKind::StaticConstructor => ".ctor".to_string(),
        MethodKind::Destructor => "Finalize".to_string(),
        _ => format!("op_{}", node.kind()),
    };
    if name.is_empty() {
        return None;
    }
    let parameters = node
        .child_by_field_name("parameters")
        .or_else(|| first_child_kind(node, "parameter_list"))
        .map(|list| parameters_from_list(list, source))
        .unwrap_or_default();
    Some(RawMethod {
        name,
        kind,
        is_generic: has_child_kind(node, "type_parameter_list"),
        modifiers: modifiers_for_node(node, source),
        attributes: attributes_for_node(node, source, "method"),
        parameters,
    })
}

fn parameters_from_list(list: Node<'_>, source: &str) -> Vec<RawParameter> {
    let mut out = Vec::new();
    // `params T[] name` hangs its `type` and `name` fields on the list itself.
    let mut pending_type: Option<Node<'_>> = None;
    let mut cursor = list.walk();
    if !cursor.goto_first_child() {
        return out;
    }
    loop {
        let child = cursor.node();
        match cursor.field_name() {
            Some("type") => pending_type = Some(child),
            Some("name") => {
                let ty = pending_type
                    .take()
                    .map(|n| type_syntax(n, source))
                    .unwrap_or_else(|| RawTypeSyntax::Verbatim("object".to_string()));
                out.push(RawParameter {
                    name: node_text(child, source),
                    ty,
                    default_value: None,
                });
            }
            _ => {
                if matches!(child.kind(), "parameter" | "parameter_array") {
                    out.extend(parameter_from_node(child, source));
                }
            }
        }
        if !cursor.goto_next_sibling() {
            break;
        }
    }
    out
}

fn parameter_from_node(param: Node<'_>, source: &str) -> Option<RawParameter> {
    let name_node = param.child_by_field_name("name")?;
    let ty = param
        .child_by_field_name("type")
        .or_else(|| first_type_child(param, name_node))
        .map(|n| type_syntax(n, source))
        .unwrap_or_else(|| RawTypeSyntax::Verbatim("object".to_string()));
    Some(RawParameter {
        name: node_text(name_node, source),
        ty,
        default_value: default_value_of(param, source),
    })
}

fn first_type_child<'a>(param: Node<'a>, name_node: Node<'a>) -> Option<Node<'a>> {
    let mut cursor = param.walk();
    param
        .named_children(&mut cursor)
        .take_while(|child| child.id() != name_node.id())
        .filter(|child| child.kind() != "attribute_list" && child.kind() != "modifier")
        .last()
}

fn default_value_of(param: Node<'_>, source: &str) -> Option<ConstantExpr> {
    let mut cursor = param.walk();
    let children: Vec<Node<'_>> = param.children(&mut cursor).collect();
    for (idx, child) in children.iter().enumerate() {
        if child.kind() == "equals_value_clause" {
            let mut inner = child.walk();
            let expr = child.named_children(&mut inner).last()?;
            return Some(literal::evaluate(expr, source));
        }
        if child.kind() == "=" {
            let expr = children[idx + 1..].iter().find(|n| n.is_named())?;
            return Some(literal::evaluate(*expr, source));
        }
    }
    None
}

pub fn type_syntax(node: Node<'_>, source: &str) -> RawTypeSyntax {
    match node.kind() {
        "predefined_type" => RawTypeSyntax::Predefined(node_text(node, source)),
        "identifier" | "generic_name" | "qualified_name" | "alias_qualified_name" => {
            let mut segments = Vec::new();
            collect_segments(node, source, &mut segments);
            if segments.is_empty() {
                RawTypeSyntax::Verbatim(node_text(node, source))
            } else {
                RawTypeSyntax::Name(segments)
            }
        }
        "array_type" => {
            let element = node
                .child_by_field_name("type")
                .or_else(|| {
                    let mut cursor = node.walk();
                    node.named_children(&mut cursor).next()
                })
                .map(|n| type_syntax(n, source))
                .unwrap_or_else(|| RawTypeSyntax::Verbatim(node_text(node, source)));
            let rank = node
                .child_by_field_name("rank")
                .or_else(|| first_child_kind(node, "array_rank_specifier"))
                .map(|n| node_text(n, source).matches(',').count() + 1)
                .unwrap_or(1);
            RawTypeSyntax::Array {
                element: Box::new(element),
                rank,
            }
        }
        "nullable_type" => {
            let inner = node.child_by_field_name("type").or_else(|| {
                let mut cursor = node.walk();
                node.named_children(&mut cursor).next()
            });
            match inner {
                Some(inner) => RawTypeSyntax::Nullable(Box::new(type_syntax(inner, source))),
                None => RawTypeSyntax::Verbatim(node_text(node, source)),
            }
        }
        "ref_type" | "scoped_type" => node
            .child_by_field_name("type")
            .map(|inner| type_syntax(inner, source))
            .unwrap_or_else(|| RawTypeSyntax::Verbatim(node_text(node, source))),
        _ => RawTypeSyntax::Verbatim(node_text(node, source)),
    }
}

fn collect_segments(node: Node<'_>, source: &str, out: &mut Vec<RawSegment>) {
    match node.kind() {
        "identifier" => out.push(RawSegment {
            name: node_text(node, source),
            arguments: Vec::new(),
        }),
        "generic_name" => {
            let mut name = String::new();
            let mut arguments = Vec::new();
            let mut cursor = node.walk();
            for child in node.named_children(&mut cursor) {
                match child.kind() {
                    "identifier" => name = node_text(child, source),
                    "type_argument_list" => {
                        let mut args_cursor = child.walk();
                        arguments = child
                            .named_children(&mut args_cursor)
                            .map(|arg| type_syntax(arg, source))
                            .collect();
                    }
                    _ => {}
                }
            }
            out.push(RawSegment { name, arguments });
        }
        "qualified_name" => {
            let mut cursor = node.walk();
            for child in node.named_children(&mut cursor) {
                collect_segments(child, source, out);
            }
        }
        "alias_qualified_name" => {
            // `global::Acme.Thing`: the alias part is not a namespace segment.
            let mut cursor = node.walk();
            let children: Vec<Node<'_>> = node.named_children(&mut cursor).collect();
            let skip = usize::from(
                children
                    .first()
                    .is_some_and(|first| node_text(*first, source) == "global"),
            );
            for child in children.into_iter().skip(skip) {
                collect_segments(child, source, out);
            }
        }
        _ => {}
    }
}

fn base_list_types(node: Node<'_>, source: &str) -> Vec<RawTypeSyntax> {
    let Some(list) = first_child_kind(node, "base_list") else {
        return Vec::new();
    };
    let mut out = Vec::new();
    let mut cursor = list.walk();
    for child in list.named_children(&mut cursor) {
        match child.kind() {
            "argument_list" => {}
            "primary_constructor_base_type" => {
                let inner = child.child_by_field_name("type").or_else(|| {
                    let mut inner_cursor = child.walk();
                    child.named_children(&mut inner_cursor).next()
                });
                if let Some(inner) = inner {
                    out.push(type_syntax(inner, source));
                }
            }
            _ => out.push(type_syntax(child, source)),
        }
    }
    out
}

/// Attribute lists that apply to the declaration itself: untargeted ones and
/// those whose target specifier names `target` (`type`, `method`).
fn attributes_for_node(node: Node<'_>, source: &str, target: &str) -> Vec<RawAttribute> {
    let mut out = Vec::new();
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() != "attribute_list" {
            continue;
        }
        if let Some(specifier) = first_child_kind(child, "attribute_target_specifier") {
            let written = node_text(specifier, source);
            if written.trim_end_matches(':').trim() != target {
                continue;
            }
        }
        let mut list_cursor = child.walk();
        for attr in child.named_children(&mut list_cursor) {
            if attr.kind() != "attribute" {
                continue;
            }
            let Some(name_node) = attr.child_by_field_name("name") else {
                continue;
            };
            let name = node_text(name_node, source);
            if name.is_empty() {
                continue;
            }
            out.push(RawAttribute {
                name: strip_global(&name),
                arguments: attribute_arguments(attr, source),
            });
        }
    }
    out
}

fn attribute_arguments(node: Node<'_>, source: &str) -> Vec<ConstantExpr> {
    let mut out = Vec::new();
    let Some(list) = first_child_kind(node, "attribute_argument_list") else {
        return out;
    };
    let mut cursor = list.walk();
    for arg in list.named_children(&mut cursor) {
        if arg.kind() != "attribute_argument" {
            continue;
        }
        // Named property assignments are not constructor arguments.
        if has_child_kind(arg, "name_equals") {
            continue;
        }
        let mut arg_cursor = arg.walk();
        let expr = arg
            .named_children(&mut arg_cursor)
            .filter(|child| child.kind() != "name_colon")
            .last();
        if let Some(expr) = expr {
            out.push(literal::evaluate(expr, source));
        }
    }
    out
}

fn modifiers_for_node(node: Node<'_>, source: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() == "modifier" {
            out.push(node_text(child, source));
        } else if !child.is_named() && MODIFIER_KEYWORDS.contains(&child.kind()) {
            out.push(child.kind().to_string());
        }
    }
    out
}

fn has_modifier(node: Node<'_>, source: &str, modifier: &str) -> bool {
    modifiers_for_node(node, source).iter().any(|m| m == modifier)
}

fn has_child_kind(node: Node<'_>, kind: &str) -> bool {
    first_child_kind(node, kind).is_some()
}

fn first_child_kind<'a>(node: Node<'a>, kind: &str) -> Option<Node<'a>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).find(|child| child.kind() == kind)
}

fn namespace_name(node: Node<'_>, source: &str) -> Option<String> {
    node.child_by_field_name("name")
        .map(|n| node_text(n, source))
        .filter(|value| !value.is_empty())
}

fn namespace_parts(name: &str) -> Vec<String> {
    let normalized = name.replace("::", ".");
    normalized
        .split('.')
        .filter(|part| !part.trim().is_empty())
        .map(|part| part.trim().to_string())
        .collect()
}

fn strip_global(name: &str) -> String {
    name.strip_prefix("global::").unwrap_or(name).to_string()
}

pub fn node_text(node: Node<'_>, source: &str) -> String {
    let start = node.start_byte();
    let end = node.end_byte();
    source.get(start..end).unwrap_or("").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessibility_rules() {
        let mods = |values: &[&str]| values.iter().map(|v| v.to_string()).collect::<Vec<_>>();
        assert_eq!(
            accessibility_from_modifiers(&mods(&["public", "abstract"]), Accessibility::Private),
            Accessibility::Public
        );
        assert_eq!(
            accessibility_from_modifiers(&mods(&["protected", "internal"]), Accessibility::Private),
            Accessibility::ProtectedInternal
        );
        assert_eq!(
            accessibility_from_modifiers(&mods(&["static"]), Accessibility::Internal),
            Accessibility::Internal
        );
    }

    #[test]
    fn namespace_parts_split() {
        assert_eq!(namespace_parts("Acme.Web.Areas"), vec!["Acme", "Web", "Areas"]);
        assert_eq!(namespace_parts("global::Acme"), vec!["global", "Acme"]);
    }

    fn collect(source: &str) -> RawFile {
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&tree_sitter_c_sharp::LANGUAGE.into())
            .unwrap();
        let tree = parser.parse(source, None).unwrap();
        collect_file(tree.root_node(), source, "test.cs")
    }

    #[test]
    fn params_parameter_keeps_its_position() {
        let file = collect(
            "class C { void M(string q, params string[] tags) { } }",
        );
        let params = &file.types[0].methods[0].parameters;
        let names: Vec<_> = params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["q", "tags"]);
        assert!(matches!(params[1].ty, RawTypeSyntax::Array { rank: 1, .. }));
        assert!(params[1].default_value.is_none());
    }

    #[test]
    fn targeted_attribute_lists_apply_to_their_own_target() {
        let file = collect(
            r#"
[type: Area("Admin")]
class C
{
    [method: NonAction]
    [return: Bar]
    void M() { }

    void G<T>() { }
}
"#,
        );
        let ty = &file.types[0];
        let type_attrs: Vec<_> = ty.attributes.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(type_attrs, vec!["Area"]);
        let method_attrs: Vec<_> = ty.methods[0]
            .attributes
            .iter()
            .map(|a| a.name.as_str())
            .collect();
        assert_eq!(method_attrs, vec!["NonAction"]);
        assert!(!ty.methods[0].is_generic);
        assert!(ty.methods[1].is_generic);
    }
}
