use crate::discover::DiscoveryOptions;
use crate::discover::markers::{MarkerKind, has_marker};
use crate::symbols::{Accessibility, SymbolGraph, TypeDecl, TypeKind};
use std::collections::HashSet;
use tracing::debug;

/// Returns true when `ty` is a controller under `options`.
pub fn is_controller(graph: &SymbolGraph, ty: &TypeDecl, options: &DiscoveryOptions) -> bool {
    if ty.kind != TypeKind::Class {
        return false;
    }
    if ty.accessibility != Accessibility::Public || ty.is_static || ty.is_generic {
        return false;
    }
    if options.skip_abstract && ty.is_abstract {
        debug!(ty = %ty.full_name(), "skipping abstract type");
        return false;
    }
    if has_marker(&ty.attributes, MarkerKind::NonController) {
        debug!(ty = %ty.full_name(), "excluded by NonController");
        return false;
    }
    derives_from_controller_base(graph, ty, options)
}

/// Walks the base-type chain looking for a configured controller base.
///
/// The walk stops at the first base the graph does not declare, and on
/// cycles in malformed input.
pub fn derives_from_controller_base(
    graph: &SymbolGraph,
    ty: &TypeDecl,
    options: &DiscoveryOptions,
) -> bool {
    let mut seen = HashSet::new();
    seen.insert(ty.full_name());
    let mut next = ty.base_type.as_deref();
    while let Some(base) = next {
        let base = generic_definition(base);
        if options.controller_bases.iter().any(|known| known == base) {
            return true;
        }
        if !seen.insert(base.to_string()) {
            return false;
        }
        next = graph.get(base).and_then(|decl| decl.base_type.as_deref());
    }
    false
}

/// `Acme.Base<T>` -> `Acme.Base`
pub(crate) fn generic_definition(name: &str) -> &str {
    match name.find('<') {
        Some(idx) => name[..idx].trim_end(),
        None => name,
    }
}
