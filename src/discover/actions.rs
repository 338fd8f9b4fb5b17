use crate::discover::markers::{MarkerKind, has_marker};
use crate::discover::params::extract_parameters;
use crate::model::ActionModel;
use crate::symbols::{Accessibility, MethodDecl, TypeDecl};
use tracing::debug;

const ASYNC_SUFFIX: &str = "Async";

/// Action methods declared directly on `ty`, in source order.
pub fn extract_actions(ty: &TypeDecl) -> Vec<ActionModel> {
    ty.methods
        .iter()
        .filter(|method| is_action(method))
        .map(|method| ActionModel {
            name: action_name(&method.name).to_string(),
            parameters: extract_parameters(method),
        })
        .collect()
}

pub fn is_action(method: &MethodDecl) -> bool {
    if method.accessibility != Accessibility::Public || method.is_static || method.kind.is_special() {
        return false;
    }
    if method.is_generic {
        debug!(method = %method.name, "generic methods are not actions");
        return false;
    }
    if has_marker(&method.attributes, MarkerKind::NonAction) {
        debug!(method = %method.name, "excluded by NonAction");
        return false;
    }
    true
}

/// `IndexAsync` -> `Index`. Only one exact-case suffix is removed.
pub fn action_name(method_name: &str) -> &str {
    match method_name.strip_suffix(ASYNC_SUFFIX) {
        Some(stem) if !stem.is_empty() => stem,
        _ => method_name,
    }
}
