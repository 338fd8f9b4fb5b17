use crate::discover::classify::generic_definition;
use crate::discover::markers::{MarkerKind, find_marker};
use crate::model::{AreaModel, ControllerModel};
use crate::symbols::{Attribute, SymbolGraph, TypeDecl};
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// Area name for a controller type; `""` is the default area.
///
/// `[Area]` is inherited, so the nearest declaring type in the base chain
/// wins. An argument that is not a string constant means the default area.
pub fn resolve_area(graph: &SymbolGraph, ty: &TypeDecl) -> String {
    let mut seen = HashSet::new();
    let mut current = Some(ty);
    while let Some(decl) = current {
        if !seen.insert(decl.full_name()) {
            break;
        }
        if let Some(attr) = find_marker(&decl.attributes, MarkerKind::Area) {
            return area_argument(attr).unwrap_or_else(|| {
                warn!(ty = %ty.full_name(), "area argument is not a string constant");
                String::new()
            });
        }
        current = decl
            .base_type
            .as_deref()
            .and_then(|base| graph.get(generic_definition(base)));
    }
    String::new()
}

fn area_argument(attr: &Attribute) -> Option<String> {
    attr.arguments
        .first()
        .and_then(|arg| arg.as_constant())
        .and_then(|value| value.as_str())
        .map(str::to_string)
}

/// Buckets controllers by area name, keeping first-seen area order and
/// discovery order inside each area.
#[derive(Debug, Default)]
pub struct AreaAggregator {
    areas: Vec<AreaModel>,
    by_name: HashMap<String, usize>,
}

impl AreaAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, area: String, controller: ControllerModel) {
        let idx = match self.by_name.get(&area) {
            Some(idx) => *idx,
            None => {
                let idx = self.areas.len();
                self.by_name.insert(area.clone(), idx);
                self.areas.push(AreaModel {
                    name: area,
                    controllers: Vec::new(),
                });
                idx
            }
        };
        self.areas[idx].controllers.push(controller);
    }

    pub fn finish(self) -> Vec<AreaModel> {
        self.areas
    }
}
