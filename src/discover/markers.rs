use crate::symbols::Attribute;

pub const AREA_ATTRIBUTE: &str = "Microsoft.AspNetCore.Mvc.AreaAttribute";
pub const NON_ACTION_ATTRIBUTE: &str = "Microsoft.AspNetCore.Mvc.NonActionAttribute";
pub const NON_CONTROLLER_ATTRIBUTE: &str = "Microsoft.AspNetCore.Mvc.NonControllerAttribute";

/// Attributes that drive discovery. Everything else is `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    Area,
    NonAction,
    NonController,
    Other,
}

impl MarkerKind {
    pub fn of(attr: &Attribute) -> Self {
        match attr.name.as_str() {
            AREA_ATTRIBUTE => MarkerKind::Area,
            NON_ACTION_ATTRIBUTE => MarkerKind::NonAction,
            NON_CONTROLLER_ATTRIBUTE => MarkerKind::NonController,
            _ => MarkerKind::Other,
        }
    }
}

pub fn find_marker(attrs: &[Attribute], kind: MarkerKind) -> Option<&Attribute> {
    attrs.iter().find(|attr| MarkerKind::of(attr) == kind)
}

pub fn has_marker(attrs: &[Attribute], kind: MarkerKind) -> bool {
    find_marker(attrs, kind).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attr(name: &str) -> Attribute {
        Attribute {
            name: name.to_string(),
            arguments: Vec::new(),
        }
    }

    #[test]
    fn matches_by_qualified_name_only() {
        assert_eq!(MarkerKind::of(&attr(AREA_ATTRIBUTE)), MarkerKind::Area);
        assert_eq!(MarkerKind::of(&attr(NON_ACTION_ATTRIBUTE)), MarkerKind::NonAction);
        assert_eq!(MarkerKind::of(&attr("Area")), MarkerKind::Other);
        assert_eq!(MarkerKind::of(&attr("Acme.AreaAttribute")), MarkerKind::Other);
    }
}
