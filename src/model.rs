use crate::symbols::Constant;
use serde::Serialize;

/// Controllers sharing one area name. The empty name is the default area.
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AreaModel {
    pub name: String,
    pub controllers: Vec<ControllerModel>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ControllerModel {
    pub name: String,
    pub actions: Vec<ActionModel>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActionModel {
    pub name: String,
    pub parameters: Vec<ParameterModel>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ParameterModel {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    pub has_default_value: bool,
    pub default_value: Option<Constant>,
}

impl ParameterModel {
    pub fn new(name: impl Into<String>, ty: impl Into<String>, default_value: Option<Constant>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            has_default_value: default_value.is_some(),
            default_value,
        }
    }
}

impl AreaModel {
    pub fn controller(&self, name: &str) -> Option<&ControllerModel> {
        self.controllers.iter().find(|c| c.name == name)
    }
}

impl ControllerModel {
    pub fn action(&self, name: &str) -> Option<&ActionModel> {
        self.actions.iter().find(|a| a.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_camel_case() {
        let area = AreaModel {
            name: String::new(),
            controllers: vec![ControllerModel {
                name: "Home".to_string(),
                actions: vec![ActionModel {
                    name: "Index".to_string(),
                    parameters: vec![
                        ParameterModel::new("page", "int", Some(Constant::Int(1))),
                        ParameterModel::new("search", "string", None),
                    ],
                }],
            }],
        };
        let value = serde_json::to_value(&area).unwrap();
        assert_eq!(
            value,
            json!({
                "name": "",
                "controllers": [{
                    "name": "Home",
                    "actions": [{
                        "name": "Index",
                        "parameters": [
                            {"name": "page", "type": "int", "hasDefaultValue": true, "defaultValue": 1},
                            {"name": "search", "type": "string", "hasDefaultValue": false, "defaultValue": null}
                        ]
                    }]
                }]
            })
        );
    }
}
