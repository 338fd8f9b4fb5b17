use crate::model::ParameterModel;
use crate::symbols::{ConstantExpr, MethodDecl, ParameterDecl};
use tracing::debug;

pub fn extract_parameters(method: &MethodDecl) -> Vec<ParameterModel> {
    method.parameters.iter().map(parameter_model).collect()
}

fn parameter_model(param: &ParameterDecl) -> ParameterModel {
    let default_value = match &param.default_value {
        Some(ConstantExpr::Constant(value)) => Some(value.clone()),
        Some(ConstantExpr::Unresolved(raw)) => {
            debug!(param = %param.name, raw = %raw, "default value is not a constant");
            None
        }
        None => None,
    };
    ParameterModel::new(param.name.clone(), param.ty.to_string(), default_value)
}
