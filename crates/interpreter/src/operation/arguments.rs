use std::convert::Infallible;

use async_graphql_parser::{
    types::{Directive, Field},
    Positioned,
};
use async_graphql_value::{ConstValue, Value};
use graphql_interpreter_error::{ErrorCode, GraphqlError};

use super::{coerce_input, Variables};
use crate::{Arguments, FieldDefinition, Schema};

/// Coerces the arguments given to a field: variables are substituted, defaults applied and
/// values converted to their internal representation.
pub(crate) fn coerce_arguments(
    schema: &Schema,
    definition: &FieldDefinition,
    field: &Field,
    variables: &Variables,
) -> Result<Arguments, GraphqlError> {
    let mut arguments = Arguments::default();
    let mut missing = Vec::new();

    for (name, argument) in &definition.arguments {
        let provided = field
            .arguments
            .iter()
            .find(|(argument_name, _)| argument_name.node.as_str() == name)
            .and_then(|(_, value)| substitute_variables(&value.node, variables));

        let value = match provided {
            Some(value) => value,
            None => match &argument.default_value {
                Some(default) => default.clone(),
                None if argument.ty.nullable => continue,
                None => {
                    missing.push(name.as_str());
                    continue;
                }
            },
        };

        match coerce_input(schema, &argument.ty, value.clone()) {
            Ok(value) => {
                arguments.insert(name.clone(), value);
            }
            Err(err) => {
                return Err(GraphqlError::new(
                    format!(
                        "Argument '{name}' on Field '{}' has an invalid value ({value}). Expected type '{}'.",
                        definition.name, argument.ty
                    ),
                    ErrorCode::ArgumentError,
                )
                .with_extension("problems", serde_json::Value::Array(vec![err.to_json()])))
            }
        }
    }

    if !missing.is_empty() {
        return Err(GraphqlError::new(
            format!(
                "Field '{}' is missing required arguments: {}",
                definition.name,
                missing.join(", ")
            ),
            ErrorCode::ArgumentError,
        ));
    }

    Ok(arguments)
}

/// `None` when the value is a single variable that wasn't provided, the argument is then
/// treated as absent. Missing variables nested in lists or objects become null.
fn substitute_variables(value: &Value, variables: &Variables) -> Option<ConstValue> {
    if let Value::Variable(name) = value {
        return variables.get(name.as_str()).cloned();
    }
    let substituted = value.clone().into_const_with(|name| {
        Ok::<_, Infallible>(variables.get(name.as_str()).cloned().unwrap_or(ConstValue::Null))
    });
    match substituted {
        Ok(value) => Some(value),
        Err(never) => match never {},
    }
}

/// Evaluates `@skip` and `@include` against the variables.
pub(crate) fn is_included(directives: &[Positioned<Directive>], variables: &Variables) -> bool {
    directives.iter().all(|directive| {
        let condition = || {
            directive
                .node
                .get_argument("if")
                .and_then(|value| substitute_variables(&value.node, variables))
        };
        match directive.node.name.node.as_str() {
            "skip" => condition() != Some(ConstValue::Boolean(true)),
            "include" => condition() != Some(ConstValue::Boolean(false)),
            _ => true,
        }
    })
}
