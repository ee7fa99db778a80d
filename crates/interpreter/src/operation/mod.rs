mod arguments;
mod input;

use std::collections::HashMap;

use async_graphql_parser::{
    types::{
        DocumentOperations, ExecutableDocument, FragmentDefinition, OperationDefinition, OperationType, SelectionSet,
    },
    Positioned,
};
use async_graphql_value::{ConstValue, Name};
use graphql_interpreter_error::{ErrorCode, GraphqlError, Location};
use indexmap::IndexMap;

pub(crate) use arguments::*;
pub(crate) use input::*;

use crate::Schema;

/// Variables provided by the client, as raw JSON-like values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Variables(IndexMap<Name, ConstValue>);

impl Variables {
    /// Anything but a JSON object gives no variables.
    pub fn from_json(value: serde_json::Value) -> Self {
        match ConstValue::from_json(value) {
            Ok(ConstValue::Object(map)) => Self(map),
            _ => Self::default(),
        }
    }

    #[must_use]
    pub fn with(mut self, name: &str, value: impl Into<ConstValue>) -> Self {
        self.insert(name, value.into());
        self
    }

    pub fn insert(&mut self, name: &str, value: ConstValue) {
        self.0.insert(Name::new(name), value);
    }

    pub fn get(&self, name: &str) -> Option<&ConstValue> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The selected operation of a document, with its variables validated.
pub(crate) struct Operation {
    pub name: Option<String>,
    pub ty: OperationType,
    pub root_type: String,
    pub selection_set: Positioned<SelectionSet>,
    pub fragments: HashMap<Name, Positioned<FragmentDefinition>>,
    /// Provided values and defaults of the declared variables.
    pub variables: Variables,
}

pub(crate) fn prepare(
    schema: &Schema,
    document: ExecutableDocument,
    operation_name: Option<&str>,
    variables: &Variables,
) -> Result<Operation, Vec<GraphqlError>> {
    let ExecutableDocument { operations, fragments } = document;
    let (name, definition) = select_operation(operations, operation_name).map_err(|err| vec![err])?;

    let root_type = match definition.node.ty {
        OperationType::Query => Some(schema.query_type()),
        OperationType::Mutation => schema.mutation_type(),
        OperationType::Subscription => schema.subscription_type(),
    }
    .ok_or_else(|| {
        let kind = match definition.node.ty {
            OperationType::Query => "queries",
            OperationType::Mutation => "mutations",
            OperationType::Subscription => "subscriptions",
        };
        vec![GraphqlError::new(
            format!("Schema is not configured for {kind}"),
            ErrorCode::OperationValidationError,
        )
        .with_location(definition.pos)]
    })?
    .to_string();

    let variables = coerce_variables(schema, &definition.node, variables)?;
    let OperationDefinition { ty, selection_set, .. } = definition.node;

    Ok(Operation {
        name,
        ty,
        root_type,
        selection_set,
        fragments,
        variables,
    })
}

fn select_operation(
    operations: DocumentOperations,
    operation_name: Option<&str>,
) -> Result<(Option<String>, Positioned<OperationDefinition>), GraphqlError> {
    match (operations, operation_name) {
        (DocumentOperations::Single(operation), None) => Ok((None, operation)),
        (DocumentOperations::Single(_), Some(name)) => Err(unknown_operation(name)),
        (DocumentOperations::Multiple(mut operations), Some(name)) => operations
            .remove(name)
            .map(|operation| (Some(name.to_string()), operation))
            .ok_or_else(|| unknown_operation(name)),
        (DocumentOperations::Multiple(operations), None) => {
            if operations.len() > 1 {
                return Err(GraphqlError::new(
                    "An operation name is required",
                    ErrorCode::OperationValidationError,
                ));
            }
            operations
                .into_iter()
                .next()
                .map(|(name, operation)| (Some(name.to_string()), operation))
                .ok_or_else(|| GraphqlError::new("No operations in query document", ErrorCode::BadRequest))
        }
    }
}

fn unknown_operation(name: &str) -> GraphqlError {
    GraphqlError::new(
        format!("Unknown operation named \"{name}\""),
        ErrorCode::OperationValidationError,
    )
}

/// Checks every declared variable against its type, filling in default values. Values are kept
/// as provided, they're coerced with the arguments they end up in.
fn coerce_variables(
    schema: &Schema,
    operation: &OperationDefinition,
    provided: &Variables,
) -> Result<Variables, Vec<GraphqlError>> {
    let mut variables = Variables::default();
    let mut errors = Vec::new();

    for definition in &operation.variable_definitions {
        let name = &definition.node.name.node;
        let ty = &definition.node.var_type.node;
        let value = match provided.get(name.as_str()) {
            Some(value) => value.clone(),
            None => match &definition.node.default_value {
                Some(default) => default.node.clone(),
                None if ty.nullable => continue,
                None => ConstValue::Null,
            },
        };

        match coerce_input(schema, ty, value.clone()) {
            Ok(_) => {
                variables.0.insert(name.clone(), value);
            }
            Err(err) => errors.push(
                GraphqlError::new(
                    format!("Variable ${name} of type {ty} was provided invalid value"),
                    ErrorCode::VariableError,
                )
                .with_location(Location::from(definition.pos))
                .with_extension("value", value.into_json().unwrap_or_default())
                .with_extension("problems", serde_json::Value::Array(vec![err.to_json()])),
            ),
        }
    }

    if errors.is_empty() {
        Ok(variables)
    } else {
        Err(errors)
    }
}
