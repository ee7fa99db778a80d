use async_graphql_parser::types::{BaseType, Type};
use async_graphql_value::{ConstValue, Name};
use graphql_interpreter_error::{ErrorPath, ErrorPathSegment, InsertIntoErrorPath};

use crate::{schema::MetaType, Schema};

/// Why an input value doesn't match its type, with the location of the offending part.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct InputError {
    pub path: ErrorPath,
    pub explanation: String,
}

impl InputError {
    fn new(explanation: impl Into<String>) -> Self {
        Self {
            path: ErrorPath::default(),
            explanation: explanation.into(),
        }
    }

    fn within(mut self, segment: impl InsertIntoErrorPath) -> Self {
        let mut path = ErrorPath::default();
        segment.insert_into(&mut path);
        path.extend(self.path.drain(..));
        self.path = path;
        self
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "path": self.path,
            "explanation": self.explanation,
        })
    }
}

/// Coerces a client provided value into its internal representation: scalars and enums go
/// through their coercion, input objects get their defaults and single values are wrapped into
/// lists when a list is expected.
pub(crate) fn coerce_input(schema: &Schema, ty: &Type, value: ConstValue) -> Result<ConstValue, InputError> {
    if value == ConstValue::Null {
        return if ty.nullable {
            Ok(ConstValue::Null)
        } else {
            Err(InputError::new(format!("Expected value of type {ty} to not be null")))
        };
    }

    match &ty.base {
        BaseType::List(item_type) => match value {
            ConstValue::List(items) => items
                .into_iter()
                .enumerate()
                .map(|(index, item)| coerce_input(schema, item_type, item).map_err(|err| err.within(index)))
                .collect::<Result<Vec<_>, _>>()
                .map(ConstValue::List),
            value => coerce_input(schema, item_type, value).map(|item| ConstValue::List(vec![item])),
        },
        BaseType::Named(name) => coerce_named(schema, name, value),
    }
}

fn coerce_named(schema: &Schema, name: &Name, value: ConstValue) -> Result<ConstValue, InputError> {
    match schema.type_by_name(name.as_str()) {
        Some(MetaType::Scalar(scalar)) => scalar.input(&value).map_err(InputError::new),
        Some(MetaType::Enum(enum_type)) => enum_type.input(&value).map_err(InputError::new),
        Some(MetaType::InputObject(input_object)) => {
            let ConstValue::Object(mut fields) = value else {
                return Err(InputError::new(format!("Expected an input object of type {name}, got {value}")));
            };

            let mut coerced = indexmap::IndexMap::with_capacity(input_object.fields.len());
            for (field_name, definition) in &input_object.fields {
                let value = match fields.shift_remove(field_name.as_str()) {
                    Some(value) => value,
                    None => match &definition.default_value {
                        Some(default) => default.clone(),
                        None if definition.ty.nullable => continue,
                        None => {
                            return Err(InputError::new(format!(
                                "Expected value of type {} to not be null",
                                definition.ty
                            ))
                            .within(field_name.as_str()))
                        }
                    },
                };
                let value =
                    coerce_input(schema, &definition.ty, value).map_err(|err| err.within(field_name.as_str()))?;
                coerced.insert(Name::new(field_name), value);
            }

            if let Some((unknown, _)) = fields.first() {
                let segment = ErrorPathSegment::Field(unknown.as_str().into());
                return Err(InputError::new(format!("Field is not defined on {name}")).within(segment));
            }

            Ok(ConstValue::Object(coerced))
        }
        _ => Err(InputError::new(format!("{name} is not an input type"))),
    }
}
