use graphql_interpreter_error::{ErrorCode, GraphqlError};
use itertools::Itertools;

use crate::{schema::MetaType, Context, FieldValue, ObjectType, Schema};

/// Finds the object type a value of an interface or union field is exposed as.
pub(crate) fn resolve_concrete_type<'s>(
    schema: &'s Schema,
    abstract_type: &str,
    value: &FieldValue,
    ctx: &Context,
    parent_type: &str,
    field_name: &str,
) -> Result<&'s ObjectType, GraphqlError> {
    let resolved = schema.resolve_type(abstract_type, value, ctx);
    let object = resolved
        .as_deref()
        .filter(|name| schema.is_possible_type(abstract_type, name))
        .and_then(|name| schema.type_by_name(name))
        .and_then(MetaType::as_object);

    object.ok_or_else(|| {
        tracing::debug!(abstract_type, resolved = ?resolved, "Unresolved abstract type");
        GraphqlError::new(
            format!(
                "The value from \"{field_name}\" on \"{parent_type}\" could not be resolved to \"{abstract_type}\". \
                 (Received: {}, Expected: [{}])",
                resolved.as_deref().unwrap_or("nothing"),
                schema.possible_types(abstract_type).join(", ")
            ),
            ErrorCode::TypeResolutionError,
        )
    })
}
