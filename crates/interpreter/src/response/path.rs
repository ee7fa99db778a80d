use async_graphql_value::ConstValue;
use graphql_interpreter_error::{ErrorPath, InsertIntoErrorPath};

use super::{ResponseListId, ResponseObjectId};

/// Unique identifier of a value within the response. Used to propagate null at the right place
/// and to generate the appropriate error path for GraphQL errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ResponseValueId<'a> {
    Field {
        object_id: ResponseObjectId,
        index: usize,
        key: &'a str,
        nullable: bool,
    },
    Index {
        list_id: ResponseListId,
        index: usize,
        nullable: bool,
    },
}

impl ResponseValueId<'_> {
    pub fn is_nullable(&self) -> bool {
        match self {
            ResponseValueId::Field { nullable, .. } => *nullable,
            ResponseValueId::Index { nullable, .. } => *nullable,
        }
    }

    pub fn to_const(self) -> ConstValue {
        match self {
            ResponseValueId::Field { key, .. } => ConstValue::String(key.to_string()),
            ResponseValueId::Index { index, .. } => ConstValue::from(index as u64),
        }
    }
}

impl InsertIntoErrorPath for &ResponseValueId<'_> {
    fn insert_into(self, path: &mut ErrorPath) {
        match self {
            ResponseValueId::Field { key, .. } => key.insert_into(path),
            ResponseValueId::Index { index, .. } => index.insert_into(path),
        }
    }
}
