mod builder;
mod path;

use async_graphql_value::ConstValue;
use graphql_interpreter_error::GraphqlError;
use serde::ser::{SerializeMap, SerializeSeq};

pub(crate) use builder::ResponseBuilder;
pub(crate) use path::ResponseValueId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ResponseObjectId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ResponseListId(usize);

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ResponseValue {
    /// Not written yet. Only remains in parts of the response that were nulled.
    Pending,
    Null,
    Value(ConstValue),
    Object(ResponseObjectId),
    List(ResponseListId),
}

#[derive(Debug, Clone, PartialEq)]
struct ResponseObject {
    fields: Vec<(Box<str>, ResponseValue)>,
}

/// Response tree, objects and lists are stored flat and reference each other by index.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseData {
    root: ResponseObjectId,
    objects: Vec<ResponseObject>,
    lists: Vec<Vec<ResponseValue>>,
}

impl ResponseData {
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[derive(Debug)]
pub enum Response {
    /// The operation was executed, possibly with field errors.
    Executed(ExecutedResponse),
    /// The operation never started, the response has no `data` key.
    RequestError(RequestErrorResponse),
}

#[derive(Debug)]
pub struct ExecutedResponse {
    /// `None` when a null propagated up to the root.
    pub data: Option<ResponseData>,
    pub errors: Vec<GraphqlError>,
}

#[derive(Debug)]
pub struct RequestErrorResponse {
    pub errors: Vec<GraphqlError>,
}

impl Response {
    pub(crate) fn request_error(errors: impl IntoIterator<Item = GraphqlError>) -> Self {
        Self::RequestError(RequestErrorResponse {
            errors: errors.into_iter().collect(),
        })
    }

    pub fn data(&self) -> Option<&ResponseData> {
        match self {
            Response::Executed(response) => response.data.as_ref(),
            Response::RequestError(_) => None,
        }
    }

    pub fn errors(&self) -> &[GraphqlError] {
        match self {
            Response::Executed(response) => &response.errors,
            Response::RequestError(response) => &response.errors,
        }
    }

    pub fn is_request_error(&self) -> bool {
        matches!(self, Response::RequestError(_))
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

impl serde::Serialize for Response {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        match self {
            Response::Executed(response) => {
                map.serialize_entry("data", &response.data)?;
                if !response.errors.is_empty() {
                    map.serialize_entry("errors", &response.errors)?;
                }
            }
            Response::RequestError(response) => {
                map.serialize_entry("errors", &response.errors)?;
            }
        }
        map.end()
    }
}

impl serde::Serialize for ResponseData {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        SerializableObject {
            data: self,
            id: self.root,
        }
        .serialize(serializer)
    }
}

struct SerializableObject<'a> {
    data: &'a ResponseData,
    id: ResponseObjectId,
}

impl serde::Serialize for SerializableObject<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let fields = &self.data.objects[self.id.0].fields;
        let mut map = serializer.serialize_map(Some(fields.len()))?;
        for (key, value) in fields {
            map.serialize_entry(
                key,
                &SerializableValue {
                    data: self.data,
                    value,
                },
            )?;
        }
        map.end()
    }
}

struct SerializableValue<'a> {
    data: &'a ResponseData,
    value: &'a ResponseValue,
}

impl serde::Serialize for SerializableValue<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self.value {
            ResponseValue::Pending | ResponseValue::Null => serializer.serialize_none(),
            ResponseValue::Value(value) => value.serialize(serializer),
            ResponseValue::Object(id) => SerializableObject {
                data: self.data,
                id: *id,
            }
            .serialize(serializer),
            ResponseValue::List(id) => {
                let items = &self.data.lists[id.0];
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for value in items {
                    seq.serialize_element(&SerializableValue { data: self.data, value })?;
                }
                seq.end()
            }
        }
    }
}
