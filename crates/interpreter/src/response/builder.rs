use graphql_interpreter_error::GraphqlError;

use super::{
    ExecutedResponse, Response, ResponseData, ResponseListId, ResponseObject, ResponseObjectId, ResponseValue,
    ResponseValueId,
};

pub(crate) struct ResponseBuilder {
    // will be None if an error propagated up to the root.
    root: Option<ResponseObjectId>,
    objects: Vec<ResponseObject>,
    lists: Vec<Vec<ResponseValue>>,
    errors: Vec<GraphqlError>,
}

impl ResponseBuilder {
    pub fn new<'k>(root_keys: impl IntoIterator<Item = &'k str>) -> Self {
        let mut builder = Self {
            root: None,
            objects: Vec::new(),
            lists: Vec::new(),
            errors: Vec::new(),
        };
        builder.root = Some(builder.push_object(root_keys));
        builder
    }

    pub fn root(&self) -> Option<ResponseObjectId> {
        self.root
    }

    /// Allocates an object with one pending slot per response key.
    pub fn push_object<'k>(&mut self, keys: impl IntoIterator<Item = &'k str>) -> ResponseObjectId {
        let id = ResponseObjectId(self.objects.len());
        self.objects.push(ResponseObject {
            fields: keys.into_iter().map(|key| (key.into(), ResponseValue::Pending)).collect(),
        });
        id
    }

    pub fn push_list(&mut self, len: usize) -> ResponseListId {
        let id = ResponseListId(self.lists.len());
        self.lists.push(vec![ResponseValue::Pending; len]);
        id
    }

    pub fn push_error(&mut self, error: GraphqlError) {
        self.errors.push(error);
    }

    pub fn write(&mut self, value_id: &ResponseValueId<'_>, value: ResponseValue) {
        *self.slot_mut(value_id) = value;
    }

    /// Nulls the closest nullable value on the path, the whole data if there is none.
    pub fn propagate_null(&mut self, path: &[ResponseValueId<'_>]) {
        let Some(value_id) = path.iter().rev().find(|value| value.is_nullable()) else {
            self.root = None;
            return;
        };
        self.write(value_id, ResponseValue::Null);
    }

    /// Whether a null was propagated over one of the ancestors of the last value of `path`.
    /// Nothing written below it will ever be visible.
    pub fn is_dead(&self, path: &[ResponseValueId<'_>]) -> bool {
        if self.root.is_none() {
            return true;
        }
        let Some((_, ancestors)) = path.split_last() else {
            return false;
        };
        ancestors
            .iter()
            .any(|value_id| matches!(self.slot(value_id), ResponseValue::Null))
    }

    pub fn into_response(self) -> Response {
        let data = self.root.map(|root| ResponseData {
            root,
            objects: self.objects,
            lists: self.lists,
        });
        Response::Executed(ExecutedResponse {
            data,
            errors: self.errors,
        })
    }

    fn slot(&self, value_id: &ResponseValueId<'_>) -> &ResponseValue {
        match *value_id {
            ResponseValueId::Field { object_id, index, .. } => &self.objects[object_id.0].fields[index].1,
            ResponseValueId::Index { list_id, index, .. } => &self.lists[list_id.0][index],
        }
    }

    fn slot_mut(&mut self, value_id: &ResponseValueId<'_>) -> &mut ResponseValue {
        match *value_id {
            ResponseValueId::Field { object_id, index, .. } => &mut self.objects[object_id.0].fields[index].1,
            ResponseValueId::Index { list_id, index, .. } => &mut self.lists[list_id.0][index],
        }
    }
}
