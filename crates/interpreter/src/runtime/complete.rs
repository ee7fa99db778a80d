use std::{error::Error, rc::Rc};

use async_graphql_parser::types::{BaseType, Type};
use async_graphql_value::ConstValue;
use graphql_dataloader::Lazy;
use graphql_interpreter_error::{ErrorCode, ErrorPath, GraphqlError};

use super::query::{PendingLazy, QueryRun, Target};
use crate::{
    dispatch::AfterExtensions, response::ResponseValue, schema::MetaType, type_resolver::resolve_concrete_type,
    ExecutionError, FieldValue, ObjectType, ResolverError, ResolverResult, UnauthorizedError, UnhandledErrors,
};

impl<'a> QueryRun<'a> {
    /// Handles what a resolver or a synced lazy value produced. Lazy values go back to the queue,
    /// the field's extensions see the value once it isn't lazy anymore.
    pub(super) fn complete_resolved(
        &mut self,
        target: Target<'a>,
        result: ResolverResult,
        after: Option<Rc<AfterExtensions>>,
    ) -> Result<(), ExecutionError> {
        let result = match (result, after) {
            (Ok(value), after) if self.schema.is_lazy(&value) => {
                self.defer(target, value, after);
                return Ok(());
            }
            (Ok(value), Some(after)) => after.apply(value, &self.ctx),
            (result, _) => result,
        };
        match result {
            Ok(value) => self.complete_value(target, value),
            Err(error) => self.fail(target, error),
        }
    }

    fn defer(&mut self, target: Target<'a>, value: FieldValue, after: Option<Rc<AfterExtensions>>) {
        self.queue.push(PendingLazy {
            lazy: into_lazy(value),
            target,
            after,
        });
    }

    pub(super) fn complete_value(&mut self, target: Target<'a>, value: FieldValue) -> Result<(), ExecutionError> {
        if self.response.is_dead(&target.path) {
            return Ok(());
        }
        if self.schema.is_lazy(&value) {
            self.defer(target, value, None);
            return Ok(());
        }
        let value = match value {
            FieldValue::Error(error) => return self.fail(target, ResolverError::Graphql(error)),
            value => value,
        };
        if value.is_null() {
            self.null_value(&target);
            return Ok(());
        }

        let ty: &'a Type = target.ty;
        match &ty.base {
            BaseType::List(item_type) => {
                let items = match value.into_inner() {
                    FieldValue::Value(ConstValue::List(items)) => {
                        Some(items.into_iter().map(FieldValue::Value).collect::<Vec<_>>())
                    }
                    FieldValue::List(items) => Some(items),
                    _ => None,
                };
                let (Some(items), Some(value_id)) = (items, target.value_id()) else {
                    let error = GraphqlError::new(
                        format!(
                            "Expected a list for {}.{} of type {ty}",
                            target.parent_type.name, target.definition.name
                        ),
                        ErrorCode::InvalidValue,
                    );
                    self.field_error(&target, error);
                    return Ok(());
                };
                let list_id = self.response.push_list(items.len());
                self.response.write(&value_id, ResponseValue::List(list_id));
                for (index, item) in items.into_iter().enumerate() {
                    self.complete_value(target.item(list_id, index, item_type), item)?;
                }
                Ok(())
            }
            BaseType::Named(name) => self.complete_named(target, name.as_str(), value),
        }
    }

    fn complete_named(&mut self, target: Target<'a>, type_name: &str, value: FieldValue) -> Result<(), ExecutionError> {
        let schema = self.schema;
        match schema.type_by_name(type_name) {
            Some(MetaType::Scalar(scalar)) => {
                self.complete_leaf(&target, type_name, &value, |value| scalar.result(value));
                Ok(())
            }
            Some(MetaType::Enum(enum_type)) => {
                self.complete_leaf(&target, type_name, &value, |value| enum_type.result(value));
                Ok(())
            }
            Some(MetaType::Object(object_type)) => self.complete_object(target, object_type, value),
            Some(MetaType::Interface(_) | MetaType::Union(_)) => {
                let parent_type = target.parent_type.name.as_str();
                let field_name = target.definition.name.as_str();
                match resolve_concrete_type(schema, type_name, &value, &self.ctx, parent_type, field_name) {
                    Ok(object_type) => self.complete_object(target, object_type, value),
                    Err(error) => {
                        self.field_error(&target, error);
                        Ok(())
                    }
                }
            }
            Some(MetaType::InputObject(_)) | None => {
                let error = GraphqlError::new(
                    format!("Type `{type_name}` cannot be used as an output type"),
                    ErrorCode::InternalServerError,
                );
                self.field_error(&target, error);
                Ok(())
            }
        }
    }

    fn complete_leaf(
        &mut self,
        target: &Target<'a>,
        type_name: &str,
        value: &FieldValue,
        coerce: impl FnOnce(&ConstValue) -> Result<ConstValue, String>,
    ) {
        let coerced = match value.as_const() {
            Some(value) => coerce(value),
            None => Err(format!("{value:?} is not a leaf value")),
        };
        match (coerced, target.value_id()) {
            (Ok(ConstValue::Null), _) => self.null_value(target),
            (Ok(value), Some(value_id)) => self.response.write(&value_id, ResponseValue::Value(value)),
            (Ok(_), None) => {}
            (Err(reason), _) => {
                let error = GraphqlError::new(
                    format!(
                        "{}.{} returned a value {type_name} cannot represent: {reason}",
                        target.parent_type.name, target.definition.name
                    ),
                    ErrorCode::InvalidValue,
                );
                self.field_error(target, error);
            }
        }
    }

    fn complete_object(
        &mut self,
        target: Target<'a>,
        object_type: &'a ObjectType,
        value: FieldValue,
    ) -> Result<(), ExecutionError> {
        let value = match self.authorize_object(object_type, value) {
            Ok(value) if value.is_null() => {
                self.null_value(&target);
                return Ok(());
            }
            Ok(FieldValue::Error(error)) => return self.fail(target, ResolverError::Graphql(error)),
            Ok(value) => value,
            Err(ResolverError::Unauthorized(error)) => {
                self.field_error(&target, error.into_graphql_error());
                return Ok(());
            }
            Err(error) => return self.fail(target, error),
        };
        let Some(value_id) = target.value_id() else {
            return Ok(());
        };

        let children = self.selections.children(&target.field, object_type.name.as_str());
        let object_id = self.response.push_object(children.iter().map(|field| field.key));
        self.response.write(&value_id, ResponseValue::Object(object_id));
        self.execute_fields(object_id, &target.path, object_type, &value, &children)
    }

    /// A denied object is replaced by whatever the schema's unauthorized object hook returns,
    /// which isn't authorized again.
    fn authorize_object(&self, object_type: &ObjectType, value: FieldValue) -> ResolverResult {
        let Some(authorize) = &object_type.authorize else {
            return Ok(value);
        };
        if authorize(&value, &self.ctx)? {
            return Ok(value);
        }
        tracing::debug!(object_type = object_type.name.as_str(), "Object authorization denied");
        let replacement = self
            .schema
            .unauthorized_object(UnauthorizedError::object(&object_type.name), value, &self.ctx)?;
        self.schema.sync_lazy(replacement)
    }

    fn null_value(&mut self, target: &Target<'a>) {
        if target.ty.nullable {
            if let Some(value_id) = target.value_id() {
                self.response.write(&value_id, ResponseValue::Null);
            }
            return;
        }
        let error = GraphqlError::new(
            format!(
                "Cannot return null for non-nullable field {}.{}",
                target.parent_type.name, target.definition.name
            ),
            ErrorCode::InvalidNull,
        );
        self.field_error(target, error);
    }

    /// Records the error and nulls the closest nullable value. Errors below a value that was
    /// already nulled are dropped.
    pub(super) fn field_error(&mut self, target: &Target<'a>, error: GraphqlError) {
        if self.response.is_dead(&target.path) {
            return;
        }
        let error = error.with_path(&target.path).or_location(target.field.pos());
        self.response.push_error(error);
        self.response.propagate_null(&target.path);
    }

    /// Routes a resolver error: field errors are recorded, unauthorized errors and application
    /// errors go through the schema hooks first. Implementation errors abort the execution.
    pub(super) fn fail(&mut self, target: Target<'a>, error: ResolverError) -> Result<(), ExecutionError> {
        match error {
            ResolverError::Graphql(error) => {
                self.field_error(&target, error);
                Ok(())
            }
            ResolverError::Unauthorized(error) => match self.schema.unauthorized_field(error, &self.ctx) {
                Ok(value) => self.complete_value(target, value),
                Err(ResolverError::Unauthorized(error)) => {
                    self.field_error(&target, error.into_graphql_error());
                    Ok(())
                }
                Err(error) => self.fail(target, error),
            },
            ResolverError::Application(error) => {
                let error = match self.schema.rescue(error.as_ref(), &self.ctx) {
                    Some(Ok(value)) => return self.complete_value(target, value),
                    Some(Err(ResolverError::Application(rethrown))) => rethrown,
                    Some(Err(error)) => return self.fail(target, error),
                    None => error,
                };
                self.unhandled(&target, error)
            }
            ResolverError::Implementation(error) => Err(ExecutionError::Implementation(error)),
        }
    }

    fn unhandled(&mut self, target: &Target<'a>, error: Box<dyn Error>) -> Result<(), ExecutionError> {
        if self.response.is_dead(&target.path) {
            return Ok(());
        }
        let path = ErrorPath::from(&target.path);
        match self.schema.config().unhandled_errors {
            UnhandledErrors::Mask => {
                tracing::error!(%path, %error, "Unhandled error in resolver");
                self.field_error(target, GraphqlError::internal_server_error());
                Ok(())
            }
            UnhandledErrors::Propagate => Err(ExecutionError::Unhandled { path, error }),
        }
    }
}

/// Lazy value producing `value` once synced, type annotations are kept on the synced value.
fn into_lazy(value: FieldValue) -> Lazy<ResolverResult> {
    match value {
        FieldValue::Lazy(lazy) => lazy,
        FieldValue::Typed { value, type_name } => {
            into_lazy(*value).map(move |result| result.map(|value| value.with_type(type_name)))
        }
        value => Lazy::ready(Ok(value)),
    }
}
