use std::{collections::VecDeque, rc::Rc};

use async_graphql_parser::types::{OperationType, Type};
use async_graphql_value::{ConstValue, Name};
use graphql_dataloader::Lazy;
use graphql_interpreter_error::{ErrorCode, ErrorPath, GraphqlError};
use indexmap::IndexMap;

use crate::{
    dispatch::{self, AfterExtensions, Resolution},
    operation::{coerce_arguments, Operation},
    response::{Response, ResponseBuilder, ResponseListId, ResponseObjectId, ResponseValue, ResponseValueId},
    schema::MetaType,
    selection::{MergedField, MergedSelectionSet, SelectionMerger},
    Context, ExecutionError, Extra, FieldDefinition, FieldValue, ObjectType, ResolverError, ResolverResult, Schema,
    UnauthorizedError, UnhandledErrors,
};

/// Lazy value waiting for the next wave.
pub(super) struct PendingLazy<'a> {
    pub lazy: Lazy<ResolverResult>,
    pub target: Target<'a>,
    pub after: Option<Rc<AfterExtensions>>,
}

/// Response slot a value is written to, with the field that produced it.
#[derive(Clone)]
pub(super) struct Target<'a> {
    pub parent_type: &'a ObjectType,
    pub definition: &'a FieldDefinition,
    pub field: Rc<MergedField<'a>>,
    /// Never empty, the last id is the slot itself.
    pub path: Vec<ResponseValueId<'a>>,
    pub ty: &'a Type,
}

impl<'a> Target<'a> {
    pub fn value_id(&self) -> Option<ResponseValueId<'a>> {
        self.path.last().copied()
    }

    pub fn item(&self, list_id: ResponseListId, index: usize, ty: &'a Type) -> Self {
        let mut path = Vec::with_capacity(self.path.len() + 1);
        path.extend_from_slice(&self.path);
        path.push(ResponseValueId::Index {
            list_id,
            index,
            nullable: ty.nullable,
        });
        Self {
            parent_type: self.parent_type,
            definition: self.definition,
            field: Rc::clone(&self.field),
            path,
            ty,
        }
    }
}

enum RootValue {
    // authorized right before the first step
    Unchecked(FieldValue),
    Authorized(Rc<FieldValue>),
    Denied,
}

/// Execution state of one query of a multiplex.
pub(crate) struct QueryRun<'a> {
    pub(super) index: usize,
    pub(super) schema: &'a Schema,
    operation: &'a Operation,
    pub(super) ctx: Context,
    root_type: &'a ObjectType,
    root_value: RootValue,
    root_fields: MergedSelectionSet<'a>,
    pub(super) selections: SelectionMerger<'a>,
    pub(super) response: ResponseBuilder,
    // root field indices, a single step for queries and one per field for mutations
    steps: VecDeque<Vec<usize>>,
    pub(super) queue: Vec<PendingLazy<'a>>,
}

impl<'a> QueryRun<'a> {
    pub(crate) fn new(
        index: usize,
        schema: &'a Schema,
        operation: &'a Operation,
        ctx: Context,
        root_value: FieldValue,
    ) -> Result<Self, GraphqlError> {
        let root_type = schema
            .type_by_name(&operation.root_type)
            .and_then(MetaType::as_object)
            .ok_or_else(|| {
                GraphqlError::new(
                    format!("Root type `{}` is not an object type", operation.root_type),
                    ErrorCode::InternalServerError,
                )
            })?;

        let mut selections = SelectionMerger::new(schema, &operation.fragments, &operation.variables);
        let root_fields = selections.root(&operation.selection_set, root_type.name.as_str());
        let response = ResponseBuilder::new(root_fields.iter().map(|field| field.key));

        let indices = 0..root_fields.len();
        let steps: VecDeque<Vec<usize>> = match operation.ty {
            OperationType::Mutation => indices.map(|index| vec![index]).collect(),
            OperationType::Query | OperationType::Subscription => VecDeque::from([indices.collect()]),
        };

        Ok(Self {
            index,
            schema,
            operation,
            ctx,
            root_type,
            root_value: RootValue::Unchecked(root_value),
            root_fields,
            selections,
            response,
            steps,
            queue: Vec::new(),
        })
    }

    pub(super) fn has_steps(&self) -> bool {
        !self.steps.is_empty()
    }

    pub(super) fn into_response(self) -> Response {
        self.response.into_response()
    }

    /// Executes the root fields of the next step. Their lazy values are left in the queue.
    pub(super) fn start_next_step(&mut self) -> Result<(), ExecutionError> {
        let Some(step) = self.steps.pop_front() else {
            return Ok(());
        };
        // A previous mutation field nulled the data, nothing left can be seen.
        let Some(root_id) = self.response.root() else {
            self.steps.clear();
            return Ok(());
        };

        let Some(root_value) = self.authorized_root()? else {
            self.steps.clear();
            return Ok(());
        };

        let root_type = self.root_type;
        let root_fields = Rc::clone(&self.root_fields);
        for index in step {
            if self.operation.ty == OperationType::Mutation {
                tracing::debug!(field = root_fields[index].key, "Executing mutation field");
            }
            self.execute_field(root_id, index, &[], root_type, &root_value, &root_fields[index])?;
        }
        Ok(())
    }

    /// Runs the root value through the root type's authorization. A denied root leaves no data
    /// and none of the root fields is executed.
    fn authorized_root(&mut self) -> Result<Option<Rc<FieldValue>>, ExecutionError> {
        let value = match std::mem::replace(&mut self.root_value, RootValue::Denied) {
            RootValue::Unchecked(value) => value,
            RootValue::Authorized(value) => {
                self.root_value = RootValue::Authorized(Rc::clone(&value));
                return Ok(Some(value));
            }
            RootValue::Denied => return Ok(None),
        };

        let outcome = match &self.root_type.authorize {
            None => Ok(Some(value)),
            Some(authorize) => match authorize(&value, &self.ctx) {
                Ok(true) => Ok(Some(value)),
                Ok(false) => {
                    tracing::debug!(object_type = self.root_type.name.as_str(), "Root authorization denied");
                    let error = UnauthorizedError::object(&self.root_type.name);
                    self.schema
                        .unauthorized_object(error, value, &self.ctx)
                        .and_then(|replacement| self.schema.sync_lazy(replacement))
                        .map(|replacement| (!replacement.is_null()).then_some(replacement))
                }
                Err(error) => Err(error),
            },
        };

        let error = match outcome {
            Ok(Some(value)) => {
                let value = Rc::new(value);
                self.root_value = RootValue::Authorized(Rc::clone(&value));
                return Ok(Some(value));
            }
            Ok(None) => None,
            Err(ResolverError::Graphql(error)) => Some(error),
            Err(ResolverError::Unauthorized(error)) => Some(error.into_graphql_error()),
            Err(ResolverError::Application(error)) => match self.schema.config().unhandled_errors {
                UnhandledErrors::Mask => {
                    tracing::error!(%error, "Unhandled error while authorizing the root value");
                    Some(GraphqlError::internal_server_error())
                }
                UnhandledErrors::Propagate => {
                    return Err(ExecutionError::Unhandled {
                        path: ErrorPath::default(),
                        error,
                    })
                }
            },
            Err(ResolverError::Implementation(error)) => return Err(ExecutionError::Implementation(error)),
        };
        if let Some(error) = error {
            self.response.push_error(error);
        }
        self.response.propagate_null(&[]);
        Ok(None)
    }

    pub(super) fn execute_fields(
        &mut self,
        object_id: ResponseObjectId,
        path: &[ResponseValueId<'a>],
        object_type: &'a ObjectType,
        object: &FieldValue,
        fields: &MergedSelectionSet<'a>,
    ) -> Result<(), ExecutionError> {
        for (index, field) in fields.iter().enumerate() {
            self.execute_field(object_id, index, path, object_type, object, field)?;
        }
        Ok(())
    }

    fn execute_field(
        &mut self,
        object_id: ResponseObjectId,
        index: usize,
        path: &[ResponseValueId<'a>],
        object_type: &'a ObjectType,
        object: &FieldValue,
        field: &Rc<MergedField<'a>>,
    ) -> Result<(), ExecutionError> {
        let definition = object_type.get_field(field.name);
        let value_id = ResponseValueId::Field {
            object_id,
            index,
            key: field.key,
            nullable: definition.map_or(true, |definition| definition.ty.nullable),
        };
        let mut field_path = Vec::with_capacity(path.len() + 1);
        field_path.extend_from_slice(path);
        field_path.push(value_id);
        if self.response.is_dead(&field_path) {
            return Ok(());
        }

        if field.name == "__typename" {
            let value = ConstValue::String(object_type.name.clone());
            self.response.write(&value_id, ResponseValue::Value(value));
            return Ok(());
        }

        let Some(definition) = definition else {
            let error = GraphqlError::new(
                format!("Field '{}' doesn't exist on type '{}'", field.name, object_type.name),
                ErrorCode::FieldError,
            )
            .with_location(field.pos())
            .with_path(&field_path);
            self.response.push_error(error);
            self.response.write(&value_id, ResponseValue::Null);
            return Ok(());
        };

        let target = Target {
            parent_type: object_type,
            definition,
            field: Rc::clone(field),
            path: field_path,
            ty: &definition.ty,
        };

        if let Some(timeout) = self.schema.config().timeout() {
            if self.ctx.elapsed() > timeout {
                let error = GraphqlError::new(
                    format!("Timeout on {}.{}", object_type.name, definition.name),
                    ErrorCode::Timeout,
                );
                return self.complete_value(target, FieldValue::Error(error));
            }
        }

        let variables = &self.operation.variables;
        let mut arguments = match coerce_arguments(self.schema, definition, &field.node().node, variables) {
            Ok(arguments) => arguments,
            Err(error) => {
                self.field_error(&target, error);
                return Ok(());
            }
        };
        for extra in &definition.extras {
            let value = match extra {
                Extra::Path => ConstValue::List(target.path.iter().copied().map(ResponseValueId::to_const).collect()),
                Extra::AstNode => {
                    let pos = field.pos();
                    ConstValue::Object(IndexMap::from([
                        (Name::new("line"), ConstValue::from(pos.line as u64)),
                        (Name::new("column"), ConstValue::from(pos.column as u64)),
                    ]))
                }
            };
            arguments.insert(extra.argument_name(), value);
        }

        match dispatch::resolve(object_type, definition, object, arguments, &self.ctx) {
            Ok(Resolution { value, after }) => self.complete_resolved(target, Ok(value), after),
            Err(error) => self.fail(target, error),
        }
    }
}
