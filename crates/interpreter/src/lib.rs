//! GraphQL execution against a programmatically built schema.
//!
//! A [`Schema`] is built once with [`Schema::build`] and executes [`Request`]s, alone with
//! [`Schema::execute`] or together with [`Schema::multiplex`]. Resolvers may return lazy values
//! (see [`FieldValue::lazy`] and [`FieldValue::load`]): they're synced breadth-first, one wave
//! per depth, so that keys requested from a [`Source`] by sibling fields are fetched in a single
//! batch.

mod analysis;
mod arguments;
mod config;
mod context;
mod dispatch;
mod error;
mod extension;
mod multiplex;
mod operation;
mod request;
mod response;
mod runtime;
mod schema;
mod selection;
mod type_resolver;
mod value;

pub use analysis::{OperationView, QueryAnalyzer};
pub use arguments::Arguments;
pub use async_graphql_parser::types::OperationType;
pub use async_graphql_value::{ConstValue, Name};
pub use config::{BatchingConfig, ExecutionConfig, UnhandledErrors};
pub use context::{Context, Data};
pub use error::*;
pub use extension::{ExtensionFlow, FieldExtension};
pub use graphql_dataloader::{BatchSource, Dataloader, Lazy, LoadError, Source};
pub use graphql_interpreter_error::{ErrorCode, ErrorPath, ErrorPathSegment, GraphqlError, Location};
pub use multiplex::{Instrumentation, MultiplexInfo, QueryInfo};
pub use operation::Variables;
pub use request::Request;
pub use response::{ExecutedResponse, RequestErrorResponse, Response, ResponseData};
pub use schema::{
    EnumType, Extra, FieldDefinition, InputObjectType, InputValueDefinition, InterfaceType, MetaType, ObjectType,
    Parameter, ResolverClass, ScalarType, Schema, SchemaBuilder, UnionType,
};
pub use value::{FieldValue, Object};
