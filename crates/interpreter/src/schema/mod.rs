mod builder;
mod field;
mod hooks;
mod scalar;
mod types;

use std::{error::Error, sync::Arc};

use fxhash::FxHashMap;
use indexmap::IndexMap;

pub use builder::SchemaBuilder;
pub(crate) use field::Resolve;
pub use field::{Extra, FieldDefinition, InputValueDefinition, Parameter, ResolverClass};
pub(crate) use hooks::RescueHandler;
use hooks::{ResolveTypeFn, UnauthorizedFieldFn, UnauthorizedObjectFn};
pub(crate) use types::named_type;
#[cfg(test)]
pub(crate) use types::parse_type;
pub use types::{EnumType, InputObjectType, InterfaceType, MetaType, ObjectType, ScalarType, UnionType};

use crate::{
    analysis::QueryAnalyzer, Context, ExecutionConfig, FieldValue, Instrumentation, ResolverResult, UnauthorizedError,
};

/// Finished, immutable type system with the hooks the execution consults.
///
/// Cloning is cheap.
#[derive(Clone)]
pub struct Schema(Arc<SchemaInner>);

struct SchemaInner {
    query_type: String,
    mutation_type: Option<String>,
    subscription_type: Option<String>,
    types: IndexMap<String, MetaType>,
    // abstract type -> object types, in registration order
    possible_types: FxHashMap<String, Vec<String>>,
    resolve_type: ResolveTypeFn,
    unauthorized_object: UnauthorizedObjectFn,
    unauthorized_field: UnauthorizedFieldFn,
    rescue_handlers: Vec<RescueHandler>,
    instrumentations: Vec<Box<dyn Instrumentation>>,
    analyzers: Vec<Box<dyn QueryAnalyzer>>,
    config: ExecutionConfig,
}

impl Schema {
    pub fn build(query: impl Into<String>, mutation: Option<&str>, subscription: Option<&str>) -> SchemaBuilder {
        SchemaBuilder::new(query.into(), mutation.map(Into::into), subscription.map(Into::into))
    }

    pub fn query_type(&self) -> &str {
        &self.0.query_type
    }

    pub fn mutation_type(&self) -> Option<&str> {
        self.0.mutation_type.as_deref()
    }

    pub fn subscription_type(&self) -> Option<&str> {
        self.0.subscription_type.as_deref()
    }

    pub fn type_by_name(&self, name: &str) -> Option<&MetaType> {
        self.0.types.get(name)
    }

    pub fn types(&self) -> impl Iterator<Item = &MetaType> + '_ {
        self.0.types.values()
    }

    /// Field of an object or interface type.
    pub fn get_field(&self, type_name: &str, field_name: &str) -> Option<&FieldDefinition> {
        self.type_by_name(type_name)?.fields()?.get(field_name)
    }

    /// Object types an abstract type may resolve to. Empty for any other type.
    pub fn possible_types(&self, abstract_type: &str) -> impl Iterator<Item = &str> + '_ {
        self.0
            .possible_types
            .get(abstract_type)
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    pub fn is_possible_type(&self, abstract_type: &str, object_type: &str) -> bool {
        self.0
            .possible_types
            .get(abstract_type)
            .is_some_and(|types| types.iter().any(|ty| ty == object_type))
    }

    pub fn is_lazy(&self, value: &FieldValue) -> bool {
        match value {
            FieldValue::Lazy(_) => true,
            FieldValue::Typed { value, .. } => self.is_lazy(value),
            _ => false,
        }
    }

    /// Unwraps lazy values until a plain value is reached, keeping any type annotation.
    pub fn sync_lazy(&self, value: FieldValue) -> ResolverResult {
        match value {
            FieldValue::Lazy(lazy) => self.sync_lazy(lazy.sync()?),
            FieldValue::Typed { value, type_name } => Ok(FieldValue::Typed {
                value: Box::new(self.sync_lazy(*value)?),
                type_name,
            }),
            value => Ok(value),
        }
    }

    pub fn config(&self) -> &ExecutionConfig {
        &self.0.config
    }

    pub(crate) fn resolve_type(&self, abstract_type: &str, value: &FieldValue, ctx: &Context) -> Option<String> {
        (self.0.resolve_type)(abstract_type, value, ctx)
    }

    pub(crate) fn unauthorized_object(
        &self,
        error: UnauthorizedError,
        value: FieldValue,
        ctx: &Context,
    ) -> ResolverResult {
        (self.0.unauthorized_object)(error, value, ctx)
    }

    pub(crate) fn unauthorized_field(&self, error: UnauthorizedError, ctx: &Context) -> ResolverResult {
        (self.0.unauthorized_field)(error, ctx)
    }

    pub(crate) fn rescue(&self, error: &(dyn Error + 'static), ctx: &Context) -> Option<ResolverResult> {
        hooks::rescue(&self.0.rescue_handlers, error, ctx)
    }

    pub(crate) fn instrumentations(&self) -> &[Box<dyn Instrumentation>] {
        &self.0.instrumentations
    }

    pub(crate) fn analyzers(&self) -> &[Box<dyn QueryAnalyzer>] {
        &self.0.analyzers
    }
}

impl std::fmt::Debug for Schema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Schema")
            .field("query_type", &self.0.query_type)
            .field("mutation_type", &self.0.mutation_type)
            .field("subscription_type", &self.0.subscription_type)
            .field("types", &self.0.types.len())
            .finish_non_exhaustive()
    }
}
