use std::{error::Error, sync::Arc};

use crate::{Context, FieldValue, ResolverError, ResolverResult, UnauthorizedError};

pub(crate) type ResolveTypeFn = Arc<dyn Fn(&str, &FieldValue, &Context) -> Option<String> + Send + Sync>;
pub(crate) type UnauthorizedObjectFn =
    Arc<dyn Fn(UnauthorizedError, FieldValue, &Context) -> ResolverResult + Send + Sync>;
pub(crate) type UnauthorizedFieldFn = Arc<dyn Fn(UnauthorizedError, &Context) -> ResolverResult + Send + Sync>;

/// Type carried by the value itself: a typed value, an object's type name or the `__typename`
/// key of a mapping.
pub(crate) fn default_resolve_type(_abstract_type: &str, value: &FieldValue, _ctx: &Context) -> Option<String> {
    value.type_name().map(str::to_string)
}

pub(crate) fn default_unauthorized_object(
    error: UnauthorizedError,
    _object: FieldValue,
    _ctx: &Context,
) -> ResolverResult {
    Err(ResolverError::Graphql(error.into_graphql_error()))
}

pub(crate) fn default_unauthorized_field(error: UnauthorizedError, _ctx: &Context) -> ResolverResult {
    Err(ResolverError::Graphql(error.into_graphql_error()))
}

/// Converts application errors of one type into field results.
pub(crate) struct RescueHandler {
    pub error_type: &'static str,
    handle: Box<dyn Fn(&(dyn Error + 'static), &Context) -> Option<ResolverResult> + Send + Sync>,
}

impl RescueHandler {
    pub fn new<E, F>(handler: F) -> Self
    where
        E: Error + 'static,
        F: Fn(&E, &Context) -> ResolverResult + Send + Sync + 'static,
    {
        Self {
            error_type: std::any::type_name::<E>(),
            handle: Box::new(move |error: &(dyn Error + 'static), ctx: &Context| {
                error.downcast_ref::<E>().map(|error| handler(error, ctx))
            }),
        }
    }
}

/// Finds the first handler, in registration order, matching the error or one of its sources.
pub(crate) fn rescue(
    handlers: &[RescueHandler],
    error: &(dyn Error + 'static),
    ctx: &Context,
) -> Option<ResolverResult> {
    let mut current = Some(error);
    while let Some(error) = current {
        for handler in handlers {
            if let Some(result) = (handler.handle)(error, ctx) {
                tracing::debug!(error_type = handler.error_type, "Rescued application error");
                return Some(result);
            }
        }
        current = error.source();
    }
    None
}
