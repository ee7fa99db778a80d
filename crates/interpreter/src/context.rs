use std::{
    any::{Any, TypeId},
    rc::Rc,
    time::{Duration, Instant},
};

use fxhash::FxHashMap;
use graphql_dataloader::Dataloader;

use crate::Schema;

/// Typed values provided by the caller, one per type.
#[derive(Default)]
pub struct Data(FxHashMap<TypeId, Box<dyn Any>>);

impl Data {
    pub fn insert<T: 'static>(&mut self, value: T) {
        self.0.insert(TypeId::of::<T>(), Box::new(value));
    }

    pub fn get<T: 'static>(&self) -> Option<&T> {
        self.0.get(&TypeId::of::<T>()).and_then(|value| value.downcast_ref())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for Data {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Data").field("len", &self.0.len()).finish()
    }
}

/// Per-query context given to every resolver and hook.
#[derive(Clone)]
pub struct Context {
    inner: Rc<ContextInner>,
}

struct ContextInner {
    schema: Schema,
    data: Data,
    dataloader: Dataloader,
    operation_name: Option<String>,
    query_index: usize,
    started_at: Instant,
}

impl Context {
    pub(crate) fn new(
        schema: Schema,
        data: Data,
        dataloader: Dataloader,
        operation_name: Option<String>,
        query_index: usize,
    ) -> Self {
        Self {
            inner: Rc::new(ContextInner {
                schema,
                data,
                dataloader,
                operation_name,
                query_index,
                started_at: Instant::now(),
            }),
        }
    }

    pub fn data<T: 'static>(&self) -> Option<&T> {
        self.inner.data.get()
    }

    /// Loader shared by every query of the multiplex.
    pub fn dataloader(&self) -> &Dataloader {
        &self.inner.dataloader
    }

    pub fn schema(&self) -> &Schema {
        &self.inner.schema
    }

    pub fn operation_name(&self) -> Option<&str> {
        self.inner.operation_name.as_deref()
    }

    /// Position of the query within its multiplex.
    pub fn query_index(&self) -> usize {
        self.inner.query_index
    }

    pub fn elapsed(&self) -> Duration {
        self.inner.started_at.elapsed()
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("operation_name", &self.inner.operation_name)
            .field("query_index", &self.inner.query_index)
            .field("data", &self.inner.data)
            .finish_non_exhaustive()
    }
}
