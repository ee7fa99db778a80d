use std::{
    any::{Any, TypeId},
    cell::RefCell,
    hash::Hash,
    rc::Rc,
};

use fxhash::FxHashMap;

use crate::{
    source::{BatchSource, PendingSource},
    Source,
};

/// Table of batch sources shared by every query of one execution.
///
/// Cloning is cheap, clones share the same sources.
#[derive(Clone, Default)]
pub struct Dataloader {
    inner: Rc<Inner>,
}

#[derive(Default)]
struct Inner {
    max_batch_size: Option<usize>,
    // (source type, batch key type) -> FxHashMap<batch key, Rc<BatchSource<S>>>
    sources: RefCell<FxHashMap<TypeId, Box<dyn Any>>>,
    // Every source in creation order, used to drive them without knowing their types.
    all: RefCell<Vec<Rc<dyn PendingSource>>>,
}

impl Dataloader {
    pub fn new(max_batch_size: Option<usize>) -> Self {
        Self {
            inner: Rc::new(Inner {
                max_batch_size,
                ..Default::default()
            }),
        }
    }

    /// Returns the source for `(S, batch_key)`, creating it with `init` on first use.
    pub fn with<S, K>(&self, batch_key: K, init: impl FnOnce(&K) -> S) -> Rc<BatchSource<S>>
    where
        S: Source,
        K: Eq + Hash + 'static,
    {
        let type_id = TypeId::of::<(S, K)>();
        if let Some(source) = self
            .inner
            .sources
            .borrow()
            .get(&type_id)
            .and_then(|sources| sources.downcast_ref::<FxHashMap<K, Rc<BatchSource<S>>>>())
            .and_then(|sources| sources.get(&batch_key))
        {
            return Rc::clone(source);
        }

        // The initializer may itself use the dataloader.
        let source = Rc::new(BatchSource::new(init(&batch_key), self.inner.max_batch_size));

        let mut sources = self.inner.sources.borrow_mut();
        if let Some(sources) = sources
            .entry(type_id)
            .or_insert_with(|| Box::new(FxHashMap::<K, Rc<BatchSource<S>>>::default()))
            .downcast_mut::<FxHashMap<K, Rc<BatchSource<S>>>>()
        {
            sources.insert(batch_key, Rc::clone(&source));
        }
        self.inner.all.borrow_mut().push(source.clone());
        tracing::trace!(source = std::any::type_name::<S>(), "New batch source");

        source
    }

    /// Source without any batch key.
    pub fn source<S: Source + Default>(&self) -> Rc<BatchSource<S>> {
        self.with((), |_| S::default())
    }

    pub fn is_pending(&self) -> bool {
        self.inner.all.borrow().iter().any(|source| source.is_pending())
    }

    /// Runs every pending source until none has keys left, including keys requested while
    /// fetching.
    pub fn fulfill_pending(&self) {
        loop {
            let pending = self
                .inner
                .all
                .borrow()
                .iter()
                .filter(|source| source.is_pending())
                .cloned()
                .collect::<Vec<_>>();
            if pending.is_empty() {
                break;
            }
            for source in pending {
                source.fulfill_pending();
            }
        }
    }

    /// Drops every cached value, typically after a mutation.
    pub fn clear(&self) {
        let sources = self.inner.all.borrow().clone();
        for source in sources {
            source.clear();
        }
    }

    pub fn source_count(&self) -> usize {
        self.inner.all.borrow().len()
    }
}

impl std::fmt::Debug for Dataloader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dataloader")
            .field("sources", &self.source_count())
            .field("max_batch_size", &self.inner.max_batch_size)
            .finish_non_exhaustive()
    }
}
