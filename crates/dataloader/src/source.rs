use std::{cell::RefCell, fmt, hash::Hash, rc::Rc};

use fxhash::{FxBuildHasher, FxHashMap};
use indexmap::IndexSet;

use crate::Lazy;

/// A class of external data that can be fetched in bulk.
pub trait Source: 'static {
    type Key: Eq + Hash + Clone + fmt::Debug + 'static;
    type Value: Clone + 'static;
    type Error: std::error::Error + 'static;

    /// Fetches all the given keys at once. Values must be returned in the same order as the keys,
    /// one for each.
    fn fetch(&self, keys: &[Self::Key]) -> Result<Vec<Self::Value>, Self::Error>;
}

#[derive(thiserror::Error, Debug)]
pub enum LoadError<E> {
    /// The batch containing the key failed, every key of that batch shares the error.
    #[error("{0}")]
    Fetch(Rc<E>),
    /// The source returned a different number of values than requested keys.
    #[error("{source_name} returned {received} values for {expected} keys")]
    LengthMismatch {
        source_name: &'static str,
        expected: usize,
        received: usize,
    },
    /// The cached value was cleared before the request could read it.
    #[error("{source_name} has no value for key {key}")]
    Missing { source_name: &'static str, key: String },
}

impl<E> Clone for LoadError<E> {
    fn clone(&self) -> Self {
        match self {
            Self::Fetch(err) => Self::Fetch(Rc::clone(err)),
            Self::LengthMismatch {
                source_name,
                expected,
                received,
            } => Self::LengthMismatch {
                source_name: *source_name,
                expected: *expected,
                received: *received,
            },
            Self::Missing { source_name, key } => Self::Missing {
                source_name: *source_name,
                key: key.clone(),
            },
        }
    }
}

pub type LoadResult<S> = Result<<S as Source>::Value, LoadError<<S as Source>::Error>>;

/// One memoized instance of a [`Source`] within an execution, queuing keys until the scheduler
/// asks for them to be fetched.
pub struct BatchSource<S: Source> {
    source: S,
    max_batch_size: Option<usize>,
    state: RefCell<SourceState<S>>,
}

struct SourceState<S: Source> {
    pending: IndexSet<S::Key, FxBuildHasher>,
    results: FxHashMap<S::Key, LoadResult<S>>,
    fetch_count: usize,
}

impl<S: Source> BatchSource<S> {
    pub(crate) fn new(source: S, max_batch_size: Option<usize>) -> Self {
        Self {
            source,
            max_batch_size: max_batch_size.filter(|size| *size > 0),
            state: RefCell::new(SourceState {
                pending: IndexSet::default(),
                results: FxHashMap::default(),
                fetch_count: 0,
            }),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Queues the key, unless its value is already known.
    pub fn request(self: &Rc<Self>, key: S::Key) -> Lazy<LoadResult<S>> {
        {
            let mut state = self.state.borrow_mut();
            if let Some(result) = state.results.get(&key) {
                return Lazy::ready(result.clone());
            }
            state.pending.insert(key.clone());
        }
        let this = Rc::clone(self);
        Lazy::new(move || this.fulfilled(&key))
    }

    pub fn request_all(self: &Rc<Self>, keys: Vec<S::Key>) -> Lazy<Result<Vec<S::Value>, LoadError<S::Error>>> {
        let lazies = keys.into_iter().map(|key| self.request(key)).collect();
        Lazy::all(lazies).map(|results| results.into_iter().collect())
    }

    /// Requests the key and fetches it right away with whatever else is pending.
    pub fn load(self: &Rc<Self>, key: S::Key) -> LoadResult<S> {
        self.request(key).sync()
    }

    /// Seeds the cache, a later request for that key won't be fetched.
    pub fn prime(&self, key: S::Key, value: S::Value) {
        let mut state = self.state.borrow_mut();
        state.pending.shift_remove(&key);
        state.results.insert(key, Ok(value));
    }

    pub fn clear(&self) {
        self.state.borrow_mut().results.clear();
    }

    pub fn is_pending(&self) -> bool {
        !self.state.borrow().pending.is_empty()
    }

    /// Number of calls made to [`Source::fetch`] so far.
    pub fn fetch_count(&self) -> usize {
        self.state.borrow().fetch_count
    }

    /// Fetches every pending key, in batches of at most `max_batch_size` keys. Keys queued by the
    /// fetch itself are fetched as well before returning.
    pub fn fulfill_pending(&self) {
        loop {
            let keys = {
                let mut state = self.state.borrow_mut();
                let size = self
                    .max_batch_size
                    .map_or(state.pending.len(), |max| max.min(state.pending.len()));
                if size == 0 {
                    return;
                }
                state.fetch_count += 1;
                state.pending.drain(..size).collect::<Vec<_>>()
            };

            let source_name = std::any::type_name::<S>();
            tracing::debug!(source = source_name, keys = keys.len(), "Batch fetch");

            // No borrow is held here, the source may request other keys.
            let outcome = self.source.fetch(&keys);

            let mut state = self.state.borrow_mut();
            match outcome {
                Ok(values) if values.len() == keys.len() => {
                    for (key, value) in keys.into_iter().zip(values) {
                        state.results.insert(key, Ok(value));
                    }
                }
                Ok(values) => {
                    tracing::error!(
                        source = source_name,
                        expected = keys.len(),
                        received = values.len(),
                        "Batch fetch returned the wrong number of values"
                    );
                    let error = LoadError::LengthMismatch {
                        source_name,
                        expected: keys.len(),
                        received: values.len(),
                    };
                    for key in keys {
                        state.results.insert(key, Err(error.clone()));
                    }
                }
                Err(err) => {
                    tracing::debug!(source = source_name, "Batch fetch failed: {err}");
                    let error = LoadError::Fetch(Rc::new(err));
                    for key in keys {
                        state.results.insert(key, Err(error.clone()));
                    }
                }
            }
        }
    }

    fn fulfilled(&self, key: &S::Key) -> LoadResult<S> {
        if let Some(result) = self.cached(key) {
            return result;
        }
        self.fulfill_pending();
        self.cached(key).unwrap_or_else(|| {
            Err(LoadError::Missing {
                source_name: std::any::type_name::<S>(),
                key: format!("{key:?}"),
            })
        })
    }

    fn cached(&self, key: &S::Key) -> Option<LoadResult<S>> {
        self.state.borrow().results.get(key).cloned()
    }
}

/// Type-erased view used by the [`crate::Dataloader`] to drive all its sources.
pub(crate) trait PendingSource {
    fn is_pending(&self) -> bool;
    fn fulfill_pending(&self);
    fn clear(&self);
}

impl<S: Source> PendingSource for BatchSource<S> {
    fn is_pending(&self) -> bool {
        BatchSource::is_pending(self)
    }

    fn fulfill_pending(&self) {
        BatchSource::fulfill_pending(self)
    }

    fn clear(&self) {
        BatchSource::clear(self)
    }
}
