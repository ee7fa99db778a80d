/// How to obtain the real value out of a wrapped, not yet available, value.
///
/// Implement it for an application type to plug a custom unwrap strategy, closures get one
/// through [`Lazy::new`].
pub trait Deferred: 'static {
    type Output;

    fn sync(self: Box<Self>) -> Self::Output;
}

struct Thunk<F>(F);

impl<T, F> Deferred for Thunk<F>
where
    F: FnOnce() -> T + 'static,
{
    type Output = T;

    fn sync(self: Box<Self>) -> T {
        (self.0)()
    }
}

/// A value that may need to be synchronously unwrapped later.
///
/// Nothing happens until [`Lazy::sync`] is called, which lets a scheduler collect many lazy
/// values before unwrapping any of them.
#[must_use]
pub struct Lazy<T> {
    state: State<T>,
}

// Boxed so that a value may hold a lazy of itself.
enum State<T> {
    Ready(Box<T>),
    Deferred(Box<dyn Deferred<Output = T>>),
}

impl<T: 'static> Lazy<T> {
    pub fn ready(value: T) -> Self {
        Self {
            state: State::Ready(Box::new(value)),
        }
    }

    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce() -> T + 'static,
    {
        Self::from_deferred(Thunk(f))
    }

    pub fn from_deferred(deferred: impl Deferred<Output = T>) -> Self {
        Self {
            state: State::Deferred(Box::new(deferred)),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, State::Ready(_))
    }

    pub fn sync(self) -> T {
        match self.state {
            State::Ready(value) => *value,
            State::Deferred(deferred) => deferred.sync(),
        }
    }

    pub fn map<U: 'static>(self, f: impl FnOnce(T) -> U + 'static) -> Lazy<U> {
        match self.state {
            State::Ready(value) => Lazy::ready(f(*value)),
            State::Deferred(deferred) => Lazy::new(move || f(deferred.sync())),
        }
    }

    pub fn and_then<U: 'static>(self, f: impl FnOnce(T) -> Lazy<U> + 'static) -> Lazy<U> {
        match self.state {
            State::Ready(value) => f(*value),
            State::Deferred(deferred) => Lazy::new(move || f(deferred.sync()).sync()),
        }
    }

    pub fn all(lazies: Vec<Lazy<T>>) -> Lazy<Vec<T>> {
        if lazies.iter().all(Lazy::is_ready) {
            return Lazy::ready(lazies.into_iter().map(Lazy::sync).collect());
        }
        Lazy::new(move || lazies.into_iter().map(Lazy::sync).collect())
    }
}

impl<T> std::fmt::Debug for Lazy<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.state {
            State::Ready(_) => f.write_str("Lazy(ready)"),
            State::Deferred(_) => f.write_str("Lazy(deferred)"),
        }
    }
}
