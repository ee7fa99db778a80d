use std::{borrow::Cow, rc::Rc};

use async_graphql_value::ConstValue;
use graphql_dataloader::{Lazy, LoadError};
use graphql_interpreter_error::{ErrorCode, GraphqlError};

use crate::{Arguments, Context, ResolverError, ResolverResult};

/// Application object exposing named methods to resolvers.
pub trait Object: 'static {
    /// Concrete GraphQL type of this object, used by the default type resolution.
    fn type_name(&self) -> Option<&str> {
        None
    }

    /// Calls `method`, `None` means the object doesn't respond to it.
    fn call(&self, method: &str, arguments: &Arguments, ctx: &Context) -> Option<ResolverResult>;
}

/// Values produced by resolvers and given back to them as parent objects.
pub enum FieldValue {
    Null,
    /// Leaf value, or a mapping when it's an object.
    Value(ConstValue),
    Object(Rc<dyn Object>),
    List(Vec<FieldValue>),
    /// Value with its concrete type attached.
    Typed {
        value: Box<FieldValue>,
        type_name: Cow<'static, str>,
    },
    Lazy(Lazy<ResolverResult>),
    /// Field error returned rather than raised.
    Error(GraphqlError),
}

impl FieldValue {
    pub fn value(value: impl Into<ConstValue>) -> Self {
        Self::Value(value.into())
    }

    pub fn object(object: impl Object) -> Self {
        Self::Object(Rc::new(object))
    }

    pub fn list(items: impl IntoIterator<Item = impl Into<FieldValue>>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    pub fn lazy(f: impl FnOnce() -> ResolverResult + 'static) -> Self {
        Self::Lazy(Lazy::new(f))
    }

    /// Wraps a batched load, a failed batch becomes a field error.
    pub fn load<T, E>(lazy: Lazy<Result<T, LoadError<E>>>) -> Self
    where
        T: Into<FieldValue> + 'static,
        E: std::fmt::Display + 'static,
    {
        Self::Lazy(lazy.map(|result| {
            result
                .map(Into::into)
                .map_err(|err| ResolverError::Graphql(GraphqlError::new(err.to_string(), ErrorCode::BatchLoadError)))
        }))
    }

    #[must_use]
    pub fn with_type(self, type_name: impl Into<Cow<'static, str>>) -> Self {
        Self::Typed {
            value: Box::new(self),
            type_name: type_name.into(),
        }
    }

    pub fn is_null(&self) -> bool {
        match self {
            Self::Null | Self::Value(ConstValue::Null) => true,
            Self::Typed { value, .. } => value.is_null(),
            _ => false,
        }
    }

    pub fn is_lazy(&self) -> bool {
        matches!(self, Self::Lazy(_))
    }

    /// Strips the type annotation.
    pub fn inner(&self) -> &FieldValue {
        match self {
            Self::Typed { value, .. } => value.inner(),
            value => value,
        }
    }

    pub fn into_inner(self) -> FieldValue {
        match self {
            Self::Typed { value, .. } => value.into_inner(),
            value => value,
        }
    }

    /// Type name carried by the value itself, if any.
    pub fn type_name(&self) -> Option<&str> {
        match self {
            Self::Typed { type_name, .. } => Some(type_name),
            Self::Object(object) => object.type_name(),
            Self::Value(ConstValue::Object(map)) => match map.get("__typename") {
                Some(ConstValue::String(name)) => Some(name),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn as_const(&self) -> Option<&ConstValue> {
        match self.inner() {
            Self::Value(value) => Some(value),
            _ => None,
        }
    }
}

impl From<ConstValue> for FieldValue {
    fn from(value: ConstValue) -> Self {
        Self::Value(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl<T: Into<FieldValue>> From<Vec<T>> for FieldValue {
    fn from(items: Vec<T>) -> Self {
        Self::list(items)
    }
}

impl From<Rc<dyn Object>> for FieldValue {
    fn from(object: Rc<dyn Object>) -> Self {
        Self::Object(object)
    }
}

impl From<GraphqlError> for FieldValue {
    fn from(error: GraphqlError) -> Self {
        Self::Error(error)
    }
}

macro_rules! impl_from_scalar {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for FieldValue {
                fn from(value: $ty) -> Self {
                    Self::Value(ConstValue::from(value))
                }
            }
        )*
    };
}

impl_from_scalar!(i32, i64, u32, u64, f64, bool, String, &str);

impl std::fmt::Debug for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => f.write_str("Null"),
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Object(object) => f
                .debug_tuple("Object")
                .field(&object.type_name().unwrap_or("?"))
                .finish(),
            Self::List(items) => f.debug_tuple("List").field(items).finish(),
            Self::Typed { value, type_name } => f
                .debug_struct("Typed")
                .field("value", value)
                .field("type_name", type_name)
                .finish(),
            Self::Lazy(lazy) => lazy.fmt(f),
            Self::Error(error) => f.debug_tuple("Error").field(error).finish(),
        }
    }
}
