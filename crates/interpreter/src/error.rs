use graphql_interpreter_error::{ErrorCode, ErrorPath, GraphqlError};

use crate::FieldValue;

pub type ResolverResult = Result<FieldValue, ResolverError>;

/// Error returned by resolvers, extensions, authorization checks and lazy values.
#[derive(thiserror::Error, Debug)]
pub enum ResolverError {
    /// Field error, nulls the field and is added to the response errors as is.
    #[error("{0}")]
    Graphql(GraphqlError),
    /// Routed through the schema's unauthorized hooks.
    #[error("{0}")]
    Unauthorized(UnauthorizedError),
    /// Any other application error, routed through the rescue handlers.
    #[error("{0}")]
    Application(Box<dyn std::error::Error>),
    /// Broken schema, aborts the execution.
    #[error(transparent)]
    Implementation(#[from] ImplementationError),
}

impl ResolverError {
    pub fn application(error: impl std::error::Error + 'static) -> Self {
        Self::Application(Box::new(error))
    }

    pub fn message(message: impl Into<std::borrow::Cow<'static, str>>) -> Self {
        Self::Graphql(GraphqlError::field_error(message))
    }
}

impl From<GraphqlError> for ResolverError {
    fn from(error: GraphqlError) -> Self {
        Self::Graphql(error)
    }
}

impl From<UnauthorizedError> for ResolverError {
    fn from(error: UnauthorizedError) -> Self {
        Self::Unauthorized(error)
    }
}

/// Authorization denied access to an object or a field.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error(
    "Not authorized to access {type_name}{}",
    .field_name.as_deref().map(|field_name| format!(".{field_name}")).unwrap_or_default()
)]
pub struct UnauthorizedError {
    pub type_name: String,
    pub field_name: Option<String>,
}

impl UnauthorizedError {
    pub fn object(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            field_name: None,
        }
    }

    pub fn field(type_name: impl Into<String>, field_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            field_name: Some(field_name.into()),
        }
    }

    pub fn into_graphql_error(self) -> GraphqlError {
        GraphqlError::new(self.to_string(), ErrorCode::Unauthorized)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ImplementationError {
    #[error(
        "Failed to implement {parent_type}.{field}: the object does not respond to `{method}` and is not a mapping"
    )]
    FieldNotImplemented {
        parent_type: String,
        field: String,
        method: String,
    },
    #[error(
        "{resolver} for {parent_type}.{field} cannot accept the given arguments (unknown: [{}], missing: [{}])",
        unknown.join(", "),
        missing.join(", ")
    )]
    ArgumentMismatch {
        resolver: String,
        parent_type: String,
        field: String,
        unknown: Vec<String>,
        missing: Vec<String>,
    },
}

/// Fatal outcome of an execution, no response is produced.
#[derive(thiserror::Error, Debug)]
pub enum ExecutionError {
    #[error(transparent)]
    Implementation(#[from] ImplementationError),
    #[error("Unhandled error at {path}: {error}")]
    Unhandled {
        path: ErrorPath,
        error: Box<dyn std::error::Error>,
    },
    #[error("Instrumentation failed: {0}")]
    Instrumentation(GraphqlError),
}

/// Inconsistent type system detected when building the schema.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Type `{0}` is defined more than once")]
    DuplicateType(String),
    #[error("Unknown type `{name}` referenced by {referenced_by}")]
    UnknownType { name: String, referenced_by: String },
    #[error("Root type `{0}` must be an object type")]
    InvalidRootType(String),
    #[error("Union `{union}` member `{member}` is not an object type")]
    InvalidUnionMember { union: String, member: String },
    #[error("`{object}` implements `{interface}` which is not an interface")]
    NotAnInterface { object: String, interface: String },
    #[error("`{object}` does not implement field `{field}` of interface `{interface}`")]
    MissingInterfaceField {
        object: String,
        interface: String,
        field: String,
    },
    #[error("{location} must be an output type but `{name}` is an input object")]
    InvalidOutputType { location: String, name: String },
    #[error("{location} must be an input type but `{name}` is not")]
    InvalidInputType { location: String, name: String },
}
