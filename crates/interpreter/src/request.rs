use async_graphql_parser::types::ExecutableDocument;
use graphql_interpreter_error::{ErrorCode, GraphqlError, Location};

use crate::{Data, FieldValue, Variables};

/// One operation to execute, alone or within a multiplex.
pub struct Request {
    pub(crate) document: Result<ExecutableDocument, GraphqlError>,
    pub(crate) operation_name: Option<String>,
    pub(crate) variables: Variables,
    pub(crate) data: Data,
    pub(crate) root_value: FieldValue,
}

impl Request {
    /// A query that fails to parse is reported in the response, without any data.
    pub fn new(query: impl AsRef<str>) -> Self {
        let document = async_graphql_parser::parse_query(query).map_err(|err| {
            GraphqlError::new(err.to_string(), ErrorCode::OperationParsingError)
                .with_locations(err.positions().map(Location::from))
        });
        Self::with_document(document)
    }

    pub fn from_document(document: ExecutableDocument) -> Self {
        Self::with_document(Ok(document))
    }

    fn with_document(document: Result<ExecutableDocument, GraphqlError>) -> Self {
        Self {
            document,
            operation_name: None,
            variables: Variables::default(),
            data: Data::default(),
            root_value: FieldValue::Null,
        }
    }

    #[must_use]
    pub fn operation_name(mut self, name: impl Into<String>) -> Self {
        self.operation_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn variables(mut self, variables: Variables) -> Self {
        self.variables = variables;
        self
    }

    /// Makes `value` available to resolvers through [`crate::Context::data`].
    #[must_use]
    pub fn data<T: 'static>(mut self, value: T) -> Self {
        self.data.insert(value);
        self
    }

    /// Object the root fields are resolved against.
    #[must_use]
    pub fn root_value(mut self, value: impl Into<FieldValue>) -> Self {
        self.root_value = value.into();
        self
    }
}

impl std::fmt::Debug for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Request")
            .field("operation_name", &self.operation_name)
            .field("variables", &self.variables)
            .field("data", &self.data)
            .finish_non_exhaustive()
    }
}
