use graphql_dataloader::Dataloader;
use graphql_interpreter_error::GraphqlError;

use crate::{
    analysis,
    operation::{self, Operation},
    runtime::{self, QueryRun},
    Context, Data, ExecutionError, FieldValue, Request, Response, Schema,
};

/// Hooks around a multiplex and around each of its queries.
///
/// Before hooks run in registration order, after hooks in reverse order. An instrumenter whose
/// before hook failed doesn't get its after hook called.
pub trait Instrumentation: Send + Sync + 'static {
    /// An error aborts the whole multiplex, no query is executed.
    fn before_multiplex(&self, info: &MultiplexInfo) -> Result<(), GraphqlError> {
        let _ = info;
        Ok(())
    }

    /// Called once every query is done, or the execution aborted.
    fn after_multiplex(&self, info: &MultiplexInfo) {
        let _ = info;
    }

    /// An error skips this query only, its response is a request error.
    fn before_query(&self, info: &QueryInfo<'_>) -> Result<(), GraphqlError> {
        let _ = info;
        Ok(())
    }

    /// Called as soon as the query is done, without waiting for the rest of the multiplex.
    fn after_query(&self, info: &QueryInfo<'_>, response: &Response) {
        let _ = (info, response);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MultiplexInfo {
    pub query_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryInfo<'a> {
    /// Position of the query within the multiplex.
    pub index: usize,
    pub operation_name: Option<&'a str>,
}

impl Schema {
    /// Executes a single request, a multiplex of one.
    pub fn execute(&self, request: Request) -> Result<Response, ExecutionError> {
        let responses = self.multiplex(vec![request])?;
        Ok(responses.into_iter().next().unwrap_or_else(missing_response))
    }

    /// Executes several requests together. They share one dataloader and their lazy values are
    /// synced in the same waves, so loads of different queries end up in the same batches.
    ///
    /// Responses are in the order of the requests. An `Err` means the execution aborted and no
    /// response is available.
    pub fn multiplex(&self, requests: Vec<Request>) -> Result<Vec<Response>, ExecutionError> {
        let info = MultiplexInfo {
            query_count: requests.len(),
        };
        let span = tracing::info_span!("multiplex", queries = info.query_count);
        let _guard = span.enter();

        let instrumentations = self.instrumentations();
        for (position, instrumentation) in instrumentations.iter().enumerate() {
            if let Err(error) = instrumentation.before_multiplex(&info) {
                tracing::warn!(%error, "Multiplex instrumentation failed");
                for instrumentation in instrumentations[..position].iter().rev() {
                    instrumentation.after_multiplex(&info);
                }
                return Err(ExecutionError::Instrumentation(error));
            }
        }

        let result = self.execute_requests(requests);
        if let Err(error) = &result {
            tracing::error!(%error, "Execution aborted");
        }
        for instrumentation in instrumentations.iter().rev() {
            instrumentation.after_multiplex(&info);
        }
        result
    }

    fn execute_requests(&self, requests: Vec<Request>) -> Result<Vec<Response>, ExecutionError> {
        let dataloader = Dataloader::new(self.config().batching.max_batch_size);
        let mut responses: Vec<Option<Response>> = requests.iter().map(|_| None).collect();
        let mut hooks = Vec::with_capacity(requests.len());
        let mut operations = Vec::new();
        let mut seeds = Vec::new();

        for (index, request) in requests.into_iter().enumerate() {
            let span = tracing::debug_span!("query", index, operation_name = request.operation_name.as_deref());
            let _guard = span.enter();

            let mut query_hooks = QueryHooks::new(self, index, request.operation_name.clone());
            match query_hooks.before().and_then(|()| self.prepare(request)) {
                Ok(prepared) => {
                    operations.push(prepared.operation);
                    seeds.push((index, prepared.data, prepared.root_value));
                }
                Err(errors) => {
                    tracing::debug!(errors = errors.len(), "Request rejected");
                    let response = Response::request_error(errors);
                    query_hooks.after(&response);
                    responses[index] = Some(response);
                }
            }
            hooks.push(query_hooks);
        }

        let mut runs = Vec::with_capacity(operations.len());
        for (operation, (index, data, root_value)) in operations.iter().zip(seeds) {
            let ctx = Context::new(self.clone(), data, dataloader.clone(), operation.name.clone(), index);
            match QueryRun::new(index, self, operation, ctx, root_value) {
                Ok(run) => runs.push(run),
                Err(error) => {
                    let response = Response::request_error([error]);
                    hooks[index].after(&response);
                    responses[index] = Some(response);
                }
            }
        }

        runtime::run(runs, &dataloader, |index, response| {
            hooks[index].after(&response);
            responses[index] = Some(response);
        })?;

        Ok(responses
            .into_iter()
            .map(|response| response.unwrap_or_else(missing_response))
            .collect())
    }

    fn prepare(&self, request: Request) -> Result<Prepared, Vec<GraphqlError>> {
        let Request {
            document,
            operation_name,
            variables,
            data,
            root_value,
        } = request;

        let document = document.map_err(|error| vec![error])?;
        let operation = operation::prepare(self, document, operation_name.as_deref(), &variables)?;
        analysis::analyze(&operation, self.config().max_depth, self.analyzers()).map_err(|error| vec![error])?;

        Ok(Prepared {
            operation,
            data,
            root_value,
        })
    }
}

struct Prepared {
    operation: Operation,
    data: Data,
    root_value: FieldValue,
}

/// Per query instrumentation, remembering which before hooks succeeded.
struct QueryHooks<'s> {
    schema: &'s Schema,
    index: usize,
    operation_name: Option<String>,
    entered: usize,
}

impl<'s> QueryHooks<'s> {
    fn new(schema: &'s Schema, index: usize, operation_name: Option<String>) -> Self {
        Self {
            schema,
            index,
            operation_name,
            entered: 0,
        }
    }

    fn info(&self) -> QueryInfo<'_> {
        QueryInfo {
            index: self.index,
            operation_name: self.operation_name.as_deref(),
        }
    }

    fn before(&mut self) -> Result<(), Vec<GraphqlError>> {
        let schema = self.schema;
        for instrumentation in schema.instrumentations() {
            if let Err(error) = instrumentation.before_query(&self.info()) {
                tracing::warn!(%error, "Query instrumentation failed");
                return Err(vec![error]);
            }
            self.entered += 1;
        }
        Ok(())
    }

    fn after(&self, response: &Response) {
        let info = self.info();
        for instrumentation in self.schema.instrumentations()[..self.entered].iter().rev() {
            instrumentation.after_query(&info, response);
        }
    }
}

fn missing_response() -> Response {
    Response::request_error([GraphqlError::internal_server_error()])
}
