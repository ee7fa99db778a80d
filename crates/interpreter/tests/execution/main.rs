//! End to end execution of operations against small schemas built for each test.

mod abstract_types;
mod authorization;
mod batching;
mod extensions;
mod multiplex;
mod scalars;
mod selections;
mod variables;

use std::{cell::RefCell, convert::Infallible, rc::Rc};

use graphql_interpreter::{ConstValue, Context, FieldValue, Request, Schema, SchemaBuilder, Source};

fn execute(schema: &Schema, query: &str) -> serde_json::Value {
    execute_request(schema, Request::new(query))
}

fn execute_request(schema: &Schema, request: Request) -> serde_json::Value {
    match schema.execute(request) {
        Ok(response) => response.to_json(),
        Err(err) => unreachable!("execution aborted: {err}"),
    }
}

fn finish(builder: SchemaBuilder) -> Schema {
    // RUST_LOG=graphql_interpreter=trace shows the waves of a failing test.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    match builder.finish() {
        Ok(schema) => schema,
        Err(err) => unreachable!("invalid schema: {err}"),
    }
}

fn mapping(value: serde_json::Value) -> FieldValue {
    FieldValue::Value(ConstValue::from_json(value).unwrap())
}

/// Keys given to every batch fetch, in order.
#[derive(Clone, Default)]
struct FetchLog(Rc<RefCell<Vec<Vec<i64>>>>);

impl FetchLog {
    fn calls(&self) -> Vec<Vec<i64>> {
        self.0.borrow().clone()
    }
}

/// Multiplies every key by its factor, one source per factor.
struct Multiply {
    factor: i64,
    log: FetchLog,
}

impl Source for Multiply {
    type Key = i64;
    type Value = i64;
    type Error = Infallible;

    fn fetch(&self, keys: &[i64]) -> Result<Vec<i64>, Infallible> {
        self.log.0.borrow_mut().push(keys.to_vec());
        Ok(keys.iter().map(|key| key * self.factor).collect())
    }
}

/// Requests `key` from the multiplying source of `factor`, the fetch happens on the next wave.
fn multiply(ctx: &Context, factor: i64, key: i64) -> FieldValue {
    let log = ctx.data::<FetchLog>().cloned().unwrap_or_default();
    let source = ctx.dataloader().with(factor, |factor| Multiply { factor: *factor, log });
    FieldValue::load(source.request(key))
}

#[derive(thiserror::Error, Debug)]
#[error("backend unavailable")]
struct Unavailable;
