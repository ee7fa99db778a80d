use graphql_interpreter::{
    BatchingConfig, ConstValue, Context, ExecutionConfig, FieldDefinition, FieldValue, InputValueDefinition, ObjectType,
    Request, Schema, Source,
};
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::{execute_request, finish, mapping, multiply, FetchLog, Multiply, Unavailable};

fn item(value: i64) -> FieldValue {
    mapping(json!({ "value": value }))
}

fn value_of(item: &FieldValue) -> i64 {
    match item.as_const() {
        Some(ConstValue::Object(map)) => match map.get("value") {
            Some(ConstValue::Number(number)) => number.as_i64().unwrap_or_default(),
            _ => 0,
        },
        _ => 0,
    }
}

/// Item of the value `key` once loaded from the identity source.
fn load_item(ctx: &Context, key: i64) -> FieldValue {
    let log = ctx.data::<FetchLog>().cloned().unwrap_or_default();
    let source = ctx.dataloader().with(1i64, |factor| Multiply { factor: *factor, log });
    FieldValue::load(source.request(key).map(|result| result.map(item)))
}

struct Flaky;

impl Source for Flaky {
    type Key = i64;
    type Value = i64;
    type Error = Unavailable;

    fn fetch(&self, _keys: &[i64]) -> Result<Vec<i64>, Unavailable> {
        Err(Unavailable)
    }
}

fn schema(config: ExecutionConfig) -> Schema {
    let value = || InputValueDefinition::new("value", "Int!");
    finish(
        Schema::build("Query", None, None)
            .register(
                ObjectType::new("Query")
                    .field(
                        FieldDefinition::new("int", "Int")
                            .argument(value())
                            .resolve(|_, args, ctx| Ok(multiply(ctx, 10, args.get_i64("value").unwrap_or_default()))),
                    )
                    .field(
                        FieldDefinition::new("flaky", "Int")
                            .argument(value())
                            .resolve(|_, args, ctx| {
                                let source = ctx.dataloader().with((), |_| Flaky);
                                Ok(FieldValue::load(source.request(args.get_i64("value").unwrap_or_default())))
                            }),
                    )
                    .field(
                        FieldDefinition::new("items", "[Item!]!")
                            .argument(InputValueDefinition::new("values", "[Int!]!"))
                            .resolve(|_, args, _| {
                                let values = args.get_as::<Vec<i64>>("values")?.unwrap_or_default();
                                Ok(FieldValue::list(values.into_iter().map(item)))
                            }),
                    ),
            )
            .register(
                ObjectType::new("Item")
                    .field(FieldDefinition::new("value", "Int!"))
                    .field(
                        FieldDefinition::new("next", "Item")
                            .resolve(|object, _, ctx| Ok(load_item(ctx, value_of(object) + 5))),
                    ),
            )
            .config(config),
    )
}

fn run(schema: &Schema, query: &str) -> (serde_json::Value, Vec<Vec<i64>>) {
    let log = FetchLog::default();
    let response = execute_request(schema, Request::new(query).data(log.clone()));
    (response, log.calls())
}

#[test]
fn sibling_fields_share_one_fetch() {
    let (response, calls) = run(
        &schema(ExecutionConfig::default()),
        "{ a: int(value: 1) b: int(value: 2) c: int(value: 3) }",
    );
    assert_eq!(response, json!({ "data": { "a": 10, "b": 20, "c": 30 } }));
    assert_eq!(calls, vec![vec![1, 2, 3]]);
}

#[test]
fn batches_are_split_by_max_size() {
    let config = ExecutionConfig {
        batching: BatchingConfig {
            max_batch_size: Some(2),
        },
        ..Default::default()
    };
    let (response, calls) = run(&schema(config), "{ a: int(value: 1) b: int(value: 2) c: int(value: 3) }");
    assert_eq!(response, json!({ "data": { "a": 10, "b": 20, "c": 30 } }));
    assert_eq!(calls, vec![vec![1, 2], vec![3]]);
}

#[test]
fn duplicate_keys_are_fetched_once() {
    let (response, calls) = run(
        &schema(ExecutionConfig::default()),
        "{ a: int(value: 4) b: int(value: 4) c: int(value: 5) }",
    );
    assert_eq!(response, json!({ "data": { "a": 40, "b": 40, "c": 50 } }));
    assert_eq!(calls, vec![vec![4, 5]]);
}

#[test]
fn each_depth_is_one_wave() {
    let (response, calls) = run(
        &schema(ExecutionConfig::default()),
        "{ items(values: [1, 2]) { value next { value next { value } } } }",
    );
    assert_eq!(
        response,
        json!({
            "data": {
                "items": [
                    { "value": 1, "next": { "value": 6, "next": { "value": 11 } } },
                    { "value": 2, "next": { "value": 7, "next": { "value": 12 } } }
                ]
            }
        })
    );
    assert_eq!(calls, vec![vec![6, 7], vec![11, 12]]);
}

#[test]
fn failed_batch_errors_every_key() {
    let (response, _) = run(
        &schema(ExecutionConfig::default()),
        "{ a: flaky(value: 1) b: flaky(value: 2) c: int(value: 3) }",
    );
    insta::assert_json_snapshot!(response, @r#"
    {
      "data": {
        "a": null,
        "b": null,
        "c": 30
      },
      "errors": [
        {
          "message": "backend unavailable",
          "locations": [
            {
              "line": 1,
              "column": 3
            }
          ],
          "path": [
            "a"
          ],
          "extensions": {
            "code": "BATCH_LOAD_ERROR"
          }
        },
        {
          "message": "backend unavailable",
          "locations": [
            {
              "line": 1,
              "column": 22
            }
          ],
          "path": [
            "b"
          ],
          "extensions": {
            "code": "BATCH_LOAD_ERROR"
          }
        }
      ]
    }
    "#);
}
