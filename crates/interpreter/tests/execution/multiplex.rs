use graphql_interpreter::{FieldDefinition, InputValueDefinition, ObjectType, Request, Response, Schema};
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::{finish, multiply, FetchLog};

fn schema() -> Schema {
    finish(
        Schema::build("Query", None, None).register(
            ObjectType::new("Query")
                .field(
                    FieldDefinition::new("int", "Int")
                        .argument(InputValueDefinition::new("value", "Int!"))
                        .resolve(|_, args, ctx| Ok(multiply(ctx, 10, args.get_i64("value").unwrap_or_default()))),
                )
                .field(FieldDefinition::new("whoami", "String").resolve(|_, _, ctx| {
                    let name = ctx.operation_name().unwrap_or("anonymous");
                    Ok(format!("{name} #{}", ctx.query_index()).into())
                })),
        ),
    )
}

fn run(requests: Vec<Request>) -> Vec<serde_json::Value> {
    match schema().multiplex(requests) {
        Ok(responses) => responses.iter().map(Response::to_json).collect(),
        Err(err) => unreachable!("execution aborted: {err}"),
    }
}

#[test]
fn queries_share_batches() {
    let log = FetchLog::default();
    let responses = run(vec![
        Request::new("{ a: int(value: 1) b: int(value: 2) }").data(log.clone()),
        Request::new("{ c: int(value: 2) d: int(value: 3) }").data(log.clone()),
    ]);
    assert_eq!(
        responses,
        vec![
            json!({ "data": { "a": 10, "b": 20 } }),
            json!({ "data": { "c": 20, "d": 30 } }),
        ]
    );
    assert_eq!(log.calls(), vec![vec![1, 2, 3]]);
}

#[test]
fn responses_follow_request_order() {
    let responses = run(vec![
        Request::new("query A { whoami } query B { whoami }").operation_name("B"),
        Request::new("{ whoami"),
        Request::new("query C { whoami }"),
        Request::new("query A { whoami }").operation_name("Z"),
    ]);
    assert_eq!(responses[0], json!({ "data": { "whoami": "B #0" } }));
    assert_eq!(responses[1]["errors"][0]["extensions"]["code"], "OPERATION_PARSING_ERROR");
    assert_eq!(responses[2], json!({ "data": { "whoami": "C #2" } }));
    assert_eq!(responses[3]["errors"][0]["message"], r#"Unknown operation named "Z""#);
}

#[test]
fn empty_multiplex() {
    assert_eq!(run(Vec::new()), Vec::<serde_json::Value>::new());
}
