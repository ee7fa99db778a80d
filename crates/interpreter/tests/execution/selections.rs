use std::{cell::Cell, rc::Rc};

use graphql_interpreter::{FieldDefinition, ObjectType, Request, Schema, Variables};
use indoc::indoc;
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::json;

use crate::{execute, execute_request, finish, mapping};

#[derive(Clone, Default)]
struct Calls(Rc<Cell<usize>>);

fn schema() -> Schema {
    finish(
        Schema::build("Query", None, None)
            .register(
                ObjectType::new("Query").field(FieldDefinition::new("user", "User").resolve(|_, _, ctx| {
                    if let Some(calls) = ctx.data::<Calls>() {
                        calls.0.set(calls.0.get() + 1);
                    }
                    Ok(mapping(json!({
                        "id": "1",
                        "name": "Ada",
                        "address": { "city": "London" }
                    })))
                })),
            )
            .register(
                ObjectType::new("User")
                    .field(FieldDefinition::new("id", "ID!"))
                    .field(FieldDefinition::new("name", "String"))
                    .field(FieldDefinition::new("city", "String").dig(["address", "city"])),
            ),
    )
}

#[test]
fn merged_fields_resolve_once() {
    let calls = Calls::default();
    let response = execute_request(
        &schema(),
        Request::new(indoc! {"
            {
                user { name }
                user { id }
                ... on Query { user { city } }
                ...More
            }

            fragment More on Query { user { id } }
        "})
        .data(calls.clone()),
    );
    assert_eq!(
        response,
        json!({ "data": { "user": { "name": "Ada", "id": "1", "city": "London" } } })
    );
    assert_eq!(calls.0.get(), 1);
}

#[test]
fn aliases_resolve_separately() {
    let calls = Calls::default();
    let response = execute_request(
        &schema(),
        Request::new("{ first: user { name } second: user { name: id } }").data(calls.clone()),
    );
    assert_eq!(
        response,
        json!({ "data": { "first": { "name": "Ada" }, "second": { "name": "1" } } })
    );
    assert_eq!(calls.0.get(), 2);
}

#[rstest]
#[case::skipped("{ user { id name @skip(if: true) } }", json!({ "id": "1" }))]
#[case::not_skipped("{ user { id name @skip(if: false) } }", json!({ "id": "1", "name": "Ada" }))]
#[case::not_included("{ user { id name @include(if: false) } }", json!({ "id": "1" }))]
#[case::both("{ user { id name @include(if: true) @skip(if: true) } }", json!({ "id": "1" }))]
#[case::fragment("{ user { id ... @skip(if: true) { name } } }", json!({ "id": "1" }))]
#[case::variable("query($on: Boolean!) { user { id name @include(if: $on) } }", json!({ "id": "1", "name": "Ada" }))]
fn conditional_selections(#[case] query: &str, #[case] user: serde_json::Value) {
    let request = Request::new(query).variables(Variables::default().with("on", true));
    let response = execute_request(&schema(), request);
    assert_eq!(response, json!({ "data": { "user": user } }));
}

#[test]
fn typename_is_answered_by_the_runtime() {
    let response = execute(&schema(), "{ __typename user { kind: __typename id } }");
    assert_eq!(
        response,
        json!({ "data": { "__typename": "Query", "user": { "kind": "User", "id": "1" } } })
    );
}
