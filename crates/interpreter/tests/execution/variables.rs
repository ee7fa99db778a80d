use graphql_interpreter::{
    EnumType, FieldDefinition, InputObjectType, InputValueDefinition, ObjectType, Request, ScalarType, Schema,
    Variables,
};
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::{execute, execute_request, finish};

fn schema() -> Schema {
    finish(
        Schema::build("Query", None, None)
            .register(
                ObjectType::new("Query")
                    .field(
                        FieldDefinition::new("search", "JSON")
                            .argument(InputValueDefinition::new("filter", "Filter!"))
                            .resolve(|_, args, _| Ok(args.get("filter").cloned().into())),
                    )
                    .field(
                        FieldDefinition::new("echo", "[Int]")
                            .argument(InputValueDefinition::new("values", "[Int]"))
                            .resolve(|_, args, _| Ok(args.get("values").cloned().into())),
                    ),
            )
            .register(
                InputObjectType::new("Filter")
                    .field(InputValueDefinition::new("term", "String!"))
                    .field(InputValueDefinition::new("limit", "Int").default_value(10))
                    .field(InputValueDefinition::new("color", "Color")),
            )
            .register(EnumType::new("Color").value_with("RED", 1).value_with("GREEN", 2))
            .register(ScalarType::new("JSON")),
    )
}

fn with_variables(query: &str, variables: serde_json::Value) -> serde_json::Value {
    execute_request(&schema(), Request::new(query).variables(Variables::from_json(variables)))
}

#[test]
fn input_objects_get_defaults_and_internal_values() {
    let response = with_variables(
        "query($f: Filter!) { search(filter: $f) }",
        json!({ "f": { "term": "shoes", "color": "GREEN" } }),
    );
    assert_eq!(
        response,
        json!({ "data": { "search": { "term": "shoes", "limit": 10, "color": 2 } } })
    );

    let response = execute(&schema(), r#"{ search(filter: { term: "hats", limit: 2, color: RED }) }"#);
    assert_eq!(
        response,
        json!({ "data": { "search": { "term": "hats", "limit": 2, "color": 1 } } })
    );
}

#[test]
fn variables_inside_literals() {
    let response = with_variables(
        "query($n: Int = 4, $m: Int) { echo(values: [$n, $m, 6]) single: echo(values: 3) }",
        json!({ "m": 5 }),
    );
    assert_eq!(response, json!({ "data": { "echo": [4, 5, 6], "single": [3] } }));

    let response = with_variables("query($t: String) { search(filter: { term: $t }) }", json!({}));
    assert_eq!(response["data"], json!({ "search": null }));
    assert_eq!(response["errors"][0]["extensions"]["code"], "ARGUMENT_ERROR");
    assert_eq!(
        response["errors"][0]["extensions"]["problems"],
        json!([{ "path": ["term"], "explanation": "Expected value of type String! to not be null" }])
    );
}

#[test]
fn invalid_variables_are_request_errors() {
    let response = with_variables(
        "query($f: Filter!) { search(filter: $f) }",
        json!({ "f": { "term": 1, "size": 3 } }),
    );
    assert!(response.get("data").is_none());

    let error = &response["errors"][0];
    assert_eq!(error["message"], "Variable $f of type Filter! was provided invalid value");
    assert_eq!(error["locations"], json!([{ "line": 1, "column": 7 }]));
    assert_eq!(error["extensions"]["code"], "VARIABLE_ERROR");
    assert_eq!(error["extensions"]["value"], json!({ "term": 1, "size": 3 }));
    assert_eq!(
        error["extensions"]["problems"],
        json!([{ "path": ["term"], "explanation": "Could not coerce value 1 to String" }])
    );

    let response = with_variables("query($n: Int!) { echo(values: [$n]) }", json!({}));
    assert!(response.get("data").is_none());
    assert_eq!(
        response["errors"][0]["message"],
        "Variable $n of type Int! was provided invalid value"
    );
}
