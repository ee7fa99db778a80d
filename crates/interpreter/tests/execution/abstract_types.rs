use graphql_interpreter::{
    Arguments, ConstValue, Context, FieldDefinition, FieldValue, InterfaceType, Object, ObjectType, ResolverResult,
    Schema, SchemaBuilder, UnionType,
};
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::{execute, finish, mapping};

struct Cat;

impl Object for Cat {
    fn type_name(&self) -> Option<&str> {
        Some("Cat")
    }

    fn call(&self, method: &str, _arguments: &Arguments, _ctx: &Context) -> Option<ResolverResult> {
        match method {
            "name" => Some(Ok("Tom".into())),
            "meows" => Some(Ok(true.into())),
            _ => None,
        }
    }
}

fn builder() -> SchemaBuilder {
    let pet = |ty: ObjectType| ty.implements("Pet").field(FieldDefinition::new("name", "String!"));
    Schema::build("Query", None, None)
        .register(
            ObjectType::new("Query")
                .field(FieldDefinition::new("pets", "[Pet]").resolve(|_, _, _| {
                    Ok(FieldValue::list([
                        mapping(json!({ "name": "Rex", "barks": true })).with_type("Dog"),
                        FieldValue::object(Cat),
                        mapping(json!({ "__typename": "Dog", "name": "Fido", "barks": false })),
                        FieldValue::lazy(|| Ok(mapping(json!({ "name": "Lazy", "barks": true })))).with_type("Dog"),
                    ]))
                }))
                .field(FieldDefinition::new("stray", "[Pet]").resolve(|_, _, _| {
                    Ok(FieldValue::list([
                        mapping(json!({ "name": "Rex" })),
                        mapping(json!({ "name": "Jim" })).with_type("Human"),
                    ]))
                }))
                .field(FieldDefinition::new("search", "[SearchResult!]!").resolve(|_, _, _| {
                    Ok(mapping(json!([
                        { "kind": "human", "name": "Ada" },
                        { "kind": "dog", "name": "Rex", "barks": true }
                    ])))
                })),
        )
        .register(InterfaceType::new("Pet").field(FieldDefinition::new("name", "String!")))
        .register(pet(ObjectType::new("Dog")).field(FieldDefinition::new("barks", "Boolean")))
        .register(pet(ObjectType::new("Cat")).field(FieldDefinition::new("meows", "Boolean")))
        .register(ObjectType::new("Human").field(FieldDefinition::new("name", "String!")))
        .register(UnionType::new("SearchResult").member("Human").member("Dog"))
}

#[test]
fn concrete_type_comes_from_the_value() {
    let response = execute(
        &finish(builder()),
        "{ pets { __typename name ... on Dog { barks } ... on Cat { meows } } }",
    );
    assert_eq!(
        response,
        json!({
            "data": {
                "pets": [
                    { "__typename": "Dog", "name": "Rex", "barks": true },
                    { "__typename": "Cat", "name": "Tom", "meows": true },
                    { "__typename": "Dog", "name": "Fido", "barks": false },
                    { "__typename": "Dog", "name": "Lazy", "barks": true }
                ]
            }
        })
    );
}

#[test]
fn unresolved_types_are_field_errors() {
    let response = execute(&finish(builder()), "{ stray { name } }");
    assert_eq!(response["data"], json!({ "stray": [null, null] }));

    let errors = response["errors"].as_array().cloned().unwrap_or_default();
    assert_eq!(errors.len(), 2);
    assert_eq!(
        errors[0]["message"],
        r#"The value from "stray" on "Query" could not be resolved to "Pet". (Received: nothing, Expected: [Dog, Cat])"#
    );
    assert_eq!(errors[0]["path"], json!(["stray", 0]));
    assert_eq!(errors[0]["extensions"]["code"], "TYPE_RESOLUTION_ERROR");
    assert_eq!(errors[1]["path"], json!(["stray", 1]));
    assert!(errors[1]["message"].as_str().is_some_and(|message| message.contains("(Received: Human,")));
}

#[test]
fn schema_hook_resolves_union_members() {
    let schema = finish(builder().resolve_type(|_, value, _| {
        let Some(ConstValue::Object(map)) = value.as_const() else {
            return value.type_name().map(str::to_string);
        };
        match map.get("kind") {
            Some(ConstValue::String(kind)) if kind == "human" => Some("Human".into()),
            Some(ConstValue::String(kind)) if kind == "dog" => Some("Dog".into()),
            _ => value.type_name().map(str::to_string),
        }
    }));
    let response = execute(
        &schema,
        "{ search { ... on Human { name } ... on Dog { name barks } } pets { name } }",
    );
    assert_eq!(
        response["data"]["search"],
        json!([{ "name": "Ada" }, { "name": "Rex", "barks": true }])
    );
    assert_eq!(
        response["data"]["pets"],
        json!([{ "name": "Rex" }, { "name": "Tom" }, { "name": "Fido" }, { "name": "Lazy" }])
    );
}
