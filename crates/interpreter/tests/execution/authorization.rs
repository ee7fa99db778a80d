use graphql_interpreter::{
    ConstValue, FieldDefinition, FieldValue, InputValueDefinition, ObjectType, Request, ResolverError, Schema,
    SchemaBuilder,
};
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::{execute, execute_request, finish, mapping};

fn is_private(value: &FieldValue) -> bool {
    match value.as_const() {
        Some(ConstValue::Object(map)) => map.get("private") == Some(&ConstValue::Boolean(true)),
        _ => false,
    }
}

fn builder() -> SchemaBuilder {
    Schema::build("Query", None, None)
        .register(
            ObjectType::new("Query")
                .field(
                    FieldDefinition::new("secret", "String")
                        .authorize(|_, _, _| Ok(false))
                        .resolve(|_, _, _| unreachable!("denied fields are never resolved")),
                )
                .field(
                    FieldDefinition::new("audited", "String")
                        .authorize(|_, _, _| Err(ResolverError::message("audit log unavailable")))
                        .resolve(|_, _, _| unreachable!("failed authorizations are never resolved")),
                )
                .field(
                    FieldDefinition::new("account", "String")
                        .argument(
                            InputValueDefinition::new("id", "Int!")
                                .authorize(|value, _| value != &ConstValue::from(0)),
                        )
                        .resolve(|_, args, _| Ok(format!("account {}", args.get_i64("id").unwrap_or_default()).into())),
                )
                .field(FieldDefinition::new("documents", "[Document]").resolve(|_, _, _| {
                    Ok(mapping(json!([
                        { "title": "Minutes", "private": false },
                        { "title": "Payroll", "private": true }
                    ])))
                })),
        )
        .register(
            ObjectType::new("Document")
                .field(FieldDefinition::new("title", "String!"))
                .authorize(|value, _| Ok(!is_private(value))),
        )
}

#[test]
fn denied_fields_are_errors_by_default() {
    let response = execute(&finish(builder()), "{ secret account(id: 0) other: account(id: 1) }");
    assert_eq!(
        response["data"],
        json!({ "secret": null, "account": null, "other": "account 1" })
    );
    assert_eq!(
        response["errors"],
        json!([
            {
                "message": "Not authorized to access Query.secret",
                "locations": [{ "line": 1, "column": 3 }],
                "path": ["secret"],
                "extensions": { "code": "UNAUTHORIZED" }
            },
            {
                "message": "Not authorized to access Query.account",
                "locations": [{ "line": 1, "column": 10 }],
                "path": ["account"],
                "extensions": { "code": "UNAUTHORIZED" }
            }
        ])
    );
}

#[test]
fn authorization_failures_are_field_errors() {
    let response = execute(&finish(builder()), "{ audited }");
    assert_eq!(response["data"], json!({ "audited": null }));
    assert_eq!(response["errors"][0]["message"], "audit log unavailable");
    assert_eq!(response["errors"][0]["extensions"]["code"], "FIELD_ERROR");
}

#[test]
fn unauthorized_field_hook_provides_the_value() {
    let schema = finish(builder().unauthorized_field(|error, _| match error.field_name.as_deref() {
        Some("secret") => Ok("redacted".into()),
        _ => Err(error.into()),
    }));
    let response = execute(&schema, "{ secret account(id: 0) }");
    assert_eq!(response["data"], json!({ "secret": "redacted", "account": null }));
    assert_eq!(response["errors"][0]["message"], "Not authorized to access Query.account");
}

#[test]
fn denied_objects_are_errors_by_default() {
    let response = execute(&finish(builder()), "{ documents { title } }");
    assert_eq!(response["data"], json!({ "documents": [{ "title": "Minutes" }, null] }));
    assert_eq!(response["errors"][0]["message"], "Not authorized to access Document");
    assert_eq!(response["errors"][0]["path"], json!(["documents", 1]));
}

#[test]
fn unauthorized_object_replacement_is_not_authorized_again() {
    let schema = finish(builder().unauthorized_object(|error, _, _| {
        let title = format!("[hidden {}]", error.type_name);
        Ok(FieldValue::lazy(move || {
            Ok(mapping(json!({ "title": title, "private": true })))
        }))
    }));
    let response = execute(&schema, "{ documents { title } }");
    assert_eq!(
        response,
        json!({ "data": { "documents": [{ "title": "Minutes" }, { "title": "[hidden Document]" }] } })
    );
}

fn is_admin(value: &FieldValue) -> bool {
    match value.as_const() {
        Some(ConstValue::Object(map)) => map.get("admin") == Some(&ConstValue::Boolean(true)),
        _ => false,
    }
}

fn guarded_root() -> SchemaBuilder {
    Schema::build("Query", None, None).register(
        ObjectType::new("Query")
            .authorize(|root, _| Ok(is_admin(root)))
            .field(FieldDefinition::new("greeting", "String"))
            .field(
                FieldDefinition::new("secret", "String")
                    .resolve(|_, _, _| unreachable!("fields of a denied root are never resolved")),
            ),
    )
}

#[test]
fn denied_root_leaves_no_data() {
    let response = execute(&finish(guarded_root()), "{ greeting secret }");
    assert_eq!(
        response,
        json!({
            "data": null,
            "errors": [{
                "message": "Not authorized to access Query",
                "locations": [],
                "extensions": { "code": "UNAUTHORIZED" }
            }]
        })
    );

    let request = Request::new("{ greeting }").root_value(mapping(json!({ "admin": true, "greeting": "hello" })));
    let response = execute_request(&finish(guarded_root()), request);
    assert_eq!(response, json!({ "data": { "greeting": "hello" } }));
}

#[test]
fn unauthorized_object_hook_may_replace_the_root() {
    let schema = finish(
        guarded_root().unauthorized_object(|_, _, _| Ok(mapping(json!({ "greeting": "hello guest" })))),
    );
    let response = execute(&schema, "{ greeting }");
    assert_eq!(response, json!({ "data": { "greeting": "hello guest" } }));
}
