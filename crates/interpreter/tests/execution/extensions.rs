use std::sync::{Arc, Mutex};

use graphql_interpreter::{
    Arguments, ConstValue, Context, ExtensionFlow, FieldDefinition, FieldExtension, FieldValue, InputValueDefinition,
    ObjectType, ResolverError, ResolverResult, Schema,
};
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::{execute, finish, mapping};

#[derive(Clone, Default)]
struct Log(Arc<Mutex<Vec<String>>>);

impl Log {
    fn push(&self, entry: String) {
        if let Ok(mut entries) = self.0.lock() {
            entries.push(entry);
        }
    }

    fn entries(&self) -> Vec<String> {
        self.0.lock().map(|entries| entries.clone()).unwrap_or_default()
    }
}

/// Records its calls and appends its name to string results.
struct Suffix {
    name: &'static str,
    log: Log,
}

impl FieldExtension for Suffix {
    fn before(
        &self,
        _object: &FieldValue,
        _arguments: &mut Arguments,
        _ctx: &Context,
    ) -> Result<ExtensionFlow, ResolverError> {
        self.log.push(format!("before {}", self.name));
        Ok(ExtensionFlow::Continue)
    }

    fn after(&self, value: FieldValue, _arguments: &Arguments, _ctx: &Context) -> ResolverResult {
        self.log.push(format!("after {}", self.name));
        match value.as_const() {
            Some(ConstValue::String(text)) => Ok(format!("{text} {}", self.name).into()),
            _ => Ok(value),
        }
    }
}

/// Answers without calling the resolver.
struct Cached;

impl FieldExtension for Cached {
    fn before(&self, _: &FieldValue, _: &mut Arguments, _: &Context) -> Result<ExtensionFlow, ResolverError> {
        Ok(ExtensionFlow::Return("cached".into()))
    }
}

struct Shout;

impl FieldExtension for Shout {
    fn before(
        &self,
        _object: &FieldValue,
        arguments: &mut Arguments,
        _ctx: &Context,
    ) -> Result<ExtensionFlow, ResolverError> {
        if let Some(name) = arguments.get_str("name").map(str::to_uppercase) {
            arguments.insert("name", ConstValue::String(name));
        }
        Ok(ExtensionFlow::Continue)
    }
}

/// Hands the resolver a different parent object.
struct Impersonate;

impl FieldExtension for Impersonate {
    fn before(&self, _: &FieldValue, _: &mut Arguments, _: &Context) -> Result<ExtensionFlow, ResolverError> {
        Ok(ExtensionFlow::ContinueWith(mapping(json!({ "name": "root" }))))
    }
}

fn greet(_: &FieldValue, arguments: &Arguments, _: &Context) -> ResolverResult {
    Ok(format!("hello {}", arguments.get_str("name").unwrap_or("world")).into())
}

fn schema(log: &Log) -> Schema {
    let suffix = |name| Suffix { name, log: log.clone() };
    let name = || InputValueDefinition::new("name", "String");
    finish(
        Schema::build("Query", None, None).register(
            ObjectType::new("Query")
                .field(
                    FieldDefinition::new("greet", "String")
                        .argument(name())
                        .extension(suffix("a"))
                        .extension(Shout)
                        .extension(suffix("b"))
                        .resolve(greet),
                )
                .field(
                    FieldDefinition::new("cached", "String")
                        .extension(suffix("a"))
                        .extension(Cached)
                        .extension(suffix("b"))
                        .resolve(|_, _, _| unreachable!("answered by an extension")),
                )
                .field(
                    FieldDefinition::new("later", "String")
                        .extension(suffix("a"))
                        .resolve(|_, _, _| Ok(FieldValue::lazy(|| Ok("synced".into())))),
                )
                .field(
                    FieldDefinition::new("whoami", "String")
                        .extension(Impersonate)
                        .resolve(|object, _, _| match object.as_const() {
                            Some(ConstValue::Object(map)) => Ok(map.get("name").cloned().into()),
                            _ => Ok(FieldValue::Null),
                        }),
                ),
        ),
    )
}

#[test]
fn extensions_wrap_resolution_in_registration_order() {
    let log = Log::default();
    let response = execute(&schema(&log), r#"{ greet(name: "ada") }"#);
    assert_eq!(response, json!({ "data": { "greet": "hello ADA a b" } }));
    assert_eq!(log.entries(), vec!["before a", "before b", "after a", "after b"]);
}

#[test]
fn short_circuit_skips_later_extensions() {
    let log = Log::default();
    let response = execute(&schema(&log), "{ cached }");
    assert_eq!(response, json!({ "data": { "cached": "cached a" } }));
    assert_eq!(log.entries(), vec!["before a", "after a"]);
}

#[test]
fn after_sees_the_synced_value() {
    let log = Log::default();
    let response = execute(&schema(&log), "{ later }");
    assert_eq!(response, json!({ "data": { "later": "synced a" } }));
}

#[test]
fn before_can_replace_the_object() {
    let response = execute(&schema(&Log::default()), "{ whoami }");
    assert_eq!(response, json!({ "data": { "whoami": "root" } }));
}
