use graphql_interpreter::{
    ConstValue, EnumType, FieldDefinition, InputValueDefinition, Name, ObjectType, ScalarType, Schema,
};
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::{execute, finish};

/// Amounts sent as decimal strings and handled as integer cents.
fn cents() -> ScalarType {
    ScalarType::new("Cents")
        .coerce_input(|value| match value {
            ConstValue::String(amount) => {
                let (units, cents) = amount.split_once('.').unwrap_or((amount, "0"));
                let parse = |digits: &str| digits.parse::<i64>().map_err(|err| err.to_string());
                Ok(ConstValue::from(parse(units)? * 100 + parse(cents)?))
            }
            other => Err(format!("Expected a decimal string, got {other}")),
        })
        .coerce_result(|value| match value {
            ConstValue::Number(number) => {
                let cents = number.as_i64().ok_or_else(|| format!("{number} is not an amount of cents"))?;
                Ok(ConstValue::String(format!("{}.{:02}", cents / 100, cents % 100)))
            }
            other => Err(format!("{other} is not an amount of cents")),
        })
}

fn schema() -> Schema {
    finish(
        Schema::build("Query", None, None)
            .register(
                ObjectType::new("Query")
                    .field(
                        FieldDefinition::new("double", "Cents")
                            .argument(InputValueDefinition::new("amount", "Cents!"))
                            .resolve(|_, args, _| Ok((args.get_i64("amount").unwrap_or_default() * 2).into())),
                    )
                    .field(
                        FieldDefinition::new("color", "Color")
                            .argument(InputValueDefinition::new("code", "Int!"))
                            .resolve(|_, args, _| Ok(args.get_i64("code").unwrap_or_default().into())),
                    )
                    .field(
                        FieldDefinition::new("code", "Int")
                            .argument(
                                InputValueDefinition::new("color", "Color!")
                                    .default_value(ConstValue::Enum(Name::new("RED"))),
                            )
                            .resolve(|_, args, _| Ok(args.get("color").cloned().into())),
                    )
                    .field(FieldDefinition::new("count", "Int").resolve(|_, _, _| Ok("many".into()))),
            )
            .register(cents())
            .register(EnumType::new("Color").value_with("RED", 1).value_with("GREEN", 2)),
    )
}

#[test]
fn custom_scalar_coercion_both_ways() {
    let response = execute(&schema(), r#"{ double(amount: "1.25") }"#);
    assert_eq!(response, json!({ "data": { "double": "2.50" } }));
}

#[test]
fn invalid_scalar_argument() {
    let response = execute(&schema(), r#"{ double(amount: "a lot") }"#);
    assert_eq!(response["data"], json!({ "double": null }));
    assert_eq!(response["errors"][0]["extensions"]["code"], "ARGUMENT_ERROR");
    assert_eq!(
        response["errors"][0]["message"],
        r#"Argument 'amount' on Field 'double' has an invalid value ("a lot"). Expected type 'Cents!'."#
    );
}

#[test]
fn enums_map_internal_values() {
    let response = execute(&schema(), "{ color(code: 2) code(color: GREEN) default: code }");
    assert_eq!(response, json!({ "data": { "color": "GREEN", "code": 2, "default": 1 } }));
}

#[test]
fn results_the_type_cannot_represent() {
    let response = execute(&schema(), "{ color(code: 7) count }");
    assert_eq!(response["data"], json!({ "color": null, "count": null }));
    let messages = response["errors"]
        .as_array()
        .into_iter()
        .flatten()
        .map(|error| error["message"].as_str().unwrap_or_default().to_string())
        .collect::<Vec<_>>();
    assert_eq!(
        messages,
        vec![
            "Query.color returned a value Color cannot represent: `7` is not a valid value of enum Color",
            "Query.count returned a value Int cannot represent: Int cannot represent non-integer value: \"many\"",
        ]
    );
}
