use async_graphql_value::{ConstValue, Number};

use super::ScalarType;

pub(super) fn builtins() -> [ScalarType; 5] {
    [
        ScalarType::new("Int").coerce_input(int_input).coerce_result(int_result),
        ScalarType::new("Float")
            .coerce_input(float_input)
            .coerce_result(float_result),
        ScalarType::new("String")
            .coerce_input(string_input)
            .coerce_result(string_result),
        ScalarType::new("Boolean")
            .coerce_input(boolean_input)
            .coerce_result(boolean_result),
        ScalarType::new("ID").coerce_input(id_input).coerce_result(id_result),
    ]
}

fn as_i32(number: &Number) -> Option<i32> {
    number.as_i64().and_then(|value| i32::try_from(value).ok())
}

fn int_input(value: &ConstValue) -> Result<ConstValue, String> {
    match value {
        ConstValue::Number(number) if as_i32(number).is_some() => Ok(value.clone()),
        other => Err(format!("Could not coerce value {other} to Int")),
    }
}

fn int_result(value: &ConstValue) -> Result<ConstValue, String> {
    match value {
        ConstValue::Number(number) => match as_i32(number) {
            Some(value) => Ok(ConstValue::Number(value.into())),
            None => match number.as_f64() {
                Some(float) if float.fract() == 0.0 && (f64::from(i32::MIN)..=f64::from(i32::MAX)).contains(&float) => {
                    Ok(ConstValue::Number((float as i32).into()))
                }
                _ => Err(format!("Int cannot represent non 32-bit signed integer value: {number}")),
            },
        },
        other => Err(format!("Int cannot represent non-integer value: {other}")),
    }
}

fn float_input(value: &ConstValue) -> Result<ConstValue, String> {
    match value {
        ConstValue::Number(number) => number
            .as_f64()
            .and_then(Number::from_f64)
            .map(ConstValue::Number)
            .ok_or_else(|| format!("Could not coerce value {number} to Float")),
        other => Err(format!("Could not coerce value {other} to Float")),
    }
}

fn float_result(value: &ConstValue) -> Result<ConstValue, String> {
    match value {
        ConstValue::Number(number) => number
            .as_f64()
            .and_then(Number::from_f64)
            .map(ConstValue::Number)
            .ok_or_else(|| format!("Float cannot represent value: {number}")),
        other => Err(format!("Float cannot represent non numeric value: {other}")),
    }
}

fn string_input(value: &ConstValue) -> Result<ConstValue, String> {
    match value {
        ConstValue::String(_) => Ok(value.clone()),
        other => Err(format!("Could not coerce value {other} to String")),
    }
}

fn string_result(value: &ConstValue) -> Result<ConstValue, String> {
    match value {
        ConstValue::String(_) => Ok(value.clone()),
        ConstValue::Enum(name) => Ok(ConstValue::String(name.to_string())),
        ConstValue::Number(number) => Ok(ConstValue::String(number.to_string())),
        ConstValue::Boolean(boolean) => Ok(ConstValue::String(boolean.to_string())),
        other => Err(format!("String cannot represent value: {other}")),
    }
}

fn boolean_input(value: &ConstValue) -> Result<ConstValue, String> {
    match value {
        ConstValue::Boolean(_) => Ok(value.clone()),
        other => Err(format!("Could not coerce value {other} to Boolean")),
    }
}

fn boolean_result(value: &ConstValue) -> Result<ConstValue, String> {
    match value {
        ConstValue::Boolean(_) => Ok(value.clone()),
        other => Err(format!("Boolean cannot represent a non boolean value: {other}")),
    }
}

fn id_input(value: &ConstValue) -> Result<ConstValue, String> {
    match value {
        ConstValue::String(_) => Ok(value.clone()),
        ConstValue::Number(number) if number.is_i64() || number.is_u64() => Ok(ConstValue::String(number.to_string())),
        other => Err(format!("Could not coerce value {other} to ID")),
    }
}

fn id_result(value: &ConstValue) -> Result<ConstValue, String> {
    match value {
        ConstValue::String(_) => Ok(value.clone()),
        ConstValue::Number(number) if number.is_i64() || number.is_u64() => Ok(ConstValue::String(number.to_string())),
        other => Err(format!("ID cannot represent value: {other}")),
    }
}
