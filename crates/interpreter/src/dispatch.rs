use std::{rc::Rc, sync::Arc};

use async_graphql_value::ConstValue;

use crate::{
    schema::{Resolve, ResolverClass},
    Arguments, Context, ExtensionFlow, FieldDefinition, FieldExtension, FieldValue, ImplementationError,
    ObjectType, ResolverError, ResolverResult, UnauthorizedError,
};

/// Raw outcome of a field resolver, before completion.
pub(crate) struct Resolution {
    pub value: FieldValue,
    pub after: Option<Rc<AfterExtensions>>,
}

/// Extensions whose `before` let the resolution continue, to be called once the value is known.
pub(crate) struct AfterExtensions {
    extensions: Vec<Arc<dyn FieldExtension>>,
    arguments: Arguments,
}

impl AfterExtensions {
    fn new(extensions: Vec<Arc<dyn FieldExtension>>, arguments: Arguments) -> Option<Rc<Self>> {
        if extensions.is_empty() {
            None
        } else {
            Some(Rc::new(Self { extensions, arguments }))
        }
    }

    pub fn apply(&self, value: FieldValue, ctx: &Context) -> ResolverResult {
        self.extensions
            .iter()
            .try_fold(value, |value, extension| extension.after(value, &self.arguments, ctx))
    }
}

/// Authorizes and resolves `definition` on `object`, going through the field's extensions.
pub(crate) fn resolve(
    object_type: &ObjectType,
    definition: &FieldDefinition,
    object: &FieldValue,
    mut arguments: Arguments,
    ctx: &Context,
) -> Result<Resolution, ResolverError> {
    if let Some(authorize) = &definition.authorize {
        if !authorize(object, &arguments, ctx)? {
            return Err(UnauthorizedError::field(&object_type.name, &definition.name).into());
        }
    }
    for (name, argument) in &definition.arguments {
        let (Some(authorize), Some(value)) = (&argument.authorize, arguments.get(name)) else {
            continue;
        };
        if !authorize(value, ctx) {
            tracing::debug!(
                field = definition.name.as_str(),
                argument = name.as_str(),
                "Argument authorization denied"
            );
            return Err(UnauthorizedError::field(&object_type.name, &definition.name).into());
        }
    }

    let mut replaced_object = None;
    let mut yielded = Vec::with_capacity(definition.extensions.len());
    for extension in &definition.extensions {
        let current = replaced_object.as_ref().unwrap_or(object);
        match extension.before(current, &mut arguments, ctx)? {
            ExtensionFlow::Continue => yielded.push(Arc::clone(extension)),
            ExtensionFlow::ContinueWith(object) => {
                yielded.push(Arc::clone(extension));
                replaced_object = Some(object);
            }
            ExtensionFlow::Return(value) => {
                return Ok(Resolution {
                    value,
                    after: AfterExtensions::new(yielded, arguments),
                })
            }
        }
    }

    let object = replaced_object.as_ref().unwrap_or(object);
    let value = call(object_type, definition, object, &arguments, ctx)?;
    Ok(Resolution {
        value,
        after: AfterExtensions::new(yielded, arguments),
    })
}

fn call(
    object_type: &ObjectType,
    definition: &FieldDefinition,
    object: &FieldValue,
    arguments: &Arguments,
    ctx: &Context,
) -> ResolverResult {
    let not_implemented = |method: &str| {
        ResolverError::from(ImplementationError::FieldNotImplemented {
            parent_type: object_type.name.clone(),
            field: definition.name.clone(),
            method: method.to_string(),
        })
    };

    match &definition.resolve {
        Resolve::Function(resolver) => resolver(object, arguments, ctx),
        Resolve::Class(class) => {
            check_parameters(class.as_ref(), object_type, definition, arguments)?;
            class.resolve(object, arguments, ctx)
        }
        Resolve::Method(method) => {
            call_method(object, method, arguments, ctx).unwrap_or_else(|| Err(not_implemented(method)))
        }
        Resolve::HashKey(key) => dig(object, std::slice::from_ref(key)).ok_or_else(|| not_implemented(key)),
        Resolve::Dig(path) => dig(object, path).ok_or_else(|| not_implemented(&path.join("."))),
        Resolve::Implicit { method, key } => call_method(object, method, arguments, ctx)
            .or_else(|| dig(object, std::slice::from_ref(key)).map(Ok))
            .unwrap_or_else(|| Err(not_implemented(method))),
    }
}

/// `None` if the object doesn't respond to `method`.
fn call_method(object: &FieldValue, method: &str, arguments: &Arguments, ctx: &Context) -> Option<ResolverResult> {
    match object.inner() {
        FieldValue::Object(object) => object.call(method, arguments, ctx),
        _ => None,
    }
}

/// Nested lookup in a mapping, missing keys give null. `None` if the object isn't a mapping.
fn dig(object: &FieldValue, path: &[String]) -> Option<FieldValue> {
    let FieldValue::Value(ConstValue::Object(map)) = object.inner() else {
        return None;
    };
    let mut current = map;
    let mut value = None;
    for (position, key) in path.iter().enumerate() {
        value = current.get(key.as_str());
        match value {
            Some(ConstValue::Object(nested)) => current = nested,
            Some(_) if position + 1 < path.len() => return Some(FieldValue::Null),
            Some(_) => {}
            None => return Some(FieldValue::Null),
        }
    }
    Some(value.cloned().map_or(FieldValue::Null, FieldValue::Value))
}

fn check_parameters(
    class: &dyn ResolverClass,
    object_type: &ObjectType,
    definition: &FieldDefinition,
    arguments: &Arguments,
) -> Result<(), ImplementationError> {
    let parameters = class.parameters();
    let unknown: Vec<String> = arguments
        .names()
        .filter(|name| !parameters.iter().any(|parameter| parameter.name == *name))
        .map(str::to_string)
        .collect();
    let missing: Vec<String> = parameters
        .iter()
        .filter(|parameter| parameter.required && !arguments.contains(parameter.name))
        .map(|parameter| parameter.name.to_string())
        .collect();

    if unknown.is_empty() && missing.is_empty() {
        return Ok(());
    }
    Err(ImplementationError::ArgumentMismatch {
        resolver: class.name().to_string(),
        parent_type: object_type.name.clone(),
        field: definition.name.clone(),
        unknown,
        missing,
    })
}
