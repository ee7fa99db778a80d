use std::{error::Error, sync::Arc};

use fxhash::FxHashMap;
use indexmap::IndexMap;

use super::{
    hooks::{self, RescueHandler, ResolveTypeFn, UnauthorizedFieldFn, UnauthorizedObjectFn},
    named_type, scalar, FieldDefinition, InputValueDefinition, MetaType, Schema, SchemaInner,
};
use crate::{
    analysis::QueryAnalyzer, Context, ExecutionConfig, FieldValue, Instrumentation, ResolverResult, SchemaError,
    UnauthorizedError,
};

pub struct SchemaBuilder {
    query_type: String,
    mutation_type: Option<String>,
    subscription_type: Option<String>,
    types: Vec<MetaType>,
    resolve_type: Option<ResolveTypeFn>,
    unauthorized_object: Option<UnauthorizedObjectFn>,
    unauthorized_field: Option<UnauthorizedFieldFn>,
    rescue_handlers: Vec<RescueHandler>,
    instrumentations: Vec<Box<dyn Instrumentation>>,
    analyzers: Vec<Box<dyn QueryAnalyzer>>,
    config: ExecutionConfig,
}

impl SchemaBuilder {
    pub(super) fn new(query_type: String, mutation_type: Option<String>, subscription_type: Option<String>) -> Self {
        Self {
            query_type,
            mutation_type,
            subscription_type,
            types: Vec::new(),
            resolve_type: None,
            unauthorized_object: None,
            unauthorized_field: None,
            rescue_handlers: Vec::new(),
            instrumentations: Vec::new(),
            analyzers: Vec::new(),
            config: ExecutionConfig::default(),
        }
    }

    #[must_use]
    pub fn register(mut self, ty: impl Into<MetaType>) -> Self {
        self.types.push(ty.into());
        self
    }

    /// Decides the concrete object type of a value exposed through an interface or a union.
    /// By default the type carried by the value itself is used.
    #[must_use]
    pub fn resolve_type(
        mut self,
        hook: impl Fn(&str, &FieldValue, &Context) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.resolve_type = Some(Arc::new(hook));
        self
    }

    /// Called when an object type's authorization denies a value. The returned value replaces
    /// the denied one, by default a field error is raised.
    #[must_use]
    pub fn unauthorized_object(
        mut self,
        hook: impl Fn(UnauthorizedError, FieldValue, &Context) -> ResolverResult + Send + Sync + 'static,
    ) -> Self {
        self.unauthorized_object = Some(Arc::new(hook));
        self
    }

    /// Called when a field or argument authorization fails, instead of the resolver.
    #[must_use]
    pub fn unauthorized_field(
        mut self,
        hook: impl Fn(UnauthorizedError, &Context) -> ResolverResult + Send + Sync + 'static,
    ) -> Self {
        self.unauthorized_field = Some(Arc::new(hook));
        self
    }

    /// Converts application errors of type `E` raised by resolvers. Handlers are tried in
    /// registration order, on the error and then on each of its sources.
    #[must_use]
    pub fn rescue_from<E, F>(mut self, handler: F) -> Self
    where
        E: Error + 'static,
        F: Fn(&E, &Context) -> ResolverResult + Send + Sync + 'static,
    {
        self.rescue_handlers.push(RescueHandler::new(handler));
        self
    }

    #[must_use]
    pub fn instrument(mut self, instrumentation: impl Instrumentation) -> Self {
        self.instrumentations.push(Box::new(instrumentation));
        self
    }

    #[must_use]
    pub fn analyzer(mut self, analyzer: impl QueryAnalyzer) -> Self {
        self.analyzers.push(Box::new(analyzer));
        self
    }

    #[must_use]
    pub fn config(mut self, config: ExecutionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn finish(self) -> Result<Schema, SchemaError> {
        let mut types = IndexMap::with_capacity(self.types.len() + 5);
        for ty in self.types {
            let name = ty.name().to_string();
            if types.insert(name.clone(), ty).is_some() {
                return Err(SchemaError::DuplicateType(name));
            }
        }
        // Built-in scalars may be replaced by custom ones with the same name.
        for scalar in scalar::builtins() {
            if !types.contains_key(scalar.name()) {
                types.insert(scalar.name().to_string(), MetaType::Scalar(scalar));
            }
        }

        for root in [Some(&self.query_type), self.mutation_type.as_ref(), self.subscription_type.as_ref()]
            .into_iter()
            .flatten()
        {
            match types.get(root) {
                Some(MetaType::Object(_)) => {}
                Some(_) => return Err(SchemaError::InvalidRootType(root.clone())),
                None => {
                    return Err(SchemaError::UnknownType {
                        name: root.clone(),
                        referenced_by: "the schema roots".into(),
                    })
                }
            }
        }

        for ty in types.values() {
            validate_type(&types, ty)?;
        }

        let possible_types = collect_possible_types(&types);
        tracing::debug!(types = types.len(), "Schema built");

        Ok(Schema(Arc::new(SchemaInner {
            query_type: self.query_type,
            mutation_type: self.mutation_type,
            subscription_type: self.subscription_type,
            types,
            possible_types,
            resolve_type: self.resolve_type.unwrap_or_else(|| Arc::new(hooks::default_resolve_type)),
            unauthorized_object: self
                .unauthorized_object
                .unwrap_or_else(|| Arc::new(hooks::default_unauthorized_object)),
            unauthorized_field: self
                .unauthorized_field
                .unwrap_or_else(|| Arc::new(hooks::default_unauthorized_field)),
            rescue_handlers: self.rescue_handlers,
            instrumentations: self.instrumentations,
            analyzers: self.analyzers,
            config: self.config,
        })))
    }
}

fn validate_type(types: &IndexMap<String, MetaType>, ty: &MetaType) -> Result<(), SchemaError> {
    match ty {
        MetaType::Object(object) => {
            validate_fields(types, &object.name, &object.fields)?;
            for interface_name in &object.interfaces {
                let interface = match types.get(interface_name) {
                    Some(MetaType::Interface(interface)) => interface,
                    Some(_) => {
                        return Err(SchemaError::NotAnInterface {
                            object: object.name.clone(),
                            interface: interface_name.clone(),
                        })
                    }
                    None => return Err(unknown_type(interface_name, &object.name)),
                };
                if let Some(field) = interface.fields.keys().find(|field| !object.fields.contains_key(*field)) {
                    return Err(SchemaError::MissingInterfaceField {
                        object: object.name.clone(),
                        interface: interface_name.clone(),
                        field: field.clone(),
                    });
                }
            }
        }
        MetaType::Interface(interface) => validate_fields(types, &interface.name, &interface.fields)?,
        MetaType::Union(union) => {
            for member in &union.members {
                match types.get(member) {
                    Some(MetaType::Object(_)) => {}
                    Some(_) => {
                        return Err(SchemaError::InvalidUnionMember {
                            union: union.name.clone(),
                            member: member.clone(),
                        })
                    }
                    None => return Err(unknown_type(member, &union.name)),
                }
            }
        }
        MetaType::InputObject(input_object) => {
            for field in input_object.fields.values() {
                validate_input_value(types, &format!("{}.{}", input_object.name, field.name), field)?;
            }
        }
        MetaType::Scalar(_) | MetaType::Enum(_) => {}
    }
    Ok(())
}

fn validate_fields(
    types: &IndexMap<String, MetaType>,
    parent: &str,
    fields: &IndexMap<String, FieldDefinition>,
) -> Result<(), SchemaError> {
    for field in fields.values() {
        let location = format!("{parent}.{}", field.name);
        let name = named_type(&field.ty);
        match types.get(name) {
            Some(ty) if ty.is_output() => {}
            Some(_) => {
                return Err(SchemaError::InvalidOutputType {
                    location,
                    name: name.to_string(),
                })
            }
            None => return Err(unknown_type(name, &location)),
        }
        for argument in field.arguments.values() {
            validate_input_value(types, &format!("{location}({}:)", argument.name), argument)?;
        }
    }
    Ok(())
}

fn validate_input_value(
    types: &IndexMap<String, MetaType>,
    location: &str,
    input_value: &InputValueDefinition,
) -> Result<(), SchemaError> {
    let name = named_type(&input_value.ty);
    match types.get(name) {
        Some(ty) if ty.is_input() => Ok(()),
        Some(_) => Err(SchemaError::InvalidInputType {
            location: location.to_string(),
            name: name.to_string(),
        }),
        None => Err(unknown_type(name, location)),
    }
}

fn unknown_type(name: &str, referenced_by: &str) -> SchemaError {
    SchemaError::UnknownType {
        name: name.to_string(),
        referenced_by: referenced_by.to_string(),
    }
}

fn collect_possible_types(types: &IndexMap<String, MetaType>) -> FxHashMap<String, Vec<String>> {
    let mut possible_types = FxHashMap::<String, Vec<String>>::default();
    for ty in types.values() {
        match ty {
            MetaType::Union(union) => {
                possible_types
                    .entry(union.name.clone())
                    .or_default()
                    .extend(union.members.iter().cloned());
            }
            MetaType::Interface(interface) => {
                possible_types.entry(interface.name.clone()).or_default();
            }
            MetaType::Object(object) => {
                for interface in &object.interfaces {
                    possible_types
                        .entry(interface.clone())
                        .or_default()
                        .push(object.name.clone());
                }
            }
            _ => {}
        }
    }
    possible_types
}
