use std::sync::Arc;

use async_graphql_parser::types::Type;
use async_graphql_value::ConstValue;
use heck::ToSnakeCase;
use indexmap::IndexMap;

use super::types::parse_type;
use crate::{Arguments, Context, FieldExtension, FieldValue, ResolverError, ResolverResult};

pub(crate) type ResolverFn = Arc<dyn Fn(&FieldValue, &Arguments, &Context) -> ResolverResult + Send + Sync>;
pub(crate) type AuthorizeFieldFn =
    Arc<dyn Fn(&FieldValue, &Arguments, &Context) -> Result<bool, ResolverError> + Send + Sync>;
pub(crate) type AuthorizeArgumentFn = Arc<dyn Fn(&ConstValue, &Context) -> bool + Send + Sync>;

/// How a field obtains its value, decided when the field is defined.
#[derive(Clone)]
pub(crate) enum Resolve {
    /// Method named after the field in snake_case, then the field name as a mapping key.
    Implicit { method: String, key: String },
    Function(ResolverFn),
    Class(Arc<dyn ResolverClass>),
    Method(String),
    HashKey(String),
    Dig(Vec<String>),
}

impl std::fmt::Debug for Resolve {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Resolve::Implicit { method, key } => f
                .debug_struct("Implicit")
                .field("method", method)
                .field("key", key)
                .finish(),
            Resolve::Function(_) => f.write_str("Function"),
            Resolve::Class(class) => f.debug_tuple("Class").field(&class.name()).finish(),
            Resolve::Method(method) => f.debug_tuple("Method").field(method).finish(),
            Resolve::HashKey(key) => f.debug_tuple("HashKey").field(key).finish(),
            Resolve::Dig(path) => f.debug_tuple("Dig").field(path).finish(),
        }
    }
}

/// Keyword parameter accepted by a [`ResolverClass`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parameter {
    pub name: &'static str,
    pub required: bool,
}

impl Parameter {
    pub const fn required(name: &'static str) -> Self {
        Self { name, required: true }
    }

    pub const fn optional(name: &'static str) -> Self {
        Self { name, required: false }
    }
}

/// Resolver implemented as a standalone type, receiving the arguments as keywords.
pub trait ResolverClass: Send + Sync + 'static {
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Keywords `resolve` accepts. Arguments and extras given to the resolver must match them.
    fn parameters(&self) -> &[Parameter];

    fn resolve(&self, object: &FieldValue, arguments: &Arguments, ctx: &Context) -> ResolverResult;
}

/// Values injected into a field's arguments on request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Extra {
    /// Response path of the field, as a list of keys and indices.
    Path,
    /// `{line, column}` of the field in the query.
    AstNode,
}

impl Extra {
    pub fn argument_name(self) -> &'static str {
        match self {
            Extra::Path => "path",
            Extra::AstNode => "ast_node",
        }
    }
}

pub struct FieldDefinition {
    pub(crate) name: String,
    pub(crate) ty: Type,
    pub(crate) arguments: IndexMap<String, InputValueDefinition>,
    pub(crate) resolve: Resolve,
    pub(crate) authorize: Option<AuthorizeFieldFn>,
    pub(crate) extensions: Vec<Arc<dyn FieldExtension>>,
    pub(crate) extras: Vec<Extra>,
}

impl FieldDefinition {
    /// `ty` is a GraphQL type reference such as `[Int!]!`.
    pub fn new(name: impl Into<String>, ty: &str) -> Self {
        let name = name.into();
        Self {
            resolve: Resolve::Implicit {
                method: name.to_snake_case(),
                key: name.clone(),
            },
            name,
            ty: parse_type(ty),
            arguments: IndexMap::new(),
            authorize: None,
            extensions: Vec::new(),
            extras: Vec::new(),
        }
    }

    #[must_use]
    pub fn argument(mut self, argument: InputValueDefinition) -> Self {
        self.arguments.insert(argument.name.clone(), argument);
        self
    }

    #[must_use]
    pub fn resolve(
        mut self,
        resolver: impl Fn(&FieldValue, &Arguments, &Context) -> ResolverResult + Send + Sync + 'static,
    ) -> Self {
        self.resolve = Resolve::Function(Arc::new(resolver));
        self
    }

    #[must_use]
    pub fn resolver_class(mut self, class: impl ResolverClass) -> Self {
        self.resolve = Resolve::Class(Arc::new(class));
        self
    }

    /// Calls `method` on the object instead of the snake_case field name.
    #[must_use]
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.resolve = Resolve::Method(method.into());
        self
    }

    #[must_use]
    pub fn hash_key(mut self, key: impl Into<String>) -> Self {
        self.resolve = Resolve::HashKey(key.into());
        self
    }

    /// Looks up nested keys of a mapping, missing keys resolve to null.
    #[must_use]
    pub fn dig(mut self, path: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.resolve = Resolve::Dig(path.into_iter().map(Into::into).collect());
        self
    }

    /// Returning `false` skips the resolver and hands over to the schema's unauthorized field
    /// hook.
    #[must_use]
    pub fn authorize(
        mut self,
        authorize: impl Fn(&FieldValue, &Arguments, &Context) -> Result<bool, ResolverError> + Send + Sync + 'static,
    ) -> Self {
        self.authorize = Some(Arc::new(authorize));
        self
    }

    #[must_use]
    pub fn extension(mut self, extension: impl FieldExtension) -> Self {
        self.extensions.push(Arc::new(extension));
        self
    }

    #[must_use]
    pub fn extra(mut self, extra: Extra) -> Self {
        if !self.extras.contains(&extra) {
            self.extras.push(extra);
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> &Type {
        &self.ty
    }

    pub fn arguments(&self) -> impl Iterator<Item = &InputValueDefinition> + '_ {
        self.arguments.values()
    }
}

impl std::fmt::Debug for FieldDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldDefinition")
            .field("name", &self.name)
            .field("ty", &self.ty.to_string())
            .field("resolve", &self.resolve)
            .field("extensions", &self.extensions.len())
            .finish_non_exhaustive()
    }
}

/// Argument or input object field.
pub struct InputValueDefinition {
    pub(crate) name: String,
    pub(crate) ty: Type,
    pub(crate) default_value: Option<ConstValue>,
    pub(crate) authorize: Option<AuthorizeArgumentFn>,
}

impl InputValueDefinition {
    pub fn new(name: impl Into<String>, ty: &str) -> Self {
        Self {
            name: name.into(),
            ty: parse_type(ty),
            default_value: None,
            authorize: None,
        }
    }

    #[must_use]
    pub fn default_value(mut self, value: impl Into<ConstValue>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Checked against the coerced argument value before the field resolves.
    #[must_use]
    pub fn authorize(mut self, authorize: impl Fn(&ConstValue, &Context) -> bool + Send + Sync + 'static) -> Self {
        self.authorize = Some(Arc::new(authorize));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> &Type {
        &self.ty
    }
}
