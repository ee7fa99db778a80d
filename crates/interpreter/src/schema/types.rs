use std::sync::Arc;

use async_graphql_parser::types::{BaseType, Type};
use async_graphql_value::{ConstValue, Name};
use indexmap::IndexMap;

use super::{FieldDefinition, InputValueDefinition};
use crate::{Context, FieldValue, ResolverError};

pub(crate) type AuthorizeObjectFn = Arc<dyn Fn(&FieldValue, &Context) -> Result<bool, ResolverError> + Send + Sync>;
pub(crate) type CoerceFn = Arc<dyn Fn(&ConstValue) -> Result<ConstValue, String> + Send + Sync>;

/// Parses a type reference such as `[Int!]!`. Anything unparsable is kept as a named type which
/// the schema builder then reports as unknown.
pub(crate) fn parse_type(ty: &str) -> Type {
    Type::new(ty).unwrap_or_else(|| Type {
        base: BaseType::Named(Name::new(ty)),
        nullable: true,
    })
}

/// Innermost named type of a type reference.
pub(crate) fn named_type(ty: &Type) -> &str {
    match &ty.base {
        BaseType::Named(name) => name.as_str(),
        BaseType::List(inner) => named_type(inner),
    }
}

pub enum MetaType {
    Object(ObjectType),
    Interface(InterfaceType),
    Union(UnionType),
    Scalar(ScalarType),
    Enum(EnumType),
    InputObject(InputObjectType),
}

impl MetaType {
    pub fn name(&self) -> &str {
        match self {
            MetaType::Object(ty) => &ty.name,
            MetaType::Interface(ty) => &ty.name,
            MetaType::Union(ty) => &ty.name,
            MetaType::Scalar(ty) => &ty.name,
            MetaType::Enum(ty) => &ty.name,
            MetaType::InputObject(ty) => &ty.name,
        }
    }

    pub fn is_abstract(&self) -> bool {
        matches!(self, MetaType::Interface(_) | MetaType::Union(_))
    }

    pub fn is_input(&self) -> bool {
        matches!(self, MetaType::Scalar(_) | MetaType::Enum(_) | MetaType::InputObject(_))
    }

    pub fn is_output(&self) -> bool {
        !matches!(self, MetaType::InputObject(_))
    }

    pub fn as_object(&self) -> Option<&ObjectType> {
        match self {
            MetaType::Object(ty) => Some(ty),
            _ => None,
        }
    }

    pub(crate) fn fields(&self) -> Option<&IndexMap<String, FieldDefinition>> {
        match self {
            MetaType::Object(ty) => Some(&ty.fields),
            MetaType::Interface(ty) => Some(&ty.fields),
            _ => None,
        }
    }
}

macro_rules! impl_from_type {
    ($($variant:ident($ty:ty)),*) => {
        $(
            impl From<$ty> for MetaType {
                fn from(ty: $ty) -> Self {
                    MetaType::$variant(ty)
                }
            }
        )*
    };
}

impl_from_type!(
    Object(ObjectType),
    Interface(InterfaceType),
    Union(UnionType),
    Scalar(ScalarType),
    Enum(EnumType),
    InputObject(InputObjectType)
);

impl std::fmt::Debug for MetaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self {
            MetaType::Object(_) => "Object",
            MetaType::Interface(_) => "Interface",
            MetaType::Union(_) => "Union",
            MetaType::Scalar(_) => "Scalar",
            MetaType::Enum(_) => "Enum",
            MetaType::InputObject(_) => "InputObject",
        };
        f.debug_tuple(kind).field(&self.name()).finish()
    }
}

pub struct ObjectType {
    pub(crate) name: String,
    pub(crate) fields: IndexMap<String, FieldDefinition>,
    pub(crate) interfaces: Vec<String>,
    pub(crate) authorize: Option<AuthorizeObjectFn>,
}

impl ObjectType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: IndexMap::new(),
            interfaces: Vec::new(),
            authorize: None,
        }
    }

    #[must_use]
    pub fn field(mut self, field: FieldDefinition) -> Self {
        self.fields.insert(field.name.clone(), field);
        self
    }

    #[must_use]
    pub fn implements(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    /// Checked every time a value is about to be exposed as this type. Returning `false` hands
    /// the value to the schema's unauthorized object hook.
    #[must_use]
    pub fn authorize(
        mut self,
        authorize: impl Fn(&FieldValue, &Context) -> Result<bool, ResolverError> + Send + Sync + 'static,
    ) -> Self {
        self.authorize = Some(Arc::new(authorize));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get_field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.get(name)
    }

    pub fn interfaces(&self) -> impl Iterator<Item = &str> + '_ {
        self.interfaces.iter().map(String::as_str)
    }
}

pub struct InterfaceType {
    pub(crate) name: String,
    pub(crate) fields: IndexMap<String, FieldDefinition>,
}

impl InterfaceType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: IndexMap::new(),
        }
    }

    #[must_use]
    pub fn field(mut self, field: FieldDefinition) -> Self {
        self.fields.insert(field.name.clone(), field);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

pub struct UnionType {
    pub(crate) name: String,
    pub(crate) members: Vec<String>,
}

impl UnionType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
        }
    }

    #[must_use]
    pub fn member(mut self, member: impl Into<String>) -> Self {
        self.members.push(member.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Leaf type with its input and result coercion.
pub struct ScalarType {
    pub(crate) name: String,
    pub(crate) coerce_input: CoerceFn,
    pub(crate) coerce_result: CoerceFn,
}

impl ScalarType {
    /// Scalar accepting and returning values as is.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            coerce_input: Arc::new(|value| Ok(value.clone())),
            coerce_result: Arc::new(|value| Ok(value.clone())),
        }
    }

    /// Converts a client provided value into its internal representation.
    #[must_use]
    pub fn coerce_input(
        mut self,
        coerce: impl Fn(&ConstValue) -> Result<ConstValue, String> + Send + Sync + 'static,
    ) -> Self {
        self.coerce_input = Arc::new(coerce);
        self
    }

    /// Converts an internal value into what is sent to the client.
    #[must_use]
    pub fn coerce_result(
        mut self,
        coerce: impl Fn(&ConstValue) -> Result<ConstValue, String> + Send + Sync + 'static,
    ) -> Self {
        self.coerce_result = Arc::new(coerce);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn input(&self, value: &ConstValue) -> Result<ConstValue, String> {
        (self.coerce_input)(value)
    }

    pub fn result(&self, value: &ConstValue) -> Result<ConstValue, String> {
        (self.coerce_result)(value)
    }
}

pub struct EnumType {
    pub(crate) name: String,
    // GraphQL name -> internal value
    pub(crate) values: IndexMap<String, ConstValue>,
}

impl EnumType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: IndexMap::new(),
        }
    }

    /// Value whose internal representation is its name as a string.
    #[must_use]
    pub fn value(self, name: impl Into<String>) -> Self {
        let name = name.into();
        let internal = ConstValue::String(name.clone());
        self.value_with(name, internal)
    }

    #[must_use]
    pub fn value_with(mut self, name: impl Into<String>, internal: impl Into<ConstValue>) -> Self {
        self.values.insert(name.into(), internal.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// GraphQL name (from a literal or a variable) to internal value.
    pub fn input(&self, value: &ConstValue) -> Result<ConstValue, String> {
        let name = match value {
            ConstValue::Enum(name) => name.as_str(),
            ConstValue::String(name) => name.as_str(),
            other => return Err(format!("Expected a value of enum {}, got {other}", self.name)),
        };
        self.values
            .get(name)
            .cloned()
            .ok_or_else(|| format!("{name} is not a valid value of enum {}", self.name))
    }

    /// Internal value to its GraphQL name.
    pub fn result(&self, value: &ConstValue) -> Result<ConstValue, String> {
        if let Some((name, _)) = self.values.iter().find(|(_, internal)| *internal == value) {
            return Ok(ConstValue::Enum(Name::new(name)));
        }
        match value {
            ConstValue::Enum(name) if self.values.contains_key(name.as_str()) => Ok(value.clone()),
            ConstValue::String(name) if self.values.contains_key(name.as_str()) => {
                Ok(ConstValue::Enum(Name::new(name)))
            }
            other => Err(format!("`{other}` is not a valid value of enum {}", self.name)),
        }
    }
}

pub struct InputObjectType {
    pub(crate) name: String,
    pub(crate) fields: IndexMap<String, InputValueDefinition>,
}

impl InputObjectType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: IndexMap::new(),
        }
    }

    #[must_use]
    pub fn field(mut self, field: InputValueDefinition) -> Self {
        self.fields.insert(field.name.clone(), field);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}
