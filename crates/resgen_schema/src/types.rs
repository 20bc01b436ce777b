//! Schema types.

use std::fmt;

/// A reference to a type, with its nullability.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeRef {
    pub kind: TypeRefKind,
    pub nullable: bool,
}

/// What a [`TypeRef`] points at.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRefKind {
    Named(String),
    /// A list; the item carries its own nullability.
    List(Box<TypeRef>),
}

impl TypeRef {
    /// A nullable named type.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            kind: TypeRefKind::Named(name.into()),
            nullable: true,
        }
    }

    /// A nullable list of `item`.
    pub fn list(item: TypeRef) -> Self {
        Self {
            kind: TypeRefKind::List(Box::new(item)),
            nullable: true,
        }
    }

    #[must_use]
    pub fn non_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Returns the innermost named type.
    pub fn base_name(&self) -> &str {
        match &self.kind {
            TypeRefKind::Named(name) => name,
            TypeRefKind::List(item) => item.base_name(),
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self.kind, TypeRefKind::List(_))
    }
}

impl From<&async_graphql_parser::types::Type> for TypeRef {
    fn from(ty: &async_graphql_parser::types::Type) -> Self {
        use async_graphql_parser::types::BaseType;

        let kind = match &ty.base {
            BaseType::Named(name) => TypeRefKind::Named(name.to_string()),
            BaseType::List(item) => TypeRefKind::List(Box::new(Self::from(item.as_ref()))),
        };
        Self {
            kind,
            nullable: ty.nullable,
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TypeRefKind::Named(name) => f.write_str(name)?,
            TypeRefKind::List(item) => write!(f, "[{item}]")?,
        }
        if !self.nullable {
            f.write_str("!")?;
        }
        Ok(())
    }
}

/// A field argument or input object field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    pub name: String,
    pub ty: TypeRef,
    pub has_default: bool,
}

/// A field of an object, interface or root operation type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub ty: TypeRef,
    pub arguments: Vec<Argument>,
}

impl Field {
    pub fn has_arguments(&self) -> bool {
        !self.arguments.is_empty()
    }
}

/// Fields shared by objects, interfaces and root operation types.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectType {
    pub fields: Vec<Field>,
    /// Interfaces this type implements.
    pub implements: Vec<String>,
}

impl ObjectType {
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnumType {
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnionType {
    /// Possible types, in declaration order.
    pub members: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScalarType {
    /// One of `Int`, `Float`, `String`, `Boolean` or `ID`.
    pub builtin: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputObjectType {
    pub fields: Vec<Argument>,
}

/// A root operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Query,
    Mutation,
    Subscription,
}

impl OperationKind {
    pub const ALL: [Self; 3] = [Self::Query, Self::Mutation, Self::Subscription];

    /// Conventional type name when no `schema` definition names one.
    pub const fn default_type_name(self) -> &'static str {
        match self {
            Self::Query => "Query",
            Self::Mutation => "Mutation",
            Self::Subscription => "Subscription",
        }
    }
}

/// The kind of a schema type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeKind {
    Object(ObjectType),
    Interface(ObjectType),
    RootOperation(OperationKind, ObjectType),
    Enum(EnumType),
    Union(UnionType),
    Scalar(ScalarType),
    InputObject(InputObjectType),
}

impl TypeKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Object(_) => "object",
            Self::Interface(_) => "interface",
            Self::RootOperation(..) => "root operation",
            Self::Enum(_) => "enum",
            Self::Union(_) => "union",
            Self::Scalar(_) => "scalar",
            Self::InputObject(_) => "input object",
        }
    }
}

/// A named type in the schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaType {
    pub name: String,
    pub kind: TypeKind,
    pub description: Option<String>,
}

impl SchemaType {
    /// Returns the field container of objects, interfaces and root types.
    pub fn object(&self) -> Option<&ObjectType> {
        match &self.kind {
            TypeKind::Object(object)
            | TypeKind::Interface(object)
            | TypeKind::RootOperation(_, object) => Some(object),
            _ => None,
        }
    }

    /// Returns the fields of objects, interfaces and root types, or nothing.
    pub fn fields(&self) -> &[Field] {
        self.object().map_or(&[], |o| o.fields.as_slice())
    }

    /// Returns true for types that get a resolver namespace.
    pub fn has_resolvers(&self) -> bool {
        self.object().is_some()
    }

    pub fn is_root(&self) -> bool {
        matches!(self.kind, TypeKind::RootOperation(..))
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self.kind, TypeKind::Scalar(_))
    }

    pub fn is_builtin_scalar(&self) -> bool {
        matches!(self.kind, TypeKind::Scalar(ScalarType { builtin: true }))
    }

    pub fn is_enum(&self) -> bool {
        matches!(self.kind, TypeKind::Enum(_))
    }

    pub fn is_union(&self) -> bool {
        matches!(self.kind, TypeKind::Union(_))
    }
}
