//! The schema type graph.

use crate::error::SchemaError;
use crate::types::*;
use async_graphql_parser::types as ast;
use async_graphql_parser::Positioned;
use indexmap::IndexMap;
use std::path::Path;

/// All named types of a schema, in declaration order, with its root
/// operation types.
#[derive(Debug, Clone)]
pub struct SchemaGraph {
    types: IndexMap<String, SchemaType>,
    roots: IndexMap<OperationKind, String>,
}

impl Default for SchemaGraph {
    fn default() -> Self {
        let mut graph = Self {
            types: IndexMap::new(),
            roots: IndexMap::new(),
        };
        graph.register_builtin_scalars();
        graph
    }
}

impl SchemaGraph {
    /// Parses SDL text into a graph.
    pub fn parse(sdl: &str) -> Result<Self, SchemaError> {
        let document =
            async_graphql_parser::parse_schema(sdl).map_err(|err| syntax_error(sdl, &err))?;
        Ok(Self::from_document(&document))
    }

    /// Reads and parses the SDL file at `path`.
    pub fn load(path: &Path) -> Result<Self, SchemaError> {
        let sdl = std::fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&sdl)
    }

    /// Builds a graph from a parsed document.
    ///
    /// Type extensions are merged into their base type. Root operation types
    /// come from the `schema` definition, falling back to the conventional
    /// `Query`, `Mutation` and `Subscription` names.
    pub fn from_document(document: &ast::ServiceDocument) -> Self {
        let mut graph = Self::default();
        let mut declared_roots: IndexMap<OperationKind, String> = IndexMap::new();

        for definition in &document.definitions {
            match definition {
                ast::TypeSystemDefinition::Schema(schema) => {
                    let schema = &schema.node;
                    let entries = [
                        (OperationKind::Query, &schema.query),
                        (OperationKind::Mutation, &schema.mutation),
                        (OperationKind::Subscription, &schema.subscription),
                    ];
                    for (kind, name) in entries {
                        if let Some(name) = name {
                            declared_roots.insert(kind, name.node.to_string());
                        }
                    }
                }
                ast::TypeSystemDefinition::Type(definition) => graph.add_type(&definition.node),
                ast::TypeSystemDefinition::Directive(_) => {}
            }
        }

        for kind in OperationKind::ALL {
            let name = match declared_roots.swap_remove(&kind) {
                Some(name) => name,
                None if graph.types.contains_key(kind.default_type_name()) => {
                    kind.default_type_name().to_string()
                }
                None => continue,
            };

            if let Some(ty) = graph.types.get_mut(&name) {
                if let TypeKind::Object(object) = &mut ty.kind {
                    let object = std::mem::take(object);
                    ty.kind = TypeKind::RootOperation(kind, object);
                }
            }
            graph.roots.insert(kind, name);
        }

        graph
    }

    fn register_builtin_scalars(&mut self) {
        for (name, _) in crate::scalars::BUILTIN_SCALARS {
            self.types.insert(
                name.to_string(),
                SchemaType {
                    name: name.to_string(),
                    kind: TypeKind::Scalar(ScalarType { builtin: true }),
                    description: None,
                },
            );
        }
    }

    fn add_type(&mut self, definition: &ast::TypeDefinition) {
        let name = definition.name.node.to_string();
        let kind = convert_kind(&definition.kind);

        match self.types.get_mut(&name) {
            Some(existing) => merge_into(existing, kind),
            None => {
                if definition.extend {
                    tracing::debug!(%name, "extension of an undeclared type");
                }
                self.types.insert(
                    name.clone(),
                    SchemaType {
                        name,
                        kind,
                        description: definition.description.as_ref().map(|d| d.node.clone()),
                    },
                );
            }
        }
    }

    /// Looks up a type by name.
    pub fn get(&self, name: &str) -> Option<&SchemaType> {
        self.types.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// All types, built-in scalars first, then in declaration order.
    pub fn types(&self) -> impl Iterator<Item = &SchemaType> {
        self.types.values()
    }

    /// Types declared by the schema, without the built-in scalars.
    pub fn user_types(&self) -> impl Iterator<Item = &SchemaType> {
        self.types.values().filter(|t| !t.is_builtin_scalar())
    }

    /// Root operation types, in query, mutation, subscription order.
    pub fn roots(&self) -> impl Iterator<Item = (OperationKind, &str)> {
        self.roots.iter().map(|(kind, name)| (*kind, name.as_str()))
    }

    pub fn root_kind(&self, name: &str) -> Option<OperationKind> {
        self.roots
            .iter()
            .find_map(|(kind, root)| (root == name).then_some(*kind))
    }

    pub fn is_root(&self, name: &str) -> bool {
        self.root_kind(name).is_some()
    }

    /// Object and interface types declaring that they implement `interface`.
    pub fn implementors<'a>(&'a self, interface: &'a str) -> impl Iterator<Item = &'a SchemaType> {
        self.types.values().filter(move |t| {
            t.object()
                .is_some_and(|o| o.implements.iter().any(|i| i == interface))
        })
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

fn convert_fields(fields: &[Positioned<ast::FieldDefinition>]) -> Vec<Field> {
    fields
        .iter()
        .map(|field| Field {
            name: field.node.name.node.to_string(),
            ty: TypeRef::from(&field.node.ty.node),
            arguments: field
                .node
                .arguments
                .iter()
                .map(|arg| convert_input_value(&arg.node))
                .collect(),
        })
        .collect()
}

fn convert_input_value(value: &ast::InputValueDefinition) -> Argument {
    Argument {
        name: value.name.node.to_string(),
        ty: TypeRef::from(&value.ty.node),
        has_default: value.default_value.is_some(),
    }
}

fn convert_names<N: std::fmt::Display>(names: &[Positioned<N>]) -> Vec<String> {
    names.iter().map(|n| n.node.to_string()).collect()
}

fn convert_kind(kind: &ast::TypeKind) -> TypeKind {
    match kind {
        ast::TypeKind::Scalar => TypeKind::Scalar(ScalarType { builtin: false }),
        ast::TypeKind::Object(object) => TypeKind::Object(ObjectType {
            fields: convert_fields(&object.fields),
            implements: convert_names(&object.implements),
        }),
        ast::TypeKind::Interface(interface) => TypeKind::Interface(ObjectType {
            fields: convert_fields(&interface.fields),
            implements: convert_names(&interface.implements),
        }),
        ast::TypeKind::Union(union) => TypeKind::Union(UnionType {
            members: convert_names(&union.members),
        }),
        ast::TypeKind::Enum(enum_type) => TypeKind::Enum(EnumType {
            values: enum_type
                .values
                .iter()
                .map(|v| v.node.value.node.to_string())
                .collect(),
        }),
        ast::TypeKind::InputObject(input) => TypeKind::InputObject(InputObjectType {
            fields: input
                .fields
                .iter()
                .map(|f| convert_input_value(&f.node))
                .collect(),
        }),
    }
}

fn append_unique<T: Clone>(target: &mut Vec<T>, extra: Vec<T>, same: impl Fn(&T, &T) -> bool) {
    for item in extra {
        if !target.iter().any(|existing| same(existing, &item)) {
            target.push(item);
        }
    }
}

/// Merges a type extension (or repeated definition) into an existing type.
fn merge_into(existing: &mut SchemaType, extension: TypeKind) {
    match (&mut existing.kind, extension) {
        (TypeKind::Object(base), TypeKind::Object(ext))
        | (TypeKind::Interface(base), TypeKind::Interface(ext)) => {
            append_unique(&mut base.fields, ext.fields, |a, b| a.name == b.name);
            append_unique(&mut base.implements, ext.implements, |a, b| a == b);
        }
        (TypeKind::Enum(base), TypeKind::Enum(ext)) => {
            append_unique(&mut base.values, ext.values, |a, b| a == b);
        }
        (TypeKind::Union(base), TypeKind::Union(ext)) => {
            append_unique(&mut base.members, ext.members, |a, b| a == b);
        }
        (TypeKind::InputObject(base), TypeKind::InputObject(ext)) => {
            append_unique(&mut base.fields, ext.fields, |a, b| a.name == b.name);
        }
        (TypeKind::Scalar(_), TypeKind::Scalar(_)) => {}
        (base, ext) => {
            tracing::debug!(
                name = %existing.name,
                base = base.as_str(),
                extension = ext.as_str(),
                "ignoring extension of a different kind"
            );
        }
    }
}

fn syntax_error(sdl: &str, err: &async_graphql_parser::Error) -> SchemaError {
    let span = err
        .positions()
        .next()
        .and_then(|pos| byte_offset(sdl, pos.line, pos.column))
        .map(|offset| miette::SourceSpan::from((offset, 1)));

    SchemaError::Syntax {
        src: sdl.to_string(),
        message: err.to_string(),
        span,
    }
}

/// Converts a 1-based line and column into a byte offset.
fn byte_offset(source: &str, line: usize, column: usize) -> Option<usize> {
    let mut offset = 0;
    for (index, text) in source.split_inclusive('\n').enumerate() {
        if index + 1 == line {
            let column_bytes: usize = text
                .chars()
                .take(column.saturating_sub(1))
                .map(char::len_utf8)
                .sum();
            return Some(offset + column_bytes);
        }
        offset += text.len();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const SDL: &str = r#"
"Entry point"
type Query {
  user(id: ID!): User
  search(term: String, limit: Int = 10): [SearchResult!]!
}

interface Node { id: ID! }

type User implements Node {
  id: ID!
  name: String
  role: Role!
}

enum Role { ADMIN USER }

union SearchResult = User | Post

type Post { title: String! }

input Filter { term: String! }

scalar DateTime

extend type User { createdAt: DateTime! }
extend enum Role { GUEST }
"#;

    #[test]
    fn test_parse_types() {
        let graph = SchemaGraph::parse(SDL).unwrap();

        let query = graph.get("Query").unwrap();
        assert!(query.is_root());
        assert_eq!(query.description.as_deref(), Some("Entry point"));
        let search = query.object().unwrap().field("search").unwrap();
        assert_eq!(search.ty.to_string(), "[SearchResult!]!");
        assert!(!search.arguments[0].has_default);
        assert!(search.arguments[1].has_default);

        let user = graph.get("User").unwrap();
        let names: Vec<_> = user.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["id", "name", "role", "createdAt"]);

        match &graph.get("Role").unwrap().kind {
            TypeKind::Enum(e) => assert_eq!(e.values, vec!["ADMIN", "USER", "GUEST"]),
            other => panic!("expected enum, got {other:?}"),
        }
        match &graph.get("SearchResult").unwrap().kind {
            TypeKind::Union(u) => assert_eq!(u.members, vec!["User", "Post"]),
            other => panic!("expected union, got {other:?}"),
        }
        assert!(matches!(graph.get("Filter").unwrap().kind, TypeKind::InputObject(_)));
        assert!(!graph.get("DateTime").unwrap().is_builtin_scalar());
        assert!(graph.get("Int").unwrap().is_builtin_scalar());
    }

    #[test]
    fn test_implementors() {
        let graph = SchemaGraph::parse(SDL).unwrap();
        let names: Vec<_> = graph.implementors("Node").map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["User"]);
    }

    #[test]
    fn test_implements_lists() {
        let graph = SchemaGraph::parse(
            "interface Node { id: ID! } interface Named implements Node { id: ID! name: String } \
             type Post { id: ID! } extend type Post implements Node & Named { name: String }",
        )
        .unwrap();

        let implements = |name: &str| match &graph.get(name).unwrap().kind {
            TypeKind::Object(o) | TypeKind::Interface(o) => o.implements.clone(),
            other => panic!("expected object or interface, got {other:?}"),
        };
        assert_eq!(implements("Named"), vec!["Node"]);
        assert_eq!(implements("Post"), vec!["Node", "Named"]);
    }

    #[test]
    fn test_default_roots() {
        let graph = SchemaGraph::parse("type Query { a: Int } type Mutation { b: Int }").unwrap();
        let roots: Vec<_> = graph.roots().collect();
        assert_eq!(
            roots,
            vec![(OperationKind::Query, "Query"), (OperationKind::Mutation, "Mutation")]
        );
        assert!(graph.get("Mutation").unwrap().is_root());
    }

    #[test]
    fn test_schema_definition_roots() {
        let graph = SchemaGraph::parse(
            "schema { query: RootQuery } type RootQuery { a: Int } type Query { b: Int }",
        )
        .unwrap();
        assert_eq!(graph.root_kind("RootQuery"), Some(OperationKind::Query));
        assert!(!graph.is_root("Query"));
        assert!(matches!(graph.get("Query").unwrap().kind, TypeKind::Object(_)));
    }

    #[test]
    fn test_syntax_error() {
        let err = SchemaGraph::parse("type Query {\n  a: \n}").unwrap_err();
        match err {
            SchemaError::Syntax { span, .. } => assert!(span.is_some()),
            other => panic!("expected syntax error, got {other:?}"),
        }
    }

    #[test]
    fn test_byte_offset() {
        assert_eq!(byte_offset("ab\ncd", 2, 2), Some(4));
        assert_eq!(byte_offset("ab", 3, 1), None);
    }
}
