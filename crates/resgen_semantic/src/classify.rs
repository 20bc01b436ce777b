//! Type classification shared by the checker and the code generator.

use resgen_resolver::{ModelShape, ResolvedModels};
use resgen_schema::{Field, ScalarMap, SchemaGraph, TypeKind};
use rustc_hash::{FxHashMap, FxHashSet};
use std::cell::RefCell;
use std::collections::VecDeque;

/// Answers questions about how schema types are backed.
pub struct Classifier<'a> {
    graph: &'a SchemaGraph,
    models: &'a ResolvedModels,
    scalars: &'a ScalarMap,
    memo: RefCell<FxHashMap<String, bool>>,
}

impl<'a> Classifier<'a> {
    pub fn new(graph: &'a SchemaGraph, models: &'a ResolvedModels, scalars: &'a ScalarMap) -> Self {
        Self {
            graph,
            models,
            scalars,
            memo: RefCell::new(FxHashMap::default()),
        }
    }

    /// Returns true if an unbound type can be served entirely by default
    /// resolvers: every field takes no arguments and returns a mapped scalar,
    /// a bound type, or another default-resolvable type.
    ///
    /// Types that reach a cycle of unbound types are not default-resolvable.
    pub fn is_default_resolvable(&self, type_name: &str) -> bool {
        let mut visiting = FxHashSet::default();
        self.default_resolvable(type_name, &mut visiting)
    }

    fn default_resolvable(&self, type_name: &str, visiting: &mut FxHashSet<String>) -> bool {
        if let Some(&known) = self.memo.borrow().get(type_name) {
            return known;
        }
        let Some(ty) = self.graph.get(type_name) else {
            return false;
        };

        let result = match &ty.kind {
            TypeKind::Scalar(_) => self.scalars.is_mapped(type_name),
            TypeKind::Object(object) | TypeKind::Interface(object) => {
                if self.models.is_bound(type_name) {
                    return true;
                }
                if !visiting.insert(type_name.to_string()) {
                    return false;
                }
                let result = object
                    .fields
                    .iter()
                    .all(|field| !field.has_arguments() && self.returns_resolvable(field, visiting));
                visiting.remove(type_name);
                result
            }
            TypeKind::RootOperation(..)
            | TypeKind::Enum(_)
            | TypeKind::Union(_)
            | TypeKind::InputObject(_) => false,
        };

        self.memo.borrow_mut().insert(type_name.to_string(), result);
        result
    }

    fn returns_resolvable(&self, field: &Field, visiting: &mut FxHashSet<String>) -> bool {
        self.default_resolvable(field.ty.base_name(), visiting)
    }

    /// Returns the first field that keeps `type_name` from being
    /// default-resolvable.
    pub fn blocking_field(&self, type_name: &str) -> Option<&'a Field> {
        self.graph.get(type_name)?.fields().iter().find(|field| {
            field.has_arguments() || !self.is_default_resolvable(field.ty.base_name())
        })
    }

    /// Names of all types reachable from the root operation types through
    /// field types, arguments, union members and interface implementors.
    pub fn reachable_types(&self) -> FxHashSet<&'a str> {
        let mut seen: FxHashSet<&'a str> = FxHashSet::default();
        let mut queue: VecDeque<&'a str> = self.graph.roots().map(|(_, name)| name).collect();

        while let Some(name) = queue.pop_front() {
            if !seen.insert(name) {
                continue;
            }
            let Some(ty) = self.graph.get(name) else {
                continue;
            };

            match &ty.kind {
                TypeKind::Object(object)
                | TypeKind::Interface(object)
                | TypeKind::RootOperation(_, object) => {
                    for field in &object.fields {
                        queue.push_back(field.ty.base_name());
                        queue.extend(field.arguments.iter().map(|a| a.ty.base_name()));
                    }
                    if matches!(ty.kind, TypeKind::Interface(_)) {
                        queue.extend(self.graph.implementors(name).map(|t| t.name.as_str()));
                    }
                }
                TypeKind::Union(union) => queue.extend(union.members.iter().map(String::as_str)),
                TypeKind::InputObject(input) => {
                    queue.extend(input.fields.iter().map(|f| f.ty.base_name()));
                }
                TypeKind::Enum(_) | TypeKind::Scalar(_) => {}
            }
        }

        seen
    }
}

/// Returns true if `field` can be served by echoing the parent model's
/// member of the same name.
///
/// An optional member may be `undefined`, so it only backs nullable fields.
pub fn is_echo_field(field: &Field, parent: &ModelShape) -> bool {
    if field.has_arguments() {
        return false;
    }
    parent
        .member(&field.name)
        .is_some_and(|member| !member.optional || field.ty.nullable)
}
