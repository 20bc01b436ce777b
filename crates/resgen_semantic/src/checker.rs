//! Binding checker.
//!
//! Every check runs over the whole schema and every binding; diagnostics
//! accumulate rather than short-circuit.

use crate::classify::Classifier;
use resgen_core::{Diagnostic, DiagnosticBag, DiagnosticCategory};
use resgen_resolver::{ResolvedModel, ResolvedModels, UnresolvedReason};
use resgen_schema::{ScalarMap, SchemaGraph, SchemaType, TypeKind};
use rustc_hash::FxHashSet;

/// Checks bindings against the schema.
pub struct Checker<'a> {
    graph: &'a SchemaGraph,
    models: &'a ResolvedModels,
    scalars: &'a ScalarMap,
    classifier: Classifier<'a>,
    diagnostics: DiagnosticBag,
}

/// Result of checking.
#[derive(Debug, Default)]
pub struct CheckResult {
    pub diagnostics: DiagnosticBag,
}

impl CheckResult {
    /// Returns true if checking produced no errors. Warnings don't count.
    pub fn is_ok(&self) -> bool {
        !self.diagnostics.has_errors()
    }
}

impl<'a> Checker<'a> {
    pub fn new(graph: &'a SchemaGraph, models: &'a ResolvedModels, scalars: &'a ScalarMap) -> Self {
        Self {
            graph,
            models,
            scalars,
            classifier: Classifier::new(graph, models, scalars),
            diagnostics: DiagnosticBag::new(),
        }
    }

    /// Runs every check.
    pub fn check(mut self) -> CheckResult {
        self.check_type_references();
        self.check_bindings();
        self.check_unbound_types();
        self.check_scalars();
        self.check_context();

        tracing::debug!(
            errors = self.diagnostics.error_count(),
            total = self.diagnostics.len(),
            "checked bindings"
        );

        CheckResult {
            diagnostics: self.diagnostics,
        }
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.add(diagnostic);
    }

    /// Field, argument and member types must name declared types.
    fn check_type_references(&mut self) {
        let graph = self.graph;
        for ty in graph.user_types() {
            let mut undefined = Vec::new();
            match &ty.kind {
                TypeKind::Object(object)
                | TypeKind::Interface(object)
                | TypeKind::RootOperation(_, object) => {
                    for field in &object.fields {
                        undefined.push((Some(&field.name), field.ty.base_name()));
                        for argument in &field.arguments {
                            undefined.push((Some(&field.name), argument.ty.base_name()));
                        }
                    }
                }
                TypeKind::Union(union) => {
                    undefined.extend(union.members.iter().map(|m| (None, m.as_str())));
                }
                TypeKind::InputObject(input) => {
                    undefined.extend(input.fields.iter().map(|f| (Some(&f.name), f.ty.base_name())));
                }
                TypeKind::Enum(_) | TypeKind::Scalar(_) => {}
            }

            undefined.retain(|(_, referenced)| !graph.contains(referenced));
            for (field, referenced) in undefined {
                let mut diagnostic = Diagnostic::error(
                    DiagnosticCategory::UnknownType,
                    format!("references undefined type `{referenced}`"),
                )
                .with_type(&ty.name);
                if let Some(field) = field {
                    diagnostic = diagnostic.with_field(field);
                }
                self.report(diagnostic);
            }
        }
    }

    fn check_bindings(&mut self) {
        let reachable = self.classifier.reachable_types();
        let graph = self.graph;
        let models = self.models;

        for (type_name, model) in models.iter() {
            match graph.get(type_name) {
                None => self.report(
                    Diagnostic::error(
                        DiagnosticCategory::UnknownType,
                        "is bound to a model but is not defined in the schema",
                    )
                    .with_type(type_name),
                ),
                Some(ty) => self.check_binding_kind(ty, &reachable),
            }

            if let ResolvedModel::Resolved(shape) = model {
                if !shape.exported {
                    self.report(
                        Diagnostic::error(
                            DiagnosticCategory::ModelNotExported,
                            format!(
                                "model `{}` is declared in {} but not exported",
                                shape.symbol,
                                shape.file.display()
                            ),
                        )
                        .with_type(type_name),
                    );
                }
            }

            if let ResolvedModel::Unresolved { reference, reason } = model {
                let diagnostic = match reason {
                    UnresolvedReason::PathNotFound(err) => Diagnostic::error(
                        DiagnosticCategory::PathNotFound,
                        format!("cannot resolve model `{reference}`: {err}"),
                    ),
                    UnresolvedReason::SymbolNotFound { file } => Diagnostic::error(
                        DiagnosticCategory::ModelNotFound,
                        format!(
                            "model `{}` is not declared in {}",
                            reference.symbol,
                            file.display()
                        ),
                    ),
                };
                self.report(diagnostic.with_type(type_name));
            }
        }
    }

    fn check_binding_kind(&mut self, ty: &SchemaType, reachable: &FxHashSet<&str>) {
        let diagnostic = match &ty.kind {
            TypeKind::Enum(_) => Diagnostic::error(
                DiagnosticCategory::UnsupportedEnumBinding,
                "enum types cannot be bound to models",
            ),
            TypeKind::Union(_) => Diagnostic::error(
                DiagnosticCategory::UnsupportedUnionBinding,
                "union types cannot be bound to models",
            ),
            TypeKind::InputObject(_) | TypeKind::Scalar(_) => Diagnostic::warning(
                DiagnosticCategory::UnusedBinding,
                format!("{} types are never backed by models", ty.kind.as_str()),
            ),
            TypeKind::Object(_) | TypeKind::Interface(_) if !reachable.contains(ty.name.as_str()) => {
                Diagnostic::warning(
                    DiagnosticCategory::UnusedBinding,
                    "is not reachable from any root operation type",
                )
            }
            _ => return,
        };
        self.report(diagnostic.with_type(&ty.name));
    }

    fn check_unbound_types(&mut self) {
        let graph = self.graph;
        for ty in graph.user_types() {
            let needs_check = matches!(ty.kind, TypeKind::Object(_) | TypeKind::Interface(_))
                && !self.models.is_bound(&ty.name);
            if !needs_check || self.classifier.is_default_resolvable(&ty.name) {
                continue;
            }

            let message = match self.classifier.blocking_field(&ty.name) {
                Some(field) if field.has_arguments() => format!(
                    "has no model, and field `{}` takes arguments so it can't be resolved by default",
                    field.name
                ),
                Some(field) => format!(
                    "has no model, and field `{}` returns `{}` which can't be resolved by default",
                    field.name, field.ty
                ),
                None => "has no model and is part of a cycle of unbound types".to_string(),
            };
            self.report(Diagnostic::error(DiagnosticCategory::MissingModel, message).with_type(&ty.name));
        }
    }

    fn check_scalars(&mut self) {
        let unmapped: Vec<_> = self
            .graph
            .user_types()
            .filter(|t| t.is_scalar() && !self.scalars.is_mapped(&t.name))
            .map(|t| t.name.clone())
            .collect();

        for name in unmapped {
            self.report(
                Diagnostic::error(
                    DiagnosticCategory::UnmappedScalar,
                    "custom scalar has no host type in the scalar mapping",
                )
                .with_type(name),
            );
        }
    }

    fn check_context(&mut self) {
        let models = self.models;
        let diagnostic = match &models.context {
            None => return,
            Some(ResolvedModel::Resolved(shape)) if shape.exported => return,
            Some(ResolvedModel::Resolved(shape)) => Diagnostic::error(
                DiagnosticCategory::ModelNotExported,
                format!(
                    "context `{}` is declared in {} but not exported",
                    shape.symbol,
                    shape.file.display()
                ),
            ),
            Some(ResolvedModel::Unresolved { reference, reason }) => match reason {
                UnresolvedReason::PathNotFound(err) => Diagnostic::error(
                    DiagnosticCategory::PathNotFound,
                    format!("cannot resolve context `{reference}`: {err}"),
                ),
                UnresolvedReason::SymbolNotFound { file } => Diagnostic::error(
                    DiagnosticCategory::SymbolNotFound,
                    format!(
                        "context `{}` is not declared in {}",
                        reference.symbol,
                        file.display()
                    ),
                ),
            },
        };
        self.report(diagnostic);
    }
}

/// Checks bindings against the schema.
pub fn check(graph: &SchemaGraph, models: &ResolvedModels, scalars: &ScalarMap) -> CheckResult {
    Checker::new(graph, models, scalars).check()
}

#[cfg(test)]
mod tests {
    use super::*;
    use resgen_core::DiagnosticCategory as C;
    use resgen_resolver::{ModelReference, ModelShape, PathError};
    use resgen_syntax::ShapeMember;
    use std::path::PathBuf;

    fn resolved(members: &[&str]) -> ResolvedModel {
        ResolvedModel::Resolved(ModelShape {
            symbol: "Model".to_string(),
            file: PathBuf::from("/project/models.ts"),
            members: members
                .iter()
                .map(|name| ShapeMember {
                    name: name.to_string(),
                    type_text: "number".to_string(),
                    optional: false,
                })
                .collect(),
            exported: true,
        })
    }

    fn models(entries: Vec<(&str, ResolvedModel)>) -> ResolvedModels {
        ResolvedModels {
            models: entries
                .into_iter()
                .map(|(name, model)| (name.to_string(), model))
                .collect(),
            context: None,
        }
    }

    fn categories(result: &CheckResult) -> Vec<C> {
        result.diagnostics.iter().map(|d| d.category).collect()
    }

    #[test]
    fn test_valid_bindings() {
        let graph = SchemaGraph::parse("type Query { number: Number } type Number { value: Int! }").unwrap();
        let models = models(vec![("Number", resolved(&["value"]))]);
        let result = check(&graph, &models, &ScalarMap::new());

        assert!(result.is_ok());
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn test_missing_model() {
        let graph = SchemaGraph::parse(
            "type Query { user: User } type User { posts(first: Int): [Post] } type Post { id: ID }",
        )
        .unwrap();
        let result = check(&graph, &ResolvedModels::default(), &ScalarMap::new());

        assert!(!result.is_ok());
        let missing: Vec<_> = result
            .diagnostics
            .of_category(C::MissingModel)
            .map(|d| d.type_name.as_deref().unwrap_or_default())
            .collect();
        assert_eq!(missing, vec!["User"]);
    }

    #[test]
    fn test_enum_binding_is_rejected() {
        let graph = SchemaGraph::parse("type Query { role: Role } enum Role { A B }").unwrap();
        let models = models(vec![("Role", resolved(&[]))]);
        let result = check(&graph, &models, &ScalarMap::new());

        assert!(!result.is_ok());
        assert_eq!(categories(&result), vec![C::UnsupportedEnumBinding]);
    }

    #[test]
    fn test_union_binding_is_rejected() {
        let graph = SchemaGraph::parse(
            "type Query { item: Item } union Item = A | B type A { id: ID } type B { id: ID }",
        )
        .unwrap();
        let models = models(vec![("Item", resolved(&[]))]);
        let result = check(&graph, &models, &ScalarMap::new());

        assert_eq!(categories(&result), vec![C::UnsupportedUnionBinding]);
    }

    #[test]
    fn test_unmapped_scalar() {
        let graph = SchemaGraph::parse("type Query { now: DateTime } scalar DateTime").unwrap();
        let result = check(&graph, &ResolvedModels::default(), &ScalarMap::new());
        assert_eq!(categories(&result), vec![C::UnmappedScalar]);

        let scalars: ScalarMap = [("DateTime", "Date")].into_iter().collect();
        assert!(check(&graph, &ResolvedModels::default(), &scalars).is_ok());
    }

    #[test]
    fn test_unknown_types() {
        let graph = SchemaGraph::parse("type Query { a: Missing }").unwrap();
        let models = models(vec![("Ghost", resolved(&[]))]);
        let result = check(&graph, &models, &ScalarMap::new());

        let unknown: Vec<_> = result
            .diagnostics
            .of_category(C::UnknownType)
            .map(|d| d.subject())
            .collect();
        assert_eq!(unknown, vec!["Query.a", "Ghost"]);
    }

    #[test]
    fn test_unresolved_models() {
        let graph = SchemaGraph::parse("type Query { a: A, b: B } type A { id: ID } type B { id: ID }").unwrap();
        let reference = ModelReference::new("./models", "A");
        let mut models = models(vec![
            (
                "A",
                ResolvedModel::Unresolved {
                    reference: reference.clone(),
                    reason: UnresolvedReason::PathNotFound(PathError::NotFound {
                        attempted: PathBuf::from("/project/models.ts"),
                    }),
                },
            ),
            (
                "B",
                ResolvedModel::Unresolved {
                    reference: ModelReference::new("./types.ts", "B"),
                    reason: UnresolvedReason::SymbolNotFound {
                        file: PathBuf::from("/project/types.ts"),
                    },
                },
            ),
        ]);
        models.context = Some(ResolvedModel::Unresolved {
            reference: ModelReference::new("./types.ts", "Context"),
            reason: UnresolvedReason::SymbolNotFound {
                file: PathBuf::from("/project/types.ts"),
            },
        });

        let result = check(&graph, &models, &ScalarMap::new());
        assert_eq!(
            categories(&result),
            vec![C::PathNotFound, C::ModelNotFound, C::SymbolNotFound]
        );
        let context = result.diagnostics.of_category(C::SymbolNotFound).next().unwrap();
        assert_eq!(context.subject(), "context");
    }

    #[test]
    fn test_unexported_models() {
        let graph = SchemaGraph::parse("type Query { number: Number } type Number { value: Int! }").unwrap();
        let hidden = |symbol: &str| {
            ResolvedModel::Resolved(ModelShape {
                symbol: symbol.to_string(),
                file: PathBuf::from("/project/models.ts"),
                members: Vec::new(),
                exported: false,
            })
        };
        let mut models = models(vec![("Number", hidden("Number"))]);
        models.context = Some(hidden("Context"));

        let result = check(&graph, &models, &ScalarMap::new());
        assert!(!result.is_ok());
        let subjects: Vec<_> = result
            .diagnostics
            .of_category(C::ModelNotExported)
            .map(|d| d.subject())
            .collect();
        assert_eq!(subjects, vec!["Number", "context"]);
    }

    #[test]
    fn test_unused_bindings_are_warnings() {
        let graph = SchemaGraph::parse(
            "type Query { a: Int } type Orphan { id: ID } input Filter { q: String }",
        )
        .unwrap();
        let models = models(vec![
            ("Filter", resolved(&[])),
            ("Orphan", resolved(&["id"])),
        ]);
        let result = check(&graph, &models, &ScalarMap::new());

        assert!(result.is_ok());
        assert_eq!(categories(&result), vec![C::UnusedBinding, C::UnusedBinding]);
    }

    #[test]
    fn test_checks_do_not_short_circuit() {
        let graph = SchemaGraph::parse(
            "type Query { role: Role, user: User, at: Time } enum Role { A } type User { f(x: Int): Int } scalar Time",
        )
        .unwrap();
        let models = models(vec![("Role", resolved(&[]))]);
        let result = check(&graph, &models, &ScalarMap::new());

        for category in [C::UnsupportedEnumBinding, C::MissingModel, C::UnmappedScalar] {
            assert!(result.diagnostics.contains(category), "missing {category}");
        }
    }
}
