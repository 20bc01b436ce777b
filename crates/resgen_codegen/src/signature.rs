//! Resolver signature planning.
//!
//! Decides, for every type with resolvers, which host type flows in as the
//! parent, what each field's arguments and return type look like, and which
//! fields are satisfied by echoing a model member.

use crate::imports::{import_specifier, ImportTable};
use crate::CodegenError;
use heck::ToUpperCamelCase;
use resgen_core::Language;
use resgen_resolver::{ModelShape, ResolvedModel, ResolvedModels};
use resgen_schema::{Argument, ScalarMap, SchemaGraph, SchemaType, TypeKind, TypeRef, TypeRefKind};
use resgen_semantic::is_echo_field;
use rustc_hash::{FxHashMap, FxHashSet};
use std::path::Path;

pub const NO_ARGS: &str = "NoArgs";
pub const ROOT_VALUE: &str = "RootValue";
pub const EMPTY_CONTEXT: &str = "EmptyContext";
pub const RESOLVERS: &str = "Resolvers";
pub const RESOLVE_INFO: &str = "GraphQLResolveInfo";

/// An argument of a resolver field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentPlan {
    pub name: String,
    pub ty: String,
    /// Nullable or defaulted arguments may be omitted.
    pub optional: bool,
}

/// Signature of one field resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPlan {
    pub name: String,
    pub arguments: Vec<ArgumentPlan>,
    /// `Args<Field>` for fields with arguments, otherwise [`NO_ARGS`].
    pub args_type: String,
    pub resolver_type: String,
    pub return_type: String,
    /// Served by the parent's member of the same name.
    pub echo: bool,
    /// The echoed member is optional; `undefined` is passed on as `null`.
    pub optional_member: bool,
}

impl FieldPlan {
    pub fn has_arguments(&self) -> bool {
        !self.arguments.is_empty()
    }
}

/// How the parent of a type's resolvers is typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParentKind {
    /// A bound model, by local import name.
    Model,
    /// A shape generated into the typings from the schema fields.
    DefaultShape,
    /// An unbound root operation type.
    Root,
}

/// Resolver signatures for one object, interface or root type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypePlan {
    pub name: String,
    pub parent: String,
    pub parent_kind: ParentKind,
    pub fields: Vec<FieldPlan>,
}

impl TypePlan {
    /// Name of the generated namespace.
    pub fn namespace(&self) -> String {
        format!("{}Resolvers", self.name)
    }

    pub fn echo_fields(&self) -> impl Iterator<Item = &FieldPlan> {
        self.fields.iter().filter(|f| f.echo)
    }

    /// Fields that need a hand-written resolver.
    pub fn implemented_fields(&self) -> impl Iterator<Item = &FieldPlan> {
        self.fields.iter().filter(|f| !f.echo)
    }
}

/// Everything the typings and scaffold renderers need.
#[derive(Debug)]
pub struct ResolverPlan {
    pub imports: ImportTable,
    /// Local name of the context model, or [`EMPTY_CONTEXT`].
    pub context: String,
    pub has_context: bool,
    pub types: Vec<TypePlan>,
    /// Host type of every object-like type, keyed by schema name.
    pub parents: FxHashMap<String, String>,
}

/// Builds a [`ResolverPlan`].
pub struct Planner<'a> {
    graph: &'a SchemaGraph,
    models: &'a ResolvedModels,
    scalars: &'a ScalarMap,
    language: Language,
}

impl<'a> Planner<'a> {
    pub fn new(
        graph: &'a SchemaGraph,
        models: &'a ResolvedModels,
        scalars: &'a ScalarMap,
        language: Language,
    ) -> Self {
        Self {
            graph,
            models,
            scalars,
            language,
        }
    }

    /// Plans the resolvers for a typings module written to `typings_path`.
    pub fn plan(&self, typings_path: &Path) -> Result<ResolverPlan, CodegenError> {
        let typings_dir = typings_path.parent().unwrap_or(Path::new(""));
        let mut imports = ImportTable::new(self.generated_names(self.models.context.is_some())?);

        let context = match &self.models.context {
            None => None,
            Some(ResolvedModel::Resolved(shape)) => {
                let specifier = import_specifier(typings_dir, &shape.file, self.language);
                Some(imports.import(&specifier, &shape.symbol, "Context"))
            }
            Some(ResolvedModel::Unresolved { reference, .. }) => {
                return Err(CodegenError::Invariant(format!(
                    "context `{reference}` is unresolved"
                )));
            }
        };

        let mut parents = FxHashMap::default();
        for ty in self.graph.user_types().filter(|t| t.has_resolvers()) {
            let parent = match self.models.get(&ty.name) {
                Some(ResolvedModel::Resolved(shape)) => {
                    let specifier = import_specifier(typings_dir, &shape.file, self.language);
                    imports.import(&specifier, &shape.symbol, &ty.name)
                }
                Some(ResolvedModel::Unresolved { reference, .. }) => {
                    return Err(CodegenError::Invariant(format!(
                        "model `{reference}` for {} is unresolved",
                        ty.name
                    )));
                }
                None if ty.is_root() => ROOT_VALUE.to_string(),
                None => ty.name.clone(),
            };
            parents.insert(ty.name.clone(), parent);
        }

        let mut plan = ResolverPlan {
            imports,
            has_context: context.is_some(),
            context: context.unwrap_or_else(|| EMPTY_CONTEXT.to_string()),
            types: Vec::new(),
            parents,
        };

        for ty in self.graph.user_types().filter(|t| t.has_resolvers()) {
            let type_plan = self.plan_type(ty, &plan)?;
            plan.types.push(type_plan);
        }

        Ok(plan)
    }

    /// Top-level names declared by the typings module, which imports must
    /// not shadow. A name declared twice is a [`CodegenError::NameConflict`].
    fn generated_names(&self, has_context: bool) -> Result<Vec<String>, CodegenError> {
        let mut names: Vec<String> = [NO_ARGS, ROOT_VALUE, RESOLVERS, RESOLVE_INFO]
            .iter()
            .map(|s| s.to_string())
            .collect();
        if !has_context {
            names.push(EMPTY_CONTEXT.to_string());
        }

        for ty in self.graph.user_types() {
            match &ty.kind {
                TypeKind::Enum(_) | TypeKind::Union(_) | TypeKind::InputObject(_) => {
                    names.push(ty.name.clone());
                }
                TypeKind::Object(_) | TypeKind::Interface(_) if ty.has_resolvers() => {
                    if !self.models.is_bound(&ty.name) {
                        names.push(ty.name.clone());
                    }
                    names.push(format!("{}Resolvers", ty.name));
                }
                TypeKind::RootOperation(..) if ty.has_resolvers() => {
                    names.push(format!("{}Resolvers", ty.name));
                }
                _ => {}
            }
        }

        let mut seen = FxHashSet::default();
        for name in &names {
            if !seen.insert(name.as_str()) {
                return Err(CodegenError::NameConflict { name: name.clone() });
            }
        }
        Ok(names)
    }

    fn plan_type(&self, ty: &SchemaType, plan: &ResolverPlan) -> Result<TypePlan, CodegenError> {
        let parent = plan
            .parents
            .get(&ty.name)
            .cloned()
            .ok_or_else(|| CodegenError::Invariant(format!("no parent type for {}", ty.name)))?;

        let shape: Option<&ModelShape> = self.models.shape(&ty.name);
        let parent_kind = match shape {
            Some(_) => ParentKind::Model,
            None if ty.is_root() => ParentKind::Root,
            None => ParentKind::DefaultShape,
        };

        let mut used_names = FxHashSet::default();
        let mut fields = Vec::with_capacity(ty.fields().len());

        for field in ty.fields() {
            let base = unique_name(&field.name.to_upper_camel_case(), &mut used_names);
            let arguments = field
                .arguments
                .iter()
                .map(|argument| self.plan_argument(argument, plan))
                .collect::<Result<Vec<_>, _>>()?;

            let echo = match (&parent_kind, shape) {
                (ParentKind::Model, Some(shape)) => is_echo_field(field, shape),
                (ParentKind::DefaultShape, _) => !field.has_arguments(),
                _ => false,
            };
            let optional_member = echo
                && shape
                    .and_then(|shape| shape.member(&field.name))
                    .is_some_and(|member| member.optional);

            fields.push(FieldPlan {
                name: field.name.clone(),
                args_type: if arguments.is_empty() {
                    NO_ARGS.to_string()
                } else {
                    format!("Args{base}")
                },
                arguments,
                resolver_type: format!("{base}Resolver"),
                return_type: self.render_type(&field.ty, plan)?,
                echo,
                optional_member,
            });
        }

        Ok(TypePlan {
            name: ty.name.clone(),
            parent,
            parent_kind,
            fields,
        })
    }

    fn plan_argument(
        &self,
        argument: &Argument,
        plan: &ResolverPlan,
    ) -> Result<ArgumentPlan, CodegenError> {
        Ok(ArgumentPlan {
            name: argument.name.clone(),
            ty: self.render_type(&argument.ty, plan)?,
            optional: argument.ty.nullable || argument.has_default,
        })
    }

    /// Renders a schema type reference as a host type.
    pub fn render_type(&self, ty: &TypeRef, plan: &ResolverPlan) -> Result<String, CodegenError> {
        let inner = match &ty.kind {
            TypeRefKind::Named(name) => self.render_named(name, plan)?,
            TypeRefKind::List(item) => format!("Array<{}>", self.render_type(item, plan)?),
        };
        Ok(if ty.nullable {
            format!("{inner} | null")
        } else {
            inner
        })
    }

    fn render_named(&self, name: &str, plan: &ResolverPlan) -> Result<String, CodegenError> {
        let ty = self
            .graph
            .get(name)
            .ok_or_else(|| CodegenError::Invariant(format!("undefined type `{name}`")))?;

        match &ty.kind {
            TypeKind::Scalar(_) => self
                .scalars
                .get(name)
                .map(str::to_string)
                .ok_or_else(|| CodegenError::Invariant(format!("unmapped scalar `{name}`"))),
            TypeKind::Enum(_) | TypeKind::Union(_) | TypeKind::InputObject(_) => Ok(name.to_string()),
            TypeKind::Object(_) | TypeKind::Interface(_) | TypeKind::RootOperation(..) => plan
                .parents
                .get(name)
                .cloned()
                .ok_or_else(|| CodegenError::Invariant(format!("no parent type for `{name}`"))),
        }
    }
}

fn unique_name(base: &str, used: &mut FxHashSet<String>) -> String {
    let mut candidate = base.to_string();
    let mut n = 2;
    while !used.insert(candidate.clone()) {
        candidate = format!("{base}{n}");
        n += 1;
    }
    candidate
}
