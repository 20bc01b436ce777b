//! Resolver scaffolding.
//!
//! Scaffolds are starting points for hand-written resolvers: they are only
//! ever created, never overwritten.

use crate::emit::Artifact;
use crate::imports::import_specifier;
use crate::signature::{ResolverPlan, TypePlan, RESOLVERS};
use crate::writer::Writer;
use crate::CodegenError;
use indexmap::IndexMap;
use resgen_core::Language;
use rustc_hash::FxHashSet;
use std::path::{Path, PathBuf};

pub const SCAFFOLD_HEADER: &str =
    "// Scaffolded by resgen. This file is yours to edit; it is only written when missing.";

/// How scaffold files are laid out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ScaffoldLayout {
    /// One `<Type>.ts` per type.
    #[default]
    FilePerType,
    /// One `<group>.ts` per named group of types. Types in no group get
    /// their own file.
    Grouped(IndexMap<String, Vec<String>>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaffoldOptions {
    pub output_dir: PathBuf,
    pub layout: ScaffoldLayout,
}

impl ScaffoldOptions {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            layout: ScaffoldLayout::default(),
        }
    }

    #[must_use]
    pub fn with_layout(mut self, layout: ScaffoldLayout) -> Self {
        self.layout = layout;
        self
    }
}

/// Splits the planned types into files, in a stable order.
fn partition<'p>(plan: &'p ResolverPlan, layout: &ScaffoldLayout) -> Vec<(String, Vec<&'p TypePlan>)> {
    let find = |name: &str| plan.types.iter().find(|t| t.name == name);

    match layout {
        ScaffoldLayout::FilePerType => plan
            .types
            .iter()
            .map(|t| (t.name.clone(), vec![t]))
            .collect(),
        ScaffoldLayout::Grouped(groups) => {
            let mut files: Vec<(String, Vec<&TypePlan>)> = Vec::new();
            let mut placed: Vec<&str> = Vec::new();

            for (group, members) in groups {
                let mut types = Vec::new();
                for member in members {
                    match find(member) {
                        Some(t) if !placed.contains(&t.name.as_str()) => {
                            placed.push(t.name.as_str());
                            types.push(t);
                        }
                        Some(_) => {
                            tracing::warn!(%group, type_name = %member, "type already scaffolded in an earlier group");
                        }
                        None => {
                            tracing::warn!(%group, type_name = %member, "grouped type has no resolvers");
                        }
                    }
                }
                if !types.is_empty() {
                    files.push((group.clone(), types));
                }
            }

            for t in &plan.types {
                if !placed.contains(&t.name.as_str()) {
                    files.push((t.name.clone(), vec![t]));
                }
            }
            files
        }
    }
}

/// Renders the scaffold files and the aggregating `index` module.
///
/// File names are compared case-insensitively, so a group can't take the
/// name of another group, an ungrouped type or the index.
pub fn render_scaffolds(
    plan: &ResolverPlan,
    options: &ScaffoldOptions,
    typings_path: &Path,
    language: Language,
) -> Result<Vec<Artifact>, CodegenError> {
    let typings = import_specifier(&options.output_dir, typings_path, language);
    let files = partition(plan, &options.layout);

    let mut taken = FxHashSet::default();
    taken.insert(language.index_file().to_lowercase());

    let mut artifacts = Vec::with_capacity(files.len() + 1);
    for (stem, types) in &files {
        let file = format!("{stem}.{}", language.extension());
        if !taken.insert(file.to_lowercase()) {
            return Err(CodegenError::ScaffoldConflict { file });
        }
        let path = options.output_dir.join(&file);
        artifacts.push(Artifact::scaffold(path, render_file(types, &typings)));
    }

    let index = options.output_dir.join(language.index_file());
    artifacts.push(Artifact::scaffold(index, render_index(&files, &typings)));
    Ok(artifacts)
}

fn render_file(types: &[&TypePlan], typings: &str) -> String {
    let mut w = Writer::new();
    w.line(SCAFFOLD_HEADER);
    w.blank();

    let namespaces: Vec<_> = types.iter().map(|t| t.namespace()).collect();
    w.line(format!(
        "import {{ {} }} from \"{typings}\";",
        namespaces.join(", ")
    ));
    w.blank();

    for plan in types {
        write_stub(&mut w, plan);
        w.blank();
    }
    w.finish()
}

/// Writes the stub object for one type.
fn write_stub(w: &mut Writer, plan: &TypePlan) {
    let namespace = plan.namespace();
    w.line(format!("export const {}: {namespace}.Type = {{", plan.name));
    w.indent();
    w.line(format!("...{namespace}.defaultResolvers,"));

    for field in plan.implemented_fields() {
        let args = if field.has_arguments() {
            let members: Vec<_> = field
                .arguments
                .iter()
                .map(|a| {
                    let optional = if a.optional { "?" } else { "" };
                    format!("{}{optional}: {}", a.name, a.ty)
                })
                .collect();
            format!("args: {{ {} }}", members.join(", "))
        } else {
            "args".to_string()
        };

        w.line(format!("{}: (parent, {args}, ctx, info) => {{", field.name));
        w.indent();
        w.line(format!(
            "throw new Error(\"Resolver not implemented: {}.{}\");",
            plan.name, field.name
        ));
        w.dedent();
        w.line("},");
    }

    w.dedent();
    w.line("};");
}

fn render_index(files: &[(String, Vec<&TypePlan>)], typings: &str) -> String {
    let mut w = Writer::new();
    w.line(SCAFFOLD_HEADER);
    w.blank();
    w.line(format!("import {{ {RESOLVERS} }} from \"{typings}\";"));
    for (stem, types) in files {
        let names: Vec<_> = types.iter().map(|t| t.name.as_str()).collect();
        w.line(format!("import {{ {} }} from \"./{stem}\";", names.join(", ")));
    }
    w.blank();

    w.line(format!("export const resolvers: {RESOLVERS} = {{"));
    w.indent();
    for (_, types) in files {
        for t in types {
            w.line(format!("{},", t.name));
        }
    }
    w.dedent();
    w.line("};");
    w.finish()
}
