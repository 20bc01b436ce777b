//! The typings module.

use crate::signature::*;
use crate::writer::Writer;
use crate::CodegenError;
use resgen_schema::{SchemaGraph, TypeKind};

pub const TYPINGS_HEADER: &str = "// Code generated by resgen, DO NOT EDIT.";

/// Renders the typings module for a plan.
pub fn render_typings(
    graph: &SchemaGraph,
    planner: &Planner<'_>,
    plan: &ResolverPlan,
) -> Result<String, CodegenError> {
    let mut w = Writer::new();

    w.line(TYPINGS_HEADER);
    w.blank();
    w.line(format!("import {{ {RESOLVE_INFO} }} from \"graphql\";"));
    plan.imports.write(&mut w);
    w.blank();

    w.line(format!("export type {NO_ARGS} = Record<string, never>;"));
    w.line(format!("export type {ROOT_VALUE} = Record<string, unknown>;"));
    if !plan.has_context {
        w.line(format!("export type {EMPTY_CONTEXT} = Record<string, never>;"));
    }
    w.blank();

    write_schema_types(&mut w, graph, planner, plan)?;

    for type_plan in &plan.types {
        write_namespace(&mut w, type_plan, &plan.context);
        w.blank();
    }

    w.line(format!("export interface {RESOLVERS} {{"));
    w.indent();
    for type_plan in &plan.types {
        w.line(format!("{}: {}.Type;", type_plan.name, type_plan.namespace()));
    }
    w.dedent();
    w.line("}");

    Ok(w.finish())
}

/// Enums, unions, input objects and default shapes.
fn write_schema_types(
    w: &mut Writer,
    graph: &SchemaGraph,
    planner: &Planner<'_>,
    plan: &ResolverPlan,
) -> Result<(), CodegenError> {
    for ty in graph.user_types() {
        match &ty.kind {
            TypeKind::Enum(enum_type) => {
                let values: Vec<_> = enum_type.values.iter().map(|v| format!("\"{v}\"")).collect();
                let body = if values.is_empty() {
                    "never".to_string()
                } else {
                    values.join(" | ")
                };
                w.line(format!("export type {} = {body};", ty.name));
                w.blank();
            }
            TypeKind::Union(union) => {
                let members = union
                    .members
                    .iter()
                    .map(|member| {
                        plan.parents.get(member).cloned().ok_or_else(|| {
                            CodegenError::Invariant(format!(
                                "union {} member `{member}` has no host type",
                                ty.name
                            ))
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                let body = if members.is_empty() {
                    "never".to_string()
                } else {
                    members.join(" | ")
                };
                w.line(format!("export type {} = {body};", ty.name));
                w.blank();
            }
            TypeKind::InputObject(input) => {
                w.line(format!("export interface {} {{", ty.name));
                w.indent();
                for field in &input.fields {
                    let optional = if field.ty.nullable || field.has_default { "?" } else { "" };
                    w.line(format!(
                        "{}{optional}: {};",
                        field.name,
                        planner.render_type(&field.ty, plan)?
                    ));
                }
                w.dedent();
                w.line("}");
                w.blank();
            }
            _ => {}
        }
    }

    for type_plan in plan.types.iter().filter(|t| t.parent_kind == ParentKind::DefaultShape) {
        w.line(format!("export interface {} {{", type_plan.parent));
        w.indent();
        for field in &type_plan.fields {
            w.line(format!("{}: {};", field.name, field.return_type));
        }
        w.dedent();
        w.line("}");
        w.blank();
    }

    Ok(())
}

fn write_namespace(w: &mut Writer, plan: &TypePlan, context: &str) {
    w.line(format!("export namespace {} {{", plan.namespace()));
    w.indent();

    if plan.echo_fields().next().is_none() {
        w.line("export const defaultResolvers = {};");
    } else {
        w.line("export const defaultResolvers = {");
        w.indent();
        for field in plan.echo_fields() {
            let coalesce = if field.optional_member { " ?? null" } else { "" };
            w.line(format!(
                "{name}: (parent: {parent}) => parent.{name}{coalesce},",
                name = field.name,
                parent = plan.parent
            ));
        }
        w.dedent();
        w.line("};");
    }

    for field in &plan.fields {
        if field.has_arguments() {
            w.blank();
            w.line(format!("export interface {} {{", field.args_type));
            w.indent();
            for argument in &field.arguments {
                let optional = if argument.optional { "?" } else { "" };
                w.line(format!("{}{optional}: {};", argument.name, argument.ty));
            }
            w.dedent();
            w.line("}");
        }

        w.blank();
        w.line(format!("export type {} = (", field.resolver_type));
        w.indent();
        w.line(format!("parent: {},", plan.parent));
        w.line(format!("args: {},", field.args_type));
        w.line(format!("ctx: {context},"));
        w.line(format!("info: {RESOLVE_INFO},"));
        w.dedent();
        w.line(format!(
            ") => {ret} | Promise<{ret}>;",
            ret = field.return_type
        ));
    }

    w.blank();
    w.line("export interface Type {");
    w.indent();
    for field in &plan.fields {
        w.line(format!("{}: {};", field.name, field.resolver_type));
    }
    w.dedent();
    w.line("}");

    w.dedent();
    w.line("}");
}
