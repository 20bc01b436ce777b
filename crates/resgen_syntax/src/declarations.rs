//! Top-level declarations of a TypeScript module.
//!
//! Model files are parsed with `swc_ecma_parser`. Only the module's own
//! top-level interfaces and type aliases are read; member types are kept as
//! the source text they were written as, never evaluated.

use crate::extract::{DeclarationKind, DeclaredShape, ShapeMember};
use std::path::Path;
use swc_common::{BytePos, FileName, SourceMap, Spanned};
use swc_ecma_ast::{
    Decl, DefaultDecl, ExportSpecifier, Expr, Lit, ModuleDecl, ModuleExportName, ModuleItem, Stmt,
    TsInterfaceDecl, TsType, TsTypeAliasDecl, TsTypeAnn, TsTypeElement,
};
use swc_ecma_parser::{Parser, StringInput, Syntax, TsSyntax};

/// Type text used for members declared without an annotation.
const IMPLICIT_ANY: &str = "any";

/// A parse error, with a 1-based position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

/// Declarations found in one module.
#[derive(Debug, Clone, Default)]
pub struct ParsedModule {
    /// Interfaces and type aliases, in source order.
    pub declarations: Vec<DeclaredShape>,
    /// Recovered errors, and the fatal one if parsing gave up.
    pub errors: Vec<SyntaxError>,
    /// Whether the module parsed to the end.
    pub complete: bool,
}

impl ParsedModule {
    /// Returns the first declaration named `name`.
    pub fn find(&self, name: &str) -> Option<&DeclaredShape> {
        self.declarations.iter().find(|d| d.name == name)
    }
}

/// Parses `source` as a TypeScript module and collects its declarations.
///
/// A module that fails to parse yields no declarations; the error is
/// recorded instead.
pub fn parse_declarations(source: &str, path: &Path) -> ParsedModule {
    let cm: SourceMap = Default::default();
    let fm = cm.new_source_file(FileName::Real(path.to_path_buf()).into(), source.to_string());
    let text = SourceText {
        text: source,
        start: fm.start_pos,
    };

    let syntax = Syntax::Typescript(TsSyntax {
        tsx: false,
        decorators: true,
        dts: path.to_string_lossy().ends_with(".d.ts"),
        ..Default::default()
    });
    let mut parser = Parser::new(syntax, StringInput::from(&*fm), None);

    let parsed = parser.parse_module();
    let mut errors: Vec<_> = parser
        .take_errors()
        .iter()
        .map(|err| text.error(err))
        .collect();

    let module = match parsed {
        Ok(module) => module,
        Err(err) => {
            errors.push(text.error(&err));
            return ParsedModule {
                declarations: Vec::new(),
                errors,
                complete: false,
            };
        }
    };

    let mut declarations = Vec::new();
    let mut exported_names = Vec::new();

    for item in &module.body {
        match item {
            ModuleItem::Stmt(Stmt::Decl(decl)) => {
                declarations.extend(text.declaration(decl, false, path));
            }
            ModuleItem::ModuleDecl(ModuleDecl::ExportDecl(export)) => {
                declarations.extend(text.declaration(&export.decl, true, path));
            }
            // Default exports can't be imported by name.
            ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultDecl(export)) => {
                if let DefaultDecl::TsInterfaceDecl(decl) = &export.decl {
                    declarations.push(text.interface(decl, false, path));
                }
            }
            ModuleItem::ModuleDecl(ModuleDecl::ExportNamed(named)) if named.src.is_none() => {
                for specifier in &named.specifiers {
                    let ExportSpecifier::Named(specifier) = specifier else {
                        continue;
                    };
                    let ModuleExportName::Ident(orig) = &specifier.orig else {
                        continue;
                    };
                    let same_name = match &specifier.exported {
                        None => true,
                        Some(ModuleExportName::Ident(exported)) => exported.sym == orig.sym,
                        Some(_) => false,
                    };
                    if same_name {
                        exported_names.push(orig.sym.to_string());
                    }
                }
            }
            _ => {}
        }
    }

    for declaration in &mut declarations {
        if exported_names.contains(&declaration.name) {
            declaration.exported = true;
        }
    }

    ParsedModule {
        declarations,
        errors,
        complete: true,
    }
}

/// The module source, addressed by swc byte positions.
struct SourceText<'a> {
    text: &'a str,
    start: BytePos,
}

impl<'a> SourceText<'a> {
    fn slice(&self, lo: BytePos, hi: BytePos) -> &'a str {
        let lo = lo.0.saturating_sub(self.start.0) as usize;
        let hi = hi.0.saturating_sub(self.start.0) as usize;
        self.text.get(lo..hi).unwrap_or_default()
    }

    fn error(&self, err: &swc_ecma_parser::error::Error) -> SyntaxError {
        let offset = err.span().lo.0.saturating_sub(self.start.0) as usize;
        let prefix = self.text.get(..offset).unwrap_or(self.text);
        let line = prefix.matches('\n').count() + 1;
        let column = match prefix.rfind('\n') {
            Some(newline) => prefix.len() - newline,
            None => prefix.len() + 1,
        };
        SyntaxError {
            message: err.kind().msg().into_owned(),
            line,
            column,
        }
    }

    fn declaration(&self, decl: &Decl, exported: bool, path: &Path) -> Option<DeclaredShape> {
        match decl {
            Decl::TsInterface(decl) => Some(self.interface(decl, exported, path)),
            Decl::TsTypeAlias(decl) => Some(self.type_alias(decl, exported, path)),
            _ => None,
        }
    }

    fn interface(&self, decl: &TsInterfaceDecl, exported: bool, path: &Path) -> DeclaredShape {
        DeclaredShape {
            name: decl.id.sym.to_string(),
            kind: DeclarationKind::Interface,
            members: self.members(&decl.body.body),
            exported,
            path: path.to_path_buf(),
        }
    }

    /// Only object literal aliases have members.
    fn type_alias(&self, decl: &TsTypeAliasDecl, exported: bool, path: &Path) -> DeclaredShape {
        let members = match &*decl.type_ann {
            TsType::TsTypeLit(literal) => self.members(&literal.members),
            _ => Vec::new(),
        };
        DeclaredShape {
            name: decl.id.sym.to_string(),
            kind: DeclarationKind::TypeAlias,
            members,
            exported,
            path: path.to_path_buf(),
        }
    }

    fn members(&self, elements: &[TsTypeElement]) -> Vec<ShapeMember> {
        elements.iter().filter_map(|e| self.member(e)).collect()
    }

    /// Index, call and construct signatures, setters and computed keys are
    /// not named members.
    fn member(&self, element: &TsTypeElement) -> Option<ShapeMember> {
        match element {
            TsTypeElement::TsPropertySignature(property) if !property.computed => {
                Some(ShapeMember {
                    name: self.key_name(&property.key)?,
                    type_text: self.annotation(property.type_ann.as_deref()),
                    optional: property.optional,
                })
            }
            TsTypeElement::TsGetterSignature(getter) if !getter.computed => Some(ShapeMember {
                name: self.key_name(&getter.key)?,
                type_text: self.annotation(getter.type_ann.as_deref()),
                optional: false,
            }),
            TsTypeElement::TsMethodSignature(method) if !method.computed => {
                let name = self.key_name(&method.key)?;
                let params_end = method
                    .type_ann
                    .as_deref()
                    .map_or(method.span.hi, |ann| ann.type_ann.span().lo);
                let params = self.slice(method.key.span().hi, params_end).trim();
                let params = params.strip_prefix('?').unwrap_or(params).trim_start();
                let params = params
                    .trim_end_matches([';', ','])
                    .trim_end()
                    .trim_end_matches(':')
                    .trim_end();
                Some(ShapeMember {
                    name,
                    type_text: format!(
                        "{} => {}",
                        normalize(params),
                        self.annotation(method.type_ann.as_deref())
                    ),
                    optional: method.optional,
                })
            }
            _ => None,
        }
    }

    fn key_name(&self, key: &Expr) -> Option<String> {
        match key {
            Expr::Ident(ident) => Some(ident.sym.to_string()),
            Expr::Lit(Lit::Str(string)) => Some(string.value.to_string()),
            Expr::Lit(Lit::Num(number)) => Some(self.slice(number.span.lo, number.span.hi).to_string()),
            _ => None,
        }
    }

    fn annotation(&self, annotation: Option<&TsTypeAnn>) -> String {
        match annotation {
            Some(annotation) => {
                let span = annotation.type_ann.span();
                normalize(self.slice(span.lo, span.hi))
            }
            None => IMPLICIT_ANY.to_string(),
        }
    }
}

/// Collapses whitespace runs and drops a leading union or intersection bar.
fn normalize(text: &str) -> String {
    let text = text.trim_start();
    let text = text
        .strip_prefix('|')
        .or_else(|| text.strip_prefix('&'))
        .unwrap_or(text);
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn parse(source: &str) -> ParsedModule {
        parse_declarations(source, Path::new("models.ts"))
    }

    fn member_types(module: &ParsedModule, name: &str) -> Vec<(String, String, bool)> {
        module
            .find(name)
            .unwrap()
            .members
            .iter()
            .map(|m| (m.name.clone(), m.type_text.clone(), m.optional))
            .collect()
    }

    #[test]
    fn test_interface_members() {
        let module = parse(indoc! {r#"
            export interface User {
              id: string
              readonly name?: string;
              "display-name": string,
              tags: Array<
                string
              >;
              friends(first: number): User[];
              onChange?(value: string): void;
              get age(): number;
              set age(value: number);
              [key: string]: unknown;
              (): void;
              new (x: number): User;
            }
        "#});
        assert!(module.complete);
        assert!(module.errors.is_empty(), "{:?}", module.errors);

        let user = module.find("User").unwrap();
        assert_eq!(user.kind, DeclarationKind::Interface);
        assert!(user.exported);
        assert_eq!(
            member_types(&module, "User"),
            vec![
                ("id".into(), "string".into(), false),
                ("name".into(), "string".into(), true),
                ("display-name".into(), "string".into(), false),
                ("tags".into(), "Array< string >".into(), false),
                ("friends".into(), "(first: number) => User[]".into(), false),
                ("onChange".into(), "(value: string) => void".into(), true),
                ("age".into(), "number".into(), false),
            ]
        );
    }

    #[test]
    fn test_type_aliases() {
        let module = parse(indoc! {r#"
            type Post = { title: string; body?: string };
            export type Id = string | number;
            declare interface Ambient { x: number }
        "#});

        let post = module.find("Post").unwrap();
        assert_eq!(post.kind, DeclarationKind::TypeAlias);
        assert!(!post.exported);
        assert_eq!(
            member_types(&module, "Post"),
            vec![
                ("title".into(), "string".into(), false),
                ("body".into(), "string".into(), true),
            ]
        );

        let id = module.find("Id").unwrap();
        assert!(id.exported);
        assert!(id.members.is_empty());
        assert!(module.find("Ambient").is_some());
    }

    #[test]
    fn test_regex_literals_do_not_hide_declarations() {
        let module = parse("const re = /{/\nexport interface User { id: string }\nconst other = /[}]/g;\ninterface After { ok: boolean }\n");
        assert!(module.complete);
        assert_eq!(member_types(&module, "User"), vec![("id".into(), "string".into(), false)]);
        assert!(module.find("After").is_some());
    }

    #[test]
    fn test_only_top_level_declarations() {
        let module = parse(indoc! {r#"
            import type { Db } from "./db";

            function make() {
              interface Inner { a: string }
            }

            declare module "lib" {
              interface Nested { b: string }
            }

            export namespace Space {
              export interface Namespaced { c: string }
            }

            class Service {
              run(): void {}
            }

            interface Outer { d: string }
        "#});
        let names: Vec<_> = module.declarations.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Outer"]);
    }

    #[test]
    fn test_export_lists_and_defaults() {
        let module = parse(indoc! {r#"
            interface Listed { a: string }
            interface Renamed { b: string }
            interface Hidden { c: string }
            export default interface Default { d: string }
            export { Listed, Renamed as Other };
            export { Hidden } from "./elsewhere";
        "#});

        assert!(module.find("Listed").unwrap().exported);
        assert!(!module.find("Renamed").unwrap().exported);
        assert!(!module.find("Hidden").unwrap().exported);
        assert!(!module.find("Default").unwrap().exported);
    }

    #[test]
    fn test_first_declaration_wins() {
        let module = parse("interface User { a: string }\ninterface User { b: string }\n");
        assert_eq!(member_types(&module, "User"), vec![("a".into(), "string".into(), false)]);
    }

    #[test]
    fn test_unparseable_module() {
        let module = parse("export interface User {\n  id: string\n");
        assert!(!module.complete);
        assert!(module.declarations.is_empty());
        let error = module.errors.last().unwrap();
        assert!(error.line >= 2);
        assert!(!error.message.is_empty());
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  | \"a\"\n  | \"b\""), "\"a\" | \"b\"");
        assert_eq!(normalize("Record<\n  string,\n  number\n>"), "Record< string, number >");
    }
}
