//! Module specifiers and the model import table.

use crate::writer::Writer;
use resgen_core::Language;
use rustc_hash::FxHashSet;
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

/// Lexically normalizes a path, dropping `.` and folding `..`.
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let folds = matches!(normalized.components().next_back(), Some(Component::Normal(_)));
                if folds {
                    normalized.pop();
                } else {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Returns `to` relative to the directory `from_dir`.
pub fn relative_path(from_dir: &Path, to: &Path) -> PathBuf {
    let from = normalize(from_dir);
    let to = normalize(to);
    let from: Vec<_> = from.components().collect();
    let to: Vec<_> = to.components().collect();

    let common = from.iter().zip(&to).take_while(|(a, b)| a == b).count();

    let mut relative = PathBuf::new();
    for _ in common..from.len() {
        relative.push("..");
    }
    for component in &to[common..] {
        relative.push(component.as_os_str());
    }
    relative
}

/// Returns the specifier a module in `from_dir` uses to import `target`.
///
/// The source extension and a trailing `/index` are dropped, and sibling
/// paths get a `./` prefix.
pub fn import_specifier(from_dir: &Path, target: &Path, language: Language) -> String {
    let relative = relative_path(from_dir, target);
    let mut specifier = relative
        .to_string_lossy()
        .replace(std::path::MAIN_SEPARATOR, "/");

    let extension = format!(".{}", language.extension());
    if let Some(stripped) = specifier.strip_suffix(&extension) {
        specifier.truncate(stripped.len());
    }
    if !specifier.starts_with("../") && specifier != ".." {
        specifier.insert_str(0, "./");
    }
    if let Some(stripped) = specifier.strip_suffix("/index") {
        specifier.truncate(stripped.len());
    }
    specifier
}

/// Named imports grouped by module, with collision-free local names.
#[derive(Debug, Default)]
pub struct ImportTable {
    modules: BTreeMap<String, BTreeMap<String, String>>,
    taken: FxHashSet<String>,
}

impl ImportTable {
    /// Creates a table that never hands out any of the `reserved` names.
    pub fn new(reserved: impl IntoIterator<Item = String>) -> Self {
        Self {
            modules: BTreeMap::new(),
            taken: reserved.into_iter().collect(),
        }
    }

    /// Imports `symbol` from `specifier` and returns its local name.
    ///
    /// A symbol whose name is taken is aliased to `{alias_base}Model`, with a
    /// numeric suffix if that is taken too.
    pub fn import(&mut self, specifier: &str, symbol: &str, alias_base: &str) -> String {
        if let Some(local) = self.modules.get(specifier).and_then(|m| m.get(symbol)) {
            return local.clone();
        }

        let local = if self.taken.contains(symbol) {
            let base = format!("{alias_base}Model");
            let mut candidate = base.clone();
            let mut n = 2;
            while self.taken.contains(&candidate) {
                candidate = format!("{base}{n}");
                n += 1;
            }
            candidate
        } else {
            symbol.to_string()
        };

        self.taken.insert(local.clone());
        self.modules
            .entry(specifier.to_string())
            .or_default()
            .insert(symbol.to_string(), local.clone());
        local
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Writes one import statement per module, sorted by specifier.
    pub(crate) fn write(&self, w: &mut Writer) {
        for (specifier, symbols) in &self.modules {
            let names: Vec<_> = symbols
                .iter()
                .map(|(symbol, local)| {
                    if symbol == local {
                        symbol.clone()
                    } else {
                        format!("{symbol} as {local}")
                    }
                })
                .collect();
            w.line(format!("import {{ {} }} from \"{specifier}\";", names.join(", ")));
        }
    }
}
