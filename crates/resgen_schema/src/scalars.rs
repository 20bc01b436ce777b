//! Mapping from schema scalars to host-language types.

use indexmap::IndexMap;

/// Built-in scalars and the TypeScript types they map to.
pub const BUILTIN_SCALARS: [(&str, &str); 5] = [
    ("Int", "number"),
    ("Float", "number"),
    ("String", "string"),
    ("ID", "string"),
    ("Boolean", "boolean"),
];

/// Scalar mapping table: built-in scalars plus configured custom ones.
#[derive(Debug, Clone, Default)]
pub struct ScalarMap {
    custom: IndexMap<String, String>,
}

impl ScalarMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps a custom scalar to a host type. Built-in mappings can't be overridden.
    pub fn insert(&mut self, scalar: impl Into<String>, host_type: impl Into<String>) {
        self.custom.insert(scalar.into(), host_type.into());
    }

    /// Returns the built-in host type for `scalar`.
    pub fn builtin(scalar: &str) -> Option<&'static str> {
        BUILTIN_SCALARS
            .iter()
            .find(|(name, _)| *name == scalar)
            .map(|(_, host)| *host)
    }

    /// Returns the host type for a built-in or custom scalar.
    pub fn get(&self, scalar: &str) -> Option<&str> {
        Self::builtin(scalar).or_else(|| self.custom.get(scalar).map(String::as_str))
    }

    pub fn is_mapped(&self, scalar: &str) -> bool {
        self.get(scalar).is_some()
    }

    /// Iterates over the custom mappings in insertion order.
    pub fn custom(&self) -> impl Iterator<Item = (&str, &str)> {
        self.custom.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ScalarMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (scalar, host_type) in iter {
            map.insert(scalar, host_type);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_and_custom() {
        let mut map = ScalarMap::new();
        map.insert("DateTime", "Date");
        map.insert("Int", "bigint");

        assert_eq!(map.get("Int"), Some("number"));
        assert_eq!(map.get("ID"), Some("string"));
        assert_eq!(map.get("DateTime"), Some("Date"));
        assert_eq!(map.get("JSON"), None);
        assert!(!map.is_mapped("JSON"));
    }
}
