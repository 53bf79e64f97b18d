//! The macro store shared across a source and its includes.

use std::collections::HashMap;

use ahash::RandomState;

/// Strip one leading and one trailing `__` from a macro name.
///
/// Every store access goes through this, so `X` and `__X__` address the
/// same entry in conditions, definitions and expansions alike.
pub fn normalize(name: &str) -> &str {
    let name = name.strip_prefix("__").unwrap_or(name);
    name.strip_suffix("__").unwrap_or(name)
}

/// A map from macro names to their optional values.
///
/// Values are `None` for macros defined without a value; existence checks
/// (`#ifdef`) see them, truthiness checks (`#if`) do not. Names are stored
/// normalized.
#[derive(Debug, Clone, Default)]
pub struct MacroMap {
    inner: HashMap<String, Option<String>, RandomState>,
}

impl MacroMap {
    /// Returns true if the map contains an entry for the given name.
    pub fn contains(&self, name: &str) -> bool {
        self.inner.contains_key(normalize(name))
    }

    /// Returns the value bound to the given name, if any.
    pub fn get(&self, name: &str) -> Option<&Option<String>> {
        self.inner.get(normalize(name))
    }

    /// Bind a name to a value, replacing any previous binding.
    ///
    /// This is the engine-internal entry; reservation of built-in names is
    /// the caller's concern.
    pub fn bind<N: Into<String>>(&mut self, name: N, value: Option<String>) {
        let name = name.into();
        let key = if name.starts_with("__") || name.ends_with("__") {
            normalize(&name).to_owned()
        } else {
            name
        };
        self.inner.insert(key, value);
    }

    /// Remove a binding. Removing an absent name is not an error.
    pub fn remove(&mut self, name: &str) -> Option<Option<String>> {
        self.inner.remove(normalize(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_access() {
        let mut map = MacroMap::default();
        map.bind("__ALPHA__", Some("1".to_owned()));
        assert!(map.contains("ALPHA"));
        assert!(map.contains("__ALPHA__"));
        assert_eq!(map.get("ALPHA"), Some(&Some("1".to_owned())));

        map.bind("BETA", None);
        assert!(map.contains("__BETA__"));
        assert_eq!(map.get("__BETA__"), Some(&None));

        assert!(map.remove("__ALPHA__").is_some());
        assert!(!map.contains("ALPHA"));
        assert!(map.remove("ALPHA").is_none());
    }

    #[test]
    fn single_underscores_are_distinct() {
        let mut map = MacroMap::default();
        map.bind("_GAMMA_", Some("g".to_owned()));
        assert!(map.contains("_GAMMA_"));
        assert!(!map.contains("GAMMA"));
    }
}
