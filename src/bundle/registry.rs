//! Ordered bundle list with associative merge.
//!
//! Named keys behave like map keys: merging a key that already exists
//! replaces the bundle in place. Positional entries are always appended
//! and renumbered, duplicates included.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BundleKey {
    Index(usize),
    Named(String),
}

impl fmt::Display for BundleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BundleKey::Index(i) => write!(f, "{i}"),
            BundleKey::Named(name) => f.write_str(name),
        }
    }
}

/// A bundle name and its slot in the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleEntry {
    pub key: BundleKey,
    pub name: String,
}

impl BundleEntry {
    /// Positional entry; the index is assigned when it is added to a registry.
    pub fn positional(name: impl Into<String>) -> Self {
        Self {
            key: BundleKey::Index(0),
            name: name.into(),
        }
    }

    pub fn keyed(key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            key: BundleKey::Named(key.into()),
            name: name.into(),
        }
    }
}

impl From<&str> for BundleEntry {
    fn from(name: &str) -> Self {
        BundleEntry::positional(name)
    }
}

#[derive(Debug, Clone, Default)]
pub struct BundleRegistry {
    entries: Vec<BundleEntry>,
    imports: Vec<String>,
    next_index: usize,
}

impl BundleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole list.
    pub fn set_bundles<I, E>(&mut self, bundles: I)
    where
        I: IntoIterator<Item = E>,
        E: Into<BundleEntry>,
    {
        self.entries.clear();
        self.next_index = 0;
        self.add_bundles(bundles);
    }

    /// Merge `bundles` onto the current list.
    pub fn add_bundles<I, E>(&mut self, bundles: I)
    where
        I: IntoIterator<Item = E>,
        E: Into<BundleEntry>,
    {
        for entry in bundles.into_iter().map(Into::into) {
            match entry.key {
                BundleKey::Named(_) => {
                    if let Some(existing) = self.entries.iter_mut().find(|e| e.key == entry.key) {
                        existing.name = entry.name;
                    } else {
                        self.entries.push(entry);
                    }
                }
                BundleKey::Index(_) => {
                    self.entries.push(BundleEntry {
                        key: BundleKey::Index(self.next_index),
                        name: entry.name,
                    });
                    self.next_index += 1;
                }
            }
        }
    }

    pub fn set_imports<I, S>(&mut self, imports: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.imports = imports.into_iter().map(Into::into).collect();
    }

    /// Import descriptors, resolved after the bundle list.
    pub fn import(&self) -> &[String] {
        &self.imports
    }

    pub fn bundles(&self) -> &[BundleEntry] {
        &self.entries
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    pub fn get(&self, key: &BundleKey) -> Option<&BundleEntry> {
        self.entries.iter().find(|e| &e.key == key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_preserves_order() {
        let mut registry = BundleRegistry::new();
        registry.add_bundles(["a"]);
        registry.add_bundles(["b"]);
        assert_eq!(registry.names(), vec!["a", "b"]);
    }

    #[test]
    fn test_named_key_last_write_wins() {
        let mut registry = BundleRegistry::new();
        registry.add_bundles([BundleEntry::keyed("x", "one"), BundleEntry::keyed("y", "why")]);
        registry.add_bundles([BundleEntry::keyed("x", "two")]);

        assert_eq!(registry.len(), 2);
        // The key keeps its first-seen position.
        assert_eq!(registry.names(), vec!["two", "why"]);
        let x = registry.get(&BundleKey::Named("x".to_string())).unwrap();
        assert_eq!(x.name, "two");
    }

    #[test]
    fn test_positional_entries_append_without_dedup() {
        let mut registry = BundleRegistry::new();
        registry.add_bundles(["1", "2"]);
        registry.add_bundles(["3", "1"]);

        assert_eq!(registry.names(), vec!["1", "2", "3", "1"]);
        let keys: Vec<_> = registry.bundles().iter().map(|e| e.key.clone()).collect();
        assert_eq!(keys, (0..4).map(BundleKey::Index).collect::<Vec<_>>());
    }

    #[test]
    fn test_mixed_merge() {
        let mut registry = BundleRegistry::new();
        registry.add_bundles([BundleEntry::positional("core"), BundleEntry::keyed("db", "mysql")]);
        registry.add_bundles([BundleEntry::keyed("db", "sqlite"), BundleEntry::positional("users")]);
        assert_eq!(registry.names(), vec!["core", "sqlite", "users"]);
    }

    #[test]
    fn test_set_replaces_and_renumbers() {
        let mut registry = BundleRegistry::new();
        registry.add_bundles(["a", "b", "c"]);
        registry.set_bundles(["z"]);

        assert_eq!(registry.names(), vec!["z"]);
        assert_eq!(registry.bundles()[0].key, BundleKey::Index(0));
        registry.add_bundles(["y"]);
        assert_eq!(registry.bundles()[1].key, BundleKey::Index(1));
    }

    #[test]
    fn test_imports_are_separate() {
        let mut registry = BundleRegistry::new();
        registry.set_imports(["audit"]);
        assert!(registry.is_empty());
        assert_eq!(registry.import(), ["audit".to_string()]);
    }
}
