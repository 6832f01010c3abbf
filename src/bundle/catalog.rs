use super::Bundle;
use std::collections::HashMap;
use std::sync::Arc;

/// Bundle implementations known to the application, by name.
#[derive(Default, Clone)]
pub struct BundleCatalog {
    bundles: HashMap<String, Arc<dyn Bundle>>,
}

impl BundleCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, bundle: impl Bundle + 'static) -> Self {
        self.insert(Arc::new(bundle));
        self
    }

    /// Add a bundle, replacing any bundle of the same name.
    pub fn insert(&mut self, bundle: Arc<dyn Bundle>) {
        self.bundles.insert(bundle.name().to_string(), bundle);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Bundle>> {
        self.bundles.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bundles.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.bundles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named(&'static str);

    impl Bundle for Named {
        fn name(&self) -> &str {
            self.0
        }
    }

    #[test]
    fn test_lookup_by_name() {
        let catalog = BundleCatalog::new().with(Named("core")).with(Named("users"));
        assert_eq!(catalog.len(), 2);
        assert!(catalog.contains("users"));
        assert_eq!(catalog.get("core").map(|b| b.name()), Some("core"));
        assert!(catalog.get("missing").is_none());
    }
}
