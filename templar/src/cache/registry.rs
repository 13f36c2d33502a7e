//! Template names and where to fetch them from.
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Mapping of template name to the URL of its source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Registry {
    urls: HashMap<String, String>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a template. Returns the previous URL if the name was already registered.
    pub fn insert(&mut self, name: impl ToString, url: impl ToString) -> Option<String> {
        self.urls.insert(name.to_string(), url.to_string())
    }

    pub fn url_for(&self, name: &str) -> Option<&str> {
        self.urls.get(name).map(|url| url.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.urls.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.urls.keys().map(|name| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.urls
            .iter()
            .map(|(name, url)| (name.as_str(), url.as_str()))
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

impl<K: ToString, V: ToString> FromIterator<(K, V)> for Registry {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut registry = Registry::new();
        for (name, url) in iter {
            registry.insert(name, url);
        }
        registry
    }
}

impl From<HashMap<String, String>> for Registry {
    fn from(urls: HashMap<String, String>) -> Self {
        Self { urls }
    }
}

impl<K: ToString, V: ToString, const N: usize> From<[(K, V); N]> for Registry {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}
