//! Provider Pool
//!
//! Named LLM providers plus a single default. The first provider ever added
//! becomes the default; afterwards the default only moves on request, and only
//! to a provider already in the pool.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::provider::Provider;

#[derive(Default)]
pub struct ProviderPool {
    providers: IndexMap<String, Arc<dyn Provider>>,
    default: Option<String>,
}

impl ProviderPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a provider under its own name
    pub fn add(&mut self, provider: Arc<dyn Provider>) {
        let name = provider.name().to_string();
        if self.default.is_none() {
            self.default = Some(name.clone());
        }
        self.providers.insert(name, provider);
    }

    /// Point the default at `name`. Returns `false` if `name` is unknown.
    pub fn set_default(&mut self, name: &str) -> bool {
        if !self.providers.contains_key(name) {
            return false;
        }
        self.default = Some(name.to_string());
        true
    }

    /// Resolve an explicit name, or the default when `name` is `None` or empty
    pub fn get(&self, name: Option<&str>) -> Option<Arc<dyn Provider>> {
        match name.filter(|n| !n.is_empty()) {
            Some(name) => self.providers.get(name).cloned(),
            None => self
                .default
                .as_deref()
                .and_then(|d| self.providers.get(d))
                .cloned(),
        }
    }

    pub fn default_name(&self) -> Option<&str> {
        self.default.as_deref()
    }

    pub fn names(&self) -> Vec<&str> {
        self.providers.keys().map(String::as_str).collect()
    }

    /// Providers in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<dyn Provider>)> {
        self.providers.iter().map(|(name, p)| (name.as_str(), p))
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
