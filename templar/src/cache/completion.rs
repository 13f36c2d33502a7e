//! Tracking which of the initially registered templates are still loading.
use super::super::Error;

use std::collections::HashSet;
use std::sync::Arc;

/// Callback fired once every template registered at creation is compiled.
pub type OnAllLoaded = Box<dyn FnOnce() + Send + 'static>;

/// Outcome of a background operation, sent to [`TemplateCache::subscribe`](super::TemplateCache::subscribe) receivers.
#[derive(Debug, Clone)]
pub enum LoadEvent {
    /// Template was compiled and stored.
    Loaded { name: String },
    /// A background fetch, compile or render failed. The template stays as it was.
    Failed { name: String, error: Arc<Error> },
}

impl LoadEvent {
    pub fn name(&self) -> &str {
        match self {
            LoadEvent::Loaded { name } => name,
            LoadEvent::Failed { name, .. } => name,
        }
    }
}

pub(crate) struct Completion {
    pending: HashSet<String>,
    callback: Option<OnAllLoaded>,
}

impl Completion {
    pub(crate) fn new<'a>(names: impl Iterator<Item = &'a str>, callback: OnAllLoaded) -> Self {
        Self {
            pending: names.map(String::from).collect(),
            callback: Some(callback),
        }
    }

    /// Mark the template as loaded. If it was the last one,
    /// the callback is returned so the caller can run it without holding any locks.
    pub(crate) fn loaded(&mut self, name: &str) -> Option<OnAllLoaded> {
        self.pending.remove(name);
        self.check()
    }

    /// Take the callback if nothing is pending anymore.
    pub(crate) fn check(&mut self) -> Option<OnAllLoaded> {
        if self.pending.is_empty() {
            self.callback.take()
        } else {
            None
        }
    }

    pub(crate) fn pending(&self) -> Vec<String> {
        let mut pending = self.pending.iter().cloned().collect::<Vec<_>>();
        pending.sort();
        pending
    }
}
