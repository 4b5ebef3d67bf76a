//! Template loaders: where the runtime finds template functions.

use super::TemplateFn;
use crate::core::error::RenderError;
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Resolve a template reference to a function.
pub trait Loader: Send + Sync {
    /// Any error means the reference is unresolvable.
    fn load(&self, reference: &str) -> Result<Arc<dyn TemplateFn>, RenderError>;
}

/// In-memory loader over registered functions.
#[derive(Default)]
pub struct MemoryLoader {
    templates: FxHashMap<String, Arc<dyn TemplateFn>>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: register a template under `reference`.
    pub fn with(mut self, reference: impl Into<String>, template: impl TemplateFn + 'static) -> Self {
        self.insert(reference, template);
        self
    }

    pub fn insert(&mut self, reference: impl Into<String>, template: impl TemplateFn + 'static) {
        self.templates.insert(reference.into(), Arc::new(template));
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl Loader for MemoryLoader {
    fn load(&self, reference: &str) -> Result<Arc<dyn TemplateFn>, RenderError> {
        self.templates
            .get(reference)
            .cloned()
            .ok_or_else(|| RenderError::MissingTemplate {
                reference: reference.to_string(),
            })
    }
}
