//! Handler registry: node type tag to handler, built once.

use crate::handlers::{self, tags, Handler};
use rustc_hash::FxHashMap;
use std::sync::OnceLock;

/// Read-only mapping from node type tag to handler.
pub struct HandlerRegistry {
    handlers: FxHashMap<&'static str, Box<dyn Handler>>,
}

impl HandlerRegistry {
    /// A registry with no handlers.
    pub fn empty() -> Self {
        Self {
            handlers: FxHashMap::default(),
        }
    }

    /// The standard handler set, built fresh.
    pub fn with_standard_handlers() -> Self {
        Self::empty()
            .with(tags::BODY, handlers::body::BodyHandler)
            .with(tags::TEXT, handlers::text::TextHandler)
            .with(tags::PRINT, handlers::print::PrintHandler)
            .with(tags::INCLUDE, handlers::include::IncludeHandler)
            .with(tags::CONSTANT, handlers::expression::ConstantHandler)
            .with(tags::NAME, handlers::expression::NameHandler)
            .with(tags::HASH, handlers::expression::HashHandler)
    }

    /// The process-wide standard registry, built on first use.
    pub fn standard() -> &'static Self {
        static STANDARD: OnceLock<HandlerRegistry> = OnceLock::new();
        STANDARD.get_or_init(Self::with_standard_handlers)
    }

    /// Builder: register a handler. Replaces any handler for the same tag.
    pub fn with(mut self, tag: &'static str, handler: impl Handler + 'static) -> Self {
        self.handlers.insert(tag, Box::new(handler));
        self
    }

    pub fn get(&self, tag: &str) -> Option<&dyn Handler> {
        self.handlers.get(tag).map(|h| h.as_ref())
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.handlers.contains_key(tag)
    }

    /// Registered tags, sorted.
    pub fn tags(&self) -> Vec<&'static str> {
        let mut tags: Vec<_> = self.handlers.keys().copied().collect();
        tags.sort_unstable();
        tags
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::with_standard_handlers()
    }
}
