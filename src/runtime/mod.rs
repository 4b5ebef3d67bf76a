//! Render runtime: resolves and executes compiled templates.
//!
//! Generated code calls `render(ref, data, context, ignoreMissing)`. This
//! module is the host side of that call: template lookup goes through an
//! injected [`Loader`], resolved functions are cached by reference, and the
//! scope handed to the template is built from the context marker.

pub mod loader;

pub use loader::{Loader, MemoryLoader};

use crate::core::error::RenderError;
use rustc_hash::FxHashMap;
use serde_json::{Map, Value};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, warn};

/// Variables visible to a template.
pub type Scope = Map<String, Value>;

/// A compiled template function.
pub trait TemplateFn: Send + Sync {
    fn call(&self, scope: &Scope, runtime: &Runtime) -> Result<String, RenderError>;
}

impl<F> TemplateFn for F
where
    F: Fn(&Scope, &Runtime) -> Result<String, RenderError> + Send + Sync,
{
    fn call(&self, scope: &Scope, runtime: &Runtime) -> Result<String, RenderError> {
        self(scope, runtime)
    }
}

/// Scope-forwarding mode of a render call.
#[derive(Debug, Clone, Copy)]
pub enum Context<'a> {
    /// Only the explicit data is visible
    Isolated,
    /// The caller's scope, overlaid by the explicit data
    Inherit(&'a Scope),
}

impl<'a> Context<'a> {
    /// Map a generated-code context argument to a mode. `undefined` isolates;
    /// anything else forwards `ambient`.
    pub fn from_marker(marker: &str, ambient: &'a Scope) -> Self {
        if marker == crate::handlers::include::ISOLATED_CONTEXT {
            Self::Isolated
        } else {
            Self::Inherit(ambient)
        }
    }
}

/// Template resolution, caching, and execution.
pub struct Runtime {
    loader: Box<dyn Loader>,
    cache: RwLock<FxHashMap<String, Arc<dyn TemplateFn>>>,
}

impl Runtime {
    pub fn new(loader: impl Loader + 'static) -> Self {
        Self {
            loader: Box::new(loader),
            cache: RwLock::new(FxHashMap::default()),
        }
    }

    /// Render `reference` with `data` under `context`.
    ///
    /// A reference that cannot be resolved yields `""` when `ignore_missing`
    /// is set and a [`RenderError`] otherwise. Errors raised while the
    /// resolved template runs always propagate.
    pub fn render(
        &self,
        reference: &str,
        data: &Scope,
        context: Context<'_>,
        ignore_missing: bool,
    ) -> Result<String, RenderError> {
        let template = match self.resolve(reference) {
            Ok(t) => t,
            Err(e) if ignore_missing => {
                warn!(reference, error = %e, "ignoring unresolved include");
                return Ok(String::new());
            }
            Err(e) => return Err(e),
        };

        let scope = effective_scope(data, context);
        template.call(&scope, self)
    }

    /// Resolve a reference, consulting the cache first.
    pub fn resolve(&self, reference: &str) -> Result<Arc<dyn TemplateFn>, RenderError> {
        {
            let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(t) = cache.get(reference) {
                debug!(reference, "template cache hit");
                return Ok(Arc::clone(t));
            }
        }

        debug!(reference, "template cache miss");
        let template = self.loader.load(reference)?;
        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        let entry = cache
            .entry(reference.to_string())
            .or_insert_with(|| Arc::clone(&template));
        Ok(Arc::clone(entry))
    }

    /// Number of cached template functions.
    pub fn cached(&self) -> usize {
        self.cache.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Drop all cached template functions.
    pub fn clear_cache(&self) {
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

/// Build the scope a template runs against. `data` wins on key collisions.
pub fn effective_scope(data: &Scope, context: Context<'_>) -> Scope {
    match context {
        Context::Isolated => data.clone(),
        Context::Inherit(ambient) => {
            let mut scope = ambient.clone();
            for (k, v) in data {
                scope.insert(k.clone(), v.clone());
            }
            scope
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn scope(v: Value) -> Scope {
        match v {
            Value::Object(m) => m,
            _ => panic!("scope must be an object"),
        }
    }

    /// Renders `key=value` pairs of its scope, sorted by key.
    fn dump(scope: &Scope, _: &Runtime) -> Result<String, RenderError> {
        let mut keys: Vec<_> = scope.keys().collect();
        keys.sort();
        Ok(keys
            .into_iter()
            .map(|k| format!("{}={}", k, scope[k]))
            .collect::<Vec<_>>()
            .join(","))
    }

    /// Includes a template that does not exist.
    fn outer(scope: &Scope, rt: &Runtime) -> Result<String, RenderError> {
        let inner = rt.render("missing", &Scope::new(), Context::Inherit(scope), false)?;
        Ok(format!("[{}]", inner))
    }

    fn runtime() -> Runtime {
        Runtime::new(MemoryLoader::new().with("dump", dump).with("outer", outer))
    }

    #[test]
    fn test_missing_ignored() {
        let rt = runtime();
        let ctx = scope(json!({"a": 1}));
        let out = rt.render("missing", &Scope::new(), Context::Inherit(&ctx), true);
        assert_eq!(out.unwrap(), "");
    }

    #[test]
    fn test_missing_raises() {
        let rt = runtime();
        let ctx = scope(json!({"a": 1}));
        let err = rt
            .render("missing", &Scope::new(), Context::Inherit(&ctx), false)
            .unwrap_err();
        assert_eq!(
            err,
            RenderError::MissingTemplate {
                reference: "missing".into()
            }
        );
    }

    #[test]
    fn test_nested_missing_propagates_through_ignore() {
        // ignore_missing covers resolving "outer" only, not what outer renders
        let rt = runtime();
        let err = rt
            .render("outer", &Scope::new(), Context::Isolated, true)
            .unwrap_err();
        assert!(matches!(err, RenderError::MissingTemplate { .. }));
    }

    #[test]
    fn test_inherit_overlays_data() {
        let rt = runtime();
        let ambient = scope(json!({"a": 1, "b": 2}));
        let data = scope(json!({"b": 20, "c": 30}));
        let out = rt
            .render("dump", &data, Context::Inherit(&ambient), false)
            .unwrap();
        assert_eq!(out, "a=1,b=20,c=30");
    }

    #[test]
    fn test_isolated_hides_ambient() {
        let rt = runtime();
        let data = scope(json!({"b": 20}));
        let out = rt.render("dump", &data, Context::Isolated, false).unwrap();
        assert_eq!(out, "b=20");
    }

    #[test]
    fn test_from_marker() {
        let ambient = scope(json!({"a": 1}));
        assert!(matches!(
            Context::from_marker("undefined", &ambient),
            Context::Isolated
        ));
        assert!(matches!(
            Context::from_marker("context", &ambient),
            Context::Inherit(_)
        ));
    }

    #[test]
    fn test_effective_scope_isolated_equals_data() {
        let data = scope(json!({"x": [1, 2]}));
        assert_eq!(effective_scope(&data, Context::Isolated), data);
    }

    #[test]
    fn test_resolution_cached() {
        struct Counting(Arc<AtomicUsize>);
        impl Loader for Counting {
            fn load(&self, reference: &str) -> Result<Arc<dyn TemplateFn>, RenderError> {
                self.0.fetch_add(1, Ordering::SeqCst);
                if reference == "ok" {
                    Ok(Arc::new(dump))
                } else {
                    Err(RenderError::MissingTemplate {
                        reference: reference.to_string(),
                    })
                }
            }
        }

        let loads = Arc::new(AtomicUsize::new(0));
        let rt = Runtime::new(Counting(Arc::clone(&loads)));
        for _ in 0..3 {
            rt.render("ok", &Scope::new(), Context::Isolated, false).unwrap();
        }
        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert_eq!(rt.cached(), 1);

        // failures are not cached
        for _ in 0..2 {
            rt.render("nope", &Scope::new(), Context::Isolated, true).unwrap();
        }
        assert_eq!(loads.load(Ordering::SeqCst), 3);
        assert_eq!(rt.cached(), 1);

        rt.clear_cache();
        assert_eq!(rt.cached(), 0);
    }

    #[test]
    fn test_runtime_shared_across_threads() {
        let rt = Arc::new(runtime());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let rt = Arc::clone(&rt);
                std::thread::spawn(move || {
                    let data = scope(json!({ "n": i }));
                    rt.render("dump", &data, Context::Isolated, false).unwrap()
                })
            })
            .collect();
        for (i, h) in handles.into_iter().enumerate() {
            assert_eq!(h.join().unwrap(), format!("n={}", i));
        }
        assert_eq!(rt.cached(), 1);
    }
}
