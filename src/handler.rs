//! Handler contract and resolution
//!
//! A handler is the application object behind one named route. All hooks are
//! optional: the trait supplies default no-op bodies, so the engine can call
//! them uniformly without checking for their presence.
//!
//! A handler's context is the value produced by `deserialize` for as long as
//! the handler stays active. Contexts are shared, type-erased, and compared
//! by identity (`Arc::ptr_eq`) when the engine decides whether a still-active
//! handler needs its `setup` re-run.

use crate::params::RouteParams;
use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Type-erased, identity-compared handler context
pub type SharedContext = Arc<dyn Any + Send + Sync>;

/// Future produced by an asynchronous `deserialize`.
///
/// Rejection carries a human-readable reason that flows to the injected
/// failure notification.
pub type ContextFuture = Pin<Box<dyn Future<Output = Result<SharedContext, String>> + Send>>;

/// Compare two contexts by identity
pub fn same_context(a: &SharedContext, b: &SharedContext) -> bool {
    Arc::ptr_eq(a, b)
}

/// What `deserialize` produced: nothing, a value now, or a value later.
///
/// `None` is the default for handlers that keep no context; two
/// context-less activations of the same handler always compare unchanged.
/// `Deferred` is the suspension point of a transition - the engine pauses,
/// fires the loading notification, and resumes when the future settles.
pub enum Resolution {
    /// This handler keeps no context
    None,
    /// Context available synchronously
    Ready(SharedContext),
    /// Context still being determined (e.g. a network fetch)
    Deferred(ContextFuture),
}

impl Resolution {
    /// Wrap a plain value as an immediately-ready context
    pub fn ready<T: Any + Send + Sync>(value: T) -> Self {
        Resolution::Ready(Arc::new(value))
    }

    /// Wrap a future as a deferred context
    pub fn deferred<F>(future: F) -> Self
    where
        F: Future<Output = Result<SharedContext, String>> + Send + 'static,
    {
        Resolution::Deferred(Box::pin(future))
    }
}

/// Result of a `setup` hook
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupResult {
    /// Continue with the remaining handlers
    Continue,
    /// Skip every remaining `enter`/`setup` call of this transition.
    /// Already-run hooks are not rolled back.
    Abort,
}

impl SetupResult {
    /// Check if this result aborts the transition
    pub fn is_abort(&self) -> bool {
        matches!(self, SetupResult::Abort)
    }
}

/// The capability set of one route handler.
///
/// Every method has a default body, so implementations override only what
/// they need.
///
/// # Example
///
/// ```
/// use waymark::handler::{Handler, Resolution, SetupResult, SharedContext};
/// use waymark::RouteParams;
///
/// struct PostHandler;
///
/// impl Handler for PostHandler {
///     fn deserialize(&self, params: &RouteParams) -> Resolution {
///         // Synchronous lookup; a fetch would use Resolution::deferred
///         Resolution::ready(params.get("post_id").unwrap_or_default().to_string())
///     }
///
///     fn setup(&self, _context: Option<&SharedContext>) -> SetupResult {
///         SetupResult::Continue
///     }
/// }
/// ```
pub trait Handler: Send + Sync {
    /// Turn raw captured params into this handler's context.
    ///
    /// Default: no context. A handler that overrides this usually returns
    /// [`Resolution::ready`] or, for genuinely asynchronous work,
    /// [`Resolution::deferred`].
    fn deserialize(&self, _params: &RouteParams) -> Resolution {
        Resolution::None
    }

    /// Turn an active context back into params for URL generation.
    ///
    /// Default: project `param_names` out of a [`RouteParams`]-typed
    /// context; empty for any other context type. Handlers with richer
    /// context types override this when they participate in named
    /// transitions.
    fn serialize(&self, context: &SharedContext, param_names: &[String]) -> RouteParams {
        context
            .downcast_ref::<RouteParams>()
            .map(|params| {
                RouteParams::from_pairs(param_names.iter().filter_map(|name| {
                    params.get(name).map(|value| (name.clone(), value.to_string()))
                }))
            })
            .unwrap_or_default()
    }

    /// Called once when this handler becomes active
    fn enter(&self) {}

    /// Called once when this handler stops being active
    fn exit(&self) {}

    /// Called with the resolved context on entry and on context change.
    ///
    /// `None` for handlers that keep no context. Returning
    /// [`SetupResult::Abort`] skips the remaining `enter`/`setup` calls of
    /// the in-flight transition.
    fn setup(&self, _context: Option<&SharedContext>) -> SetupResult {
        SetupResult::Continue
    }
}

/// Handler used when the resolver knows nothing about a name.
///
/// Pure pass-through: the transition flows past it with no context and
/// every hook a no-op.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughHandler;

impl Handler for PassthroughHandler {}

// ============================================================================
// Resolution of handler objects
// ============================================================================

/// Injected lookup from handler name to live handler object.
///
/// Must be idempotent per name within a session. The engine calls it at most
/// once per name per resolution pass and caches nothing itself; caching, if
/// any, is the resolver's concern. A `None` is answered with
/// [`PassthroughHandler`].
pub trait HandlerResolver: Send + Sync {
    /// Look up the handler registered under `name`
    fn resolve(&self, name: &str) -> Option<Arc<dyn Handler>>;
}

impl<F> HandlerResolver for F
where
    F: Fn(&str) -> Option<Arc<dyn Handler>> + Send + Sync,
{
    fn resolve(&self, name: &str) -> Option<Arc<dyn Handler>> {
        self(name)
    }
}

/// Map-backed resolver for static handler sets
#[derive(Clone, Default)]
pub struct HandlerMap {
    handlers: HashMap<String, Arc<dyn Handler>>,
}

impl HandlerMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under a name
    pub fn insert(&mut self, name: impl Into<String>, handler: Arc<dyn Handler>) {
        self.handlers.insert(name.into(), handler);
    }

    /// Builder-style registration
    pub fn with(mut self, name: impl Into<String>, handler: Arc<dyn Handler>) -> Self {
        self.insert(name, handler);
        self
    }
}

impl HandlerResolver for HandlerMap {
    fn resolve(&self, name: &str) -> Option<Arc<dyn Handler>> {
        self.handlers.get(name).cloned()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_deserialize_keeps_no_context() {
        let handler = PassthroughHandler;
        let params = RouteParams::from_pairs([("id", "42")]);

        assert!(matches!(handler.deserialize(&params), Resolution::None));
    }

    #[test]
    fn test_ready_resolution_carries_value() {
        struct Sync;
        impl Handler for Sync {
            fn deserialize(&self, params: &RouteParams) -> Resolution {
                Resolution::ready(params.clone())
            }
        }

        match Sync.deserialize(&RouteParams::from_pairs([("id", "42")])) {
            Resolution::Ready(context) => {
                let params = context.downcast_ref::<RouteParams>().unwrap();
                assert_eq!(params.get("id"), Some("42"));
            }
            _ => panic!("expected a ready resolution"),
        }
    }

    #[test]
    fn test_default_serialize_projects_param_names() {
        let handler = PassthroughHandler;
        let context: SharedContext =
            Arc::new(RouteParams::from_pairs([("id", "42"), ("other", "x")]));

        let params = handler.serialize(&context, &["id".to_string()]);
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("id"), Some("42"));
    }

    #[test]
    fn test_default_serialize_of_foreign_context_is_empty() {
        let handler = PassthroughHandler;
        let context: SharedContext = Arc::new(42_u32);

        assert!(handler.serialize(&context, &["id".to_string()]).is_empty());
    }

    #[test]
    fn test_deferred_resolution_settles() {
        struct Deferred;
        impl Handler for Deferred {
            fn deserialize(&self, _params: &RouteParams) -> Resolution {
                Resolution::deferred(async { Ok(Arc::new("loaded".to_string()) as SharedContext) })
            }
        }

        match Deferred.deserialize(&RouteParams::new()) {
            Resolution::Deferred(future) => {
                let context = pollster::block_on(future).unwrap();
                assert_eq!(context.downcast_ref::<String>().unwrap(), "loaded");
            }
            _ => panic!("expected a deferred resolution"),
        }
    }

    #[test]
    fn test_context_identity() {
        let a: SharedContext = Arc::new(1_u32);
        let b = Arc::clone(&a);
        let c: SharedContext = Arc::new(1_u32);

        assert!(same_context(&a, &b));
        assert!(!same_context(&a, &c));
    }

    #[test]
    fn test_handler_map_resolver() {
        let map = HandlerMap::new().with("posts", Arc::new(PassthroughHandler));

        assert!(map.resolve("posts").is_some());
        assert!(map.resolve("ghost").is_none());
    }

    #[test]
    fn test_closure_resolver() {
        let resolver = |name: &str| -> Option<Arc<dyn Handler>> {
            (name == "posts").then(|| Arc::new(PassthroughHandler) as Arc<dyn Handler>)
        };

        assert!(resolver.resolve("posts").is_some());
        assert!(resolver.resolve("ghost").is_none());
    }

    #[test]
    fn test_setup_result() {
        assert!(!SetupResult::Continue.is_abort());
        assert!(SetupResult::Abort.is_abort());
    }
}
