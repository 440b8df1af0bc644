//! Transition engine
//!
//! Consumes recognition results, resolves each matched handler's context
//! (synchronously or by awaiting a deferred value), partitions the old and
//! new handler chains into exited/updated/entered buckets, and invokes
//! lifecycle hooks in order.
//!
//! A transition runs `Idle -> Recognizing -> Resolving -> RunningLifecycle
//! -> Idle` (or `-> Failed`); no other phases exist. Everything built during
//! resolution is local to one attempt, and the published current chain is
//! replaced wholesale only at the start of the lifecycle phase, so a
//! suspended transition always diffs against a stable snapshot.

use crate::error::{RouterError, TransitionOutcome};
use crate::handler::{
    same_context, Handler, HandlerResolver, PassthroughHandler, Resolution, SharedContext,
};
use crate::location::LocationUpdater;
use crate::params::RouteParams;
use crate::recognizer::RouteRecognizer;
use crate::{debug_log, trace_log, HandlerMatch, Recognition};
use std::fmt;
use std::sync::Arc;

#[cfg(feature = "cache")]
use crate::cache::RecognitionCache;

/// Phase of the engine's transition state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnginePhase {
    /// No transition in flight
    Idle,
    /// Matching a URL against the recognizer
    Recognizing,
    /// Resolving handler objects and contexts, possibly suspended
    Resolving,
    /// Partitioning chains and invoking lifecycle hooks
    RunningLifecycle,
    /// The last transition ended in an error or rejection
    Failed,
}

/// One handler of an active (or becoming-active) chain.
///
/// Created during resolution, published as part of the current chain when
/// the lifecycle phase runs, and discarded wholesale on the next transition.
#[derive(Clone)]
pub struct HandlerInfo {
    /// Handler name from recognition or the named-route map
    pub name: String,
    /// True iff this handler's segments contributed at least one capture
    pub is_dynamic: bool,
    /// The live handler object
    pub handler: Arc<dyn Handler>,
    /// Resolved context; cleared just before `exit` runs
    pub context: Option<SharedContext>,
}

impl fmt::Debug for HandlerInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerInfo")
            .field("name", &self.name)
            .field("is_dynamic", &self.is_dynamic)
            .field("has_context", &self.context.is_some())
            .finish()
    }
}

/// The classification of one chain change.
///
/// `exited` is ordered innermost first, `entered` outermost first, matching
/// hook invocation order. `unchanged` is tracked so a context change
/// upstream can cascade without re-diffing.
#[derive(Default)]
struct Partition {
    updated_context: Vec<HandlerInfo>,
    exited: Vec<HandlerInfo>,
    entered: Vec<HandlerInfo>,
    unchanged: Vec<HandlerInfo>,
}

/// Walk old and new chains index-aligned.
///
/// Once handler identity differs at some depth, every deeper handler is
/// entered (new side) or exited (old side). Before that divergence, a
/// context changed by reference moves the handler - and every deeper shared
/// one - into `updated_context`.
fn partition(old: &[HandlerInfo], new: &[HandlerInfo]) -> Partition {
    let mut result = Partition::default();
    let mut handler_changed = false;
    let mut context_changed = false;

    for (i, new_info) in new.iter().enumerate() {
        let old_info = old.get(i);
        if old_info.map_or(true, |o| o.name != new_info.name) {
            handler_changed = true;
        }

        if handler_changed {
            result.entered.push(new_info.clone());
            if let Some(old_info) = old_info {
                result.exited.insert(0, old_info.clone());
            }
        } else {
            let old_info = old_info.expect("identity matched, so the old entry exists");
            let differs = match (&old_info.context, &new_info.context) {
                (Some(a), Some(b)) => !same_context(a, b),
                (None, None) => false,
                _ => true,
            };
            if context_changed || differs {
                context_changed = true;
                result.updated_context.push(new_info.clone());
            } else {
                result.unchanged.push(old_info.clone());
            }
        }
    }

    // Old handlers deeper than the new chain all exit, innermost first.
    for old_info in old.iter().skip(new.len()) {
        result.exited.insert(0, old_info.clone());
    }

    result
}

type LoadingNotification = Box<dyn Fn() + Send + Sync>;
type FailureNotification = Box<dyn Fn(&str) + Send + Sync>;

/// Drives the application between named handler chains.
///
/// Owns the recognizer, the injected handler resolver, the optional location
/// updater, the loading/failure notifications, and the current chain. The
/// engine is single-threaded and cooperative: the only suspension point is
/// an awaited deferred `deserialize`, during which the previously active
/// chain remains the published state.
///
/// Overlapping transitions are not queued or merged; the `&mut self`
/// receivers leave overlap prevention to the caller.
pub struct TransitionEngine {
    recognizer: RouteRecognizer,
    resolver: Box<dyn HandlerResolver>,
    location: Option<Box<dyn LocationUpdater>>,
    on_loading: Option<LoadingNotification>,
    on_failure: Option<FailureNotification>,
    current: Vec<HandlerInfo>,
    phase: EnginePhase,
    #[cfg(feature = "cache")]
    cache: RecognitionCache,
}

impl TransitionEngine {
    /// Create an engine over a fully built recognizer
    pub fn new(recognizer: RouteRecognizer, resolver: impl HandlerResolver + 'static) -> Self {
        Self {
            recognizer,
            resolver: Box::new(resolver),
            location: None,
            on_loading: None,
            on_failure: None,
            current: Vec::new(),
            phase: EnginePhase::Idle,
            #[cfg(feature = "cache")]
            cache: RecognitionCache::new(),
        }
    }

    /// Inject the location updater that receives generated URLs
    pub fn with_location(mut self, location: impl LocationUpdater + 'static) -> Self {
        self.location = Some(Box::new(location));
        self
    }

    /// Inject the notification fired when a transition suspends on a
    /// deferred context
    pub fn on_loading(mut self, notification: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_loading = Some(Box::new(notification));
        self
    }

    /// Inject the notification fired when a deferred context rejects
    pub fn on_failure(mut self, notification: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_failure = Some(Box::new(notification));
        self
    }

    /// The recognizer this engine consults
    pub fn recognizer(&self) -> &RouteRecognizer {
        &self.recognizer
    }

    /// Current phase of the transition state machine
    pub fn phase(&self) -> EnginePhase {
        self.phase
    }

    /// The published current chain, outermost first.
    ///
    /// While a transition is suspended this still reflects the prior,
    /// stable state, never a half-applied one.
    pub fn current_chain(&self) -> &[HandlerInfo] {
        &self.current
    }

    /// Drive a transition from a raw URL.
    ///
    /// Fails fatally with [`RouterError::NoRouteMatched`] when nothing
    /// accepts the path; the caller is expected to have a catch-all route.
    pub async fn handle_url(&mut self, url: &str) -> Result<TransitionOutcome, RouterError> {
        self.set_phase(EnginePhase::Recognizing);
        let Some(recognition) = self.recognize_cached(url) else {
            self.set_phase(EnginePhase::Failed);
            return Err(RouterError::NoRouteMatched {
                path: url.to_string(),
            });
        };

        let resolved = match self.resolve_matches(recognition.matches).await {
            Ok(resolved) => resolved,
            Err(reason) => return Ok(self.fail(reason)),
        };

        Ok(self.run_lifecycle(resolved, url.to_string()))
    }

    /// Transition to a named route, binding `contexts` to its dynamic
    /// handlers and pushing the generated URL to the location updater.
    pub async fn transition_to(
        &mut self,
        name: &str,
        contexts: Vec<SharedContext>,
    ) -> Result<TransitionOutcome, RouterError> {
        self.named_transition(name, contexts, false).await
    }

    /// Like [`Self::transition_to`], but replaces the current location
    /// entry instead of pushing a new one.
    pub async fn replace_with(
        &mut self,
        name: &str,
        contexts: Vec<SharedContext>,
    ) -> Result<TransitionOutcome, RouterError> {
        self.named_transition(name, contexts, true).await
    }

    /// Whether `name` (or its `.index` default child) is in the current
    /// chain, with each supplied context matching the corresponding dynamic
    /// handler's stored context by identity, bound innermost outward.
    ///
    /// Pure query; reflects the published chain even mid-suspension.
    pub fn is_active(&self, name: &str, contexts: &[SharedContext]) -> bool {
        let index_child = format!("{}.index", name);
        let Some(found) = self
            .current
            .iter()
            .position(|info| info.name == name || info.name == index_child)
        else {
            return false;
        };

        if contexts.is_empty() {
            return true;
        }

        let dynamic: Vec<&HandlerInfo> = self.current[..=found]
            .iter()
            .filter(|info| info.is_dynamic)
            .collect();
        if contexts.len() > dynamic.len() {
            return false;
        }

        // Last supplied context pairs with the innermost dynamic handler.
        contexts
            .iter()
            .rev()
            .zip(dynamic.iter().rev())
            .all(|(supplied, info)| {
                info.context
                    .as_ref()
                    .is_some_and(|stored| same_context(stored, supplied))
            })
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn set_phase(&mut self, phase: EnginePhase) {
        trace_log!("transition phase: {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
    }

    fn recognize_cached(&mut self, url: &str) -> Option<Recognition> {
        #[cfg(feature = "cache")]
        {
            if let Some(hit) = self.cache.get(url) {
                return Some(hit);
            }
            let recognition = self.recognizer.recognize(url)?;
            self.cache.put(url.to_string(), recognition.clone());
            Some(recognition)
        }
        #[cfg(not(feature = "cache"))]
        {
            self.recognizer.recognize(url)
        }
    }

    /// Resolve handler objects and contexts for recognized matches.
    ///
    /// Strictly sequential in match order: a descendant's `deserialize` may
    /// legitimately depend on its ancestor's already-resolved context.
    async fn resolve_matches(
        &mut self,
        matches: Vec<HandlerMatch>,
    ) -> Result<Vec<HandlerInfo>, String> {
        self.set_phase(EnginePhase::Resolving);
        let mut resolved = Vec::with_capacity(matches.len());
        let mut announced_loading = false;

        for matched in matches {
            let handler = self.lookup(&matched.handler);
            let context = self
                .settle(
                    handler.deserialize(&matched.params),
                    &matched.handler,
                    &mut announced_loading,
                )
                .await?;
            resolved.push(HandlerInfo {
                name: matched.handler,
                is_dynamic: matched.is_dynamic,
                handler,
                context,
            });
        }

        Ok(resolved)
    }

    fn lookup(&self, name: &str) -> Arc<dyn Handler> {
        self.resolver
            .resolve(name)
            .unwrap_or_else(|| Arc::new(PassthroughHandler))
    }

    /// Await a resolution, firing the loading notification on the first
    /// suspension of this transition and the failure notification on
    /// rejection.
    async fn settle(
        &self,
        resolution: Resolution,
        handler_name: &str,
        announced_loading: &mut bool,
    ) -> Result<Option<SharedContext>, String> {
        match resolution {
            Resolution::None => Ok(None),
            Resolution::Ready(context) => Ok(Some(context)),
            Resolution::Deferred(future) => {
                if !*announced_loading {
                    *announced_loading = true;
                    debug_log!("transition suspended on '{}'", handler_name);
                    if let Some(notify) = &self.on_loading {
                        notify();
                    }
                }
                match future.await {
                    Ok(context) => Ok(Some(context)),
                    Err(reason) => {
                        debug_log!("'{}' context rejected: {}", handler_name, reason);
                        if let Some(notify) = &self.on_failure {
                            notify(&reason);
                        }
                        Err(reason)
                    }
                }
            }
        }
    }

    fn fail(&mut self, reason: String) -> TransitionOutcome {
        self.set_phase(EnginePhase::Failed);
        TransitionOutcome::Failed { reason }
    }

    /// Partition against the published chain and run hooks in order.
    ///
    /// The new chain is published before any hook runs; a setup abort leaves
    /// the partially entered chain in place (documented non-atomic
    /// behavior).
    fn run_lifecycle(&mut self, new_chain: Vec<HandlerInfo>, url: String) -> TransitionOutcome {
        self.set_phase(EnginePhase::RunningLifecycle);
        let partition = partition(&self.current, &new_chain);
        debug_log!(
            "partition: {} exited, {} updated, {} entered, {} unchanged",
            partition.exited.len(),
            partition.updated_context.len(),
            partition.entered.len(),
            partition.unchanged.len()
        );
        self.current = new_chain;

        // Children exit before parents. Contexts are cleared first so a
        // re-entrant lookup during exit sees no stale value.
        for mut info in partition.exited {
            info.context = None;
            info.handler.exit();
        }

        let mut aborted_at = None;
        for info in &partition.updated_context {
            if info.handler.setup(info.context.as_ref()).is_abort() {
                aborted_at = Some(info.name.clone());
                break;
            }
        }

        if aborted_at.is_none() {
            // Parents are ready before children enter.
            for info in &partition.entered {
                info.handler.enter();
                if info.handler.setup(info.context.as_ref()).is_abort() {
                    aborted_at = Some(info.name.clone());
                    break;
                }
            }
        }

        self.set_phase(EnginePhase::Idle);
        match aborted_at {
            Some(at) => TransitionOutcome::Aborted { at },
            None => TransitionOutcome::Completed { url },
        }
    }

    async fn named_transition(
        &mut self,
        name: &str,
        contexts: Vec<SharedContext>,
        replace: bool,
    ) -> Result<TransitionOutcome, RouterError> {
        self.set_phase(EnginePhase::Resolving);
        let entries = match self.recognizer.handlers_for(name) {
            Ok(entries) => entries.to_vec(),
            Err(error) => {
                self.set_phase(EnginePhase::Failed);
                return Err(error);
            }
        };

        let dynamic_indices: Vec<usize> = entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| !entry.param_names.is_empty())
            .map(|(i, _)| i)
            .collect();
        if contexts.len() > dynamic_indices.len() {
            self.set_phase(EnginePhase::Failed);
            return Err(RouterError::ParamArityMismatch {
                supplied: contexts.len(),
                expected: dynamic_indices.len(),
            });
        }

        // The segment closest to the target consumes the last-supplied
        // context first; handlers left over reuse their active context.
        let mut assigned: Vec<Option<SharedContext>> = vec![None; entries.len()];
        let mut supplied = contexts;
        for &index in dynamic_indices.iter().rev() {
            assigned[index] = match supplied.pop() {
                Some(context) => Some(context),
                None => self
                    .current
                    .iter()
                    .find(|info| info.name == entries[index].name)
                    .and_then(|info| info.context.clone()),
            };
        }

        // Resolve handler objects once per name, then let each dynamic
        // handler serialize its context into the generation params. A
        // dynamic handler with no context at all leaves its params absent,
        // which generate surfaces as a missing-param error.
        let handlers: Vec<Arc<dyn Handler>> =
            entries.iter().map(|entry| self.lookup(&entry.name)).collect();
        let mut params = RouteParams::new();
        for (i, entry) in entries.iter().enumerate() {
            if entry.param_names.is_empty() {
                continue;
            }
            if let Some(context) = &assigned[i] {
                let piece = handlers[i].serialize(context, &entry.param_names);
                for (key, value) in piece.iter() {
                    params.insert(key.clone(), value.clone());
                }
            }
        }
        let url = match self.recognizer.generate(name, &params) {
            Ok(url) => url,
            Err(error) => {
                self.set_phase(EnginePhase::Failed);
                return Err(error);
            }
        };

        // Same resolve/partition/lifecycle sequence as handle_url, except
        // pre-assigned contexts skip deserialize.
        let mut resolved = Vec::with_capacity(entries.len());
        let mut announced_loading = false;
        for (i, entry) in entries.iter().enumerate() {
            let context = match assigned[i].clone() {
                Some(context) => Some(context),
                None => {
                    match self
                        .settle(
                            handlers[i].deserialize(&RouteParams::new()),
                            &entry.name,
                            &mut announced_loading,
                        )
                        .await
                    {
                        Ok(context) => context,
                        Err(reason) => return Ok(self.fail(reason)),
                    }
                }
            };
            resolved.push(HandlerInfo {
                name: entry.name.clone(),
                is_dynamic: !entry.param_names.is_empty(),
                handler: handlers[i].clone(),
                context,
            });
        }

        let outcome = self.run_lifecycle(resolved, url.clone());
        if outcome.is_completed() {
            if let Some(location) = &mut self.location {
                if replace {
                    location.replace_url(&url);
                } else {
                    location.update_url(&url);
                }
            }
        }
        Ok(outcome)
    }
}

// ============================================================================
// Tests
// ============================================================================
