//! The actions enhancer: harvest, dedup, deferred replay.
//!
//! The enhancer wraps a create-store function. The store it produces runs
//! every transition through a wrapped reducer that drains the actions slice
//! reducers emitted and queues them. Once the queue is allowed to flush, the
//! backlog is deduplicated and scheduled for re-dispatch on a later turn:
//!
//! ```text
//! dispatch(action)
//!     │
//!     ▼
//! wrapped reducer ── inner reducer ──► next state
//!     │                                    │
//!     │◄── drain_actions() ────────────────┘
//!     │
//!     ├─ queue += emitted, maybe lift suspension
//!     ├─ dedup backlog, log once
//!     └─ schedule ──► (next turn) dispatch each batched action
//! ```

use std::marker::PhantomData;
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use crate::action::Action;
use crate::emitted::DrainActions;
use crate::schedule::{Schedule, ScheduledTask, TokioSchedule};
use crate::store::{Reducer, StoreApi};

/// Label passed to the log callback on every flush.
pub const SCHEDULE_LABEL: &str = "schedule actions";

/// How many replay generations a single flush cascade may produce before the
/// enhancer drops the backlog.
pub const DEFAULT_MAX_REPLAY_DEPTH: usize = 32;

/// Flush observer: `(label, kind of the triggering action, batch)`.
///
/// Called synchronously, once per flush, before the batch is scheduled. The
/// dispatching store lock is held at that point, so the callback must not
/// dispatch into the store or query its state.
pub type LogFn<A> = Arc<dyn Fn(&str, &str, &[A]) + Send + Sync>;

/// Configuration for [`ActionsEnhancer`].
pub struct EnhancerOptions<A> {
    /// Suspend flushing until an action of this kind has been processed.
    /// Unset means flushing is enabled from the start.
    pub start_kind: Option<String>,
    /// Optional flush observer.
    pub log: Option<LogFn<A>>,
    /// Deferred-execution capability. Defaults to [`TokioSchedule`] on the
    /// runtime that is current when the store is created.
    pub schedule: Option<Arc<dyn Schedule>>,
    /// Bound on the replay cascade; see [`DEFAULT_MAX_REPLAY_DEPTH`].
    pub max_replay_depth: usize,
}

impl<A> Default for EnhancerOptions<A> {
    fn default() -> Self {
        Self {
            start_kind: None,
            log: None,
            schedule: None,
            max_replay_depth: DEFAULT_MAX_REPLAY_DEPTH,
        }
    }
}

/// State shared between the wrapped reducer, the enhanced handle and every
/// scheduled flush task.
struct Shared<A> {
    queue: Vec<A>,
    suspended: bool,
    replay_depth: usize,
}

struct ReplayContext<H, A> {
    shared: Arc<Mutex<Shared<A>>>,
    /// Filled right after the underlying store is constructed; scheduled
    /// batches dispatch through it.
    store: Arc<OnceLock<H>>,
    schedule: Arc<dyn Schedule>,
    log: Option<LogFn<A>>,
    start_kind: Option<String>,
    max_replay_depth: usize,
}

impl<H, A> Clone for ReplayContext<H, A> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            store: Arc::clone(&self.store),
            schedule: Arc::clone(&self.schedule),
            log: self.log.clone(),
            start_kind: self.start_kind.clone(),
            max_replay_depth: self.max_replay_depth,
        }
    }
}

/// Store enhancer that replays actions emitted by slice reducers.
///
/// `enhance` turns a create-store function into one producing stores whose
/// reducers feed emitted actions back into the dispatch loop. Enhancers
/// compose by nesting the factories they produce.
pub struct ActionsEnhancer<A> {
    options: EnhancerOptions<A>,
}

impl<A: Action> ActionsEnhancer<A> {
    pub fn new(options: EnhancerOptions<A>) -> Self {
        Self { options }
    }

    /// Wrap a create-store function.
    ///
    /// The returned factory constructs the underlying store with a wrapped
    /// reducer and hands back an [`EnhancedStore`] over it. Queue and
    /// suspension state live per store, created at this point.
    pub fn enhance<S, H, C>(
        self,
        next_create_store: C,
    ) -> impl FnOnce(Reducer<S, A>, S) -> EnhancedStore<S, A, H>
    where
        S: DrainActions<A> + Clone + 'static,
        H: StoreApi<S, A> + Clone + Send + Sync + 'static,
        C: FnOnce(Reducer<S, A>, S) -> H,
    {
        move |reducer, initial_state| {
            let EnhancerOptions {
                start_kind,
                log,
                schedule,
                max_replay_depth,
            } = self.options;
            let schedule: Arc<dyn Schedule> = match schedule {
                Some(schedule) => schedule,
                None => Arc::new(TokioSchedule::new()),
            };
            let ctx = ReplayContext {
                shared: Arc::new(Mutex::new(Shared {
                    queue: Vec::new(),
                    suspended: start_kind.is_some(),
                    replay_depth: 0,
                })),
                store: Arc::new(OnceLock::new()),
                schedule,
                log,
                start_kind,
                max_replay_depth,
            };

            let store = next_create_store(wrap_reducer(reducer, ctx.clone()), initial_state);
            // The slot is freshly created above, so the first set always wins.
            let _ = ctx.store.set(store.clone());

            EnhancedStore {
                inner: store,
                ctx,
                _state: PhantomData,
            }
        }
    }
}

impl<A: Action> Default for ActionsEnhancer<A> {
    fn default() -> Self {
        Self::new(EnhancerOptions::default())
    }
}

/// Handle produced by the enhancer.
///
/// Delegates the whole [`StoreApi`] surface to the underlying store, except
/// that `replace_reducer` re-wraps the new reducer over the same queue and
/// suspension state, so pending actions survive the swap.
pub struct EnhancedStore<S, A, H> {
    inner: H,
    ctx: ReplayContext<H, A>,
    _state: PhantomData<fn() -> S>,
}

impl<S, A, H> EnhancedStore<S, A, H> {
    /// The wrapped store handle.
    pub fn inner(&self) -> &H {
        &self.inner
    }
}

impl<S, A, H: Clone> Clone for EnhancedStore<S, A, H> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            ctx: self.ctx.clone(),
            _state: PhantomData,
        }
    }
}

impl<S, A, H> StoreApi<S, A> for EnhancedStore<S, A, H>
where
    S: DrainActions<A> + Clone + 'static,
    A: Action,
    H: StoreApi<S, A> + Clone + Send + Sync + 'static,
{
    fn dispatch(&self, action: A) {
        self.inner.dispatch(action);
    }

    fn state_cloned(&self) -> S {
        self.inner.state_cloned()
    }

    fn replace_reducer(&self, reducer: Reducer<S, A>) {
        self.inner
            .replace_reducer(wrap_reducer(reducer, self.ctx.clone()));
    }
}

/// Wrap a reducer so every transition harvests, queues and maybe flushes.
fn wrap_reducer<S, A, H>(reducer: Reducer<S, A>, ctx: ReplayContext<H, A>) -> Reducer<S, A>
where
    S: DrainActions<A> + Clone + 'static,
    A: Action,
    H: StoreApi<S, A> + Send + Sync + 'static,
{
    Box::new(move |state: S, action: &A| {
        let mut result = (reducer)(state, action);

        // Harvest what the slice reducers emitted during this transition.
        let emitted = result.drain_actions();

        let flush = {
            let mut shared = ctx.shared.lock().unwrap();
            shared.queue.extend(emitted);

            // The first action of the start kind lifts the suspension for good.
            if shared.suspended && ctx.start_kind.as_deref() == Some(action.kind()) {
                shared.suspended = false;
            }

            if shared.suspended || shared.queue.is_empty() {
                None
            } else {
                let depth = shared.replay_depth + 1;
                if depth > ctx.max_replay_depth {
                    log::error!(
                        "replay depth {} exceeds limit {}, dropping {} queued action(s)",
                        depth,
                        ctx.max_replay_depth,
                        shared.queue.len()
                    );
                    shared.queue.clear();
                    None
                } else {
                    let batch = dedup_structural(std::mem::take(&mut shared.queue));
                    Some((batch, depth))
                }
            }
        };

        if let Some((batch, depth)) = flush {
            if let Some(log_flush) = &ctx.log {
                log_flush(SCHEDULE_LABEL, action.kind(), &batch);
            }
            log::debug!(
                "scheduling {} action(s) collected during {}",
                batch.len(),
                action.kind()
            );
            let slot = Arc::clone(&ctx.store);
            let shared = Arc::clone(&ctx.shared);
            let task: ScheduledTask = Box::new(move || {
                let Some(store) = slot.get() else {
                    log::warn!("dropping scheduled batch: store was never constructed");
                    return;
                };
                shared.lock().unwrap().replay_depth = depth;
                for action in batch {
                    store.dispatch(action);
                }
                shared.lock().unwrap().replay_depth = 0;
            });
            ctx.schedule.schedule(Duration::ZERO, task);
        }

        result
    })
}

/// Drop structurally-equal duplicates, keeping the first occurrence.
fn dedup_structural<A: PartialEq>(actions: Vec<A>) -> Vec<A> {
    let mut unique: Vec<A> = Vec::with_capacity(actions.len());
    for action in actions {
        if !unique.contains(&action) {
            unique.push(action);
        }
    }
    unique
}
