//! Store enhancer that replays actions emitted by slice reducers.
//!
//! In a unidirectional store, slice reducers sometimes know that a transition
//! should cause follow-up transitions, but reducers are pure and must not
//! dispatch. This crate gives them a typed side channel: a slice buffers
//! follow-up actions in its [`Emitted`] field, and the enhancer drains those
//! buffers after every transition, deduplicates the backlog by structural
//! equality, and schedules one deferred task that dispatches the batch back
//! into the same store.
//!
//! # Architecture
//!
//! ```text
//! create_store ──► ActionsEnhancer::enhance ──► EnhancedStore
//!                                                    │
//!                          dispatch(action) ─────────┤
//!                                                    ▼
//!                       wrapped reducer: reduce, drain, queue, flush
//!                                                    │
//!                              Schedule (next turn)  ▼
//!                              dispatch each batched action
//! ```
//!
//! Flushing can be suspended until a configured start kind is seen, observed
//! through a log callback, and bounded against runaway replay cascades; see
//! [`EnhancerOptions`].
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use reducer_actions::{
//!     Action, ActionsEnhancer, DrainActions, Emitted, EnhancerOptions, QueueSchedule, Store,
//!     StoreApi,
//! };
//!
//! #[derive(Debug, Clone, PartialEq)]
//! enum JobAction {
//!     Submit,
//!     Run,
//! }
//!
//! impl Action for JobAction {
//!     fn kind(&self) -> &str {
//!         match self {
//!             JobAction::Submit => "Submit",
//!             JobAction::Run => "Run",
//!         }
//!     }
//! }
//!
//! #[derive(Debug, Clone, Default)]
//! struct JobsState {
//!     submitted: u32,
//!     completed: u32,
//!     emitted: Emitted<JobAction>,
//! }
//!
//! #[derive(Debug, Clone, Default)]
//! struct AppState {
//!     jobs: JobsState,
//! }
//!
//! impl DrainActions<JobAction> for AppState {
//!     fn drain_actions(&mut self) -> Vec<JobAction> {
//!         self.jobs.emitted.take()
//!     }
//! }
//!
//! fn reduce(mut state: AppState, action: &JobAction) -> AppState {
//!     match action {
//!         JobAction::Submit => {
//!             state.jobs.submitted += 1;
//!             // Ask for a follow-up transition instead of dispatching here.
//!             state.jobs.emitted.emit(JobAction::Run);
//!         }
//!         JobAction::Run => state.jobs.completed += 1,
//!     }
//!     state
//! }
//!
//! let schedule = QueueSchedule::new();
//! let enhancer = ActionsEnhancer::new(EnhancerOptions {
//!     schedule: Some(Arc::new(schedule.clone())),
//!     ..EnhancerOptions::default()
//! });
//! let store = enhancer.enhance(Store::create)(Box::new(reduce), AppState::default());
//!
//! store.dispatch(JobAction::Submit);
//! schedule.run_until_idle();
//!
//! let state = store.state_cloned();
//! assert_eq!(state.jobs.submitted, 1);
//! assert_eq!(state.jobs.completed, 1);
//! ```
//!
//! On a tokio runtime the `schedule` option can be left unset: batches are
//! then spawned onto the current runtime and replay without an explicit
//! drain.

mod action;
mod emitted;
mod enhancer;
mod schedule;
mod store;

pub use action::Action;
pub use emitted::{DrainActions, Emitted};
pub use enhancer::{
    ActionsEnhancer, EnhancedStore, EnhancerOptions, LogFn, DEFAULT_MAX_REPLAY_DEPTH,
    SCHEDULE_LABEL,
};
pub use schedule::{QueueSchedule, Schedule, ScheduledTask, TokioSchedule};
pub use store::{Reducer, Store, StoreApi};
