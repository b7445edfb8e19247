//! Wires a small job-queue store with the actions enhancer.
//!
//! Run with `RUST_LOG=debug cargo run --example configure_store` to watch the
//! flushes go by.

use std::sync::Arc;
use std::time::Duration;

use reducer_actions::{
    Action, ActionsEnhancer, DrainActions, Emitted, EnhancerOptions, Store, StoreApi,
};
use strum::IntoStaticStr;

#[derive(Debug, Clone, PartialEq, IntoStaticStr)]
enum JobAction {
    Bootstrap,
    Submit { id: u64 },
    Run { id: u64 },
    Record { id: u64 },
}

impl Action for JobAction {
    fn kind(&self) -> &str {
        self.into()
    }
}

#[derive(Debug, Clone, Default)]
struct QueueState {
    submitted: Vec<u64>,
    completed: Vec<u64>,
    emitted: Emitted<JobAction>,
}

#[derive(Debug, Clone, Default)]
struct HistoryState {
    runs: Vec<u64>,
    emitted: Emitted<JobAction>,
}

#[derive(Debug, Clone, Default)]
struct AppState {
    queue: QueueState,
    history: HistoryState,
}

impl DrainActions<JobAction> for AppState {
    fn drain_actions(&mut self) -> Vec<JobAction> {
        let mut actions = self.queue.emitted.take();
        actions.extend(self.history.emitted.take());
        actions
    }
}

fn queue_reducer(mut state: QueueState, action: &JobAction) -> QueueState {
    match action {
        JobAction::Submit { id } => {
            state.submitted.push(*id);
            // The job should run on a later tick, once this transition is done.
            state.emitted.emit(JobAction::Run { id: *id });
        }
        JobAction::Run { id } => {
            state.completed.push(*id);
            state.emitted.emit(JobAction::Record { id: *id });
        }
        _ => {}
    }
    state
}

fn history_reducer(mut state: HistoryState, action: &JobAction) -> HistoryState {
    if let JobAction::Record { id } = action {
        state.runs.push(*id);
    }
    state
}

fn reduce(mut state: AppState, action: &JobAction) -> AppState {
    state.queue = queue_reducer(state.queue, action);
    state.history = history_reducer(state.history, action);
    state
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let enhancer = ActionsEnhancer::new(EnhancerOptions {
        // Hold every emission back until the app says it is ready.
        start_kind: Some("Bootstrap".to_string()),
        log: Some(Arc::new(|label, kind, batch: &[JobAction]| {
            log::info!("{label}: {kind} -> {batch:?}");
        })),
        ..EnhancerOptions::default()
    });
    let create_store = enhancer.enhance(Store::create);
    let store = create_store(Box::new(reduce), AppState::default());

    // Submissions land while the store is still suspended.
    store.dispatch(JobAction::Submit { id: 1 });
    store.dispatch(JobAction::Submit { id: 2 });

    // Bootstrap releases the backlog; the runs then emit their own records.
    store.dispatch(JobAction::Bootstrap);
    tokio::time::sleep(Duration::from_millis(50)).await;

    let state = store.state_cloned();
    println!("submitted: {:?}", state.queue.submitted);
    println!("completed: {:?}", state.queue.completed);
    println!("recorded:  {:?}", state.history.runs);

    Ok(())
}
