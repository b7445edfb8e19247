//! End-to-end replay flows on a tokio runtime with the default schedule.

use std::time::Duration;

use reducer_actions::{
    Action, ActionsEnhancer, DrainActions, Emitted, EnhancerOptions, Store, StoreApi,
};
use strum::IntoStaticStr;

#[derive(Debug, Clone, PartialEq, IntoStaticStr)]
enum JobAction {
    Queue,
    Start,
    Run,
}

impl Action for JobAction {
    fn kind(&self) -> &str {
        self.into()
    }
}

#[derive(Debug, Clone, Default)]
struct SchedulerState {
    queued: u32,
    completed: u32,
    emitted: Emitted<JobAction>,
}

#[derive(Debug, Clone, Default)]
struct AppState {
    scheduler: SchedulerState,
}

impl DrainActions<JobAction> for AppState {
    fn drain_actions(&mut self) -> Vec<JobAction> {
        self.scheduler.emitted.take()
    }
}

fn reduce(mut state: AppState, action: &JobAction) -> AppState {
    match action {
        JobAction::Queue => {
            state.scheduler.queued += 1;
            state.scheduler.emitted.emit(JobAction::Run);
        }
        JobAction::Run => state.scheduler.completed += 1,
        JobAction::Start => {}
    }
    state
}

/// Poll until `check` holds or a generous deadline passes.
async fn settled(check: impl Fn() -> bool) -> bool {
    for _ in 0..100 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    check()
}

#[tokio::test(flavor = "multi_thread")]
async fn emitted_actions_replay_without_explicit_drain() {
    let create_store = ActionsEnhancer::new(EnhancerOptions::default()).enhance(Store::create);
    let store = create_store(Box::new(reduce), AppState::default());

    store.dispatch(JobAction::Queue);

    let probe = store.clone();
    assert!(settled(move || probe.state_cloned().scheduler.completed == 1).await);
    assert!(store.state_cloned().scheduler.emitted.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn start_kind_releases_the_backlog() {
    let create_store = ActionsEnhancer::new(EnhancerOptions {
        start_kind: Some("Start".to_string()),
        ..EnhancerOptions::default()
    })
    .enhance(Store::create);
    let store = create_store(Box::new(reduce), AppState::default());

    // Queued while suspended: nothing replays.
    store.dispatch(JobAction::Queue);
    tokio::time::sleep(Duration::from_millis(25)).await;
    assert_eq!(store.state_cloned().scheduler.completed, 0);

    // The start kind releases the backlog.
    store.dispatch(JobAction::Start);
    let probe = store.clone();
    assert!(settled(move || probe.state_cloned().scheduler.completed == 1).await);

    // The suspension is gone for good: a later emission replays directly.
    store.dispatch(JobAction::Queue);
    let probe = store.clone();
    assert!(settled(move || probe.state_cloned().scheduler.completed == 2).await);
}

#[tokio::test(flavor = "multi_thread")]
async fn quiet_transitions_never_replay() {
    let create_store = ActionsEnhancer::new(EnhancerOptions::default()).enhance(Store::create);
    let store = create_store(Box::new(reduce), AppState::default());

    store.dispatch(JobAction::Start);
    store.dispatch(JobAction::Run);
    tokio::time::sleep(Duration::from_millis(25)).await;

    // Only the directly dispatched Run ran; nothing was scheduled on top.
    assert_eq!(store.state_cloned().scheduler.completed, 1);
    assert_eq!(store.state_cloned().scheduler.queued, 0);
}
