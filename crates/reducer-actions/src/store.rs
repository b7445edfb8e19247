//! Container contract and the reference in-memory store.

use std::sync::{Arc, Mutex};

/// Pure transition function: produces the next state from the current state
/// and an action.
pub type Reducer<S, A> = Box<dyn Fn(S, &A) -> S + Send>;

/// The surface a state container exposes to the enhancer and to application
/// code.
///
/// Handles are cheap shared-ownership values; cloning one yields another view
/// of the same state cell. `dispatch` is synchronous and must not be
/// re-entered from inside a reducer or a log callback.
pub trait StoreApi<S: Clone, A> {
    /// Run one transition: feed the action through the current reducer and
    /// store the result.
    fn dispatch(&self, action: A);

    /// Snapshot of the current state.
    fn state_cloned(&self) -> S;

    /// Swap the transition function. State is kept as-is.
    fn replace_reducer(&self, reducer: Reducer<S, A>);
}

struct StoreInner<S, A> {
    state: S,
    reducer: Reducer<S, A>,
}

/// Reference state container.
///
/// Holds the state and the reducer behind a shared handle so dispatches from
/// deferred tasks reach the same cell. [`Store::create`] is the base
/// create-store factory that enhancers compose with.
pub struct Store<S, A> {
    inner: Arc<Mutex<StoreInner<S, A>>>,
}

impl<S, A> Clone for Store<S, A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: Clone, A> Store<S, A> {
    /// Create a store from a reducer and an initial state.
    pub fn create(reducer: Reducer<S, A>, initial_state: S) -> Self {
        Self {
            inner: Arc::new(Mutex::new(StoreInner {
                state: initial_state,
                reducer,
            })),
        }
    }
}

impl<S: Clone, A> StoreApi<S, A> for Store<S, A> {
    fn dispatch(&self, action: A) {
        let mut inner = self.inner.lock().unwrap();
        let next = (inner.reducer)(inner.state.clone(), &action);
        inner.state = next;
    }

    fn state_cloned(&self) -> S {
        self.inner.lock().unwrap().state.clone()
    }

    fn replace_reducer(&self, reducer: Reducer<S, A>) {
        self.inner.lock().unwrap().reducer = reducer;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter_reducer(state: u32, action: &i32) -> u32 {
        state.wrapping_add_signed(*action)
    }

    #[test]
    fn test_dispatch_applies_reducer() {
        let store = Store::create(Box::new(counter_reducer), 0u32);

        store.dispatch(2);
        store.dispatch(3);

        assert_eq!(store.state_cloned(), 5);
    }

    #[test]
    fn test_cloned_handles_share_state() {
        let store = Store::create(Box::new(counter_reducer), 0u32);
        let handle = store.clone();

        handle.dispatch(7);

        assert_eq!(store.state_cloned(), 7);
    }

    #[test]
    fn test_replace_reducer_swaps_transition_function() {
        let store = Store::create(Box::new(counter_reducer), 10u32);

        store.replace_reducer(Box::new(|state, _action| state * 2));
        store.dispatch(1);

        assert_eq!(store.state_cloned(), 20);
    }
}
