use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Loading/error flags shared by everything that displays gateway activity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrchestrationState {
    pub in_flight: bool,
    pub last_error: Option<String>,
}

/// Cloneable handle to one session's orchestration state.
///
/// Readers only get snapshots; the mutators are crate-private and used by the
/// gateway alone.
#[derive(Debug, Clone, Default)]
pub struct StateHandle {
    inner: Arc<RwLock<OrchestrationState>>,
}

impl StateHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> OrchestrationState {
        self.read().clone()
    }

    pub fn is_in_flight(&self) -> bool {
        self.read().in_flight
    }

    pub fn last_error(&self) -> Option<String> {
        self.read().last_error.clone()
    }

    /// Marks a call as started and clears the previous error. The returned
    /// guard clears `in_flight` when dropped, whatever the exit path.
    pub(crate) fn begin(&self) -> InFlightGuard {
        let mut state = self.write();
        state.in_flight = true;
        state.last_error = None;
        InFlightGuard {
            handle: self.clone(),
        }
    }

    /// Like [`begin`](Self::begin), but refuses when a call is already in
    /// flight. Check and set happen under one write lock.
    pub(crate) fn try_begin(&self) -> Option<InFlightGuard> {
        let mut state = self.write();
        if state.in_flight {
            return None;
        }
        state.in_flight = true;
        state.last_error = None;
        Some(InFlightGuard {
            handle: self.clone(),
        })
    }

    pub(crate) fn set_error(&self, message: impl Into<String>) {
        self.write().last_error = Some(message.into());
    }

    // A panicking writer cannot leave these two flags half-updated, so a
    // poisoned lock is still safe to use.
    fn read(&self) -> RwLockReadGuard<'_, OrchestrationState> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, OrchestrationState> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}

pub(crate) struct InFlightGuard {
    handle: StateHandle,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.handle.write().in_flight = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_is_idle() {
        let state = StateHandle::new();
        assert_eq!(state.snapshot(), OrchestrationState::default());
        assert!(!state.is_in_flight());
        assert!(state.last_error().is_none());
    }

    #[test]
    fn test_guard_clears_in_flight_and_begin_clears_error() {
        let state = StateHandle::new();
        state.set_error("Failed to analyze text. Please try again.");

        {
            let _guard = state.begin();
            assert!(state.is_in_flight());
            assert!(state.last_error().is_none());
            state.set_error("boom");
        }

        let snapshot = state.snapshot();
        assert!(!snapshot.in_flight);
        assert_eq!(snapshot.last_error.as_deref(), Some("boom"));
    }

    #[test]
    fn test_try_begin_refuses_while_in_flight() {
        let state = StateHandle::new();
        let guard = state.try_begin().expect("idle state should admit a call");
        assert!(state.try_begin().is_none());
        assert!(state.is_in_flight());

        drop(guard);
        assert!(!state.is_in_flight());
        assert!(state.try_begin().is_some());
    }

    #[test]
    fn test_try_begin_admits_one_of_many_threads() {
        let state = StateHandle::new();
        let admitted: usize = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    let state = state.clone();
                    s.spawn(move || state.try_begin().map(std::mem::forget).is_some())
                })
                .collect();
            handles
                .into_iter()
                .map(|h| usize::from(h.join().unwrap()))
                .sum()
        });
        assert_eq!(admitted, 1);
    }

    #[test]
    fn test_clones_share_state() {
        let state = StateHandle::new();
        let reader = state.clone();
        let _guard = state.begin();
        assert!(reader.is_in_flight());
    }
}
