//! Per-view lifecycle guarding against late or repeated snapshots.

/// Lifecycle of one view bound to a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ViewStatus {
    /// No listener attached.
    Detached,
    /// Listener attached, no snapshot received yet.
    Pending,
    /// At least one snapshot received.
    Ready,
}

/// View state fed by a subscription.
///
/// Snapshots applied while detached are ignored, so a late notification can
/// never overwrite state owned by a consumer that already went away. The last
/// known value survives a detach/attach cycle, and the first snapshot after a
/// reattach always counts as a change.
#[derive(Debug, Clone)]
pub struct LiveState<T> {
    status: ViewStatus,
    value: Option<T>,
}

impl<T> Default for LiveState<T> {
    fn default() -> Self {
        Self {
            status: ViewStatus::Detached,
            value: None,
        }
    }
}

impl<T: PartialEq> LiveState<T> {
    /// Detached state with no known value.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start waiting for the first snapshot. No-op when already attached.
    pub fn attach(&mut self) {
        if self.status == ViewStatus::Detached {
            self.status = ViewStatus::Pending;
        }
    }

    /// Stop accepting snapshots.
    pub fn detach(&mut self) {
        self.status = ViewStatus::Detached;
    }

    /// Record a snapshot. Returns `true` when the visible value changed.
    pub fn apply(&mut self, snapshot: T) -> bool {
        match self.status {
            ViewStatus::Detached => false,
            ViewStatus::Pending => {
                self.status = ViewStatus::Ready;
                self.value = Some(snapshot);
                true
            }
            ViewStatus::Ready => {
                if self.value.as_ref() == Some(&snapshot) {
                    return false;
                }
                self.value = Some(snapshot);
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_moves_through_pending_to_ready() {
        let mut state = LiveState::new();
        assert_eq!(state.status, ViewStatus::Detached);

        state.attach();
        assert_eq!(state.status, ViewStatus::Pending);
        assert_eq!(state.value.as_ref(), None);

        assert!(state.apply(vec![1]));
        assert_eq!(state.status, ViewStatus::Ready);
        assert_eq!(state.value.as_ref(), Some(&vec![1]));
    }

    #[test]
    fn identical_snapshot_is_not_a_change() {
        let mut state = LiveState::new();
        state.attach();
        assert!(state.apply("a"));
        assert!(!state.apply("a"));
        assert!(state.apply("b"));
    }

    #[test]
    fn snapshots_after_detach_are_ignored() {
        let mut state = LiveState::new();
        state.attach();
        state.apply(1);
        state.detach();

        assert!(!state.apply(2));
        assert_eq!(state.value.as_ref(), Some(&1));
        assert_eq!(state.status, ViewStatus::Detached);
    }

    #[test]
    fn reattach_keeps_last_known_value_while_pending() {
        let mut state = LiveState::new();
        state.attach();
        state.apply(1);
        state.detach();
        state.attach();

        assert_eq!(state.status, ViewStatus::Pending);
        assert_eq!(state.value.as_ref(), Some(&1));
        assert!(state.apply(1));
        assert_eq!(state.status, ViewStatus::Ready);
    }
}
