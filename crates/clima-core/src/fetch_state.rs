//! Forecast fetch state machine.
//!
//! Tracks the one query whose result is still wanted. A newer query replaces
//! the pending one; completions for any other request id are stale.

/// Fetch state owned by the forecast view model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchState {
    #[default]
    Idle,
    Loading { request_id: u64 },
}

impl FetchState {
    /// State after dispatching a query tagged `request_id`.
    pub fn start(self, request_id: u64) -> Self {
        FetchState::Loading { request_id }
    }

    /// True if a completion for `request_id` should be applied.
    pub fn accepts(self, request_id: u64) -> bool {
        matches!(self, FetchState::Loading { request_id: pending } if pending == request_id)
    }

    /// State after processing a FetchDone message.
    pub fn on_fetch_done(self, request_id: u64) -> Self {
        if self.accepts(request_id) {
            FetchState::Idle
        } else {
            self
        }
    }

    pub fn is_loading(self) -> bool {
        matches!(self, FetchState::Loading { .. })
    }
}
