//! Frame-coalesced triggers.
//!
//! Property setters never do expensive work inline. They call
//! [`Trigger::request`], and the frame loop calls [`Trigger::take`] once per
//! frame to decide whether the deferred work runs. Any number of requests
//! between two frames collapse into a single execution, which is what keeps
//! a mutate → redraw → mutate chain from looping.

/// A "schedule once, run at most once per frame" flag.
#[derive(Debug, Default, Clone)]
pub struct Trigger {
    pending: bool,
    runs: u64,
}

impl Trigger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the work as due. Idempotent until the next [`take`](Self::take).
    pub fn request(&mut self) {
        self.pending = true;
    }

    /// Consume the pending request. Returns `true` at most once per batch of
    /// requests; the caller runs the deferred work when it does.
    pub fn take(&mut self) -> bool {
        if !self.pending {
            return false;
        }
        self.pending = false;
        self.runs += 1;
        true
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Number of times [`take`](Self::take) granted a run.
    pub fn runs(&self) -> u64 {
        self.runs
    }
}
