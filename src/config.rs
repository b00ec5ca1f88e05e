//! Ambient configuration for a run, threaded through `Supervisor::run`.

use std::time::Duration;

/// Tunables for one run: a 5 second deadline and a 100 millisecond
/// quiescence patience by default.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Absolute maximum run duration.
    pub deadline: Duration,
    /// Quiescence window after which the trace writer signals shutdown.
    pub patience: Duration,
    /// Bounded capacity of the trace channel.
    pub trace_channel_capacity: usize,
    /// Deterministic RNG seed for transition selection, if reproducibility
    /// is needed (tests). `None` uses the thread-local RNG.
    pub seed: Option<u64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            deadline: Duration::from_secs(5),
            patience: Duration::from_millis(100),
            trace_channel_capacity: 100,
            seed: None,
        }
    }
}

impl RunConfig {
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn with_patience(mut self, patience: Duration) -> Self {
        self.patience = patience;
        self
    }

    pub fn with_trace_channel_capacity(mut self, capacity: usize) -> Self {
        self.trace_channel_capacity = capacity;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
