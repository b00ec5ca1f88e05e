//! The concurrent firing engine: workers, the firing executor, the
//! supervisor, and the trace writer/quiescence watchdog.

mod executor;
mod supervisor;
mod trace;
mod worker;

pub use supervisor::{RunHandle, RunSummary, ShutdownReason, Supervisor};
pub use trace::TraceRecord;
