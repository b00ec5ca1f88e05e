//! Starts workers, arms the deadline timer, drives the quiescence watchdog,
//! and shuts everything down when either fires first.

use crate::config::RunConfig;
use crate::engine::trace::{self, TraceRecord};
use crate::engine::worker;
use crate::petri_net::Net;
use crossbeam_channel::{bounded, Sender};
use std::collections::BTreeMap;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::info;

/// Which race source ended the run first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    Deadline,
    Quiescence,
}

/// Final token counts and why the run ended, returned from `RunHandle::await_shutdown`.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub reason: ShutdownReason,
    pub final_tokens: BTreeMap<String, u64>,
}

/// Owns the background threads of one run. Dropping this without calling
/// `await_shutdown` detaches the threads; they still run to completion.
/// There is no forced interrupt.
pub struct RunHandle {
    // Kept alive until shutdown so the wake table outlives every worker
    // that might still try to use it.
    _shutdown: Arc<AtomicBool>,
    _wakes: Arc<Vec<Sender<()>>>,
    worker_handles: Vec<JoinHandle<()>>,
    trace_handle: JoinHandle<BTreeMap<String, u64>>,
    coordinator: JoinHandle<ShutdownReason>,
}

impl RunHandle {
    /// Blocks until shutdown has completed: the coordinator has picked a
    /// reason, every worker has exited, and the trace writer has drained.
    pub fn await_shutdown(self) -> RunSummary {
        let reason = self.coordinator.join().expect("coordinator thread panicked");
        for handle in self.worker_handles {
            handle.join().expect("worker thread panicked");
        }
        let final_tokens = self.trace_handle.join().expect("trace writer thread panicked");
        RunSummary { reason, final_tokens }
    }
}

pub struct Supervisor;

impl Supervisor {
    /// Starts a run against an already-built (and therefore already
    /// partitioned) net. `net` must outlive the returned handle; callers
    /// typically wrap it in an `Arc` and keep it alive until after
    /// `await_shutdown` returns.
    pub fn run(net: Arc<Net>, config: RunConfig, sink: Box<dyn Write + Send>) -> RunHandle {
        let cluster_count = net.cluster_count();
        let initial = net.snapshot_tokens();

        let mut wake_txs = Vec::with_capacity(cluster_count);
        let mut wake_rxs = Vec::with_capacity(cluster_count);
        for _ in 0..cluster_count {
            let (tx, rx) = bounded(1);
            wake_txs.push(tx);
            wake_rxs.push(rx);
        }
        let wakes = Arc::new(wake_txs);

        let (trace_tx, trace_rx) = bounded::<TraceRecord>(config.trace_channel_capacity);
        let (wind_down_tx, wind_down_rx) = bounded::<()>(cluster_count.max(1));
        let (shutdown_reason_tx, shutdown_reason_rx) = bounded(2);
        let shutdown = Arc::new(AtomicBool::new(false));

        let mut worker_handles = Vec::with_capacity(cluster_count);
        for (index, wake_rx) in wake_rxs.into_iter().enumerate() {
            let net = net.clone();
            let self_wake = wakes[index].clone();
            let all_wakes = wakes.clone();
            let shutdown = shutdown.clone();
            let trace_tx = trace_tx.clone();
            let seed = config.seed;
            worker_handles.push(thread::spawn(move || {
                worker::run(&net, index, wake_rx, self_wake, all_wakes, shutdown, trace_tx, seed);
            }));
        }

        // Seed each worker so it scans its cluster at least once even if no
        // other signal ever arrives.
        for tx in wakes.iter() {
            let _ = tx.try_send(());
        }

        let net_for_trace = net.clone();
        let patience = config.patience;
        let shutdown_tx_for_trace = shutdown_reason_tx.clone();
        let trace_handle = thread::spawn(move || {
            trace::run(&net_for_trace, &initial, trace_rx, patience, wind_down_rx, shutdown_tx_for_trace, sink)
        });

        let deadline = config.deadline;
        let shutdown_tx_for_deadline = shutdown_reason_tx.clone();
        thread::spawn(move || {
            thread::sleep(deadline);
            let _ = shutdown_tx_for_deadline.try_send(ShutdownReason::Deadline);
        });
        drop(shutdown_reason_tx);

        let coordinator_wakes = wakes.clone();
        let coordinator_shutdown = shutdown.clone();
        let cluster_count_for_coordinator = cluster_count;
        let coordinator = thread::spawn(move || -> ShutdownReason {
            let reason = shutdown_reason_rx.recv().expect("neither deadline nor quiescence fired");
            info!(?reason, "supervisor: shutdown starting");
            coordinator_shutdown.store(true, Ordering::Release);
            for tx in coordinator_wakes.iter() {
                let _ = tx.try_send(());
            }
            for _ in 0..cluster_count_for_coordinator.max(1) {
                let _ = wind_down_tx.try_send(());
            }
            reason
        });

        RunHandle {
            _shutdown: shutdown,
            _wakes: wakes,
            worker_handles,
            trace_handle,
            coordinator,
        }
    }
}
