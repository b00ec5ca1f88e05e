//! One worker thread per work cluster: waits for a wake signal, rescans its
//! cluster's transitions for enablement, and fires one enabled transition
//! chosen uniformly at random.

use crate::engine::executor;
use crate::engine::trace::TraceRecord;
use crate::petri_net::{Net, TransitionId};
use crossbeam_channel::{Receiver, Sender};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};

/// Runs one cluster's worker loop to completion on the calling thread.
///
/// `wake_rx` is this cluster's own wake channel receiver. `self_wake` is a
/// sender clone for the same channel, used for the step-5 re-post.
/// `all_wakes` lets the firing executor post to *any* cluster triggered by
/// a firing in this one. `shutdown` is the shared flag the supervisor sets
/// before nudging every wake channel; a worker checks it right after each
/// wake and exits instead of scanning again once it is set.
pub(crate) fn run(
    net: &Net,
    cluster_index: usize,
    wake_rx: Receiver<()>,
    self_wake: Sender<()>,
    all_wakes: Arc<Vec<Sender<()>>>,
    shutdown: Arc<AtomicBool>,
    trace_tx: Sender<TraceRecord>,
    seed: Option<u64>,
) {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(cluster_index as u64)),
        None => StdRng::from_entropy(),
    };
    let transitions = &net.clusters()[cluster_index].transitions;

    loop {
        match wake_rx.recv() {
            Ok(()) => {
                if shutdown.load(Ordering::Acquire) {
                    debug!(cluster = cluster_index, "worker: shutdown observed, exiting");
                    return;
                }
            }
            Err(_) => {
                debug!(cluster = cluster_index, "worker: wake channel disconnected, exiting");
                return;
            }
        }

        let enabled: Vec<TransitionId> = transitions.iter().copied().filter(|&t| net.is_enabled(t)).collect();
        if enabled.is_empty() {
            continue;
        }

        // Re-post before firing: if another transition is still enabled
        // after this fire, the cluster keeps making progress without a
        // busy loop. Non-blocking; an already-pending wake is fine.
        let _ = self_wake.try_send(());

        let chosen = enabled[rng.gen_range(0..enabled.len())];
        trace!(cluster = cluster_index, transition = %net.transition_name(chosen), "firing");
        executor::fire(net, chosen, &trace_tx, all_wakes.as_slice());
    }
}
