//! The firing executor: given a single enabled transition, atomically (from
//! the perspective of any one place) mutates token counts, emits a trace
//! record, and wakes every cluster downstream of the firing.

use crate::engine::trace::TraceRecord;
use crate::petri_net::{Net, TransitionId};
use crossbeam_channel::Sender;
use tracing::trace;

/// Fires `transition` against `net`: consumes its in-arcs, submits a trace
/// record, produces its out-arcs, then posts a wake signal to every cluster
/// in the transition's routing entry. Runs inline on the calling worker's
/// thread — there is no separate executor thread, only this function.
pub(crate) fn fire(net: &Net, transition: TransitionId, trace_tx: &Sender<TraceRecord>, wake: &[Sender<()>]) {
    for edge in net.in_arcs(transition) {
        let mut tokens = net.place_tokens[edge.node.0 as usize].lock().expect("place lock poisoned");
        *tokens -= edge.weight.get() as u64;
    }

    // Blocks if the trace channel is full; this is the only point at which
    // a firing worker can suspend.
    let _ = trace_tx.send(TraceRecord { transition });

    for edge in net.out_arcs(transition) {
        let mut tokens = net.place_tokens[edge.node.0 as usize].lock().expect("place lock poisoned");
        *tokens += edge.weight.get() as u64;
    }

    trace!(transition = %net.transition_name(transition), "fired");

    for &cluster in net.triggered_clusters(transition) {
        // Non-blocking. A pending wake already covers this post, and a
        // disconnected receiver just means shutdown is already underway.
        let _ = wake[cluster.0 as usize].try_send(());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::petri_net::NetBuilder;
    use crossbeam_channel::unbounded;

    #[test]
    fn fire_moves_tokens_and_emits_trace_record() {
        let mut b = NetBuilder::new();
        b.add_place("p1", 1).unwrap();
        b.add_place("p2", 0).unwrap();
        b.add_transition("t1").unwrap();
        b.add_arc("p1", "t1", 1).unwrap();
        b.add_arc("t1", "p2", 1).unwrap();
        let net = b.build();
        let t1 = net.transition_id("t1").unwrap();

        let (trace_tx, trace_rx) = unbounded();
        let wake: Vec<Sender<()>> = net.clusters().iter().map(|_| unbounded().0).collect();

        fire(&net, t1, &trace_tx, &wake);

        assert_eq!(net.tokens(net.place_id("p1").unwrap()), 0);
        assert_eq!(net.tokens(net.place_id("p2").unwrap()), 1);
        let record = trace_rx.try_recv().unwrap();
        assert_eq!(record.transition, t1);
    }

    #[test]
    fn fire_conserves_weighted_delta() {
        let mut b = NetBuilder::new();
        b.add_place("p1", 10).unwrap();
        b.add_place("p2", 0).unwrap();
        b.add_transition("t1").unwrap();
        b.add_arc("p1", "t1", 3).unwrap();
        b.add_arc("t1", "p2", 1).unwrap();
        let net = b.build();
        let t1 = net.transition_id("t1").unwrap();
        let (trace_tx, _trace_rx) = unbounded();
        let wake: Vec<Sender<()>> = net.clusters().iter().map(|_| unbounded().0).collect();

        fire(&net, t1, &trace_tx, &wake);

        assert_eq!(net.tokens(net.place_id("p1").unwrap()), 7);
        assert_eq!(net.tokens(net.place_id("p2").unwrap()), 1);
    }
}
