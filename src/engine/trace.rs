//! Consumes the stream of fired transitions, maintains a shadow of token
//! counts, and emits the human-readable state graph. Doubles as the
//! quiescence watchdog: silence longer than `patience` signals shutdown.

use crate::engine::supervisor::ShutdownReason;
use crate::petri_net::{Net, PlaceId, TransitionId};
use crossbeam_channel::{select, Receiver, Sender};
use std::collections::BTreeMap;
use std::io::Write;
use std::time::Duration;
use tracing::{debug, warn};

/// One fired transition, as submitted by the firing executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceRecord {
    pub transition: TransitionId,
}

/// Shadow of token counts, keyed by place name so output is independent of
/// internal place IDs. Rebuilt incrementally from the snapshot taken at
/// `Run` time; never reads the live `Net` token cells, so it cannot race
/// with firing workers.
struct Shadow<'a> {
    net: &'a Net,
    tokens: Vec<u64>,
}

impl<'a> Shadow<'a> {
    fn new(net: &'a Net, initial: &[(PlaceId, u64)]) -> Self {
        let mut tokens = vec![0u64; net.place_count()];
        for &(id, count) in initial {
            tokens[id.0 as usize] = count;
        }
        Self { net, tokens }
    }

    fn apply(&mut self, transition: TransitionId) {
        for edge in self.net.in_arcs(transition) {
            self.tokens[edge.node.0 as usize] -= edge.weight.get() as u64;
        }
        for edge in self.net.out_arcs(transition) {
            self.tokens[edge.node.0 as usize] += edge.weight.get() as u64;
        }
    }

    /// `| place: tokens | ...`, places in lexicographic order.
    fn format_line(&self) -> String {
        let mut ordered: Vec<(&str, u64)> = (0..self.net.place_count())
            .map(|i| (self.net.place_name(PlaceId(i as u32)), self.tokens[i]))
            .collect();
        ordered.sort_by(|a, b| a.0.cmp(b.0));
        let mut line = String::new();
        for (name, tokens) in ordered {
            line.push_str(&format!("| {}: {} ", name, tokens));
        }
        line.push('|');
        line
    }

    fn token_snapshot(&self) -> BTreeMap<String, u64> {
        (0..self.net.place_count())
            .map(|i| (self.net.place_name(PlaceId(i as u32)).to_string(), self.tokens[i]))
            .collect()
    }
}

/// Runs the trace writer to completion on the calling thread. `sink` is
/// where the human-readable state graph is written (a truncated file, a
/// `Vec<u8>` for tests, anything `Write`). An I/O failure here is logged and
/// ends the writer without aborting the simulation.
pub(crate) fn run(
    net: &Net,
    initial: &[(PlaceId, u64)],
    trace_rx: Receiver<TraceRecord>,
    patience: Duration,
    wind_down_rx: Receiver<()>,
    shutdown_tx: Sender<ShutdownReason>,
    mut sink: impl Write,
) -> BTreeMap<String, u64> {
    let mut shadow = Shadow::new(net, initial);
    if let Err(e) = writeln!(sink, "State Graph") {
        warn!(error = %e, "trace writer: failed to write header, exiting");
        return shadow.token_snapshot();
    }
    if let Err(e) = writeln!(sink, "{}", shadow.format_line()) {
        warn!(error = %e, "trace writer: failed to write initial state, exiting");
        return shadow.token_snapshot();
    }

    let mut quiescence_signaled = false;

    loop {
        select! {
            recv(trace_rx) -> msg => match msg {
                Ok(record) => {
                    quiescence_signaled = false;
                    shadow.apply(record.transition);
                    let line = format!(
                        "\nFired transition {}\n\n{}",
                        net.transition_name(record.transition),
                        shadow.format_line(),
                    );
                    if let Err(e) = writeln!(sink, "{}", line) {
                        warn!(error = %e, "trace writer: failed to write record, exiting");
                        return shadow.token_snapshot();
                    }
                }
                Err(_) => {
                    debug!("trace writer: channel closed, exiting");
                    return shadow.token_snapshot();
                }
            },
            recv(wind_down_rx) -> _ => {
                drain(&trace_rx, &mut shadow, &mut sink, patience);
                return shadow.token_snapshot();
            },
            default(patience) => {
                if !quiescence_signaled {
                    quiescence_signaled = true;
                    let _ = shutdown_tx.try_send(ShutdownReason::Quiescence);
                }
            },
        }
    }
}

/// After shutdown begins, keep consuming any records still in flight for up
/// to one more `patience` interval rather than dropping them.
fn drain(trace_rx: &Receiver<TraceRecord>, shadow: &mut Shadow, sink: &mut impl Write, patience: Duration) {
    loop {
        match trace_rx.recv_timeout(patience) {
            Ok(record) => {
                shadow.apply(record.transition);
                let _ = writeln!(
                    sink,
                    "\nFired transition {}\n\n{}",
                    shadow.net.transition_name(record.transition),
                    shadow.format_line(),
                );
            }
            Err(_) => return,
        }
    }
}
