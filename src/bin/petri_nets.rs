//! CLI entry point: load a JSON net, run it to quiescence or deadline, and
//! pretty-print the final state.

use petri_nets::{loader, trace_file, RunConfig, Supervisor};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut args = std::env::args().skip(1);
    let net_path = args.next().unwrap_or_else(|| "net.json".to_string());
    let trace_path = args.next().unwrap_or_else(|| "trace.txt".to_string());

    let builder = match loader::load_from_path(&net_path) {
        Ok(builder) => builder,
        Err(e) => {
            eprintln!("failed to load net from {net_path}: {e}");
            return ExitCode::from(1);
        }
    };
    let net = Arc::new(builder.build());
    tracing::info!(places = net.place_count(), transitions = net.transition_count(), clusters = net.cluster_count(), "net loaded");

    let sink = match trace_file::open(&trace_path) {
        Ok(sink) => sink,
        Err(e) => {
            eprintln!("failed to open trace file {trace_path}: {e}");
            return ExitCode::from(2);
        }
    };

    let handle = Supervisor::run(net.clone(), RunConfig::default(), sink);
    let summary = handle.await_shutdown();

    println!("Run ended: {:?}", summary.reason);
    println!("{}", net);

    ExitCode::SUCCESS
}
