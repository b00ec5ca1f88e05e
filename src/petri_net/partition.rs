//! Splits a built net into weakly-connected *work clusters* and computes the
//! cross-cluster routing table, so disjoint regions of the net can fire
//! concurrently without contention. See the component design notes for why
//! the routing table is materialized even though, in a connected net, a
//! transition's triggered clusters reduce to just its own.

use super::{Net, PlaceId, TransitionId};
use derive_more::Display;
use std::collections::VecDeque;

/// Stable integer ID of a work cluster, assigned by order of discovery
/// during the flood fill. Internal only: nothing outside the partitioner
/// depends on cluster IDs being assigned in any particular order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[display(fmt = "c{}", _0)]
pub struct ClusterId(pub(crate) u32);

/// A maximal weakly-connected subgraph of the net's place/transition
/// adjacency: the unit of concurrency. Each cluster owns a disjoint set of
/// places and transitions and a single wake channel (attached later by the
/// engine, not here, since the partitioner itself is a pure function of
/// topology and has no runtime state).
#[derive(Debug, Clone)]
pub struct WorkCluster {
    pub id: ClusterId,
    pub places: Vec<PlaceId>,
    pub transitions: Vec<TransitionId>,
}

/// Node kind used only while flood-filling the undirected projection of the
/// bipartite place/transition graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Node {
    Place(PlaceId),
    Transition(TransitionId),
}

/// Computes work clusters and the routing table for `net` and stores both
/// on it. Called exactly once, from `NetBuilder::build`. Pure function of
/// the adjacency indices already present on `net`; touches nothing else.
pub(crate) fn partition(net: &mut Net) {
    let place_count = net.places.len();
    let transition_count = net.transitions.len();

    // The three indices on `Net` don't give us place -> incoming-out-arc
    // transitions directly; the partitioner needs that direction too, purely
    // internally, to walk the undirected projection. Build it once here
    // rather than rescanning all out-arcs per place during the flood fill.
    let mut out_arc_sources_by_place: Vec<Vec<TransitionId>> = vec![Vec::new(); place_count];
    for (t_idx, out_arcs) in net.out_arcs_by_transition.iter().enumerate() {
        for edge in out_arcs {
            out_arc_sources_by_place[edge.node.0 as usize].push(TransitionId(t_idx as u32));
        }
    }

    let mut place_cluster = vec![None; place_count];
    let mut transition_cluster = vec![None; transition_count];
    let mut clusters = Vec::new();

    for start in 0..place_count {
        if place_cluster[start].is_some() {
            continue;
        }
        let id = ClusterId(clusters.len() as u32);
        let mut places = Vec::new();
        let mut transitions = Vec::new();
        flood_fill(net, &out_arc_sources_by_place, Node::Place(PlaceId(start as u32)), &mut place_cluster, &mut transition_cluster, id, &mut places, &mut transitions);
        clusters.push(WorkCluster { id, places, transitions });
    }

    // A transition with no arcs at all (degenerate, but not forbidden) would
    // never be reached from a place; sweep any remaining transitions into
    // their own singleton clusters so every transition still belongs to
    // exactly one cluster.
    for start in 0..transition_count {
        if transition_cluster[start].is_some() {
            continue;
        }
        let id = ClusterId(clusters.len() as u32);
        let mut places = Vec::new();
        let mut transitions = Vec::new();
        flood_fill(net, &out_arc_sources_by_place, Node::Transition(TransitionId(start as u32)), &mut place_cluster, &mut transition_cluster, id, &mut places, &mut transitions);
        clusters.push(WorkCluster { id, places, transitions });
    }

    let place_cluster: Vec<ClusterId> = place_cluster.into_iter().map(|c| c.expect("every place visited")).collect();
    let transition_cluster: Vec<ClusterId> = transition_cluster.into_iter().map(|c| c.expect("every transition visited")).collect();

    let mut triggered = vec![Vec::new(); transition_count];
    for (t_idx, out_arcs) in net.out_arcs_by_transition.iter().enumerate() {
        let set = &mut triggered[t_idx];
        for edge in out_arcs {
            let c = place_cluster[edge.node.0 as usize];
            if !set.contains(&c) {
                set.push(c);
            }
        }
        // A transition's own cluster is always a candidate target: it fires
        // from its own cluster's worker, which must be re-woken if it has
        // no out-arcs reaching any place (vacuously already included when
        // out-arcs exist, since out-arc places share the transition's
        // cluster by construction of the flood fill).
        let own = transition_cluster[t_idx];
        if !set.contains(&own) {
            set.push(own);
        }
    }

    net.clusters = clusters;
    net.place_cluster = place_cluster;
    net.transition_cluster = transition_cluster;
    net.triggered_clusters_by_transition = triggered;
}

#[allow(clippy::too_many_arguments)]
fn flood_fill(
    net: &Net,
    out_arc_sources_by_place: &[Vec<TransitionId>],
    start: Node,
    place_cluster: &mut [Option<ClusterId>],
    transition_cluster: &mut [Option<ClusterId>],
    id: ClusterId,
    places: &mut Vec<PlaceId>,
    transitions: &mut Vec<TransitionId>,
) {
    let mut queue = VecDeque::new();
    queue.push_back(start);
    mark(start, place_cluster, transition_cluster, id);

    while let Some(node) = queue.pop_front() {
        match node {
            Node::Place(p) => {
                places.push(p);
                for edge in &net.in_arcs_by_place[p.0 as usize] {
                    push_unvisited(Node::Transition(edge.node), place_cluster, transition_cluster, id, &mut queue);
                }
                for &t in &out_arc_sources_by_place[p.0 as usize] {
                    push_unvisited(Node::Transition(t), place_cluster, transition_cluster, id, &mut queue);
                }
            }
            Node::Transition(t) => {
                transitions.push(t);
                for edge in &net.in_arcs_by_transition[t.0 as usize] {
                    push_unvisited(Node::Place(edge.node), place_cluster, transition_cluster, id, &mut queue);
                }
                for edge in &net.out_arcs_by_transition[t.0 as usize] {
                    push_unvisited(Node::Place(edge.node), place_cluster, transition_cluster, id, &mut queue);
                }
            }
        }
    }
}

fn push_unvisited(
    node: Node,
    place_cluster: &mut [Option<ClusterId>],
    transition_cluster: &mut [Option<ClusterId>],
    id: ClusterId,
    queue: &mut VecDeque<Node>,
) {
    let visited = match node {
        Node::Place(p) => place_cluster[p.0 as usize].is_some(),
        Node::Transition(t) => transition_cluster[t.0 as usize].is_some(),
    };
    if visited {
        return;
    }
    mark(node, place_cluster, transition_cluster, id);
    queue.push_back(node);
}

fn mark(node: Node, place_cluster: &mut [Option<ClusterId>], transition_cluster: &mut [Option<ClusterId>], id: ClusterId) {
    match node {
        Node::Place(p) => place_cluster[p.0 as usize] = Some(id),
        Node::Transition(t) => transition_cluster[t.0 as usize] = Some(id),
    }
}

impl Net {
    pub fn cluster_count(&self) -> usize {
        self.clusters.len()
    }

    pub fn clusters(&self) -> &[WorkCluster] {
        &self.clusters
    }

    pub fn place_cluster(&self, id: PlaceId) -> ClusterId {
        self.place_cluster[id.0 as usize]
    }

    pub fn transition_cluster(&self, id: TransitionId) -> ClusterId {
        self.transition_cluster[id.0 as usize]
    }

    pub fn triggered_clusters(&self, id: TransitionId) -> &[ClusterId] {
        &self.triggered_clusters_by_transition[id.0 as usize]
    }
}
