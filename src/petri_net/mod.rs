//! The net data model: places, transitions, weighted arcs, and the builder
//! that assembles them into a runnable, partitioned [`Net`].

pub mod partition;

use crate::error::{PetriNetError, Result};
use ahash::AHashMap;
use derive_more::Display;
use std::num::NonZeroU32;
use std::sync::Mutex;

/// Index of a place in [`Net::places`]. Stable for the lifetime of a built net.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[display(fmt = "p{}", _0)]
pub struct PlaceId(pub(crate) u32);

/// Index of a transition in [`Net::transitions`]. Stable for the lifetime of a built net.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[display(fmt = "t{}", _0)]
pub struct TransitionId(pub(crate) u32);

/// A name resolves to exactly one of these; places and transitions share one namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeId {
    Place(PlaceId),
    Transition(TransitionId),
}

/// A positive arc weight. Zero is rejected at the builder boundary, so every
/// `Weight` in a built net is known-nonzero without a runtime check.
pub type Weight = NonZeroU32;

/// One end of a weighted edge: the neighbor and the arc weight toward/from it.
#[derive(Debug, Clone, Copy)]
pub struct WeightedEdge<T> {
    pub node: T,
    pub weight: Weight,
}

/// A place's static identity (name). Token state lives separately in
/// [`Net::place_tokens`] so the topology can be shared read-only across
/// worker threads while only the token cell is mutated.
#[derive(Debug, Clone)]
pub struct PlaceDef {
    pub id: PlaceId,
    pub name: String,
}

/// A transition's static identity (name). Transitions carry no state of
/// their own; their effect is entirely derived from incident arcs.
#[derive(Debug, Clone)]
pub struct TransitionDef {
    pub id: TransitionId,
    pub name: String,
}

/// The immutable topology of a built net: names, adjacency indices, and
/// (once [`Net::partition`] has run) work clusters and routing. Shared via
/// `Arc` across the supervisor, every worker, and the firing executor.
pub struct Net {
    pub(crate) places: Vec<PlaceDef>,
    pub(crate) transitions: Vec<TransitionDef>,
    names: AHashMap<String, NodeId>,

    /// place -> (transition, weight), i.e. in-arcs keyed by their source place.
    pub(crate) in_arcs_by_place: Vec<Vec<WeightedEdge<TransitionId>>>,
    /// transition -> (place, weight), the reverse of the above; this is the
    /// index the worker and the firing executor actually walk.
    pub(crate) in_arcs_by_transition: Vec<Vec<WeightedEdge<PlaceId>>>,
    /// transition -> (place, weight), token deposits.
    pub(crate) out_arcs_by_transition: Vec<Vec<WeightedEdge<PlaceId>>>,

    /// Live token counts, one lock per place. `None` until `Run` starts;
    /// the builder only tracks initial values in `PlaceDef`'s shadow below.
    pub(crate) place_tokens: Vec<Mutex<u64>>,

    pub(crate) clusters: Vec<partition::WorkCluster>,
    pub(crate) place_cluster: Vec<partition::ClusterId>,
    pub(crate) transition_cluster: Vec<partition::ClusterId>,
    pub(crate) triggered_clusters_by_transition: Vec<Vec<partition::ClusterId>>,
}

/// A record of a distinct `(from, to)` pair already added, used to make
/// `add_arc` idempotent on an identical re-add instead of rejecting it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum ArcKey {
    InArc(PlaceId, TransitionId),
    OutArc(TransitionId, PlaceId),
}

/// Accumulates places, transitions, and arcs before the net is partitioned
/// and handed to the supervisor. Mirrors the `{Empty, Built}` half of the
/// net's lifecycle state machine (see the component design notes).
#[derive(Default)]
pub struct NetBuilder {
    places: Vec<PlaceDef>,
    transitions: Vec<TransitionDef>,
    names: AHashMap<String, NodeId>,
    initial_tokens: Vec<u64>,
    in_arcs_by_place: Vec<Vec<WeightedEdge<TransitionId>>>,
    in_arcs_by_transition: Vec<Vec<WeightedEdge<PlaceId>>>,
    out_arcs_by_transition: Vec<Vec<WeightedEdge<PlaceId>>>,
    arc_keys: AHashMap<ArcKey, Weight>,
}

impl NetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a place with an initial token count. Fails with `DuplicateName`
    /// if `name` already identifies a place or transition, or `InvalidTokens`
    /// if `initial_tokens` is negative.
    pub fn add_place(&mut self, name: impl Into<String>, initial_tokens: i64) -> Result<PlaceId> {
        let name = name.into();
        self.reject_duplicate(&name)?;
        if initial_tokens < 0 {
            return Err(PetriNetError::InvalidTokens { name, tokens: initial_tokens });
        }
        let id = PlaceId(self.places.len() as u32);
        self.places.push(PlaceDef { id, name: name.clone() });
        self.initial_tokens.push(initial_tokens as u64);
        self.in_arcs_by_place.push(Vec::new());
        self.names.insert(name, NodeId::Place(id));
        Ok(id)
    }

    /// Adds a transition. Fails with `DuplicateName` under the same rule as
    /// `add_place` (places and transitions share one name namespace).
    pub fn add_transition(&mut self, name: impl Into<String>) -> Result<TransitionId> {
        let name = name.into();
        self.reject_duplicate(&name)?;
        let id = TransitionId(self.transitions.len() as u32);
        self.transitions.push(TransitionDef { id, name: name.clone() });
        self.in_arcs_by_transition.push(Vec::new());
        self.out_arcs_by_transition.push(Vec::new());
        self.names.insert(name, NodeId::Transition(id));
        Ok(id)
    }

    /// Adds a directed weighted arc between an existing place and an
    /// existing transition (either direction). Rejects same-kind endpoints,
    /// unknown endpoints, and non-positive weights. Re-adding an arc that is
    /// identical in endpoints and weight to one already present is a no-op.
    pub fn add_arc(&mut self, from: &str, to: &str, weight: u32) -> Result<()> {
        let weight = Weight::new(weight).ok_or(PetriNetError::InvalidWeight { weight: weight as i64 })?;
        let from_id = self.resolve(from)?;
        let to_id = self.resolve(to)?;
        match (from_id, to_id) {
            (NodeId::Place(p), NodeId::Transition(t)) => {
                let key = ArcKey::InArc(p, t);
                if self.arc_keys.get(&key) == Some(&weight) {
                    return Ok(());
                }
                self.arc_keys.insert(key, weight);
                self.in_arcs_by_place[p.0 as usize].push(WeightedEdge { node: t, weight });
                self.in_arcs_by_transition[t.0 as usize].push(WeightedEdge { node: p, weight });
                Ok(())
            }
            (NodeId::Transition(t), NodeId::Place(p)) => {
                let key = ArcKey::OutArc(t, p);
                if self.arc_keys.get(&key) == Some(&weight) {
                    return Ok(());
                }
                self.arc_keys.insert(key, weight);
                self.out_arcs_by_transition[t.0 as usize].push(WeightedEdge { node: p, weight });
                Ok(())
            }
            (NodeId::Place(_), NodeId::Place(_)) | (NodeId::Transition(_), NodeId::Transition(_)) => {
                Err(PetriNetError::InvalidArc {
                    from: from.to_string(),
                    to: to.to_string(),
                })
            }
        }
    }

    fn reject_duplicate(&self, name: &str) -> Result<()> {
        if self.names.contains_key(name) {
            Err(PetriNetError::DuplicateName(name.to_string()))
        } else {
            Ok(())
        }
    }

    fn resolve(&self, name: &str) -> Result<NodeId> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| PetriNetError::UnknownEndpoint(name.to_string()))
    }

    /// Finishes the build phase: computes clusters and the routing table,
    /// and seeds live token cells from the recorded initial counts. This is
    /// the one-time `Built -> Partitioned` transition; the builder is
    /// consumed, so no further `add_*` calls are reachable afterward.
    pub fn build(self) -> Net {
        let place_tokens = self.initial_tokens.into_iter().map(Mutex::new).collect();
        let mut net = Net {
            places: self.places,
            transitions: self.transitions,
            names: self.names,
            in_arcs_by_place: self.in_arcs_by_place,
            in_arcs_by_transition: self.in_arcs_by_transition,
            out_arcs_by_transition: self.out_arcs_by_transition,
            place_tokens,
            clusters: Vec::new(),
            place_cluster: Vec::new(),
            transition_cluster: Vec::new(),
            triggered_clusters_by_transition: Vec::new(),
        };
        partition::partition(&mut net);
        net
    }
}

impl Net {
    pub fn place_count(&self) -> usize {
        self.places.len()
    }

    pub fn transition_count(&self) -> usize {
        self.transitions.len()
    }

    pub fn place_name(&self, id: PlaceId) -> &str {
        &self.places[id.0 as usize].name
    }

    pub fn transition_name(&self, id: TransitionId) -> &str {
        &self.transitions[id.0 as usize].name
    }

    pub fn place_id(&self, name: &str) -> Option<PlaceId> {
        match self.names.get(name) {
            Some(NodeId::Place(id)) => Some(*id),
            _ => None,
        }
    }

    pub fn transition_id(&self, name: &str) -> Option<TransitionId> {
        match self.names.get(name) {
            Some(NodeId::Transition(id)) => Some(*id),
            _ => None,
        }
    }

    /// Snapshot of current token counts, one read-lock-and-release per place.
    /// Used for the trace writer's initial shadow and for inspection/tests.
    pub fn snapshot_tokens(&self) -> Vec<(PlaceId, u64)> {
        self.place_tokens
            .iter()
            .enumerate()
            .map(|(i, cell)| (PlaceId(i as u32), *cell.lock().expect("place lock poisoned")))
            .collect()
    }

    pub fn tokens(&self, id: PlaceId) -> u64 {
        *self.place_tokens[id.0 as usize].lock().expect("place lock poisoned")
    }

    pub fn place_ids(&self) -> impl Iterator<Item = PlaceId> + '_ {
        (0..self.places.len() as u32).map(PlaceId)
    }

    pub fn transition_ids(&self) -> impl Iterator<Item = TransitionId> + '_ {
        (0..self.transitions.len() as u32).map(TransitionId)
    }

    pub fn in_arcs(&self, id: TransitionId) -> &[WeightedEdge<PlaceId>] {
        &self.in_arcs_by_transition[id.0 as usize]
    }

    pub fn out_arcs(&self, id: TransitionId) -> &[WeightedEdge<PlaceId>] {
        &self.out_arcs_by_transition[id.0 as usize]
    }

    /// `true` iff every in-arc of `id` is satisfied by the current token
    /// counts. Reads each place's lock independently and releases it
    /// immediately; see the concurrency notes on why a stale-but-consistent
    /// read is safe here (places are partitioned, so nothing else can
    /// subtract from them between this check and a fire in the same worker).
    pub fn is_enabled(&self, id: TransitionId) -> bool {
        self.in_arcs(id)
            .iter()
            .all(|edge| self.tokens(edge.node) >= edge.weight.get() as u64)
    }
}
