//! Control-flow graph underlying an SVTS.
//!
//! Locations are integer-indexed nodes of a stable directed graph and
//! carry no payload; each edge carries one super-operator. The graph
//! never holds parallel edges: installing an edge over an existing
//! ordered pair replaces the payload. Stable indices matter here —
//! `contract_locations` and `substitute_location` remove nodes, and the
//! remaining location ids must survive that.

use alsvid_linalg::SuperOp;
use petgraph::Direction;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::{IrError, IrResult};

/// A program location: an index into the CFG's node arena.
pub type Location = NodeIndex;

/// Directed graph with super-operator edge payloads and no multi-edges.
#[derive(Debug, Clone, Default)]
pub struct Cfg {
    graph: StableDiGraph<(), SuperOp>,
}

impl Cfg {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a fresh location.
    pub fn add_location(&mut self) -> Location {
        self.graph.add_node(())
    }

    /// Install an edge, replacing any existing edge on the same pair.
    pub fn set_edge(&mut self, pre: Location, post: Location, op: SuperOp) {
        self.graph.update_edge(pre, post, op);
    }

    /// The payload of the edge `pre → post`, if present.
    pub fn edge(&self, pre: Location, post: Location) -> Option<&SuperOp> {
        self.graph
            .find_edge(pre, post)
            .and_then(|e| self.graph.edge_weight(e))
    }

    /// Whether the location is still present.
    pub fn contains(&self, loc: Location) -> bool {
        self.graph.contains_node(loc)
    }

    /// Remove a location and its incident edges.
    pub fn remove_location(&mut self, loc: Location) {
        self.graph.remove_node(loc);
    }

    /// Number of locations.
    pub fn num_locations(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of edges.
    pub fn num_edges(&self) -> usize {
        self.graph.edge_count()
    }

    /// All locations, sorted by index.
    pub fn locations(&self) -> Vec<Location> {
        let mut nodes: Vec<_> = self.graph.node_indices().collect();
        nodes.sort_unstable();
        nodes
    }

    /// Incoming edge count.
    pub fn in_degree(&self, loc: Location) -> usize {
        self.graph.edges_directed(loc, Direction::Incoming).count()
    }

    /// Outgoing edge count.
    pub fn out_degree(&self, loc: Location) -> usize {
        self.graph.edges_directed(loc, Direction::Outgoing).count()
    }

    /// Successor locations with their edge payloads, sorted by target.
    pub fn successors(&self, loc: Location) -> Vec<(Location, &SuperOp)> {
        let mut out: Vec<_> = self
            .graph
            .edges_directed(loc, Direction::Outgoing)
            .map(|e| (e.target(), e.weight()))
            .collect();
        out.sort_unstable_by_key(|(target, _)| *target);
        out
    }

    /// All edges sorted lexicographically by `(pre, post)`.
    pub fn sorted_edges(&self) -> Vec<(Location, Location, &SuperOp)> {
        let mut edges: Vec<_> = self
            .graph
            .edge_references()
            .map(|e| (e.source(), e.target(), e.weight()))
            .collect();
        edges.sort_unstable_by_key(|(pre, post, _)| (*pre, *post));
        edges
    }

    /// Splice `sub` into this graph in place of `target`.
    ///
    /// Every node and edge of `sub` is copied in; `target` is removed,
    /// and each of its boundary edges is rewired to the `sub` node the
    /// `remap` closure picks for it (called with the direction of the
    /// edge relative to `target` and the peer location). Returns the
    /// translation from `sub` ids to ids in this graph. Fails with
    /// [`IrError::UnknownLocation`] when `target` is not present.
    pub fn substitute_location<F>(
        &mut self,
        target: Location,
        sub: &Cfg,
        mut remap: F,
    ) -> IrResult<FxHashMap<Location, Location>>
    where
        F: FnMut(Direction, Location) -> Location,
    {
        if !self.contains(target) {
            return Err(IrError::UnknownLocation(target));
        }
        let translation = self.insert_graph(sub);

        let incoming: Vec<(Location, SuperOp)> = self
            .graph
            .edges_directed(target, Direction::Incoming)
            .filter(|e| e.source() != target)
            .map(|e| (e.source(), e.weight().clone()))
            .collect();
        let outgoing: Vec<(Location, SuperOp)> = self
            .graph
            .edges_directed(target, Direction::Outgoing)
            .filter(|e| e.target() != target)
            .map(|e| (e.target(), e.weight().clone()))
            .collect();

        self.graph.remove_node(target);

        for (peer, op) in incoming {
            let attach = translation[&remap(Direction::Incoming, peer)];
            self.set_edge(peer, attach, op);
        }
        for (peer, op) in outgoing {
            let attach = translation[&remap(Direction::Outgoing, peer)];
            self.set_edge(attach, peer, op);
        }

        Ok(translation)
    }

    /// Copy `other` into this graph and connect it through the given
    /// boundary edges `(host, other_node, payload)`. Returns the
    /// translation from `other` ids to ids in this graph. Fails with
    /// [`IrError::UnknownLocation`] when a boundary endpoint does not
    /// exist on its side.
    pub fn compose(
        &mut self,
        other: &Cfg,
        boundary: Vec<(Location, Location, SuperOp)>,
    ) -> IrResult<FxHashMap<Location, Location>> {
        for (host, other_node, _) in &boundary {
            if !self.contains(*host) {
                return Err(IrError::UnknownLocation(*host));
            }
            if !other.contains(*other_node) {
                return Err(IrError::UnknownLocation(*other_node));
            }
        }
        let translation = self.insert_graph(other);
        for (host, other_node, op) in boundary {
            self.set_edge(host, translation[&other_node], op);
        }
        Ok(translation)
    }

    /// Collapse a set of locations into one fresh location.
    ///
    /// Edges incident to the set are rerouted to the new location;
    /// edges internal to the set (and self-loops created by the
    /// collapse) are dropped. Fails with [`IrError::UnknownLocation`]
    /// when a member is not present, and with [`IrError::ParallelEdge`]
    /// when two distinct boundary edges would land on one ordered pair
    /// (the graph cannot represent both payloads).
    pub fn contract_locations(&mut self, locs: &[Location]) -> IrResult<Location> {
        if let Some(&missing) = locs.iter().find(|&&loc| !self.contains(loc)) {
            return Err(IrError::UnknownLocation(missing));
        }
        let merged = self.add_location();

        let moved: Vec<(Location, Location, SuperOp)> = self
            .graph
            .edge_references()
            .filter(|e| locs.contains(&e.source()) || locs.contains(&e.target()))
            .map(|e| (e.source(), e.target(), e.weight().clone()))
            .collect();

        for &loc in locs {
            self.graph.remove_node(loc);
        }

        let mut rerouted = FxHashSet::default();
        for (pre, post, op) in moved {
            let pre = if locs.contains(&pre) { merged } else { pre };
            let post = if locs.contains(&post) { merged } else { post };
            if pre == merged && post == merged {
                continue;
            }
            if !rerouted.insert((pre, post)) {
                return Err(IrError::ParallelEdge { pre, post });
            }
            self.set_edge(pre, post, op);
        }

        Ok(merged)
    }

    fn insert_graph(&mut self, other: &Cfg) -> FxHashMap<Location, Location> {
        let mut translation = FxHashMap::default();
        for node in other.graph.node_indices() {
            translation.insert(node, self.add_location());
        }
        for e in other.graph.edge_references() {
            self.set_edge(
                translation[&e.source()],
                translation[&e.target()],
                e.weight().clone(),
            );
        }
        translation
    }
}
