//! Arena-backed in-memory implementation of [`TimeGraph`].
//!
//! Nodes live in a `Vec` indexed by id; each node carries its own
//! outgoing and incoming adjacency lists in insertion order. No node is
//! ever removed, matching the index's no-deletion lifecycle, so ids stay
//! dense and stable.

use super::{EdgeType, NodeId, NodeLabel, TimeGraph};

#[derive(Debug, Clone)]
struct NodeRecord {
    label: NodeLabel,
    value: Option<i64>,
    out: Vec<(EdgeType, NodeId)>,
    inc: Vec<(EdgeType, NodeId)>,
}

/// In-memory graph store; the reference substrate for tests and
/// single-process embedding.
#[derive(Debug, Clone, Default)]
pub struct MemoryGraph {
    nodes: Vec<NodeRecord>,
    root: Option<NodeId>,
}

impl MemoryGraph {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes ever created.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn record(&self, id: NodeId) -> Option<&NodeRecord> {
        self.nodes.get(usize::try_from(id.0).ok()?)
    }

    fn record_mut(&mut self, id: NodeId) -> Option<&mut NodeRecord> {
        self.nodes.get_mut(usize::try_from(id.0).ok()?)
    }
}

impl TimeGraph for MemoryGraph {
    fn create_node(&mut self, label: NodeLabel, value: Option<i64>) -> NodeId {
        let id = NodeId(self.nodes.len() as u64);
        self.nodes.push(NodeRecord {
            label,
            value,
            out: Vec::new(),
            inc: Vec::new(),
        });
        if matches!(label, NodeLabel::Root) && self.root.is_none() {
            self.root = Some(id);
        }
        id
    }

    fn contains(&self, id: NodeId) -> bool {
        self.record(id).is_some()
    }

    fn label(&self, id: NodeId) -> Option<&NodeLabel> {
        self.record(id).map(|r| &r.label)
    }

    fn value(&self, id: NodeId) -> Option<i64> {
        self.record(id).and_then(|r| r.value)
    }

    fn add_edge(&mut self, from: NodeId, to: NodeId, edge: EdgeType) {
        if let Some(r) = self.record_mut(from) {
            r.out.push((edge.clone(), to));
        }
        if let Some(r) = self.record_mut(to) {
            r.inc.push((edge, from));
        }
    }

    fn remove_edge(&mut self, from: NodeId, to: NodeId, edge: &EdgeType) -> bool {
        let removed = self.record_mut(from).is_some_and(|r| {
            let pos = r.out.iter().position(|(e, n)| e == edge && *n == to);
            pos.map(|p| r.out.remove(p)).is_some()
        });
        if removed {
            if let Some(r) = self.record_mut(to) {
                if let Some(p) = r.inc.iter().position(|(e, n)| e == edge && *n == from) {
                    r.inc.remove(p);
                }
            }
        }
        removed
    }

    fn has_edge(&self, from: NodeId, to: NodeId, edge: &EdgeType) -> bool {
        self.record(from)
            .is_some_and(|r| r.out.iter().any(|(e, n)| e == edge && *n == to))
    }

    fn single_outgoing(&self, from: NodeId, edge: &EdgeType) -> Option<NodeId> {
        self.record(from)?
            .out
            .iter()
            .find(|(e, _)| e == edge)
            .map(|&(_, n)| n)
    }

    fn single_incoming(&self, to: NodeId, edge: &EdgeType) -> Option<NodeId> {
        self.record(to)?
            .inc
            .iter()
            .find(|(e, _)| e == edge)
            .map(|&(_, n)| n)
    }

    fn incoming(&self, to: NodeId) -> Vec<(NodeId, EdgeType)> {
        self.record(to)
            .map(|r| r.inc.iter().map(|(e, n)| (*n, e.clone())).collect())
            .unwrap_or_default()
    }

    fn default_root(&self) -> Option<NodeId> {
        self.root
    }
}
