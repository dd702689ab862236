//! Graph substrate abstraction.
//!
//! The index never owns its storage: nodes, typed directed edges, and
//! transactional atomicity are provided by an external engine behind the
//! [`TimeGraph`] trait. The bundled [`MemoryGraph`] is an arena-backed
//! reference implementation used by the test suite.
//!
//! # Concurrency contract
//!
//! All operations run inside a caller-owned transaction; this crate
//! performs no locking and no retries. Implementations that admit
//! concurrent writers MUST take an exclusive lock (or conflict-abort)
//! covering both endpoints of any `FIRST`, `LAST`, or `NEXT` edge write
//! for the duration of the transaction. Without that, concurrent sibling
//! inserts under one parent can lose updates or break the chain; such
//! violations surface as [`crate::TimeTreeError::Conflict`] and are
//! propagated, not repaired. `MemoryGraph` takes `&mut self` everywhere,
//! so in-process misuse cannot compile.

use std::fmt;

use crate::resolution::Resolution;

mod memory;

pub use memory::MemoryGraph;

// ---------------------------------------------------------------------------
// Identifiers and labels
// ---------------------------------------------------------------------------

/// Store-native node identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a node represents in the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeLabel {
    /// The singleton default root of a time tree.
    Root,
    /// A calendar node at one resolution level. Carries an immutable
    /// integer value set at creation.
    Instant(Resolution),
    /// A domain entity attached to the tree by the event index. Any
    /// pre-existing node may also serve as a custom tree root.
    Entity,
}

// ---------------------------------------------------------------------------
// Edges
// ---------------------------------------------------------------------------

/// Directed typed edge.
///
/// The four structural types maintain the tree and its level chains;
/// `Custom` types attach domain entities to calendar nodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EdgeType {
    /// Parent to child; membership only, no order implied.
    Child,
    /// Parent to its minimum-valued direct child.
    First,
    /// Parent to its maximum-valued direct child.
    Last,
    /// Node to the chronologically next node at the same resolution
    /// level, across parent boundaries.
    Next,
    /// Caller-chosen event attachment type.
    Custom(String),
}

impl EdgeType {
    /// The edge type name as stored by the engine.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Child => "CHILD",
            Self::First => "FIRST",
            Self::Last => "LAST",
            Self::Next => "NEXT",
            Self::Custom(name) => name,
        }
    }

    /// Whether this edge maintains tree/chain structure (as opposed to
    /// attaching an event).
    #[must_use]
    pub const fn is_structural(&self) -> bool {
        !matches!(self, Self::Custom(_))
    }

    /// Whether a custom edge type name would collide with a structural
    /// name in a store keyed by type name.
    #[must_use]
    pub fn is_reserved_name(name: &str) -> bool {
        ["CHILD", "FIRST", "LAST", "NEXT"]
            .iter()
            .any(|s| s.eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for EdgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Substrate trait
// ---------------------------------------------------------------------------

/// The contract the storage engine fulfils.
///
/// `&mut self` methods are structural mutations and must happen inside
/// the caller's transaction (see the module docs for the locking
/// precondition). Edge enumeration order is the store's insertion order;
/// the event index relies on that for result ordering.
pub trait TimeGraph {
    /// Create a node. `value` is the calendar unit for `Instant` nodes
    /// and is immutable afterwards.
    fn create_node(&mut self, label: NodeLabel, value: Option<i64>) -> NodeId;

    /// Whether `id` names an existing node.
    fn contains(&self, id: NodeId) -> bool;

    /// The node's label, or `None` for an unknown id.
    fn label(&self, id: NodeId) -> Option<&NodeLabel>;

    /// The node's calendar unit value, if it has one.
    fn value(&self, id: NodeId) -> Option<i64>;

    /// Add a directed typed edge.
    fn add_edge(&mut self, from: NodeId, to: NodeId, edge: EdgeType);

    /// Remove one matching edge. Returns whether an edge was removed.
    fn remove_edge(&mut self, from: NodeId, to: NodeId, edge: &EdgeType) -> bool;

    /// Whether an edge `from -[edge]-> to` exists.
    fn has_edge(&self, from: NodeId, to: NodeId, edge: &EdgeType) -> bool;

    /// The single target of an outgoing edge of the given type.
    fn single_outgoing(&self, from: NodeId, edge: &EdgeType) -> Option<NodeId>;

    /// The single source of an incoming edge of the given type.
    fn single_incoming(&self, to: NodeId, edge: &EdgeType) -> Option<NodeId>;

    /// All incoming edges of a node, in insertion order.
    fn incoming(&self, to: NodeId) -> Vec<(NodeId, EdgeType)>;

    /// The default (singleton) tree root, if one has been created.
    fn default_root(&self) -> Option<NodeId>;
}
