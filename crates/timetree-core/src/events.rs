//! Event index: domain entities attached to calendar nodes.
//!
//! An entity is attached by a caller-chosen typed edge entity→leaf;
//! re-attaching the same triple is a no-op. Queries never create
//! calendar nodes, and a query at a coarse resolution surfaces events
//! attached anywhere in the subtree beneath the matched node, so an
//! event attached at hour granularity shows up in a day-level query.

use tracing::debug;

use crate::chain;
use crate::error::{Result, TimeTreeError};
use crate::graph::{EdgeType, NodeId, TimeGraph};
use crate::instant::TimeInstant;
use crate::resolution::Resolution;
use crate::tree::TimeTree;

use chrono_tz::Tz;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// An event hit: the attached entity and the edge type it used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub node: NodeId,
    pub edge_type: String,
}

/// Which attachment edge types a query accepts.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EventFilter {
    /// Every non-structural incoming edge.
    #[default]
    Any,
    /// A single edge type.
    Only(String),
    /// Any of a set of edge types.
    AnyOf(Vec<String>),
}

impl EventFilter {
    fn matches(&self, name: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Only(t) => t == name,
            Self::AnyOf(ts) => ts.iter().any(|t| t == name),
        }
    }
}

/// Result of [`TimedEvents::attach_event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attachment {
    /// The calendar node the entity is attached to.
    pub leaf: NodeId,
    /// Whether a new edge was created (`false` means the identical
    /// attachment already existed).
    pub created: bool,
}

/// Event index over one [`TimeTree`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TimedEvents {
    tree: TimeTree,
}

impl TimedEvents {
    /// An event index over the given tree.
    #[must_use]
    pub const fn new(tree: TimeTree) -> Self {
        Self { tree }
    }

    /// The underlying tree.
    #[must_use]
    pub const fn tree(&self) -> &TimeTree {
        &self.tree
    }

    /// Attach an entity to the calendar node for `instant`, creating the
    /// node path if needed. Idempotent: an identical
    /// (entity, edge type, leaf) attachment is returned, not duplicated.
    ///
    /// # Errors
    ///
    /// [`TimeTreeError::StructuralEdgeType`] if the edge type name
    /// collides with a structural edge, [`TimeTreeError::NodeNotFound`]
    /// if the entity does not exist, plus the tree's creation errors.
    pub fn attach_event<G: TimeGraph>(
        &self,
        g: &mut G,
        entity: NodeId,
        edge_type: &str,
        instant: &TimeInstant,
    ) -> Result<Attachment> {
        if EdgeType::is_reserved_name(edge_type) {
            return Err(TimeTreeError::StructuralEdgeType(edge_type.to_string()));
        }
        if !g.contains(entity) {
            return Err(TimeTreeError::NodeNotFound(entity));
        }
        let leaf = self.tree.get_or_create_instant(g, instant)?;
        let edge = EdgeType::Custom(edge_type.to_string());
        if g.has_edge(entity, leaf, &edge) {
            return Ok(Attachment { leaf, created: false });
        }
        g.add_edge(entity, leaf, edge);
        debug!(%entity, %leaf, edge_type, "attached event");
        Ok(Attachment { leaf, created: true })
    }

    /// Events at an instant: everything attached to the matched calendar
    /// node or anywhere in the subtree beneath it. Empty when the exact
    /// node does not exist; never creates nodes.
    ///
    /// # Errors
    ///
    /// The tree's lookup errors.
    pub fn events_at<G: TimeGraph>(
        &self,
        g: &G,
        instant: &TimeInstant,
        filter: &EventFilter,
    ) -> Result<Vec<Event>> {
        let Some(leaf) = self.tree.get_instant(g, instant)? else {
            return Ok(Vec::new());
        };
        let mut out = Vec::new();
        collect_deep(g, leaf, filter, &mut out);
        Ok(out)
    }

    /// Events across `[start, end]` at the given resolution: the
    /// subtree collection of every existing node on the leaf-level chain
    /// between the range's boundary probes.
    ///
    /// # Errors
    ///
    /// [`TimeTreeError::InvalidRange`] when `end < start`, plus the
    /// tree's lookup errors.
    pub fn events_in_range<G: TimeGraph>(
        &self,
        g: &G,
        start: i64,
        end: i64,
        timezone: Tz,
        resolution: Resolution,
        filter: &EventFilter,
    ) -> Result<Vec<Event>> {
        let span = self.tree.get_instants(g, start, end, timezone, resolution)?;
        let mut out = Vec::new();
        for node in span {
            collect_deep(g, node, filter, &mut out);
        }
        Ok(out)
    }
}

/// Collect events attached to `node` and to every node in its subtree,
/// deepest children first within each node, in sibling chain order.
///
/// Explicit two-phase stack instead of recursion; the child enumeration
/// is bounded to the current node's own children, so the walk never
/// escapes into a neighboring subtree through the global `NEXT` chain.
fn collect_deep<G: TimeGraph>(g: &G, node: NodeId, filter: &EventFilter, out: &mut Vec<Event>) {
    let mut stack = vec![(node, false)];
    while let Some((n, expanded)) = stack.pop() {
        if expanded {
            collect_direct(g, n, filter, out);
            continue;
        }
        stack.push((n, true));
        let children = chain::children_in_order(g, n);
        for &child in children.iter().rev() {
            stack.push((child, false));
        }
    }
}

/// Events attached directly to `node` via non-structural incoming edges,
/// in the store's edge insertion order.
fn collect_direct<G: TimeGraph>(g: &G, node: NodeId, filter: &EventFilter, out: &mut Vec<Event>) {
    for (other, edge) in g.incoming(node) {
        if edge.is_structural() {
            continue;
        }
        if filter.matches(edge.name()) {
            out.push(Event {
                node: other,
                edge_type: edge.name().to_string(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{MemoryGraph, NodeLabel};
    use chrono::{TimeZone, Utc};

    fn ts(y: i32, mo: u32, d: u32, h: u32) -> i64 {
        Utc.with_ymd_and_hms(y, mo, d, h, 0, 0)
            .unwrap()
            .timestamp_millis()
    }

    fn day(y: i32, mo: u32, d: u32) -> TimeInstant {
        TimeInstant::new(ts(y, mo, d, 0))
    }

    fn hour(y: i32, mo: u32, d: u32, h: u32) -> TimeInstant {
        TimeInstant::new(ts(y, mo, d, h)).with_resolution(Resolution::Hour)
    }

    fn entity(g: &mut MemoryGraph) -> NodeId {
        g.create_node(NodeLabel::Entity, None)
    }

    fn nodes(events: &[Event]) -> Vec<NodeId> {
        events.iter().map(|e| e.node).collect()
    }

    // -----------------------------------------------------------------------
    // attach_event
    // -----------------------------------------------------------------------

    #[test]
    fn attach_is_idempotent() {
        let mut g = MemoryGraph::new();
        let idx = TimedEvents::default();
        let e = entity(&mut g);

        let first = idx.attach_event(&mut g, e, "AT_TIME", &day(2012, 11, 1)).unwrap();
        let second = idx.attach_event(&mut g, e, "AT_TIME", &day(2012, 11, 1)).unwrap();

        assert!(first.created);
        assert!(!second.created);
        assert_eq!(first.leaf, second.leaf);

        let events = idx.events_at(&g, &day(2012, 11, 1), &EventFilter::Any).unwrap();
        assert_eq!(events.len(), 1, "exactly one edge exists");
    }

    #[test]
    fn same_entity_different_edge_types_coexist() {
        let mut g = MemoryGraph::new();
        let idx = TimedEvents::default();
        let e = entity(&mut g);

        idx.attach_event(&mut g, e, "SENT_ON", &day(2012, 11, 1)).unwrap();
        idx.attach_event(&mut g, e, "RECEIVED_ON", &day(2012, 11, 1)).unwrap();

        let events = idx.events_at(&g, &day(2012, 11, 1), &EventFilter::Any).unwrap();
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn structural_edge_type_is_rejected() {
        let mut g = MemoryGraph::new();
        let idx = TimedEvents::default();
        let e = entity(&mut g);

        for name in ["NEXT", "first", "Child", "LAST"] {
            let err = idx.attach_event(&mut g, e, name, &day(2012, 11, 1)).unwrap_err();
            assert!(matches!(err, TimeTreeError::StructuralEdgeType(_)), "{name}");
        }
    }

    #[test]
    fn missing_entity_is_not_found() {
        let mut g = MemoryGraph::new();
        let idx = TimedEvents::default();
        let err = idx
            .attach_event(&mut g, NodeId(404), "AT_TIME", &day(2012, 11, 1))
            .unwrap_err();
        assert!(matches!(err, TimeTreeError::NodeNotFound(NodeId(404))));
    }

    // -----------------------------------------------------------------------
    // events_at
    // -----------------------------------------------------------------------

    #[test]
    fn events_at_absent_instant_is_empty() {
        let g = MemoryGraph::new();
        let idx = TimedEvents::default();
        let events = idx.events_at(&g, &day(2012, 11, 1), &EventFilter::Any).unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn coarse_query_surfaces_finer_attachments() {
        // Attach at hour resolution, query at day resolution.
        let mut g = MemoryGraph::new();
        let idx = TimedEvents::default();
        let e = entity(&mut g);
        idx.attach_event(&mut g, e, "AT_TIME", &hour(2012, 11, 1, 14)).unwrap();

        let events = idx.events_at(&g, &day(2012, 11, 1), &EventFilter::Any).unwrap();
        assert_eq!(nodes(&events), vec![e]);
    }

    #[test]
    fn descent_order_children_before_own_events() {
        // Day node carries its own event and two hour-level events;
        // hour events (deeper) come first, in hour order.
        let mut g = MemoryGraph::new();
        let idx = TimedEvents::default();
        let on_day = entity(&mut g);
        let at_nine = entity(&mut g);
        let at_five = entity(&mut g);

        idx.attach_event(&mut g, on_day, "AT_TIME", &day(2012, 11, 1)).unwrap();
        idx.attach_event(&mut g, at_nine, "AT_TIME", &hour(2012, 11, 1, 9)).unwrap();
        idx.attach_event(&mut g, at_five, "AT_TIME", &hour(2012, 11, 1, 5)).unwrap();

        let events = idx.events_at(&g, &day(2012, 11, 1), &EventFilter::Any).unwrap();
        assert_eq!(nodes(&events), vec![at_five, at_nine, on_day]);
    }

    #[test]
    fn subtree_walk_does_not_leak_into_sibling_day() {
        let mut g = MemoryGraph::new();
        let idx = TimedEvents::default();
        let here = entity(&mut g);
        let elsewhere = entity(&mut g);

        idx.attach_event(&mut g, here, "AT_TIME", &hour(2012, 11, 1, 9)).unwrap();
        idx.attach_event(&mut g, elsewhere, "AT_TIME", &hour(2012, 11, 2, 0)).unwrap();

        let events = idx.events_at(&g, &day(2012, 11, 1), &EventFilter::Any).unwrap();
        assert_eq!(nodes(&events), vec![here]);
    }

    #[test]
    fn filter_restricts_edge_types() {
        let mut g = MemoryGraph::new();
        let idx = TimedEvents::default();
        let sent = entity(&mut g);
        let received = entity(&mut g);
        let archived = entity(&mut g);

        idx.attach_event(&mut g, sent, "SENT_ON", &day(2012, 11, 1)).unwrap();
        idx.attach_event(&mut g, received, "RECEIVED_ON", &day(2012, 11, 1)).unwrap();
        idx.attach_event(&mut g, archived, "ARCHIVED_ON", &day(2012, 11, 1)).unwrap();

        let only = idx
            .events_at(&g, &day(2012, 11, 1), &EventFilter::Only("SENT_ON".into()))
            .unwrap();
        assert_eq!(nodes(&only), vec![sent]);

        let any_of = idx
            .events_at(
                &g,
                &day(2012, 11, 1),
                &EventFilter::AnyOf(vec!["SENT_ON".into(), "ARCHIVED_ON".into()]),
            )
            .unwrap();
        assert_eq!(nodes(&any_of), vec![sent, archived]);
    }

    // -----------------------------------------------------------------------
    // events_in_range
    // -----------------------------------------------------------------------

    #[test]
    fn range_collects_across_days() {
        let mut g = MemoryGraph::new();
        let idx = TimedEvents::default();
        let e1 = entity(&mut g);
        let e2 = entity(&mut g);
        let e3 = entity(&mut g);

        idx.attach_event(&mut g, e1, "AT_TIME", &day(2012, 11, 1)).unwrap();
        idx.attach_event(&mut g, e2, "AT_TIME", &day(2012, 11, 3)).unwrap();
        idx.attach_event(&mut g, e3, "AT_TIME", &day(2012, 11, 10)).unwrap();

        let events = idx
            .events_in_range(
                &g,
                ts(2012, 11, 1, 0),
                ts(2012, 11, 5, 0),
                Tz::UTC,
                Resolution::Day,
                &EventFilter::Any,
            )
            .unwrap();
        assert_eq!(nodes(&events), vec![e1, e2]);
    }

    #[test]
    fn range_crosses_month_boundary_and_surfaces_nested() {
        let mut g = MemoryGraph::new();
        let idx = TimedEvents::default();
        let nov = entity(&mut g);
        let dec = entity(&mut g);

        idx.attach_event(&mut g, nov, "AT_TIME", &hour(2012, 11, 30, 23)).unwrap();
        idx.attach_event(&mut g, dec, "AT_TIME", &hour(2012, 12, 1, 1)).unwrap();

        let events = idx
            .events_in_range(
                &g,
                ts(2012, 11, 20, 0),
                ts(2012, 12, 20, 0),
                Tz::UTC,
                Resolution::Day,
                &EventFilter::Any,
            )
            .unwrap();
        assert_eq!(nodes(&events), vec![nov, dec]);
    }

    #[test]
    fn range_with_no_leaves_is_empty() {
        let g = MemoryGraph::new();
        let idx = TimedEvents::default();
        let events = idx
            .events_in_range(&g, 0, 1_000, Tz::UTC, Resolution::Day, &EventFilter::Any)
            .unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn inverted_range_is_invalid_argument() {
        let g = MemoryGraph::new();
        let idx = TimedEvents::default();
        let err = idx
            .events_in_range(&g, 1_000, 0, Tz::UTC, Resolution::Day, &EventFilter::Any)
            .unwrap_err();
        assert!(matches!(err, TimeTreeError::InvalidRange { .. }));
    }

    #[test]
    fn custom_root_event_index_is_independent() {
        let mut g = MemoryGraph::new();
        let root = g.create_node(NodeLabel::Entity, None);
        let scoped = TimedEvents::new(TimeTree::with_root(root));
        let global = TimedEvents::default();
        let e = entity(&mut g);

        scoped.attach_event(&mut g, e, "AT_TIME", &day(2012, 11, 1)).unwrap();

        let seen = scoped.events_at(&g, &day(2012, 11, 1), &EventFilter::Any).unwrap();
        assert_eq!(nodes(&seen), vec![e]);
        let unseen = global.events_at(&g, &day(2012, 11, 1), &EventFilter::Any).unwrap();
        assert!(unseen.is_empty());
    }
}
