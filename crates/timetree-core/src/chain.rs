//! Level chain: the per-resolution ordered sibling structure.
//!
//! Each parent points at its minimum and maximum children via `FIRST` and
//! `LAST`; every node points at the chronologically next node of the same
//! resolution via `NEXT`, forming one ascending chain per level that
//! crosses parent boundaries. [`find_or_insert_child`] maintains all
//! three edge sets, including the cross-parent splice when a new child
//! becomes its parent's boundary node; the lookup helpers walk them
//! without mutating.
//!
//! Invariants maintained here (and assumed by every reader):
//!
//! 1. From a parent's `FIRST`, following `NEXT` visits exactly that
//!    parent's children in strictly increasing value order, ending at
//!    `LAST`.
//! 2. Stepping `NEXT` off a parent's `LAST` child lands on the next
//!    parent's `FIRST` child at the same level, so the chain is one
//!    continuous ascending sequence per level.
//!
//! A broken link or a valueless chain node is reported as
//! [`TimeTreeError::Conflict`]; the chain is never repaired in place.

use tracing::{debug, trace};

use crate::error::{Result, TimeTreeError};
use crate::graph::{EdgeType, NodeId, NodeLabel, TimeGraph};
use crate::resolution::Resolution;

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------

/// The parent's minimum-valued child, if it has any children.
pub fn first_child<G: TimeGraph>(g: &G, parent: NodeId) -> Option<NodeId> {
    g.single_outgoing(parent, &EdgeType::First)
}

/// The parent's maximum-valued child, if it has any children.
pub fn last_child<G: TimeGraph>(g: &G, parent: NodeId) -> Option<NodeId> {
    g.single_outgoing(parent, &EdgeType::Last)
}

/// The chronologically next node at the same level, possibly under a
/// different parent.
pub fn next<G: TimeGraph>(g: &G, node: NodeId) -> Option<NodeId> {
    g.single_outgoing(node, &EdgeType::Next)
}

/// The chronologically previous node at the same level.
pub fn prev<G: TimeGraph>(g: &G, node: NodeId) -> Option<NodeId> {
    g.single_incoming(node, &EdgeType::Next)
}

/// The node's immediate parent in the tree.
pub fn parent_of<G: TimeGraph>(g: &G, node: NodeId) -> Option<NodeId> {
    g.single_incoming(node, &EdgeType::Child)
}

/// The parent's children in ascending value order.
///
/// Walks `FIRST` then `NEXT`, stopping as soon as the chain leaves this
/// parent's scope (the boundary check that keeps the walk off the global
/// chain's other subtrees).
pub fn children_in_order<G: TimeGraph>(g: &G, parent: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    let Some(mut cur) = first_child(g, parent) else {
        return out;
    };
    loop {
        out.push(cur);
        match next(g, cur) {
            Some(n) if parent_of(g, n) == Some(parent) => cur = n,
            _ => return out,
        }
    }
}

// ---------------------------------------------------------------------------
// Lookup
// ---------------------------------------------------------------------------

/// The child of `parent` with exactly this value, without creating.
pub fn find_child<G: TimeGraph>(g: &G, parent: NodeId, value: i64) -> Option<NodeId> {
    let mut cur = first_child(g, parent)?;
    loop {
        match g.value(cur) {
            Some(v) if v == value => return Some(cur),
            // children ascend, so overshooting means absent
            Some(v) if v > value => return None,
            _ => {}
        }
        let n = next(g, cur)?;
        if parent_of(g, n) != Some(parent) {
            return None;
        }
        cur = n;
    }
}

/// The largest-valued child of `parent` with `value <= target`, walking
/// the chain backward from `LAST`. `None` when every child is larger
/// (or there are none).
pub fn nearest_child_at_or_before<G: TimeGraph>(
    g: &G,
    parent: NodeId,
    target: i64,
) -> Option<NodeId> {
    let last = last_child(g, parent)?;
    if g.value(last).is_some_and(|v| v <= target) {
        return Some(last);
    }
    let mut cur = last;
    while let Some(p) = prev(g, cur) {
        if parent_of(g, p) != Some(parent) {
            return None;
        }
        if g.value(p).is_some_and(|v| v <= target) {
            return Some(p);
        }
        cur = p;
    }
    None
}

/// The smallest-valued child of `parent` with `value >= target`, walking
/// the chain forward from `FIRST`. `None` when every child is smaller
/// (or there are none).
pub fn nearest_child_at_or_after<G: TimeGraph>(
    g: &G,
    parent: NodeId,
    target: i64,
) -> Option<NodeId> {
    let first = first_child(g, parent)?;
    if g.value(first).is_some_and(|v| v >= target) {
        return Some(first);
    }
    let mut cur = first;
    while let Some(n) = next(g, cur) {
        if parent_of(g, n) != Some(parent) {
            return None;
        }
        if g.value(n).is_some_and(|v| v >= target) {
            return Some(n);
        }
        cur = n;
    }
    None
}

/// The last child of the nearest earlier parent (on `parent`'s own level
/// chain) that has children. This is the global-chain predecessor of
/// `parent`'s first child.
fn previous_in_level<G: TimeGraph>(g: &G, parent: NodeId) -> Option<NodeId> {
    let mut cur = prev(g, parent)?;
    loop {
        if let Some(l) = last_child(g, cur) {
            return Some(l);
        }
        cur = prev(g, cur)?;
    }
}

/// The first child of the nearest later parent (on `parent`'s own level
/// chain) that has children. This is the global-chain successor of
/// `parent`'s last child.
fn next_in_level<G: TimeGraph>(g: &G, parent: NodeId) -> Option<NodeId> {
    let mut cur = next(g, parent)?;
    loop {
        if let Some(f) = first_child(g, cur) {
            return Some(f);
        }
        cur = next(g, cur)?;
    }
}

// ---------------------------------------------------------------------------
// Find-or-insert
// ---------------------------------------------------------------------------

/// Find the child of `parent` with this value, creating it (and wiring
/// `CHILD`/`FIRST`/`LAST`/`NEXT`) if absent.
///
/// Appending past `LAST` and prepending before `FIRST` are O(1); that
/// covers chronologically monotonic writers. Interior insertion scans
/// from whichever boundary is closer in value, O(k) in the siblings
/// skipped. A child inserted at a parent boundary is spliced into the
/// level's global chain so consecutive nodes under different parents
/// stay directly linked.
///
/// # Errors
///
/// [`TimeTreeError::ValueOutOfRange`] for a value outside the
/// resolution's calendar bounds; [`TimeTreeError::Conflict`] when the
/// existing chain is structurally broken.
pub fn find_or_insert_child<G: TimeGraph>(
    g: &mut G,
    parent: NodeId,
    resolution: Resolution,
    value: i64,
) -> Result<NodeId> {
    resolution.validate(value)?;

    // No children yet: the new child is FIRST and LAST at once, spliced
    // between the neighboring parents' boundary children.
    let Some(last) = last_child(g, parent) else {
        let child = create_child(g, parent, resolution, value);
        g.add_edge(parent, child, EdgeType::First);
        g.add_edge(parent, child, EdgeType::Last);
        if let Some(gp) = previous_in_level(g, parent) {
            if let Some(gn) = next(g, gp) {
                g.remove_edge(gp, gn, &EdgeType::Next);
                g.add_edge(child, gn, EdgeType::Next);
            }
            g.add_edge(gp, child, EdgeType::Next);
        } else if let Some(gn) = next_in_level(g, parent) {
            g.add_edge(child, gn, EdgeType::Next);
        }
        return Ok(child);
    };

    let last_value = node_value(g, last)?;
    if value == last_value {
        return Ok(last);
    }
    if value > last_value {
        // Append: the common case for ascending timestamps. The old
        // LAST may point across the parent boundary; the new child
        // takes that link over.
        let child = create_child(g, parent, resolution, value);
        if let Some(gn) = next(g, last) {
            g.remove_edge(last, gn, &EdgeType::Next);
            g.add_edge(child, gn, EdgeType::Next);
        }
        g.add_edge(last, child, EdgeType::Next);
        replace_single(g, parent, EdgeType::Last, last, child);
        return Ok(child);
    }

    let first = first_child(g, parent).ok_or_else(|| {
        TimeTreeError::Conflict(format!("parent {parent} has LAST but no FIRST"))
    })?;
    let first_value = node_value(g, first)?;
    if value == first_value {
        return Ok(first);
    }
    if value < first_value {
        // Prepend; mirror of the append splice.
        let child = create_child(g, parent, resolution, value);
        if let Some(gp) = prev(g, first) {
            g.remove_edge(gp, first, &EdgeType::Next);
            g.add_edge(gp, child, EdgeType::Next);
        }
        g.add_edge(child, first, EdgeType::Next);
        replace_single(g, parent, EdgeType::First, first, child);
        return Ok(child);
    }

    // Interior: scan from the boundary whose value is closer. Never
    // touches the cross-parent links. Saturating: year values may span
    // the full i64 range.
    trace!(%parent, value, first_value, last_value, "interior sibling scan");
    if value.saturating_sub(first_value) <= last_value.saturating_sub(value) {
        scan_forward(g, parent, resolution, value, first)
    } else {
        scan_backward(g, parent, resolution, value, last)
    }
}

/// Forward scan from `FIRST` for the adjacent pair straddling `value`.
fn scan_forward<G: TimeGraph>(
    g: &mut G,
    parent: NodeId,
    resolution: Resolution,
    value: i64,
    first: NodeId,
) -> Result<NodeId> {
    let mut before = first;
    loop {
        let after = next(g, before).ok_or_else(|| {
            TimeTreeError::Conflict(format!(
                "NEXT chain under {parent} ended before reaching LAST"
            ))
        })?;
        let after_value = node_value(g, after)?;
        if after_value == value {
            return Ok(after);
        }
        if after_value > value {
            return Ok(insert_between(g, parent, resolution, value, before, after));
        }
        before = after;
    }
}

/// Backward scan from `LAST` for the adjacent pair straddling `value`.
fn scan_backward<G: TimeGraph>(
    g: &mut G,
    parent: NodeId,
    resolution: Resolution,
    value: i64,
    last: NodeId,
) -> Result<NodeId> {
    let mut after = last;
    loop {
        let before = prev(g, after).ok_or_else(|| {
            TimeTreeError::Conflict(format!(
                "NEXT chain under {parent} ended before reaching FIRST"
            ))
        })?;
        let before_value = node_value(g, before)?;
        if before_value == value {
            return Ok(before);
        }
        if before_value < value {
            return Ok(insert_between(g, parent, resolution, value, before, after));
        }
        after = before;
    }
}

/// Splice a new child between two adjacent siblings.
fn insert_between<G: TimeGraph>(
    g: &mut G,
    parent: NodeId,
    resolution: Resolution,
    value: i64,
    before: NodeId,
    after: NodeId,
) -> NodeId {
    let child = create_child(g, parent, resolution, value);
    g.remove_edge(before, after, &EdgeType::Next);
    g.add_edge(before, child, EdgeType::Next);
    g.add_edge(child, after, EdgeType::Next);
    child
}

fn create_child<G: TimeGraph>(
    g: &mut G,
    parent: NodeId,
    resolution: Resolution,
    value: i64,
) -> NodeId {
    let child = g.create_node(NodeLabel::Instant(resolution), Some(value));
    g.add_edge(parent, child, EdgeType::Child);
    debug!(%parent, %child, %resolution, value, "created calendar node");
    child
}

fn replace_single<G: TimeGraph>(
    g: &mut G,
    parent: NodeId,
    edge: EdgeType,
    old: NodeId,
    new: NodeId,
) {
    g.remove_edge(parent, old, &edge);
    g.add_edge(parent, new, edge);
}

fn node_value<G: TimeGraph>(g: &G, node: NodeId) -> Result<i64> {
    g.value(node)
        .ok_or_else(|| TimeTreeError::Conflict(format!("chain node {node} has no value")))
}
