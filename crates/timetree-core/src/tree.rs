//! The time tree: calendar decomposition composed with the level chain
//! across all resolution levels.
//!
//! A [`TimeTree`] is an anchor, not storage: the default anchor resolves
//! to the store's singleton root (created lazily on first write), a
//! custom anchor to any caller-designated node. Several independent
//! trees coexist in one store by varying the anchor; every algorithm is
//! identical either way.
//!
//! All operations run inside the caller's transaction (see
//! [`crate::graph`] for the concurrency contract).

use tracing::{debug, trace};

use crate::chain;
use crate::error::{Result, TimeTreeError};
use crate::graph::{NodeId, NodeLabel, TimeGraph};
use crate::instant::TimeInstant;
use crate::resolution::Resolution;

use chrono_tz::Tz;

/// Which node a tree hangs off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Anchor {
    /// The store's singleton root, created lazily on first write.
    #[default]
    Default,
    /// A caller-designated node, enabling independent parallel trees.
    Custom(NodeId),
}

/// A hierarchical, multi-resolution time index rooted at an anchor.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeTree {
    anchor: Anchor,
}

impl TimeTree {
    /// A tree over the store's default singleton root.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            anchor: Anchor::Default,
        }
    }

    /// A tree rooted at a caller-supplied node. Operations fail with
    /// [`TimeTreeError::RootNotFound`] if the node does not exist.
    #[must_use]
    pub const fn with_root(root: NodeId) -> Self {
        Self {
            anchor: Anchor::Custom(root),
        }
    }

    /// Resolve the root without creating it.
    ///
    /// # Errors
    ///
    /// [`TimeTreeError::RootNotFound`] for a dangling custom anchor.
    fn root<G: TimeGraph>(&self, g: &G) -> Result<Option<NodeId>> {
        match self.anchor {
            Anchor::Default => Ok(g.default_root()),
            Anchor::Custom(id) => {
                if g.contains(id) {
                    Ok(Some(id))
                } else {
                    Err(TimeTreeError::RootNotFound(id))
                }
            }
        }
    }

    /// Resolve the root, creating the default singleton if needed.
    fn root_or_create<G: TimeGraph>(&self, g: &mut G) -> Result<NodeId> {
        match self.anchor {
            Anchor::Default => Ok(g.default_root().unwrap_or_else(|| {
                let root = g.create_node(NodeLabel::Root, None);
                debug!(%root, "created default time tree root");
                root
            })),
            Anchor::Custom(id) => {
                if g.contains(id) {
                    Ok(id)
                } else {
                    Err(TimeTreeError::RootNotFound(id))
                }
            }
        }
    }

    /// Get or create the calendar node for an instant, descending from
    /// year to the instant's resolution and wiring every level's chain.
    ///
    /// # Errors
    ///
    /// [`TimeTreeError::InvalidTimestamp`] for unrepresentable
    /// timestamps, [`TimeTreeError::RootNotFound`] for a dangling custom
    /// anchor, [`TimeTreeError::Conflict`] for a broken sibling chain.
    pub fn get_or_create_instant<G: TimeGraph>(
        &self,
        g: &mut G,
        instant: &TimeInstant,
    ) -> Result<NodeId> {
        let units = instant.decompose()?;
        let mut node = self.root_or_create(g)?;
        for (resolution, value) in units {
            node = chain::find_or_insert_child(g, node, resolution, value)?;
        }
        trace!(leaf = %node, timestamp = instant.timestamp, "resolved instant leaf");
        Ok(node)
    }

    /// Get or create the calendar node for the current wall-clock time.
    ///
    /// # Errors
    ///
    /// Same as [`Self::get_or_create_instant`].
    pub fn get_or_create_now<G: TimeGraph>(
        &self,
        g: &mut G,
        timezone: Tz,
        resolution: Resolution,
    ) -> Result<NodeId> {
        let instant = TimeInstant::now()
            .with_timezone(timezone)
            .with_resolution(resolution);
        self.get_or_create_instant(g, &instant)
    }

    /// The exact calendar node for an instant, or `None` if any level of
    /// its path is missing. Never creates nodes.
    ///
    /// # Errors
    ///
    /// [`TimeTreeError::InvalidTimestamp`], [`TimeTreeError::RootNotFound`].
    pub fn get_instant<G: TimeGraph>(
        &self,
        g: &G,
        instant: &TimeInstant,
    ) -> Result<Option<NodeId>> {
        let units = instant.decompose()?;
        let Some(mut node) = self.root(g)? else {
            return Ok(None);
        };
        for (_, value) in units {
            match chain::find_child(g, node, value) {
                Some(child) => node = child,
                None => return Ok(None),
            }
        }
        Ok(Some(node))
    }

    /// The latest existing node at the instant's resolution that is at
    /// or before the instant, or `None` if the tree holds nothing that
    /// early.
    ///
    /// # Errors
    ///
    /// [`TimeTreeError::InvalidTimestamp`], [`TimeTreeError::RootNotFound`].
    pub fn get_instant_at_or_before<G: TimeGraph>(
        &self,
        g: &G,
        instant: &TimeInstant,
    ) -> Result<Option<NodeId>> {
        let units = instant.decompose()?;
        let Some(mut node) = self.root(g)? else {
            return Ok(None);
        };
        for (i, &(_, value)) in units.iter().enumerate() {
            if let Some(child) = chain::find_child(g, node, value) {
                node = child;
                continue;
            }
            // Exact value missing at this level: the nearest earlier
            // sibling's subtree ends strictly before the instant, so the
            // rest of the descent follows LAST edges.
            if let Some(sibling) = chain::nearest_child_at_or_before(g, node, value) {
                return Ok(descend_last(g, sibling, units.len() - i - 1));
            }
            // Nothing at or before under this parent: cross to the
            // chronologically previous subtree via the global chain.
            let Some(previous) = chain::prev(g, node) else {
                return Ok(None);
            };
            return Ok(descend_last(g, previous, units.len() - i));
        }
        Ok(Some(node))
    }

    /// The earliest existing node at the instant's resolution that is at
    /// or after the instant, or `None` if the tree holds nothing that
    /// late. Mirror of [`Self::get_instant_at_or_before`].
    ///
    /// # Errors
    ///
    /// [`TimeTreeError::InvalidTimestamp`], [`TimeTreeError::RootNotFound`].
    pub fn get_instant_at_or_after<G: TimeGraph>(
        &self,
        g: &G,
        instant: &TimeInstant,
    ) -> Result<Option<NodeId>> {
        let units = instant.decompose()?;
        let Some(mut node) = self.root(g)? else {
            return Ok(None);
        };
        for (i, &(_, value)) in units.iter().enumerate() {
            if let Some(child) = chain::find_child(g, node, value) {
                node = child;
                continue;
            }
            if let Some(sibling) = chain::nearest_child_at_or_after(g, node, value) {
                return Ok(descend_first(g, sibling, units.len() - i - 1));
            }
            let Some(following) = chain::next(g, node) else {
                return Ok(None);
            };
            return Ok(descend_first(g, following, units.len() - i));
        }
        Ok(Some(node))
    }

    /// All existing nodes at the given resolution whose instants fall in
    /// `[start, end]`, in ascending chronological order. Walks the
    /// leaf-level `NEXT` chain, crossing parent boundaries transparently.
    ///
    /// # Errors
    ///
    /// [`TimeTreeError::InvalidRange`] when `end < start`, plus the
    /// lookup errors of the boundary probes.
    pub fn get_instants<G: TimeGraph>(
        &self,
        g: &G,
        start: i64,
        end: i64,
        timezone: Tz,
        resolution: Resolution,
    ) -> Result<Vec<NodeId>> {
        if end < start {
            return Err(TimeTreeError::InvalidRange { start, end });
        }
        let start_instant = TimeInstant::new(start)
            .with_timezone(timezone)
            .with_resolution(resolution);
        let end_instant = TimeInstant::new(end)
            .with_timezone(timezone)
            .with_resolution(resolution);

        let Some(start_leaf) = self.get_instant_at_or_after(g, &start_instant)? else {
            return Ok(Vec::new());
        };
        let Some(end_leaf) = self.get_instant_at_or_before(g, &end_instant)? else {
            return Ok(Vec::new());
        };
        Ok(walk_span(g, start_leaf, end_leaf))
    }
}

/// The deepest node `levels` below `start` on the latest path: follow
/// `LAST` edges, and when a node has no children sidestep to its
/// predecessor on the level's global chain and keep descending. `None`
/// once the chain runs out, i.e. nothing at the requested resolution
/// exists this early. Trees may hold nodes at mixed resolutions, so a
/// childless intermediate node is an expected stop, not a dead end.
fn descend_last<G: TimeGraph>(g: &G, start: NodeId, levels: usize) -> Option<NodeId> {
    let mut node = start;
    let mut remaining = levels;
    while remaining > 0 {
        match chain::last_child(g, node) {
            Some(child) => {
                node = child;
                remaining -= 1;
            }
            None => node = chain::prev(g, node)?,
        }
    }
    Some(node)
}

/// Mirror of [`descend_last`]: `FIRST` edges, sidestepping forward along
/// the level's global chain past childless nodes.
fn descend_first<G: TimeGraph>(g: &G, start: NodeId, levels: usize) -> Option<NodeId> {
    let mut node = start;
    let mut remaining = levels;
    while remaining > 0 {
        match chain::first_child(g, node) {
            Some(child) => {
                node = child;
                remaining -= 1;
            }
            None => node = chain::next(g, node)?,
        }
    }
    Some(node)
}

/// Collect the `NEXT` chain from `start` to `end` inclusive. Returns
/// empty when `end` is not reachable from `start` (the two probes landed
/// on opposite sides of a gap, i.e. the effective range is empty).
fn walk_span<G: TimeGraph>(g: &G, start: NodeId, end: NodeId) -> Vec<NodeId> {
    let mut span = vec![start];
    if start == end {
        return span;
    }
    let mut cur = start;
    while let Some(n) = chain::next(g, cur) {
        span.push(n);
        if n == end {
            return span;
        }
        cur = n;
    }
    Vec::new()
}
