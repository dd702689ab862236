//! Hierarchical, multi-resolution time index over a graph substrate,
//! with an event index layered on top.
//!
//! Calendar nodes (year, month-of-year, day-of-month, ... down to
//! millisecond) are created lazily under a root as instants are
//! indexed. Three structures make queries cheap:
//!
//! - the tree itself: `CHILD` edges from each node to its calendar
//!   children, created exactly once per distinct path;
//! - per-parent `FIRST`/`LAST` boundary edges, making chronologically
//!   monotonic insertion O(1);
//! - one global `NEXT` chain per resolution level, crossing parent
//!   boundaries, so range scans never climb back to a common ancestor.
//!
//! The event index attaches domain entities to calendar nodes by typed
//! edges and answers point and range queries, descending into finer
//! resolutions nested beneath the queried node.
//!
//! Storage is abstracted behind [`graph::TimeGraph`]; every operation
//! runs inside a caller-owned transaction and the crate performs no
//! locking or retries (see the [`graph`] module docs for the
//! concurrency contract the store must uphold). Errors carry a
//! [`ErrorKind`] class so a transport façade can map them to status
//! codes.
//!
//! # Conventions
//!
//! - **Errors**: typed [`TimeTreeError`] results, propagated with `?`.
//! - **Logging**: `tracing` macros; the library installs no subscriber.
//!
//! ```
//! use timetree_core::graph::MemoryGraph;
//! use timetree_core::instant::TimeInstant;
//! use timetree_core::resolution::Resolution;
//! use timetree_core::tree::TimeTree;
//!
//! let mut g = MemoryGraph::new();
//! let tree = TimeTree::new();
//!
//! // 2012-11-01T00:00:00Z, indexed at day resolution
//! let instant = TimeInstant::new(1_351_728_000_000).with_resolution(Resolution::Day);
//! let leaf = tree.get_or_create_instant(&mut g, &instant).unwrap();
//! assert_eq!(tree.get_instant(&g, &instant).unwrap(), Some(leaf));
//! ```

pub mod chain;
pub mod config;
pub mod error;
pub mod events;
pub mod graph;
pub mod instant;
pub mod resolution;
pub mod tree;

pub use config::TimeTreeConfig;
pub use error::{ErrorKind, Result, TimeTreeError};
pub use events::{Attachment, Event, EventFilter, TimedEvents};
pub use graph::{EdgeType, MemoryGraph, NodeId, NodeLabel, TimeGraph};
pub use instant::TimeInstant;
pub use resolution::Resolution;
pub use tree::{Anchor, TimeTree};
