//! # Arbor
//!
//! Arbor is the data model behind tree views: an ordered forest of titled nodes with
//! parent links, a lazily built id index, breadth-first lookup and pre-order traversal.
//!
//! Nodes are owned top-down through their `children`; parent links are plain ids,
//! re-derived on every walk, so a forest can be serialized and reloaded without cycles.

pub mod tree;
