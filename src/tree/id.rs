//! Strategies for producing fresh node ids.

use std::fmt::Debug;

use uuid::Uuid;

use super::NodeId;

/// Source of new node ids. [`super::TreeStore::create_node`] and
/// [`super::TreeStore::sanitize`] both draw from it.
pub trait IdGenerator: Debug {
    fn next_id(&mut self) -> NodeId;

    /// The next value a deterministic generator will hand out, `None` for random ones.
    fn sequence(&self) -> Option<u64> {
        None
    }
}

/// Deterministic ids `n, n+1, n+2, …` for tests and reproducible output.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SequentialIds {
    next: u64,
}

impl SequentialIds {
    pub fn starting_at(next: u64) -> Self {
        SequentialIds { next }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> NodeId {
        let id = self.next;
        self.next += 1;
        NodeId::Int(id)
    }

    fn sequence(&self) -> Option<u64> {
        Some(self.next)
    }
}

/// Random v4 UUIDs, rendered as string ids.
#[derive(Clone, Copy, Debug, Default)]
pub struct UuidIds;

impl IdGenerator for UuidIds {
    fn next_id(&mut self) -> NodeId {
        Uuid::new_v4().into()
    }
}
