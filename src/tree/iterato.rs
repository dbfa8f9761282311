//! Read-only traversal iterators over a forest of [`Node`]s.

use std::collections::VecDeque;

use super::{Node, NodePath};

// --- BFS Iterator ---

/// A Breadth-First Search (BFS) iterator over a whole forest, level by level.
/// Yields each node together with its [`NodePath`].
#[derive(Clone)]
pub struct BfsIter<'a, V> {
    queue: VecDeque<(NodePath, &'a Node<V>)>,
}

impl<'a, V> BfsIter<'a, V> {
    /// Create a new BFS iterator seeded with every root of `forest`.
    pub fn new(forest: &'a [Node<V>]) -> Self {
        let queue = forest
            .iter()
            .enumerate()
            .map(|(i, root)| (NodePath::root(i), root))
            .collect();
        BfsIter { queue }
    }
}

impl<'a, V> Iterator for BfsIter<'a, V> {
    type Item = (NodePath, &'a Node<V>);
    fn next(&mut self) -> Option<Self::Item> {
        let (path, node) = self.queue.pop_front()?;
        for (i, child) in node.children.iter().enumerate() {
            self.queue.push_back((path.child(i), child));
        }
        Some((path, node))
    }
}

// --- Preorder Iterator ---

/// A pre-order DFS iterator: parents before their children, siblings in order.
/// Visits nodes in the same order as [`super::TreeStore::walk`].
#[derive(Clone)]
pub struct PreorderIter<'a, V> {
    /// Stack for DFS traversal. Stores nodes to visit.
    stack: Vec<&'a Node<V>>,
}

impl<'a, V> PreorderIter<'a, V> {
    pub fn new(forest: &'a [Node<V>]) -> Self {
        PreorderIter {
            stack: forest.iter().rev().collect(),
        }
    }
}

impl<'a, V> Iterator for PreorderIter<'a, V> {
    type Item = &'a Node<V>;
    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        // Reverse so the first child is processed next
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

#[cfg(test)]
mod test {
    use itertools::Itertools;

    use super::*;
    use crate::tree::{PartialNode, TreeConfig, TreeStore};

    fn forest() -> Vec<Node<()>> {
        let records = vec![
            PartialNode::new()
                .title("a")
                .child(PartialNode::new().title("b").child(PartialNode::new().title("d")))
                .child(PartialNode::new().title("c")),
            PartialNode::new().title("e").child(PartialNode::new().title("f")),
        ];
        let mut store = TreeStore::new(TreeConfig::test());
        records.into_iter().map(|r| store.sanitize(r)).collect()
    }

    #[test]
    fn preorder() {
        let forest = forest();
        let titles = PreorderIter::new(&forest).map(|n| &n.title).join(" ");
        assert_eq!(titles, "a b d c e f");
    }

    #[test]
    fn bfs() {
        let forest = forest();
        let visited = BfsIter::new(&forest)
            .map(|(path, n)| format!("{}@{path}", n.title))
            .join(" ");
        assert_eq!(visited, "a@0 e@1 b@0/0 c@0/1 f@1/0 d@0/0/0");
    }

    #[test]
    fn empty() {
        let forest: Vec<Node<()>> = vec![];
        assert_eq!(PreorderIter::new(&forest).count(), 0);
        assert_eq!(BfsIter::new(&forest).count(), 0);
    }
}
