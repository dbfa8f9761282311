use std::fmt::{self, Display};

use ahash::AHashSet;
use indexmap::IndexMap;
use log::{debug, warn};

use super::{
    config::TreeConfig,
    id::IdGenerator,
    iterato::{BfsIter, PreorderIter},
    node_at, node_at_mut, Node, NodeId, NodePath, ParentId, PartialNode, TreeError,
};

/// Cache from node id to the node's position in the forest.
pub type NodeIndex = IndexMap<NodeId, NodePath, ahash::RandomState>;

/// An indexed forest backing a tree view.
///
/// The store owns the forest; callers read it through [`TreeStore::forest`], edit it through
/// [`TreeStore::forest_mut`] and must [`TreeStore::walk`] (or [`TreeStore::refresh`]) after any
/// structural edit before relying on parent links or on the index.
///
/// All failure paths are non-fatal: they log a warning and return `None`.
#[derive(Debug)]
pub struct TreeStore<V> {
    forest: Vec<Node<V>>,
    /// Only guaranteed consistent right after a walk.
    index: NodeIndex,
    ids: Box<dyn IdGenerator>,
    config: TreeConfig,
}

impl<V> TreeStore<V> {
    /// An empty store, id strategy picked from `config`.
    pub fn new(config: TreeConfig) -> Self {
        let ids = config.id_generator();
        Self::with_id_generator(config, ids)
    }

    pub fn with_id_generator(config: TreeConfig, ids: Box<dyn IdGenerator>) -> Self {
        TreeStore {
            forest: Vec::new(),
            index: NodeIndex::default(),
            ids,
            config,
        }
    }

    /// Wraps an already typed forest, walking it right away unless it is empty.
    pub fn with_forest(config: TreeConfig, forest: Vec<Node<V>>) -> Self {
        let mut store = Self::new(config);
        if !forest.is_empty() {
            store.forest = forest;
            store.refresh();
        }
        store
    }

    /// Ingests external records, see [`TreeStore::set_records`].
    pub fn from_records(config: TreeConfig, records: Vec<PartialNode<V>>) -> Result<Self, TreeError>
    where
        V: Default,
    {
        let mut store = Self::new(config);
        if !records.is_empty() {
            store.set_records(records)?;
        }
        Ok(store)
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    pub fn forest(&self) -> &[Node<V>] {
        &self.forest
    }

    /// Out-of-band access. The index and parent links are stale until the next walk.
    pub fn forest_mut(&mut self) -> &mut Vec<Node<V>> {
        &mut self.forest
    }

    pub fn into_forest(self) -> Vec<Node<V>> {
        self.forest
    }

    pub fn is_empty(&self) -> bool {
        self.forest.is_empty()
    }

    /// Number of nodes in the whole forest.
    pub fn len(&self) -> usize {
        self.iter_preorder().count()
    }

    pub fn index(&self) -> &NodeIndex {
        &self.index
    }

    pub fn is_indexed(&self, id: &NodeId) -> bool {
        self.index.contains_key(id)
    }

    /// Swaps in a new forest and re-walks it.
    pub fn set_forest(&mut self, forest: Vec<Node<V>>) -> Option<&[Node<V>]> {
        self.forest = forest;
        self.index.clear();
        self.refresh()
    }

    /// Swaps in a forest built from external records and re-walks it.
    ///
    /// With `sanitize_on_walk` missing fields are filled in; otherwise every record must be
    /// complete and the first incomplete one is reported.
    pub fn set_records(
        &mut self,
        records: Vec<PartialNode<V>>,
    ) -> Result<Option<&[Node<V>]>, TreeError>
    where
        V: Default,
    {
        let forest: Vec<Node<V>> = if self.config.sanitize_on_walk {
            records.into_iter().map(|r| self.sanitize(r)).collect()
        } else {
            records
                .into_iter()
                .map(Node::try_from)
                .collect::<Result<Vec<_>, _>>()?
        };
        Ok(self.set_forest(forest))
    }

    pub fn generate_id(&mut self) -> NodeId {
        self.ids.next_id()
    }

    /// A fresh node under `parent` (or the sentinel root parent). The node is not inserted
    /// anywhere; placing it is up to the caller.
    pub fn create_node(&mut self, parent: Option<&Node<V>>) -> Node<V>
    where
        V: Default,
    {
        Node {
            id: self.generate_id(),
            data: V::default(),
            parent: parent.map_or(ParentId::Root, |p| ParentId::Node(p.id.clone())),
            title: self.config.default_title.clone(),
            subtitle: String::new(),
            expanded: true,
            children: Vec::new(),
        }
    }

    /// Fills in the missing fields of `partial` and its descendants. Present fields are kept
    /// as they are, so sanitizing a complete record changes nothing.
    pub fn sanitize(&mut self, partial: PartialNode<V>) -> Node<V>
    where
        V: Default,
    {
        let PartialNode {
            id,
            data,
            parent,
            title,
            subtitle,
            expanded,
            children,
        } = partial;

        let id = id.unwrap_or_else(|| self.generate_id());
        let title = title.unwrap_or_else(|| self.config.default_title.clone());
        let children = children
            .unwrap_or_default()
            .into_iter()
            .map(|c| self.sanitize(c))
            .collect();

        Node {
            id,
            data: data.unwrap_or_default(),
            parent: parent.unwrap_or_default(),
            title,
            subtitle: subtitle.unwrap_or_default(),
            expanded: expanded.unwrap_or(true),
            children,
        }
    }

    /// Looks up a node by id.
    ///
    /// Served from the index when possible, otherwise by a breadth-first search that stops at
    /// the first match. Only the node found is added to the index.
    pub fn find(&mut self, id: &NodeId) -> Option<&Node<V>> {
        let path = self.locate(id)?;
        node_at(&self.forest, &path)
    }

    pub fn find_mut(&mut self, id: &NodeId) -> Option<&mut Node<V>> {
        let path = self.locate(id)?;
        node_at_mut(&mut self.forest, &path)
    }

    fn locate(&mut self, id: &NodeId) -> Option<NodePath> {
        if self.config.indexing {
            if let Some(path) = self.index.get(id) {
                if node_at(&self.forest, path).is_some_and(|n| &n.id == id) {
                    return Some(path.clone());
                }
                debug!("Index entry for {id} at {path} is stale");
            }
        }

        if self.forest.is_empty() {
            warn!("Cannot find node {id}: the forest is empty");
            return None;
        }

        let (path, _) = BfsIter::new(&self.forest).find(|(_, node)| &node.id == id)?;
        if self.config.indexing {
            self.index.insert(id.clone(), path.clone());
        }
        Some(path)
    }

    /// The parent of the node `id`, `None` for roots and unknown ids.
    pub fn parent_of(&mut self, id: &NodeId) -> Option<&Node<V>> {
        let parent = self.find(id)?.parent.id()?.clone();
        self.find(&parent)
    }

    /// Ids from `id` up to its root, inclusive. Empty if `id` is unknown.
    pub fn ancestors(&mut self, id: &NodeId) -> Vec<NodeId> {
        let limit = self.len();
        let mut chain = Vec::new();
        let mut next = Some(id.clone());

        while let Some(current) = next.take() {
            let Some(node) = self.find(&current) else {
                break;
            };
            next = node.parent.id().cloned();
            chain.push(current);
            if chain.len() > limit {
                warn!("Parent links starting at {id} form a cycle");
                break;
            }
        }
        chain
    }

    /// Pre-order traversal of the whole forest, applying `visit` to every node.
    ///
    /// Rebuilds the index from scratch and re-derives every parent link, so it must be
    /// called after structural edits. Returns `None` (with a warning) on an empty forest.
    pub fn walk<F>(&mut self, mut visit: F) -> Option<&[Node<V>]>
    where
        F: FnMut(&mut Node<V>),
    {
        if self.forest.is_empty() {
            warn!("Nothing to walk: the forest is empty");
            return None;
        }

        self.index.clear();
        let indexing = self.config.indexing;
        let mut path = NodePath::default();
        for (i, root) in self.forest.iter_mut().enumerate() {
            root.parent = ParentId::Root;
            path.push(i);
            walk_subtree(root, &mut path, indexing.then_some(&mut self.index), &mut visit);
            path.pop();
        }
        debug!("Walked forest, {} ids indexed", self.index.len());

        Some(&self.forest)
    }

    /// A walk with no visitor: re-derives parent links and the index.
    pub fn refresh(&mut self) -> Option<&[Node<V>]> {
        self.walk(|_| {})
    }

    pub fn iter_preorder(&self) -> PreorderIter<'_, V> {
        PreorderIter::new(&self.forest)
    }

    pub fn iter_bfs(&self) -> BfsIter<'_, V> {
        BfsIter::new(&self.forest)
    }

    /// Checks that ids are unique and that every parent link matches the forest shape.
    pub fn validate(&self) -> Result<(), TreeError> {
        let mut seen = AHashSet::new();
        let mut stack: Vec<(ParentId, &Node<V>)> = self
            .forest
            .iter()
            .rev()
            .map(|root| (ParentId::Root, root))
            .collect();

        while let Some((expected, node)) = stack.pop() {
            if !seen.insert(&node.id) {
                return Err(TreeError::DuplicateId(node.id.clone()));
            }
            if node.parent != expected {
                return Err(TreeError::WrongParent {
                    node: node.id.clone(),
                    expected,
                    found: node.parent.clone(),
                });
            }
            let parent = ParentId::Node(node.id.clone());
            stack.extend(node.children.iter().rev().map(|c| (parent.clone(), c)));
        }
        Ok(())
    }
}

fn walk_subtree<V, F>(
    node: &mut Node<V>,
    path: &mut NodePath,
    mut index: Option<&mut NodeIndex>,
    visit: &mut F,
) where
    F: FnMut(&mut Node<V>),
{
    if let Some(index) = index.as_deref_mut() {
        if let Some(previous) = index.insert(node.id.clone(), path.clone()) {
            warn!(
                "Duplicate node id {} at {path}, replacing the entry at {previous}",
                node.id
            );
        }
    }

    visit(node);

    let parent = ParentId::Node(node.id.clone());
    for child in &mut node.children {
        child.parent = parent.clone();
    }
    for (i, child) in node.children.iter_mut().enumerate() {
        path.push(i);
        walk_subtree(child, path, index.as_deref_mut(), visit);
        path.pop();
    }
}

impl<V> Display for TreeStore<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sequence = self.ids.sequence().unwrap_or(self.config.sequence);
        writeln!(f, "TreeStore")?;
        writeln!(f, "  test mode: {}", self.config.test_mode)?;
        writeln!(f, "  sequence: {sequence}")?;
        writeln!(f, "  default title: {}", self.config.default_title)?;
        writeln!(f, "  indexing: {}", self.config.indexing)?;
        write!(f, "  sanitize on walk: {}", self.config.sanitize_on_walk)?;
        for node in self.iter_preorder() {
            write!(
                f,
                "\n{} [id: {}, parent: {}]",
                node.title, node.id, node.parent
            )?;
        }
        Ok(())
    }
}
