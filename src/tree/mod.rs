//! Defines the node model and the indexed store for forests (ordered collections of trees)
//! backing a tree view.
//!
//! Ownership of nodes flows strictly downward: every [`Node`] owns its `children` vector and
//! the [`TreeStore`] owns the root vector. Upward navigation goes through [`ParentId`], which
//! names the parent by id and is re-derived on every [`TreeStore::walk`].
//!
//! The core components are:
//! *   [`Node<V>`]: a fully populated node carrying an opaque payload `V`.
//! *   [`PartialNode<V>`]: the same record with every field optional, as it arrives from an
//!     external source. [`TreeStore::sanitize`] turns it into a [`Node`].
//! *   [`TreeStore<V>`]: owns the forest and a lazily built id index ([`NodeIndex`]), and
//!     provides creation, lookup and traversal.
//! *   [`NodeId`], [`ParentId`], [`NodePath`]: identifiers for nodes, parent links and
//!     positions within the forest.
//! *   [`IdGenerator`]: the strategy producing fresh ids ([`SequentialIds`] or [`UuidIds`]).

use std::fmt::{self, Display};

use derive_more::From;
use thiserror::Error;
use uuid::Uuid;

pub mod config;
pub mod id;
pub mod iterato;
pub mod store;

pub use config::TreeConfig;
pub use id::{IdGenerator, SequentialIds, UuidIds};
pub use iterato::{BfsIter, PreorderIter};
pub use store::{NodeIndex, TreeStore};

/// Identifier of a node. Ids coming from external records may be numbers or strings,
/// so both are kept.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, From)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum NodeId {
    Int(u64),
    Str(String),
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        NodeId::Str(s.to_owned())
    }
}

impl From<Uuid> for NodeId {
    fn from(u: Uuid) -> Self {
        NodeId::Str(u.to_string())
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeId::Int(i) => write!(f, "{i}"),
            NodeId::Str(s) => f.write_str(s),
        }
    }
}

/// The parent link of a node.
///
/// Top level nodes point to the sentinel [`ParentId::Root`], which has no id, is never part
/// of the forest and is never indexed.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum ParentId {
    #[default]
    Root,
    Node(NodeId),
}

impl ParentId {
    pub fn is_root(&self) -> bool {
        matches!(self, ParentId::Root)
    }

    pub fn is_node(&self) -> bool {
        !self.is_root()
    }

    /// The parent's id, `None` for the sentinel root parent.
    pub fn id(&self) -> Option<&NodeId> {
        match self {
            ParentId::Root => None,
            ParentId::Node(id) => Some(id),
        }
    }
}

impl Display for ParentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParentId::Root => Ok(()),
            ParentId::Node(id) => id.fmt(f),
        }
    }
}

/// Position of a node in a forest: the index of its root followed by the child index at
/// every level below it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default, From)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    pub fn root(index: usize) -> Self {
        NodePath(vec![index])
    }

    pub fn child(&self, index: usize) -> Self {
        let mut path = self.0.clone();
        path.push(index);
        NodePath(path)
    }

    /// Path of the parent node, `None` for roots.
    pub fn parent(&self) -> Option<Self> {
        match self.0.len() {
            0 | 1 => None,
            n => Some(NodePath(self.0[..n - 1].to_vec())),
        }
    }

    /// Number of edges between the node and its root.
    pub fn depth(&self) -> usize {
        self.0.len().saturating_sub(1)
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    pub(crate) fn push(&mut self, index: usize) {
        self.0.push(index);
    }

    pub(crate) fn pop(&mut self) {
        self.0.pop();
    }
}

impl Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{step}")?;
        }
        Ok(())
    }
}

/// A node of the forest. After construction or sanitization every field is populated.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Node<V> {
    pub id: NodeId,
    pub data: V,
    /// Derived upward link. Never serialized; [`TreeStore::walk`] recomputes it.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub parent: ParentId,
    pub title: String,
    pub subtitle: String,
    pub expanded: bool,
    pub children: Vec<Node<V>>,
}

impl<V> Node<V> {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_root()
    }

    /// Appends `child` as the last child, pointing its parent link here.
    pub fn push_child(&mut self, mut child: Node<V>) {
        child.parent = ParentId::Node(self.id.clone());
        self.children.push(child);
    }

    pub fn map<F, U>(self, transform: &mut F) -> Node<U>
    where
        F: FnMut(V) -> U,
    {
        Node {
            id: self.id,
            data: transform(self.data),
            parent: self.parent,
            title: self.title,
            subtitle: self.subtitle,
            expanded: self.expanded,
            children: self
                .children
                .into_iter()
                .map(|c| c.map(transform))
                .collect(),
        }
    }
}

/// A node record with every field optional, as produced by deserializing external data.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PartialNode<V> {
    pub id: Option<NodeId>,
    pub data: Option<V>,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub parent: Option<ParentId>,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub expanded: Option<bool>,
    pub children: Option<Vec<PartialNode<V>>>,
}

impl<V> Default for PartialNode<V> {
    fn default() -> Self {
        PartialNode {
            id: None,
            data: None,
            parent: None,
            title: None,
            subtitle: None,
            expanded: None,
            children: None,
        }
    }
}

impl<V> PartialNode<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<NodeId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn data(mut self, data: V) -> Self {
        self.data = Some(data);
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn expanded(mut self, expanded: bool) -> Self {
        self.expanded = Some(expanded);
        self
    }

    pub fn child(mut self, child: PartialNode<V>) -> Self {
        self.children.get_or_insert_with(Vec::new).push(child);
        self
    }
}

impl<V> From<Node<V>> for PartialNode<V> {
    fn from(node: Node<V>) -> Self {
        PartialNode {
            id: Some(node.id),
            data: Some(node.data),
            parent: Some(node.parent),
            title: Some(node.title),
            subtitle: Some(node.subtitle),
            expanded: Some(node.expanded),
            children: Some(node.children.into_iter().map(PartialNode::from).collect()),
        }
    }
}

/// Strict conversion used when sanitization is turned off: the record must already carry
/// every field that cannot be derived from the forest shape.
impl<V> TryFrom<PartialNode<V>> for Node<V> {
    type Error = TreeError;

    fn try_from(partial: PartialNode<V>) -> Result<Self, Self::Error> {
        let missing = |field| TreeError::MissingField { field };
        Ok(Node {
            id: partial.id.ok_or_else(|| missing("id"))?,
            data: partial.data.ok_or_else(|| missing("data"))?,
            parent: partial.parent.unwrap_or_default(),
            title: partial.title.ok_or_else(|| missing("title"))?,
            subtitle: partial.subtitle.ok_or_else(|| missing("subtitle"))?,
            expanded: partial.expanded.ok_or_else(|| missing("expanded"))?,
            children: partial
                .children
                .unwrap_or_default()
                .into_iter()
                .map(Node::try_from)
                .collect::<Result<_, _>>()?,
        })
    }
}

/// Errors reported by strict ingestion and [`TreeStore::validate`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TreeError {
    #[error("Record is missing required field `{field}`")]
    MissingField { field: &'static str },
    #[error("Duplicate node id: {0}")]
    DuplicateId(NodeId),
    #[error("Node {node} has parent link {found:?} but lives under {expected:?}")]
    WrongParent {
        node: NodeId,
        expected: ParentId,
        found: ParentId,
    },
}

pub(crate) fn node_at<'a, V>(forest: &'a [Node<V>], path: &NodePath) -> Option<&'a Node<V>> {
    let (first, rest) = path.as_slice().split_first()?;
    rest.iter()
        .try_fold(forest.get(*first)?, |node, &i| node.children.get(i))
}

pub(crate) fn node_at_mut<'a, V>(
    forest: &'a mut [Node<V>],
    path: &NodePath,
) -> Option<&'a mut Node<V>> {
    let (first, rest) = path.as_slice().split_first()?;
    rest.iter()
        .try_fold(forest.get_mut(*first)?, |node, &i| node.children.get_mut(i))
}


#[cfg(test)]
mod test {
    use super::*;

    fn leaf(id: u64, title: &str) -> Node<()> {
        Node {
            id: id.into(),
            data: (),
            parent: ParentId::Root,
            title: title.into(),
            subtitle: String::new(),
            expanded: true,
            children: vec![],
        }
    }

    #[test]
    fn node_id_display() {
        assert_eq!(NodeId::from(42u64).to_string(), "42");
        assert_eq!(NodeId::from("abc").to_string(), "abc");
        assert_eq!(ParentId::Root.to_string(), "");
        assert_eq!(ParentId::Node(7u64.into()).to_string(), "7");
    }

    #[test]
    fn paths() {
        let p = NodePath::root(2).child(0).child(3);
        assert_eq!(p.to_string(), "2/0/3");
        assert_eq!(p.depth(), 2);
        assert_eq!(p.parent(), Some(NodePath::from(vec![2, 0])));
        assert_eq!(NodePath::root(1).parent(), None);
    }

    #[test]
    fn lookup_by_path() {
        let mut a = leaf(0, "a");
        let mut b = leaf(1, "b");
        b.push_child(leaf(2, "c"));
        a.push_child(b);
        let mut forest = vec![a, leaf(3, "d")];

        let c = node_at(&forest, &NodePath::from(vec![0, 0, 0])).map(|n| n.title.as_str());
        assert_eq!(c, Some("c"));
        assert_eq!(forest[0].children[0].children[0].parent, ParentId::Node(1u64.into()));
        assert!(node_at(&forest, &NodePath::from(vec![1, 0])).is_none());
        assert!(node_at(&forest, &NodePath::default()).is_none());

        if let Some(d) = node_at_mut(&mut forest, &NodePath::root(1)) {
            d.expanded = false;
        }
        assert!(!forest[1].expanded);
    }

    #[test]
    fn strict_conversion_requires_fields() {
        let partial: PartialNode<()> = PartialNode::new().id(1u64).data(()).title("x");
        assert_eq!(
            Node::try_from(partial.clone()),
            Err(TreeError::MissingField { field: "subtitle" })
        );

        let complete = partial
            .subtitle("")
            .expanded(false)
            .child(PartialNode::new().id(2u64).data(()));
        assert_eq!(
            Node::try_from(complete),
            Err(TreeError::MissingField { field: "title" })
        );
    }

    #[test]
    fn strict_conversion_keeps_fields() {
        let partial: PartialNode<u8> = PartialNode::new()
            .id("root")
            .data(9)
            .title("t")
            .subtitle("s")
            .expanded(false);
        let node = Node::try_from(partial).unwrap();
        assert_eq!(node.id, NodeId::from("root"));
        assert_eq!(node.data, 9);
        assert!(!node.expanded);
        assert!(node.is_root());
        assert!(node.is_leaf());
    }

    #[test]
    fn map_payload() {
        let mut a = leaf(0, "a");
        a.push_child(leaf(1, "b"));
        let mut n = 0;
        let mapped = a.map(&mut |()| {
            n += 1;
            n
        });
        assert_eq!(mapped.data, 1);
        assert_eq!(mapped.children[0].data, 2);
    }
}
