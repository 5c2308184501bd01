//! Nodes of the GeneWalk network
//!
//! The network contains two kinds of nodes, genes and GO terms. Both are
//! identified by a [`NodeId`], the same identifier that is used as key in
//! the node embeddings.
use core::fmt::Debug;
use std::borrow::Borrow;
use std::fmt::Display;

/// A unique identifier of a node in the network
///
/// For genes this is the stable gene identifier (e.g. `HGNC:1097`), for
/// GO terms the GO accession (e.g. `GO:0005634`).
///
/// # Examples
///
/// ```
/// use genewalk::NodeId;
///
/// let id = NodeId::from("GO:0005634");
/// assert_eq!(id.as_str(), "GO:0005634");
/// assert_eq!(id.to_string(), "GO:0005634");
/// ```
#[derive(Clone, Default, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct NodeId {
    inner: String,
}

impl NodeId {
    /// Returns the identifier as `&str`
    pub fn as_str(&self) -> &str {
        &self.inner
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self {
            inner: s.to_string(),
        }
    }
}

impl From<String> for NodeId {
    fn from(inner: String) -> Self {
        Self { inner }
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.inner
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.inner
    }
}

impl PartialEq<str> for NodeId {
    fn eq(&self, other: &str) -> bool {
        self.inner == other
    }
}

impl PartialEq<&str> for NodeId {
    fn eq(&self, other: &&str) -> bool {
        self.inner == *other
    }
}

impl Debug for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NodeId({})", self.inner)
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

/// Distinguishes gene nodes from GO term nodes
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum NodeKind {
    /// A gene, labelled with its symbol
    Gene,
    /// A GO term, labelled with its description
    GoTerm,
}

/// A single node of the network with its label
///
/// The label is the gene symbol for genes and the GO description
/// for GO terms.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    id: NodeId,
    kind: NodeKind,
    label: String,
}

impl Node {
    /// Constructs a new gene node
    pub fn gene<I: Into<NodeId>>(id: I, symbol: &str) -> Self {
        Self {
            id: id.into(),
            kind: NodeKind::Gene,
            label: symbol.to_string(),
        }
    }

    /// Constructs a new GO term node
    pub fn go_term<I: Into<NodeId>>(id: I, description: &str) -> Self {
        Self {
            id: id.into(),
            kind: NodeKind::GoTerm,
            label: description.to_string(),
        }
    }

    /// The unique [`NodeId`] of the node
    pub fn id(&self) -> &NodeId {
        &self.id
    }

    /// Whether the node is a gene or a GO term
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Returns `true` if the node is a GO term
    pub fn is_go_term(&self) -> bool {
        self.kind == NodeKind::GoTerm
    }

    /// The gene symbol or GO description
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The gene symbol, `None` for GO terms
    pub fn symbol(&self) -> Option<&str> {
        match self.kind {
            NodeKind::Gene => Some(&self.label),
            NodeKind::GoTerm => None,
        }
    }

    /// The GO description, `None` for genes
    pub fn description(&self) -> Option<&str> {
        match self.kind {
            NodeKind::GoTerm => Some(&self.label),
            NodeKind::Gene => None,
        }
    }
}

/// A set of [`NodeId`]s
///
/// Each id occurs only once and the ids are kept sorted, so iteration
/// order is deterministic.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NodeGroup {
    ids: Vec<NodeId>,
}

impl NodeGroup {
    /// Constructs a new, empty [`NodeGroup`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the group contains no [`NodeId`]s
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Returns the number of [`NodeId`]s in the group
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Adds a new [`NodeId`] to the group
    ///
    /// Returns whether the `NodeId` was newly inserted.
    pub fn insert(&mut self, id: NodeId) -> bool {
        match self.ids.binary_search(&id) {
            Ok(_) => false,
            Err(idx) => {
                self.ids.insert(idx, id);
                true
            }
        }
    }

    /// Returns `true` if the group contains the id
    pub fn contains(&self, id: &str) -> bool {
        self.ids
            .binary_search_by(|node| node.as_str().cmp(id))
            .is_ok()
    }

    /// Returns an iterator of the [`NodeId`]s in ascending order
    pub fn iter(&self) -> std::slice::Iter<'_, NodeId> {
        self.ids.iter()
    }
}

impl FromIterator<NodeId> for NodeGroup {
    fn from_iter<T: IntoIterator<Item = NodeId>>(iter: T) -> Self {
        let mut ids: Vec<NodeId> = iter.into_iter().collect();
        ids.sort_unstable();
        ids.dedup();
        Self { ids }
    }
}

impl<'a> IntoIterator for &'a NodeGroup {
    type Item = &'a NodeId;
    type IntoIter = std::slice::Iter<'a, NodeId>;
    fn into_iter(self) -> Self::IntoIter {
        self.ids.iter()
    }
}
