//! The gene - GO term network
//!
//! The network is built once with a [`NetworkBuilder`] and then frozen
//! into a [`NetworkIndex`], which answers neighbour and degree queries for
//! the rest of the run.
//!
//! # Examples
//!
//! ```
//! use genewalk::NetworkBuilder;
//!
//! let mut builder = NetworkBuilder::default();
//! builder.add_gene("HGNC:1097", "BRAF");
//! builder.add_gene("HGNC:6840", "MAP2K1");
//! builder.add_go_term("GO:0000165", "MAPK cascade");
//!
//! builder.link("HGNC:1097", "HGNC:6840").unwrap();
//! builder.link("HGNC:1097", "GO:0000165").unwrap();
//! // multi-edges are allowed, but do not change the degree
//! builder.link("HGNC:1097", "GO:0000165").unwrap();
//!
//! let network = builder.build();
//!
//! assert_eq!(network.degree("HGNC:1097").unwrap(), 2);
//! assert_eq!(network.go_terms_of("HGNC:1097").unwrap().len(), 1);
//! assert!(network.is_go_node("GO:0000165"));
//! ```
use core::fmt::Debug;
use std::collections::HashMap;

use tracing::debug;

use crate::node::{Node, NodeGroup, NodeId};
use crate::{GeneWalkError, GeneWalkResult};

/// Collects nodes and edges before they are frozen into a [`NetworkIndex`]
#[derive(Default)]
pub struct NetworkBuilder {
    nodes: HashMap<NodeId, Node>,
    neighbors: HashMap<NodeId, NodeGroup>,
    edges: usize,
}

impl NetworkBuilder {
    /// Adds a new node to the network
    ///
    /// Returns `false` if a node with the same id already exists. The
    /// existing node is kept unchanged in that case.
    pub fn add_node(&mut self, node: Node) -> bool {
        if self.nodes.contains_key(node.id()) {
            debug!("Skipping duplicate node {}", node.id());
            return false;
        }
        self.neighbors.insert(node.id().clone(), NodeGroup::new());
        self.nodes.insert(node.id().clone(), node);
        true
    }

    /// Adds a gene node with its symbol
    pub fn add_gene(&mut self, id: &str, symbol: &str) -> bool {
        self.add_node(Node::gene(id, symbol))
    }

    /// Adds a GO term node with its description
    pub fn add_go_term(&mut self, id: &str, description: &str) -> bool {
        self.add_node(Node::go_term(id, description))
    }

    /// Connects two nodes with an undirected edge
    ///
    /// Repeated edges between the same nodes are accepted but only
    /// counted once for the neighbour set.
    ///
    /// # Errors
    ///
    /// Returns [`GeneWalkError::UnknownNode`] if either node was not added before
    pub fn link(&mut self, a: &str, b: &str) -> GeneWalkResult<()> {
        let a_id = self.node_id(a)?;
        let b_id = self.node_id(b)?;

        self.neighbors
            .get_mut(a)
            .expect("neighbour group is created together with the node")
            .insert(b_id);
        self.neighbors
            .get_mut(b)
            .expect("neighbour group is created together with the node")
            .insert(a_id);
        self.edges += 1;
        Ok(())
    }

    fn node_id(&self, id: &str) -> GeneWalkResult<NodeId> {
        self.nodes
            .get(id)
            .map(|node| node.id().clone())
            .ok_or_else(|| GeneWalkError::UnknownNode(id.to_string()))
    }

    /// Freezes the network into an immutable [`NetworkIndex`]
    pub fn build(self) -> NetworkIndex {
        let go_nodes: NodeGroup = self
            .nodes
            .values()
            .filter(|node| node.is_go_term())
            .map(|node| node.id().clone())
            .collect();
        debug!(
            "Built network with {} nodes ({} GO terms) and {} edges",
            self.nodes.len(),
            go_nodes.len(),
            self.edges
        );
        NetworkIndex {
            nodes: self.nodes,
            neighbors: self.neighbors,
            go_nodes,
        }
    }
}

/// Read-only view of the gene - GO term network
///
/// The index owns the network and is never modified after construction.
/// Share it by reference between all replicates of a run.
pub struct NetworkIndex {
    nodes: HashMap<NodeId, Node>,
    neighbors: HashMap<NodeId, NodeGroup>,
    go_nodes: NodeGroup,
}

impl Debug for NetworkIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "NetworkIndex with {} nodes and {} GO terms",
            self.nodes.len(),
            self.go_nodes.len()
        )
    }
}

impl NetworkIndex {
    /// Returns the [`Node`] with the given id
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Returns `true` if the network contains a node with the given id
    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Returns the number of nodes in the network
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the network has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes adjacent to `id`
    ///
    /// # Errors
    ///
    /// Returns [`GeneWalkError::UnknownNode`] if the node is not in the network
    pub fn neighbors(&self, id: &str) -> GeneWalkResult<&NodeGroup> {
        self.neighbors
            .get(id)
            .ok_or_else(|| GeneWalkError::UnknownNode(id.to_string()))
    }

    /// The number of distinct neighbours of `id`
    ///
    /// # Errors
    ///
    /// Returns [`GeneWalkError::UnknownNode`] if the node is not in the network
    pub fn degree(&self, id: &str) -> GeneWalkResult<usize> {
        Ok(self.neighbors(id)?.len())
    }

    /// The GO terms that are direct neighbours of `id`
    ///
    /// # Errors
    ///
    /// Returns [`GeneWalkError::UnknownNode`] if the node is not in the network
    pub fn go_terms_of(&self, id: &str) -> GeneWalkResult<Vec<&NodeId>> {
        Ok(self
            .neighbors(id)?
            .iter()
            .filter(|neighbor| self.go_nodes.contains(neighbor.as_str()))
            .collect())
    }

    /// Returns `true` if `id` is a GO term of the network
    pub fn is_go_node(&self, id: &str) -> bool {
        self.go_nodes.contains(id)
    }

    /// All GO term ids of the network
    pub fn go_nodes(&self) -> &NodeGroup {
        &self.go_nodes
    }

    /// Iterates all gene nodes of the network, in arbitrary order
    pub fn genes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values().filter(|node| !node.is_go_term())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn network() -> NetworkIndex {
        let mut builder = NetworkBuilder::default();
        builder.add_gene("G1", "GENE1");
        builder.add_gene("G2", "GENE2");
        builder.add_gene("G3", "GENE3");
        builder.add_go_term("GO:1", "first term");
        builder.add_go_term("GO:2", "second term");

        builder.link("G1", "G2").unwrap();
        builder.link("G1", "GO:1").unwrap();
        builder.link("G1", "GO:1").unwrap();
        builder.link("G1", "GO:2").unwrap();
        builder.link("G2", "GO:2").unwrap();
        builder.build()
    }

    #[test]
    fn degrees_count_distinct_neighbors() {
        let network = network();
        assert_eq!(network.degree("G1").unwrap(), 3);
        assert_eq!(network.degree("G2").unwrap(), 2);
        assert_eq!(network.degree("GO:1").unwrap(), 1);
        assert_eq!(network.degree("G3").unwrap(), 0);
    }

    #[test]
    fn go_terms_of_gene() {
        let network = network();
        let terms: Vec<&str> = network
            .go_terms_of("G1")
            .unwrap()
            .into_iter()
            .map(NodeId::as_str)
            .collect();
        assert_eq!(terms, ["GO:1", "GO:2"]);
        assert!(network.go_terms_of("G3").unwrap().is_empty());
    }

    #[test]
    fn unknown_nodes() {
        let network = network();
        assert_eq!(
            network.neighbors("G9"),
            Err(GeneWalkError::UnknownNode("G9".to_string()))
        );
        assert!(network.degree("G9").is_err());
        assert!(network.go_terms_of("G9").is_err());
        assert!(!network.is_go_node("G9"));
    }

    #[test]
    fn link_requires_existing_nodes() {
        let mut builder = NetworkBuilder::default();
        builder.add_gene("G1", "GENE1");
        assert!(builder.link("G1", "GO:1").is_err());
        assert!(builder.link("GO:1", "G1").is_err());
    }

    #[test]
    fn duplicate_nodes_keep_first() {
        let mut builder = NetworkBuilder::default();
        assert!(builder.add_gene("G1", "GENE1"));
        assert!(!builder.add_gene("G1", "OTHER"));
        let network = builder.build();
        assert_eq!(network.node("G1").unwrap().label(), "GENE1");
        assert_eq!(network.len(), 1);
    }

    #[test]
    fn go_node_set() {
        let network = network();
        assert!(network.is_go_node("GO:1"));
        assert!(!network.is_go_node("G1"));
        assert_eq!(network.go_nodes().len(), 2);
        assert_eq!(network.genes().count(), 3);
    }
}
