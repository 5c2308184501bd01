//! Similarities between nodes of one replicate embedding
//!
//! Every replicate of a GeneWalk run is an independently trained embedding
//! of the same network. The scorer only needs one thing from it: the
//! similarity of a gene to (a subset of) the other nodes. This is expressed
//! by the [`SimilarityProvider`] trait. [`Embedding`] is the default
//! implementation, using cosine similarity of node vectors.
use core::fmt::Debug;
use std::collections::{HashMap, HashSet};

use tracing::warn;

use crate::node::NodeId;
use crate::{GeneWalkError, GeneWalkResult};

/// Answers similarity queries for one replicate
///
/// Implementors must be read-only once constructed; the scorer may query
/// the same provider for many genes.
pub trait SimilarityProvider {
    /// Ranks all other nodes by their similarity to `gene`, most similar first
    ///
    /// # Errors
    ///
    /// Returns [`GeneWalkError::UnknownGene`] if the provider has no data for `gene`
    fn rank(&self, gene: &str) -> GeneWalkResult<SimilarityRanking>;

    /// Ranks only the `candidates` by their similarity to `gene`
    ///
    /// Candidates unknown to the provider are not part of the ranking.
    /// The default implementation filters the full ranking, implementors
    /// should override it when they can compute single similarities
    /// directly.
    ///
    /// # Errors
    ///
    /// Returns [`GeneWalkError::UnknownGene`] if the provider has no data for `gene`
    fn rank_among(&self, gene: &str, candidates: &[&NodeId]) -> GeneWalkResult<SimilarityRanking> {
        Ok(self.rank(gene)?.restrict_to(candidates))
    }
}

/// Nodes and their similarity to one gene, ordered by descending similarity
///
/// Nodes with identical similarity are ordered by their id.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SimilarityRanking {
    entries: Vec<(NodeId, f64)>,
}

impl SimilarityRanking {
    /// Constructs a ranking from unordered `(node, similarity)` pairs
    pub fn from_unsorted(mut entries: Vec<(NodeId, f64)>) -> Self {
        entries.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        Self { entries }
    }

    /// Returns a new ranking containing only the `candidates`
    pub fn restrict_to(&self, candidates: &[&NodeId]) -> Self {
        let candidates: HashSet<&str> = candidates.iter().map(|id| id.as_str()).collect();
        Self {
            entries: self
                .entries
                .iter()
                .filter(|(id, _)| candidates.contains(id.as_str()))
                .cloned()
                .collect(),
        }
    }

    /// Returns the number of ranked nodes
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no node is ranked
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the similarity of the node, if it is part of the ranking
    pub fn get(&self, id: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(node, _)| node == id)
            .map(|(_, similarity)| *similarity)
    }

    /// Iterates `(node, similarity)` pairs, most similar first
    pub fn iter(&self) -> impl Iterator<Item = (&NodeId, f64)> {
        self.entries.iter().map(|(id, similarity)| (id, *similarity))
    }
}

/// Node vectors of one trained replicate
///
/// Similarities are cosine similarities, computed in `f64`. Vectors with
/// a norm of 0 have a similarity of 0 to every other vector.
///
/// # Examples
///
/// ```
/// use genewalk::{Embedding, NodeId, SimilarityProvider};
///
/// let mut embedding = Embedding::new(2);
/// embedding.insert("HGNC:1097", vec![1.0, 0.0]).unwrap();
/// embedding.insert("GO:0000165", vec![1.0, 1.0]).unwrap();
/// embedding.insert("GO:0005634", vec![0.0, 1.0]).unwrap();
/// embedding.insert("GO:0005737", vec![-1.0, 0.0]).unwrap();
///
/// let ranking = embedding.rank("HGNC:1097").unwrap();
/// let order: Vec<&str> = ranking.iter().map(|(id, _)| id.as_str()).collect();
/// assert_eq!(order, ["GO:0000165", "GO:0005634", "GO:0005737"]);
///
/// let nucleus = NodeId::from("GO:0005634");
/// let ranking = embedding.rank_among("HGNC:1097", &[&nucleus]).unwrap();
/// assert_eq!(ranking.len(), 1);
/// assert_eq!(ranking.get("GO:0005634"), Some(0.0));
/// ```
#[derive(Clone, Default)]
pub struct Embedding {
    dimension: usize,
    index: HashMap<NodeId, usize>,
    ids: Vec<NodeId>,
    vectors: Vec<f32>,
    norms: Vec<f64>,
}

impl Debug for Embedding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Embedding with {} vectors of dimension {}",
            self.ids.len(),
            self.dimension
        )
    }
}

impl Embedding {
    /// Constructs a new, empty embedding for vectors of length `dimension`
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            ..Default::default()
        }
    }

    /// Returns the length of the node vectors
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Returns the number of node vectors
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns `true` if the embedding has no vectors
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Returns `true` if the embedding has a vector for the node
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Adds the vector of a node
    ///
    /// # Errors
    ///
    /// Returns [`GeneWalkError::InvalidInput`] if the vector has the wrong
    /// length, contains non-finite values or the node already has a vector
    pub fn insert<I: Into<NodeId>>(&mut self, id: I, vector: Vec<f32>) -> GeneWalkResult<()> {
        let id = id.into();
        if vector.len() != self.dimension {
            return Err(GeneWalkError::InvalidInput(format!(
                "vector of {} has {} values, expected {}",
                id,
                vector.len(),
                self.dimension
            )));
        }
        if vector.iter().any(|v| !v.is_finite()) {
            return Err(GeneWalkError::InvalidInput(format!(
                "vector of {id} contains non-finite values"
            )));
        }
        if self.index.contains_key(&id) {
            return Err(GeneWalkError::InvalidInput(format!(
                "duplicate vector for {id}"
            )));
        }
        let norm = vector
            .iter()
            .map(|v| f64::from(*v) * f64::from(*v))
            .sum::<f64>()
            .sqrt();
        self.index.insert(id.clone(), self.ids.len());
        self.ids.push(id);
        self.vectors.extend(vector);
        self.norms.push(norm);
        Ok(())
    }

    /// The vector of a node
    pub fn vector(&self, id: &str) -> Option<&[f32]> {
        self.index.get(id).map(|idx| self.row(*idx))
    }

    /// The cosine similarity of two nodes
    ///
    /// # Errors
    ///
    /// Returns [`GeneWalkError::UnknownGene`] if either node has no vector
    pub fn similarity(&self, a: &str, b: &str) -> GeneWalkResult<f64> {
        let a = self.position(a)?;
        let b = self.position(b)?;
        Ok(self.cosine(a, b))
    }

    fn position(&self, id: &str) -> GeneWalkResult<usize> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| GeneWalkError::UnknownGene(id.to_string()))
    }

    fn row(&self, idx: usize) -> &[f32] {
        &self.vectors[idx * self.dimension..(idx + 1) * self.dimension]
    }

    fn cosine(&self, a: usize, b: usize) -> f64 {
        let norm = self.norms[a] * self.norms[b];
        if norm == 0.0 {
            return 0.0;
        }
        let dot: f64 = self
            .row(a)
            .iter()
            .zip(self.row(b))
            .map(|(x, y)| f64::from(*x) * f64::from(*y))
            .sum();
        dot / norm
    }
}

impl SimilarityProvider for Embedding {
    fn rank(&self, gene: &str) -> GeneWalkResult<SimilarityRanking> {
        let gene = self.position(gene)?;
        let entries = self
            .ids
            .iter()
            .enumerate()
            .filter(|(idx, _)| *idx != gene)
            .map(|(idx, id)| (id.clone(), self.cosine(gene, idx)))
            .collect();
        Ok(SimilarityRanking::from_unsorted(entries))
    }

    fn rank_among(&self, gene: &str, candidates: &[&NodeId]) -> GeneWalkResult<SimilarityRanking> {
        let gene_idx = self.position(gene)?;
        let mut entries = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            match self.index.get(candidate.as_str()) {
                Some(idx) if *idx == gene_idx => {}
                Some(idx) => entries.push(((*candidate).clone(), self.cosine(gene_idx, *idx))),
                None => warn!("{} has no vector in the embedding, ranked without it", candidate),
            }
        }
        Ok(SimilarityRanking::from_unsorted(entries))
    }
}
