//! Scoring of the GO annotations of genes within one replicate
//!
//! For every gene of interest, the [`ReplicateScorer`] looks up the GO
//! terms the gene is connected to in the network and compares the
//! similarity of gene and GO term in one replicate embedding against the
//! null distribution of the matching connectivity bucket. The p-values of
//! each gene are then corrected for multiple testing, independently of all
//! other genes.
use tracing::debug;

use crate::network::NetworkIndex;
use crate::node::NodeId;
use crate::null_distribution::NullDistribution;
use crate::orthologs::MouseGene;
use crate::similarity::SimilarityProvider;
use crate::stats::benjamini_hochberg;
use crate::{GeneWalkError, GeneWalkResult};

/// The validated connection of a gene to one GO term in one replicate
#[derive(Debug, Clone, PartialEq)]
pub struct ReplicateRecord {
    mouse_gene: Option<MouseGene>,
    gene: NodeId,
    symbol: String,
    go_id: NodeId,
    description: String,
    gene_degree: usize,
    go_degree: usize,
    similarity: f64,
    pvalue: f64,
    qvalue: f64,
}

impl ReplicateRecord {
    /// The mouse gene the record was mapped to, only set for mouse genes
    pub fn mouse_gene(&self) -> Option<&MouseGene> {
        self.mouse_gene.as_ref()
    }

    /// The id of the (human) gene
    pub fn gene(&self) -> &NodeId {
        &self.gene
    }

    /// The symbol of the (human) gene
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// The id of the GO term
    pub fn go_id(&self) -> &NodeId {
        &self.go_id
    }

    /// The description of the GO term
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The number of connections of the gene in the network
    pub fn gene_degree(&self) -> usize {
        self.gene_degree
    }

    /// The number of connections of the GO term in the network
    pub fn go_degree(&self) -> usize {
        self.go_degree
    }

    /// The similarity of gene and GO term in the replicate embedding
    pub fn similarity(&self) -> f64 {
        self.similarity
    }

    /// The empirical p-value of the similarity
    pub fn pvalue(&self) -> f64 {
        self.pvalue
    }

    /// The FDR adjusted p-value (q-value)
    pub fn qvalue(&self) -> f64 {
        self.qvalue
    }

    /// Returns a copy of the record, assigned to a mouse gene
    #[must_use]
    pub fn with_mouse_gene(&self, mouse_gene: MouseGene) -> Self {
        Self {
            mouse_gene: Some(mouse_gene),
            ..self.clone()
        }
    }
}

/// All records of one replicate
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ReplicateTable {
    records: Vec<ReplicateRecord>,
}

impl ReplicateTable {
    /// Returns the number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the table has no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterates the records in the order they were scored
    pub fn iter(&self) -> std::slice::Iter<'_, ReplicateRecord> {
        self.records.iter()
    }
}

impl From<Vec<ReplicateRecord>> for ReplicateTable {
    fn from(records: Vec<ReplicateRecord>) -> Self {
        Self { records }
    }
}

impl FromIterator<ReplicateRecord> for ReplicateTable {
    fn from_iter<T: IntoIterator<Item = ReplicateRecord>>(iter: T) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for ReplicateTable {
    type Item = ReplicateRecord;
    type IntoIter = std::vec::IntoIter<ReplicateRecord>;
    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a ReplicateTable {
    type Item = &'a ReplicateRecord;
    type IntoIter = std::slice::Iter<'a, ReplicateRecord>;
    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Scores genes against their connected GO terms in one replicate
///
/// The scorer only borrows the network and null distribution, so any
/// number of scorers (e.g. one per worker thread) can share them.
///
/// # Examples
///
/// ```
/// use genewalk::{Embedding, NetworkBuilder, NullDistribution, ReplicateScorer};
///
/// let mut builder = NetworkBuilder::default();
/// builder.add_gene("HGNC:1097", "BRAF");
/// builder.add_go_term("GO:0000165", "MAPK cascade");
/// builder.link("HGNC:1097", "GO:0000165").unwrap();
/// let network = builder.build();
///
/// let mut null = NullDistribution::default();
/// null.insert(0, vec![-0.5, 0.0, 0.25, 0.5]).unwrap();
///
/// let mut embedding = Embedding::new(2);
/// embedding.insert("HGNC:1097", vec![1.0, 0.0]).unwrap();
/// embedding.insert("GO:0000165", vec![1.0, 1.0]).unwrap();
///
/// let scorer = ReplicateScorer::new(&network, &null, 1.0).unwrap();
/// let records = scorer.score_gene("HGNC:1097", &embedding).unwrap();
///
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0].symbol(), "BRAF");
/// assert_eq!(records[0].description(), "MAPK cascade");
/// // cos = 0.707 is larger than all 4 null values
/// assert_eq!(records[0].pvalue(), 0.0);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ReplicateScorer<'a> {
    network: &'a NetworkIndex,
    null: &'a NullDistribution,
    alpha_fdr: f64,
}

impl<'a> ReplicateScorer<'a> {
    /// Constructs a new scorer
    ///
    /// Records with a q-value above `alpha_fdr` are dropped. An `alpha_fdr`
    /// of `1.0` keeps all records.
    ///
    /// # Errors
    ///
    /// Returns [`GeneWalkError::InvalidInput`] if `alpha_fdr` is not within `[0, 1]`
    pub fn new(
        network: &'a NetworkIndex,
        null: &'a NullDistribution,
        alpha_fdr: f64,
    ) -> GeneWalkResult<Self> {
        if !(0.0..=1.0).contains(&alpha_fdr) {
            return Err(GeneWalkError::InvalidInput(format!(
                "alpha_fdr must be within [0, 1], got {alpha_fdr}"
            )));
        }
        Ok(Self {
            network,
            null,
            alpha_fdr,
        })
    }

    /// Scores all GO terms that are connected to `gene`
    ///
    /// The records are ordered by descending similarity. A gene without
    /// connected GO terms has no records.
    ///
    /// # Errors
    ///
    /// - [`GeneWalkError::UnknownNode`] if the gene is not in the network
    /// - [`GeneWalkError::UnknownGene`] if the gene is not in the embedding
    /// - [`GeneWalkError::ZeroDegree`] or [`GeneWalkError::MissingBucket`]
    ///   if the null distribution cannot provide a p-value
    pub fn score_gene<P: SimilarityProvider + ?Sized>(
        &self,
        gene: &str,
        provider: &P,
    ) -> GeneWalkResult<Vec<ReplicateRecord>> {
        let node = self
            .network
            .node(gene)
            .ok_or_else(|| GeneWalkError::UnknownNode(gene.to_string()))?;
        let gene_degree = self.network.degree(gene)?;
        let candidates = self.network.go_terms_of(gene)?;

        let ranking = provider.rank_among(gene, &candidates)?;
        if ranking.is_empty() {
            debug!("{} has no connected GO terms", gene);
            return Ok(Vec::new());
        }

        let mut records = Vec::with_capacity(ranking.len());
        let mut pvalues = Vec::with_capacity(ranking.len());
        for (go_id, similarity) in ranking.iter() {
            let go_degree = self.network.degree(go_id.as_str())?;
            let bucket = NullDistribution::bucket_key(gene_degree, go_degree)?;
            let pvalue = self.null.p_value(bucket, similarity)?;
            let description = self
                .network
                .node(go_id.as_str())
                .map(|term| term.label().to_string())
                .unwrap_or_default();

            pvalues.push(pvalue);
            records.push(ReplicateRecord {
                mouse_gene: None,
                gene: node.id().clone(),
                symbol: node.label().to_string(),
                go_id: go_id.clone(),
                description,
                gene_degree,
                go_degree,
                similarity,
                pvalue,
                qvalue: 1.0,
            });
        }

        for (record, qvalue) in records.iter_mut().zip(benjamini_hochberg(&pvalues)) {
            record.qvalue = qvalue;
        }

        if self.alpha_fdr < 1.0 {
            records.retain(|record| record.qvalue <= self.alpha_fdr);
        }
        debug!("{}: {} of {} GO terms", gene, records.len(), pvalues.len());
        Ok(records)
    }

    /// Scores all `genes` and collects the records into one table
    ///
    /// # Errors
    ///
    /// Fails on the first gene that cannot be scored, see [`ReplicateScorer::score_gene`]
    pub fn score_genes<P: SimilarityProvider + ?Sized>(
        &self,
        genes: &[NodeId],
        provider: &P,
    ) -> GeneWalkResult<ReplicateTable> {
        let mut records = Vec::new();
        for gene in genes {
            records.append(&mut self.score_gene(gene.as_str(), provider)?);
        }
        Ok(ReplicateTable::from(records))
    }
}
