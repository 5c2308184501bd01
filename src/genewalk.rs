use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::aggregate::{merge_replicates, GeneOrder, GeneWalkTable};
use crate::network::NetworkIndex;
use crate::node::NodeId;
use crate::null_distribution::NullDistribution;
use crate::orthologs::{MouseGene, OrthologMap};
use crate::scorer::{ReplicateScorer, ReplicateTable};
use crate::similarity::SimilarityProvider;
use crate::{GeneWalkError, GeneWalkResult};

/// Settings of a GeneWalk run
///
/// # Examples
///
/// ```
/// use genewalk::GeneWalkConfig;
///
/// let config = GeneWalkConfig::default()
///     .with_replicates(3)
///     .with_alpha_fdr(0.1);
/// assert_eq!(config.replicates(), 3);
/// assert!(config.validate().is_ok());
///
/// assert!(GeneWalkConfig::default().with_replicates(0).validate().is_err());
/// assert!(GeneWalkConfig::default().with_alpha_fdr(1.5).validate().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneWalkConfig {
    replicates: usize,
    alpha_fdr: f64,
}

impl Default for GeneWalkConfig {
    fn default() -> Self {
        Self {
            replicates: crate::DEFAULT_NUM_REPLICATES,
            alpha_fdr: 1.0,
        }
    }
}

impl GeneWalkConfig {
    /// Sets the number of replicate embeddings
    #[must_use]
    pub fn with_replicates(mut self, replicates: usize) -> Self {
        self.replicates = replicates;
        self
    }

    /// Sets the FDR significance level, `1.0` disables filtering
    #[must_use]
    pub fn with_alpha_fdr(mut self, alpha_fdr: f64) -> Self {
        self.alpha_fdr = alpha_fdr;
        self
    }

    /// The number of replicate embeddings
    pub fn replicates(&self) -> usize {
        self.replicates
    }

    /// The FDR significance level
    pub fn alpha_fdr(&self) -> f64 {
        self.alpha_fdr
    }

    /// Checks that the settings are usable
    ///
    /// # Errors
    ///
    /// Returns [`GeneWalkError::InvalidInput`] if there are no replicates
    /// or `alpha_fdr` is not within `[0, 1]`
    pub fn validate(&self) -> GeneWalkResult<()> {
        if self.replicates == 0 {
            return Err(GeneWalkError::InvalidInput(
                "at least one replicate is required".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.alpha_fdr) {
            return Err(GeneWalkError::InvalidInput(format!(
                "alpha_fdr must be within [0, 1], got {}",
                self.alpha_fdr
            )));
        }
        Ok(())
    }
}

/// The genes of interest
#[derive(Debug, Clone)]
pub enum GeneSelection {
    /// Human gene ids, as used in the network
    Human(Vec<NodeId>),
    /// Mouse genes, scored through their mapped human genes
    Mouse(OrthologMap),
}

impl GeneSelection {
    /// Returns `true` for mouse genes
    pub fn is_mouse(&self) -> bool {
        matches!(self, GeneSelection::Mouse(_))
    }

    /// The human genes to score, without duplicates
    fn human_genes(&self) -> Vec<NodeId> {
        match self {
            GeneSelection::Human(genes) => {
                let mut seen: HashSet<&NodeId> = HashSet::with_capacity(genes.len());
                genes
                    .iter()
                    .filter(|gene| seen.insert(*gene))
                    .cloned()
                    .collect()
            }
            GeneSelection::Mouse(orthologs) => orthologs.human_genes().to_vec(),
        }
    }

    /// The output order of the genes of interest
    fn order(&self) -> GeneOrder {
        match self {
            GeneSelection::Human(genes) => GeneOrder::new(genes),
            GeneSelection::Mouse(orthologs) => {
                GeneOrder::new(orthologs.mouse_genes().iter().map(MouseGene::id))
            }
        }
    }
}

impl From<Vec<NodeId>> for GeneSelection {
    fn from(genes: Vec<NodeId>) -> Self {
        GeneSelection::Human(genes)
    }
}

impl From<OrthologMap> for GeneSelection {
    fn from(orthologs: OrthologMap) -> Self {
        GeneSelection::Mouse(orthologs)
    }
}

#[cfg_attr(doc, aquamarine::aquamarine)]
/// Generates the GeneWalk output for a list of genes of interest
///
/// `GeneWalk` holds the network and the null distribution that are shared
/// by all replicates. Every replicate embedding is scored independently,
/// the replicate tables are then merged into one [`GeneWalkTable`].
///
/// ```mermaid
/// flowchart LR
///     genes[genes of interest] --> scorer
///     network[NetworkIndex] --> scorer
///     null[NullDistribution] --> scorer
///     subgraph replicate [for every replicate]
///         embedding[SimilarityProvider] --> scorer[ReplicateScorer]
///         scorer --> expand{mouse genes?}
///         expand -- yes --> orthologs[OrthologMap::expand]
///         expand -- no --> table[ReplicateTable]
///         orthologs --> table
///     end
///     table --> merge[merge_replicates]
///     merge --> output[GeneWalkTable]
/// ```
///
/// # Examples
///
/// ```
/// use genewalk::{Embedding, GeneSelection, GeneWalk, GeneWalkConfig, NetworkBuilder, NodeId, NullDistribution};
///
/// let mut builder = NetworkBuilder::default();
/// builder.add_gene("HGNC:1097", "BRAF");
/// builder.add_go_term("GO:0000165", "MAPK cascade");
/// builder.link("HGNC:1097", "GO:0000165").unwrap();
/// let network = builder.build();
///
/// let mut null = NullDistribution::default();
/// null.insert(0, vec![-0.2, 0.0, 0.3, 0.9]).unwrap();
///
/// let mut embedding = Embedding::new(2);
/// embedding.insert("HGNC:1097", vec![1.0, 0.0]).unwrap();
/// embedding.insert("GO:0000165", vec![1.0, 1.0]).unwrap();
///
/// let genewalk = GeneWalk::new(network, null, GeneWalkConfig::default().with_replicates(1)).unwrap();
/// let genes = GeneSelection::Human(vec![NodeId::from("HGNC:1097")]);
/// let table = genewalk.generate_output(&genes, &[embedding]).unwrap();
///
/// assert_eq!(table.len(), 1);
/// let record = table.iter().next().unwrap();
/// assert_eq!(record.symbol(), "BRAF");
/// assert_eq!(record.pvalue().mean(), 0.25);
/// ```
#[derive(Debug)]
pub struct GeneWalk {
    network: NetworkIndex,
    null: NullDistribution,
    config: GeneWalkConfig,
}

impl GeneWalk {
    /// Constructs a new `GeneWalk`
    ///
    /// # Errors
    ///
    /// Returns [`GeneWalkError::InvalidInput`] if the config is invalid
    pub fn new(
        network: NetworkIndex,
        null: NullDistribution,
        config: GeneWalkConfig,
    ) -> GeneWalkResult<Self> {
        config.validate()?;
        Ok(Self {
            network,
            null,
            config,
        })
    }

    /// The GeneWalk network
    pub fn network(&self) -> &NetworkIndex {
        &self.network
    }

    /// The null distribution of similarities
    pub fn null_distribution(&self) -> &NullDistribution {
        &self.null
    }

    /// The settings of the run
    pub fn config(&self) -> &GeneWalkConfig {
        &self.config
    }

    /// The human genes that are scored for `genes`
    ///
    /// Mapped human genes of mouse genes that are not part of the network
    /// are left out.
    ///
    /// # Errors
    ///
    /// Returns [`GeneWalkError::UnknownNode`] if a human gene of interest
    /// is not in the network
    fn genes_to_score(&self, genes: &GeneSelection) -> GeneWalkResult<Vec<NodeId>> {
        let mut human_genes = genes.human_genes();
        match genes {
            GeneSelection::Human(_) => {
                if let Some(gene) = human_genes
                    .iter()
                    .find(|gene| !self.network.contains(gene.as_str()))
                {
                    return Err(GeneWalkError::UnknownNode(gene.to_string()));
                }
            }
            GeneSelection::Mouse(_) => human_genes.retain(|gene| {
                let known = self.network.contains(gene.as_str());
                if !known {
                    warn!("Mapped human gene {} is not part of the network", gene);
                }
                known
            }),
        }
        debug!("Scoring {} genes", human_genes.len());
        Ok(human_genes)
    }

    /// Scores the genes of interest in a single replicate
    ///
    /// For mouse genes the records are expanded to all mapped mouse genes.
    ///
    /// # Errors
    ///
    /// - [`GeneWalkError::UnknownNode`] if a gene of interest is not in the network
    /// - [`GeneWalkError::UnknownGene`] if a gene has no vector in the replicate
    /// - [`GeneWalkError::ZeroDegree`] or [`GeneWalkError::MissingBucket`]
    ///   if the null distribution cannot provide a p-value
    pub fn score_replicate<P: SimilarityProvider + ?Sized>(
        &self,
        genes: &GeneSelection,
        replicate: &P,
    ) -> GeneWalkResult<ReplicateTable> {
        let human_genes = self.genes_to_score(genes)?;
        let scorer = self.scorer()?;
        Self::score_with(&scorer, genes, &human_genes, replicate)
    }

    fn scorer(&self) -> GeneWalkResult<ReplicateScorer<'_>> {
        ReplicateScorer::new(&self.network, &self.null, self.config.alpha_fdr)
    }

    fn score_with<P: SimilarityProvider + ?Sized>(
        scorer: &ReplicateScorer<'_>,
        genes: &GeneSelection,
        human_genes: &[NodeId],
        replicate: &P,
    ) -> GeneWalkResult<ReplicateTable> {
        let table = scorer.score_genes(human_genes, replicate)?;
        match genes {
            GeneSelection::Human(_) => Ok(table),
            GeneSelection::Mouse(orthologs) => Ok(orthologs.expand(&table)),
        }
    }

    /// Merges the tables of all replicates into the final output
    ///
    /// The output is ordered by the genes of interest, see [`crate::aggregate`].
    pub fn merge(&self, genes: &GeneSelection, tables: &[ReplicateTable]) -> GeneWalkTable {
        merge_replicates(tables, &genes.order(), genes.is_mouse())
    }

    /// Scores all replicates and merges them into the final output
    ///
    /// # Errors
    ///
    /// - [`GeneWalkError::InvalidInput`] if the number of replicates does not
    ///   match the config
    /// - every error of [`GeneWalk::score_replicate`]. No output is
    ///   produced if any replicate fails.
    pub fn generate_output<P: SimilarityProvider>(
        &self,
        genes: &GeneSelection,
        replicates: &[P],
    ) -> GeneWalkResult<GeneWalkTable> {
        if replicates.len() != self.config.replicates {
            return Err(GeneWalkError::InvalidInput(format!(
                "expected {} replicates, got {}",
                self.config.replicates,
                replicates.len()
            )));
        }
        let human_genes = self.genes_to_score(genes)?;
        let scorer = self.scorer()?;

        let mut tables = Vec::with_capacity(replicates.len());
        for (idx, replicate) in replicates.iter().enumerate() {
            info!("{}/{}", idx + 1, replicates.len());
            tables.push(Self::score_with(&scorer, genes, &human_genes, replicate)?);
        }
        Ok(self.merge(genes, &tables))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::network::NetworkBuilder;
    use crate::similarity::Embedding;

    fn network() -> NetworkIndex {
        let mut builder = NetworkBuilder::default();
        builder.add_gene("G1", "GENE1");
        builder.add_gene("G2", "GENE2");
        builder.add_go_term("GO:1", "first term");
        builder.add_go_term("GO:2", "second term");
        builder.link("G1", "GO:1").unwrap();
        builder.link("G2", "GO:1").unwrap();
        builder.link("G2", "GO:2").unwrap();
        builder.build()
    }

    fn null() -> NullDistribution {
        let mut null = NullDistribution::default();
        null.insert(0, vec![0.0, 0.2, 0.4, 0.6, 0.8]).unwrap();
        null.insert(1, vec![0.0, 0.2, 0.4, 0.6, 0.8]).unwrap();
        null
    }

    fn embedding(shift: f32) -> Embedding {
        let mut embedding = Embedding::new(2);
        embedding.insert("G1", vec![1.0, 0.0]).unwrap();
        embedding.insert("G2", vec![0.0, 1.0]).unwrap();
        embedding.insert("GO:1", vec![1.0, 0.5 + shift]).unwrap();
        embedding.insert("GO:2", vec![0.1, 1.0]).unwrap();
        embedding
    }

    fn genewalk(replicates: usize) -> GeneWalk {
        GeneWalk::new(
            network(),
            null(),
            GeneWalkConfig::default().with_replicates(replicates),
        )
        .unwrap()
    }

    #[test]
    fn default_config() {
        let config = GeneWalkConfig::default();
        assert_eq!(config.replicates(), 10);
        assert!((config.alpha_fdr() - 1.0).abs() < f64::EPSILON);
        assert!(config.with_alpha_fdr(f64::NAN).validate().is_err());
    }

    #[test]
    fn invalid_config() {
        let config = GeneWalkConfig::default().with_alpha_fdr(-0.1);
        assert!(GeneWalk::new(network(), null(), config).is_err());
    }

    #[test]
    fn output_follows_gene_order() {
        let genewalk = genewalk(2);
        let genes = GeneSelection::Human(vec![NodeId::from("G2"), NodeId::from("G1")]);
        let table = genewalk
            .generate_output(&genes, &[embedding(0.0), embedding(0.1)])
            .unwrap();

        let rows: Vec<(&str, &str)> = table
            .iter()
            .map(|record| (record.gene().as_str(), record.go_id().as_str()))
            .collect();
        assert_eq!(rows[0].0, "G2");
        assert_eq!(rows[1].0, "G2");
        assert_eq!(rows[2], ("G1", "GO:1"));
        assert!(table.iter().all(|record| record.replicates() == 2));
    }

    #[test]
    fn duplicate_genes_are_scored_once() {
        let genewalk = genewalk(1);
        let genes = GeneSelection::Human(vec![NodeId::from("G1"), NodeId::from("G1")]);
        let table = genewalk.generate_output(&genes, &[embedding(0.0)]).unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn replicate_count_mismatch() {
        let genewalk = genewalk(2);
        let genes = GeneSelection::Human(vec![NodeId::from("G1")]);
        assert!(matches!(
            genewalk.generate_output(&genes, &[embedding(0.0)]),
            Err(GeneWalkError::InvalidInput(_))
        ));
    }

    #[test]
    fn unknown_gene_of_interest() {
        let genewalk = genewalk(1);
        let genes = GeneSelection::Human(vec![NodeId::from("G1"), NodeId::from("G9")]);
        assert_eq!(
            genewalk.generate_output(&genes, &[embedding(0.0)]).unwrap_err(),
            GeneWalkError::UnknownNode("G9".to_string())
        );
    }

    #[test]
    fn gene_missing_in_one_replicate() {
        let genewalk = genewalk(2);
        let mut incomplete = Embedding::new(2);
        incomplete.insert("G2", vec![0.0, 1.0]).unwrap();
        incomplete.insert("GO:1", vec![1.0, 0.5]).unwrap();

        let genes = GeneSelection::Human(vec![NodeId::from("G1")]);
        assert_eq!(
            genewalk
                .generate_output(&genes, &[embedding(0.0), incomplete])
                .unwrap_err(),
            GeneWalkError::UnknownGene("G1".to_string())
        );
    }

    #[test]
    fn mouse_genes() {
        let genewalk = genewalk(1);
        let mut orthologs = OrthologMap::default();
        orthologs.add(MouseGene::new("MGI:3", "Gene3"), Some("G9"));
        orthologs.add(MouseGene::new("MGI:2", "Gene2"), Some("G2"));
        orthologs.add(MouseGene::new("MGI:1", "Gene1"), Some("G1"));
        orthologs.add(MouseGene::new("MGI:4", "Gene4"), None);
        let genes = GeneSelection::from(orthologs);

        let table = genewalk.generate_output(&genes, &[embedding(0.0)]).unwrap();
        assert!(table.mouse_genes());
        assert_eq!(table.len(), 3);

        let mouse: Vec<&str> = table
            .iter()
            .map(|record| record.mouse_gene().unwrap().id())
            .collect();
        assert_eq!(mouse, ["MGI:2", "MGI:2", "MGI:1"]);
    }

    #[test]
    fn mouse_gene_with_several_human_orthologs() {
        let genewalk = genewalk(2);
        let mut orthologs = OrthologMap::default();
        orthologs.add(MouseGene::new("MGI:7", "Gene12"), Some("G2"));
        orthologs.add(MouseGene::new("MGI:7", "Gene12"), Some("G1"));
        orthologs.add(MouseGene::new("MGI:1", "Gene1"), Some("G1"));
        let genes = GeneSelection::from(orthologs);

        let table = genewalk
            .generate_output(&genes, &[embedding(0.0), embedding(0.2)])
            .unwrap();

        let rows: Vec<(&str, &str, &str)> = table
            .iter()
            .map(|record| {
                (
                    record.mouse_gene().unwrap().id(),
                    record.symbol(),
                    record.go_id().as_str(),
                )
            })
            .collect();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0], ("MGI:7", "GENE1", "GO:1"));
        assert_eq!((rows[1].0, rows[1].1), ("MGI:7", "GENE2"));
        assert_eq!((rows[2].0, rows[2].1), ("MGI:7", "GENE2"));
        assert_eq!(rows[3], ("MGI:1", "GENE1", "GO:1"));
        assert!(table.iter().all(|record| record.replicates() == 2));
    }

    #[test]
    fn score_single_replicate() {
        let genewalk = genewalk(1);
        let genes = GeneSelection::from(vec![NodeId::from("G2")]);
        let table = genewalk.score_replicate(&genes, &embedding(0.0)).unwrap();
        assert_eq!(table.len(), 2);
        let merged = genewalk.merge(&genes, &[table]);
        assert_eq!(merged.len(), 2);
    }
}
