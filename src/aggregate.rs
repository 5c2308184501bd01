//! Merging of replicate tables into the final GeneWalk output
//!
//! Every replicate produces its own [`ReplicateTable`]. The tables are
//! merged by an outer join on the identity of the records (gene, GO term,
//! degrees and, for mouse genes, the mouse gene). For every merged row the
//! mean and standard error of similarity, p-value and q-value are
//! calculated over the replicates that actually contain the row.
//!
//! The merge does not depend on the order of the replicate tables. The
//! final row order is defined by [`GeneOrder`] and the statistics only:
//!
//! 1. mouse gene, by position in the genes of interest (mouse genes only)
//! 2. mapped human symbol (mouse genes only)
//! 3. gene, by position in the genes of interest (human genes only)
//! 4. mean q-value, ascending
//! 5. GO description
//! 6. GO id
use std::cmp::Ordering;
use std::collections::HashMap;

use smallvec::SmallVec;
use tracing::debug;

use crate::node::NodeId;
use crate::orthologs::MouseGene;
use crate::scorer::{ReplicateRecord, ReplicateTable};
use crate::stats::Summary;

/// Values of one row, one entry per replicate that contains the row
type ReplicateValues = SmallVec<[f64; crate::DEFAULT_NUM_REPLICATES]>;

/// The position of every gene of interest in the input list
///
/// Used as primary sort key of the output, so that genes appear in the
/// order they were provided and not in lexicographic order.
///
/// # Examples
///
/// ```
/// use genewalk::aggregate::GeneOrder;
///
/// let order = GeneOrder::new(["HGNC:2", "HGNC:1", "HGNC:2"]);
/// assert_eq!(order.rank("HGNC:2"), 0);
/// assert_eq!(order.rank("HGNC:1"), 1);
/// assert_eq!(order.rank("HGNC:3"), usize::MAX);
/// ```
#[derive(Debug, Default, Clone)]
pub struct GeneOrder {
    ranks: HashMap<String, usize>,
}

impl GeneOrder {
    /// Constructs the order from gene ids; repeated ids keep their first position
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut ranks = HashMap::new();
        for id in ids {
            let next = ranks.len();
            ranks.entry(id.as_ref().to_string()).or_insert(next);
        }
        Self { ranks }
    }

    /// The position of the gene, genes that are not part of the list sort last
    pub fn rank(&self, id: &str) -> usize {
        self.ranks.get(id).copied().unwrap_or(usize::MAX)
    }
}

/// The combined result of all replicates for one gene - GO term pair
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedRecord {
    mouse_gene: Option<MouseGene>,
    gene: NodeId,
    symbol: String,
    go_id: NodeId,
    description: String,
    gene_degree: usize,
    go_degree: usize,
    similarity: Summary,
    pvalue: Summary,
    qvalue: Summary,
}

impl AggregatedRecord {
    /// The mouse gene, only set for mouse genes of interest
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

    /// The number of replicates that contain this gene - GO term pair
    pub fn replicates(&self) -> usize {
        self.similarity.count()
    }

    /// Mean and SEM of the similarity
    pub fn similarity(&self) -> &Summary {
        &self.similarity
    }

    /// Mean and SEM of the p-value
    pub fn pvalue(&self) -> &Summary {
        &self.pvalue
    }

    /// Mean and SEM of the q-value
    pub fn qvalue(&self) -> &Summary {
        &self.qvalue
    }
}

/// The final, sorted GeneWalk output
#[derive(Debug, Default, Clone, PartialEq)]
pub struct GeneWalkTable {
    records: Vec<AggregatedRecord>,
    mouse_genes: bool,
}

impl GeneWalkTable {
    /// Returns `true` if the rows belong to mouse genes of interest
    pub fn mouse_genes(&self) -> bool {
        self.mouse_genes
    }

    /// Returns the number of rows
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the table has no rows
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterates the rows in output order
    pub fn iter(&self) -> std::slice::Iter<'_, AggregatedRecord> {
        self.records.iter()
    }

    /// Returns a new table with only the rows whose mean q-value is at most `alpha`
    ///
    /// This filters the merged rows. `GeneWalkConfig::with_alpha_fdr` filters
    /// the q-values of every replicate before merging instead, so with more
    /// than one replicate both filters can keep different rows.
    #[must_use]
    pub fn filter_by_qvalue(&self, alpha: f64) -> Self {
        Self {
            records: self
                .records
                .iter()
                .filter(|record| record.qvalue.mean() <= alpha)
                .cloned()
                .collect(),
            mouse_genes: self.mouse_genes,
        }
    }
}

impl<'a> IntoIterator for &'a GeneWalkTable {
    type Item = &'a AggregatedRecord;
    type IntoIter = std::slice::Iter<'a, AggregatedRecord>;
    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// The identity columns that rows are joined on
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RecordKey {
    mouse_gene: Option<MouseGene>,
    gene: NodeId,
    symbol: String,
    go_id: NodeId,
    description: String,
    gene_degree: usize,
    go_degree: usize,
}

impl From<&ReplicateRecord> for RecordKey {
    fn from(record: &ReplicateRecord) -> Self {
        Self {
            mouse_gene: record.mouse_gene().cloned(),
            gene: record.gene().clone(),
            symbol: record.symbol().to_string(),
            go_id: record.go_id().clone(),
            description: record.description().to_string(),
            gene_degree: record.gene_degree(),
            go_degree: record.go_degree(),
        }
    }
}

#[derive(Default)]
struct MergedValues {
    similarity: ReplicateValues,
    pvalue: ReplicateValues,
    qvalue: ReplicateValues,
}

/// Summarizes the values in ascending order, so the result does not
/// depend on the order in which the replicates were merged
fn summarize(mut values: ReplicateValues) -> Option<Summary> {
    values.sort_by(f64::total_cmp);
    Summary::from_values(&values)
}

/// Merges the tables of all replicates and sorts the result
///
/// A gene - GO term pair that is missing in some replicates is still
/// part of the output. Its statistics are based only on the replicates
/// that contain it.
///
/// `mouse_genes` selects the output layout, `order` contains the position
/// of the genes of interest (MGI ids for mouse genes, gene ids otherwise).
pub fn merge_replicates(
    tables: &[ReplicateTable],
    order: &GeneOrder,
    mouse_genes: bool,
) -> GeneWalkTable {
    let mut merged: HashMap<RecordKey, MergedValues> = HashMap::new();
    for table in tables {
        for record in table {
            let values = merged.entry(RecordKey::from(record)).or_default();
            values.similarity.push(record.similarity());
            values.pvalue.push(record.pvalue());
            values.qvalue.push(record.qvalue());
        }
    }
    debug!(
        "Merged {} replicates into {} rows",
        tables.len(),
        merged.len()
    );

    let mut records: Vec<AggregatedRecord> = merged
        .into_iter()
        .filter_map(|(key, values)| {
            Some(AggregatedRecord {
                similarity: summarize(values.similarity)?,
                pvalue: summarize(values.pvalue)?,
                qvalue: summarize(values.qvalue)?,
                mouse_gene: key.mouse_gene,
                gene: key.gene,
                symbol: key.symbol,
                go_id: key.go_id,
                description: key.description,
                gene_degree: key.gene_degree,
                go_degree: key.go_degree,
            })
        })
        .collect();

    records.sort_by(|a, b| compare_records(a, b, order));
    GeneWalkTable {
        records,
        mouse_genes,
    }
}

fn compare_records(a: &AggregatedRecord, b: &AggregatedRecord, order: &GeneOrder) -> Ordering {
    let gene_order = match (&a.mouse_gene, &b.mouse_gene) {
        (Some(mouse_a), Some(mouse_b)) => order
            .rank(mouse_a.id())
            .cmp(&order.rank(mouse_b.id()))
            .then_with(|| mouse_a.id().cmp(mouse_b.id()))
            .then_with(|| a.symbol.cmp(&b.symbol)),
        _ => order
            .rank(a.gene.as_str())
            .cmp(&order.rank(b.gene.as_str()))
            .then_with(|| a.gene.cmp(&b.gene)),
    };
    gene_order
        .then_with(|| a.qvalue.mean().total_cmp(&b.qvalue.mean()))
        .then_with(|| a.description.cmp(&b.description))
        .then_with(|| a.go_id.cmp(&b.go_id))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::network::{NetworkBuilder, NetworkIndex};
    use crate::null_distribution::NullDistribution;
    use crate::orthologs::OrthologMap;
    use crate::scorer::ReplicateScorer;
    use crate::similarity::Embedding;

    /// Genes `G1` and `G2`, each linked to `GO:A` and `GO:B`
    fn network() -> NetworkIndex {
        let mut builder = NetworkBuilder::default();
        builder.add_gene("G1", "GENE1");
        builder.add_gene("G2", "GENE2");
        builder.add_go_term("GO:A", "alpha");
        builder.add_go_term("GO:B", "beta");
        for gene in ["G1", "G2"] {
            for term in ["GO:A", "GO:B"] {
                builder.link(gene, term).unwrap();
            }
        }
        builder.build()
    }

    fn null() -> NullDistribution {
        let mut null = NullDistribution::default();
        null.insert(1, (0..20).map(|i| f64::from(i) / 20.0).collect()).unwrap();
        null
    }

    fn unit(cos: f32) -> Vec<f32> {
        vec![cos, (1.0 - cos * cos).sqrt()]
    }

    fn embedding(sim_a: f32, sim_b: f32) -> Embedding {
        let mut embedding = Embedding::new(2);
        embedding.insert("G1", vec![1.0, 0.0]).unwrap();
        embedding.insert("G2", vec![1.0, 0.0]).unwrap();
        embedding.insert("GO:A", unit(sim_a)).unwrap();
        embedding.insert("GO:B", unit(sim_b)).unwrap();
        embedding
    }

    fn tables(network: &NetworkIndex, null: &NullDistribution, genes: &[NodeId]) -> Vec<ReplicateTable> {
        let scorer = ReplicateScorer::new(network, null, 1.0).unwrap();
        [embedding(0.92, 0.41), embedding(0.88, 0.52), embedding(0.9, 0.33)]
            .iter()
            .map(|embedding| scorer.score_genes(genes, embedding).unwrap())
            .collect()
    }

    #[test]
    fn mean_and_sem() {
        let network = network();
        let null = null();
        let genes = [NodeId::from("G1")];
        let table = merge_replicates(
            &tables(&network, &null, &genes),
            &GeneOrder::new(["G1"]),
            false,
        );
        assert_eq!(table.len(), 2);

        let alpha = table.iter().find(|r| r.go_id() == "GO:A").unwrap();
        assert_eq!(alpha.replicates(), 3);
        assert!((alpha.similarity().mean() - 0.9).abs() < 1e-6);
        let sims = [0.92f64, 0.88, 0.9];
        let variance = sims.iter().map(|s| (s - 0.9).powi(2)).sum::<f64>() / 3.0;
        assert!((alpha.similarity().sem() - variance.sqrt() / 3f64.sqrt()).abs() < 1e-6);
    }

    #[test]
    fn sem_counts_present_replicates_only() {
        let network = network();
        let null = null();
        let genes = [NodeId::from("G1")];
        let mut tables = tables(&network, &null, &genes);
        // drop GO:B from the last replicate
        let last: ReplicateTable = tables[2]
            .iter()
            .filter(|record| record.go_id() != "GO:B")
            .cloned()
            .collect();
        tables[2] = last;

        let table = merge_replicates(&tables, &GeneOrder::new(["G1"]), false);
        let beta = table.iter().find(|r| r.go_id() == "GO:B").unwrap();
        assert_eq!(beta.replicates(), 2);
        assert!((beta.similarity().mean() - 0.465).abs() < 1e-6);
        assert!((beta.similarity().sem() - 0.055 / 2f64.sqrt()).abs() < 1e-6);

        let alpha = table.iter().find(|r| r.go_id() == "GO:A").unwrap();
        assert_eq!(alpha.replicates(), 3);
    }

    #[test]
    fn merge_is_order_independent() {
        let network = network();
        let null = null();
        let genes = [NodeId::from("G2"), NodeId::from("G1")];
        let order = GeneOrder::new(["G2", "G1"]);
        let mut tables = tables(&network, &null, &genes);

        let forward = merge_replicates(&tables, &order, false);
        for _ in 1..tables.len() {
            tables.rotate_left(1);
            assert_eq!(merge_replicates(&tables, &order, false), forward);
        }
        tables.reverse();
        assert_eq!(merge_replicates(&tables, &order, false), forward);
    }

    #[test]
    fn summary_ignores_replicate_order() {
        let values = [0.41, 0.52, 0.33, 0.1 + 0.2, 0.7];
        let forward = summarize(values.iter().copied().collect()).unwrap();
        let backward = summarize(values.iter().rev().copied().collect()).unwrap();
        assert_eq!(forward, backward);
    }

    #[test]
    fn genes_keep_input_order() {
        let network = network();
        let null = null();
        let genes = [NodeId::from("G2"), NodeId::from("G1")];
        let table = merge_replicates(
            &tables(&network, &null, &genes),
            &GeneOrder::new(["G2", "G1"]),
            false,
        );

        let genes: Vec<&str> = table.iter().map(|r| r.gene().as_str()).collect();
        assert_eq!(genes, ["G2", "G2", "G1", "G1"]);

        // within a gene, rows are sorted by mean q-value
        for pair in table.iter().collect::<Vec<_>>().windows(2) {
            if pair[0].gene() == pair[1].gene() {
                assert!(pair[0].qvalue().mean() <= pair[1].qvalue().mean());
            }
        }
    }

    #[test]
    fn mouse_genes_sort_by_mouse_order() {
        let network = network();
        let null = null();
        let mut orthologs = OrthologMap::default();
        orthologs.add(MouseGene::new("MGI:9", "Gene1b"), Some("G1"));
        orthologs.add(MouseGene::new("MGI:5", "Gene2"), Some("G2"));
        orthologs.add(MouseGene::new("MGI:1", "Gene1a"), Some("G1"));

        let tables: Vec<ReplicateTable> = tables(&network, &null, orthologs.human_genes())
            .iter()
            .map(|table| orthologs.expand(table))
            .collect();
        let order = GeneOrder::new(orthologs.mouse_genes().iter().map(MouseGene::id));
        let table = merge_replicates(&tables, &order, true);

        assert!(table.mouse_genes());
        assert_eq!(table.len(), 6);
        let mouse: Vec<&str> = table
            .iter()
            .map(|r| r.mouse_gene().unwrap().id())
            .collect();
        assert_eq!(mouse, ["MGI:9", "MGI:9", "MGI:5", "MGI:5", "MGI:1", "MGI:1"]);
    }

    #[test]
    fn filter_by_mean_qvalue() {
        let network = network();
        let null = null();
        let genes = [NodeId::from("G1")];
        let table = merge_replicates(
            &tables(&network, &null, &genes),
            &GeneOrder::new(["G1"]),
            false,
        );
        let filtered = table.filter_by_qvalue(0.2);
        assert!(filtered.len() < table.len());
        assert!(filtered.iter().all(|r| r.qvalue().mean() <= 0.2));
    }

    #[test]
    fn no_tables() {
        let table = merge_replicates(&[], &GeneOrder::default(), false);
        assert!(table.is_empty());
    }
}
