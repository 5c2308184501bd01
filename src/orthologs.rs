//! Mapping of mouse genes to their human orthologs
//!
//! The GeneWalk network contains human genes only. Mouse genes of interest
//! are scored through their human orthologs, and the resulting records are
//! then expanded back to the mouse genes: one row per combination of mouse
//! gene and mapped human gene. A human gene with several mouse orthologs
//! thus yields rows for each of them, and a mouse gene with several human
//! orthologs has rows for every one of those.
use std::collections::HashMap;
use std::fmt::Display;

use tracing::debug;

use crate::node::NodeId;
use crate::scorer::ReplicateTable;

/// A mouse gene of interest
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MouseGene {
    id: String,
    symbol: String,
}

impl MouseGene {
    /// Constructs a new mouse gene
    pub fn new(id: &str, symbol: &str) -> Self {
        Self {
            id: id.to_string(),
            symbol: symbol.to_string(),
        }
    }

    /// The MGI id of the gene
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The mouse gene symbol
    pub fn symbol(&self) -> &str {
        &self.symbol
    }
}

impl Display for MouseGene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.id, self.symbol)
    }
}

/// The mouse genes of interest with their mapped human genes
///
/// The order in which mouse genes are added is the order of the genes
/// of interest.
///
/// # Examples
///
/// ```
/// use genewalk::{MouseGene, OrthologMap};
///
/// let mut orthologs = OrthologMap::default();
/// orthologs.add(MouseGene::new("MGI:88190", "Braf"), Some("HGNC:1097"));
/// orthologs.add(MouseGene::new("MGI:1346866", "Map2k1"), Some("HGNC:6840"));
/// orthologs.add(MouseGene::new("MGI:99999", "Foo"), None);
///
/// assert_eq!(orthologs.len(), 3);
/// assert_eq!(orthologs.human_genes().len(), 2);
/// assert_eq!(orthologs.mouse_genes_of("HGNC:1097")[0].symbol(), "Braf");
/// ```
#[derive(Debug, Default, Clone)]
pub struct OrthologMap {
    mouse_genes: Vec<MouseGene>,
    human_genes: Vec<NodeId>,
    by_human: HashMap<NodeId, Vec<MouseGene>>,
}

impl OrthologMap {
    /// Adds a mouse gene and its mapped human gene
    ///
    /// A mouse gene without a human ortholog is still a gene of interest,
    /// but it will never have any records. Adding the same pair twice has
    /// no effect.
    pub fn add(&mut self, mouse_gene: MouseGene, human_gene: Option<&str>) {
        if !self.mouse_genes.contains(&mouse_gene) {
            self.mouse_genes.push(mouse_gene.clone());
        }
        let Some(human_gene) = human_gene else {
            debug!("{} has no mapped human gene", mouse_gene);
            return;
        };
        let mapped = self.by_human.entry(NodeId::from(human_gene)).or_default();
        if mapped.is_empty() {
            self.human_genes.push(NodeId::from(human_gene));
        }
        if !mapped.contains(&mouse_gene) {
            mapped.push(mouse_gene);
        }
    }

    /// Returns the number of mouse genes
    pub fn len(&self) -> usize {
        self.mouse_genes.len()
    }

    /// Returns `true` if there are no mouse genes
    pub fn is_empty(&self) -> bool {
        self.mouse_genes.is_empty()
    }

    /// The mouse genes, in the order they were added
    pub fn mouse_genes(&self) -> &[MouseGene] {
        &self.mouse_genes
    }

    /// The mapped human genes, in the order they were first mapped
    pub fn human_genes(&self) -> &[NodeId] {
        &self.human_genes
    }

    /// All mouse genes that are mapped to the human gene
    pub fn mouse_genes_of(&self, human_gene: &str) -> &[MouseGene] {
        self.by_human
            .get(human_gene)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Expands the records of human genes to their mouse orthologs
    ///
    /// Each record is repeated once for every mouse gene that is mapped to
    /// its gene. Records of human genes without a mapped mouse gene are
    /// dropped.
    pub fn expand(&self, table: &ReplicateTable) -> ReplicateTable {
        table
            .iter()
            .flat_map(|record| {
                self.mouse_genes_of(record.gene().as_str())
                    .iter()
                    .map(move |mouse_gene| record.with_mouse_gene(mouse_gene.clone()))
            })
            .collect()
    }
}
