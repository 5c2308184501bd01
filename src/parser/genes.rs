use std::collections::HashSet;
use std::io::{BufRead, Read};
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::{error, info, warn};

use crate::node::NodeId;
use crate::orthologs::{MouseGene, OrthologMap};
use crate::parser::{content_lines, open};
use crate::{GeneWalkError, GeneWalkResult};

/// Reads the genes of interest, one id per line
///
/// Duplicate ids are ignored, the genes keep the order of their first occurrence.
///
/// # Errors
///
/// Returns [`GeneWalkError::InvalidInput`] if the source cannot be read
pub fn read_genes<R: BufRead>(reader: R) -> GeneWalkResult<Vec<NodeId>> {
    let mut seen = HashSet::new();
    let mut genes: Vec<NodeId> = Vec::new();
    for line in content_lines(reader) {
        let gene = NodeId::from(line?.trim());
        if seen.insert(gene.clone()) {
            genes.push(gene);
        } else {
            warn!("Duplicate gene of interest {}", gene);
        }
    }
    Ok(genes)
}

/// Loads the genes of interest from a file
///
/// # Errors
///
/// - [`GeneWalkError::CannotOpenFile`] if the file cannot be opened
/// - see [`read_genes`]
pub fn load_genes<P: AsRef<Path>>(file: P) -> GeneWalkResult<Vec<NodeId>> {
    let genes = read_genes(open(file)?)?;
    info!("Loaded {} genes of interest", genes.len());
    Ok(genes)
}

fn csv_error(err: &csv::Error) -> GeneWalkError {
    error!("Invalid ortholog table: {}", err);
    GeneWalkError::InvalidInput(err.to_string())
}

/// Positions of the mouse id, mouse symbol and mapped human id columns
struct OrthologColumns {
    mouse_id: usize,
    symbol: usize,
    human_id: usize,
}

fn find_column<F: Fn(&str) -> bool>(
    header: &StringRecord,
    name: &str,
    matches: F,
) -> GeneWalkResult<usize> {
    header
        .iter()
        .position(|column| matches(column.trim_start_matches('\u{feff}')))
        .ok_or_else(|| {
            error!("Ortholog file has no {} column", name);
            GeneWalkError::InvalidInput(format!("missing column {name}"))
        })
}

impl OrthologColumns {
    fn from_header(header: &StringRecord) -> GeneWalkResult<Self> {
        Ok(Self {
            mouse_id: find_column(header, "MGI", |column| column.starts_with("MGI"))?,
            symbol: find_column(header, "Symbol", |column| column == "Symbol")?,
            human_id: find_column(header, "HGNC", |column| column == "HGNC")?,
        })
    }

    /// The mouse gene and its mapped human gene, if any
    fn parse<'a>(
        &self,
        record: &'a StringRecord,
    ) -> GeneWalkResult<(MouseGene, Option<&'a str>)> {
        let field = |idx: usize| {
            record.get(idx).ok_or_else(|| {
                error!("Invalid ortholog record: {:?}", record);
                GeneWalkError::InvalidInput(format!("{record:?}"))
            })
        };
        let mouse_gene = MouseGene::new(field(self.mouse_id)?, field(self.symbol)?);
        let human_id = match field(self.human_id)? {
            "" | "NA" => None,
            id => Some(id),
        };
        Ok((mouse_gene, human_id))
    }
}

/// Reads mouse genes of interest and their mapped human genes
///
/// The source is CSV with a header line. The mouse gene id is taken from the
/// first column whose name starts with `MGI`, the mouse symbol from the
/// `Symbol` column and the mapped human gene from the `HGNC` column.
/// Mouse genes without ortholog have an empty or `NA` human gene.
///
/// ```text
/// MGI,Symbol,HGNC
/// MGI:88190,Braf,HGNC:1097
/// MGI:99999,Foo,NA
/// ```
///
/// # Errors
///
/// Returns [`GeneWalkError::InvalidInput`] if the header misses a column
/// or a record is not valid CSV
pub fn read_orthologs<R: Read>(reader: R) -> GeneWalkResult<OrthologMap> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .comment(Some(b'#'))
        .trim(Trim::All)
        .from_reader(reader);

    let header = reader.headers().map_err(|err| csv_error(&err))?;
    if header.is_empty() {
        return Err(GeneWalkError::InvalidInput(
            "ortholog file must start with a header".to_string(),
        ));
    }
    let columns = OrthologColumns::from_header(header)?;

    let mut orthologs = OrthologMap::default();
    for record in reader.records() {
        let record = record.map_err(|err| csv_error(&err))?;
        let (mouse_gene, human_id) = columns.parse(&record)?;
        orthologs.add(mouse_gene, human_id);
    }
    Ok(orthologs)
}

/// Loads mouse genes of interest and their mapped human genes from a CSV file
///
/// # Errors
///
/// - [`GeneWalkError::CannotOpenFile`] if the file cannot be opened
/// - see [`read_orthologs`]
pub fn load_orthologs<P: AsRef<Path>>(file: P) -> GeneWalkResult<OrthologMap> {
    let orthologs = read_orthologs(open(file)?)?;
    info!(
        "Loaded {} mouse genes mapped to {} human genes",
        orthologs.len(),
        orthologs.human_genes().len()
    );
    Ok(orthologs)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn gene_list() {
        let input = "HGNC:2\n\nHGNC:1\n HGNC:2 \nHGNC:3\n".as_bytes();
        let genes = read_genes(input).unwrap();
        assert_eq!(genes, ["HGNC:2", "HGNC:1", "HGNC:3"].map(NodeId::from));
    }

    #[test]
    fn ortholog_table() {
        let input = "MGI (mouse),Symbol,HGNC,HGNC_SYMBOL\n\
                     MGI:88190,Braf,HGNC:1097,BRAF\n\
                     MGI:99999,Foo,NA,\n\
                     MGI:1,Bar,,\n\
                     MGI:2,Baz,HGNC:1097,BRAF\n"
            .as_bytes();
        let orthologs = read_orthologs(input).unwrap();
        assert_eq!(orthologs.len(), 4);
        assert_eq!(orthologs.human_genes(), [NodeId::from("HGNC:1097")]);
        let mapped: Vec<&str> = orthologs
            .mouse_genes_of("HGNC:1097")
            .iter()
            .map(MouseGene::symbol)
            .collect();
        assert_eq!(mapped, ["Braf", "Baz"]);
    }

    #[test]
    fn ortholog_columns_in_any_order() {
        let input = "HGNC,MGI,Symbol\nHGNC:1097,MGI:88190,Braf\n".as_bytes();
        let orthologs = read_orthologs(input).unwrap();
        assert_eq!(orthologs.mouse_genes()[0].id(), "MGI:88190");
        assert_eq!(orthologs.mouse_genes_of("HGNC:1097").len(), 1);
    }

    #[test]
    fn ortholog_header_with_byte_order_mark() {
        let input = "\u{feff}MGI,Symbol,HGNC\nMGI:88190,Braf,HGNC:1097\n".as_bytes();
        let orthologs = read_orthologs(input).unwrap();
        assert_eq!(orthologs.mouse_genes()[0].id(), "MGI:88190");
        assert_eq!(orthologs.human_genes(), [NodeId::from("HGNC:1097")]);
    }

    #[test]
    fn quoted_fields() {
        let input = "MGI,Symbol,HGNC\n\
                     MGI:1,\"Foo, long\",HGNC:1\n\
                     MGI:2,\"line one\nline two\",HGNC:2\n"
            .as_bytes();
        let orthologs = read_orthologs(input).unwrap();
        assert_eq!(orthologs.len(), 2);
        assert_eq!(orthologs.mouse_genes()[0].symbol(), "Foo, long");
        assert_eq!(orthologs.mouse_genes()[1].symbol(), "line one\nline two");
        assert_eq!(orthologs.mouse_genes_of("HGNC:2")[0].id(), "MGI:2");
    }

    #[test]
    fn invalid_ortholog_tables() {
        assert!(read_orthologs("MGI,Symbol\nMGI:1,Foo\n".as_bytes()).is_err());
        assert!(read_orthologs("MGI,Symbol,HGNC\nMGI:1,Foo\n".as_bytes()).is_err());
        assert!(read_orthologs("".as_bytes()).is_err());
    }
}
