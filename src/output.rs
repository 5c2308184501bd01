//! Writing the GeneWalk output as CSV
use std::fs::File;
use std::io::Write;
use std::path::Path;

use csv::{Terminator, WriterBuilder};
use tracing::{error, info};

use crate::aggregate::{AggregatedRecord, GeneWalkTable};
use crate::{GeneWalkError, GeneWalkResult};

const HUMAN_COLUMNS: [&str; 2] = ["HGNC", "Symbol"];
const MOUSE_COLUMNS: [&str; 4] = ["MGI", "Symbol", "mapped HGNC", "mapped Symbol"];
const COLUMNS: [&str; 10] = [
    "GO description",
    "GO:ID",
    "N_con(gene)",
    "N_con(GO)",
    "mean:sim",
    "sem:sim",
    "mean:pval",
    "sem:pval",
    "mean:padj",
    "sem:padj",
];

fn row(record: &AggregatedRecord, mouse_genes: bool) -> Vec<String> {
    let mut fields = Vec::with_capacity(MOUSE_COLUMNS.len() + COLUMNS.len());
    if mouse_genes {
        let (id, symbol) = record
            .mouse_gene()
            .map_or(("", ""), |mouse| (mouse.id(), mouse.symbol()));
        fields.push(id.to_string());
        fields.push(symbol.to_string());
    }
    fields.push(record.gene().to_string());
    fields.push(record.symbol().to_string());
    fields.push(record.description().to_string());
    fields.push(record.go_id().to_string());
    fields.push(record.gene_degree().to_string());
    fields.push(record.go_degree().to_string());
    for summary in [record.similarity(), record.pvalue(), record.qvalue()] {
        fields.push(summary.mean().to_string());
        fields.push(summary.sem().to_string());
    }
    fields
}

impl GeneWalkTable {
    /// The column names of the table
    ///
    /// # Examples
    ///
    /// ```
    /// use genewalk::GeneWalkTable;
    ///
    /// let table = GeneWalkTable::default();
    /// assert_eq!(table.columns()[0], "HGNC");
    /// assert_eq!(table.columns().len(), 12);
    /// ```
    pub fn columns(&self) -> Vec<&'static str> {
        let mut columns: Vec<&'static str> = if self.mouse_genes() {
            MOUSE_COLUMNS.to_vec()
        } else {
            HUMAN_COLUMNS.to_vec()
        };
        columns.extend(COLUMNS);
        columns
    }

    /// Writes the table as CSV, including a header line
    ///
    /// Fields that contain separators, quotes or line breaks are quoted.
    ///
    /// # Errors
    ///
    /// Returns [`GeneWalkError::CannotOpenFile`] if writing fails
    pub fn write_csv<W: Write>(&self, writer: W) -> GeneWalkResult<()> {
        let write_error = |err: csv::Error| {
            error!("Unable to write output: {}", err);
            GeneWalkError::CannotOpenFile("unable to write output".to_string())
        };

        let mut writer = WriterBuilder::new()
            .terminator(Terminator::Any(b'\n'))
            .from_writer(writer);
        writer.write_record(self.columns()).map_err(write_error)?;
        for record in self {
            writer
                .write_record(row(record, self.mouse_genes()))
                .map_err(write_error)?;
        }
        writer.flush().map_err(|err| write_error(err.into()))
    }

    /// Writes the table as CSV file to `path`
    ///
    /// # Errors
    ///
    /// Returns [`GeneWalkError::CannotOpenFile`] if the file cannot be created or written
    pub fn to_csv<P: AsRef<Path>>(&self, path: P) -> GeneWalkResult<()> {
        let filename = path.as_ref().display().to_string();
        let file =
            File::create(&path).map_err(|_| GeneWalkError::CannotOpenFile(filename.clone()))?;
        self.write_csv(file)?;
        info!("Wrote {} rows to {}", self.len(), filename);
        Ok(())
    }
}
