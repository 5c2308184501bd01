//! Parsing of the GeneWalk input files
//!
//! All loaders come in two flavours: `load_*` functions that open a file
//! and `read_*` functions that accept any [`BufRead`] source.
//!
//! | Input | Format |
//! | --- | --- |
//! | network nodes | `gene<TAB>id<TAB>symbol` or `go<TAB>id<TAB>description` |
//! | network edges | `id<TAB>id`, further columns are ignored |
//! | embedding | word2vec text format: `<count> <dim>` header, then `<id> <v1> .. <vdim>` |
//! | null distribution | `<bucket><TAB><similarity>`, bucket as `3`, `d3` or `d3.0` |
//! | genes of interest | one gene id per line |
//! | mouse orthologs | CSV with `MGI..`, `Symbol` and `HGNC` columns |
//!
//! Empty lines and lines starting with `#` are skipped in all tab separated files.
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::{GeneWalkError, GeneWalkResult};

mod embedding;
mod genes;
mod network;
mod null_distribution;

pub use embedding::{load_embedding, read_embedding};
pub use genes::{load_genes, load_orthologs, read_genes, read_orthologs};
pub use network::{load_network, read_network};
pub use null_distribution::{load_null_distribution, read_null_distribution};

/// Opens a file for buffered reading
fn open<P: AsRef<Path>>(file: P) -> GeneWalkResult<BufReader<File>> {
    let filename = file.as_ref().display().to_string();
    let file = File::open(file).map_err(|_| GeneWalkError::CannotOpenFile(filename))?;
    Ok(BufReader::new(file))
}

/// Iterates the content lines of a reader
///
/// Empty lines and comment lines starting with `#` are skipped.
fn content_lines<R: BufRead>(reader: R) -> impl Iterator<Item = GeneWalkResult<String>> {
    reader
        .lines()
        .map(|line| {
            line.map_err(|_| GeneWalkError::InvalidInput("unable to read line".to_string()))
        })
        .filter(|line| match line {
            Ok(line) => {
                let line = line.trim();
                !line.is_empty() && !line.starts_with('#')
            }
            Err(_) => true,
        })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn skips_comments_and_empty_lines() {
        let input = "# header\n\nfoo\n  \nbar\n".as_bytes();
        let lines: Vec<String> = content_lines(input).map(Result::unwrap).collect();
        assert_eq!(lines, ["foo", "bar"]);
    }

    #[test]
    fn missing_file() {
        assert!(matches!(
            open("/does/not/exist.tsv"),
            Err(GeneWalkError::CannotOpenFile(_))
        ));
    }
}
