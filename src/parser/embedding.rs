use std::io::BufRead;
use std::path::Path;

use tracing::{error, info};

use crate::parser::{content_lines, open};
use crate::similarity::Embedding;
use crate::{GeneWalkError, GeneWalkResult};

/// Parses the `<count> <dimension>` header line
fn header_line(line: &str) -> GeneWalkResult<(usize, usize)> {
    let mut cols = line.split_whitespace();
    let (Some(count), Some(dimension), None) = (cols.next(), cols.next(), cols.next()) else {
        error!("Invalid embedding header: {}", line);
        return Err(GeneWalkError::InvalidInput(line.to_string()));
    };
    Ok((count.parse()?, dimension.parse()?))
}

/// Parses a single vector line: `<id> <v1> ... <vn>`
fn vector_line(line: &str) -> GeneWalkResult<(&str, Vec<f32>)> {
    let mut cols = line.split_whitespace();
    let Some(id) = cols.next() else {
        return Err(GeneWalkError::InvalidInput(line.to_string()));
    };
    let vector = cols
        .map(str::parse::<f32>)
        .collect::<Result<Vec<f32>, _>>()?;
    Ok((id, vector))
}

/// Reads node vectors in word2vec text format
///
/// ```text
/// 3 4
/// HGNC:1097 0.1 0.2 -0.3 0.4
/// GO:0000165 0.0 0.2 -0.1 0.9
/// GO:0005634 0.4 -0.2 0.3 0.1
/// ```
///
/// # Errors
///
/// - [`GeneWalkError::InvalidInput`] if the header is missing or the number of
///   vectors or their length does not match the header
/// - [`GeneWalkError::ParseFloatError`] if a value is not a number
pub fn read_embedding<R: BufRead>(reader: R) -> GeneWalkResult<Embedding> {
    let mut lines = content_lines(reader);
    let Some(header) = lines.next() else {
        return Err(GeneWalkError::InvalidInput(
            "embedding must start with a header".to_string(),
        ));
    };
    let (count, dimension) = header_line(&header?)?;

    let mut embedding = Embedding::new(dimension);
    for line in lines {
        let line = line?;
        let (id, vector) = vector_line(&line)?;
        embedding.insert(id, vector)?;
    }

    if embedding.len() == count {
        Ok(embedding)
    } else {
        error!(
            "Embedding header announced {} vectors, found {}",
            count,
            embedding.len()
        );
        Err(GeneWalkError::InvalidInput(format!(
            "expected {count} vectors, found {}",
            embedding.len()
        )))
    }
}

/// Loads node vectors from a word2vec text file
///
/// # Errors
///
/// - [`GeneWalkError::CannotOpenFile`] if the file cannot be opened
/// - see [`read_embedding`]
pub fn load_embedding<P: AsRef<Path>>(file: P) -> GeneWalkResult<Embedding> {
    let filename = file.as_ref().display().to_string();
    let embedding = read_embedding(open(file)?)?;
    info!("Loaded {:?} from {}", embedding, filename);
    Ok(embedding)
}
