use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

use tracing::{error, info};

use crate::null_distribution::NullDistribution;
use crate::parser::{content_lines, open};
use crate::{GeneWalkError, GeneWalkResult};

/// Parses a bucket key, written as `3`, `d3` or `d3.0`
fn bucket(key: &str) -> GeneWalkResult<u32> {
    let key = key.trim();
    let key = key.strip_prefix('d').unwrap_or(key);
    let key = key.strip_suffix(".0").unwrap_or(key);
    Ok(key.parse::<u32>()?)
}

/// Parses a single line: `<bucket><TAB><similarity>`
fn null_line(line: &str) -> GeneWalkResult<(u32, f64)> {
    let mut cols = line.split('\t');
    let (Some(key), Some(value)) = (cols.next(), cols.next()) else {
        error!("Invalid null distribution line: {}", line);
        return Err(GeneWalkError::InvalidInput(line.to_string()));
    };
    Ok((bucket(key)?, value.trim().parse::<f64>()?))
}

/// Reads null similarity values, one per line
///
/// ```text
/// d0  0.1231
/// d0  -0.0212
/// d1  0.3412
/// ```
///
/// # Errors
///
/// - [`GeneWalkError::InvalidInput`] if a line is incomplete or a value is `NaN`
/// - [`GeneWalkError::ParseIntError`] / [`GeneWalkError::ParseFloatError`]
///   if a bucket or value is not a number
pub fn read_null_distribution<R: BufRead>(reader: R) -> GeneWalkResult<NullDistribution> {
    let mut samples: HashMap<u32, Vec<f64>> = HashMap::new();
    for line in content_lines(reader) {
        let (key, value) = null_line(&line?)?;
        samples.entry(key).or_default().push(value);
    }
    let mut null = NullDistribution::default();
    for (key, values) in samples {
        null.insert(key, values)?;
    }
    Ok(null)
}

/// Loads the null distribution from a file
///
/// # Errors
///
/// - [`GeneWalkError::CannotOpenFile`] if the file cannot be opened
/// - see [`read_null_distribution`]
pub fn load_null_distribution<P: AsRef<Path>>(file: P) -> GeneWalkResult<NullDistribution> {
    let null = read_null_distribution(open(file)?)?;
    info!("Loaded {:?}", null);
    Ok(null)
}
