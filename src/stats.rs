//! Statistics used to validate gene - GO term connections
//!
//! This module contains the multiple testing correction that is applied
//! to the p-values of every gene ([`fdr`]), and the summary statistics that
//! combine the results of all replicates ([`summary`]).

pub mod fdr;
pub mod summary;

pub use fdr::benjamini_hochberg;
pub use summary::Summary;
