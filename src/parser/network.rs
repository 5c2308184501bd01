use std::io::BufRead;
use std::path::Path;

use tracing::{error, info};

use crate::network::{NetworkBuilder, NetworkIndex};
use crate::node::Node;
use crate::parser::{content_lines, open};
use crate::{GeneWalkError, GeneWalkResult};

/// Parses a single line of the nodes file
///
/// ```text
/// gene    HGNC:1097   BRAF
/// go      GO:0000165  MAPK cascade
/// ```
fn node_line(line: &str) -> GeneWalkResult<Node> {
    let mut cols = line.split('\t');

    let (Some(kind), Some(id), Some(label)) = (cols.next(), cols.next(), cols.next()) else {
        error!("Invalid node line: {}", line);
        return Err(GeneWalkError::InvalidInput(line.to_string()));
    };

    match kind.trim().to_ascii_lowercase().as_str() {
        "gene" => Ok(Node::gene(id.trim(), label.trim())),
        "go" => Ok(Node::go_term(id.trim(), label.trim())),
        _ => {
            error!("Invalid node kind: {}", kind);
            Err(GeneWalkError::InvalidInput(line.to_string()))
        }
    }
}

/// Parses a single line of the edges file
///
/// ```text
/// HGNC:1097   GO:0000165  Activation
/// ```
fn edge_line(line: &str) -> GeneWalkResult<(&str, &str)> {
    let mut cols = line.split('\t');
    let (Some(a), Some(b)) = (cols.next(), cols.next()) else {
        error!("Invalid edge line: {}", line);
        return Err(GeneWalkError::InvalidInput(line.to_string()));
    };
    Ok((a.trim(), b.trim()))
}

/// Builds the network from a nodes and an edges source
///
/// # Errors
///
/// - [`GeneWalkError::InvalidInput`] if a line cannot be parsed
/// - [`GeneWalkError::UnknownNode`] if an edge refers to a node that is not in the nodes source
pub fn read_network<N: BufRead, E: BufRead>(nodes: N, edges: E) -> GeneWalkResult<NetworkIndex> {
    let mut builder = NetworkBuilder::default();
    for line in content_lines(nodes) {
        builder.add_node(node_line(&line?)?);
    }
    for line in content_lines(edges) {
        let line = line?;
        let (a, b) = edge_line(&line)?;
        builder.link(a, b)?;
    }
    Ok(builder.build())
}

/// Loads the network from a nodes and an edges file
///
/// # Errors
///
/// - [`GeneWalkError::CannotOpenFile`] if either file cannot be opened
/// - see [`read_network`]
pub fn load_network<P: AsRef<Path>, Q: AsRef<Path>>(
    nodes: P,
    edges: Q,
) -> GeneWalkResult<NetworkIndex> {
    let network = read_network(open(nodes)?, open(edges)?)?;
    info!("Loaded network with {} nodes", network.len());
    Ok(network)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::node::NodeKind;

    #[test]
    fn parse_node_lines() {
        let gene = node_line("gene\tHGNC:1097\tBRAF").unwrap();
        assert_eq!(gene.kind(), NodeKind::Gene);
        assert_eq!(gene.id().as_str(), "HGNC:1097");
        assert_eq!(gene.symbol(), Some("BRAF"));

        let term = node_line("GO\tGO:0006355\tregulation of transcription, DNA-templated\n").unwrap();
        assert_eq!(term.kind(), NodeKind::GoTerm);
        assert_eq!(
            term.description(),
            Some("regulation of transcription, DNA-templated")
        );
    }

    #[test]
    fn invalid_node_lines() {
        assert!(node_line("gene\tHGNC:1097").is_err());
        assert!(node_line("protein\tP12345\tBRAF").is_err());
    }

    #[test]
    fn parse_edge_lines() {
        assert_eq!(edge_line("A\tB").unwrap(), ("A", "B"));
        assert_eq!(edge_line("A\tB\tActivation").unwrap(), ("A", "B"));
        assert!(edge_line("A B").is_err());
    }

    #[test]
    fn read_small_network() {
        let nodes = "#kind\tid\tlabel\ngene\tG1\tGENE1\ngene\tG2\tGENE2\ngo\tGO:1\tterm\n".as_bytes();
        let edges = "G1\tG2\nG1\tGO:1\nG1\tGO:1\n".as_bytes();
        let network = read_network(nodes, edges).unwrap();
        assert_eq!(network.len(), 3);
        assert_eq!(network.degree("G1").unwrap(), 2);
        assert!(network.is_go_node("GO:1"));
    }

    #[test]
    fn edge_to_unknown_node() {
        let nodes = "gene\tG1\tGENE1\n".as_bytes();
        let edges = "G1\tGO:1\n".as_bytes();
        assert_eq!(
            read_network(nodes, edges).unwrap_err(),
            GeneWalkError::UnknownNode("GO:1".to_string())
        );
    }
}
