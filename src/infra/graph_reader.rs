// ============================================================
// Layer 6 — Graph Reader
// ============================================================
// Wiring graphs are stored as small text files:
//
//   <num_nodes> <num_edges>
//   <src> <dst>
//   <src> <dst>
//   ...
//
// Node ids are 0-based. The reader only parses; structural
// checks (ranges, cycles) live on the domain Graph and are run
// here so a bad file is rejected at load time.

use anyhow::{bail, Context, Result};
use std::{fs, path::Path};

use crate::domain::graph::Graph;

/// Read and validate a graph file.
pub fn read_graph(path: impl AsRef<Path>) -> Result<Graph> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("Cannot read graph file '{}'", path.display()))?;
    let graph = parse_graph(&text)
        .with_context(|| format!("Invalid graph file '{}'", path.display()))?;
    tracing::debug!(
        "Read graph '{}': {} nodes, {} edges",
        path.display(),
        graph.num_nodes,
        graph.edges.len()
    );
    Ok(graph)
}

pub fn parse_graph(text: &str) -> Result<Graph> {
    let mut lines = text
        .lines()
        .map(str::trim)
        .enumerate()
        .filter(|(_, l)| !l.is_empty());

    let (_, header) = lines.next().context("graph file is empty")?;
    let (num_nodes, num_edges) = parse_pair(header).context("bad header line")?;

    let mut edges = Vec::with_capacity(num_edges);
    for (lineno, line) in lines {
        let edge = parse_pair(line).with_context(|| format!("bad edge on line {}", lineno + 1))?;
        edges.push(edge);
    }

    if edges.len() != num_edges {
        bail!("header declares {} edges but {} were found", num_edges, edges.len());
    }

    let graph = Graph::new(num_nodes, edges);
    graph.topology()?;
    Ok(graph)
}

fn parse_pair(line: &str) -> Result<(usize, usize)> {
    let mut parts = line.split_whitespace();
    let (Some(a), Some(b), None) = (parts.next(), parts.next(), parts.next()) else {
        bail!("expected two integers, got '{line}'");
    };
    Ok((a.parse()?, b.parse()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_simple_graph() {
        let g = parse_graph("4 4\n0 1\n0 2\n1 3\n2 3\n").unwrap();
        assert_eq!(g.num_nodes, 4);
        assert_eq!(g.edges, vec![(0, 1), (0, 2), (1, 3), (2, 3)]);
    }

    #[test]
    fn test_blank_lines_and_spacing_tolerated() {
        let g = parse_graph("  3   2 \n0\t1\n\n1 2\n\n").unwrap();
        assert_eq!(g.edges.len(), 2);
    }

    #[test]
    fn test_edge_count_mismatch() {
        let err = parse_graph("3 3\n0 1\n1 2\n").unwrap_err();
        assert!(err.to_string().contains("declares 3 edges"));
    }

    #[test]
    fn test_malformed_lines() {
        assert!(parse_graph("").is_err());
        assert!(parse_graph("3\n").is_err());
        assert!(parse_graph("3 1\n0 x\n").is_err());
        assert!(parse_graph("3 1\n0 1 2\n").is_err());
    }

    #[test]
    fn test_cyclic_graph_rejected() {
        assert!(parse_graph("2 2\n0 1\n1 0\n").is_err());
    }

    #[test]
    fn test_read_graph_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "2 1\n0 1\n").unwrap();
        let g = read_graph(file.path()).unwrap();
        assert_eq!(g, Graph::new(2, vec![(0, 1)]));
    }
}
