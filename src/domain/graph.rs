// ============================================================
// Layer 3 — Wiring Graph Domain Type
// ============================================================
// A randomly wired stage of the network is described by a
// directed acyclic graph. Every node becomes one convolution
// block; every edge (src → dst) feeds the output of src into dst.
//
// The raw description (node count + edge list) is validated once
// and turned into a DagTopology, which is what the model needs:
//
//   in_degree / out_degree  → how many inputs a node aggregates
//   predecessors            → which outputs feed each node
//   input_nodes             → nodes with no incoming edges,
//                             these receive the stage input
//   output_nodes            → nodes with no outgoing edges,
//                             their mean is the stage output
//   order                   → a topological order (Kahn)
//
// Reference: Xie et al. (2019) Exploring Randomly Wired Neural
//            Networks for Image Recognition

use anyhow::{bail, Result};
use std::collections::VecDeque;

/// A raw wiring graph: node count plus directed edges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Graph {
    pub num_nodes: usize,
    pub edges:     Vec<(usize, usize)>,
}

/// Derived, validated structure of a wiring graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DagTopology {
    pub num_nodes:    usize,
    pub in_degree:    Vec<usize>,
    pub out_degree:   Vec<usize>,
    pub predecessors: Vec<Vec<usize>>,
    pub input_nodes:  Vec<usize>,
    pub output_nodes: Vec<usize>,
    pub order:        Vec<usize>,
}

impl Graph {
    pub fn new(num_nodes: usize, edges: Vec<(usize, usize)>) -> Self {
        Self { num_nodes, edges }
    }

    /// Check the graph and compute its topology.
    ///
    /// Fails on an empty graph, out-of-range endpoints,
    /// self loops and cycles.
    pub fn topology(&self) -> Result<DagTopology> {
        let n = self.num_nodes;
        if n == 0 {
            bail!("graph has no nodes");
        }

        let mut in_degree    = vec![0usize; n];
        let mut out_degree   = vec![0usize; n];
        let mut successors   = vec![Vec::new(); n];
        let mut predecessors = vec![Vec::new(); n];

        for (i, &(src, dst)) in self.edges.iter().enumerate() {
            if src >= n || dst >= n {
                bail!("edge {i} ({src} -> {dst}) refers to a node outside 0..{n}");
            }
            if src == dst {
                bail!("edge {i} is a self loop on node {src}");
            }
            in_degree[dst]  += 1;
            out_degree[src] += 1;
            successors[src].push(dst);
            predecessors[dst].push(src);
        }

        let input_nodes:  Vec<usize> = (0..n).filter(|&v| in_degree[v] == 0).collect();
        let output_nodes: Vec<usize> = (0..n).filter(|&v| out_degree[v] == 0).collect();

        // ── Kahn's algorithm ─────────────────────────────────────────────────
        let mut remaining = in_degree.clone();
        let mut queue: VecDeque<usize> = input_nodes.iter().copied().collect();
        let mut order = Vec::with_capacity(n);

        while let Some(now) = queue.pop_front() {
            order.push(now);
            for &next in &successors[now] {
                remaining[next] -= 1;
                if remaining[next] == 0 {
                    queue.push_back(next);
                }
            }
        }

        if order.len() != n {
            bail!(
                "graph contains a cycle ({} of {} nodes reachable in topological order)",
                order.len(),
                n
            );
        }

        Ok(DagTopology {
            num_nodes: n,
            in_degree,
            out_degree,
            predecessors,
            input_nodes,
            output_nodes,
            order,
        })
    }
}

impl DagTopology {
    pub fn is_input(&self, node: usize) -> bool {
        self.in_degree[node] == 0
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn diamond() -> Graph {
        // 0 → 1 → 3
        // 0 → 2 → 3
        Graph::new(4, vec![(0, 1), (0, 2), (1, 3), (2, 3)])
    }

    #[test]
    fn test_diamond_topology() {
        let topo = diamond().topology().unwrap();
        assert_eq!(topo.input_nodes,  vec![0]);
        assert_eq!(topo.output_nodes, vec![3]);
        assert_eq!(topo.in_degree,    vec![0, 1, 1, 2]);
        assert_eq!(topo.predecessors[3], vec![1, 2]);
        assert_eq!(topo.order[0], 0);
        assert_eq!(*topo.order.last().unwrap(), 3);
    }

    #[test]
    fn test_order_respects_every_edge() {
        let g = Graph::new(5, vec![(3, 1), (0, 3), (1, 4), (2, 4), (0, 2)]);
        let topo = g.topology().unwrap();
        let pos = |v: usize| topo.order.iter().position(|&x| x == v).unwrap();
        for &(s, e) in &g.edges {
            assert!(pos(s) < pos(e), "{s} must come before {e}");
        }
    }

    #[test]
    fn test_isolated_node_is_input_and_output() {
        let topo = Graph::new(3, vec![(0, 1)]).topology().unwrap();
        assert_eq!(topo.input_nodes,  vec![0, 2]);
        assert_eq!(topo.output_nodes, vec![1, 2]);
        assert!(topo.is_input(2));
    }

    #[test]
    fn test_cycle_is_rejected() {
        let g = Graph::new(3, vec![(0, 1), (1, 2), (2, 1)]);
        let err = g.topology().unwrap_err().to_string();
        assert!(err.contains("cycle"));
    }

    #[test]
    fn test_out_of_range_and_self_loop_rejected() {
        assert!(Graph::new(2, vec![(0, 2)]).topology().is_err());
        assert!(Graph::new(2, vec![(1, 1)]).topology().is_err());
        assert!(Graph::new(0, vec![]).topology().is_err());
    }
}
