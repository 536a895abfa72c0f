use std::collections::{HashMap, HashSet, VecDeque};

use anyhow::{anyhow, Result};
use gridtopo_core::NodeId;
use petgraph::algo::{connected_components, dijkstra};
use petgraph::visit::EdgeRef;

use super::WeightedGraph;

/// Summary statistics of a topology graph (density/degree/connected components).
#[derive(Debug)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub connected_components: usize,
    pub min_degree: usize,
    pub avg_degree: f64,
    pub max_degree: usize,
    pub density: f64,
    /// Sum of all edge weights, in the unit of the graph kind
    pub total_weight: f64,
}

/// One electrically connected island.
#[derive(Debug)]
pub struct IslandSummary {
    pub island_id: usize,
    pub node_count: usize,
}

/// Island membership of a single node.
#[derive(Debug)]
pub struct NodeAssignment {
    pub node: NodeId,
    pub label: String,
    pub island_id: usize,
}

#[derive(Debug)]
pub struct IslandAnalysis {
    pub islands: Vec<IslandSummary>,
    pub assignments: Vec<NodeAssignment>,
}

/// Calculates graph-level statistics such as density, degree distribution and component counts.
pub fn graph_stats(graph: &WeightedGraph) -> Result<GraphStats> {
    let g = graph.graph();
    let node_count = g.node_count();
    let edge_count = g.edge_count();
    let degrees: Vec<usize> = g.node_indices().map(|n| g.neighbors(n).count()).collect();
    let min_degree = *degrees.iter().min().unwrap_or(&0);
    let max_degree = *degrees.iter().max().unwrap_or(&0);
    let avg_degree = if node_count == 0 {
        0.0
    } else {
        degrees.iter().copied().sum::<usize>() as f64 / node_count as f64
    };
    let density = if node_count < 2 {
        0.0
    } else {
        2.0 * edge_count as f64 / (node_count as f64 * (node_count as f64 - 1.0))
    };
    Ok(GraphStats {
        node_count,
        edge_count,
        connected_components: connected_components(g),
        min_degree,
        avg_degree,
        max_degree,
        density,
        total_weight: g.edge_weights().map(|e| e.weight).sum(),
    })
}

/// Labels connected components by breadth-first search.
///
/// Islands are numbered in order of their first node in the graph; the
/// assignments are sorted the same way.
pub fn find_islands(graph: &WeightedGraph) -> Result<IslandAnalysis> {
    let g = graph.graph();
    let mut visited = HashSet::new();
    let mut islands = Vec::new();
    let mut assignments = Vec::new();
    let mut island_id = 0;
    for start in g.node_indices() {
        if visited.contains(&start) {
            continue;
        }
        let mut queue = VecDeque::new();
        queue.push_back(start);
        let mut members = Vec::new();
        while let Some(node) = queue.pop_front() {
            if !visited.insert(node) {
                continue;
            }
            members.push(node);
            for neighbor in g.neighbors(node) {
                if !visited.contains(&neighbor) {
                    queue.push_back(neighbor);
                }
            }
        }
        islands.push(IslandSummary {
            island_id,
            node_count: members.len(),
        });
        members.sort();
        for node in members {
            assignments.push((
                node,
                NodeAssignment {
                    node: g[node].uuid,
                    label: g[node].id.clone(),
                    island_id,
                },
            ));
        }
        island_id += 1;
    }
    assignments.sort_by_key(|(idx, _)| *idx);
    Ok(IslandAnalysis {
        islands,
        assignments: assignments.into_iter().map(|(_, a)| a).collect(),
    })
}

/// Weighted shortest-path length from `from` to every reachable node (Dijkstra).
pub fn shortest_path_lengths(graph: &WeightedGraph, from: NodeId) -> Result<HashMap<NodeId, f64>> {
    let start = graph
        .node_index(from)
        .ok_or_else(|| anyhow!("node {from} is not part of the graph"))?;
    let g = graph.graph();
    let lengths = dijkstra(g, start, None, |e| e.weight().weight);
    Ok(lengths
        .into_iter()
        .map(|(idx, length)| (g[idx].uuid, length))
        .collect())
}

/// Export the topology to a DOT string (Graphviz).
pub fn export_graph(graph: &WeightedGraph, format: &str) -> Result<String> {
    match format.to_ascii_lowercase().as_str() {
        "graphviz" | "dot" => Ok(render_dot(graph)),
        other => Err(anyhow!("unsupported graph export format '{other}'")),
    }
}

fn render_dot(graph: &WeightedGraph) -> String {
    let g = graph.graph();
    let mut buffer = String::new();
    buffer.push_str("graph grid_topology {\n");
    for node in g.node_indices() {
        let label = sanitize_label(&g[node].id);
        buffer.push_str(&format!("  n{} [label=\"{}\"];\n", node.index(), label));
    }
    for edge in g.edge_references() {
        let source = edge.source().index();
        let target = edge.target().index();
        let weight = edge.weight().weight;
        buffer.push_str(&format!("  n{source} -- n{target} [weight={weight}];\n"));
    }
    buffer.push('}');
    buffer
}

fn sanitize_label(label: &str) -> String {
    label.replace('"', "\\\"")
}
