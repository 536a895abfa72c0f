//! Weighted graph views of a grid.
//!
//! A [`WeightedGraph`] has one vertex per node and one edge per connector pair,
//! weighted by geodesic distance, impedance magnitude or plain hop count
//! depending on the [`GraphKind`]. Graphs are computed on demand from
//! [`RawGridElements`](gridtopo_core::RawGridElements) and never modified
//! afterwards:
//!
//! ```ignore
//! use gridtopo_algo::graph::{impedance_graph, shortest_path_lengths};
//!
//! if let Some(graph) = impedance_graph(&raw) {
//!     let from_slack = shortest_path_lengths(&graph, slack_node.uuid)?;
//!     println!("{} nodes reachable", from_slack.len());
//! }
//! ```
//!
//! - [`builder`] - Construction from grid elements
//! - [`analysis`] - Statistics, islands, shortest paths and DOT export

pub mod analysis;
pub mod builder;

use std::collections::HashMap;

use gridtopo_core::{Node, NodeId, Uuid};
use petgraph::graph::NodeIndex;
use petgraph::{Graph, Undirected};
use serde::{Deserialize, Serialize};

pub use analysis::{
    export_graph, find_islands, graph_stats, shortest_path_lengths, GraphStats, IslandAnalysis,
    IslandSummary, NodeAssignment,
};
pub use builder::{
    build_graph, distance_graph, impedance_graph, topology_graph, try_build_graph,
    GraphBuildError,
};

/// What the edge weights of a [`WeightedGraph`] measure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphKind {
    /// Metres: line length, haversine distance for everything else
    Distance,
    /// Ohms: impedance magnitude, a nominal weight for closed switches
    Impedance,
    /// Unit weight for every connector
    Topology,
}

/// Connector family an edge originates from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectorKind {
    Line,
    Switch,
    Transformer2W,
    Transformer3W,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TopologyEdge {
    /// Uuid of the connector this edge stands for
    pub connector: Uuid,
    pub kind: ConnectorKind,
    pub weight: f64,
}

/// Immutable weighted graph over grid nodes
#[derive(Debug, Clone)]
pub struct WeightedGraph {
    kind: GraphKind,
    graph: Graph<Node, TopologyEdge, Undirected>,
    index: HashMap<NodeId, NodeIndex>,
}

impl WeightedGraph {
    pub fn kind(&self) -> GraphKind {
        self.kind
    }

    /// The underlying petgraph graph, for use with `petgraph::algo`
    pub fn graph(&self) -> &Graph<Node, TopologyEdge, Undirected> {
        &self.graph
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn node_index(&self, node: NodeId) -> Option<NodeIndex> {
        self.index.get(&node).copied()
    }

    pub fn contains_node(&self, node: NodeId) -> bool {
        self.index.contains_key(&node)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.graph.node_weights()
    }

    /// Weight of the edge between two nodes, if they are adjacent
    pub fn edge_weight(&self, a: NodeId, b: NodeId) -> Option<f64> {
        let edge = self.graph.find_edge(self.node_index(a)?, self.node_index(b)?)?;
        self.graph.edge_weight(edge).map(|e| e.weight)
    }

    /// Ids of all nodes adjacent to `node`
    pub fn neighbors(&self, node: NodeId) -> Vec<NodeId> {
        match self.node_index(node) {
            Some(idx) => self
                .graph
                .neighbors(idx)
                .map(|n| self.graph[n].uuid)
                .collect(),
            None => Vec::new(),
        }
    }

    /// Uuids of the connectors behind the edges, in insertion order
    pub fn connector_uuids(&self) -> Vec<Uuid> {
        self.graph.edge_weights().map(|e| e.connector).collect()
    }
}
