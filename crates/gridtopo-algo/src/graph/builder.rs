//! Construction of [`WeightedGraph`]s from grid elements.
//!
//! Every node becomes a vertex first, then connectors are turned into edges:
//!
//! | Connector | Distance weight (m) | Impedance weight (Ω) |
//! |-----------|---------------------|----------------------|
//! | Line | line length | `\|Z\|` of `(r·l, x·l)` |
//! | Switch | haversine distance | closed only, fixed nominal weight |
//! | Transformer2W | haversine distance | `\|Z\|` of `(r_sc, x_sc)` |
//! | Transformer3W | A-B, A-C haversine | A-B: `\|Z\|` of `(r_a+r_b, x_a+x_b)`, A-C likewise |
//!
//! The graph rejects self-loops, parallel edges and edges to nodes outside
//! the node set. Any rejection aborts the build: [`try_build_graph`] reports
//! why, the `Option` returning wrappers log it and hand back `None`.
//!
//! Edge weights of sibling elements are independent, so with the `parallel`
//! feature they are computed on the rayon pool. Insertion into the graph
//! always happens on the calling thread in input order.

use std::collections::HashMap;

use gridtopo_core::geo_utils::haversine_distance;
use gridtopo_core::{
    Connector, GridError, Line, Node, NodeId, RawGridElements, Switch, Transformer2W,
    Transformer3W,
};
use petgraph::graph::NodeIndex;
use petgraph::Graph;
use thiserror::Error;
use tracing::{debug, warn};

use super::{ConnectorKind, GraphKind, TopologyEdge, WeightedGraph};
use crate::config::TopologyConfig;
use crate::impedance::{calc_impedance, calc_impedance_per_length};

/// Reasons a graph cannot represent the given grid
#[derive(Debug, Error, PartialEq)]
pub enum GraphBuildError {
    #[error("{connector} references node {node} which is not part of the node set")]
    MissingNode { connector: String, node: NodeId },

    #[error("{connector} connects node {node} to itself")]
    SelfLoop { connector: String, node: NodeId },

    #[error("{connector} duplicates an existing edge between {a} and {b}")]
    DuplicateEdge {
        connector: String,
        a: NodeId,
        b: NodeId,
    },
}

impl From<GraphBuildError> for GridError {
    fn from(err: GraphBuildError) -> Self {
        GridError::IncompleteTopology(err.to_string())
    }
}

/// An edge whose weight is known but which is not yet inserted
struct PlannedEdge {
    label: String,
    a: NodeId,
    b: NodeId,
    edge: TopologyEdge,
}

impl PlannedEdge {
    fn new(
        connector: &dyn Connector,
        kind: ConnectorKind,
        a: &Node,
        b: &Node,
        weight: f64,
    ) -> Self {
        Self {
            label: connector.label(),
            a: a.uuid,
            b: b.uuid,
            edge: TopologyEdge {
                connector: connector.connector_uuid(),
                kind,
                weight,
            },
        }
    }
}

/// Accumulates vertices and edges; only [`GraphBuilder::finish`] hands out a graph
struct GraphBuilder {
    kind: GraphKind,
    graph: Graph<Node, TopologyEdge, petgraph::Undirected>,
    index: HashMap<NodeId, NodeIndex>,
}

impl GraphBuilder {
    fn with_nodes(kind: GraphKind, nodes: &[Node]) -> Self {
        let mut graph = Graph::with_capacity(nodes.len(), nodes.len());
        let mut index = HashMap::with_capacity(nodes.len());
        for node in nodes {
            index
                .entry(node.uuid)
                .or_insert_with(|| graph.add_node(node.clone()));
        }
        Self { kind, graph, index }
    }

    fn add_edge(&mut self, planned: PlannedEdge) -> Result<(), GraphBuildError> {
        let a = self.vertex(&planned.label, planned.a)?;
        let b = self.vertex(&planned.label, planned.b)?;
        if a == b {
            return Err(GraphBuildError::SelfLoop {
                connector: planned.label,
                node: planned.a,
            });
        }
        if self.graph.find_edge(a, b).is_some() {
            return Err(GraphBuildError::DuplicateEdge {
                connector: planned.label,
                a: planned.a,
                b: planned.b,
            });
        }
        self.graph.add_edge(a, b, planned.edge);
        Ok(())
    }

    fn vertex(&self, label: &str, node: NodeId) -> Result<NodeIndex, GraphBuildError> {
        self.index
            .get(&node)
            .copied()
            .ok_or_else(|| GraphBuildError::MissingNode {
                connector: label.to_string(),
                node,
            })
    }

    fn finish(self) -> WeightedGraph {
        WeightedGraph {
            kind: self.kind,
            graph: self.graph,
            index: self.index,
        }
    }
}

/// Distance-weighted graph (metres) with the default configuration
pub fn distance_graph(raw: &RawGridElements) -> Option<WeightedGraph> {
    build_graph(raw, GraphKind::Distance, &TopologyConfig::default())
}

/// Impedance-weighted graph (ohms) with the default configuration
pub fn impedance_graph(raw: &RawGridElements) -> Option<WeightedGraph> {
    build_graph(raw, GraphKind::Impedance, &TopologyConfig::default())
}

/// Unit-weighted graph of every connector, open switches included
pub fn topology_graph(raw: &RawGridElements) -> Option<WeightedGraph> {
    build_graph(raw, GraphKind::Topology, &TopologyConfig::default())
}

/// Build a graph, or `None` if the grid's topology cannot be represented.
pub fn build_graph(
    raw: &RawGridElements,
    kind: GraphKind,
    config: &TopologyConfig,
) -> Option<WeightedGraph> {
    match try_build_graph(raw, kind, config) {
        Ok(graph) => Some(graph),
        Err(err) => {
            warn!(?kind, error = %err, "no topology graph for incomplete grid");
            None
        }
    }
}

/// Build a graph, reporting the first connector the graph rejects.
pub fn try_build_graph(
    raw: &RawGridElements,
    kind: GraphKind,
    config: &TopologyConfig,
) -> Result<WeightedGraph, GraphBuildError> {
    let mut builder = GraphBuilder::with_nodes(kind, &raw.nodes);

    let parallel = config.parallel;
    let planned = plan_edges(&raw.lines, parallel, |l| plan_line(l, kind))
        .into_iter()
        .chain(plan_edges(&raw.switches, parallel, |s| {
            plan_switch(s, kind, config)
        }))
        .chain(plan_edges(&raw.transformers_2w, parallel, |t| {
            plan_transformer_2w(t, kind)
        }))
        .chain(plan_edges(&raw.transformers_3w, parallel, |t| {
            plan_transformer_3w(t, kind)
        }));

    for edge in planned {
        builder.add_edge(edge)?;
    }

    let graph = builder.finish();
    debug!(
        ?kind,
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "built topology graph"
    );
    Ok(graph)
}

#[cfg(feature = "parallel")]
fn plan_edges<T, F>(items: &[T], parallel: bool, plan: F) -> Vec<PlannedEdge>
where
    T: Sync,
    F: Fn(&T) -> Vec<PlannedEdge> + Sync + Send,
{
    use rayon::prelude::*;

    if parallel {
        items.par_iter().flat_map_iter(|item| plan(item)).collect()
    } else {
        items.iter().flat_map(|item| plan(item)).collect()
    }
}

#[cfg(not(feature = "parallel"))]
fn plan_edges<T, F>(items: &[T], _parallel: bool, plan: F) -> Vec<PlannedEdge>
where
    F: Fn(&T) -> Vec<PlannedEdge>,
{
    items.iter().flat_map(|item| plan(item)).collect()
}

fn plan_line(line: &Line, kind: GraphKind) -> Vec<PlannedEdge> {
    let weight = match kind {
        GraphKind::Distance => line.length.to_metres().value(),
        GraphKind::Impedance => {
            calc_impedance_per_length(line.line_type.r, line.line_type.x, line.length).value()
        }
        GraphKind::Topology => 1.0,
    };
    vec![PlannedEdge::new(
        line,
        ConnectorKind::Line,
        &line.node_a,
        &line.node_b,
        weight,
    )]
}

fn plan_switch(switch: &Switch, kind: GraphKind, config: &TopologyConfig) -> Vec<PlannedEdge> {
    let weight = match kind {
        GraphKind::Distance => {
            haversine_distance(&switch.node_a.geo_position, &switch.node_b.geo_position).value()
        }
        GraphKind::Impedance if !switch.closed && config.skip_open_switches => return Vec::new(),
        GraphKind::Impedance => config.switch_impedance_ohm,
        GraphKind::Topology => 1.0,
    };
    vec![PlannedEdge::new(
        switch,
        ConnectorKind::Switch,
        &switch.node_a,
        &switch.node_b,
        weight,
    )]
}

fn plan_transformer_2w(trafo: &Transformer2W, kind: GraphKind) -> Vec<PlannedEdge> {
    let weight = match kind {
        GraphKind::Distance => {
            haversine_distance(&trafo.node_a.geo_position, &trafo.node_b.geo_position).value()
        }
        GraphKind::Impedance => {
            calc_impedance(trafo.transformer_type.r_sc, trafo.transformer_type.x_sc).value()
        }
        GraphKind::Topology => 1.0,
    };
    vec![PlannedEdge::new(
        trafo,
        ConnectorKind::Transformer2W,
        &trafo.node_a,
        &trafo.node_b,
        weight,
    )]
}

fn plan_transformer_3w(trafo: &Transformer3W, kind: GraphKind) -> Vec<PlannedEdge> {
    let t = &trafo.transformer_type;
    let (weight_ab, weight_ac) = match kind {
        GraphKind::Distance => (
            haversine_distance(&trafo.node_a.geo_position, &trafo.node_b.geo_position).value(),
            haversine_distance(&trafo.node_a.geo_position, &trafo.node_c.geo_position).value(),
        ),
        GraphKind::Impedance => (
            calc_impedance(t.r_sc_a + t.r_sc_b, t.x_sc_a + t.x_sc_b).value(),
            calc_impedance(t.r_sc_a + t.r_sc_c, t.x_sc_a + t.x_sc_c).value(),
        ),
        GraphKind::Topology => (1.0, 1.0),
    };
    vec![
        PlannedEdge::new(
            trafo,
            ConnectorKind::Transformer3W,
            &trafo.node_a,
            &trafo.node_b,
            weight_ab,
        ),
        PlannedEdge::new(
            trafo,
            ConnectorKind::Transformer3W,
            &trafo.node_a,
            &trafo.node_c,
            weight_ac,
        ),
    ]
}
