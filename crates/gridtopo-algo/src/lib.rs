//! # gridtopo-algo: Derived Topology Views of Distribution Grids
//!
//! This crate computes views of a grid that stay consistent with its elements:
//! weighted connectivity graphs, the predominant voltage level of a subnet,
//! per-subnet projections of a joint grid and node substitution that keeps
//! transformer ports co-located. Every operation is a pure function over the
//! immutable records of [`gridtopo_core`]; no power flow is computed here.
//!
//! ## Graphs
//!
//! | Function | Edge weight |
//! |----------|-------------|
//! | [`graph::distance_graph`] | Line length, haversine distance otherwise (m) |
//! | [`graph::impedance_graph`] | Impedance magnitude; closed switches only (Ω) |
//! | [`graph::topology_graph`] | 1 per connector |
//!
//! A grid the graph cannot represent (dangling node, self-loop, parallel
//! connectors) yields `None` instead of a partial graph.
//!
//! ## Sub grids
//!
//! - [`subnet_filter`]: projection of elements onto one subnet
//! - [`voltage_level`]: the one voltage level of a subnet
//! - [`subgrid`]: splitting a joint grid, linking and recombining sub grids
//!
//! ## Node substitution
//!
//! [`node_update::update_grid_with_nodes`] rebuilds a container around
//! replaced nodes and moves transformer-linked nodes along.
//!
//! ## Example
//!
//! ```ignore
//! use gridtopo_algo::{split_into_subgrids, impedance_graph, shortest_path_lengths};
//!
//! let subgrids = split_into_subgrids(&joint_grid)?;
//! for (subnet, subgrid) in &subgrids {
//!     println!("subnet {subnet}: {}", subgrid.predominant_voltage_level);
//!     if let Some(graph) = impedance_graph(&subgrid.raw_grid) {
//!         println!("  {} nodes, {} edges", graph.node_count(), graph.edge_count());
//!     }
//! }
//! ```

pub mod config;
pub mod graph;
pub mod impedance;
pub mod node_update;
pub mod subgrid;
pub mod subnet_filter;
pub mod switch_chain;
pub mod test_utils;
pub mod voltage_level;

pub use config::TopologyConfig;
pub use graph::{
    build_graph, distance_graph, export_graph, find_islands, graph_stats, impedance_graph,
    shortest_path_lengths, topology_graph, try_build_graph, ConnectorKind, GraphBuildError,
    GraphKind, GraphStats, IslandAnalysis, TopologyEdge, WeightedGraph,
};
pub use impedance::{calc_impedance, calc_impedance_per_length};
pub use node_update::{leading_geo_position, update_grid_with_nodes, NodeSubstitution};
pub use subgrid::{
    build_subgrid_topology, combine_to_joint_grid, split_into_subgrids,
    split_into_subgrids_with_config, with_trafo_node_as_slack, SubGridLink, SubGridTopologyGraph,
};
pub use subnet_filter::{
    filter_graphics_for_subnet, filter_participants_for_subnet, filter_raw_grid_for_subnet,
};
pub use switch_chain::{junction_nodes, traverse_along_switch_chain, traverse_switch_chain};
pub use voltage_level::predominant_voltage_level;
