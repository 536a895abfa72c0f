//! Decomposing a joint grid into per-subnet sub grids and back.
//!
//! A [`SubGridContainer`] is the projection of a joint grid onto one subnet
//! together with its predominant voltage level. Transformers between subnets
//! become edges of a directed [`SubGridTopologyGraph`], pointing from the
//! subnet of the upstream port (A) downwards.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::hash::Hash;

use gridtopo_core::{
    GraphicElements, GridError, GridResult, JointGridContainer, Node, NodeId, RawGridElements,
    SubGridContainer, SystemParticipants, TransformerId,
};
use petgraph::graph::NodeIndex;
use petgraph::{Directed, Direction, Graph};
use tracing::{debug, info, warn};

use crate::config::TopologyConfig;
use crate::node_update::NodeReplacer;
use crate::subnet_filter::{
    filter_graphics_for_subnet, filter_participants_for_subnet, filter_raw_grid_for_subnet,
};
use crate::voltage_level::predominant_voltage_level;

/// Project `grid` onto each of its subnets.
pub fn split_into_subgrids(
    grid: &JointGridContainer,
) -> GridResult<BTreeMap<i32, SubGridContainer>> {
    split_into_subgrids_with_config(grid, &TopologyConfig::default())
}

/// Project `grid` onto each of its subnets; with `config.parallel` the
/// subnets are processed on the rayon pool.
///
/// # Errors
///
/// Fails with the first subnet whose predominant voltage level cannot be
/// determined.
pub fn split_into_subgrids_with_config(
    grid: &JointGridContainer,
    config: &TopologyConfig,
) -> GridResult<BTreeMap<i32, SubGridContainer>> {
    let subnets = grid.raw_grid.subnets();
    let subgrids = map_subnets(&subnets, config.parallel, |subnet| sub_grid(grid, subnet))?;
    info!(
        grid = %grid.grid_name,
        subgrids = subgrids.len(),
        "split joint grid into sub grids"
    );
    Ok(subnets.into_iter().zip(subgrids).collect())
}

fn sub_grid(grid: &JointGridContainer, subnet: i32) -> GridResult<SubGridContainer> {
    let raw_grid = filter_raw_grid_for_subnet(&grid.raw_grid, subnet);
    let predominant_voltage_level = predominant_voltage_level(&raw_grid, subnet)?;
    Ok(SubGridContainer {
        grid_name: grid.grid_name.clone(),
        subnet,
        predominant_voltage_level,
        raw_grid,
        system_participants: filter_participants_for_subnet(&grid.system_participants, subnet),
        graphics: filter_graphics_for_subnet(&grid.graphics, subnet),
    })
}

#[cfg(feature = "parallel")]
fn map_subnets<F>(subnets: &[i32], parallel: bool, f: F) -> GridResult<Vec<SubGridContainer>>
where
    F: Fn(i32) -> GridResult<SubGridContainer> + Sync + Send,
{
    use rayon::prelude::*;

    if parallel {
        subnets.par_iter().map(|s| f(*s)).collect()
    } else {
        subnets.iter().map(|s| f(*s)).collect()
    }
}

#[cfg(not(feature = "parallel"))]
fn map_subnets<F>(subnets: &[i32], _parallel: bool, f: F) -> GridResult<Vec<SubGridContainer>>
where
    F: Fn(i32) -> GridResult<SubGridContainer>,
{
    subnets.iter().map(|s| f(*s)).collect()
}

/// A transformer between two sub grids
#[derive(Debug, Clone, PartialEq)]
pub struct SubGridLink {
    pub transformer: TransformerId,
    pub transformer_id: String,
}

/// Directed graph of sub grids (vertex weight: subnet number) linked by
/// transformers, upstream to downstream
#[derive(Debug, Clone)]
pub struct SubGridTopologyGraph {
    graph: Graph<i32, SubGridLink, Directed>,
    index: HashMap<i32, NodeIndex>,
}

impl SubGridTopologyGraph {
    pub fn graph(&self) -> &Graph<i32, SubGridLink, Directed> {
        &self.graph
    }

    pub fn subgrid_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn link_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Subnets feeding `subnet`, ascending
    pub fn upstream_of(&self, subnet: i32) -> Vec<i32> {
        self.adjacent(subnet, Direction::Incoming)
    }

    /// Subnets fed by `subnet`, ascending
    pub fn downstream_of(&self, subnet: i32) -> Vec<i32> {
        self.adjacent(subnet, Direction::Outgoing)
    }

    /// Transformers pointing from `from` to `to`
    pub fn links_between(&self, from: i32, to: i32) -> Vec<&SubGridLink> {
        let (Some(a), Some(b)) = (self.index.get(&from), self.index.get(&to)) else {
            return Vec::new();
        };
        self.graph
            .edges_connecting(*a, *b)
            .map(|e| e.weight())
            .collect()
    }

    fn adjacent(&self, subnet: i32, direction: Direction) -> Vec<i32> {
        let Some(idx) = self.index.get(&subnet) else {
            return Vec::new();
        };
        let mut subnets: Vec<i32> = self
            .graph
            .neighbors_directed(*idx, direction)
            .map(|n| self.graph[n])
            .collect();
        subnets.sort_unstable();
        subnets.dedup();
        subnets
    }
}

/// Link sub grids by the transformers they contain.
///
/// Every transformer contributes one edge from the sub grid of its A port to
/// the sub grid of its B port (three-winding transformers also to the one of
/// port C). A transformer shared by several sub grids is counted once.
///
/// # Errors
///
/// [`GridError::StructuralInconsistency`] if a transformer port lies in a
/// subnet with no sub grid.
pub fn build_subgrid_topology(
    subgrids: &BTreeMap<i32, SubGridContainer>,
) -> GridResult<SubGridTopologyGraph> {
    let mut graph = Graph::new();
    let index: HashMap<i32, NodeIndex> = subgrids
        .keys()
        .map(|subnet| (*subnet, graph.add_node(*subnet)))
        .collect();
    let mut seen = HashSet::new();
    for subgrid in subgrids.values() {
        let raw = &subgrid.raw_grid;
        let two_winding = raw
            .transformers_2w
            .iter()
            .map(|t| (t.uuid, t.id.as_str(), &t.node_a, vec![&t.node_b]));
        let three_winding = raw
            .transformers_3w
            .iter()
            .map(|t| (t.uuid, t.id.as_str(), &t.node_a, vec![&t.node_b, &t.node_c]));

        for (uuid, id, node_a, downstream) in two_winding.chain(three_winding) {
            if !seen.insert(uuid) {
                continue;
            }
            let from = index.get(&node_a.subnet).copied().ok_or_else(|| {
                GridError::structural(format!(
                    "missing most upstream node '{}' of transformer '{id}': subnet {} has no sub grid",
                    node_a.id, node_a.subnet
                ))
            })?;
            for node in downstream {
                let to = index.get(&node.subnet).copied().ok_or_else(|| {
                    GridError::structural(format!(
                        "transformer '{id}' connects node '{}' in subnet {}, which has no sub grid",
                        node.id, node.subnet
                    ))
                })?;
                if from == to {
                    warn!(transformer = id, subnet = node.subnet, "transformer within one subnet");
                    continue;
                }
                graph.add_edge(
                    from,
                    to,
                    SubGridLink {
                        transformer: uuid,
                        transformer_id: id.to_string(),
                    },
                );
            }
        }
    }

    debug!(
        subgrids = graph.node_count(),
        links = graph.edge_count(),
        "built sub grid topology"
    );
    Ok(SubGridTopologyGraph { graph, index })
}

/// Merge sub grids into one joint grid named after the first of them.
///
/// Elements shared by several sub grids (transformers and their upstream
/// nodes) appear once, in the position they are first seen.
pub fn combine_to_joint_grid(subgrids: &[SubGridContainer]) -> GridResult<JointGridContainer> {
    let first = subgrids.first().ok_or_else(|| {
        GridError::structural("cannot combine an empty collection of sub grids to a joint grid")
    })?;
    let raws = || subgrids.iter().map(|s| &s.raw_grid);

    let raw_grid = RawGridElements {
        nodes: dedup_by_uuid(raws().flat_map(|r| &r.nodes), |n| n.uuid),
        lines: dedup_by_uuid(raws().flat_map(|r| &r.lines), |l| l.uuid),
        transformers_2w: dedup_by_uuid(raws().flat_map(|r| &r.transformers_2w), |t| t.uuid),
        transformers_3w: dedup_by_uuid(raws().flat_map(|r| &r.transformers_3w), |t| t.uuid),
        switches: dedup_by_uuid(raws().flat_map(|r| &r.switches), |s| s.uuid),
        measurement_units: dedup_by_uuid(raws().flat_map(|r| &r.measurement_units), |m| m.uuid),
    };
    let system_participants = SystemParticipants {
        participants: dedup_by_uuid(
            subgrids
                .iter()
                .flat_map(|s| &s.system_participants.participants),
            |p| p.uuid,
        ),
    };
    let graphics = GraphicElements {
        node_graphics: dedup_by_uuid(
            subgrids.iter().flat_map(|s| &s.graphics.node_graphics),
            |g| g.uuid,
        ),
        line_graphics: dedup_by_uuid(
            subgrids.iter().flat_map(|s| &s.graphics.line_graphics),
            |g| g.uuid,
        ),
    };

    debug!(subgrids = subgrids.len(), nodes = raw_grid.nodes.len(), "combined sub grids");
    Ok(JointGridContainer::new(
        first.grid_name.clone(),
        raw_grid,
        system_participants,
        graphics,
    ))
}

fn dedup_by_uuid<'a, T, K, I>(items: I, key: impl Fn(&T) -> K) -> Vec<T>
where
    T: Clone + 'a,
    K: Hash + Eq,
    I: IntoIterator<Item = &'a T>,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(key(*item)))
        .cloned()
        .collect()
}

/// Copy of `subgrid` whose feeding transformer ports are slack nodes.
///
/// The A port of every transformer whose A side lies outside the sub grid's
/// subnet is marked as slack, in every element referencing it.
pub fn with_trafo_node_as_slack(subgrid: &SubGridContainer) -> SubGridContainer {
    let raw = &subgrid.raw_grid;
    let slack_nodes: HashMap<NodeId, Node> = raw
        .transformers_2w
        .iter()
        .map(|t| &t.node_a)
        .chain(raw.transformers_3w.iter().map(|t| &t.node_a))
        .filter(|n| n.subnet != subgrid.subnet)
        .map(|n| (n.uuid, n.clone().with_slack(true)))
        .collect();

    debug!(
        subnet = subgrid.subnet,
        slack_nodes = slack_nodes.len(),
        "marking transformer nodes as slack"
    );
    NodeReplacer::new(&slack_nodes).sub_grid(subgrid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;
    use gridtopo_core::{ParticipantKind, SystemParticipant};

    /// hv(1) -t1- a(2) -l- b(2) -t2- c(3)
    fn joint_grid() -> JointGridContainer {
        let hv = hv_node("hv", 1, 51.0, 7.0);
        let hv2 = hv_node("hv2", 1, 51.1, 7.0);
        let a = mv_node("a", 2, 51.0, 7.0);
        let b = mv_node("b", 2, 51.01, 7.0);
        let c = lv_node("c", 3, 51.01, 7.0);
        let raw = raw_grid(
            vec![hv.clone(), hv2.clone(), a.clone(), b.clone(), c.clone()],
            vec![
                line("hl", &hv, &hv2, 0.1, 0.4, 11.0),
                line("l", &a, &b, 0.2, 0.1, 1.0),
            ],
            vec![],
            vec![
                transformer_2w("t1", &hv, &a, 1.0, 1.0),
                transformer_2w("t2", &b, &c, 1.0, 1.0),
            ],
            vec![],
        );
        let participants = SystemParticipants {
            participants: vec![SystemParticipant::new("load", ParticipantKind::Load, c)],
        };
        JointGridContainer::new("joint", raw, participants, GraphicElements::default())
    }

    #[test]
    fn test_split_into_subgrids() {
        let subgrids = split_into_subgrids(&joint_grid()).unwrap();
        assert_eq!(subgrids.keys().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(subgrids[&1].predominant_voltage_level, hv_level());
        assert_eq!(subgrids[&2].predominant_voltage_level, mv_level());
        assert_eq!(subgrids[&3].predominant_voltage_level, lv_level());
        assert_eq!(subgrids[&3].system_participants.participants.len(), 1);
        assert_eq!(subgrids[&2].grid_name, "joint");
    }

    #[test]
    fn test_split_sequential_matches_parallel() {
        let grid = joint_grid();
        let sequential = TopologyConfig {
            parallel: false,
            ..TopologyConfig::default()
        };
        assert_eq!(
            split_into_subgrids_with_config(&grid, &sequential).unwrap(),
            split_into_subgrids(&grid).unwrap()
        );
    }

    #[test]
    fn test_subgrid_topology_points_downstream() {
        let subgrids = split_into_subgrids(&joint_grid()).unwrap();
        let topology = build_subgrid_topology(&subgrids).unwrap();

        assert_eq!(topology.subgrid_count(), 3);
        assert_eq!(topology.link_count(), 2);
        assert_eq!(topology.downstream_of(1), vec![2]);
        assert_eq!(topology.upstream_of(3), vec![2]);
        assert!(topology.upstream_of(1).is_empty());
        assert_eq!(topology.links_between(1, 2)[0].transformer_id, "t1");
        assert!(topology.links_between(2, 1).is_empty());
    }

    #[test]
    fn test_subgrid_topology_with_three_winding_transformer() {
        let hv = hv_node("hv", 1, 51.0, 7.0);
        let mv = mv_node("mv", 2, 51.0, 7.0);
        let lv = lv_node("lv", 3, 51.0, 7.0);
        let t3 = transformer_3w("t3", &hv, &mv, &lv);
        let grid = JointGridContainer::new(
            "joint",
            raw_grid(vec![hv, mv, lv], vec![], vec![], vec![], vec![t3]),
            SystemParticipants::default(),
            GraphicElements::default(),
        );

        let subgrids = split_into_subgrids(&grid).unwrap();
        let topology = build_subgrid_topology(&subgrids).unwrap();
        assert_eq!(topology.link_count(), 2);
        assert_eq!(topology.downstream_of(1), vec![2, 3]);
    }

    #[test]
    fn test_missing_upstream_subgrid_is_rejected() {
        init_tracing();
        let mut subgrids = split_into_subgrids(&joint_grid()).unwrap();
        subgrids.remove(&1);

        let err = build_subgrid_topology(&subgrids).unwrap_err();
        assert!(
            matches!(err, GridError::StructuralInconsistency(ref m) if m.contains("most upstream")),
            "got {err:?}"
        );
    }

    #[test]
    fn test_combine_restores_joint_grid() {
        let grid = joint_grid();
        let subgrids: Vec<_> = split_into_subgrids(&grid).unwrap().into_values().collect();

        let combined = combine_to_joint_grid(&subgrids).unwrap();
        assert_eq!(combined.grid_name, "joint");
        assert_eq!(combined.raw_grid.nodes.len(), grid.raw_grid.nodes.len());
        assert_eq!(combined.raw_grid.lines.len(), 2);
        assert_eq!(combined.raw_grid.transformers_2w.len(), 2);
        assert_eq!(combined.system_participants, grid.system_participants);

        assert!(matches!(
            combine_to_joint_grid(&[]),
            Err(GridError::StructuralInconsistency(_))
        ));
    }

    #[test]
    fn test_with_trafo_node_as_slack() {
        let subgrids = split_into_subgrids(&joint_grid()).unwrap();
        let mv = with_trafo_node_as_slack(&subgrids[&2]);

        let slack: Vec<_> = mv.raw_grid.nodes.iter().filter(|n| n.slack).collect();
        assert_eq!(slack.len(), 1);
        assert_eq!(slack[0].id, "hv");
        assert!(mv.raw_grid.transformers_2w[0].node_a.slack);
        assert!(!mv.raw_grid.transformers_2w[0].node_b.slack);
        assert_eq!(mv.predominant_voltage_level, subgrids[&2].predominant_voltage_level);

        // the top-level sub grid is not fed by any transformer
        assert_eq!(with_trafo_node_as_slack(&subgrids[&1]), subgrids[&1]);
    }
}
