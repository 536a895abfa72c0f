//! Walking chains of closed switches.
//!
//! Switches are modelled as zero-extent, near-zero-impedance connectors, so a
//! node reached only through closed switches is electrically the same place as
//! where the walk started. The walk follows the chain until it reaches a
//! *junction* (a node that a line or transformer attaches to) or runs out of
//! switches. Branching chains are not supported and are reported as a
//! structural inconsistency.

use std::collections::HashSet;

use gridtopo_core::{Connector, GridError, GridResult, Node, NodeId, RawGridElements, Switch};
use tracing::debug;

/// Nodes touched by any line or transformer (all three ports of 3W transformers).
pub fn junction_nodes(raw: &RawGridElements) -> HashSet<NodeId> {
    raw.lines
        .iter()
        .map(|l| l as &dyn Connector)
        .chain(raw.transformers_2w.iter().map(|t| t as &dyn Connector))
        .chain(raw.transformers_3w.iter().map(|t| t as &dyn Connector))
        .flat_map(|c| c.all_nodes().into_iter().map(|n| n.uuid))
        .collect()
}

/// Walk from `start` along the closed switches of `raw`, stopping at the
/// first node a line or transformer attaches to.
pub fn traverse_along_switch_chain(
    start: &Node,
    raw: &RawGridElements,
) -> GridResult<Vec<Node>> {
    traverse_switch_chain(start, &raw.switches, &junction_nodes(raw))
}

/// Walk from `start` along closed `switches` until a node in `junctions` or a
/// dead end is reached.
///
/// The result starts with `start` and lists the nodes in visiting order. The
/// start node itself is never treated as a junction. Every switch is used at
/// most once and no node is entered twice, so the walk terminates on cyclic
/// switch arrangements as well.
///
/// # Errors
///
/// [`GridError::StructuralInconsistency`] if more than one unused closed
/// switch leaves the current node.
pub fn traverse_switch_chain(
    start: &Node,
    switches: &[Switch],
    junctions: &HashSet<NodeId>,
) -> GridResult<Vec<Node>> {
    let mut remaining: Vec<&Switch> = switches.iter().filter(|s| s.closed).collect();
    let mut visited: HashSet<NodeId> = HashSet::from([start.uuid]);
    let mut path = vec![start.clone()];
    let mut current = start;

    loop {
        let incident: Vec<(usize, &Node)> = remaining
            .iter()
            .copied()
            .enumerate()
            .filter_map(|(i, s)| s.other_end(current.uuid).map(|n| (i, n)))
            .collect();

        let next = match incident.as_slice() {
            [] => break,
            [(idx, next)] => {
                remaining.swap_remove(*idx);
                *next
            }
            branches => {
                return Err(GridError::structural(format!(
                    "cannot traverse along switch chain: {} switches branch off at node '{}' ({})",
                    branches.len(),
                    current.id,
                    current.uuid
                )));
            }
        };

        if !visited.insert(next.uuid) {
            break;
        }
        path.push(next.clone());
        if junctions.contains(&next.uuid) {
            break;
        }
        current = next;
    }

    debug!(start = %start.id, visited = path.len(), "traversed switch chain");
    Ok(path)
}
