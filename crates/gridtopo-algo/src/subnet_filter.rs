//! Projection of a joint grid onto a single subnet.
//!
//! Connectors are assigned to the subnet of their B port. Transformers also
//! drag their upstream nodes along, so the projection of a subnet still knows
//! where it is fed from. Connectors embed their nodes, so none of the filters
//! need the referenced nodes to be part of the input node set.

use std::collections::HashSet;

use gridtopo_core::{GraphicElements, Node, RawGridElements, SystemParticipants};
use tracing::debug;

/// Elements of `raw` that belong to `subnet`.
///
/// Nodes are the local ones in input order, then transformer ports inside the
/// subnet that the input node set lacks, then the foreign ports: A ports of
/// two-winding transformers feeding the subnet and the other ports of
/// three-winding transformers touching it. Applying the filter to its own
/// result for the same subnet returns that result unchanged.
pub fn filter_raw_grid_for_subnet(raw: &RawGridElements, subnet: i32) -> RawGridElements {
    let transformers_2w: Vec<_> = raw
        .transformers_2w
        .iter()
        .filter(|t| t.node_b.subnet == subnet)
        .cloned()
        .collect();
    let transformers_3w: Vec<_> = raw
        .transformers_3w
        .iter()
        .filter(|t| [&t.node_a, &t.node_b, &t.node_c].iter().any(|n| n.subnet == subnet))
        .cloned()
        .collect();

    let ports: Vec<&Node> = transformers_2w
        .iter()
        .flat_map(|t| [&t.node_a, &t.node_b])
        .chain(transformers_3w.iter().flat_map(|t| [&t.node_a, &t.node_b, &t.node_c]))
        .collect();

    let mut seen = HashSet::new();
    let mut nodes = Vec::new();
    let mut keep = |node: &Node| {
        if seen.insert(node.uuid) {
            nodes.push(node.clone());
        }
    };
    // ports in the subnet count as local even if the input node set lacks them
    raw.nodes.iter().filter(|n| n.subnet == subnet).for_each(&mut keep);
    ports.iter().copied().filter(|n| n.subnet == subnet).for_each(&mut keep);
    ports.iter().copied().filter(|n| n.subnet != subnet).for_each(&mut keep);

    let filtered = RawGridElements {
        nodes,
        lines: raw
            .lines
            .iter()
            .filter(|l| l.node_b.subnet == subnet)
            .cloned()
            .collect(),
        transformers_2w,
        transformers_3w,
        switches: raw
            .switches
            .iter()
            .filter(|s| s.node_b.subnet == subnet)
            .cloned()
            .collect(),
        measurement_units: raw
            .measurement_units
            .iter()
            .filter(|m| m.node.subnet == subnet)
            .cloned()
            .collect(),
    };

    debug!(
        subnet,
        nodes = filtered.nodes.len(),
        lines = filtered.lines.len(),
        switches = filtered.switches.len(),
        transformers = filtered.transformers_2w.len() + filtered.transformers_3w.len(),
        "filtered raw grid for subnet"
    );
    filtered
}

/// Participants connected to a node of `subnet`
pub fn filter_participants_for_subnet(
    participants: &SystemParticipants,
    subnet: i32,
) -> SystemParticipants {
    SystemParticipants {
        participants: participants
            .participants
            .iter()
            .filter(|p| p.node.subnet == subnet)
            .cloned()
            .collect(),
    }
}

/// Node graphics of local nodes and line graphics of lines whose B port is local
pub fn filter_graphics_for_subnet(graphics: &GraphicElements, subnet: i32) -> GraphicElements {
    GraphicElements {
        node_graphics: graphics
            .node_graphics
            .iter()
            .filter(|g| g.node.subnet == subnet)
            .cloned()
            .collect(),
        line_graphics: graphics
            .line_graphics
            .iter()
            .filter(|g| g.line.node_b.subnet == subnet)
            .cloned()
            .collect(),
    }
}
