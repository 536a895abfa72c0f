//! Substituting nodes throughout a grid container.
//!
//! Connectors embed copies of their nodes, so replacing a node means rebuilding
//! every element that references it. Transformers have no physical extent:
//! all nodes linked by transformers must share one position. Moving any of
//! them moves the whole transformer-linked group to a single *leading*
//! position.
//!
//! ```ignore
//! let moved = substation_node.clone().with_geo_position(position(51.52, 7.45));
//! let substitution = NodeSubstitution::from_iter([(substation_node, moved)]);
//! let updated = update_grid_with_nodes(&grid, &substitution);
//! ```
//!
//! The substitution is trusted. Mapping a node onto itself or two nodes onto
//! one replacement is not detected; the result is deterministic but most
//! likely not what the caller wants.

use std::collections::{BTreeMap, HashMap};

use gridtopo_core::geo_utils::{line_length, line_string_between};
use gridtopo_core::{
    Connector, GeoPosition, GraphicElements, GridContainer, JointGridContainer, Line, LineGraphic,
    LineId, Node, NodeGraphic, NodeId, RawGridElements, SubGridContainer, SystemParticipants,
};
use tracing::debug;

/// Explicit old → new node mapping, keyed by the old node's uuid
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeSubstitution {
    entries: BTreeMap<NodeId, (Node, Node)>,
}

impl NodeSubstitution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace `old` by `new`. A later insert for the same old node wins.
    pub fn insert(&mut self, old: Node, new: Node) {
        self.entries.insert(old.uuid, (old, new));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, old: NodeId) -> bool {
        self.entries.contains_key(&old)
    }

    /// Replacement for the node with uuid `old`
    pub fn replacement(&self, old: NodeId) -> Option<&Node> {
        self.entries.get(&old).map(|(_, new)| new)
    }

    /// `(old, new)` pairs ordered by old uuid
    pub fn iter(&self) -> impl Iterator<Item = (&Node, &Node)> {
        self.entries.values().map(|(old, new)| (old, new))
    }
}

impl FromIterator<(Node, Node)> for NodeSubstitution {
    fn from_iter<I: IntoIterator<Item = (Node, Node)>>(iter: I) -> Self {
        let mut substitution = NodeSubstitution::new();
        for (old, new) in iter {
            substitution.insert(old, new);
        }
        substitution
    }
}

/// Rebuild `grid` with every node of `substitution` replaced.
///
/// Nodes linked to a replaced node through one or more transformers are moved
/// to the leading position (see [`leading_geo_position`]) along with it. Lines
/// whose end points moved get a straight geometry between the new positions
/// and the matching haversine length. A sub grid keeps its subnet and voltage
/// level.
///
/// When one call affects several unrelated transformer groups, all of them
/// are moved to the same leading position.
pub fn update_grid_with_nodes(
    grid: &GridContainer,
    substitution: &NodeSubstitution,
) -> GridContainer {
    if substitution.is_empty() {
        return grid.clone();
    }

    let mut replacements: HashMap<NodeId, Node> = substitution
        .iter()
        .map(|(old, new)| (old.uuid, new.clone()))
        .collect();

    let linked = transformer_linked_nodes(grid.raw_grid(), substitution);
    if let Some(leading) = leading_geo_position(substitution) {
        for (uuid, node) in linked {
            let mut moved = replacements.remove(&uuid).unwrap_or(node);
            moved.geo_position = leading;
            replacements.insert(uuid, moved);
        }
    }

    debug!(
        mapped = substitution.len(),
        replaced = replacements.len(),
        "updating grid with substituted nodes"
    );
    NodeReplacer::new(&replacements).grid_container(grid)
}

/// Position imposed on every transformer-linked node.
///
/// That is the replacement position of the mapped node with the highest
/// nominal voltage; equal voltages go to the smallest old uuid. With a single
/// entry this is simply that entry's replacement position.
pub fn leading_geo_position(substitution: &NodeSubstitution) -> Option<GeoPosition> {
    substitution
        .iter()
        .max_by(|(a, _), (b, _)| {
            a.nominal_voltage()
                .value()
                .total_cmp(&b.nominal_voltage().value())
                .then_with(|| b.uuid.cmp(&a.uuid))
        })
        .map(|(_, new)| new.geo_position)
}

/// All transformer ports reachable from the mapped nodes by hopping across
/// transformers, keyed by uuid and holding the original node.
///
/// Each round absorbs every transformer touching the set found so far;
/// rounds repeat until one absorbs nothing.
fn transformer_linked_nodes(
    raw: &RawGridElements,
    substitution: &NodeSubstitution,
) -> HashMap<NodeId, Node> {
    let mut pending: Vec<Vec<&Node>> = raw
        .transformers_2w
        .iter()
        .map(|t| t.all_nodes())
        .chain(raw.transformers_3w.iter().map(|t| t.all_nodes()))
        .collect();
    let mut linked: HashMap<NodeId, Node> = HashMap::new();
    let mut rounds = 0;

    loop {
        rounds += 1;
        let before = linked.len();
        pending.retain(|ports| {
            let touched = ports
                .iter()
                .any(|n| substitution.contains(n.uuid) || linked.contains_key(&n.uuid));
            if touched {
                for node in ports {
                    linked.entry(node.uuid).or_insert_with(|| (*node).clone());
                }
            }
            !touched
        });
        if linked.len() == before {
            break;
        }
    }

    debug!(rounds, nodes = linked.len(), "collected transformer-linked nodes");
    linked
}

/// Plain node substitution over all elements of a container.
///
/// Nodes not in the replacement map are kept as they are. No positions are
/// propagated.
pub(crate) struct NodeReplacer<'a> {
    replacements: &'a HashMap<NodeId, Node>,
}

impl<'a> NodeReplacer<'a> {
    pub(crate) fn new(replacements: &'a HashMap<NodeId, Node>) -> Self {
        Self { replacements }
    }

    fn touches(&self, node: &Node) -> bool {
        self.replacements.contains_key(&node.uuid)
    }

    fn node(&self, node: &Node) -> Node {
        self.replacements
            .get(&node.uuid)
            .cloned()
            .unwrap_or_else(|| node.clone())
    }

    fn line(&self, line: &Line) -> Line {
        if !self.touches(&line.node_a) && !self.touches(&line.node_b) {
            return line.clone();
        }
        let node_a = self.node(&line.node_a);
        let node_b = self.node(&line.node_b);
        let moved = node_a.geo_position != line.node_a.geo_position
            || node_b.geo_position != line.node_b.geo_position;
        let (geo_position, length) = if moved {
            let geometry = line_string_between(&node_a.geo_position, &node_b.geo_position);
            let length = line_length(&geometry);
            (geometry, length)
        } else {
            (line.geo_position.clone(), line.length)
        };
        Line {
            node_a,
            node_b,
            geo_position,
            length,
            ..line.clone()
        }
    }

    pub(crate) fn raw_grid(&self, raw: &RawGridElements) -> RawGridElements {
        RawGridElements {
            nodes: raw.nodes.iter().map(|n| self.node(n)).collect(),
            lines: raw.lines.iter().map(|l| self.line(l)).collect(),
            transformers_2w: raw
                .transformers_2w
                .iter()
                .map(|t| {
                    let mut trafo = t.clone();
                    trafo.node_a = self.node(&t.node_a);
                    trafo.node_b = self.node(&t.node_b);
                    trafo
                })
                .collect(),
            transformers_3w: raw
                .transformers_3w
                .iter()
                .map(|t| {
                    if t.all_nodes().into_iter().any(|n| self.touches(n)) {
                        t.with_nodes(
                            self.node(&t.node_a),
                            self.node(&t.node_b),
                            self.node(&t.node_c),
                        )
                    } else {
                        t.clone()
                    }
                })
                .collect(),
            switches: raw
                .switches
                .iter()
                .map(|s| {
                    let mut switch = s.clone();
                    switch.node_a = self.node(&s.node_a);
                    switch.node_b = self.node(&s.node_b);
                    switch
                })
                .collect(),
            measurement_units: raw
                .measurement_units
                .iter()
                .map(|m| {
                    let mut unit = m.clone();
                    unit.node = self.node(&m.node);
                    unit
                })
                .collect(),
        }
    }

    pub(crate) fn participants(&self, participants: &SystemParticipants) -> SystemParticipants {
        SystemParticipants {
            participants: participants
                .participants
                .iter()
                .map(|p| {
                    let mut participant = p.clone();
                    participant.node = self.node(&p.node);
                    participant
                })
                .collect(),
        }
    }

    /// Node graphics follow their node, line graphics are re-linked to the
    /// line with the same uuid in `lines`
    pub(crate) fn graphics(&self, graphics: &GraphicElements, lines: &[Line]) -> GraphicElements {
        let lines_by_id: HashMap<LineId, &Line> = lines.iter().map(|l| (l.uuid, l)).collect();
        GraphicElements {
            node_graphics: graphics
                .node_graphics
                .iter()
                .map(|g| NodeGraphic {
                    node: self.node(&g.node),
                    ..g.clone()
                })
                .collect(),
            line_graphics: graphics
                .line_graphics
                .iter()
                .map(|g| LineGraphic {
                    line: lines_by_id
                        .get(&g.line.uuid)
                        .map(|l| (*l).clone())
                        .unwrap_or_else(|| g.line.clone()),
                    ..g.clone()
                })
                .collect(),
        }
    }

    pub(crate) fn sub_grid(&self, grid: &SubGridContainer) -> SubGridContainer {
        let raw_grid = self.raw_grid(&grid.raw_grid);
        let graphics = self.graphics(&grid.graphics, &raw_grid.lines);
        SubGridContainer {
            grid_name: grid.grid_name.clone(),
            subnet: grid.subnet,
            predominant_voltage_level: grid.predominant_voltage_level.clone(),
            system_participants: self.participants(&grid.system_participants),
            raw_grid,
            graphics,
        }
    }

    pub(crate) fn joint_grid(&self, grid: &JointGridContainer) -> JointGridContainer {
        let raw_grid = self.raw_grid(&grid.raw_grid);
        let graphics = self.graphics(&grid.graphics, &raw_grid.lines);
        JointGridContainer {
            grid_name: grid.grid_name.clone(),
            system_participants: self.participants(&grid.system_participants),
            raw_grid,
            graphics,
        }
    }

    pub(crate) fn grid_container(&self, grid: &GridContainer) -> GridContainer {
        match grid {
            GridContainer::Joint(joint) => GridContainer::Joint(self.joint_grid(joint)),
            GridContainer::SubGrid(sub) => GridContainer::SubGrid(self.sub_grid(sub)),
        }
    }
}
