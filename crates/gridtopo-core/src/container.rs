//! Element aggregates and the grid containers built from them.
//!
//! [`RawGridElements`] holds the electrical topology, [`SystemParticipants`]
//! the assets connected to nodes and [`GraphicElements`] their schematic
//! representation. A [`GridContainer`] bundles all three, either for a joint
//! grid spanning several subnets or for a single subnet.

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::diagnostics::Diagnostics;
use crate::{
    Connector, GeoPosition, GraphicId, KilovoltAmperes, Line, MeasurementUnit, Node, NodeId,
    ParticipantId, Switch, Transformer2W, Transformer3W, VoltageLevel,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawGridElements {
    pub nodes: Vec<Node>,
    pub lines: Vec<Line>,
    pub transformers_2w: Vec<Transformer2W>,
    pub transformers_3w: Vec<Transformer3W>,
    pub switches: Vec<Switch>,
    pub measurement_units: Vec<MeasurementUnit>,
}

impl RawGridElements {
    /// Distinct subnet numbers of all nodes, ascending
    pub fn subnets(&self) -> Vec<i32> {
        self.nodes
            .iter()
            .map(|n| n.subnet)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn node(&self, uuid: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.uuid == uuid)
    }

    /// Every connector as a trait object, in the order lines, switches,
    /// two-winding and three-winding transformers
    pub fn connectors(&self) -> impl Iterator<Item = &dyn Connector> {
        self.lines
            .iter()
            .map(|l| l as &dyn Connector)
            .chain(self.switches.iter().map(|s| s as &dyn Connector))
            .chain(self.transformers_2w.iter().map(|t| t as &dyn Connector))
            .chain(self.transformers_3w.iter().map(|t| t as &dyn Connector))
    }

    /// Check that every embedded node is part of the node set and that no
    /// uuid is used twice.
    ///
    /// Topology derivation relies on this consistency but never checks it
    /// itself.
    pub fn validate_into(&self, diag: &mut Diagnostics) {
        let known: HashSet<NodeId> = self.nodes.iter().map(|n| n.uuid).collect();

        if known.len() != self.nodes.len() {
            let mut seen = HashSet::new();
            for node in &self.nodes {
                if !seen.insert(node.uuid) {
                    diag.add_warning_with_entity(
                        "uniqueness",
                        "node uuid used more than once",
                        &format!("Node {}", node.id),
                    );
                }
            }
        }

        let mut connector_uuids: HashSet<Uuid> = HashSet::new();
        for connector in self.connectors() {
            if !connector_uuids.insert(connector.connector_uuid()) {
                diag.add_warning_with_entity(
                    "uniqueness",
                    "connector uuid used more than once",
                    &connector.label(),
                );
            }
            for node in connector.all_nodes() {
                if !known.contains(&node.uuid) {
                    diag.add_error_with_entity(
                        "reference",
                        &format!("node '{}' ({}) is not part of the node set", node.id, node.uuid),
                        &connector.label(),
                    );
                }
            }
        }

        for unit in &self.measurement_units {
            if !known.contains(&unit.node.uuid) {
                diag.add_error_with_entity(
                    "reference",
                    &format!("node '{}' is not part of the node set", unit.node.id),
                    &format!("MeasurementUnit {}", unit.id),
                );
            }
        }
    }
}

/// Kinds of assets that can be connected to a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantKind {
    Load,
    FixedFeedIn,
    Pv,
    Wec,
    Bm,
    Chp,
    Ev,
    Evcs,
    Hp,
    Storage,
    Em,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemParticipant {
    pub uuid: ParticipantId,
    pub id: String,
    pub kind: ParticipantKind,
    pub node: Node,
    pub s_rated: KilovoltAmperes,
    pub cos_phi_rated: f64,
}

impl SystemParticipant {
    pub fn new(id: impl Into<String>, kind: ParticipantKind, node: Node) -> Self {
        Self {
            uuid: ParticipantId::random(),
            id: id.into(),
            kind,
            node,
            s_rated: KilovoltAmperes(0.0),
            cos_phi_rated: 1.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemParticipants {
    pub participants: Vec<SystemParticipant>,
}

impl SystemParticipants {
    pub fn of_kind(&self, kind: ParticipantKind) -> impl Iterator<Item = &SystemParticipant> {
        self.participants.iter().filter(move |p| p.kind == kind)
    }
}

/// Schematic placement of a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeGraphic {
    pub uuid: GraphicId,
    pub graphic_layer: String,
    pub path: Option<geo::LineString<f64>>,
    pub point: Option<GeoPosition>,
    pub node: Node,
}

impl NodeGraphic {
    pub fn new(graphic_layer: impl Into<String>, node: Node) -> Self {
        Self {
            uuid: GraphicId::random(),
            graphic_layer: graphic_layer.into(),
            path: None,
            point: None,
            node,
        }
    }
}

/// Schematic path of a line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineGraphic {
    pub uuid: GraphicId,
    pub graphic_layer: String,
    pub path: Option<geo::LineString<f64>>,
    pub line: Line,
}

impl LineGraphic {
    pub fn new(graphic_layer: impl Into<String>, line: Line) -> Self {
        Self {
            uuid: GraphicId::random(),
            graphic_layer: graphic_layer.into(),
            path: None,
            line,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphicElements {
    pub node_graphics: Vec<NodeGraphic>,
    pub line_graphics: Vec<LineGraphic>,
}

/// A grid spanning any number of subnets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointGridContainer {
    pub grid_name: String,
    pub raw_grid: RawGridElements,
    pub system_participants: SystemParticipants,
    pub graphics: GraphicElements,
}

impl JointGridContainer {
    pub fn new(
        grid_name: impl Into<String>,
        raw_grid: RawGridElements,
        system_participants: SystemParticipants,
        graphics: GraphicElements,
    ) -> Self {
        Self {
            grid_name: grid_name.into(),
            raw_grid,
            system_participants,
            graphics,
        }
    }
}

/// The projection of a grid onto one subnet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubGridContainer {
    pub grid_name: String,
    pub subnet: i32,
    pub predominant_voltage_level: VoltageLevel,
    pub raw_grid: RawGridElements,
    pub system_participants: SystemParticipants,
    pub graphics: GraphicElements,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GridContainer {
    Joint(JointGridContainer),
    SubGrid(SubGridContainer),
}

impl GridContainer {
    pub fn grid_name(&self) -> &str {
        match self {
            GridContainer::Joint(grid) => &grid.grid_name,
            GridContainer::SubGrid(grid) => &grid.grid_name,
        }
    }

    pub fn raw_grid(&self) -> &RawGridElements {
        match self {
            GridContainer::Joint(grid) => &grid.raw_grid,
            GridContainer::SubGrid(grid) => &grid.raw_grid,
        }
    }

    pub fn system_participants(&self) -> &SystemParticipants {
        match self {
            GridContainer::Joint(grid) => &grid.system_participants,
            GridContainer::SubGrid(grid) => &grid.system_participants,
        }
    }

    pub fn graphics(&self) -> &GraphicElements {
        match self {
            GridContainer::Joint(grid) => &grid.graphics,
            GridContainer::SubGrid(grid) => &grid.graphics,
        }
    }

    /// Index of all nodes by uuid
    pub fn node_index(&self) -> HashMap<NodeId, &Node> {
        self.raw_grid().nodes.iter().map(|n| (n.uuid, n)).collect()
    }
}

impl From<JointGridContainer> for GridContainer {
    fn from(grid: JointGridContainer) -> Self {
        GridContainer::Joint(grid)
    }
}

impl From<SubGridContainer> for GridContainer {
    fn from(grid: SubGridContainer) -> Self {
        GridContainer::SubGrid(grid)
    }
}
