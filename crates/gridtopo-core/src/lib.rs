//! # gridtopo-core: Distribution Grid Data Model
//!
//! Provides the immutable entity records and containers that topology derivation
//! in `gridtopo-algo` operates on.
//!
//! ## Design Philosophy
//!
//! A grid is described by **nodes** and the **connectors** between them:
//! - **Nodes**: electrical junctions, each belonging to exactly one subnet
//! - **Connectors**: lines, switches, two- and three-winding transformers
//!
//! Connectors embed full copies of the nodes they connect rather than bare ids.
//! That keeps every record self-describing (a line knows the subnet of its
//! B-side without a lookup) at the cost of consistency being a property of the
//! whole aggregate: every embedded node must also be part of the node set.
//! [`RawGridElements::validate_into`] checks that.
//!
//! Records are never mutated in place. Operations that change a grid build new
//! records, so a grid can be shared freely between threads.
//!
//! ## Quick Start
//!
//! ```rust
//! use gridtopo_core::*;
//!
//! let mv = VoltageLevel::new("mv", Kilovolts(20.0));
//! let a = Node::new("node_a", mv.clone(), 2).with_geo_position(geo_utils::position(51.49, 7.41));
//! let b = Node::new("node_b", mv, 2).with_geo_position(geo_utils::position(51.50, 7.42));
//!
//! let line_type = LineType::new("NA2XS2Y", OhmsPerKilometre(0.125), OhmsPerKilometre(0.1));
//! let line = Line::new("line_ab", a.clone(), b.clone(), line_type, Kilometres(1.2));
//!
//! let raw = RawGridElements {
//!     nodes: vec![a, b],
//!     lines: vec![line],
//!     ..RawGridElements::default()
//! };
//! assert_eq!(raw.subnets(), vec![2]);
//! ```
//!
//! ## Modules
//!
//! - [`container`] - Element aggregates and grid containers
//! - [`diagnostics`] - Consistency reporting
//! - [`geo_utils`] - Haversine distances and line geometries
//! - [`units`] - Unit newtypes (kV, Ω, Ω/km, km, m)

use serde::{Deserialize, Serialize};
pub use uuid::Uuid;

pub mod container;
pub mod diagnostics;
pub mod error;
pub mod geo_utils;
pub mod units;

pub use container::{
    GraphicElements, GridContainer, JointGridContainer, LineGraphic, NodeGraphic,
    ParticipantKind, RawGridElements, SubGridContainer, SystemParticipant, SystemParticipants,
};
pub use diagnostics::{DiagnosticIssue, Diagnostics, Severity};
pub use error::{GridError, GridResult};
pub use geo_utils::GeoPosition;
pub use units::{
    Amperes, KilovoltAmperes, Kilometres, Kilovolts, Metres, Ohms, OhmsPerKilometre, PerUnit,
};

/// Newtype wrappers around uuids so ids of different entity kinds can't be mixed
macro_rules! uuid_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            #[inline]
            pub fn new(value: Uuid) -> Self {
                $name(value)
            }

            /// Fresh random (v4) id
            #[inline]
            pub fn random() -> Self {
                $name(Uuid::new_v4())
            }

            #[inline]
            pub fn value(&self) -> Uuid {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

uuid_id!(NodeId);
uuid_id!(LineId);
uuid_id!(SwitchId);
uuid_id!(TransformerId);
uuid_id!(MeasurementUnitId);
uuid_id!(ParticipantId);
uuid_id!(GraphicId);
uuid_id!(TypeId);

/// A voltage level: an identifier plus the nominal voltage of every node on it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoltageLevel {
    pub id: String,
    pub nominal_voltage: Kilovolts,
}

impl VoltageLevel {
    pub fn new(id: impl Into<String>, nominal_voltage: Kilovolts) -> Self {
        Self {
            id: id.into(),
            nominal_voltage,
        }
    }
}

impl std::fmt::Display for VoltageLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.id, self.nominal_voltage)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub uuid: NodeId,
    pub id: String,
    /// Voltage magnitude set point
    pub v_target: PerUnit,
    pub slack: bool,
    pub geo_position: GeoPosition,
    pub volt_lvl: VoltageLevel,
    pub subnet: i32,
}

impl Node {
    /// Position assigned to nodes whose location is unknown
    pub const DEFAULT_GEO_POSITION: (f64, f64) = (7.4116482, 51.4843281);

    /// Create a node with a fresh uuid at the default position
    pub fn new(id: impl Into<String>, volt_lvl: VoltageLevel, subnet: i32) -> Self {
        let (lon, lat) = Self::DEFAULT_GEO_POSITION;
        Self {
            uuid: NodeId::random(),
            id: id.into(),
            v_target: PerUnit::ONE,
            slack: false,
            geo_position: GeoPosition::new(lon, lat),
            volt_lvl,
            subnet,
        }
    }

    pub fn with_uuid(mut self, uuid: NodeId) -> Self {
        self.uuid = uuid;
        self
    }

    pub fn with_geo_position(mut self, geo_position: GeoPosition) -> Self {
        self.geo_position = geo_position;
        self
    }

    pub fn with_slack(mut self, slack: bool) -> Self {
        self.slack = slack;
        self
    }

    pub fn nominal_voltage(&self) -> Kilovolts {
        self.volt_lvl.nominal_voltage
    }
}

/// Common view over lines, switches and transformers
pub trait Connector {
    /// Uuid of the connector itself
    fn connector_uuid(&self) -> Uuid;

    /// All nodes the connector touches, port A first
    fn all_nodes(&self) -> Vec<&Node>;

    /// Human-readable label, e.g. "Line l-3"
    fn label(&self) -> String;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineType {
    pub uuid: TypeId,
    pub id: String,
    /// Series resistance per length
    pub r: OhmsPerKilometre,
    /// Series reactance per length
    pub x: OhmsPerKilometre,
    pub i_max: Amperes,
    pub v_rated: Kilovolts,
}

impl LineType {
    pub fn new(id: impl Into<String>, r: OhmsPerKilometre, x: OhmsPerKilometre) -> Self {
        Self {
            uuid: TypeId::random(),
            id: id.into(),
            r,
            x,
            i_max: Amperes(0.0),
            v_rated: Kilovolts(0.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub uuid: LineId,
    pub id: String,
    pub node_a: Node,
    pub node_b: Node,
    pub parallel_devices: u32,
    pub line_type: LineType,
    pub length: Kilometres,
    pub geo_position: geo::LineString<f64>,
}

impl Line {
    /// Create a single-system line drawn straight between its nodes
    pub fn new(
        id: impl Into<String>,
        node_a: Node,
        node_b: Node,
        line_type: LineType,
        length: Kilometres,
    ) -> Self {
        let geo_position =
            geo_utils::line_string_between(&node_a.geo_position, &node_b.geo_position);
        Self {
            uuid: LineId::random(),
            id: id.into(),
            node_a,
            node_b,
            parallel_devices: 1,
            line_type,
            length,
            geo_position,
        }
    }
}

impl Connector for Line {
    fn connector_uuid(&self) -> Uuid {
        self.uuid.value()
    }

    fn all_nodes(&self) -> Vec<&Node> {
        vec![&self.node_a, &self.node_b]
    }

    fn label(&self) -> String {
        format!("Line {}", self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Switch {
    pub uuid: SwitchId,
    pub id: String,
    pub node_a: Node,
    pub node_b: Node,
    pub closed: bool,
}

impl Switch {
    pub fn new(id: impl Into<String>, node_a: Node, node_b: Node, closed: bool) -> Self {
        Self {
            uuid: SwitchId::random(),
            id: id.into(),
            node_a,
            node_b,
            closed,
        }
    }

    /// The endpoint across from `node`, if the switch touches `node` at all
    pub fn other_end(&self, node: NodeId) -> Option<&Node> {
        if self.node_a.uuid == node {
            Some(&self.node_b)
        } else if self.node_b.uuid == node {
            Some(&self.node_a)
        } else {
            None
        }
    }
}

impl Connector for Switch {
    fn connector_uuid(&self) -> Uuid {
        self.uuid.value()
    }

    fn all_nodes(&self) -> Vec<&Node> {
        vec![&self.node_a, &self.node_b]
    }

    fn label(&self) -> String {
        format!("Switch {}", self.id)
    }
}

/// Short-circuit and rating data of a two-winding transformer, referred to port A
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transformer2WType {
    pub uuid: TypeId,
    pub id: String,
    /// Short-circuit resistance
    pub r_sc: Ohms,
    /// Short-circuit reactance
    pub x_sc: Ohms,
    pub s_rated: KilovoltAmperes,
    pub v_rated_a: Kilovolts,
    pub v_rated_b: Kilovolts,
}

impl Transformer2WType {
    pub fn new(id: impl Into<String>, r_sc: Ohms, x_sc: Ohms) -> Self {
        Self {
            uuid: TypeId::random(),
            id: id.into(),
            r_sc,
            x_sc,
            s_rated: KilovoltAmperes(0.0),
            v_rated_a: Kilovolts(0.0),
            v_rated_b: Kilovolts(0.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transformer2W {
    pub uuid: TransformerId,
    pub id: String,
    /// Upstream (higher voltage) port
    pub node_a: Node,
    pub node_b: Node,
    pub parallel_devices: u32,
    pub transformer_type: Transformer2WType,
    pub tap_pos: i32,
    pub auto_tap: bool,
}

impl Transformer2W {
    pub fn new(
        id: impl Into<String>,
        node_a: Node,
        node_b: Node,
        transformer_type: Transformer2WType,
    ) -> Self {
        Self {
            uuid: TransformerId::random(),
            id: id.into(),
            node_a,
            node_b,
            parallel_devices: 1,
            transformer_type,
            tap_pos: 0,
            auto_tap: false,
        }
    }
}

impl Connector for Transformer2W {
    fn connector_uuid(&self) -> Uuid {
        self.uuid.value()
    }

    fn all_nodes(&self) -> Vec<&Node> {
        vec![&self.node_a, &self.node_b]
    }

    fn label(&self) -> String {
        format!("Transformer2W {}", self.id)
    }
}

/// Per-winding short-circuit and rating data of a three-winding transformer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transformer3WType {
    pub uuid: TypeId,
    pub id: String,
    pub r_sc_a: Ohms,
    pub r_sc_b: Ohms,
    pub r_sc_c: Ohms,
    pub x_sc_a: Ohms,
    pub x_sc_b: Ohms,
    pub x_sc_c: Ohms,
    pub s_rated_a: KilovoltAmperes,
    pub s_rated_b: KilovoltAmperes,
    pub s_rated_c: KilovoltAmperes,
    pub v_rated_a: Kilovolts,
    pub v_rated_b: Kilovolts,
    pub v_rated_c: Kilovolts,
}

impl Transformer3WType {
    /// Type with the given winding impedances as `(r, x)` pairs for ports A, B, C
    pub fn new(
        id: impl Into<String>,
        winding_a: (Ohms, Ohms),
        winding_b: (Ohms, Ohms),
        winding_c: (Ohms, Ohms),
    ) -> Self {
        Self {
            uuid: TypeId::random(),
            id: id.into(),
            r_sc_a: winding_a.0,
            r_sc_b: winding_b.0,
            r_sc_c: winding_c.0,
            x_sc_a: winding_a.1,
            x_sc_b: winding_b.1,
            x_sc_c: winding_c.1,
            s_rated_a: KilovoltAmperes(0.0),
            s_rated_b: KilovoltAmperes(0.0),
            s_rated_c: KilovoltAmperes(0.0),
            v_rated_a: Kilovolts(0.0),
            v_rated_b: Kilovolts(0.0),
            v_rated_c: Kilovolts(0.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transformer3W {
    pub uuid: TransformerId,
    pub id: String,
    /// Highest voltage port
    pub node_a: Node,
    pub node_b: Node,
    pub node_c: Node,
    /// Star point of the equivalent circuit; sits on port A's voltage level
    pub node_internal: Node,
    pub parallel_devices: u32,
    pub transformer_type: Transformer3WType,
    pub tap_pos: i32,
    pub auto_tap: bool,
}

impl Transformer3W {
    pub fn new(
        id: impl Into<String>,
        node_a: Node,
        node_b: Node,
        node_c: Node,
        transformer_type: Transformer3WType,
    ) -> Self {
        let id = id.into();
        let node_internal = Node::new(
            format!("internal_node_{id}"),
            node_a.volt_lvl.clone(),
            node_a.subnet,
        );
        Self {
            uuid: TransformerId::random(),
            id,
            node_a,
            node_b,
            node_c,
            node_internal,
            parallel_devices: 1,
            transformer_type,
            tap_pos: 0,
            auto_tap: false,
        }
    }

    /// Copy with replaced ports. The internal node keeps its uuid and follows
    /// port A's voltage level and subnet.
    pub fn with_nodes(&self, node_a: Node, node_b: Node, node_c: Node) -> Self {
        let mut node_internal = self.node_internal.clone();
        node_internal.volt_lvl = node_a.volt_lvl.clone();
        node_internal.subnet = node_a.subnet;
        Self {
            node_a,
            node_b,
            node_c,
            node_internal,
            ..self.clone()
        }
    }
}

impl Connector for Transformer3W {
    fn connector_uuid(&self) -> Uuid {
        self.uuid.value()
    }

    fn all_nodes(&self) -> Vec<&Node> {
        vec![&self.node_a, &self.node_b, &self.node_c]
    }

    fn label(&self) -> String {
        format!("Transformer3W {}", self.id)
    }
}

/// Which quantities a measurement unit observes at its node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementUnit {
    pub uuid: MeasurementUnitId,
    pub id: String,
    pub node: Node,
    pub v_mag: bool,
    pub v_ang: bool,
    pub p: bool,
    pub q: bool,
}

impl MeasurementUnit {
    /// A unit measuring every quantity at `node`
    pub fn new(id: impl Into<String>, node: Node) -> Self {
        Self {
            uuid: MeasurementUnitId::random(),
            id: id.into(),
            node,
            v_mag: true,
            v_ang: true,
            p: true,
            q: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mv() -> VoltageLevel {
        VoltageLevel::new("mv", Kilovolts(20.0))
    }

    #[test]
    fn test_node_defaults() {
        let node = Node::new("n1", mv(), 1);
        assert_eq!(node.v_target, PerUnit::ONE);
        assert!(!node.slack);
        assert_eq!(node.geo_position.x(), Node::DEFAULT_GEO_POSITION.0);
        assert_eq!(node.geo_position.y(), Node::DEFAULT_GEO_POSITION.1);
        assert_eq!(node.nominal_voltage(), Kilovolts(20.0));
    }

    #[test]
    fn test_line_geometry_follows_nodes() {
        let a = Node::new("a", mv(), 1).with_geo_position(geo_utils::position(51.0, 7.0));
        let b = Node::new("b", mv(), 1).with_geo_position(geo_utils::position(51.1, 7.0));
        let line_type = LineType::new("lt", OhmsPerKilometre(0.1), OhmsPerKilometre(0.1));
        let line = Line::new("l", a.clone(), b.clone(), line_type, Kilometres(11.1));

        assert_eq!(line.geo_position.0.len(), 2);
        assert_eq!(line.geo_position.0[0].y, 51.0);
        assert_eq!(line.geo_position.0[1].y, 51.1);
        assert_eq!(line.all_nodes(), vec![&a, &b]);
    }

    #[test]
    fn test_switch_other_end() {
        let a = Node::new("a", mv(), 1);
        let b = Node::new("b", mv(), 1);
        let c = Node::new("c", mv(), 1);
        let switch = Switch::new("s", a.clone(), b.clone(), true);

        assert_eq!(switch.other_end(a.uuid), Some(&b));
        assert_eq!(switch.other_end(b.uuid), Some(&a));
        assert_eq!(switch.other_end(c.uuid), None);
    }

    #[test]
    fn test_transformer3w_internal_node() {
        let hv = VoltageLevel::new("hv", Kilovolts(110.0));
        let a = Node::new("a", hv.clone(), 1);
        let b = Node::new("b", mv(), 2);
        let c = Node::new("c", mv(), 3);
        let trafo_type = Transformer3WType::new(
            "t3",
            (Ohms(0.3), Ohms(1.0)),
            (Ohms(0.025), Ohms(0.08)),
            (Ohms(0.0008), Ohms(0.003)),
        );
        let trafo = Transformer3W::new("t", a.clone(), b, c, trafo_type);

        assert_eq!(trafo.node_internal.id, "internal_node_t");
        assert_eq!(trafo.node_internal.volt_lvl, hv);
        assert_eq!(trafo.node_internal.subnet, 1);
        assert_eq!(trafo.all_nodes().len(), 3);

        let moved_a = a.clone().with_geo_position(geo_utils::position(50.0, 6.0));
        let moved = trafo.with_nodes(moved_a.clone(), trafo.node_b.clone(), trafo.node_c.clone());
        assert_eq!(moved.node_a, moved_a);
        assert_eq!(moved.node_internal.uuid, trafo.node_internal.uuid);
        assert_eq!(moved.uuid, trafo.uuid);
    }

    #[test]
    fn test_ids_are_distinct_per_entity() {
        let a = Node::new("a", mv(), 1);
        let b = Node::new("b", mv(), 1);
        assert_ne!(a.uuid, b.uuid);
        assert_eq!(NodeId::new(a.uuid.value()), a.uuid);
    }
}
