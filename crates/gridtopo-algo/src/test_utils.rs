//! Fixture builders shared by unit and integration tests.

use gridtopo_core::geo_utils::position;
use gridtopo_core::{
    Kilometres, Kilovolts, Line, LineType, Node, Ohms, OhmsPerKilometre, RawGridElements, Switch,
    Transformer2W, Transformer2WType, Transformer3W, Transformer3WType, VoltageLevel,
};

pub fn hv_level() -> VoltageLevel {
    VoltageLevel::new("hv", Kilovolts(110.0))
}

pub fn mv_level() -> VoltageLevel {
    VoltageLevel::new("mv", Kilovolts(20.0))
}

pub fn lv_level() -> VoltageLevel {
    VoltageLevel::new("lv", Kilovolts(0.4))
}

pub fn node_at(id: &str, level: VoltageLevel, subnet: i32, lat: f64, lon: f64) -> Node {
    Node::new(id, level, subnet).with_geo_position(position(lat, lon))
}

/// 110 kV node
pub fn hv_node(id: &str, subnet: i32, lat: f64, lon: f64) -> Node {
    node_at(id, hv_level(), subnet, lat, lon)
}

/// 20 kV node
pub fn mv_node(id: &str, subnet: i32, lat: f64, lon: f64) -> Node {
    node_at(id, mv_level(), subnet, lat, lon)
}

/// 0.4 kV node
pub fn lv_node(id: &str, subnet: i32, lat: f64, lon: f64) -> Node {
    node_at(id, lv_level(), subnet, lat, lon)
}

/// Line with per-kilometre `r` and `x` (Ω/km) and a length in km
pub fn line(id: &str, a: &Node, b: &Node, r: f64, x: f64, length_km: f64) -> Line {
    let line_type = LineType::new(
        format!("{id}_type"),
        OhmsPerKilometre(r),
        OhmsPerKilometre(x),
    );
    Line::new(id, a.clone(), b.clone(), line_type, Kilometres(length_km))
}

pub fn switch(id: &str, a: &Node, b: &Node, closed: bool) -> Switch {
    Switch::new(id, a.clone(), b.clone(), closed)
}

pub fn transformer_2w(id: &str, a: &Node, b: &Node, r_sc: f64, x_sc: f64) -> Transformer2W {
    let transformer_type = Transformer2WType::new(format!("{id}_type"), Ohms(r_sc), Ohms(x_sc));
    Transformer2W::new(id, a.clone(), b.clone(), transformer_type)
}

/// Three-winding transformer with 1 Ω + j1 Ω per winding
pub fn transformer_3w(id: &str, a: &Node, b: &Node, c: &Node) -> Transformer3W {
    let winding = (Ohms(1.0), Ohms(1.0));
    let transformer_type = Transformer3WType::new(format!("{id}_type"), winding, winding, winding);
    Transformer3W::new(id, a.clone(), b.clone(), c.clone(), transformer_type)
}

pub fn raw_grid(
    nodes: Vec<Node>,
    lines: Vec<Line>,
    switches: Vec<Switch>,
    transformers_2w: Vec<Transformer2W>,
    transformers_3w: Vec<Transformer3W>,
) -> RawGridElements {
    RawGridElements {
        nodes,
        lines,
        transformers_2w,
        transformers_3w,
        switches,
        measurement_units: Vec::new(),
    }
}

/// Install a fmt subscriber honouring `RUST_LOG`; repeated calls are no-ops.
#[cfg(test)]
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
