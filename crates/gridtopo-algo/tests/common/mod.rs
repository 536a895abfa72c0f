#![allow(dead_code)]

use gridtopo_algo::test_utils::*;
use gridtopo_core::{
    GraphicElements, JointGridContainer, LineGraphic, MeasurementUnit, Node, NodeGraphic,
    ParticipantKind, SystemParticipant, SystemParticipants,
};

pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Three-level feeder:
///
/// ```text
/// hv_a -hl- hv_b =s_hv= hv_bus -t1- mv_a -ml1- mv_b =s1= mv_c -ml2- mv_d -t2- lv_a -ll- lv_b
///   subnet 1                          subnet 2                              subnet 3
/// ```
pub fn feeder_grid() -> JointGridContainer {
    let hv_a = hv_node("hv_a", 1, 51.40, 7.30);
    let hv_b = hv_node("hv_b", 1, 51.48, 7.40);
    let hv_bus = hv_node("hv_bus", 1, 51.48, 7.40);
    let mv_a = mv_node("mv_a", 2, 51.48, 7.40);
    let mv_b = mv_node("mv_b", 2, 51.49, 7.41);
    let mv_c = mv_node("mv_c", 2, 51.49, 7.41);
    let mv_d = mv_node("mv_d", 2, 51.50, 7.43);
    let lv_a = lv_node("lv_a", 3, 51.50, 7.43);
    let lv_b = lv_node("lv_b", 3, 51.501, 7.431);

    let nodes = vec![
        hv_a.clone(),
        hv_b.clone(),
        hv_bus.clone(),
        mv_a.clone(),
        mv_b.clone(),
        mv_c.clone(),
        mv_d.clone(),
        lv_a.clone(),
        lv_b.clone(),
    ];
    let lines = vec![
        line("hl", &hv_a, &hv_b, 0.06, 0.4, 11.2),
        line("ml1", &mv_a, &mv_b, 0.125, 0.1, 1.3),
        line("ml2", &mv_c, &mv_d, 0.125, 0.1, 2.1),
        line("ll", &lv_a, &lv_b, 0.32, 0.07, 0.15),
    ];
    let mut raw = raw_grid(
        nodes.clone(),
        lines.clone(),
        vec![
            switch("s_hv", &hv_b, &hv_bus, true),
            switch("s1", &mv_b, &mv_c, true),
        ],
        vec![
            transformer_2w("t1", &hv_bus, &mv_a, 0.9, 12.0),
            transformer_2w("t2", &mv_d, &lv_a, 0.01, 0.04),
        ],
        vec![],
    );
    raw.measurement_units.push(MeasurementUnit::new("mu_mv_a", mv_a.clone()));

    let participants = SystemParticipants {
        participants: vec![
            SystemParticipant::new("pv_mv_c", ParticipantKind::Pv, mv_c.clone()),
            SystemParticipant::new("load_lv_b", ParticipantKind::Load, lv_b.clone()),
        ],
    };
    let graphics = GraphicElements {
        node_graphics: nodes
            .iter()
            .map(|n| NodeGraphic::new("overview", n.clone()))
            .collect(),
        line_graphics: lines
            .iter()
            .map(|l| LineGraphic::new("overview", l.clone()))
            .collect(),
    };

    JointGridContainer::new("feeder", raw, participants, graphics)
}

pub fn node<'a>(nodes: &'a [Node], id: &str) -> &'a Node {
    nodes
        .iter()
        .find(|n| n.id == id)
        .unwrap_or_else(|| panic!("node {id} missing"))
}
