//! Node substitution across whole grids

mod common;

use common::{feeder_grid, init_tracing, node};
use gridtopo_algo::test_utils::*;
use gridtopo_algo::{split_into_subgrids, update_grid_with_nodes, NodeSubstitution};
use gridtopo_core::geo_utils::position;
use gridtopo_core::{
    Diagnostics, GraphicElements, GridContainer, JointGridContainer, SystemParticipants,
};

#[test]
fn test_empty_substitution_leaves_grid_unchanged() {
    let grid = GridContainer::from(feeder_grid());
    assert_eq!(update_grid_with_nodes(&grid, &NodeSubstitution::new()), grid);
}

#[test]
fn test_isolated_transformer_is_moved_as_a_whole() {
    let a = hv_node("a", 1, 51.0, 7.0);
    let b = mv_node("b", 2, 51.0, 7.0);
    let elsewhere = mv_node("elsewhere", 3, 52.0, 8.0);
    let grid = GridContainer::from(JointGridContainer::new(
        "isolated",
        raw_grid(
            vec![a.clone(), b.clone(), elsewhere.clone()],
            vec![],
            vec![],
            vec![transformer_2w("t", &a, &b, 1.0, 1.0)],
            vec![],
        ),
        SystemParticipants::default(),
        GraphicElements::default(),
    ));
    let target = position(51.3, 7.3);

    let substitution = NodeSubstitution::from_iter([(a.clone(), a.with_geo_position(target))]);
    let updated = update_grid_with_nodes(&grid, &substitution);

    let trafo = &updated.raw_grid().transformers_2w[0];
    assert_eq!(trafo.node_a.geo_position, target);
    assert_eq!(trafo.node_b.geo_position, target);
    assert_eq!(node(&updated.raw_grid().nodes, "elsewhere"), &elsewhere);
}

#[test]
fn test_moving_feeder_substation_keeps_transformers_co_located() {
    init_tracing();
    let grid = GridContainer::from(feeder_grid());
    let hv_bus = node(&grid.raw_grid().nodes, "hv_bus").clone();
    let target = position(51.45, 7.35);

    let substitution =
        NodeSubstitution::from_iter([(hv_bus.clone(), hv_bus.with_geo_position(target))]);
    let updated = update_grid_with_nodes(&grid, &substitution);
    let nodes = &updated.raw_grid().nodes;

    // hv_bus -t1- mv_a; mv_d -t2- lv_a is not linked to hv_bus by transformers alone
    assert_eq!(node(nodes, "hv_bus").geo_position, target);
    assert_eq!(node(nodes, "mv_a").geo_position, target);
    assert_ne!(node(nodes, "mv_d").geo_position, target);
    for trafo in &updated.raw_grid().transformers_2w {
        assert_eq!(trafo.node_a.geo_position, trafo.node_b.geo_position, "{}", trafo.id);
    }

    // ml1 starts at mv_a and follows it
    let ml1 = updated
        .raw_grid()
        .lines
        .iter()
        .find(|l| l.id == "ml1")
        .unwrap();
    assert_eq!(ml1.node_a.geo_position, target);
    assert_eq!(ml1.geo_position.0[0], target.0);
    let graphic = updated
        .graphics()
        .line_graphics
        .iter()
        .find(|g| g.line.id == "ml1")
        .unwrap();
    assert_eq!(&graphic.line, ml1);

    let mut diag = Diagnostics::new();
    updated.raw_grid().validate_into(&mut diag);
    assert!(!diag.has_errors(), "{diag}");
}

#[test]
fn test_transformer_chain_shares_one_leading_position() {
    let a = hv_node("a", 1, 51.0, 7.0);
    let d = mv_node("d", 2, 51.2, 7.2);
    let g = lv_node("g", 3, 51.4, 7.4);
    let unrelated = lv_node("unrelated", 3, 51.5, 7.5);
    let grid = GridContainer::from(JointGridContainer::new(
        "chain",
        raw_grid(
            vec![a.clone(), d.clone(), g.clone(), unrelated.clone()],
            vec![line("gu", &g, &unrelated, 0.3, 0.1, 0.5)],
            vec![],
            vec![
                transformer_2w("t1", &a, &d, 1.0, 1.0),
                transformer_2w("t2", &d, &g, 1.0, 1.0),
            ],
            vec![],
        ),
        SystemParticipants::default(),
        GraphicElements::default(),
    ));
    let target = position(50.9, 6.9);

    let substitution = NodeSubstitution::from_iter([(a.clone(), a.with_geo_position(target))]);
    let updated = update_grid_with_nodes(&grid, &substitution);
    let nodes = &updated.raw_grid().nodes;

    for id in ["a", "d", "g"] {
        assert_eq!(node(nodes, id).geo_position, target, "node {id}");
    }
    assert_eq!(node(nodes, "unrelated"), &unrelated);
    assert_eq!(updated.raw_grid().lines[0].node_a.geo_position, target);
}

#[test]
fn test_substitution_on_sub_grid_container() {
    let subgrids = split_into_subgrids(&feeder_grid()).unwrap();
    let mv = GridContainer::from(subgrids[&2].clone());
    let mv_c = node(&mv.raw_grid().nodes, "mv_c").clone();
    let moved = mv_c.clone().with_geo_position(position(51.495, 7.415));

    let substitution = NodeSubstitution::from_iter([(mv_c, moved.clone())]);
    let updated = update_grid_with_nodes(&mv, &substitution);

    let GridContainer::SubGrid(sub) = updated else {
        panic!("expected a sub grid");
    };
    assert_eq!(sub.subnet, 2);
    assert_eq!(sub.predominant_voltage_level, subgrids[&2].predominant_voltage_level);
    assert_eq!(sub.system_participants.participants[0].node, moved);
    let switch = &sub.raw_grid.switches[0];
    assert_eq!(switch.node_b, moved);
}
