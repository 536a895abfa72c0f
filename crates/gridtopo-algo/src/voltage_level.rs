//! Predominant voltage level of a subgrid.
//!
//! A subgrid projection also carries the upstream port of every transformer
//! feeding it (and whatever hangs off that port through closed switches).
//! Those nodes sit on a foreign voltage level, so they are left out before
//! the levels of the remaining "local" nodes are compared.

use std::collections::HashSet;

use gridtopo_core::{GridError, GridResult, Node, NodeId, RawGridElements, VoltageLevel};
use tracing::debug;

use crate::switch_chain::{junction_nodes, traverse_switch_chain};

/// Determine the one voltage level shared by all local nodes of `subnet`.
///
/// # Errors
///
/// [`GridError::StructuralInconsistency`] if the local nodes span more than
/// one voltage level, if no local node remains, or if a switch chain leaving
/// a transformer port branches.
pub fn predominant_voltage_level(raw: &RawGridElements, subnet: i32) -> GridResult<VoltageLevel> {
    let excluded = upstream_nodes(raw, subnet)?;

    let mut counts: Vec<(&VoltageLevel, usize)> = Vec::new();
    for node in raw.nodes.iter().filter(|n| !excluded.contains(&n.uuid)) {
        match counts.iter_mut().find(|(level, _)| **level == node.volt_lvl) {
            Some((_, count)) => *count += 1,
            None => counts.push((&node.volt_lvl, 1)),
        }
    }

    match counts.as_slice() {
        [] => Err(GridError::structural(format!(
            "cannot determine the predominant voltage level of subnet {subnet}: no local nodes"
        ))),
        [(level, count)] => {
            debug!(subnet, level = %level, nodes = count, "resolved predominant voltage level");
            Ok((*level).clone())
        }
        _ => {
            counts.sort_by(|(a, _), (b, _)| {
                b.nominal_voltage
                    .value()
                    .total_cmp(&a.nominal_voltage.value())
                    .then_with(|| a.id.cmp(&b.id))
            });
            let levels = counts
                .iter()
                .map(|(level, count)| format!("{level} x{count}"))
                .collect::<Vec<_>>()
                .join(", ");
            Err(GridError::structural(format!(
                "there are {} voltage levels in subnet {subnet}, expected exactly one: {levels}",
                counts.len()
            )))
        }
    }
}

/// Nodes that belong to the upstream side of a transformer and therefore do
/// not count towards the subnet's own voltage level
fn upstream_nodes(raw: &RawGridElements, subnet: i32) -> GridResult<HashSet<NodeId>> {
    let junctions = junction_nodes(raw);
    let mut excluded = HashSet::new();
    let mut exclude_chain = |start: &Node| -> GridResult<()> {
        let chain = traverse_switch_chain(start, &raw.switches, &junctions)?;
        excluded.extend(chain.into_iter().map(|n| n.uuid));
        Ok(())
    };

    for trafo in &raw.transformers_2w {
        exclude_chain(&trafo.node_a)?;
    }
    for trafo in &raw.transformers_3w {
        for port in [&trafo.node_a, &trafo.node_b, &trafo.node_c] {
            if port.subnet != subnet {
                exclude_chain(port)?;
            }
        }
    }
    // the internal node sits on port A's level, so it is only local with A
    excluded.extend(
        raw.transformers_3w
            .iter()
            .filter(|t| t.node_a.subnet != subnet)
            .map(|t| t.node_internal.uuid),
    );

    Ok(excluded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn test_upstream_port_is_ignored() {
        let hv = hv_node("hv", 1, 51.0, 7.0);
        let a = mv_node("a", 2, 51.0, 7.0);
        let b = mv_node("b", 2, 51.01, 7.0);
        let raw = raw_grid(
            vec![hv.clone(), a.clone(), b.clone()],
            vec![line("ab", &a, &b, 0.2, 0.1, 1.0)],
            vec![],
            vec![transformer_2w("t", &hv, &a, 1.0, 1.0)],
            vec![],
        );

        assert_eq!(predominant_voltage_level(&raw, 2).unwrap(), mv_level());
    }

    #[test]
    fn test_switch_chain_behind_upstream_port_is_ignored() {
        let hv = hv_node("hv", 1, 51.0, 7.0);
        let busbar = hv_node("busbar", 1, 51.0, 7.0);
        let a = mv_node("a", 2, 51.0, 7.0);
        let raw = raw_grid(
            vec![hv.clone(), busbar.clone(), a.clone()],
            vec![],
            vec![switch("s", &hv, &busbar, true)],
            vec![transformer_2w("t", &hv, &a, 1.0, 1.0)],
            vec![],
        );

        assert_eq!(predominant_voltage_level(&raw, 2).unwrap(), mv_level());
    }

    #[test]
    fn test_mixed_levels_are_rejected() {
        let a = mv_node("a", 2, 51.0, 7.0);
        let b = lv_node("b", 2, 51.01, 7.0);
        let raw = raw_grid(
            vec![a.clone(), b.clone()],
            vec![line("ab", &a, &b, 0.2, 0.1, 1.0)],
            vec![],
            vec![],
            vec![],
        );

        let err = predominant_voltage_level(&raw, 2).unwrap_err();
        match err {
            GridError::StructuralInconsistency(msg) => {
                let mv_pos = msg.find("mv").unwrap();
                let lv_pos = msg.find("lv").unwrap();
                assert!(mv_pos < lv_pos, "levels not sorted by voltage: {msg}");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_three_winding_non_local_ports_are_ignored() {
        let hv = hv_node("hv", 1, 51.0, 7.0);
        let mv = mv_node("mv", 2, 51.0, 7.0);
        let lv = lv_node("lv", 3, 51.0, 7.0);
        let t3 = transformer_3w("t3", &hv, &mv, &lv);
        let raw = raw_grid(
            vec![hv.clone(), mv.clone(), lv.clone(), t3.node_internal.clone()],
            vec![],
            vec![],
            vec![],
            vec![t3],
        );

        assert_eq!(predominant_voltage_level(&raw, 2).unwrap(), mv_level());
        assert_eq!(predominant_voltage_level(&raw, 3).unwrap(), lv_level());
    }

    #[test]
    fn test_internal_node_counts_for_the_subnet_of_port_a() {
        let hv = hv_node("hv", 1, 51.0, 7.0);
        let mv = mv_node("mv", 2, 51.0, 7.0);
        let lv = lv_node("lv", 3, 51.0, 7.0);
        let t3 = transformer_3w("t3", &hv, &mv, &lv);
        let internal = t3.node_internal.clone();

        let hv_side = raw_grid(vec![internal.clone()], vec![], vec![], vec![], vec![t3.clone()]);
        assert_eq!(predominant_voltage_level(&hv_side, 1).unwrap(), hv_level());

        let mv_side = raw_grid(vec![internal, mv.clone()], vec![], vec![], vec![], vec![t3]);
        assert_eq!(predominant_voltage_level(&mv_side, 2).unwrap(), mv_level());
    }

    #[test]
    fn test_empty_subgrid_is_rejected() {
        let raw = RawGridElements::default();
        assert!(matches!(
            predominant_voltage_level(&raw, 1),
            Err(GridError::StructuralInconsistency(_))
        ));
    }
}
