//! Property tests for posterior invariants and determinism

use proptest::prelude::*;
use rshgf::attributes::{AttributeStore, NodeAttributes};
use rshgf::math::CouplingKind;
use rshgf::model::NetworkBuilder;
use rshgf::topology::{AdjacencyLists, NodeKind, Topology};
use rshgf::updates::posterior::continuous::posterior_update_continuous_state_node;

/// The last node is a continuous value parent of every other node.
fn fan_in(kinds: &[NodeKind], kappas: &[f64]) -> Topology {
    let parent = kinds.len();
    let mut edges: Vec<AdjacencyLists> = kinds.iter().map(|&kind| AdjacencyLists::new(kind)).collect();
    let mut parent_edges = AdjacencyLists::new(NodeKind::Continuous);
    for (child, (adj, &kappa)) in edges.iter_mut().zip(kappas).enumerate() {
        adj.value_parents.push(parent);
        adj.value_coupling_parents.push(kappa);
        adj.value_coupling_fn_parents.push(CouplingKind::Linear);
        parent_edges.value_children.push(child);
        parent_edges.value_coupling_children.push(kappa);
    }
    edges.push(parent_edges);
    Topology::new(edges).unwrap()
}

fn child_strategy() -> impl Strategy<Value = (bool, f64, f64, f64, f64)> {
    (any::<bool>(), 1e-3f64..10.0, -5.0f64..5.0, 1e-3f64..1e3, -5.0f64..5.0)
}

proptest! {
    #[test]
    fn precision_never_decreases_with_positive_couplings(
        children in prop::collection::vec(child_strategy(), 0..6),
        parent_expected_precision in 1e-3f64..1e3,
        parent_expected_mean in -5.0f64..5.0,
    ) {
        let kinds: Vec<NodeKind> = children
            .iter()
            .map(|c| if c.0 { NodeKind::Binary } else { NodeKind::Continuous })
            .collect();
        let kappas: Vec<f64> = children.iter().map(|c| c.1).collect();
        let topology = fan_in(&kinds, &kappas);

        let mut nodes: Vec<NodeAttributes> = children
            .iter()
            .map(|&(_, _, delta, expected_precision, mean)| NodeAttributes {
                mean,
                expected_mean: mean - delta,
                expected_precision,
                value_prediction_error: delta,
                ..NodeAttributes::default()
            })
            .collect();
        nodes.push(NodeAttributes {
            mean: parent_expected_mean,
            expected_mean: parent_expected_mean,
            expected_precision: parent_expected_precision,
            ..NodeAttributes::default()
        });
        let parent = nodes.len() - 1;
        let mut store = AttributeStore::from_nodes(nodes);

        posterior_update_continuous_state_node(&topology, &mut store, parent, 1.0).unwrap();
        prop_assert!(store[parent].precision >= store[parent].expected_precision);
        prop_assert!(store[parent].mean.is_finite());
    }

    #[test]
    fn identical_inputs_give_identical_trajectories(
        observations in prop::collection::vec(-3.0f64..3.0, 1..20),
        tonic_volatility in -6.0f64..-1.0,
    ) {
        let run = || {
            let mut builder = NetworkBuilder::default();
            builder.add_nodes(NodeKind::Continuous, None, None).unwrap();
            let value = builder.add_nodes(NodeKind::Continuous, Some(vec![0]), None).unwrap();
            builder.add_nodes(NodeKind::Continuous, None, Some(vec![value])).unwrap();
            builder
                .set_attribute(value, rshgf::attributes::Field::TonicVolatility, tonic_volatility)
                .unwrap();
            let mut network = builder.build().unwrap();
            let rows: Vec<Vec<f64>> = observations.iter().map(|&x| vec![x]).collect();
            network.input_data(&rows, None)
        };

        let first = run();
        let second = run();
        prop_assert_eq!(first.is_ok(), second.is_ok());
        if let (Ok(first), Ok(second)) = (first, second) {
            prop_assert_eq!(first, second);
        }
    }
}
