use std::sync::Arc;
use std::thread;

use rshgf::attributes::{AttributeStore, NodeAttributes};
use rshgf::error::HgfError;
use rshgf::math::CouplingKind;
use rshgf::model::{Network, NetworkBuilder};
use rshgf::topology::{AdjacencyLists, NodeKind, Topology};
use rshgf::updates::posterior::continuous::posterior_update_continuous_state_node;
use test_log::test;

fn assert_close(actual: f64, expected: f64, label: &str) {
    let tol = 1e-9;
    assert!(
        (actual - expected).abs() < tol,
        "{}: expected {}, got {} (diff = {})",
        label,
        expected,
        actual,
        (actual - expected).abs()
    );
}

/// Node 0: binary input, node 1: continuous value parent.
fn binary_hgf() -> Network {
    let mut builder = NetworkBuilder::default();
    builder.add_nodes(NodeKind::Binary, None, None).unwrap();
    builder.add_nodes(NodeKind::Continuous, Some(vec![0]), None).unwrap();
    builder.build().unwrap()
}

/// One continuous parent (node 1) over one binary child (node 0), with the
/// posterior step fed by hand-written priors.
fn parent_over_binary_child(kappa: f64) -> (Topology, AttributeStore) {
    let mut edges = vec![AdjacencyLists::new(NodeKind::Binary), AdjacencyLists::new(NodeKind::Continuous)];
    edges[1].value_children = vec![0];
    edges[1].value_coupling_children = vec![kappa];
    edges[0].value_parents = vec![1];
    edges[0].value_coupling_parents = vec![kappa];
    edges[0].value_coupling_fn_parents = vec![CouplingKind::Linear];

    let child = NodeAttributes {
        mean: 0.8,
        expected_mean: 0.6,
        expected_precision: 4.0,
        ..NodeAttributes::default()
    };
    let parent = NodeAttributes {
        mean: 0.5,
        expected_mean: 0.5,
        expected_precision: 2.0,
        ..NodeAttributes::default()
    };
    (Topology::new(edges).unwrap(), AttributeStore::from_nodes(vec![child, parent]))
}

#[test]
fn test_concrete_posterior() {
    let (topology, mut store) = parent_over_binary_child(1.0);
    posterior_update_continuous_state_node(&topology, &mut store, 1, 1.0).unwrap();

    assert_close(store[1].precision, 2.25, "parent precision");
    assert_close(store[1].mean, 0.5 + 0.2 / 2.25, "parent mean");
    assert!((store[1].mean - 0.5889).abs() < 1e-4);
}

#[test]
fn test_negative_coupling_is_numerical_instability() {
    let (topology, mut store) = parent_over_binary_child(-10.0);
    let before = store.clone();

    let err = posterior_update_continuous_state_node(&topology, &mut store, 1, 1.0).unwrap_err();
    assert!(matches!(err, HgfError::NumericalInstability { node: 1, quantity: "precision", .. }));
    assert_eq!(store, before);
}

#[test]
fn test_failed_trial_leaves_network_unchanged() {
    let mut builder = NetworkBuilder::default();
    builder.add_nodes(NodeKind::Binary, None, None).unwrap();
    builder.add_nodes(NodeKind::Continuous, Some(vec![0]), None).unwrap();
    builder.set_value_coupling(1, 0, -10.0).unwrap();
    let mut network = builder.build().unwrap();
    let before = network.attributes().clone();

    // π = π̂ - 10/4 < 0
    let err = network.input_trial(&[1.0], None).unwrap_err();
    assert!(matches!(err, HgfError::NumericalInstability { node: 1, .. }));
    assert_eq!(network.attributes(), &before);

    let err = network.input_data(&[vec![1.0], vec![0.0]], None).unwrap_err();
    assert!(matches!(err, HgfError::NumericalInstability { .. }));
    assert_eq!(network.attributes(), &before);
}

#[test]
fn test_single_child_identity() {
    let mut network = binary_hgf();
    for observation in [1.0, 0.0, 0.0, 1.0, 1.0] {
        let trial = network.input_trial(&[observation], None).unwrap();
        let (child, parent) = (trial[0], trial[1]);
        assert_close(
            parent.precision,
            parent.expected_precision + 1.0 / child.expected_precision,
            "parent precision",
        );
        assert_close(
            parent.mean,
            parent.expected_mean + (child.mean - child.expected_mean) / parent.precision,
            "parent mean",
        );
    }
}

#[test]
fn test_binary_sequence() {
    let mut network = binary_hgf();
    let node_trajectories = network.input_data(&[vec![1.0], vec![0.0]], None).unwrap();

    let first = node_trajectories.trial(0).unwrap();
    assert_close(first[0].expected_mean, 0.5, "trial 0 child expected mean");
    assert_close(first[0].expected_precision, 4.0, "trial 0 child expected precision");
    assert_close(first[1].expected_precision, 0.9820137900379085, "trial 0 parent expected precision");
    assert_close(first[1].precision, 1.2320137900379085, "trial 0 parent precision");
    assert_close(first[1].mean, 0.4058396131950887, "trial 0 parent mean");

    let second = node_trajectories.trial(1).unwrap();
    assert_close(second[1].expected_precision, 1.2048267306617129, "trial 1 parent expected precision");
    assert_close(second[0].expected_mean, 0.6000898778538399, "trial 1 child expected mean");
    assert_close(second[1].precision, 1.4448087470129163, "trial 1 parent precision");
    assert_close(second[1].mean, -0.009502472111704685, "trial 1 parent mean");
}

#[test]
fn test_zero_children_pass_through() {
    let topology = Topology::new(vec![AdjacencyLists::new(NodeKind::Continuous)]).unwrap();

    let parent = NodeAttributes {
        mean: 0.3,
        expected_mean: 0.7,
        expected_precision: 1.5,
        ..NodeAttributes::default()
    };
    let mut store = AttributeStore::from_nodes(vec![parent]);
    posterior_update_continuous_state_node(&topology, &mut store, 0, 1.0).unwrap();
    assert_eq!(store[0].mean, 0.7);
    assert_eq!(store[0].precision, 1.5);
}

#[test]
fn test_children_order_does_not_matter() {
    fn run(children: Vec<usize>) -> NodeAttributes {
        let mut builder = NetworkBuilder::default();
        builder.add_nodes(NodeKind::Binary, None, None).unwrap();
        builder.add_nodes(NodeKind::Continuous, None, None).unwrap();
        builder.add_nodes(NodeKind::Binary, None, None).unwrap();
        builder.add_nodes(NodeKind::Continuous, Some(children), None).unwrap();
        builder.set_value_coupling(3, 0, 0.7).unwrap();
        builder.set_value_coupling(3, 1, 1.3).unwrap();
        builder.set_value_coupling(3, 2, 0.4).unwrap();
        let mut network = builder.build().unwrap();
        let mut last = None;
        for observations in [[1.0, 0.3, 0.0], [0.0, -0.2, 1.0], [1.0, 0.1, 1.0]] {
            last = Some(network.input_trial(&observations, None).unwrap()[3]);
        }
        last.unwrap()
    }

    let reference = run(vec![0, 1, 2]);
    for children in [vec![2, 0, 1], vec![1, 2, 0], vec![2, 1, 0]] {
        let permuted = run(children);
        assert!((permuted.mean - reference.mean).abs() < 1e-12);
        assert!((permuted.precision - reference.precision).abs() < 1e-12);
    }
}

#[test]
fn test_identical_runs_are_bit_identical() {
    let observations: Vec<Vec<f64>> = [1.0, 1.0, 0.0, 1.0, 0.0, 0.0, 1.0].iter().map(|&x| vec![x]).collect();
    let first = binary_hgf().input_data(&observations, None).unwrap();
    let second = binary_hgf().input_data(&observations, None).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_topology_is_shared_across_threads() {
    let network = binary_hgf();
    let topology = Arc::clone(network.topology());
    let attributes = network.attributes().clone();

    let handles: Vec<_> = [vec![1.0, 0.0], vec![0.0, 0.0, 1.0]]
        .into_iter()
        .map(|sequence| {
            let topology = Arc::clone(&topology);
            let attributes = attributes.clone();
            thread::spawn(move || {
                let mut network = Network::new(topology, attributes, Default::default()).unwrap();
                let rows: Vec<Vec<f64>> = sequence.iter().map(|&x| vec![x]).collect();
                network.input_data(&rows, None).unwrap().len()
            })
        })
        .collect();

    let lengths: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(lengths, vec![2, 3]);
    assert_eq!(Arc::strong_count(&topology), 2);
}
