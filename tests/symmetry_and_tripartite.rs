// Copyright 2026 Neurite Project
// SPDX-License-Identifier: Apache-2.0

/*!
Symmetrization, the symmetric Bernoulli rule and the tripartite rule.
*/

use std::collections::HashMap;
use std::collections::HashSet;

use neurite::{
    ConnSpec, ConnectError, ConnectionBuilder, DistributionSpec, Edge, Kernel, NodeId, PoolType,
    RuleSpec, SimulationConfig, SynapseSpec, TripartiteSynapseSpecs,
};

fn kernel(threads: usize, seed: u64) -> Kernel {
    Kernel::build(SimulationConfig::local(threads, seed))
}

fn pair_counts(edges: &[Edge]) -> HashMap<(NodeId, NodeId), usize> {
    let mut counts = HashMap::new();
    for e in edges {
        *counts.entry((e.source, e.target)).or_insert(0) += 1;
    }
    counts
}

#[test]
fn test_make_symmetric_one_to_one_builds_both_directions() {
    let mut kernel = kernel(2, 1);
    let sources = kernel.create_nodes(3);
    let targets = kernel.create_nodes(3);
    let weights = vec![0.1, 0.2, 0.3];

    ConnectionBuilder::new(
        &kernel,
        sources,
        targets,
        &ConnSpec::new(RuleSpec::OneToOne).symmetric(true),
        &[SynapseSpec::new("static_synapse").weight(weights.clone())],
    )
    .unwrap()
    .connect()
    .unwrap();

    let edges = kernel.connections().edges();
    assert_eq!(edges.len(), 6);
    let pairs: HashSet<(NodeId, NodeId)> = edges.iter().map(|e| (e.source, e.target)).collect();
    assert_eq!(
        pairs,
        HashSet::from([(1, 4), (2, 5), (3, 6), (4, 1), (5, 2), (6, 3)])
    );

    // the replay resets the weight array, so both directions of a pair
    // carry the same value
    for edge in &edges {
        let index = ((edge.source - 1) % 3) as usize;
        assert_eq!(edge.weight, Some(weights[index]));
    }
}

#[test]
fn test_make_symmetric_requires_rule_support() {
    let mut kernel = kernel(1, 1);
    let sources = kernel.create_nodes(3);
    let targets = kernel.create_nodes(3);

    let err = ConnectionBuilder::new(
        &kernel,
        sources,
        targets,
        &ConnSpec::new(RuleSpec::AllToAll).symmetric(true),
        &[],
    )
    .unwrap()
    .connect()
    .unwrap_err();
    assert!(matches!(err, ConnectError::NotImplemented(_)));
}

#[test]
fn test_make_symmetric_rejects_random_parameters() {
    let mut kernel = kernel(1, 1);
    let sources = kernel.create_nodes(3);
    let targets = kernel.create_nodes(3);

    // random parameters cannot replay their draws, so the builder refuses
    // already at construction
    let err = ConnectionBuilder::new(
        &kernel,
        sources,
        targets,
        &ConnSpec::new(RuleSpec::OneToOne).symmetric(true),
        &[SynapseSpec::new("static_synapse").weight(DistributionSpec::Normal {
            mean: 1.0,
            std: 0.5,
        })],
    )
    .map(|_| ())
    .unwrap_err();
    assert!(matches!(err, ConnectError::NotImplemented(_)));
}

#[test]
fn test_requires_symmetric_model_accepts_intrinsic_symmetry() {
    let mut kernel = kernel(2, 1);
    let nodes = kernel.create_nodes(4);

    // all-to-all on identical populations with scalar parameters is
    // intrinsically symmetric
    ConnectionBuilder::new(
        &kernel,
        nodes.clone(),
        nodes.clone(),
        &ConnSpec::new(RuleSpec::AllToAll),
        &[SynapseSpec::new("gap_junction").weight(0.7)],
    )
    .unwrap()
    .connect()
    .unwrap();
    assert_eq!(kernel.connections().len(), 16);

    kernel.connections().clear();
    let err = ConnectionBuilder::new(
        &kernel,
        nodes.clone(),
        nodes,
        &ConnSpec::new(RuleSpec::PairwiseBernoulli { p: 0.5.into() }),
        &[SynapseSpec::new("gap_junction")],
    )
    .unwrap()
    .connect()
    .unwrap_err();
    assert!(matches!(err, ConnectError::BadProperty(_)));
}

#[test]
fn test_symmetric_bernoulli_builds_a_symmetric_multigraph() {
    let mut kernel = kernel(2, 21);
    let nodes = kernel.create_nodes(10);

    ConnectionBuilder::new(
        &kernel,
        nodes.clone(),
        nodes.clone(),
        &ConnSpec::new(RuleSpec::SymmetricPairwiseBernoulli { p: 0.5 })
            .autapses(false)
            .multapses(true)
            .symmetric(true),
        &[],
    )
    .unwrap()
    .connect()
    .unwrap();

    let edges = kernel.connections().edges();
    assert!(!edges.is_empty());
    assert!(edges.iter().all(|e| e.source != e.target));

    let counts = pair_counts(&edges);
    for (&(s, t), &n) in &counts {
        assert_eq!(
            counts.get(&(t, s)).copied().unwrap_or(0),
            n,
            "edge ({s}, {t}) lacks its mirror"
        );
    }

    // exact symmetry implies equal in- and out-degree per node
    for node in nodes.iter() {
        let out_degree = edges.iter().filter(|e| e.source == node).count();
        let in_degree = edges.iter().filter(|e| e.target == node).count();
        assert_eq!(out_degree, in_degree);
    }
}

#[test]
fn test_symmetric_bernoulli_flag_validation() {
    let mut kernel = kernel(1, 1);
    let nodes = kernel.create_nodes(4);

    let build = |spec: ConnSpec, kernel: &Kernel| {
        ConnectionBuilder::new(kernel, nodes.clone(), nodes.clone(), &spec, &[]).map(|_| ())
    };

    // autapses must be off, multapses on, make_symmetric on
    assert!(build(
        ConnSpec::new(RuleSpec::SymmetricPairwiseBernoulli { p: 0.3 }).symmetric(true),
        &kernel
    )
    .is_err());
    assert!(build(
        ConnSpec::new(RuleSpec::SymmetricPairwiseBernoulli { p: 0.3 })
            .autapses(false)
            .multapses(false)
            .symmetric(true),
        &kernel
    )
    .is_err());
    assert!(build(
        ConnSpec::new(RuleSpec::SymmetricPairwiseBernoulli { p: 0.3 }).autapses(false),
        &kernel
    )
    .is_err());
    assert!(build(
        ConnSpec::new(RuleSpec::SymmetricPairwiseBernoulli { p: 1.0 })
            .autapses(false)
            .symmetric(true),
        &kernel
    )
    .is_err());
    assert!(build(
        ConnSpec::new(RuleSpec::SymmetricPairwiseBernoulli { p: 0.3 })
            .autapses(false)
            .symmetric(true),
        &kernel
    )
    .is_ok());
}

fn tripartite_specs() -> TripartiteSynapseSpecs {
    // distinct weights tell the three edge streams apart in the table
    TripartiteSynapseSpecs {
        primary: vec![SynapseSpec::new("static_synapse").weight(1.0)],
        third_in: vec![SynapseSpec::new("static_synapse").weight(2.0)],
        third_out: vec![SynapseSpec::new("static_synapse").weight(3.0)],
    }
}

#[test]
fn test_tripartite_block_pool_of_one() {
    let mut kernel = kernel(2, 13);
    let sources = kernel.create_nodes(4);
    let targets = kernel.create_nodes(4);
    let third = kernel.create_nodes(4);

    ConnectionBuilder::tripartite(
        &kernel,
        sources.clone(),
        targets.clone(),
        third.clone(),
        &ConnSpec::new(RuleSpec::TripartiteBernoulliWithPool {
            p_primary: 1.0,
            p_third_if_primary: 1.0,
            pool_size: Some(1),
            pool_type: PoolType::Block,
        }),
        &tripartite_specs(),
    )
    .unwrap()
    .connect()
    .unwrap();

    let edges = kernel.connections().edges();
    let primary: Vec<&Edge> = edges.iter().filter(|e| e.weight == Some(1.0)).collect();
    let third_in: Vec<&Edge> = edges.iter().filter(|e| e.weight == Some(2.0)).collect();
    let third_out: Vec<&Edge> = edges.iter().filter(|e| e.weight == Some(3.0)).collect();

    // p_primary = 1: the primary stream is the full bipartite graph
    assert_eq!(primary.len(), 16);

    // each target 5+k is pooled with exactly the third-factor node 9+k
    for (k, tnode) in targets.iter().enumerate() {
        let expected_third = third.get(k);
        for e in third_out.iter().filter(|e| e.target == tnode) {
            assert_eq!(e.source, expected_third);
        }
        assert_eq!(
            third_out.iter().filter(|e| e.target == tnode).count(),
            sources.len()
        );
    }

    // every source feeds every pooled third-factor node
    assert_eq!(third_in.len(), 16);
    for e in &third_in {
        assert!(sources.contains(e.source));
        assert!(third.contains(e.target));
    }
}

#[test]
fn test_tripartite_block_pool_neighbors_stay_in_the_pool() {
    let mut kernel = kernel(2, 17);
    let sources = kernel.create_nodes(4);
    let targets = kernel.create_nodes(4);
    let third = kernel.create_nodes(8);

    ConnectionBuilder::tripartite(
        &kernel,
        sources,
        targets.clone(),
        third.clone(),
        &ConnSpec::new(RuleSpec::TripartiteBernoulliWithPool {
            p_primary: 1.0,
            p_third_if_primary: 1.0,
            pool_size: Some(2),
            pool_type: PoolType::Block,
        }),
        &tripartite_specs(),
    )
    .unwrap()
    .connect()
    .unwrap();

    let edges = kernel.connections().edges();
    for (k, tnode) in targets.iter().enumerate() {
        let pool: HashSet<NodeId> = [third.get(2 * k), third.get(2 * k + 1)].into();
        for e in edges.iter().filter(|e| e.weight == Some(3.0) && e.target == tnode) {
            assert!(pool.contains(&e.source));
        }
    }
}

#[test]
fn test_tripartite_pool_sizing_mismatch() {
    let mut kernel = kernel(1, 1);
    let sources = kernel.create_nodes(4);
    let targets = kernel.create_nodes(4);
    let third = kernel.create_nodes(3);

    let err = ConnectionBuilder::tripartite(
        &kernel,
        sources,
        targets,
        third,
        &ConnSpec::new(RuleSpec::TripartiteBernoulliWithPool {
            p_primary: 1.0,
            p_third_if_primary: 1.0,
            pool_size: Some(1),
            pool_type: PoolType::Block,
        }),
        &TripartiteSynapseSpecs::default(),
    )
    .map(|_| ())
    .unwrap_err();
    assert!(matches!(err, ConnectError::BadProperty(_)));
}

#[test]
fn test_tripartite_requires_the_tripartite_rule() {
    let mut kernel = kernel(1, 1);
    let sources = kernel.create_nodes(2);
    let targets = kernel.create_nodes(2);
    let third = kernel.create_nodes(2);

    let err = ConnectionBuilder::tripartite(
        &kernel,
        sources.clone(),
        targets.clone(),
        third,
        &ConnSpec::new(RuleSpec::AllToAll),
        &TripartiteSynapseSpecs::default(),
    )
    .map(|_| ())
    .unwrap_err();
    assert!(matches!(err, ConnectError::BadProperty(_)));

    let err = ConnectionBuilder::new(
        &kernel,
        sources,
        targets,
        &ConnSpec::new(RuleSpec::TripartiteBernoulliWithPool {
            p_primary: 1.0,
            p_third_if_primary: 1.0,
            pool_size: None,
            pool_type: PoolType::Random,
        }),
        &[],
    )
    .map(|_| ())
    .unwrap_err();
    assert!(matches!(err, ConnectError::BadProperty(_)));
}

#[test]
fn test_tripartite_conditional_trial_off_leaves_only_primary_edges() {
    let mut kernel = kernel(2, 19);
    let sources = kernel.create_nodes(3);
    let targets = kernel.create_nodes(3);
    let third = kernel.create_nodes(3);

    ConnectionBuilder::tripartite(
        &kernel,
        sources,
        targets,
        third,
        &ConnSpec::new(RuleSpec::TripartiteBernoulliWithPool {
            p_primary: 1.0,
            p_third_if_primary: 0.0,
            pool_size: None,
            pool_type: PoolType::Random,
        }),
        &tripartite_specs(),
    )
    .unwrap()
    .connect()
    .unwrap();

    let edges = kernel.connections().edges();
    assert_eq!(edges.len(), 9);
    assert!(edges.iter().all(|e| e.weight == Some(1.0)));
}
