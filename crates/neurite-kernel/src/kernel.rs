// Copyright 2026 Neurite Project
// SPDX-License-Identifier: Apache-2.0

/*!
The kernel bundle.

One `Kernel` per simulated rank: it owns the VP topology, the node
registry, the synapse model registry, the connection table, the random
number factory and the fixed-size worker thread pool. Connection builders
borrow a kernel and drive all side effects through it.
*/

use rand::rngs::StdRng;
use tracing::info;

use crate::collection::NodeCollection;
use crate::config::SimulationConfig;
use crate::models::SynapseRegistry;
use crate::nodes::NodeSpace;
use crate::rng::RngFactory;
use crate::storage::ConnectionTable;
use crate::topology::VpTopology;
use crate::NodeId;

pub struct Kernel {
    config: SimulationConfig,
    topology: VpTopology,
    nodes: NodeSpace,
    models: SynapseRegistry,
    connections: ConnectionTable,
    rng: RngFactory,
    pool: rayon::ThreadPool,
}

impl Kernel {
    /// Build a kernel for the given configuration.
    pub fn build(config: SimulationConfig) -> Self {
        let topology = VpTopology::new(&config);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(topology.num_threads())
            .build()
            .expect("worker pool construction cannot fail with a positive thread count");
        info!(
            target: "neurite-kernel",
            "kernel up: rank {}/{}, {} worker thread(s), {} virtual process(es)",
            config.rank, config.num_ranks, topology.num_threads(), topology.num_vps()
        );
        Self {
            nodes: NodeSpace::new(topology.clone()),
            connections: ConnectionTable::new(topology.num_threads()),
            models: SynapseRegistry::with_defaults(),
            rng: RngFactory::new(config.rng_seed),
            topology,
            config,
            pool,
        }
    }

    /// Kernel with the default single-rank configuration.
    pub fn with_defaults() -> Self {
        Self::build(SimulationConfig::default())
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn topology(&self) -> &VpTopology {
        &self.topology
    }

    pub fn nodes(&self) -> &NodeSpace {
        &self.nodes
    }

    pub fn models(&self) -> &SynapseRegistry {
        &self.models
    }

    pub fn models_mut(&mut self) -> &mut SynapseRegistry {
        &mut self.models
    }

    pub fn connections(&self) -> &ConnectionTable {
        &self.connections
    }

    pub fn rng(&self) -> &RngFactory {
        &self.rng
    }

    /// Create `n` neurons.
    pub fn create_nodes(&mut self, n: usize) -> NodeCollection {
        self.nodes.create_nodes(n)
    }

    /// Create one proxyless device node.
    pub fn create_device(&mut self) -> NodeId {
        self.nodes.create_device()
    }

    /// Rank-synchronized stream, identical on every rank and thread.
    pub fn rank_synced_rng(&self) -> StdRng {
        self.rng.rank_synced_rng()
    }

    /// VP-specific stream of the virtual process run by `thread`.
    pub fn vp_rng_for_thread(&self, thread: usize) -> StdRng {
        self.rng.vp_specific_rng(self.topology.thread_to_vp(thread))
    }

    /// Run `f` once on every worker thread; results come back in thread
    /// index order. This is the parallel build region.
    pub fn broadcast<R, F>(&self, f: F) -> Vec<R>
    where
        R: Send,
        F: Fn(usize) -> R + Sync,
    {
        self.pool.broadcast(|ctx| f(ctx.index()))
    }
}
