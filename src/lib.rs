// Copyright 2026 Neurite Project
// SPDX-License-Identifier: Apache-2.0

/*!
# Neurite

Connection construction core for distributed spiking network simulations.

This umbrella crate re-exports the two member crates:

- [`neurite_kernel`]: the simulation kernel services (topology, node
  registry, synapse models, connection storage, random streams),
- [`neurite_connect`]: the connection rule builders that materialize
  synaptic edges into the kernel.

## Quick start

```no_run
use neurite::{ConnSpec, ConnectionBuilder, Kernel, RuleSpec, SynapseSpec};

let mut kernel = Kernel::with_defaults();
let sources = kernel.create_nodes(100);
let targets = kernel.create_nodes(100);

let conn_spec = ConnSpec::new(RuleSpec::PairwiseBernoulli { p: 0.1.into() });
let syn_spec = SynapseSpec::new("stdp_synapse").weight(0.5).delay(1.5);

let mut builder = ConnectionBuilder::new(
    &kernel,
    sources,
    targets,
    &conn_spec,
    &[syn_spec],
)?;
builder.connect()?;

println!("{} edges", kernel.connections().len());
# Ok::<(), neurite::ConnectError>(())
```
*/

pub use neurite_connect::{
    ConnParameter, ConnSpec, ConnectError, ConnectResult, ConnectionBuilder, PoolType, RuleSpec,
    StructuralPlasticityBuilder, SynapseSpec, TripartiteSynapseSpecs,
};
pub use neurite_kernel::{
    AttrValue, ConnectionTable, DistributionSpec, Edge, Kernel, LocalNode, NodeCollection,
    NodeHandle, NodeId, NodeSpace, RngFactory, SimulationConfig, SpecValue, SynapseAttrs,
    SynapseModelId, SynapseRegistry, VpTopology,
};
