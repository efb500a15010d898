// Copyright 2026 Neurite Project
// SPDX-License-Identifier: Apache-2.0

/*!
# neurite-kernel

Simulation kernel services consumed by the connection construction core:

- `SimulationConfig` / `VpTopology`: the MPI-by-thread decomposition,
- `NodeCollection`: ordered id sequences with two-way index lookup,
- `NodeSpace`: node registry, locality queries, synaptic-element counters,
- `SynapseRegistry`: synapse model names, defaults and properties,
- `ConnectionTable`: per-thread edge storage,
- `RngFactory`: rank-synchronized and VP-specific random streams,
- `Kernel`: the bundle of all of the above plus the worker thread pool.

Everything here is deterministic and in-memory; a multi-rank run is
simulated by building one kernel per rank with the same seed.
*/

pub mod collection;
pub mod config;
pub mod kernel;
pub mod models;
pub mod nodes;
pub mod rng;
pub mod storage;
pub mod topology;
pub mod values;

/// Global node identifier; ids start at 1.
pub type NodeId = u64;

/// Identifier of a registered synapse model.
pub type SynapseModelId = usize;

pub use collection::NodeCollection;
pub use config::SimulationConfig;
pub use kernel::Kernel;
pub use models::{SynapseModel, SynapseRegistry};
pub use nodes::{LocalNode, NodeHandle, NodeSpace};
pub use rng::RngFactory;
pub use storage::{ConnectionTable, Edge, SynapseAttrs};
pub use topology::VpTopology;
pub use values::{AttrValue, DistributionSpec, SpecValue};
