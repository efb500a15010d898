// Copyright 2026 Neurite Project
// SPDX-License-Identifier: Apache-2.0

/*!
# neurite-connect

Connection rule builders for the neurite simulation kernel.

A `ConnectionBuilder` takes two node collections, a `ConnSpec` naming one
of the connection rules, and a list of `SynapseSpec`s, and materializes the
corresponding synaptic edges into the kernel's per-thread connection
storage. Builds run on the kernel's worker team; draws that decide global
graph structure use the rank-synchronized random stream so the edge set is
identical under any rank and thread decomposition, while per-edge attribute
draws use the VP-specific streams.

```no_run
use neurite_kernel::Kernel;
use neurite_connect::{ConnSpec, ConnectionBuilder, RuleSpec, SynapseSpec};

let mut kernel = Kernel::with_defaults();
let sources = kernel.create_nodes(100);
let targets = kernel.create_nodes(10);

let conn_spec = ConnSpec::new(RuleSpec::FixedIndegree { indegree: 5.into() })
    .multapses(false);
let syn_spec = SynapseSpec::new("static_synapse").weight(2.5);

let mut builder =
    ConnectionBuilder::new(&kernel, sources, targets, &conn_spec, &[syn_spec])?;
builder.connect()?;
# Ok::<(), neurite_connect::ConnectError>(())
```
*/

pub mod builder;
pub mod error;
pub mod params;
pub mod spec;

pub use builder::{ConnectionBuilder, StructuralPlasticityBuilder};
pub use error::{ConnectError, ConnectResult};
pub use params::ConnParameter;
pub use spec::{ConnSpec, PoolType, RuleSpec, SynapseSpec, TripartiteSynapseSpecs};
