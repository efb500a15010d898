// Copyright 2026 Neurite Project
// SPDX-License-Identifier: Apache-2.0

/*!
Fixed out-degree rule.

Globally coordinated: for every source, the target set is drawn from the
rank-synchronized stream, so every rank constructs the same plan. The
drawing phase runs serially; a single parallel region then emits the edges
whose target is locally owned.
*/

use ahash::AHashSet;
use rand::Rng;
use tracing::warn;

use neurite_kernel::{NodeHandle, NodeId, SpecValue};

use crate::builder::core::BuilderCore;
use crate::error::{ConnectError, ConnectResult};
use crate::params::ConnParameter;

pub(crate) struct FixedOutDegree {
    outdegree: ConnParameter,
}

impl FixedOutDegree {
    pub(crate) fn new(core: &BuilderCore<'_>, outdegree: &SpecValue) -> ConnectResult<Self> {
        let n_targets = core.targets.len() as i64;

        if let SpecValue::Long(value) = outdegree {
            let value = *value;
            if !core.allow_multapses {
                if value > n_targets {
                    return Err(ConnectError::bad_property(
                        "outdegree cannot be larger than the target population size",
                    ));
                }
                if value == n_targets
                    && !core.allow_autapses
                    && core.sources.overlaps(&core.targets)
                {
                    return Err(ConnectError::bad_property(
                        "multapses and autapses are prohibited and the requested outdegree \
                         equals the target population size; with overlapping source and \
                         target populations the draw loop cannot terminate",
                    ));
                }
                if value as f64 > 0.9 * n_targets as f64 {
                    warn!(
                        target: "neurite-connect",
                        "multapses are prohibited and more than 90% connectivity is \
                         requested; expect long build times"
                    );
                }
            }
            if value < 0 {
                return Err(ConnectError::bad_property("outdegree cannot be less than zero"));
            }
        }

        let param = match outdegree {
            SpecValue::Long(_) | SpecValue::LongArray(_) | SpecValue::Distribution(_) => {
                ConnParameter::from_spec(outdegree, core.num_threads())?
            }
            _ => {
                return Err(ConnectError::bad_property(
                    "outdegree must be an integer scalar, an integer array or a distribution",
                ));
            }
        };
        if let Some(len) = param.array_len() {
            if len != core.sources.len() {
                return Err(ConnectError::bad_property(
                    "an outdegree array must have one entry per source",
                ));
            }
        }
        Ok(Self { outdegree: param })
    }

    pub(crate) fn connect(&self, core: &mut BuilderCore<'_>) -> ConnectResult<()> {
        // Serial drawing phase on the rank-synchronized stream. Every rank
        // runs it identically and arrives at the same plan.
        let mut grng = core.kernel.rank_synced_rng();
        let n_targets = core.targets.len();
        let mut plan: Vec<(NodeId, Vec<NodeId>)> = Vec::with_capacity(core.sources.len());

        for snode in core.sources.iter() {
            let outdegree = self.outdegree.value_double(0, &mut grng)?.round() as i64;
            let mut chosen: AHashSet<usize> = AHashSet::new();
            let mut tgt_ids = Vec::with_capacity(outdegree.max(0) as usize);

            for _ in 0..outdegree.max(0) {
                loop {
                    let t_lid = grng.gen_range(0..n_targets);
                    let tnode = core.targets.get(t_lid);
                    let autapse = !core.allow_autapses && tnode == snode;
                    let multapse = !core.allow_multapses && chosen.contains(&t_lid);
                    if autapse || multapse {
                        continue;
                    }
                    if !core.allow_multapses {
                        chosen.insert(t_lid);
                    }
                    tgt_ids.push(tnode);
                    break;
                }
            }
            plan.push((snode, tgt_ids));
        }

        core.parallel_region(|core, tid| {
            let mut rng = core.kernel.vp_rng_for_thread(tid);

            for (snode, tgt_ids) in &plan {
                for &tnode in tgt_ids {
                    match core.kernel.nodes().get(tnode, tid) {
                        NodeHandle::Local(target) => {
                            core.single_connect(*snode, target, tid, &mut rng)?;
                        }
                        NodeHandle::Proxy(_) => {
                            // array parameters are handled in other virtual processes
                            core.skip_conn_parameter(tid, 1);
                        }
                    }
                }
            }
            Ok(())
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use neurite_kernel::{Kernel, NodeCollection, SimulationConfig};

    #[test]
    fn test_outdegree_range_checks() {
        let mut kernel = Kernel::build(SimulationConfig::local(1, 1));
        let sources = kernel.create_nodes(4);
        let targets = kernel.create_nodes(8);
        let core = BuilderCore::new(
            &kernel,
            NodeCollection::new(sources.ids().to_vec()),
            NodeCollection::new(targets.ids().to_vec()),
            true,
            false,
            false,
            &[],
        )
        .unwrap();

        assert!(FixedOutDegree::new(&core, &SpecValue::Long(9)).is_err());
        assert!(FixedOutDegree::new(&core, &SpecValue::Long(-2)).is_err());
        assert!(FixedOutDegree::new(&core, &SpecValue::Long(8)).is_ok());
    }
}
