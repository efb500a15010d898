// Copyright 2026 Neurite Project
// SPDX-License-Identifier: Apache-2.0

/*!
Fixed in-degree rule.

For every target, `indegree` sources are drawn uniformly with replacement;
draws hitting a forbidden autapse or, with multapses disabled, an already
chosen source are rejected and repeated. All draws are local to the
target's virtual process.
*/

use ahash::AHashSet;
use rand::rngs::StdRng;
use rand::Rng;
use tracing::warn;

use neurite_kernel::{LocalNode, NodeHandle, SpecValue};

use crate::builder::core::BuilderCore;
use crate::error::{ConnectError, ConnectResult};
use crate::params::ConnParameter;

pub(crate) struct FixedInDegree {
    indegree: ConnParameter,
}

impl FixedInDegree {
    pub(crate) fn new(core: &BuilderCore<'_>, indegree: &SpecValue) -> ConnectResult<Self> {
        let n_sources = core.sources.len() as i64;

        if let SpecValue::Long(value) = indegree {
            let value = *value;
            if !core.allow_multapses {
                if value > n_sources {
                    return Err(ConnectError::bad_property(
                        "indegree cannot be larger than the source population size",
                    ));
                }
                if value == n_sources
                    && !core.allow_autapses
                    && core.sources.overlaps(&core.targets)
                {
                    return Err(ConnectError::bad_property(
                        "multapses and autapses are prohibited and the requested indegree \
                         equals the source population size; with overlapping source and \
                         target populations the draw loop cannot terminate",
                    ));
                }
                if value as f64 > 0.9 * n_sources as f64 {
                    warn!(
                        target: "neurite-connect",
                        "multapses are prohibited and more than 90% connectivity is \
                         requested; expect long build times"
                    );
                }
            }
            if value < 0 {
                return Err(ConnectError::bad_property("indegree cannot be less than zero"));
            }
        }

        let param = match indegree {
            SpecValue::Long(_) | SpecValue::LongArray(_) | SpecValue::Distribution(_) => {
                ConnParameter::from_spec(indegree, core.num_threads())?
            }
            _ => {
                return Err(ConnectError::bad_property(
                    "indegree must be an integer scalar, an integer array or a distribution",
                ));
            }
        };
        if let Some(len) = param.array_len() {
            if len != core.targets.len() {
                return Err(ConnectError::bad_property(
                    "an indegree array must have one entry per target",
                ));
            }
        }
        Ok(Self { indegree: param })
    }

    fn inner_connect(
        &self,
        core: &BuilderCore<'_>,
        tid: usize,
        rng: &mut StdRng,
        target: LocalNode,
        indegree: i64,
    ) -> ConnectResult<()> {
        let n_sources = core.sources.len();
        let mut chosen: AHashSet<usize> = AHashSet::new();

        for _ in 0..indegree.max(0) {
            loop {
                let s_lid = rng.gen_range(0..n_sources);
                let snode = core.sources.get(s_lid);
                let autapse = !core.allow_autapses && snode == target.id;
                let multapse = !core.allow_multapses && chosen.contains(&s_lid);
                if autapse || multapse {
                    continue;
                }
                if !core.allow_multapses {
                    chosen.insert(s_lid);
                }
                core.single_connect(snode, target, tid, rng)?;
                break;
            }
        }
        Ok(())
    }

    pub(crate) fn connect(&self, core: &mut BuilderCore<'_>) -> ConnectResult<()> {
        core.parallel_region(|core, tid| {
            let mut rng = core.kernel.vp_rng_for_thread(tid);

            // an array-indexed degree has its own cursor to keep aligned,
            // which rules out the local-node loop
            if core.loop_over_targets() || self.indegree.is_array() {
                for tnode in core.targets.iter() {
                    let handle = core.kernel.nodes().get(tnode, tid);
                    // evaluated for proxies too, to keep degree cursors aligned
                    let indegree = self.indegree.value_double(tid, &mut rng)?.round() as i64;
                    match handle {
                        NodeHandle::Local(target) => {
                            self.inner_connect(core, tid, &mut rng, target, indegree)?;
                        }
                        NodeHandle::Proxy(_) => {
                            core.skip_conn_parameter(tid, indegree.max(0) as usize);
                        }
                    }
                }
            } else {
                for target in core.kernel.nodes().local_nodes(tid) {
                    if core.targets.get_lid(target.id).is_none() {
                        continue;
                    }
                    let indegree = self.indegree.value_double(tid, &mut rng)?.round() as i64;
                    self.inner_connect(core, tid, &mut rng, target, indegree)?;
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

    fn core_with(
        kernel: &Kernel,
        sources: NodeCollection,
        targets: NodeCollection,
        multapses: bool,
        autapses: bool,
    ) -> BuilderCore<'_> {
        BuilderCore::new(kernel, sources, targets, autapses, multapses, false, &[]).unwrap()
    }

    #[test]
    fn test_indegree_range_checks() {
        let mut kernel = Kernel::build(SimulationConfig::local(1, 1));
        let nodes = kernel.create_nodes(10);
        let core = core_with(&kernel, nodes.clone(), nodes.clone(), false, true);

        assert!(FixedInDegree::new(&core, &SpecValue::Long(11)).is_err());
        assert!(FixedInDegree::new(&core, &SpecValue::Long(-1)).is_err());
        assert!(FixedInDegree::new(&core, &SpecValue::Long(5)).is_ok());
    }

    #[test]
    fn test_saturated_indegree_without_autapses_is_rejected() {
        let mut kernel = Kernel::build(SimulationConfig::local(1, 1));
        let nodes = kernel.create_nodes(10);
        let core = core_with(&kernel, nodes.clone(), nodes.clone(), false, false);
        assert!(FixedInDegree::new(&core, &SpecValue::Long(10)).is_err());
    }
}
