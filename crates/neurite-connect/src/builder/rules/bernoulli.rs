// Copyright 2026 Neurite Project
// SPDX-License-Identifier: Apache-2.0

/*!
Pairwise Bernoulli rule.

Every (source, target) pair is connected with probability `p`, drawn from
the target VP's stream. The rule cannot produce multapses by construction.
*/

use rand::rngs::StdRng;
use rand::Rng;

use neurite_kernel::{LocalNode, NodeHandle, SpecValue};

use crate::builder::core::BuilderCore;
use crate::error::{ConnectError, ConnectResult};
use crate::params::ConnParameter;

pub(crate) struct PairwiseBernoulli {
    p: ConnParameter,
}

impl PairwiseBernoulli {
    pub(crate) fn new(core: &BuilderCore<'_>, p: &SpecValue) -> ConnectResult<Self> {
        let param = match p {
            SpecValue::Double(_) | SpecValue::Long(_) => {
                let value = p.as_double().expect("scalar spec value");
                if !(0.0..=1.0).contains(&value) {
                    return Err(ConnectError::bad_property(
                        "connection probability 0 <= p <= 1 required",
                    ));
                }
                ConnParameter::from_spec(p, core.num_threads())?
            }
            SpecValue::Distribution(_) => ConnParameter::from_spec(p, core.num_threads())?,
            _ => {
                return Err(ConnectError::bad_property(
                    "connection probability must be a scalar or a distribution",
                ));
            }
        };
        Ok(Self { p: param })
    }

    fn inner_connect(
        &self,
        core: &BuilderCore<'_>,
        tid: usize,
        rng: &mut StdRng,
        target: LocalNode,
    ) -> ConnectResult<()> {
        for snode in core.sources.iter() {
            if !core.allow_autapses && snode == target.id {
                continue;
            }
            if rng.gen::<f64>() >= self.p.value_double(tid, rng)? {
                continue;
            }
            core.single_connect(snode, target, tid, rng)?;
        }
        Ok(())
    }

    pub(crate) fn connect(&self, core: &mut BuilderCore<'_>) -> ConnectResult<()> {
        core.parallel_region(|core, tid| {
            let mut rng = core.kernel.vp_rng_for_thread(tid);

            if core.loop_over_targets() {
                for tnode in core.targets.iter() {
                    match core.kernel.nodes().get(tnode, tid) {
                        NodeHandle::Local(target) => {
                            self.inner_connect(core, tid, &mut rng, target)?;
                        }
                        NodeHandle::Proxy(_) => {
                            // array parameters are handled in other virtual processes
                            core.skip_conn_parameter(tid, 1);
                        }
                    }
                }
            } else {
                for target in core.kernel.nodes().local_nodes(tid) {
                    if core.targets.get_lid(target.id).is_none() {
                        continue;
                    }
                    self.inner_connect(core, tid, &mut rng, target)?;
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
    use neurite_kernel::{Kernel, SimulationConfig};

    #[test]
    fn test_probability_range() {
        let mut kernel = Kernel::build(SimulationConfig::local(1, 1));
        let nodes = kernel.create_nodes(5);
        let core =
            BuilderCore::new(&kernel, nodes.clone(), nodes, true, true, false, &[]).unwrap();

        assert!(PairwiseBernoulli::new(&core, &SpecValue::Double(-0.1)).is_err());
        assert!(PairwiseBernoulli::new(&core, &SpecValue::Double(1.1)).is_err());
        assert!(PairwiseBernoulli::new(&core, &SpecValue::Double(0.3)).is_ok());
        assert!(PairwiseBernoulli::new(&core, &SpecValue::Long(1)).is_ok());
    }
}
