// Copyright 2026 Neurite Project
// SPDX-License-Identifier: Apache-2.0

/*!
Fixed total number rule.

`n` edges in total are distributed over the virtual processes by a
sequential-binomial emulation of the multinomial distribution, driven by
the rank-synchronized stream so every rank computes the same partition.
Each worker thread then draws its own VP's pairs from its VP-specific
stream.
*/

use rand::Rng;
use rand_distr::{Binomial, Distribution};

use neurite_kernel::{NodeHandle, NodeId};

use crate::builder::core::BuilderCore;
use crate::error::{ConnectError, ConnectResult};

pub(crate) struct FixedTotalNumber {
    n: i64,
}

impl FixedTotalNumber {
    pub(crate) fn new(core: &BuilderCore<'_>, n: i64) -> ConnectResult<Self> {
        if !core.allow_multapses && n > (core.sources.len() * core.targets.len()) as i64 {
            return Err(ConnectError::bad_property(
                "the total number of connections cannot exceed the product of source \
                 and target population sizes",
            ));
        }
        if n < 0 {
            return Err(ConnectError::bad_property(
                "the total number of connections cannot be negative",
            ));
        }
        if !core.allow_multapses {
            return Err(ConnectError::not_implemented(
                "the fixed-total-number rule does not support the suppression of multapses",
            ));
        }
        Ok(Self { n })
    }

    pub(crate) fn connect(&self, core: &mut BuilderCore<'_>) -> ConnectResult<()> {
        let topology = core.kernel.topology();
        let num_vps = topology.num_vps();
        let size_targets = core.targets.len();

        let mut targets_on_vp = vec![0usize; num_vps];
        for tnode in core.targets.iter() {
            targets_on_vp[topology.node_to_vp(tnode)] += 1;
        }

        // Partition n over the virtual processes: sequential binomial draws
        // with the remaining probability mass, equivalent to one multinomial
        // draw. Consumes the rank-synchronized stream in identical order on
        // every rank.
        let mut grng = core.kernel.rank_synced_rng();
        let mut conns_on_vp = vec![0i64; num_vps];
        let mut sum_dist = 0.0;
        let mut sum_partitions = 0i64;

        for vp in 0..num_vps {
            if sum_partitions == self.n {
                break;
            }
            if targets_on_vp[vp] > 0 {
                // counts and their partial sums are integers, exact in f64,
                // so this ratio never exceeds 1
                let p_local = targets_on_vp[vp] as f64 / (size_targets as f64 - sum_dist);
                let binomial = Binomial::new((self.n - sum_partitions) as u64, p_local)
                    .map_err(|e| ConnectError::Kernel(format!("binomial draw failed: {e}")))?;
                conns_on_vp[vp] = binomial.sample(&mut grng) as i64;
            }
            sum_dist += targets_on_vp[vp] as f64;
            sum_partitions += conns_on_vp[vp];
        }

        core.parallel_region(|core, tid| {
            let topology = core.kernel.topology();
            let vp = topology.thread_to_vp(tid);
            let mut rng = core.kernel.rng().vp_specific_rng(vp);

            let vp_targets: Vec<NodeId> = core
                .targets
                .iter()
                .filter(|&t| topology.node_to_vp(t) == vp)
                .collect();
            debug_assert_eq!(vp_targets.len(), targets_on_vp[vp]);

            let mut remaining = conns_on_vp[vp];
            while remaining > 0 {
                let snode = core.sources.get(rng.gen_range(0..core.sources.len()));
                let tnode = vp_targets[rng.gen_range(0..vp_targets.len())];

                if core.allow_autapses || snode != tnode {
                    let NodeHandle::Local(target) = core.kernel.nodes().get(tnode, tid) else {
                        return Err(ConnectError::Kernel(
                            "fixed-total-number target is not owned by its virtual process"
                                .to_string(),
                        ));
                    };
                    core.single_connect(snode, target, tid, &mut rng)?;
                    remaining -= 1;
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
    fn test_range_checks() {
        let mut kernel = Kernel::build(SimulationConfig::local(1, 1));
        let sources = kernel.create_nodes(3);
        let targets = kernel.create_nodes(3);

        let core = BuilderCore::new(
            &kernel,
            sources.clone(),
            targets.clone(),
            true,
            true,
            false,
            &[],
        )
        .unwrap();
        assert!(FixedTotalNumber::new(&core, -1).is_err());
        assert!(FixedTotalNumber::new(&core, 0).is_ok());

        let no_multapses =
            BuilderCore::new(&kernel, sources, targets, true, false, false, &[]).unwrap();
        assert!(matches!(
            FixedTotalNumber::new(&no_multapses, 4),
            Err(ConnectError::NotImplemented(_))
        ));
        assert!(matches!(
            FixedTotalNumber::new(&no_multapses, 10),
            Err(ConnectError::BadProperty(_))
        ));
    }
}
