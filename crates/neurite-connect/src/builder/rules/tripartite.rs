// Copyright 2026 Neurite Project
// SPDX-License-Identifier: Apache-2.0

/*!
Tripartite Bernoulli rule with third-factor pool.

For every (source, target) pair a primary Bernoulli trial is performed; on
success a conditional second trial may couple the pair to a third-factor
node drawn from a per-target pool. Three edge streams result: primary
source->target, third-in source->third and third-out third->target.

Structure and pool choice consume the rank-synchronized stream; per-edge
attributes come from the VP-specific stream. The two auxiliary streams
reuse the ordinary parameter machinery through auxiliary builder cores that
only ever parameterize, never iterate.
*/

use rand::seq::index;
use rand::Rng;
use rand_distr::{Binomial, Distribution};

use neurite_kernel::{NodeCollection, NodeHandle, NodeId};

use crate::builder::core::BuilderCore;
use crate::error::{ConnectError, ConnectResult};
use crate::spec::{PoolType, TripartiteSynapseSpecs};

pub(crate) struct TripartiteBernoulliWithPool<'k> {
    third: NodeCollection,

    /// Parameterize the source->third and third->target streams.
    third_in: BuilderCore<'k>,
    third_out: BuilderCore<'k>,

    p_primary: f64,
    p_third_if_primary: f64,
    random_pool: bool,
    pool_size: usize,
    targets_per_third: usize,
}

impl<'k> TripartiteBernoulliWithPool<'k> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        core: &BuilderCore<'k>,
        third: NodeCollection,
        p_primary: f64,
        p_third_if_primary: f64,
        pool_size: Option<usize>,
        pool_type: PoolType,
        specs: &TripartiteSynapseSpecs,
    ) -> ConnectResult<Self> {
        let random_pool = pool_type == PoolType::Random;
        let pool_size = pool_size.unwrap_or(third.len());

        if !(0.0..=1.0).contains(&p_primary) {
            return Err(ConnectError::bad_property(
                "probability of the primary connection 0 <= p_primary <= 1 required",
            ));
        }
        if !(0.0..=1.0).contains(&p_third_if_primary) {
            return Err(ConnectError::bad_property(
                "conditional probability of the third-factor connection \
                 0 <= p_third_if_primary <= 1 required",
            ));
        }
        if pool_size < 1 || third.len() < pool_size {
            return Err(ConnectError::bad_property(
                "pool size 1 <= pool_size <= size of the third-factor population required",
            ));
        }
        if !(random_pool
            || core.targets.len() * pool_size == third.len()
            || (pool_size == 1 && core.targets.len() % third.len() == 0))
        {
            return Err(ConnectError::bad_property(
                "the sizes of the target and third-factor populations and the chosen pool \
                 size do not fit; with pool_size == 1 the target population size must be a \
                 multiple of the third-factor population size, for pool_size > 1 \
                 size(targets) * pool_size == size(third) is required, and all other \
                 layouts need random pools",
            ));
        }

        let targets_per_third = core.targets.len() / third.len();

        let third_in = BuilderCore::new(
            core.kernel,
            core.sources.clone(),
            third.clone(),
            core.allow_autapses,
            core.allow_multapses,
            core.make_symmetric,
            &specs.third_in,
        )?;
        let third_out = BuilderCore::new(
            core.kernel,
            third.clone(),
            core.targets.clone(),
            core.allow_autapses,
            core.allow_multapses,
            core.make_symmetric,
            &specs.third_out,
        )?;

        Ok(Self {
            third,
            third_in,
            third_out,
            p_primary,
            p_third_if_primary,
            random_pool,
            pool_size,
            targets_per_third,
        })
    }

    /// Index of the first third-factor node pooled for the given target.
    fn first_pool_index(&self, target_index: usize) -> usize {
        if self.pool_size > 1 {
            return target_index * self.pool_size;
        }
        target_index / self.targets_per_third
    }

    pub(crate) fn connect(&self, core: &mut BuilderCore<'k>) -> ConnectResult<()> {
        core.parallel_region(|core, tid| {
            // Identical structure draws on every thread and rank; only the
            // locally owned share of each edge stream is emitted here.
            let mut synced = core.kernel.rank_synced_rng();
            let mut rng = core.kernel.vp_rng_for_thread(tid);
            let nodes = core.kernel.nodes();

            let binomial = Binomial::new(core.sources.len() as u64, self.p_primary)
                .map_err(|e| ConnectError::Kernel(format!("binomial draw failed: {e}")))?;

            for (target_index, tnode) in core.targets.iter().enumerate() {
                let target_handle = nodes.get(tnode, tid);

                let indegree = binomial.sample(&mut synced) as usize;
                if indegree == 0 {
                    continue;
                }

                let pool: Vec<NodeId> = if self.random_pool {
                    index::sample(&mut synced, self.third.len(), self.pool_size)
                        .iter()
                        .map(|i| self.third.get(i))
                        .collect()
                } else {
                    let first = self.first_pool_index(target_index);
                    (first..first + self.pool_size).map(|i| self.third.get(i)).collect()
                };

                // draw the primary sources without replacement, so this rule
                // cannot produce multapses by itself
                let picks = index::sample(&mut synced, core.sources.len(), indegree);
                for s_lid in picks.iter() {
                    let snode = core.sources.get(s_lid);
                    if !core.allow_autapses && snode == tnode {
                        continue;
                    }

                    if let NodeHandle::Local(target) = target_handle {
                        core.single_connect(snode, target, tid, &mut rng)?;
                    }

                    // conditional third-factor coupling
                    if synced.gen::<f64>() >= self.p_third_if_primary {
                        continue;
                    }

                    let pool_index = if self.pool_size == 1 {
                        0
                    } else {
                        synced.gen_range(0..self.pool_size)
                    };
                    let third_node = pool[pool_index];

                    if let NodeHandle::Local(third_local) = nodes.get(third_node, tid) {
                        self.third_in.single_connect(snode, third_local, tid, &mut rng)?;
                    }
                    if let NodeHandle::Local(target) = target_handle {
                        self.third_out.single_connect(third_node, target, tid, &mut rng)?;
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
    use neurite_kernel::{Kernel, SimulationConfig};

    fn setup(kernel: &mut Kernel) -> (NodeCollection, NodeCollection, NodeCollection) {
        let sources = kernel.create_nodes(4);
        let targets = kernel.create_nodes(8);
        let third = kernel.create_nodes(4);
        (sources, targets, third)
    }

    #[test]
    fn test_pool_sizing_checks() {
        let mut kernel = Kernel::build(SimulationConfig::local(1, 1));
        let (sources, targets, third) = setup(&mut kernel);
        let core =
            BuilderCore::new(&kernel, sources, targets, true, true, false, &[]).unwrap();
        let specs = TripartiteSynapseSpecs::default();

        // |targets| = 8, |third| = 4: block pools need pool_size = 1
        assert!(TripartiteBernoulliWithPool::new(
            &core,
            third.clone(),
            1.0,
            1.0,
            Some(1),
            PoolType::Block,
            &specs
        )
        .is_ok());
        assert!(TripartiteBernoulliWithPool::new(
            &core,
            third.clone(),
            1.0,
            1.0,
            Some(2),
            PoolType::Block,
            &specs
        )
        .is_err());
        assert!(TripartiteBernoulliWithPool::new(
            &core,
            third.clone(),
            1.0,
            1.0,
            Some(2),
            PoolType::Random,
            &specs
        )
        .is_ok());
        assert!(TripartiteBernoulliWithPool::new(
            &core,
            third.clone(),
            1.0,
            1.0,
            Some(0),
            PoolType::Random,
            &specs
        )
        .is_err());
        assert!(TripartiteBernoulliWithPool::new(
            &core,
            third,
            1.5,
            1.0,
            None,
            PoolType::Random,
            &specs
        )
        .is_err());
    }
}
