// Copyright 2026 Neurite Project
// SPDX-License-Identifier: Apache-2.0

/*!
Symmetric pairwise Bernoulli rule.

Produces an exactly symmetric multigraph. Every thread on every rank
replays the identical sequence of draws from the rank-synchronized stream:
a truncated binomial in-degree per target, then that many distinct sources.
Each chosen pair is emitted in both directions, each direction only by the
thread owning the respective endpoint. Because emission counts differ
across threads while the synced stream must not, attribute parameters
should be scalar; the builder consumes the synced stream for attribute
draws exactly like the structural draws.
*/

use ahash::AHashSet;
use rand::Rng;
use rand_distr::{Binomial, Distribution};

use neurite_kernel::{NodeHandle, NodeId};

use crate::builder::core::BuilderCore;
use crate::error::{ConnectError, ConnectResult};

pub(crate) struct SymmetricBernoulli {
    p: f64,
}

impl SymmetricBernoulli {
    pub(crate) fn new(core: &mut BuilderCore<'_>, p: f64) -> ConnectResult<Self> {
        // this rule takes care of symmetry on its own, no swap-replay needed
        core.creates_symmetric_connections = true;

        if !(0.0..1.0).contains(&p) {
            return Err(ConnectError::bad_property(
                "connection probability 0 <= p < 1 required",
            ));
        }
        if !core.allow_multapses {
            return Err(ConnectError::bad_property("multapses must be enabled"));
        }
        if core.allow_autapses {
            return Err(ConnectError::bad_property("autapses must be disabled"));
        }
        if !core.make_symmetric {
            return Err(ConnectError::bad_property("symmetric connections must be enabled"));
        }
        Ok(Self { p })
    }

    pub(crate) fn connect(&self, core: &mut BuilderCore<'_>) -> ConnectResult<()> {
        core.parallel_region(|core, tid| {
            let mut synced = core.kernel.rank_synced_rng();
            let nodes = core.kernel.nodes();
            let n_sources = core.sources.len();
            let binomial = Binomial::new(n_sources as u64, self.p)
                .map_err(|e| ConnectError::Kernel(format!("binomial draw failed: {e}")))?;

            let mut previous: AHashSet<NodeId> = AHashSet::new();

            for tnode in core.targets.iter() {
                // truncated binomial: redraw while the in-degree would not
                // leave room for distinct non-autapse sources
                let mut indegree = n_sources as u64;
                while indegree >= n_sources as u64 {
                    indegree = binomial.sample(&mut synced);
                }

                let target_handle = nodes.get(tnode, tid);
                previous.clear();

                let mut drawn = 0;
                while drawn < indegree {
                    let snode = core.sources.get(synced.gen_range(0..n_sources));

                    // Reject autapses and re-drawn sources. Symmetric
                    // counterparts created from the other endpoint may still
                    // produce multapses, which is why they must be allowed.
                    if snode == tnode || previous.contains(&snode) {
                        continue;
                    }
                    previous.insert(snode);

                    if let NodeHandle::Local(target) = target_handle {
                        core.single_connect(snode, target, tid, &mut synced)?;
                    }
                    if let NodeHandle::Local(source) = nodes.get(snode, tid) {
                        core.single_connect(tnode, source, tid, &mut synced)?;
                    }

                    drawn += 1;
                }
            }
            Ok(())
        });
        Ok(())
    }
}
