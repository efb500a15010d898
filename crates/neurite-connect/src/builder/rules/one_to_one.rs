// Copyright 2026 Neurite Project
// SPDX-License-Identifier: Apache-2.0

/*!
One-to-one rule: `sources[i] -> targets[i]` for every index `i`.
*/

use neurite_kernel::NodeHandle;

use crate::builder::core::BuilderCore;
use crate::error::{ConnectError, ConnectResult};

pub(crate) struct OneToOne;

impl OneToOne {
    pub(crate) fn new(core: &BuilderCore<'_>) -> ConnectResult<Self> {
        if core.sources.len() != core.targets.len() {
            return Err(ConnectError::DimensionMismatch(
                "source and target population must be of the same size".to_string(),
            ));
        }
        Ok(Self)
    }

    pub(crate) fn connect(&self, core: &mut BuilderCore<'_>) -> ConnectResult<()> {
        core.parallel_region(|core, tid| {
            let mut rng = core.kernel.vp_rng_for_thread(tid);

            if core.loop_over_targets() {
                for lid in 0..core.targets.len() {
                    let snode = core.sources.get(lid);
                    let tnode = core.targets.get(lid);

                    if snode == tnode && !core.allow_autapses {
                        continue;
                    }

                    match core.kernel.nodes().get(tnode, tid) {
                        NodeHandle::Local(target) => {
                            core.single_connect(snode, target, tid, &mut rng)?;
                        }
                        NodeHandle::Proxy(_) => {
                            // array parameters are handled in other virtual processes
                            core.skip_conn_parameter(tid, 1);
                        }
                    }
                }
            } else {
                for target in core.kernel.nodes().local_nodes(tid) {
                    let Some(lid) = core.targets.get_lid(target.id) else {
                        continue;
                    };
                    // one-to-one, thus the target index doubles as source index
                    let snode = core.sources.get(lid);
                    if snode == target.id && !core.allow_autapses {
                        // no skipping required, we iterate only local nodes
                        continue;
                    }
                    core.single_connect(snode, target, tid, &mut rng)?;
                }
            }
            Ok(())
        });
        Ok(())
    }

    pub(crate) fn disconnect(&self, core: &mut BuilderCore<'_>) -> ConnectResult<()> {
        core.parallel_region(|core, tid| {
            for lid in 0..core.targets.len() {
                let snode = core.sources.get(lid);
                let tnode = core.targets.get(lid);

                // disconnecting needs no parameter skipping
                if let NodeHandle::Local(target) = core.kernel.nodes().get(tnode, tid) {
                    core.single_disconnect(snode, target.id, tid);
                }
            }
            Ok(())
        });
        Ok(())
    }

    pub(crate) fn sp_connect(&self, core: &mut BuilderCore<'_>) -> ConnectResult<()> {
        core.parallel_region(|core, tid| {
            let mut rng = core.kernel.vp_rng_for_thread(tid);

            for lid in 0..core.targets.len() {
                let snode = core.sources.get(lid);
                let tnode = core.targets.get(lid);

                if snode == tnode && !core.allow_autapses {
                    continue;
                }

                if !core.change_connected_synaptic_elements(snode, tnode, tid, 1) {
                    core.skip_conn_parameter(tid, 1);
                    continue;
                }
                let NodeHandle::Local(target) = core.kernel.nodes().get(tnode, tid) else {
                    continue;
                };
                core.single_connect(snode, target, tid, &mut rng)?;
            }
            Ok(())
        });
        Ok(())
    }

    pub(crate) fn sp_disconnect(&self, core: &mut BuilderCore<'_>) -> ConnectResult<()> {
        core.parallel_region(|core, tid| {
            for lid in 0..core.targets.len() {
                let snode = core.sources.get(lid);
                let tnode = core.targets.get(lid);

                if !core.change_connected_synaptic_elements(snode, tnode, tid, -1) {
                    continue;
                }
                core.single_disconnect(snode, tnode, tid);
            }
            Ok(())
        });
        Ok(())
    }
}
