// Copyright 2026 Neurite Project
// SPDX-License-Identifier: Apache-2.0

/*!
All-to-all rule: every source connects to every target.
*/

use rand::rngs::StdRng;

use neurite_kernel::{LocalNode, NodeHandle};

use crate::builder::core::BuilderCore;
use crate::error::ConnectResult;

pub(crate) struct AllToAll;

impl AllToAll {
    pub(crate) fn new() -> Self {
        Self
    }

    fn inner_connect(
        &self,
        core: &BuilderCore<'_>,
        tid: usize,
        rng: &mut StdRng,
        target: LocalNode,
        skip: bool,
    ) -> ConnectResult<()> {
        for snode in core.sources.iter() {
            if !core.allow_autapses && snode == target.id {
                if skip {
                    core.skip_conn_parameter(tid, 1);
                }
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
                            self.inner_connect(core, tid, &mut rng, target, true)?;
                        }
                        NodeHandle::Proxy(_) => {
                            // this target's whole source row is drawn elsewhere
                            core.skip_conn_parameter(tid, core.sources.len());
                        }
                    }
                }
            } else {
                for target in core.kernel.nodes().local_nodes(tid) {
                    if core.targets.get_lid(target.id).is_none() {
                        continue;
                    }
                    self.inner_connect(core, tid, &mut rng, target, false)?;
                }
            }
            Ok(())
        });
        Ok(())
    }

    pub(crate) fn disconnect(&self, core: &mut BuilderCore<'_>) -> ConnectResult<()> {
        core.parallel_region(|core, tid| {
            for tnode in core.targets.iter() {
                // disconnecting needs no parameter skipping
                if let NodeHandle::Local(target) = core.kernel.nodes().get(tnode, tid) {
                    for snode in core.sources.iter() {
                        core.single_disconnect(snode, target.id, tid);
                    }
                }
            }
            Ok(())
        });
        Ok(())
    }

    pub(crate) fn sp_connect(&self, core: &mut BuilderCore<'_>) -> ConnectResult<()> {
        core.parallel_region(|core, tid| {
            let mut rng = core.kernel.vp_rng_for_thread(tid);

            for tnode in core.targets.iter() {
                for snode in core.sources.iter() {
                    if !core.allow_autapses && snode == tnode {
                        core.skip_conn_parameter(tid, 1);
                        continue;
                    }
                    if !core.change_connected_synaptic_elements(snode, tnode, tid, 1) {
                        core.skip_conn_parameter(tid, core.sources.len());
                        continue;
                    }
                    let NodeHandle::Local(target) = core.kernel.nodes().get(tnode, tid) else {
                        continue;
                    };
                    core.single_connect(snode, target, tid, &mut rng)?;
                }
            }
            Ok(())
        });
        Ok(())
    }

    pub(crate) fn sp_disconnect(&self, core: &mut BuilderCore<'_>) -> ConnectResult<()> {
        core.parallel_region(|core, tid| {
            for tnode in core.targets.iter() {
                for snode in core.sources.iter() {
                    if !core.change_connected_synaptic_elements(snode, tnode, tid, -1) {
                        continue;
                    }
                    core.single_disconnect(snode, tnode, tid);
                }
            }
            Ok(())
        });
        Ok(())
    }
}
