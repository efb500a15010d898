// Copyright 2026 Neurite Project
// SPDX-License-Identifier: Apache-2.0

/*!
Structural plasticity builder.

Driven by the structural-plasticity controller, which hands in a fresh pair
list every update cycle instead of a connection rule. Reserving the
synaptic elements on both endpoints is part of the pair walk: a pair whose
target is not owned by the current thread only updates the locally owned
endpoint counters and advances the parameter cursors.
*/

use neurite_kernel::{Kernel, NodeCollection, NodeHandle, NodeId, SynapseModelId};

use crate::builder::core::BuilderCore;
use crate::error::{ConnectError, ConnectResult};
use crate::spec::SynapseSpec;

/// Builder creating and deleting synapses under structural plasticity.
pub struct StructuralPlasticityBuilder<'k> {
    core: BuilderCore<'k>,

    /// Identifies this builder in the controller's bookkeeping.
    name: String,
}

impl<'k> StructuralPlasticityBuilder<'k> {
    /// Set up the builder; the synapse specification must name both the
    /// pre- and the postsynaptic element.
    pub fn new(
        kernel: &'k Kernel,
        sources: NodeCollection,
        targets: NodeCollection,
        allow_autapses: bool,
        syn_specs: &[SynapseSpec],
    ) -> ConnectResult<Self> {
        let core = BuilderCore::new(kernel, sources, targets, allow_autapses, true, false, syn_specs)?;
        if !core.use_structural_plasticity {
            return Err(ConnectError::bad_property(
                "pre_synaptic_element and/or post_synaptic_element is missing",
            ));
        }
        Ok(Self {
            core,
            name: String::new(),
        })
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pre_synaptic_element(&self) -> &str {
        self.core.pre_element.as_deref().expect("checked at construction")
    }

    pub fn post_synaptic_element(&self) -> &str {
        self.core.post_element.as_deref().expect("checked at construction")
    }

    pub fn synapse_model(&self) -> ConnectResult<SynapseModelId> {
        self.core.synapse_model()
    }

    pub fn uses_default_delay(&self) -> ConnectResult<bool> {
        self.core.uses_default_delay()
    }

    /// The model-default delay, when this builder leaves the delay to the
    /// model; `None` when the specification pins the delay per edge.
    pub fn default_delay(&self) -> ConnectResult<Option<f64>> {
        if !self.uses_default_delay()? {
            return Ok(None);
        }
        let model = self.synapse_model()?;
        Ok(self
            .core
            .kernel
            .models()
            .defaults(model)
            .get("delay")
            .and_then(|v| v.as_double()))
    }

    /// Create synapses for the controller's pair list.
    pub fn sp_connect(&mut self, sources: &[NodeId], targets: &[NodeId]) -> ConnectResult<()> {
        self.pair_walk(sources, targets, 1)?;
        self.core.raise_first_failure()
    }

    /// Delete synapses for the controller's pair list.
    pub fn sp_disconnect(&mut self, sources: &[NodeId], targets: &[NodeId]) -> ConnectResult<()> {
        self.pair_walk(sources, targets, -1)?;
        self.core.raise_first_failure()
    }

    fn pair_walk(&mut self, sources: &[NodeId], targets: &[NodeId], delta: i64) -> ConnectResult<()> {
        if sources.len() != targets.len() {
            return Err(ConnectError::DimensionMismatch(
                "source and target pair lists must be of the same size".to_string(),
            ));
        }

        self.core.parallel_region(|core, tid| {
            let mut rng = core.kernel.vp_rng_for_thread(tid);

            for (&snode, &tnode) in sources.iter().zip(targets.iter()) {
                if snode == tnode && !core.allow_autapses {
                    continue;
                }

                // reservation doubles as the locality decision; a pair that
                // is not ours still advances the parameter cursors
                if !core.change_connected_synaptic_elements(snode, tnode, tid, delta) {
                    if delta > 0 {
                        core.skip_conn_parameter(tid, 1);
                    }
                    continue;
                }

                if delta > 0 {
                    let NodeHandle::Local(target) = core.kernel.nodes().get(tnode, tid) else {
                        continue;
                    };
                    core.single_connect(snode, target, tid, &mut rng)?;
                } else {
                    core.single_disconnect(snode, tnode, tid);
                }
            }
            Ok(())
        });
        Ok(())
    }
}
