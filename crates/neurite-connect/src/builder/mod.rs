// Copyright 2026 Neurite Project
// SPDX-License-Identifier: Apache-2.0

/*!
Connection builders.

`ConnectionBuilder` binds a rule, two node collections and one or more
synapse specifications to a kernel and materializes the requested edges
into the kernel's connection table. `StructuralPlasticityBuilder` is the
variant driven by externally supplied pair lists.

All range and structure validation happens while a builder is constructed;
`connect` and `disconnect` only fail on conditions that can emerge inside
the build itself, re-raised from the per-thread failure slots.
*/

pub(crate) mod core;
mod rules;
mod sp;

use tracing::debug;

use neurite_kernel::{Kernel, NodeCollection, SynapseModelId};

use crate::error::{ConnectError, ConnectResult};
use crate::spec::{ConnSpec, RuleSpec, SynapseSpec, TripartiteSynapseSpecs};

use self::core::BuilderCore;
use self::rules::{Rule, TripartiteBernoulliWithPool};

pub use self::sp::StructuralPlasticityBuilder;

/// Builder for one connection request.
pub struct ConnectionBuilder<'k> {
    core: BuilderCore<'k>,
    rule: Rule<'k>,
}

impl<'k> ConnectionBuilder<'k> {
    /// Set up a builder for any bipartite rule.
    pub fn new(
        kernel: &'k Kernel,
        sources: NodeCollection,
        targets: NodeCollection,
        conn_spec: &ConnSpec,
        syn_specs: &[SynapseSpec],
    ) -> ConnectResult<Self> {
        let mut core = BuilderCore::new(
            kernel,
            sources,
            targets,
            conn_spec.allow_autapses,
            conn_spec.allow_multapses,
            conn_spec.make_symmetric,
            syn_specs,
        )?;
        let rule = Rule::from_spec(&mut core, &conn_spec.rule)?;
        core.requires_proxies = rule.requires_proxies();
        Ok(Self { core, rule })
    }

    /// Set up a builder for the tripartite rule, which couples a
    /// third-factor population to the primary source-target pairs.
    pub fn tripartite(
        kernel: &'k Kernel,
        sources: NodeCollection,
        targets: NodeCollection,
        third: NodeCollection,
        conn_spec: &ConnSpec,
        syn_specs: &TripartiteSynapseSpecs,
    ) -> ConnectResult<Self> {
        let RuleSpec::TripartiteBernoulliWithPool {
            p_primary,
            p_third_if_primary,
            pool_size,
            pool_type,
        } = &conn_spec.rule
        else {
            return Err(ConnectError::bad_property(
                "a third-factor population is only supported by the \
                 tripartite_bernoulli_with_pool rule",
            ));
        };

        let mut core = BuilderCore::new(
            kernel,
            sources,
            targets,
            conn_spec.allow_autapses,
            conn_spec.allow_multapses,
            conn_spec.make_symmetric,
            &syn_specs.primary,
        )?;
        let rule = Rule::Tripartite(TripartiteBernoulliWithPool::new(
            &core,
            third,
            *p_primary,
            *p_third_if_primary,
            *pool_size,
            *pool_type,
            syn_specs,
        )?);
        core.requires_proxies = rule.requires_proxies();
        Ok(Self { core, rule })
    }

    /// Synapse model id; defined only when a single synapse spec is used.
    pub fn synapse_model(&self) -> ConnectResult<SynapseModelId> {
        self.core.synapse_model()
    }

    /// Whether the delay comes from the model default; single-spec only.
    pub fn uses_default_delay(&self) -> ConnectResult<bool> {
        self.core.uses_default_delay()
    }

    /// Materialize the requested edges.
    ///
    /// Validates the rule/model capability combination, dispatches to the
    /// structural-plasticity or plain path, replays with swapped endpoints
    /// when `make_symmetric` asks for it, and re-raises the first captured
    /// worker failure.
    pub fn connect(&mut self) -> ConnectResult<()> {
        let core = &mut self.core;
        let rule = &self.rule;

        // Tested here rather than at construction so the rule is fully
        // materialized when the capability questions are asked.
        for pipeline in &core.pipelines {
            let requires_symmetric = core.kernel.models().requires_symmetric(pipeline.model);
            if requires_symmetric && !(rule.is_symmetric(core) || core.make_symmetric) {
                return Err(ConnectError::bad_property(
                    "connections with this synapse model can only be created as one-to-one \
                     connections with make_symmetric enabled or as all-to-all connections \
                     with equal source and target populations and default or scalar \
                     parameters",
                ));
            }
        }

        if core.make_symmetric && !rule.supports_symmetric() {
            return Err(ConnectError::not_implemented(
                "this connection rule does not support symmetric connections",
            ));
        }

        if core.use_structural_plasticity {
            if core.make_symmetric {
                return Err(ConnectError::not_implemented(
                    "symmetric connections are not supported in combination with \
                     structural plasticity",
                ));
            }
            rule.sp_connect(core)?;
        } else {
            rule.connect(core)?;

            if core.make_symmetric && !core.creates_symmetric_connections {
                // replay with swapped endpoints; parameters rewind to their
                // initial state so both passes make identical draws
                core.reset_all_parameters()?;
                core.swap_collections();
                rule.connect(core)?;
                core.swap_collections();
            }
        }

        let result = core.raise_first_failure();
        debug!(
            target: "neurite-connect",
            "{} build finished; connection table holds {} edge(s)",
            rule.name(),
            core.kernel.connections().len()
        );
        result
    }

    /// Remove the edges this specification describes.
    pub fn disconnect(&mut self) -> ConnectResult<()> {
        let core = &mut self.core;
        let rule = &self.rule;

        if core.use_structural_plasticity {
            rule.sp_disconnect(core)?;
        } else {
            rule.disconnect(core)?;
        }
        core.raise_first_failure()
    }
}
