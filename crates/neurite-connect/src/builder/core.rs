// Copyright 2026 Neurite Project
// SPDX-License-Identifier: Apache-2.0

/*!
Shared builder state.

`BuilderCore` is the context every rule strategy consumes: the source and
target collections, the common flags, one parameter pipeline per synapse
specification, the per-thread scratch dictionaries, and the per-thread
failure slots of the parallel build region.
*/

use parking_lot::Mutex;
use rand::rngs::StdRng;

use neurite_kernel::{
    AttrValue, Kernel, LocalNode, NodeCollection, NodeId, SynapseAttrs, SynapseModelId,
};

use crate::error::{ConnectError, ConnectResult};
use crate::params::ConnParameter;
use crate::spec::{SynapseSpec, POST_ELEMENT_KEY, PRE_ELEMENT_KEY, RESERVED_SYN_KEYS};

/// Parameter pipeline of one synapse specification.
pub(crate) struct SynapsePipeline {
    pub(crate) model: SynapseModelId,

    /// Weight or delay not given by the user, so the model default applies
    /// and the storage sentinel carries it.
    pub(crate) default_weight: bool,
    pub(crate) default_delay: bool,

    pub(crate) weight: Option<ConnParameter>,
    pub(crate) delay: Option<ConnParameter>,

    /// Remaining settable attributes, in the registry's stable order.
    pub(crate) attrs: Vec<(String, ConnParameter)>,

    /// Pre-allocated per-thread dictionaries with the numeric kind of every
    /// entry fixed at build time.
    scratch: Vec<Mutex<SynapseAttrs>>,
}

impl SynapsePipeline {
    fn new(kernel: &Kernel, spec: &SynapseSpec, num_threads: usize) -> ConnectResult<Self> {
        let model = kernel
            .models()
            .resolve(&spec.synapse_model)
            .ok_or_else(|| ConnectError::UnknownSynapseType(spec.synapse_model.clone()))?;

        for key in spec.params.keys() {
            let known = RESERVED_SYN_KEYS.contains(&key.as_str())
                || key == PRE_ELEMENT_KEY
                || key == POST_ELEMENT_KEY
                || kernel.models().has_param(model, key);
            if !known {
                return Err(ConnectError::bad_property(format!(
                    "unknown synapse parameter '{}' for model '{}'",
                    key, spec.synapse_model
                )));
            }
        }

        let default_weight = !spec.params.contains_key("weight");
        let default_delay = !spec.params.contains_key("delay");
        let weight = spec
            .params
            .get("weight")
            .map(|v| ConnParameter::from_spec(v, num_threads))
            .transpose()?;
        let delay = spec
            .params
            .get("delay")
            .map(|v| ConnParameter::from_spec(v, num_threads))
            .transpose()?;

        let mut attrs = Vec::new();
        for name in kernel.models().defaults(model).keys() {
            if RESERVED_SYN_KEYS.contains(&name.as_str()) {
                continue;
            }
            if let Some(value) = spec.params.get(name) {
                attrs.push((name.clone(), ConnParameter::from_spec(value, num_threads)?));
            }
        }

        let mut template = SynapseAttrs::with_capacity(attrs.len());
        for (name, param) in &attrs {
            let zero = if param.provides_long() {
                AttrValue::Long(0)
            } else {
                AttrValue::Double(0.0)
            };
            template.insert(name.clone(), zero);
        }
        let scratch = (0..num_threads).map(|_| Mutex::new(template.clone())).collect();

        Ok(Self {
            model,
            default_weight,
            default_delay,
            weight,
            delay,
            attrs,
            scratch,
        })
    }

    fn params(&self) -> impl Iterator<Item = &ConnParameter> {
        self.weight
            .iter()
            .chain(self.delay.iter())
            .chain(self.attrs.iter().map(|(_, p)| p))
    }
}

/// Context object shared by all rule strategies.
pub(crate) struct BuilderCore<'k> {
    pub(crate) kernel: &'k Kernel,
    pub(crate) sources: NodeCollection,
    pub(crate) targets: NodeCollection,

    pub(crate) allow_autapses: bool,
    pub(crate) allow_multapses: bool,
    pub(crate) make_symmetric: bool,
    pub(crate) creates_symmetric_connections: bool,
    pub(crate) requires_proxies: bool,

    pub(crate) use_structural_plasticity: bool,
    pub(crate) pre_element: Option<String>,
    pub(crate) post_element: Option<String>,

    pub(crate) pipelines: Vec<SynapsePipeline>,

    /// One captured-failure slot per worker thread.
    failures: Vec<Option<ConnectError>>,
}

impl<'k> BuilderCore<'k> {
    pub(crate) fn new(
        kernel: &'k Kernel,
        sources: NodeCollection,
        targets: NodeCollection,
        allow_autapses: bool,
        allow_multapses: bool,
        make_symmetric: bool,
        syn_specs: &[SynapseSpec],
    ) -> ConnectResult<Self> {
        if sources.is_empty() {
            return Err(ConnectError::bad_property("source collection must not be empty"));
        }
        if targets.is_empty() {
            return Err(ConnectError::bad_property("target collection must not be empty"));
        }

        let num_threads = kernel.topology().num_threads();
        let default_spec;
        let specs: &[SynapseSpec] = if syn_specs.is_empty() {
            default_spec = [SynapseSpec::new("static_synapse")];
            &default_spec
        } else {
            syn_specs
        };

        let mut pipelines = Vec::with_capacity(specs.len());
        for spec in specs {
            pipelines.push(SynapsePipeline::new(kernel, spec, num_threads)?);
        }

        for pipeline in &pipelines {
            for param in pipeline.params() {
                if let Some(len) = param.array_len() {
                    if len != sources.len() && len != targets.len() {
                        return Err(ConnectError::bad_property(
                            "array parameter length must match the source or target population size",
                        ));
                    }
                }
            }
        }

        let mut core = Self {
            kernel,
            sources,
            targets,
            allow_autapses,
            allow_multapses,
            make_symmetric,
            creates_symmetric_connections: false,
            requires_proxies: true,
            use_structural_plasticity: false,
            pre_element: None,
            post_element: None,
            pipelines,
            failures: (0..num_threads).map(|_| None).collect(),
        };

        core.set_structural_plasticity_parameters(specs)?;

        // Probe resettability now so unsupported parameters fail eagerly.
        if core.make_symmetric {
            core.reset_all_parameters()?;
        }

        Ok(core)
    }

    fn set_structural_plasticity_parameters(&mut self, specs: &[SynapseSpec]) -> ConnectResult<()> {
        let any_sp = specs.iter().any(|s| {
            s.params.contains_key(PRE_ELEMENT_KEY) || s.params.contains_key(POST_ELEMENT_KEY)
        });
        if !any_sp {
            return Ok(());
        }

        if specs.len() > 1 {
            return Err(ConnectError::Kernel(
                "structural plasticity can only be used with a single synapse specification"
                    .to_string(),
            ));
        }

        let spec = &specs[0];
        let pre = spec.params.get(PRE_ELEMENT_KEY).and_then(|v| v.as_str());
        let post = spec.params.get(POST_ELEMENT_KEY).and_then(|v| v.as_str());
        let (Some(pre), Some(post)) = (pre, post) else {
            return Err(ConnectError::bad_property(
                "structural plasticity requires both a pre- and a postsynaptic element",
            ));
        };
        self.set_synaptic_element_names(pre, post)
    }

    pub(crate) fn set_synaptic_element_names(&mut self, pre: &str, post: &str) -> ConnectResult<()> {
        if pre.is_empty() || post.is_empty() {
            return Err(ConnectError::bad_property("synaptic element names cannot be empty"));
        }
        self.pre_element = Some(pre.to_string());
        self.post_element = Some(post.to_string());
        self.use_structural_plasticity = true;
        Ok(())
    }

    pub(crate) fn num_threads(&self) -> usize {
        self.kernel.topology().num_threads()
    }

    /// Synapse model id, defined only for single-spec builders.
    pub(crate) fn synapse_model(&self) -> ConnectResult<SynapseModelId> {
        if self.pipelines.len() > 1 {
            return Err(ConnectError::Kernel(
                "can only retrieve the synapse model when a single synapse specification is used"
                    .to_string(),
            ));
        }
        Ok(self.pipelines[0].model)
    }

    /// Whether the delay comes from the model default, single-spec only.
    pub(crate) fn uses_default_delay(&self) -> ConnectResult<bool> {
        if self.pipelines.len() > 1 {
            return Err(ConnectError::Kernel(
                "can only retrieve the default delay when a single synapse specification is used"
                    .to_string(),
            ));
        }
        Ok(self.pipelines[0].default_delay)
    }

    pub(crate) fn all_parameters_scalar(&self) -> bool {
        self.pipelines.iter().all(|pipeline| {
            pipeline.params().all(|p| p.is_scalar())
        })
    }

    fn has_skip_params(&self) -> bool {
        self.pipelines.iter().any(|pipeline| pipeline.params().any(|p| p.is_array()))
    }

    /// Advance every array-indexed parameter by `n` on this thread.
    ///
    /// Called from exactly the loop positions where `value` would have been
    /// called for a local pair, so cursors stay in lockstep across the
    /// distributed iteration.
    pub(crate) fn skip_conn_parameter(&self, thread: usize, n: usize) {
        for pipeline in &self.pipelines {
            for param in pipeline.params() {
                if param.is_array() {
                    param.skip(thread, n);
                }
            }
        }
    }

    /// Whether the rule should iterate the target collection rather than
    /// this thread's local nodes.
    ///
    /// Local-node iteration is only safe when the target collection covers
    /// the whole id space contiguously and no array cursor needs advancing.
    pub(crate) fn loop_over_targets(&self) -> bool {
        self.targets.len() < self.kernel.nodes().size()
            || !self.targets.is_contiguous()
            || self.has_skip_params()
    }

    /// Restore every parameter to its initial deterministic state.
    pub(crate) fn reset_all_parameters(&self) -> ConnectResult<()> {
        for pipeline in &self.pipelines {
            for param in pipeline.params() {
                param.reset()?;
            }
        }
        Ok(())
    }

    pub(crate) fn swap_collections(&mut self) {
        std::mem::swap(&mut self.sources, &mut self.targets);
    }

    /// Emit one edge per synapse specification.
    ///
    /// Fills the thread's scratch dictionary from the attribute pipelines,
    /// then hands the edge to the connection table through one of four fast
    /// paths depending on which of weight and delay are user-supplied.
    pub(crate) fn single_connect(
        &self,
        snode: NodeId,
        target: LocalNode,
        thread: usize,
        rng: &mut StdRng,
    ) -> ConnectResult<()> {
        if self.requires_proxies && !target.has_proxies {
            return Err(ConnectError::IllegalConnection(
                "cannot use this rule to connect to nodes without proxies (usually devices)"
                    .to_string(),
            ));
        }

        for pipeline in &self.pipelines {
            let attrs = {
                let mut dict = pipeline.scratch[thread].lock();
                for (name, param) in &pipeline.attrs {
                    let slot = dict
                        .get_mut(name)
                        .expect("scratch dictionaries are pre-allocated per attribute");
                    *slot = if param.provides_long() {
                        AttrValue::Long(param.value_long(thread, rng)?)
                    } else {
                        AttrValue::Double(param.value_double(thread, rng)?)
                    };
                }
                dict.clone()
            };

            let table = self.kernel.connections();
            match (pipeline.default_weight, pipeline.default_delay) {
                (true, true) => {
                    table.connect(snode, target.id, thread, pipeline.model, attrs, None, None);
                }
                (true, false) => {
                    let delay = self.delay_value(pipeline, thread, rng)?;
                    table.connect(snode, target.id, thread, pipeline.model, attrs, Some(delay), None);
                }
                (false, true) => {
                    let weight = self.weight_value(pipeline, thread, rng)?;
                    table.connect(snode, target.id, thread, pipeline.model, attrs, None, Some(weight));
                }
                (false, false) => {
                    let delay = self.delay_value(pipeline, thread, rng)?;
                    let weight = self.weight_value(pipeline, thread, rng)?;
                    table.connect(
                        snode,
                        target.id,
                        thread,
                        pipeline.model,
                        attrs,
                        Some(delay),
                        Some(weight),
                    );
                }
            }
        }
        Ok(())
    }

    fn delay_value(
        &self,
        pipeline: &SynapsePipeline,
        thread: usize,
        rng: &mut StdRng,
    ) -> ConnectResult<f64> {
        pipeline
            .delay
            .as_ref()
            .expect("a user-supplied delay parameter exists on this path")
            .value_double(thread, rng)
    }

    fn weight_value(
        &self,
        pipeline: &SynapsePipeline,
        thread: usize,
        rng: &mut StdRng,
    ) -> ConnectResult<f64> {
        pipeline
            .weight
            .as_ref()
            .expect("a user-supplied weight parameter exists on this path")
            .value_double(thread, rng)
    }

    /// Remove one edge per synapse specification.
    pub(crate) fn single_disconnect(&self, snode: NodeId, tnode: NodeId, thread: usize) {
        for pipeline in &self.pipelines {
            self.kernel
                .connections()
                .disconnect(snode, tnode, thread, pipeline.model);
        }
    }

    /// Update the connected synaptic-element counts on both endpoints.
    ///
    /// The source's pre-element count is touched only when the source is
    /// owned by the calling thread, the target's post-element count only
    /// when the target is. Returns whether the edge itself belongs on this
    /// thread, i.e. whether the target is thread-local.
    pub(crate) fn change_connected_synaptic_elements(
        &self,
        snode: NodeId,
        tnode: NodeId,
        thread: usize,
        delta: i64,
    ) -> bool {
        let nodes = self.kernel.nodes();

        if nodes.owner_thread(snode) == Some(thread) {
            if let Some(pre) = &self.pre_element {
                nodes.connect_synaptic_element(snode, pre, delta);
            }
        }

        match nodes.owner_thread(tnode) {
            Some(owner) if owner == thread => {
                if let Some(post) = &self.post_element {
                    nodes.connect_synaptic_element(tnode, post, delta);
                }
                true
            }
            _ => false,
        }
    }

    /// Run `f` once per worker thread and capture per-thread failures.
    ///
    /// A worker never lets an error cross the region boundary; its result
    /// lands in the thread's failure slot and the first populated slot is
    /// re-raised by `raise_first_failure` after all regions have run.
    pub(crate) fn parallel_region<F>(&mut self, f: F)
    where
        F: Fn(&BuilderCore<'k>, usize) -> ConnectResult<()> + Sync,
    {
        let results = {
            let core: &BuilderCore<'k> = self;
            core.kernel.broadcast(|tid| f(core, tid))
        };
        self.record_failures(results);
    }

    fn record_failures(&mut self, results: Vec<ConnectResult<()>>) {
        for (thread, result) in results.into_iter().enumerate() {
            if let Err(err) = result {
                if self.failures[thread].is_none() {
                    self.failures[thread] = Some(err);
                }
            }
        }
    }

    /// Re-raise the first captured worker failure, if any.
    pub(crate) fn raise_first_failure(&mut self) -> ConnectResult<()> {
        let Some(thread) = self.failures.iter().position(|slot| slot.is_some()) else {
            return Ok(());
        };
        let err = self.failures[thread].take().expect("slot is populated");
        for slot in &mut self.failures {
            *slot = None;
        }
        Err(ConnectError::WrappedThread {
            thread,
            source: Box::new(err),
        })
    }
}
