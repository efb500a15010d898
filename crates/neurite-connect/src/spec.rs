// Copyright 2026 Neurite Project
// SPDX-License-Identifier: Apache-2.0

/*!
Connection and synapse specifications.

`ConnSpec` names the connection rule plus the flags every rule understands;
`SynapseSpec` names a synapse model plus settable attributes. Both carry the
loosely typed `SpecValue`s of the dictionary layer and serialize naturally
to the JSON shape callers pass in.
*/

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use neurite_kernel::SpecValue;

/// Keys of a synapse spec that never become per-edge attribute pipelines.
pub(crate) const RESERVED_SYN_KEYS: &[&str] = &[
    "weight",
    "delay",
    "min_delay",
    "max_delay",
    "num_connections",
    "synapse_model",
];

pub(crate) const PRE_ELEMENT_KEY: &str = "pre_synaptic_element";
pub(crate) const POST_ELEMENT_KEY: &str = "post_synaptic_element";

/// Connection specification: rule plus common flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnSpec {
    #[serde(flatten)]
    pub rule: RuleSpec,

    #[serde(default = "default_true")]
    pub allow_autapses: bool,

    #[serde(default = "default_true")]
    pub allow_multapses: bool,

    #[serde(default)]
    pub make_symmetric: bool,
}

impl ConnSpec {
    pub fn new(rule: RuleSpec) -> Self {
        Self {
            rule,
            allow_autapses: true,
            allow_multapses: true,
            make_symmetric: false,
        }
    }

    pub fn autapses(mut self, allow: bool) -> Self {
        self.allow_autapses = allow;
        self
    }

    pub fn multapses(mut self, allow: bool) -> Self {
        self.allow_multapses = allow;
        self
    }

    pub fn symmetric(mut self, make_symmetric: bool) -> Self {
        self.make_symmetric = make_symmetric;
        self
    }
}

fn default_true() -> bool {
    true
}

fn default_probability() -> f64 {
    1.0
}

/// The connection rule catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum RuleSpec {
    OneToOne,
    AllToAll,
    FixedIndegree {
        indegree: SpecValue,
    },
    FixedOutdegree {
        outdegree: SpecValue,
    },
    FixedTotalNumber {
        n: i64,
    },
    PairwiseBernoulli {
        p: SpecValue,
    },
    SymmetricPairwiseBernoulli {
        p: f64,
    },
    TripartiteBernoulliWithPool {
        #[serde(default = "default_probability")]
        p_primary: f64,
        #[serde(default = "default_probability")]
        p_third_if_primary: f64,
        #[serde(default)]
        pool_size: Option<usize>,
        #[serde(default)]
        pool_type: PoolType,
    },
}

impl RuleSpec {
    /// Rule name as used in connection dictionaries and log output.
    pub fn name(&self) -> &'static str {
        match self {
            RuleSpec::OneToOne => "one_to_one",
            RuleSpec::AllToAll => "all_to_all",
            RuleSpec::FixedIndegree { .. } => "fixed_indegree",
            RuleSpec::FixedOutdegree { .. } => "fixed_outdegree",
            RuleSpec::FixedTotalNumber { .. } => "fixed_total_number",
            RuleSpec::PairwiseBernoulli { .. } => "pairwise_bernoulli",
            RuleSpec::SymmetricPairwiseBernoulli { .. } => "symmetric_pairwise_bernoulli",
            RuleSpec::TripartiteBernoulliWithPool { .. } => "tripartite_bernoulli_with_pool",
        }
    }
}

/// Third-factor pool layout of the tripartite rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolType {
    #[default]
    Random,
    Block,
}

/// Synapse specification: model name plus settable parameters.
///
/// Besides model attributes, the parameter map may carry `weight`, `delay`
/// and the structural-plasticity element names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynapseSpec {
    pub synapse_model: String,

    #[serde(flatten)]
    pub params: BTreeMap<String, SpecValue>,
}

impl SynapseSpec {
    pub fn new(synapse_model: &str) -> Self {
        Self {
            synapse_model: synapse_model.to_string(),
            params: BTreeMap::new(),
        }
    }

    /// Set one parameter, consuming and returning the spec.
    pub fn with(mut self, name: &str, value: impl Into<SpecValue>) -> Self {
        self.params.insert(name.to_string(), value.into());
        self
    }

    pub fn weight(self, value: impl Into<SpecValue>) -> Self {
        self.with("weight", value)
    }

    pub fn delay(self, value: impl Into<SpecValue>) -> Self {
        self.with("delay", value)
    }
}

/// Synapse specifications of the three edge streams of the tripartite rule.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TripartiteSynapseSpecs {
    #[serde(default)]
    pub primary: Vec<SynapseSpec>,
    #[serde(default)]
    pub third_in: Vec<SynapseSpec>,
    #[serde(default)]
    pub third_out: Vec<SynapseSpec>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conn_spec_from_json() {
        let spec: ConnSpec = serde_json::from_str(
            r#"{"rule": "fixed_indegree", "indegree": 5, "allow_multapses": false}"#,
        )
        .unwrap();
        assert!(matches!(
            spec.rule,
            RuleSpec::FixedIndegree {
                indegree: SpecValue::Long(5)
            }
        ));
        assert!(spec.allow_autapses);
        assert!(!spec.allow_multapses);
        assert!(!spec.make_symmetric);
    }

    #[test]
    fn test_tripartite_defaults() {
        let spec: ConnSpec =
            serde_json::from_str(r#"{"rule": "tripartite_bernoulli_with_pool"}"#).unwrap();
        match spec.rule {
            RuleSpec::TripartiteBernoulliWithPool {
                p_primary,
                p_third_if_primary,
                pool_size,
                pool_type,
            } => {
                assert_eq!(p_primary, 1.0);
                assert_eq!(p_third_if_primary, 1.0);
                assert_eq!(pool_size, None);
                assert_eq!(pool_type, PoolType::Random);
            }
            _ => panic!("wrong rule"),
        }
    }

    #[test]
    fn test_synapse_spec_builder() {
        let spec = SynapseSpec::new("stdp_synapse").weight(2.0).with("tau_plus", 15.0);
        assert_eq!(spec.params.len(), 2);
        let json = serde_json::to_string(&spec).unwrap();
        let back: SynapseSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(back.synapse_model, "stdp_synapse");
        assert_eq!(back.params.get("tau_plus"), Some(&SpecValue::Double(15.0)));
    }
}
