/*!
The connection rule catalog.

Shared builder logic lives in `BuilderCore`; each strategy here implements
one rule's iteration and drawing scheme. Capabilities that the base
dispatcher consults (intrinsic symmetry, symmetrization support, proxy
requirements) are answered per variant.
*/

pub(crate) mod all_to_all;
pub(crate) mod bernoulli;
pub(crate) mod fixed_indegree;
pub(crate) mod fixed_outdegree;
pub(crate) mod fixed_total_number;
pub(crate) mod one_to_one;
pub(crate) mod symmetric_bernoulli;
pub(crate) mod tripartite;

use crate::builder::core::BuilderCore;
use crate::error::{ConnectError, ConnectResult};
use crate::spec::RuleSpec;

pub(crate) use all_to_all::AllToAll;
pub(crate) use bernoulli::PairwiseBernoulli;
pub(crate) use fixed_indegree::FixedInDegree;
pub(crate) use fixed_outdegree::FixedOutDegree;
pub(crate) use fixed_total_number::FixedTotalNumber;
pub(crate) use one_to_one::OneToOne;
pub(crate) use symmetric_bernoulli::SymmetricBernoulli;
pub(crate) use tripartite::TripartiteBernoulliWithPool;

pub(crate) enum Rule<'k> {
    OneToOne(OneToOne),
    AllToAll(AllToAll),
    FixedInDegree(FixedInDegree),
    FixedOutDegree(FixedOutDegree),
    FixedTotalNumber(FixedTotalNumber),
    PairwiseBernoulli(PairwiseBernoulli),
    SymmetricBernoulli(SymmetricBernoulli),
    Tripartite(TripartiteBernoulliWithPool<'k>),
}

impl<'k> Rule<'k> {
    /// Materialize the non-tripartite rules; performs all construction-time
    /// range checks.
    pub(crate) fn from_spec(core: &mut BuilderCore<'k>, spec: &RuleSpec) -> ConnectResult<Self> {
        match spec {
            RuleSpec::OneToOne => Ok(Rule::OneToOne(OneToOne::new(core)?)),
            RuleSpec::AllToAll => Ok(Rule::AllToAll(AllToAll::new())),
            RuleSpec::FixedIndegree { indegree } => {
                Ok(Rule::FixedInDegree(FixedInDegree::new(core, indegree)?))
            }
            RuleSpec::FixedOutdegree { outdegree } => {
                Ok(Rule::FixedOutDegree(FixedOutDegree::new(core, outdegree)?))
            }
            RuleSpec::FixedTotalNumber { n } => {
                Ok(Rule::FixedTotalNumber(FixedTotalNumber::new(core, *n)?))
            }
            RuleSpec::PairwiseBernoulli { p } => {
                Ok(Rule::PairwiseBernoulli(PairwiseBernoulli::new(core, p)?))
            }
            RuleSpec::SymmetricPairwiseBernoulli { p } => {
                Ok(Rule::SymmetricBernoulli(SymmetricBernoulli::new(core, *p)?))
            }
            RuleSpec::TripartiteBernoulliWithPool { .. } => Err(ConnectError::bad_property(
                "the tripartite rule requires a third-factor population",
            )),
        }
    }

    pub(crate) fn name(&self) -> &'static str {
        match self {
            Rule::OneToOne(_) => "one_to_one",
            Rule::AllToAll(_) => "all_to_all",
            Rule::FixedInDegree(_) => "fixed_indegree",
            Rule::FixedOutDegree(_) => "fixed_outdegree",
            Rule::FixedTotalNumber(_) => "fixed_total_number",
            Rule::PairwiseBernoulli(_) => "pairwise_bernoulli",
            Rule::SymmetricBernoulli(_) => "symmetric_pairwise_bernoulli",
            Rule::Tripartite(_) => "tripartite_bernoulli_with_pool",
        }
    }

    /// Whether the base builder may symmetrize this rule by swap-replay.
    pub(crate) fn supports_symmetric(&self) -> bool {
        matches!(self, Rule::OneToOne(_) | Rule::SymmetricBernoulli(_))
    }

    /// Whether a run of this rule is intrinsically symmetric as configured.
    pub(crate) fn is_symmetric(&self, core: &BuilderCore<'_>) -> bool {
        match self {
            Rule::AllToAll(_) => core.sources == core.targets && core.all_parameters_scalar(),
            _ => false,
        }
    }

    /// Whether this rule can only target nodes with proxies.
    pub(crate) fn requires_proxies(&self) -> bool {
        !matches!(self, Rule::OneToOne(_) | Rule::AllToAll(_))
    }

    pub(crate) fn connect(&self, core: &mut BuilderCore<'k>) -> ConnectResult<()> {
        match self {
            Rule::OneToOne(rule) => rule.connect(core),
            Rule::AllToAll(rule) => rule.connect(core),
            Rule::FixedInDegree(rule) => rule.connect(core),
            Rule::FixedOutDegree(rule) => rule.connect(core),
            Rule::FixedTotalNumber(rule) => rule.connect(core),
            Rule::PairwiseBernoulli(rule) => rule.connect(core),
            Rule::SymmetricBernoulli(rule) => rule.connect(core),
            Rule::Tripartite(rule) => rule.connect(core),
        }
    }

    pub(crate) fn disconnect(&self, core: &mut BuilderCore<'k>) -> ConnectResult<()> {
        match self {
            Rule::OneToOne(rule) => rule.disconnect(core),
            Rule::AllToAll(rule) => rule.disconnect(core),
            _ => Err(ConnectError::not_implemented(
                "this disconnection rule is not implemented",
            )),
        }
    }

    pub(crate) fn sp_connect(&self, core: &mut BuilderCore<'k>) -> ConnectResult<()> {
        match self {
            Rule::OneToOne(rule) => rule.sp_connect(core),
            Rule::AllToAll(rule) => rule.sp_connect(core),
            _ => Err(ConnectError::not_implemented(
                "this connection rule is not implemented for structural plasticity",
            )),
        }
    }

    pub(crate) fn sp_disconnect(&self, core: &mut BuilderCore<'k>) -> ConnectResult<()> {
        match self {
            Rule::OneToOne(rule) => rule.sp_disconnect(core),
            Rule::AllToAll(rule) => rule.sp_disconnect(core),
            _ => Err(ConnectError::not_implemented(
                "this connection rule is not implemented for structural plasticity",
            )),
        }
    }
}
