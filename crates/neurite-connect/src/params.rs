// Copyright 2026 Neurite Project
// SPDX-License-Identifier: Apache-2.0

/*!
Connection parameters.

A `ConnParameter` produces one value per considered (source, target) pair.
Three shapes exist:

- constant scalars (double or long),
- distribution-backed values, sampled from the caller's RNG on every draw,
- array-indexed values, read off a fixed array through a per-thread cursor.

Array cursors must advance once per *attempted* pair, including pairs that
are skipped because the target lives on another virtual process. Rules call
`skip` from exactly the loop positions where `value` would have been called
for a local pair, which keeps the cursors in lockstep across any
decomposition.
*/

use std::sync::atomic::{AtomicUsize, Ordering};

use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand_distr::{Exp, LogNormal, Normal};

use neurite_kernel::{DistributionSpec, SpecValue};

use crate::error::{ConnectError, ConnectResult};

/// Polymorphic per-pair value producer.
pub enum ConnParameter {
    ConstantDouble(f64),
    ConstantLong(i64),
    Random(RandomParameter),
    DoubleArray(ArrayParameter<f64>),
    LongArray(ArrayParameter<i64>),
}

impl ConnParameter {
    /// Build a parameter from a specification value.
    pub fn from_spec(value: &SpecValue, num_threads: usize) -> ConnectResult<Self> {
        match value {
            SpecValue::Double(v) => Ok(ConnParameter::ConstantDouble(*v)),
            SpecValue::Long(v) => Ok(ConnParameter::ConstantLong(*v)),
            SpecValue::DoubleArray(values) => Ok(ConnParameter::DoubleArray(ArrayParameter::new(
                values.clone(),
                num_threads,
            ))),
            SpecValue::LongArray(values) => Ok(ConnParameter::LongArray(ArrayParameter::new(
                values.clone(),
                num_threads,
            ))),
            SpecValue::Distribution(spec) => Ok(ConnParameter::Random(RandomParameter::new(spec)?)),
            SpecValue::Bool(_) | SpecValue::Str(_) => Err(ConnectError::bad_property(
                "boolean and string values cannot be used as connection parameters",
            )),
        }
    }

    /// True for constant scalars.
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            ConnParameter::ConstantDouble(_) | ConnParameter::ConstantLong(_)
        )
    }

    /// True for array-indexed parameters, which require skip bookkeeping.
    pub fn is_array(&self) -> bool {
        matches!(
            self,
            ConnParameter::DoubleArray(_) | ConnParameter::LongArray(_)
        )
    }

    /// Whether values are integral.
    pub fn provides_long(&self) -> bool {
        match self {
            ConnParameter::ConstantLong(_) | ConnParameter::LongArray(_) => true,
            ConnParameter::Random(r) => r.provides_long(),
            _ => false,
        }
    }

    /// Length of the backing array, if any.
    pub fn array_len(&self) -> Option<usize> {
        match self {
            ConnParameter::DoubleArray(a) => Some(a.values.len()),
            ConnParameter::LongArray(a) => Some(a.values.len()),
            _ => None,
        }
    }

    /// Restore the initial deterministic state.
    ///
    /// Constants are stateless and array cursors rewind; distribution-backed
    /// parameters cannot replay their draws and therefore refuse.
    pub fn reset(&self) -> ConnectResult<()> {
        match self {
            ConnParameter::Random(_) => Err(ConnectError::not_implemented(
                "random parameters cannot be reset and therefore do not support symmetric connections",
            )),
            ConnParameter::DoubleArray(a) => {
                a.reset();
                Ok(())
            }
            ConnParameter::LongArray(a) => {
                a.reset();
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Advance the thread's cursor without producing a value.
    pub fn skip(&self, thread: usize, n: usize) {
        match self {
            ConnParameter::DoubleArray(a) => a.skip(thread, n),
            ConnParameter::LongArray(a) => a.skip(thread, n),
            _ => {}
        }
    }

    pub fn value_double(&self, thread: usize, rng: &mut StdRng) -> ConnectResult<f64> {
        match self {
            ConnParameter::ConstantDouble(v) => Ok(*v),
            ConnParameter::ConstantLong(v) => Ok(*v as f64),
            ConnParameter::Random(r) => Ok(r.sample_double(rng)),
            ConnParameter::DoubleArray(a) => a.value(thread),
            ConnParameter::LongArray(a) => a.value(thread).map(|v| v as f64),
        }
    }

    pub fn value_long(&self, thread: usize, rng: &mut StdRng) -> ConnectResult<i64> {
        match self {
            ConnParameter::ConstantLong(v) => Ok(*v),
            ConnParameter::LongArray(a) => a.value(thread),
            ConnParameter::Random(r) if r.provides_long() => Ok(r.sample_double(rng) as i64),
            _ => Err(ConnectError::Kernel(
                "expected an integer-valued parameter".to_string(),
            )),
        }
    }
}

/// Array-backed parameter with one cursor per worker thread.
pub struct ArrayParameter<T> {
    values: Vec<T>,
    next: Vec<AtomicUsize>,
}

impl<T: Copy> ArrayParameter<T> {
    fn new(values: Vec<T>, num_threads: usize) -> Self {
        Self {
            values,
            next: (0..num_threads).map(|_| AtomicUsize::new(0)).collect(),
        }
    }

    fn value(&self, thread: usize) -> ConnectResult<T> {
        let idx = self.next[thread].fetch_add(1, Ordering::Relaxed);
        self.values.get(idx).copied().ok_or_else(|| {
            ConnectError::Kernel("array parameter values exhausted".to_string())
        })
    }

    fn skip(&self, thread: usize, n: usize) {
        self.next[thread].fetch_add(n, Ordering::Relaxed);
    }

    fn reset(&self) {
        for cursor in &self.next {
            cursor.store(0, Ordering::Relaxed);
        }
    }
}

/// Distribution-backed parameter with a pre-built sampler.
pub struct RandomParameter {
    sampler: Sampler,
}

enum Sampler {
    Uniform(Uniform<f64>),
    UniformInt(Uniform<i64>),
    Normal(Normal<f64>),
    Lognormal(LogNormal<f64>),
    Exponential(Exp<f64>),
}

impl RandomParameter {
    fn new(spec: &DistributionSpec) -> ConnectResult<Self> {
        let sampler = match *spec {
            DistributionSpec::Uniform { low, high } => {
                if low >= high {
                    return Err(ConnectError::bad_property(
                        "uniform distribution requires low < high",
                    ));
                }
                Sampler::Uniform(Uniform::new(low, high))
            }
            DistributionSpec::UniformInt { low, high } => {
                if low > high {
                    return Err(ConnectError::bad_property(
                        "uniform_int distribution requires low <= high",
                    ));
                }
                Sampler::UniformInt(Uniform::new_inclusive(low, high))
            }
            DistributionSpec::Normal { mean, std } => Sampler::Normal(
                Normal::new(mean, std).map_err(|_| {
                    ConnectError::bad_property("normal distribution requires std >= 0")
                })?,
            ),
            DistributionSpec::Lognormal { mean, std } => Sampler::Lognormal(
                LogNormal::new(mean, std).map_err(|_| {
                    ConnectError::bad_property("lognormal distribution requires std >= 0")
                })?,
            ),
            DistributionSpec::Exponential { beta } => {
                if beta <= 0.0 {
                    return Err(ConnectError::bad_property(
                        "exponential distribution requires beta > 0",
                    ));
                }
                Sampler::Exponential(Exp::new(1.0 / beta).map_err(|_| {
                    ConnectError::bad_property("exponential distribution requires beta > 0")
                })?)
            }
        };
        Ok(Self { sampler })
    }

    fn provides_long(&self) -> bool {
        matches!(self.sampler, Sampler::UniformInt(_))
    }

    fn sample_double(&self, rng: &mut StdRng) -> f64 {
        match &self.sampler {
            Sampler::Uniform(d) => d.sample(rng),
            Sampler::UniformInt(d) => d.sample(rng) as f64,
            Sampler::Normal(d) => d.sample(rng),
            Sampler::Lognormal(d) => d.sample(rng),
            Sampler::Exponential(d) => d.sample(rng),
        }
    }
}
