// Copyright 2026 Neurite Project
// SPDX-License-Identifier: Apache-2.0

/*!
Kernel configuration.

A `SimulationConfig` fixes the parallel decomposition seen by one process:
how many MPI ranks take part in the simulation, which of them this process
is, and how many worker threads it runs. Every worker thread owns exactly
one virtual process, so `num_ranks * threads_per_rank` is the global number
of virtual processes.
*/

use serde::{Deserialize, Serialize};

/// Configuration of one simulator process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Number of MPI ranks participating in the simulation.
    pub num_ranks: usize,

    /// Rank of this process (0-based).
    pub rank: usize,

    /// Worker threads hosted by this process.
    pub threads_per_rank: usize,

    /// Base seed for all random number streams.
    pub rng_seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            num_ranks: 1,
            rank: 0,
            threads_per_rank: 2,
            rng_seed: 143_202_461,
        }
    }
}

impl SimulationConfig {
    /// Single-rank configuration with the given thread count and seed.
    pub fn local(threads_per_rank: usize, rng_seed: u64) -> Self {
        Self {
            num_ranks: 1,
            rank: 0,
            threads_per_rank,
            rng_seed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_single_rank() {
        let cfg = SimulationConfig::default();
        assert_eq!(cfg.num_ranks, 1);
        assert_eq!(cfg.rank, 0);
        assert!(cfg.threads_per_rank >= 1);
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let cfg = SimulationConfig::local(4, 1234);
        let json = serde_json::to_string(&cfg).unwrap();
        let back: SimulationConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg, back);
    }
}
