/*!
Virtual-process topology.

The simulation is decomposed MPI-by-thread: every rank sees all node
identifiers but owns only the nodes whose virtual process maps onto one of
its threads. Virtual processes are assigned round-robin over node ids and
interleaved over ranks, so `vp % num_ranks` is the owning rank and
`vp / num_ranks` the owning thread on that rank.
*/

use crate::config::SimulationConfig;
use crate::NodeId;

/// Maps between nodes, virtual processes, ranks and worker threads.
#[derive(Debug, Clone)]
pub struct VpTopology {
    num_ranks: usize,
    rank: usize,
    threads_per_rank: usize,
}

impl VpTopology {
    pub fn new(config: &SimulationConfig) -> Self {
        assert!(config.num_ranks >= 1, "at least one rank required");
        assert!(config.rank < config.num_ranks, "rank out of range");
        assert!(config.threads_per_rank >= 1, "at least one thread required");
        Self {
            num_ranks: config.num_ranks,
            rank: config.rank,
            threads_per_rank: config.threads_per_rank,
        }
    }

    /// Worker threads on this rank.
    pub fn num_threads(&self) -> usize {
        self.threads_per_rank
    }

    /// Virtual processes across all ranks.
    pub fn num_vps(&self) -> usize {
        self.num_ranks * self.threads_per_rank
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn num_ranks(&self) -> usize {
        self.num_ranks
    }

    /// Virtual process owning the given node.
    pub fn node_to_vp(&self, id: NodeId) -> usize {
        (id % self.num_vps() as u64) as usize
    }

    /// Rank owning the given virtual process.
    pub fn vp_to_rank(&self, vp: usize) -> usize {
        vp % self.num_ranks
    }

    /// Whether the given virtual process runs on this rank.
    pub fn is_local_vp(&self, vp: usize) -> bool {
        self.vp_to_rank(vp) == self.rank
    }

    /// Virtual process run by the given worker thread of this rank.
    pub fn thread_to_vp(&self, thread: usize) -> usize {
        debug_assert!(thread < self.threads_per_rank);
        thread * self.num_ranks + self.rank
    }

    /// Owning thread of a virtual process, if it runs on this rank.
    pub fn vp_to_thread(&self, vp: usize) -> Option<usize> {
        if self.is_local_vp(vp) {
            Some(vp / self.num_ranks)
        } else {
            None
        }
    }

    /// Owning thread of a node, if the node lives on this rank.
    pub fn node_owner_thread(&self, id: NodeId) -> Option<usize> {
        self.vp_to_thread(self.node_to_vp(id))
    }

    /// Whether the node lives on this rank.
    pub fn is_local_node(&self, id: NodeId) -> bool {
        self.is_local_vp(self.node_to_vp(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topology(num_ranks: usize, rank: usize, threads: usize) -> VpTopology {
        VpTopology::new(&SimulationConfig {
            num_ranks,
            rank,
            threads_per_rank: threads,
            rng_seed: 0,
        })
    }

    #[test]
    fn test_round_robin_assignment() {
        let topo = topology(2, 0, 2);
        assert_eq!(topo.num_vps(), 4);
        assert_eq!(topo.node_to_vp(1), 1);
        assert_eq!(topo.node_to_vp(4), 0);
        assert_eq!(topo.vp_to_rank(0), 0);
        assert_eq!(topo.vp_to_rank(1), 1);
        assert_eq!(topo.vp_to_rank(2), 0);
    }

    #[test]
    fn test_thread_vp_mapping_is_inverse() {
        for rank in 0..3 {
            let topo = topology(3, rank, 4);
            for t in 0..4 {
                let vp = topo.thread_to_vp(t);
                assert!(topo.is_local_vp(vp));
                assert_eq!(topo.vp_to_thread(vp), Some(t));
            }
        }
    }

    #[test]
    fn test_every_vp_has_exactly_one_owner() {
        let num_ranks = 2;
        let threads = 3;
        let mut seen = vec![0usize; num_ranks * threads];
        for rank in 0..num_ranks {
            let topo = topology(num_ranks, rank, threads);
            for vp in 0..topo.num_vps() {
                if topo.is_local_vp(vp) {
                    seen[vp] += 1;
                }
            }
        }
        assert!(seen.iter().all(|&n| n == 1));
    }
}
