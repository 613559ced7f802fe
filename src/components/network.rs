//! Neighborhood topology and peer-to-peer trade edges.

use std::collections::{BTreeMap, VecDeque};

use rand::{Rng, rngs::StdRng, seq::SliceRandom};

/// Index of an agent in population order.
pub type AgentId = usize;

/// Undirected neighborhood graph plus directed trade edges.
///
/// Adjacency lists are kept sorted and free of duplicates and self-loops.
/// Trade edges are separate: between any two agents at most one directed edge
/// exists, pointing from the last seller to the last buyer and weighted by the
/// power traded.
#[derive(Debug, Clone, Default)]
pub struct Network {
    adjacency: Vec<Vec<AgentId>>,
    trades: BTreeMap<(AgentId, AgentId), f64>,
}

impl Network {
    /// Creates a network of `size` agents with no edges.
    pub fn new(size: usize) -> Self {
        Self {
            adjacency: vec![Vec::new(); size],
            trades: BTreeMap::new(),
        }
    }

    /// Ring lattice where every agent is linked to its `k` nearest agents on
    /// each side.
    pub fn ring(size: usize, k: usize) -> Self {
        let mut network = Self::new(size);
        for a in 0..size {
            for step in 1..=k {
                network.connect(a, (a + step) % size);
            }
        }
        network
    }

    /// Random graph where each agent aims for a degree drawn uniformly from
    /// `[min_degree, max_degree]`.
    ///
    /// Agents are visited in a shuffled order and linked to randomly chosen
    /// agents that are still below `max_degree`. An agent may end below its
    /// target when no candidates remain.
    pub fn random(size: usize, min_degree: usize, max_degree: usize, rng: &mut StdRng) -> Self {
        let mut network = Self::new(size);
        let max_degree = max_degree.max(min_degree);
        let mut order: Vec<AgentId> = (0..size).collect();
        order.shuffle(rng);

        for &a in &order {
            let target = rng.random_range(min_degree..=max_degree);
            while network.degree(a) < target {
                let candidates: Vec<AgentId> = (0..size)
                    .filter(|&b| {
                        b != a && network.degree(b) < max_degree && !network.are_adjacent(a, b)
                    })
                    .collect();
                if candidates.is_empty() {
                    break;
                }
                let b = candidates[rng.random_range(0..candidates.len())];
                network.connect(a, b);
            }
        }
        network
    }

    /// Network built from an explicit undirected edge list.
    ///
    /// # Panics
    ///
    /// Panics if an edge refers to an agent outside `0..size`.
    pub fn from_edges(size: usize, edges: &[(AgentId, AgentId)]) -> Self {
        let mut network = Self::new(size);
        for &(a, b) in edges {
            assert!(a < size && b < size, "edge ({a}, {b}) outside population of {size}");
            network.connect(a, b);
        }
        network
    }

    /// Adds an undirected edge. Self-loops and duplicates are ignored.
    pub fn connect(&mut self, a: AgentId, b: AgentId) {
        if a == b || self.are_adjacent(a, b) {
            return;
        }
        for (from, to) in [(a, b), (b, a)] {
            let list = &mut self.adjacency[from];
            let pos = list.partition_point(|&x| x < to);
            list.insert(pos, to);
        }
    }

    pub fn size(&self) -> usize {
        self.adjacency.len()
    }

    pub fn neighbors(&self, a: AgentId) -> &[AgentId] {
        &self.adjacency[a]
    }

    pub fn degree(&self, a: AgentId) -> usize {
        self.adjacency[a].len()
    }

    pub fn are_adjacent(&self, a: AgentId, b: AgentId) -> bool {
        self.adjacency[a].binary_search(&b).is_ok()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum::<usize>() / 2
    }

    /// Points the trade edge between `seller` and `buyer` from the seller to
    /// the buyer with weight `power`, replacing any edge in the other
    /// direction.
    pub fn record_trade(&mut self, seller: AgentId, buyer: AgentId, power: f64) {
        self.trades.remove(&(buyer, seller));
        self.trades.insert((seller, buyer), power);
    }

    /// Weight of the directed trade edge `from -> to`, if present.
    pub fn trade_weight(&self, from: AgentId, to: AgentId) -> Option<f64> {
        self.trades.get(&(from, to)).copied()
    }

    /// All directed trade edges as `(seller, buyer, power)`.
    pub fn trades(&self) -> impl Iterator<Item = (AgentId, AgentId, f64)> + '_ {
        self.trades.iter().map(|(&(s, b), &w)| (s, b, w))
    }

    /// Agents within `radius` hops of `center`, in breadth-first order.
    ///
    /// Expansion stops early once a round discovers nobody new.
    pub fn ball(&self, center: AgentId, radius: usize) -> Vec<AgentId> {
        let mut reached = vec![false; self.size()];
        let mut ball = vec![center];
        reached[center] = true;

        let mut frontier = VecDeque::from([center]);
        for _ in 0..radius {
            let mut next = VecDeque::new();
            while let Some(a) = frontier.pop_front() {
                for &b in &self.adjacency[a] {
                    if !reached[b] {
                        reached[b] = true;
                        ball.push(b);
                        next.push_back(b);
                    }
                }
            }
            if next.is_empty() {
                break;
            }
            frontier = next;
        }
        ball
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn ring_has_expected_degrees() {
        let network = Network::ring(6, 1);
        for a in 0..6 {
            assert_eq!(network.degree(a), 2);
        }
        assert!(network.are_adjacent(0, 5));
        assert_eq!(network.edge_count(), 6);
    }

    #[test]
    fn connect_ignores_duplicates_and_self_loops() {
        let mut network = Network::new(3);
        network.connect(0, 1);
        network.connect(1, 0);
        network.connect(2, 2);
        assert_eq!(network.neighbors(0), &[1]);
        assert_eq!(network.neighbors(2), &[] as &[AgentId]);
    }

    #[test]
    fn random_respects_max_degree_and_is_deterministic() {
        let a = Network::random(20, 2, 4, &mut StdRng::seed_from_u64(9));
        let b = Network::random(20, 2, 4, &mut StdRng::seed_from_u64(9));
        for id in 0..20 {
            assert!(a.degree(id) <= 4);
            assert_eq!(a.neighbors(id), b.neighbors(id));
        }
    }

    #[test]
    fn trade_edge_points_at_last_buyer() {
        let mut network = Network::from_edges(2, &[(0, 1)]);
        network.record_trade(0, 1, 2.5);
        assert_eq!(network.trade_weight(0, 1), Some(2.5));

        network.record_trade(1, 0, 1.0);
        assert_eq!(network.trade_weight(0, 1), None);
        assert_eq!(network.trade_weight(1, 0), Some(1.0));
        assert_eq!(network.trades().count(), 1);
    }

    #[test]
    fn ball_matches_hop_distance() {
        // 0 - 1 - 2 - 3 - 4, plus 1 - 5
        let network = Network::from_edges(6, &[(0, 1), (1, 2), (2, 3), (3, 4), (1, 5)]);
        assert_eq!(network.ball(0, 0), vec![0]);
        assert_eq!(network.ball(0, 1), vec![0, 1]);
        assert_eq!(network.ball(0, 2), vec![0, 1, 2, 5]);

        let mut full = network.ball(0, 100);
        full.sort_unstable();
        assert_eq!(full, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    #[should_panic]
    fn from_edges_rejects_unknown_agent() {
        Network::from_edges(2, &[(0, 2)]);
    }
}
