use log::debug;
use thiserror::Error;

use crate::directory::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EdgeError {
    #[error("a user cannot friend themselves")]
    SelfFriend,
    #[error("user id {id} is outside graph capacity {capacity}")]
    CapacityExceeded { id: UserId, capacity: usize },
    #[error("users are already friends")]
    AlreadyFriends,
    #[error("users are not friends")]
    NotFriends,
}

/// Undirected friendship graph over user ids.
///
/// Capacity is fixed at construction: one owned neighbor list per
/// possible id. Symmetry is maintained by construction — every mutation
/// updates both endpoints before returning. No self-loops, no duplicate
/// edges, and no ordering guarantee among a node's neighbors.
pub struct FriendGraph {
    adjacency: Vec<Vec<UserId>>,
}

impl FriendGraph {
    pub fn new(capacity: usize) -> Self {
        Self {
            adjacency: vec![Vec::new(); capacity],
        }
    }

    pub fn capacity(&self) -> usize {
        self.adjacency.len()
    }

    /// Insert the undirected edge u–v.
    ///
    /// One validation path serves every caller: the interactive flow and
    /// the bulk loader both come through here, so the rules cannot drift.
    pub fn add_edge(&mut self, u: UserId, v: UserId) -> Result<(), EdgeError> {
        self.check_id(u)?;
        self.check_id(v)?;
        if u == v {
            return Err(EdgeError::SelfFriend);
        }
        if self.are_friends(u, v) {
            return Err(EdgeError::AlreadyFriends);
        }
        self.adjacency[u].push(v);
        self.adjacency[v].push(u);
        Ok(())
    }

    /// Remove the undirected edge u–v from both neighbor lists.
    pub fn remove_edge(&mut self, u: UserId, v: UserId) -> Result<(), EdgeError> {
        self.check_id(u)?;
        self.check_id(v)?;
        if !self.are_friends(u, v) {
            return Err(EdgeError::NotFriends);
        }
        self.adjacency[u].retain(|&n| n != v);
        self.adjacency[v].retain(|&n| n != u);
        Ok(())
    }

    /// Linear scan of u's neighbor list — O(degree(u)).
    pub fn are_friends(&self, u: UserId, v: UserId) -> bool {
        self.adjacency.get(u).is_some_and(|ns| ns.contains(&v))
    }

    pub fn degree(&self, u: UserId) -> usize {
        self.adjacency.get(u).map(Vec::len).unwrap_or(0)
    }

    /// Neighbor ids of u. Out-of-range ids have no neighbors.
    pub fn neighbors(&self, u: UserId) -> &[UserId] {
        self.adjacency.get(u).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Bulk load from (u, v) pairs, e.g. rows handed over by a
    /// persistence collaborator. Rows the validation rejects are skipped,
    /// never fatal.
    pub fn load_edges<I>(&mut self, edges: I)
    where
        I: IntoIterator<Item = (UserId, UserId)>,
    {
        for (u, v) in edges {
            if let Err(e) = self.add_edge(u, v) {
                debug!("skipping edge {}-{}: {}", u, v, e);
            }
        }
    }

    /// Every undirected edge exactly once, as (low, high) pairs — the
    /// snapshot an external persistence collaborator serializes.
    pub fn edges(&self) -> impl Iterator<Item = (UserId, UserId)> + '_ {
        self.adjacency.iter().enumerate().flat_map(|(u, ns)| {
            ns.iter().copied().filter(move |&v| u < v).map(move |v| (u, v))
        })
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum::<usize>() / 2
    }

    fn check_id(&self, id: UserId) -> Result<(), EdgeError> {
        if id >= self.capacity() {
            return Err(EdgeError::CapacityExceeded {
                id,
                capacity: self.capacity(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph_with(capacity: usize, edges: &[(UserId, UserId)]) -> FriendGraph {
        let mut g = FriendGraph::new(capacity);
        for &(u, v) in edges {
            g.add_edge(u, v).unwrap();
        }
        g
    }

    #[test]
    fn test_add_edge_symmetric() {
        let g = graph_with(5, &[(0, 1)]);
        assert!(g.are_friends(0, 1));
        assert!(g.are_friends(1, 0));
    }

    #[test]
    fn test_remove_edge_symmetric() {
        let mut g = graph_with(5, &[(0, 1), (1, 2)]);
        g.remove_edge(0, 1).unwrap();
        assert!(!g.are_friends(0, 1));
        assert!(!g.are_friends(1, 0));
        // Unrelated edge untouched.
        assert!(g.are_friends(1, 2));
    }

    #[test]
    fn test_self_loop_rejected() {
        let mut g = FriendGraph::new(5);
        assert_eq!(g.add_edge(2, 2), Err(EdgeError::SelfFriend));
        assert_eq!(g.degree(2), 0);
    }

    #[test]
    fn test_duplicate_edge_rejected() {
        let mut g = graph_with(5, &[(0, 1)]);
        assert_eq!(g.add_edge(0, 1), Err(EdgeError::AlreadyFriends));
        assert_eq!(g.add_edge(1, 0), Err(EdgeError::AlreadyFriends));
        assert_eq!(g.degree(0), 1);
        assert_eq!(g.degree(1), 1);
    }

    #[test]
    fn test_capacity_exceeded_leaves_state_intact() {
        let mut g = graph_with(3, &[(0, 1), (1, 2)]);
        assert_eq!(
            g.add_edge(0, 5),
            Err(EdgeError::CapacityExceeded { id: 5, capacity: 3 })
        );
        assert!(g.are_friends(0, 1));
        assert!(g.are_friends(1, 2));
        assert_eq!(g.degree(0), 1);
    }

    #[test]
    fn test_remove_missing_edge_is_noop() {
        let mut g = graph_with(5, &[(0, 1)]);
        assert_eq!(g.remove_edge(0, 2), Err(EdgeError::NotFriends));
        assert!(g.are_friends(0, 1));
    }

    #[test]
    fn test_degree_counts_neighbors() {
        let g = graph_with(5, &[(0, 1), (0, 2), (0, 3)]);
        assert_eq!(g.degree(0), 3);
        assert_eq!(g.degree(1), 1);
        assert_eq!(g.degree(4), 0);
    }

    #[test]
    fn test_neighbors_out_of_range_empty() {
        let g = FriendGraph::new(3);
        assert!(g.neighbors(99).is_empty());
        assert_eq!(g.degree(99), 0);
        assert!(!g.are_friends(99, 0));
    }

    #[test]
    fn test_load_edges_skips_bad_rows() {
        let mut g = FriendGraph::new(4);
        g.load_edges(vec![(0, 1), (1, 1), (2, 9), (0, 1), (2, 3)]);
        assert_eq!(g.edge_count(), 2);
        assert!(g.are_friends(0, 1));
        assert!(g.are_friends(2, 3));
        assert!(!g.are_friends(1, 1));
    }

    #[test]
    fn test_edges_snapshot_lists_each_edge_once() {
        let g = graph_with(5, &[(3, 1), (0, 4), (1, 0)]);
        let mut edges: Vec<_> = g.edges().collect();
        edges.sort();
        assert_eq!(edges, vec![(0, 1), (0, 4), (1, 3)]);
    }

    #[test]
    fn test_load_then_snapshot_round_trip() {
        let mut g = FriendGraph::new(6);
        g.load_edges(vec![(0, 1), (2, 3), (4, 5)]);
        let mut restored = FriendGraph::new(6);
        restored.load_edges(g.edges());
        assert_eq!(restored.edge_count(), 3);
        for (u, v) in g.edges() {
            assert!(restored.are_friends(u, v));
        }
    }
}
