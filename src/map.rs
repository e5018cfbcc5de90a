//! Static tower graph for the siege map
//!
//! Towers are nodes holding a garrison and an owner; edges are undirected
//! and fixed for the session's lifetime. Adjacency is derived once at
//! construction and never mutated afterwards.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::types::{Owner, Team, TowerId, Vec2};

/// Number of towers in the reference topology
pub const TOWER_COUNT: usize = 13;

/// Garrison each home tower starts with
pub const HOME_START_GARRISON: f32 = 15.0;

/// A team's permanently-affiliated tower, where effort converts to garrison
pub fn home_tower(team: Team) -> TowerId {
    match team {
        Team::A => TowerId(0),
        Team::B => TowerId(12),
    }
}

/// A graph node holding a garrison and an owner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tower {
    pub id: TowerId,
    pub name: String,
    pub position: Vec2,
    pub owner: Owner,
    /// Non-negative; fractional during passive accrual, floored only at the
    /// serialization boundary
    pub soldiers: f32,
}

impl Tower {
    fn new(id: u32, name: &str, x: f32, y: f32, owner: Owner, soldiers: f32) -> Self {
        Self {
            id: TowerId(id),
            name: name.to_string(),
            position: Vec2::new(x, y),
            owner,
            soldiers,
        }
    }
}

/// The fixed siege topology plus per-tower state
#[derive(Debug, Clone)]
pub struct TowerMap {
    towers: Vec<Tower>,
    edges: Vec<(TowerId, TowerId)>,
    adjacency: AHashMap<TowerId, Vec<TowerId>>,
}

impl TowerMap {
    /// Build a map from an explicit tower and edge list.
    ///
    /// Neighbor lists are sorted by id so traversal order is deterministic.
    pub fn new(towers: Vec<Tower>, edges: Vec<(TowerId, TowerId)>) -> Self {
        let mut adjacency: AHashMap<TowerId, Vec<TowerId>> = AHashMap::new();
        for tower in &towers {
            adjacency.entry(tower.id).or_default();
        }
        for &(a, b) in &edges {
            adjacency.entry(a).or_default().push(b);
            adjacency.entry(b).or_default().push(a);
        }
        for neighbors in adjacency.values_mut() {
            neighbors.sort();
            neighbors.dedup();
        }
        Self {
            towers,
            edges,
            adjacency,
        }
    }

    /// The 13-tower reference topology: mirror-symmetric, homes at the
    /// horizontal extremes. Homes are owned from construction; ownership of
    /// everything else changes only through march resolution.
    pub fn standard() -> Self {
        let a = Owner::Held(Team::A);
        let b = Owner::Held(Team::B);
        let n = Owner::Neutral;
        let towers = vec![
            Tower::new(0, "Westkeep", 60.0, 300.0, a, HOME_START_GARRISON),
            Tower::new(1, "Northfen", 180.0, 150.0, n, 0.0),
            Tower::new(2, "Southfen", 180.0, 450.0, n, 0.0),
            Tower::new(3, "Westgate", 320.0, 300.0, n, 8.0),
            Tower::new(4, "Northspire", 440.0, 120.0, n, 5.0),
            Tower::new(5, "Southspire", 440.0, 480.0, n, 5.0),
            Tower::new(6, "Midhold", 500.0, 300.0, n, 12.0),
            Tower::new(7, "Northwatch", 560.0, 120.0, n, 5.0),
            Tower::new(8, "Southwatch", 560.0, 480.0, n, 5.0),
            Tower::new(9, "Eastgate", 680.0, 300.0, n, 8.0),
            Tower::new(10, "Northmarch", 820.0, 150.0, n, 0.0),
            Tower::new(11, "Southmarch", 820.0, 450.0, n, 0.0),
            Tower::new(12, "Eastkeep", 940.0, 300.0, b, HOME_START_GARRISON),
        ];
        let edges = [
            (0, 1),
            (0, 2),
            (0, 3),
            (1, 3),
            (2, 3),
            (1, 4),
            (2, 5),
            (3, 6),
            (4, 6),
            (5, 6),
            (4, 7),
            (5, 8),
            (6, 7),
            (6, 8),
            (6, 9),
            (7, 9),
            (8, 9),
            (7, 10),
            (8, 11),
            (9, 10),
            (9, 11),
            (9, 12),
            (10, 12),
            (11, 12),
        ]
        .into_iter()
        .map(|(a, b)| (TowerId(a), TowerId(b)))
        .collect();
        Self::new(towers, edges)
    }

    pub fn tower(&self, id: TowerId) -> Option<&Tower> {
        self.towers.iter().find(|t| t.id == id)
    }

    pub fn tower_mut(&mut self, id: TowerId) -> Option<&mut Tower> {
        self.towers.iter_mut().find(|t| t.id == id)
    }

    pub fn towers(&self) -> &[Tower] {
        &self.towers
    }

    pub fn edges(&self) -> &[(TowerId, TowerId)] {
        &self.edges
    }

    /// Neighbors of a tower, sorted by id. Empty for unknown ids.
    pub fn adjacent(&self, id: TowerId) -> &[TowerId] {
        self.adjacency.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn towers_owned_by(&self, team: Team) -> u32 {
        self.towers.iter().filter(|t| t.owner.is(team)).count() as u32
    }

    /// Sum of garrisons across a team's towers
    pub fn garrison_total(&self, team: Team) -> f32 {
        self.towers
            .iter()
            .filter(|t| t.owner.is(team))
            .map(|t| t.soldiers)
            .sum()
    }

    pub fn owns_home(&self, team: Team) -> bool {
        self.tower(home_tower(team))
            .map(|t| t.owner.is(team))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_topology_shape() {
        let map = TowerMap::standard();
        assert_eq!(map.towers().len(), TOWER_COUNT);
        assert_eq!(map.edges().len(), 24);
    }

    #[test]
    fn homes_are_owned_from_construction() {
        let map = TowerMap::standard();
        assert!(map.owns_home(Team::A));
        assert!(map.owns_home(Team::B));
        assert_eq!(
            map.tower(home_tower(Team::A)).unwrap().soldiers,
            HOME_START_GARRISON
        );
        assert_eq!(map.towers_owned_by(Team::A), 1);
        assert_eq!(map.towers_owned_by(Team::B), 1);
    }

    #[test]
    fn adjacency_is_symmetric() {
        let map = TowerMap::standard();
        for &(a, b) in map.edges() {
            assert!(map.adjacent(a).contains(&b), "{a:?} missing {b:?}");
            assert!(map.adjacent(b).contains(&a), "{b:?} missing {a:?}");
        }
    }

    #[test]
    fn adjacency_is_sorted_and_deduped() {
        let map = TowerMap::standard();
        for tower in map.towers() {
            let n = map.adjacent(tower.id);
            assert!(n.windows(2).all(|w| w[0] < w[1]), "{:?}: {n:?}", tower.id);
        }
    }

    #[test]
    fn center_connects_both_halves() {
        let map = TowerMap::standard();
        let center = map.adjacent(TowerId(6));
        assert_eq!(
            center,
            &[TowerId(3), TowerId(4), TowerId(5), TowerId(7), TowerId(8), TowerId(9)]
        );
    }

    #[test]
    fn unknown_tower_has_no_neighbors() {
        let map = TowerMap::standard();
        assert!(map.adjacent(TowerId(99)).is_empty());
        assert!(map.tower(TowerId(99)).is_none());
    }
}
