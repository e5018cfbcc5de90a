//! Mutable per-session simulation state
//!
//! One `GameState` per session; sessions share nothing. All time-keeping is
//! the session clock in seconds since the playing phase began — asynchronous
//! inputs are stamped with the clock value current at arrival.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::core::config::SiegeConfig;
use crate::core::types::{MarchId, Team, TowerId};
use crate::map::TowerMap;
use crate::march::March;

/// How a team's home-tower dispatches are decided
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeployMode {
    Auto,
    Manual,
}

/// One commander's slot in the session
#[derive(Debug, Clone)]
pub struct Player {
    pub team: Team,
    /// Cumulative accepted effort count (monotone)
    pub pushups: u32,
    /// Session-clock timestamp of the last accepted effort event
    pub last_effort_at: Option<f64>,
    pub deploy_mode: DeployMode,
    pub is_ai: bool,
    pub ready: bool,
    /// Whether a transport connection has claimed this slot
    pub claimed: bool,
    /// Derived per tick: owned garrisons plus in-flight marches
    pub total_soldiers: f32,
    /// Derived per tick
    pub towers_owned: u32,
}

impl Player {
    pub fn new(team: Team) -> Self {
        Self {
            team,
            pushups: 0,
            last_effort_at: None,
            deploy_mode: DeployMode::Auto,
            is_ai: false,
            ready: false,
            claimed: false,
            total_soldiers: 0.0,
            towers_owned: 0,
        }
    }
}

/// The authoritative simulation state of one session
#[derive(Debug, Clone)]
pub struct GameState {
    pub map: TowerMap,
    pub players: [Player; 2],
    pub marches: Vec<March>,
    /// Seconds since the playing phase began
    pub clock: f64,
    pub winner: Option<Team>,
    /// Bounded recent-events ring, human-readable, UI flourish only
    pub events: VecDeque<String>,
    event_cap: usize,
    next_march_id: u64,
    pub(crate) next_passive_at: f64,
    pub(crate) next_deploy_at: f64,
}

impl GameState {
    pub fn new(cfg: &SiegeConfig) -> Self {
        Self {
            map: TowerMap::standard(),
            players: [Player::new(Team::A), Player::new(Team::B)],
            marches: Vec::new(),
            clock: 0.0,
            winner: None,
            events: VecDeque::new(),
            event_cap: cfg.event_log_cap,
            next_march_id: 0,
            next_passive_at: 1.0,
            next_deploy_at: cfg.deploy_interval_secs,
        }
    }

    pub fn player(&self, team: Team) -> &Player {
        &self.players[team.index()]
    }

    pub fn player_mut(&mut self, team: Team) -> &mut Player {
        &mut self.players[team.index()]
    }

    /// Whether a march on this exact (origin, destination, owner) triple is
    /// already in flight. At most one is allowed at a time.
    pub fn march_active(&self, from: TowerId, to: TowerId, owner: Team) -> bool {
        self.marches
            .iter()
            .any(|m| m.from == from && m.to == to && m.owner == owner)
    }

    /// Dispatch a troop column. Returns false without mutating anything when
    /// the dispatch is structurally impossible: zero count, duplicate march,
    /// origin not owned by the sender, or insufficient garrison.
    pub fn dispatch_march(&mut self, from: TowerId, to: TowerId, owner: Team, count: f32) -> bool {
        if count <= 0.0 {
            return false;
        }
        if self.march_active(from, to, owner) {
            return false;
        }
        let departed_at = self.clock;
        let Some(origin) = self.map.tower_mut(from) else {
            return false;
        };
        if !origin.owner.is(owner) || origin.soldiers < count {
            return false;
        }
        origin.soldiers -= count;
        let id = MarchId(self.next_march_id);
        self.next_march_id += 1;
        self.marches.push(March {
            id,
            from,
            to,
            owner,
            count,
            departed_at,
        });
        true
    }

    /// Recompute per-team derived stats: total soldiers (owned garrisons
    /// plus in-flight marches) and towers owned.
    pub fn recompute_derived(&mut self) {
        for team in Team::BOTH {
            let garrisons = self.map.garrison_total(team);
            let marching: f32 = self
                .marches
                .iter()
                .filter(|m| m.owner == team)
                .map(|m| m.count)
                .sum();
            let towers = self.map.towers_owned_by(team);
            let player = self.player_mut(team);
            player.total_soldiers = garrisons + marching;
            player.towers_owned = towers;
        }
    }

    /// Append to the bounded recent-events ring
    pub fn push_event(&mut self, message: String) {
        if self.events.len() >= self.event_cap {
            self.events.pop_front();
        }
        self.events.push_back(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Owner;
    use crate::map::home_tower;

    fn state() -> GameState {
        GameState::new(&SiegeConfig::default())
    }

    #[test]
    fn dispatch_deducts_origin_garrison() {
        let mut s = state();
        let home = home_tower(Team::A);
        assert!(s.dispatch_march(home, TowerId(1), Team::A, 10.0));
        assert_eq!(s.map.tower(home).unwrap().soldiers, 5.0);
        assert_eq!(s.marches.len(), 1);
    }

    #[test]
    fn dispatch_rejects_duplicate_triple() {
        let mut s = state();
        let home = home_tower(Team::A);
        assert!(s.dispatch_march(home, TowerId(1), Team::A, 5.0));
        assert!(!s.dispatch_march(home, TowerId(1), Team::A, 5.0));
        assert_eq!(s.marches.len(), 1);
    }

    #[test]
    fn dispatch_rejects_overcommit_and_foreign_origin() {
        let mut s = state();
        let home = home_tower(Team::A);
        assert!(!s.dispatch_march(home, TowerId(1), Team::A, 100.0));
        assert!(!s.dispatch_march(home, TowerId(1), Team::B, 1.0));
        assert!(s.marches.is_empty());
        assert_eq!(s.map.tower(home).unwrap().soldiers, 15.0);
    }

    #[test]
    fn derived_stats_count_marching_soldiers() {
        let mut s = state();
        let home = home_tower(Team::A);
        s.dispatch_march(home, TowerId(1), Team::A, 10.0);
        s.recompute_derived();
        let a = s.player(Team::A);
        assert_eq!(a.total_soldiers, 15.0);
        assert_eq!(a.towers_owned, 1);
        let b = s.player(Team::B);
        assert_eq!(b.total_soldiers, 15.0);
    }

    #[test]
    fn event_ring_is_bounded() {
        let mut s = state();
        for i in 0..20 {
            s.push_event(format!("event {i}"));
        }
        assert_eq!(s.events.len(), SiegeConfig::default().event_log_cap);
        assert_eq!(s.events.front().unwrap(), "event 12");
    }

    #[test]
    fn neutral_tower_cannot_dispatch() {
        let mut s = state();
        assert!(s.map.tower(TowerId(6)).unwrap().owner == Owner::Neutral);
        assert!(!s.dispatch_march(TowerId(6), TowerId(3), Team::A, 2.0));
    }
}
