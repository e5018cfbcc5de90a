//! In-flight troop columns and arrival resolution
//!
//! A march carries a fixed troop count between two towers over a fixed
//! duration. Marches that reach full progress are resolved and removed in
//! the same step, ordered by (departure time, id) so simultaneous arrivals
//! at one tower resolve deterministically.

use serde::{Deserialize, Serialize};

use crate::core::config::SiegeConfig;
use crate::core::types::{MarchId, Owner, Team, TowerId};
use crate::state::GameState;

/// An in-flight, time-bounded transfer of a fixed troop count
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct March {
    pub id: MarchId,
    pub from: TowerId,
    pub to: TowerId,
    pub owner: Team,
    /// Fixed at dispatch; never grows or shrinks en route
    pub count: f32,
    /// Session-clock timestamp of dispatch
    pub departed_at: f64,
}

impl March {
    /// Fraction of the route covered, always within [0, 1]
    pub fn progress(&self, clock: f64, march_duration_secs: f64) -> f32 {
        ((clock - self.departed_at) / march_duration_secs).clamp(0.0, 1.0) as f32
    }
}

/// What happened when one march arrived
#[derive(Debug, Clone, PartialEq)]
pub enum Arrival {
    /// Target already friendly: garrison grows by the column's count
    Reinforced { tower: TowerId, owner: Team, count: f32 },
    /// Target neutral: claimed with the column's count
    Claimed { tower: TowerId, owner: Team, count: f32 },
    /// Attack overwhelmed the defense; the remainder garrisons the tower
    Captured { tower: TowerId, owner: Team, remaining: f32 },
    /// Attack exactly cancelled the defense; the tower reverts to neutral
    Neutralized { tower: TowerId },
    /// Defense held; the tower is merely weakened
    Repelled { tower: TowerId, defender: Team, remaining: f32 },
}

/// Advance and resolve all marches that have completed their route.
///
/// Completed marches are removed from the active set in this same step.
/// Resolution order is ascending (departed_at, id) — an explicit,
/// deterministic tie-break for simultaneous arrivals at one tower.
pub fn resolve_marches(state: &mut GameState, cfg: &SiegeConfig) -> Vec<Arrival> {
    let clock = state.clock;
    let duration = cfg.march_duration_secs;

    let mut ready: Vec<March> = Vec::new();
    state.marches.retain(|m| {
        if m.progress(clock, duration) >= 1.0 {
            ready.push(m.clone());
            false
        } else {
            true
        }
    });
    ready.sort_by(|a, b| {
        a.departed_at
            .total_cmp(&b.departed_at)
            .then_with(|| a.id.cmp(&b.id))
    });

    let mut arrivals = Vec::with_capacity(ready.len());
    for march in ready {
        let name: String;
        let arrival: Arrival;
        {
            let Some(tower) = state.map.tower_mut(march.to) else {
                continue;
            };
            name = tower.name.clone();
            arrival = match tower.owner {
                Owner::Held(team) if team == march.owner => {
                    tower.soldiers += march.count;
                    Arrival::Reinforced {
                        tower: march.to,
                        owner: march.owner,
                        count: march.count,
                    }
                }
                Owner::Neutral => {
                    tower.owner = Owner::Held(march.owner);
                    tower.soldiers = march.count;
                    Arrival::Claimed {
                        tower: march.to,
                        owner: march.owner,
                        count: march.count,
                    }
                }
                Owner::Held(defender) => {
                    let result = tower.soldiers - march.count;
                    if result > 0.0 {
                        tower.soldiers = result;
                        Arrival::Repelled {
                            tower: march.to,
                            defender,
                            remaining: result,
                        }
                    } else {
                        let remaining = -result;
                        if remaining > 0.0 {
                            tower.owner = Owner::Held(march.owner);
                            tower.soldiers = remaining;
                            Arrival::Captured {
                                tower: march.to,
                                owner: march.owner,
                                remaining,
                            }
                        } else {
                            tower.owner = Owner::Neutral;
                            tower.soldiers = 0.0;
                            Arrival::Neutralized { tower: march.to }
                        }
                    }
                }
            };
        }
        tracing::debug!(owner = march.owner.token(), tower = %name, ?arrival, "march arrived");
        state.push_event(describe(&arrival, &name));
        arrivals.push(arrival);
    }
    arrivals
}

fn describe(arrival: &Arrival, tower_name: &str) -> String {
    match arrival {
        Arrival::Reinforced { owner, .. } => {
            format!("{} reinforced {}", owner.token(), tower_name)
        }
        Arrival::Claimed { owner, .. } => format!("{} claimed {}", owner.token(), tower_name),
        Arrival::Captured { owner, .. } => format!("{} captured {}", owner.token(), tower_name),
        Arrival::Neutralized { .. } => format!("{} fell to neutral", tower_name),
        Arrival::Repelled { defender, .. } => {
            format!("{} held {}", defender.token(), tower_name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn setup() -> (GameState, SiegeConfig) {
        let cfg = SiegeConfig::default();
        (GameState::new(&cfg), cfg)
    }

    fn force_tower(state: &mut GameState, id: u32, owner: Owner, soldiers: f32) {
        let tower = state.map.tower_mut(TowerId(id)).unwrap();
        tower.owner = owner;
        tower.soldiers = soldiers;
    }

    #[test]
    fn progress_is_clamped() {
        let m = March {
            id: MarchId(0),
            from: TowerId(0),
            to: TowerId(1),
            owner: Team::A,
            count: 5.0,
            departed_at: 10.0,
        };
        assert_eq!(m.progress(9.0, 3.0), 0.0);
        assert_eq!(m.progress(11.5, 3.0), 0.5);
        assert_eq!(m.progress(100.0, 3.0), 1.0);
    }

    #[test]
    fn pending_marches_stay_active() {
        let (mut s, cfg) = setup();
        s.dispatch_march(TowerId(0), TowerId(1), Team::A, 5.0);
        s.clock = cfg.march_duration_secs / 2.0;
        let arrivals = resolve_marches(&mut s, &cfg);
        assert!(arrivals.is_empty());
        assert_eq!(s.marches.len(), 1);
    }

    #[test]
    fn claim_neutral_tower() {
        let (mut s, cfg) = setup();
        s.dispatch_march(TowerId(0), TowerId(1), Team::A, 5.0);
        s.clock = cfg.march_duration_secs;
        let arrivals = resolve_marches(&mut s, &cfg);
        assert_eq!(
            arrivals,
            vec![Arrival::Claimed {
                tower: TowerId(1),
                owner: Team::A,
                count: 5.0
            }]
        );
        assert!(s.marches.is_empty());
        let t = s.map.tower(TowerId(1)).unwrap();
        assert_eq!(t.owner, Owner::Held(Team::A));
        assert_eq!(t.soldiers, 5.0);
    }

    #[test]
    fn reinforce_friendly_tower() {
        let (mut s, cfg) = setup();
        force_tower(&mut s, 1, Owner::Held(Team::A), 3.0);
        s.dispatch_march(TowerId(0), TowerId(1), Team::A, 5.0);
        s.clock = cfg.march_duration_secs;
        resolve_marches(&mut s, &cfg);
        assert_eq!(s.map.tower(TowerId(1)).unwrap().soldiers, 8.0);
    }

    #[test]
    fn capture_keeps_exact_remainder() {
        let (mut s, cfg) = setup();
        force_tower(&mut s, 1, Owner::Held(Team::B), 4.0);
        s.dispatch_march(TowerId(0), TowerId(1), Team::A, 10.0);
        s.clock = cfg.march_duration_secs;
        resolve_marches(&mut s, &cfg);
        let t = s.map.tower(TowerId(1)).unwrap();
        assert_eq!(t.owner, Owner::Held(Team::A));
        assert_eq!(t.soldiers, 6.0);
    }

    #[test]
    fn exact_cancellation_goes_neutral() {
        let (mut s, cfg) = setup();
        force_tower(&mut s, 1, Owner::Held(Team::B), 10.0);
        s.dispatch_march(TowerId(0), TowerId(1), Team::A, 10.0);
        s.clock = cfg.march_duration_secs;
        let arrivals = resolve_marches(&mut s, &cfg);
        assert_eq!(arrivals, vec![Arrival::Neutralized { tower: TowerId(1) }]);
        let t = s.map.tower(TowerId(1)).unwrap();
        assert_eq!(t.owner, Owner::Neutral);
        assert_eq!(t.soldiers, 0.0);
    }

    #[test]
    fn repelled_attack_weakens_defense() {
        let (mut s, cfg) = setup();
        force_tower(&mut s, 1, Owner::Held(Team::B), 12.0);
        s.dispatch_march(TowerId(0), TowerId(1), Team::A, 5.0);
        s.clock = cfg.march_duration_secs;
        resolve_marches(&mut s, &cfg);
        let t = s.map.tower(TowerId(1)).unwrap();
        assert_eq!(t.owner, Owner::Held(Team::B));
        assert_eq!(t.soldiers, 7.0);
    }

    #[test]
    fn simultaneous_arrivals_resolve_by_departure() {
        let (mut s, cfg) = setup();
        // B's column left first and claims the neutral tower; A's later,
        // larger column then has to take it by force.
        force_tower(&mut s, 3, Owner::Held(Team::A), 20.0);
        force_tower(&mut s, 9, Owner::Held(Team::B), 20.0);
        s.clock = 0.0;
        assert!(s.dispatch_march(TowerId(9), TowerId(6), Team::B, 6.0));
        s.clock = 0.5;
        assert!(s.dispatch_march(TowerId(3), TowerId(6), Team::A, 10.0));

        s.clock = 0.5 + cfg.march_duration_secs;
        let arrivals = resolve_marches(&mut s, &cfg);
        assert_eq!(arrivals.len(), 2);
        assert!(matches!(arrivals[0], Arrival::Claimed { owner: Team::B, .. }));
        assert!(matches!(
            arrivals[1],
            Arrival::Captured { owner: Team::A, .. }
        ));
        let t = s.map.tower(TowerId(6)).unwrap();
        assert_eq!(t.owner, Owner::Held(Team::A));
        assert_eq!(t.soldiers, 4.0);
    }

    #[test]
    fn arrival_pushes_event_string() {
        let (mut s, cfg) = setup();
        s.dispatch_march(TowerId(0), TowerId(1), Team::A, 5.0);
        s.clock = cfg.march_duration_secs;
        resolve_marches(&mut s, &cfg);
        assert_eq!(s.events.back().unwrap(), "teamA claimed Northfen");
    }

    proptest! {
        #[test]
        fn attack_conserves_force(count in 1.0f32..500.0, garrison in 0.5f32..500.0) {
            let cfg = SiegeConfig::default();
            let mut s = GameState::new(&cfg);
            force_tower(&mut s, 0, Owner::Held(Team::A), count);
            force_tower(&mut s, 1, Owner::Held(Team::B), garrison);
            prop_assert!(s.dispatch_march(TowerId(0), TowerId(1), Team::A, count));
            s.clock = cfg.march_duration_secs;
            resolve_marches(&mut s, &cfg);

            let t = s.map.tower(TowerId(1)).unwrap();
            prop_assert!(t.soldiers >= 0.0);
            if count > garrison {
                prop_assert_eq!(t.owner, Owner::Held(Team::A));
                prop_assert_eq!(t.soldiers, count - garrison);
            } else if count < garrison {
                prop_assert_eq!(t.owner, Owner::Held(Team::B));
                prop_assert_eq!(t.soldiers, garrison - count);
            } else {
                prop_assert_eq!(t.owner, Owner::Neutral);
                prop_assert_eq!(t.soldiers, 0.0);
            }
        }
    }
}
