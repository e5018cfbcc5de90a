//! Economy engine: external effort converts to garrison at the home tower
//!
//! The input channel delivers a monotone cumulative counter rather than
//! deltas, which absorbs duplicate/at-most-once delivery ambiguity: a
//! replayed update computes a non-positive delta and is rejected with no
//! state change.

use crate::core::config::SiegeConfig;
use crate::core::types::Team;
use crate::map::home_tower;
use crate::state::GameState;

/// Apply one effort update for a team. Returns whether it was accepted.
///
/// Rejected (silently, no state change) when the delta is non-positive or
/// implausibly large, or — for human teams — when it arrives within the
/// minimum physiological interval of the last accepted event. On acceptance
/// the counter always advances; the garrison conversion additionally
/// requires the team to still own its home tower, so effort performed with
/// no home base is discarded without double-counting on recapture.
pub fn apply_effort(state: &mut GameState, cfg: &SiegeConfig, team: Team, cumulative: u32) -> bool {
    let clock = state.clock;
    let (pushups, is_ai, last_effort_at) = {
        let p = state.player(team);
        (p.pushups, p.is_ai, p.last_effort_at)
    };

    let delta = match cumulative.checked_sub(pushups) {
        Some(d) if d > 0 => d,
        _ => {
            tracing::trace!(team = team.token(), cumulative, "stale effort counter");
            return false;
        }
    };
    if delta > cfg.max_effort_delta {
        tracing::debug!(team = team.token(), delta, "rejected implausible effort jump");
        return false;
    }
    if !is_ai {
        if let Some(last) = last_effort_at {
            if clock - last < cfg.min_effort_interval_secs {
                tracing::debug!(team = team.token(), "rejected too-frequent effort event");
                return false;
            }
        }
    }

    {
        let player = state.player_mut(team);
        player.pushups = cumulative;
        player.last_effort_at = Some(clock);
    }

    if state.map.owns_home(team) {
        if let Some(home) = state.map.tower_mut(home_tower(team)) {
            home.soldiers += delta as f32 * cfg.soldiers_per_effort;
        }
    }
    true
}

/// Passive trickle generation, accumulated in whole simulated seconds.
///
/// Gated on the team having performed at least one accepted effort event
/// this game, and on still owning the home tower.
pub fn tick_passive(state: &mut GameState, cfg: &SiegeConfig) {
    while state.clock >= state.next_passive_at {
        state.next_passive_at += 1.0;
        for team in Team::BOTH {
            if state.player(team).pushups == 0 {
                continue;
            }
            if !state.map.owns_home(team) {
                continue;
            }
            if let Some(home) = state.map.tower_mut(home_tower(team)) {
                home.soldiers += cfg.passive_trickle;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Owner;
    use crate::core::types::TowerId;

    fn setup() -> (GameState, SiegeConfig) {
        let cfg = SiegeConfig::default();
        (GameState::new(&cfg), cfg)
    }

    #[test]
    fn effort_grows_home_garrison() {
        let (mut s, cfg) = setup();
        assert!(apply_effort(&mut s, &cfg, Team::A, 1));
        let home = s.map.tower(home_tower(Team::A)).unwrap();
        assert_eq!(home.soldiers, 15.0 + cfg.soldiers_per_effort);
        assert_eq!(s.player(Team::A).pushups, 1);
    }

    #[test]
    fn duplicate_counter_is_idempotent() {
        let (mut s, cfg) = setup();
        s.clock = 10.0;
        assert!(apply_effort(&mut s, &cfg, Team::A, 1));
        s.clock = 20.0;
        assert!(!apply_effort(&mut s, &cfg, Team::A, 1));
        let home = s.map.tower(home_tower(Team::A)).unwrap();
        assert_eq!(home.soldiers, 19.0);
    }

    #[test]
    fn rejects_spoofed_jump() {
        let (mut s, cfg) = setup();
        assert!(!apply_effort(&mut s, &cfg, Team::A, 4));
        assert_eq!(s.player(Team::A).pushups, 0);
        assert_eq!(s.map.tower(home_tower(Team::A)).unwrap().soldiers, 15.0);
    }

    #[test]
    fn rate_gate_rejects_rapid_human_events() {
        let (mut s, cfg) = setup();
        s.clock = 1.0;
        assert!(apply_effort(&mut s, &cfg, Team::A, 1));
        s.clock = 1.5;
        assert!(!apply_effort(&mut s, &cfg, Team::A, 2));
        s.clock = 1.9;
        assert!(apply_effort(&mut s, &cfg, Team::A, 2));
        assert_eq!(s.player(Team::A).pushups, 2);
    }

    #[test]
    fn ai_team_is_exempt_from_rate_gate() {
        let (mut s, cfg) = setup();
        s.player_mut(Team::B).is_ai = true;
        s.clock = 1.0;
        assert!(apply_effort(&mut s, &cfg, Team::B, 1));
        s.clock = 1.01;
        assert!(apply_effort(&mut s, &cfg, Team::B, 2));
    }

    #[test]
    fn lost_home_discards_conversion_but_advances_counter() {
        let (mut s, cfg) = setup();
        s.clock = 1.0;
        s.map.tower_mut(home_tower(Team::A)).unwrap().owner = Owner::Held(Team::B);
        assert!(apply_effort(&mut s, &cfg, Team::A, 1));
        assert_eq!(s.player(Team::A).pushups, 1);
        assert_eq!(s.map.tower(home_tower(Team::A)).unwrap().soldiers, 15.0);

        // Recapture later: the spent effort is not re-credited.
        s.map.tower_mut(home_tower(Team::A)).unwrap().owner = Owner::Held(Team::A);
        s.clock = 2.0;
        assert!(!apply_effort(&mut s, &cfg, Team::A, 1));
        assert_eq!(s.map.tower(home_tower(Team::A)).unwrap().soldiers, 15.0);
    }

    #[test]
    fn passive_trickle_requires_prior_effort() {
        let (mut s, cfg) = setup();
        s.clock = 3.0;
        tick_passive(&mut s, &cfg);
        assert_eq!(s.map.tower(home_tower(Team::A)).unwrap().soldiers, 15.0);

        s.clock = 3.1;
        assert!(apply_effort(&mut s, &cfg, Team::A, 1));
        s.clock = 6.0;
        tick_passive(&mut s, &cfg);
        // Seconds 4, 5 and 6 credit the trickle; 1..=3 were ticked away above.
        let expected = 15.0 + cfg.soldiers_per_effort + 3.0 * cfg.passive_trickle;
        assert_eq!(s.map.tower(home_tower(Team::A)).unwrap().soldiers, expected);
    }

    #[test]
    fn passive_trickle_stops_when_home_is_lost() {
        let (mut s, cfg) = setup();
        s.clock = 0.5;
        assert!(apply_effort(&mut s, &cfg, Team::A, 1));
        s.map.tower_mut(home_tower(Team::A)).unwrap().owner = Owner::Held(Team::B);
        let before = s.map.tower(TowerId(0)).unwrap().soldiers;
        s.clock = 5.0;
        tick_passive(&mut s, &cfg);
        assert_eq!(s.map.tower(TowerId(0)).unwrap().soldiers, before);
    }
}
