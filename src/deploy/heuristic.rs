//! Automatic deployment heuristic
//!
//! Runs on a coarser cadence than the simulation tick so automatic play
//! reads as strategic rather than twitchy. For every tower owned by a team
//! in automatic mode, a defensive reserve is held back and the surplus is
//! sent to the best-ranked adjacent target under a strict priority:
//! claim neutral ground, then opportunistic attacks with a safety margin,
//! then reinforcement of weak allies. Within a tier the weakest-defended
//! candidate wins.

use crate::core::config::SiegeConfig;
use crate::core::types::{Owner, Team, TowerId};
use crate::state::{DeployMode, GameState};

/// Run the heuristic if its cadence is due. Returns the number of marches
/// dispatched (0 when off-cadence or nothing qualified).
pub fn tick_deploy(state: &mut GameState, cfg: &SiegeConfig) -> usize {
    if state.clock < state.next_deploy_at {
        return 0;
    }
    state.next_deploy_at = state.clock + cfg.deploy_interval_secs;
    run_deploy_pass(state, cfg)
}

/// One full heuristic pass over every automatic tower, in id order.
pub fn run_deploy_pass(state: &mut GameState, cfg: &SiegeConfig) -> usize {
    // Snapshot owned towers up front; dispatches during the pass only
    // deduct from their own origin, so the snapshot stays accurate.
    let owned: Vec<(TowerId, Team, f32)> = state
        .map
        .towers()
        .iter()
        .filter_map(|t| t.owner.team().map(|team| (t.id, team, t.soldiers)))
        .collect();

    let mut dispatched = 0;
    for (id, team, garrison) in owned {
        // AI teams always deploy automatically; humans only in Auto mode.
        let player = state.player(team);
        if player.deploy_mode != DeployMode::Auto && !player.is_ai {
            continue;
        }
        let reserve = cfg.min_reserve.max(garrison * cfg.reserve_fraction);
        let deployable = garrison - reserve;
        if deployable < cfg.deploy_floor {
            continue;
        }
        let Some((target, fraction)) = pick_target(state, cfg, id, team, deployable) else {
            continue;
        };
        let count = deployable * fraction;
        if state.dispatch_march(id, target, team, count) {
            tracing::debug!(
                team = team.token(),
                from = id.0,
                to = target.0,
                count,
                "auto deploy"
            );
            dispatched += 1;
        }
    }
    dispatched
}

/// Rank adjacent candidates and return the chosen target with the surplus
/// fraction to commit. None when no tier produces a candidate or the only
/// candidate already has a march in flight from this origin.
fn pick_target(
    state: &GameState,
    cfg: &SiegeConfig,
    from: TowerId,
    team: Team,
    deployable: f32,
) -> Option<(TowerId, f32)> {
    let mut claim: Option<(TowerId, f32)> = None;
    let mut attack: Option<(TowerId, f32)> = None;
    let mut reinforce: Option<(TowerId, f32)> = None;

    for &adj in state.map.adjacent(from) {
        let Some(t) = state.map.tower(adj) else {
            continue;
        };
        match t.owner {
            Owner::Neutral => weakest(&mut claim, adj, t.soldiers),
            Owner::Held(other) if other != team => {
                if deployable > t.soldiers * cfg.attack_margin {
                    weakest(&mut attack, adj, t.soldiers);
                }
            }
            Owner::Held(_) => {
                if deployable >= cfg.reinforce_surplus && t.soldiers < cfg.weak_garrison {
                    weakest(&mut reinforce, adj, t.soldiers);
                }
            }
        }
    }

    let (target, fraction) = if let Some((id, _)) = claim {
        (id, cfg.claim_fraction)
    } else if let Some((id, _)) = attack {
        (id, cfg.attack_fraction)
    } else if let Some((id, _)) = reinforce {
        (id, cfg.reinforce_fraction)
    } else {
        return None;
    };

    // No stacking: one march per (origin, target, owner) at a time.
    if state.march_active(from, target, team) {
        return None;
    }
    Some((target, fraction))
}

/// Keep the lowest-defense candidate; first seen wins ties (adjacency is
/// sorted by id, so ties break toward the lower id).
fn weakest(slot: &mut Option<(TowerId, f32)>, id: TowerId, defense: f32) {
    if slot.map(|(_, d)| defense < d).unwrap_or(true) {
        *slot = Some((id, defense));
    }
}
