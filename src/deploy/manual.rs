//! Manual deploy channel
//!
//! Players in manual mode push from their home tower toward one side of the
//! map. The home's neighbors are ranked by horizontal position and the
//! extreme on the chosen side is the target; if that tower is already held,
//! the push extends exactly one hop further along the same side. A lane
//! push, not pathfinding.

use serde::{Deserialize, Serialize};

use crate::core::config::SiegeConfig;
use crate::core::types::{Team, TowerId};
use crate::map::{home_tower, Tower};
use crate::state::{DeployMode, GameState};

/// Which side of the map to push toward, in screen space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    Right,
}

/// Push the home garrison's surplus toward one side. Returns false without
/// mutating anything when the team is not in manual mode, does not own its
/// home, has no surplus worth sending, the lane resolves to no target, or a
/// march to the resolved target is already in flight.
pub fn manual_deploy(
    state: &mut GameState,
    cfg: &SiegeConfig,
    team: Team,
    direction: Direction,
) -> bool {
    if state.player(team).deploy_mode != DeployMode::Manual {
        return false;
    }
    let home = home_tower(team);
    let Some(origin) = state.map.tower(home) else {
        return false;
    };
    if !origin.owner.is(team) {
        return false;
    }
    let garrison = origin.soldiers;
    let reserve = cfg.min_reserve.max(garrison * cfg.reserve_fraction);
    let send = garrison - reserve;
    if send < cfg.deploy_floor {
        return false;
    }

    let Some(target) = resolve_target(state, home, team, direction) else {
        return false;
    };
    if !state.dispatch_march(home, target, team, send) {
        return false;
    }
    tracing::debug!(
        team = team.token(),
        from = home.0,
        to = target.0,
        count = send,
        ?direction,
        "manual deploy"
    );
    true
}

/// Resolve the lane target: the home neighbor at the extreme of the chosen
/// side, or one hop past it when that neighbor is already held by the team.
fn resolve_target(
    state: &GameState,
    home: TowerId,
    team: Team,
    direction: Direction,
) -> Option<TowerId> {
    let nearest = extreme_by_x(state, state.map.adjacent(home), direction, |_| true)?;
    let tower = state.map.tower(nearest)?;
    if !tower.owner.is(team) {
        return Some(nearest);
    }
    // Lane extension: one hop past the held neighbor, never back through
    // home and never onto another tower the team already holds.
    extreme_by_x(state, state.map.adjacent(nearest), direction, |t| {
        t.id != home && !t.owner.is(team)
    })
}

/// Extreme-by-x candidate on the given side; strict comparison so the first
/// seen wins ties (adjacency is sorted by id).
fn extreme_by_x(
    state: &GameState,
    candidates: &[TowerId],
    direction: Direction,
    keep: impl Fn(&Tower) -> bool,
) -> Option<TowerId> {
    let mut best: Option<(TowerId, f32)> = None;
    for &id in candidates {
        let Some(t) = state.map.tower(id) else {
            continue;
        };
        if !keep(t) {
            continue;
        }
        let better = match best {
            None => true,
            Some((_, x)) => match direction {
                Direction::Left => t.position.x < x,
                Direction::Right => t.position.x > x,
            },
        };
        if better {
            best = Some((id, t.position.x));
        }
    }
    best.map(|(id, _)| id)
}
