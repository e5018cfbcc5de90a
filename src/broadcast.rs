//! Broadcast interface
//!
//! Wire-facing views of a session. A full [`StateSnapshot`] goes out once
//! per tick while the game runs (and on every phase transition); discrete
//! lifecycle events get their own messages. Fractional soldier counts are
//! floored here and only here; internal state stays fractional.

use serde::Serialize;

use crate::core::types::{Owner, Team};
use crate::session::{GameMode, Phase, Session, SessionEvent};
use crate::state::DeployMode;

/// Everything published on a session's broadcast channel
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundMessage {
    Snapshot(StateSnapshot),
    GameStarted { mode: GameMode, duration_secs: f64 },
    GameOver { winner: Team },
    SessionTerminated,
}

impl From<SessionEvent> for OutboundMessage {
    fn from(event: SessionEvent) -> Self {
        match event {
            SessionEvent::GameStarted {
                mode,
                duration_secs,
            } => OutboundMessage::GameStarted {
                mode,
                duration_secs,
            },
            SessionEvent::GameOver { winner } => OutboundMessage::GameOver { winner },
        }
    }
}

/// Complete per-tick view of one session
#[derive(Debug, Clone, Serialize)]
pub struct StateSnapshot {
    pub phase: Phase,
    pub countdown: u32,
    pub time_remaining_secs: f64,
    pub teams: [TeamSummary; 2],
    pub towers: Vec<TowerSnapshot>,
    /// Static for the session's lifetime; sent every snapshot anyway so a
    /// late subscriber can render from any single message
    pub edges: Vec<(u32, u32)>,
    pub marches: Vec<MarchSnapshot>,
    pub events: Vec<String>,
    pub winner: Option<Team>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TeamSummary {
    pub team: Team,
    pub pushups: u32,
    pub total_soldiers: u32,
    pub towers_owned: u32,
    pub ready: bool,
    pub is_ai: bool,
    pub deploy_mode: DeployMode,
}

#[derive(Debug, Clone, Serialize)]
pub struct TowerSnapshot {
    pub id: u32,
    pub name: String,
    pub x: f32,
    pub y: f32,
    pub owner: Owner,
    pub soldiers: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct MarchSnapshot {
    pub from: u32,
    pub to: u32,
    pub owner: Team,
    pub count: u32,
    pub progress: f32,
}

impl StateSnapshot {
    pub fn from_session(session: &Session) -> Self {
        let state = &session.state;
        let teams = Team::BOTH.map(|team| {
            let p = state.player(team);
            TeamSummary {
                team,
                pushups: p.pushups,
                total_soldiers: p.total_soldiers.max(0.0) as u32,
                towers_owned: p.towers_owned,
                ready: p.ready,
                is_ai: p.is_ai,
                deploy_mode: p.deploy_mode,
            }
        });
        let towers = state
            .map
            .towers()
            .iter()
            .map(|t| TowerSnapshot {
                id: t.id.0,
                name: t.name.clone(),
                x: t.position.x,
                y: t.position.y,
                owner: t.owner,
                soldiers: t.soldiers.max(0.0) as u32,
            })
            .collect();
        let edges = state
            .map
            .edges()
            .iter()
            .map(|&(a, b)| (a.0, b.0))
            .collect();
        let marches = state
            .marches
            .iter()
            .map(|m| MarchSnapshot {
                from: m.from.0,
                to: m.to.0,
                owner: m.owner,
                count: m.count.max(0.0) as u32,
                progress: m.progress(state.clock, session.cfg.march_duration_secs),
            })
            .collect();
        Self {
            phase: session.phase,
            countdown: session.countdown,
            time_remaining_secs: session.time_remaining(),
            teams,
            towers,
            edges,
            marches,
            events: state.events.iter().cloned().collect(),
            winner: state.winner,
        }
    }
}
