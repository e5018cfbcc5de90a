//! Session state machine
//!
//! One `Session` owns the complete simulation for one game: phase
//! transitions, the per-tick pipeline, and win-condition evaluation.
//! Sessions share nothing; the registry in [`registry`] owns the tokio
//! plumbing that drives them.

pub mod registry;

use serde::{Deserialize, Serialize};

use crate::bot::AdaptiveBot;
use crate::core::config::SiegeConfig;
use crate::core::error::{Result, SiegeError};
use crate::core::types::{SessionId, Team};
use crate::deploy::{manual_deploy, tick_deploy, Direction};
use crate::economy::{apply_effort, tick_passive};
use crate::march::resolve_marches;
use crate::state::{DeployMode, GameState};

/// Lifecycle phase of a session. `GameOver` is terminal; a rematch is a
/// new session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Lobby,
    Countdown,
    Playing,
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    TwoPlayer,
    VersusBot,
}

/// Discrete transitions surfaced by [`Session::tick`] for broadcast
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    GameStarted { mode: GameMode, duration_secs: f64 },
    GameOver { winner: Team },
}

/// One isolated game: phase, simulation state, and (optionally) the bot
/// driving the second slot.
#[derive(Debug)]
pub struct Session {
    pub id: SessionId,
    pub mode: GameMode,
    pub cfg: SiegeConfig,
    pub phase: Phase,
    /// Seconds left on the pre-game countdown; meaningful in `Countdown`
    pub countdown: u32,
    pub state: GameState,
    bot: Option<AdaptiveBot>,
    countdown_accum: f64,
}

impl Session {
    pub fn new(cfg: SiegeConfig, mode: GameMode, bot_seed: u64) -> Result<Self> {
        cfg.validate().map_err(SiegeError::InvalidConfig)?;
        let mut state = GameState::new(&cfg);
        let bot = match mode {
            GameMode::TwoPlayer => None,
            GameMode::VersusBot => {
                let slot = state.player_mut(Team::B);
                slot.is_ai = true;
                slot.claimed = true;
                slot.ready = true;
                Some(AdaptiveBot::new(Team::B, bot_seed))
            }
        };
        Ok(Self {
            id: SessionId::new(),
            mode,
            cfg,
            phase: Phase::Lobby,
            countdown: 0,
            state,
            bot,
            countdown_accum: 0.0,
        })
    }

    /// Claim the first free team slot, first come first served.
    pub fn claim_next_slot(&mut self) -> Result<Team> {
        for team in Team::BOTH {
            if !self.state.player(team).claimed {
                self.state.player_mut(team).claimed = true;
                return Ok(team);
            }
        }
        Err(SiegeError::SessionFull)
    }

    /// Claim a specific slot (1 or 2).
    pub fn claim_slot(&mut self, slot: u8) -> Result<Team> {
        let team = Team::from_slot(slot).ok_or(SiegeError::UnknownSlot(slot))?;
        if self.state.player(team).claimed {
            return Err(SiegeError::SlotTaken(team));
        }
        self.state.player_mut(team).claimed = true;
        Ok(team)
    }

    /// Flag a claimed slot ready. Starts the countdown (and returns true)
    /// once every slot is claimed and ready.
    pub fn mark_ready(&mut self, team: Team) -> bool {
        if self.phase != Phase::Lobby || !self.state.player(team).claimed {
            return false;
        }
        self.state.player_mut(team).ready = true;
        if self
            .state
            .players
            .iter()
            .all(|p| p.claimed && p.ready)
        {
            self.phase = Phase::Countdown;
            self.countdown = self.cfg.countdown_from;
            self.countdown_accum = 0.0;
            tracing::info!(session = %self.id, "countdown started");
            return true;
        }
        false
    }

    /// Advance the session by `dt` simulated seconds. Returns any discrete
    /// transitions that happened inside this step.
    pub fn tick(&mut self, dt: f64) -> Vec<SessionEvent> {
        match self.phase {
            Phase::Lobby | Phase::GameOver => Vec::new(),
            Phase::Countdown => {
                self.countdown_accum += dt;
                while self.countdown_accum >= 1.0 && self.countdown > 0 {
                    self.countdown_accum -= 1.0;
                    self.countdown -= 1;
                }
                if self.countdown == 0 {
                    self.phase = Phase::Playing;
                    tracing::info!(session = %self.id, mode = ?self.mode, "game started");
                    vec![SessionEvent::GameStarted {
                        mode: self.mode,
                        duration_secs: self.cfg.game_duration_secs,
                    }]
                } else {
                    Vec::new()
                }
            }
            Phase::Playing => {
                self.state.clock += dt;
                if let Some(bot) = self.bot.as_mut() {
                    bot.tick(&mut self.state, &self.cfg);
                }
                tick_passive(&mut self.state, &self.cfg);
                tick_deploy(&mut self.state, &self.cfg);
                resolve_marches(&mut self.state, &self.cfg);
                self.state.recompute_derived();
                match self.check_win() {
                    Some(winner) => self.finish(winner),
                    None => Vec::new(),
                }
            }
        }
    }

    /// Seconds left on the game clock; zero once expired.
    pub fn time_remaining(&self) -> f64 {
        (self.cfg.game_duration_secs - self.state.clock).max(0.0)
    }

    /// Submit a cumulative effort count for a team. No-op outside Playing.
    pub fn apply_effort(&mut self, team: Team, cumulative: u32) -> bool {
        if self.phase != Phase::Playing {
            return false;
        }
        apply_effort(&mut self.state, &self.cfg, team, cumulative)
    }

    /// Push the team's home surplus down a lane. No-op outside Playing.
    pub fn manual_deploy(&mut self, team: Team, direction: Direction) -> bool {
        if self.phase != Phase::Playing {
            return false;
        }
        manual_deploy(&mut self.state, &self.cfg, team, direction)
    }

    pub fn set_deploy_mode(&mut self, team: Team, mode: DeployMode) {
        self.state.player_mut(team).deploy_mode = mode;
    }

    /// A transport drop while Playing is instant elimination; in the lobby
    /// it just frees the slot.
    pub fn handle_disconnect(&mut self, team: Team) -> Vec<SessionEvent> {
        match self.phase {
            Phase::Playing => {
                tracing::info!(session = %self.id, team = team.token(), "disconnect forfeits");
                self.finish(team.opponent())
            }
            Phase::Lobby | Phase::Countdown => {
                let slot = self.state.player_mut(team);
                if !slot.is_ai {
                    slot.claimed = false;
                    slot.ready = false;
                    self.phase = Phase::Lobby;
                }
                Vec::new()
            }
            Phase::GameOver => Vec::new(),
        }
    }

    fn finish(&mut self, winner: Team) -> Vec<SessionEvent> {
        self.state.winner = Some(winner);
        self.phase = Phase::GameOver;
        tracing::info!(session = %self.id, winner = winner.token(), "game over");
        vec![SessionEvent::GameOver { winner }]
    }

    /// Win conditions in strict priority: full-map capture, elimination,
    /// then timer expiry (more soldiers, then more lifetime effort, then
    /// slot A keeps the residual tie).
    fn check_win(&self) -> Option<Team> {
        let total = self.state.map.towers().len() as u32;
        for team in Team::BOTH {
            let opposing_march = self
                .state
                .marches
                .iter()
                .any(|m| m.owner != team);
            if self.state.player(team).towers_owned == total && !opposing_march {
                return Some(team);
            }
        }
        for team in Team::BOTH {
            let own_march = self.state.marches.iter().any(|m| m.owner == team);
            if self.state.player(team).towers_owned == 0 && !own_march {
                return Some(team.opponent());
            }
        }
        if self.time_remaining() <= 0.0 {
            let a = self.state.player(Team::A);
            let b = self.state.player(Team::B);
            let winner = if a.total_soldiers > b.total_soldiers {
                Team::A
            } else if b.total_soldiers > a.total_soldiers {
                Team::B
            } else if b.pushups > a.pushups {
                Team::B
            } else {
                Team::A
            };
            return Some(winner);
        }
        None
    }
}
