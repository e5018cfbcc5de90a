//! Session registry and tokio runtime
//!
//! The registry is the only state shared across sessions: an id-to-handle
//! map behind one lock. Each session gets its own tick task and its own
//! broadcast channel; commands lock the same `RwLock` the tick task uses,
//! so input application and tick advancement interleave safely.

use std::sync::Arc;
use std::time::Duration;

use ahash::AHashMap;
use tokio::sync::{broadcast, Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use crate::broadcast::{OutboundMessage, StateSnapshot};
use crate::core::config::SiegeConfig;
use crate::core::error::{Result, SiegeError};
use crate::core::types::{SessionId, Team};
use crate::deploy::Direction;
use crate::session::{GameMode, Phase, Session};
use crate::state::DeployMode;

/// Broadcast channel depth per session. Slow subscribers lag rather than
/// block the tick task.
const CHANNEL_CAPACITY: usize = 64;

/// Shared handle to one running session: the locked state, its broadcast
/// channel, and the tick task driving it.
pub struct SessionHandle {
    pub id: SessionId,
    session: Arc<RwLock<Session>>,
    outbound: broadcast::Sender<OutboundMessage>,
    tick_task: JoinHandle<()>,
}

impl SessionHandle {
    pub fn subscribe(&self) -> broadcast::Receiver<OutboundMessage> {
        self.outbound.subscribe()
    }

    pub async fn claim_next_slot(&self) -> Result<Team> {
        let team = self.session.write().await.claim_next_slot()?;
        self.publish_snapshot().await;
        Ok(team)
    }

    pub async fn claim_slot(&self, slot: u8) -> Result<Team> {
        let team = self.session.write().await.claim_slot(slot)?;
        self.publish_snapshot().await;
        Ok(team)
    }

    pub async fn mark_ready(&self, team: Team) -> bool {
        let started = self.session.write().await.mark_ready(team);
        self.publish_snapshot().await;
        started
    }

    /// Cumulative effort report. Applied against session state the moment
    /// it arrives, not queued for the next tick.
    pub async fn apply_effort(&self, team: Team, cumulative: u32) -> bool {
        self.session.write().await.apply_effort(team, cumulative)
    }

    pub async fn manual_deploy(&self, team: Team, direction: Direction) -> bool {
        let ok = self.session.write().await.manual_deploy(team, direction);
        if ok {
            self.publish_snapshot().await;
        }
        ok
    }

    pub async fn set_deploy_mode(&self, team: Team, mode: DeployMode) {
        self.session.write().await.set_deploy_mode(team, mode);
        self.publish_snapshot().await;
    }

    pub async fn disconnect(&self, team: Team) {
        let events = self.session.write().await.handle_disconnect(team);
        for event in events {
            let _ = self.outbound.send(event.into());
        }
        self.publish_snapshot().await;
    }

    pub async fn phase(&self) -> Phase {
        self.session.read().await.phase
    }

    pub async fn snapshot(&self) -> StateSnapshot {
        StateSnapshot::from_session(&*self.session.read().await)
    }

    async fn publish_snapshot(&self) {
        let snap = self.snapshot().await;
        let _ = self.outbound.send(OutboundMessage::Snapshot(snap));
    }
}

/// Id-to-handle map for all live sessions
pub struct SessionRegistry {
    sessions: Mutex<AHashMap<SessionId, Arc<SessionHandle>>>,
    cfg: SiegeConfig,
}

impl SessionRegistry {
    pub fn new(cfg: SiegeConfig) -> Self {
        Self {
            sessions: Mutex::new(AHashMap::new()),
            cfg,
        }
    }

    /// Create a session and start its tick task.
    pub async fn create_session(
        &self,
        mode: GameMode,
        bot_seed: u64,
    ) -> Result<Arc<SessionHandle>> {
        let session = Session::new(self.cfg.clone(), mode, bot_seed)?;
        let id = session.id;
        let tick_dt = self.cfg.tick_dt();
        let session = Arc::new(RwLock::new(session));
        let (outbound, _) = broadcast::channel(CHANNEL_CAPACITY);
        let tick_task = tokio::spawn(run_tick_loop(
            Arc::clone(&session),
            outbound.clone(),
            tick_dt,
        ));
        let handle = Arc::new(SessionHandle {
            id,
            session,
            outbound,
            tick_task,
        });
        self.sessions.lock().await.insert(id, Arc::clone(&handle));
        tracing::info!(session = %id, ?mode, "session created");
        Ok(handle)
    }

    pub async fn get(&self, id: SessionId) -> Result<Arc<SessionHandle>> {
        self.sessions
            .lock()
            .await
            .get(&id)
            .cloned()
            .ok_or(SiegeError::SessionNotFound(id))
    }

    /// Tear a session down: stop its tick task, tell subscribers, drop the
    /// state. Removing an unknown id is an error.
    pub async fn remove(&self, id: SessionId) -> Result<()> {
        let handle = self
            .sessions
            .lock()
            .await
            .remove(&id)
            .ok_or(SiegeError::SessionNotFound(id))?;
        let _ = handle.outbound.send(OutboundMessage::SessionTerminated);
        handle.tick_task.abort();
        tracing::info!(session = %id, "session removed");
        Ok(())
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.lock().await.len()
    }
}

/// Fixed-rate driver for one session. Snapshots are taken under the same
/// lock the tick ran under, after the synchronous update completes, then
/// published outside it. Exits when the game ends.
async fn run_tick_loop(
    session: Arc<RwLock<Session>>,
    outbound: broadcast::Sender<OutboundMessage>,
    tick_dt: f64,
) {
    let mut ticker = interval(Duration::from_secs_f64(tick_dt));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        ticker.tick().await;
        let (events, snapshot, phase) = {
            let mut s = session.write().await;
            let before = s.phase;
            let events = s.tick(tick_dt);
            let snapshot = if s.phase == Phase::Playing || s.phase != before {
                Some(StateSnapshot::from_session(&s))
            } else {
                None
            };
            (events, snapshot, s.phase)
        };
        for event in events {
            let _ = outbound.send(event.into());
        }
        if let Some(snap) = snapshot {
            let _ = outbound.send(OutboundMessage::Snapshot(snap));
        }
        if phase == Phase::GameOver {
            tracing::debug!("tick loop finished");
            break;
        }
    }
}
