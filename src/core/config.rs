//! Simulation configuration with documented constants
//!
//! All magic numbers are collected here with explanations of their purpose
//! and how they interact with each other.

/// Configuration for one siege session
///
/// These values have been tuned to keep a two-minute match readable on a
/// shared display. Changing them affects pacing more than balance: both
/// teams run under the same numbers.
#[derive(Debug, Clone)]
pub struct SiegeConfig {
    // === TICK & CLOCK ===
    /// Fixed simulation rate in ticks per second
    ///
    /// 30 Hz keeps march progress smooth on the display while leaving the
    /// per-tick work (13 towers, a handful of marches) trivially cheap.
    pub tick_rate: u32,

    /// Match length in simulated seconds once the playing phase begins
    pub game_duration_secs: f64,

    /// Countdown start value; decremented once per simulated second
    pub countdown_from: u32,

    // === ECONOMY ===
    /// Garrison added to the home tower per accepted effort unit
    pub soldiers_per_effort: f32,

    /// Largest accepted jump of the cumulative effort counter
    ///
    /// A real human cannot complete more than a couple of repetitions
    /// between two updates; anything larger is treated as a spoofed
    /// counter and rejected outright.
    pub max_effort_delta: u32,

    /// Minimum gap between accepted effort events for a human team
    ///
    /// The primary anti-cheat gate. 0.8 s is lenient enough for genuinely
    /// fast repetitions but rejects scripted floods. AI teams are exempt:
    /// their events come from the scheduler, not an input channel.
    pub min_effort_interval_secs: f64,

    /// Garrison trickled into the home tower once per simulated second
    ///
    /// Only granted after the team's first accepted effort event, so a
    /// fully idle team cannot passively win.
    pub passive_trickle: f32,

    // === MARCHES ===
    /// Wall time for a troop column to cross one edge
    pub march_duration_secs: f64,

    // === AUTOMATIC DEPLOYMENT ===
    /// Seconds between deployment-heuristic passes
    ///
    /// Deliberately much coarser than the tick so automatic play looks
    /// strategic rather than twitchy.
    pub deploy_interval_secs: f64,

    /// Absolute garrison floor a tower always keeps back
    pub min_reserve: f32,

    /// Fraction of the garrison kept back in addition to `min_reserve`
    /// (the larger of the two wins)
    pub reserve_fraction: f32,

    /// Deployable counts below this are not worth sending
    pub deploy_floor: f32,

    /// Attack only when deployable force exceeds the defense by this factor
    pub attack_margin: f32,

    /// Deployable surplus required before reinforcing an ally is considered
    pub reinforce_surplus: f32,

    /// Friendly towers below this garrison count as weak and reinforceable
    pub weak_garrison: f32,

    /// Fraction of the deployable surplus sent to claim neutral ground
    pub claim_fraction: f32,

    /// Fraction of the deployable surplus committed to an attack
    ///
    /// Larger than `claim_fraction`: an attack below the safety margin is
    /// never chosen, so committing hard is safe.
    pub attack_fraction: f32,

    /// Fraction of the deployable surplus sent to reinforce a weak ally
    pub reinforce_fraction: f32,

    // === ADAPTIVE OPPONENT ===
    /// Silence after the playing phase begins before the bot acts
    pub bot_warmup_secs: f64,

    /// Width of one human-rate sampling window
    pub bot_sample_window_secs: f64,

    /// Rolling windows averaged for smoothing
    pub bot_rate_samples: usize,

    /// Fraction of the human's smoothed rate the bot targets
    ///
    /// Below 1.0 so an evenly-matched human stays slightly ahead; the bot
    /// pressures, it does not outpace.
    pub bot_rate_fraction: f64,

    /// Per-tick probability of opening a surge window
    pub bot_surge_chance_per_tick: f64,

    /// Rate multiplier while a surge window is open
    pub bot_surge_multiplier: f64,

    /// Surge window length in seconds
    pub bot_surge_duration_secs: f64,

    /// Human inactivity beyond this switches the bot to idle mirroring
    pub bot_idle_threshold_secs: f64,

    /// Interval range (min, max) for rare idle-mirroring events
    pub bot_idle_interval_secs: (f64, f64),

    /// Clamp floor for the scheduled inter-event interval
    pub bot_min_interval_secs: f64,

    /// Clamp ceiling for the scheduled inter-event interval
    pub bot_max_interval_secs: f64,

    /// Relative jitter applied to each scheduled interval
    ///
    /// ±20% keeps the firing pattern from sounding robotic.
    pub bot_interval_jitter: f64,

    // === BROADCAST ===
    /// Maximum entries kept in the recent-events ring (UI flourish only)
    pub event_log_cap: usize,
}

impl Default for SiegeConfig {
    fn default() -> Self {
        Self {
            tick_rate: 30,
            game_duration_secs: 120.0,
            countdown_from: 3,

            soldiers_per_effort: 4.0,
            max_effort_delta: 3,
            min_effort_interval_secs: 0.8,
            passive_trickle: 0.5,

            march_duration_secs: 3.0,

            deploy_interval_secs: 3.0,
            min_reserve: 5.0,
            reserve_fraction: 0.2,
            deploy_floor: 4.0,
            attack_margin: 1.3,
            reinforce_surplus: 20.0,
            weak_garrison: 8.0,
            claim_fraction: 0.5,
            attack_fraction: 0.8,
            reinforce_fraction: 0.5,

            bot_warmup_secs: 5.0,
            bot_sample_window_secs: 5.0,
            bot_rate_samples: 4,
            bot_rate_fraction: 0.75,
            bot_surge_chance_per_tick: 0.004,
            bot_surge_multiplier: 2.0,
            bot_surge_duration_secs: 4.0,
            bot_idle_threshold_secs: 10.0,
            bot_idle_interval_secs: (12.0, 20.0),
            bot_min_interval_secs: 0.8,
            bot_max_interval_secs: 8.0,
            bot_interval_jitter: 0.2,

            event_log_cap: 8,
        }
    }
}

impl SiegeConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.tick_rate == 0 {
            return Err("tick_rate must be positive".into());
        }
        if self.game_duration_secs <= 0.0 || self.march_duration_secs <= 0.0 {
            return Err("durations must be positive".into());
        }
        if self.max_effort_delta == 0 {
            return Err("max_effort_delta must allow at least one repetition".into());
        }
        if !(0.0..1.0).contains(&self.reserve_fraction) {
            return Err(format!(
                "reserve_fraction ({}) must be in [0, 1)",
                self.reserve_fraction
            ));
        }
        for (name, f) in [
            ("claim_fraction", self.claim_fraction),
            ("attack_fraction", self.attack_fraction),
            ("reinforce_fraction", self.reinforce_fraction),
        ] {
            if !(0.0..=1.0).contains(&f) {
                return Err(format!("{} ({}) must be in [0, 1]", name, f));
            }
        }
        if self.attack_margin < 1.0 {
            return Err(format!(
                "attack_margin ({}) below 1.0 would attack into losing fights",
                self.attack_margin
            ));
        }
        if self.bot_min_interval_secs > self.bot_max_interval_secs {
            return Err(format!(
                "bot_min_interval_secs ({}) must be <= bot_max_interval_secs ({})",
                self.bot_min_interval_secs, self.bot_max_interval_secs
            ));
        }
        if self.bot_idle_interval_secs.0 > self.bot_idle_interval_secs.1 {
            return Err("bot_idle_interval_secs range is inverted".into());
        }
        if self.bot_rate_samples == 0 {
            return Err("bot_rate_samples must be positive".into());
        }
        Ok(())
    }

    /// Seconds advanced per simulation tick
    pub fn tick_dt(&self) -> f64 {
        1.0 / self.tick_rate as f64
    }
}
