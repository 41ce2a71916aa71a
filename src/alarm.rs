//! Debounced intrusion alarm.
//!
//! The alarm is raised as soon as any tracked person is inside a zone and
//! stays on while intruders remain. When the last one leaves, a cooldown of
//! fixed wall-clock length starts; the alarm clears only if nobody re-enters
//! before it elapses. A re-entry during cooldown is a fresh raise.
//!
//! ```text
//!   Idle --intruders--> Active --empty--> Cooldown --elapsed--> Idle
//!                         ^                   |
//!                         +----intruders------+
//! ```

use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::ConfigError;
use crate::tracker::TrackId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlarmConfig {
    /// Seconds the alarm stays on after the last intruder leaves
    pub cooldown_secs: f64,
}

impl Default for AlarmConfig {
    fn default() -> Self {
        Self { cooldown_secs: 3.0 }
    }
}

/// Longest accepted cooldown.
pub const MAX_COOLDOWN: Duration = Duration::from_secs(24 * 60 * 60);

impl AlarmConfig {
    pub fn cooldown(&self) -> Result<Duration, ConfigError> {
        Duration::try_from_secs_f64(self.cooldown_secs)
            .ok()
            .filter(|cooldown| *cooldown <= MAX_COOLDOWN)
            .ok_or(ConfigError::InvalidCooldown(self.cooldown_secs))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmState {
    Idle,
    Active,
    Cooldown { deadline: Instant },
}

/// Observable transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlarmEvent {
    /// Idle or Cooldown -> Active
    Raised,
    /// Active -> Cooldown
    CooldownStarted,
    /// Cooldown -> Idle
    Cleared,
}

/// Per-frame alarm output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AlarmStatus {
    /// True in both Active and Cooldown
    pub active: bool,
    /// Last non-empty intruder set; empty once Idle
    pub intruders: BTreeSet<TrackId>,
}

#[derive(Debug, Clone)]
pub struct AlarmController {
    state: AlarmState,
    cooldown: Duration,
    intruders: BTreeSet<TrackId>,
}

impl AlarmController {
    /// Cooldowns above [`MAX_COOLDOWN`] are clamped to it.
    pub fn new(cooldown: Duration) -> Self {
        Self {
            state: AlarmState::Idle,
            cooldown: cooldown.min(MAX_COOLDOWN),
            intruders: BTreeSet::new(),
        }
    }

    pub fn from_config(config: &AlarmConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(config.cooldown()?))
    }

    /// Advance one frame using the monotonic clock.
    pub fn update(&mut self, intruders: &BTreeSet<TrackId>) -> (AlarmStatus, Option<AlarmEvent>) {
        self.update_at(intruders, Instant::now())
    }

    /// Advance one frame at `now`.
    pub fn update_at(
        &mut self,
        intruders: &BTreeSet<TrackId>,
        now: Instant,
    ) -> (AlarmStatus, Option<AlarmEvent>) {
        let event = if intruders.is_empty() {
            self.on_empty(now)
        } else {
            self.on_intruders(intruders)
        };
        (self.status(), event)
    }

    fn on_intruders(&mut self, intruders: &BTreeSet<TrackId>) -> Option<AlarmEvent> {
        self.intruders.clone_from(intruders);
        match self.state {
            AlarmState::Active => None,
            AlarmState::Idle | AlarmState::Cooldown { .. } => {
                self.state = AlarmState::Active;
                info!(intruders = ?self.intruders, "alarm raised");
                Some(AlarmEvent::Raised)
            }
        }
    }

    fn on_empty(&mut self, now: Instant) -> Option<AlarmEvent> {
        let mut event = None;
        if self.state == AlarmState::Active {
            // Stay Active if the clock cannot represent the deadline
            let Some(deadline) = now.checked_add(self.cooldown) else {
                warn!(cooldown = ?self.cooldown, "cooldown deadline out of range, alarm kept active");
                return None;
            };
            self.state = AlarmState::Cooldown { deadline };
            info!(cooldown = ?self.cooldown, "zones empty, cooldown started");
            event = Some(AlarmEvent::CooldownStarted);
        }

        if let AlarmState::Cooldown { deadline } = self.state {
            if now >= deadline {
                self.state = AlarmState::Idle;
                self.intruders.clear();
                info!("alarm cleared");
                event = Some(AlarmEvent::Cleared);
            }
        }
        event
    }

    pub fn status(&self) -> AlarmStatus {
        AlarmStatus {
            active: self.is_active(),
            intruders: self.intruders.clone(),
        }
    }

    pub fn state(&self) -> AlarmState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state != AlarmState::Idle
    }

    /// Time left before the alarm clears, if cooling down.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        match self.state {
            AlarmState::Cooldown { deadline } => Some(deadline.saturating_duration_since(now)),
            _ => None,
        }
    }
}
