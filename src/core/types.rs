//! Core type definitions used throughout the codebase

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Wall-clock instant, always UTC
pub type Timestamp = DateTime<Utc>;

/// Chat identity of a player (the transport's numeric user id)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for production facilities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FacilityId(pub Uuid);

impl FacilityId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for FacilityId {
    fn default() -> Self {
        Self::new()
    }
}

/// Unique identifier for battle records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BattleId(pub Uuid);

impl BattleId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BattleId {
    fn default() -> Self {
        Self::new()
    }
}

/// Modifier channel - an independent additive-stacking multiplier axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Production,
    Economy,
    Military,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Production, Channel::Economy, Channel::Military];

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Production => "production",
            Channel::Economy => "economy",
            Channel::Military => "military",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A signed fractional contribution to one channel (+0.10 = +10%)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    pub channel: Channel,
    pub value: f64,
}

impl Effect {
    pub const fn new(channel: Channel, value: f64) -> Self {
        Self { channel, value }
    }
}

impl fmt::Display for Effect {
    /// Renders as a whole percentage, e.g. `production +10%`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let percent = (self.value * 100.0).round() as i64;
        if percent > 0 {
            write!(f, "{} +{}%", self.channel, percent)
        } else {
            write!(f, "{} {}%", self.channel, percent)
        }
    }
}
