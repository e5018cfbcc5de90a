//! Core type definitions used throughout the codebase

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Unique identifier for a tower on the map
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TowerId(pub u32);

/// Unique identifier for an in-flight march, dense per session
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MarchId(pub u64);

/// One of the two commanding sides.
///
/// Transport slot 1 claims `A`, slot 2 claims `B`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    #[serde(rename = "teamA")]
    A,
    #[serde(rename = "teamB")]
    B,
}

impl Team {
    pub const BOTH: [Team; 2] = [Team::A, Team::B];

    pub fn opponent(self) -> Team {
        match self {
            Team::A => Team::B,
            Team::B => Team::A,
        }
    }

    /// Index into per-team arrays
    pub fn index(self) -> usize {
        match self {
            Team::A => 0,
            Team::B => 1,
        }
    }

    /// First-come slot assignment: slot 1 is team A, slot 2 is team B
    pub fn from_slot(slot: u8) -> Option<Team> {
        match slot {
            1 => Some(Team::A),
            2 => Some(Team::B),
            _ => None,
        }
    }

    /// Wire token used in broadcasts and event strings
    pub fn token(self) -> &'static str {
        match self {
            Team::A => "teamA",
            Team::B => "teamB",
        }
    }
}

/// Tower ownership
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Owner {
    Neutral,
    Held(Team),
}

impl Owner {
    pub fn team(self) -> Option<Team> {
        match self {
            Owner::Neutral => None,
            Owner::Held(t) => Some(t),
        }
    }

    pub fn is(self, team: Team) -> bool {
        self == Owner::Held(team)
    }

    pub fn token(self) -> &'static str {
        match self {
            Owner::Neutral => "neutral",
            Owner::Held(t) => t.token(),
        }
    }
}

impl Serialize for Owner {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.token())
    }
}

impl<'de> Deserialize<'de> for Owner {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        match s.as_str() {
            "neutral" => Ok(Owner::Neutral),
            "teamA" => Ok(Owner::Held(Team::A)),
            "teamB" => Ok(Owner::Held(Team::B)),
            other => Err(serde::de::Error::unknown_variant(
                other,
                &["neutral", "teamA", "teamB"],
            )),
        }
    }
}

/// 2D position (UI layout and left/right tie-breaking only)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}
