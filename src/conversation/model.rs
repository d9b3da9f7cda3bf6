//! Archetypes and transcript entries.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The mood a user picks; drives which place categories are searched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    ThrillSeeking,
    CreativeArtsy,
    SuperChillLeisurely,
    Foodie,
    LiveEntertainment,
}

impl Archetype {
    /// Menu order.
    pub const ALL: [Archetype; 5] = [
        Archetype::ThrillSeeking,
        Archetype::CreativeArtsy,
        Archetype::SuperChillLeisurely,
        Archetype::Foodie,
        Archetype::LiveEntertainment,
    ];

    /// Label shown in the selector and echoed into the transcript.
    pub fn label(&self) -> &'static str {
        match self {
            Self::ThrillSeeking => "Thrill Seeking",
            Self::CreativeArtsy => "Creative & Artsy",
            Self::SuperChillLeisurely => "Super Chill & Leisurely",
            Self::Foodie => "Foodie",
            Self::LiveEntertainment => "Live Entertainment & Shows",
        }
    }
}

impl std::fmt::Display for Archetype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when text matches no archetype.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown archetype: {0}")]
pub struct UnknownArchetype(pub String);

impl FromStr for Archetype {
    type Err = UnknownArchetype;

    /// Accepts a label (case-insensitive) or a 1-based menu index.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(index) = s.parse::<usize>() {
            return index
                .checked_sub(1)
                .and_then(|i| Self::ALL.get(i).copied())
                .ok_or_else(|| UnknownArchetype(s.to_string()));
        }
        Self::ALL
            .into_iter()
            .find(|a| a.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownArchetype(s.to_string()))
    }
}

/// Who said a transcript line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Assistant,
}

/// One chat turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    #[serde(rename = "role")]
    pub speaker: Speaker,
    pub content: String,
    pub at: DateTime<Utc>,
}

impl TranscriptEntry {
    pub fn new(speaker: Speaker, content: impl Into<String>) -> Self {
        Self {
            speaker,
            content: content.into(),
            at: Utc::now(),
        }
    }
}
