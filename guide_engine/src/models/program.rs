use serde::{Deserialize, Serialize};

use crate::api::{ChannelId, ProgramId};
use crate::models::channel::Channel;

/// Genre / sub-genre classification pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GenrePair {
    pub genre: u8,
    #[serde(default)]
    pub sub_genre: Option<u8>,
}

/// A single broadcast program.
///
/// `start_at` and `end_at` are millisecond Unix timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub id: ProgramId,
    pub channel_id: ChannelId,
    pub start_at: i64,
    pub end_at: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub extended: Option<String>,
    /// At most three pairs are kept, see [`Program::with_genres`].
    #[serde(default)]
    pub genres: Vec<GenrePair>,
    #[serde(default = "default_is_free")]
    pub is_free: bool,
    #[serde(default)]
    pub video_type: Option<String>,
    #[serde(default)]
    pub video_resolution: Option<String>,
    #[serde(default)]
    pub audio_sampling_rate: Option<u32>,
}

fn default_is_free() -> bool {
    true
}

pub const MAX_GENRES: usize = 3;

impl Program {
    pub fn new(id: i64, channel_id: i64, start_at: i64, end_at: i64) -> Self {
        Self {
            id: ProgramId::new(id),
            channel_id: ChannelId::new(channel_id),
            start_at,
            end_at,
            name: None,
            description: None,
            extended: None,
            genres: vec![],
            is_free: true,
            video_type: None,
            video_resolution: None,
            audio_sampling_rate: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_genres(mut self, genres: impl IntoIterator<Item = GenrePair>) -> Self {
        self.genres = genres.into_iter().take(MAX_GENRES).collect();
        self
    }

    /// Primary genre used for cell coloring.
    pub fn primary_genre(&self) -> Option<u8> {
        self.genres.first().map(|g| g.genre)
    }

    pub fn duration_ms(&self) -> i64 {
        self.end_at - self.start_at
    }
}

/// One channel's programs, as returned by the schedule provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelSchedule {
    pub channel: Channel,
    pub programs: Vec<Program>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_genres_are_capped() {
        let program = Program::new(1, 1, 0, 1000).with_genres((0..5).map(|g| GenrePair {
            genre: g,
            sub_genre: None,
        }));
        assert_eq!(program.genres.len(), MAX_GENRES);
        assert_eq!(program.primary_genre(), Some(0));
    }

    #[test]
    fn test_program_deserialize_defaults() {
        let json = r#"{"id": 10, "channel_id": 3, "start_at": 0, "end_at": 60000}"#;
        let program: Program = serde_json::from_str(json).unwrap();
        assert_eq!(program.id, ProgramId::new(10));
        assert!(program.is_free);
        assert!(program.genres.is_empty());
        assert_eq!(program.duration_ms(), 60_000);
    }
}
