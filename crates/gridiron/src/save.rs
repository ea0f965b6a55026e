//! Versioned JSON session snapshots.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::Vec2;
use crate::world::player::Player;
use crate::world::scoreboard::Scoreboard;
use crate::world::World;

/// Format version written into every snapshot. Bump on any field change.
pub const SAVE_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("unsupported save version {found}, this build reads version {SAVE_VERSION}")]
    VersionMismatch { found: u32 },
    #[error("malformed save at `{path}`: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Everything needed to re-enter a session: which playlist level was
/// active plus the player, score, and multiplier state. Level content
/// itself is reloaded from the level document, never saved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveGame {
    version: u32,
    level_index: usize,
    player_position: Vec2,
    player_velocity: Vec2,
    player_grounded: bool,
    score: f64,
    elapsed_seconds: f64,
    coin_multiplier: i32,
}

impl SaveGame {
    pub(crate) fn capture(
        level_index: usize,
        player: &Player,
        scoreboard: &Scoreboard,
        coin_multiplier: i32,
    ) -> Self {
        Self {
            version: SAVE_VERSION,
            level_index,
            player_position: player.position(),
            player_velocity: player.velocity(),
            player_grounded: player.grounded(),
            score: scoreboard.raw_score(),
            elapsed_seconds: scoreboard.elapsed_seconds(),
            coin_multiplier,
        }
    }

    pub fn level_index(&self) -> usize {
        self.level_index
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse a snapshot, reporting the JSON path of whatever field failed
    /// to deserialize and rejecting versions this build does not read.
    pub fn from_json(text: &str) -> Result<Self, SaveError> {
        let mut deserializer = serde_json::Deserializer::from_str(text);
        let save: SaveGame =
            serde_path_to_error::deserialize(&mut deserializer).map_err(|error| {
                SaveError::Parse {
                    path: error.path().to_string(),
                    source: error.into_inner(),
                }
            })?;
        if save.version != SAVE_VERSION {
            return Err(SaveError::VersionMismatch {
                found: save.version,
            });
        }
        Ok(save)
    }

    pub(crate) fn apply(&self, world: &mut World) {
        world.player_mut().restore(
            self.player_position,
            self.player_velocity,
            self.player_grounded,
        );
        world
            .scoreboard_mut()
            .restore(self.score, self.elapsed_seconds);
        world.set_coin_multiplier(self.coin_multiplier);
    }
}

#[cfg(test)]
mod tests {
    use crate::assets::FixedSizeProvider;
    use crate::input::Intents;

    use super::*;

    fn test_world() -> World {
        let mut world =
            World::new(Box::new(FixedSizeProvider::new((32, 32)))).expect("world");
        world
            .load_level_from_str(
                r#"<level width="2048" height="1024" start-x="450" start-y="400"/>"#,
                0,
            )
            .expect("level");
        world
    }

    #[test]
    fn round_trip_restores_session_state() {
        let mut world = test_world();
        world.scoreboard_mut().add_points(120);
        world.set_coin_multiplier(4);
        world.advance(0.3, Intents::empty().with_right(true));

        let json = world.capture_save().to_json().expect("serialize");
        let save = SaveGame::from_json(&json).expect("parse");

        let mut restored = test_world();
        restored.restore_save(&save).expect("restore");
        assert_eq!(restored.player().position(), world.player().position());
        assert_eq!(restored.player().velocity(), world.player().velocity());
        assert_eq!(restored.scoreboard().score(), world.scoreboard().score());
        assert_eq!(restored.coin_multiplier(), 4);
        assert_eq!(restored.current_level(), 0);
    }

    #[test]
    fn unknown_version_is_rejected() {
        let world = test_world();
        let json = world
            .capture_save()
            .to_json()
            .expect("serialize")
            .replace("\"version\": 1", "\"version\": 99");
        let err = SaveGame::from_json(&json).expect_err("err");
        assert!(matches!(err, SaveError::VersionMismatch { found: 99 }));
    }

    #[test]
    fn malformed_field_reports_its_path() {
        let json = r#"{
            "version": 1,
            "level_index": 0,
            "player_position": { "x": 0.0, "y": 0.0 },
            "player_velocity": { "x": 0.0, "y": 0.0 },
            "player_grounded": false,
            "score": "a lot",
            "elapsed_seconds": 0.0,
            "coin_multiplier": 1
        }"#;
        let err = SaveGame::from_json(json).expect_err("err");
        match err {
            SaveError::Parse { path, .. } => assert_eq!(path, "score"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
