//! World state and the per-tick update pipeline.

pub(crate) mod collision;
pub mod entity;
pub mod overlay;
pub mod player;
pub mod scoreboard;

use std::path::PathBuf;

use tracing::{info, warn};

use crate::assets::{AssetError, ImageCache, ResourceProvider};
use crate::geometry::Vec2;
use crate::input::Intents;
use crate::level::{self, LevelError};
use crate::render::RenderSink;
use crate::save::SaveGame;

use collision::{DispatchContext, TransitionRequest};
use entity::{Entity, EntityId, EntityIdAllocator, EntityKind};
use overlay::FloatingText;
use player::Player;
use scoreboard::Scoreboard;

/// Longest simulation step, in seconds. `advance` splits larger elapsed
/// intervals into chunks no bigger than this.
pub const MAX_STEP: f32 = 0.05;
/// Seconds the world stays frozen after a failure before reloading.
const FAILURE_SECONDS: f32 = 2.0;
/// Seconds the level banner stays on screen after a load.
const BANNER_SECONDS: f32 = 2.0;
/// Horizontal scroll anchor: the camera keeps the player this many
/// virtual pixels from the left edge.
const SCROLL_ANCHOR: f32 = 500.0;
/// Playable vertical band. Leaving it in either direction is a failure.
const BAND_TOP: f32 = 0.0;
const BAND_BOTTOM: f32 = 1000.0;

const FAILURE_MESSAGE: &str = "YOU LOSE!";

#[derive(Debug, Clone, PartialEq)]
enum Phase {
    Playing,
    Failed { remaining: f32 },
}

#[derive(Debug, Clone)]
struct Banner {
    text: String,
    remaining: f32,
}

/// Per-frame HUD state pulled by the embedding shell.
#[derive(Debug, Clone, PartialEq)]
pub struct HudSnapshot {
    pub score: i32,
    pub elapsed_seconds: f64,
    pub message: Option<String>,
    pub scroll_offset: f32,
}

/// The whole game state: one player, an ordered entity list whose order
/// is also draw order, overlays, the scoreboard, and the level playlist.
pub struct World {
    player: Player,
    entities: Vec<Entity>,
    overlays: Vec<FloatingText>,
    scoreboard: Scoreboard,
    cache: ImageCache,
    allocator: EntityIdAllocator,
    playlist: Vec<PathBuf>,
    current_level: usize,
    retained_text: Option<String>,
    start: Vec2,
    level_width: f32,
    level_height: f32,
    coin_multiplier: i32,
    scroll_offset: f32,
    phase: Phase,
    banner: Option<Banner>,
}

impl World {
    pub fn new(provider: Box<dyn ResourceProvider>) -> Result<Self, AssetError> {
        let mut cache = ImageCache::new(provider);
        let player = Player::new(&mut cache)?;
        Ok(Self {
            player,
            entities: Vec::new(),
            overlays: Vec::new(),
            scoreboard: Scoreboard::new(),
            cache,
            allocator: EntityIdAllocator::default(),
            playlist: Vec::new(),
            current_level: 0,
            retained_text: None,
            start: Vec2::ZERO,
            level_width: 0.0,
            level_height: 0.0,
            coin_multiplier: 1,
            scroll_offset: 0.0,
            phase: Phase::Playing,
            banner: None,
        })
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub(crate) fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn overlays(&self) -> &[FloatingText] {
        &self.overlays
    }

    pub fn scoreboard(&self) -> &Scoreboard {
        &self.scoreboard
    }

    pub(crate) fn scoreboard_mut(&mut self) -> &mut Scoreboard {
        &mut self.scoreboard
    }

    pub fn coin_multiplier(&self) -> i32 {
        self.coin_multiplier
    }

    pub(crate) fn set_coin_multiplier(&mut self, multiplier: i32) {
        self.coin_multiplier = multiplier.max(1);
    }

    pub fn scroll_offset(&self) -> f32 {
        self.scroll_offset
    }

    pub fn current_level(&self) -> usize {
        self.current_level
    }

    /// Declared start position of the loaded level.
    pub fn start(&self) -> Vec2 {
        self.start
    }

    /// Declared size of the loaded level, in virtual pixels.
    pub fn level_size(&self) -> (f32, f32) {
        (self.level_width, self.level_height)
    }

    pub fn find_entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|entity| entity.id() == id)
    }

    /// Append one entity directly, bypassing the level loader.
    pub fn add_entity(
        &mut self,
        image: &str,
        position: Vec2,
        kind: EntityKind,
    ) -> Result<EntityId, AssetError> {
        let bitmap = self.cache.get(image)?;
        let id = self.allocator.allocate();
        self.entities.push(Entity::new(id, bitmap, position, kind));
        Ok(id)
    }

    pub fn set_playlist(&mut self, levels: Vec<PathBuf>) {
        self.playlist = levels;
    }

    /// Empty the world back to just the player. The image cache is
    /// dropped wholesale; the next load repopulates it.
    pub fn clear(&mut self) {
        self.entities.clear();
        self.overlays.clear();
        self.cache.clear();
        self.coin_multiplier = 1;
        self.scroll_offset = 0.0;
        self.phase = Phase::Playing;
        self.banner = None;
    }

    /// Load the playlist level at `index` from disk.
    pub fn load_level(&mut self, index: usize) -> Result<(), LevelError> {
        let Some(path) = self.playlist.get(index).cloned() else {
            if self.playlist.is_empty() {
                return Err(LevelError::EmptyPlaylist);
            }
            return Err(LevelError::UnknownLevel { index });
        };
        let text = std::fs::read_to_string(&path).map_err(|source| LevelError::Read {
            path: path.clone(),
            source,
        })?;
        info!(level = index, path = %path.display(), "loading_level");
        self.load_level_from_str(&text, index)
    }

    /// Load a level from document text, retaining the text for failure
    /// reloads. On error the world is left as `clear()` left it.
    pub fn load_level_from_str(&mut self, text: &str, index: usize) -> Result<(), LevelError> {
        self.clear();
        let doc = level::parse_level(text)?;

        self.entities =
            level::build_entities(&doc, &mut self.cache, &mut self.allocator, index);
        self.current_level = index;
        self.retained_text = Some(text.to_string());
        self.start = doc.start;
        self.level_width = doc.width;
        self.level_height = doc.height;
        self.player.reset_at(doc.start);
        self.scroll_offset = doc.start.x - SCROLL_ANCHOR;
        self.banner = Some(Banner {
            text: format!("Level {}", index + 1),
            remaining: BANNER_SECONDS,
        });
        Ok(())
    }

    /// Advance the playlist (saturating at the last level), load it, and
    /// start the score from zero.
    pub fn load_next_level(&mut self) -> Result<(), LevelError> {
        let next = if self.playlist.is_empty() {
            self.current_level
        } else {
            (self.current_level + 1).min(self.playlist.len() - 1)
        };
        self.load_level(next)?;
        self.scoreboard.reset();
        Ok(())
    }

    fn fail(&mut self) {
        info!(level = self.current_level, "player_failed");
        self.phase = Phase::Failed {
            remaining: FAILURE_SECONDS,
        };
    }

    /// Reload the retained level document after the failure window, with
    /// score and multiplier reset.
    fn reload_current(&mut self) {
        let Some(text) = self.retained_text.take() else {
            self.phase = Phase::Playing;
            return;
        };
        let index = self.current_level;
        if let Err(error) = self.load_level_from_str(&text, index) {
            warn!(%error, "level_reload_failed");
        }
        self.scoreboard.reset();
    }

    /// Split `elapsed` into chunks of at most `MAX_STEP` and simulate
    /// each, consuming the interval exactly.
    pub fn advance(&mut self, elapsed: f32, intents: Intents) {
        let mut remaining = elapsed;
        while remaining > 0.0 {
            let step = remaining.min(MAX_STEP);
            self.update(step, intents);
            remaining -= step;
        }
    }

    /// One simulation tick.
    pub fn update(&mut self, dt: f32, intents: Intents) {
        if dt <= 0.0 {
            return;
        }

        if let Phase::Failed { remaining } = &mut self.phase {
            *remaining -= dt;
            if *remaining <= 0.0 {
                self.reload_current();
            }
            return;
        }

        if let Some(banner) = &mut self.banner {
            banner.remaining -= dt;
            if banner.remaining <= 0.0 {
                self.banner = None;
            }
        }

        self.player.apply_intents(intents);

        self.player.snapshot_prev();
        for entity in &mut self.entities {
            entity.snapshot_prev();
            entity.update(dt);
        }

        // Entities moved first, so the supporting entity's delta is
        // current when the player follows it.
        let carry = self
            .player
            .standing_on()
            .and_then(|id| self.find_entity(id))
            .map(Entity::frame_delta);
        self.player.integrate(dt, carry);

        self.scoreboard.update(f64::from(dt));

        let mut hit_terrain = false;
        let mut removals: Vec<EntityId> = Vec::new();
        let mut transition: Option<TransitionRequest> = None;

        for index in 0..self.entities.len() {
            if !self.entities[index].bounds().overlaps(&self.player.bounds()) {
                continue;
            }
            let mut ctx = DispatchContext {
                player: &mut self.player,
                scoreboard: &mut self.scoreboard,
                overlays: &mut self.overlays,
                coin_multiplier: &mut self.coin_multiplier,
                transition: &mut transition,
            };
            let outcome = collision::dispatch(&mut self.entities[index], &mut ctx);
            hit_terrain |= outcome.hit_terrain;
            if outcome.remove_entity {
                removals.push(self.entities[index].id());
            }
        }

        if !removals.is_empty() {
            self.entities.retain(|entity| !removals.contains(&entity.id()));
        }

        match transition {
            Some(TransitionRequest::Failure) => {
                self.fail();
                return;
            }
            Some(TransitionRequest::Advance) => {
                if let Err(error) = self.load_next_level() {
                    warn!(%error, "level_advance_failed");
                }
                return;
            }
            None => {}
        }

        let level_height = self.level_height;
        self.entities.retain(|entity| !entity.expired(level_height));

        for overlay in &mut self.overlays {
            overlay.update(dt);
        }
        self.overlays.retain(|overlay| !overlay.expired());

        if !hit_terrain {
            self.player.clear_support();
        }

        let player_y = self.player.position().y;
        if player_y <= BAND_TOP || player_y >= BAND_BOTTOM {
            self.fail();
            return;
        }

        self.scroll_offset = self.player.position().x - SCROLL_ANCHOR;
    }

    pub fn hud(&self) -> HudSnapshot {
        let message = match &self.phase {
            Phase::Failed { .. } => Some(FAILURE_MESSAGE.to_string()),
            Phase::Playing => self.banner.as_ref().map(|banner| banner.text.clone()),
        };
        HudSnapshot {
            score: self.scoreboard.score(),
            elapsed_seconds: self.scoreboard.elapsed_seconds(),
            message,
            scroll_offset: self.scroll_offset,
        }
    }

    /// Draw everything in list order, horizontally shifted by the scroll
    /// offset; then the player, overlays, and the unscrolled HUD.
    pub fn draw(&self, sink: &mut dyn RenderSink) {
        for entity in &self.entities {
            sink.draw_bitmap(
                entity.bitmap(),
                entity.position().x - entity.width() / 2.0 - self.scroll_offset,
                entity.position().y - entity.height() / 2.0,
            );
        }
        sink.draw_bitmap(
            self.player.bitmap(),
            self.player.position().x - self.player.width() / 2.0 - self.scroll_offset,
            self.player.position().y - self.player.height() / 2.0,
        );
        for overlay in &self.overlays {
            sink.draw_text(
                overlay.text(),
                overlay.position().x - self.scroll_offset,
                overlay.position().y,
                overlay.alpha(),
            );
        }

        let hud = self.hud();
        sink.draw_text(&format!("{}", hud.score), 10.0, 10.0, 1.0);
        if let Some(message) = &hud.message {
            sink.draw_text(message, SCROLL_ANCHOR, 450.0, 1.0);
        }
    }

    pub fn capture_save(&self) -> SaveGame {
        SaveGame::capture(
            self.current_level,
            &self.player,
            &self.scoreboard,
            self.coin_multiplier,
        )
    }

    /// Re-enter a saved session: load the saved playlist level, then put
    /// the player, scoreboard, and multiplier back where they were.
    pub fn restore_save(&mut self, save: &SaveGame) -> Result<(), LevelError> {
        if !self.playlist.is_empty() {
            self.load_level(save.level_index())?;
        }
        save.apply(self);
        Ok(())
    }
}
