//! Core of a 2D side-scrolling platformer: entities, collision, the
//! per-tick world pipeline, declarative level loading, and session
//! saves. Rendering and input devices stay outside; an embedding shell
//! drives `World::advance` with `Intents` and draws through a
//! `RenderSink`.

pub mod assets;
pub mod geometry;
pub mod input;
pub mod level;
pub mod render;
pub mod save;
pub mod world;

pub use assets::{AssetError, Bitmap, DiskProvider, ImageCache, ResourceProvider};
pub use geometry::{Aabb, Vec2};
pub use input::Intents;
pub use level::LevelError;
pub use render::{RecordingSink, RenderSink};
pub use save::{SaveError, SaveGame, SAVE_VERSION};
pub use world::entity::{Entity, EntityId, EntityKind};
pub use world::overlay::FloatingText;
pub use world::player::Player;
pub use world::scoreboard::Scoreboard;
pub use world::{HudSnapshot, World, MAX_STEP};
