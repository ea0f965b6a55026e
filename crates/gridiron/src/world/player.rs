use std::sync::Arc;

use crate::assets::{AssetError, Bitmap, ImageCache};
use crate::geometry::{Aabb, Vec2};
use crate::input::Intents;

use super::entity::EntityId;

/// Downward acceleration in virtual pixels per second squared.
pub(crate) const GRAVITY: f32 = 1000.0;
/// Fastest the player may fall.
pub const TERMINAL_VELOCITY: f32 = 500.0;
/// Horizontal speed while a left/right intent is held.
pub const RUN_SPEED: f32 = 300.0;
/// Vertical velocity applied on a grounded jump (negative is up).
pub const JUMP_VELOCITY: f32 = -750.0;

const SPRITE_LEFT: &str = "images/player-left.png";
const SPRITE_MID: &str = "images/player-mid.png";
const SPRITE_RIGHT: &str = "images/player-right.png";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facing {
    Left,
    Forward,
    Right,
}

/// Side of a terrain box the player gets pushed out of. The scan order
/// below is also the tie-break order for equal overlap depths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
    Top,
    Bottom,
}

const SIDE_SCAN_ORDER: [Side; 4] = [Side::Left, Side::Right, Side::Top, Side::Bottom];

/// The single dynamic actor. Everything else in the world is static or
/// kinematic; only the player integrates gravity and velocity.
#[derive(Debug, Clone)]
pub struct Player {
    position: Vec2,
    prev_position: Vec2,
    velocity: Vec2,
    width: f32,
    height: f32,
    grounded: bool,
    standing_on: Option<EntityId>,
    facing: Facing,
    sprite_left: Arc<Bitmap>,
    sprite_mid: Arc<Bitmap>,
    sprite_right: Arc<Bitmap>,
}

impl Player {
    pub fn new(cache: &mut ImageCache) -> Result<Self, AssetError> {
        let sprite_left = cache.get(SPRITE_LEFT)?;
        let sprite_mid = cache.get(SPRITE_MID)?;
        let sprite_right = cache.get(SPRITE_RIGHT)?;
        let width = sprite_mid.width() as f32;
        let height = sprite_mid.height() as f32;
        Ok(Self {
            position: Vec2::ZERO,
            prev_position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            width,
            height,
            grounded: false,
            standing_on: None,
            facing: Facing::Forward,
            sprite_left,
            sprite_mid,
            sprite_right,
        })
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Position at the last previous-position snapshot. Lets a shell
    /// interpolate between ticks when drawing.
    pub fn prev_position(&self) -> Vec2 {
        self.prev_position
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn grounded(&self) -> bool {
        self.grounded
    }

    pub fn standing_on(&self) -> Option<EntityId> {
        self.standing_on
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_center_size(self.position, self.width, self.height)
    }

    /// Sprite matching the current facing.
    pub fn bitmap(&self) -> &Arc<Bitmap> {
        match self.facing {
            Facing::Left => &self.sprite_left,
            Facing::Forward => &self.sprite_mid,
            Facing::Right => &self.sprite_right,
        }
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    /// Sets velocity with the fall speed clamped to the terminal limit.
    pub fn set_velocity(&mut self, velocity: Vec2) {
        self.velocity = Vec2::new(velocity.x, velocity.y.min(TERMINAL_VELOCITY));
    }

    pub fn snapshot_prev(&mut self) {
        self.prev_position = self.position;
    }

    pub(crate) fn clear_support(&mut self) {
        self.grounded = false;
        self.standing_on = None;
    }

    pub(crate) fn reset_at(&mut self, start: Vec2) {
        self.position = start;
        self.prev_position = start;
        self.velocity = Vec2::ZERO;
        self.grounded = false;
        self.standing_on = None;
        self.facing = Facing::Forward;
    }

    /// Put the player back into a previously captured state. Support is
    /// dropped; the next tick's terrain scan re-establishes it.
    pub(crate) fn restore(&mut self, position: Vec2, velocity: Vec2, grounded: bool) {
        self.position = position;
        self.prev_position = position;
        self.velocity = Vec2::new(velocity.x, velocity.y.min(TERMINAL_VELOCITY));
        self.grounded = grounded;
        self.standing_on = None;
        self.facing = Facing::Forward;
    }

    /// Translate this tick's discrete intents into velocity. Horizontal
    /// speed is overwritten every tick; vertical speed only while
    /// grounded, so input never cancels gravity mid-air.
    pub(crate) fn apply_intents(&mut self, intents: Intents) {
        self.velocity.x = match (intents.left(), intents.right()) {
            (true, false) => -RUN_SPEED,
            (false, true) => RUN_SPEED,
            _ => 0.0,
        };
        if self.grounded {
            self.velocity.y = if intents.jump() { JUMP_VELOCITY } else { 0.0 };
        }
    }

    /// Integrate gravity-clamped velocity into position, then follow the
    /// supporting entity's frame delta so moving platforms carry the
    /// player.
    pub(crate) fn integrate(&mut self, dt: f32, carry_delta: Option<Vec2>) {
        self.position.x += self.velocity.x * dt;
        if !self.grounded {
            self.velocity.y += GRAVITY * dt;
            if self.velocity.y > TERMINAL_VELOCITY {
                self.velocity.y = TERMINAL_VELOCITY;
            }
        }
        self.position.y += self.velocity.y * dt;

        if let Some(delta) = carry_delta {
            self.position.x += delta.x;
            self.position.y += delta.y;
        }

        self.facing = if self.velocity.x > 0.0 {
            Facing::Right
        } else if self.velocity.x < 0.0 {
            Facing::Left
        } else {
            Facing::Forward
        };
    }

    /// Minimum-penetration resolution against one terrain box. Picks the
    /// smallest of the four directional overlap depths, scanning
    /// left, right, top, bottom with strict less-than so left wins ties.
    /// A shared edge with no penetration resolves nothing.
    pub(crate) fn resolve_against(&mut self, terrain: Aabb, terrain_id: EntityId) {
        let me = self.bounds();
        if me.bottom() <= terrain.top()
            || me.top() >= terrain.bottom()
            || me.right() <= terrain.left()
            || me.left() >= terrain.right()
        {
            return;
        }

        let depth = |side: Side| -> f32 {
            match side {
                Side::Left => me.right() - terrain.left(),
                Side::Right => terrain.right() - me.left(),
                Side::Top => me.bottom() - terrain.top(),
                Side::Bottom => terrain.bottom() - me.top(),
            }
        };

        let mut min_side = SIDE_SCAN_ORDER[0];
        for side in SIDE_SCAN_ORDER {
            if depth(side) < depth(min_side) {
                min_side = side;
            }
        }

        self.grounded = false;
        self.standing_on = None;

        match min_side {
            Side::Left => self.position.x = terrain.left() - self.width / 2.0,
            Side::Right => self.position.x = terrain.right() + self.width / 2.0,
            Side::Top => {
                self.position.y = terrain.top() - self.height / 2.0;
                self.velocity.y = 0.0;
                self.grounded = true;
                self.standing_on = Some(terrain_id);
            }
            Side::Bottom => self.position.y = terrain.bottom() + self.height / 2.0,
        }
    }
}
