use std::sync::Arc;

use crate::assets::Bitmap;
use crate::geometry::{Aabb, Vec2};

use super::player::GRAVITY;

/// Vertical span of the enemy's triangular wave, in virtual pixels.
pub const ENEMY_AMPLITUDE: f32 = 300.0;
/// Seconds the enemy takes to travel one direction of the wave.
pub const ENEMY_HALF_PERIOD: f32 = 1.25;
/// Leftward drift applied to coins on the designated moving-coins level.
pub const COIN_DRIFT_SPEED: f32 = -10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId(pub u64);

#[derive(Debug, Default)]
pub struct EntityIdAllocator {
    next: u64,
}

impl EntityIdAllocator {
    pub fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next = self.next.saturating_add(1);
        id
    }
}

/// Circular-motion descriptor for a moving-platform segment. Each segment
/// carries its own copy with its own center so a multi-tile span stays in
/// phase while every tile orbits independently.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitMotion {
    pub center: Vec2,
    pub radius: f32,
    pub omega: f32,
    pub angle: f32,
}

impl OrbitMotion {
    pub fn new(center: Vec2, radius: f32, omega: f32) -> Self {
        Self {
            center,
            radius,
            omega,
            angle: 0.0,
        }
    }
}

/// Enemy wave state. The base height is captured on the first update so
/// placement alone decides where the wave anchors.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Wave {
    pub(crate) base_y: Option<f32>,
    pub(crate) time: f32,
}

/// Closed set of entity kinds. Collision response is dispatched over this
/// enum rather than through open-ended dynamic dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityKind {
    Background,
    Platform { motion: Option<OrbitMotion> },
    Wall,
    Coin { base_value: i32, drift_speed: f32 },
    Enemy { wave: Wave },
    Goal,
    PowerUp { activated: bool, fall_speed: f32 },
}

/// A positioned, sized, drawable game object. Width and height come from
/// the bound bitmap at construction and stay fixed; position changes
/// every frame for kinematic kinds.
#[derive(Debug, Clone)]
pub struct Entity {
    id: EntityId,
    position: Vec2,
    prev_position: Vec2,
    width: f32,
    height: f32,
    bitmap: Arc<Bitmap>,
    kind: EntityKind,
}

impl Entity {
    pub fn new(id: EntityId, bitmap: Arc<Bitmap>, position: Vec2, kind: EntityKind) -> Self {
        let width = bitmap.width() as f32;
        let height = bitmap.height() as f32;
        Self {
            id,
            position,
            prev_position: position,
            width,
            height,
            bitmap,
            kind,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn prev_position(&self) -> Vec2 {
        self.prev_position
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn bitmap(&self) -> &Arc<Bitmap> {
        &self.bitmap
    }

    pub fn kind(&self) -> &EntityKind {
        &self.kind
    }

    pub(crate) fn kind_mut(&mut self) -> &mut EntityKind {
        &mut self.kind
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_center_size(self.position, self.width, self.height)
    }

    pub fn is_terrain(&self) -> bool {
        matches!(self.kind, EntityKind::Platform { .. } | EntityKind::Wall)
    }

    /// How far this entity moved since the last previous-position
    /// snapshot. Drives platform carry for the grounded player.
    pub fn frame_delta(&self) -> Vec2 {
        Vec2::new(
            self.position.x - self.prev_position.x,
            self.position.y - self.prev_position.y,
        )
    }

    pub fn snapshot_prev(&mut self) {
        self.prev_position = self.position;
    }

    /// Advance this entity's private motion rule by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        match &mut self.kind {
            EntityKind::Platform {
                motion: Some(orbit),
            } => {
                orbit.angle += orbit.omega * dt;
                self.position = Vec2::new(
                    orbit.center.x + orbit.angle.cos() * orbit.radius,
                    orbit.center.y + orbit.angle.sin() * orbit.radius,
                );
            }
            EntityKind::Coin { drift_speed, .. } if *drift_speed != 0.0 => {
                self.position.x += *drift_speed * dt;
            }
            EntityKind::Enemy { wave } => {
                let base_y = *wave.base_y.get_or_insert(self.position.y);
                wave.time += dt;
                let cycle = 2.0 * ENEMY_HALF_PERIOD;
                let phase = (wave.time % cycle) / ENEMY_HALF_PERIOD;
                let progress = if phase <= 1.0 { phase } else { 2.0 - phase };
                self.position.y = base_y - progress * ENEMY_AMPLITUDE;
            }
            EntityKind::PowerUp {
                activated: true,
                fall_speed,
            } => {
                *fall_speed += GRAVITY * dt;
                self.position.y += *fall_speed * dt;
            }
            _ => {}
        }
    }

    /// Removal predicate evaluated once per tick independent of
    /// collisions. Only activated power-ups expire, once fully below the
    /// world's height.
    pub fn expired(&self, world_height: f32) -> bool {
        match self.kind {
            EntityKind::PowerUp { activated, .. } => {
                activated && self.position.y - self.height / 2.0 > world_height
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(kind: EntityKind) -> Entity {
        Entity::new(
            EntityId(0),
            Arc::new(Bitmap::blank(32, 32)),
            Vec2::new(100.0, 400.0),
            kind,
        )
    }

    #[test]
    fn allocator_hands_out_sequential_ids() {
        let mut allocator = EntityIdAllocator::default();
        assert_eq!(allocator.allocate(), EntityId(0));
        assert_eq!(allocator.allocate(), EntityId(1));
        assert_eq!(allocator.allocate(), EntityId(2));
    }

    #[test]
    fn size_comes_from_bitmap() {
        let e = Entity::new(
            EntityId(0),
            Arc::new(Bitmap::blank(64, 16)),
            Vec2::ZERO,
            EntityKind::Wall,
        );
        assert_eq!(e.width(), 64.0);
        assert_eq!(e.height(), 16.0);
    }

    #[test]
    fn orbiting_platform_follows_its_circle() {
        let center = Vec2::new(100.0, 400.0);
        let mut platform = entity(EntityKind::Platform {
            motion: Some(OrbitMotion::new(center, 50.0, std::f32::consts::PI)),
        });
        // Half a period puts the segment half a revolution around.
        platform.update(1.0);
        assert!((platform.position().x - (center.x - 50.0)).abs() < 0.001);
        assert!((platform.position().y - center.y).abs() < 0.001);
    }

    #[test]
    fn static_platform_does_not_move() {
        let mut platform = entity(EntityKind::Platform { motion: None });
        let before = platform.position();
        platform.update(0.5);
        assert_eq!(platform.position(), before);
    }

    #[test]
    fn enemy_wave_rises_then_returns_to_base() {
        let mut enemy = entity(EntityKind::Enemy {
            wave: Wave::default(),
        });
        let base_y = enemy.position().y;

        enemy.update(ENEMY_HALF_PERIOD);
        assert!((enemy.position().y - (base_y - ENEMY_AMPLITUDE)).abs() < 0.01);

        enemy.update(ENEMY_HALF_PERIOD);
        assert!((enemy.position().y - base_y).abs() < 0.01);
    }

    #[test]
    fn drifting_coin_moves_left() {
        let mut coin = entity(EntityKind::Coin {
            base_value: 10,
            drift_speed: COIN_DRIFT_SPEED,
        });
        let x_before = coin.position().x;
        coin.update(2.0);
        assert!((coin.position().x - (x_before - 20.0)).abs() < 0.001);
    }

    #[test]
    fn stationary_coin_stays_put() {
        let mut coin = entity(EntityKind::Coin {
            base_value: 100,
            drift_speed: 0.0,
        });
        let before = coin.position();
        coin.update(2.0);
        assert_eq!(coin.position(), before);
    }

    #[test]
    fn power_up_free_falls_only_once_activated() {
        let mut dormant = entity(EntityKind::PowerUp {
            activated: false,
            fall_speed: 0.0,
        });
        let before = dormant.position();
        dormant.update(0.5);
        assert_eq!(dormant.position(), before);

        let mut falling = entity(EntityKind::PowerUp {
            activated: true,
            fall_speed: 0.0,
        });
        let y_before = falling.position().y;
        falling.update(0.1);
        assert!(falling.position().y > y_before);
    }

    #[test]
    fn power_up_expires_below_world_height() {
        let mut power_up = entity(EntityKind::PowerUp {
            activated: true,
            fall_speed: 0.0,
        });
        assert!(!power_up.expired(1024.0));
        // Fall well past the bottom of the world.
        for _ in 0..60 {
            power_up.update(0.05);
        }
        assert!(power_up.expired(1024.0));
    }

    #[test]
    fn frame_delta_tracks_snapshot() {
        let mut platform = entity(EntityKind::Platform {
            motion: Some(OrbitMotion::new(Vec2::new(100.0, 400.0), 50.0, 1.0)),
        });
        platform.snapshot_prev();
        platform.update(0.1);
        let delta = platform.frame_delta();
        assert!(delta.x != 0.0 || delta.y != 0.0);
    }
}
