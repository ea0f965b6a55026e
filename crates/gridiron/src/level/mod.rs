//! Declarative level documents.
//!
//! A level is XML with a `<declarations>` section of typed templates and
//! an `<items>` section of placements referencing those templates by id.
//! Loading is two-pass: build the declaration table, then walk the
//! placements and instantiate entities, expanding terrain spans into
//! discrete tiles.

use std::collections::HashMap;
use std::path::PathBuf;

use roxmltree::{Document, Node};
use thiserror::Error;
use tracing::warn;

use crate::assets::ImageCache;
use crate::geometry::Vec2;
use crate::world::entity::{
    Entity, EntityIdAllocator, EntityKind, OrbitMotion, Wave, COIN_DRIFT_SPEED,
};

/// Playlist index of the level on which coins drift leftward.
pub const MOVING_COINS_LEVEL: usize = 2;

/// Tile size for moving-platform and wall segments, in pixels. Plain
/// platforms tile at their mid image's native width instead.
const SEGMENT_SIZE: f32 = 32.0;

const POWER_UP_IMAGE: &str = "images/power-up.png";
const GOAL_IMAGE: &str = "images/goalpost.png";
const COIN10_IMAGE: &str = "images/coin10.png";
const COIN100_IMAGE: &str = "images/coin100.png";

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("failed to read level file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed level XML at line {line}, column {column}: {message}")]
    Malformed {
        message: String,
        line: usize,
        column: usize,
    },
    #[error("root element must be <level>, found <{found}>")]
    InvalidRoot { found: String },
    #[error("the level playlist is empty")]
    EmptyPlaylist,
    #[error("no level at playlist index {index}")]
    UnknownLevel { index: usize },
}

/// One `<declarations>` entry: a type tag plus a free-form attribute bag.
#[derive(Debug, Clone)]
pub(crate) struct Declaration {
    kind: String,
    attributes: HashMap<String, String>,
}

impl Declaration {
    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    fn image_path(&self, name: &str) -> Option<String> {
        self.attribute(name).map(|file| format!("images/{file}"))
    }
}

/// One `<items>` entry: a declaration reference plus position/size and
/// optional circular-motion overrides.
#[derive(Debug, Clone)]
pub(crate) struct Placement {
    id: String,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    cx: Option<f32>,
    cy: Option<f32>,
    radius: f32,
    omega: f32,
}

/// Parsed level document, ready for instantiation.
#[derive(Debug)]
pub(crate) struct LevelDocument {
    pub start: Vec2,
    pub width: f32,
    pub height: f32,
    declarations: HashMap<String, Declaration>,
    placements: Vec<Placement>,
}

fn float_attr(node: Node<'_, '_>, name: &str, default: f32) -> f32 {
    node.attribute(name)
        .and_then(|raw| raw.parse::<f32>().ok())
        .unwrap_or(default)
}

/// Pass 1: parse the document text into the declaration table and the
/// placement list. Structural problems abort the parse; per-entity
/// problems are deferred to instantiation so they can skip-and-warn.
pub(crate) fn parse_level(text: &str) -> Result<LevelDocument, LevelError> {
    let doc = Document::parse(text).map_err(|error| LevelError::Malformed {
        message: error.to_string(),
        line: error.pos().row as usize,
        column: error.pos().col as usize,
    })?;

    let root = doc.root_element();
    if root.tag_name().name() != "level" {
        return Err(LevelError::InvalidRoot {
            found: root.tag_name().name().to_string(),
        });
    }

    let start = Vec2::new(
        float_attr(root, "start-x", 0.0),
        float_attr(root, "start-y", 0.0),
    );
    let width = float_attr(root, "width", 0.0);
    let height = float_attr(root, "height", 0.0);

    let mut declarations = HashMap::new();
    let mut placements = Vec::new();

    for section in root.children().filter(|node| node.is_element()) {
        match section.tag_name().name() {
            "declarations" => {
                for child in section.children().filter(|node| node.is_element()) {
                    let Some(id) = child.attribute("id") else {
                        warn!(
                            kind = child.tag_name().name(),
                            "declaration_missing_id"
                        );
                        continue;
                    };
                    let attributes = child
                        .attributes()
                        .map(|attr| (attr.name().to_string(), attr.value().to_string()))
                        .collect();
                    declarations.insert(
                        id.to_string(),
                        Declaration {
                            kind: child.tag_name().name().to_string(),
                            attributes,
                        },
                    );
                }
            }
            "items" => {
                for child in section.children().filter(|node| node.is_element()) {
                    let Some(id) = child.attribute("id") else {
                        continue;
                    };
                    placements.push(Placement {
                        id: id.to_string(),
                        x: float_attr(child, "x", 0.0),
                        y: float_attr(child, "y", 0.0),
                        width: float_attr(child, "width", 0.0),
                        height: float_attr(child, "height", 0.0),
                        cx: child.attribute("cx").and_then(|raw| raw.parse().ok()),
                        cy: child.attribute("cy").and_then(|raw| raw.parse().ok()),
                        radius: float_attr(child, "radius", 0.0),
                        omega: float_attr(child, "omega", 0.0),
                    });
                }
            }
            other => {
                warn!(section = other, "unknown_level_section");
            }
        }
    }

    Ok(LevelDocument {
        start,
        width,
        height,
        declarations,
        placements,
    })
}

/// Pass 2: instantiate entities from the placements. A placement whose id
/// has no declaration is silently skipped; a declaration missing a
/// required attribute, or an image the provider cannot produce, skips
/// that entity with a warning.
pub(crate) fn build_entities(
    doc: &LevelDocument,
    cache: &mut ImageCache,
    allocator: &mut EntityIdAllocator,
    level_index: usize,
) -> Vec<Entity> {
    let mut builder = EntityBuilder {
        cache,
        allocator,
        level_index,
        entities: Vec::new(),
    };

    for placement in &doc.placements {
        let Some(declaration) = doc.declarations.get(&placement.id) else {
            continue;
        };
        builder.place(placement, declaration);
    }

    builder.entities
}

struct EntityBuilder<'a> {
    cache: &'a mut ImageCache,
    allocator: &'a mut EntityIdAllocator,
    level_index: usize,
    entities: Vec<Entity>,
}

impl EntityBuilder<'_> {
    fn place(&mut self, placement: &Placement, declaration: &Declaration) {
        match declaration.kind.as_str() {
            "background" => self.place_single_image(placement, declaration, EntityKind::Background),
            "platform" => self.place_platform_span(placement, declaration),
            "movingplatform" => self.place_moving_platform(placement, declaration),
            "wall" => self.place_wall(placement, declaration),
            "coin" => self.place_coin(placement, declaration),
            "power-up" => self.spawn(
                POWER_UP_IMAGE,
                Vec2::new(placement.x, placement.y),
                EntityKind::PowerUp {
                    activated: false,
                    fall_speed: 0.0,
                },
                &placement.id,
            ),
            "enemy" => self.place_single_image(
                placement,
                declaration,
                EntityKind::Enemy {
                    wave: Wave::default(),
                },
            ),
            "goalpost" => self.spawn(
                GOAL_IMAGE,
                Vec2::new(placement.x, placement.y),
                EntityKind::Goal,
                &placement.id,
            ),
            other => {
                warn!(id = %placement.id, kind = other, "unknown_declaration_type");
            }
        }
    }

    /// Kinds whose declaration carries a single `image` attribute.
    fn place_single_image(
        &mut self,
        placement: &Placement,
        declaration: &Declaration,
        kind: EntityKind,
    ) {
        let Some(image) = declaration.image_path("image") else {
            warn!(id = %placement.id, kind = %declaration.kind, "declaration_missing_image");
            return;
        };
        self.spawn(&image, Vec2::new(placement.x, placement.y), kind, &placement.id);
    }

    /// Platform spans tile at the mid image's native width, with distinct
    /// edge assets, recentered so the expanded span sits on the declared
    /// center.
    fn place_platform_span(&mut self, placement: &Placement, declaration: &Declaration) {
        let (Some(left), Some(mid), Some(right)) = (
            declaration.image_path("left-image"),
            declaration.image_path("mid-image"),
            declaration.image_path("right-image"),
        ) else {
            warn!(id = %placement.id, "platform_missing_images");
            return;
        };

        let segment = match self.cache.get(&mid) {
            Ok(bitmap) => bitmap.width() as f32,
            Err(error) => {
                warn!(id = %placement.id, %error, "platform_mid_image_unavailable");
                return;
            }
        };

        let mid_count = ((placement.width - 2.0 * segment) / segment) as i32;
        let adjusted_width = (mid_count + 2) as f32 * segment;
        let span_left = placement.x - adjusted_width / 2.0;

        self.spawn(
            &left,
            Vec2::new(span_left + segment / 2.0, placement.y),
            EntityKind::Platform { motion: None },
            &placement.id,
        );
        for index in 0..mid_count {
            self.spawn(
                &mid,
                Vec2::new(
                    span_left + segment + index as f32 * segment + segment / 2.0,
                    placement.y,
                ),
                EntityKind::Platform { motion: None },
                &placement.id,
            );
        }
        self.spawn(
            &right,
            Vec2::new(placement.x + adjusted_width / 2.0 - segment / 2.0, placement.y),
            EntityKind::Platform { motion: None },
            &placement.id,
        );
    }

    /// Moving platforms tile at a fixed 32 px width. Every segment gets
    /// its own orbit descriptor centered on its own placement, sharing
    /// radius and omega so the span stays in phase.
    fn place_moving_platform(&mut self, placement: &Placement, declaration: &Declaration) {
        let (Some(left), Some(mid), Some(right)) = (
            declaration.image_path("left-image"),
            declaration.image_path("mid-image"),
            declaration.image_path("right-image"),
        ) else {
            warn!(id = %placement.id, "movingplatform_missing_images");
            return;
        };

        let cx = placement.cx.unwrap_or(placement.x);
        let cy = placement.cy.unwrap_or(placement.y);
        let orbit = |center: Vec2| {
            EntityKind::Platform {
                motion: Some(OrbitMotion::new(center, placement.radius, placement.omega)),
            }
        };

        if placement.width > 0.0 {
            let mid_count = ((placement.width - 2.0 * SEGMENT_SIZE) / SEGMENT_SIZE) as i32;

            let left_center = Vec2::new(cx - placement.width / 2.0 + SEGMENT_SIZE / 2.0, cy);
            self.spawn(&left, left_center, orbit(left_center), &placement.id);

            for index in 0..mid_count {
                let mid_center = Vec2::new(
                    cx - placement.width / 2.0
                        + SEGMENT_SIZE
                        + index as f32 * SEGMENT_SIZE
                        + SEGMENT_SIZE / 2.0,
                    cy,
                );
                self.spawn(&mid, mid_center, orbit(mid_center), &placement.id);
            }

            let right_center = Vec2::new(cx + placement.width / 2.0 - SEGMENT_SIZE / 2.0, cy);
            self.spawn(&right, right_center, orbit(right_center), &placement.id);
        } else {
            let center = Vec2::new(cx, cy);
            self.spawn(&mid, center, orbit(center), &placement.id);
        }
    }

    /// Walls stack 32 px tiles vertically over the declared height.
    fn place_wall(&mut self, placement: &Placement, declaration: &Declaration) {
        let Some(image) = declaration.image_path("image") else {
            warn!(id = %placement.id, "wall_missing_image");
            return;
        };

        if placement.height > 0.0 {
            let segments = (placement.height / SEGMENT_SIZE) as i32;
            for index in 0..segments {
                let y = placement.y - placement.height / 2.0
                    + index as f32 * SEGMENT_SIZE
                    + SEGMENT_SIZE / 2.0;
                self.spawn(
                    &image,
                    Vec2::new(placement.x, y),
                    EntityKind::Wall,
                    &placement.id,
                );
            }
        } else {
            self.spawn(
                &image,
                Vec2::new(placement.x, placement.y),
                EntityKind::Wall,
                &placement.id,
            );
        }
    }

    /// The declaration's `value` attribute selects the coin type; coins
    /// drift only on the designated moving-coins level.
    fn place_coin(&mut self, placement: &Placement, declaration: &Declaration) {
        let value = declaration
            .attribute("value")
            .and_then(|raw| raw.parse::<i32>().ok());
        let image = match value {
            Some(10) => COIN10_IMAGE,
            Some(100) => COIN100_IMAGE,
            _ => {
                warn!(id = %placement.id, "coin_declaration_invalid_value");
                return;
            }
        };
        let drift_speed = if self.level_index == MOVING_COINS_LEVEL {
            COIN_DRIFT_SPEED
        } else {
            0.0
        };
        self.spawn(
            image,
            Vec2::new(placement.x, placement.y),
            EntityKind::Coin {
                base_value: value.unwrap_or(10),
                drift_speed,
            },
            &placement.id,
        );
    }

    fn spawn(&mut self, image: &str, position: Vec2, kind: EntityKind, placement_id: &str) {
        match self.cache.get(image) {
            Ok(bitmap) => {
                let id = self.allocator.allocate();
                self.entities.push(Entity::new(id, bitmap, position, kind));
            }
            Err(error) => {
                warn!(id = %placement_id, image, %error, "entity_image_unavailable");
            }
        }
    }
}
