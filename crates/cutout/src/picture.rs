//! The animated scene: actors in draw order plus the shared timeline,
//! and versioned JSON snapshots of every channel's keyframes.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::actor::Actor;
use crate::channel::{Channel, Interpolate, Keyframe, Point};
use crate::timeline::Timeline;

/// Format version written into every animation snapshot.
pub const ANIMATION_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum AnimationLoadError {
    #[error("unsupported animation version {found}, this build reads version {ANIMATION_VERSION}")]
    VersionMismatch { found: u32 },
    #[error("malformed animation at `{path}`: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Keyframes of one channel, tagged by what the channel animates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ChannelKeys {
    Angle(Vec<Keyframe<f32>>),
    Position(Vec<Keyframe<Point>>),
}

/// One channel's snapshot, addressed by an "actor" or "actor/node" path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelEntry {
    pub path: String,
    pub keys: ChannelKeys,
}

/// Complete keyframe snapshot of a picture's channels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationSet {
    version: u32,
    channels: Vec<ChannelEntry>,
}

impl AnimationSet {
    pub fn channels(&self) -> &[ChannelEntry] {
        &self.channels
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(text: &str) -> Result<Self, AnimationLoadError> {
        let mut deserializer = serde_json::Deserializer::from_str(text);
        let set: AnimationSet =
            serde_path_to_error::deserialize(&mut deserializer).map_err(|error| {
                AnimationLoadError::Parse {
                    path: error.path().to_string(),
                    source: error.into_inner(),
                }
            })?;
        if set.version != ANIMATION_VERSION {
            return Err(AnimationLoadError::VersionMismatch { found: set.version });
        }
        Ok(set)
    }
}

fn reload_channel<T: Interpolate>(channel: &mut Channel<T>, keys: &[Keyframe<T>]) {
    channel.clear();
    for key in keys {
        channel.set_keyframe(key.frame, key.value);
    }
}

/// Actors in insertion order, which is also draw order, plus the
/// timeline that drives every channel in lock-step.
#[derive(Default)]
pub struct Picture {
    actors: Vec<Actor>,
    timeline: Timeline,
}

impl Picture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_actor(&mut self, actor: Actor) {
        self.actors.push(actor);
    }

    pub fn actors(&self) -> &[Actor] {
        &self.actors
    }

    pub fn actor(&self, name: &str) -> Option<&Actor> {
        self.actors.iter().find(|actor| actor.name() == name)
    }

    pub fn actor_mut(&mut self, name: &str) -> Option<&mut Actor> {
        self.actors.iter_mut().find(|actor| actor.name() == name)
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn timeline_mut(&mut self) -> &mut Timeline {
        &mut self.timeline
    }

    /// Move the clock and push the derived frame into every channel,
    /// then re-place every tree.
    pub fn set_time(&mut self, time: f32) {
        self.timeline.set_current_time(time);
        let frame = self.timeline.current_frame();
        for actor in &mut self.actors {
            actor.animate(frame);
            actor.place();
        }
    }

    /// Capture every actor's current pose at the timeline's frame.
    pub fn set_keyframes(&mut self) {
        let frame = self.timeline.current_frame();
        for actor in &mut self.actors {
            actor.set_keyframes(frame);
        }
    }

    pub fn delete_keyframes(&mut self) {
        let frame = self.timeline.current_frame();
        for actor in &mut self.actors {
            actor.delete_keyframes(frame);
        }
    }

    /// Visit every drawable, actors in order, nodes in tree order.
    pub fn visit(&self, visitor: &mut impl FnMut(&crate::drawable::Drawable)) {
        for actor in &self.actors {
            actor.visit(visitor);
        }
    }

    /// Snapshot every channel's keyframes, addressed by path: `actor`
    /// for an actor's position channel, `actor/node` for node channels.
    pub fn capture_animation(&self) -> AnimationSet {
        let mut channels = Vec::new();
        for actor in &self.actors {
            channels.push(ChannelEntry {
                path: actor.name().to_string(),
                keys: ChannelKeys::Position(actor.position_channel().keyframes().to_vec()),
            });
            actor.visit(&mut |node| {
                let path = format!("{}/{}", actor.name(), node.name());
                channels.push(ChannelEntry {
                    path: path.clone(),
                    keys: ChannelKeys::Angle(node.angle_channel().keyframes().to_vec()),
                });
                if let Some(channel) = node.position_channel() {
                    channels.push(ChannelEntry {
                        path,
                        keys: ChannelKeys::Position(channel.keyframes().to_vec()),
                    });
                }
            });
        }
        AnimationSet {
            version: ANIMATION_VERSION,
            channels,
        }
    }

    /// Load a snapshot back into the matching channels. Paths that no
    /// longer resolve are skipped with a warning.
    pub fn apply_animation(&mut self, set: &AnimationSet) {
        for entry in &set.channels {
            let (actor_name, node_name) = match entry.path.split_once('/') {
                Some((actor, node)) => (actor, Some(node)),
                None => (entry.path.as_str(), None),
            };
            let Some(actor) = self.actor_mut(actor_name) else {
                warn!(path = %entry.path, "animation_path_unmatched");
                continue;
            };
            match node_name {
                None => match &entry.keys {
                    ChannelKeys::Position(keys) => {
                        reload_channel(actor.position_channel_mut(), keys);
                    }
                    ChannelKeys::Angle(_) => {
                        warn!(path = %entry.path, "animation_actor_channel_not_angle");
                    }
                },
                Some(node_name) => {
                    let Some((_, node)) = actor
                        .arena_mut()
                        .iter_mut()
                        .find(|(_, node)| node.name() == node_name)
                    else {
                        warn!(path = %entry.path, "animation_path_unmatched");
                        continue;
                    };
                    match &entry.keys {
                        ChannelKeys::Angle(keys) => {
                            reload_channel(node.angle_channel_mut(), keys);
                        }
                        ChannelKeys::Position(keys) => {
                            reload_channel(node.ensure_position_channel(), keys);
                        }
                    }
                }
            }
        }
    }
}
