//! Cutout-style keyframe animation: generic interpolated channels, a
//! frame-math timeline, articulated drawable trees, and versioned JSON
//! snapshots of an animation's keyframes.

pub mod actor;
pub mod channel;
pub mod drawable;
pub mod picture;
pub mod timeline;

pub use actor::Actor;
pub use channel::{Channel, Interpolate, Keyframe, Point};
pub use drawable::{rotate_point, Drawable, DrawableArena, DrawableId};
pub use picture::{
    AnimationLoadError, AnimationSet, ChannelEntry, ChannelKeys, Picture, ANIMATION_VERSION,
};
pub use timeline::Timeline;
