//! Keyframe channels with pluggable linear interpolation.

use std::ops::Add;

use serde::{Deserialize, Serialize};

/// Linear blend between two values of the animated type.
pub trait Interpolate: Copy {
    fn interpolate(a: Self, b: Self, t: f32) -> Self;
}

impl Interpolate for f32 {
    fn interpolate(a: Self, b: Self, t: f32) -> Self {
        a + (b - a) * t
    }
}

/// Integer screen point. Interpolation truncates toward zero, matching
/// pixel-grid placement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0, y: 0 };

    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, other: Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }
}

impl Interpolate for Point {
    fn interpolate(a: Self, b: Self, t: f32) -> Self {
        Point::new(
            a.x + ((b.x - a.x) as f32 * t) as i32,
            a.y + ((b.y - a.y) as f32 * t) as i32,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe<T> {
    pub frame: i32,
    pub value: T,
}

/// Ordered keyframe sequence driven from outside by `set_frame`. The
/// channel has no value until its first keyframe exists.
#[derive(Debug, Clone, Default)]
pub struct Channel<T> {
    keyframes: Vec<Keyframe<T>>,
    value: Option<T>,
}

impl<T: Interpolate> Channel<T> {
    pub fn new() -> Self {
        Self {
            keyframes: Vec::new(),
            value: None,
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.keyframes.is_empty()
    }

    pub fn keyframes(&self) -> &[Keyframe<T>] {
        &self.keyframes
    }

    /// Current value, `None` until a keyframe exists and `set_frame` ran.
    pub fn value(&self) -> Option<T> {
        self.value
    }

    /// Insert a keyframe, keeping frame-ascending order. A keyframe
    /// already at that frame is replaced; one keyframe per frame.
    pub fn set_keyframe(&mut self, frame: i32, value: T) {
        let index = self.keyframes.partition_point(|key| key.frame < frame);
        if self
            .keyframes
            .get(index)
            .is_some_and(|key| key.frame == frame)
        {
            self.keyframes[index].value = value;
        } else {
            self.keyframes.insert(index, Keyframe { frame, value });
        }
    }

    /// Remove the keyframe at `frame` if one exists.
    pub fn delete_keyframe(&mut self, frame: i32) {
        if let Some(index) = self.keyframes.iter().position(|key| key.frame == frame) {
            self.keyframes.remove(index);
            if self.keyframes.is_empty() {
                self.value = None;
            }
        }
    }

    pub fn clear(&mut self) {
        self.keyframes.clear();
        self.value = None;
    }

    /// Recompute the channel value for `frame`: exact keyframes read
    /// directly, queries outside the keyed range clamp to the nearest
    /// endpoint, and everything between brackets interpolates linearly.
    pub fn set_frame(&mut self, frame: i32) {
        let (Some(first), Some(last)) = (self.keyframes.first(), self.keyframes.last()) else {
            self.value = None;
            return;
        };

        if frame <= first.frame {
            self.value = Some(first.value);
            return;
        }
        if frame >= last.frame {
            self.value = Some(last.value);
            return;
        }

        // frame is strictly inside the keyed range, so both brackets
        // exist.
        let after = self.keyframes.partition_point(|key| key.frame <= frame);
        let key2 = self.keyframes[after];
        let key1 = self.keyframes[after - 1];
        if key1.frame == frame {
            self.value = Some(key1.value);
            return;
        }
        let t = (frame - key1.frame) as f32 / (key2.frame - key1.frame) as f32;
        self.value = Some(T::interpolate(key1.value, key2.value, t));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_channel_has_no_value() {
        let mut channel: Channel<f32> = Channel::new();
        assert!(!channel.is_valid());
        channel.set_frame(7);
        assert_eq!(channel.value(), None);
    }

    #[test]
    fn single_keyframe_is_constant() {
        let mut channel = Channel::new();
        channel.set_keyframe(10, 42.0);
        for frame in [-5, 0, 10, 99] {
            channel.set_frame(frame);
            assert_eq!(channel.value(), Some(42.0));
        }
    }

    #[test]
    fn interpolates_between_brackets_and_clamps_outside() {
        let mut channel = Channel::new();
        channel.set_keyframe(0, 10.0);
        channel.set_keyframe(10, 20.0);

        channel.set_frame(5);
        assert_eq!(channel.value(), Some(15.0));
        channel.set_frame(0);
        assert_eq!(channel.value(), Some(10.0));
        channel.set_frame(10);
        assert_eq!(channel.value(), Some(20.0));
        channel.set_frame(20);
        assert_eq!(channel.value(), Some(20.0));
        channel.set_frame(-5);
        assert_eq!(channel.value(), Some(10.0));
    }

    #[test]
    fn exact_keyframe_is_read_directly() {
        let mut channel = Channel::new();
        channel.set_keyframe(0, 0.0);
        channel.set_keyframe(4, 100.0);
        channel.set_keyframe(8, 0.0);
        channel.set_frame(4);
        assert_eq!(channel.value(), Some(100.0));
    }

    #[test]
    fn setting_a_keyframe_twice_replaces_it() {
        let mut channel = Channel::new();
        channel.set_keyframe(5, 1.0);
        channel.set_keyframe(5, 2.0);
        assert_eq!(channel.keyframes().len(), 1);
        channel.set_frame(5);
        assert_eq!(channel.value(), Some(2.0));
    }

    #[test]
    fn keyframes_stay_frame_ordered_regardless_of_insertion_order() {
        let mut channel = Channel::new();
        channel.set_keyframe(20, 2.0);
        channel.set_keyframe(0, 0.0);
        channel.set_keyframe(10, 1.0);
        let frames: Vec<i32> = channel.keyframes().iter().map(|key| key.frame).collect();
        assert_eq!(frames, vec![0, 10, 20]);
        channel.set_frame(15);
        assert_eq!(channel.value(), Some(1.5));
    }

    #[test]
    fn delete_removes_only_the_exact_frame() {
        let mut channel = Channel::new();
        channel.set_keyframe(0, 10.0);
        channel.set_keyframe(10, 20.0);
        channel.delete_keyframe(5);
        assert_eq!(channel.keyframes().len(), 2);
        channel.delete_keyframe(10);
        assert_eq!(channel.keyframes().len(), 1);
        channel.set_frame(10);
        assert_eq!(channel.value(), Some(10.0));
    }

    #[test]
    fn point_interpolation_truncates_toward_zero() {
        let half = Point::interpolate(Point::ZERO, Point::new(5, 9), 0.5);
        assert_eq!(half, Point::new(2, 4));

        let mut channel = Channel::new();
        channel.set_keyframe(0, Point::new(0, 0));
        channel.set_keyframe(10, Point::new(5, 9));
        channel.set_frame(5);
        assert_eq!(channel.value(), Some(Point::new(2, 4)));
    }
}
