//! The animation clock. Pure frame math; channels are driven separately.

/// Frames in a new animation.
const DEFAULT_NUM_FRAMES: i32 = 300;
/// Playback rate of a new animation, frames per second.
const DEFAULT_FRAME_RATE: i32 = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct Timeline {
    num_frames: i32,
    frame_rate: i32,
    current_time: f32,
}

impl Default for Timeline {
    fn default() -> Self {
        Self {
            num_frames: DEFAULT_NUM_FRAMES,
            frame_rate: DEFAULT_FRAME_RATE,
            current_time: 0.0,
        }
    }
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn num_frames(&self) -> i32 {
        self.num_frames
    }

    pub fn set_num_frames(&mut self, num_frames: i32) {
        self.num_frames = num_frames.max(1);
    }

    pub fn frame_rate(&self) -> i32 {
        self.frame_rate
    }

    pub fn set_frame_rate(&mut self, frame_rate: i32) {
        self.frame_rate = frame_rate.max(1);
    }

    pub fn current_time(&self) -> f32 {
        self.current_time
    }

    pub fn set_current_time(&mut self, time: f32) {
        self.current_time = time;
    }

    /// Frame the current time falls in: floor(time × rate), never
    /// negative.
    pub fn current_frame(&self) -> i32 {
        ((self.current_time * self.frame_rate as f32).floor() as i32).max(0)
    }

    /// Animation length in seconds.
    pub fn duration(&self) -> f32 {
        self.num_frames as f32 / self.frame_rate as f32
    }
}
