use crate::assets::Bitmap;

/// Surface the world draws into. Rendering backends are out of scope for
/// this crate; an embedding shell implements this over whatever graphics
/// stack it uses. Coordinates handed to the sink are already
/// scroll-adjusted virtual pixels, top-left based.
pub trait RenderSink {
    fn draw_bitmap(&mut self, bitmap: &Bitmap, x: f32, y: f32);
    fn draw_text(&mut self, text: &str, x: f32, y: f32, alpha: f32);
}

/// Sink that records draw calls. Useful for tests and headless runs.
#[derive(Debug, Default)]
pub struct RecordingSink {
    bitmaps: Vec<(f32, f32)>,
    texts: Vec<(String, f32)>,
}

impl RecordingSink {
    pub fn bitmaps(&self) -> &[(f32, f32)] {
        &self.bitmaps
    }

    pub fn texts(&self) -> &[(String, f32)] {
        &self.texts
    }
}

impl RenderSink for RecordingSink {
    fn draw_bitmap(&mut self, _bitmap: &Bitmap, x: f32, y: f32) {
        self.bitmaps.push((x, y));
    }

    fn draw_text(&mut self, text: &str, _x: f32, _y: f32, alpha: f32) {
        self.texts.push((text.to_string(), alpha));
    }
}
