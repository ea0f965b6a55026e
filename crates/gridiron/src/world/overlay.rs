use crate::geometry::Vec2;

/// Upward drift of a floating indicator, in virtual pixels per second.
const RISE_SPEED: f32 = -50.0;
/// Seconds a floating indicator stays on screen.
const LIFETIME_SECONDS: f32 = 1.5;

/// Transient "+N" indicator emitted where a coin or power-up was
/// collected. Rises while alive and fades linearly with age.
#[derive(Debug, Clone)]
pub struct FloatingText {
    text: String,
    position: Vec2,
    age: f32,
}

impl FloatingText {
    pub fn new(text: String, position: Vec2) -> Self {
        Self {
            text,
            position,
            age: 0.0,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn update(&mut self, dt: f32) {
        self.position.y += RISE_SPEED * dt;
        self.age += dt;
    }

    pub fn expired(&self) -> bool {
        self.age >= LIFETIME_SECONDS
    }

    /// Opacity in [0, 1], fading out over the lifetime.
    pub fn alpha(&self) -> f32 {
        (1.0 - self.age / LIFETIME_SECONDS).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rises_while_alive() {
        let mut text = FloatingText::new("+10".to_string(), Vec2::new(100.0, 400.0));
        text.update(0.5);
        assert!((text.position().y - 375.0).abs() < 0.001);
        assert!(!text.expired());
    }

    #[test]
    fn expires_after_lifetime() {
        let mut text = FloatingText::new("+10".to_string(), Vec2::ZERO);
        text.update(1.6);
        assert!(text.expired());
        assert_eq!(text.alpha(), 0.0);
    }

    #[test]
    fn alpha_fades_linearly() {
        let mut text = FloatingText::new("+100".to_string(), Vec2::ZERO);
        assert_eq!(text.alpha(), 1.0);
        text.update(0.75);
        assert!((text.alpha() - 0.5).abs() < 0.001);
    }
}
