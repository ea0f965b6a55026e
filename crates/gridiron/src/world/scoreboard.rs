/// Points lost per second of play.
const DECAY_PER_SECOND: f64 = 1.0;

/// Time-decaying score accumulator. Score is tracked as `f64` so decay
/// can run fractionally per tick; the presentation layer reads it as an
/// integer. Power-ups scale awards through the World's coin multiplier,
/// not here.
#[derive(Debug, Clone, Default)]
pub struct Scoreboard {
    score: f64,
    elapsed: f64,
}

impl Scoreboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn score(&self) -> i32 {
        self.score as i32
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed
    }

    /// Advance decay and the elapsed clock.
    pub fn update(&mut self, dt: f64) {
        if dt <= 0.0 {
            return;
        }
        self.elapsed += dt;
        self.score = (self.score - DECAY_PER_SECOND * dt).max(0.0);
    }

    pub fn add_points(&mut self, points: i32) {
        self.score += f64::from(points);
    }

    pub fn reset(&mut self) {
        self.score = 0.0;
        self.elapsed = 0.0;
    }

    pub(crate) fn restore(&mut self, score: f64, elapsed: f64) {
        self.score = score.max(0.0);
        self.elapsed = elapsed.max(0.0);
    }

    pub(crate) fn raw_score(&self) -> f64 {
        self.score
    }
}
