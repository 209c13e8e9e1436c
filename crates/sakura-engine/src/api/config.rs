//! Field tuning, loadable from JSON.

use serde::{Deserialize, Serialize};

/// Smallest fall speed a petal may have. Petals must always move down.
pub const MIN_FALL_SPEED: f32 = 0.01;

/// Smallest swing speed a petal may have. The swing always advances.
pub const MIN_SWING_SPEED: f32 = 0.001;

/// Upper bound on the petal count accepted from a config.
pub const MAX_COUNT: usize = 10_000;

/// Tuning for a petal field. Every range is `(min, max)`, sampled half-open.
/// Loaded from JSON at runtime; missing fields keep their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Number of petals kept alive (default: 60).
    pub count: usize,
    /// RNG seed. Chosen by the host, never read from JSON.
    #[serde(skip)]
    pub seed: u64,
    /// Petal size in px (default: 5..15).
    pub size_range: (f32, f32),
    /// Spawn height in px, above the viewport (default: -100..-20).
    pub spawn_y_range: (f32, f32),
    /// Petal opacity (default: 0.4..0.9).
    pub opacity_range: (f32, f32),
    /// Horizontal speed before size scaling, px/tick.
    pub drift_range: (f32, f32),
    /// Fall speed before size scaling, px/tick. Always positive.
    pub fall_range: (f32, f32),
    /// Speed multiplier `(base, per_px)`: `base + size * per_px`.
    /// Larger petals fall and drift faster.
    pub size_scale: (f32, f32),
    /// Rotation speed in degrees/tick, signed.
    pub spin_range: (f32, f32),
    /// Swing phase advance in radians/tick.
    pub swing_speed_range: (f32, f32),
    /// Peak horizontal swing offset in px.
    pub swing_amplitude: f32,
    /// Exit margin during a tick, in multiples of petal size.
    pub exit_margin: f32,
    /// Exit margin applied after a viewport change, in multiples of petal size.
    pub resize_margin: f32,
    /// Petal height / width.
    pub aspect: f32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            count: 60,
            seed: 42,
            size_range: (5.0, 15.0),
            spawn_y_range: (-100.0, -20.0),
            opacity_range: (0.4, 0.9),
            drift_range: (-0.6, 0.6),
            fall_range: (0.8, 2.0),
            size_scale: (0.8, 1.0 / 20.0),
            spin_range: (-0.3, 0.3),
            swing_speed_range: (0.01, 0.04),
            swing_amplitude: 0.8,
            exit_margin: 2.0,
            resize_margin: 1.0,
            aspect: 0.9,
        }
    }
}

fn ordered((a, b): (f32, f32)) -> (f32, f32) {
    if a <= b { (a, b) } else { (b, a) }
}

impl FieldConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Repair values that would make the field misbehave.
    /// Swapped ranges are reordered, magnitudes made non-negative,
    /// fall and swing speeds forced above zero, and the count capped.
    pub fn normalized(mut self) -> Self {
        self.size_range = ordered(self.size_range);
        self.size_range.0 = self.size_range.0.max(0.0);
        self.size_range.1 = self.size_range.1.max(0.0);
        self.spawn_y_range = ordered(self.spawn_y_range);
        self.opacity_range = ordered(self.opacity_range);
        self.opacity_range.0 = self.opacity_range.0.clamp(0.0, 1.0);
        self.opacity_range.1 = self.opacity_range.1.clamp(0.0, 1.0);
        self.drift_range = ordered(self.drift_range);
        self.fall_range = ordered(self.fall_range);
        self.fall_range.0 = self.fall_range.0.max(MIN_FALL_SPEED);
        self.fall_range.1 = self.fall_range.1.max(self.fall_range.0);
        self.size_scale.0 = self.size_scale.0.max(0.0);
        self.size_scale.1 = self.size_scale.1.max(0.0);
        self.spin_range = ordered(self.spin_range);
        self.swing_speed_range = ordered(self.swing_speed_range);
        self.swing_speed_range.0 = self.swing_speed_range.0.max(MIN_SWING_SPEED);
        self.swing_speed_range.1 = self.swing_speed_range.1.max(self.swing_speed_range.0);
        self.count = self.count.min(MAX_COUNT);
        self.swing_amplitude = self.swing_amplitude.abs();
        self.exit_margin = self.exit_margin.abs();
        self.resize_margin = self.resize_margin.abs();
        self.aspect = self.aspect.abs();
        self
    }

    /// Speed multiplier for a petal of the given size.
    pub fn speed_factor(&self, size: f32) -> f32 {
        self.size_scale.0 + size * self.size_scale.1
    }

    // -- Builder pattern --

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_size_range(mut self, min: f32, max: f32) -> Self {
        self.size_range = (min, max);
        self
    }

    pub fn with_drift_range(mut self, min: f32, max: f32) -> Self {
        self.drift_range = (min, max);
        self
    }

    pub fn with_fall_range(mut self, min: f32, max: f32) -> Self {
        self.fall_range = (min, max);
        self
    }

    pub fn with_spin_range(mut self, min: f32, max: f32) -> Self {
        self.spin_range = (min, max);
        self
    }

    pub fn with_swing_amplitude(mut self, amplitude: f32) -> Self {
        self.swing_amplitude = amplitude;
        self
    }
}
