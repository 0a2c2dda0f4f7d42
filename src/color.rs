use glam::DVec3;
use rand::Rng;

use crate::solver::SimConfig;

/// Scale applied to generated colors so repeated splats don't saturate the dye.
pub const COLOR_INTENSITY: f64 = 0.15;

/// Standard six-sector HSV -> RGB conversion. All inputs in [0, 1].
pub fn hsv_to_rgb(h: f64, s: f64, v: f64) -> DVec3 {
    let i = (h * 6.0).floor();
    let f = h * 6.0 - i;
    let p = v * (1.0 - s);
    let q = v * (1.0 - f * s);
    let t = v * (1.0 - (1.0 - f) * s);

    match (i as i64).rem_euclid(6) {
        0 => DVec3::new(v, t, p),
        1 => DVec3::new(q, v, p),
        2 => DVec3::new(p, v, t),
        3 => DVec3::new(p, q, v),
        4 => DVec3::new(t, p, v),
        _ => DVec3::new(v, p, q),
    }
}

/// Fully saturated color of random hue, scaled by [`COLOR_INTENSITY`].
pub fn generate_color<R: Rng + ?Sized>(rng: &mut R) -> DVec3 {
    hsv_to_rgb(rng.gen::<f64>(), 1.0, 1.0) * COLOR_INTENSITY
}

/// Timer deciding when pointer colors are regenerated.
#[derive(Clone, Debug, Default)]
pub struct ColorCycle {
    timer: f64,
}

impl ColorCycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timer(&self) -> f64 {
        self.timer
    }

    /// Advance by `dt`. Returns true when colors should be regenerated.
    pub fn advance(&mut self, dt: f64, config: &SimConfig) -> bool {
        if !config.colorful {
            return false;
        }
        self.timer += dt * config.color_update_speed;
        if self.timer >= 1.0 {
            self.timer = self.timer.fract();
            true
        } else {
            false
        }
    }
}
