use serde::Deserialize;

use crate::error::{SimError, SimResult};

/// Linear RGB color with components in [0, 1].
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0.0, g: 0.0, b: 0.0 };
}

impl Default for Rgb {
    fn default() -> Self {
        Self::BLACK
    }
}

/// Solver parameters, snapshotted once per tick.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub sim_resolution: usize,
    pub dye_resolution: usize,
    pub density_dissipation: f64,
    pub velocity_dissipation: f64,
    /// Fraction of last tick's pressure kept as the initial guess.
    pub pressure_factor: f64,
    pub pressure_iterations: usize,
    pub curl_strength: f64,
    pub splat_radius: f64,
    pub splat_force: f64,
    pub colorful: bool,
    pub color_update_speed: f64,
    pub paused: bool,
    /// Whether pointer splats still land while paused.
    pub splat_while_paused: bool,
    pub background_color: Rgb,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            sim_resolution: 128,
            dye_resolution: 1024,
            density_dissipation: 1.0,
            velocity_dissipation: 0.2,
            pressure_factor: 0.8,
            pressure_iterations: 20,
            curl_strength: 30.0,
            splat_radius: 0.25,
            splat_force: 6000.0,
            colorful: true,
            color_update_speed: 10.0,
            paused: false,
            splat_while_paused: true,
            background_color: Rgb::BLACK,
        }
    }
}

impl SimConfig {
    /// True when either grid resolution differs, i.e. the grids need reallocating.
    pub fn resolution_changed(&self, other: &SimConfig) -> bool {
        self.sim_resolution != other.sim_resolution || self.dye_resolution != other.dye_resolution
    }

    /// Usage check for callers to run before construction.
    /// The solver itself does not validate on the step path.
    pub fn validate(&self) -> SimResult<()> {
        if self.sim_resolution == 0 {
            return Err(SimError::InvalidResolution { which: "sim", value: self.sim_resolution });
        }
        if self.dye_resolution == 0 {
            return Err(SimError::InvalidResolution { which: "dye", value: self.dye_resolution });
        }
        if self.pressure_iterations == 0 {
            return Err(SimError::config("pressure_iterations", "must be at least 1"));
        }
        check_range("density_dissipation", self.density_dissipation, 0.0, 4.0)?;
        check_range("velocity_dissipation", self.velocity_dissipation, 0.0, 4.0)?;
        check_range("pressure_factor", self.pressure_factor, 0.0, 1.0)?;
        check_range("curl_strength", self.curl_strength, 0.0, 50.0)?;
        check_range("splat_radius", self.splat_radius, 0.01, 1.0)?;
        if !self.splat_force.is_finite() {
            return Err(SimError::config("splat_force", "must be finite"));
        }
        if !(self.color_update_speed >= 0.0) {
            return Err(SimError::config("color_update_speed", "must be non-negative"));
        }
        Ok(())
    }
}

fn check_range(field: &'static str, value: f64, lo: f64, hi: f64) -> SimResult<()> {
    if (lo..=hi).contains(&value) {
        Ok(())
    } else {
        Err(SimError::config(field, format!("{value} outside [{lo}, {hi}]")))
    }
}
