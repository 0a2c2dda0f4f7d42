use std::path::Path;

use serde::Deserialize;

use crate::resolution::Resolutions;
use crate::solver::SimConfig;

pub const CONFIG_FILE: &str = "splatfluid.yaml";

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sim: SimConfig,
    pub display: DisplayConfig,
    /// Seed for the host's random source (splat colors, startup splats).
    pub seed: u64,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub width: usize,
    pub height: usize,
    pub target_fps: usize,
    /// Upper bound on the per-frame timestep, in seconds.
    pub max_dt: f64,
    /// Cap on `sim.dye_resolution` for the CPU kernels. Raise it for larger
    /// dye grids at the cost of frame rate.
    pub max_dye_resolution: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sim: SimConfig::default(),
            display: DisplayConfig::default(),
            seed: 0,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 960,
            height: 540,
            target_fps: 60,
            max_dt: 1.0 / 60.0,
            max_dye_resolution: 256,
        }
    }
}

impl Config {
    /// Solver settings the host runs with: `sim` with the dye resolution
    /// capped by `display.max_dye_resolution`.
    pub fn sim_config(&self) -> SimConfig {
        let mut sim = self.sim.clone();
        if sim.dye_resolution > self.display.max_dye_resolution {
            log::info!(
                "dye resolution {} capped to {}",
                sim.dye_resolution,
                self.display.max_dye_resolution
            );
            sim.dye_resolution = self.display.max_dye_resolution;
        }
        sim
    }

    /// Grid sizes for the configured window.
    pub fn window_resolutions(&self) -> Resolutions {
        Resolutions::for_target(Some((self.display.width, self.display.height)), &self.sim_config())
    }
}

/// Load `splatfluid.yaml` from the working directory, falling back to defaults.
pub fn load() -> Config {
    load_from(Path::new(CONFIG_FILE))
}

pub fn load_from(path: &Path) -> Config {
    if !path.exists() {
        log::debug!("{} not found; using defaults", path.display());
        return Config::default();
    }
    match std::fs::read_to_string(path) {
        Ok(contents) => match serde_yaml::from_str(&contents) {
            Ok(cfg) => cfg,
            Err(e) => {
                log::warn!("failed to parse {}: {e}; using defaults", path.display());
                Config::default()
            }
        },
        Err(e) => {
            log::warn!("failed to read {}: {e}; using defaults", path.display());
            Config::default()
        }
    }
}
