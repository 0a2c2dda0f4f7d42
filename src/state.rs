use crate::grid::{DoubleBuffer, Grid};
use crate::resolution::Resolutions;

/// Velocity grid channels (vx, vy).
pub const VELOCITY_CHANNELS: usize = 2;
/// Dye grid channels (r, g, b).
pub const DYE_CHANNELS: usize = 3;

/// Every field the solver owns.
///
/// Velocity, dye and pressure are double-buffered. Curl and divergence are
/// fully recomputed each step before being read, so one storage suffices.
#[derive(Debug)]
pub struct SimState {
    pub velocity: DoubleBuffer,
    pub dye: DoubleBuffer,
    pub pressure: DoubleBuffer,
    pub divergence: Grid,
    pub curl: Grid,
}

impl SimState {
    pub fn new(res: Resolutions) -> Self {
        let (sw, sh) = res.sim;
        let (dw, dh) = res.dye;
        Self {
            velocity: DoubleBuffer::new(sw, sh, VELOCITY_CHANNELS),
            dye: DoubleBuffer::new(dw, dh, DYE_CHANNELS),
            pressure: DoubleBuffer::new(sw, sh, 1),
            divergence: Grid::new(sw, sh, 1),
            curl: Grid::new(sw, sh, 1),
        }
    }

    pub fn resolutions(&self) -> Resolutions {
        Resolutions {
            sim: (self.velocity.width(), self.velocity.height()),
            dye: (self.dye.width(), self.dye.height()),
        }
    }

    /// Resize to `res`. Velocity, pressure and dye keep their contents
    /// (resampled); curl and divergence are reallocated empty.
    /// Returns whether anything was reallocated.
    pub fn resize(&mut self, res: Resolutions) -> bool {
        let current = self.resolutions();
        if current == res {
            return false;
        }
        if current.sim != res.sim {
            let (w, h) = res.sim;
            self.velocity.resize(w, h);
            self.pressure.resize(w, h);
            self.divergence = Grid::new(w, h, 1);
            self.curl = Grid::new(w, h, 1);
        }
        if current.dye != res.dye {
            let (w, h) = res.dye;
            self.dye.resize(w, h);
        }
        true
    }

    /// Release every storage. Idempotent.
    pub fn dispose(&mut self) {
        self.velocity.dispose();
        self.dye.dispose();
        self.pressure.dispose();
        self.divergence.release();
        self.curl.release();
    }
}
