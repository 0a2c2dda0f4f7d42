mod color;

// Re-export public API
pub use color::rgba_to_argb;

use glam::DVec3;

use crate::grid::Grid;
use crate::solver::Rgb;

/// Which field the display shows.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum VizMode {
    /// Dye composited over the background color.
    Dye,
    /// Velocity direction as hue, magnitude as brightness.
    Velocity,
}

impl VizMode {
    /// Cycle to the next visualization mode.
    pub fn next(self) -> Self {
        match self {
            VizMode::Dye => VizMode::Velocity,
            VizMode::Velocity => VizMode::Dye,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            VizMode::Dye => "dye",
            VizMode::Velocity => "velocity",
        }
    }
}

/// Render `field` into an RGBA buffer of `width` x `height` pixels.
///
/// Pixels sample the nearest cell. Row 0 of the grid is the bottom of the
/// image.
pub fn render_into(buf: &mut Vec<u8>, field: &Grid, width: usize, height: usize, mode: VizMode, background: Rgb) {
    buf.resize(width * height * 4, 0);
    if field.is_empty() || width == 0 || height == 0 {
        buf.fill(0);
        return;
    }

    let max_speed = match mode {
        VizMode::Velocity => max_speed(field),
        VizMode::Dye => 0.0,
    };

    let (gw, gh) = (field.width(), field.height());
    for sy in 0..height {
        let gy = gh - 1 - ((sy * gh) / height).min(gh - 1);
        for sx in 0..width {
            let gx = ((sx * gw) / width).min(gw - 1);
            let cell = field.cell(gx, gy);
            let rgb = match mode {
                VizMode::Dye => {
                    let dye = DVec3::new(cell[0], cell.get(1).copied().unwrap_or(0.0), cell.get(2).copied().unwrap_or(0.0));
                    color::composite(dye, background)
                }
                VizMode::Velocity => {
                    color::velocity_to_rgb(cell[0], cell.get(1).copied().unwrap_or(0.0), max_speed)
                }
            };
            let offset = (sy * width + sx) * 4;
            buf[offset..offset + 4].copy_from_slice(&color::rgb_to_rgba(rgb));
        }
    }
}

/// Allocating variant of [`render_into`].
pub fn render(field: &Grid, width: usize, height: usize, mode: VizMode, background: Rgb) -> Vec<u8> {
    let mut buf = Vec::new();
    render_into(&mut buf, field, width, height, mode, background);
    buf
}

fn max_speed(velocity: &Grid) -> f64 {
    if velocity.channels() < 2 {
        return velocity.data().iter().fold(0.0, |m: f64, v| m.max(v.abs()));
    }
    velocity
        .data()
        .chunks_exact(velocity.channels())
        .map(|v| (v[0] * v[0] + v[1] * v[1]).sqrt())
        .fold(0.0, f64::max)
}
