use crate::solver::SimConfig;

/// Grid dimensions for a base resolution at the given aspect ratio.
/// The shorter side gets `base`; the longer side is scaled and rounded.
pub fn calc_resolution(aspect: f64, base: usize) -> (usize, usize) {
    let base_f = base as f64;
    if aspect < 1.0 {
        (base, (base_f / aspect).round() as usize)
    } else {
        ((base_f * aspect).round() as usize, base)
    }
}

/// Aspect ratio of a display target. Degenerate targets count as square.
pub fn aspect_of(target: Option<(usize, usize)>) -> f64 {
    match target {
        Some((w, h)) if w > 0 && h > 0 => w as f64 / h as f64,
        _ => 1.0,
    }
}

/// Simulation and dye grid sizes derived from one target aspect ratio.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Resolutions {
    pub sim: (usize, usize),
    pub dye: (usize, usize),
}

impl Resolutions {
    pub fn for_target(target: Option<(usize, usize)>, config: &SimConfig) -> Self {
        Self::for_aspect(aspect_of(target), config)
    }

    pub fn for_aspect(aspect: f64, config: &SimConfig) -> Self {
        Self {
            sim: calc_resolution(aspect, config.sim_resolution),
            dye: calc_resolution(aspect, config.dye_resolution),
        }
    }
}
