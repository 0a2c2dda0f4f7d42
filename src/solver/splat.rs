use glam::{DVec2, DVec3};
use rand::Rng;

use super::kernel::{Kernels, Pass, SplatPass};
use super::params::SimConfig;
use crate::color::generate_color;
use crate::error::SimResult;
use crate::state::SimState;

/// Brightness multiplier for seeded splat colors.
const SEED_COLOR_BOOST: f64 = 10.0;
/// Seeded velocity components are drawn from `[-SEED_VELOCITY/2, SEED_VELOCITY/2)`.
const SEED_VELOCITY: f64 = 1000.0;

/// A localized impulse: where, how hard, and what color.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Impulse {
    pub point: DVec2,
    pub velocity: DVec2,
    pub color: DVec3,
}

/// Gaussian radius in texcoords for a configured `splat_radius`.
///
/// `splat_radius` is the user-facing knob in `[0.01, 1]`; it maps to a
/// falloff variance of `splat_radius / 100`.
pub fn effective_radius(splat_radius: f64) -> f64 {
    (splat_radius / 100.0).sqrt()
}

/// Widen the radius on landscape surfaces so splats stay circular.
pub fn correct_radius(radius: f64, aspect_ratio: f64) -> f64 {
    if aspect_ratio > 1.0 {
        radius * aspect_ratio
    } else {
        radius
    }
}

/// Add `impulse` to the velocity and dye fields.
pub fn splat<K: Kernels>(
    state: &mut SimState,
    kernels: &mut K,
    config: &SimConfig,
    aspect_ratio: f64,
    impulse: Impulse,
) -> SimResult<()> {
    let radius = correct_radius(effective_radius(config.splat_radius), aspect_ratio);

    let (source, target) = state.velocity.split();
    kernels.execute(Pass::Splat(SplatPass {
        source,
        target,
        point: impulse.point,
        value: impulse.velocity.extend(0.0),
        radius,
        aspect_ratio,
    }))?;
    state.velocity.swap();

    let (source, target) = state.dye.split();
    kernels.execute(Pass::Splat(SplatPass {
        source,
        target,
        point: impulse.point,
        value: impulse.color,
        radius,
        aspect_ratio,
    }))?;
    state.dye.swap();
    Ok(())
}

/// Splat count used for startup seeding: uniform in `5..25`.
pub fn random_splat_count<R: Rng + ?Sized>(rng: &mut R) -> usize {
    rng.gen_range(5..25)
}

/// Issue `amount` splats at random positions with random velocities and colors.
pub fn multiple_splats<K: Kernels, R: Rng + ?Sized>(
    state: &mut SimState,
    kernels: &mut K,
    config: &SimConfig,
    aspect_ratio: f64,
    amount: usize,
    rng: &mut R,
) -> SimResult<()> {
    log::debug!("seeding {amount} random splats");
    for _ in 0..amount {
        let color = generate_color(rng) * SEED_COLOR_BOOST;
        let point = DVec2::new(rng.gen(), rng.gen());
        let velocity = DVec2::new(
            SEED_VELOCITY * (rng.gen::<f64>() - 0.5),
            SEED_VELOCITY * (rng.gen::<f64>() - 0.5),
        );
        splat(state, kernels, config, aspect_ratio, Impulse { point, velocity, color })?;
    }
    Ok(())
}
