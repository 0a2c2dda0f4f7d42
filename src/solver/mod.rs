mod core;
mod kernel;
mod params;
mod splat;

// Re-export public API
pub use self::core::VELOCITY_LIMIT;
pub use kernel::{
    AdvectionPass, ClearPass, CpuKernels, CurlPass, DivergencePass, GradientSubtractPass, Kernels, Pass, PassKind,
    PressurePass, SplatPass, VorticityPass,
};
pub use params::{Rgb, SimConfig};
pub use splat::{correct_radius, effective_radius, multiple_splats, random_splat_count, splat, Impulse};

use crate::error::SimResult;
use crate::state::SimState;

/// Advance every field by `dt`.
///
/// Passes run in a fixed order; each one consumes the previous pass's
/// output, so none may be reordered.
pub fn fluid_step<K: Kernels>(state: &mut SimState, kernels: &mut K, config: &SimConfig, dt: f64) -> SimResult<()> {
    // 1. Curl
    kernels.execute(Pass::Curl(CurlPass { velocity: state.velocity.read(), curl: &mut state.curl }))?;

    // 2. Vorticity confinement
    let (velocity, target) = state.velocity.split();
    kernels.execute(Pass::Vorticity(VorticityPass {
        velocity,
        curl: &state.curl,
        target,
        curl_strength: config.curl_strength,
        dt,
    }))?;
    state.velocity.swap();

    // 3. Divergence
    kernels.execute(Pass::Divergence(DivergencePass {
        velocity: state.velocity.read(),
        divergence: &mut state.divergence,
    }))?;

    // 4. Warm-start pressure from a damped copy of last tick's solution
    let (source, target) = state.pressure.split();
    kernels.execute(Pass::Clear(ClearPass { source, target, value: config.pressure_factor }))?;
    state.pressure.swap();

    // 5. Jacobi pressure solve
    for _ in 0..config.pressure_iterations {
        let (pressure, target) = state.pressure.split();
        kernels.execute(Pass::Pressure(PressurePass { pressure, divergence: &state.divergence, target }))?;
        state.pressure.swap();
    }

    // 6. Project onto the divergence-free part
    let (velocity, target) = state.velocity.split();
    kernels.execute(Pass::GradientSubtract(GradientSubtractPass {
        pressure: state.pressure.read(),
        velocity,
        target,
    }))?;
    state.velocity.swap();

    // 7. Velocity self-advection
    let (velocity, target) = state.velocity.split();
    kernels.execute(Pass::Advection(AdvectionPass {
        velocity,
        source: velocity,
        target,
        dt,
        dissipation: config.velocity_dissipation,
    }))?;
    state.velocity.swap();

    // 8. Dye advection along the updated velocity
    let (source, target) = state.dye.split();
    kernels.execute(Pass::Advection(AdvectionPass {
        velocity: state.velocity.read(),
        source,
        target,
        dt,
        dissipation: config.density_dissipation,
    }))?;
    state.dye.swap();

    Ok(())
}
