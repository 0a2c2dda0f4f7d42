use glam::{DVec2, DVec3};

use super::core;
use crate::error::{SimError, SimResult};
use crate::grid::Grid;

/// Every kind of pass the step pipeline and splat injector submit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PassKind {
    Curl,
    Vorticity,
    Divergence,
    Clear,
    Pressure,
    GradientSubtract,
    Advection,
    Splat,
}

pub struct CurlPass<'a> {
    pub velocity: &'a Grid,
    pub curl: &'a mut Grid,
}

pub struct VorticityPass<'a> {
    pub velocity: &'a Grid,
    pub curl: &'a Grid,
    pub target: &'a mut Grid,
    pub curl_strength: f64,
    pub dt: f64,
}

pub struct DivergencePass<'a> {
    pub velocity: &'a Grid,
    pub divergence: &'a mut Grid,
}

/// Scales the previous field into the target (pressure warm start).
pub struct ClearPass<'a> {
    pub source: &'a Grid,
    pub target: &'a mut Grid,
    pub value: f64,
}

pub struct PressurePass<'a> {
    pub pressure: &'a Grid,
    pub divergence: &'a Grid,
    pub target: &'a mut Grid,
}

pub struct GradientSubtractPass<'a> {
    pub pressure: &'a Grid,
    pub velocity: &'a Grid,
    pub target: &'a mut Grid,
}

/// Shared by velocity self-advection and dye advection.
pub struct AdvectionPass<'a> {
    pub velocity: &'a Grid,
    pub source: &'a Grid,
    pub target: &'a mut Grid,
    pub dt: f64,
    pub dissipation: f64,
}

pub struct SplatPass<'a> {
    pub source: &'a Grid,
    pub target: &'a mut Grid,
    pub point: DVec2,
    /// Impulse per channel; velocity uses `.x`/`.y`, dye uses all three.
    pub value: DVec3,
    pub radius: f64,
    pub aspect_ratio: f64,
}

/// One submitted pass with its resolved bindings.
pub enum Pass<'a> {
    Curl(CurlPass<'a>),
    Vorticity(VorticityPass<'a>),
    Divergence(DivergencePass<'a>),
    Clear(ClearPass<'a>),
    Pressure(PressurePass<'a>),
    GradientSubtract(GradientSubtractPass<'a>),
    Advection(AdvectionPass<'a>),
    Splat(SplatPass<'a>),
}

impl Pass<'_> {
    pub fn kind(&self) -> PassKind {
        match self {
            Pass::Curl(_) => PassKind::Curl,
            Pass::Vorticity(_) => PassKind::Vorticity,
            Pass::Divergence(_) => PassKind::Divergence,
            Pass::Clear(_) => PassKind::Clear,
            Pass::Pressure(_) => PassKind::Pressure,
            Pass::GradientSubtract(_) => PassKind::GradientSubtract,
            Pass::Advection(_) => PassKind::Advection,
            Pass::Splat(_) => PassKind::Splat,
        }
    }
}

/// Execution backend for simulation passes.
///
/// Implementations must complete (or at least order) each pass before any
/// later pass that reads its target.
pub trait Kernels {
    fn execute(&mut self, pass: Pass<'_>) -> SimResult<()>;
}

/// Reference backend running every pass on the CPU.
#[derive(Debug, Default)]
pub struct CpuKernels {
    executed: u64,
}

impl CpuKernels {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of passes executed since construction.
    pub fn executed(&self) -> u64 {
        self.executed
    }
}

fn ensure_same(pass: PassKind, expected: &Grid, found: &Grid) -> SimResult<()> {
    if expected.shape() == found.shape() {
        Ok(())
    } else {
        Err(SimError::SizeMismatch { pass, expected: expected.shape(), found: found.shape() })
    }
}

fn ensure_size(pass: PassKind, expected: &Grid, found: &Grid) -> SimResult<()> {
    if expected.width() == found.width() && expected.height() == found.height() {
        Ok(())
    } else {
        Err(SimError::SizeMismatch { pass, expected: expected.shape(), found: found.shape() })
    }
}

impl Kernels for CpuKernels {
    fn execute(&mut self, pass: Pass<'_>) -> SimResult<()> {
        let kind = pass.kind();
        log::trace!("execute {kind:?}");
        match pass {
            Pass::Curl(p) => {
                ensure_size(kind, p.velocity, p.curl)?;
                core::curl(p.velocity, p.curl);
            }
            Pass::Vorticity(p) => {
                ensure_same(kind, p.velocity, p.target)?;
                ensure_size(kind, p.velocity, p.curl)?;
                core::vorticity(p.velocity, p.curl, p.target, p.curl_strength, p.dt);
            }
            Pass::Divergence(p) => {
                ensure_size(kind, p.velocity, p.divergence)?;
                core::divergence(p.velocity, p.divergence);
            }
            Pass::Clear(p) => {
                ensure_same(kind, p.source, p.target)?;
                core::scale(p.source, p.target, p.value);
            }
            Pass::Pressure(p) => {
                ensure_same(kind, p.pressure, p.target)?;
                ensure_size(kind, p.pressure, p.divergence)?;
                core::jacobi(p.pressure, p.divergence, p.target);
            }
            Pass::GradientSubtract(p) => {
                ensure_same(kind, p.velocity, p.target)?;
                ensure_size(kind, p.velocity, p.pressure)?;
                core::subtract_gradient(p.pressure, p.velocity, p.target);
            }
            Pass::Advection(p) => {
                ensure_same(kind, p.source, p.target)?;
                core::advect(p.velocity, p.source, p.target, p.dt, p.dissipation);
            }
            Pass::Splat(p) => {
                ensure_same(kind, p.source, p.target)?;
                let value = p.value.to_array();
                core::splat(p.source, p.target, p.point, &value, p.radius, p.aspect_ratio);
            }
        }
        self.executed += 1;
        Ok(())
    }
}
