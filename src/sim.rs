use glam::DVec2;
use rand::Rng;

use crate::error::{SimError, SimResult};
use crate::grid::Grid;
use crate::input::Pointers;
use crate::resolution::{aspect_of, Resolutions};
use crate::solver::{self, CpuKernels, Impulse, Kernels, SimConfig};
use crate::state::SimState;

/// Owning handle for a running fluid simulation.
///
/// Config and display-target changes are queued and applied at the start of
/// the next [`tick`](Simulation::tick), never mid-step. Call
/// [`dispose`](Simulation::dispose) to release the grids early; dropping the
/// handle does the same.
pub struct Simulation<K: Kernels = CpuKernels> {
    config: SimConfig,
    pending_config: Option<SimConfig>,
    target: Option<(usize, usize)>,
    /// Aspect of the last usable target; survives the target going away.
    aspect: f64,
    pending_target: Option<Option<(usize, usize)>>,
    state: Option<SimState>,
    pointers: Pointers,
    kernels: K,
}

impl Simulation<CpuKernels> {
    pub fn new(config: SimConfig, target: Option<(usize, usize)>) -> SimResult<Self> {
        Self::with_kernels(config, target, CpuKernels::new())
    }
}

impl<K: Kernels> Simulation<K> {
    pub fn with_kernels(config: SimConfig, target: Option<(usize, usize)>, kernels: K) -> SimResult<Self> {
        if config.sim_resolution == 0 {
            return Err(SimError::InvalidResolution { which: "sim", value: 0 });
        }
        if config.dye_resolution == 0 {
            return Err(SimError::InvalidResolution { which: "dye", value: 0 });
        }
        let aspect = aspect_of(target);
        let res = Resolutions::for_aspect(aspect, &config);
        log::info!("simulation grid {:?}, dye grid {:?}", res.sim, res.dye);
        Ok(Self {
            config,
            pending_config: None,
            target,
            aspect,
            pending_target: None,
            state: Some(SimState::new(res)),
            pointers: Pointers::new(),
            kernels,
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Queue a new config snapshot for the next tick.
    pub fn set_config(&mut self, config: SimConfig) {
        self.pending_config = Some(config);
    }

    /// Queue a display-target size change (`None` when nothing is displayed).
    pub fn set_target_size(&mut self, target: Option<(usize, usize)>) {
        self.pending_target = Some(target);
    }

    pub fn target_size(&self) -> Option<(usize, usize)> {
        self.target
    }

    pub fn kernels(&self) -> &K {
        &self.kernels
    }

    pub fn pointers(&self) -> &Pointers {
        &self.pointers
    }

    pub fn pointer_down<R: Rng + ?Sized>(&mut self, id: i32, texcoord: DVec2, rng: &mut R) {
        self.pointers.down(id, texcoord, rng);
    }

    pub fn pointer_move(&mut self, id: i32, texcoord: DVec2) {
        self.pointers.move_to(id, texcoord);
    }

    pub fn pointer_up(&mut self, id: i32) {
        self.pointers.up(id);
    }

    /// Width / height of the display target the grids are sized for.
    pub fn aspect_ratio(&self) -> f64 {
        self.aspect
    }

    pub fn resolutions(&self) -> SimResult<Resolutions> {
        self.state.as_ref().map(SimState::resolutions).ok_or(SimError::Disposed)
    }

    /// Current dye read view, for display.
    pub fn dye(&self) -> SimResult<&Grid> {
        self.state.as_ref().map(|s| s.dye.read()).ok_or(SimError::Disposed)
    }

    /// Current velocity read view, for debug display.
    pub fn velocity(&self) -> SimResult<&Grid> {
        self.state.as_ref().map(|s| s.velocity.read()).ok_or(SimError::Disposed)
    }

    pub fn splat(&mut self, impulse: Impulse) -> SimResult<()> {
        let aspect = self.aspect_ratio();
        let state = self.state.as_mut().ok_or(SimError::Disposed)?;
        solver::splat(state, &mut self.kernels, &self.config, aspect, impulse)
    }

    pub fn multiple_splats<R: Rng + ?Sized>(&mut self, amount: usize, rng: &mut R) -> SimResult<()> {
        let aspect = self.aspect_ratio();
        let state = self.state.as_mut().ok_or(SimError::Disposed)?;
        solver::multiple_splats(state, &mut self.kernels, &self.config, aspect, amount, rng)
    }

    /// Run one full tick: pending resize, pointer splats, color update, step.
    ///
    /// An error leaves the fields in an undefined state; recreate the
    /// simulation rather than ticking it again.
    pub fn tick<R: Rng + ?Sized>(&mut self, dt: f64, rng: &mut R) -> SimResult<()> {
        if self.state.is_none() {
            return Err(SimError::Disposed);
        }
        self.apply_pending();

        if !self.config.paused || self.config.splat_while_paused {
            self.apply_inputs()?;
        }
        self.pointers.update_colors(dt, &self.config, rng);

        if self.config.paused {
            return Ok(());
        }
        let state = self.state.as_mut().ok_or(SimError::Disposed)?;
        solver::fluid_step(state, &mut self.kernels, &self.config, dt)
    }

    /// Splat every pointer that moved since the last tick.
    fn apply_inputs(&mut self) -> SimResult<()> {
        for impulse in self.pointers.take_impulses(self.config.splat_force) {
            self.splat(impulse)?;
        }
        Ok(())
    }

    fn apply_pending(&mut self) {
        let mut resize = false;
        if let Some(config) = self.pending_config.take() {
            resize |= config.resolution_changed(&self.config);
            self.config = config;
        }
        if let Some(target) = self.pending_target.take() {
            match target {
                Some(size) if Some(size) != self.target => {
                    self.target = Some(size);
                    if size.0 > 0 && size.1 > 0 {
                        let aspect = aspect_of(Some(size));
                        resize |= aspect != self.aspect;
                        self.aspect = aspect;
                    }
                }
                Some(_) => {}
                // Nothing to display: keep the current grids and keep stepping.
                None => self.target = None,
            }
        }
        if !resize {
            return;
        }
        let res = Resolutions::for_aspect(self.aspect, &self.config);
        if let Some(state) = self.state.as_mut() {
            if state.resize(res) {
                log::info!("resized simulation grid {:?}, dye grid {:?}", res.sim, res.dye);
            } else {
                log::debug!("resize request left grids unchanged");
            }
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.state.is_none()
    }

    /// Release every grid. Safe to call more than once.
    pub fn dispose(&mut self) {
        if let Some(mut state) = self.state.take() {
            state.dispose();
            log::info!("simulation disposed");
        }
    }
}

impl<K: Kernels> Drop for Simulation<K> {
    fn drop(&mut self) {
        self.dispose();
    }
}
