//! Real-time 2D incompressible fluid driven by pointer splats.
//!
//! [`Simulation`] owns the velocity, pressure and dye grids and advances them
//! with a stable-fluids pass pipeline. Hosts feed pointer events and a display
//! size, call [`Simulation::tick`] once per frame and draw [`Simulation::dye`].

pub mod color;
pub mod config;
pub mod error;
pub mod grid;
pub mod input;
pub mod renderer;
pub mod resolution;
pub mod sim;
pub mod solver;
pub mod state;

pub use error::{SimError, SimResult};
pub use sim::Simulation;
pub use solver::{Impulse, Rgb, SimConfig};
