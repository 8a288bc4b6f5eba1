//! Utility Module
//!
//! - [`OrbitControls`]: interactive drag-to-orbit / scroll-to-zoom camera
//!   controller with damping
//! - [`FpsCounter`]: frame rate measurement for the window title readout
//! - [`time`]: frame timing

pub mod fps_counter;
pub mod orbit_control;
pub mod time;

pub use fps_counter::FpsCounter;
pub use orbit_control::OrbitControls;
pub use time::Timer;
