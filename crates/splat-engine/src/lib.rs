//! Splat engine crate.
//!
//! Platform + GPU runtime pieces for the Gaussian-splat viewer: the window
//! loop, input translation, camera control and the splat renderer.

pub mod device;
pub mod window;
pub mod input;
pub mod core;

pub mod logging;
pub mod camera;
pub mod render;
pub mod scene;
