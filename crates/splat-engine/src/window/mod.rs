//! Window and event loop.
//!
//! Owns the `winit` event loop and window and wires them to the GPU layer.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig};
