//! Contract between the runtime and the application.
//!
//! The runtime owns the window, the GPU context and the event loop; the
//! application sees them only through [`FrameCtx`] inside [`App`] callbacks.

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::{FrameCtx, FrameOutcome, WindowCtx};
