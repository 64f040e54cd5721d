//! GPU device and window surface.
//!
//! [`Gpu`] owns the wgpu device, queue and the window's swapchain. Frames are
//! acquired as [`GpuFrame`]s and handed back for submission. Device loss is
//! recorded in a shared [`DeviceStatus`] so renderers can report it.

mod gpu;
mod init;
mod status;
mod surface;

pub use gpu::Gpu;
pub use init::GpuInit;
pub use status::DeviceStatus;
pub use surface::{GpuFrame, SurfaceErrorAction};
