//! GPU rendering subsystem.
//!
//! [`GaussianRenderer`] turns a [`PointCloud`](crate::scene::PointCloud) and
//! the camera uniform into one frame: preprocess, depth sort, indirect draw.
//! Depth sorting sits behind the [`Sorter`] trait.

mod ctx;
mod error;
mod gate;
mod gaussian;
mod schedule;
pub mod sort;

pub use ctx::{RenderCtx, RenderTarget};
pub use error::{BuildError, FrameError};
pub use gate::FrameGate;
pub use gaussian::{GaussianRenderer, RenderSettings, SplatRecord};
pub use schedule::{
    frame_schedule,
    workgroups_for,
    DrawIndirectArgs,
    FrameStage,
    VERTICES_PER_SPLAT,
    WORKGROUP_SIZE,
};
pub use sort::{BitonicSorter, SortBuffers, SortSlot, Sorter};
