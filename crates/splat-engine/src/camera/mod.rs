//! Camera state and the input controller that drives it.

mod control;
mod view;

pub use control::{
    CameraControl,
    CaptureRequest,
    ControlMode,
    MovementKeys,
    MAX_DISTANCE,
    MIN_DISTANCE,
};
pub use view::{Camera, CameraUniform, WORLD_UP};
