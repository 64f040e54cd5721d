use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::FrameError;

/// Limits the renderer to one frame in flight.
///
/// The frame's buffers are reused every frame, so a new frame must not be
/// recorded while the GPU may still be reading the previous one.
#[derive(Debug, Clone, Default)]
pub struct FrameGate {
    in_flight: Arc<AtomicBool>,
}

impl FrameGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Marks the last submission as in flight until the queue reports it done.
    ///
    /// Call right after `Queue::submit`.
    pub fn frame_submitted(&self, queue: &wgpu::Queue) {
        self.mark_in_flight();
        let flag = Arc::clone(&self.in_flight);
        queue.on_submitted_work_done(move || flag.store(false, Ordering::Release));
    }

    /// Blocks until the previous frame is complete.
    pub fn wait(&self, device: &wgpu::Device) -> Result<(), FrameError> {
        if !self.is_in_flight() {
            return Ok(());
        }

        log::trace!("previous frame still in flight; waiting");
        device.poll(wgpu::PollType::wait_indefinitely())?;
        self.mark_complete();
        Ok(())
    }

    fn mark_in_flight(&self) {
        self.in_flight.store(true, Ordering::Release);
    }

    fn mark_complete(&self) {
        self.in_flight.store(false, Ordering::Release);
    }
}
