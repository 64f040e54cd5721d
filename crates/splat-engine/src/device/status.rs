use std::sync::{Arc, Mutex};

/// Shared record of device loss.
///
/// wgpu reports loss through a callback that may fire on any thread; the
/// renderer polls this record at the start of each frame and turns a loss into
/// a `FrameError` instead of recording commands against a dead device.
#[derive(Debug, Clone, Default)]
pub struct DeviceStatus {
    lost: Arc<Mutex<Option<String>>>,
}

impl DeviceStatus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a status record and registers it as the device-lost callback.
    ///
    /// A device has a single lost callback; installing another replaces this one.
    pub fn install(device: &wgpu::Device) -> Self {
        let status = Self::new();
        let record = status.clone();
        device.set_device_lost_callback(move |reason, message| {
            log::error!("GPU device lost ({reason:?}): {message}");
            record.mark_lost(format!("{reason:?}: {message}"));
        });
        status
    }

    /// Records a loss. The first reason wins.
    pub fn mark_lost(&self, reason: impl Into<String>) {
        let mut lost = self.lost.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if lost.is_none() {
            *lost = Some(reason.into());
        }
    }

    /// Returns the loss reason, if the device has been lost.
    pub fn lost_reason(&self) -> Option<String> {
        self.lost
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}
