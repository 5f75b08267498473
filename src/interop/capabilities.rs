//! Device capability probing
//!
//! Instead of a mutable process-wide "is the device available" flag,
//! capabilities are probed once into an explicit value and passed to
//! whatever needs them. Code that would have checked a global receives a
//! `&DeviceCapabilities` parameter instead.

use crate::runtime::{Device, Runtime};

/// Snapshot of what a runtime and device can do
///
/// Probe once at startup, pass by reference. The snapshot is plain data -
/// cloning it or sending it across threads carries no hidden state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceCapabilities {
    runtime: &'static str,
    device_id: usize,
    foreign_import: bool,
}

impl DeviceCapabilities {
    /// Probe the capabilities of a runtime on a specific device
    pub fn probe<R: Runtime>(device: &R::Device) -> Self {
        Self {
            runtime: R::name(),
            device_id: device.id(),
            foreign_import: R::supports_foreign_import(),
        }
    }

    /// Name of the probed runtime (e.g. "cpu")
    pub fn runtime(&self) -> &'static str {
        self.runtime
    }

    /// Identifier of the probed device
    pub fn device_id(&self) -> usize {
        self.device_id
    }

    /// Whether foreign raw-pointer buffers can be imported on this backend
    pub fn supports_foreign_import(&self) -> bool {
        self.foreign_import
    }
}
