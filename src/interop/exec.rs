//! External device executable interface
//!
//! Kernel compilation and launch belong to external toolchains; this crate
//! only needs a shape for "call that thing with these buffers". An
//! externally-built kernel implements [`DeviceExecutable`] and receives
//! named buffer bindings plus a launch geometry. The buffers are
//! [`RawBuffer`]s - plain pointer/length/dtype triples, so imported foreign
//! buffers and runtime-owned storage bind identically.

use crate::error::Result;
use crate::tensor::RawBuffer;

/// Kernel launch geometry, in the external launcher's terms
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LaunchConfig {
    /// Grid dimensions (number of blocks)
    pub grid: (u32, u32, u32),
    /// Block dimensions (threads per block)
    pub block: (u32, u32, u32),
}

impl LaunchConfig {
    /// One-dimensional launch: a single grid row of `threads` threads
    pub const fn linear(threads: u32) -> Self {
        Self {
            grid: (1, 1, 1),
            block: (threads, 1, 1),
        }
    }

    /// Total number of threads this configuration launches
    pub const fn thread_count(&self) -> usize {
        (self.grid.0 as usize * self.grid.1 as usize * self.grid.2 as usize)
            * (self.block.0 as usize * self.block.1 as usize * self.block.2 as usize)
    }
}

/// Direction of a buffer binding
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BindingDir {
    /// The executable reads from this buffer
    In,
    /// The executable writes to this buffer
    Out,
}

/// A named buffer argument for a device executable
#[derive(Copy, Clone, Debug)]
pub struct Binding<'a> {
    /// Parameter name as the executable knows it
    pub name: &'a str,
    /// The bound buffer
    pub buffer: RawBuffer,
    /// Whether the executable reads or writes the buffer
    pub dir: BindingDir,
}

impl<'a> Binding<'a> {
    /// Bind an input buffer
    pub const fn input(name: &'a str, buffer: RawBuffer) -> Self {
        Self {
            name,
            buffer,
            dir: BindingDir::In,
        }
    }

    /// Bind an output buffer
    pub const fn output(name: &'a str, buffer: RawBuffer) -> Self {
        Self {
            name,
            buffer,
            dir: BindingDir::Out,
        }
    }
}

/// An externally-compiled device function
///
/// The implementation owns compilation, argument marshalling, and the
/// actual dispatch; callers only provide bindings and geometry. Results
/// are observed through the bound output buffers after `launch` returns
/// (the implicit-synchronization model: each launch is complete when the
/// call comes back).
pub trait DeviceExecutable {
    /// Run the executable over the given buffer bindings
    fn launch(&self, bindings: &[Binding<'_>], config: &LaunchConfig) -> Result<()>;
}
