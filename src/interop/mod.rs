//! Cross-allocator buffer interop
//!
//! This module is the reason this crate exists: viewing device memory that
//! belongs to a *different* allocator as an ordinary tensor, with both
//! sides agreeing on who keeps the memory alive and who eventually frees
//! it.
//!
//! The pieces:
//!
//! - [`ShareCounter`] / [`AtomicShareCount`]: the foreign allocator's
//!   reference count, as this crate sees it. Import retains one share,
//!   dropping the last view releases it; the count is only ever touched
//!   through scoped guards, so the pairs cannot be mismatched.
//! - [`import_foreign_buffer`] / [`import_foreign_contiguous`]: construct
//!   a tensor over a raw foreign device pointer plus shape/stride
//!   metadata, without copying.
//! - [`DeviceCapabilities`]: explicit, probe-once capability snapshot
//!   replacing process-global availability flags.
//! - [`DeviceExecutable`] with [`Binding`] and [`LaunchConfig`]: the shape
//!   of an externally-compiled kernel, for code that launches device
//!   functions over the same raw buffers.
//!
//! Releasing is dropping: there is no explicit release call. The share
//! taken at import is returned when the last tensor referencing the
//! imported storage goes out of scope, on every exit path. After that the
//! raw pointer means nothing to this crate anymore; using a copy of it is
//! the caller's contract violation, not a catchable error.

mod capabilities;
mod exec;
mod import;
pub(crate) mod share;

pub use capabilities::DeviceCapabilities;
pub use exec::{Binding, BindingDir, DeviceExecutable, LaunchConfig};
pub use import::{import_foreign_buffer, import_foreign_contiguous};
pub use share::{AtomicShareCount, ShareCounter};
