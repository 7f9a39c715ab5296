//! Render target handles.
//!
//! A handle describes a target without owning device memory. The registry
//! counts references and binds each handle to a live backend target at most
//! once, on first use.

mod desc;
mod registry;

pub use desc::{Origin, RenderTargetDesc};
pub use registry::{LiveTarget, LiveTargetId, RenderTargetHandle, TargetId, TargetRegistry};
