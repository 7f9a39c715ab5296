//! Marduk GPU op layer.
//!
//! Draw calls are recorded as ops into per-target op lists, merged where that
//! cannot change the result, and submitted to a [`backend::Backend`] at flush.

pub mod backend;
pub mod caps;
pub mod context;
pub mod coords;
pub mod error;
pub mod logging;
pub mod manager;
pub mod op_list;
pub mod ops;
pub mod paint;
pub mod shape;
pub mod stats;
pub mod target;

pub use context::{DrawContext, DrawContextId, GpuContext};
pub use stats::GpuStats;
