//! Error types surfaced by the op layer.
//!
//! Recoverable failures (unsupported configuration, unsupported pixel formats,
//! lost backend) are values. Broken internal invariants are debug assertions.

use crate::caps::PixelFormat;

/// Failure reported by a [`Backend`](crate::backend::Backend).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    #[error("backend context was abandoned")]
    Abandoned,

    #[error("backend ran out of device memory")]
    OutOfMemory,

    #[error("operation unsupported by backend: {0}")]
    Unsupported(&'static str),

    #[error("unknown live render target")]
    UnknownTarget,
}

/// Why a render target handle could not be backed by a live target.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InstantiateError {
    #[error("pixel format {0:?} is not renderable")]
    UnsupportedFormat(PixelFormat),

    #[error("sample count {count} unsupported for {format:?}")]
    UnsupportedSampleCount { format: PixelFormat, count: u32 },

    #[error("{width}x{height} exceeds the maximum render target size {max}")]
    TooLarge { width: u32, height: u32, max: u32 },

    #[error("stencil sample count {stencil} is below color sample count {color}")]
    InvalidStencilSamples { color: u32, stencil: u32 },

    #[error("render target handle no longer exists")]
    UnknownHandle,

    #[error("backend context was abandoned")]
    Abandoned,

    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Why a pixel read or write was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PixelIoError {
    #[error("backend context was abandoned")]
    Abandoned,

    #[error("cannot transfer {requested:?} pixels to or from a {target:?} target without loss")]
    UnsupportedFormat { requested: PixelFormat, target: PixelFormat },

    #[error("row bytes {row_bytes} below the minimum {min}")]
    RowBytesTooSmall { row_bytes: usize, min: usize },

    #[error("buffer holds {len} bytes, {needed} needed")]
    BufferTooSmall { len: usize, needed: usize },

    #[error("requested rectangle does not intersect the target")]
    OutOfBounds,

    #[error("render target could not be instantiated: {0}")]
    Instantiate(#[from] InstantiateError),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Returned when appending to an op list that has left the `Open` state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("op list is closed")]
pub struct OpListClosed;
