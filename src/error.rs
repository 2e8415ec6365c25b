//! Error and warning taxonomy for text-view operations.

use thiserror::Error;

/// A hard failure from a text-view operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TextError {
    /// Null buffer with non-zero length, `start > limit`, or a replacement
    /// source that aliases the backing buffer.
    #[error("illegal argument")]
    IllegalArgument,
    /// `start > limit` in `copy`/`replace`, or the destination range in
    /// `copy` overlaps `[start, limit)`.
    #[error("index out of bounds")]
    IndexOutOfBounds,
    /// A mutating edit would exceed the backing buffer's capacity, or an
    /// `extract` destination is too small to hold the transcoded range.
    #[error("buffer overflow")]
    BufferOverflow,
    /// A mutating call was made on a view that is not `WRITABLE` (including
    /// views that have been frozen).
    #[error("no write permission")]
    NoWritePermission,
    /// A provider failed to allocate storage for `setup` or `clone`.
    #[error("memory allocation failed")]
    MemoryAllocation,
}

/// A non-fatal condition raised alongside a still-valid primary result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TextWarning {
    /// `extract` filled the destination exactly; there was no room left for
    /// a trailing NUL.
    #[error("string not terminated")]
    StringNotTerminated,
}
