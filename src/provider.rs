//! The provider interface: virtual operations every backing store must
//! supply, plus the property flags that describe its capabilities.
//!
//! `dyn Trait` gives us a real vtable for free, so the reference providers
//! in the `providers` module each implement [`Provider`] directly and are
//! boxed into a [`crate::view::TextView`] at `open` time. Downstream crates
//! can plug in their own storage (pipes, paged files, ropes) the same way:
//! implement [`Provider`], hand a `Box<dyn Provider>` to
//! [`crate::view::TextView`]'s crate-internal constructor via a thin
//! `open_*` wrapper of their own.

use crate::error::{TextError, TextWarning};
use crate::view::ChunkState;

/// Provider property bits.
pub mod flags {
    /// Mutating operations (`replace`, `copy`) are permitted.
    pub const WRITABLE: u32 = 1 << 0;
    /// The view owns its backing buffer and releases it on close.
    pub const OWNS_TEXT: u32 = 1 << 1;
    /// `native_length` is unknown and requires a scan (NUL-terminated input).
    pub const LENGTH_IS_EXPENSIVE: u32 = 1 << 2;
    /// The whole string fits in one chunk, so the chunk never changes once
    /// loaded.
    pub const STABLE_CHUNKS: u32 = 1 << 3;
    /// The provider exposes per-character metadata beyond plain text.
    pub const HAS_META_DATA: u32 = 1 << 4;
}

/// Outcome of a successful [`Provider::extract`] call.
///
/// Follows a preflighting convention: the full transcoded `length` is always
/// reported, even when it exceeds the destination, so a caller can call once
/// with an empty buffer to size an allocation and again to fill it.
/// `overflowed` distinguishes that case (a real capacity problem) from the
/// softer `warning`, where the text fit exactly but there was no room left
/// for a trailing NUL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOutcome {
    /// Full length, in UTF-16 units, of the transcoded `[start, limit)` range.
    pub length: i64,
    /// Units actually written into the destination buffer (`<= dst.len()`).
    pub written: usize,
    /// `true` iff `length as usize > dst.len()`: the destination was too
    /// small to hold the transcoded range.
    pub overflowed: bool,
    pub warning: Option<TextWarning>,
}

/// Encoding-specific backend plugged in behind a [`crate::view::TextView`].
///
/// All native-unit ranges are half-open `[start, limit)`. Implementations
/// must never panic on malformed input; malformed encoding units are
/// replaced with U+FFFD (or surfaced as an isolated surrogate, for UTF-16)
/// rather than rejected.
pub trait Provider {
    /// Current provider property bits (see the [`flags`] module).
    fn properties(&self) -> u32;

    /// Total length of the backing store in native units. Providers with
    /// `LENGTH_IS_EXPENSIVE` set must scan for a terminator here (and should
    /// clear the flag once the true length is known).
    fn native_length(&mut self) -> i64;

    /// Load the chunk window containing `native_index`, on the side
    /// indicated by `forward`, and position the cursor there. Returns `true`
    /// iff more data exists in that direction.
    fn access(&mut self, chunk: &mut ChunkState, native_index: i64, forward: bool) -> bool;

    /// The UTF-16 units of the currently active chunk. Indexing this with
    /// `chunk.offset` yields the unit under the cursor.
    fn chunk_units(&self, chunk: &ChunkState) -> &[u16];

    /// Copy the transcoded `[start, limit)` range into `dst`. See
    /// [`ExtractOutcome`] for how overflow is reported.
    fn extract(
        &mut self,
        chunk: &mut ChunkState,
        start: i64,
        limit: i64,
        dst: &mut [u16],
    ) -> Result<ExtractOutcome, TextError>;

    /// Replace `[start, limit)` with `src`, returning the length delta in
    /// native units. Default implementation rejects all writes; providers
    /// that support editing override this.
    fn replace(
        &mut self,
        _chunk: &mut ChunkState,
        _start: i64,
        _limit: i64,
        _src: &[u16],
    ) -> Result<i64, TextError> {
        Err(TextError::NoWritePermission)
    }

    /// Copy (`mv=false`) or move (`mv=true`) `[start, limit)` to `dest`.
    /// Default implementation rejects all writes.
    fn copy(
        &mut self,
        _chunk: &mut ChunkState,
        _start: i64,
        _limit: i64,
        _dest: i64,
        _mv: bool,
    ) -> Result<(), TextError> {
        Err(TextError::NoWritePermission)
    }

    /// Native index of the cursor when `chunk.offset > chunk.native_indexing_limit`.
    /// The direct-arithmetic fast path (`native_start + offset`) covers every
    /// reference provider when this condition doesn't hold, so the default
    /// body is only reached for variable-width providers past their
    /// indexing limit, and must be overridden by those.
    fn map_offset_to_native(&self, chunk: &ChunkState) -> i64 {
        chunk.native_start + chunk.offset as i64
    }

    /// Chunk offset corresponding to `native_index`, which must lie inside
    /// the current chunk. Identity mapping by default (suitable for
    /// fixed-width providers).
    fn map_native_to_utf16(&self, chunk: &ChunkState, native_index: i64) -> i32 {
        (native_index - chunk.native_start) as i32
    }

    /// Produce an independent clone. `deep` copies the backing store and
    /// sets `OWNS_TEXT`; a shallow clone shares it (and never owns it).
    fn clone_provider(&self, deep: bool) -> Result<Box<dyn Provider>, TextError>;

    /// Provider-specific teardown, called before the view's own state is
    /// dropped. Only providers that own their backing buffer need to do
    /// anything here.
    fn close(&mut self) {}
}
