//! The polymorphic text-view handle.
//!
//! A [`TextView`] pairs framework-owned navigational state — the decoded
//! chunk window and iteration cursor — with a boxed [`Provider`] that knows
//! how to refill that window from whatever storage backs the text. Rust's
//! ownership model makes a manual corruption check structurally unreachable
//! (a `TextView` you can call methods on is, by construction, a valid one)
//! and lets the provider simply own its buffers behind a trait object
//! instead of living in caller-managed scratch memory — see `DESIGN.md` for
//! the reasoning.

use crate::provider::{flags, Provider};

/// The native-index/UTF-16 chunk window shared between the framework and a
/// provider's `access`/`replace`/`copy` implementations.
///
/// Invariants (hold before and after every public [`TextView`] call):
/// 1. `0 <= offset <= length`.
/// 2. `native_start <= native_limit <= native_length`.
/// 3. `native_indexing_limit <= length`.
/// 4. When `offset <= native_indexing_limit`, the native index of the cursor
///    is `native_start + offset`; otherwise it must be computed through
///    [`Provider::map_offset_to_native`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkState {
    /// Native index of the first unit represented in the chunk.
    pub native_start: i64,
    /// Native index one past the last unit represented in the chunk.
    pub native_limit: i64,
    /// Number of UTF-16 units in the chunk.
    pub length: i32,
    /// Cursor within the chunk, in UTF-16 units, `0..=length`.
    pub offset: i32,
    /// Largest chunk offset at which native index equals
    /// `native_start + offset` without consulting the provider's mapping.
    pub native_indexing_limit: i32,
}

impl ChunkState {
    /// The empty chunk: no data decoded, cursor at zero.
    pub const EMPTY: ChunkState = ChunkState {
        native_start: 0,
        native_limit: 0,
        length: 0,
        offset: 0,
        native_indexing_limit: 0,
    };

    /// Reset to empty. Used whenever a `replace`/`copy` mutates the backing
    /// store out from under the cached chunk, forcing the next navigation
    /// call to re-`access` and resynchronise the cursor.
    pub fn invalidate(&mut self) {
        *self = ChunkState::EMPTY;
    }
}

impl Default for ChunkState {
    fn default() -> Self {
        ChunkState::EMPTY
    }
}

/// A random-access iterator over text held by an arbitrary [`Provider`].
///
/// Obtain one via a provider's `open_*` constructor (see the `providers`
/// module), then drive it with the navigation methods in `framework.rs`:
/// [`TextView::next32`], [`TextView::previous32`], [`TextView::set_native_index`],
/// and friends.
pub struct TextView {
    pub(crate) provider: Box<dyn Provider>,
    pub(crate) chunk: ChunkState,
    /// Set by [`TextView::freeze`]; ANDed out of the provider's `WRITABLE`
    /// property. Cleared only by opening a fresh view.
    pub(crate) frozen: bool,
}

impl TextView {
    pub(crate) fn new(provider: Box<dyn Provider>) -> TextView {
        TextView {
            provider,
            chunk: ChunkState::EMPTY,
            frozen: false,
        }
    }

    /// Total length of the backing text in native units. May require a scan
    /// for NUL-terminated providers of unknown length (see
    /// `ProviderProperties::LENGTH_IS_EXPENSIVE`).
    pub fn native_length(&mut self) -> i64 {
        self.provider.native_length()
    }

    /// `true` if mutating calls are currently permitted.
    pub fn is_writable(&self) -> bool {
        !self.frozen && self.provider.properties() & flags::WRITABLE != 0
    }

    /// `true` if closing this view will release the backing buffer.
    pub fn owns_text(&self) -> bool {
        self.provider.properties() & flags::OWNS_TEXT != 0
    }

    /// `true` if [`TextView::native_length`] requires scanning for a
    /// terminator rather than a constant-time lookup.
    pub fn is_length_expensive(&self) -> bool {
        self.provider.properties() & flags::LENGTH_IS_EXPENSIVE != 0
    }

    /// `true` if the provider exposes supplementary per-character metadata
    /// (reserved for custom providers; none of the reference providers set
    /// this).
    pub fn has_meta_data(&self) -> bool {
        self.provider.properties() & flags::HAS_META_DATA != 0
    }

    /// Clear the `WRITABLE` property. Mutating operations fail thereafter;
    /// navigation is unaffected.
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    /// Shallow- or deep-clone this view.
    ///
    /// A shallow clone shares the backing store (never owns it, regardless
    /// of the source). A deep clone copies the backing store and sets
    /// `OWNS_TEXT` so the copy is released when the clone is closed.
    /// `read_only` freezes the result.
    pub fn clone_view(
        &self,
        deep: bool,
        read_only: bool,
    ) -> Result<TextView, crate::error::TextError> {
        let provider = self.provider.clone_provider(deep)?;
        let mut cloned = TextView::new(provider);
        if read_only {
            cloned.freeze();
        }
        Ok(cloned)
    }

    /// Close the view, giving the provider a chance to release any backing
    /// storage it owns. In Rust this is just `Drop`, but an explicit `close`
    /// spells out the two-phase teardown (provider teardown, then framework
    /// release) for callers that want it visible at the call site.
    pub fn close(mut self) {
        self.provider.close();
    }
}
