//! UTF-16 provider: the backing store already holds the chunk's native
//! encoding, so `access` never decodes — it only ever points the chunk
//! window at a sub-slice of the backing buffer.
//!
//! Chunk size is 32 UTF-16 units with a 2-unit tolerance so a chunk
//! boundary can always be nudged clear of a surrogate pair.

use std::rc::Rc;

use crate::error::{TextError, TextWarning};
use crate::provider::{flags, ExtractOutcome, Provider};
use crate::surrogate::is_trail;
use crate::util::pin_index;
use crate::view::{ChunkState, TextView};

const CHUNK_SIZE: i64 = 32;
const CHUNK_TOLERANCE: i64 = 2;

enum Backing {
    /// Read-only, reference-counted so shallow clones are cheap.
    Shared(Rc<[u16]>),
    /// Exclusively owned; required for a writable view, since safely sharing
    /// mutable access across clones would need either `unsafe` aliasing or
    /// runtime borrow checks this port avoids (see `DESIGN.md`).
    Owned(Vec<u16>),
}

impl Backing {
    fn as_slice(&self) -> &[u16] {
        match self {
            Backing::Shared(s) => s,
            Backing::Owned(v) => v,
        }
    }

    fn as_mut_slice(&mut self) -> &mut [u16] {
        match self {
            Backing::Owned(v) => v,
            Backing::Shared(_) => unreachable!("mutating a read-only UTF-16 backing"),
        }
    }
}

/// Provider over a contiguous UTF-16 buffer.
pub struct Utf16Provider {
    backing: Backing,
    /// Logical content length in UTF-16 units; may still need resolving via
    /// a NUL scan if `LENGTH_IS_EXPENSIVE` is set.
    length: i64,
    properties: u32,
}

impl Utf16Provider {
    fn capacity(&self) -> i64 {
        self.backing.as_slice().len() as i64
    }

    fn text(&self) -> &[u16] {
        self.backing.as_slice()
    }

    fn unit(&self, i: i64) -> u16 {
        self.text()[i as usize]
    }

    /// Resolve a NUL-terminated length eagerly, scanning at most to the
    /// backing's capacity.
    fn resolve_length(&mut self) {
        if self.properties & flags::LENGTH_IS_EXPENSIVE != 0 {
            let cap = self.capacity();
            let mut len = self.length.min(cap);
            let text = self.backing.as_slice();
            while len < cap && text[len as usize] != 0 {
                len += 1;
            }
            self.length = len;
            self.properties &= !flags::LENGTH_IS_EXPENSIVE;
            if self.length >= CHUNK_SIZE {
                self.properties &= !flags::STABLE_CHUNKS;
            }
        }
    }

    fn new_provider(backing: Backing, length: Option<i64>, writable: bool) -> Utf16Provider {
        let expensive = length.is_none();
        let len0 = length.unwrap_or(0).max(0);
        let mut properties = 0u32;
        if expensive {
            properties |= flags::LENGTH_IS_EXPENSIVE;
        }
        if expensive || len0 < CHUNK_SIZE {
            properties |= flags::STABLE_CHUNKS;
        }
        if writable {
            properties |= flags::WRITABLE;
        }
        Utf16Provider {
            backing,
            length: len0,
            properties,
        }
    }
}

/// Open a read-only view over `units`. `length = None` means NUL-terminated,
/// unknown length.
pub fn open_const_u16(units: Vec<u16>, length: Option<i64>) -> TextView {
    let provider = Utf16Provider::new_provider(Backing::Owned(units), length, false);
    TextView::new(Box::new(provider))
}

/// Open a writable view over `units`; `units.len()` is the fixed edit
/// capacity.
pub fn open_u16(units: Vec<u16>, length: Option<i64>) -> TextView {
    let length = match length {
        Some(l) => Some(l),
        None => {
            let mut l = 0i64;
            while (l as usize) < units.len() && units[l as usize] != 0 {
                l += 1;
            }
            Some(l)
        }
    };
    let provider = Utf16Provider::new_provider(Backing::Owned(units), length, true);
    TextView::new(Box::new(provider))
}

/// Open a read-only view over a fully-known-length `units` buffer, with an
/// unbounded edit capacity (read-only, so no capacity is ever consulted).
pub fn open_uchars(units: Vec<u16>, length: i64) -> TextView {
    open_const_u16(units, Some(length))
}

impl Provider for Utf16Provider {
    fn properties(&self) -> u32 {
        self.properties
    }

    fn native_length(&mut self) -> i64 {
        self.resolve_length();
        self.length
    }

    fn access(&mut self, chunk: &mut ChunkState, native_index: i64, forward: bool) -> bool {
        self.resolve_length();
        let len = self.length;
        let requested = native_index;

        let mut snapped = pin_index(native_index, i64::MAX);
        if snapped >= len {
            snapped = len;
        } else {
            while snapped > 0 && is_trail(self.unit(snapped)) {
                snapped -= 1;
            }
        }

        let mut start;
        let mut limit;
        let mut update_chunk = false;
        if snapped >= chunk.native_start && snapped <= chunk.native_limit {
            if forward && snapped <= len {
                let mut chunk_limit = snapped;
                while chunk_limit < len && is_trail(self.unit(chunk_limit)) {
                    chunk_limit += 1;
                }
                start = (chunk_limit / CHUNK_SIZE) * CHUNK_SIZE;
                limit = pin_index((chunk_limit / CHUNK_SIZE + 2) * CHUNK_SIZE, len);
                update_chunk = true;
            } else if !forward && snapped > 0 {
                let mut chunk_start = snapped;
                while chunk_start > 0 && is_trail(self.unit(chunk_start)) {
                    chunk_start -= 1;
                }
                let offset = if (chunk_start % CHUNK_SIZE) > CHUNK_TOLERANCE {
                    1
                } else {
                    0
                };
                limit = pin_index((chunk_start / CHUNK_SIZE + 1 + offset) * CHUNK_SIZE, len);
                start = pin_index((chunk_start / CHUNK_SIZE - 1 + offset) * CHUNK_SIZE, len);
                update_chunk = true;
            } else {
                start = chunk.native_start;
                limit = chunk.native_limit;
            }
        } else if forward {
            start = (snapped / CHUNK_SIZE) * CHUNK_SIZE;
            limit = pin_index((snapped / CHUNK_SIZE + 2) * CHUNK_SIZE, len);
            update_chunk = true;
        } else {
            start = pin_index((snapped / CHUNK_SIZE - 1) * CHUNK_SIZE, len);
            limit = pin_index((snapped / CHUNK_SIZE + 1) * CHUNK_SIZE, len);
            update_chunk = true;
        }

        if update_chunk {
            while start > 0 && is_trail(self.unit(start)) {
                start -= 1;
            }
            while limit < len && is_trail(self.unit(limit)) {
                limit += 1;
            }
            tracing::trace!(start, limit, "utf16 chunk reload");
            chunk.native_start = start;
            chunk.native_limit = limit;
            chunk.length = (limit - start) as i32;
            chunk.native_indexing_limit = chunk.length;
        }

        chunk.offset = (pin_index(requested, len) - chunk.native_start) as i32;

        (forward && snapped < len) || (!forward && snapped > 0)
    }

    fn chunk_units(&self, chunk: &ChunkState) -> &[u16] {
        &self.text()[chunk.native_start as usize..chunk.native_limit as usize]
    }

    fn extract(
        &mut self,
        chunk: &mut ChunkState,
        start: i64,
        limit: i64,
        dst: &mut [u16],
    ) -> Result<ExtractOutcome, TextError> {
        if start > limit {
            return Err(TextError::IllegalArgument);
        }
        self.resolve_length();
        let len = self.length;
        let mut native_start = pin_index(start, len);
        while native_start > 0 && is_trail(self.unit(native_start)) {
            native_start -= 1;
        }
        let native_limit = pin_index(limit, len);

        let cap = dst.len() as i64;
        let mut si = native_start;
        let mut di: i64 = 0;
        while si < native_limit {
            if di < cap {
                dst[di as usize] = self.unit(si);
            }
            si += 1;
            di += 1;
        }
        if si > 0
            && si < len
            && crate::surrogate::is_lead(self.unit(si - 1))
            && is_trail(self.unit(si))
        {
            if di < cap {
                dst[di as usize] = self.unit(si);
            }
            di += 1;
            si += 1;
        }

        self.access(chunk, si, true);

        let overflowed = di > cap;
        let warning = if !overflowed && di == cap {
            Some(TextWarning::StringNotTerminated)
        } else {
            None
        };
        Ok(ExtractOutcome {
            length: di,
            written: di.min(cap).max(0) as usize,
            overflowed,
            warning,
        })
    }

    fn replace(
        &mut self,
        chunk: &mut ChunkState,
        start: i64,
        limit: i64,
        src: &[u16],
    ) -> Result<i64, TextError> {
        if start > limit {
            return Err(TextError::IndexOutOfBounds);
        }
        self.resolve_length();
        let len = self.length;
        let native_start = pin_index(start, len);
        let native_limit = pin_index(limit, len);
        let repl_len = src.len() as i64;
        let diff = repl_len - (native_limit - native_start);
        if len + diff > self.capacity() {
            tracing::warn!(len, diff, capacity = self.capacity(), "utf16 replace overflow");
            return Err(TextError::BufferOverflow);
        }

        {
            let backing = self.backing.as_mut_slice();
            if native_limit - native_start < repl_len {
                let mut i = len + diff - 1;
                while i >= native_start + repl_len {
                    backing[i as usize] = backing[(i - diff) as usize];
                    i -= 1;
                }
                while i >= native_start {
                    backing[i as usize] = src[(i - native_start) as usize];
                    i -= 1;
                }
            } else {
                let mut i = native_start;
                while i < native_start + repl_len {
                    backing[i as usize] = src[(i - native_start) as usize];
                    i += 1;
                }
                while i < len + diff {
                    backing[i as usize] = backing[(i - diff) as usize];
                    i += 1;
                }
            }
        }

        if repl_len > 0 || native_limit > native_start {
            self.length += diff;
            if self.length < self.capacity() {
                let new_len = self.length;
                self.backing.as_mut_slice()[new_len as usize] = 0;
            }
            chunk.invalidate();
            self.access(chunk, native_limit + diff, true);
        }
        self.properties &= !flags::STABLE_CHUNKS;
        Ok(diff)
    }

    fn copy(
        &mut self,
        chunk: &mut ChunkState,
        start: i64,
        limit: i64,
        dest: i64,
        mv: bool,
    ) -> Result<(), TextError> {
        if start > limit {
            return Err(TextError::IndexOutOfBounds);
        }
        self.resolve_length();
        let len = self.length;
        let native_start = pin_index(start, len);
        let native_limit = pin_index(limit, len);
        let native_dest = pin_index(dest, len);
        if native_dest > native_start && native_dest < native_limit {
            return Err(TextError::IndexOutOfBounds);
        }
        let block_len = native_limit - native_start;
        let native_index;

        if mv {
            if block_len > 0 {
                let backing = self.backing.as_mut_slice();
                if native_dest < native_start {
                    backing[native_dest as usize..native_limit as usize]
                        .rotate_right(block_len as usize);
                } else if native_dest > native_limit {
                    backing[native_start as usize..native_dest as usize]
                        .rotate_left(block_len as usize);
                }
            }
            native_index = if native_dest < native_start {
                native_dest + block_len
            } else {
                native_dest
            };
        } else {
            if len + block_len > self.capacity() {
                return Err(TextError::BufferOverflow);
            }
            if block_len > 0 {
                let block: Vec<u16> = self.text()[native_start as usize..native_limit as usize].to_vec();
                let backing = self.backing.as_mut_slice();
                let mut i = len + block_len - 1;
                while i >= native_dest + block_len {
                    backing[i as usize] = backing[(i - block_len) as usize];
                    i -= 1;
                }
                for (k, &u) in block.iter().enumerate() {
                    backing[native_dest as usize + k] = u;
                }
                self.length += block_len;
            }
            native_index = native_dest + block_len;
        }

        chunk.invalidate();
        self.access(chunk, native_index, true);
        self.properties &= !flags::STABLE_CHUNKS;
        Ok(())
    }

    fn clone_provider(&self, deep: bool) -> Result<Box<dyn Provider>, TextError> {
        let writable = self.properties & flags::WRITABLE != 0;
        let backing = if deep || writable {
            Backing::Owned(self.text().to_vec())
        } else {
            match &self.backing {
                Backing::Shared(rc) => Backing::Shared(Rc::clone(rc)),
                Backing::Owned(v) => Backing::Shared(Rc::from(v.as_slice())),
            }
        };
        let mut properties = self.properties;
        if deep {
            properties |= flags::OWNS_TEXT;
        } else {
            properties &= !flags::OWNS_TEXT;
        }
        Ok(Box::new(Utf16Provider {
            backing,
            length: self.length,
            properties,
        }))
    }
}
