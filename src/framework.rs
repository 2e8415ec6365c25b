//! The framework dispatcher: encoding-agnostic navigation and edit
//! operations that convert framework calls into provider calls plus
//! surrogate-boundary fix-ups.
//!
//! Every method here maintains the chunk invariants documented on
//! [`crate::view::ChunkState`]. In particular, the cursor is never left
//! positioned between the two halves of a surrogate pair on return from a
//! public call — it may transiently be so between an `access` and the
//! adjustment that follows it.

use crate::error::TextError;
use crate::provider::ExtractOutcome;
use crate::surrogate::{get_supplementary, is_surrogate, is_trail, SENTINEL};
use crate::view::TextView;

#[inline]
fn is_surrogate_scalar(c: i32) -> bool {
    c >= 0 && is_surrogate(c as u16)
}

impl TextView {
    #[inline]
    fn access(&mut self, native_index: i64, forward: bool) -> bool {
        self.provider.access(&mut self.chunk, native_index, forward)
    }

    #[inline]
    fn unit_at(&self, offset: i32) -> u16 {
        self.provider.chunk_units(&self.chunk)[offset as usize]
    }

    /// Return the scalar at the cursor and advance past it. Returns
    /// [`SENTINEL`] at the end of the text. An unpaired lead surrogate is
    /// returned as-is; the cursor lands on the character that follows where
    /// its trail would have been.
    pub fn next32(&mut self) -> i32 {
        let mut have_access = true;
        if self.chunk.offset >= self.chunk.length {
            have_access = self.access(self.chunk.native_limit, true);
        }
        if !have_access {
            return SENTINEL;
        }
        let c0 = self.unit_at(self.chunk.offset);
        self.chunk.offset += 1;
        let mut c = c0 as i32;
        if crate::surrogate::is_lead(c0) {
            if self.chunk.offset >= self.chunk.length {
                have_access = self.access(self.chunk.native_limit, true);
            }
            if have_access {
                let trail = self.unit_at(self.chunk.offset);
                if is_trail(trail) {
                    c = get_supplementary(c0, trail);
                    self.chunk.offset += 1;
                }
            }
        }
        c
    }

    /// Symmetric to [`TextView::next32`]: decrement the cursor and return
    /// the scalar it now points at.
    pub fn previous32(&mut self) -> i32 {
        let mut have_access = true;
        if self.chunk.offset <= 0 {
            have_access = self.access(self.chunk.native_start, false);
        }
        if !have_access {
            return SENTINEL;
        }
        self.chunk.offset -= 1;
        let c0 = self.unit_at(self.chunk.offset);
        let mut c = c0 as i32;
        if is_trail(c0) {
            if self.chunk.offset <= 0 {
                have_access = self.access(self.chunk.native_start, false);
            }
            if have_access && self.chunk.offset > 0 {
                let lead = self.unit_at(self.chunk.offset - 1);
                if crate::surrogate::is_lead(lead) {
                    c = get_supplementary(lead, c0);
                    self.chunk.offset -= 1;
                }
            }
        }
        c
    }

    /// Like [`TextView::next32`] but without advancing. On a supplementary
    /// code point straddling a chunk boundary, this temporarily follows into
    /// the next chunk to read the trail surrogate, then reverts.
    pub fn current32(&mut self) -> i32 {
        let mut have_access = true;
        if self.chunk.offset == self.chunk.length {
            have_access = self.access(self.chunk.native_limit, true);
        }
        if !have_access {
            return SENTINEL;
        }
        let lead = self.unit_at(self.chunk.offset);
        let mut c = lead as i32;
        if crate::surrogate::is_lead(lead) {
            let mut trail: u16 = 0;
            if self.chunk.offset + 1 < self.chunk.length {
                trail = self.unit_at(self.chunk.offset + 1);
            } else {
                let native_position = self.chunk.native_limit;
                let original_offset = self.chunk.offset;
                if self.access(native_position, true) {
                    trail = self.unit_at(self.chunk.offset);
                }
                have_access = self.access(native_position, false);
                self.chunk.offset = original_offset;
                if !have_access {
                    return SENTINEL;
                }
            }
            if is_trail(trail) {
                c = get_supplementary(lead, trail);
            }
        }
        c
    }

    /// Return the scalar whose start-index-in-native-units is `<= native_index`.
    pub fn char32_at(&mut self, native_index: i64) -> i32 {
        let limit = self.chunk.native_indexing_limit as i64;
        let mut c = SENTINEL;
        if native_index >= self.chunk.native_start && native_index < self.chunk.native_start + limit
        {
            self.chunk.offset = (native_index - self.chunk.native_start) as i32;
            c = self.unit_at(self.chunk.offset) as i32;
        }
        if is_surrogate_scalar(c)
            || native_index < self.chunk.native_start
            || native_index >= self.chunk.native_start + limit
        {
            self.set_native_index(native_index);
            if native_index >= self.chunk.native_start && self.chunk.offset < self.chunk.length {
                c = self.unit_at(self.chunk.offset) as i32;
                if is_surrogate_scalar(c) {
                    c = self.current32();
                }
            }
        }
        c
    }

    /// Jump to `native_index` and return the scalar there, advancing past it.
    pub fn next32_from(&mut self, native_index: i64) -> i32 {
        let mut have_access = true;
        if native_index < self.chunk.native_start || native_index >= self.chunk.native_limit {
            have_access = self.access(native_index, true);
        } else if native_index - self.chunk.native_start <= self.chunk.native_indexing_limit as i64
        {
            self.chunk.offset = (native_index - self.chunk.native_start) as i32;
        } else {
            self.chunk.offset = self.provider.map_native_to_utf16(&self.chunk, native_index);
        }
        if !have_access {
            return SENTINEL;
        }
        let c0 = self.unit_at(self.chunk.offset);
        self.chunk.offset += 1;
        if is_surrogate(c0) {
            self.set_native_index(native_index);
            return self.next32();
        }
        c0 as i32
    }

    /// Jump to `native_index` and return the scalar immediately preceding it.
    pub fn previous32_from(&mut self, native_index: i64) -> i32 {
        let mut have_access = true;
        if native_index <= self.chunk.native_start || native_index > self.chunk.native_limit {
            have_access = self.access(native_index, false);
        } else if native_index - self.chunk.native_start <= self.chunk.native_indexing_limit as i64
        {
            self.chunk.offset = (native_index - self.chunk.native_start) as i32;
        } else {
            self.chunk.offset = self.provider.map_native_to_utf16(&self.chunk, native_index);
            if self.chunk.offset == 0 {
                have_access = self.access(native_index, false);
            }
        }
        if have_access && self.chunk.offset > 0 {
            self.chunk.offset -= 1;
            let c0 = self.unit_at(self.chunk.offset);
            if is_surrogate(c0) {
                self.set_native_index(native_index);
                return self.previous32();
            }
            return c0 as i32;
        }
        SENTINEL
    }

    /// Position the cursor at `native_index`, snapping left onto a
    /// code-point boundary if it lands in the middle of a surrogate pair.
    pub fn set_native_index(&mut self, native_index: i64) {
        let mut have_access = true;
        if native_index < self.chunk.native_start || native_index >= self.chunk.native_limit {
            have_access = self.access(native_index, true);
        } else if native_index - self.chunk.native_start <= self.chunk.native_indexing_limit as i64
        {
            self.chunk.offset = (native_index - self.chunk.native_start) as i32;
        } else {
            self.chunk.offset = self.provider.map_native_to_utf16(&self.chunk, native_index);
        }
        if have_access && self.chunk.offset < self.chunk.length {
            let c = self.unit_at(self.chunk.offset);
            if is_trail(c) {
                if self.chunk.offset == 0 {
                    have_access = self.access(self.chunk.native_start, false);
                }
                if have_access && self.chunk.offset > 0 {
                    let lead = self.unit_at(self.chunk.offset - 1);
                    if crate::surrogate::is_lead(lead) {
                        self.chunk.offset -= 1;
                    }
                }
            }
        }
    }

    /// Native index of the cursor.
    pub fn get_native_index(&self) -> i64 {
        if self.chunk.offset <= self.chunk.native_indexing_limit {
            self.chunk.native_start + self.chunk.offset as i64
        } else {
            self.provider.map_offset_to_native(&self.chunk)
        }
    }

    /// Native index of the character immediately preceding the cursor.
    ///
    /// Fast path: if the preceding unit is not a trail surrogate and falls
    /// within the direct-indexing region, compute it by arithmetic. The slow
    /// path falls back to `previous32`/`next32` for chunk boundaries and
    /// surrogate pairs.
    pub fn get_previous_native_index(&mut self) -> i64 {
        let i = self.chunk.offset - 1;
        let mut native_index = 0i64;
        let mut was_trail = false;
        if i >= 0 {
            let cu = self.unit_at(i);
            if !is_trail(cu) {
                if i <= self.chunk.native_indexing_limit {
                    native_index = self.chunk.native_start + i as i64;
                } else {
                    self.chunk.offset = i;
                    native_index = self.provider.map_offset_to_native(&self.chunk);
                    self.chunk.offset += 1;
                }
            } else {
                was_trail = true;
            }
        }
        if i < 0 || was_trail {
            if self.chunk.offset != 0 || self.chunk.native_start != 0 {
                self.previous32();
                native_index = self.get_native_index();
                self.next32();
            }
        }
        native_index
    }

    /// Step the cursor by `delta` code points (negative moves backward).
    /// Returns `false` and stops as soon as either end of the text is hit.
    pub fn move_index32(&mut self, mut delta: i32) -> bool {
        if delta > 0 {
            while delta > 0 {
                if self.chunk.offset >= self.chunk.length
                    && !self.access(self.chunk.native_limit, true)
                {
                    return false;
                }
                let c = self.unit_at(self.chunk.offset);
                if is_surrogate(c) {
                    if self.next32() == SENTINEL {
                        return false;
                    }
                } else {
                    self.chunk.offset += 1;
                }
                delta -= 1;
            }
        } else {
            while delta < 0 {
                if self.chunk.offset <= 0 && !self.access(self.chunk.native_start, false) {
                    return false;
                }
                let c = self.unit_at(self.chunk.offset - 1);
                if is_surrogate(c) {
                    if self.previous32() == SENTINEL {
                        return false;
                    }
                } else {
                    self.chunk.offset -= 1;
                }
                delta += 1;
            }
        }
        true
    }

    /// Copy the transcoded `[start, limit)` range into `dst`. See
    /// [`ExtractOutcome`] for overflow/termination reporting.
    pub fn extract(
        &mut self,
        start: i64,
        limit: i64,
        dst: &mut [u16],
    ) -> Result<ExtractOutcome, TextError> {
        self.provider.extract(&mut self.chunk, start, limit, dst)
    }

    /// Replace `[start, limit)` with `src`, returning the native-unit length
    /// delta. Fails with [`TextError::NoWritePermission`] on a frozen or
    /// non-writable view.
    pub fn replace(&mut self, start: i64, limit: i64, src: &[u16]) -> Result<i64, TextError> {
        if !self.is_writable() {
            return Err(TextError::NoWritePermission);
        }
        self.provider.replace(&mut self.chunk, start, limit, src)
    }

    /// Copy (`mv=false`) or move (`mv=true`) `[start, limit)` to `dest`.
    /// Fails with [`TextError::NoWritePermission`] on a frozen or
    /// non-writable view.
    pub fn copy(&mut self, start: i64, limit: i64, dest: i64, mv: bool) -> Result<(), TextError> {
        if !self.is_writable() {
            return Err(TextError::NoWritePermission);
        }
        self.provider.copy(&mut self.chunk, start, limit, dest, mv)
    }
}
