//! UTF-32 provider: backing storage is a plain array of Unicode scalar
//! values (one native unit per code point). Unlike the UTF-16 provider,
//! native units don't line up one-to-one with UTF-16 units once a
//! supplementary code point is in the mix, so this provider decodes into a
//! small rotating pair of chunk buffers the same way the UTF-8 provider
//! does, just with a trivial (one-unit) native decode step instead of a
//! byte-stream scan (`DESIGN.md` has the full rationale).

use std::rc::Rc;

use crate::error::{TextError, TextWarning};
use crate::provider::{flags, ExtractOutcome, Provider};
use crate::surrogate::{get_supplementary, is_lead, is_trail, lead_of, trail_of};
use crate::util::pin_index;
use crate::view::{ChunkState, TextView};

const CHUNK_CP: i64 = 16;

enum Backing {
    Shared(Rc<[i32]>),
    Owned(Vec<i32>),
}

impl Backing {
    fn as_slice(&self) -> &[i32] {
        match self {
            Backing::Shared(s) => s,
            Backing::Owned(v) => v,
        }
    }

    fn as_mut_slice(&mut self) -> &mut [i32] {
        match self {
            Backing::Owned(v) => v,
            Backing::Shared(_) => unreachable!("mutating a read-only UTF-32 backing"),
        }
    }
}

/// Maps one decoded UTF-16 chunk unit back to the native (code point) index
/// it came from; a supplementary code point contributes two entries with the
/// same native index.
#[derive(Default)]
struct DecodeBuffer {
    units: Vec<u16>,
    native_index: Vec<i64>,
}

/// Provider over a buffer of Unicode scalar values.
pub struct Utf32Provider {
    backing: Backing,
    length: i64,
    properties: u32,
    buffers: [DecodeBuffer; 2],
    active: usize,
}

fn encode_cp(cp: i32) -> (u16, Option<u16>) {
    if cp < 0 || cp > 0x10FFFF || (0xD800..=0xDFFF).contains(&cp) {
        (0xFFFD, None)
    } else if cp >= 0x10000 {
        (lead_of(cp), Some(trail_of(cp)))
    } else {
        (cp as u16, None)
    }
}

fn decode_u16_to_cp(src: &[u16]) -> Vec<i32> {
    let mut out = Vec::with_capacity(src.len());
    let mut i = 0;
    while i < src.len() {
        let c0 = src[i];
        if is_lead(c0) && i + 1 < src.len() && is_trail(src[i + 1]) {
            out.push(get_supplementary(c0, src[i + 1]));
            i += 2;
        } else {
            out.push(c0 as i32);
            i += 1;
        }
    }
    out
}

impl Utf32Provider {
    fn capacity(&self) -> i64 {
        self.backing.as_slice().len() as i64
    }

    fn text(&self) -> &[i32] {
        self.backing.as_slice()
    }

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
        }
    }

    fn pick_window(idx: i64, forward: bool, len: i64) -> (i64, i64) {
        if forward {
            let start = (idx / CHUNK_CP) * CHUNK_CP;
            let limit = pin_index(start + 2 * CHUNK_CP, len);
            (start.min(idx), limit)
        } else if idx == 0 {
            (0, 0)
        } else {
            let limit = pin_index(((idx - 1) / CHUNK_CP + 1) * CHUNK_CP, len).max(idx);
            let start = (limit - 2 * CHUNK_CP).max(0);
            (start, pin_index(limit, len))
        }
    }

    fn decode_window(&mut self, chunk: &mut ChunkState, start_cp: i64, limit_cp: i64) {
        let next = 1 - self.active;
        let mut indexing_limit = None;
        {
            let buf = &mut self.buffers[next];
            buf.units.clear();
            buf.native_index.clear();
            let text = self.backing.as_slice();
            for cp_idx in start_cp..limit_cp {
                let (u0, u1) = encode_cp(text[cp_idx as usize]);
                if u1.is_some() && indexing_limit.is_none() {
                    indexing_limit = Some(buf.units.len() as i32);
                }
                buf.units.push(u0);
                buf.native_index.push(cp_idx);
                if let Some(u1) = u1 {
                    buf.units.push(u1);
                    buf.native_index.push(cp_idx);
                }
            }
        }
        self.active = next;
        chunk.native_start = start_cp;
        chunk.native_limit = limit_cp;
        chunk.length = self.buffers[self.active].units.len() as i32;
        chunk.native_indexing_limit = indexing_limit.unwrap_or(chunk.length);
        chunk.offset = 0;
    }

    fn new_provider(backing: Backing, length: Option<i64>, writable: bool) -> Utf32Provider {
        let expensive = length.is_none();
        let mut properties = 0u32;
        if expensive {
            properties |= flags::LENGTH_IS_EXPENSIVE;
        }
        if writable {
            properties |= flags::WRITABLE;
        }
        Utf32Provider {
            backing,
            length: length.unwrap_or(0).max(0),
            properties,
            buffers: [DecodeBuffer::default(), DecodeBuffer::default()],
            active: 0,
        }
    }
}

/// Open a read-only view over a buffer of Unicode scalar values. `length =
/// None` means NUL-terminated (a `0` entry ends the string).
pub fn open_const_u32(code_points: Vec<i32>, length: Option<i64>) -> TextView {
    let provider = Utf32Provider::new_provider(Backing::Owned(code_points), length, false);
    TextView::new(Box::new(provider))
}

/// Open a writable view over `code_points`; its length is the fixed edit
/// capacity.
pub fn open_u32(code_points: Vec<i32>, length: Option<i64>) -> TextView {
    let provider = Utf32Provider::new_provider(Backing::Owned(code_points), length, true);
    TextView::new(Box::new(provider))
}

impl Provider for Utf32Provider {
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
        let requested = pin_index(native_index, len);
        let reuse = chunk.length > 0 && requested > chunk.native_start && requested < chunk.native_limit;
        if !reuse {
            let (start_cp, limit_cp) = Utf32Provider::pick_window(requested, forward, len);
            tracing::trace!(start_cp, limit_cp, "utf32 chunk decode");
            self.decode_window(chunk, start_cp, limit_cp);
        }
        chunk.offset = self.map_native_to_utf16(chunk, requested);
        (forward && requested < len) || (!forward && requested > 0)
    }

    fn chunk_units(&self, _chunk: &ChunkState) -> &[u16] {
        &self.buffers[self.active].units
    }

    fn map_offset_to_native(&self, chunk: &ChunkState) -> i64 {
        let buf = &self.buffers[self.active];
        match buf.native_index.get(chunk.offset as usize) {
            Some(&n) => n,
            None => chunk.native_limit,
        }
    }

    fn map_native_to_utf16(&self, chunk: &ChunkState, native_index: i64) -> i32 {
        let buf = &self.buffers[self.active];
        for (i, &n) in buf.native_index.iter().enumerate() {
            if n == native_index {
                return i as i32;
            }
        }
        if native_index >= chunk.native_limit {
            buf.units.len() as i32
        } else {
            0
        }
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
        let native_start = pin_index(start, len);
        let native_limit = pin_index(limit, len);
        let cap = dst.len() as i64;
        let mut di = 0i64;
        let text = self.backing.as_slice();
        for cp_idx in native_start..native_limit {
            let (u0, u1) = encode_cp(text[cp_idx as usize]);
            if di < cap {
                dst[di as usize] = u0;
            }
            di += 1;
            if let Some(u1) = u1 {
                if di < cap {
                    dst[di as usize] = u1;
                }
                di += 1;
            }
        }
        self.access(chunk, native_limit, true);
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
        let repl = decode_u16_to_cp(src);
        let repl_len = repl.len() as i64;
        let diff = repl_len - (native_limit - native_start);
        if len + diff > self.capacity() {
            tracing::warn!(len, diff, capacity = self.capacity(), "utf32 replace overflow");
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
                    backing[i as usize] = repl[(i - native_start) as usize];
                    i -= 1;
                }
            } else {
                let mut i = native_start;
                while i < native_start + repl_len {
                    backing[i as usize] = repl[(i - native_start) as usize];
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
                let block: Vec<i32> = self.text()[native_start as usize..native_limit as usize].to_vec();
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
        Ok(Box::new(Utf32Provider {
            backing,
            length: self.length,
            properties,
            buffers: [DecodeBuffer::default(), DecodeBuffer::default()],
            active: 0,
        }))
    }
}
