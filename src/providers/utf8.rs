//! UTF-8 provider: decodes a byte backing store into a small rotating pair
//! of UTF-16 chunk buffers, tracking which byte offset each decoded unit
//! came from so the framework can map back and forth between native (byte)
//! indices and chunk offsets. Decoding itself is delegated to
//! [`super::utf8_decode`].

use std::rc::Rc;

use crate::error::{TextError, TextWarning};
use crate::provider::{flags, ExtractOutcome, Provider};
use crate::surrogate::{get_supplementary, is_lead, is_trail, lead_of, trail_of};
use crate::util::pin_index;
use crate::view::{ChunkState, TextView};

use super::utf8_decode::{decode_one, encode_cp, is_trail_byte, snap_start};

const CHUNK_BYTES: i64 = 32;

enum Backing {
    Shared(Rc<[u8]>),
    Owned(Vec<u8>),
}

impl Backing {
    fn as_slice(&self) -> &[u8] {
        match self {
            Backing::Shared(s) => s,
            Backing::Owned(v) => v,
        }
    }

    fn as_mut_slice(&mut self) -> &mut [u8] {
        match self {
            Backing::Owned(v) => v,
            Backing::Shared(_) => unreachable!("mutating a read-only UTF-8 backing"),
        }
    }
}

#[derive(Default)]
struct DecodeBuffer {
    units: Vec<u16>,
    native_index: Vec<i64>,
}

/// Provider over a UTF-8 byte buffer.
pub struct Utf8Provider {
    backing: Backing,
    length: i64,
    properties: u32,
    buffers: [DecodeBuffer; 2],
    active: usize,
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

fn encode_u16_to_utf8(src: &[u16]) -> Vec<u8> {
    let mut out = Vec::with_capacity(src.len());
    for cp in decode_u16_to_cp(src) {
        encode_cp(cp, &mut out);
    }
    out
}

fn encode_cp_u16(cp: i32) -> (u16, Option<u16>) {
    if cp < 0 || cp > 0x10FFFF || (0xD800..=0xDFFF).contains(&cp) {
        (0xFFFD, None)
    } else if cp >= 0x10000 {
        (lead_of(cp), Some(trail_of(cp)))
    } else {
        (cp as u16, None)
    }
}

impl Utf8Provider {
    fn capacity(&self) -> i64 {
        self.backing.as_slice().len() as i64
    }

    fn text(&self) -> &[u8] {
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

    fn pick_window(text: &[u8], idx: i64, forward: bool, len: i64) -> (i64, i64) {
        if forward {
            let mut start = snap_start(text, (idx / CHUNK_BYTES) * CHUNK_BYTES);
            let mut limit = pin_index(start + 2 * CHUNK_BYTES, len);
            if limit < len {
                limit = snap_start(text, limit);
            }
            while limit < len && limit <= start {
                limit += 1;
                while limit < len && is_trail_byte(text[limit as usize]) {
                    limit += 1;
                }
            }
            (start.min(idx), limit.max(start))
        } else if idx == 0 {
            (0, 0)
        } else {
            let mut limit = pin_index(((idx - 1) / CHUNK_BYTES + 1) * CHUNK_BYTES, len);
            if limit < len {
                limit = snap_start(text, limit);
            }
            while limit < len && is_trail_byte(text[limit as usize]) {
                limit += 1;
            }
            limit = limit.max(idx).min(len);
            let start = snap_start(text, (limit - 2 * CHUNK_BYTES).max(0));
            (start, limit)
        }
    }

    fn decode_window(&mut self, chunk: &mut ChunkState, start: i64, limit: i64) {
        let next = 1 - self.active;
        let mut indexing_limit = None;
        {
            let buf = &mut self.buffers[next];
            buf.units.clear();
            buf.native_index.clear();
            let text = self.backing.as_slice();
            let mut pos = start as usize;
            while pos < limit as usize {
                let (cp, clen) = decode_one(text, pos);
                if cp == 0xFFFD {
                    tracing::debug!(pos, "malformed utf8 byte replaced with U+FFFD");
                }
                if clen != 1 && indexing_limit.is_none() {
                    indexing_limit = Some(buf.units.len() as i32);
                }
                let (u0, u1) = encode_cp_u16(cp);
                buf.units.push(u0);
                buf.native_index.push(pos as i64);
                if let Some(u1) = u1 {
                    buf.units.push(u1);
                    buf.native_index.push(pos as i64);
                }
                pos += clen;
            }
        }
        self.active = next;
        chunk.native_start = start;
        chunk.native_limit = limit;
        chunk.length = self.buffers[self.active].units.len() as i32;
        chunk.native_indexing_limit = indexing_limit.unwrap_or(chunk.length);
    }

    fn new_provider(backing: Backing, length: Option<i64>, writable: bool) -> Utf8Provider {
        let expensive = length.is_none();
        let mut properties = 0u32;
        if expensive {
            properties |= flags::LENGTH_IS_EXPENSIVE;
        }
        if writable {
            properties |= flags::WRITABLE;
        }
        Utf8Provider {
            backing,
            length: length.unwrap_or(0).max(0),
            properties,
            buffers: [DecodeBuffer::default(), DecodeBuffer::default()],
            active: 0,
        }
    }
}

/// Open a read-only view over UTF-8 bytes. `length = None` means
/// NUL-terminated.
pub fn open_const_u8(bytes: Vec<u8>, length: Option<i64>) -> TextView {
    let provider = Utf8Provider::new_provider(Backing::Owned(bytes), length, false);
    TextView::new(Box::new(provider))
}

/// Open a writable view over `bytes`; its length is the fixed edit capacity.
pub fn open_u8(bytes: Vec<u8>, length: Option<i64>) -> TextView {
    let provider = Utf8Provider::new_provider(Backing::Owned(bytes), length, true);
    TextView::new(Box::new(provider))
}

impl Provider for Utf8Provider {
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
            let (start, limit) = Utf8Provider::pick_window(self.text(), requested, forward, len);
            tracing::trace!(start, limit, "utf8 chunk decode");
            self.decode_window(chunk, start, limit);
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
        if native_index >= chunk.native_limit {
            return buf.units.len() as i32;
        }
        let mut offset = 0i32;
        for (i, &n) in buf.native_index.iter().enumerate() {
            if n <= native_index {
                offset = i as i32;
            } else {
                break;
            }
        }
        offset
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
        let text = self.text();
        let native_start = snap_start(text, pin_index(start, len));
        let native_limit = pin_index(limit, len);

        let cap = dst.len() as i64;
        let mut si = native_start;
        let mut di: i64 = 0;
        while si < native_limit {
            let (cp, clen) = decode_one(text, si as usize);
            let (u0, u1) = encode_cp_u16(cp);
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
            si += clen as i64;
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
        let text = self.text();
        let native_start = snap_start(text, pin_index(start, len));
        let mut native_limit = pin_index(limit, len);
        while native_limit < len && is_trail_byte(text[native_limit as usize]) {
            native_limit += 1;
        }
        let repl = encode_u16_to_utf8(src);
        let repl_len = repl.len() as i64;
        let diff = repl_len - (native_limit - native_start);
        if len + diff > self.capacity() {
            tracing::warn!(len, diff, capacity = self.capacity(), "utf8 replace overflow");
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
        let text = self.text();
        let native_start = snap_start(text, pin_index(start, len));
        let native_limit = pin_index(limit, len);
        let native_dest = snap_start(text, pin_index(dest, len));
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
                let block: Vec<u8> = self.text()[native_start as usize..native_limit as usize].to_vec();
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
        Ok(Box::new(Utf8Provider {
            backing,
            length: self.length,
            properties,
            buffers: [DecodeBuffer::default(), DecodeBuffer::default()],
            active: 0,
        }))
    }
}
