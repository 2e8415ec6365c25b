//! Reference [`crate::provider::Provider`] implementations: UTF-16 (direct,
//! no decoding), UTF-8, and UTF-32 (both decoded into rotating chunk
//! buffers). Each module exposes its own `open_*` constructors; none of
//! their internal types are public, matching the rule that a `Provider` is
//! an implementation detail behind a [`crate::view::TextView`].

pub mod utf16;
pub mod utf32;
pub mod utf8;
mod utf8_decode;
