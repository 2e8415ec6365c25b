//! A pluggable, random-access text iterator.
//!
//! A [`TextView`] is a cursor over Unicode text that doesn't care how the
//! text is actually stored. Three reference backings ship in [`providers`]
//! (UTF-16, UTF-8, UTF-32 buffers); anything else — a rope, a memory-mapped
//! file, a piece table — can plug in by implementing [`Provider`] and
//! exposing its own `open_*` constructor, the same way the reference
//! providers do.
//!
//! ```
//! use textcursor::providers::utf8::open_const_u8;
//!
//! let mut text = open_const_u8(b"na\xC3\xAFve".to_vec(), None);
//! let mut out = String::new();
//! loop {
//!     let c = text.next32();
//!     if c < 0 {
//!         break;
//!     }
//!     out.push(char::from_u32(c as u32).unwrap());
//! }
//! assert_eq!(out, "naïve");
//! ```

mod error;
mod framework;
pub mod provider;
pub mod providers;
mod surrogate;
mod util;
mod view;

pub use error::{TextError, TextWarning};
pub use provider::{flags, ExtractOutcome, Provider};
pub use surrogate::SENTINEL;
pub use view::{ChunkState, TextView};
