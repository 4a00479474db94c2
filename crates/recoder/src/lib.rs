//! A streaming, incremental character-encoding conversion engine.
//!
//! Conversion between bytes and characters is driven through the
//! `reset → convert → flush` protocol of a [`Decoder`] or [`Encoder`],
//! obtained from an [`Encoding`] descriptor that a [`Registry`] resolves by
//! name, case-insensitively and through aliases. Input and output travel in
//! caller-owned [`ReadCursor`]/[`WriteCursor`] windows, so a stream can be
//! fed in arbitrary partial buffers without the engine ever holding on to
//! caller memory; a multi-byte unit split across buffers is carried over
//! internally. Malformed and unmappable input is reported, ignored, or
//! replaced per [`ErrorAction`].
//!
//! ```
//! use recoder::{CoderStatus, ReadCursor, Registry, WriteCursor};
//!
//! let encoding = Registry::global().resolve("utf-8").unwrap();
//! let mut decoder = encoding.new_decoder();
//! let mut out = ['\0'; 8];
//!
//! // "héllo" split mid-unit: the é spans the two buffers.
//! let mut dst = WriteCursor::new(&mut out);
//! let mut src = ReadCursor::new(&[0x68, 0xC3]);
//! assert_eq!(decoder.convert(&mut src, &mut dst, false), CoderStatus::Underflow);
//! let mut src = ReadCursor::new(&[0xA9, 0x6C, 0x6C, 0x6F]);
//! assert_eq!(decoder.convert(&mut src, &mut dst, true), CoderStatus::Underflow);
//! assert_eq!(decoder.flush(&mut dst), CoderStatus::Underflow);
//!
//! let written = dst.position();
//! assert_eq!(out[..written].iter().collect::<String>(), "héllo");
//! ```

#![no_std]
#![allow(missing_docs)]
extern crate alloc;

#[cfg(test)]
extern crate std;

pub mod codec;
mod coder;
mod cursor;
mod decoder;
mod encoder;
mod error;
mod registry;
mod status;

#[cfg(test)]
mod tests;

pub use coder::ErrorAction;
pub use cursor::{ReadCursor, WriteCursor};
pub use decoder::Decoder;
pub use encoder::Encoder;
pub use error::{CodingError, RegisterError, ReplacementError, ResolveError};
pub use registry::{Encoding, Registry};
pub use status::CoderStatus;
