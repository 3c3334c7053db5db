//! FLV container primitives.
//!
//! Header and tag framing, the tag model with stream-copy payloads, the
//! tag factory, and best-effort inspection of audio/video payload headers
//! (including the picture size carried by an AVC sequence header).

#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![deny(unsafe_code)]

pub mod audio;
pub mod avc;
pub mod error;
pub mod framing;
pub mod header;
pub mod parser;
pub mod resolution;
pub mod tag;
pub mod video;

pub use error::FlvError;
pub use header::FlvHeader;
pub use parser::{FlvParser, ParsedRecord, PrevTagSizeMode};
pub use tag::{FlvTag, FlvTagType, TagBody};
