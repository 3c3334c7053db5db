use std::io;

use amf0::{Amf0ReadError, Amf0WriteError};
use thiserror::Error;

/// Errors raised while reading or writing an FLV container.
///
/// Every variant is fatal for the file being processed. Recoverable
/// conditions (trailing garbage, duplicate metadata in permissive mode,
/// missing key frames) are reported through `tracing` instead.
#[derive(Error, Debug)]
pub enum FlvError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid FLV header: {0}")]
    InvalidHeader(String),

    /// Malformed `onMetaData` object.
    #[error("metadata format error: {0}")]
    Format(#[from] Amf0ReadError),

    /// The decoded metadata does not end where the tag header says it does.
    #[error(
        "metadata position mismatch at offset {offset}: expected to end at {expected_end}, ended at {actual_end}"
    )]
    Integrity {
        offset: u64,
        expected_end: u64,
        actual_end: u64,
    },

    #[error("metadata encode error: {0}")]
    Encode(#[from] Amf0WriteError),

    /// Trailing corruption, only raised in strict mode.
    #[error("corrupt data at position {position}, {remaining} bytes remain")]
    Truncated { position: u64, remaining: u64 },

    /// A second metadata tag, only raised in strict mode.
    #[error("duplicate metadata tag at offset {offset}")]
    DuplicateMetadata { offset: u64 },

    #[error("PreviousTagSize mismatch at position {position} (expected {expected}, got {actual})")]
    PrevTagSizeMismatch {
        position: u64,
        expected: u32,
        actual: u32,
    },

    #[error("FLV tag data size ({0}) exceeds 24-bit limit")]
    TagTooLarge(usize),

    /// The source stream ended while copying a tag payload.
    #[error("short payload at offset {offset}: expected {expected} bytes, copied {copied}")]
    ShortPayload {
        offset: u64,
        expected: u32,
        copied: u64,
    },
}
