//! Error types for AMF0 metadata decoding and encoding.

use std::io;

use thiserror::Error;

use crate::Amf0Marker;

/// Errors that can occur while decoding an `onMetaData` object.
#[derive(Error, Debug)]
pub enum Amf0ReadError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The object needs more bytes than the buffer holds.
    #[error("unexpected end of data: {needed} more bytes needed at position {position}")]
    UnexpectedEof {
        /// Bytes missing to complete the current read.
        needed: usize,
        /// Position of the read that failed.
        position: usize,
    },

    /// A type byte that is not an AMF0 marker.
    #[error("unknown AMF0 marker: 0x{0:02x}")]
    UnknownMarker(u8),

    /// A valid AMF0 marker whose value cannot be stored in metadata.
    #[error("unsupported AMF0 value type: {0:?}")]
    UnsupportedType(Amf0Marker),

    /// A string that is not valid UTF-8.
    #[error("invalid string encoding: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    /// The script object is not named `onMetaData`.
    #[error("invalid metadata name: {0:?}")]
    InvalidMetadataName(String),

    /// The root container is neither an ECMA array nor an object.
    #[error("invalid or unsupported root object type: 0x{0:02x}")]
    InvalidRootType(u8),

    /// An empty key was not followed by the object-end marker.
    #[error("expected object-end marker, got 0x{0:02x}")]
    MissingObjectEnd(u8),
}

/// Errors that can occur while encoding an `onMetaData` object.
#[derive(Error, Debug)]
pub enum Amf0WriteError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The value can only be expressed with a marker outside the metadata value set.
    #[error("unsupported AMF0 value type: {0:?}")]
    UnsupportedType(Amf0Marker),

    /// The map has more entries than the ECMA array count can declare.
    #[error("too many metadata entries: {0}")]
    TooManyEntries(usize),
}
