//! AMF0 support for FLV `onMetaData` script objects.
//!
//! Only the subset of AMF0 found in FLV playback metadata is handled: an
//! ECMA array or object root holding numbers, booleans, short strings,
//! dates (kept as raw bytes) and the null/undefined/unsupported markers.
//!
//! ## License
//!
//! This project is licensed under the [MIT](./LICENSE.MIT) or
//! [Apache-2.0](./LICENSE.Apache-2.0) license. You can choose between one of
//! them if you use this work.
//!
//! `SPDX-License-Identifier: MIT OR Apache-2.0`
#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![deny(unsafe_code)]

mod decode;
mod define;
mod encode;
mod error;
mod variables;

pub use decode::Amf0Decoder;
pub use define::{AMF0_DATE_SIZE, AMF0_ON_METADATA, Amf0Marker};
pub use encode::Amf0Encoder;
pub use error::{Amf0ReadError, Amf0WriteError};
pub use variables::{RootKind, ScriptValue, Variables};
