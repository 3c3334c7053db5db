//! FLV repair library
//!
//! Loads an FLV file into an in-memory tag list, repairs it and writes it
//! back out. Tag payloads are never held in memory; they are copied from
//! the source stream when the file is written.
//!
//! ## Component Overview
//!
//! - `file`: the [`FlvFile`] container, parsing and the write pass
//! - `repair`: tag filtering, timestamp normalization and cutting
//! - `metadata`: rebuilding `onMetaData` from the remaining tags
//! - `remover`: single-pass in-place removal used by the repairs
//! - `report`: a summary of a container's contents
//!
//! ## Example
//!
//! ```no_run
//! use std::time::Duration;
//! use flv_fix::FlvFile;
//!
//! # fn main() -> Result<(), flv::FlvError> {
//! let mut file = FlvFile::load("input.flv")?;
//! file.filter_tags();
//! file.cut_from_start(Duration::from_secs(10));
//! file.fix_timestamps();
//! file.fix_metadata();
//! file.write_to_path("input.flv")?;
//! # Ok(())
//! # }
//! ```

#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![deny(unsafe_code)]

mod config;
mod file;
mod metadata;
mod remover;
mod repair;
mod report;

#[cfg(test)]
pub mod test_utils;

pub use config::{FlvFixConfig, Strictness};
pub use file::FlvFile;
pub use flv::{FlvError, PrevTagSizeMode};
pub use remover::{Compact, Remover};
pub use report::FlvReport;
