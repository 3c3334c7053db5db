use std::fmt;
use std::time::Duration;

use flv::FlvHeader;
use tracing::info;

use crate::file::FlvFile;

/// Summary of a container's contents.
#[derive(Debug, Clone, PartialEq)]
pub struct FlvReport {
    pub header: FlvHeader,
    /// Length of the source stream.
    pub file_size: u64,
    pub tag_count: usize,

    pub audio_tag_count: usize,
    pub video_tag_count: usize,
    pub audio_data_bytes: u64,
    pub video_data_bytes: u64,

    pub first_timestamp: Option<Duration>,
    pub last_timestamp: Option<Duration>,
}

impl FlvReport {
    /// Share of the file taken by audio payloads, in percent.
    pub fn audio_share(&self) -> f64 {
        self.share(self.audio_data_bytes)
    }

    /// Share of the file taken by video payloads, in percent.
    pub fn video_share(&self) -> f64 {
        self.share(self.video_data_bytes)
    }

    pub fn duration(&self) -> Duration {
        match (self.first_timestamp, self.last_timestamp) {
            (Some(first), Some(last)) => last - first,
            _ => Duration::ZERO,
        }
    }

    fn share(&self, bytes: u64) -> f64 {
        if self.file_size == 0 {
            return 0.0;
        }
        bytes as f64 * 100.0 / self.file_size as f64
    }
}

impl fmt::Display for FlvReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Flags: {}. Packets: {}", self.header, self.tag_count)?;
        writeln!(
            f,
            " -- Audio: {} bytes ({:.1}%) ({} packets)",
            self.audio_data_bytes,
            self.audio_share(),
            self.audio_tag_count
        )?;
        writeln!(
            f,
            " -- Video: {} bytes ({:.1}%) ({} packets)",
            self.video_data_bytes,
            self.video_share(),
            self.video_tag_count
        )?;
        let first = self.first_timestamp.unwrap_or_default();
        let last = self.last_timestamp.unwrap_or_default();
        write!(
            f,
            " -- Duration: {} seconds (from {} to {})",
            self.duration().as_secs_f64(),
            first.as_secs_f64(),
            last.as_secs_f64()
        )
    }
}

impl<R> FlvFile<R> {
    pub fn report(&self) -> FlvReport {
        FlvReport {
            header: self.header().clone(),
            file_size: self.size(),
            tag_count: self.tags().len(),
            audio_tag_count: self.audio_tag_count(),
            video_tag_count: self.video_tag_count(),
            audio_data_bytes: self.audio_data_bytes(),
            video_data_bytes: self.video_data_bytes(),
            first_timestamp: self.first_timestamp(),
            last_timestamp: self.last_timestamp(),
        }
    }

    /// Logs the report as a single `info` event.
    pub fn log_report(&self) {
        let report = self.report();
        info!(
            flags = %report.header,
            tags = report.tag_count,
            audio_tags = report.audio_tag_count,
            audio_bytes = report.audio_data_bytes,
            video_tags = report.video_tag_count,
            video_bytes = report.video_data_bytes,
            duration_secs = report.duration().as_secs_f64(),
            "FLV report"
        );
    }
}
