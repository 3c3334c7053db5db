//! Tag list repairs: filtering, timestamp normalization and trimming.
//!
//! Every operation edits the tag list in place, keeps the original order
//! of the surviving tags and leaves the file ready to be written.

use std::time::Duration;

use amf0::Variables;
use flv::FlvTag;
use tracing::{debug, info};

use crate::file::FlvFile;
use crate::remover::Remover;

impl<R> FlvFile<R> {
    /// Drops every tag that is neither metadata, audio nor video. Returns
    /// the number of removed tags.
    pub fn filter_tags(&mut self) -> usize {
        let removed = Remover::new(&mut self.tags)
            .remove_where(|_, tag| !(tag.is_metadata() || tag.is_media()));
        self.refresh_metadata_index();
        info!(removed, "Tag filtering done");
        removed
    }

    /// Shifts the stream so that the smallest non-zero timestamp becomes
    /// zero. Zero timestamps are treated as unset and left alone.
    ///
    /// Returns the applied shift, or `None` if no tag has a timestamp.
    pub fn fix_timestamps(&mut self) -> Option<Duration> {
        let delta = self
            .tags
            .iter()
            .map(|tag| tag.timestamp_ms)
            .filter(|&ts| ts > 0)
            .min()?;

        info!(delta_ms = delta, "Found initial time delta");
        for tag in self.tags.iter_mut().filter(|tag| tag.timestamp_ms > 0) {
            tag.timestamp_ms -= delta;
        }
        Some(Duration::from_millis(delta as u64))
    }

    /// Removes the metadata tag, returning its variables.
    pub fn remove_metadata(&mut self) -> Option<Variables> {
        let index = self.metadata_index()?;
        let tag = self.tags.remove(index);
        self.metadata_index = None;
        debug!(index, "Metadata tag removed");
        tag.metadata().cloned()
    }

    /// Starts the stream at the last video key frame at or before `start`.
    ///
    /// Audio and video tags in front of that key frame are removed, except
    /// the last AVC sequence header seen on the way, which decoding from the
    /// new first key frame depends on. Nothing is removed when there is no
    /// such key frame or no sequence header in front of it.
    ///
    /// Returns the number of removed tags.
    pub fn cut_from_start(&mut self, start: Duration) -> usize {
        info!(start_secs = start.as_secs(), "Searching for key frame nearest to cut point");

        let mut key_frame_index = None;
        let mut header_index = None;
        for (index, tag) in self.tags.iter().enumerate() {
            if !tag.is_key_frame() {
                continue;
            }
            if tag.timestamp() > start {
                break;
            }
            if tag.is_video_sequence_header() {
                header_index = Some(index);
            }
            key_frame_index = Some(index);
        }

        let Some(key_frame_index) = key_frame_index else {
            info!("Key frame not found, nothing to cut");
            return 0;
        };
        let Some(header_index) = header_index else {
            info!("Sequence header key frame not found, nothing to cut");
            return 0;
        };
        debug!(key_frame_index, header_index, "Cut point found");

        let removed = Remover::with_limit(&mut self.tags, key_frame_index)
            .remove_where(|index, tag| tag.is_media() && index != header_index);
        self.refresh_metadata_index();
        info!(removed, "Removed tags before cut point");
        removed
    }

    /// Removes every audio and video tag later than `end`. Returns the
    /// number of removed tags.
    pub fn cut_to_end(&mut self, end: Duration) -> usize {
        info!(end_secs = end.as_secs(), "Removing audio and video tags after cut point");
        let removed = Remover::new(&mut self.tags)
            .remove_where(|_, tag| tag.is_media() && tag.timestamp() > end);
        self.refresh_metadata_index();
        info!(removed, "Removed tags after cut point");
        removed
    }
}
