//! Rebuilds `onMetaData` from the tags actually present in the file.

use std::time::Duration;

use amf0::Variables;
use flv::audio::AudioTagHeader;
use flv::header::FLV_HEADER_SIZE;
use flv::resolution::Resolution;
use flv::video::VideoTagHeader;
use flv::FlvTag;
use tracing::{debug, info};

use crate::file::FlvFile;

/// Keys written by muxers that are stale after any edit.
const STALE_KEYS: [&str; 6] = [
    "metadatacreator",
    "creationdate",
    "metadatadate",
    "datasize",
    "videodatarate",
    "audiodatarate",
];

const AUDIO_KEYS: [&str; 6] = [
    "audiosamplerate",
    "audiosamplesize",
    "stereo",
    "audiocodecid",
    "audiodelay",
    "audiosize",
];

const VIDEO_KEYS: [&str; 5] = ["videosize", "videocodecid", "width", "height", "audiodelay"];

/// What the tag list says about the stream.
struct StreamSummary {
    last_timestamp: Duration,
    last_key_frame: Option<Duration>,
    has_audio: bool,
    has_video: bool,
    audio: Option<AudioTagHeader>,
    video: Option<(VideoTagHeader, Duration)>,
    resolution: Option<Resolution>,
    audio_bytes: u64,
    video_bytes: u64,
}

impl StreamSummary {
    fn collect<R>(file: &FlvFile<R>) -> Self {
        let tags = file.tags();
        let media = || tags.iter().filter(|tag| tag.is_media());
        Self {
            last_timestamp: tags.iter().map(FlvTag::timestamp).max().unwrap_or_default(),
            last_key_frame: tags
                .iter()
                .rev()
                .find(|tag| tag.is_key_frame())
                .map(FlvTag::timestamp),
            has_audio: media().any(FlvTag::is_audio),
            has_video: media().any(FlvTag::is_video),
            audio: tags.iter().find_map(FlvTag::audio).copied(),
            video: tags
                .iter()
                .find_map(|tag| tag.video().map(|video| (*video, tag.timestamp()))),
            resolution: tags
                .iter()
                .filter_map(FlvTag::video)
                .find_map(|video| video.resolution.filter(Resolution::is_valid)),
            audio_bytes: file.audio_data_bytes(),
            video_bytes: file.video_data_bytes(),
        }
    }
}

impl<R> FlvFile<R> {
    /// Recomputes the derived metadata fields from the current tags,
    /// creating the metadata tag first if the file has none.
    ///
    /// Audio keys are removed and the header audio flag cleared when no
    /// audio tag remains; the same goes for video.
    pub fn fix_metadata(&mut self) {
        if self.metadata_index().is_none() {
            info!("No metadata tag found, creating a new one");
            let tag = FlvTag::new_metadata(Variables::new(), FLV_HEADER_SIZE as u64);
            self.tags.insert(0, tag);
            self.metadata_index = Some(0);
        }

        let summary = StreamSummary::collect(self);
        if !summary.has_audio {
            self.header.set_has_audio(false);
        }
        if !summary.has_video {
            self.header.set_has_video(false);
        }

        let Some(metadata) = self.metadata_mut() else {
            return;
        };
        apply_summary(metadata, &summary);
    }
}

fn apply_summary(metadata: &mut Variables, summary: &StreamSummary) {
    for key in STALE_KEYS {
        metadata.remove(key);
    }

    metadata.set("canSeekToEnd", true);

    let duration = summary.last_timestamp.as_secs_f64();
    metadata.set("duration", duration);
    metadata.set("lasttimestamp", duration);
    info!(duration_secs = duration, "Stream duration");

    match summary.last_key_frame {
        Some(ts) => {
            metadata.set("lastkeyframetimestamp", ts.as_secs_f64());
        }
        None => {
            metadata.remove("lastkeyframetimestamp");
        }
    }

    if summary.has_audio {
        if let Some(audio) = summary.audio {
            metadata.set("audiosamplerate", audio.sound_rate.hz());
            metadata.set("audiosamplesize", audio.sound_size.bits());
            metadata.set("stereo", audio.is_stereo());
            metadata.set("audiocodecid", audio.sound_format as f64);
            info!(%audio, "Audio");
        }
        if let Some((_, first_video_ts)) = summary.video {
            metadata.set("audiodelay", first_video_ts.as_secs_f64());
        }
        metadata.set("audiosize", summary.audio_bytes as f64);
    } else {
        for key in AUDIO_KEYS {
            metadata.remove(key);
        }
        info!("Audio: no");
    }

    if summary.has_video {
        metadata.set("videosize", summary.video_bytes as f64);
        if let Some((video, _)) = summary.video {
            metadata.set("videocodecid", video.codec_id as f64);
            info!(codec_id = video.codec_id, "Video codec");
        }
        if let Some(resolution) = summary.resolution {
            metadata.set("width", resolution.width as f64);
            metadata.set("height", resolution.height as f64);
            info!(%resolution, "Video dimensions");
        } else {
            debug!("No video resolution found");
        }
    } else {
        for key in VIDEO_KEYS {
            metadata.remove(key);
        }
        info!("Video: no");
    }
}
