//! Synthetic FLV streams for tests.

use std::io::Cursor;

use amf0::{Amf0Encoder, Variables};
use flv::framing::{self, ParsedTagHeader};
use flv::tag::FlvTagType;

use crate::{FlvFile, FlvFixConfig};

/// Initialize tracing for tests with appropriate settings
#[inline]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer() // Write to test output
        .try_init();
}

/// Builds an FLV byte stream tag by tag, keeping `PreviousTagSize` fields
/// consistent.
pub struct FlvBuilder {
    bytes: Vec<u8>,
    prev_tag_size: u32,
}

impl FlvBuilder {
    pub fn new(has_audio: bool, has_video: bool) -> Self {
        let mut flags = 0;
        if has_audio {
            flags |= 0x04;
        }
        if has_video {
            flags |= 0x01;
        }
        let bytes = vec![b'F', b'L', b'V', 0x01, flags, 0, 0, 0, 9];
        Self {
            bytes,
            prev_tag_size: 0,
        }
    }

    pub fn tag(mut self, tag_type: u8, timestamp_ms: u32, payload: &[u8]) -> Self {
        let header = ParsedTagHeader {
            tag_type: FlvTagType::from(tag_type),
            data_size: payload.len() as u32,
            timestamp_ms,
            stream_id: 0,
        };
        self.bytes
            .extend_from_slice(&framing::encode_prev_tag_size_bytes(self.prev_tag_size));
        self.bytes
            .extend_from_slice(&framing::encode_tag_header_bytes(&header).unwrap());
        self.bytes.extend_from_slice(payload);
        self.prev_tag_size = (framing::TAG_HEADER_SIZE + payload.len()) as u32;
        self
    }

    pub fn metadata(self, variables: &Variables) -> Self {
        let payload = Amf0Encoder::metadata_to_vec(variables).unwrap();
        self.tag(18, 0, &payload)
    }

    /// AVC sequence header carrying a 1280x720 SPS.
    pub fn avc_sequence_header(self, timestamp_ms: u32) -> Self {
        let mut payload = vec![0x17, 0x00, 0x00, 0x00, 0x00];
        payload.extend_from_slice(&avc_decoder_config_720p());
        self.tag(9, timestamp_ms, &payload)
    }

    pub fn key_frame(self, timestamp_ms: u32) -> Self {
        self.tag(9, timestamp_ms, &[0x17, 0x01, 0x00, 0x00, 0x00, 0x65, 0x88, 0x80])
    }

    pub fn inter_frame(self, timestamp_ms: u32) -> Self {
        self.tag(9, timestamp_ms, &[0x27, 0x01, 0x00, 0x00, 0x00, 0x41, 0x9A])
    }

    /// AAC, 44 kHz, 16 bit, stereo raw frame.
    pub fn audio(self, timestamp_ms: u32) -> Self {
        self.tag(8, timestamp_ms, &[0xAF, 0x01, 0x21, 0x10, 0x04])
    }

    /// MP3, 22 kHz, 8 bit, mono.
    pub fn mp3_audio(self, timestamp_ms: u32) -> Self {
        self.tag(8, timestamp_ms, &[0x28, 0xFF, 0xFB])
    }

    pub fn unknown(self, tag_type: u8, timestamp_ms: u32) -> Self {
        self.tag(tag_type, timestamp_ms, &[0xDE, 0xAD, 0xBE, 0xEF])
    }

    /// Appends the trailing `PreviousTagSize`.
    pub fn finish(mut self) -> Vec<u8> {
        self.bytes
            .extend_from_slice(&framing::encode_prev_tag_size_bytes(self.prev_tag_size));
        self.bytes
    }

    /// Appends `len` zero bytes after the trailing `PreviousTagSize`.
    pub fn finish_with_zeros(self, len: usize) -> Vec<u8> {
        let mut bytes = self.finish();
        bytes.resize(bytes.len() + len, 0);
        bytes
    }
}

/// `AVCDecoderConfigurationRecord` with one 1280x720 baseline SPS and one PPS.
pub fn avc_decoder_config_720p() -> Vec<u8> {
    // profile 66, level 31, ue fields: sps_id 0, log2_max_frame_num-4 0,
    // poc type 0, log2_max_poc_lsb-4 0, ref frames 1, gaps 0,
    // width 80 mbs, height 45 mbs, frame_mbs_only, direct_8x8, no crop, no vui
    let sps = [0x67, 0x42, 0x00, 0x1F, 0xF4, 0x02, 0x80, 0x2D, 0xC8];
    let mut record = vec![0x01, 0x42, 0x00, 0x1F, 0xFF, 0xE1];
    record.extend_from_slice(&(sps.len() as u16).to_be_bytes());
    record.extend_from_slice(&sps);
    record.extend_from_slice(&[0x01, 0x00, 0x04, 0x68, 0xCE, 0x3C, 0x80]);
    record
}

/// A typical recording: metadata, AVC header, two GOPs of video with
/// interleaved audio and an unknown tag in between.
pub fn sample_stream() -> Vec<u8> {
    let mut variables = Variables::new();
    variables.set("duration", 0.0);
    variables.set("metadatacreator", "broken muxer");
    variables.set("videodatarate", 1200.0);

    FlvBuilder::new(true, true)
        .metadata(&variables)
        .avc_sequence_header(1000)
        .key_frame(1000)
        .audio(1010)
        .inter_frame(1040)
        .unknown(0x0F, 1050)
        .audio(1060)
        .key_frame(2000)
        .audio(2010)
        .inter_frame(2040)
        .finish()
}

pub fn parse(bytes: Vec<u8>) -> FlvFile<Cursor<Vec<u8>>> {
    FlvFile::from_reader(Cursor::new(bytes)).unwrap()
}

pub fn parse_with(bytes: Vec<u8>, config: FlvFixConfig) -> FlvFile<Cursor<Vec<u8>>> {
    FlvFile::with_config(Cursor::new(bytes), config).unwrap()
}
