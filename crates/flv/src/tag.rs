use std::fmt;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::time::Duration;

use amf0::{Amf0Encoder, Variables};
use tracing::trace;

use crate::audio::AudioTagHeader;
use crate::error::FlvError;
use crate::framing::{self, ParsedTagHeader};
use crate::video::VideoTagHeader;

/// FLV Tag Type
///
/// This is the type of the tag.
///
/// Defined by:
/// - video_file_format_spec_v10.pdf (Chapter 1 - The FLV File Format - FLV tags)
/// - video_file_format_spec_v10_1.pdf (Annex E.4.1 - FLV Tag)
///
/// The 3 types that are supported are:
/// - Audio(8)
/// - Video(9)
/// - ScriptData(18)
///
/// Any other byte, including the known types with the filter bit set, is
/// kept as `Unknown` and its payload is copied verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlvTagType {
    Audio,
    Video,
    ScriptData,
    Unknown(u8),
}

impl From<u8> for FlvTagType {
    fn from(value: u8) -> Self {
        match value {
            8 => FlvTagType::Audio,
            9 => FlvTagType::Video,
            18 => FlvTagType::ScriptData,
            _ => FlvTagType::Unknown(value),
        }
    }
}

impl From<FlvTagType> for u8 {
    fn from(value: FlvTagType) -> Self {
        match value {
            FlvTagType::Audio => 8,
            FlvTagType::Video => 9,
            FlvTagType::ScriptData => 18,
            FlvTagType::Unknown(val) => val,
        }
    }
}

impl fmt::Display for FlvTagType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlvTagType::Audio => write!(f, "Audio"),
            FlvTagType::Video => write!(f, "Video"),
            FlvTagType::ScriptData => write!(f, "Script"),
            FlvTagType::Unknown(value) => write!(f, "Unknown({value})"),
        }
    }
}

/// Per-variant content of a tag.
///
/// Audio and video payloads are never decoded beyond their leading header
/// bytes; the bytes themselves stay in the source stream and are copied on
/// write. Only metadata is held in memory.
#[derive(Debug, Clone, PartialEq)]
pub enum TagBody {
    Audio(AudioTagHeader),
    Video(VideoTagHeader),
    Metadata(Variables),
    /// Unknown tag types, and audio/video tags too short to carry a header.
    Unparsed,
}

/// One tag record of an FLV stream.
#[derive(Debug, Clone, PartialEq)]
pub struct FlvTag {
    pub tag_type: FlvTagType,
    /// Size of the payload in bytes (UI24).
    pub payload_size: u32,
    /// A timestamp in milliseconds
    pub timestamp_ms: u32,
    /// A stream id, normally 0
    pub stream_id: u32,
    /// Size of the preceding record. Refreshed by every write.
    pub prev_tag_size: u32,
    /// Absolute position of the payload in the source stream.
    pub offset: u64,
    pub body: TagBody,
}

impl FlvTag {
    pub(crate) fn from_parts(
        header: ParsedTagHeader,
        prev_tag_size: u32,
        offset: u64,
        body: TagBody,
    ) -> Self {
        Self {
            tag_type: header.tag_type,
            payload_size: header.data_size,
            timestamp_ms: header.timestamp_ms,
            stream_id: header.stream_id,
            prev_tag_size,
            offset,
            body,
        }
    }

    /// Creates a metadata tag that does not exist in the source stream.
    ///
    /// `offset` is where the tag is considered to live; its payload size is
    /// only known once the map is encoded.
    pub fn new_metadata(variables: Variables, offset: u64) -> Self {
        Self {
            tag_type: FlvTagType::ScriptData,
            payload_size: 0,
            timestamp_ms: 0,
            stream_id: 0,
            prev_tag_size: 0,
            offset,
            body: TagBody::Metadata(variables),
        }
    }

    pub fn is_audio(&self) -> bool {
        self.tag_type == FlvTagType::Audio
    }

    pub fn is_video(&self) -> bool {
        self.tag_type == FlvTagType::Video
    }

    pub fn is_metadata(&self) -> bool {
        matches!(self.body, TagBody::Metadata(_))
    }

    pub fn is_media(&self) -> bool {
        self.is_audio() || self.is_video()
    }

    pub fn timestamp(&self) -> Duration {
        Duration::from_millis(self.timestamp_ms as u64)
    }

    pub fn audio(&self) -> Option<&AudioTagHeader> {
        match &self.body {
            TagBody::Audio(header) => Some(header),
            _ => None,
        }
    }

    pub fn video(&self) -> Option<&VideoTagHeader> {
        match &self.body {
            TagBody::Video(header) => Some(header),
            _ => None,
        }
    }

    pub fn metadata(&self) -> Option<&Variables> {
        match &self.body {
            TagBody::Metadata(variables) => Some(variables),
            _ => None,
        }
    }

    pub fn metadata_mut(&mut self) -> Option<&mut Variables> {
        match &mut self.body {
            TagBody::Metadata(variables) => Some(variables),
            _ => None,
        }
    }

    pub fn is_key_frame(&self) -> bool {
        self.video().is_some_and(VideoTagHeader::is_key_frame)
    }

    pub fn is_video_sequence_header(&self) -> bool {
        self.video().is_some_and(VideoTagHeader::is_sequence_header)
    }

    /// Tag header plus payload, the value the next record's
    /// `PreviousTagSize` should carry.
    pub fn size(&self) -> u32 {
        framing::TAG_HEADER_SIZE as u32 + self.payload_size
    }

    fn header(&self) -> ParsedTagHeader {
        ParsedTagHeader {
            tag_type: self.tag_type,
            data_size: self.payload_size,
            timestamp_ms: self.timestamp_ms,
            stream_id: self.stream_id,
        }
    }

    /// Writes `PreviousTagSize`, the tag header and the payload.
    ///
    /// Metadata is re-encoded and `payload_size` updated to match. Every
    /// other variant is copied byte for byte from `source` at `offset`.
    /// Returns the position of the payload in `out`. `offset` keeps
    /// pointing into the source, so the same tags can be written again.
    pub fn write_to<R, W>(&mut self, source: &mut R, out: &mut W) -> Result<u64, FlvError>
    where
        R: Read + Seek,
        W: Write + Seek,
    {
        let encoded = match &self.body {
            TagBody::Metadata(variables) => {
                let bytes = Amf0Encoder::metadata_to_vec(variables)?;
                self.payload_size = u32::try_from(bytes.len())
                    .map_err(|_| FlvError::TagTooLarge(bytes.len()))?;
                Some(bytes)
            }
            _ => None,
        };

        let header = framing::encode_tag_header_bytes(&self.header())?;
        out.write_all(&framing::encode_prev_tag_size_bytes(self.prev_tag_size))?;
        out.write_all(&header)?;
        let payload_offset = out.stream_position()?;

        match encoded {
            Some(bytes) => out.write_all(&bytes)?,
            None => self.copy_payload(source, out)?,
        }

        Ok(payload_offset)
    }

    /// Rewrites the metadata payload in place at `payload_offset`, the
    /// position returned by [`FlvTag::write_to`].
    ///
    /// The encoded size must not have changed since the tag was written,
    /// otherwise the following records would be overwritten.
    pub fn rewrite_metadata<W: Write + Seek>(
        &self,
        out: &mut W,
        payload_offset: u64,
    ) -> Result<(), FlvError> {
        let Some(variables) = self.metadata() else {
            return Ok(());
        };
        let bytes = Amf0Encoder::metadata_to_vec(variables)?;
        if bytes.len() != self.payload_size as usize {
            return Err(FlvError::Integrity {
                offset: payload_offset,
                expected_end: payload_offset + self.payload_size as u64,
                actual_end: payload_offset + bytes.len() as u64,
            });
        }
        out.seek(SeekFrom::Start(payload_offset))?;
        out.write_all(&bytes)?;
        Ok(())
    }

    fn copy_payload<R, W>(&self, source: &mut R, out: &mut W) -> Result<(), FlvError>
    where
        R: Read + Seek,
        W: Write,
    {
        source.seek(SeekFrom::Start(self.offset))?;
        let copied = io::copy(&mut source.by_ref().take(self.payload_size as u64), out)?;
        if copied != self.payload_size as u64 {
            return Err(FlvError::ShortPayload {
                offset: self.offset,
                expected: self.payload_size,
                copied,
            });
        }
        trace!(offset = self.offset, size = self.payload_size, "Copied tag payload");
        Ok(())
    }
}

impl fmt::Display for FlvTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} tag @{} ms, {} bytes",
            self.tag_type, self.timestamp_ms, self.payload_size
        )?;
        match &self.body {
            TagBody::Audio(header) => write!(f, " [{header}]"),
            TagBody::Video(header) => write!(f, " [{header}]"),
            TagBody::Metadata(variables) => write!(f, " [{} keys]", variables.len()),
            TagBody::Unparsed => Ok(()),
        }
    }
}
