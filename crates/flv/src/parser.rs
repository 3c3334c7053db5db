//! Tag factory: reads one tag record at a time from a seekable stream.
//!
//! Payloads are located, not loaded. Audio and video tags have their leading
//! header bytes inspected and the reader is then moved past the payload, so
//! the resulting [`FlvTag`] only records where the bytes live. Metadata is
//! the exception: it is read and decoded into [`Variables`].

use std::io::{Read, Seek, SeekFrom};

use amf0::{Amf0Decoder, Amf0ReadError, Variables};
use byteorder::{BigEndian, ReadBytesExt};
use tracing::{debug, trace, warn};

use crate::audio::AudioTagHeader;
use crate::avc;
use crate::error::FlvError;
use crate::framing::{self, ParsedTagHeader};
use crate::header::FlvHeader;
use crate::tag::{FlvTag, FlvTagType, TagBody};
use crate::video::{AvcPacketType, VideoTagHeader};

/// Bytes in front of the `AVCDecoderConfigurationRecord` in a sequence
/// header tag: control byte, packet type, composition time.
const AVC_VIDEO_HEADER_SIZE: usize = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PrevTagSizeMode {
    /// Ignore `PreviousTagSize` values (fastest, most tolerant).
    #[default]
    Ignore,
    /// Log mismatches but continue parsing.
    Warn,
    /// Treat any mismatch as an error.
    Strict,
}

/// Result of reading one record.
#[derive(Debug, PartialEq)]
pub enum ParsedRecord {
    Tag(FlvTag),
    /// Clean end of stream.
    End,
    /// A zero-type, zero-size record, or a record running past the end of
    /// the stream. Nothing after `position` can be trusted.
    Corrupt { position: u64, remaining: u64 },
}

/// Sequential tag reader over a stream of known length.
pub struct FlvParser {
    stream_len: u64,
    mode: PrevTagSizeMode,
    expected_prev_tag_size: u32,
}

impl FlvParser {
    pub fn new(stream_len: u64, mode: PrevTagSizeMode) -> Self {
        Self {
            stream_len,
            mode,
            expected_prev_tag_size: 0,
        }
    }

    /// Parse the FLV header from a reader.
    pub fn parse_header<R: Read>(reader: &mut R) -> Result<FlvHeader, FlvError> {
        FlvHeader::parse(reader)
    }

    /// Reads the `PreviousTagSize` field and the tag record following it.
    ///
    /// The reader must be positioned at a `PreviousTagSize` field; on
    /// success it is left at the next one.
    pub fn next_record<R: Read + Seek>(&mut self, reader: &mut R) -> Result<ParsedRecord, FlvError> {
        let position = reader.stream_position()?;
        if position >= self.stream_len {
            return Ok(ParsedRecord::End);
        }
        if self.remaining(position) < framing::PREV_TAG_SIZE_FIELD_SIZE as u64 {
            return Ok(self.corrupt(position));
        }

        let prev_tag_size = reader.read_u32::<BigEndian>()?;
        self.check_prev_tag_size(prev_tag_size, position)?;

        let tag_start = position + framing::PREV_TAG_SIZE_FIELD_SIZE as u64;
        if tag_start == self.stream_len {
            return Ok(ParsedRecord::End);
        }
        if self.remaining(tag_start) < framing::TAG_HEADER_SIZE as u64 {
            return Ok(self.corrupt(tag_start));
        }

        let mut header_bytes = [0u8; framing::TAG_HEADER_SIZE];
        reader.read_exact(&mut header_bytes)?;
        let header = framing::parse_tag_header_bytes(header_bytes);
        if header.is_zero_record() {
            return Ok(self.corrupt(tag_start));
        }

        let offset = tag_start + framing::TAG_HEADER_SIZE as u64;
        if self.remaining(offset) < header.data_size as u64 {
            debug!(
                tag_type = %header.tag_type,
                size = header.data_size,
                offset,
                "Tag payload runs past end of stream"
            );
            return Ok(self.corrupt(tag_start));
        }

        let body = match header.tag_type {
            FlvTagType::Audio => Self::read_audio(reader, &header)?,
            FlvTagType::Video => Self::read_video(reader, &header)?,
            FlvTagType::ScriptData => {
                TagBody::Metadata(Self::read_metadata(reader, &header, offset)?)
            }
            FlvTagType::Unknown(value) => {
                trace!(tag_type = value, offset, "Unparsed tag");
                TagBody::Unparsed
            }
        };

        let next = offset + header.data_size as u64;
        reader.seek(SeekFrom::Start(next))?;
        self.expected_prev_tag_size = framing::TAG_HEADER_SIZE as u32 + header.data_size;

        Ok(ParsedRecord::Tag(FlvTag::from_parts(
            header,
            prev_tag_size,
            offset,
            body,
        )))
    }

    fn remaining(&self, position: u64) -> u64 {
        self.stream_len.saturating_sub(position)
    }

    fn corrupt(&self, position: u64) -> ParsedRecord {
        ParsedRecord::Corrupt {
            position,
            remaining: self.remaining(position),
        }
    }

    fn check_prev_tag_size(&self, actual: u32, position: u64) -> Result<(), FlvError> {
        if actual == self.expected_prev_tag_size {
            return Ok(());
        }
        match self.mode {
            PrevTagSizeMode::Ignore => Ok(()),
            PrevTagSizeMode::Warn => {
                warn!(
                    expected = self.expected_prev_tag_size,
                    got = actual,
                    position,
                    "PreviousTagSize mismatch"
                );
                Ok(())
            }
            PrevTagSizeMode::Strict => Err(FlvError::PrevTagSizeMismatch {
                position,
                expected: self.expected_prev_tag_size,
                actual,
            }),
        }
    }

    fn read_audio<R: Read>(reader: &mut R, header: &ParsedTagHeader) -> Result<TagBody, FlvError> {
        if header.data_size == 0 {
            return Ok(TagBody::Unparsed);
        }
        let control = reader.read_u8()?;
        Ok(TagBody::Audio(AudioTagHeader::from_control_byte(control)))
    }

    fn read_video<R: Read>(reader: &mut R, header: &ParsedTagHeader) -> Result<TagBody, FlvError> {
        if header.data_size == 0 {
            return Ok(TagBody::Unparsed);
        }
        let mut video = VideoTagHeader::from_control_byte(reader.read_u8()?);
        if !video.is_avc() || header.data_size < 2 {
            return Ok(TagBody::Video(video));
        }

        video.avc_packet_type = AvcPacketType::try_from(reader.read_u8()?).ok();
        if video.is_sequence_header() && header.data_size as usize > AVC_VIDEO_HEADER_SIZE {
            // Sequence headers are small and rare, reading them is cheap.
            let mut rest = vec![0u8; header.data_size as usize - 2];
            reader.read_exact(&mut rest)?;
            video.resolution = avc::resolution_from_decoder_config(&rest[3..]);
            match video.resolution {
                Some(resolution) => debug!(%resolution, "Parsed AVC sequence header"),
                None => debug!("No resolution in AVC sequence header"),
            }
        }
        Ok(TagBody::Video(video))
    }

    fn read_metadata<R: Read>(
        reader: &mut R,
        header: &ParsedTagHeader,
        offset: u64,
    ) -> Result<Variables, FlvError> {
        let mut payload = vec![0u8; header.data_size as usize];
        reader.read_exact(&mut payload)?;

        let expected_end = offset + header.data_size as u64;
        let mut decoder = Amf0Decoder::new(&payload);
        let variables = match decoder.decode_metadata() {
            Ok(variables) => variables,
            Err(Amf0ReadError::UnexpectedEof { needed, .. }) => {
                return Err(FlvError::Integrity {
                    offset,
                    expected_end,
                    actual_end: expected_end + needed as u64,
                });
            }
            Err(e) => return Err(e.into()),
        };

        let actual_end = offset + decoder.position() as u64;
        if actual_end != expected_end {
            return Err(FlvError::Integrity {
                offset,
                expected_end,
                actual_end,
            });
        }

        debug!(offset, keys = variables.len(), "Decoded onMetaData");
        Ok(variables)
    }
}
