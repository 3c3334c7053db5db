use std::fmt;

use crate::resolution::Resolution;

/// FLV Frame Type
///
/// Defined by:
/// - video_file_format_spec_v10.pdf (Chapter 1 - The FLV File Format - Video tags)
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoFrameType {
    KeyFrame = 1,
    InterFrame = 2,
    DisposableInterFrame = 3,
    GeneratedKeyFrame = 4,
    VideoInfoFrame = 5,
}

impl TryFrom<u8> for VideoFrameType {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, u8> {
        match value {
            1 => Ok(Self::KeyFrame),
            2 => Ok(Self::InterFrame),
            3 => Ok(Self::DisposableInterFrame),
            4 => Ok(Self::GeneratedKeyFrame),
            5 => Ok(Self::VideoInfoFrame),
            other => Err(other),
        }
    }
}

/// FLV Video Codec ID (legacy, non-enhanced signalling)
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoCodecId {
    Jpeg = 1,
    SorensonH263 = 2,
    ScreenVideo = 3,
    On2Vp6 = 4,
    On2Vp6Alpha = 5,
    ScreenVideo2 = 6,
    Avc = 7,
}

impl TryFrom<u8> for VideoCodecId {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, u8> {
        match value {
            1 => Ok(Self::Jpeg),
            2 => Ok(Self::SorensonH263),
            3 => Ok(Self::ScreenVideo),
            4 => Ok(Self::On2Vp6),
            5 => Ok(Self::On2Vp6Alpha),
            6 => Ok(Self::ScreenVideo2),
            7 => Ok(Self::Avc),
            other => Err(other),
        }
    }
}

/// Second payload byte of an AVC video tag.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvcPacketType {
    SequenceHeader = 0,
    Nalu = 1,
    EndOfSequence = 2,
}

impl TryFrom<u8> for AvcPacketType {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, u8> {
        match value {
            0 => Ok(Self::SequenceHeader),
            1 => Ok(Self::Nalu),
            2 => Ok(Self::EndOfSequence),
            other => Err(other),
        }
    }
}

/// What a video tag tells about itself without decoding the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoTagHeader {
    /// Raw high nibble of the control byte.
    pub frame_type: u8,
    /// Raw low nibble of the control byte.
    pub codec_id: u8,
    /// Present for AVC tags long enough to carry it.
    pub avc_packet_type: Option<AvcPacketType>,
    /// Parsed from the SPS of an AVC sequence header, when possible.
    pub resolution: Option<Resolution>,
}

impl VideoTagHeader {
    pub fn from_control_byte(byte: u8) -> Self {
        Self {
            frame_type: (byte >> 4) & 0x0F,
            codec_id: byte & 0x0F,
            avc_packet_type: None,
            resolution: None,
        }
    }

    pub fn frame(&self) -> Option<VideoFrameType> {
        VideoFrameType::try_from(self.frame_type).ok()
    }

    pub fn codec(&self) -> Option<VideoCodecId> {
        VideoCodecId::try_from(self.codec_id).ok()
    }

    pub fn is_key_frame(&self) -> bool {
        self.frame() == Some(VideoFrameType::KeyFrame)
    }

    pub fn is_avc(&self) -> bool {
        self.codec() == Some(VideoCodecId::Avc)
    }

    /// An AVC key frame carrying the decoder configuration record. Decoding
    /// from any later key frame needs this tag in front of it.
    pub fn is_sequence_header(&self) -> bool {
        self.is_key_frame()
            && self.is_avc()
            && self.avc_packet_type == Some(AvcPacketType::SequenceHeader)
    }

    pub fn width(&self) -> u32 {
        self.resolution.map_or(0, |r| r.width)
    }

    pub fn height(&self) -> u32 {
        self.resolution.map_or(0, |r| r.height)
    }
}

impl fmt::Display for VideoTagHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.frame() {
            Some(frame) => write!(f, "{frame:?}")?,
            None => write!(f, "Frame({})", self.frame_type)?,
        }
        match self.codec() {
            Some(codec) => write!(f, " {codec:?}")?,
            None => write!(f, " Codec({})", self.codec_id)?,
        }
        if self.is_sequence_header() {
            write!(f, " (sequence header)")?;
        }
        Ok(())
    }
}
