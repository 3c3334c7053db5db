//! Audio tag header inspection.
//!
//! Only the first payload byte of an audio tag is interpreted:
//!
//! ```text
//! bits 7-4  SoundFormat
//! bits 3-2  SoundRate
//! bit  1    SoundSize
//! bit  0    SoundType
//! ```

use std::fmt;

/// FLV Sound Format
///
/// Defined by:
/// - video_file_format_spec_v10.pdf (Chapter 1 - The FLV File Format - Audio tags)
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundFormat {
    LinearPcmPlatformEndian = 0,
    Adpcm = 1,
    Mp3 = 2,
    LinearPcmLittleEndian = 3,
    Nellymoser16KhzMono = 4,
    Nellymoser8KhzMono = 5,
    Nellymoser = 6,
    G711ALaw = 7,
    G711MuLaw = 8,
    Reserved = 9,
    Aac = 10,
    Speex = 11,
    Mp3_8Khz = 14,
    DeviceSpecific = 15,
}

impl TryFrom<u8> for SoundFormat {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, u8> {
        match value {
            0 => Ok(Self::LinearPcmPlatformEndian),
            1 => Ok(Self::Adpcm),
            2 => Ok(Self::Mp3),
            3 => Ok(Self::LinearPcmLittleEndian),
            4 => Ok(Self::Nellymoser16KhzMono),
            5 => Ok(Self::Nellymoser8KhzMono),
            6 => Ok(Self::Nellymoser),
            7 => Ok(Self::G711ALaw),
            8 => Ok(Self::G711MuLaw),
            9 => Ok(Self::Reserved),
            10 => Ok(Self::Aac),
            11 => Ok(Self::Speex),
            14 => Ok(Self::Mp3_8Khz),
            15 => Ok(Self::DeviceSpecific),
            other => Err(other),
        }
    }
}

/// Sampling rate class. AAC always signals `Khz44`.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundRate {
    Khz5_5 = 0,
    Khz11 = 1,
    Khz22 = 2,
    Khz44 = 3,
}

impl SoundRate {
    fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0 => Self::Khz5_5,
            1 => Self::Khz11,
            2 => Self::Khz22,
            _ => Self::Khz44,
        }
    }

    /// Nominal rate in Hz, as written to `audiosamplerate`.
    pub fn hz(self) -> f64 {
        match self {
            Self::Khz5_5 => 5512.0,
            Self::Khz11 => 11025.0,
            Self::Khz22 => 22050.0,
            Self::Khz44 => 44100.0,
        }
    }
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundSize {
    Bits8 = 0,
    Bits16 = 1,
}

impl SoundSize {
    pub fn bits(self) -> f64 {
        match self {
            Self::Bits8 => 8.0,
            Self::Bits16 => 16.0,
        }
    }
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundType {
    Mono = 0,
    Stereo = 1,
}

/// Audio parameters decoded from the control byte of an audio tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioTagHeader {
    /// Raw 4-bit sound format; reserved values are kept as-is.
    pub sound_format: u8,
    pub sound_rate: SoundRate,
    pub sound_size: SoundSize,
    pub sound_type: SoundType,
}

impl AudioTagHeader {
    pub fn from_control_byte(byte: u8) -> Self {
        Self {
            sound_format: (byte >> 4) & 0x0F,
            sound_rate: SoundRate::from_bits(byte >> 2),
            sound_size: if byte & 0b10 != 0 {
                SoundSize::Bits16
            } else {
                SoundSize::Bits8
            },
            sound_type: if byte & 0b01 != 0 {
                SoundType::Stereo
            } else {
                SoundType::Mono
            },
        }
    }

    pub fn format(&self) -> Option<SoundFormat> {
        SoundFormat::try_from(self.sound_format).ok()
    }

    pub fn is_stereo(&self) -> bool {
        self.sound_type == SoundType::Stereo
    }
}

impl fmt::Display for AudioTagHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let channels = if self.is_stereo() { "stereo" } else { "mono" };
        match self.format() {
            Some(format) => write!(
                f,
                "{:?} {} Hz {} bits {}",
                format,
                self.sound_rate.hz(),
                self.sound_size.bits(),
                channels
            ),
            None => write!(
                f,
                "format {} {} Hz {} bits {}",
                self.sound_format,
                self.sound_rate.hz(),
                self.sound_size.bits(),
                channels
            ),
        }
    }
}
