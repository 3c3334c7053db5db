use std::fmt::Display;
use std::io::{self, Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use tracing::{debug, warn};

use crate::error::FlvError;

pub const FLV_HEADER_SIZE: usize = 9;
const FLV_SIGNATURE: u32 = 0x464C56;
// DataOffset is a 32-bit header length field. In practice it is 9 for standard FLV.
// Put a conservative bound to avoid skipping unbounded data for a bogus header.
const MAX_DATA_OFFSET: u32 = 64 * 1024;

pub const FLAG_AUDIO: u8 = 0b0000_0100;
pub const FLAG_VIDEO: u8 = 0b0000_0001;

// Struct representing the FLV header, 9 bytes in total
#[derive(Debug, Clone, PartialEq)]
pub struct FlvHeader {
    // The version of the FLV file format, 1 byte, usually 0x01
    pub version: u8,
    // Raw flags byte. Bits other than audio/video are kept so they survive a rewrite.
    pub flags: u8,
    // Total size of the header as declared by the source, 4 bytes, usually 0x09
    pub data_offset: u32,
}

impl Display for FlvHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds = Vec::with_capacity(2);
        if self.has_audio() {
            kinds.push("Audio");
        }
        if self.has_video() {
            kinds.push("Video");
        }
        if kinds.is_empty() {
            kinds.push("None");
        }
        write!(f, "{}", kinds.join(", "))
    }
}

impl FlvHeader {
    /// Creates a new `FlvHeader` with the specified audio and video flags.
    pub fn new(has_audio: bool, has_video: bool) -> Self {
        let mut header = FlvHeader {
            version: 0x01,
            flags: 0,
            data_offset: FLV_HEADER_SIZE as u32,
        };
        header.set_has_audio(has_audio);
        header.set_has_video(has_video);
        header
    }

    pub fn has_audio(&self) -> bool {
        self.flags & FLAG_AUDIO != 0
    }

    pub fn has_video(&self) -> bool {
        self.flags & FLAG_VIDEO != 0
    }

    pub fn set_has_audio(&mut self, value: bool) {
        if value {
            self.flags |= FLAG_AUDIO;
        } else {
            self.flags &= !FLAG_AUDIO;
        }
    }

    pub fn set_has_video(&mut self, value: bool) {
        if value {
            self.flags |= FLAG_VIDEO;
        } else {
            self.flags &= !FLAG_VIDEO;
        }
    }

    /// Parses the FLV header from a byte stream.
    ///
    /// The reader is left at `data_offset`, i.e. at the first
    /// `PreviousTagSize` field. A wrong signature is a format error; an
    /// unexpected version or reserved flag bits are only logged, since
    /// broken muxers produce both and the tags are still readable.
    pub fn parse<R: Read>(reader: &mut R) -> Result<Self, FlvError> {
        // Signature is a 3-byte string 'FLV'
        let signature = reader.read_u24::<BigEndian>()?;
        if signature != FLV_SIGNATURE {
            return Err(FlvError::InvalidHeader(format!(
                "invalid signature 0x{signature:06X}"
            )));
        }

        let version = reader.read_u8()?;
        if version != 0x01 {
            warn!(version, "Unexpected FLV version");
        }

        let flags = reader.read_u8()?;
        if flags & !(FLAG_AUDIO | FLAG_VIDEO) != 0 {
            debug!(flags, "Reserved FLV header flag bits set");
        }

        let data_offset = reader.read_u32::<BigEndian>()?;
        if data_offset < FLV_HEADER_SIZE as u32 {
            return Err(FlvError::InvalidHeader(format!(
                "invalid DataOffset: {data_offset}"
            )));
        }
        if data_offset > MAX_DATA_OFFSET {
            return Err(FlvError::InvalidHeader(format!(
                "DataOffset too large: {data_offset}"
            )));
        }

        // Skip any extra header bytes.
        let extra = (data_offset as usize).saturating_sub(FLV_HEADER_SIZE);
        if extra > 0 {
            let mut limited = reader.take(extra as u64);
            io::copy(&mut limited, &mut io::sink())?;
            if limited.limit() != 0 {
                return Err(FlvError::Io(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "Unexpected EOF while skipping extended FLV header bytes",
                )));
            }
        }

        Ok(FlvHeader {
            version,
            flags,
            data_offset,
        })
    }

    /// Writes the canonical 9-byte header.
    ///
    /// Extended header bytes of the source are not preserved, so `DataOffset`
    /// is always written as 9.
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<(), FlvError> {
        writer.write_u24::<BigEndian>(FLV_SIGNATURE)?;
        writer.write_u8(self.version)?;
        writer.write_u8(self.flags)?;
        writer.write_u32::<BigEndian>(FLV_HEADER_SIZE as u32)?;
        Ok(())
    }
}
