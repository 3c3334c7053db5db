use crate::error::FlvError;
use crate::tag::FlvTagType;

pub const PREV_TAG_SIZE_FIELD_SIZE: usize = 4;
pub const TAG_HEADER_SIZE: usize = 11;

pub const MAX_TAG_DATA_SIZE: u32 = 0xFF_FFFF;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedTagHeader {
    pub tag_type: FlvTagType,
    pub data_size: u32,
    pub timestamp_ms: u32,
    pub stream_id: u32,
}

impl ParsedTagHeader {
    /// A header whose type byte and size are both zero. Never produced by a
    /// muxer; it marks zero-filled garbage at the end of a broken recording.
    pub fn is_zero_record(&self) -> bool {
        self.tag_type == FlvTagType::Unknown(0) && self.data_size == 0
    }
}

pub fn parse_prev_tag_size(bytes: [u8; PREV_TAG_SIZE_FIELD_SIZE]) -> u32 {
    u32::from_be_bytes(bytes)
}

/// Parses the 11-byte tag header.
///
/// The whole type byte is kept (filter bit included) so tags with flags this
/// crate does not understand are classified as unknown and copied verbatim.
pub fn parse_tag_header_bytes(bytes: [u8; TAG_HEADER_SIZE]) -> ParsedTagHeader {
    let tag_type = FlvTagType::from(bytes[0]);

    let data_size = ((bytes[1] as u32) << 16) | ((bytes[2] as u32) << 8) | (bytes[3] as u32);

    // Timestamp: lower 24 bits + extended 8 bits.
    let timestamp_ms = ((bytes[7] as u32) << 24)
        | ((bytes[4] as u32) << 16)
        | ((bytes[5] as u32) << 8)
        | (bytes[6] as u32);

    let stream_id = ((bytes[8] as u32) << 16) | ((bytes[9] as u32) << 8) | (bytes[10] as u32);

    ParsedTagHeader {
        tag_type,
        data_size,
        timestamp_ms,
        stream_id,
    }
}

pub fn encode_prev_tag_size_bytes(prev_tag_size: u32) -> [u8; PREV_TAG_SIZE_FIELD_SIZE] {
    prev_tag_size.to_be_bytes()
}

pub fn encode_tag_header_bytes(header: &ParsedTagHeader) -> Result<[u8; TAG_HEADER_SIZE], FlvError> {
    let mut out = [0u8; TAG_HEADER_SIZE];

    if header.data_size > MAX_TAG_DATA_SIZE {
        return Err(FlvError::TagTooLarge(header.data_size as usize));
    }

    out[0] = u8::from(header.tag_type);

    // DataSize is UI24.
    out[1] = (header.data_size >> 16) as u8;
    out[2] = (header.data_size >> 8) as u8;
    out[3] = header.data_size as u8;

    out[4] = (header.timestamp_ms >> 16) as u8;
    out[5] = (header.timestamp_ms >> 8) as u8;
    out[6] = header.timestamp_ms as u8;
    out[7] = (header.timestamp_ms >> 24) as u8;

    // StreamID is UI24, typically 0.
    out[8] = (header.stream_id >> 16) as u8;
    out[9] = (header.stream_id >> 8) as u8;
    out[10] = header.stream_id as u8;

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tag_header() {
        let bytes = [0x09, 0x00, 0x01, 0x02, 0x12, 0x34, 0x56, 0x01, 0x00, 0x00, 0x00];
        let header = parse_tag_header_bytes(bytes);
        assert_eq!(header.tag_type, FlvTagType::Video);
        assert_eq!(header.data_size, 0x0102);
        assert_eq!(header.timestamp_ms, 0x0112_3456);
        assert_eq!(header.stream_id, 0);
        assert!(!header.is_zero_record());

        assert_eq!(encode_tag_header_bytes(&header).unwrap(), bytes);
    }

    #[test]
    fn test_zero_record() {
        let header = parse_tag_header_bytes([0; TAG_HEADER_SIZE]);
        assert!(header.is_zero_record());
    }

    #[test]
    fn test_filtered_tag_is_unknown() {
        let header = parse_tag_header_bytes([0x28, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(header.tag_type, FlvTagType::Unknown(0x28));
        assert_eq!(encode_tag_header_bytes(&header).unwrap()[0], 0x28);
    }

    #[test]
    fn test_oversized_tag() {
        let header = ParsedTagHeader {
            tag_type: FlvTagType::Audio,
            data_size: MAX_TAG_DATA_SIZE + 1,
            timestamp_ms: 0,
            stream_id: 0,
        };
        assert!(matches!(
            encode_tag_header_bytes(&header),
            Err(FlvError::TagTooLarge(_))
        ));
    }

    #[test]
    fn test_prev_tag_size() {
        assert_eq!(parse_prev_tag_size(encode_prev_tag_size_bytes(0x1234)), 0x1234);
    }
}
