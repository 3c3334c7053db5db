/// AMF0 marker types.
/// Defined in amf0_spec_121207.pdf section 2.1
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[repr(u8)]
pub enum Amf0Marker {
    /// number-marker
    Number = 0x00,
    /// boolean-marker
    Boolean = 0x01,
    /// string-marker
    String = 0x02,
    /// object-marker
    Object = 0x03,
    /// movieclip-marker
    ///
    /// reserved, not supported
    MovieClipMarker = 0x04,
    /// null-marker
    Null = 0x05,
    /// undefined-marker
    Undefined = 0x06,
    /// reference-marker
    Reference = 0x07,
    /// ecma-array-marker
    EcmaArray = 0x08,
    /// object-end-marker
    ObjectEnd = 0x09,
    /// strict-array-marker
    StrictArray = 0x0a,
    /// date-marker
    Date = 0x0b,
    /// long-string-marker
    LongString = 0x0c,
    /// unsupported-marker
    Unsupported = 0x0d,
    /// recordset-marker
    ///
    /// reserved, not supported
    Recordset = 0x0e,
    /// xml-document-marker
    XmlDocument = 0x0f,
    /// typed-object-marker
    TypedObject = 0x10,
    /// avmplus-object-marker
    ///
    /// AMF3 marker
    AVMPlusObject = 0x11,
}

impl TryFrom<u8> for Amf0Marker {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, u8> {
        match value {
            0x00 => Ok(Self::Number),
            0x01 => Ok(Self::Boolean),
            0x02 => Ok(Self::String),
            0x03 => Ok(Self::Object),
            0x04 => Ok(Self::MovieClipMarker),
            0x05 => Ok(Self::Null),
            0x06 => Ok(Self::Undefined),
            0x07 => Ok(Self::Reference),
            0x08 => Ok(Self::EcmaArray),
            0x09 => Ok(Self::ObjectEnd),
            0x0a => Ok(Self::StrictArray),
            0x0b => Ok(Self::Date),
            0x0c => Ok(Self::LongString),
            0x0d => Ok(Self::Unsupported),
            0x0e => Ok(Self::Recordset),
            0x0f => Ok(Self::XmlDocument),
            0x10 => Ok(Self::TypedObject),
            0x11 => Ok(Self::AVMPlusObject),
            other => Err(other),
        }
    }
}

impl Amf0Marker {
    /// Whether a value carrying this marker can be stored in a metadata
    /// [`Variables`](crate::Variables) map.
    pub fn is_script_value(self) -> bool {
        matches!(
            self,
            Self::Number
                | Self::Boolean
                | Self::String
                | Self::Date
                | Self::Null
                | Self::Undefined
                | Self::Unsupported
        )
    }
}

/// Size in bytes of an AMF0 date body: a big-endian f64 followed by a
/// 16-bit timezone field.
pub const AMF0_DATE_SIZE: usize = 10;

/// Name of the script object carrying FLV playback metadata.
pub const AMF0_ON_METADATA: &str = "onMetaData";

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_marker_try_from() {
        let cases = [
            (Amf0Marker::Number, 0x00),
            (Amf0Marker::Boolean, 0x01),
            (Amf0Marker::String, 0x02),
            (Amf0Marker::Object, 0x03),
            (Amf0Marker::MovieClipMarker, 0x04),
            (Amf0Marker::Null, 0x05),
            (Amf0Marker::Undefined, 0x06),
            (Amf0Marker::Reference, 0x07),
            (Amf0Marker::EcmaArray, 0x08),
            (Amf0Marker::ObjectEnd, 0x09),
            (Amf0Marker::StrictArray, 0x0a),
            (Amf0Marker::Date, 0x0b),
            (Amf0Marker::LongString, 0x0c),
            (Amf0Marker::Unsupported, 0x0d),
            (Amf0Marker::Recordset, 0x0e),
            (Amf0Marker::XmlDocument, 0x0f),
            (Amf0Marker::TypedObject, 0x10),
            (Amf0Marker::AVMPlusObject, 0x11),
        ];

        for (marker, value) in cases {
            assert_eq!(marker as u8, value);
            assert_eq!(Amf0Marker::try_from(value), Ok(marker));
        }

        assert_eq!(Amf0Marker::try_from(0x12), Err(0x12));
        assert_eq!(Amf0Marker::try_from(0xFF), Err(0xFF));
    }

    #[test]
    fn test_script_value_markers() {
        assert!(Amf0Marker::Number.is_script_value());
        assert!(Amf0Marker::Date.is_script_value());
        assert!(Amf0Marker::Unsupported.is_script_value());
        assert!(!Amf0Marker::Object.is_script_value());
        assert!(!Amf0Marker::LongString.is_script_value());
        assert!(!Amf0Marker::StrictArray.is_script_value());
    }
}
