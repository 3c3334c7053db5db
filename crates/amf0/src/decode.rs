use crate::define::{AMF0_DATE_SIZE, AMF0_ON_METADATA, Amf0Marker};
use crate::{Amf0ReadError, RootKind, ScriptValue, Variables};

/// An AMF0 Decoder for `onMetaData` script payloads.
///
/// This decoder takes a reference to a byte slice holding exactly one script
/// tag payload and tracks how many bytes were consumed, so callers can check
/// the decoded object against the declared payload size.
pub struct Amf0Decoder<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Amf0Decoder<'a> {
    /// Create a new AMF0 decoder.
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Number of bytes consumed so far.
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Check if the decoder has reached the end of the AMF0 data.
    pub const fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Read `len` bytes from the buffer, advancing the position.
    fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], Amf0ReadError> {
        let end = self.pos + len;
        if end > self.data.len() {
            return Err(Amf0ReadError::UnexpectedEof {
                needed: end - self.data.len(),
                position: self.pos,
            });
        }
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    /// Read a single byte, advancing the position.
    fn read_u8(&mut self) -> Result<u8, Amf0ReadError> {
        let bytes = self.read_bytes(1)?;
        Ok(bytes[0])
    }

    /// Read a big-endian u16, advancing the position.
    fn read_u16_be(&mut self) -> Result<u16, Amf0ReadError> {
        let bytes = self.read_bytes(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    /// Read a big-endian u32, advancing the position.
    fn read_u32_be(&mut self) -> Result<u32, Amf0ReadError> {
        let bytes = self.read_bytes(4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Read a big-endian f64, advancing the position.
    fn read_f64_be(&mut self) -> Result<f64, Amf0ReadError> {
        let bytes = self.read_bytes(8)?;
        let mut buf = [0u8; 8];
        buf.copy_from_slice(bytes);
        Ok(f64::from_be_bytes(buf))
    }

    /// Decode the `onMetaData` object.
    ///
    /// Layout: one marker byte (not checked), the name string, a root type
    /// byte (ECMA array with a 32-bit count, or object), then key/value pairs
    /// until an empty key followed by the object-end marker.
    ///
    /// The declared ECMA array count is read but not trusted: many muxers
    /// write a stale count, the end marker is authoritative.
    pub fn decode_metadata(&mut self) -> Result<Variables, Amf0ReadError> {
        let _name_marker = self.read_u8()?;

        let name = self.read_string()?;
        if name != AMF0_ON_METADATA {
            return Err(Amf0ReadError::InvalidMetadataName(name));
        }

        let root_byte = self.read_u8()?;
        let root = match Amf0Marker::try_from(root_byte) {
            Ok(Amf0Marker::EcmaArray) => {
                let _declared_count = self.read_u32_be()?;
                RootKind::EcmaArray
            }
            Ok(Amf0Marker::Object) => RootKind::Object,
            _ => return Err(Amf0ReadError::InvalidRootType(root_byte)),
        };

        let mut variables = Variables::with_root(root);
        loop {
            let key = self.read_string()?;
            if key.is_empty() {
                let end = self.read_u8()?;
                if end != Amf0Marker::ObjectEnd as u8 {
                    return Err(Amf0ReadError::MissingObjectEnd(end));
                }
                break;
            }

            let value = self.read_value()?;
            variables.set(key, value);
        }

        Ok(variables)
    }

    fn read_value(&mut self) -> Result<ScriptValue, Amf0ReadError> {
        let marker_byte = self.read_u8()?;
        let marker = Amf0Marker::try_from(marker_byte).map_err(Amf0ReadError::UnknownMarker)?;

        match marker {
            Amf0Marker::Number => Ok(ScriptValue::Number(self.read_f64_be()?)),
            Amf0Marker::Boolean => Ok(ScriptValue::Boolean(self.read_u8()? > 0)),
            Amf0Marker::String => Ok(ScriptValue::String(self.read_string()?)),
            Amf0Marker::Date => {
                let mut raw = [0u8; AMF0_DATE_SIZE];
                raw.copy_from_slice(self.read_bytes(AMF0_DATE_SIZE)?);
                Ok(ScriptValue::Date(raw))
            }
            Amf0Marker::Null => Ok(ScriptValue::Null),
            Amf0Marker::Undefined => Ok(ScriptValue::Undefined),
            Amf0Marker::Unsupported => Ok(ScriptValue::Unsupported),
            // Nested containers have no fixed length; there is no safe way to skip them.
            other => Err(Amf0ReadError::UnsupportedType(other)),
        }
    }

    fn read_string(&mut self) -> Result<String, Amf0ReadError> {
        let len = self.read_u16_be()? as usize;
        let bytes = self.read_bytes(len)?;
        Ok(String::from_utf8(bytes.to_vec())?)
    }
}
