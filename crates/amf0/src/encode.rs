use std::io::Write;

use byteorder::{BigEndian, WriteBytesExt};

use crate::define::{AMF0_ON_METADATA, Amf0Marker};
use crate::{Amf0WriteError, RootKind, ScriptValue, Variables};

/// AMF0 encoder for `onMetaData` script payloads.
///
/// Mirrors [`Amf0Decoder::decode_metadata`](crate::Amf0Decoder::decode_metadata)
/// exactly, so `decode(encode(m)) == m` for every map.
pub struct Amf0Encoder;

impl Amf0Encoder {
    /// Encode the whole `onMetaData` object, entries in insertion order.
    pub fn encode_metadata<W: Write>(
        writer: &mut W,
        variables: &Variables,
    ) -> Result<(), Amf0WriteError> {
        writer.write_u8(Amf0Marker::String as u8)?;
        Self::encode_utf8(writer, AMF0_ON_METADATA)?;

        let root = variables.root();
        writer.write_u8(root.marker() as u8)?;
        if root == RootKind::EcmaArray {
            writer.write_u32::<BigEndian>(ecma_count(variables.len())?)?;
        }

        for (key, value) in variables.iter() {
            Self::encode_utf8(writer, key)?;
            Self::encode_value(writer, value)?;
        }

        Self::encode_object_end(writer)
    }

    /// Encode the `onMetaData` object into a fresh buffer.
    pub fn metadata_to_vec(variables: &Variables) -> Result<Vec<u8>, Amf0WriteError> {
        let mut buf = Vec::with_capacity(64 + variables.len() * 24);
        Self::encode_metadata(&mut buf, variables)?;
        Ok(buf)
    }

    /// Encode a single marker-prefixed value.
    pub fn encode_value<W: Write>(writer: &mut W, value: &ScriptValue) -> Result<(), Amf0WriteError> {
        writer.write_u8(value.marker() as u8)?;
        match value {
            ScriptValue::Number(n) => writer.write_f64::<BigEndian>(*n)?,
            ScriptValue::Boolean(b) => writer.write_u8(u8::from(*b))?,
            ScriptValue::String(s) => Self::encode_utf8(writer, s)?,
            ScriptValue::Date(raw) => writer.write_all(raw)?,
            ScriptValue::Null | ScriptValue::Undefined | ScriptValue::Unsupported => {}
        }
        Ok(())
    }

    /// Encode a length-prefixed string without a marker.
    ///
    /// Strings that do not fit a 16-bit length would need the long-string
    /// marker, which metadata maps cannot carry.
    pub fn encode_utf8<W: Write>(writer: &mut W, s: &str) -> Result<(), Amf0WriteError> {
        let len = u16::try_from(s.len())
            .map_err(|_| Amf0WriteError::UnsupportedType(Amf0Marker::LongString))?;
        writer.write_u16::<BigEndian>(len)?;
        writer.write_all(s.as_bytes())?;
        Ok(())
    }

    /// Encode the object-end sequence: an empty key and the end marker.
    pub fn encode_object_end<W: Write>(writer: &mut W) -> Result<(), Amf0WriteError> {
        writer.write_u16::<BigEndian>(0)?;
        writer.write_u8(Amf0Marker::ObjectEnd as u8)?;
        Ok(())
    }
}

fn ecma_count(len: usize) -> Result<u32, Amf0WriteError> {
    u32::try_from(len).map_err(|_| Amf0WriteError::TooManyEntries(len))
}
