//! # FLV container
//!
//! [`FlvFile`] owns the source stream, the header and the ordered list of
//! tags read from it. Repair operations (see `repair` and `metadata`) edit
//! the list in place; [`FlvFile::write`] then emits the result, copying
//! audio/video payloads straight from the source.
//!
//! The metadata tag is tracked by index into the tag list. Every operation
//! that inserts or removes tags refreshes that index.

use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor, Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::time::Duration;

use amf0::Variables;
use flv::framing;
use flv::{FlvError, FlvHeader, FlvParser, FlvTag, ParsedRecord};
use tracing::{debug, info, warn};

use crate::config::FlvFixConfig;

pub struct FlvFile<R> {
    pub(crate) source: R,
    size: u64,
    pub(crate) header: FlvHeader,
    pub(crate) tags: Vec<FlvTag>,
    pub(crate) metadata_index: Option<usize>,
    config: FlvFixConfig,
}

impl FlvFile<BufReader<File>> {
    /// Reads the tag list from a file. Payloads stay on disk until
    /// [`FlvFile::write`], so the output must not be the same path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, FlvError> {
        Self::open_with_config(path, FlvFixConfig::default())
    }

    pub fn open_with_config(
        path: impl AsRef<Path>,
        config: FlvFixConfig,
    ) -> Result<Self, FlvError> {
        let file = File::open(path.as_ref())?;
        debug!(path = %path.as_ref().display(), "Opening FLV file");
        Self::with_config(BufReader::new(file), config)
    }
}

impl FlvFile<Cursor<Vec<u8>>> {
    /// Reads the whole file into memory first. The result may be written
    /// back over `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, FlvError> {
        Self::load_with_config(path, FlvFixConfig::default())
    }

    pub fn load_with_config(
        path: impl AsRef<Path>,
        config: FlvFixConfig,
    ) -> Result<Self, FlvError> {
        let bytes = std::fs::read(path.as_ref())?;
        debug!(
            path = %path.as_ref().display(),
            size = bytes.len(),
            "Loaded FLV file into memory"
        );
        Self::with_config(Cursor::new(bytes), config)
    }
}

impl<R: Read + Seek> FlvFile<R> {
    pub fn from_reader(source: R) -> Result<Self, FlvError> {
        Self::with_config(source, FlvFixConfig::default())
    }

    /// Parses the header and every tag of `source`.
    ///
    /// Structural errors abort the parse. Trailing corruption and a second
    /// metadata tag are dropped with a warning, or rejected in strict mode.
    pub fn with_config(mut source: R, config: FlvFixConfig) -> Result<Self, FlvError> {
        let size = source.seek(SeekFrom::End(0))?;
        source.seek(SeekFrom::Start(0))?;

        let header = FlvParser::parse_header(&mut source)?;
        let mut parser = FlvParser::new(size, config.prev_tag_size_mode);
        let mut tags = Vec::new();
        let mut metadata_index = None;

        loop {
            match parser.next_record(&mut source)? {
                ParsedRecord::Tag(tag) => {
                    if tag.is_metadata() {
                        if metadata_index.is_some() {
                            if config.is_strict() {
                                return Err(FlvError::DuplicateMetadata { offset: tag.offset });
                            }
                            warn!(offset = tag.offset, "Discarding duplicate metadata tag");
                            continue;
                        }
                        metadata_index = Some(tags.len());
                    }
                    tags.push(tag);
                }
                ParsedRecord::End => break,
                ParsedRecord::Corrupt {
                    position,
                    remaining,
                } => {
                    if config.is_strict() {
                        return Err(FlvError::Truncated {
                            position,
                            remaining,
                        });
                    }
                    warn!(
                        position,
                        remaining, "Corrupt data detected, dropping the rest of the stream"
                    );
                    break;
                }
            }
        }

        debug!(
            size,
            tags = tags.len(),
            metadata = metadata_index.is_some(),
            "Parsed FLV file"
        );

        Ok(Self {
            source,
            size,
            header,
            tags,
            metadata_index,
            config,
        })
    }

    /// Writes header, tags and trailing `PreviousTagSize` to `out`, then
    /// patches the metadata `filesize` in place. Returns the number of
    /// bytes written.
    ///
    /// On error the output is incomplete and must be discarded.
    pub fn write<W: Write + Seek>(&mut self, out: &mut W) -> Result<u64, FlvError> {
        let start = out.stream_position()?;
        self.header.write(out)?;

        let metadata_index = self.metadata_index();
        if let Some(metadata) = self.metadata_mut() {
            metadata.set("filesize", 0.0);
        }

        let mut prev_tag_size = 0u32;
        let mut metadata_payload_offset = None;
        for (index, tag) in self.tags.iter_mut().enumerate() {
            tag.prev_tag_size = prev_tag_size;
            let payload_offset = tag.write_to(&mut self.source, out)?;
            if Some(index) == metadata_index {
                metadata_payload_offset = Some(payload_offset);
            }
            prev_tag_size = tag.size();
        }
        out.write_all(&framing::encode_prev_tag_size_bytes(prev_tag_size))?;

        let end = out.stream_position()?;
        let written = end - start;

        if let (Some(index), Some(payload_offset)) = (metadata_index, metadata_payload_offset) {
            let tag = &mut self.tags[index];
            if let Some(metadata) = tag.metadata_mut() {
                metadata.set("filesize", written as f64);
            }
            tag.rewrite_metadata(out, payload_offset)?;
            out.seek(SeekFrom::Start(end))?;
        }
        out.flush()?;

        info!(bytes = written, tags = self.tags.len(), "FLV written");
        Ok(written)
    }

    /// Creates (or truncates) `path` and writes the file to it.
    pub fn write_to_path(&mut self, path: impl AsRef<Path>) -> Result<u64, FlvError> {
        debug!(path = %path.as_ref().display(), "Writing FLV file");
        let mut out = BufWriter::new(File::create(path.as_ref())?);
        let written = self.write(&mut out)?;
        out.flush()?;
        Ok(written)
    }
}

impl<R> FlvFile<R> {
    pub fn header(&self) -> &FlvHeader {
        &self.header
    }

    pub fn header_mut(&mut self) -> &mut FlvHeader {
        &mut self.header
    }

    pub fn tags(&self) -> &[FlvTag] {
        &self.tags
    }

    /// Tags for in-place edits. The list itself can only be reshaped
    /// through the repair operations, which keep the metadata index valid.
    pub fn tags_mut(&mut self) -> &mut [FlvTag] {
        &mut self.tags
    }

    pub fn config(&self) -> &FlvFixConfig {
        &self.config
    }

    /// Length of the source stream in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn metadata_index(&self) -> Option<usize> {
        self.metadata_index
            .filter(|&index| self.tags.get(index).is_some_and(FlvTag::is_metadata))
    }

    pub fn metadata(&self) -> Option<&Variables> {
        self.metadata_index()
            .and_then(|index| self.tags[index].metadata())
    }

    pub fn metadata_mut(&mut self) -> Option<&mut Variables> {
        let index = self.metadata_index()?;
        self.tags[index].metadata_mut()
    }

    pub fn audio_tag_count(&self) -> usize {
        self.tags.iter().filter(|tag| tag.is_audio()).count()
    }

    pub fn video_tag_count(&self) -> usize {
        self.tags.iter().filter(|tag| tag.is_video()).count()
    }

    /// Sum of audio payload sizes.
    pub fn audio_data_bytes(&self) -> u64 {
        self.tags
            .iter()
            .filter(|tag| tag.is_audio())
            .map(|tag| tag.payload_size as u64)
            .sum()
    }

    /// Sum of video payload sizes.
    pub fn video_data_bytes(&self) -> u64 {
        self.tags
            .iter()
            .filter(|tag| tag.is_video())
            .map(|tag| tag.payload_size as u64)
            .sum()
    }

    pub fn first_timestamp(&self) -> Option<Duration> {
        self.tags.iter().map(FlvTag::timestamp).min()
    }

    pub fn last_timestamp(&self) -> Option<Duration> {
        self.tags.iter().map(FlvTag::timestamp).max()
    }

    /// Span between the smallest and the largest tag timestamp.
    pub fn duration(&self) -> Duration {
        match (self.first_timestamp(), self.last_timestamp()) {
            (Some(first), Some(last)) => last - first,
            _ => Duration::ZERO,
        }
    }

    /// Re-locates the metadata tag after the tag list changed shape.
    pub(crate) fn refresh_metadata_index(&mut self) {
        self.metadata_index = self.tags.iter().position(FlvTag::is_metadata);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Strictness;
    use crate::test_utils::{FlvBuilder, init_tracing, parse, parse_with, sample_stream};
    use amf0::Amf0Decoder;
    use flv::FlvTagType;

    fn rewrite<R: Read + Seek>(file: &mut FlvFile<R>) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        file.write(&mut out).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_parse_sample() {
        init_tracing();
        let bytes = sample_stream();
        let size = bytes.len() as u64;
        let file = parse(bytes);

        assert_eq!(file.size(), size);
        assert_eq!(file.tags().len(), 10);
        assert_eq!(file.metadata_index(), Some(0));
        assert_eq!(file.audio_tag_count(), 3);
        assert_eq!(file.video_tag_count(), 5);
        assert_eq!(file.audio_data_bytes(), 15);
        assert_eq!(file.duration(), Duration::from_millis(2040));
        assert!(file.header().has_audio());

        let header = file.tags()[1].video().unwrap();
        assert!(header.is_sequence_header());
        assert_eq!(header.width(), 1280);
        assert_eq!(header.height(), 720);
    }

    #[test]
    fn test_write_then_reparse_is_equivalent() {
        init_tracing();
        let mut original = parse(sample_stream());
        let written = rewrite(&mut original);
        let reparsed = parse_with(written, FlvFixConfig::strict());

        assert_eq!(reparsed.tags().len(), original.tags().len());
        for (a, b) in original.tags().iter().zip(reparsed.tags()) {
            assert_eq!(a.tag_type, b.tag_type);
            assert_eq!(a.timestamp_ms, b.timestamp_ms);
            assert_eq!(a.payload_size, b.payload_size);
            assert_eq!(a.body, b.body);
        }
    }

    #[test]
    fn test_write_patches_filesize() {
        let mut file = parse(sample_stream());
        let mut out = Cursor::new(Vec::new());
        let written = file.write(&mut out).unwrap();
        let bytes = out.into_inner();

        assert_eq!(written, bytes.len() as u64);
        assert_eq!(file.metadata().unwrap().get_number("filesize"), Some(written as f64));

        // header (9) + PreviousTagSize0 (4) + tag header (11)
        let payload_size = file.tags()[0].payload_size as usize;
        let payload = &bytes[24..24 + payload_size];
        let on_disk = Amf0Decoder::new(payload).decode_metadata().unwrap();
        assert_eq!(on_disk.get_number("filesize"), Some(bytes.len() as f64));
    }

    #[test]
    fn test_write_recomputes_prev_tag_size() {
        let bytes = FlvBuilder::new(true, false)
            .audio(0)
            .mp3_audio(20)
            .finish();
        let mut tampered = bytes.clone();
        // second PreviousTagSize field
        let second = 13 + 11 + 5;
        tampered[second..second + 4].copy_from_slice(&[0xFF; 4]);

        let mut file = parse(tampered);
        assert_eq!(rewrite(&mut file), bytes);
    }

    #[test]
    fn test_write_without_metadata_is_byte_identical() {
        let bytes = FlvBuilder::new(true, true)
            .key_frame(0)
            .audio(0)
            .unknown(0x0F, 10)
            .finish();
        let mut file = parse(bytes.clone());
        assert_eq!(rewrite(&mut file), bytes);
        // the source is still readable, a second write gives the same bytes
        assert_eq!(rewrite(&mut file), bytes);
    }

    #[test]
    fn test_empty_stream() {
        let bytes = FlvBuilder::new(false, false).finish();
        let mut file = parse(bytes.clone());
        assert!(file.tags().is_empty());
        assert_eq!(file.duration(), Duration::ZERO);
        assert_eq!(rewrite(&mut file), bytes);
    }

    #[test]
    fn test_trailing_zeros_are_truncated() {
        init_tracing();
        let bytes = FlvBuilder::new(true, true)
            .key_frame(0)
            .audio(10)
            .finish_with_zeros(32);
        let file = parse(bytes.clone());
        assert_eq!(file.tags().len(), 2);

        let strict = FlvFile::with_config(
            Cursor::new(bytes),
            FlvFixConfig {
                strictness: Strictness::Strict,
                ..Default::default()
            },
        );
        assert!(matches!(
            strict,
            Err(FlvError::Truncated { remaining: 32, .. })
        ));
    }

    #[test]
    fn test_short_trailing_record_is_truncated() {
        let mut bytes = FlvBuilder::new(true, true).key_frame(0).finish();
        bytes.extend_from_slice(&[0; 6]);
        let file = parse(bytes);
        assert_eq!(file.tags().len(), 1);
    }

    #[test]
    fn test_duplicate_metadata() {
        init_tracing();
        let mut first = Variables::new();
        first.set("duration", 1.0);
        let mut second = Variables::new();
        second.set("duration", 2.0);

        let bytes = FlvBuilder::new(false, true)
            .metadata(&first)
            .key_frame(0)
            .metadata(&second)
            .inter_frame(40)
            .finish();

        let file = parse(bytes.clone());
        assert_eq!(file.tags().len(), 3);
        assert_eq!(file.metadata().unwrap().get_number("duration"), Some(1.0));
        assert_eq!(
            file.tags().iter().filter(|tag| tag.is_metadata()).count(),
            1
        );

        let strict = FlvFile::with_config(
            Cursor::new(bytes),
            FlvFixConfig {
                strictness: Strictness::Strict,
                ..Default::default()
            },
        );
        assert!(matches!(strict, Err(FlvError::DuplicateMetadata { .. })));
    }

    #[test]
    fn test_corrupt_metadata_is_fatal() {
        let mut payload = amf0::Amf0Encoder::metadata_to_vec(&Variables::new()).unwrap();
        payload.push(0);
        let bytes = FlvBuilder::new(false, true)
            .tag(18, 0, &payload)
            .key_frame(0)
            .finish();
        assert!(matches!(
            FlvFile::from_reader(Cursor::new(bytes)),
            Err(FlvError::Integrity { .. })
        ));
    }

    #[test]
    fn test_invalid_signature() {
        let mut bytes = sample_stream();
        bytes[0] = b'X';
        assert!(matches!(
            FlvFile::from_reader(Cursor::new(bytes)),
            Err(FlvError::InvalidHeader(_))
        ));
    }

    #[test]
    fn test_unknown_tags_survive() {
        let file = parse(sample_stream());
        let unknown = &file.tags()[5];
        assert_eq!(unknown.tag_type, FlvTagType::Unknown(0x0F));
        assert_eq!(unknown.payload_size, 4);
    }

    #[test]
    fn test_open_load_and_write_to_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.flv");
        let bytes = sample_stream();
        std::fs::write(&path, &bytes).unwrap();

        let mut opened = FlvFile::open(&path).unwrap();
        let out_path = dir.path().join("output.flv");
        let written = opened.write_to_path(&out_path).unwrap();
        assert_eq!(std::fs::metadata(&out_path).unwrap().len(), written);

        // in-memory mode may overwrite its own input
        let mut loaded = FlvFile::load(&path).unwrap();
        loaded.write_to_path(&path).unwrap();
        let reparsed = FlvFile::open(&path).unwrap();
        assert_eq!(reparsed.tags().len(), opened.tags().len());
        assert_eq!(
            reparsed.metadata().unwrap().get_number("filesize"),
            Some(written as f64)
        );
    }
}
