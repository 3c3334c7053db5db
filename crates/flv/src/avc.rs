//! Best-effort picture size extraction from an AVC sequence header.
//!
//! The payload of an AVC sequence header tag (after the 5-byte FLV video
//! header) is an `AVCDecoderConfigurationRecord` (ISO/IEC 14496-15 5.2.4.1).
//! The width and height come from the first SPS it carries. Anything
//! unexpected yields `None`; resolution metadata is optional.

use std::io;

use bytes::Bytes;
use tracing::trace;

use crate::resolution::Resolution;

const NAL_TYPE_SPS: u8 = 7;

/// Extracts the resolution from an `AVCDecoderConfigurationRecord`.
pub fn resolution_from_decoder_config(record: &[u8]) -> Option<Resolution> {
    let mut cursor = io::Cursor::new(Bytes::copy_from_slice(record));
    let config = match h264::AVCDecoderConfigurationRecord::parse(&mut cursor) {
        Ok(config) => config,
        Err(e) => {
            trace!(len = record.len(), error = %e, "Invalid AVC decoder config");
            return None;
        }
    };
    let sps = config.sps.first()?;
    resolution_from_sps(sps)
}

/// Parses a complete SPS NAL unit (header byte included) and returns the
/// cropped picture size.
pub fn resolution_from_sps(nal: &[u8]) -> Option<Resolution> {
    if nal.first()? & 0x1F != NAL_TYPE_SPS {
        return None;
    }
    let sps = match h264::Sps::parse_with_emulation_prevention(io::Cursor::new(nal)) {
        Ok(sps) => sps,
        Err(e) => {
            trace!(len = nal.len(), error = %e, "Invalid SPS");
            return None;
        }
    };
    let width = u32::try_from(sps.width()).ok()?;
    let height = u32::try_from(sps.height()).ok()?;
    let resolution = Resolution::new(width, height);
    resolution.is_valid().then_some(resolution)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct BitWriter {
        bits: Vec<bool>,
    }

    impl BitWriter {
        fn put(&mut self, value: u32, count: u32) {
            for i in (0..count).rev() {
                self.bits.push((value >> i) & 1 == 1);
            }
        }

        fn ue(&mut self, value: u32) {
            let code = value + 1;
            let len = 32 - code.leading_zeros();
            self.put(0, len - 1);
            self.put(code, len);
        }

        fn finish(mut self) -> Vec<u8> {
            // rbsp_stop_one_bit + alignment
            self.bits.push(true);
            while self.bits.len() % 8 != 0 {
                self.bits.push(false);
            }
            self.bits
                .chunks(8)
                .map(|chunk| chunk.iter().fold(0u8, |acc, &b| (acc << 1) | b as u8))
                .collect()
        }
    }

    fn baseline_sps(width_mbs: u32, height_mbs: u32) -> Vec<u8> {
        let mut w = BitWriter::default();
        w.put(66, 8); // profile_idc
        w.put(0, 8); // constraint flags
        w.put(31, 8); // level_idc
        w.ue(0); // sps id
        w.ue(0); // log2_max_frame_num_minus4
        w.ue(0); // pic_order_cnt_type
        w.ue(0); // log2_max_pic_order_cnt_lsb_minus4
        w.ue(1); // max_num_ref_frames
        w.put(0, 1); // gaps
        w.ue(width_mbs - 1);
        w.ue(height_mbs - 1);
        w.put(1, 1); // frame_mbs_only
        w.put(1, 1); // direct_8x8_inference
        w.put(0, 1); // frame_cropping
        w.put(0, 1); // vui
        let mut nal = vec![0x67];
        nal.extend(w.finish());
        nal
    }

    fn high_sps_1080p() -> Vec<u8> {
        let mut w = BitWriter::default();
        w.put(100, 8);
        w.put(0, 8);
        w.put(40, 8);
        w.ue(0); // sps id
        w.ue(1); // chroma_format_idc 4:2:0
        w.ue(0); // bit_depth_luma_minus8
        w.ue(0); // bit_depth_chroma_minus8
        w.put(0, 1); // qpprime
        w.put(0, 1); // seq_scaling_matrix_present
        w.ue(0); // log2_max_frame_num_minus4
        w.ue(2); // pic_order_cnt_type
        w.ue(4); // max_num_ref_frames
        w.put(0, 1);
        w.ue(119); // 120 mbs -> 1920
        w.ue(67); // 68 mbs -> 1088
        w.put(1, 1); // frame_mbs_only
        w.put(1, 1);
        w.put(1, 1); // frame_cropping
        w.ue(0);
        w.ue(0);
        w.ue(0);
        w.ue(4); // 4 * 2 rows
        w.put(0, 1);
        let mut nal = vec![0x67];
        nal.extend(w.finish());
        nal
    }

    fn decoder_config(sps: &[u8]) -> Vec<u8> {
        let mut record = vec![0x01, sps[1], sps[2], sps[3], 0xFF, 0xE1];
        record.extend_from_slice(&(sps.len() as u16).to_be_bytes());
        record.extend_from_slice(sps);
        // one PPS
        record.extend_from_slice(&[0x01, 0x00, 0x04, 0x68, 0xCE, 0x3C, 0x80]);
        record
    }

    #[test]
    fn test_baseline_720p() {
        let sps = baseline_sps(80, 45);
        assert_eq!(resolution_from_sps(&sps), Some(Resolution::new(1280, 720)));
        assert_eq!(
            resolution_from_decoder_config(&decoder_config(&sps)),
            Some(Resolution::new(1280, 720))
        );
    }

    #[test]
    fn test_high_profile_cropped_1080p() {
        let sps = high_sps_1080p();
        assert_eq!(
            resolution_from_decoder_config(&decoder_config(&sps)),
            Some(Resolution::new(1920, 1080))
        );
    }

    #[test]
    fn test_not_an_sps() {
        let mut sps = baseline_sps(80, 45);
        sps[0] = 0x68;
        assert_eq!(resolution_from_sps(&sps), None);
    }

    #[test]
    fn test_truncated_record() {
        let sps = baseline_sps(80, 45);
        let record = decoder_config(&sps);
        assert_eq!(resolution_from_decoder_config(&record[..10]), None);
        assert_eq!(resolution_from_decoder_config(&[0x01, 0x42]), None);
        assert_eq!(resolution_from_decoder_config(&[0x01, 0x42, 0, 0x1F, 0xFF, 0xE0]), None);
    }

    #[test]
    fn test_oversized_scaling_delta() {
        let mut w = BitWriter::default();
        w.put(100, 8);
        w.put(0, 8);
        w.put(40, 8);
        w.ue(0); // sps id
        w.ue(1); // chroma_format_idc
        w.ue(0);
        w.ue(0);
        w.put(0, 1); // qpprime
        w.put(1, 1); // seq_scaling_matrix_present
        w.put(1, 1); // list 0 present
        w.ue(4_294_967_293); // delta_scale = i32::MAX
        let mut nal = vec![0x67];
        nal.extend(w.finish());

        assert_eq!(resolution_from_sps(&nal), None);
        assert_eq!(resolution_from_decoder_config(&decoder_config(&nal)), None);
    }

    #[test]
    fn test_emulation_prevention_in_sps() {
        // the long ue() codes leave `00 00 00` in the raw SPS
        let sps = baseline_sps(4096, 65536);
        let mut escaped = vec![sps[0]];
        let mut zeros = 0;
        for &byte in &sps[1..] {
            if zeros >= 2 && byte <= 0x03 {
                escaped.push(0x03);
                zeros = 0;
            }
            zeros = if byte == 0 { zeros + 1 } else { 0 };
            escaped.push(byte);
        }
        assert_eq!(escaped.len(), sps.len() + 1);
        assert_eq!(
            resolution_from_sps(&escaped),
            Some(Resolution::new(65536, 1_048_576))
        );
    }
}
