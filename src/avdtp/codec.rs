//! Codec Information for AVDTP Streams
//!
//! The engine treats codec information as an opaque element, apart from the
//! media type and codec type octets. Those two decide the media header
//! policy and the SSRC of outbound packets. SBC gets a typed builder since it
//! is the mandatory A2DP codec.

use crate::constants::CODEC_INFO_SIZE;

/// Offset of the media type octet in a codec information element
pub const MEDIA_TYPE_OFFSET: usize = 1;

/// Offset of the codec type octet in a codec information element
pub const CODEC_TYPE_OFFSET: usize = 2;

/// Length of the SBC codec information element, length byte excluded
pub const SBC_INFO_LENGTH: u8 = 6;

/// Audio codec types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum CodecType {
    /// SBC (Sub-Band Coding) - Mandatory codec for A2DP
    Sbc = 0x00,
    /// MPEG-1,2 Audio
    Mpeg12Audio = 0x01,
    /// MPEG-2,4 AAC
    Mpeg24Aac = 0x02,
    /// ATRAC family
    Atrac = 0x04,
    /// Vendor-specific codec
    VendorSpecific = 0xFF,
}

impl CodecType {
    /// Decode a codec type octet
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x00 => Some(Self::Sbc),
            0x01 => Some(Self::Mpeg12Audio),
            0x02 => Some(Self::Mpeg24Aac),
            0x04 => Some(Self::Atrac),
            0xFF => Some(Self::VendorSpecific),
            _ => None,
        }
    }

    /// Whether media packets of this codec carry the media header
    ///
    /// Standard A2DP codecs always do. Vendor codecs only do when content
    /// protection is active.
    #[must_use]
    pub const fn uses_media_header(&self, content_protection: bool) -> bool {
        match self {
            Self::VendorSpecific => content_protection,
            _ => true,
        }
    }
}

/// Media types of a stream endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MediaType {
    /// Audio media
    Audio = 0x00,
    /// Video media
    Video = 0x01,
    /// Multimedia media
    Multimedia = 0x02,
}

/// SBC (Sub-Band Coding) codec information
///
/// Each field is a bitfield of the A2DP SBC information element. A
/// capability advertises several bits per field, a configuration exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SbcCapabilities {
    /// Sampling frequencies (`SbcCapabilities::FREQ_*`)
    pub sampling_frequencies: u8,
    /// Channel modes (`SbcCapabilities::MODE_*`)
    pub channel_modes: u8,
    /// Block lengths (`SbcCapabilities::BLOCKS_*`)
    pub block_lengths: u8,
    /// Subbands (`SbcCapabilities::SUBBANDS_*`)
    pub subbands: u8,
    /// Allocation methods (`SbcCapabilities::ALLOC_*`)
    pub allocation_methods: u8,
    /// Minimum bitpool value (2-250)
    pub min_bitpool: u8,
    /// Maximum bitpool value (2-250)
    pub max_bitpool: u8,
}

impl SbcCapabilities {
    /// 16000 Hz
    pub const FREQ_16000: u8 = 0x08;
    /// 32000 Hz
    pub const FREQ_32000: u8 = 0x04;
    /// 44100 Hz
    pub const FREQ_44100: u8 = 0x02;
    /// 48000 Hz
    pub const FREQ_48000: u8 = 0x01;
    /// Mono
    pub const MODE_MONO: u8 = 0x08;
    /// Dual Channel
    pub const MODE_DUAL_CHANNEL: u8 = 0x04;
    /// Stereo
    pub const MODE_STEREO: u8 = 0x02;
    /// Joint Stereo
    pub const MODE_JOINT_STEREO: u8 = 0x01;
    /// 4 blocks
    pub const BLOCKS_4: u8 = 0x08;
    /// 8 blocks
    pub const BLOCKS_8: u8 = 0x04;
    /// 12 blocks
    pub const BLOCKS_12: u8 = 0x02;
    /// 16 blocks
    pub const BLOCKS_16: u8 = 0x01;
    /// 4 subbands
    pub const SUBBANDS_4: u8 = 0x02;
    /// 8 subbands
    pub const SUBBANDS_8: u8 = 0x01;
    /// SNR allocation
    pub const ALLOC_SNR: u8 = 0x02;
    /// Loudness allocation
    pub const ALLOC_LOUDNESS: u8 = 0x01;

    /// Single 44.1 kHz joint stereo configuration
    #[must_use]
    pub const fn joint_stereo_44100() -> Self {
        Self {
            sampling_frequencies: Self::FREQ_44100,
            channel_modes: Self::MODE_JOINT_STEREO,
            block_lengths: Self::BLOCKS_16,
            subbands: Self::SUBBANDS_8,
            allocation_methods: Self::ALLOC_LOUDNESS,
            min_bitpool: 2,
            max_bitpool: 53,
        }
    }

    /// Encode as an A2DP codec information element (length byte first)
    #[must_use]
    pub const fn to_codec_info(&self, media_type: MediaType) -> [u8; CODEC_INFO_SIZE] {
        let mut info = [0u8; CODEC_INFO_SIZE];
        info[0] = SBC_INFO_LENGTH;
        info[MEDIA_TYPE_OFFSET] = (media_type as u8) << 4;
        info[CODEC_TYPE_OFFSET] = CodecType::Sbc as u8;
        info[3] = (self.sampling_frequencies << 4) | (self.channel_modes & 0x0F);
        info[4] = (self.block_lengths << 4)
            | ((self.subbands & 0x03) << 2)
            | (self.allocation_methods & 0x03);
        info[5] = self.min_bitpool;
        info[6] = self.max_bitpool;
        info
    }

    /// Decode an A2DP SBC codec information element
    #[must_use]
    pub fn from_codec_info(info: &[u8]) -> Option<Self> {
        match info {
            [SBC_INFO_LENGTH, _, codec, a, b, min, max, ..] if *codec == CodecType::Sbc as u8 => {
                Some(Self {
                    sampling_frequencies: a >> 4,
                    channel_modes: a & 0x0F,
                    block_lengths: b >> 4,
                    subbands: (b >> 2) & 0x03,
                    allocation_methods: b & 0x03,
                    min_bitpool: *min,
                    max_bitpool: *max,
                })
            }
            _ => None,
        }
    }
}

impl Default for SbcCapabilities {
    fn default() -> Self {
        Self {
            sampling_frequencies: Self::FREQ_16000
                | Self::FREQ_32000
                | Self::FREQ_44100
                | Self::FREQ_48000,
            channel_modes: Self::MODE_MONO
                | Self::MODE_DUAL_CHANNEL
                | Self::MODE_STEREO
                | Self::MODE_JOINT_STEREO,
            block_lengths: Self::BLOCKS_4 | Self::BLOCKS_8 | Self::BLOCKS_12 | Self::BLOCKS_16,
            subbands: Self::SUBBANDS_4 | Self::SUBBANDS_8,
            allocation_methods: Self::ALLOC_SNR | Self::ALLOC_LOUDNESS,
            min_bitpool: 2,
            max_bitpool: 53,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_header_policy() {
        assert!(CodecType::Sbc.uses_media_header(false));
        assert!(CodecType::Mpeg24Aac.uses_media_header(true));
        assert!(!CodecType::VendorSpecific.uses_media_header(false));
        assert!(CodecType::VendorSpecific.uses_media_header(true));
    }

    #[test]
    fn test_sbc_codec_info_layout() {
        let info = SbcCapabilities::default().to_codec_info(MediaType::Audio);
        assert_eq!(&info[..7], &[0x06, 0x00, 0x00, 0xFF, 0xFF, 2, 53]);

        let video = SbcCapabilities::joint_stereo_44100().to_codec_info(MediaType::Video);
        assert_eq!(video[MEDIA_TYPE_OFFSET], 0x10);
        assert_eq!(video[3], 0x21);
        assert_eq!(video[4], 0x15);
    }

    #[test]
    fn test_sbc_codec_info_decode() {
        let caps = SbcCapabilities::joint_stereo_44100();
        let info = caps.to_codec_info(MediaType::Audio);
        assert_eq!(SbcCapabilities::from_codec_info(&info), Some(caps));

        let mut vendor = info;
        vendor[CODEC_TYPE_OFFSET] = CodecType::VendorSpecific as u8;
        assert_eq!(SbcCapabilities::from_codec_info(&vendor), None);
        assert_eq!(SbcCapabilities::from_codec_info(&info[..4]), None);
    }

    #[test]
    fn test_codec_type_decode() {
        assert_eq!(CodecType::from_u8(0x02), Some(CodecType::Mpeg24Aac));
        assert_eq!(CodecType::from_u8(0xFF), Some(CodecType::VendorSpecific));
        assert_eq!(CodecType::from_u8(0x03), None);
    }
}
