//! Stream configuration records
//!
//! A [`StreamConfig`] carries the codec information element, the content
//! protection list and the service capability mask. The SCB keeps two of
//! them: the configuration proposed in the exchange in flight and the one
//! currently active.

use super::codec::{CODEC_TYPE_OFFSET, CodecType, MEDIA_TYPE_OFFSET};
use crate::AvdtpError;
use crate::constants::{CODEC_INFO_SIZE, PROTECT_INFO_SIZE};
use heapless::Vec;

/// Service capability mask (bitfield)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ServiceCapabilities(pub u16);

impl ServiceCapabilities {
    /// Media transport
    pub const TRANSPORT: u16 = 0x0002;
    /// Reporting
    pub const REPORT: u16 = 0x0004;
    /// Recovery
    pub const RECOVERY: u16 = 0x0008;
    /// Content protection
    pub const CONTENT_PROTECTION: u16 = 0x0010;
    /// Header compression
    pub const HEADER_COMPRESSION: u16 = 0x0020;
    /// Multiplexing
    pub const MULTIPLEXING: u16 = 0x0040;
    /// Media codec
    pub const CODEC: u16 = 0x0080;
    /// Delay reporting
    pub const DELAY_REPORT: u16 = 0x0100;

    /// Check if a capability is present
    #[must_use]
    pub const fn supports(&self, capability: u16) -> bool {
        (self.0 & capability) != 0
    }
}

/// Commands this stream endpoint refuses with `NOT_SUPPORTED_COMMAND` (bitfield)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UnsupportedCommands(pub u8);

impl UnsupportedCommands {
    /// Get configuration
    pub const GET_CONFIG: u8 = 0x01;
    /// Security control
    pub const SECURITY: u8 = 0x02;
    /// Reconfigure
    pub const RECONFIG: u8 = 0x04;

    /// Check if a command is refused
    #[must_use]
    pub const fn contains(&self, command: u8) -> bool {
        (self.0 & command) != 0
    }
}

/// Stream configuration: codec element, protection list and capability mask
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamConfig {
    /// Codec information element, length byte first
    pub codec_info: [u8; CODEC_INFO_SIZE],
    /// Content protection information list
    pub protect_info: Vec<u8, PROTECT_INFO_SIZE>,
    /// Number of codec sections carried (0 or 1)
    pub num_codec: u8,
    /// Number of content protection sections carried
    pub num_protect: u8,
    /// Service capabilities
    pub psc_mask: ServiceCapabilities,
}

impl StreamConfig {
    /// Create an empty configuration
    #[must_use]
    pub const fn new() -> Self {
        Self {
            codec_info: [0; CODEC_INFO_SIZE],
            protect_info: Vec::new(),
            num_codec: 0,
            num_protect: 0,
            psc_mask: ServiceCapabilities(0),
        }
    }

    /// Create a configuration carrying one codec section
    ///
    /// # Errors
    /// Returns [`AvdtpError::InvalidParameter`] if the element does not fit
    pub fn from_codec_info(info: &[u8]) -> Result<Self, AvdtpError> {
        let mut config = Self::new();
        config
            .codec_info
            .get_mut(..info.len())
            .ok_or(AvdtpError::InvalidParameter)?
            .copy_from_slice(info);
        config.num_codec = 1;
        config.psc_mask =
            ServiceCapabilities(ServiceCapabilities::TRANSPORT | ServiceCapabilities::CODEC);
        Ok(config)
    }

    /// Add a content protection section
    ///
    /// # Errors
    /// Returns [`AvdtpError::InvalidParameter`] if the list is full
    pub fn with_protection(mut self, info: &[u8]) -> Result<Self, AvdtpError> {
        self.protect_info
            .extend_from_slice(info)
            .map_err(|()| AvdtpError::InvalidParameter)?;
        self.num_protect = self.num_protect.saturating_add(1);
        self.psc_mask.0 |= ServiceCapabilities::CONTENT_PROTECTION;
        Ok(self)
    }

    /// Add service capabilities
    #[must_use]
    pub fn with_capabilities(mut self, capabilities: u16) -> Self {
        self.psc_mask.0 |= capabilities;
        self
    }

    /// Codec type octet of the codec element
    #[must_use]
    pub const fn codec_type_octet(&self) -> u8 {
        self.codec_info[CODEC_TYPE_OFFSET]
    }

    /// Decoded codec type, if known
    #[must_use]
    pub const fn codec_type(&self) -> Option<CodecType> {
        CodecType::from_u8(self.codec_type_octet())
    }

    /// Whether content protection is active
    #[must_use]
    pub const fn has_content_protection(&self) -> bool {
        self.num_protect > 0
    }

    /// Whether outbound media packets carry the media header
    #[must_use]
    pub const fn uses_media_header(&self) -> bool {
        match self.codec_type() {
            Some(codec) => codec.uses_media_header(self.has_content_protection()),
            None => self.has_content_protection(),
        }
    }

    /// SSRC of outbound media packets
    ///
    /// Derived from the media type and codec type octets, so it identifies
    /// the negotiated codec rather than being random.
    #[must_use]
    pub const fn media_ssrc(&self) -> u32 {
        (self.codec_info[MEDIA_TYPE_OFFSET] | self.codec_info[CODEC_TYPE_OFFSET]) as u32
    }

    /// Apply the sections an update actually carries
    ///
    /// The codec section is copied only if the update has one, the same for
    /// the protection section. The capability mask is left alone.
    pub fn apply_update(&mut self, update: &Self) {
        if update.num_codec > 0 {
            self.codec_info = update.codec_info;
            self.num_codec = update.num_codec;
        }
        if update.num_protect > 0 {
            self.protect_info.clone_from(&update.protect_info);
            self.num_protect = update.num_protect;
        }
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::avdtp::codec::{MediaType, SbcCapabilities};

    fn sbc() -> StreamConfig {
        StreamConfig::from_codec_info(&SbcCapabilities::default().to_codec_info(MediaType::Audio))
            .unwrap()
    }

    #[test]
    fn test_partial_update_keeps_protection() {
        let mut current = sbc().with_protection(&[0x02, 0x00]).unwrap();

        let mut codec_only = StreamConfig::new();
        let aac = [0x03, 0x00, 0x02, 0x80];
        codec_only.codec_info[..4].copy_from_slice(&aac);
        codec_only.num_codec = 1;

        current.apply_update(&codec_only);
        assert_eq!(current.codec_type(), Some(CodecType::Mpeg24Aac));
        assert_eq!(current.protect_info.as_slice(), &[0x02, 0x00]);
        assert_eq!(current.num_protect, 1);
    }

    #[test]
    fn test_partial_update_keeps_codec() {
        let mut current = sbc();
        let protect_only = StreamConfig::new().with_protection(&[0x02, 0x00]).unwrap();

        current.apply_update(&protect_only);
        assert_eq!(current.codec_type(), Some(CodecType::Sbc));
        assert!(current.has_content_protection());
    }

    #[test]
    fn test_media_ssrc_from_codec_octets() {
        let mut config = sbc();
        assert_eq!(config.media_ssrc(), 0);

        config.codec_info[MEDIA_TYPE_OFFSET] = 0x10;
        config.codec_info[CODEC_TYPE_OFFSET] = 0x02;
        assert_eq!(config.media_ssrc(), 0x12);
    }

    #[test]
    fn test_vendor_codec_header_follows_protection() {
        let mut config = sbc();
        config.codec_info[CODEC_TYPE_OFFSET] = 0xFF;
        assert!(!config.uses_media_header());

        let protected = config.with_protection(&[0x02, 0x00]).unwrap();
        assert!(protected.uses_media_header());
    }

    #[test]
    fn test_oversized_codec_info_rejected() {
        let info = [0u8; CODEC_INFO_SIZE + 1];
        assert_eq!(
            StreamConfig::from_codec_info(&info),
            Err(AvdtpError::InvalidParameter)
        );
    }

    #[test]
    fn test_capability_flags() {
        let config = sbc().with_capabilities(ServiceCapabilities::REPORT);
        assert!(config.psc_mask.supports(ServiceCapabilities::REPORT));
        assert!(config.psc_mask.supports(ServiceCapabilities::CODEC));
        assert!(!config.psc_mask.supports(ServiceCapabilities::DELAY_REPORT));

        let nsc = UnsupportedCommands(UnsupportedCommands::RECONFIG);
        assert!(nsc.contains(UnsupportedCommands::RECONFIG));
        assert!(!nsc.contains(UnsupportedCommands::SECURITY));
    }
}
