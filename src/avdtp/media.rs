//! Media packet buffers and the media header
//!
//! Outbound packets reserve room for the media header in front of the
//! payload so the header can be written in place. Inbound packets are
//! parsed, then trimmed down to their payload before delivery.

use crate::constants::{CSRC_SIZE, MAX_MEDIA_PACKET_SIZE, MEDIA_HEADER_SIZE, MEDIA_OCTET1};
use heapless::Vec;

const PADDING_BIT: u8 = 0x20;
const EXTENSION_BIT: u8 = 0x10;
const CSRC_COUNT_MASK: u8 = 0x0F;
const EXTENSION_HEADER_SIZE: usize = 4;
const EXTENSION_WORD_SIZE: usize = 4;

/// Media path errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MediaError {
    /// Packet is shorter than the fixed media header
    Truncated,
    /// CSRC list reaches past the end of the packet
    CsrcOverrun,
    /// Header extension reaches past the end of the packet
    ExtensionOverrun,
    /// Padding length reaches into the header
    PaddingOverrun,
    /// Packet does not fit the buffer capacity
    Capacity,
}

impl core::fmt::Display for MediaError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Truncated => write!(f, "Media packet shorter than its header"),
            Self::CsrcOverrun => write!(f, "CSRC list exceeds media packet"),
            Self::ExtensionOverrun => write!(f, "Header extension exceeds media packet"),
            Self::PaddingOverrun => write!(f, "Padding length exceeds media payload"),
            Self::Capacity => write!(f, "Media packet exceeds buffer capacity"),
        }
    }
}

/// Owned packet buffer with a movable start offset
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MediaBuffer {
    storage: Vec<u8, MAX_MEDIA_PACKET_SIZE>,
    offset: usize,
}

impl MediaBuffer {
    /// Create an empty buffer
    #[must_use]
    pub const fn new() -> Self {
        Self {
            storage: Vec::new(),
            offset: 0,
        }
    }

    /// Create a buffer holding `data`, without headroom
    ///
    /// # Errors
    /// Returns [`MediaError::Capacity`] if `data` does not fit
    pub fn from_slice(data: &[u8]) -> Result<Self, MediaError> {
        let storage = Vec::from_slice(data).map_err(|()| MediaError::Capacity)?;
        Ok(Self { storage, offset: 0 })
    }

    /// Create a buffer holding `payload` with room for a media header in front
    ///
    /// # Errors
    /// Returns [`MediaError::Capacity`] if header and payload do not fit
    pub fn with_headroom(payload: &[u8]) -> Result<Self, MediaError> {
        let mut storage = Vec::new();
        storage
            .resize(MEDIA_HEADER_SIZE, 0)
            .map_err(|()| MediaError::Capacity)?;
        storage
            .extend_from_slice(payload)
            .map_err(|()| MediaError::Capacity)?;
        Ok(Self {
            storage,
            offset: MEDIA_HEADER_SIZE,
        })
    }

    /// Packet bytes from the current start offset
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        self.storage.get(self.offset..).unwrap_or(&[])
    }

    /// Packet length from the current start offset
    #[must_use]
    pub fn len(&self) -> usize {
        self.storage.len().saturating_sub(self.offset)
    }

    /// Whether the packet holds no bytes
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Free bytes in front of the packet
    #[must_use]
    pub const fn headroom(&self) -> usize {
        self.offset
    }

    /// Write `bytes` in front of the packet
    ///
    /// Uses the headroom when there is enough of it, otherwise shifts the
    /// packet towards the end of the buffer first.
    ///
    /// # Errors
    /// Returns [`MediaError::Capacity`] if the buffer cannot grow enough
    pub fn prepend(&mut self, bytes: &[u8]) -> Result<(), MediaError> {
        let needed = bytes.len();
        if self.offset < needed {
            let shift = needed - self.offset;
            let end = self.storage.len();
            self.storage
                .resize(end + shift, 0)
                .map_err(|()| MediaError::Capacity)?;
            self.storage
                .copy_within(self.offset..end, self.offset + shift);
            self.offset += shift;
        }
        let start = self.offset - needed;
        self.storage
            .get_mut(start..self.offset)
            .ok_or(MediaError::Capacity)?
            .copy_from_slice(bytes);
        self.offset = start;
        Ok(())
    }

    /// Drop `front` bytes from the start and `back` bytes from the end
    ///
    /// # Errors
    /// Returns [`MediaError::Truncated`] if the packet is shorter than `front + back`
    pub fn trim(&mut self, front: usize, back: usize) -> Result<(), MediaError> {
        let total = front.checked_add(back).ok_or(MediaError::Truncated)?;
        if total > self.len() {
            return Err(MediaError::Truncated);
        }
        self.storage.truncate(self.storage.len() - back);
        self.offset += front;
        Ok(())
    }
}

/// Fixed part of the media header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaHeader {
    /// Marker (high bit) and payload type (low 7 bits)
    pub marker_pt: u8,
    /// Sequence number
    pub seq_num: u16,
    /// Timestamp
    pub timestamp: u32,
    /// Synchronization source identifier
    pub ssrc: u32,
}

/// Where the payload of a parsed media packet lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaLayout {
    /// Parsed fixed header
    pub header: MediaHeader,
    /// Bytes in front of the payload (fixed header, CSRCs, extension)
    pub payload_offset: usize,
    /// Trailing padding bytes, pad length byte included
    pub padding: usize,
}

impl MediaHeader {
    /// Marker bit
    #[must_use]
    pub const fn marker(&self) -> bool {
        self.marker_pt & 0x80 != 0
    }

    /// Payload type
    #[must_use]
    pub const fn payload_type(&self) -> u8 {
        self.marker_pt & 0x7F
    }

    /// Encode the header as emitted by this engine (no CSRC, no extension)
    #[must_use]
    pub fn encode(&self) -> [u8; MEDIA_HEADER_SIZE] {
        let mut header = [0u8; MEDIA_HEADER_SIZE];
        header[0] = MEDIA_OCTET1;
        header[1] = self.marker_pt;
        header[2..4].copy_from_slice(&self.seq_num.to_be_bytes());
        header[4..8].copy_from_slice(&self.timestamp.to_be_bytes());
        header[8..12].copy_from_slice(&self.ssrc.to_be_bytes());
        header
    }

    /// Parse an inbound media packet
    ///
    /// CSRC entries and header extensions are skipped; the padding length
    /// is read from the last byte of the packet when the padding bit is set.
    ///
    /// # Errors
    /// Returns a [`MediaError`] if any declared length reaches past the
    /// end of the packet
    pub fn parse(data: &[u8]) -> Result<MediaLayout, MediaError> {
        let octet = *data.first().ok_or(MediaError::Truncated)?;
        let header = Self {
            marker_pt: *data.get(1).ok_or(MediaError::Truncated)?,
            seq_num: be_u16(data, 2).ok_or(MediaError::Truncated)?,
            timestamp: be_u32(data, 4).ok_or(MediaError::Truncated)?,
            ssrc: be_u32(data, 8).ok_or(MediaError::Truncated)?,
        };

        let mut offset = MEDIA_HEADER_SIZE + usize::from(octet & CSRC_COUNT_MASK) * CSRC_SIZE;
        if offset > data.len() {
            return Err(MediaError::CsrcOverrun);
        }

        if octet & EXTENSION_BIT != 0 {
            let Some(words) = be_u16(data, offset + 2) else {
                return Err(MediaError::ExtensionOverrun);
            };
            offset += EXTENSION_HEADER_SIZE + usize::from(words) * EXTENSION_WORD_SIZE;
            if offset > data.len() {
                return Err(MediaError::ExtensionOverrun);
            }
        }

        let padding = if octet & PADDING_BIT != 0 {
            data.last().copied().map_or(0, usize::from)
        } else {
            0
        };
        if offset + padding > data.len() {
            return Err(MediaError::PaddingOverrun);
        }

        Ok(MediaLayout {
            header,
            payload_offset: offset,
            padding,
        })
    }
}

/// Inbound media frame delivered to the media sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFrame {
    /// Sequence number
    pub seq_num: u16,
    /// Timestamp
    pub timestamp: u32,
    /// Marker (high bit) and payload type (low 7 bits)
    pub marker_pt: u8,
    /// Payload, trimmed of header and padding
    pub payload: MediaBuffer,
}

pub(crate) fn be_u16(data: &[u8], at: usize) -> Option<u16> {
    let bytes = data.get(at..at.checked_add(2)?)?;
    bytes.try_into().ok().map(u16::from_be_bytes)
}

pub(crate) fn be_u32(data: &[u8], at: usize) -> Option<u32> {
    let bytes = data.get(at..at.checked_add(4)?)?;
    bytes.try_into().ok().map(u32::from_be_bytes)
}
