//! Stream Engine Constants
//!
//! Capacities of the fixed pools and buffers used by the engine, together
//! with the protocol constants shared by the media and report paths.

/// Number of stream control blocks in the pool
pub const MAX_STREAMS: usize = 4;

/// Number of signaling channels (CCBs) the engine can resolve; must be a power of two
pub const MAX_CHANNELS: usize = 4;

/// Depth of the inbound event queue
pub const EVENT_QUEUE_DEPTH: usize = 8;

/// Size of the media header emitted by this engine (no CSRC, no extension)
pub const MEDIA_HEADER_SIZE: usize = 12;

/// First media header octet: version 2, no padding, no extension, no CSRC
pub const MEDIA_OCTET1: u8 = 0x80;

/// Size of one CSRC entry in bytes
pub const CSRC_SIZE: usize = 4;

/// Maximum size of a media packet, header included
pub const MAX_MEDIA_PACKET_SIZE: usize = 1024;

/// Size of the codec information element, length byte included
pub const CODEC_INFO_SIZE: usize = 20;

/// Maximum size of the content protection information list
pub const PROTECT_INFO_SIZE: usize = 90;

/// Maximum size of a security control payload
pub const MAX_SECURITY_DATA: usize = 64;

/// Maximum size of a CNAME source description item
pub const MAX_CNAME_SIZE: usize = 28;

/// Minimum size of a report packet (fixed header plus SSRC)
pub const REPORT_HEADER_SIZE: usize = 8;

/// Default transport channel connect timeout in milliseconds
pub const DEFAULT_CONNECT_TIMEOUT_MS: u32 = 10_000;

/// Default transport channel disconnect timeout in milliseconds
pub const DEFAULT_DISCONNECT_TIMEOUT_MS: u32 = 10_000;
