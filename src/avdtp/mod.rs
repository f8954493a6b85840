//! AVDTP (Audio/Video Distribution Transport Protocol) Stream Engine
//!
//! This module implements the per-stream half of AVDTP: the Stream Control
//! Block (SCB), the state machine that drives it, the media data path and
//! the transport channel lifecycle.
//!
//! ## Architecture
//!
//! - **Stream Control Block**: per-endpoint negotiated state ([`scb`])
//! - **Transition table**: `(phase, event) -> actions` dispatch ([`state`])
//! - **Signaling actions**: one handler per control primitive
//! - **Media data path**: single-slot outbound queue, header packetizer,
//!   inbound media and report parsers ([`media`], [`report`])
//! - **Engine**: stream pool and signaling channel table ([`engine`])
//! - **Transport lifecycle**: media/report channel open/close and timers
//! - **Collaborators**: signaling, transport, timers and the signaling
//!   channel control block are reached through [`services`]

mod actions;
pub mod codec;
pub mod config;
mod data_path;
pub mod engine;
pub mod event;
pub mod media;
pub mod message;
mod reject;
pub mod report;
pub mod scb;
pub mod services;
pub mod state;
mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use codec::{CodecType, SbcCapabilities};
pub use config::{ServiceCapabilities, StreamConfig, UnsupportedCommands};
pub use event::{
    ApiCode, ApiRequest, ControlEvent, ControlEventKind, EventCode, Status, StreamEvent,
    WriteRequest,
};
pub use media::{MediaBuffer, MediaError, MediaFrame, MediaHeader};
pub use message::{MessageBody, MessageHeader, SignalMessage};
pub use report::{Report, ReportBody, ReportError, parse_report};
pub use scb::{StreamControlBlock, StreamRegistration};
pub use services::{
    ChannelControl, ChannelEvent, ControlCallback, MediaSink, ReportSink, SignalingSender,
    StreamServices, StreamTimers, TransportAdapter,
};
pub use state::StreamPhase;

/// AVDTP uses PSM 0x0019 for both signaling and transport channels
pub const AVDTP_PSM: u16 = 0x0019;

/// Stream Endpoint Identifier (SEID) type
pub type StreamEndpointId = u8;

/// Handle of a stream control block in the engine pool
pub type StreamHandle = u8;

/// Index of a signaling channel (CCB) in the engine channel table
pub type ChannelIndex = u8;

/// AVDTP Signal Identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum SignalId {
    /// Discover available stream endpoints
    Discover = 0x01,
    /// Get capabilities of a stream endpoint
    GetCapabilities = 0x02,
    /// Set configuration for a stream endpoint
    SetConfiguration = 0x03,
    /// Get current configuration
    GetConfiguration = 0x04,
    /// Reconfigure stream endpoint
    Reconfigure = 0x05,
    /// Open stream
    Open = 0x06,
    /// Start streaming
    Start = 0x07,
    /// Close stream
    Close = 0x08,
    /// Suspend stream
    Suspend = 0x09,
    /// Abort stream
    Abort = 0x0A,
    /// Content protection control
    Security = 0x0B,
    /// Get all capabilities of a stream endpoint
    GetAllCapabilities = 0x0C,
    /// Report sink delay
    DelayReport = 0x0D,
}

/// Signaling error codes carried in rejects and close events
pub mod error_code {
    /// The request packet header format error that is not specified elsewhere
    pub const BAD_HEADER_FORMAT: u8 = 0x01;
    /// The request packet length is not match the assumed length
    pub const BAD_LENGTH: u8 = 0x11;
    /// The requested command indicates an invalid ACP SEID
    pub const BAD_ACP_SEID: u8 = 0x12;
    /// The SEP is in use
    pub const SEP_IN_USE: u8 = 0x13;
    /// The SEP is not in use
    pub const SEP_NOT_IN_USE: u8 = 0x14;
    /// The value of Service Category in the request packet is not defined
    pub const BAD_SERVICE_CATEGORY: u8 = 0x17;
    /// The requested command has an incorrect payload format
    pub const BAD_PAYLOAD_FORMAT: u8 = 0x18;
    /// The requested command is not supported by the device
    pub const NOT_SUPPORTED_COMMAND: u8 = 0x19;
    /// The reconfigure command is an attempt to reconfigure a non-reconfigurable capability
    pub const INVALID_CAPABILITIES: u8 = 0x1A;
    /// The requested configuration is not supported
    pub const UNSUPPORTED_CONFIGURATION: u8 = 0x29;
    /// The request is not valid in the current state
    pub const BAD_STATE: u8 = 0x31;
    /// Transport channel could not be connected
    pub const CONNECT: u8 = 0x81;
    /// Transport channel connect timed out
    pub const TIMEOUT: u8 = 0x82;
}

/// AVDTP API result codes
pub mod result {
    /// Success
    pub const SUCCESS: u8 = 0;
    /// Invalid parameters
    pub const BAD_PARAMS: u8 = 1;
    /// No resources available
    pub const NO_RESOURCES: u8 = 2;
    /// Unknown handle
    pub const BAD_HANDLE: u8 = 3;
    /// Unsupported or busy
    pub const BUSY: u8 = 4;
}

/// Role of the SCB in the outstanding open or close transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Role {
    /// Peer initiated the open
    #[default]
    OpenAcceptor,
    /// Peer initiated the close
    CloseAcceptor,
    /// Local side initiated the open
    OpenInitiator,
    /// Local side initiated the close
    CloseInitiator,
}

/// Which side opens a transport channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportRole {
    /// Local side connects the channel
    Initiator,
    /// Local side waits for the peer to connect
    Acceptor,
}

/// Kind of transport channel owned by a stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelType {
    /// Media packets
    Media,
    /// Reporting packets
    Report,
}

/// Transport channel timers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerKind {
    /// Bounds transport channel establishment
    Connect,
    /// Bounds the wait for the peer to disconnect the transport channel
    Disconnect,
}
