//! Stream events and control events
//!
//! [`StreamEvent`] is everything that can happen to a stream: local API
//! requests, local responses to peer commands, inbound signaling, transport
//! channel lifecycle, congestion, timer expiry and inbound packets.
//! [`ControlEvent`] is what the stream reports back to the application.

use super::config::{ServiceCapabilities, StreamConfig};
use super::media::MediaBuffer;
use super::message::SignalMessage;
use super::{ChannelIndex, ChannelType, SignalId, StreamEndpointId, TimerKind, error_code};
use crate::constants::MAX_SECURITY_DATA;
use heapless::Vec;

/// Outbound media write
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WriteRequest {
    /// Payload, ideally created with [`MediaBuffer::with_headroom`]
    pub buffer: MediaBuffer,
    /// Media timestamp
    pub timestamp: u32,
    /// Marker (high bit) and payload type (low 7 bits)
    pub marker_pt: u8,
    /// Whether a media header should be added
    pub add_header: bool,
}

/// Local API requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiRequest {
    /// Release the stream control block
    Remove,
    /// Queue a media packet
    Write(WriteRequest),
    /// Configure the peer endpoint
    SetConfig {
        /// Signaling channel to the peer
        channel: ChannelIndex,
        /// Peer SEID
        peer_seid: StreamEndpointId,
        /// Proposed configuration
        config: StreamConfig,
    },
    /// Open the stream
    Open,
    /// Close the stream
    Close,
    /// Abort the stream
    Abort,
    /// Read the peer configuration
    GetConfig,
    /// Reconfigure the stream
    Reconfig(StreamConfig),
    /// Send content protection control data
    Security(Vec<u8, MAX_SECURITY_DATA>),
    /// Report the sink delay in 1/10 milliseconds
    DelayReport(u16),
}

/// Tag of an [`ApiRequest`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[allow(missing_docs)]
pub enum ApiCode {
    Remove,
    Write,
    SetConfig,
    Open,
    Close,
    Abort,
    GetConfig,
    Reconfig,
    Security,
    DelayReport,
}

impl ApiRequest {
    /// Tag of this request
    #[must_use]
    pub const fn code(&self) -> ApiCode {
        match self {
            Self::Remove => ApiCode::Remove,
            Self::Write(_) => ApiCode::Write,
            Self::SetConfig { .. } => ApiCode::SetConfig,
            Self::Open => ApiCode::Open,
            Self::Close => ApiCode::Close,
            Self::Abort => ApiCode::Abort,
            Self::GetConfig => ApiCode::GetConfig,
            Self::Reconfig(_) => ApiCode::Reconfig,
            Self::Security(_) => ApiCode::Security,
            Self::DelayReport(_) => ApiCode::DelayReport,
        }
    }
}

/// Events delivered to a stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// Local API request
    Api(ApiRequest),
    /// Local accept (zero error code) or reject of a peer command
    LocalResponse(SignalMessage),
    /// Inbound signaling command
    Command(SignalMessage),
    /// Inbound signaling response
    Response(SignalMessage),
    /// Inbound signaling reject
    Reject(SignalMessage),
    /// Transport channel opened
    TransportOpened(ChannelType),
    /// Transport channel closed
    TransportClosed {
        /// Which channel closed
        channel: ChannelType,
        /// Error code reported by the transport, zero for an orderly close
        err_code: u8,
        /// Whether the channel had reached the open state
        was_open: bool,
    },
    /// Transport congestion changed
    Congestion(bool),
    /// Transport channel timer expired
    Timeout(TimerKind),
    /// Signaling channel to the peer went away
    SignalingClosed,
    /// Inbound media packet
    MediaData(MediaBuffer),
    /// Inbound report packet
    ReportData(MediaBuffer),
}

/// Dispatch key of a [`StreamEvent`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[allow(missing_docs)]
pub enum EventCode {
    Api(ApiCode),
    Local(SignalId),
    Command(SignalId),
    Response(SignalId),
    Reject(SignalId),
    TransportOpened(ChannelType),
    TransportClosed(ChannelType),
    Congestion,
    Timeout(TimerKind),
    SignalingClosed,
    MediaData,
    ReportData,
}

impl StreamEvent {
    /// Local accept of a peer command
    #[must_use]
    pub const fn local_accept(signal: SignalId, label: u8) -> Self {
        Self::LocalResponse(SignalMessage::new(0, signal).with_label(label))
    }

    /// Local reject of a peer command
    #[must_use]
    pub const fn local_reject(signal: SignalId, label: u8, err_code: u8, err_param: u8) -> Self {
        Self::LocalResponse(
            SignalMessage::new(0, signal)
                .with_label(label)
                .with_error(err_code, err_param),
        )
    }

    /// Dispatch key of this event
    #[must_use]
    pub const fn code(&self) -> EventCode {
        match self {
            Self::Api(request) => EventCode::Api(request.code()),
            Self::LocalResponse(msg) => EventCode::Local(msg.header.signal),
            Self::Command(msg) => EventCode::Command(msg.header.signal),
            Self::Response(msg) => EventCode::Response(msg.header.signal),
            Self::Reject(msg) => EventCode::Reject(msg.header.signal),
            Self::TransportOpened(channel) => EventCode::TransportOpened(*channel),
            Self::TransportClosed { channel, .. } => EventCode::TransportClosed(*channel),
            Self::Congestion(_) => EventCode::Congestion,
            Self::Timeout(kind) => EventCode::Timeout(*kind),
            Self::SignalingClosed => EventCode::SignalingClosed,
            Self::MediaData(_) => EventCode::MediaData,
            Self::ReportData(_) => EventCode::ReportData,
        }
    }

    /// Signaling message carried by the event, if any
    #[must_use]
    pub const fn message(&self) -> Option<&SignalMessage> {
        match self {
            Self::LocalResponse(msg)
            | Self::Command(msg)
            | Self::Response(msg)
            | Self::Reject(msg) => Some(msg),
            _ => None,
        }
    }

    /// Move the packet buffer out of the event
    pub(crate) fn take_buffer(&mut self) -> Option<MediaBuffer> {
        match self {
            Self::Api(ApiRequest::Write(request)) => Some(core::mem::take(&mut request.buffer)),
            Self::MediaData(buffer) | Self::ReportData(buffer) => Some(core::mem::take(buffer)),
            _ => None,
        }
    }
}

/// Result of a confirmed or indicated operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Status {
    /// Error code, zero on success
    pub err_code: u8,
    /// Error parameter
    pub err_param: u8,
}

impl Status {
    /// Success
    pub const OK: Self = Self {
        err_code: 0,
        err_param: 0,
    };

    /// Local "bad state" failure
    pub const BAD_STATE: Self = Self::error(error_code::BAD_STATE);

    /// Failure with the given error code
    #[must_use]
    pub const fn error(err_code: u8) -> Self {
        Self {
            err_code,
            err_param: 0,
        }
    }

    /// Status carried by a signaling message header
    #[must_use]
    pub const fn of(msg: &SignalMessage) -> Self {
        Self {
            err_code: msg.header.err_code,
            err_param: msg.header.err_param,
        }
    }

    /// Whether this status reports success
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.err_code == 0
    }
}

/// Events reported to the application through [`ControlCallback`](super::ControlCallback)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEvent<'e> {
    /// Peer proposed a configuration
    ConfigInd {
        /// Peer SEID
        int_seid: StreamEndpointId,
        /// Transaction label to answer with
        label: u8,
        /// Proposed configuration
        config: &'e StreamConfig,
    },
    /// Locally initiated open finished
    OpenCfm {
        /// Result
        status: Status,
        /// Negotiated service capabilities
        psc_mask: ServiceCapabilities,
    },
    /// Peer initiated open finished
    OpenInd {
        /// Result
        status: Status,
        /// Negotiated service capabilities
        psc_mask: ServiceCapabilities,
    },
    /// Locally initiated close finished
    CloseCfm {
        /// Result
        status: Status,
    },
    /// Peer initiated close finished
    CloseInd {
        /// Result
        status: Status,
    },
    /// Start confirmed by the peer
    StartCfm {
        /// Result
        status: Status,
    },
    /// Peer started the stream
    StartInd {
        /// Result
        status: Status,
    },
    /// Suspend confirmed by the peer
    SuspendCfm {
        /// Result
        status: Status,
    },
    /// Peer suspended the stream
    SuspendInd {
        /// Result
        status: Status,
    },
    /// Locally initiated reconfiguration finished
    ReconfigCfm {
        /// Result
        status: Status,
        /// Active configuration
        config: &'e StreamConfig,
    },
    /// Peer proposed a reconfiguration
    ReconfigInd {
        /// Transaction label to answer with
        label: u8,
        /// Proposed configuration
        config: &'e StreamConfig,
    },
    /// Security control answered by the peer
    SecurityCfm {
        /// Result
        status: Status,
        /// Content protection data
        data: &'e [u8],
    },
    /// Peer sent security control data
    SecurityInd {
        /// Transaction label to answer with
        label: u8,
        /// Content protection data
        data: &'e [u8],
    },
    /// Peer returned its configuration
    GetConfigCfm {
        /// Result
        status: Status,
        /// Configuration, if the peer accepted
        config: Option<&'e StreamConfig>,
    },
    /// Outbound packet handed to the transport, or dropped
    WriteCfm {
        /// Result
        status: Status,
    },
    /// Peer reported its sink delay
    DelayReportInd {
        /// Delay in 1/10 milliseconds
        delay: u16,
    },
    /// Delay report answered by the peer
    DelayReportCfm {
        /// Result
        status: Status,
    },
    /// Reporting channel connected
    ReportConn,
    /// Reporting channel disconnected
    ReportDisconn,
}

/// Tag of a [`ControlEvent`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[allow(missing_docs)]
pub enum ControlEventKind {
    ConfigInd,
    OpenCfm,
    OpenInd,
    CloseCfm,
    CloseInd,
    StartCfm,
    StartInd,
    SuspendCfm,
    SuspendInd,
    ReconfigCfm,
    ReconfigInd,
    SecurityCfm,
    SecurityInd,
    GetConfigCfm,
    WriteCfm,
    DelayReportInd,
    DelayReportCfm,
    ReportConn,
    ReportDisconn,
}

impl ControlEvent<'_> {
    /// Tag of this event
    #[must_use]
    pub const fn kind(&self) -> ControlEventKind {
        match self {
            Self::ConfigInd { .. } => ControlEventKind::ConfigInd,
            Self::OpenCfm { .. } => ControlEventKind::OpenCfm,
            Self::OpenInd { .. } => ControlEventKind::OpenInd,
            Self::CloseCfm { .. } => ControlEventKind::CloseCfm,
            Self::CloseInd { .. } => ControlEventKind::CloseInd,
            Self::StartCfm { .. } => ControlEventKind::StartCfm,
            Self::StartInd { .. } => ControlEventKind::StartInd,
            Self::SuspendCfm { .. } => ControlEventKind::SuspendCfm,
            Self::SuspendInd { .. } => ControlEventKind::SuspendInd,
            Self::ReconfigCfm { .. } => ControlEventKind::ReconfigCfm,
            Self::ReconfigInd { .. } => ControlEventKind::ReconfigInd,
            Self::SecurityCfm { .. } => ControlEventKind::SecurityCfm,
            Self::SecurityInd { .. } => ControlEventKind::SecurityInd,
            Self::GetConfigCfm { .. } => ControlEventKind::GetConfigCfm,
            Self::WriteCfm { .. } => ControlEventKind::WriteCfm,
            Self::DelayReportInd { .. } => ControlEventKind::DelayReportInd,
            Self::DelayReportCfm { .. } => ControlEventKind::DelayReportCfm,
            Self::ReportConn => ControlEventKind::ReportConn,
            Self::ReportDisconn => ControlEventKind::ReportDisconn,
        }
    }

    /// Result carried by this event, success for events without one
    #[must_use]
    pub const fn status(&self) -> Status {
        match self {
            Self::OpenCfm { status, .. }
            | Self::OpenInd { status, .. }
            | Self::CloseCfm { status }
            | Self::CloseInd { status }
            | Self::StartCfm { status }
            | Self::StartInd { status }
            | Self::SuspendCfm { status }
            | Self::SuspendInd { status }
            | Self::ReconfigCfm { status, .. }
            | Self::SecurityCfm { status, .. }
            | Self::GetConfigCfm { status, .. }
            | Self::WriteCfm { status }
            | Self::DelayReportCfm { status } => *status,
            _ => Status::OK,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_codes() {
        let write = StreamEvent::Api(ApiRequest::Write(WriteRequest::default()));
        assert_eq!(write.code(), EventCode::Api(ApiCode::Write));

        let closed = StreamEvent::TransportClosed {
            channel: ChannelType::Report,
            err_code: 0,
            was_open: true,
        };
        assert_eq!(
            closed.code(),
            EventCode::TransportClosed(ChannelType::Report)
        );

        let reject = StreamEvent::local_reject(SignalId::Reconfigure, 3, 0x29, 0x07);
        assert_eq!(reject.code(), EventCode::Local(SignalId::Reconfigure));
        let msg = reject.message().unwrap();
        assert_eq!(msg.header.label, 3);
        assert_eq!(Status::of(msg).err_param, 0x07);
    }

    #[test]
    fn test_take_buffer_leaves_empty() {
        let mut event = StreamEvent::MediaData(MediaBuffer::from_slice(&[1, 2, 3]).unwrap());
        assert_eq!(event.take_buffer().unwrap().as_slice(), &[1, 2, 3]);
        assert!(event.take_buffer().unwrap().is_empty());
        assert!(StreamEvent::SignalingClosed.take_buffer().is_none());
    }

    #[test]
    fn test_control_event_status() {
        let event = ControlEvent::CloseCfm {
            status: Status::error(error_code::TIMEOUT),
        };
        assert_eq!(event.kind(), ControlEventKind::CloseCfm);
        assert_eq!(event.status().err_code, error_code::TIMEOUT);
        assert!(ControlEvent::ReportConn.status().is_ok());
    }
}
