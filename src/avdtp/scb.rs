//! Stream Control Block
//!
//! One SCB per local stream endpoint. It holds what was negotiated with
//! the peer and what is in flight, plus the outbound media slot. The
//! engine allocates SCBs from a fixed pool; the SCB only refers to its
//! signaling channel by index.

use super::config::{StreamConfig, UnsupportedCommands};
use super::media::MediaBuffer;
use super::services::{ControlCallback, MediaSink, ReportSink};
use super::state::StreamPhase;
use super::{ChannelIndex, Role, StreamEndpointId, StreamHandle, TimerKind};

/// Application side of a stream: local capabilities and callbacks
///
/// # Examples
///
/// ```rust,ignore
/// let registration = StreamRegistration::new(&config, &callbacks)
///     .with_unsupported_commands(UnsupportedCommands(UnsupportedCommands::SECURITY))
///     .with_media_sink(&callbacks);
/// ```
#[derive(Clone, Copy)]
pub struct StreamRegistration<'a> {
    /// Local capabilities; the codec type gates peer configurations
    pub config: &'a StreamConfig,
    /// Commands refused with `NOT_SUPPORTED_COMMAND`
    pub nsc_mask: UnsupportedCommands,
    /// Control event callback
    pub control: &'a dyn ControlCallback,
    /// Inbound media callback
    pub media_sink: Option<&'a dyn MediaSink>,
    /// Inbound report callback
    pub report_sink: Option<&'a dyn ReportSink>,
}

impl<'a> StreamRegistration<'a> {
    /// Create a registration without sinks
    #[must_use]
    pub fn new(config: &'a StreamConfig, control: &'a dyn ControlCallback) -> Self {
        Self {
            config,
            nsc_mask: UnsupportedCommands::default(),
            control,
            media_sink: None,
            report_sink: None,
        }
    }

    /// Refuse the given commands
    #[must_use]
    pub const fn with_unsupported_commands(mut self, nsc_mask: UnsupportedCommands) -> Self {
        self.nsc_mask = nsc_mask;
        self
    }

    /// Deliver inbound media to `sink`
    #[must_use]
    pub fn with_media_sink(mut self, sink: &'a dyn MediaSink) -> Self {
        self.media_sink = Some(sink);
        self
    }

    /// Deliver inbound reports to `sink`
    #[must_use]
    pub fn with_report_sink(mut self, sink: &'a dyn ReportSink) -> Self {
        self.report_sink = Some(sink);
        self
    }
}

/// Per-stream protocol state
pub struct StreamControlBlock<'a> {
    pub(crate) registration: StreamRegistration<'a>,
    pub(crate) handle: StreamHandle,
    pub(crate) phase: StreamPhase,
    pub(crate) in_use: bool,
    pub(crate) role: Role,
    pub(crate) peer_seid: StreamEndpointId,
    pub(crate) channel: Option<ChannelIndex>,
    pub(crate) curr_cfg: StreamConfig,
    pub(crate) req_cfg: StreamConfig,
    pub(crate) close_code: u8,
    pub(crate) media_seq: u16,
    pub(crate) cong: bool,
    pub(crate) pending_packet: Option<MediaBuffer>,
    pub(crate) remove: bool,
    pub(crate) released: bool,
    pub(crate) timer: Option<TimerKind>,
}

impl<'a> StreamControlBlock<'a> {
    pub(crate) fn new(handle: StreamHandle, registration: StreamRegistration<'a>) -> Self {
        Self {
            registration,
            handle,
            phase: StreamPhase::Idle,
            in_use: false,
            role: Role::default(),
            peer_seid: 0,
            channel: None,
            curr_cfg: StreamConfig::new(),
            req_cfg: StreamConfig::new(),
            close_code: 0,
            media_seq: 0,
            cong: false,
            pending_packet: None,
            remove: false,
            released: false,
            timer: None,
        }
    }

    /// Unbind from the peer
    pub(crate) fn clear_vars(&mut self) {
        self.in_use = false;
        self.channel = None;
        self.peer_seid = 0;
    }

    /// Copy the proposed sections into the active configuration
    pub(crate) fn commit_requested_config(&mut self) {
        self.curr_cfg.apply_update(&self.req_cfg);
    }

    /// Stream handle, also used as the local SEID
    #[must_use]
    pub const fn handle(&self) -> StreamHandle {
        self.handle
    }

    /// Current protocol phase
    #[must_use]
    pub const fn phase(&self) -> StreamPhase {
        self.phase
    }

    /// Whether the stream is bound to a negotiating or active peer
    #[must_use]
    pub const fn is_in_use(&self) -> bool {
        self.in_use
    }

    /// Role in the outstanding open or close transaction
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Peer SEID
    #[must_use]
    pub const fn peer_seid(&self) -> StreamEndpointId {
        self.peer_seid
    }

    /// Signaling channel the stream is bound to
    #[must_use]
    pub const fn channel(&self) -> Option<ChannelIndex> {
        self.channel
    }

    /// Active configuration
    #[must_use]
    pub const fn current_config(&self) -> &StreamConfig {
        &self.curr_cfg
    }

    /// Configuration proposed in the exchange in flight
    #[must_use]
    pub const fn requested_config(&self) -> &StreamConfig {
        &self.req_cfg
    }

    /// Local capabilities
    #[must_use]
    pub const fn local_config(&self) -> &StreamConfig {
        self.registration.config
    }

    /// Error code of the last close response
    #[must_use]
    pub const fn close_code(&self) -> u8 {
        self.close_code
    }

    /// Sequence number of the last header-bearing packet
    #[must_use]
    pub const fn media_seq(&self) -> u16 {
        self.media_seq
    }

    /// Whether the media channel is congested
    #[must_use]
    pub const fn is_congested(&self) -> bool {
        self.cong
    }

    /// Buffered outbound packet
    #[must_use]
    pub const fn pending_packet(&self) -> Option<&MediaBuffer> {
        self.pending_packet.as_ref()
    }

    /// Whether removal is deferred until the transport channel closes
    #[must_use]
    pub const fn is_remove_pending(&self) -> bool {
        self.remove
    }

    /// Armed transport channel timer
    #[must_use]
    pub const fn armed_timer(&self) -> Option<TimerKind> {
        self.timer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::avdtp::testing::{RecordingCallbacks, sbc_config};

    #[test]
    fn test_new_scb_is_idle() {
        let callbacks = RecordingCallbacks::new();
        let config = sbc_config();
        let scb = StreamControlBlock::new(1, StreamRegistration::new(&config, &callbacks));

        assert_eq!(scb.handle(), 1);
        assert_eq!(scb.phase(), StreamPhase::Idle);
        assert!(!scb.is_in_use());
        assert_eq!(scb.channel(), None);
        assert_eq!(scb.current_config(), &StreamConfig::new());
        assert_eq!(scb.local_config(), &config);
        assert!(scb.pending_packet().is_none());
    }

    #[test]
    fn test_clear_vars_unbinds() {
        let callbacks = RecordingCallbacks::new();
        let config = sbc_config();
        let mut scb = StreamControlBlock::new(1, StreamRegistration::new(&config, &callbacks));
        scb.in_use = true;
        scb.channel = Some(0);
        scb.peer_seid = 4;
        scb.req_cfg = config.clone();

        scb.clear_vars();
        assert!(!scb.is_in_use());
        assert_eq!(scb.channel(), None);
        assert_eq!(scb.peer_seid(), 0);
        assert_eq!(scb.requested_config(), &config);
    }
}
