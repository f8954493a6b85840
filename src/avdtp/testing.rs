//! Recording collaborators and fixtures shared by the unit tests

use core::cell::RefCell;

use heapless::Vec;

use super::codec::{MediaType, SbcCapabilities};
use super::config::StreamConfig;
use super::engine::{ChannelTable, StreamEngineOptions};
use super::event::{ApiRequest, ControlEvent, ControlEventKind, Status, StreamEvent};
use super::media::{MediaBuffer, MediaFrame};
use super::message::SignalMessage;
use super::report::Report;
use super::scb::{StreamControlBlock, StreamRegistration};
use super::services::{
    ChannelControl, ChannelEvent, ControlCallback, MediaSink, ReportSink, SignalingSender,
    StreamTimers, TransportAdapter,
};
use super::state::{StreamContext, StreamPhase};
use super::{
    ChannelIndex, ChannelType, ServiceCapabilities, SignalId, StreamEndpointId, StreamHandle,
    TimerKind, TransportRole,
};
use crate::BluetoothAddress;

pub(crate) const PEER: BluetoothAddress =
    BluetoothAddress::new([0x00, 0x1A, 0x7D, 0xDA, 0x71, 0x13]);
pub(crate) const CHANNEL: ChannelIndex = 0;
pub(crate) const PEER_SEID: StreamEndpointId = 3;

/// One call into a collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ServiceCall {
    Command(SignalMessage),
    Response(SignalMessage),
    Reject(SignalMessage),
    OpenChannel {
        kind: ChannelType,
        role: TransportRole,
        channel: ChannelIndex,
    },
    CloseChannel(ChannelType),
    WriteMedia(MediaBuffer),
    FlushMedia,
    StartTimer(TimerKind, u32),
    CancelTimer(TimerKind),
    Channel(ChannelIndex, ChannelEvent),
}

#[derive(Default)]
pub(crate) struct RecordingServices {
    pub(crate) calls: Vec<ServiceCall, 32>,
}

impl RecordingServices {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn clear(&mut self) {
        self.calls.clear();
    }

    fn record(&mut self, call: ServiceCall) {
        self.calls.push(call).expect("call log full");
    }

    pub(crate) fn commands(&self) -> impl Iterator<Item = &SignalMessage> {
        self.calls.iter().filter_map(|call| match call {
            ServiceCall::Command(msg) => Some(msg),
            _ => None,
        })
    }

    pub(crate) fn responses(&self) -> impl Iterator<Item = &SignalMessage> {
        self.calls.iter().filter_map(|call| match call {
            ServiceCall::Response(msg) => Some(msg),
            _ => None,
        })
    }

    pub(crate) fn rejects(&self) -> impl Iterator<Item = &SignalMessage> {
        self.calls.iter().filter_map(|call| match call {
            ServiceCall::Reject(msg) => Some(msg),
            _ => None,
        })
    }

    pub(crate) fn written(&self) -> impl Iterator<Item = &MediaBuffer> {
        self.calls.iter().filter_map(|call| match call {
            ServiceCall::WriteMedia(buffer) => Some(buffer),
            _ => None,
        })
    }

    pub(crate) fn contains(&self, call: &ServiceCall) -> bool {
        self.calls.iter().any(|c| c == call)
    }
}

impl SignalingSender for RecordingServices {
    fn send_command(&mut self, _handle: StreamHandle, message: SignalMessage) {
        self.record(ServiceCall::Command(message));
    }

    fn send_response(&mut self, _handle: StreamHandle, message: SignalMessage) {
        self.record(ServiceCall::Response(message));
    }

    fn send_reject(&mut self, _handle: StreamHandle, message: SignalMessage) {
        self.record(ServiceCall::Reject(message));
    }
}

impl TransportAdapter for RecordingServices {
    fn open_channel(
        &mut self,
        _handle: StreamHandle,
        channel: ChannelIndex,
        kind: ChannelType,
        role: TransportRole,
    ) {
        self.record(ServiceCall::OpenChannel {
            kind,
            role,
            channel,
        });
    }

    fn close_channel(&mut self, _handle: StreamHandle, kind: ChannelType) {
        self.record(ServiceCall::CloseChannel(kind));
    }

    fn write_media(&mut self, _handle: StreamHandle, packet: MediaBuffer) {
        self.record(ServiceCall::WriteMedia(packet));
    }

    fn flush_media(&mut self, _handle: StreamHandle) {
        self.record(ServiceCall::FlushMedia);
    }
}

impl StreamTimers for RecordingServices {
    fn start_timer(&mut self, _handle: StreamHandle, kind: TimerKind, timeout_ms: u32) {
        self.record(ServiceCall::StartTimer(kind, timeout_ms));
    }

    fn cancel_timer(&mut self, _handle: StreamHandle, kind: TimerKind) {
        self.record(ServiceCall::CancelTimer(kind));
    }
}

impl ChannelControl for RecordingServices {
    fn channel_event(&mut self, channel: ChannelIndex, event: ChannelEvent) {
        self.record(ServiceCall::Channel(channel, event));
    }
}

/// Control event with borrowed payloads copied out
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ControlRecord {
    pub(crate) handle: StreamHandle,
    pub(crate) peer: Option<BluetoothAddress>,
    pub(crate) kind: ControlEventKind,
    pub(crate) status: Status,
    pub(crate) label: Option<u8>,
    pub(crate) config: Option<StreamConfig>,
    pub(crate) psc_mask: Option<ServiceCapabilities>,
    pub(crate) delay: Option<u16>,
    pub(crate) data: Vec<u8, 16>,
}

#[derive(Default)]
pub(crate) struct RecordingCallbacks {
    pub(crate) controls: RefCell<Vec<ControlRecord, 16>>,
    pub(crate) media: RefCell<Vec<MediaFrame, 4>>,
    pub(crate) reports: RefCell<Vec<Report, 4>>,
}

impl RecordingCallbacks {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn kinds(&self) -> Vec<ControlEventKind, 16> {
        self.controls
            .borrow()
            .iter()
            .map(|record| record.kind)
            .collect()
    }

    pub(crate) fn last(&self) -> Option<ControlRecord> {
        self.controls.borrow().last().cloned()
    }

    pub(crate) fn count(&self, kind: ControlEventKind) -> usize {
        self.controls
            .borrow()
            .iter()
            .filter(|record| record.kind == kind)
            .count()
    }

    pub(crate) fn clear(&self) {
        self.controls.borrow_mut().clear();
        self.media.borrow_mut().clear();
        self.reports.borrow_mut().clear();
    }
}

impl ControlCallback for RecordingCallbacks {
    fn on_control_event(
        &self,
        handle: StreamHandle,
        peer: Option<BluetoothAddress>,
        event: ControlEvent<'_>,
    ) {
        let mut record = ControlRecord {
            handle,
            peer,
            kind: event.kind(),
            status: event.status(),
            label: None,
            config: None,
            psc_mask: None,
            delay: None,
            data: Vec::new(),
        };
        match event {
            ControlEvent::ConfigInd { label, config, .. }
            | ControlEvent::ReconfigInd { label, config } => {
                record.label = Some(label);
                record.config = Some(config.clone());
            }
            ControlEvent::OpenCfm { psc_mask, .. } | ControlEvent::OpenInd { psc_mask, .. } => {
                record.psc_mask = Some(psc_mask);
            }
            ControlEvent::ReconfigCfm { config, .. } => record.config = Some(config.clone()),
            ControlEvent::GetConfigCfm { config, .. } => record.config = config.cloned(),
            ControlEvent::SecurityInd { label, data } => {
                record.label = Some(label);
                record.data = Vec::from_slice(data).expect("security data too long");
            }
            ControlEvent::SecurityCfm { data, .. } => {
                record.data = Vec::from_slice(data).expect("security data too long");
            }
            ControlEvent::DelayReportInd { delay } => record.delay = Some(delay),
            _ => {}
        }
        self.controls
            .borrow_mut()
            .push(record)
            .expect("control log full");
    }
}

impl MediaSink for RecordingCallbacks {
    fn on_media(&self, _handle: StreamHandle, frame: MediaFrame) {
        self.media.borrow_mut().push(frame).expect("media log full");
    }
}

impl ReportSink for RecordingCallbacks {
    fn on_report(&self, _handle: StreamHandle, report: &Report) {
        self.reports
            .borrow_mut()
            .push(report.clone())
            .expect("report log full");
    }
}

/// SBC, 44.1 kHz joint stereo
pub(crate) fn sbc_config() -> StreamConfig {
    let info = SbcCapabilities::joint_stereo_44100().to_codec_info(MediaType::Audio);
    StreamConfig::from_codec_info(&info).unwrap()
}

/// Peer command on [`CHANNEL`] addressed to stream 1
pub(crate) fn command(signal: SignalId, label: u8) -> SignalMessage {
    SignalMessage::new(CHANNEL, signal)
        .with_label(label)
        .with_seid(1)
}

/// Peer SetConfiguration command proposing `config`
pub(crate) fn set_config_command(config: &StreamConfig, label: u8) -> SignalMessage {
    command(SignalId::SetConfiguration, label).with_config(PEER_SEID, config.clone())
}

/// Accepting peer response
pub(crate) fn response(signal: SignalId, label: u8) -> SignalMessage {
    SignalMessage::new(CHANNEL, signal).with_label(label)
}

/// Rejecting peer response
pub(crate) fn reject(signal: SignalId, err_code: u8) -> SignalMessage {
    SignalMessage::new(CHANNEL, signal).with_error(err_code, 0)
}

pub(crate) fn media_closed(err_code: u8) -> StreamEvent {
    StreamEvent::TransportClosed {
        channel: ChannelType::Media,
        err_code,
        was_open: true,
    }
}

/// A single stream driven directly through the state machine
pub(crate) struct Harness<'a> {
    pub(crate) scb: StreamControlBlock<'a>,
    pub(crate) channels: ChannelTable,
    pub(crate) services: RecordingServices,
    pub(crate) options: StreamEngineOptions,
    pub(crate) callbacks: &'a RecordingCallbacks,
}

impl<'a> Harness<'a> {
    pub(crate) fn new(config: &'a StreamConfig, callbacks: &'a RecordingCallbacks) -> Self {
        Self::with_registration(StreamRegistration::new(config, callbacks), callbacks)
    }

    pub(crate) fn with_registration(
        registration: StreamRegistration<'a>,
        callbacks: &'a RecordingCallbacks,
    ) -> Self {
        let mut channels = ChannelTable::new();
        channels.insert(CHANNEL, PEER).unwrap();
        Self {
            scb: StreamControlBlock::new(1, registration),
            channels,
            services: RecordingServices::new(),
            options: StreamEngineOptions::default(),
            callbacks,
        }
    }

    /// Deliver one event
    pub(crate) fn deliver(&mut self, event: StreamEvent) {
        StreamContext::new(
            &mut self.scb,
            &self.channels,
            &mut self.services,
            &self.options,
        )
        .dispatch(event);
    }

    pub(crate) fn phase(&self) -> StreamPhase {
        self.scb.phase
    }

    /// Peer configured the stream and the application accepted
    pub(crate) fn configure(&mut self) {
        let config = self.scb.registration.config.clone();
        self.deliver(StreamEvent::Command(set_config_command(&config, 1)));
        self.deliver(StreamEvent::local_accept(SignalId::SetConfiguration, 1));
    }

    /// Peer opened the stream and the media channel came up
    pub(crate) fn open(&mut self) {
        self.configure();
        self.deliver(StreamEvent::Command(command(SignalId::Open, 2)));
        self.deliver(StreamEvent::TransportOpened(ChannelType::Media));
    }

    /// Peer started the stream
    pub(crate) fn stream(&mut self) {
        self.open();
        self.deliver(StreamEvent::Command(command(SignalId::Start, 3)));
    }

    /// Bring the stream to `phase` along the acceptor path, then clear the logs
    pub(crate) fn reach(&mut self, phase: StreamPhase) {
        match phase {
            StreamPhase::Idle => {}
            StreamPhase::Configured => self.configure(),
            StreamPhase::Opening => {
                self.configure();
                self.deliver(StreamEvent::Command(command(SignalId::Open, 2)));
            }
            StreamPhase::Open => self.open(),
            StreamPhase::Streaming => self.stream(),
            StreamPhase::Closing => {
                self.open();
                self.deliver(StreamEvent::Api(ApiRequest::Close));
            }
        }
        assert_eq!(self.scb.phase, phase);
        self.services.clear();
        self.callbacks.clear();
    }
}
