//! Stream state machine
//!
//! Every event goes through [`lookup`], which maps the current phase and
//! the event code to a list of actions and the next phase. The next phase
//! is set before the actions run, so an action may still override it
//! (teardown to idle, or a nested event that moves the stream on).
//!
//! Pairs missing from the table fall back to a default: peer commands get
//! a reject, local requests get a "bad state" control event, inbound
//! packets are dropped and everything else is ignored.

use super::engine::{ChannelTable, StreamEngineOptions};
use super::event::{ApiCode, EventCode, StreamEvent};
use super::scb::StreamControlBlock;
use super::services::StreamServices;
use super::{SignalId, TimerKind};
use crate::BluetoothAddress;

/// Protocol phase of a stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StreamPhase {
    /// Not configured
    #[default]
    Idle,
    /// Configuration agreed, transport not requested yet
    Configured,
    /// Waiting for the transport channel
    Opening,
    /// Transport channel open, not streaming
    Open,
    /// Streaming media
    Streaming,
    /// Waiting for the transport channel to close
    Closing,
}

/// Handler run for an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub(crate) enum Action {
    Dealloc,
    SetRemove,
    RejectInUse,
    // media data path
    FreePacket,
    ClearPacket,
    WriteRequest,
    CheckSendPacket,
    SetCongestion,
    HandleMediaPacket,
    HandleReportPacket,
    // signaling
    SendSetConfigRequest,
    SendSetConfigResponse,
    HandleSetConfigCommand,
    HandleSetConfigResponse,
    HandleSetConfigReject,
    SendGetConfigRequest,
    SendGetConfigResponse,
    HandleGetConfigCommand,
    HandleGetConfigResponse,
    SendOpenRequest,
    SendOpenResponse,
    HandleOpenCommand,
    HandleOpenResponse,
    HandleStartCommand,
    HandleStartResponse,
    HandleSuspendCommand,
    HandleSuspendResponse,
    SendCloseRequest,
    SendCloseResponse,
    SendStreamClose,
    HandleCloseCommand,
    HandleCloseResponse,
    HandleCloseReject,
    SendReconfigRequest,
    SendReconfigResponse,
    HandleReconfigCommand,
    HandleReconfigResponse,
    SendSecurityRequest,
    SendSecurityResponse,
    HandleSecurityCommand,
    HandleSecurityResponse,
    SendAbortRequest,
    SendAbortResponse,
    HandleAbortCommand,
    HandleAbortResponse,
    SendDelayReportRequest,
    HandleDelayReportCommand,
    HandleDelayReportResponse,
    // transport lifecycle
    HandleTransportOpen,
    HandleReportOpen,
    HandleTransportClose,
    HandleReportClose,
    CloseComplete,
    CloseTransport,
    ConnectTimeout,
    StartDisconnectTimer,
}

/// Table entry
#[derive(Debug, Clone, Copy)]
pub(crate) struct Transition {
    pub(crate) actions: &'static [Action],
    pub(crate) next: StreamPhase,
}

/// Look up the transition for `code` in `phase`
#[allow(clippy::match_same_arms)]
#[rustfmt::skip]
pub(crate) fn lookup(phase: StreamPhase, code: EventCode) -> Option<Transition> {
    use super::ChannelType::{Media, Report};
    use Action as X;
    use ApiCode as A;
    use EventCode as E;
    use SignalId as Sig;
    use StreamPhase as P;

    let (actions, next): (&'static [Action], StreamPhase) = match (phase, code) {
        (P::Idle, E::Api(A::Remove)) => (&[X::Dealloc], P::Idle),
        (P::Idle, E::Api(A::Write)) => (&[X::FreePacket], P::Idle),
        (P::Idle, E::Api(A::SetConfig)) => (&[X::SendSetConfigRequest], P::Configured),
        (P::Idle, E::Local(Sig::SetConfiguration)) => (&[X::SendSetConfigResponse], P::Configured),
        (P::Idle, E::Local(Sig::Abort)) => (&[X::SendAbortResponse], P::Idle),
        (P::Idle, E::Command(Sig::SetConfiguration)) => (&[X::HandleSetConfigCommand], P::Idle),
        (P::Idle, E::Reject(Sig::SetConfiguration)) => (&[X::HandleSetConfigReject], P::Idle),
        (P::Idle, E::Command(Sig::DelayReport)) => (&[X::HandleDelayReportCommand], P::Idle),
        (P::Idle, E::Command(Sig::Abort)) => (&[X::HandleAbortCommand], P::Idle),

        (P::Configured, E::Api(A::Remove)) => (&[X::SendAbortRequest, X::SetRemove], P::Configured),
        (P::Configured, E::Api(A::Write)) => (&[X::FreePacket], P::Configured),
        (P::Configured, E::Api(A::Open)) => (&[X::SendOpenRequest], P::Configured),
        (P::Configured, E::Api(A::Abort)) => (&[X::SendAbortRequest], P::Configured),
        (P::Configured, E::Api(A::GetConfig)) => (&[X::SendGetConfigRequest], P::Configured),
        (P::Configured, E::Api(A::Security)) => (&[X::SendSecurityRequest], P::Configured),
        (P::Configured, E::Api(A::DelayReport)) => (&[X::SendDelayReportRequest], P::Configured),
        (P::Configured, E::Local(Sig::GetConfiguration)) => (&[X::SendGetConfigResponse], P::Configured),
        (P::Configured, E::Local(Sig::Security)) => (&[X::SendSecurityResponse], P::Configured),
        (P::Configured, E::Local(Sig::Open)) => (&[X::SendOpenResponse], P::Opening),
        (P::Configured, E::Local(Sig::Abort)) => (&[X::SendAbortResponse, X::CloseComplete], P::Idle),
        (P::Configured, E::Command(Sig::SetConfiguration)) => (&[X::HandleSetConfigCommand], P::Configured),
        (P::Configured, E::Command(Sig::GetConfiguration)) => (&[X::HandleGetConfigCommand], P::Configured),
        (P::Configured, E::Command(Sig::Security)) => (&[X::HandleSecurityCommand], P::Configured),
        (P::Configured, E::Command(Sig::Open)) => (&[X::HandleOpenCommand], P::Configured),
        (P::Configured, E::Command(Sig::Abort)) => (&[X::HandleAbortCommand], P::Configured),
        (P::Configured, E::Command(Sig::DelayReport)) => (&[X::HandleDelayReportCommand], P::Configured),
        (P::Configured, E::Response(Sig::SetConfiguration)) => (&[X::HandleSetConfigResponse], P::Configured),
        (P::Configured, E::Reject(Sig::SetConfiguration | Sig::Open)) => (&[X::HandleSetConfigReject], P::Idle),
        (P::Configured, E::Response(Sig::Open)) => (&[X::HandleOpenResponse], P::Opening),
        (P::Configured, E::Response(Sig::Abort)) => (&[X::HandleAbortResponse, X::CloseComplete], P::Idle),
        (P::Configured, E::SignalingClosed) => (&[X::CloseComplete], P::Idle),

        (P::Opening, E::Api(A::Remove)) => (&[X::SendAbortRequest, X::SetRemove], P::Closing),
        (P::Opening, E::Api(A::Abort)) => (&[X::SendAbortRequest], P::Closing),
        (P::Opening, E::Api(A::GetConfig)) => (&[X::SendGetConfigRequest], P::Opening),
        (P::Opening, E::Api(A::DelayReport)) => (&[X::SendDelayReportRequest], P::Opening),
        (P::Opening, E::Local(Sig::GetConfiguration)) => (&[X::SendGetConfigResponse], P::Opening),
        (P::Opening, E::Local(Sig::Abort)) => (&[X::SendAbortResponse, X::CloseTransport], P::Closing),
        (P::Opening, E::Command(Sig::GetConfiguration)) => (&[X::HandleGetConfigCommand], P::Opening),
        (P::Opening, E::Command(Sig::Abort)) => (&[X::HandleAbortCommand], P::Opening),
        (P::Opening, E::Command(Sig::DelayReport)) => (&[X::HandleDelayReportCommand], P::Opening),
        (P::Opening, E::TransportOpened(Media)) => (&[X::HandleTransportOpen], P::Open),
        (P::Opening, E::TransportClosed(Media)) => (&[X::HandleTransportClose], P::Idle),
        (P::Opening, E::Timeout(TimerKind::Connect)) => (&[X::ConnectTimeout], P::Idle),
        (P::Opening, E::Congestion) => (&[X::SetCongestion], P::Opening),
        (P::Opening, E::SignalingClosed) => (&[X::CloseTransport], P::Closing),

        (P::Open, E::Api(A::Remove)) => (&[X::SetRemove, X::SendCloseRequest], P::Closing),
        (P::Open, E::Api(A::Close)) => (&[X::SendCloseRequest], P::Closing),
        (P::Open, E::Api(A::Abort)) => (&[X::SendAbortRequest], P::Closing),
        (P::Open, E::Api(A::GetConfig)) => (&[X::SendGetConfigRequest], P::Open),
        (P::Open, E::Api(A::Reconfig)) => (&[X::SendReconfigRequest], P::Open),
        (P::Open, E::Api(A::Security)) => (&[X::SendSecurityRequest], P::Open),
        (P::Open, E::Api(A::DelayReport)) => (&[X::SendDelayReportRequest], P::Open),
        (P::Open, E::Local(Sig::GetConfiguration)) => (&[X::SendGetConfigResponse], P::Open),
        (P::Open, E::Local(Sig::Reconfigure)) => (&[X::SendReconfigResponse], P::Open),
        (P::Open, E::Local(Sig::Security)) => (&[X::SendSecurityResponse], P::Open),
        (P::Open, E::Local(Sig::Close)) => (&[X::SendCloseResponse, X::StartDisconnectTimer], P::Closing),
        (P::Open, E::Local(Sig::Abort)) => (&[X::SendAbortResponse, X::StartDisconnectTimer], P::Closing),
        (P::Open, E::Command(Sig::GetConfiguration)) => (&[X::HandleGetConfigCommand], P::Open),
        (P::Open, E::Command(Sig::Reconfigure)) => (&[X::HandleReconfigCommand], P::Open),
        (P::Open, E::Command(Sig::Security)) => (&[X::HandleSecurityCommand], P::Open),
        (P::Open, E::Command(Sig::Close)) => (&[X::HandleCloseCommand], P::Open),
        (P::Open, E::Command(Sig::Abort)) => (&[X::HandleAbortCommand], P::Open),
        (P::Open, E::Command(Sig::DelayReport)) => (&[X::HandleDelayReportCommand], P::Open),
        (P::Open, E::Command(Sig::Start)) => (&[X::HandleStartCommand], P::Streaming),
        (P::Open, E::Response(Sig::Start)) => (&[X::HandleStartResponse], P::Streaming),
        (P::Open, E::Reject(Sig::Start)) => (&[X::HandleStartResponse], P::Open),
        (P::Open, E::Response(Sig::Reconfigure) | E::Reject(Sig::Reconfigure)) => (&[X::HandleReconfigResponse], P::Open),
        (P::Open, E::TransportOpened(Report)) => (&[X::HandleReportOpen], P::Open),
        (P::Open, E::TransportClosed(Report)) => (&[X::HandleReportClose], P::Open),
        (P::Open, E::TransportClosed(Media)) => (&[X::HandleTransportClose], P::Idle),
        (P::Open, E::Congestion) => (&[X::SetCongestion], P::Open),
        (P::Open, E::ReportData) => (&[X::HandleReportPacket], P::Open),
        (P::Open, E::SignalingClosed) => (&[X::CloseTransport], P::Closing),

        (P::Streaming, E::Api(A::Write)) => (&[X::WriteRequest, X::CheckSendPacket], P::Streaming),
        (P::Streaming, E::Api(A::Remove)) => (&[X::SetRemove, X::SendStreamClose], P::Closing),
        (P::Streaming, E::Api(A::Close)) => (&[X::SendStreamClose], P::Closing),
        (P::Streaming, E::Api(A::Abort)) => (&[X::ClearPacket, X::SendAbortRequest], P::Closing),
        (P::Streaming, E::Api(A::GetConfig)) => (&[X::SendGetConfigRequest], P::Streaming),
        (P::Streaming, E::Api(A::Security)) => (&[X::SendSecurityRequest], P::Streaming),
        (P::Streaming, E::Api(A::DelayReport)) => (&[X::SendDelayReportRequest], P::Streaming),
        (P::Streaming, E::Local(Sig::GetConfiguration)) => (&[X::SendGetConfigResponse], P::Streaming),
        (P::Streaming, E::Local(Sig::Security)) => (&[X::SendSecurityResponse], P::Streaming),
        (P::Streaming, E::Local(Sig::Close)) => (&[X::SendCloseResponse, X::StartDisconnectTimer], P::Closing),
        (P::Streaming, E::Local(Sig::Abort)) => (&[X::SendAbortResponse, X::StartDisconnectTimer], P::Closing),
        (P::Streaming, E::Command(Sig::Start)) => (&[X::HandleStartCommand], P::Streaming),
        (P::Streaming, E::Command(Sig::Suspend)) => (&[X::ClearPacket, X::HandleSuspendCommand], P::Open),
        (P::Streaming, E::Response(Sig::Suspend)) => (&[X::ClearPacket, X::HandleSuspendResponse], P::Open),
        (P::Streaming, E::Reject(Sig::Suspend)) => (&[X::HandleSuspendResponse], P::Streaming),
        (P::Streaming, E::Command(Sig::Close)) => (&[X::ClearPacket, X::HandleCloseCommand], P::Streaming),
        (P::Streaming, E::Command(Sig::Abort)) => (&[X::ClearPacket, X::HandleAbortCommand], P::Streaming),
        (P::Streaming, E::Command(Sig::GetConfiguration)) => (&[X::HandleGetConfigCommand], P::Streaming),
        (P::Streaming, E::Command(Sig::Security)) => (&[X::HandleSecurityCommand], P::Streaming),
        (P::Streaming, E::Command(Sig::DelayReport)) => (&[X::HandleDelayReportCommand], P::Streaming),
        (P::Streaming, E::TransportOpened(Report)) => (&[X::HandleReportOpen], P::Streaming),
        (P::Streaming, E::TransportClosed(Report)) => (&[X::HandleReportClose], P::Streaming),
        (P::Streaming, E::TransportClosed(Media)) => (&[X::HandleTransportClose], P::Idle),
        (P::Streaming, E::Congestion) => (&[X::SetCongestion, X::CheckSendPacket], P::Streaming),
        (P::Streaming, E::MediaData) => (&[X::HandleMediaPacket], P::Streaming),
        (P::Streaming, E::ReportData) => (&[X::HandleReportPacket], P::Streaming),
        (P::Streaming, E::SignalingClosed) => (&[X::CloseTransport], P::Closing),

        (P::Closing, E::Api(A::Remove)) => (&[X::SetRemove], P::Closing),
        (P::Closing, E::Local(Sig::Close)) => (&[X::SendCloseResponse], P::Closing),
        (P::Closing, E::Local(Sig::Abort)) => (&[X::SendAbortResponse], P::Closing),
        (P::Closing, E::Response(Sig::Close)) => (&[X::HandleCloseResponse, X::CloseTransport], P::Closing),
        (P::Closing, E::Reject(Sig::Close)) => (&[X::HandleCloseReject], P::Idle),
        (P::Closing, E::Response(Sig::Abort)) => (&[X::HandleAbortResponse, X::CloseTransport], P::Closing),
        (P::Closing, E::Command(Sig::Abort)) => (&[X::HandleAbortCommand], P::Closing),
        (P::Closing, E::Command(Sig::DelayReport)) => (&[X::HandleDelayReportCommand], P::Closing),
        (P::Closing, E::TransportOpened(_)) => (&[X::CloseTransport], P::Closing),
        (P::Closing, E::TransportClosed(Media)) => (&[X::HandleTransportClose], P::Idle),
        // The acceptor stops waiting for the peer to disconnect and closes
        // the transport itself; teardown still waits for the channel close.
        (P::Closing, E::Timeout(_)) => (&[X::CloseTransport], P::Closing),
        (P::Closing, E::Congestion) => (&[X::SetCongestion], P::Closing),

        (P::Opening | P::Open | P::Streaming | P::Closing, E::Command(Sig::SetConfiguration)) => {
            (&[X::RejectInUse], phase)
        }
        (
            P::Configured | P::Opening | P::Open | P::Streaming,
            E::Response(Sig::GetConfiguration) | E::Reject(Sig::GetConfiguration),
        ) => (&[X::HandleGetConfigResponse], phase),
        (
            P::Configured | P::Open | P::Streaming,
            E::Response(Sig::Security) | E::Reject(Sig::Security),
        ) => (&[X::HandleSecurityResponse], phase),
        (_, E::Response(Sig::DelayReport) | E::Reject(Sig::DelayReport)) => {
            (&[X::HandleDelayReportResponse], phase)
        }

        _ => return None,
    };

    Some(Transition { actions, next })
}

/// One stream plus everything its handlers may touch, for one event
pub(crate) struct StreamContext<'c, 'a, S: StreamServices + ?Sized> {
    pub(crate) scb: &'c mut StreamControlBlock<'a>,
    pub(crate) channels: &'c ChannelTable,
    pub(crate) services: &'c mut S,
    pub(crate) options: &'c StreamEngineOptions,
    /// Phase the stream was in when the event being handled arrived
    pub(crate) prior: StreamPhase,
}

impl<'c, 'a, S: StreamServices + ?Sized> StreamContext<'c, 'a, S> {
    pub(crate) fn new(
        scb: &'c mut StreamControlBlock<'a>,
        channels: &'c ChannelTable,
        services: &'c mut S,
        options: &'c StreamEngineOptions,
    ) -> Self {
        let prior = scb.phase;
        Self {
            scb,
            channels,
            services,
            options,
            prior,
        }
    }

    /// Peer address behind the bound signaling channel
    pub(crate) fn peer(&self) -> Option<BluetoothAddress> {
        self.scb
            .channel
            .and_then(|index| self.channels.get(&index).copied())
    }

    /// Run one event to completion
    pub(crate) fn dispatch(&mut self, mut event: StreamEvent) {
        let phase = self.scb.phase;
        let code = event.code();

        if let EventCode::Timeout(kind) = code {
            if self.scb.timer != Some(kind) {
                debug!("[SCB] {} stale {} timeout ignored", self.scb.handle, kind);
                return;
            }
            self.scb.timer = None;
        }

        let Some(transition) = lookup(phase, code) else {
            self.unhandled(code, &mut event);
            return;
        };

        if transition.next != phase {
            debug!(
                "[SCB] {} {} -> {} on {}",
                self.scb.handle, phase, transition.next, code
            );
        }
        let outer = core::mem::replace(&mut self.prior, phase);
        self.scb.phase = transition.next;
        for action in transition.actions {
            self.run(*action, &mut event);
        }
        self.prior = outer;
    }

    fn unhandled(&mut self, code: EventCode, event: &mut StreamEvent) {
        let phase = self.scb.phase;
        match code {
            EventCode::Command(_) => {
                if let Some(msg) = event.message() {
                    if phase == StreamPhase::Idle {
                        self.reject_not_in_use(msg);
                    } else {
                        self.reject_bad_state(msg);
                    }
                }
            }
            EventCode::Api(_) | EventCode::Local(_) => {
                debug!(
                    "[SCB] {} {} not allowed in {}",
                    self.scb.handle, code, phase
                );
                self.report_bad_state(code);
            }
            EventCode::MediaData | EventCode::ReportData => {
                error!("[SCB] {} packet dropped in {}", self.scb.handle, phase);
            }
            _ => debug!("[SCB] {} {} ignored in {}", self.scb.handle, code, phase),
        }
    }

    fn run(&mut self, action: Action, event: &mut StreamEvent) {
        match action {
            Action::Dealloc => self.dealloc(),
            Action::SetRemove => self.scb.remove = true,
            Action::RejectInUse => {
                if let Some(msg) = event.message() {
                    self.reject_in_use(msg);
                }
            }
            Action::FreePacket => self.free_packet(event),
            Action::ClearPacket => self.clear_packet(),
            Action::WriteRequest => self.write_request(event),
            Action::CheckSendPacket => self.check_send_packet(),
            Action::SetCongestion => {
                if let StreamEvent::Congestion(congested) = event {
                    self.scb.cong = *congested;
                }
            }
            Action::HandleMediaPacket => self.handle_media_packet(event),
            Action::HandleReportPacket => self.handle_report_packet(event),
            Action::SendSetConfigRequest => self.send_set_config_request(event),
            Action::SendSetConfigResponse => self.send_set_config_response(event),
            Action::HandleSetConfigCommand => self.handle_set_config_command(event),
            Action::HandleSetConfigResponse => self.handle_set_config_response(),
            Action::HandleSetConfigReject => self.handle_set_config_reject(event),
            Action::SendGetConfigRequest => self.send_empty_request(SignalId::GetConfiguration),
            Action::SendGetConfigResponse => self.send_get_config_response(event),
            Action::HandleGetConfigCommand => self.handle_get_config_command(event),
            Action::HandleGetConfigResponse => self.handle_get_config_response(event),
            Action::SendOpenRequest => self.send_empty_request(SignalId::Open),
            Action::SendOpenResponse => self.send_open_response(event),
            Action::HandleOpenCommand => self.handle_open_command(event),
            Action::HandleOpenResponse => self.handle_open_response(),
            Action::HandleStartCommand => self.handle_start_command(),
            Action::HandleStartResponse => self.handle_start_response(event),
            Action::HandleSuspendCommand => self.handle_suspend_command(),
            Action::HandleSuspendResponse => self.handle_suspend_response(event),
            Action::SendCloseRequest => self.send_close_request(),
            Action::SendCloseResponse => self.send_close_response(event),
            Action::SendStreamClose => self.send_stream_close(),
            Action::HandleCloseCommand => self.handle_close_command(event),
            Action::HandleCloseResponse => self.handle_close_response(event),
            Action::HandleCloseReject => self.handle_close_reject(event),
            Action::SendReconfigRequest => self.send_reconfig_request(event),
            Action::SendReconfigResponse => self.send_reconfig_response(event),
            Action::HandleReconfigCommand => self.handle_reconfig_command(event),
            Action::HandleReconfigResponse => self.handle_reconfig_response(event),
            Action::SendSecurityRequest => self.send_security_request(event),
            Action::SendSecurityResponse => self.send_security_response(event),
            Action::HandleSecurityCommand => self.handle_security_command(event),
            Action::HandleSecurityResponse => self.handle_security_response(event),
            Action::SendAbortRequest => self.send_abort_request(),
            Action::SendAbortResponse => self.send_abort_response(event),
            Action::HandleAbortCommand => self.handle_abort_command(event),
            Action::HandleAbortResponse => {
                debug!("[SCB] {} abort acknowledged", self.scb.handle);
            }
            Action::SendDelayReportRequest => self.send_delay_report_request(event),
            Action::HandleDelayReportCommand => self.handle_delay_report_command(event),
            Action::HandleDelayReportResponse => self.handle_delay_report_response(event),
            Action::HandleTransportOpen => self.transport_opened(),
            Action::HandleReportOpen => self.report_opened(),
            Action::HandleTransportClose => self.transport_closed(event),
            Action::HandleReportClose => self.report_closed(event),
            Action::CloseComplete => self.close_complete(self.scb.close_code),
            Action::CloseTransport => self.close_transport(),
            Action::ConnectTimeout => self.connect_timeout(),
            Action::StartDisconnectTimer => self.start_timer(TimerKind::Disconnect),
        }
    }

    fn dealloc(&mut self) {
        debug!("[SCB] {} released", self.scb.handle);
        self.scb.released = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::avdtp::ChannelType;

    #[test]
    fn test_unlisted_pairs_fall_back() {
        let open_cmd = EventCode::Command(SignalId::Open);
        let write = EventCode::Api(ApiCode::Write);
        let media_closed = EventCode::TransportClosed(ChannelType::Media);
        assert!(lookup(StreamPhase::Idle, open_cmd).is_none());
        assert!(lookup(StreamPhase::Open, write).is_none());
        assert!(lookup(StreamPhase::Idle, media_closed).is_none());
        assert!(lookup(StreamPhase::Open, EventCode::MediaData).is_none());
    }

    #[test]
    fn test_setconfig_in_use_everywhere_after_configuration() {
        let set_config = EventCode::Command(SignalId::SetConfiguration);
        for phase in [
            StreamPhase::Opening,
            StreamPhase::Open,
            StreamPhase::Streaming,
            StreamPhase::Closing,
        ] {
            let t = lookup(phase, set_config).unwrap();
            assert_eq!(t.actions, &[Action::RejectInUse]);
            assert_eq!(t.next, phase);
        }
    }

    #[test]
    fn test_streaming_write_checks_congestion() {
        let t = lookup(StreamPhase::Streaming, EventCode::Api(ApiCode::Write)).unwrap();
        assert_eq!(t.actions, &[Action::WriteRequest, Action::CheckSendPacket]);
        assert_eq!(t.next, StreamPhase::Streaming);
    }

    #[test]
    fn test_timeouts_only_where_armed() {
        let connect = EventCode::Timeout(TimerKind::Connect);
        let disconnect = EventCode::Timeout(TimerKind::Disconnect);
        assert!(lookup(StreamPhase::Open, connect).is_none());
        let t = lookup(StreamPhase::Opening, connect).unwrap();
        assert_eq!(t.next, StreamPhase::Idle);
        let t = lookup(StreamPhase::Closing, disconnect).unwrap();
        assert_eq!(t.actions, &[Action::CloseTransport]);
        assert_eq!(t.next, StreamPhase::Closing);
    }

    #[test]
    fn test_delay_report_confirm_in_every_phase() {
        for phase in [
            StreamPhase::Idle,
            StreamPhase::Configured,
            StreamPhase::Opening,
            StreamPhase::Open,
            StreamPhase::Streaming,
            StreamPhase::Closing,
        ] {
            let t = lookup(phase, EventCode::Reject(SignalId::DelayReport)).unwrap();
            assert_eq!(t.actions, &[Action::HandleDelayReportResponse]);
        }
    }
}
