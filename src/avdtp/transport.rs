//! Transport channel lifecycle
//!
//! Opening and closing the media and report channels, the connect and
//! disconnect timers, and the teardown that returns a stream to idle once
//! its media channel is gone.

use super::config::ServiceCapabilities;
use super::event::{ControlEvent, Status, StreamEvent};
use super::services::StreamServices;
use super::state::{StreamContext, StreamPhase};
use super::{ChannelType, Role, TimerKind, TransportRole, error_code};

impl<S: StreamServices + ?Sized> StreamContext<'_, '_, S> {
    fn reports_negotiated(&self) -> bool {
        self.scb
            .curr_cfg
            .psc_mask
            .supports(ServiceCapabilities::REPORT)
    }

    fn open_channel(&mut self, kind: ChannelType, role: TransportRole) {
        let Some(channel) = self.scb.channel else {
            warn!(
                "[SCB] {} cannot open {} channel unbound",
                self.scb.handle, kind
            );
            return;
        };
        self.services
            .open_channel(self.scb.handle, channel, kind, role);
    }

    pub(crate) fn open_media(&mut self, role: TransportRole) {
        self.open_channel(ChannelType::Media, role);
    }

    pub(crate) fn close_transport(&mut self) {
        if self.reports_negotiated() {
            self.services
                .close_channel(self.scb.handle, ChannelType::Report);
        }
        self.services
            .close_channel(self.scb.handle, ChannelType::Media);
    }

    /// Arm `kind`, replacing whatever timer is armed
    pub(crate) fn start_timer(&mut self, kind: TimerKind) {
        self.cancel_timer();
        let timeout_ms = match kind {
            TimerKind::Connect => self.options.connect_timeout_ms,
            TimerKind::Disconnect => self.options.disconnect_timeout_ms,
        };
        self.services.start_timer(self.scb.handle, kind, timeout_ms);
        self.scb.timer = Some(kind);
    }

    pub(crate) fn cancel_timer(&mut self) {
        if let Some(kind) = self.scb.timer.take() {
            self.services.cancel_timer(self.scb.handle, kind);
        }
    }

    /// Media channel is up
    pub(super) fn transport_opened(&mut self) {
        self.cancel_timer();
        let psc_mask = self.scb.curr_cfg.psc_mask;
        let status = Status::OK;
        if self.scb.role == Role::OpenInitiator {
            self.notify(ControlEvent::OpenCfm { status, psc_mask });
        } else {
            self.notify(ControlEvent::OpenInd { status, psc_mask });
        }

        if self.reports_negotiated() {
            let role = if self.scb.role == Role::OpenInitiator {
                TransportRole::Initiator
            } else {
                TransportRole::Acceptor
            };
            self.open_channel(ChannelType::Report, role);
        }
    }

    pub(super) fn report_opened(&mut self) {
        self.notify(ControlEvent::ReportConn);
    }

    pub(super) fn report_closed(&mut self, event: &mut StreamEvent) {
        if let StreamEvent::TransportClosed { was_open: true, .. } = event {
            self.notify(ControlEvent::ReportDisconn);
        }
    }

    /// Media channel is gone; the transport error wins over the close code
    pub(super) fn transport_closed(&mut self, event: &mut StreamEvent) {
        let err_code = match event {
            StreamEvent::TransportClosed { err_code, .. } if *err_code != 0 => *err_code,
            _ => self.scb.close_code,
        };
        self.finish_close(Status::error(err_code));
    }

    pub(super) fn close_complete(&mut self, err_code: u8) {
        self.finish_close(Status::error(err_code));
    }

    pub(super) fn connect_timeout(&mut self) {
        warn!("[SCB] {} transport connect timed out", self.scb.handle);
        self.close_transport();
        self.finish_close(Status::error(error_code::TIMEOUT));
    }

    /// Return the stream to idle and report the close
    pub(crate) fn finish_close(&mut self, status: Status) {
        let peer = self.peer();
        let role = self.scb.role;

        self.cancel_timer();
        if matches!(role, Role::CloseInitiator | Role::OpenInitiator) {
            self.release_signaling();
        }
        self.scb.clear_vars();
        self.scb.media_seq = 0;
        self.scb.cong = false;
        self.scb.pending_packet = None;
        self.scb.role = Role::CloseAcceptor;
        self.scb.close_code = 0;
        self.scb.phase = StreamPhase::Idle;
        if self.scb.remove {
            self.scb.released = true;
        }

        debug!(
            "[SCB] {} closed, status {}",
            self.scb.handle, status.err_code
        );
        let event = if role == Role::CloseInitiator {
            ControlEvent::CloseCfm { status }
        } else {
            ControlEvent::CloseInd { status }
        };
        self.notify_peer(peer, event);
    }
}
