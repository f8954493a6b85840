//! Signaling actions
//!
//! One handler per control primitive: outbound requests, local responses
//! to peer commands, and inbound commands, responses and rejects. Handlers
//! never fail; problems are answered with a reject on the wire or reported
//! through the control callback.

use super::config::{ServiceCapabilities, UnsupportedCommands};
use super::event::{ApiRequest, ControlEvent, Status, StreamEvent};
use super::message::{MessageBody, SignalMessage};
use super::services::{ChannelEvent, StreamServices};
use super::state::{StreamContext, StreamPhase};
use super::{Role, SignalId, TimerKind, TransportRole, error_code};
use crate::BluetoothAddress;

impl<S: StreamServices + ?Sized> StreamContext<'_, '_, S> {
    /// Report a control event for the bound peer
    pub(crate) fn notify(&self, event: ControlEvent<'_>) {
        self.notify_peer(self.peer(), event);
    }

    pub(crate) fn notify_peer(&self, peer: Option<BluetoothAddress>, event: ControlEvent<'_>) {
        self.scb
            .registration
            .control
            .on_control_event(self.scb.handle, peer, event);
    }

    pub(crate) fn release_signaling(&mut self) {
        if let Some(channel) = self.scb.channel {
            self.services
                .channel_event(channel, ChannelEvent::UpperLayerClose);
        }
    }

    /// Send a command to the peer stream endpoint
    fn send_request(&mut self, signal: SignalId, body: MessageBody) {
        let Some(channel) = self.scb.channel else {
            warn!(
                "[SCB] {} {} request without a channel",
                self.scb.handle, signal
            );
            return;
        };
        let command = SignalMessage::new(channel, signal)
            .with_seid(self.scb.peer_seid)
            .with_body(body);
        self.services.send_command(self.scb.handle, command);
    }

    pub(crate) fn send_empty_request(&mut self, signal: SignalId) {
        self.send_request(signal, MessageBody::Empty);
    }

    /// Answer a peer command; the local response's error code selects
    /// between response and reject
    fn respond(&mut self, local: &SignalMessage, body: MessageBody) {
        let channel = self.scb.channel.unwrap_or(local.header.channel);
        let reply = SignalMessage::new(channel, local.header.signal).with_label(local.header.label);
        if local.is_ok() {
            self.services
                .send_response(self.scb.handle, reply.with_body(body));
        } else {
            let reply = reply.with_error(local.header.err_code, local.header.err_param);
            self.services.send_reject(self.scb.handle, reply);
        }
    }

    /// Accept a peer command on the spot
    fn accept(&mut self, command: &SignalMessage) {
        self.dispatch(StreamEvent::LocalResponse(command.reply()));
    }

    fn refuses(&self, command: u8) -> bool {
        self.scb.registration.nsc_mask.contains(command)
    }

    pub(super) fn send_set_config_request(&mut self, event: &mut StreamEvent) {
        let StreamEvent::Api(ApiRequest::SetConfig {
            channel,
            peer_seid,
            config,
        }) = event
        else {
            return;
        };
        self.scb.in_use = true;
        self.scb.channel = Some(*channel);
        self.scb.peer_seid = *peer_seid;
        self.scb.req_cfg = config.clone();
        self.services
            .channel_event(*channel, ChannelEvent::UpperLayerOpen);

        let command = SignalMessage::new(*channel, SignalId::SetConfiguration)
            .with_seid(*peer_seid)
            .with_config(self.scb.handle, core::mem::take(config));
        self.services.send_command(self.scb.handle, command);
    }

    pub(super) fn handle_set_config_command(&mut self, event: &mut StreamEvent) {
        let StreamEvent::Command(command) = event else {
            return;
        };
        if self.scb.in_use {
            self.reject_in_use(command);
            return;
        }
        let (Some(config), Some(int_seid)) = (command.config(), command.int_seid()) else {
            self.reject(command, error_code::BAD_PAYLOAD_FORMAT, 0);
            return;
        };
        if config.codec_type_octet() != self.scb.registration.config.codec_type_octet() {
            self.reject(command, error_code::UNSUPPORTED_CONFIGURATION, 0);
            return;
        }

        self.scb.in_use = true;
        self.scb.channel = Some(command.header.channel);
        self.scb.peer_seid = int_seid;
        self.scb.req_cfg = config.clone();
        self.notify(ControlEvent::ConfigInd {
            int_seid,
            label: command.header.label,
            config: &self.scb.req_cfg,
        });
    }

    pub(super) fn send_set_config_response(&mut self, event: &mut StreamEvent) {
        let StreamEvent::LocalResponse(local) = event else {
            return;
        };
        if !self.scb.in_use {
            debug!("[SCB] {} no configuration to answer", self.scb.handle);
            self.scb.phase = self.prior;
            return;
        }
        if local.is_ok() {
            self.scb.curr_cfg = self.scb.req_cfg.clone();
            self.respond(local, MessageBody::Empty);
        } else {
            self.respond(local, MessageBody::Empty);
            self.release_signaling();
            self.scb.clear_vars();
            self.scb.phase = StreamPhase::Idle;
        }
    }

    pub(super) fn handle_set_config_response(&mut self) {
        if self.scb.in_use {
            self.scb.curr_cfg = self.scb.req_cfg.clone();
            self.dispatch(StreamEvent::Api(ApiRequest::Open));
        }
    }

    /// Configuration or open refused by the peer
    pub(super) fn handle_set_config_reject(&mut self, event: &mut StreamEvent) {
        let status = event.message().map_or(Status::BAD_STATE, Status::of);
        let peer = self.peer();
        self.release_signaling();
        self.scb.clear_vars();
        self.notify_peer(
            peer,
            ControlEvent::OpenCfm {
                status,
                psc_mask: ServiceCapabilities::default(),
            },
        );
    }

    pub(super) fn handle_get_config_command(&mut self, event: &mut StreamEvent) {
        let StreamEvent::Command(command) = event else {
            return;
        };
        if self.refuses(UnsupportedCommands::GET_CONFIG) {
            self.reject(command, error_code::NOT_SUPPORTED_COMMAND, 0);
        } else {
            self.accept(command);
        }
    }

    pub(super) fn send_get_config_response(&mut self, event: &mut StreamEvent) {
        let StreamEvent::LocalResponse(local) = event else {
            return;
        };
        let body = MessageBody::Config {
            int_seid: self.scb.handle,
            config: self.scb.curr_cfg.clone(),
        };
        self.respond(local, body);
    }

    pub(super) fn handle_get_config_response(&mut self, event: &mut StreamEvent) {
        let Some(msg) = event.message() else {
            return;
        };
        self.notify(ControlEvent::GetConfigCfm {
            status: Status::of(msg),
            config: msg.config(),
        });
    }

    pub(super) fn send_open_response(&mut self, event: &mut StreamEvent) {
        let StreamEvent::LocalResponse(local) = event else {
            return;
        };
        if !local.is_ok() {
            self.respond(local, MessageBody::Empty);
            self.scb.phase = self.prior;
            return;
        }
        self.scb.role = Role::OpenAcceptor;
        self.open_media(TransportRole::Acceptor);
        self.respond(local, MessageBody::Empty);
        self.start_timer(TimerKind::Connect);
    }

    pub(super) fn handle_open_command(&mut self, event: &mut StreamEvent) {
        if let StreamEvent::Command(command) = event {
            self.accept(command);
        }
    }

    pub(super) fn handle_open_response(&mut self) {
        self.scb.role = Role::OpenInitiator;
        self.open_media(TransportRole::Initiator);
        self.start_timer(TimerKind::Connect);
    }

    pub(super) fn handle_start_command(&mut self) {
        self.notify(ControlEvent::StartInd { status: Status::OK });
    }

    pub(super) fn handle_start_response(&mut self, event: &mut StreamEvent) {
        let status = event.message().map_or(Status::OK, Status::of);
        self.notify(ControlEvent::StartCfm { status });
    }

    pub(super) fn handle_suspend_command(&mut self) {
        self.notify(ControlEvent::SuspendInd { status: Status::OK });
    }

    pub(super) fn handle_suspend_response(&mut self, event: &mut StreamEvent) {
        let status = event.message().map_or(Status::OK, Status::of);
        self.notify(ControlEvent::SuspendCfm { status });
    }

    pub(super) fn send_close_request(&mut self) {
        self.scb.role = Role::CloseInitiator;
        self.send_empty_request(SignalId::Close);
    }

    pub(super) fn send_close_response(&mut self, event: &mut StreamEvent) {
        let StreamEvent::LocalResponse(local) = event else {
            return;
        };
        self.respond(local, MessageBody::Empty);
        if !local.is_ok() {
            self.scb.phase = self.prior;
        }
    }

    pub(super) fn handle_close_command(&mut self, event: &mut StreamEvent) {
        if let StreamEvent::Command(command) = event {
            self.scb.role = Role::CloseAcceptor;
            self.accept(command);
        }
    }

    pub(super) fn handle_close_response(&mut self, event: &mut StreamEvent) {
        if let Some(msg) = event.message() {
            self.scb.close_code = msg.header.err_code;
        }
    }

    /// Peer refused to close: tear the stream down locally
    pub(super) fn handle_close_reject(&mut self, event: &mut StreamEvent) {
        let status = event.message().map_or(Status::BAD_STATE, Status::of);
        self.close_transport();
        self.finish_close(status);
    }

    pub(super) fn send_reconfig_request(&mut self, event: &mut StreamEvent) {
        let StreamEvent::Api(ApiRequest::Reconfig(config)) = event else {
            return;
        };
        self.scb.req_cfg = config.clone();
        let body = MessageBody::Config {
            int_seid: self.scb.handle,
            config: core::mem::take(config),
        };
        self.send_request(SignalId::Reconfigure, body);
    }

    pub(super) fn handle_reconfig_command(&mut self, event: &mut StreamEvent) {
        let StreamEvent::Command(command) = event else {
            return;
        };
        if self.refuses(UnsupportedCommands::RECONFIG) {
            self.reject(command, error_code::NOT_SUPPORTED_COMMAND, 0);
            return;
        }
        let Some(config) = command.config() else {
            self.reject(command, error_code::BAD_PAYLOAD_FORMAT, 0);
            return;
        };
        self.scb.req_cfg = config.clone();
        self.notify(ControlEvent::ReconfigInd {
            label: command.header.label,
            config: &self.scb.req_cfg,
        });
    }

    pub(super) fn send_reconfig_response(&mut self, event: &mut StreamEvent) {
        let StreamEvent::LocalResponse(local) = event else {
            return;
        };
        if local.is_ok() {
            self.scb.commit_requested_config();
        }
        self.respond(local, MessageBody::Empty);
    }

    /// Reconfigure response or reject from the peer
    pub(super) fn handle_reconfig_response(&mut self, event: &mut StreamEvent) {
        let status = event.message().map_or(Status::OK, Status::of);
        if status.is_ok() {
            self.scb.commit_requested_config();
        }
        self.notify(ControlEvent::ReconfigCfm {
            status,
            config: &self.scb.curr_cfg,
        });
    }

    pub(super) fn send_security_request(&mut self, event: &mut StreamEvent) {
        if let StreamEvent::Api(ApiRequest::Security(data)) = event {
            let body = MessageBody::Security(core::mem::take(data));
            self.send_request(SignalId::Security, body);
        }
    }

    pub(super) fn handle_security_command(&mut self, event: &mut StreamEvent) {
        let StreamEvent::Command(command) = event else {
            return;
        };
        if self.refuses(UnsupportedCommands::SECURITY) {
            self.reject(command, error_code::NOT_SUPPORTED_COMMAND, 0);
        } else if !self.scb.in_use {
            self.reject_not_in_use(command);
        } else {
            self.notify(ControlEvent::SecurityInd {
                label: command.header.label,
                data: command.security_data(),
            });
        }
    }

    pub(super) fn send_security_response(&mut self, event: &mut StreamEvent) {
        if let StreamEvent::LocalResponse(local) = event {
            let body = local.body.clone();
            self.respond(local, body);
        }
    }

    pub(super) fn handle_security_response(&mut self, event: &mut StreamEvent) {
        if let Some(msg) = event.message() {
            self.notify(ControlEvent::SecurityCfm {
                status: Status::of(msg),
                data: msg.security_data(),
            });
        }
    }

    pub(super) fn send_abort_request(&mut self) {
        if self.scb.channel.is_some() {
            self.scb.role = Role::CloseInitiator;
            self.send_empty_request(SignalId::Abort);
        }
    }

    pub(super) fn send_abort_response(&mut self, event: &mut StreamEvent) {
        if let StreamEvent::LocalResponse(local) = event {
            self.respond(local, MessageBody::Empty);
        }
    }

    pub(super) fn handle_abort_command(&mut self, event: &mut StreamEvent) {
        if let StreamEvent::Command(command) = event {
            self.scb.role = Role::CloseAcceptor;
            self.accept(command);
        }
    }

    pub(super) fn send_delay_report_request(&mut self, event: &mut StreamEvent) {
        if let StreamEvent::Api(ApiRequest::DelayReport(delay)) = event {
            self.send_request(SignalId::DelayReport, MessageBody::DelayReport(*delay));
        }
    }

    pub(super) fn handle_delay_report_command(&mut self, event: &mut StreamEvent) {
        let StreamEvent::Command(command) = event else {
            return;
        };
        let Some(delay) = command.delay() else {
            self.reject(command, error_code::BAD_PAYLOAD_FORMAT, 0);
            return;
        };
        self.notify(ControlEvent::DelayReportInd { delay });

        if self.scb.channel.is_some() {
            let reply = command.reply();
            self.services.send_response(self.scb.handle, reply);
        } else {
            self.reject_not_in_use(command);
        }
    }

    pub(super) fn handle_delay_report_response(&mut self, event: &mut StreamEvent) {
        let status = event.message().map_or(Status::OK, Status::of);
        self.notify(ControlEvent::DelayReportCfm { status });
    }
}
