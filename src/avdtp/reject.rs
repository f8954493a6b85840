//! Rejects and local "bad state" reports
//!
//! Neither path touches stream state. A reject answers one peer command on
//! the wire; a bad state report answers one local API request through the
//! control callback.

use super::error_code;
use super::event::{ApiCode, ControlEvent, EventCode, Status};
use super::message::SignalMessage;
use super::services::StreamServices;
use super::state::StreamContext;

impl<S: StreamServices + ?Sized> StreamContext<'_, '_, S> {
    /// Answer `command` with a reject carrying `err_code` and `err_param`
    pub(crate) fn reject(&mut self, command: &SignalMessage, err_code: u8, err_param: u8) {
        warn!(
            "[SCB] {} rejecting {} with {}",
            self.scb.handle, command.header.signal, err_code
        );
        let reply = command.reply().with_error(err_code, err_param);
        self.services.send_reject(self.scb.handle, reply);
    }

    pub(crate) fn reject_bad_state(&mut self, command: &SignalMessage) {
        self.reject(command, error_code::BAD_STATE, 0);
    }

    pub(crate) fn reject_in_use(&mut self, command: &SignalMessage) {
        self.reject(command, error_code::SEP_IN_USE, 0);
    }

    pub(crate) fn reject_not_in_use(&mut self, command: &SignalMessage) {
        self.reject(command, error_code::SEP_NOT_IN_USE, 0);
    }

    /// Tell the application a local request is not allowed right now
    pub(crate) fn report_bad_state(&self, code: EventCode) {
        let status = Status::BAD_STATE;
        let curr = &self.scb.curr_cfg;
        let event = match code {
            EventCode::Api(ApiCode::Write) => ControlEvent::WriteCfm { status },
            EventCode::Api(ApiCode::SetConfig | ApiCode::Open) => ControlEvent::OpenCfm {
                status,
                psc_mask: curr.psc_mask,
            },
            EventCode::Api(ApiCode::Close) => ControlEvent::CloseCfm { status },
            EventCode::Api(ApiCode::Reconfig) => ControlEvent::ReconfigCfm {
                status,
                config: curr,
            },
            EventCode::Api(ApiCode::Security) => ControlEvent::SecurityCfm { status, data: &[] },
            _ => return,
        };
        self.notify(event);
    }
}
