//! Media data path
//!
//! Outbound: one buffered packet per stream, released to the transport
//! while the media channel is not congested. A newer write replaces the
//! buffered packet. Inbound: media and report packets are parsed and handed
//! to the registered sinks; anything malformed is logged and dropped.

use super::event::{ApiRequest, ControlEvent, Status, StreamEvent};
use super::media::{MediaFrame, MediaHeader};
use super::report::{ReportError, parse_report};
use super::services::StreamServices;
use super::state::StreamContext;

impl<S: StreamServices + ?Sized> StreamContext<'_, '_, S> {
    fn write_confirm(&self, status: Status) {
        self.notify(ControlEvent::WriteCfm { status });
    }

    /// Write request outside of streaming
    pub(super) fn free_packet(&mut self, event: &mut StreamEvent) {
        if event.take_buffer().is_some() {
            self.write_confirm(Status::BAD_STATE);
        }
    }

    /// Drop the buffered packet and whatever the media channel still holds
    pub(super) fn clear_packet(&mut self) {
        self.services.flush_media(self.scb.handle);
        if self.scb.pending_packet.take().is_some() {
            self.write_confirm(Status::BAD_STATE);
        }
    }

    /// Close a streaming stream; nothing buffered survives
    pub(super) fn send_stream_close(&mut self) {
        self.clear_packet();
        self.send_close_request();
    }

    pub(super) fn write_request(&mut self, event: &mut StreamEvent) {
        let StreamEvent::Api(ApiRequest::Write(request)) = event else {
            return;
        };
        let mut packet = core::mem::take(&mut request.buffer);

        if self.scb.pending_packet.take().is_some() {
            warn!("[MEDIA] {} buffered packet replaced", self.scb.handle);
            self.write_confirm(Status::BAD_STATE);
        }

        if request.add_header && self.scb.curr_cfg.uses_media_header() {
            let seq_num = self.scb.media_seq.wrapping_add(1);
            let header = MediaHeader {
                marker_pt: request.marker_pt,
                seq_num,
                timestamp: request.timestamp,
                ssrc: self.scb.curr_cfg.media_ssrc(),
            };
            if let Err(err) = packet.prepend(&header.encode()) {
                warn!("[MEDIA] {} header does not fit: {}", self.scb.handle, err);
                self.write_confirm(Status::BAD_STATE);
                return;
            }
            self.scb.media_seq = seq_num;
        }

        self.scb.pending_packet = Some(packet);
    }

    pub(super) fn check_send_packet(&mut self) {
        if self.scb.cong {
            return;
        }
        if let Some(packet) = self.scb.pending_packet.take() {
            self.services.write_media(self.scb.handle, packet);
            self.write_confirm(Status::OK);
        }
    }

    pub(super) fn handle_media_packet(&mut self, event: &mut StreamEvent) {
        let Some(mut buffer) = event.take_buffer() else {
            return;
        };
        let layout = match MediaHeader::parse(buffer.as_slice()) {
            Ok(layout) => layout,
            Err(err) => {
                warn!("[MEDIA] {} bad media packet: {}", self.scb.handle, err);
                return;
            }
        };
        if let Err(err) = buffer.trim(layout.payload_offset, layout.padding) {
            warn!("[MEDIA] {} bad media packet: {}", self.scb.handle, err);
            return;
        }

        let Some(sink) = self.scb.registration.media_sink else {
            debug!("[MEDIA] {} no media sink", self.scb.handle);
            return;
        };
        sink.on_media(
            self.scb.handle,
            MediaFrame {
                seq_num: layout.header.seq_num,
                timestamp: layout.header.timestamp,
                marker_pt: layout.header.marker_pt,
                payload: buffer,
            },
        );
    }

    pub(super) fn handle_report_packet(&mut self, event: &mut StreamEvent) {
        let Some(buffer) = event.take_buffer() else {
            return;
        };
        match parse_report(buffer.as_slice()) {
            Ok(report) => match self.scb.registration.report_sink {
                Some(sink) => sink.on_report(self.scb.handle, &report),
                None => debug!("[REPORT] {} no report sink", self.scb.handle),
            },
            Err(ReportError::BadParams) => {
                error!("[REPORT] {} unknown report type", self.scb.handle);
            }
            Err(err) => warn!("[REPORT] {} report dropped: {}", self.scb.handle, err),
        }
    }
}
