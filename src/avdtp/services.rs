//! Collaborator interfaces
//!
//! The engine drives the rest of the host stack only through these traits.
//! Every call is a non-blocking hand-off: implementations queue the work
//! and return. Results come back later as [`StreamEvent`](super::StreamEvent)s.

use super::event::ControlEvent;
use super::media::{MediaBuffer, MediaFrame};
use super::message::SignalMessage;
use super::report::Report;
use super::{ChannelIndex, ChannelType, StreamHandle, TimerKind, TransportRole};
use crate::BluetoothAddress;

/// Sends signaling messages on behalf of a stream
pub trait SignalingSender {
    /// Send a command to the peer
    fn send_command(&mut self, handle: StreamHandle, message: SignalMessage);

    /// Send an accepting response to the peer
    fn send_response(&mut self, handle: StreamHandle, message: SignalMessage);

    /// Send a reject to the peer; the header carries the error code and parameter
    fn send_reject(&mut self, handle: StreamHandle, message: SignalMessage);
}

/// Owns the media and report transport channels
pub trait TransportAdapter {
    /// Open a transport channel for a stream
    fn open_channel(
        &mut self,
        handle: StreamHandle,
        channel: ChannelIndex,
        kind: ChannelType,
        role: TransportRole,
    );

    /// Close a transport channel of a stream
    fn close_channel(&mut self, handle: StreamHandle, kind: ChannelType);

    /// Hand a media packet to the media channel
    fn write_media(&mut self, handle: StreamHandle, packet: MediaBuffer);

    /// Drop media packets queued below the stream
    fn flush_media(&mut self, handle: StreamHandle);
}

/// Per-stream transport channel timer
pub trait StreamTimers {
    /// Arm the timer; expiry is delivered as [`StreamEvent::Timeout`](super::StreamEvent::Timeout)
    fn start_timer(&mut self, handle: StreamHandle, kind: TimerKind, timeout_ms: u32);

    /// Disarm the timer
    fn cancel_timer(&mut self, handle: StreamHandle, kind: TimerKind);
}

/// Events a stream reports to its signaling channel control block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelEvent {
    /// Stream needs the signaling channel
    UpperLayerOpen,
    /// Stream no longer needs the signaling channel
    UpperLayerClose,
}

/// Signaling channel control block
pub trait ChannelControl {
    /// Deliver a stream event to the signaling channel
    fn channel_event(&mut self, channel: ChannelIndex, event: ChannelEvent);
}

/// Everything a stream needs from the host stack
pub trait StreamServices:
    SignalingSender + TransportAdapter + StreamTimers + ChannelControl
{
}

impl<T> StreamServices for T where
    T: SignalingSender + TransportAdapter + StreamTimers + ChannelControl
{
}

/// Receives protocol indications and confirmations
pub trait ControlCallback {
    /// Called once per control event, on the protocol context
    fn on_control_event(
        &self,
        handle: StreamHandle,
        peer: Option<BluetoothAddress>,
        event: ControlEvent<'_>,
    );
}

/// Receives inbound media frames
pub trait MediaSink {
    /// Called once per valid media packet
    fn on_media(&self, handle: StreamHandle, frame: MediaFrame);
}

/// Receives parsed reports
pub trait ReportSink {
    /// Called once per valid report packet
    fn on_report(&self, handle: StreamHandle, report: &Report);
}
