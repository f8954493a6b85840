//! Stream engine
//!
//! Owns the fixed pool of stream control blocks and the table of signaling
//! channels they refer to. Every event for a stream goes through
//! [`StreamEngine::handle_event`] and runs to completion before it returns.

use heapless::FnvIndexMap;

use super::event::{ApiRequest, StreamEvent};
use super::scb::{StreamControlBlock, StreamRegistration};
use super::services::StreamServices;
use super::state::StreamContext;
use super::{ChannelIndex, StreamHandle};
use crate::constants::{
    DEFAULT_CONNECT_TIMEOUT_MS, DEFAULT_DISCONNECT_TIMEOUT_MS, MAX_CHANNELS, MAX_STREAMS,
};
use crate::{AvdtpError, BluetoothAddress};

/// Signaling channels known to the engine, by index
pub type ChannelTable = FnvIndexMap<ChannelIndex, BluetoothAddress, MAX_CHANNELS>;

/// Engine configuration
///
/// # Examples
///
/// ```rust
/// use avdtp_stream::StreamEngineOptions;
///
/// let options = StreamEngineOptions {
///     connect_timeout_ms: 4_000,
///     ..StreamEngineOptions::default()
/// };
/// assert_eq!(options.disconnect_timeout_ms, 10_000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StreamEngineOptions {
    /// How long both sides get to establish the transport channel
    pub connect_timeout_ms: u32,
    /// How long to wait for the peer to disconnect the transport channel
    /// after a close or abort was accepted
    pub disconnect_timeout_ms: u32,
}

impl Default for StreamEngineOptions {
    fn default() -> Self {
        Self {
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            disconnect_timeout_ms: DEFAULT_DISCONNECT_TIMEOUT_MS,
        }
    }
}

/// Pool of streams plus the signaling channel table
pub struct StreamEngine<'a> {
    streams: [Option<StreamControlBlock<'a>>; MAX_STREAMS],
    channels: ChannelTable,
    options: StreamEngineOptions,
}

impl Default for StreamEngine<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> StreamEngine<'a> {
    /// Create an engine with default options
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(StreamEngineOptions::default())
    }

    /// Create an engine with custom options
    #[must_use]
    pub fn with_options(options: StreamEngineOptions) -> Self {
        Self {
            streams: [const { None }; MAX_STREAMS],
            channels: ChannelTable::new(),
            options,
        }
    }

    /// Engine configuration
    #[must_use]
    pub const fn options(&self) -> &StreamEngineOptions {
        &self.options
    }

    /// Allocate a stream
    ///
    /// The handle is stable for the life of the stream and doubles as the
    /// local SEID.
    ///
    /// # Errors
    /// Returns [`AvdtpError::NoResources`] if every slot is taken
    pub fn create_stream(
        &mut self,
        registration: StreamRegistration<'a>,
    ) -> Result<StreamHandle, AvdtpError> {
        let (index, slot) = self
            .streams
            .iter_mut()
            .enumerate()
            .find(|(_, slot)| slot.is_none())
            .ok_or(AvdtpError::NoResources)?;
        let Ok(handle) = StreamHandle::try_from(index + 1) else {
            return Err(AvdtpError::NoResources);
        };
        *slot = Some(StreamControlBlock::new(handle, registration));
        debug!("[SCB] {} created", handle);
        Ok(handle)
    }

    /// Remove a stream
    ///
    /// An idle stream is freed at once. Otherwise the stream is torn down
    /// and its slot is freed when the transport channel reports closed.
    ///
    /// # Errors
    /// Returns [`AvdtpError::BadHandle`] if `handle` is unknown
    pub fn remove_stream<S: StreamServices + ?Sized>(
        &mut self,
        handle: StreamHandle,
        services: &mut S,
    ) -> Result<(), AvdtpError> {
        self.handle_event(handle, StreamEvent::Api(ApiRequest::Remove), services)
    }

    /// Register the peer behind a signaling channel
    ///
    /// # Errors
    /// Returns [`AvdtpError::ChannelTableFull`] if the table is full
    pub fn register_channel(
        &mut self,
        channel: ChannelIndex,
        peer: BluetoothAddress,
    ) -> Result<(), AvdtpError> {
        self.channels
            .insert(channel, peer)
            .map_err(|_| AvdtpError::ChannelTableFull)?;
        Ok(())
    }

    /// Forget a signaling channel
    ///
    /// # Errors
    /// Returns [`AvdtpError::UnknownChannel`] if the channel is not registered
    pub fn release_channel(
        &mut self,
        channel: ChannelIndex,
    ) -> Result<BluetoothAddress, AvdtpError> {
        self.channels
            .remove(&channel)
            .ok_or(AvdtpError::UnknownChannel)
    }

    /// Peer behind a signaling channel
    #[must_use]
    pub fn peer_address(&self, channel: ChannelIndex) -> Option<BluetoothAddress> {
        self.channels.get(&channel).copied()
    }

    /// Look up a stream
    #[must_use]
    pub fn stream(&self, handle: StreamHandle) -> Option<&StreamControlBlock<'a>> {
        let index = usize::from(handle).checked_sub(1)?;
        self.streams.get(index)?.as_ref()
    }

    /// Number of allocated streams
    #[must_use]
    pub fn stream_count(&self) -> usize {
        self.streams.iter().filter(|slot| slot.is_some()).count()
    }

    /// Handles of the streams bound to a signaling channel
    pub fn streams_on_channel(
        &self,
        channel: ChannelIndex,
    ) -> impl Iterator<Item = StreamHandle> + '_ {
        self.streams
            .iter()
            .flatten()
            .filter(move |scb| scb.channel == Some(channel))
            .map(|scb| scb.handle)
    }

    /// Run one event against a stream
    ///
    /// # Errors
    /// Returns [`AvdtpError::BadHandle`] if `handle` is unknown. Protocol
    /// problems are never errors here.
    pub fn handle_event<S: StreamServices + ?Sized>(
        &mut self,
        handle: StreamHandle,
        event: StreamEvent,
        services: &mut S,
    ) -> Result<(), AvdtpError> {
        let Self {
            streams,
            channels,
            options,
        } = self;
        let slot = usize::from(handle)
            .checked_sub(1)
            .and_then(|index| streams.get_mut(index))
            .ok_or(AvdtpError::BadHandle)?;
        let scb = slot.as_mut().ok_or(AvdtpError::BadHandle)?;

        StreamContext::new(scb, channels, services, options).dispatch(event);

        if scb.released {
            debug!("[SCB] {} freed", handle);
            *slot = None;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::avdtp::event::ControlEventKind;
    use crate::avdtp::testing::{
        CHANNEL, PEER, RecordingCallbacks, RecordingServices, command, media_closed,
        response, sbc_config, set_config_command,
    };
    use crate::avdtp::{ChannelType, SignalId, StreamPhase};

    #[test]
    fn test_pool_allocation() {
        let (config, callbacks) = (sbc_config(), RecordingCallbacks::new());
        let mut engine = StreamEngine::new();
        for expected in 1..=MAX_STREAMS {
            let handle = engine
                .create_stream(StreamRegistration::new(&config, &callbacks))
                .unwrap();
            assert_eq!(usize::from(handle), expected);
        }
        assert_eq!(
            engine.create_stream(StreamRegistration::new(&config, &callbacks)),
            Err(AvdtpError::NoResources)
        );
        assert_eq!(engine.stream_count(), MAX_STREAMS);
    }

    #[test]
    fn test_unknown_handle() {
        let mut engine = StreamEngine::new();
        let mut services = RecordingServices::new();
        assert_eq!(
            engine.handle_event(0, StreamEvent::SignalingClosed, &mut services),
            Err(AvdtpError::BadHandle)
        );
        assert_eq!(
            engine.handle_event(2, StreamEvent::SignalingClosed, &mut services),
            Err(AvdtpError::BadHandle)
        );
    }

    #[test]
    fn test_idle_remove_frees_slot() {
        let (config, callbacks) = (sbc_config(), RecordingCallbacks::new());
        let mut engine = StreamEngine::new();
        let mut services = RecordingServices::new();
        let handle = engine
            .create_stream(StreamRegistration::new(&config, &callbacks))
            .unwrap();

        engine.remove_stream(handle, &mut services).unwrap();
        assert!(engine.stream(handle).is_none());
        assert_eq!(
            engine.remove_stream(handle, &mut services),
            Err(AvdtpError::BadHandle)
        );
    }

    #[test]
    fn test_remove_deferred_until_transport_closed() {
        let (config, callbacks) = (sbc_config(), RecordingCallbacks::new());
        let mut engine = StreamEngine::new();
        let mut services = RecordingServices::new();
        engine.register_channel(CHANNEL, PEER).unwrap();
        let handle = engine
            .create_stream(StreamRegistration::new(&config, &callbacks))
            .unwrap();

        let events = [
            StreamEvent::Command(set_config_command(&config, 1)),
            StreamEvent::local_accept(SignalId::SetConfiguration, 1),
            StreamEvent::Command(command(SignalId::Open, 2)),
            StreamEvent::TransportOpened(ChannelType::Media),
        ];
        for event in events {
            engine.handle_event(handle, event, &mut services).unwrap();
        }
        assert_eq!(engine.stream(handle).unwrap().phase(), StreamPhase::Open);

        engine.remove_stream(handle, &mut services).unwrap();
        let scb = engine.stream(handle).unwrap();
        assert_eq!(scb.phase(), StreamPhase::Closing);
        assert!(scb.is_remove_pending());

        let rsp = StreamEvent::Response(response(SignalId::Close, 3));
        engine.handle_event(handle, rsp, &mut services).unwrap();
        assert!(engine.stream(handle).is_some());

        let closed = media_closed(0);
        engine.handle_event(handle, closed, &mut services).unwrap();
        assert!(engine.stream(handle).is_none());
        assert_eq!(callbacks.last().unwrap().kind, ControlEventKind::CloseCfm);

        let again = engine
            .create_stream(StreamRegistration::new(&config, &callbacks))
            .unwrap();
        assert_eq!(again, handle);
    }

    #[test]
    fn test_channel_table() {
        let mut engine = StreamEngine::new();
        for channel in 0..4 {
            engine.register_channel(channel, PEER).unwrap();
        }
        assert_eq!(
            engine.register_channel(9, PEER),
            Err(AvdtpError::ChannelTableFull)
        );
        assert_eq!(engine.peer_address(2), Some(PEER));
        assert_eq!(engine.release_channel(2), Ok(PEER));
        assert_eq!(engine.release_channel(2), Err(AvdtpError::UnknownChannel));
        assert_eq!(engine.peer_address(2), None);
    }

    #[test]
    fn test_streams_on_channel() {
        let (config, callbacks) = (sbc_config(), RecordingCallbacks::new());
        let mut engine = StreamEngine::new();
        let mut services = RecordingServices::new();
        engine.register_channel(CHANNEL, PEER).unwrap();
        let first = engine
            .create_stream(StreamRegistration::new(&config, &callbacks))
            .unwrap();
        let second = engine
            .create_stream(StreamRegistration::new(&config, &callbacks))
            .unwrap();

        let cmd = StreamEvent::Command(set_config_command(&config, 1));
        engine.handle_event(first, cmd, &mut services).unwrap();
        let bound: heapless::Vec<StreamHandle, 4> = engine.streams_on_channel(CHANNEL).collect();
        assert_eq!(bound.as_slice(), &[first]);
        assert_ne!(first, second);
        assert_eq!(callbacks.last().unwrap().peer, Some(PEER));
    }
}
