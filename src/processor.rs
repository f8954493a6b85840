//! Event Processor - runs stream events from a queue
//!
//! Signaling, transport, timers and the application all post their events
//! to one [`EventQueue`]. The processor takes them out in order and runs
//! each to completion against the [`StreamEngine`], so every stream sees
//! its events strictly in arrival order and no handler ever runs
//! concurrently with another.
//!
//! # Usage
//!
//! ```rust
//! use avdtp_stream::avdtp::{ChannelType, StreamEvent, StreamHandle, StreamServices};
//! use avdtp_stream::{AvdtpError, EventProcessor, EventQueue, StreamEngine};
//!
//! async fn drive<S: StreamServices>(services: S, handle: StreamHandle) -> Result<(), AvdtpError> {
//!     let queue = EventQueue::new();
//!     let mut processor = EventProcessor::new(StreamEngine::new(), services, &queue);
//!     // Collaborators post from their own callbacks
//!     processor.post(handle, StreamEvent::TransportOpened(ChannelType::Media))?;
//!     processor.process_next().await
//! }
//! ```
//!
//! The queue is not `Sync`; it lives on the protocol context next to the
//! processor and is handed to collaborators by reference.
//!
//! Callbacks invoked by the engine must not call back into it. They post
//! follow-up events (for example the local answer to a configuration
//! indication) to the queue instead.

use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::channel::Channel;

use crate::AvdtpError;
use crate::avdtp::engine::StreamEngine;
use crate::avdtp::{StreamEvent, StreamHandle, StreamServices};
use crate::constants::EVENT_QUEUE_DEPTH;

/// Event addressed to one stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedEvent {
    /// Target stream
    pub handle: StreamHandle,
    /// Event to run
    pub event: StreamEvent,
}

/// Inbound event queue; all producers live on the protocol context
pub type EventQueue = Channel<NoopRawMutex, QueuedEvent, EVENT_QUEUE_DEPTH>;

/// Queue an event without waiting
///
/// # Errors
/// Returns [`AvdtpError::QueueFull`] if the queue has no room
pub fn post(
    queue: &EventQueue,
    handle: StreamHandle,
    event: StreamEvent,
) -> Result<(), AvdtpError> {
    queue
        .try_send(QueuedEvent { handle, event })
        .map_err(|_| AvdtpError::QueueFull)
}

/// Drives a [`StreamEngine`] from an [`EventQueue`]
pub struct EventProcessor<'a, S: StreamServices> {
    engine: StreamEngine<'a>,
    services: S,
    queue: &'a EventQueue,
}

impl<'a, S: StreamServices> EventProcessor<'a, S> {
    /// Create a processor
    #[must_use]
    pub fn new(engine: StreamEngine<'a>, services: S, queue: &'a EventQueue) -> Self {
        Self {
            engine,
            services,
            queue,
        }
    }

    /// Queue an event without waiting
    ///
    /// # Errors
    /// Returns [`AvdtpError::QueueFull`] if the queue has no room
    pub fn post(&self, handle: StreamHandle, event: StreamEvent) -> Result<(), AvdtpError> {
        post(self.queue, handle, event)
    }

    /// Wait for the next event and run it
    ///
    /// # Errors
    /// Returns [`AvdtpError::BadHandle`] if the event targets an unknown stream
    pub async fn process_next(&mut self) -> Result<(), AvdtpError> {
        let QueuedEvent { handle, event } = self.queue.receive().await;
        self.engine.handle_event(handle, event, &mut self.services)
    }

    /// Run every queued event, including the ones posted while running
    ///
    /// Returns the number of events run. Events for unknown streams are
    /// logged and skipped.
    pub fn process_pending(&mut self) -> usize {
        let mut processed = 0;
        while let Ok(QueuedEvent { handle, event }) = self.queue.try_receive() {
            if let Err(err) = self.engine.handle_event(handle, event, &mut self.services) {
                warn!("[PROCESSOR] event for stream {} dropped: {}", handle, err);
            }
            processed += 1;
        }
        processed
    }

    /// Process events forever
    pub async fn run(&mut self) -> ! {
        loop {
            if let Err(err) = self.process_next().await {
                warn!("[PROCESSOR] event dropped: {}", err);
            }
            embassy_futures::yield_now().await;
        }
    }

    /// The engine
    #[must_use]
    pub const fn engine(&self) -> &StreamEngine<'a> {
        &self.engine
    }

    /// The engine, mutably (stream and channel registration)
    pub fn engine_mut(&mut self) -> &mut StreamEngine<'a> {
        &mut self.engine
    }

    /// The collaborators
    #[must_use]
    pub const fn services(&self) -> &S {
        &self.services
    }

    /// The collaborators, mutably
    pub fn services_mut(&mut self) -> &mut S {
        &mut self.services
    }
}
