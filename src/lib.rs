#![no_std]
#![doc = include_str!("../README.md")]
#![warn(missing_docs)]
#![allow(clippy::too_many_lines)]

#[macro_use]
mod fmt;

mod address;
pub mod avdtp;
pub mod constants;
pub mod processor;

pub use address::BluetoothAddress;
pub use avdtp::engine::{StreamEngine, StreamEngineOptions};
pub use processor::{EventProcessor, EventQueue, QueuedEvent};

/// Errors returned by the stream engine API
///
/// Protocol handling itself never fails: malformed or mistimed input is
/// answered with a reject on the wire, a synthetic control event, or a
/// dropped packet. These errors only cover misuse of the local API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AvdtpError {
    /// Stream handle does not refer to an allocated stream
    BadHandle,
    /// Stream pool is exhausted
    NoResources,
    /// Signaling channel table is full
    ChannelTableFull,
    /// Signaling channel index is not registered
    UnknownChannel,
    /// Inbound event queue is full
    QueueFull,
    /// Invalid parameter provided (e.g., oversized codec information)
    InvalidParameter,
}

impl core::fmt::Display for AvdtpError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::BadHandle => write!(f, "Unknown stream handle"),
            Self::NoResources => write!(f, "No free stream control block"),
            Self::ChannelTableFull => write!(f, "Signaling channel table is full"),
            Self::UnknownChannel => write!(f, "Unknown signaling channel"),
            Self::QueueFull => write!(f, "Event queue is full"),
            Self::InvalidParameter => write!(f, "Invalid parameter"),
        }
    }
}

impl AvdtpError {
    /// AVDTP API result code equivalent of this error
    #[must_use]
    pub const fn result_code(&self) -> u8 {
        match self {
            Self::BadHandle | Self::UnknownChannel => avdtp::result::BAD_HANDLE,
            Self::NoResources | Self::ChannelTableFull | Self::QueueFull => {
                avdtp::result::NO_RESOURCES
            }
            Self::InvalidParameter => avdtp::result::BAD_PARAMS,
        }
    }
}
