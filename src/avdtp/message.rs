//! Signaling messages exchanged with the signaling layer
//!
//! The engine never sees the wire form of a signaling message; the
//! signaling layer decodes inbound messages into [`SignalMessage`] and
//! encodes the ones the engine sends.

use super::config::StreamConfig;
use super::{ChannelIndex, SignalId, StreamEndpointId};
use crate::constants::MAX_SECURITY_DATA;
use heapless::Vec;

/// Common header of a signaling message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageHeader {
    /// Signaling channel the message travels on
    pub channel: ChannelIndex,
    /// Signal identifier
    pub signal: SignalId,
    /// Transaction label
    pub label: u8,
    /// Target SEID (ACP SEID for commands)
    pub seid: StreamEndpointId,
    /// Error code, zero for accepted messages
    pub err_code: u8,
    /// Error parameter (failing service category, for configuration errors)
    pub err_param: u8,
}

/// Signal specific payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageBody {
    /// No payload
    Empty,
    /// SetConfiguration, Reconfigure or GetConfiguration payload
    Config {
        /// SEID of the initiator
        int_seid: StreamEndpointId,
        /// Configuration carried by the message
        config: StreamConfig,
    },
    /// Security control payload
    Security(Vec<u8, MAX_SECURITY_DATA>),
    /// Delay report value in 1/10 milliseconds
    DelayReport(u16),
}

/// A decoded signaling message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalMessage {
    /// Message header
    pub header: MessageHeader,
    /// Message payload
    pub body: MessageBody,
}

impl SignalMessage {
    /// Create a message without payload
    #[must_use]
    pub const fn new(channel: ChannelIndex, signal: SignalId) -> Self {
        Self {
            header: MessageHeader {
                channel,
                signal,
                label: 0,
                seid: 0,
                err_code: 0,
                err_param: 0,
            },
            body: MessageBody::Empty,
        }
    }

    /// Set the target SEID
    #[must_use]
    pub const fn with_seid(mut self, seid: StreamEndpointId) -> Self {
        self.header.seid = seid;
        self
    }

    /// Set the transaction label
    #[must_use]
    pub const fn with_label(mut self, label: u8) -> Self {
        self.header.label = label;
        self
    }

    /// Mark the message as a failure with the given error code and parameter
    #[must_use]
    pub const fn with_error(mut self, err_code: u8, err_param: u8) -> Self {
        self.header.err_code = err_code;
        self.header.err_param = err_param;
        self
    }

    /// Attach a payload
    #[must_use]
    pub fn with_body(mut self, body: MessageBody) -> Self {
        self.body = body;
        self
    }

    /// Attach a configuration payload
    #[must_use]
    pub fn with_config(self, int_seid: StreamEndpointId, config: StreamConfig) -> Self {
        self.with_body(MessageBody::Config { int_seid, config })
    }

    /// Reply skeleton for this message: same channel, signal and label
    #[must_use]
    pub const fn reply(&self) -> Self {
        Self::new(self.header.channel, self.header.signal).with_label(self.header.label)
    }

    /// Whether the message reports success
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.header.err_code == 0
    }

    /// Configuration payload, if any
    #[must_use]
    pub const fn config(&self) -> Option<&StreamConfig> {
        match &self.body {
            MessageBody::Config { config, .. } => Some(config),
            _ => None,
        }
    }

    /// Initiator SEID of a configuration payload, if any
    #[must_use]
    pub const fn int_seid(&self) -> Option<StreamEndpointId> {
        match &self.body {
            MessageBody::Config { int_seid, .. } => Some(*int_seid),
            _ => None,
        }
    }

    /// Security payload, empty if none
    #[must_use]
    pub fn security_data(&self) -> &[u8] {
        match &self.body {
            MessageBody::Security(data) => data.as_slice(),
            _ => &[],
        }
    }

    /// Delay report value, if any
    #[must_use]
    pub const fn delay(&self) -> Option<u16> {
        match self.body {
            MessageBody::DelayReport(delay) => Some(delay),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_keeps_transaction() {
        let command = SignalMessage::new(2, SignalId::Reconfigure)
            .with_label(7)
            .with_seid(3)
            .with_config(1, StreamConfig::new());
        let reply = command.reply().with_error(0x29, 0x07);

        assert_eq!(reply.header.channel, 2);
        assert_eq!(reply.header.signal, SignalId::Reconfigure);
        assert_eq!(reply.header.label, 7);
        assert_eq!(reply.body, MessageBody::Empty);
        assert!(!reply.is_ok());
        assert!(command.is_ok());
        assert_eq!(command.int_seid(), Some(1));
    }

    #[test]
    fn test_payload_accessors() {
        let delay = SignalMessage::new(0, SignalId::DelayReport)
            .with_body(MessageBody::DelayReport(1500));
        assert_eq!(delay.delay(), Some(1500));
        assert!(delay.config().is_none());
        assert!(delay.security_data().is_empty());

        let mut data = Vec::new();
        data.extend_from_slice(&[0xAA, 0xBB]).unwrap();
        let security =
            SignalMessage::new(0, SignalId::Security).with_body(MessageBody::Security(data));
        assert_eq!(security.security_data(), &[0xAA, 0xBB]);
    }
}
