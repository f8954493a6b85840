//! Reporting channel packets
//!
//! Parses sender reports, receiver reports and CNAME source descriptions
//! received on the reporting transport channel.

use super::media::{be_u16, be_u32};
use super::result;
use crate::constants::{MAX_CNAME_SIZE, REPORT_HEADER_SIZE};
use heapless::Vec;

/// Report packet types
pub mod packet_type {
    /// Sender report
    pub const SENDER_REPORT: u8 = 200;
    /// Receiver report
    pub const RECEIVER_REPORT: u8 = 201;
    /// Source description
    pub const SOURCE_DESCRIPTION: u8 = 202;
}

/// Canonical name source description item
pub const SDES_CNAME: u8 = 1;

/// Report parsing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReportError {
    /// Packet ends before its body does
    Truncated,
    /// Source description item other than CNAME
    Busy,
    /// Unknown packet type
    BadParams,
}

impl ReportError {
    /// AVDTP API result code equivalent of this error
    #[must_use]
    pub const fn result_code(&self) -> u8 {
        match self {
            Self::Truncated | Self::BadParams => result::BAD_PARAMS,
            Self::Busy => result::BUSY,
        }
    }
}

impl core::fmt::Display for ReportError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Truncated => write!(f, "Report packet is truncated"),
            Self::Busy => write!(f, "Unsupported source description item"),
            Self::BadParams => write!(f, "Unknown report packet type"),
        }
    }
}

/// Sender report body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SenderReport {
    /// NTP timestamp, seconds
    pub ntp_sec: u32,
    /// NTP timestamp, fraction
    pub ntp_frac: u32,
    /// Media timestamp matching the NTP timestamp
    pub rtp_time: u32,
    /// Packets sent
    pub packet_count: u32,
    /// Payload octets sent
    pub octet_count: u32,
}

/// Receiver report body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiverReport {
    /// Fraction of packets lost since the previous report
    pub fraction_lost: u8,
    /// Cumulative number of packets lost (24 bits)
    pub packets_lost: u32,
    /// Extended highest sequence number received
    pub highest_seq: u32,
    /// Interarrival jitter
    pub jitter: u32,
    /// Last sender report timestamp
    pub last_sr: u32,
    /// Delay since last sender report
    pub delay_since_last_sr: u32,
}

/// Parsed report body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportBody {
    /// Sender report
    Sender(SenderReport),
    /// Receiver report
    Receiver(ReceiverReport),
    /// Canonical name
    CanonicalName(Vec<u8, MAX_CNAME_SIZE>),
}

/// Parsed report packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// Packet type octet
    pub packet_type: u8,
    /// Synchronization source the report is about
    pub ssrc: u32,
    /// Report body
    pub body: ReportBody,
}

/// Parse a report packet
///
/// # Errors
/// Returns a [`ReportError`] for truncated packets, unsupported source
/// description items and unknown packet types
pub fn parse_report(data: &[u8]) -> Result<Report, ReportError> {
    if data.len() < REPORT_HEADER_SIZE {
        return Err(ReportError::Truncated);
    }
    let packet_type = data[1];
    let ssrc = be_u32(data, 4).ok_or(ReportError::Truncated)?;
    let body = &data[REPORT_HEADER_SIZE..];
    let word = |index: usize| be_u32(body, index * 4).ok_or(ReportError::Truncated);

    let body = match packet_type {
        packet_type::SENDER_REPORT => ReportBody::Sender(SenderReport {
            ntp_sec: word(0)?,
            ntp_frac: word(1)?,
            rtp_time: word(2)?,
            packet_count: word(3)?,
            octet_count: word(4)?,
        }),
        packet_type::RECEIVER_REPORT => ReportBody::Receiver(ReceiverReport {
            fraction_lost: body.first().copied().ok_or(ReportError::Truncated)?,
            packets_lost: word(0)? & 0x00FF_FFFF,
            highest_seq: word(1)?,
            jitter: word(2)?,
            last_sr: word(3)?,
            delay_since_last_sr: word(4)?,
        }),
        packet_type::SOURCE_DESCRIPTION => parse_cname(body)?,
        _ => return Err(ReportError::BadParams),
    };

    Ok(Report {
        packet_type,
        ssrc,
        body,
    })
}

fn parse_cname(body: &[u8]) -> Result<ReportBody, ReportError> {
    let item = be_u16(body, 0).ok_or(ReportError::Truncated)?;
    let [item_type, length] = item.to_be_bytes();
    if item_type != SDES_CNAME {
        return Err(ReportError::Busy);
    }
    let name = body
        .get(2..2 + usize::from(length))
        .ok_or(ReportError::Truncated)?;
    Vec::from_slice(name)
        .map(ReportBody::CanonicalName)
        .map_err(|()| ReportError::Truncated)
}
