use crate::ring_item::SequencedFrame;
use thiserror::Error;

const HEADER_LEN: usize = 8 + 1; // 64-bit sequence + 8-bit message type
const ADD_BODY_LEN: usize = 2 + 2 + 8 + 8 + 1 + 4 + 8 + 4; // 37
const EXECUTED_BODY_LEN: usize = 2 + 2 + 8 + 8 + 4 + 8; // 32
const CANCEL_BODY_LEN: usize = 2 + 2 + 8 + 8 + 4; // 24

const MSG_TYPE_ADD: u8 = b'A';
const MSG_TYPE_EXECUTED: u8 = b'E';
const MSG_TYPE_CANCEL: u8 = b'X';

/// Errors decoding a frame from wire bytes.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolError {
    /// The buffer was shorter than the header, or shorter than the
    /// minimum size for its declared message type.
    #[error("frame for message type {message_type:?} too short: expected at least {expected} bytes, got {actual}")]
    TooShort {
        message_type: Option<u8>,
        expected: usize,
        actual: usize,
    },
    /// The side byte was neither `'B'` nor `'S'`.
    #[error("invalid side byte: {0:#04x}")]
    InvalidSide(u8),
}

/// Buy or sell, decoded from the wire's single side byte (`'B'`/`'S'`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    fn from_byte(b: u8) -> Result<Self, ProtocolError> {
        match b {
            b'B' => Ok(Self::Buy),
            b'S' => Ok(Self::Sell),
            other => Err(ProtocolError::InvalidSide(other)),
        }
    }

    #[must_use]
    pub fn as_byte(self) -> u8 {
        match self {
            Self::Buy => b'B',
            Self::Sell => b'S',
        }
    }
}

/// Decoded `'A'` (Add Order) message.
#[derive(Debug, Clone, Copy)]
pub struct AddFrame {
    pub sequence: u64,
    pub stock_locate: u16,
    pub tracking_number: u16,
    pub timestamp: u64,
    pub order_ref: u64,
    pub side: Side,
    pub shares: u32,
    pub stock: [u8; 8],
    /// Scaled price, 1/10,000 units. The decoder does not interpret the
    /// scale — it is the book's job to treat this as ticks.
    pub price_ticks: u32,
}

/// Decoded `'E'` (Order Executed) message.
#[derive(Debug, Clone, Copy)]
pub struct ExecutedFrame {
    pub sequence: u64,
    pub stock_locate: u16,
    pub tracking_number: u16,
    pub timestamp: u64,
    pub order_ref: u64,
    pub executed_shares: u32,
    pub match_number: u64,
}

/// Decoded `'X'` (Order Cancel) message.
#[derive(Debug, Clone, Copy)]
pub struct CancelFrame {
    pub sequence: u64,
    pub stock_locate: u16,
    pub tracking_number: u16,
    pub timestamp: u64,
    pub order_ref: u64,
    pub cancelled_shares: u32,
}

/// A decoded frame. Unknown message types are kept (not an error) — the
/// matcher treats them as no-ops per the feed's forward-compatibility
/// convention.
#[derive(Debug, Clone, Copy)]
pub enum Frame {
    Add(AddFrame),
    Executed(ExecutedFrame),
    Cancel(CancelFrame),
    Unknown { sequence: u64, message_type: u8 },
}

impl SequencedFrame for Frame {
    fn sequence(&self) -> u64 {
        match self {
            Frame::Add(f) => f.sequence,
            Frame::Executed(f) => f.sequence,
            Frame::Cancel(f) => f.sequence,
            Frame::Unknown { sequence, .. } => *sequence,
        }
    }
}

/// Decodes one frame from network byte order.
///
/// # Errors
/// Returns [`ProtocolError::TooShort`] if `bytes` doesn't hold a full
/// header, or a full body for its declared message type (§6's "Items
/// smaller than their type's minimum size are discarded"). Returns
/// [`ProtocolError::InvalidSide`] if an Add frame's side byte is neither
/// `'B'` nor `'S'`.
pub fn decode(bytes: &[u8]) -> Result<Frame, ProtocolError> {
    if bytes.len() < HEADER_LEN {
        return Err(ProtocolError::TooShort {
            message_type: None,
            expected: HEADER_LEN,
            actual: bytes.len(),
        });
    }

    let sequence = u64::from_be_bytes(bytes[0..8].try_into().unwrap());
    let message_type = bytes[8];
    let body = &bytes[HEADER_LEN..];

    match message_type {
        MSG_TYPE_ADD => decode_add(sequence, body),
        MSG_TYPE_EXECUTED => decode_executed(sequence, body),
        MSG_TYPE_CANCEL => decode_cancel(sequence, body),
        other => Ok(Frame::Unknown {
            sequence,
            message_type: other,
        }),
    }
}

fn require_len(message_type: u8, body: &[u8], expected: usize) -> Result<(), ProtocolError> {
    if body.len() < expected {
        return Err(ProtocolError::TooShort {
            message_type: Some(message_type),
            expected: HEADER_LEN + expected,
            actual: HEADER_LEN + body.len(),
        });
    }
    Ok(())
}

fn decode_add(sequence: u64, body: &[u8]) -> Result<Frame, ProtocolError> {
    require_len(MSG_TYPE_ADD, body, ADD_BODY_LEN)?;

    let stock_locate = u16::from_be_bytes(body[0..2].try_into().unwrap());
    let tracking_number = u16::from_be_bytes(body[2..4].try_into().unwrap());
    let timestamp = u64::from_be_bytes(body[4..12].try_into().unwrap());
    let order_ref = u64::from_be_bytes(body[12..20].try_into().unwrap());
    let side = Side::from_byte(body[20])?;
    let shares = u32::from_be_bytes(body[21..25].try_into().unwrap());
    let stock: [u8; 8] = body[25..33].try_into().unwrap();
    let price_ticks = u32::from_be_bytes(body[33..37].try_into().unwrap());

    Ok(Frame::Add(AddFrame {
        sequence,
        stock_locate,
        tracking_number,
        timestamp,
        order_ref,
        side,
        shares,
        stock,
        price_ticks,
    }))
}

fn decode_executed(sequence: u64, body: &[u8]) -> Result<Frame, ProtocolError> {
    require_len(MSG_TYPE_EXECUTED, body, EXECUTED_BODY_LEN)?;

    let stock_locate = u16::from_be_bytes(body[0..2].try_into().unwrap());
    let tracking_number = u16::from_be_bytes(body[2..4].try_into().unwrap());
    let timestamp = u64::from_be_bytes(body[4..12].try_into().unwrap());
    let order_ref = u64::from_be_bytes(body[12..20].try_into().unwrap());
    let executed_shares = u32::from_be_bytes(body[20..24].try_into().unwrap());
    let match_number = u64::from_be_bytes(body[24..32].try_into().unwrap());

    Ok(Frame::Executed(ExecutedFrame {
        sequence,
        stock_locate,
        tracking_number,
        timestamp,
        order_ref,
        executed_shares,
        match_number,
    }))
}

fn decode_cancel(sequence: u64, body: &[u8]) -> Result<Frame, ProtocolError> {
    require_len(MSG_TYPE_CANCEL, body, CANCEL_BODY_LEN)?;

    let stock_locate = u16::from_be_bytes(body[0..2].try_into().unwrap());
    let tracking_number = u16::from_be_bytes(body[2..4].try_into().unwrap());
    let timestamp = u64::from_be_bytes(body[4..12].try_into().unwrap());
    let order_ref = u64::from_be_bytes(body[12..20].try_into().unwrap());
    let cancelled_shares = u32::from_be_bytes(body[20..24].try_into().unwrap());

    Ok(Frame::Cancel(CancelFrame {
        sequence,
        stock_locate,
        tracking_number,
        timestamp,
        order_ref,
        cancelled_shares,
    }))
}
