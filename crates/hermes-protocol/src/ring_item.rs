/// Maximum payload a [`RingItem`] can carry.
pub const RING_ITEM_CAPACITY: usize = 2048;

/// Fixed-size envelope carried by the R1/R2 rings between the ingress,
/// sequencer, and matcher stages.
///
/// The ring itself is payload-agnostic (see `hermes_ring::Ring`) — this is
/// the layout producer and consumer agree on: a fixed-capacity byte buffer
/// plus the number of bytes actually used.
#[derive(Clone, Copy)]
pub struct RingItem {
    data: [u8; RING_ITEM_CAPACITY],
    len: usize,
}

impl RingItem {
    /// Builds a `RingItem` from a frame's encoded bytes.
    ///
    /// # Panics
    /// Panics if `bytes` is longer than [`RING_ITEM_CAPACITY`] — producers
    /// are expected to only ever encode frames that fit.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        assert!(
            bytes.len() <= RING_ITEM_CAPACITY,
            "frame exceeds ring item capacity"
        );
        let mut data = [0u8; RING_ITEM_CAPACITY];
        data[..bytes.len()].copy_from_slice(bytes);
        Self {
            data,
            len: bytes.len(),
        }
    }

    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..self.len]
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Default for RingItem {
    fn default() -> Self {
        Self {
            data: [0u8; RING_ITEM_CAPACITY],
            len: 0,
        }
    }
}

/// Anything carrying a 64-bit sequence number in its header — the
/// sequencer only needs this much to do its job, without decoding the
/// rest of the frame.
pub trait SequencedFrame {
    fn sequence(&self) -> u64;
}

impl SequencedFrame for RingItem {
    /// Reads the header's 8-byte big-endian sequence number without
    /// decoding the rest of the frame.
    ///
    /// # Panics
    /// Panics if fewer than 8 bytes are present — producers never enqueue
    /// a `RingItem` shorter than a bare header.
    fn sequence(&self) -> u64 {
        let bytes: [u8; 8] = self.data[..8].try_into().expect("header present");
        u64::from_be_bytes(bytes)
    }
}
