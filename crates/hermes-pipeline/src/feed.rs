use hermes_protocol::RingItem;

/// Source of raw wire frames for the ingress stage.
///
/// The live implementation (a multicast UDP socket reader) is out of
/// scope for this crate (see Non-goals on wire plumbing) — ingress
/// depends on this trait instead of a concrete socket type so the rest
/// of the pipeline can be exercised without one.
pub trait FeedSource: Send {
    /// Blocks (briefly) for the next frame. Returns `None` on a timeout
    /// or end-of-feed, which the ingress loop treats as "nothing to do
    /// this tick" and re-checks the running flag.
    fn recv_frame(&mut self) -> Option<RingItem>;
}

/// A feed with nothing to read. Useful for exercising the rest of the
/// pipeline (sequencer, matcher, logger) without any input.
pub struct NullFeedSource;

impl FeedSource for NullFeedSource {
    fn recv_frame(&mut self) -> Option<RingItem> {
        None
    }
}

/// Feeds pre-decoded frames from an in-process channel, standing in for
/// a live socket in tests and demos.
pub struct ChannelFeedSource {
    rx: std::sync::mpsc::Receiver<RingItem>,
}

impl ChannelFeedSource {
    #[must_use]
    pub fn new(rx: std::sync::mpsc::Receiver<RingItem>) -> Self {
        Self { rx }
    }
}

impl FeedSource for ChannelFeedSource {
    fn recv_frame(&mut self) -> Option<RingItem> {
        self.rx.try_recv().ok()
    }
}
