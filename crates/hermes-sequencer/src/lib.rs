//! Reorder stage: converts an out-of-order stream of sequence-numbered
//! frames into a gap-free, strictly monotonically increasing one.
//!
//! Grounded in the reference sequencer's gap-buffer algorithm: a bounded
//! window of size `W` (power of two) addressed by `seq mod W`, with
//! first-arrival-wins on slot collision. `run_once` does at most one pop
//! from the input per call, matching the original's single-step
//! `sequencer_run_once` so the caller (a pinned thread) controls its own
//! idle backoff.

use hermes_protocol::SequencedFrame;
use hermes_ring::Ring;

/// Outcome of one [`Sequencer::run_once`] step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cycle {
    /// The input ring had nothing to pop.
    Idle,
    /// A message was popped and dispatched (published, buffered, or
    /// dropped per policy).
    Worked,
}

/// Counters for the sequencer's silent-drop paths (§7 "Sequencer window
/// exceeded... counter incremented"). Plain `u64` — the sequencer runs on
/// a single pinned thread, with no concurrent access to its own state.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SequencerCounters {
    /// `s < next_expected - 1`: arrived well after its slot was already
    /// consumed.
    pub dropped_late: u64,
    /// `s == next_expected - 1`: a repeat of the most recently published
    /// sequence number.
    pub dropped_duplicate: u64,
    /// `s > next_expected` but its window slot was already occupied by
    /// another buffered message (first-arrival-wins).
    pub dropped_overflow: u64,
}

/// Gap-buffering reorder stage.
pub struct Sequencer<M> {
    next_expected: u64,
    window: Vec<Option<M>>,
    window_mask: u64,
    counters: SequencerCounters,
}

impl<M: Copy + SequencedFrame> Sequencer<M> {
    /// Creates a sequencer with reorder window `window_size` (must be a
    /// power of two) and session start sequence 1.
    ///
    /// # Panics
    /// Panics if `window_size` is zero or not a power of two.
    #[must_use]
    pub fn new(window_size: usize) -> Self {
        assert!(
            window_size > 0 && window_size.is_power_of_two(),
            "sequencer window size must be a power of two"
        );
        Self {
            next_expected: 1,
            window: vec![None; window_size],
            window_mask: window_size as u64 - 1,
            counters: SequencerCounters::default(),
        }
    }

    #[inline]
    #[must_use]
    pub fn next_expected(&self) -> u64 {
        self.next_expected
    }

    #[inline]
    #[must_use]
    pub fn counters(&self) -> SequencerCounters {
        self.counters
    }

    /// Runs one step: pop at most one message from `input` and dispatch it
    /// per the gap-buffer rules, publishing any now-contiguous run of
    /// previously buffered messages to `output`.
    ///
    /// Never drops a message that is ready to publish — if `output` is
    /// momentarily full, this blocks (with adaptive backoff) until the
    /// publish succeeds, rather than advancing `next_expected` without it.
    pub fn run_once(&mut self, input: &Ring<M>, output: &Ring<M>) -> Cycle {
        let Some(msg) = input.pop() else {
            return Cycle::Idle;
        };

        let s = msg.sequence();

        if s == self.next_expected {
            self.publish(msg, output);
            self.drain_contiguous_run(output);
        } else if s > self.next_expected {
            let slot = (s & self.window_mask) as usize;
            if self.window[slot].is_none() {
                self.window[slot] = Some(msg);
            } else {
                self.counters.dropped_overflow += 1;
            }
        } else if s + 1 == self.next_expected {
            self.counters.dropped_duplicate += 1;
        } else {
            self.counters.dropped_late += 1;
        }

        Cycle::Worked
    }

    fn publish(&mut self, msg: M, output: &Ring<M>) {
        output.push_blocking(msg);
        self.next_expected += 1;
    }

    fn drain_contiguous_run(&mut self, output: &Ring<M>) {
        loop {
            let slot = (self.next_expected & self.window_mask) as usize;
            match self.window[slot].take() {
                Some(buffered) => self.publish(buffered, output),
                None => break,
            }
        }
    }
}
