use crate::feed::FeedSource;
use hermes_book::Book;
use hermes_protocol::{Frame, ProtocolError, RingItem};
use hermes_ring::{Backoff, Ring};
use hermes_sequencer::{Cycle, Sequencer};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Ingress stage: pulls frames off `feed` and publishes them to `output`
/// unsequenced. Has no idle backoff of its own — blocking happens
/// inside the feed source; a `None` just means "check `running` and try
/// again".
pub fn run_ingress(running: &AtomicBool, mut feed: Box<dyn FeedSource>, output: &Ring<RingItem>, idle_sleep: Duration) {
    while running.load(Ordering::Acquire) {
        match feed.recv_frame() {
            Some(item) => {
                if !output.push_blocking(item) {
                    tracing::warn!("ingress output ring closed, stopping");
                    break;
                }
            }
            None => std::thread::sleep(idle_sleep),
        }
    }
    tracing::info!("ingress stage stopped");
}

/// Sequencer stage: gap-buffers `input` into a strictly monotonic
/// stream on `output`.
pub fn run_sequencer(running: &AtomicBool, input: &Ring<RingItem>, output: &Ring<RingItem>, window_size: usize) {
    let mut sequencer = Sequencer::<RingItem>::new(window_size);
    let mut backoff = Backoff::new();

    while running.load(Ordering::Acquire) {
        match sequencer.run_once(input, output) {
            Cycle::Worked => backoff.reset(),
            Cycle::Idle => backoff.snooze(),
        }
    }

    let counters = sequencer.counters();
    tracing::info!(
        dropped_late = counters.dropped_late,
        dropped_duplicate = counters.dropped_duplicate,
        dropped_overflow = counters.dropped_overflow,
        "sequencer stage stopped"
    );
}

/// Matcher stage: decodes each sequenced frame and applies it to the
/// order book, publishing every resulting event to `log_output`.
pub fn run_matcher(running: &AtomicBool, input: &Ring<RingItem>, log_output: &Ring<hermes_book::Event>, mut book: Book) {
    let mut backoff = Backoff::new();

    while running.load(Ordering::Acquire) {
        let Some(item) = input.pop() else {
            backoff.snooze();
            continue;
        };
        backoff.reset();

        match hermes_protocol::decode(item.as_bytes()) {
            Ok(frame) => apply_frame(&mut book, &frame, log_output),
            Err(ProtocolError::TooShort { expected, actual, .. }) => {
                tracing::warn!(expected, actual, "dropped undersized frame");
            }
            Err(ProtocolError::InvalidSide(byte)) => {
                tracing::warn!(side_byte = byte, "dropped frame with invalid side byte");
            }
        }
    }
    tracing::info!(resting_orders = book.resting_order_count(), "matcher stage stopped");
}

fn apply_frame(book: &mut Book, frame: &Frame, log_output: &Ring<hermes_book::Event>) {
    let result = match frame {
        Frame::Add(add) => book
            .add(add.order_ref, add.side, u64::from(add.price_ticks), u64::from(add.shares))
            .map(|events| publish_events(log_output, events)),
        Frame::Cancel(cancel) => book.cancel(cancel.order_ref),
        Frame::Executed(exec) => book.execute(exec.order_ref, u64::from(exec.executed_shares)),
        Frame::Unknown { message_type, .. } => {
            tracing::debug!(message_type, "ignoring unknown message type");
            Ok(())
        }
    };

    if let Err(err) = result {
        tracing::warn!(error = %err, "book operation rejected");
    }
}

fn publish_events(log_output: &Ring<hermes_book::Event>, events: Vec<hermes_book::Event>) {
    for event in events {
        if !log_output.push_blocking(event) {
            tracing::warn!("log ring closed, dropping trailing events");
            break;
        }
    }
}
