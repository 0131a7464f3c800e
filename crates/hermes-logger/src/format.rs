use hermes_book::Event;
use time::{format_description::FormatItem, macros::format_description, OffsetDateTime};

const TIMESTAMP_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// Renders one book event as a single log line, timestamped at the
/// moment it was drained off the ring (not when it originally occurred
/// on the book, since the logger stage is downstream and asynchronous).
#[must_use]
pub fn format_event(at: OffsetDateTime, event: &Event) -> String {
    let ts = at
        .format(TIMESTAMP_FORMAT)
        .unwrap_or_else(|_| at.unix_timestamp().to_string());

    match event {
        Event::Listing { order_id, side, fee, .. } => {
            format!("[{ts}] LISTING: OrderID={order_id}, Side={}, Fee={fee}", side.as_byte() as char)
        }
        Event::Trade {
            aggressor_id,
            resting_id,
            price,
            qty,
            fee,
        } => {
            format!("[{ts}] TRADE:   AggressorID={aggressor_id} matched RestingID={resting_id} for {qty} @ {price}. Fee={fee}")
        }
    }
}
