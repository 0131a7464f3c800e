use crate::{Fee, OrderId, Price, Qty};
use hermes_protocol::Side;

/// Observable outcomes of a [`crate::Book::add`] call, in the order they
/// occurred: zero or more trades (in match order), then a listing event
/// if any residual quantity came to rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// An incoming order matched a resting one.
    Trade {
        aggressor_id: OrderId,
        resting_id: OrderId,
        price: Price,
        qty: Qty,
        fee: Fee,
    },
    /// Residual quantity from an incoming order came to rest on the book.
    Listing {
        order_id: OrderId,
        side: Side,
        qty: Qty,
        fee: Fee,
    },
}
