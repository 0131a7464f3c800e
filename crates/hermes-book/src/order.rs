use crate::{OrderId, Price, Qty};
use hermes_arena::ArenaIndex;
use hermes_protocol::Side;
use std::collections::VecDeque;

/// A resting (or in-flight) order. Lives in the book's arena; every
/// other structure that references it (the order-id index, a price
/// level's FIFO queue) holds an [`ArenaIndex`] rather than a pointer.
#[derive(Debug, Clone, Copy)]
pub struct Order {
    pub id: OrderId,
    pub side: Side,
    pub price: Price,
    pub remaining: Qty,
}

/// All resting orders at a single price, in strict arrival order.
///
/// `total_quantity` is a running sum kept in step with `orders` so the
/// book never has to walk the queue to answer "how much is resting
/// here" (the aggregate-consistency invariant).
#[derive(Debug, Default)]
pub struct PriceLevel {
    pub total_quantity: Qty,
    pub(crate) orders: VecDeque<ArenaIndex>,
}

impl PriceLevel {
    #[must_use]
    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}
