use crate::{OrderId, Price};
use thiserror::Error;

/// Failure modes for [`crate::Book`] operations.
///
/// An error leaves the book exactly as it was before the call: any
/// matches already crossed before the failing step are real trades and
/// are never rolled back, but a rejected add never leaves a partial
/// resting order behind.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BookError {
    #[error("order id {id} exceeds configured maximum {max}")]
    OrderIdExhausted { id: OrderId, max: OrderId },

    #[error("side already has {levels} price levels resting (max {max}); cannot open a new level at {price}")]
    LevelCapacityExhausted {
        price: Price,
        levels: usize,
        max: usize,
    },

    #[error("price level {price} already holds {orders} resting orders (max {max})")]
    OrderCapacityExhausted {
        price: Price,
        orders: usize,
        max: usize,
    },

    #[error("book already holds {orders} resting orders (max {max})")]
    TotalCapacityExhausted { orders: usize, max: usize },

    #[error("unknown order id {id}")]
    UnknownOrder { id: OrderId },
}
