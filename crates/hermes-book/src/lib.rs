//! Price-level-indexed limit order book: price-time priority matching,
//! O(1) cancellation, integer fixed-point fee accounting.
//!
//! Orders rest in a bump [`hermes_arena::Arena`]; price levels and the
//! order-id index hold [`hermes_arena::ArenaIndex`] handles into it
//! rather than pointers, so cancelling or matching never touches the
//! allocator's free-list machinery the arena deliberately doesn't have.
//!
//! ```
//! use hermes_book::{Book, BookConfig};
//! use hermes_protocol::Side;
//!
//! let mut book = Book::new(BookConfig::default());
//! book.add(1, Side::Buy, 9_900, 20).unwrap();
//! assert_eq!(book.best_bid(), Some(9_900));
//! ```

mod book;
mod config;
mod error;
mod event;
mod fee;
mod order;

pub use book::Book;
pub use config::BookConfig;
pub use error::BookError;
pub use event::Event;
pub use fee::Fee;
pub use order::{Order, PriceLevel};

/// Order identifier, as assigned by the upstream feed.
pub type OrderId = u64;
/// Price in ticks (1/10,000 of the display currency unit).
pub type Price = u64;
/// Share quantity.
pub type Qty = u64;

#[cfg(test)]
mod tests {
    use super::*;
    use hermes_protocol::Side;

    fn book() -> Book {
        Book::new(BookConfig::default())
    }

    #[test]
    fn rest_then_trade() {
        // Scenario 1: two resting orders straddling the touch, then a
        // buy that rests inside the spread without crossing.
        let mut b = book();
        let e1 = b.add(1, Side::Buy, 9_900, 20).unwrap();
        assert!(matches!(e1.as_slice(), [Event::Listing { order_id: 1, .. }]));

        let e2 = b.add(2, Side::Sell, 10_100, 15).unwrap();
        assert!(matches!(e2.as_slice(), [Event::Listing { order_id: 2, .. }]));

        let e3 = b.add(3, Side::Buy, 10_000, 5).unwrap();
        assert!(matches!(e3.as_slice(), [Event::Listing { order_id: 3, .. }]));

        assert_eq!(b.best_bid(), Some(10_000));
        assert_eq!(b.best_ask(), Some(10_100));
        assert_eq!(b.resting_order_count(), 3);
    }

    #[test]
    fn aggressive_sweep_clears_resting_orders_price_time_priority() {
        // Scenario 2, continuing from scenario 1: a sell aggressive
        // enough to sweep both bids, best price (10_000, order 3) first.
        let mut b = book();
        b.add(1, Side::Buy, 9_900, 20).unwrap();
        b.add(2, Side::Sell, 10_100, 15).unwrap();
        b.add(3, Side::Buy, 10_000, 5).unwrap();

        let events = b.add(4, Side::Sell, 9_900, 25).unwrap();

        assert_eq!(
            events,
            vec![
                Event::Trade {
                    aggressor_id: 4,
                    resting_id: 3,
                    price: 10_000,
                    qty: 5,
                    fee: Fee::for_trade(5, 10_000, 100),
                },
                Event::Trade {
                    aggressor_id: 4,
                    resting_id: 1,
                    price: 9_900,
                    qty: 20,
                    fee: Fee::for_trade(20, 9_900, 100),
                },
            ]
        );
        assert_eq!(b.best_bid(), None);
        assert_eq!(b.best_ask(), Some(10_100));
        assert_eq!(b.resting_order_count(), 1);
    }

    #[test]
    fn partial_fill_leaves_remainder_resting() {
        // Scenario 3: an aggressor too small to fully consume the best
        // level leaves the resting order's remaining quantity reduced,
        // still at the front of its level.
        let mut b = book();
        b.add(1, Side::Sell, 10_000, 30).unwrap();

        let events = b.add(2, Side::Buy, 10_000, 12).unwrap();
        assert_eq!(
            events,
            vec![Event::Trade {
                aggressor_id: 2,
                resting_id: 1,
                price: 10_000,
                qty: 12,
                fee: Fee::for_trade(12, 10_000, 100),
            }]
        );
        assert_eq!(b.best_ask(), Some(10_000));
        assert_eq!(b.resting_order_count(), 1);
    }

    #[test]
    fn cancel_preserves_fifo_order_of_remaining_resting_orders() {
        // Scenario 4: cancelling a middle order doesn't disturb the
        // arrival order of the orders still resting at that level.
        let mut b = book();
        b.add(1, Side::Buy, 10_000, 10).unwrap();
        b.add(2, Side::Buy, 10_000, 10).unwrap();
        b.add(3, Side::Buy, 10_000, 10).unwrap();

        b.cancel(2).unwrap();
        assert_eq!(b.resting_order_count(), 2);

        // Order 1 still has priority over order 3 at this level.
        let events = b.add(4, Side::Sell, 10_000, 10).unwrap();
        assert_eq!(
            events,
            vec![Event::Trade {
                aggressor_id: 4,
                resting_id: 1,
                price: 10_000,
                qty: 10,
                fee: Fee::for_trade(10, 10_000, 100),
            }]
        );
    }

    #[test]
    fn cancel_unknown_order_is_an_error() {
        let mut b = book();
        assert_eq!(b.cancel(999), Err(BookError::UnknownOrder { id: 999 }));
    }

    #[test]
    fn execute_reduces_and_eventually_removes_resting_order() {
        let mut b = book();
        b.add(1, Side::Buy, 10_000, 10).unwrap();

        b.execute(1, 4).unwrap();
        assert_eq!(b.resting_order_count(), 1);

        b.execute(1, 6).unwrap();
        assert_eq!(b.resting_order_count(), 0);
        assert_eq!(b.best_bid(), None);
    }

    #[test]
    fn execute_past_remaining_quantity_only_decrements_by_remaining() {
        // §4.3 "decrement ... by min(qty, order.remaining)": an execution
        // report larger than what's left on the order must not drive the
        // level's aggregate quantity negative (it would wrap on an
        // unsigned counter instead of going to zero).
        let mut b = book();
        b.add(1, Side::Buy, 10_000, 5).unwrap();
        b.add(2, Side::Buy, 10_000, 7).unwrap();

        b.execute(1, 100).unwrap();

        assert_eq!(b.resting_order_count(), 1);
        assert_eq!(b.best_bid(), Some(10_000));

        // The level's aggregate must reflect only order 2's remaining
        // quantity, not an underflowed subtraction of the full 100.
        let events = b.add(3, Side::Sell, 10_000, 7).unwrap();
        assert_eq!(
            events,
            vec![Event::Trade {
                aggressor_id: 3,
                resting_id: 2,
                price: 10_000,
                qty: 7,
                fee: Fee::for_trade(7, 10_000, 100),
            }]
        );
    }

    #[test]
    fn order_id_beyond_configured_maximum_is_rejected() {
        let mut b = Book::new(BookConfig {
            max_order_id: 10,
            ..BookConfig::default()
        });
        assert_eq!(
            b.add(11, Side::Buy, 10_000, 1),
            Err(BookError::OrderIdExhausted { id: 11, max: 10 })
        );
    }

    #[test]
    fn new_level_beyond_configured_maximum_is_rejected() {
        let mut b = Book::new(BookConfig {
            max_levels_per_side: 1,
            ..BookConfig::default()
        });
        b.add(1, Side::Buy, 10_000, 1).unwrap();
        let err = b.add(2, Side::Buy, 9_000, 1).unwrap_err();
        assert!(matches!(err, BookError::LevelCapacityExhausted { .. }));
        // The book is unchanged by the rejected add.
        assert_eq!(b.resting_order_count(), 1);
    }

    #[test]
    fn orders_beyond_per_level_maximum_are_rejected() {
        let mut b = Book::new(BookConfig {
            max_orders_per_level: 1,
            ..BookConfig::default()
        });
        b.add(1, Side::Buy, 10_000, 1).unwrap();
        let err = b.add(2, Side::Buy, 10_000, 1).unwrap_err();
        assert!(matches!(err, BookError::OrderCapacityExhausted { .. }));
    }
}
