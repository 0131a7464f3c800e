use crate::OrderId;

/// Resource limits and fee parameters for a [`crate::Book`].
///
/// Mirrors the reference engine's compile-time constants
/// (`MAX_PRICE_LEVELS`, `MAX_ORDERS_PER_LEVEL`, `MAX_TOTAL_ORDERS`,
/// `TRANSACTION_FEE_BPS`, listing fee) as run-time configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookConfig {
    /// Maximum number of distinct resting price levels per side.
    pub max_levels_per_side: usize,
    /// Maximum number of resting orders queued at a single price level.
    pub max_orders_per_level: usize,
    /// Largest order id the book will accept.
    pub max_order_id: OrderId,
    /// Total number of resting orders the book's arena can hold at once,
    /// across both sides.
    pub max_resting_orders: usize,
    /// Flat fee charged on every accepted order, in price ticks
    /// (1/10,000 of the display currency unit).
    pub listing_fee_ticks: u64,
    /// Transaction fee rate in basis points, applied to each trade's
    /// notional (`qty * price_ticks`).
    pub fee_bps: u64,
}

impl Default for BookConfig {
    fn default() -> Self {
        Self {
            max_levels_per_side: 1024,
            max_orders_per_level: 2048,
            max_order_id: 1_000_000,
            max_resting_orders: 1_000_000,
            listing_fee_ticks: 100, // $0.0100
            fee_bps: 100,           // 1%
        }
    }
}
