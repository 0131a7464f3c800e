use crate::{BookConfig, BookError, Event, Fee, Order, OrderId, Price, PriceLevel, Qty};
use hermes_arena::Arena;
use hermes_protocol::Side;
use std::collections::{BTreeMap, HashMap};

/// Price-level-indexed limit order book with strict price-time priority.
///
/// Orders live in a bump arena; every index structure (the per-side
/// price maps, the order-id lookup) holds an [`hermes_arena::ArenaIndex`]
/// rather than a pointer, so the book has no lifetime parameter and no
/// unsafe code of its own.
pub struct Book {
    bids: BTreeMap<Price, PriceLevel>,
    asks: BTreeMap<Price, PriceLevel>,
    index: HashMap<OrderId, hermes_arena::ArenaIndex>,
    arena: Arena<Order>,
    config: BookConfig,
}

impl Book {
    #[must_use]
    pub fn new(config: BookConfig) -> Self {
        Self {
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            index: HashMap::new(),
            arena: Arena::new(config.max_resting_orders),
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &BookConfig {
        &self.config
    }

    #[must_use]
    pub fn best_bid(&self) -> Option<Price> {
        self.bids.keys().next_back().copied()
    }

    #[must_use]
    pub fn best_ask(&self) -> Option<Price> {
        self.asks.keys().next().copied()
    }

    #[must_use]
    pub fn resting_order_count(&self) -> usize {
        self.index.len()
    }

    /// Submits a new order. Matches it against the resting book first
    /// (price-time priority), then rests any residual quantity as a new
    /// resting order, charging the configured listing fee.
    ///
    /// Returns the trades generated (in match order) followed by the
    /// listing event, if any quantity came to rest.
    ///
    /// # Errors
    /// Returns [`BookError::OrderIdExhausted`] if `id` exceeds the
    /// configured maximum. Returns a capacity error if resting the
    /// residual would exceed a configured limit; trades already crossed
    /// before that point stand, only the rest is rejected.
    pub fn add(&mut self, id: OrderId, side: Side, price: Price, qty: Qty) -> Result<Vec<Event>, BookError> {
        if id > self.config.max_order_id {
            return Err(BookError::OrderIdExhausted {
                id,
                max: self.config.max_order_id,
            });
        }

        let mut events = Vec::new();
        let residual = match side {
            Side::Buy => self.match_incoming(id, price, qty, &mut events, true),
            Side::Sell => self.match_incoming(id, price, qty, &mut events, false),
        };

        if residual > 0 {
            self.rest(id, side, price, residual, &mut events)?;
        }

        Ok(events)
    }

    /// Matches an incoming order of `qty` at `price` against the
    /// opposite side (asks if `is_buy`, bids otherwise), returning the
    /// quantity left unmatched.
    fn match_incoming(&mut self, aggressor_id: OrderId, price: Price, qty: Qty, events: &mut Vec<Event>, is_buy: bool) -> Qty {
        let mut residual = qty;

        while residual > 0 {
            let best_price = if is_buy {
                self.asks.keys().next().copied()
            } else {
                self.bids.keys().next_back().copied()
            };
            let Some(best_price) = best_price else {
                break;
            };
            let crosses = if is_buy { best_price <= price } else { best_price >= price };
            if !crosses {
                break;
            }

            let opposite = if is_buy { &mut self.asks } else { &mut self.bids };
            let level = opposite.get_mut(&best_price).expect("best_price came from this map");
            let resting_idx = *level.orders.front().expect("non-empty level has a front order");
            let resting = self.arena.get_mut(resting_idx);
            let resting_id = resting.id;

            let trade_qty = residual.min(resting.remaining);
            resting.remaining -= trade_qty;
            let resting_exhausted = resting.remaining == 0;

            residual -= trade_qty;
            level.total_quantity -= trade_qty;
            let fee = Fee::for_trade(trade_qty, best_price, self.config.fee_bps);
            events.push(Event::Trade {
                aggressor_id,
                resting_id,
                price: best_price,
                qty: trade_qty,
                fee,
            });

            if resting_exhausted {
                level.orders.pop_front();
                self.index.remove(&resting_id);
            }
            if level.is_empty() {
                opposite.remove(&best_price);
            }
        }

        residual
    }

    /// Rests `qty` of order `id` at `price` on `side`, allocating it in
    /// the arena and recording the listing fee. Rejects if a configured
    /// limit would be exceeded, leaving the book unchanged.
    fn rest(&mut self, id: OrderId, side: Side, price: Price, qty: Qty, events: &mut Vec<Event>) -> Result<(), BookError> {
        let levels = if side == Side::Buy { &self.bids } else { &self.asks };
        let opening_new_level = !levels.contains_key(&price);
        if opening_new_level && levels.len() >= self.config.max_levels_per_side {
            return Err(BookError::LevelCapacityExhausted {
                price,
                levels: levels.len(),
                max: self.config.max_levels_per_side,
            });
        }
        if let Some(level) = levels.get(&price) {
            if level.order_count() >= self.config.max_orders_per_level {
                return Err(BookError::OrderCapacityExhausted {
                    price,
                    orders: level.order_count(),
                    max: self.config.max_orders_per_level,
                });
            }
        }
        if self.index.len() >= self.config.max_resting_orders {
            return Err(BookError::TotalCapacityExhausted {
                orders: self.index.len(),
                max: self.config.max_resting_orders,
            });
        }

        let order = Order { id, side, price, remaining: qty };
        let arena_idx = self
            .arena
            .alloc(order)
            .ok_or(BookError::TotalCapacityExhausted {
                orders: self.index.len(),
                max: self.config.max_resting_orders,
            })?;

        let levels = if side == Side::Buy { &mut self.bids } else { &mut self.asks };
        let level = levels.entry(price).or_default();
        level.orders.push_back(arena_idx);
        level.total_quantity += qty;
        self.index.insert(id, arena_idx);

        let fee = Fee(self.config.listing_fee_ticks);
        events.push(Event::Listing { order_id: id, side, qty, fee });
        Ok(())
    }

    /// Cancels a resting order entirely, removing it from its price
    /// level (and the level itself, if it was the last order there).
    ///
    /// # Errors
    /// Returns [`BookError::UnknownOrder`] if `id` is not currently
    /// resting (already filled, already cancelled, or never existed).
    pub fn cancel(&mut self, id: OrderId) -> Result<(), BookError> {
        let arena_idx = self.index.remove(&id).ok_or(BookError::UnknownOrder { id })?;
        let order = *self.arena.get(arena_idx);
        let levels = if order.side == Side::Buy { &mut self.bids } else { &mut self.asks };
        let level = levels.get_mut(&order.price).expect("index and price levels stay in sync");

        level.orders.retain(|&idx| idx != arena_idx);
        level.total_quantity -= order.remaining;
        if level.is_empty() {
            levels.remove(&order.price);
        }
        Ok(())
    }

    /// Applies an external execution report against a resting order,
    /// decrementing its remaining quantity directly (the feed's
    /// `Order Executed` message folds trade-report and book-update into
    /// one event; this book does not separately re-derive a trade from
    /// it). An order whose remaining quantity reaches zero is removed
    /// exactly as [`Book::cancel`] would.
    ///
    /// # Errors
    /// Returns [`BookError::UnknownOrder`] if `id` is not currently
    /// resting.
    pub fn execute(&mut self, id: OrderId, executed_qty: Qty) -> Result<(), BookError> {
        let &arena_idx = self.index.get(&id).ok_or(BookError::UnknownOrder { id })?;
        let order = self.arena.get_mut(arena_idx);
        let side = order.side;
        let price = order.price;
        let decrement = executed_qty.min(order.remaining);
        order.remaining -= decrement;
        let exhausted = order.remaining == 0;

        let levels = if side == Side::Buy { &mut self.bids } else { &mut self.asks };
        let level = levels.get_mut(&price).expect("index and price levels stay in sync");
        level.total_quantity -= decrement;

        if exhausted {
            level.orders.retain(|&idx| idx != arena_idx);
            self.index.remove(&id);
            if level.is_empty() {
                levels.remove(&price);
            }
        }
        Ok(())
    }
}
