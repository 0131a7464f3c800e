use crate::invariants::{
    debug_assert_bounded_count, debug_assert_head_not_past_tail, debug_assert_initialized_read,
    debug_assert_monotonic, debug_assert_no_wrap,
};
use crate::metrics::MetricsSnapshot;
use crate::{Backoff, Config, Metrics, Reservation};
use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::ptr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

// =============================================================================
// MEMORY ORDERING & SYNCHRONIZATION STRATEGY
// =============================================================================
//
// Classic SPSC producer-consumer protocol:
//
// ## Sequence Numbers (ABA Prevention)
//
// `head`/`tail` are unbounded u64 sequence numbers, not wrapped indices —
// the buffer index is computed as `sequence & mask` only at the point of
// access. With 2^64 possible values wrap-around is not a practical concern.
//
// ## Memory Ordering Protocol
//
// **Producer (write path):**
// 1. Load `tail` with Relaxed (only producer writes tail)
// 2. Load `cached_head` unsynchronized (single-writer UnsafeCell)
// 3. If cache insufficient: load `head` with Acquire (syncs with consumer)
// 4. Write data to buffer slots
// 5. Store `tail` with Release (publishes writes to consumer)
//
// **Consumer (read path):**
// 1. Load `head` with Relaxed (only consumer writes head)
// 2. Load `cached_tail` unsynchronized (single-writer UnsafeCell)
// 3. If cache insufficient: load `tail` with Acquire (syncs with producer)
// 4. Read data from buffer slots
// 5. Store `head` with Release (publishes consumption to producer)
//
// These invariants hold only for exactly one producer and one consumer —
// `Ring<T>` is not safe to share among multiple writers or multiple
// readers. The pipeline enforces this by construction: each stage holds
// its own dedicated ring end.
//
// =============================================================================

/// Lock-free single-producer single-consumer ring buffer.
///
/// Not safe to use with more than one producer or more than one consumer.
/// Optimized with:
/// - 128-byte alignment to prevent false sharing
/// - Cached sequence numbers to minimize cross-core traffic
/// - Batch operations to amortize atomic overhead
#[repr(C)]
pub struct Ring<T> {
    // === PRODUCER HOT === (128-byte aligned)
    tail: CacheAligned<AtomicU64>,
    cached_head: CacheAligned<UnsafeCell<u64>>,

    // === CONSUMER HOT === (128-byte aligned)
    head: CacheAligned<AtomicU64>,
    cached_tail: CacheAligned<UnsafeCell<u64>>,

    // === COLD STATE ===
    closed: AtomicBool,
    metrics: Metrics,
    config: Config,

    // === DATA BUFFER ===
    buffer: UnsafeCell<Box<[MaybeUninit<T>]>>,
}

// SAFETY: Ring is Send + Sync as long as T is Send — the head/tail atomic
// protocol is what makes cross-thread access sound, provided callers
// respect the single-producer/single-consumer contract above.
unsafe impl<T: Send> Send for Ring<T> {}
unsafe impl<T: Send> Sync for Ring<T> {}

impl<T> Ring<T> {
    /// Creates a new ring buffer with the given configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let capacity = config.capacity();

        let mut buffer = Vec::with_capacity(capacity);
        buffer.resize_with(capacity, MaybeUninit::uninit);
        let buffer = buffer.into_boxed_slice();

        Self {
            tail: CacheAligned::new(AtomicU64::new(0)),
            cached_head: CacheAligned::new(UnsafeCell::new(0)),
            head: CacheAligned::new(AtomicU64::new(0)),
            cached_tail: CacheAligned::new(UnsafeCell::new(0)),
            closed: AtomicBool::new(false),
            metrics: Metrics::new(),
            config,
            buffer: UnsafeCell::new(buffer),
        }
    }

    // ---------------------------------------------------------------------
    // CONSTANTS & STATUS
    // ---------------------------------------------------------------------

    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.config.capacity()
    }

    #[inline]
    fn mask(&self) -> usize {
        self.config.mask()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        let tail = self.tail.load(Ordering::Relaxed);
        let head = self.head.load(Ordering::Relaxed);
        tail.wrapping_sub(head) as usize
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tail.load(Ordering::Relaxed) == self.head.load(Ordering::Relaxed)
    }

    #[inline]
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.len() >= self.capacity()
    }

    #[inline]
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    // ---------------------------------------------------------------------
    // PRODUCER API
    // ---------------------------------------------------------------------

    /// Reserve `n` slots for zero-copy writing. Returns `None` if full,
    /// closed, or `n` exceeds capacity.
    ///
    /// The returned `Reservation` may contain fewer than `n` items if the
    /// reservation wraps around the ring's physical boundary — check
    /// `reservation.as_mut_slice().len()`.
    #[allow(clippy::cast_possible_truncation)]
    pub fn reserve(&self, n: usize) -> Option<Reservation<'_, T>> {
        if n == 0 || n > self.capacity() || self.is_closed() {
            return None;
        }

        let tail = self.tail.load(Ordering::Relaxed);

        // SAFETY: cached_head is written only by the producer.
        let cached_head = unsafe { *self.cached_head.get() };
        let space = self
            .capacity()
            .saturating_sub(tail.wrapping_sub(cached_head) as usize);

        if space >= n {
            return Some(self.make_reservation(tail, n));
        }

        let head = self.head.load(Ordering::Acquire);
        // SAFETY: cached_head is written only by the producer; the Acquire
        // load above synchronizes with the consumer's Release store.
        unsafe {
            *self.cached_head.get() = head;
        }

        let space = self.capacity().saturating_sub(tail.wrapping_sub(head) as usize);
        if space < n {
            return None;
        }

        Some(self.make_reservation(tail, n))
    }

    /// Reserve with adaptive backoff: spins, yields, then gives up.
    pub fn reserve_with_backoff(&self, n: usize) -> Option<Reservation<'_, T>> {
        let mut backoff = Backoff::new();
        while !backoff.is_completed() {
            if let Some(r) = self.reserve(n) {
                return Some(r);
            }
            if self.is_closed() {
                return None;
            }
            backoff.snooze();
        }
        None
    }

    fn make_reservation(&self, tail: u64, n: usize) -> Reservation<'_, T> {
        let mask = self.mask();
        let idx = (tail as usize) & mask;
        let contiguous = n.min(self.capacity() - idx);

        // SAFETY: idx is within bounds; these slots are beyond the current
        // tail so the consumer will not touch them until commit publishes
        // a new tail via Release.
        let slice = unsafe {
            let buffer = &mut *self.buffer.get();
            &mut buffer[idx..idx + contiguous]
        };

        let ring_ptr = self as *const Self;
        Reservation::new(slice, ring_ptr)
    }

    pub(crate) fn commit_internal(&self, n: usize) {
        let tail = self.tail.load(Ordering::Relaxed);
        let new_tail = tail.wrapping_add(n as u64);
        let head = self.head.load(Ordering::Relaxed);

        debug_assert_bounded_count!(new_tail.wrapping_sub(head) as usize, self.capacity());
        debug_assert_monotonic!("tail", tail, new_tail);
        debug_assert_no_wrap!("tail", tail, new_tail);

        self.tail.store(new_tail, Ordering::Release);

        if self.config.enable_metrics {
            self.metrics.add_messages_sent(n as u64);
            self.metrics.add_batches_sent(1);
        }
    }

    // ---------------------------------------------------------------------
    // CONSUMER API
    // ---------------------------------------------------------------------

    /// Get a readable slice. Returns `None` if empty.
    #[allow(clippy::cast_possible_truncation)]
    pub fn readable(&self) -> Option<&[T]> {
        let head = self.head.load(Ordering::Relaxed);

        // SAFETY: cached_tail is written only by the consumer.
        let mut cached_tail = unsafe { *self.cached_tail.get() };
        let mut avail = cached_tail.wrapping_sub(head) as usize;

        if avail == 0 {
            cached_tail = self.tail.load(Ordering::Acquire);
            // SAFETY: cached_tail is written only by the consumer; the
            // Acquire load above synchronizes with the producer's Release.
            unsafe {
                *self.cached_tail.get() = cached_tail;
            }
            avail = cached_tail.wrapping_sub(head) as usize;
            if avail == 0 {
                return None;
            }
        }

        let mask = self.mask();
        let idx = (head as usize) & mask;
        let contiguous = avail.min(self.capacity() - idx);

        // SAFETY: items in [head, tail) were published by the producer's
        // Release store; the Acquire load above synchronizes with it.
        unsafe {
            let buffer = &*self.buffer.get();
            Some(std::slice::from_raw_parts(
                buffer[idx..].as_ptr().cast::<T>(),
                contiguous,
            ))
        }
    }

    /// Advance head after reading `n` items.
    #[inline]
    pub fn advance(&self, n: usize) {
        let head = self.head.load(Ordering::Relaxed);
        let new_head = head.wrapping_add(n as u64);
        let tail = self.tail.load(Ordering::Relaxed);

        debug_assert_head_not_past_tail!(new_head, tail);
        debug_assert_monotonic!("head", head, new_head);

        self.head.store(new_head, Ordering::Release);

        if self.config.enable_metrics {
            self.metrics.add_messages_received(n as u64);
            self.metrics.add_batches_received(1);
        }
    }

    /// Pops a single item, taking ownership. Returns `None` if empty.
    ///
    /// Unlike [`recv`](Self::recv), this does not require `T: Copy` —
    /// useful when the ring carries owned data (e.g. a `LogEvent`).
    #[allow(clippy::cast_possible_truncation)]
    pub fn pop(&self) -> Option<T> {
        let head = self.head.load(Ordering::Relaxed);
        let tail = self.tail.load(Ordering::Acquire);
        if head == tail {
            return None;
        }

        debug_assert_initialized_read!(head, head, tail);

        let idx = (head as usize) & self.mask();
        // SAFETY: slot at idx is within [head, tail), published by the
        // producer's Release store and observed via the Acquire load above.
        let item = unsafe {
            let buffer = &*self.buffer.get();
            buffer[idx].assume_init_read()
        };

        self.head.store(head.wrapping_add(1), Ordering::Release);

        if self.config.enable_metrics {
            self.metrics.add_messages_received(1);
            self.metrics.add_batches_received(1);
        }

        Some(item)
    }

    // ---------------------------------------------------------------------
    // BATCH CONSUMPTION (Disruptor Pattern)
    // ---------------------------------------------------------------------

    /// Process all available items with a single head update, transferring
    /// ownership to `handler`. Use when `T` is not `Copy` or owns heap
    /// allocations.
    #[allow(clippy::cast_possible_truncation)]
    pub fn consume_batch_owned<F>(&self, mut handler: F) -> usize
    where
        F: FnMut(T),
    {
        let head = self.head.load(Ordering::Relaxed);
        let tail = self.tail.load(Ordering::Acquire);

        let avail = tail.wrapping_sub(head) as usize;
        if avail == 0 {
            return 0;
        }

        let mask = self.mask();
        let mut pos = head;
        let mut count = 0;

        while pos != tail {
            debug_assert_initialized_read!(pos, head, tail);

            let idx = (pos as usize) & mask;
            // SAFETY: see module-level synchronization notes.
            let item = unsafe {
                let buffer = &*self.buffer.get();
                buffer[idx].assume_init_read()
            };
            handler(item);
            pos = pos.wrapping_add(1);
            count += 1;
        }

        self.head.store(tail, Ordering::Release);

        if self.config.enable_metrics {
            self.metrics.add_messages_received(count as u64);
            self.metrics.add_batches_received(1);
        }

        count
    }

    /// Consume up to `max_items` with a single head update, by reference.
    #[allow(clippy::cast_possible_truncation)]
    pub fn consume_up_to<F>(&self, max_items: usize, mut handler: F) -> usize
    where
        F: FnMut(&T),
    {
        if max_items == 0 {
            return 0;
        }

        let head = self.head.load(Ordering::Relaxed);
        let tail = self.tail.load(Ordering::Acquire);

        let avail = tail.wrapping_sub(head) as usize;
        if avail == 0 {
            return 0;
        }

        let to_consume = avail.min(max_items);
        let mask = self.mask();
        let mut pos = head;
        let mut count = 0;

        while count < to_consume {
            debug_assert_initialized_read!(pos, head, tail);

            let idx = (pos as usize) & mask;
            // SAFETY: see module-level synchronization notes.
            let item = unsafe {
                let buffer = &*self.buffer.get();
                buffer[idx].assume_init_read()
            };
            handler(&item);
            pos = pos.wrapping_add(1);
            count += 1;
        }

        self.head.store(head.wrapping_add(count as u64), Ordering::Release);

        if self.config.enable_metrics {
            self.metrics.add_messages_received(count as u64);
            self.metrics.add_batches_received(1);
        }

        count
    }

    // ---------------------------------------------------------------------
    // CONVENIENCE WRAPPERS
    // ---------------------------------------------------------------------

    /// Send a single item (convenience). `false` if the ring is full or closed.
    #[inline]
    pub fn push(&self, item: T) -> bool {
        self.reserve(1).is_some_and(|mut r| {
            r.as_mut_slice()[0] = MaybeUninit::new(item);
            r.commit();
            true
        })
    }

    /// Pushes a single item, retrying with adaptive backoff until it fits
    /// or the ring is closed. Never drops the item on a transient-full
    /// condition — callers relying on at-least-once delivery (the
    /// sequencer's publish path) should use this instead of `push`.
    pub fn push_blocking(&self, item: T) -> bool {
        let mut item = Some(item);
        let mut backoff = Backoff::new();
        loop {
            if self.is_closed() {
                return false;
            }
            if let Some(mut r) = self.reserve(1) {
                r.as_mut_slice()[0] = MaybeUninit::new(item.take().expect("item consumed once"));
                r.commit();
                return true;
            }
            backoff.snooze();
        }
    }

    /// Batch send (convenience).
    pub fn send(&self, items: &[T]) -> usize
    where
        T: Copy,
    {
        self.reserve(items.len()).map_or(0, |mut reservation| {
            let slice = reservation.as_mut_slice();
            let n = slice.len();
            for i in 0..n {
                slice[i].write(items[i]);
            }
            reservation.commit();
            n
        })
    }

    /// Batch receive (convenience).
    pub fn recv(&self, out: &mut [T]) -> usize
    where
        T: Copy,
    {
        self.readable().map_or(0, |slice| {
            let n = slice.len().min(out.len());
            out[..n].copy_from_slice(&slice[..n]);
            self.advance(n);
            n
        })
    }

    // ---------------------------------------------------------------------
    // LIFECYCLE
    // ---------------------------------------------------------------------

    /// Close the ring, preventing further `reserve`/`push`.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    /// Snapshot of metrics (zeroed if metrics collection was not enabled).
    #[must_use]
    pub fn metrics(&self) -> MetricsSnapshot {
        if self.config.enable_metrics {
            self.metrics.snapshot()
        } else {
            MetricsSnapshot::default()
        }
    }
}

impl<T> Drop for Ring<T> {
    fn drop(&mut self) {
        let head = self.head.load(Ordering::Relaxed);
        let tail = self.tail.load(Ordering::Relaxed);
        let count = tail.wrapping_sub(head) as usize;

        if count > 0 {
            let mask = self.mask();
            let buffer = self.buffer.get_mut();

            for i in 0..count {
                let idx = (head as usize).wrapping_add(i) & mask;
                // SAFETY: slots in [head, tail) are initialized and not
                // otherwise accessed once the ring is being dropped.
                unsafe {
                    ptr::drop_in_place(buffer[idx].as_mut_ptr());
                }
            }
        }
    }
}

/// Wrapper type ensuring 128-byte alignment to prevent prefetcher-induced
/// false sharing on Intel/AMD CPUs.
#[repr(align(128))]
struct CacheAligned<T> {
    value: T,
}

impl<T> CacheAligned<T> {
    const fn new(value: T) -> Self {
        Self { value }
    }
}

impl<T> std::ops::Deref for CacheAligned<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_basic_reserve_commit() {
        let ring = Ring::<u64>::new(Config::default());

        if let Some(mut r) = ring.reserve(4) {
            let slice = r.as_mut_slice();
            slice[0].write(100);
            slice[1].write(200);
            slice[2].write(300);
            slice[3].write(400);
            r.commit();
        }

        assert_eq!(ring.len(), 4);

        if let Some(slice) = ring.readable() {
            assert_eq!(slice[0], 100);
            assert_eq!(slice[3], 400);
            ring.advance(4);
        }

        assert!(ring.is_empty());
    }

    #[test]
    fn test_ring_push_pop_single_item() {
        let ring = Ring::<u64>::new(Config::default());
        assert!(ring.pop().is_none());

        assert!(ring.push(7));
        assert!(ring.push(8));
        assert_eq!(ring.pop(), Some(7));
        assert_eq!(ring.pop(), Some(8));
        assert_eq!(ring.pop(), None);
    }

    #[test]
    fn test_ring_consume_up_to() {
        let ring = Ring::<u64>::new(Config::default());

        for i in 0..10 {
            assert!(ring.push(i * 10));
        }

        let mut sum = 0u64;
        let consumed = ring.consume_up_to(5, |item| sum += item);

        assert_eq!(consumed, 5);
        assert_eq!(sum, 10 + 20 + 30 + 40);
        assert_eq!(ring.len(), 5);

        sum = 0;
        let consumed2 = ring.consume_up_to(10, |item| sum += item);
        assert_eq!(consumed2, 5);
        assert_eq!(sum, 50 + 60 + 70 + 80 + 90);
        assert!(ring.is_empty());
    }

    #[test]
    fn test_ring_full() {
        let config = Config::new(4, false); // 16 slots
        let ring = Ring::<u64>::new(config);

        for i in 0..16 {
            assert!(ring.push(i));
        }

        assert!(ring.reserve(1).is_none());
        assert!(!ring.push(99));
    }

    #[test]
    fn test_consume_batch_owned_drops_items() {
        use std::sync::atomic::{AtomicUsize, Ordering as AtOrdering};

        static DROP_COUNT: AtomicUsize = AtomicUsize::new(0);

        struct DropTracker {
            _id: u64,
        }

        impl Drop for DropTracker {
            fn drop(&mut self) {
                DROP_COUNT.fetch_add(1, AtOrdering::SeqCst);
            }
        }

        DROP_COUNT.store(0, AtOrdering::SeqCst);

        let ring = Ring::<DropTracker>::new(Config::default());

        for i in 0..5 {
            assert!(ring.push(DropTracker { _id: i }));
        }

        assert_eq!(DROP_COUNT.load(AtOrdering::SeqCst), 0);

        let mut received = Vec::new();
        let consumed = ring.consume_batch_owned(|item| received.push(item));

        assert_eq!(consumed, 5);
        drop(received);
        assert_eq!(DROP_COUNT.load(AtOrdering::SeqCst), 5);
    }

    #[test]
    fn test_push_blocking_succeeds_once_space_frees() {
        let config = Config::new(1, false); // 2 slots
        let ring = Ring::<u64>::new(config);

        assert!(ring.push(1));
        assert!(ring.push(2));
        assert!(!ring.push(3));

        // Free a slot, then push_blocking should succeed immediately.
        assert_eq!(ring.pop(), Some(1));
        assert!(ring.push_blocking(3));
        assert_eq!(ring.pop(), Some(2));
        assert_eq!(ring.pop(), Some(3));
    }

    proptest::proptest! {
        /// After N pushes interleaved with pops that never outrun the
        /// producer, the consumer observes exactly the pushed items, in
        /// push order, byte-identical — no push succeeds past capacity,
        /// no pop succeeds on empty (§8 ring properties).
        #[test]
        fn prop_push_pop_preserves_order_and_respects_capacity(
            ring_bits in 1u8..8,
            ops in proptest::collection::vec(proptest::prelude::any::<(bool, u32)>(), 0..500),
        ) {
            let ring = Ring::<u32>::new(Config::new(ring_bits, false));
            let mut model: std::collections::VecDeque<u32> = std::collections::VecDeque::new();

            for (do_push, value) in ops {
                if do_push {
                    let was_full = ring.is_full();
                    let pushed = ring.push(value);
                    proptest::prop_assert_eq!(pushed, !was_full);
                    if pushed {
                        model.push_back(value);
                    }
                } else {
                    let was_empty = ring.is_empty();
                    let popped = ring.pop();
                    proptest::prop_assert_eq!(popped.is_none(), was_empty);
                    if let Some(v) = popped {
                        proptest::prop_assert_eq!(Some(v), model.pop_front());
                    }
                }
            }

            while let Some(expected) = model.pop_front() {
                proptest::prop_assert_eq!(ring.pop(), Some(expected));
            }
            proptest::prop_assert!(ring.pop().is_none());
        }
    }
}
