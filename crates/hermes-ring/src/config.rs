/// Configuration for a [`crate::Ring`].
#[derive(Debug, Clone, Copy)]
pub struct Config {
    /// Ring buffer size as a power of 2 (default: 16 = 64K slots).
    pub ring_bits: u8,
    /// Enable metrics collection (slight overhead).
    pub enable_metrics: bool,
}

impl Config {
    /// Creates a new configuration with custom settings.
    ///
    /// # Panics
    /// Panics if `ring_bits` is 0 or greater than 20 (1M slots max).
    #[must_use]
    pub const fn new(ring_bits: u8, enable_metrics: bool) -> Self {
        assert!(
            ring_bits > 0 && ring_bits <= 20,
            "ring_bits must be between 1 and 20 (max 1M slots)"
        );

        Self {
            ring_bits,
            enable_metrics,
        }
    }

    /// Returns the capacity of the ring buffer.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        1 << self.ring_bits
    }

    /// Returns the mask for index wrapping.
    #[inline]
    #[must_use]
    pub const fn mask(&self) -> usize {
        self.capacity() - 1
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ring_bits: 16, // 64K slots
            enable_metrics: false,
        }
    }
}

/// Low latency configuration (4K slots, fits in L1 cache).
pub const LOW_LATENCY_CONFIG: Config = Config::new(12, false);

/// High throughput configuration (256K slots).
pub const HIGH_THROUGHPUT_CONFIG: Config = Config::new(18, false);
