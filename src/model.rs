//! Adaptive cumulative-frequency model.
//!
//! The model is the only state shared (by value, never by reference) between
//! an encoder and its matching decoder: both sides must apply the identical
//! `update` sequence, and that lock-step mutation is what keeps them
//! synchronized. Nothing in the bit sequence itself can detect divergence.

use crate::error::{Error, Result};

/// Number of bits of frequency precision.
pub const FREQ_BITS: u32 = 30;

/// The largest total frequency the range registers can represent.
pub const MAX_TOTAL_FREQ: u32 = (1 << FREQ_BITS) - 1;

/// Default rescale limit (the classic 16-bit coder's maximum frequency).
pub const DEFAULT_RESCALE_LIMIT: u32 = (1 << 14) - 1;

/// Adaptive frequency table over a fixed alphabet `{0 .. K-1}`.
///
/// Every count stays >= 1, so every symbol always has a nonempty cumulative
/// range and remains codable. When the running total exceeds the rescale
/// limit, all counts are halved (floor, clamped to 1) to bound the precision
/// the coding registers must carry.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyModel {
    /// Per-symbol counts, each >= 1.
    counts: Vec<u32>,
    /// Cumulative counts; `cum[s]` is the sum of counts below `s`, and
    /// `cum[K]` is the total.
    cum: Vec<u32>,
    total: u32,
    increment: u32,
    rescale_limit: u32,
    adaptive: bool,
}

impl FrequencyModel {
    /// Create a model over `num_symbols` symbols with equal initial counts
    /// of 1, adaptation increment 1, and the default rescale limit.
    ///
    /// # Panics
    /// Panics if `num_symbols` is zero or too large for the default rescale
    /// limit to bound.
    pub fn new(num_symbols: usize) -> Self {
        assert!(num_symbols >= 1, "alphabet must have at least one symbol");
        assert!(
            num_symbols as u64 <= u64::from(MAX_TOTAL_FREQ),
            "alphabet too large for the frequency precision"
        );
        let counts = vec![1u32; num_symbols];
        let mut model = Self {
            cum: Vec::new(),
            total: 0,
            increment: 1,
            rescale_limit: DEFAULT_RESCALE_LIMIT.max(num_symbols as u32),
            adaptive: true,
            counts,
        };
        model.rebuild_cum();
        model
    }

    /// Create a model with the given initial counts.
    ///
    /// # Errors
    /// Returns [`Error::InvalidSymbol`] if any count is zero and
    /// [`Error::PrecisionOverflow`] if the counts sum past the
    /// representable precision.
    pub fn with_counts(counts: &[u32]) -> Result<Self> {
        assert!(!counts.is_empty(), "alphabet must have at least one symbol");
        if let Some(symbol) = counts.iter().position(|&c| c == 0) {
            return Err(Error::InvalidSymbol {
                symbol,
                alphabet: counts.len(),
            });
        }
        let total: u64 = counts.iter().map(|&c| u64::from(c)).sum();
        if total > u64::from(MAX_TOTAL_FREQ) {
            return Err(Error::PrecisionOverflow {
                total: total.min(u64::from(u32::MAX)) as u32,
            });
        }
        let mut model = Self {
            counts: counts.to_vec(),
            cum: Vec::new(),
            total: 0,
            increment: 1,
            rescale_limit: DEFAULT_RESCALE_LIMIT.max(counts.len() as u32),
            adaptive: true,
        };
        model.rebuild_cum();
        Ok(model)
    }

    /// Set the adaptation increment added by each `update`.
    ///
    /// # Panics
    /// Panics if `increment` is zero or exceeds the frequency precision.
    pub fn with_increment(mut self, increment: u32) -> Self {
        assert!(
            increment >= 1 && increment <= MAX_TOTAL_FREQ,
            "increment out of range"
        );
        self.increment = increment;
        self
    }

    /// Set the total-count threshold above which all counts are halved.
    ///
    /// # Panics
    /// Panics if the limit exceeds the frequency precision or is smaller
    /// than the alphabet size (a rescale could then never settle below it).
    pub fn with_rescale_limit(mut self, limit: u32) -> Self {
        assert!(
            limit <= MAX_TOTAL_FREQ && limit as usize >= self.counts.len(),
            "rescale limit out of range"
        );
        self.rescale_limit = limit;
        self
    }

    /// Enable or disable adaptation; a non-adaptive model ignores `update`.
    pub fn set_adaptive(&mut self, adaptive: bool) {
        self.adaptive = adaptive;
    }

    /// Whether the model adapts on `update`.
    pub fn is_adaptive(&self) -> bool {
        self.adaptive
    }

    /// The alphabet size K.
    pub fn num_symbols(&self) -> usize {
        self.counts.len()
    }

    /// The current count for `symbol`.
    ///
    /// # Panics
    /// Panics if `symbol` is outside the alphabet.
    pub fn count(&self, symbol: usize) -> u32 {
        self.counts[symbol]
    }

    /// The running total of all counts.
    pub fn total_freq(&self) -> u32 {
        self.total
    }

    /// Sum of counts for all symbols strictly less than `symbol`.
    ///
    /// # Panics
    /// Panics if `symbol` is outside the alphabet.
    pub fn cumulative_freq(&self, symbol: usize) -> u32 {
        assert!(symbol < self.counts.len(), "symbol outside alphabet");
        self.cum[symbol]
    }

    /// Map a value in `[0, total_freq())` to the unique symbol whose
    /// half-open cumulative range contains it, by binary search over the
    /// monotone cumulative table. Returns `None` when the value is outside
    /// the table.
    pub fn symbol_for_cumulative(&self, value: u32) -> Option<usize> {
        if value >= self.total {
            return None;
        }
        // cum[0] == 0 <= value, so the partition point is at least 1.
        Some(self.cum.partition_point(|&c| c <= value) - 1)
    }

    /// Record one occurrence of `symbol`: add the adaptation increment to
    /// its count and rescale if the total passes the limit. A no-op when
    /// the model is non-adaptive.
    ///
    /// # Panics
    /// Panics if `symbol` is outside the alphabet.
    pub fn update(&mut self, symbol: usize) {
        if !self.adaptive {
            return;
        }
        self.counts[symbol] += self.increment;
        for c in &mut self.cum[symbol + 1..] {
            *c += self.increment;
        }
        self.total += self.increment;
        while self.total > self.rescale_limit {
            self.rescale();
        }
    }

    fn rescale(&mut self) {
        for c in &mut self.counts {
            *c = (*c / 2).max(1);
        }
        self.rebuild_cum();
    }

    fn rebuild_cum(&mut self) {
        self.cum.clear();
        let mut total = 0u32;
        self.cum.push(0);
        for &c in &self.counts {
            total += c;
            self.cum.push(total);
        }
        self.total = total;
    }
}
