//! Active monitoring window over table indices.

use std::ops::Range;

use crate::error::ConfigError;

/// Requested filter bounds; either order is accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterRange {
    pub low: usize,
    pub high: usize,
}

impl FilterRange {
    /// Window covering the whole table
    pub fn full(len: usize) -> Self {
        Self { low: 0, high: len }
    }

    /// Half-open index window `[min(low, high), max(low, high))`
    pub fn active(&self) -> Range<usize> {
        self.low.min(self.high)..self.low.max(self.high)
    }

    pub fn contains(&self, index: usize) -> bool {
        self.active().contains(&index)
    }

    /// Both bounds must lie in `[0, len]`.
    pub fn validate(&self, len: usize) -> Result<(), ConfigError> {
        for value in [self.low, self.high] {
            if value > len {
                return Err(ConfigError::FilterBound { value, max: len });
            }
        }
        Ok(())
    }

    /// Indices in `[0, len)` that fall outside the window
    pub fn excluded(&self, len: usize) -> impl Iterator<Item = usize> {
        let active = self.active();
        (0..len).filter(move |index| !active.contains(index))
    }
}
