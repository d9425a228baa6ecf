use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

/// An inclusive price range in euros
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: u32,
    pub max: u32,
}

impl PriceRange {
    pub fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub fn width(&self) -> u32 {
        self.max.saturating_sub(self.min)
    }

    /// Splits the range into two halves that do not overlap.
    pub fn bisect(&self) -> Option<(Self, Self)> {
        if self.min >= self.max {
            return None;
        }
        let mid = self.min + self.width() / 2;
        Some((Self::new(self.min, mid), Self::new(mid + 1, self.max)))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartitionConfig {
    /// Maximum number of results the site exposes for a single search
    #[serde(default = "default_result_cap")]
    pub result_cap: u32,

    #[serde(default = "default_slice_width")]
    pub slice_width: NonZeroU32,

    /// Count each slice and bisect the ones still above the cap
    #[serde(default)]
    pub refine: bool,
}

impl Default for PartitionConfig {
    fn default() -> Self {
        Self {
            result_cap: default_result_cap(),
            slice_width: default_slice_width(),
            refine: false,
        }
    }
}

fn default_result_cap() -> u32 {
    // 50 pages of 20 ads
    1000
}

fn default_slice_width() -> NonZeroU32 {
    NonZeroU32::new(100).unwrap_or(NonZeroU32::MIN)
}

/// Cuts `range` into consecutive slices of `width` euros.
///
/// The first slice starts at `range.min`, every following slice starts one euro
/// after the previous end and the last one is clamped to `range.max`.
pub fn price_slices(range: PriceRange, width: NonZeroU32) -> Vec<PriceRange> {
    let width = width.get();
    if range.min > range.max {
        return vec![];
    }
    if range.min == range.max {
        return vec![range];
    }

    let n = range.width().div_ceil(width);
    (0..n)
        .map(|i| {
            let start = range.min.saturating_add(width.saturating_mul(i));
            let min = if i == 0 { start } else { start.saturating_add(1) };
            let max = range
                .min
                .saturating_add(width.saturating_mul(i + 1))
                .min(range.max);
            PriceRange::new(min, max)
        })
        .collect()
}
