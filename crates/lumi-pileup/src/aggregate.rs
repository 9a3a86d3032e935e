//! Per-lumi-section pileup aggregation.
//!
//! For the bunches passing the slot filter and the luminometer threshold, the
//! per-bunch pileup is `mu_i = delivered_i * orbit / section`. With weights
//! `w_i = recorded_i`:
//!
//! - mean: `sum(w_i * mu_i) / sum(w_i)`
//! - RMS: `sqrt(W * sum(w_i * (mu_i - mean)^2) / (W^2 - sum(w_i^2)))`, `W = sum(w_i)`
//!
//! The mean must be known before the deviations are summed, so this is done in
//! two explicit passes.

use lumi_core::{BunchRecord, BunchSlot, IntervalSummary, LumiConstants};

use crate::filter::SlotFilter;

/// Per-bunch delivered threshold for the HF occupancy luminometer.
pub const HFOC_THRESHOLD: f64 = 8.0;

/// Per-bunch delivered threshold for every other luminometer.
pub const DEFAULT_THRESHOLD: f64 = 1.2;

/// Bunch pileup above this is flagged as implausible.
pub const IMPLAUSIBLE_PILEUP: f64 = 100.0;

/// Delivered-luminosity threshold a bunch must exceed to count as filled.
pub fn channel_threshold(channel: &str) -> f64 {
    if channel == "HFOC" { HFOC_THRESHOLD } else { DEFAULT_THRESHOLD }
}

/// Turns [`BunchRecord`]s into [`IntervalSummary`]s.
#[derive(Debug, Clone)]
pub struct IntervalAggregator {
    constants: LumiConstants,
    filter: SlotFilter,
}

impl IntervalAggregator {
    /// Create an aggregator with fixed timing constants and slot selection.
    pub fn new(constants: LumiConstants, filter: SlotFilter) -> Self {
        Self { constants, filter }
    }

    fn contributing<'a>(
        &'a self,
        slots: &'a [BunchSlot],
        threshold: f64,
    ) -> impl Iterator<Item = &'a BunchSlot> + 'a {
        slots.iter().filter(move |s| self.filter.accepts(s.bx) && s.delivered > threshold)
    }

    /// Compute the weighted mean and RMS pileup of one lumi section.
    pub fn aggregate(&self, record: &BunchRecord) -> IntervalSummary {
        let threshold = channel_threshold(&record.channel);

        // Pass 1: weighted mean. The unit conversion is applied once after the loop.
        let mut total_recorded = 0.0;
        let mut weighted_delivered = 0.0;
        let mut filled_slots = 0usize;
        for s in self.contributing(&record.slots, threshold) {
            total_recorded += s.recorded;
            weighted_delivered += s.delivered * s.recorded;
            filled_slots += 1;
        }
        weighted_delivered *= self.constants.pileup_scale();
        let mean_pileup =
            if total_recorded > 0.0 { weighted_delivered / total_recorded } else { 0.0 };

        // Pass 2: weighted spread around the mean.
        let mut sum_sq_dev = 0.0;
        let mut sum_weight = 0.0;
        let mut sum_weight_sq = 0.0;
        let mut implausible_slots = 0usize;
        for s in self.contributing(&record.slots, threshold) {
            let pileup = self.constants.instantaneous_pileup(s.delivered);
            if pileup > IMPLAUSIBLE_PILEUP {
                implausible_slots += 1;
                tracing::warn!(
                    "mean number of pileup events > 100 for run {}, lumi section {} : m {:.6} l {:.6}",
                    record.run,
                    record.interval,
                    pileup,
                    s.delivered,
                );
            }
            let dev = pileup - mean_pileup;
            sum_sq_dev += s.recorded * dev * dev;
            sum_weight += s.recorded;
            sum_weight_sq += s.recorded * s.recorded;
        }

        // Undefined for a single effective sample; also keeps the radicand non-negative.
        let denom = sum_weight * sum_weight - sum_weight_sq;
        let radicand = if total_recorded > 0.0 && denom > 0.0 {
            sum_weight * sum_sq_dev / denom
        } else {
            0.0
        };
        // Negative recorded weights can drive the radicand below zero.
        let rms_pileup = if radicand > 0.0 { radicand.sqrt() } else { 0.0 };

        IntervalSummary {
            interval: record.interval,
            total_recorded,
            rms_pileup,
            mean_pileup,
            filled_slots,
            implausible_slots,
        }
    }
}
