//! Common data types for lumi

/// One bunch slot measurement from a per-bunch luminosity record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BunchSlot {
    /// Bunch crossing id.
    pub bx: u32,
    /// Delivered luminosity for this bunch.
    pub delivered: f64,
    /// Recorded luminosity for this bunch (used as the weight).
    pub recorded: f64,
}

impl BunchSlot {
    /// Create a new slot
    pub fn new(bx: u32, delivered: f64, recorded: f64) -> Self {
        Self { bx, delivered, recorded }
    }
}

/// Parsed content of one input line.
#[derive(Debug, Clone, PartialEq)]
pub struct BunchRecord {
    /// Run number
    pub run: u32,
    /// Lumi section (interval) number
    pub interval: u32,
    /// Luminometer that produced the measurement (e.g. `"HFOC"`, `"PLTZERO"`).
    pub channel: String,
    /// Per-bunch measurements in input order.
    pub slots: Vec<BunchSlot>,
}

/// Pileup summary for one lumi section.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntervalSummary {
    /// Lumi section number
    pub interval: u32,

    /// Sum of recorded luminosity over the contributing bunches
    pub total_recorded: f64,

    /// Luminosity-weighted RMS of the per-bunch pileup. Always `>= 0`.
    pub rms_pileup: f64,

    /// Luminosity-weighted mean pileup. Zero when `total_recorded == 0`.
    pub mean_pileup: f64,

    /// Number of bunches that passed the slot filter and threshold
    pub filled_slots: usize,

    /// Number of bunches with an implausibly large pileup (> 100)
    pub implausible_slots: usize,
}

impl IntervalSummary {
    /// A zero-valued placeholder for `interval`.
    pub fn empty(interval: u32) -> Self {
        Self {
            interval,
            total_recorded: 0.0,
            rms_pileup: 0.0,
            mean_pileup: 0.0,
            filled_slots: 0,
            implausible_slots: 0,
        }
    }

    /// Whether all three rendered values are finite.
    pub fn is_finite(&self) -> bool {
        self.total_recorded.is_finite()
            && self.rms_pileup.is_finite()
            && self.mean_pileup.is_finite()
    }

    /// Whether this summary carries no luminosity.
    pub fn is_empty(&self) -> bool {
        self.total_recorded == 0.0 && self.rms_pileup == 0.0 && self.mean_pileup == 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_summary() {
        let s = IntervalSummary::empty(4);
        assert_eq!(s.interval, 4);
        assert!(s.is_empty());
        assert_eq!(s.filled_slots, 0);
        assert!(s.is_finite());
    }

    #[test]
    fn test_non_finite_summary() {
        let s = IntervalSummary { mean_pileup: f64::INFINITY, ..IntervalSummary::empty(1) };
        assert!(!s.is_finite());
    }
}
