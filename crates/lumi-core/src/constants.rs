//! Facility timing constants.
//!
//! Converting a per-bunch delivered luminosity (integrated over one lumi
//! section) into a mean number of interactions per crossing needs the ratio
//! between the orbit period and the lumi section length.

use crate::{Error, Result};

/// LHC revolution frequency in Hz.
pub const LHC_REVOLUTION_FREQUENCY: f64 = 11245.613;

/// Number of orbits in one lumi section (2^18).
pub const LHC_ORBITS_PER_SECTION: u32 = 1 << 18;

/// Timing parameters passed to the aggregator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LumiConstants {
    /// Duration of one orbit, seconds.
    pub orbit_length: f64,
    /// Duration of one lumi section, seconds.
    pub interval_length: f64,
}

impl LumiConstants {
    /// Create a validated set of constants. Both lengths must be finite and positive.
    pub fn new(orbit_length: f64, interval_length: f64) -> Result<Self> {
        for (name, v) in [("orbit_length", orbit_length), ("interval_length", interval_length)] {
            if !v.is_finite() || v <= 0.0 {
                return Err(Error::Validation(format!(
                    "{name} must be finite and > 0, got {v}"
                )));
            }
        }
        Ok(Self { orbit_length, interval_length })
    }

    /// LHC timing: orbit = 1 / f_rev, lumi section = 2^18 orbits.
    pub fn lhc() -> Self {
        let orbit_length = 1.0 / LHC_REVOLUTION_FREQUENCY;
        Self { orbit_length, interval_length: LHC_ORBITS_PER_SECTION as f64 * orbit_length }
    }

    /// `orbit_length / interval_length`.
    pub fn pileup_scale(&self) -> f64 {
        self.orbit_length / self.interval_length
    }

    /// Mean pileup for a single bunch with the given delivered luminosity.
    pub fn instantaneous_pileup(&self, delivered: f64) -> f64 {
        delivered * self.orbit_length / self.interval_length
    }
}

impl Default for LumiConstants {
    fn default() -> Self {
        Self::lhc()
    }
}
