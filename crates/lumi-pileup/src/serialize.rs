//! JSON rendering of the run → lumi section document.
//!
//! Shape: `{"<run>": [[ls, recorded, rms, mean], ...], ...}` with the three
//! floats in `%.4e` notation. `serde_json` always prints floats in shortest
//! round-trip form, so the numbers are emitted as pre-formatted raw values.

use lumi_core::{IntervalSummary, Result};
use serde::ser::{Error as _, SerializeMap, SerializeSeq, SerializeTuple};
use serde::{Serialize, Serializer};
use serde_json::value::RawValue;

use crate::assembler::{OutputDocument, RunSeries};

/// Fractional digits used for every float in the output.
pub const FLOAT_DIGITS: usize = 4;

/// Format `value` like C's `%.{precision}e`: explicit exponent sign and at
/// least two exponent digits (`1.2340e+01`, `5.0000e-07`).
pub fn format_scientific(value: f64, precision: usize) -> String {
    let s = format!("{value:.precision$e}");
    match s.split_once('e') {
        Some((mantissa, exp)) => {
            let (sign, digits) = match exp.strip_prefix('-') {
                Some(d) => ('-', d),
                None => ('+', exp),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => s,
    }
}

fn raw_float<E: serde::ser::Error>(value: f64) -> std::result::Result<Box<RawValue>, E> {
    RawValue::from_string(format_scientific(value, FLOAT_DIGITS)).map_err(E::custom)
}

struct SummaryRow<'a>(&'a IntervalSummary);

impl Serialize for SummaryRow<'_> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let s = self.0;
        let mut row = serializer.serialize_tuple(4)?;
        row.serialize_element(&s.interval)?;
        row.serialize_element(&raw_float::<S::Error>(s.total_recorded)?)?;
        row.serialize_element(&raw_float::<S::Error>(s.rms_pileup)?)?;
        row.serialize_element(&raw_float::<S::Error>(s.mean_pileup)?)?;
        row.end()
    }
}

impl Serialize for RunSeries {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.intervals.len()))?;
        for summary in &self.intervals {
            seq.serialize_element(&SummaryRow(summary))?;
        }
        seq.end()
    }
}

impl Serialize for OutputDocument {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for series in self.runs() {
            map.serialize_entry(&series.run.to_string(), series)?;
        }
        map.end()
    }
}

/// Render the whole document as compact JSON.
pub fn to_json_string(document: &OutputDocument) -> Result<String> {
    if document.runs().iter().any(|r| r.intervals.iter().any(|s| !s.is_finite())) {
        return Err(serde_json::Error::custom("non-finite value in pileup summary").into());
    }
    Ok(serde_json::to_string(document)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::RunAssembler;

    fn summary(interval: u32, total: f64, rms: f64, mean: f64) -> IntervalSummary {
        IntervalSummary {
            interval,
            total_recorded: total,
            rms_pileup: rms,
            mean_pileup: mean,
            filled_slots: 1,
            implausible_slots: 0,
        }
    }

    #[test]
    fn scientific_matches_printf() {
        assert_eq!(format_scientific(0.0, 4), "0.0000e+00");
        assert_eq!(format_scientific(12.34, 4), "1.2340e+01");
        assert_eq!(format_scientific(310.8, 4), "3.1080e+02");
        assert_eq!(format_scientific(1.5e-7, 4), "1.5000e-07");
        assert_eq!(format_scientific(-0.5, 4), "-5.0000e-01");
        assert_eq!(format_scientific(1e100, 4), "1.0000e+100");
        assert_eq!(format_scientific(1e-100, 4), "1.0000e-100");
        assert_eq!(format_scientific(2.0, 2), "2.00e+00");
    }

    #[test]
    fn renders_runs_in_first_seen_order() {
        let mut asm = RunAssembler::new();
        asm.push(273302, summary(1, 1.0, 0.0, 3.0));
        asm.push(273158, summary(2, 310.8, 2.1002, 15.311));
        let json = to_json_string(&asm.finish()).unwrap();
        assert_eq!(
            json,
            "{\"273302\":[[1,1.0000e+00,0.0000e+00,3.0000e+00],[2,0.0000e+00,0.0000e+00,0.0000e+00]],\
             \"273158\":[[1,0.0000e+00,0.0000e+00,0.0000e+00],[2,3.1080e+02,2.1002e+00,1.5311e+01]]}"
        );
        let v: serde_json::Value = serde_json::from_str(&json).unwrap();
        let keys: Vec<&String> = v.as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 2);
    }

    #[test]
    fn empty_document_is_empty_object() {
        assert_eq!(to_json_string(&OutputDocument::new()).unwrap(), "{}");
    }

    #[test]
    fn non_finite_values_are_rejected() {
        let mut asm = RunAssembler::new();
        asm.push(1, summary(1, f64::NAN, 0.0, 0.0));
        assert!(to_json_string(&asm.finish()).is_err());
    }
}
