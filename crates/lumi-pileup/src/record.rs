//! Record parser for per-bunch luminosity export lines.
//!
//! The export is nominally CSV, but the run/fill and lumi section pairs are
//! colon-joined and the per-bunch block is a bracketed, space-separated list:
//!
//! ```text
//! 273158:4915,1:1,05/13/16 22:28:43,STABLE BEAMS,6500,0.179,0.168,0.1,HFOC,[1 0.0012 0.0011 2 ...]
//! ```
//!
//! so the line is split on any run of whitespace, `,`, `;`, `:`, `[` or `]`.

use lumi_core::{BunchRecord, BunchSlot, Error, Result};

/// Minimum number of tokens in a record (everything up to the luminometer name).
pub const MIN_RECORD_TOKENS: usize = 15;

const RUN_TOKEN: usize = 0;
const INTERVAL_TOKEN: usize = 2;
const CHANNEL_TOKEN: usize = 14;
const DIAGNOSTIC_TOKENS: usize = 10;

/// Outcome of parsing a single line.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedLine {
    /// `#`-prefixed line.
    Comment,
    /// Empty or whitespace-only line.
    Blank,
    /// Successfully parsed data record.
    Record(BunchRecord),
    /// Enough tokens, but a field failed numeric conversion. The line is skipped.
    Malformed {
        /// The first ten raw tokens, for diagnostics.
        tokens: Vec<String>,
        /// What failed to convert.
        reason: String,
    },
}

fn is_separator(c: char) -> bool {
    c.is_whitespace() || matches!(c, ',' | ';' | ':' | '[' | ']')
}

/// Split a line on separator runs, dropping empty tokens.
pub fn tokenize(line: &str) -> Vec<&str> {
    line.split(is_separator).filter(|t| !t.is_empty()).collect()
}

/// Parse one raw input line.
///
/// Returns `Err(Error::MissingCrossingData)` when a non-comment line has fewer
/// than [`MIN_RECORD_TOKENS`] tokens; such input has no per-bunch data and the
/// caller is expected to abort.
pub fn parse_line(line: &str) -> Result<ParsedLine> {
    if line.starts_with('#') {
        return Ok(ParsedLine::Comment);
    }
    if line.trim().is_empty() {
        return Ok(ParsedLine::Blank);
    }

    let tokens = tokenize(line);
    if tokens.len() < MIN_RECORD_TOKENS {
        return Err(Error::MissingCrossingData {
            found: tokens.len(),
            required: MIN_RECORD_TOKENS,
            line: line.to_string(),
        });
    }

    match extract_record(&tokens) {
        Ok(record) => Ok(ParsedLine::Record(record)),
        Err(reason) => Ok(ParsedLine::Malformed {
            tokens: tokens.iter().take(DIAGNOSTIC_TOKENS).map(|t| t.to_string()).collect(),
            reason,
        }),
    }
}

fn extract_record(tokens: &[&str]) -> std::result::Result<BunchRecord, String> {
    let run = parse_id(tokens[RUN_TOKEN], "run")?;
    let interval = parse_id(tokens[INTERVAL_TOKEN], "lumi section")?;
    let channel = tokens[CHANNEL_TOKEN].to_string();

    // Incomplete trailing triples are ignored.
    let slots = tokens[MIN_RECORD_TOKENS..]
        .chunks_exact(3)
        .map(|t| -> std::result::Result<BunchSlot, String> {
            Ok(BunchSlot::new(
                parse_id(t[0], "bx")?,
                parse_value(t[1], "bunch delivered")?,
                parse_value(t[2], "bunch recorded")?,
            ))
        })
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(BunchRecord { run, interval, channel, slots })
}

fn parse_id(token: &str, what: &str) -> std::result::Result<u32, String> {
    token.parse::<u32>().map_err(|e| format!("bad {what} '{token}': {e}"))
}

fn parse_value(token: &str, what: &str) -> std::result::Result<f64, String> {
    let v = token.parse::<f64>().map_err(|e| format!("bad {what} '{token}': {e}"))?;
    if !v.is_finite() {
        return Err(format!("bad {what} '{token}': not finite"));
    }
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "273158:4915,12:12,05/13/16 22:28:43,STABLE BEAMS,6500,0.179,0.168,0.1,HFOC";

    fn record(line: &str) -> BunchRecord {
        match parse_line(line).unwrap() {
            ParsedLine::Record(r) => r,
            other => panic!("expected record, got {other:?}"),
        }
    }

    #[test]
    fn tokenize_collapses_separator_runs() {
        assert_eq!(tokenize("1:2,, [3  4];5"), vec!["1", "2", "3", "4", "5"]);
        assert_eq!(tokenize("[1 2]"), vec!["1", "2"]);
        assert!(tokenize(" ,;: ").is_empty());
    }

    #[test]
    fn header_has_exactly_fifteen_tokens() {
        assert_eq!(tokenize(HEADER).len(), MIN_RECORD_TOKENS);
    }

    #[test]
    fn parses_header_fields_and_triples() {
        let r = record(&format!("{HEADER},[1 10.5 9.5 2 0.25 0.2]"));
        assert_eq!(r.run, 273158);
        assert_eq!(r.interval, 12);
        assert_eq!(r.channel, "HFOC");
        assert_eq!(r.slots, vec![BunchSlot::new(1, 10.5, 9.5), BunchSlot::new(2, 0.25, 0.2)]);
    }

    #[test]
    fn record_without_slots_is_valid() {
        let r = record(HEADER);
        assert!(r.slots.is_empty());
    }

    #[test]
    fn incomplete_trailing_triple_is_ignored() {
        let r = record(&format!("{HEADER},[1 10.5 9.5 2 0.25]"));
        assert_eq!(r.slots.len(), 1);
    }

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        assert_eq!(parse_line("#run:fill,ls,time").unwrap(), ParsedLine::Comment);
        assert_eq!(parse_line("").unwrap(), ParsedLine::Blank);
        assert_eq!(parse_line("   \t").unwrap(), ParsedLine::Blank);
    }

    #[test]
    fn short_line_is_fatal() {
        let line = "273158:4915,12:12,05/13/16 22:28:43,STABLE BEAMS";
        match parse_line(line) {
            Err(Error::MissingCrossingData { found, required, line: l }) => {
                assert_eq!(found, 10);
                assert_eq!(required, MIN_RECORD_TOKENS);
                assert_eq!(l, line);
            }
            other => panic!("expected MissingCrossingData, got {other:?}"),
        }
    }

    #[test]
    fn bad_number_is_recoverable() {
        let line = HEADER.replacen("12:12", "xx:12", 1);
        match parse_line(&line).unwrap() {
            ParsedLine::Malformed { tokens, reason } => {
                assert_eq!(tokens.len(), 10);
                assert_eq!(tokens[0], "273158");
                assert!(reason.contains("lumi section"), "{reason}");
            }
            other => panic!("expected Malformed, got {other:?}"),
        }
    }

    #[test]
    fn bad_bunch_value_is_recoverable() {
        let line = format!("{HEADER},[1 abc 9.5]");
        assert!(matches!(parse_line(&line).unwrap(), ParsedLine::Malformed { .. }));
        let line = format!("{HEADER},[1 nan 9.5]");
        assert!(matches!(parse_line(&line).unwrap(), ParsedLine::Malformed { .. }));
    }
}
