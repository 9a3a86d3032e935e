//! # lumi-pileup
//!
//! Per-lumi-section pileup summaries from per-bunch luminosity exports.
//!
//! Each data line of the export carries the run, lumi section, luminometer and
//! a list of `(bx, delivered, recorded)` triples. For every line the pipeline
//! computes the recorded-luminosity-weighted mean and RMS of the per-bunch
//! pileup, groups the results by run and renders them as a JSON object:
//!
//! ```text
//! {"273158":[[1,3.1080e+02,2.1002e+00,1.5311e+01],[2,...]],"273302":[...]}
//! ```
//!
//! Stages, in data-flow order:
//! - [`record`]: line tokenizer/parser
//! - [`aggregate`]: two-pass weighted mean/RMS per lumi section
//! - [`assembler`]: run grouping with synthetic boundary sections
//! - [`serialize`]: JSON rendering with `%.4e`-style numbers
//! - [`pipeline`]: drives the above over a line stream

#![warn(clippy::all)]

pub mod aggregate;
pub mod assembler;
pub mod filter;
pub mod pipeline;
pub mod record;
pub mod serialize;

pub use aggregate::{DEFAULT_THRESHOLD, HFOC_THRESHOLD, IntervalAggregator, channel_threshold};
pub use assembler::{OutputDocument, RunAssembler, RunSeries};
pub use filter::SlotFilter;
pub use pipeline::{PileupConfig, PileupPipeline, PileupReport, PipelineStats, build_pileup_document};
pub use record::{MIN_RECORD_TOKENS, ParsedLine, parse_line, tokenize};
pub use serialize::{format_scientific, to_json_string};
