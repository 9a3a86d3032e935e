//! Line-driven pipeline: parse → aggregate → assemble.

use std::io::BufRead;

use lumi_core::{LumiConstants, Result};

use crate::aggregate::IntervalAggregator;
use crate::assembler::{OutputDocument, RunAssembler};
use crate::filter::SlotFilter;
use crate::record::{ParsedLine, parse_line};

/// Pipeline configuration, fixed for one pass.
#[derive(Debug, Clone, Default)]
pub struct PileupConfig {
    /// Bunch selection (empty = all bunches).
    pub slot_filter: SlotFilter,
    /// Facility timing constants.
    pub constants: LumiConstants,
}

impl PileupConfig {
    /// Config with LHC timing and the given bunch selection.
    pub fn with_filter(slot_filter: SlotFilter) -> Self {
        Self { slot_filter, constants: LumiConstants::lhc() }
    }
}

/// Counters collected over one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// Lines consumed, including comments and blanks.
    pub lines: usize,
    /// `#` lines.
    pub comments: usize,
    /// Whitespace-only lines.
    pub blank: usize,
    /// Records skipped because a field did not convert.
    pub malformed: usize,
    /// Interval summaries produced (synthetic entries excluded).
    pub intervals: usize,
    /// Run openings.
    pub runs: usize,
    /// Bunches flagged with pileup > 100.
    pub implausible_slots: usize,
}

/// Result of a complete pass.
#[derive(Debug, Clone)]
pub struct PileupReport {
    /// Run → lumi section document.
    pub document: OutputDocument,
    /// Pass statistics.
    pub stats: PipelineStats,
}

/// Incremental pipeline; feed lines in input order, then call [`finish`](Self::finish).
#[derive(Debug, Clone)]
pub struct PileupPipeline {
    aggregator: IntervalAggregator,
    assembler: RunAssembler,
    stats: PipelineStats,
}

impl PileupPipeline {
    /// Create a pipeline.
    pub fn new(config: PileupConfig) -> Self {
        Self {
            aggregator: IntervalAggregator::new(config.constants, config.slot_filter),
            assembler: RunAssembler::new(),
            stats: PipelineStats::default(),
        }
    }

    /// Process one raw line.
    ///
    /// Returns an error only for fatal input (a record without per-bunch
    /// data); malformed records are logged and skipped.
    pub fn process_line(&mut self, line: &str) -> Result<()> {
        self.stats.lines += 1;
        match parse_line(line)? {
            ParsedLine::Comment => self.stats.comments += 1,
            ParsedLine::Blank => self.stats.blank += 1,
            ParsedLine::Malformed { tokens, reason } => {
                self.stats.malformed += 1;
                tracing::warn!(
                    line = self.stats.lines,
                    %reason,
                    "failed to parse line, check if the input format has changed: {}",
                    tokens.join(" "),
                );
            }
            ParsedLine::Record(record) => {
                let summary = self.aggregator.aggregate(&record);
                if !summary.is_finite() {
                    self.stats.malformed += 1;
                    tracing::warn!(
                        line = self.stats.lines,
                        run = record.run,
                        ls = summary.interval,
                        "skipping lumi section: luminosity sums overflowed to a non-finite value"
                    );
                    return Ok(());
                }
                tracing::debug!(
                    run = record.run,
                    ls = summary.interval,
                    filled = summary.filled_slots,
                    mean = summary.mean_pileup,
                    rms = summary.rms_pileup,
                    "lumi section"
                );
                self.stats.intervals += 1;
                self.stats.implausible_slots += summary.implausible_slots;
                self.assembler.push(record.run, summary);
            }
        }
        Ok(())
    }

    /// Close the last run and return the document.
    pub fn finish(self) -> PileupReport {
        let mut stats = self.stats;
        stats.runs = self.assembler.runs_opened();
        PileupReport { document: self.assembler.finish(), stats }
    }
}

/// Run the whole pipeline over `reader`.
pub fn build_pileup_document<R: BufRead>(reader: R, config: PileupConfig) -> Result<PileupReport> {
    let mut pipeline = PileupPipeline::new(config);
    for line in reader.lines() {
        pipeline.process_line(&line?)?;
    }
    let report = pipeline.finish();
    tracing::info!(
        lines = report.stats.lines,
        intervals = report.stats.intervals,
        runs = report.stats.runs,
        malformed = report.stats.malformed,
        "input processed"
    );
    Ok(report)
}
