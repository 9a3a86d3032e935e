//! Run grouping.
//!
//! Consecutive interval summaries with the same run id form one [`RunSeries`].
//! Two synthetic zero-valued lumi sections are injected:
//! - `[1, 0, 0, 0]` when a run opens at lumi section 2 (LS 1 is commonly
//!   missing from the export);
//! - `[last + 1, 0, 0, 0]` when a run is closed by the start of a different run.
//!
//! The run closed by end of input gets no trailing entry.

use std::collections::HashMap;

use lumi_core::IntervalSummary;

/// Lumi section that, when first in a run, implies a missing section 1.
const FIRST_SECTION_MISSING_AT: u32 = 2;

/// All lumi sections of one run, in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSeries {
    /// Run number
    pub run: u32,
    /// Lumi section summaries, including synthetic boundary entries.
    pub intervals: Vec<IntervalSummary>,
}

/// Ordered mapping run → series. Runs keep the order they first appeared in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutputDocument {
    runs: Vec<RunSeries>,
    index: HashMap<u32, usize>,
}

impl OutputDocument {
    /// Empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs in first-seen order.
    pub fn runs(&self) -> &[RunSeries] {
        &self.runs
    }

    /// Series for `run`, if present.
    pub fn get(&self, run: u32) -> Option<&RunSeries> {
        self.index.get(&run).map(|&i| &self.runs[i])
    }

    /// Number of runs.
    pub fn len(&self) -> usize {
        self.runs.len()
    }

    /// True if no run has been recorded.
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Returns the series for `run` and whether it was newly created.
    fn open(&mut self, run: u32) -> (&mut RunSeries, bool) {
        let existing = self.index.get(&run).copied();
        match existing {
            Some(i) => (&mut self.runs[i], false),
            None => {
                self.index.insert(run, self.runs.len());
                self.runs.push(RunSeries { run, intervals: Vec::new() });
                let last = self.runs.len() - 1;
                (&mut self.runs[last], true)
            }
        }
    }

    fn series_mut(&mut self, run: u32) -> Option<&mut RunSeries> {
        let i = *self.index.get(&run)?;
        self.runs.get_mut(i)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AssemblerState {
    NoActiveRun,
    ActiveRun { run: u32, last_interval: u32 },
}

/// State machine building an [`OutputDocument`] from summaries in input order.
#[derive(Debug, Clone)]
pub struct RunAssembler {
    state: AssemblerState,
    document: OutputDocument,
    runs_opened: usize,
}

impl Default for RunAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl RunAssembler {
    /// Start with no active run.
    pub fn new() -> Self {
        Self { state: AssemblerState::NoActiveRun, document: OutputDocument::new(), runs_opened: 0 }
    }

    /// Run currently receiving summaries.
    pub fn active_run(&self) -> Option<u32> {
        match self.state {
            AssemblerState::NoActiveRun => None,
            AssemblerState::ActiveRun { run, .. } => Some(run),
        }
    }

    /// Number of run transitions seen, counting the first run.
    pub fn runs_opened(&self) -> usize {
        self.runs_opened
    }

    /// Feed one summary produced by a record of `run`.
    pub fn push(&mut self, run: u32, summary: IntervalSummary) {
        match self.state {
            AssemblerState::ActiveRun { run: active, .. } if active == run => {}
            AssemblerState::ActiveRun { run: active, last_interval } => {
                self.close(active, last_interval);
                self.open(run, summary.interval);
            }
            AssemblerState::NoActiveRun => self.open(run, summary.interval),
        }

        if let Some(series) = self.document.series_mut(run) {
            series.intervals.push(summary);
        }
        self.state = AssemblerState::ActiveRun { run, last_interval: summary.interval };
    }

    /// End of input. The active run is closed without a trailing entry.
    pub fn finish(self) -> OutputDocument {
        self.document
    }

    fn open(&mut self, run: u32, first_interval: u32) {
        self.runs_opened += 1;
        let (series, created) = self.document.open(run);
        if !created {
            tracing::warn!(run, "run reappears after a different run; appending to its series");
            return;
        }
        if first_interval == FIRST_SECTION_MISSING_AT {
            series.intervals.push(IntervalSummary::empty(1));
        }
    }

    fn close(&mut self, run: u32, last_interval: u32) {
        if let Some(series) = self.document.series_mut(run) {
            series.intervals.push(IntervalSummary::empty(last_interval.saturating_add(1)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(interval: u32) -> IntervalSummary {
        IntervalSummary {
            interval,
            total_recorded: 1.0,
            rms_pileup: 0.5,
            mean_pileup: 20.0,
            filled_slots: 2,
            implausible_slots: 0,
        }
    }

    fn intervals(doc: &OutputDocument, run: u32) -> Vec<(u32, bool)> {
        doc.get(run).unwrap().intervals.iter().map(|s| (s.interval, s.is_empty())).collect()
    }

    #[test]
    fn boundary_entries_between_runs_only() {
        let mut asm = RunAssembler::new();
        asm.push(100, summary(2));
        asm.push(100, summary(3));
        asm.push(101, summary(5));
        let doc = asm.finish();

        assert_eq!(doc.runs().iter().map(|r| r.run).collect::<Vec<_>>(), vec![100, 101]);
        assert_eq!(intervals(&doc, 100), vec![(1, true), (2, false), (3, false), (4, true)]);
        assert_eq!(intervals(&doc, 101), vec![(5, false)]);
    }

    #[test]
    fn missing_first_section_only_at_run_open() {
        let mut asm = RunAssembler::new();
        asm.push(100, summary(1));
        asm.push(100, summary(2));
        let doc = asm.finish();
        assert_eq!(intervals(&doc, 100), vec![(1, false), (2, false)]);
    }

    #[test]
    fn state_tracks_active_run() {
        let mut asm = RunAssembler::new();
        assert_eq!(asm.active_run(), None);
        asm.push(7, summary(1));
        assert_eq!(asm.active_run(), Some(7));
        asm.push(8, summary(1));
        assert_eq!(asm.active_run(), Some(8));
        assert_eq!(asm.runs_opened(), 2);
    }

    #[test]
    fn empty_input_gives_empty_document() {
        assert!(RunAssembler::new().finish().is_empty());
    }

    #[test]
    fn reappearing_run_is_merged() {
        let mut asm = RunAssembler::new();
        asm.push(100, summary(2));
        asm.push(101, summary(1));
        asm.push(100, summary(9));
        let doc = asm.finish();

        assert_eq!(doc.len(), 2);
        assert_eq!(intervals(&doc, 100), vec![(1, true), (2, false), (3, true), (9, false)]);
        assert_eq!(intervals(&doc, 101), vec![(1, false), (2, true)]);
    }
}
