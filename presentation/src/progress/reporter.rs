//! Progress reporting for scoring runs

use colored::Colorize;
use crowdcontrol_application::{ScoringPhase, ScoringProgress};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::{Mutex, PoisonError};

/// Reports progress during a scoring run with progress bars
pub struct ProgressReporter {
    multi: MultiProgress,
    phase_bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            phase_bar: Mutex::new(None),
        }
    }

    fn phase_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn phase_number(phase: ScoringPhase) -> u8 {
        match phase {
            ScoringPhase::Duplicates => 1,
            ScoringPhase::Ratings => 2,
            ScoringPhase::Answers => 3,
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoringProgress for ProgressReporter {
    fn on_phase_start(&self, phase: ScoringPhase, total: usize) {
        let pb = self.multi.add(ProgressBar::new(total as u64));
        pb.set_style(Self::phase_style());
        pb.set_prefix(format!("Phase {}: {}", Self::phase_number(phase), phase));
        pb.set_message("Starting...");

        *self.phase_bar.lock().unwrap_or_else(PoisonError::into_inner) = Some(pb);
    }

    fn on_item_complete(&self, _phase: ScoringPhase, success: bool) {
        if let Some(pb) = self
            .phase_bar
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            if !success {
                pb.set_message(format!("{}", "failure".red()));
            }
            pb.inc(1);
        }
    }

    fn on_phase_complete(&self, phase: ScoringPhase) {
        if let Some(pb) = self
            .phase_bar
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            pb.finish_with_message(format!(
                "{} complete!",
                format!("Phase {}", Self::phase_number(phase)).green()
            ));
        }
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl ScoringProgress for SimpleProgress {
    fn on_phase_start(&self, phase: ScoringPhase, total: usize) {
        eprintln!("{} {} ({} answers)", "->".cyan(), phase.display_name().bold(), total);
    }

    fn on_item_complete(&self, _phase: ScoringPhase, success: bool) {
        if !success {
            eprintln!("  {} answer failed", "x".red());
        }
    }

    fn on_phase_complete(&self, _phase: ScoringPhase) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reporter_runs_through_phases() {
        let reporter = ProgressReporter::new();
        for phase in [ScoringPhase::Duplicates, ScoringPhase::Ratings, ScoringPhase::Answers] {
            reporter.on_phase_start(phase, 2);
            reporter.on_item_complete(phase, true);
            reporter.on_item_complete(phase, false);
            reporter.on_phase_complete(phase);
        }
        assert!(reporter.phase_bar.lock().unwrap().is_none());
    }

    #[test]
    fn test_item_without_phase_is_ignored() {
        let reporter = ProgressReporter::default();
        reporter.on_item_complete(ScoringPhase::Answers, true);
        reporter.on_phase_complete(ScoringPhase::Answers);
    }
}
