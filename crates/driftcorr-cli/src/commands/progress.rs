use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Result;
use driftcorr_core::pipeline::{PipelineStage, ProgressReporter};
use indicatif::{ProgressBar, ProgressStyle};

/// Drives one progress bar across pipeline stages.
pub struct BarReporter {
    pb: ProgressBar,
    /// Highest item count seen in the current stage.
    done: AtomicUsize,
}

impl BarReporter {
    pub fn new() -> Result<Self> {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{msg:24} [{bar:40}] {pos}/{len}")?
                .progress_chars("=> "),
        );
        Ok(Self {
            pb,
            done: AtomicUsize::new(0),
        })
    }

    pub fn finish(&self) {
        self.pb.finish_and_clear();
    }
}

impl ProgressReporter for BarReporter {
    fn begin_stage(&self, stage: PipelineStage, total_items: Option<usize>) {
        self.done.store(0, Ordering::Relaxed);
        self.pb.set_message(stage.to_string());
        self.pb.set_length(total_items.unwrap_or(1) as u64);
        self.pb.set_position(0);
    }

    // Counts may arrive out of order from worker threads; only the gain over
    // the highest count so far moves the bar.
    fn advance(&self, items_done: usize) {
        let prev = self.done.fetch_max(items_done, Ordering::Relaxed);
        if items_done > prev {
            self.pb.inc((items_done - prev) as u64);
        }
    }

    fn finish_stage(&self) {
        if let Some(len) = self.pb.length() {
            self.pb.set_position(len);
        }
    }
}
