use crate::app::ports::ProgressSink;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::LazyLock;

/// Every terminal bar is drawn through this handle so console log lines can
/// be printed around it with [`MultiProgress::suspend`].
pub static CONSOLE: LazyLock<MultiProgress> = LazyLock::new(MultiProgress::new);

/// Terminal progress bar.
pub struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    pub fn new(total: u64, locale: &str) -> Self {
        let bar = CONSOLE.add(ProgressBar::new(total));
        let style = ProgressStyle::default_bar()
            .template("{msg} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ");
        bar.set_style(style);
        bar.set_message(format!("Fetching {} names", locale.to_uppercase()));
        Self { bar }
    }
}

impl ProgressSink for BarProgress {
    fn inc(&self, delta: u64) {
        self.bar.inc(delta);
    }

    fn finish(&self) {
        self.bar.finish();
    }
}

/// Counts increments without drawing anything.
#[derive(Debug, Default)]
pub struct CountingProgress {
    count: AtomicU64,
}

impl CountingProgress {
    pub fn count(&self) -> u64 {
        self.count.load(Ordering::SeqCst)
    }
}

impl ProgressSink for CountingProgress {
    fn inc(&self, delta: u64) {
        self.count.fetch_add(delta, Ordering::SeqCst);
    }
}
