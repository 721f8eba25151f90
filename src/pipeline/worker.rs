use crate::app::ports::{CatalogPort, ProgressSink};
use crate::error::{CatalogError, Result};
use crate::locale::{extract, names_from_detail};
use crate::pipeline::queue::{JobQueue, QueueItem};
use crate::pipeline::results::ResultMap;
use crate::types::FetchJob;
use metrics::counter;
use std::ops::AddAssign;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// What happened to a single job.
#[derive(Debug)]
pub enum JobOutcome {
    Written,
    /// Fetched, but no usable name for the locale.
    NoName,
    /// Request or decoding failed; the job is dropped.
    Dropped(CatalogError),
}

/// Per-worker tallies, summed by the driver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    pub processed: usize,
    pub written: usize,
    pub no_name: usize,
    pub dropped: usize,
}

impl AddAssign for WorkerStats {
    fn add_assign(&mut self, other: Self) {
        self.processed += other.processed;
        self.written += other.written;
        self.no_name += other.no_name;
        self.dropped += other.dropped;
    }
}

impl WorkerStats {
    fn record(&mut self, outcome: &JobOutcome) {
        self.processed += 1;
        match outcome {
            JobOutcome::Written => self.written += 1,
            JobOutcome::NoName => self.no_name += 1,
            JobOutcome::Dropped(_) => self.dropped += 1,
        }
    }
}

/// Everything a worker shares with its siblings.
#[derive(Clone)]
pub struct WorkerContext {
    pub catalog: Arc<dyn CatalogPort>,
    pub queue: Arc<JobQueue>,
    pub results: Arc<ResultMap>,
    pub progress: Arc<dyn ProgressSink>,
    pub locale: Arc<str>,
    pub log_dropped_jobs: bool,
}

pub struct Worker {
    id: usize,
    ctx: WorkerContext,
}

impl Worker {
    pub fn new(id: usize, ctx: WorkerContext) -> Self {
        Self { id, ctx }
    }

    /// Drain the queue until this worker receives its stop signal.
    ///
    /// Per-job failures are absorbed; only queue errors end the loop early.
    #[instrument(skip(self), fields(worker = self.id))]
    pub async fn run(self) -> Result<WorkerStats> {
        let mut stats = WorkerStats::default();
        loop {
            match self.ctx.queue.dequeue().await? {
                QueueItem::Stop => {
                    self.ctx.queue.mark_done()?;
                    debug!(?stats, "worker stopping");
                    return Ok(stats);
                }
                QueueItem::Job(job) => {
                    let outcome = self.process(&job).await;
                    self.report(&job, &outcome);
                    stats.record(&outcome);
                    self.ctx.progress.inc(1);
                    self.ctx.queue.mark_done()?;
                }
            }
        }
    }

    async fn process(&self, job: &FetchJob) -> JobOutcome {
        let detail = match self.ctx.catalog.get_json(&job.url).await {
            Ok(detail) => detail,
            Err(e) => return JobOutcome::Dropped(e),
        };
        match extract(&names_from_detail(&detail), &self.ctx.locale) {
            Some(name) if !name.is_empty() => {
                self.ctx
                    .results
                    .insert(job.seq, job.key.clone(), name)
                    .await;
                JobOutcome::Written
            }
            _ => JobOutcome::NoName,
        }
    }

    fn report(&self, job: &FetchJob, outcome: &JobOutcome) {
        match outcome {
            JobOutcome::Written => {
                counter!("dex_jobs_total", "outcome" => "written").increment(1);
                debug!(key = %job.key, "name written");
            }
            JobOutcome::NoName => {
                counter!("dex_jobs_total", "outcome" => "no_name").increment(1);
                debug!(key = %job.key, locale = %self.ctx.locale, "no localized name");
            }
            JobOutcome::Dropped(e) => {
                counter!("dex_jobs_total", "outcome" => "dropped").increment(1);
                if self.ctx.log_dropped_jobs {
                    warn!(key = %job.key, url = %job.url, category = %job.category, "job dropped: {}", e);
                } else {
                    debug!(key = %job.key, url = %job.url, "job dropped: {}", e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::progress::CountingProgress;
    use crate::types::Category;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::collections::HashMap;

    struct FakeCatalog(HashMap<String, Value>);

    #[async_trait]
    impl CatalogPort for FakeCatalog {
        async fn get_json(&self, url: &str) -> Result<Value> {
            self.0
                .get(url)
                .cloned()
                .ok_or_else(|| CatalogError::MissingField(format!("404 {url}")))
        }
    }

    fn job(seq: usize, key: &str) -> FetchJob {
        FetchJob {
            seq,
            key: key.to_string(),
            url: format!("http://cat/{key}/"),
            category: Category::Species,
        }
    }

    fn context(details: Vec<(&str, Value)>) -> (WorkerContext, Arc<CountingProgress>) {
        let progress = Arc::new(CountingProgress::default());
        let ctx = WorkerContext {
            catalog: Arc::new(FakeCatalog(
                details
                    .into_iter()
                    .map(|(k, v)| (format!("http://cat/{k}/"), v))
                    .collect(),
            )),
            queue: Arc::new(JobQueue::unbounded()),
            results: Arc::new(ResultMap::new()),
            progress: progress.clone(),
            locale: Arc::from("fr"),
            log_dropped_jobs: true,
        };
        (ctx, progress)
    }

    #[tokio::test]
    async fn test_worker_tallies_each_outcome_and_stops() {
        let (ctx, progress) = context(vec![
            (
                "pikachu",
                json!({ "names": [
                    { "language": { "name": "ja" }, "name": "ピカチュウ" },
                    { "language": { "name": "fr" }, "name": "Pikachu" }
                ]}),
            ),
            ("unown", json!({ "names": [] })),
            ("blank", json!({ "names": [{ "language": { "name": "fr" }, "name": "" }] })),
        ]);
        for (seq, key) in ["pikachu", "unown", "groudon", "blank"].iter().enumerate() {
            ctx.queue.enqueue(QueueItem::Job(job(seq, key))).await.unwrap();
        }
        ctx.queue.enqueue(QueueItem::Stop).await.unwrap();

        let stats = Worker::new(0, ctx.clone()).run().await.unwrap();
        assert_eq!(
            stats,
            WorkerStats { processed: 4, written: 1, no_name: 2, dropped: 1 }
        );
        assert_eq!(progress.count(), 4);
        assert_eq!(ctx.queue.unfinished(), 0);
        assert_eq!(ctx.results.len().await, 1);
    }

    #[tokio::test]
    async fn test_worker_leaves_items_after_its_stop_signal() {
        let (ctx, progress) = context(vec![]);
        ctx.queue.enqueue(QueueItem::Stop).await.unwrap();
        ctx.queue.enqueue(QueueItem::Job(job(0, "late"))).await.unwrap();

        let stats = Worker::new(1, ctx.clone()).run().await.unwrap();
        assert_eq!(stats.processed, 0);
        assert_eq!(progress.count(), 0);
        assert_eq!(ctx.queue.len(), 1);
        assert_eq!(ctx.queue.unfinished(), 1);
    }
}
