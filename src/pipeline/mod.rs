// Fetch-aggregation pipeline: enumerate -> queue -> worker pool -> overrides -> writer

pub mod queue;
pub mod results;
pub mod worker;

pub use queue::{JobQueue, QueueItem};
pub use results::{apply_overrides, ResultMap};
pub use worker::{JobOutcome, Worker, WorkerContext, WorkerStats};

use crate::app::ports::{CatalogPort, NameMapWriter, ProgressSink};
use crate::catalog::enumerate_jobs;
use crate::config::Config;
use crate::constants::STATIC_OVERRIDES;
use crate::error::{CatalogError, Result};
use crate::types::{Category, FetchJob, NameMap};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{info, instrument};

/// Knobs the pipeline needs, lifted out of `Config`.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub base_url: String,
    pub locale: String,
    pub categories: Vec<Category>,
    pub list_limit: u32,
    pub concurrency: usize,
    pub queue_capacity: Option<usize>,
    pub log_dropped_jobs: bool,
    /// Added after the static overrides, same add-if-absent rule.
    pub extra_overrides: Vec<(String, String)>,
}

impl From<&Config> for PipelineSettings {
    fn from(config: &Config) -> Self {
        Self {
            base_url: config.base_url.clone(),
            locale: config.locale.clone(),
            categories: config.categories.clone(),
            list_limit: config.list_limit,
            concurrency: config.concurrency,
            queue_capacity: config.queue_capacity,
            log_dropped_jobs: config.log_dropped_jobs,
            extra_overrides: config
                .overrides
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }
}

/// Result of a complete run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub total_jobs: usize,
    pub written: usize,
    pub no_name: usize,
    pub dropped: usize,
    pub overrides_applied: usize,
    pub entries: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    pub fn duration_secs(&self) -> f64 {
        (self.finished_at - self.started_at).num_milliseconds() as f64 / 1000.0
    }
}

pub struct Pipeline {
    settings: PipelineSettings,
    catalog: Arc<dyn CatalogPort>,
}

impl Pipeline {
    pub fn new(settings: PipelineSettings, catalog: Arc<dyn CatalogPort>) -> Self {
        Self { settings, catalog }
    }

    /// List every configured category. Any listing failure is fatal.
    pub async fn enumerate(&self) -> Result<Vec<FetchJob>> {
        enumerate_jobs(
            &*self.catalog,
            &self.settings.base_url,
            &self.settings.categories,
            self.settings.list_limit,
        )
        .await
    }

    /// Run the worker pool over `jobs` and return the fetched names in
    /// enumeration order, before overrides.
    #[instrument(skip_all, fields(jobs = jobs.len(), workers = self.settings.concurrency))]
    pub async fn fetch_names(
        &self,
        jobs: Vec<FetchJob>,
        progress: Arc<dyn ProgressSink>,
    ) -> Result<(NameMap, WorkerStats)> {
        let workers = self.settings.concurrency.max(1);
        let queue = Arc::new(match self.settings.queue_capacity {
            Some(capacity) => JobQueue::bounded(capacity),
            None => JobQueue::unbounded(),
        });
        let results = Arc::new(ResultMap::new());
        let ctx = WorkerContext {
            catalog: self.catalog.clone(),
            queue: queue.clone(),
            results: results.clone(),
            progress,
            locale: Arc::from(self.settings.locale.as_str()),
            log_dropped_jobs: self.settings.log_dropped_jobs,
        };

        // Workers start before seeding so a bounded queue cannot stall.
        let mut pool = JoinSet::new();
        for id in 0..workers {
            pool.spawn(Worker::new(id, ctx.clone()).run());
        }
        drop(ctx);

        // Seeding runs alongside the watch on the pool: with a bounded queue a
        // dead pool would otherwise leave `enqueue` waiting for a slot forever.
        let seed = {
            let queue = queue.clone();
            async move {
                for job in jobs {
                    queue.enqueue(QueueItem::Job(job)).await?;
                }
                for _ in 0..workers {
                    queue.enqueue(QueueItem::Stop).await?;
                }
                Ok::<(), CatalogError>(())
            }
        };
        tokio::pin!(seed);
        let mut seeded = false;

        let mut stats = WorkerStats::default();
        // Wait on the queue while watching for a worker that dies early, which
        // would otherwise leave the join waiting forever.
        loop {
            tokio::select! {
                seeding = &mut seed, if !seeded => {
                    seeding?;
                    seeded = true;
                }
                joined = queue.join(), if seeded => {
                    joined?;
                    break;
                }
                finished = pool.join_next() => match finished {
                    Some(res) => stats += worker_result(res)?,
                    None => break,
                },
            }
        }
        while let Some(res) = pool.join_next().await {
            stats += worker_result(res)?;
        }

        let results = Arc::try_unwrap(results)
            .map_err(|_| CatalogError::Worker("result map still shared after shutdown".to_string()))?;
        Ok((results.into_names(), stats))
    }

    /// Enumerate, fetch, apply overrides and hand the table to `writer`.
    ///
    /// `make_progress` receives the job total once it is known.
    pub async fn run<F>(&self, writer: &dyn NameMapWriter, make_progress: F) -> Result<RunReport>
    where
        F: FnOnce(u64) -> Arc<dyn ProgressSink>,
    {
        let started_at = Utc::now();
        info!("🚀 Starting {} name aggregation from {}", self.settings.locale, self.settings.base_url);

        let jobs = self.enumerate().await?;
        let total_jobs = jobs.len();
        info!("📡 Enumerated {} fetch jobs", total_jobs);

        let progress = make_progress(total_jobs as u64);
        let (mut names, stats) = self.fetch_names(jobs, progress.clone()).await?;
        progress.finish();
        info!(
            "✅ Fetched {} names ({} without a {} name, {} dropped)",
            stats.written, stats.no_name, self.settings.locale, stats.dropped
        );

        let overrides_applied = apply_overrides(
            &mut names,
            STATIC_OVERRIDES.iter().copied().chain(
                self.settings
                    .extra_overrides
                    .iter()
                    .map(|(k, v)| (k.as_str(), v.as_str())),
            ),
        );

        writer.write(&names)?;
        info!("💾 Saved {} entries", names.len());

        Ok(RunReport {
            total_jobs,
            written: stats.written,
            no_name: stats.no_name,
            dropped: stats.dropped,
            overrides_applied,
            entries: names.len(),
            started_at,
            finished_at: Utc::now(),
        })
    }
}

fn worker_result(
    res: std::result::Result<Result<WorkerStats>, tokio::task::JoinError>,
) -> Result<WorkerStats> {
    res.map_err(|e| CatalogError::Worker(e.to_string()))?
}
