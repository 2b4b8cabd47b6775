//! Checkpointed batch scheduler.
//!
//! Each run processes at most `batch_size` packages starting at the persisted
//! checkpoint, stops early once the deadline has passed, and saves the index
//! of the next package after every attempted item. Reaching the end of the
//! list resets the checkpoint to 0 for the next pass.

use crate::cache::ArtifactCache;
use crate::checkpoint::CheckpointStore;
use crate::error::SkipReason;
use crate::extract::SymbolExtractor;
use crate::model::RunSummary;
use crate::registry::{ArchiveUnpacker, ArtifactFetcher, MetadataResolver};
use crate::util;
use crate::version::{encode_version, preserves_ordering};
use anyhow::{Context, Result};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SchedulerConfig {
    /// Maximum number of packages attempted in one run.
    pub batch_size: usize,
    /// No new item is started at or after this instant.
    pub deadline: Instant,
}

/// External collaborators one item passes through.
pub struct Collaborators {
    pub resolver: Box<dyn MetadataResolver>,
    pub fetcher: Box<dyn ArtifactFetcher>,
    pub unpacker: Box<dyn ArchiveUnpacker>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Written { path: PathBuf, symbols: usize },
    Cached { encoded_version: String },
}

pub struct BatchScheduler {
    config: SchedulerConfig,
    clock: Box<dyn Clock>,
    collaborators: Collaborators,
    extractor: SymbolExtractor,
    cache: ArtifactCache,
    checkpoint: CheckpointStore,
}

impl BatchScheduler {
    pub fn new(
        config: SchedulerConfig,
        cache: ArtifactCache,
        checkpoint: CheckpointStore,
        collaborators: Collaborators,
    ) -> Result<Self> {
        Ok(Self {
            config,
            clock: Box::new(SystemClock),
            collaborators,
            extractor: SymbolExtractor::new()?,
            cache,
            checkpoint,
        })
    }

    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn run(&mut self, packages: &[String]) -> Result<RunSummary> {
        let total = packages.len();
        let start = self.checkpoint.load();
        let end = start.saturating_add(self.config.batch_size.max(1)).min(total);
        let mut summary = RunSummary {
            total,
            start,
            ..Default::default()
        };
        info!(start, end, total, "starting batch");

        let mut next = start;
        for (index, package) in packages.iter().enumerate().take(end).skip(start) {
            if self.clock.now() >= self.config.deadline {
                warn!(index, package = %package, "time budget exhausted, stopping");
                summary.time_limited = true;
                break;
            }

            info!(index, package = %package, "processing");
            summary.attempted += 1;
            match self.process_guarded(package) {
                Ok(Outcome::Written { path, symbols }) => {
                    summary.written += 1;
                    info!(package = %package, symbols, "saved {}", path.display());
                }
                Ok(Outcome::Cached { encoded_version }) => {
                    summary.cached += 1;
                    info!(package = %package, version = %encoded_version, "already exists");
                }
                Err(reason) => {
                    summary.skipped += 1;
                    warn!(package = %package, reason = reason.label(), "skipped: {reason}");
                }
            }

            next = index + 1;
            self.checkpoint
                .save(next)
                .with_context(|| format!("save checkpoint {next}"))?;
        }

        if next >= total {
            self.checkpoint.reset().context("reset checkpoint")?;
            summary.pass_completed = true;
            summary.next_checkpoint = 0;
        } else {
            summary.next_checkpoint = next;
        }

        info!(
            attempted = summary.attempted,
            written = summary.written,
            cached = summary.cached,
            skipped = summary.skipped,
            next = summary.next_checkpoint,
            time_limited = summary.time_limited,
            pass_completed = summary.pass_completed,
            "batch finished"
        );
        Ok(summary)
    }

    /// [`process_item`](Self::process_item) with panics turned into skips.
    fn process_guarded(&mut self, package: &str) -> Result<Outcome, SkipReason> {
        match panic::catch_unwind(AssertUnwindSafe(|| self.process_item(package))) {
            Ok(result) => result,
            Err(payload) => Err(SkipReason::Unexpected(panic_message(payload.as_ref()))),
        }
    }

    /// Resolve, check the cache, fetch, unpack, extract and record one package.
    pub fn process_item(&mut self, package: &str) -> Result<Outcome, SkipReason> {
        // Record names must map back to exactly one package.
        if !util::is_safe_file_component(package) {
            return Err(SkipReason::InvalidName);
        }
        let version = self
            .collaborators
            .resolver
            .resolve(package)
            .ok_or(SkipReason::Resolution)?;
        let encoded_version = encode_version(&version);
        if !preserves_ordering(&version) {
            warn!(
                package,
                version = %version,
                encoded = %encoded_version,
                "version token does not sort numerically"
            );
        }
        if self.cache.exists(package, &encoded_version) {
            return Ok(Outcome::Cached { encoded_version });
        }

        let workdir = tempfile::Builder::new()
            .prefix("sigdb-")
            .tempdir()
            .context("create work dir")
            .map_err(SkipReason::unexpected)?;
        let download_dir = workdir.path().join("download");
        let extract_dir = workdir.path().join("extracted");
        for dir in [&download_dir, &extract_dir] {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("create dir {}", dir.display()))
                .map_err(SkipReason::unexpected)?;
        }

        let mut files = self
            .collaborators
            .fetcher
            .fetch(package, &version, &download_dir);
        files.sort();
        let archive = files.first().ok_or(SkipReason::Fetch)?;

        self.collaborators
            .unpacker
            .unpack(archive, &extract_dir)
            .map_err(|err| SkipReason::Unpack(err.to_string()))?;

        let table = self
            .extractor
            .extract_dir(&extract_dir)
            .map_err(SkipReason::unexpected)?;
        if table.is_empty() {
            return Err(SkipReason::EmptyExtraction);
        }

        let path = self
            .cache
            .write(package, &encoded_version, &table)
            .map_err(SkipReason::unexpected)?;
        Ok(Outcome::Written {
            path,
            symbols: table.len(),
        })
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("panic: {message}")
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("panic: {message}")
    } else {
        "panic".to_string()
    }
}
