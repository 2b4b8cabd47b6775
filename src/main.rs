use anyhow::Result;
use clap::Parser;
use serde_json::json;
use sigdb::cache::ArtifactCache;
use sigdb::checkpoint::CheckpointStore;
use sigdb::config::Config;
use sigdb::extract::SymbolExtractor;
use sigdb::model::ProgressStatus;
use sigdb::registry::{ArtifactFetcher, PipFetcher, PypiClient, StandardUnpacker};
use sigdb::scheduler::{BatchScheduler, Collaborators, SchedulerConfig};
use sigdb::{cli, packages, util, version};
use std::time::{Duration, Instant};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: bool) {
    // Logs go to stderr so stdout stays clean JSON.
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,sigdb={level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    // The run budget covers everything from process start.
    let started = Instant::now();
    let args = cli::Args::parse();
    init_logging(args.verbose);

    match args.command {
        cli::Command::Run {
            packages: package_file,
            output,
            checkpoint,
            batch_size,
            time_limit_secs,
            fetcher,
            pip,
            index_url,
        } => {
            let config = Config::get();
            let batch_size = batch_size
                .map(|value| value as usize)
                .unwrap_or(config.batch_size);
            let time_limit = time_limit_secs
                .map(Duration::from_secs)
                .unwrap_or_else(|| config.time_limit());
            let index_url = index_url.unwrap_or_else(|| config.index_url.clone());

            let package_list = packages::read_package_list(&package_file)?;
            info!(
                packages = package_list.len(),
                batch_size,
                time_limit_secs = time_limit.as_secs(),
                "loaded {}",
                package_file.display()
            );

            let client = PypiClient::new(
                &index_url,
                config.resolve_timeout(),
                config.download_timeout(),
            );
            let fetcher: Box<dyn ArtifactFetcher> = match fetcher {
                cli::FetcherKind::Http => Box::new(PypiClient::new(
                    &index_url,
                    config.resolve_timeout(),
                    config.download_timeout(),
                )),
                cli::FetcherKind::Pip => Box::new(PipFetcher::new(pip)),
            };
            let collaborators = Collaborators {
                resolver: Box::new(client),
                fetcher,
                unpacker: Box::new(StandardUnpacker),
            };
            let mut scheduler = BatchScheduler::new(
                SchedulerConfig {
                    batch_size,
                    deadline: started + time_limit,
                },
                ArtifactCache::open(output)?,
                CheckpointStore::new(checkpoint),
                collaborators,
            )?;
            let summary = scheduler.run(&package_list)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
            Ok(())
        }
        cli::Command::Extract { root, output } => {
            let mut extractor = SymbolExtractor::new()?;
            let (table, stats) = extractor.extract_dir_with_stats(&root)?;
            info!(
                files = stats.files,
                parsed = stats.parsed,
                failed = stats.failed,
                symbols = table.len(),
                "extracted {}",
                root.display()
            );
            let rendered = serde_json::to_string_pretty(&table)?;
            match output {
                Some(path) => util::write_atomic(&path, format!("{rendered}\n").as_bytes())?,
                None => println!("{rendered}"),
            }
            Ok(())
        }
        cli::Command::EncodeVersion { version: raw } => {
            let encoded = version::encode_version(&raw);
            let sortable = version::preserves_ordering(&raw);
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "version": raw,
                    "encoded": encoded,
                    "sortable": sortable,
                }))?
            );
            Ok(())
        }
        cli::Command::Status {
            packages: package_file,
            checkpoint,
        } => {
            let package_list = packages::read_package_list(&package_file)?;
            let checkpoint = CheckpointStore::new(checkpoint).load();
            let status = ProgressStatus {
                checkpoint,
                total: package_list.len(),
                remaining: package_list.len().saturating_sub(checkpoint),
                next_package: package_list.get(checkpoint).cloned(),
            };
            println!("{}", serde_json::to_string_pretty(&status)?);
            Ok(())
        }
        cli::Command::Reset { checkpoint } => {
            let store = CheckpointStore::new(checkpoint);
            store.reset()?;
            info!("checkpoint {} reset to 0", store.path().display());
            Ok(())
        }
    }
}
