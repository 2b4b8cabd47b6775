use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "sigdb",
    version,
    about = "Python package API signature database builder",
    after_help = r#"Examples:
  sigdb run --packages packages.txt --output lib_db
  sigdb run --batch-size 50 --time-limit-secs 600 --fetcher pip
  sigdb extract ./requests-2.32.3
  sigdb encode-version 1.10.2
  sigdb status --packages packages.txt
"#
)]
pub struct Args {
    /// Log debug output for sigdb (RUST_LOG takes precedence).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(ValueEnum, Clone, Copy, Debug, Eq, PartialEq)]
pub enum FetcherKind {
    /// Download through the index's JSON API.
    Http,
    /// Run `pip download`.
    Pip,
}

#[derive(Subcommand)]
pub enum Command {
    /// Process the next batch of packages and exit.
    Run {
        /// Newline-delimited package names.
        #[arg(long, default_value = "packages.txt")]
        packages: PathBuf,
        /// Directory holding one JSON record per package version.
        #[arg(long, default_value = "lib_db")]
        output: PathBuf,
        /// File holding the index of the next package.
        #[arg(long, default_value = "progress.txt")]
        checkpoint: PathBuf,
        /// Packages attempted per run [env: SIGDB_BATCH_SIZE, default 500].
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        batch_size: Option<u64>,
        /// Wall-clock budget in seconds [env: SIGDB_TIME_LIMIT_SECS, default 3300].
        #[arg(long)]
        time_limit_secs: Option<u64>,
        /// How release artifacts are downloaded.
        #[arg(long, default_value = "http")]
        fetcher: FetcherKind,
        /// pip executable used by `--fetcher pip`.
        #[arg(long, default_value = "pip")]
        pip: String,
        /// Base URL of the JSON index [env: SIGDB_INDEX_URL].
        #[arg(long)]
        index_url: Option<String>,
    },
    /// Extract signatures from a local source tree and print them as JSON.
    Extract {
        /// Root directory to scan for python files.
        root: PathBuf,
        /// Write the table to this file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the sortable token for a version string.
    EncodeVersion { version: String },
    /// Show where the next run will resume.
    Status {
        #[arg(long, default_value = "packages.txt")]
        packages: PathBuf,
        #[arg(long, default_value = "progress.txt")]
        checkpoint: PathBuf,
    },
    /// Restart the next run from the first package.
    Reset {
        #[arg(long, default_value = "progress.txt")]
        checkpoint: PathBuf,
    },
}
