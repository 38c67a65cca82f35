//! CLI argument parsing definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "Performance gate and trend reporting", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Set the log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate a snapshot file against the configured thresholds
    Validate {
        /// Path to a performance snapshot JSON document
        #[arg(long, value_name = "PATH")]
        snapshot: PathBuf,

        /// Environment profile (development, production, ci)
        #[arg(long, value_name = "NAME", default_value = "ci")]
        environment: String,

        /// Flow profile overriding the environment per field
        #[arg(long, value_name = "NAME")]
        flow: Option<String>,
    },

    /// Validate a snapshot and append it to the run history
    Record {
        /// Test name the run belongs to
        #[arg(long, value_name = "NAME")]
        test: String,

        /// Path to a performance snapshot JSON document
        #[arg(long, value_name = "PATH")]
        snapshot: PathBuf,

        /// Environment profile (development, production, ci)
        #[arg(long, value_name = "NAME", default_value = "ci")]
        environment: String,

        /// Flow profile overriding the environment per field
        #[arg(long, value_name = "NAME")]
        flow: Option<String>,

        /// Browser the run used
        #[arg(long, value_name = "NAME", default_value = "chromium")]
        browser: String,

        /// Viewport the run used
        #[arg(long, value_name = "WXH", default_value = "1280x720")]
        viewport: String,
    },

    /// Gate CI on the latest recorded run: thresholds plus regressions
    Gate {
        /// Test name to gate on
        #[arg(long, value_name = "NAME")]
        test: String,

        /// Environment profile (development, production, ci)
        #[arg(long, value_name = "NAME", default_value = "ci")]
        environment: String,

        /// Flow profile overriding the environment per field
        #[arg(long, value_name = "NAME")]
        flow: Option<String>,
    },

    /// Print the trend for one metric of one test
    Trend {
        /// Test name
        #[arg(long, value_name = "NAME")]
        test: String,

        /// Dotted metric path (e.g. page_load.dom_content_loaded)
        #[arg(long, value_name = "PATH")]
        metric: String,

        /// Trend window in days
        #[arg(long, value_name = "DAYS")]
        window_days: Option<u32>,
    },

    /// Show recent history entries for a test
    History {
        /// Test name
        #[arg(long, value_name = "NAME")]
        test: String,

        /// Maximum entries to show, newest last
        #[arg(long, value_name = "N", default_value = "10")]
        limit: usize,
    },
}
