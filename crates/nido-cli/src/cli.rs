//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::config::ChartKind;

/// Caregiving-log charting tool.
///
/// Reads feeding, sleep, diaper, growth, and medical CSV exports, computes
/// daily and monthly statistics, and renders multi-panel chart images.
/// Running without a subcommand renders every enabled chart.
#[derive(Debug, Parser)]
#[command(name = "nido", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Render enabled chart figures to the output directory.
    Render {
        /// Restrict rendering to specific charts (repeatable).
        #[arg(long, value_enum)]
        only: Vec<ChartKind>,
    },

    /// Print the tail of a daily summary series.
    Summary {
        /// Which category to summarize.
        #[arg(long, value_enum)]
        category: SummaryCategory,

        /// How many trailing days to show.
        #[arg(long, default_value_t = 14)]
        days: usize,

        /// Emit JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
}

/// Daily series available to `nido summary`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SummaryCategory {
    Feeding,
    Sleep,
    Diaper,
}
