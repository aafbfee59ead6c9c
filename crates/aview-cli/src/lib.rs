//! CLI argument parsing for aview.

use aview_grid::DateFilter;
use aview_slurm::Column;
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "aview", version)]
#[command(about = "Browse SLURM job tables and Adams solver messages")]
#[command(args_conflicts_with_subcommands = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Job table saved with `sacct -X -P --delimiter=, -o jobid,jobname%-40,...`
    pub jobs: Option<Utf8PathBuf>,

    /// Show this message file instead of the selected job's
    #[arg(long)]
    pub msg: Option<Utf8PathBuf>,

    /// Color theme (dark or light)
    #[arg(long, default_value = "dark")]
    pub theme: String,

    #[command(flatten)]
    pub filter: DateFilterArgs,

    /// Write logs to this file (filter with AVIEW_LOG)
    #[arg(long, global = true)]
    pub log_file: Option<Utf8PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print a highlighted message file
    Highlight {
        file: Utf8PathBuf,

        /// Language name or alias
        #[arg(long, default_value = "adams_msg")]
        language: String,

        #[arg(long, value_enum, default_value_t = OutputFormat::Ansi)]
        format: OutputFormat,
    },
    /// Print a job table
    Jobs {
        file: Utf8PathBuf,

        #[command(flatten)]
        filter: DateFilterArgs,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Terminal colors
    Ansi,
    /// `<span class="hljs-...">` markup
    Html,
    /// Highlight spans as JSON
    Json,
}

#[derive(clap::Args, Debug, Clone, Default)]
pub struct DateFilterArgs {
    /// Filter on a date column: KIND:YYYY-MM-DD or inRange:FROM..TO
    /// (KIND is equals, notEqual, lessThan or greaterThan)
    #[arg(long, value_name = "SPEC")]
    pub date_filter: Option<DateFilter>,

    /// Include both ends of an inRange filter
    #[arg(long)]
    pub inclusive: bool,

    /// Keep rows whose date is blank
    #[arg(long)]
    pub include_blanks: bool,

    /// Column the date filter applies to
    #[arg(long, value_enum, default_value_t = DateColumn::Start)]
    pub date_column: DateColumn,
}

impl DateFilterArgs {
    pub fn filter(&self) -> Option<DateFilter> {
        self.date_filter.clone().map(|filter| {
            filter
                .inclusive(self.inclusive)
                .include_blanks(self.include_blanks)
        })
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateColumn {
    #[default]
    Start,
    End,
}

impl DateColumn {
    pub fn column(self) -> Column {
        match self {
            Self::Start => Column::Start,
            Self::End => Column::End,
        }
    }
}
