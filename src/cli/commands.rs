//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - members/show/search/families: directory queries
//! - stats: member and attendance figures
//! - attendance: attendance rows with member names
//! - report/export-csv: exports

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Flock - church membership and attendance directory
#[derive(Parser, Debug)]
#[command(name = "flock")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Preset attendance date windows
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePreset {
    /// The current UTC calendar day
    Today,
    /// The 7 days up to now
    Week,
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List members
    Members {
        /// Filter by status (visitor, "new member", active, inactive)
        #[arg(short, long)]
        status: Option<String>,
    },

    /// Show one member and their household
    Show {
        /// Member ID
        id: String,
    },

    /// Search members by name, email, phone or status
    Search {
        /// Free-text query
        query: String,

        /// Keep each household's members next to each other
        #[arg(short, long)]
        grouped: bool,
    },

    /// List family units
    Families,

    /// Show member and attendance statistics
    Stats,

    /// List attendance records
    Attendance {
        /// Only records for this member ID
        #[arg(short, long)]
        member: Option<String>,

        /// Only records of this event type (e.g. "sunday service", bible-study)
        #[arg(short, long)]
        event: Option<String>,

        /// Preset window: today, or the last 7 days
        #[arg(short, long, value_enum, conflicts_with_all = ["from", "to"])]
        since: Option<DatePreset>,

        /// Earliest date, RFC 3339 (inclusive)
        #[arg(long, requires = "to")]
        from: Option<String>,

        /// Latest date, RFC 3339 (inclusive)
        #[arg(long, requires = "from")]
        to: Option<String>,
    },

    /// Export the directory report as JSON
    Report {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Export members as CSV
    ExportCsv {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
