//! CLI argument definitions.

use clap::{Parser, Subcommand};

use crate::commands::{add, comment, delete, list, watch};

/// Collect and display testimonials backed by a document store.
#[derive(Parser, Debug)]
#[command(name = "plaudit")]
#[command(author, version = env!("PLAUDIT_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Store URL (https:// for a hosted store, file:// for a local store)
    #[arg(long, env = "PLAUDIT_STORE", global = true)]
    pub store: Option<String>,

    /// Collection holding the testimonials
    #[arg(long, default_value = "testimonials", global = true)]
    pub collection: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Submit a new testimonial
    Add(add::AddArgs),

    /// Append a comment to a testimonial
    Comment(comment::CommentArgs),

    /// Delete a testimonial
    Delete(delete::DeleteArgs),

    /// Print the current testimonials once
    List(list::ListArgs),

    /// Follow the testimonial list live
    Watch(watch::WatchArgs),
}
