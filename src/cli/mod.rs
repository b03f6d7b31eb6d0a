pub mod commands;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::ContentType;

#[derive(Parser)]
#[command(name = "geministics")]
#[command(about = "Poems, thoughts and pages, managed from the terminal", long_about = None)]
pub struct Cli {
    /// SQLite file to use instead of the configured one
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Admin password, required by commands that change content
    #[arg(long, env = "GEMINISTICS_ADMIN_PASSWORD", hide_env_values = true, global = true)]
    pub password: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List published content, grouped by type
    List {
        /// Only this type (poem, thought, page)
        #[arg(short = 't', long = "type")]
        kind: Option<ContentType>,

        /// Include drafts (admin)
        #[arg(long)]
        drafts: bool,
    },
    /// Show one item
    Show {
        id: String,
    },
    /// Create an item (admin)
    Add(AddArgs),
    /// Edit fields of an item (admin)
    Edit(EditArgs),
    /// Make an item visible (admin)
    Publish {
        id: String,
    },
    /// Turn an item back into a draft (admin)
    Unpublish {
        id: String,
    },
    /// Delete an item permanently (admin)
    Delete {
        id: String,
    },
    /// Follow changes made by other instances until Ctrl-C
    Watch,
    /// Send feedback to the site owner
    Feedback {
        message: String,

        /// Address the owner can reply to
        #[arg(long)]
        email: Option<String>,
    },
}

#[derive(Args)]
pub struct AddArgs {
    #[arg(short = 't', long = "type")]
    pub kind: ContentType,

    #[arg(long)]
    pub title: String,

    /// Body text
    #[arg(long, required_unless_present = "file", conflicts_with = "file")]
    pub content: Option<String>,

    /// Read the body from a file
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Save without publishing
    #[arg(long)]
    pub draft: bool,

    /// Image file to embed
    #[arg(long)]
    pub image: Option<PathBuf>,
}

#[derive(Args)]
pub struct EditArgs {
    pub id: String,

    #[arg(short = 't', long = "type")]
    pub kind: Option<ContentType>,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long, conflicts_with = "file")]
    pub content: Option<String>,

    #[arg(long)]
    pub file: Option<PathBuf>,

    /// ISO-8601 date or timestamp
    #[arg(long)]
    pub date: Option<String>,

    /// Replace the embedded image
    #[arg(long, conflicts_with = "remove_image")]
    pub image: Option<PathBuf>,

    /// Drop the embedded image
    #[arg(long)]
    pub remove_image: bool,
}
