//! CLI definitions for Augmenter.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Augmenter CLI.
#[derive(Parser)]
#[command(name = "augmenter")]
#[command(about = "Mirror a chat page's input box and search your conversation history with it")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml", global = true)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Run the observer context against a host page snapshot file
    Observe {
        /// Page snapshot file (JSON)
        #[arg(long)]
        page: PathBuf,

        /// Do not expose the HTTP refresh endpoint
        #[arg(long)]
        no_server: bool,
    },

    /// Run a presentation surface that prints every status change
    Popup,

    /// Print the synchronized input state once
    Status {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Ask the observer to re-read the input now, then print the state
    Refresh,

    /// Search the conversation history
    Search {
        /// Query text (default: the synchronized input text)
        query: Option<String>,

        /// Number of results
        #[arg(long)]
        top_k: Option<u32>,
    },

    /// Upload a conversations.json export
    Upload {
        /// Path to conversations.json
        file: PathBuf,
    },

    /// Delete everything uploaded under this session
    Forget,

    /// Check the search service
    Health,
}
