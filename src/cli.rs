use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub const DEFAULT_URL: &str = "http://127.0.0.1:3001";

/// Manage named color palettes stored by a small local server.
#[derive(Parser, Debug)]
#[command(name = "koralowy", version, about)]
pub struct Args {
    /// Palette server URL used by the client commands
    #[arg(long, global = true, env = "KORALOWY_URL", default_value = DEFAULT_URL)]
    pub url: String,

    /// Request timeout in seconds
    #[arg(long, global = true, env = "KORALOWY_TIMEOUT", default_value_t = 5)]
    pub timeout: u64,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the palette API server
    Serve {
        /// Address to listen on
        #[arg(long, env = "KORALOWY_ADDR", default_value = "127.0.0.1:3001")]
        addr: SocketAddr,

        /// JSON file holding the palette collection
        #[arg(long, env = "KORALOWY_DATA", default_value = "palettes.json")]
        data: PathBuf,

        /// Create the data file with an empty collection if it is missing
        #[arg(long)]
        create: bool,
    },

    #[command(flatten)]
    Client(ClientCommand),
}

/// Commands that talk to a running server.
#[derive(Subcommand, Debug)]
pub enum ClientCommand {
    /// List stored palettes with their indices
    List {
        /// Print colored swatches for each palette
        #[arg(long)]
        preview: bool,
    },

    /// Add a new palette
    Add {
        /// Palette name
        #[arg(short, long)]
        name: String,

        /// Hex color, repeatable (defaults to the starter colors)
        #[arg(short = 'c', long = "color")]
        colors: Vec<String>,

        /// Append this many random colors
        #[arg(short, long, default_value_t = 0)]
        random: usize,
    },

    /// Delete the palette at INDEX (as shown by `list`)
    Delete {
        #[arg(allow_negative_numbers = true)]
        index: i64,
    },

    /// Export the collection as JSON
    Export {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Replace the collection with the palettes in FILE
    Import { file: PathBuf },

    /// Launch the interactive palette board
    Tui,
}
