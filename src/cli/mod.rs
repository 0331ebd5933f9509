use clap::{Parser, Subcommand};

use crate::config::StorageBackend;

#[derive(Parser)]
#[command(name = "climate-dashboard-api")]
#[command(about = "Climate Dashboard API - REST backend for weather monitoring")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve {
        #[arg(long, help = "Port to listen on (overrides PORT)")]
        port: Option<u16>,

        #[arg(long, help = "Storage backend: memory or postgres (overrides STORAGE_BACKEND)")]
        storage: Option<StorageBackend>,

        #[arg(long, help = "Do not load the demo dataset into empty stores")]
        no_seed: bool,
    },

    #[command(about = "Print an Argon2id hash for provisioning a user password")]
    HashPassword { password: String },
}

impl Cli {
    /// The chosen subcommand, falling back to `serve` with no overrides
    pub fn command(self) -> Commands {
        self.command.unwrap_or(Commands::Serve {
            port: None,
            storage: None,
            no_seed: false,
        })
    }
}
