use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "w2u", version)]
#[command(about = "Watch2Upload CLI", long_about = None)]
pub struct Cli {
    /// YAML file with the initial watches and remotes
    #[arg(long, global = true, value_name = "PATH")]
    pub seed: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Adds a new directory, enabled by default
    Add {
        directory: String,
        remote_id: String,
        remote_dir: String,
        /// Delete files once they are uploaded to the remote server
        #[arg(long)]
        delete: bool,
    },

    /// Lists watched directories
    List {
        /// Show all watched directories, including disabled directories
        #[arg(short, long)]
        all: bool,
    },

    /// Removes a directory
    Remove { directory: String },

    /// Enables watching a directory
    Enable { directory: String },

    /// Disables watching a directory
    Disable { directory: String },

    /// Changes a configuration option
    Set {
        config: String,
        value: String,
        directory: String,
    },

    /// Prints a configuration option
    Get { config: String, directory: String },

    /// Manages remote servers
    Remote {
        #[command(subcommand)]
        command: RemoteCommands,
    },
}

#[derive(Subcommand)]
pub enum RemoteCommands {
    /// Adds a new remote server
    Add {
        url: String,
        username: String,
        password: String,
    },

    /// Lists all remote servers
    List {},

    /// Removes a remote server
    Remove { remote_id: String },

    /// Changes a configuration option
    Set {
        config: String,
        value: String,
        remote_id: String,
    },

    /// Prints a configuration option
    Get { config: String, remote_id: String },
}
