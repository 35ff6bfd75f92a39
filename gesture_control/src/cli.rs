//! Command-line interface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use gesture_core::Action;

/// Hand-gesture controller: train gestures from landmark frames and turn
/// recognised gestures into keyboard and mouse input.
#[derive(Parser, Debug)]
#[command(name = "gesture_control")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug-level logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path (default: ~/.gesture_control/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Gesture library file, overriding `library.path` from the config
    #[arg(short, long, global = true)]
    pub library: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Recognise gestures and dispatch their actions
    Run {
        /// Replay frames from a JSON Lines file instead of the LeapMotion
        #[arg(short, long)]
        frames: Option<PathBuf>,

        /// Start the replay over when it ends
        #[arg(long = "loop")]
        looping: bool,

        /// Only log actions, never touch real input
        #[arg(long)]
        dry_run: bool,

        /// Open the monitor window (requires the `monitor` feature)
        #[arg(short, long)]
        monitor: bool,
    },

    /// Record a new gesture
    Train {
        /// Gesture name
        #[arg(short, long)]
        name: String,

        /// Bound action as kind:value, e.g. keyboard:space, mouse_click:left, mouse_move:up
        #[arg(short, long)]
        action: Action,

        /// Samples to record (default: training.required_samples)
        #[arg(short, long)]
        samples: Option<usize>,

        /// Replay frames from a JSON Lines file instead of the LeapMotion
        #[arg(short, long)]
        frames: Option<PathBuf>,
    },

    /// List stored gestures
    List,

    /// Delete a stored gesture
    Delete {
        name: String,
    },

    /// Merge gestures from another library file
    Import {
        file: PathBuf,

        /// Replace gestures that already exist
        #[arg(long)]
        overwrite: bool,
    },

    /// Write the library to another file
    Export {
        file: PathBuf,
    },

    /// View or create the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show,

    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}
