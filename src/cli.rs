use clap::{Parser, Subcommand};
use std::path::PathBuf;

// Build version with target info
const VERSION_INFO: &str = const_format::concatcp!(
    env!("CARGO_PKG_VERSION"), "\n",
    "Target: ", std::env::consts::ARCH, "-", std::env::consts::OS
);

/// Trim range selection driver
#[derive(Parser, Debug)]
#[command(author, version = VERSION_INFO, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable debug logging to file (default: trimrange.log in the data dir)
    #[arg(short = 'l', long = "log", value_name = "LOG_FILE", global = true)]
    pub log_file: Option<Option<PathBuf>>,

    /// Increase logging verbosity (default: warn, -v: info, -vv: debug, -vvv+: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbosity: u8,

    /// Custom configuration directory (overrides default platform paths)
    #[arg(short = 'c', long = "config-dir", value_name = "DIR", global = true)]
    pub config_dir: Option<PathBuf>,

    /// Config file to use instead of the one in the config directory
    #[arg(long = "config", value_name = "FILE", global = true)]
    pub config_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Replay a JSON step script and print notifications as JSON lines
    Replay {
        /// Step script (JSON array)
        #[arg(value_name = "SCRIPT")]
        script: PathBuf,

        /// Asset duration in seconds
        #[arg(long = "duration", value_name = "SECONDS")]
        duration: f64,

        /// Track width in pixels
        #[arg(long = "width", value_name = "PX", default_value = "300")]
        width: f64,

        /// Minimum selection length in seconds (overrides config)
        #[arg(long = "min", value_name = "SECONDS")]
        min_space: Option<f64>,

        /// Maximum selection length in seconds, 0 = unbounded (overrides config)
        #[arg(long = "max", value_name = "SECONDS")]
        max_space: Option<f64>,

        /// Disable dragging the playhead
        #[arg(long = "no-playhead-drag")]
        no_playhead_drag: bool,
    },

    /// Print the effective configuration
    Config {
        /// Write the effective configuration to the config file
        #[arg(long = "save")]
        save: bool,
    },
}
