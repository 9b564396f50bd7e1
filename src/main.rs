use trimrange::cli::{Args, Command};
use trimrange::config::TrimConfig;
use trimrange::paths::PathConfig;
use trimrange::script::{self, Replay};

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info};

fn main() -> Result<()> {
    // Parse command-line arguments first (needed for log setup)
    let args = Args::parse();

    // Create path configuration from CLI args and environment
    let path_config = PathConfig::from_env_and_cli(args.config_dir.clone());

    init_logging(&args, &path_config)?;
    debug!("Command-line args: {:?}", args);

    let config_path = args
        .config_file
        .clone()
        .unwrap_or_else(|| path_config.config_file());
    info!("Config path: {}", config_path.display());
    let mut config = TrimConfig::load_or_default(&config_path)?;

    match args.command {
        Command::Replay {
            script,
            duration,
            width,
            min_space,
            max_space,
            no_playhead_drag,
        } => {
            if let Some(min) = min_space {
                config.min_space_seconds = min;
            }
            if let Some(max) = max_space {
                config.max_space_seconds = max;
            }
            if no_playhead_drag {
                config.is_playhead_draggable = false;
            }

            let steps = script::load_steps(&script)?;
            info!("Replaying {} steps from {}", steps.len(), script.display());

            let mut replay = Replay::new(config, duration, width)?;
            let stdout = std::io::stdout();
            replay.run(&steps, &mut stdout.lock())?;
        }
        Command::Config { save } => {
            config.validate()?;
            if save {
                if let Some(dir) = config_path.parent() {
                    std::fs::create_dir_all(dir)
                        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
                }
                config.save(&config_path)?;
                info!("Saved config to {}", config_path.display());
            }
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }
    Ok(())
}

fn init_logging(args: &Args, path_config: &PathConfig) -> Result<()> {
    // 0 (default) = warn, 1 (-v) = info, 2 (-vv) = debug, 3+ (-vvv) = trace
    let log_level = match args.verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    if let Some(log_path_opt) = &args.log_file {
        let log_path = log_path_opt
            .as_ref()
            .cloned()
            .unwrap_or_else(|| path_config.log_file());

        if let Err(e) = path_config.ensure_dirs() {
            eprintln!("Warning: Failed to create application directories: {:#}", e);
        }
        let file = std::fs::File::create(&log_path)
            .with_context(|| format!("Failed to create log file: {}", log_path.display()))?;

        env_logger::Builder::new()
            .filter_level(log_level)
            .format_timestamp_millis()
            .target(env_logger::Target::Pipe(Box::new(file)))
            .init();

        info!("Logging to file: {} (level: {:?})", log_path.display(), log_level);
    } else {
        // Console logging, respects RUST_LOG if set
        let default_level = match args.verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };

        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
            .format_timestamp_millis()
            .init();
    }
    Ok(())
}
