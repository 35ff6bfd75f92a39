//! gesture_control — command-line entry point.

use std::path::Path;
use std::sync::mpsc::Receiver;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use gesture_control::app::{self, AppCommand, AppState, Mode};
use gesture_control::backend::open_input_sink;
use gesture_control::cli::{Cli, Commands, ConfigAction};
use gesture_control::config::Config;
#[cfg(not(feature = "leap"))]
use gesture_control::source::default_frames_path;
use gesture_control::source::{spawn_frame_source, ReplaySource, SourceEvent};
use gesture_core::{Action, NullSink};
use gesture_store::{LibraryStore, MergePolicy};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let mut config = if cli.config.is_some() {
        Config::load(&config_path)
            .with_context(|| format!("loading {}", config_path.display()))?
    } else {
        Config::load_default()?
    };
    if let Some(path) = &cli.library {
        config.library.path = path.clone();
    }

    match cli.command {
        Commands::Run { frames, looping, dry_run, monitor } => {
            run_recognition(&config, frames.as_deref(), looping, dry_run, monitor)?;
        }
        Commands::Train { name, action, samples, frames } => {
            if let Some(n) = samples {
                config.training.required_samples = n;
                config.validate()?;
            }
            run_train(&config, &name, action, frames.as_deref())?;
        }
        Commands::List => {
            run_list(&config)?;
        }
        Commands::Delete { name } => {
            let mut store = open_store(&config)?;
            store.delete(&name)?;
            println!("Deleted '{}'", name);
        }
        Commands::Import { file, overwrite } => {
            let mut store = open_store(&config)?;
            let policy = if overwrite { MergePolicy::Overwrite } else { MergePolicy::KeepExisting };
            let taken = store.import(&file, policy)?;
            println!("Imported {} gestures from {}", taken, file.display());
        }
        Commands::Export { file } => {
            let store = open_store(&config)?;
            store.export(&file)?;
            println!("Exported {} gestures to {}", store.library().len(), file.display());
        }
        Commands::Config { action } => {
            run_config(action, &config, &config_path)?;
        }
    }

    Ok(())
}

fn open_store(config: &Config) -> anyhow::Result<LibraryStore> {
    LibraryStore::open(&config.library.path)
        .with_context(|| format!("opening gesture library {}", config.library.path.display()))
}

/// Replay `frames` if given, else the LeapMotion when built with `leap`,
/// else the default replay file.
fn open_frames(config: &Config, frames: Option<&Path>, looping: bool) -> anyhow::Result<Receiver<SourceEvent>> {
    let interval = Duration::from_millis(config.source.frame_interval_ms);
    let replay = |path: &Path| -> anyhow::Result<Receiver<SourceEvent>> {
        let source = ReplaySource::open(path)
            .with_context(|| format!("reading frames from {}", path.display()))?
            .interval(interval)
            .looping(looping);
        info!("[source] replaying {} frames from {}", source.len(), path.display());
        Ok(spawn_frame_source(source))
    };

    match frames {
        Some(path) => replay(path),
        None       => fallback_frames(replay),
    }
}

#[cfg(feature = "leap")]
fn fallback_frames<F>(_replay: F) -> anyhow::Result<Receiver<SourceEvent>>
where
    F: Fn(&Path) -> anyhow::Result<Receiver<SourceEvent>>,
{
    info!("[source] reading frames from the LeapMotion controller");
    Ok(spawn_frame_source(gesture_control::source::LeapFrameSource))
}

#[cfg(not(feature = "leap"))]
fn fallback_frames<F>(replay: F) -> anyhow::Result<Receiver<SourceEvent>>
where
    F: Fn(&Path) -> anyhow::Result<Receiver<SourceEvent>>,
{
    let path = default_frames_path();
    if !path.exists() {
        bail!(
            "no frame source: pass --frames <file> or build with the `leap` feature ({} not found)",
            path.display()
        );
    }
    replay(&path)
}

fn run_recognition(
    config:  &Config,
    frames:  Option<&Path>,
    looping: bool,
    dry_run: bool,
    monitor: bool,
) -> anyhow::Result<()> {
    let store = open_store(config)?;
    if store.library().is_empty() {
        bail!("no gestures in {}; record one with `train` first", store.path().display());
    }

    let mut app = AppState::new(config, store, open_input_sink(dry_run));
    app.handle_command(AppCommand::ToggleTesting)?;
    if app.mode() != Mode::Testing {
        bail!("{}", app.status);
    }
    let rx = open_frames(config, frames, looping)?;

    #[cfg(feature = "monitor")]
    {
        if monitor {
            gesture_control::monitor::run_monitored(&mut app, rx)?;
            return Ok(());
        }
    }
    #[cfg(not(feature = "monitor"))]
    {
        if monitor {
            warn!("built without the `monitor` feature; running headless");
        }
    }

    app::run(&mut app, rx);
    Ok(())
}

fn run_train(config: &Config, name: &str, action: Action, frames: Option<&Path>) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let mut app = AppState::new(config, store, NullSink);
    let rx = open_frames(config, frames, false)?;

    info!("[train] recording {} samples for '{}' -> {}", config.training.required_samples, name, action);
    let count = app::train(&mut app, rx, name, action)?;
    if count < config.training.required_samples {
        warn!("[train] source ended early: saved '{}' with {} of {} samples",
              name, count, config.training.required_samples);
    }
    println!("{}", app.status);
    Ok(())
}

fn run_list(config: &Config) -> anyhow::Result<()> {
    let store = open_store(config)?;
    if store.library().is_empty() {
        println!("No gestures in {}", store.path().display());
        return Ok(());
    }
    println!("{:<20} {:<12} {:<12} {:>7}", "NAME", "ACTION", "VALUE", "SAMPLES");
    for g in store.library() {
        println!(
            "{:<20} {:<12} {:<12} {:>7}",
            g.name(), g.action().kind(), g.action().value(), g.samples().len()
        );
    }
    Ok(())
}

fn run_config(action: ConfigAction, config: &Config, path: &Path) -> anyhow::Result<()> {
    match action {
        ConfigAction::Show => {
            println!("# {}", path.display());
            print!("{}", config.to_toml()?);
        }
        ConfigAction::Init { force } => {
            if path.exists() && !force {
                bail!("{} already exists (use --force to overwrite)", path.display());
            }
            Config::default().save(path)?;
            println!("Wrote {}", path.display());
        }
    }
    Ok(())
}
