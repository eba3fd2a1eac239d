#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]

//! ** Wayfarer **
//! Minimal stdio front end for the engine. Terminal styling and a richer
//! CLI are external collaborators per spec.md §1; this binary exists only
//! to drive the engine end-to-end from a blueprint file.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use env_logger::Env;
use log::info;

use wayfarer_engine::{loader, Engine, EngineConfig, StdioSink, TurnOutcome};

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).format_timestamp(None).init();

    let mut args = std::env::args().skip(1);
    let Some(blueprint_path) = args.next() else {
        eprintln!("usage: wayfarer <blueprint.toml> [config.toml]");
        return ExitCode::from(1);
    };
    let config_path = args.next();

    match run(Path::new(&blueprint_path), config_path.as_deref()) {
        Ok(outcome) => match outcome {
            TurnOutcome::Ended => ExitCode::from(0),
            TurnOutcome::Fatal(message) => {
                eprintln!("internal invariant violation: {message}");
                ExitCode::from(3)
            }
            TurnOutcome::Continue => ExitCode::from(0),
        },
        Err(err) => {
            if err.chain().any(|cause| cause.downcast_ref::<loader::BlueprintError>().is_some()) {
                eprintln!("failed to load blueprint: {err:#}");
                ExitCode::from(2)
            } else {
                eprintln!("{err:#}");
                ExitCode::from(1)
            }
        }
    }
}

fn run(blueprint_path: &Path, config_path: Option<&str>) -> Result<TurnOutcome> {
    info!("starting Wayfarer engine");
    info!("loading blueprint from {}", blueprint_path.display());
    let loaded = loader::load_blueprint(blueprint_path).context("while loading game blueprint")?;

    let config_path = config_path.map(PathBuf::from).unwrap_or_else(|| default_config_path(blueprint_path));
    let config = EngineConfig::load(&config_path).with_context(|| format!("loading config {}", config_path.display()))?;

    println!("{}", loaded.blueprint.def.title);
    println!();
    if !loaded.blueprint.def.introduction.is_empty() {
        println!("{}", loaded.blueprint.def.introduction);
        println!();
    }

    let save_dir = blueprint_path.parent().unwrap_or_else(|| Path::new(".")).join(&config.save_dir);
    let mut engine = Engine::new(loaded.state, loaded.blueprint, loaded.vocab, StdioSink::new(), save_dir)
        .with_autosave(config.autosave_every_turns)
        .with_verbose_default(config.verbose_by_default);

    info!("ready, entering turn loop");
    Ok(engine.run())
}

fn default_config_path(blueprint_path: &Path) -> PathBuf {
    blueprint_path.parent().unwrap_or_else(|| Path::new(".")).join("wayfarer.toml")
}
