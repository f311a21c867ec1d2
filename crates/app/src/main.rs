mod commands;

use anyhow::{Context as _, Result};
use services::ollama_probe::OllamaProbe;
use services::presentation::Presentation;
use services::settings_store::SettingsStore;
use services::startup_gate::{GateOptions, StartupGate};
use services::storage::FileStore;
use services::Environment;
use shared::config::AppConfig;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use commands::{Command, CommandContext};

/// Presentation target for a terminal session: attribute changes are logged.
struct LoggingPresentation;

impl Presentation for LoggingPresentation {
    fn set_attribute(&self, name: &str, value: &str) {
        tracing::info!("{}={}", name, value);
    }
}

fn build_environment(config: &AppConfig) -> Option<Environment> {
    if config.headless {
        return None;
    }
    Some(Environment::new(
        Arc::new(FileStore::new(config.config_dir.clone())),
        Arc::new(LoggingPresentation),
    ))
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = Command::parse(&args)?;

    let config = AppConfig::from_env();
    tracing::debug!("Using config {:?}", config);

    let env = build_environment(&config);
    let settings = SettingsStore::new(env.clone());
    settings.load();

    let probe = Arc::new(OllamaProbe::new(config.ollama_binary.clone()));
    let gate = StartupGate::with_options(env, probe.clone(), GateOptions::from(&config));

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    let output = runtime.block_on(commands::run(
        command,
        &CommandContext {
            settings: &settings,
            gate: &gate,
            probe: probe.as_ref(),
        },
    ))?;
    println!("{}", output);
    Ok(())
}
