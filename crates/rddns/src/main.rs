// # rddns - Router-driven Dynamic DNS
//
// Thin one-shot binary: load the configuration, wire the OpenSSH shell and
// the DigitalOcean registrar into the core engine, run a single pass and
// report the outcome. All synchronization logic lives in rddns-core.
//
// ## Configuration
//
// The router, registrar and hostnames come from a JSON file (see
// `rddns_core::SyncConfig`). The process itself is tuned by environment
// variables:
//
// - `RDDNS_CONFIG`: Path to the JSON configuration (default `./config/config.json`)
// - `RDDNS_LOG_LEVEL`: trace, debug, info, warn or error (default info)
// - `RDDNS_MODE`: set to `dry-run` to log record updates instead of sending them
//
// ## Example
//
// ```bash
// export RDDNS_CONFIG=/etc/rddns/config.json
// export RDDNS_MODE=dry-run
//
// rddns
// ```

use anyhow::Result;
use rddns_core::{SyncConfig, SyncEngine, SyncEvent, SyncOutcome, config::DEFAULT_CONFIG_PATH};
use rddns_provider_digitalocean::DigitalOceanRegistrar;
use rddns_shell_ssh::SshShell;
use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{Level, debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for the one-shot pass
///
/// A pass that ran to completion exits 0 even when some records could not
/// be fixed; the printed status line carries that result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RddnsExitCode {
    /// The pass completed
    Completed = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// The pass aborted (router, parse, lookup or registrar failure)
    RuntimeError = 2,
}

impl From<RddnsExitCode> for ExitCode {
    fn from(code: RddnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Process settings read from the environment
#[derive(Debug)]
struct Settings {
    config_path: PathBuf,
    log_level: Level,
    dry_run: bool,
}

impl Settings {
    /// Load settings from environment variables
    fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let config_path = lookup("RDDNS_CONFIG")
            .filter(|path| !path.is_empty())
            .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

        let log_level = parse_log_level(&lookup("RDDNS_LOG_LEVEL").unwrap_or_default())?;

        let dry_run = match lookup("RDDNS_MODE").as_deref() {
            None | Some("") | Some("live") => false,
            Some("dry-run") => true,
            Some(other) => anyhow::bail!(
                "RDDNS_MODE '{}' is not valid. Valid modes: live, dry-run",
                other
            ),
        };

        Ok(Self {
            config_path: PathBuf::from(config_path),
            log_level,
            dry_run,
        })
    }
}

fn parse_log_level(value: &str) -> Result<Level> {
    match value.to_lowercase().as_str() {
        "" | "info" => Ok(Level::INFO),
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => anyhow::bail!(
            "RDDNS_LOG_LEVEL '{}' is not valid. \
            Valid levels: trace, debug, info, warn, error",
            value
        ),
    }
}

fn load_config(path: &Path) -> Result<SyncConfig> {
    let config = SyncConfig::from_file(path)?;
    config.validate()?;
    Ok(config)
}

fn main() -> ExitCode {
    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return RddnsExitCode::ConfigError.into();
        }
    };

    let config = match load_config(&settings.config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return RddnsExitCode::ConfigError.into();
        }
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(settings.log_level)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return RddnsExitCode::ConfigError.into();
    }

    info!(
        "Loaded {}: {} hostname(s) under {}",
        settings.config_path.display(),
        config.hostnames.len(),
        config.domain_name
    );
    if settings.dry_run {
        warn!("Dry-run mode: record updates will be logged, not sent");
    }

    let registrar = match DigitalOceanRegistrar::from_config(&config, settings.dry_run) {
        Ok(registrar) => registrar,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return RddnsExitCode::ConfigError.into();
        }
    };

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return RddnsExitCode::RuntimeError.into();
        }
    };

    rt.block_on(async {
        match run_pass(config, registrar).await {
            Ok(outcome) => {
                if !outcome.is_success() {
                    warn!("Some records still point to an old address");
                }
                println!("{}", outcome.message());
                RddnsExitCode::Completed
            }
            Err(e) => {
                error!("Synchronization failed: {:#}", e);
                println!("{:#}", e);
                RddnsExitCode::RuntimeError
            }
        }
    })
    .into()
}

/// Run one synchronization pass
async fn run_pass(config: SyncConfig, registrar: DigitalOceanRegistrar) -> Result<SyncOutcome> {
    let (engine, mut events) =
        SyncEngine::new(Box::new(SshShell::new()), Box::new(registrar), &config)?;

    let event_log = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            log_event(&event);
        }
    });

    let outcome = engine.run().await;

    // Dropping the engine closes the channel so the logger can drain and stop
    drop(engine);
    let _ = event_log.await;

    Ok(outcome?)
}

/// Engine events at debug level; the engine already logs the pass itself
fn log_event(event: &SyncEvent) {
    match event {
        SyncEvent::AddressDetected { address } => debug!(address = %address, "event: address detected"),
        SyncEvent::RecordsFetched { count } => debug!(count, "event: records fetched"),
        SyncEvent::MismatchFound {
            name,
            published,
            address,
        } => debug!(name = %name, published = %published, address = %address, "event: mismatch found"),
        SyncEvent::RecordUpdated { name, address } => {
            debug!(name = %name, address = %address, "event: record updated")
        }
        SyncEvent::RecordUpdateFailed { record_id, error } => {
            debug!(record_id = %record_id, error = %error, "event: record update failed")
        }
        SyncEvent::Finished { outcome } => debug!(outcome = %outcome, "event: pass finished"),
    }
}
