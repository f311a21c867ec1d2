//! Startup gate: keeps the app off its main routes until Ollama is known
//! to be installed.
//!
//! The probe result is cached in local storage for a day so most loads
//! never pay for it. Loads of the fallback route itself are never gated.

use chrono::{DateTime, Utc};
use shared::config::{AppConfig, FALLBACK_ROUTE};
use shared::error::{GateError, ProbeError};
use shared::install_check::{default_cache_ttl, InstallCheck};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::ollama_probe::CompanionProbe;
use crate::storage::KeyValueStore;
use crate::Environment;

/// Storage key of the cached probe result.
pub const INSTALL_CHECK_KEY: &str = "ollama-install-check";

/// Temporary redirect; the navigation method is preserved.
pub const TEMPORARY_REDIRECT: u16 = 307;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub status: u16,
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    /// Not gated: already on the fallback route, or non-interactive
    Bypassed,
    /// Ollama is installed, continue loading
    Proceed,
    Redirect(Redirect),
}

#[derive(Debug, Clone)]
pub struct GateOptions {
    pub fallback_route: String,
    pub cache_ttl: chrono::Duration,
    pub probe_timeout: Duration,
}

impl Default for GateOptions {
    fn default() -> Self {
        Self {
            fallback_route: FALLBACK_ROUTE.into(),
            cache_ttl: default_cache_ttl(),
            probe_timeout: Duration::from_secs(10),
        }
    }
}

impl From<&AppConfig> for GateOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            fallback_route: config.fallback_route.clone(),
            cache_ttl: config.cache_ttl,
            probe_timeout: config.probe_timeout,
        }
    }
}

pub struct StartupGate {
    env: Option<Environment>,
    probe: Arc<dyn CompanionProbe>,
    options: GateOptions,
}

impl StartupGate {
    pub fn new(env: Option<Environment>, probe: Arc<dyn CompanionProbe>) -> Self {
        Self::with_options(env, probe, GateOptions::default())
    }

    pub fn with_options(
        env: Option<Environment>,
        probe: Arc<dyn CompanionProbe>,
        options: GateOptions,
    ) -> Self {
        Self {
            env,
            probe,
            options,
        }
    }

    pub fn options(&self) -> &GateOptions {
        &self.options
    }

    pub async fn check(&self, path: &str) -> Result<GateOutcome, GateError> {
        self.check_at(path, Utc::now()).await
    }

    /// Gate a load of `path` as of `now`.
    ///
    /// A probe failure (including a timeout) is returned as an error and
    /// nothing is cached, so the next load probes again.
    pub async fn check_at(&self, path: &str, now: DateTime<Utc>) -> Result<GateOutcome, GateError> {
        if path == self.options.fallback_route {
            return Ok(GateOutcome::Bypassed);
        }
        let Some(env) = &self.env else {
            return Ok(GateOutcome::Bypassed);
        };
        let storage = env.storage.as_ref();

        let cached = read_cache(storage)?;
        let needs_check = match &cached {
            None => true,
            Some(check) => check.is_stale(now, self.options.cache_ttl),
        };

        if needs_check {
            let installed = self.run_probe().await?;
            info!("Ollama installed: {}", installed);
            write_cache(storage, &InstallCheck::new(now, installed));
            return Ok(if installed {
                GateOutcome::Proceed
            } else {
                self.redirect()
            });
        }

        match cached {
            Some(check) if check.installed => {
                debug!("Using cached install check from {:?}", check.checked_at());
                Ok(GateOutcome::Proceed)
            }
            _ => Ok(self.redirect()),
        }
    }

    /// Forget the cached result so the next load probes again.
    pub fn invalidate(&self) -> Result<(), GateError> {
        if let Some(env) = &self.env {
            env.storage.remove(INSTALL_CHECK_KEY)?;
        }
        Ok(())
    }

    async fn run_probe(&self) -> Result<bool, ProbeError> {
        let timeout = self.options.probe_timeout;
        match tokio::time::timeout(timeout, self.probe.is_installed()).await {
            Ok(result) => result,
            Err(_) => Err(ProbeError::Timeout {
                duration_ms: timeout.as_millis() as u64,
            }),
        }
    }

    fn redirect(&self) -> GateOutcome {
        GateOutcome::Redirect(Redirect {
            status: TEMPORARY_REDIRECT,
            location: self.options.fallback_route.clone(),
        })
    }
}

/// Malformed records are deleted and read as absent.
fn read_cache(storage: &dyn KeyValueStore) -> Result<Option<InstallCheck>, GateError> {
    let Some(raw) = storage.get(INSTALL_CHECK_KEY)? else {
        return Ok(None);
    };
    match serde_json::from_str::<InstallCheck>(&raw) {
        Ok(check) => Ok(Some(check)),
        Err(e) => {
            warn!("Discarding malformed install check: {}", e);
            if let Err(e) = storage.remove(INSTALL_CHECK_KEY) {
                warn!("Failed to remove install check: {}", e);
            }
            Ok(None)
        }
    }
}

fn write_cache(storage: &dyn KeyValueStore, check: &InstallCheck) {
    let json = match serde_json::to_string(check) {
        Ok(json) => json,
        Err(e) => {
            warn!("Failed to serialize install check: {}", e);
            return;
        }
    };
    if let Err(e) = storage.set(INSTALL_CHECK_KEY, &json) {
        warn!("Failed to cache install check: {}", e);
    }
}
