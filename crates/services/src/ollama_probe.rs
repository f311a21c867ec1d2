//! Detects whether Ollama is installed on this machine.
//!
//! A copy bundled next to the executable counts as installed. Otherwise the
//! probe runs `ollama --version` and looks at the exit status.

use async_trait::async_trait;
use shared::error::ProbeError;
use std::ffi::OsStr;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Reports whether the companion program is present on the host.
#[async_trait]
pub trait CompanionProbe: Send + Sync {
    async fn is_installed(&self) -> Result<bool, ProbeError>;
}

pub struct OllamaProbe {
    binary: String,
    search_bundled: bool,
}

impl Default for OllamaProbe {
    fn default() -> Self {
        Self::new(default_binary_name())
    }
}

impl OllamaProbe {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            search_bundled: true,
        }
    }

    /// Only consult `binary`, skip the bundled-copy lookup.
    pub fn without_bundled(mut self) -> Self {
        self.search_bundled = false;
        self
    }

    /// File name looked for inside app bundles, taken from `binary` so a
    /// configured path like `/opt/ollama/bin/ollama` still matches.
    fn bundled_name(&self) -> &OsStr {
        Path::new(&self.binary)
            .file_name()
            .unwrap_or_else(|| OsStr::new(default_binary_name()))
    }

    /// Places a packaged copy may live, most specific first: the macOS
    /// bundle's `Resources`, the executable's own directory, then an
    /// AppImage's `usr/bin`.
    fn bundled_candidates(&self, exe_dir: &Path, appdir: Option<&Path>) -> Vec<PathBuf> {
        let name = self.bundled_name();
        let mut candidates = Vec::new();
        if cfg!(target_os = "macos") {
            if let Some(contents) = exe_dir.parent() {
                candidates.push(contents.join("Resources").join(name));
            }
        }
        candidates.push(exe_dir.join(name));
        if let Some(appdir) = appdir {
            candidates.push(appdir.join("usr").join("bin").join(name));
        }
        candidates
    }

    fn find_bundled(&self) -> Option<PathBuf> {
        let exe = std::env::current_exe().ok()?;
        let appdir = std::env::var_os("APPDIR").map(PathBuf::from);
        self.bundled_candidates(exe.parent()?, appdir.as_deref())
            .into_iter()
            .find(|candidate| candidate.is_file())
    }
}

#[async_trait]
impl CompanionProbe for OllamaProbe {
    async fn is_installed(&self) -> Result<bool, ProbeError> {
        if self.search_bundled {
            if let Some(path) = self.find_bundled() {
                debug!("Found bundled Ollama at {}", path.display());
                return Ok(true);
            }
        }

        let status = Command::new(&self.binary)
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .status()
            .await;

        match status {
            Ok(status) => {
                debug!("{} --version exited with {}", self.binary, status);
                Ok(status.success())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("{} not found on PATH", self.binary);
                Ok(false)
            }
            Err(source) => Err(ProbeError::Spawn {
                binary: self.binary.clone(),
                source,
            }),
        }
    }
}

fn default_binary_name() -> &'static str {
    if cfg!(windows) {
        "ollama.exe"
    } else {
        "ollama"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_lookup_uses_configured_name() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let exe_dir = temp_dir.path().join("app");
        let appdir = temp_dir.path().join("appimage");
        let probe = OllamaProbe::new("/opt/ollama/bin/ollama-custom");

        let candidates = probe.bundled_candidates(&exe_dir, Some(&appdir));
        assert!(candidates.contains(&exe_dir.join("ollama-custom")));
        assert_eq!(
            candidates.last(),
            Some(&appdir.join("usr").join("bin").join("ollama-custom"))
        );
        assert!(candidates
            .iter()
            .all(|c| c.file_name() == Some(OsStr::new("ollama-custom"))));
    }

    #[test]
    fn test_bundled_lookup_finds_sibling_copy() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let probe = OllamaProbe::new("ollama");
        std::fs::write(temp_dir.path().join("ollama"), b"").unwrap();

        let found = probe
            .bundled_candidates(temp_dir.path(), None)
            .into_iter()
            .find(|c| c.is_file());
        assert_eq!(found, Some(temp_dir.path().join("ollama")));
    }

    #[tokio::test]
    async fn test_missing_binary_is_not_installed() {
        let probe = OllamaProbe::new("charles-test-no-such-binary").without_bundled();
        assert!(!probe.is_installed().await.unwrap());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_exit_status_decides() {
        assert!(OllamaProbe::new("true")
            .without_bundled()
            .is_installed()
            .await
            .unwrap());
        assert!(!OllamaProbe::new("false")
            .without_bundled()
            .is_installed()
            .await
            .unwrap());
    }
}
