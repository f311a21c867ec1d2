//! Error types shared by the storage, settings and startup-gate layers.

/// Failures of the persistent key-value layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage quota exceeded while writing {key}")]
    QuotaExceeded { key: String },

    #[error("Invalid storage key: {key}")]
    InvalidKey { key: String },
}

/// Settings store errors. Parse failures never show up here; they are
/// recovered as "no saved settings".
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Failed to persist settings: {0}")]
    Storage(#[from] StorageError),

    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("No custom message at index {index} (have {len})")]
    MessageIndex { index: usize, len: usize },
}

/// Companion-program probe errors.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("Failed to run {binary}: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Probe timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },
}

/// Startup gate errors.
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    #[error("Installation probe failed: {0}")]
    Probe(#[from] ProbeError),

    #[error("Failed to read installation cache: {0}")]
    Storage(#[from] StorageError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_converts_into_settings_error() {
        let err: SettingsError = StorageError::QuotaExceeded {
            key: "charles-settings".into(),
        }
        .into();
        assert!(err.to_string().contains("quota exceeded"));
    }

    #[test]
    fn test_probe_timeout_message() {
        let err: GateError = ProbeError::Timeout { duration_ms: 250 }.into();
        assert_eq!(
            err.to_string(),
            "Installation probe failed: Probe timed out after 250ms"
        );
    }
}
