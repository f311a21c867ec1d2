//! Settings persistence and Ollama startup gating.

pub mod ollama_probe;
pub mod presentation;
pub mod settings_store;
pub mod startup_gate;
pub mod storage;

use std::sync::Arc;

use presentation::Presentation;
use storage::KeyValueStore;

/// Capabilities available in an interactive session.
///
/// Components receive `Option<Environment>`; `None` means a non-interactive
/// context and every operation short-circuits.
#[derive(Clone)]
pub struct Environment {
    pub storage: Arc<dyn KeyValueStore>,
    pub presentation: Arc<dyn Presentation>,
}

impl Environment {
    pub fn new(storage: Arc<dyn KeyValueStore>, presentation: Arc<dyn Presentation>) -> Self {
        Self {
            storage,
            presentation,
        }
    }
}
