//! Presentation targets that receive the active theme.

use parking_lot::RwLock;
use std::collections::HashMap;

/// Attribute on the root element that styling keys off.
pub const THEME_ATTRIBUTE: &str = "data-theme";

pub trait Presentation: Send + Sync {
    fn set_attribute(&self, name: &str, value: &str);
}

/// Root element attributes kept in memory.
#[derive(Default)]
pub struct RootElement {
    attributes: RwLock<HashMap<String, String>>,
}

impl RootElement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attribute(&self, name: &str) -> Option<String> {
        self.attributes.read().get(name).cloned()
    }

    pub fn theme(&self) -> Option<String> {
        self.attribute(THEME_ATTRIBUTE)
    }
}

impl Presentation for RootElement {
    fn set_attribute(&self, name: &str, value: &str) {
        self.attributes
            .write()
            .insert(name.to_string(), value.to_string());
    }
}
