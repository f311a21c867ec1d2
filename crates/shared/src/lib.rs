pub mod config;
pub mod error;
pub mod install_check;
pub mod observable;

pub mod settings {
    use serde::de::{DeserializeOwned, Error as _};
    use serde::{Deserialize, Serialize};
    use serde_json::{Map, Value};

    /// Theme used when nothing (or an empty name) is configured.
    pub const DEFAULT_THEME: &str = "legacy";

    /// User preferences, persisted as a single JSON object.
    ///
    /// Field names follow the camelCase keys the front-end has always
    /// written, so existing blobs keep loading. Every field falls back to
    /// its default when missing, which is how older blobs pick up fields
    /// added later.
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase", default)]
    pub struct Settings {
        pub church_username: String,
        /// Stored as plain text alongside the rest of the record.
        pub church_password: String,
        pub preferred_theme: String,
        pub custom_messages: Vec<String>,
    }

    impl Default for Settings {
        fn default() -> Self {
            Self {
                church_username: String::new(),
                church_password: String::new(),
                preferred_theme: DEFAULT_THEME.into(),
                custom_messages: vec![],
            }
        }
    }

    impl Settings {
        /// Parse a persisted blob, merging whatever it holds over the defaults.
        ///
        /// Each known key is decoded on its own: a key with the wrong type
        /// keeps its default and the rest of the blob still applies. Unknown
        /// keys are ignored. Only malformed JSON or a non-object is an error.
        pub fn from_persisted(raw: &str) -> Result<Self, serde_json::Error> {
            let Value::Object(fields) = serde_json::from_str::<Value>(raw)? else {
                return Err(serde_json::Error::custom("settings blob is not a JSON object"));
            };

            let mut settings = Self::default();
            merge_field(&fields, "churchUsername", &mut settings.church_username);
            merge_field(&fields, "churchPassword", &mut settings.church_password);
            merge_field(&fields, "preferredTheme", &mut settings.preferred_theme);
            merge_field(&fields, "customMessages", &mut settings.custom_messages);
            Ok(settings)
        }

        pub fn to_persisted(&self) -> Result<String, serde_json::Error> {
            serde_json::to_string(self)
        }

        /// Copy with the password blanked, for display and logs.
        pub fn redacted(&self) -> Self {
            let mut copy = self.clone();
            if !copy.church_password.is_empty() {
                copy.church_password = "********".into();
            }
            copy
        }
    }

    fn merge_field<T: DeserializeOwned>(fields: &Map<String, Value>, key: &str, slot: &mut T) {
        let Some(value) = fields.get(key) else {
            return;
        };
        match T::deserialize(value) {
            Ok(decoded) => *slot = decoded,
            Err(e) => tracing::warn!("Ignoring saved {}: {}", key, e),
        }
    }
}
