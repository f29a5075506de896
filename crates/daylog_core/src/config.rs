//! Journal configuration.
//!
//! # Responsibility
//! - Carry caller-tunable knobs for the service and the CLI.
//! - Provide defaults so an empty config object is valid.
//!
//! # Invariants
//! - `document_key` is never blank after validation.
//! - `log_level` is one of `trace|debug|info|warn|error`.

use crate::logging::{default_log_level, normalize_level};
use crate::merge::engine::{DuplicateHeaderPolicy, MergeOptions};
use crate::merge::prepare::UnparsedDatePolicy;
use crate::repo::document_repo::DEFAULT_DOCUMENT_KEY;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JournalConfig {
    /// Store key the document blob lives under.
    pub document_key: String,
    pub duplicate_headers: DuplicateHeaderPolicy,
    pub unparsed_dates: UnparsedDatePolicy,
    pub log_level: String,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            document_key: DEFAULT_DOCUMENT_KEY.to_string(),
            duplicate_headers: DuplicateHeaderPolicy::default(),
            unparsed_dates: UnparsedDatePolicy::default(),
            log_level: default_log_level().to_string(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Json(serde_json::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "invalid config JSON: {err}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl JournalConfig {
    /// Parses and validates a JSON config; missing fields take defaults.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text).map_err(ConfigError::Json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.document_key.trim().is_empty() {
            return Err(ConfigError::Invalid("document_key cannot be empty".to_string()));
        }
        normalize_level(&self.log_level).map_err(ConfigError::Invalid)?;
        Ok(())
    }

    pub fn merge_options(&self) -> MergeOptions {
        MergeOptions {
            duplicate_headers: self.duplicate_headers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, JournalConfig};
    use crate::merge::engine::DuplicateHeaderPolicy;
    use crate::merge::prepare::UnparsedDatePolicy;

    #[test]
    fn empty_object_uses_defaults() {
        let config = JournalConfig::from_json_str("{}").unwrap();
        assert_eq!(config, JournalConfig::default());
    }

    #[test]
    fn policies_parse_from_snake_case() {
        let config = JournalConfig::from_json_str(
            r#"{"duplicate_headers": "reject", "unparsed_dates": "default_to_today"}"#,
        )
        .unwrap();
        assert_eq!(config.duplicate_headers, DuplicateHeaderPolicy::Reject);
        assert_eq!(config.unparsed_dates, UnparsedDatePolicy::DefaultToToday);
    }

    #[test]
    fn blank_key_and_unknown_level_are_rejected() {
        let err = JournalConfig::from_json_str(r#"{"document_key": "  "}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        let err = JournalConfig::from_json_str(r#"{"log_level": "loud"}"#).unwrap_err();
        assert!(err.to_string().contains("unsupported log level"));
    }
}
