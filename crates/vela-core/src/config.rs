//! Creation-policy configuration.
//!
//! Per Iron Lotus Framework: Configuration is validated at load time (Poka-Yoke),
//! with sensible defaults and clear error messages.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::duration::parse_iso8601;
use crate::error::{Result, WaitError};
use crate::types::PolicyKey;

/// Timeout applied when a declaration has none.
pub const DEFAULT_TIMEOUT: &str = "PT3M";

/// One declared creation policy.
///
/// `type` selects the constructor, `timeout` is an ISO-8601 duration, and
/// every other field is handed untouched to the constructor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicySpec {
    /// Registered policy type name.
    #[serde(rename = "type", default)]
    pub policy_type: String,

    /// ISO-8601 timeout; absent or empty means [`DEFAULT_TIMEOUT`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,

    /// Type-specific fields.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl PolicySpec {
    /// Creates a declaration of the given type with no timeout or fields.
    #[must_use]
    pub fn new(policy_type: impl Into<String>) -> Self {
        Self {
            policy_type: policy_type.into(),
            timeout: None,
            fields: Map::new(),
        }
    }

    /// Sets the ISO-8601 timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: impl Into<String>) -> Self {
        self.timeout = Some(timeout.into());
        self
    }

    /// Adds a type-specific field.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Parses the timeout, falling back to `default` when absent or empty.
    ///
    /// # Errors
    /// Returns a configuration error if the effective string is not a valid
    /// ISO-8601 duration.
    pub fn timeout_or(&self, default: &str) -> Result<Duration> {
        let raw = match self.timeout.as_deref() {
            Some(t) if !t.trim().is_empty() => t,
            _ => default,
        };
        parse_iso8601(raw).map_err(|e| {
            let reason = match e {
                WaitError::Config(msg) => msg,
                other => other.to_string(),
            };
            WaitError::config(format!(
                "creation policy of type {:?} has an invalid timeout: {reason}",
                self.policy_type
            ))
        })
    }

    /// Parses the timeout with the [`DEFAULT_TIMEOUT`] fallback.
    ///
    /// # Errors
    /// See [`PolicySpec::timeout_or`].
    pub fn timeout(&self) -> Result<Duration> {
        self.timeout_or(DEFAULT_TIMEOUT)
    }

    /// Reads an optional string field.
    ///
    /// # Errors
    /// Returns a configuration error naming `key` if the field is not a string.
    pub fn str_field(&self, key: &PolicyKey, name: &str) -> Result<Option<&str>> {
        match self.fields.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(other) => Err(WaitError::config(format!(
                "creation policy {key}: field {name:?} must be a string, got {other}"
            ))),
        }
    }

    /// Reads a required, non-empty string field.
    ///
    /// # Errors
    /// Returns a configuration error naming `key` if the field is missing,
    /// empty, or not a string.
    pub fn required_str(&self, key: &PolicyKey, name: &str) -> Result<&str> {
        match self.str_field(key, name)? {
            Some(s) if !s.is_empty() => Ok(s),
            _ => Err(WaitError::config(format!(
                "creation policy {key}: field {name:?} must be specified"
            ))),
        }
    }

    /// Reads an optional list of strings; a single string counts as a list of one.
    ///
    /// # Errors
    /// Returns a configuration error naming `key` for any non-string element.
    pub fn str_list(&self, key: &PolicyKey, name: &str) -> Result<Vec<String>> {
        let invalid = || {
            WaitError::config(format!(
                "creation policy {key}: field {name:?} must be a string or a list of strings"
            ))
        };
        match self.fields.get(name) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::String(s)) => Ok(vec![s.clone()]),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| item.as_str().map(str::to_string).ok_or_else(invalid))
                .collect(),
            Some(_) => Err(invalid()),
        }
    }
}

/// Wait configuration: the declared policies plus engine tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaitConfig {
    /// Declared creation policies, in order.
    #[serde(default)]
    pub creation_policy: Vec<PolicySpec>,

    /// Added to the longest policy timeout to form the safety deadline.
    #[serde(default = "default_safety_buffer")]
    #[serde(with = "humantime_serde")]
    pub safety_buffer: Duration,
}

fn default_safety_buffer() -> Duration {
    Duration::from_secs(2)
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            creation_policy: Vec::new(),
            safety_buffer: default_safety_buffer(),
        }
    }
}

impl WaitConfig {
    /// Creates a configuration from declarations, with default tuning.
    #[must_use]
    pub fn new(creation_policy: Vec<PolicySpec>) -> Self {
        Self {
            creation_policy,
            ..Self::default()
        }
    }

    /// Validates the declarations that can be checked without a registry.
    ///
    /// # Errors
    /// Returns an error if a declaration has no type or a malformed timeout.
    pub fn validate(&self) -> Result<()> {
        for (index, spec) in self.creation_policy.iter().enumerate() {
            if spec.policy_type.trim().is_empty() {
                return Err(WaitError::config(format!(
                    "creation policy #{index}: type must be specified"
                )));
            }
            spec.timeout()?;
        }
        Ok(())
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    /// Returns an error if the text cannot be parsed or fails validation.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| WaitError::config(format!("failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| WaitError::config(format!("failed to read config: {e}")))?;
        Self::from_toml_str(&content)
    }
}

/// Serde helper for humantime durations.
mod humantime_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&humantime::format_duration(*duration).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        humantime::parse_duration(&s).map_err(serde::de::Error::custom)
    }
}
