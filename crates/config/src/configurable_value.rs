//! Values that are either written into the config file or read from the environment

use mint_types::SecretString;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a configured value comes from
///
/// ```toml
/// endpoint = { type = "env", value = "MINT_RPC_URL" }
/// endpoint = { type = "plain", value = "http://127.0.0.1:8545" }
/// ```
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ConfigurableValue {
	#[serde(rename = "type")]
	pub value_type: ValueType,
	/// Environment variable name for `Env`, the literal value for `Plain`
	pub value: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
	Env,
	Plain,
}

impl ConfigurableValue {
	pub fn from_env(var: &str) -> Self {
		Self {
			value_type: ValueType::Env,
			value: var.to_string(),
		}
	}

	pub fn from_plain(value: &str) -> Self {
		Self {
			value_type: ValueType::Plain,
			value: value.to_string(),
		}
	}

	/// Resolve into a secret; RPC endpoints often embed provider keys
	pub fn resolve(&self) -> Result<SecretString, ConfigurableValueError> {
		match self.value_type {
			ValueType::Env => std::env::var(&self.value)
				.map(SecretString::from)
				.map_err(|_| ConfigurableValueError::EnvironmentVariableNotFound(self.value.clone())),
			ValueType::Plain => Ok(SecretString::from(self.value.as_str())),
		}
	}

	/// Loggable description that never includes a plain value
	pub fn description(&self) -> String {
		match self.value_type {
			ValueType::Env => format!("environment variable '{}'", self.value),
			ValueType::Plain => "configured plain value".to_string(),
		}
	}

	/// Plain values are empty or env values name no variable
	pub fn is_blank(&self) -> bool {
		self.value.trim().is_empty()
	}
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurableValueError {
	#[error("Environment variable '{0}' not found")]
	EnvironmentVariableNotFound(String),
}

impl fmt::Display for ConfigurableValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.value_type {
			ValueType::Env => write!(f, "env:{}", self.value),
			ValueType::Plain => write!(f, "plain:[REDACTED]"),
		}
	}
}

/// `"env:NAME"` reads from the environment, anything else is plain
impl From<&str> for ConfigurableValue {
	fn from(value: &str) -> Self {
		match value.strip_prefix("env:") {
			Some(var) => Self::from_env(var),
			None => Self::from_plain(value),
		}
	}
}
