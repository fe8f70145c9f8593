//! Configuration loading utilities

use crate::Settings;
use config::{Config, ConfigError, Environment, File};
use std::path::Path;
use thiserror::Error;

use crate::settings::ConfigValidationError;

/// Default config file stem, resolved against the working directory
pub const DEFAULT_CONFIG_PATH: &str = "config/config";

/// Prefix of environment overrides, e.g. `MINT__NETWORK__CHAIN_ID=42161`
pub const ENV_PREFIX: &str = "MINT";

#[derive(Error, Debug)]
pub enum ConfigLoadError {
	#[error("Failed to read configuration: {0}")]
	Source(#[from] ConfigError),

	#[error("Invalid configuration: {0}")]
	Validation(#[from] ConfigValidationError),
}

/// Load `config/config.{toml,json,yaml}` if present, overlaid with `MINT__` variables
pub fn load_config() -> Result<Settings, ConfigLoadError> {
	load(File::with_name(DEFAULT_CONFIG_PATH).required(false))
}

/// Load an explicit config file, overlaid with `MINT__` variables
pub fn load_config_from(path: impl AsRef<Path>) -> Result<Settings, ConfigLoadError> {
	load(File::from(path.as_ref()).required(true))
}

fn load<S>(file: S) -> Result<Settings, ConfigLoadError>
where
	S: config::Source + Send + Sync + 'static,
{
	let settings: Settings = Config::builder()
		.add_source(file)
		.add_source(
			Environment::with_prefix(ENV_PREFIX)
				.prefix_separator("__")
				.separator("__")
				.try_parsing(true),
		)
		.build()?
		.try_deserialize()?;

	settings.validate()?;
	Ok(settings)
}
