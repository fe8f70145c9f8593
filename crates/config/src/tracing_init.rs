//! Tracing subscriber setup driven by [`LoggingSettings`]

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::settings::{LogFormat, LoggingSettings};

/// Install the global subscriber
///
/// `RUST_LOG` wins over the configured level. Returns `false` when a
/// subscriber was already installed, which is not an error.
pub fn init_tracing(logging: &LoggingSettings) -> bool {
	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

	let installed = match logging.format {
		LogFormat::Json => {
			let subscriber = tracing_subscriber::fmt().json().with_env_filter(env_filter);

			if logging.structured {
				subscriber.with_target(true).with_thread_ids(true).try_init()
			} else {
				subscriber.try_init()
			}
		},
		LogFormat::Pretty => {
			let subscriber = tracing_subscriber::fmt()
				.pretty()
				.with_env_filter(env_filter);

			if logging.structured {
				subscriber.with_target(true).with_thread_ids(true).try_init()
			} else {
				subscriber.try_init()
			}
		},
		LogFormat::Compact => {
			let subscriber = tracing_subscriber::fmt()
				.compact()
				.with_env_filter(env_filter);

			if logging.structured {
				subscriber.with_target(true).with_thread_ids(true).try_init()
			} else {
				subscriber.try_init()
			}
		},
	}
	.is_ok();

	if installed {
		info!(
			"Logging configuration applied: level={}, format={:?}, structured={}",
			logging.level, logging.format, logging.structured
		);
	}
	installed
}
