//! Mint Config
//!
//! Configuration management, tracing setup and startup utilities for the mint exchange.

pub mod configurable_value;
pub mod loader;
pub mod settings;
pub mod startup_logger;
pub mod tracing_init;

pub use configurable_value::{ConfigurableValue, ConfigurableValueError, ValueType};
pub use loader::{load_config, load_config_from, ConfigLoadError};
pub use settings::{
	default_notification_rules, ConfigValidationError, ContractSettings, LogFormat,
	LoggingSettings, NetworkSettings, NotificationRule, NotificationSettings, RpcSettings,
	Settings, TransactionSettings,
};
pub use startup_logger::{log_exchange_ready, log_service_info, log_service_shutdown};
pub use tracing_init::init_tracing;
