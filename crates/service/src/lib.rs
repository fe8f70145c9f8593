//! Mint Service
//!
//! Binding resolution, balance synchronization, transaction orchestration and
//! notification classification, tied together by the [`Exchange`] actor.

pub mod balance;
pub mod bindings;
pub mod exchange;
pub mod notification;
pub mod orchestrator;
pub mod resync;

pub use balance::{BalanceSynchronizer, SyncReport, SyncRequest};
pub use bindings::BindingResolver;
pub use exchange::{Exchange, ExchangeConfig, DEFAULT_EVENT_CAPACITY};
pub use notification::NotificationClassifier;
pub use orchestrator::{TransactionOrchestrator, TransactionPolicy};
pub use resync::{ResyncScheduler, SyncTrigger, TokioResyncScheduler, TriggerSender};
