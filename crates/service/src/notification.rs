//! Classification of raw provider error text into user-facing notifications

use mint_config::{default_notification_rules, NotificationRule};
use mint_types::{ChainError, Notification};

/// Maps free-text provider errors onto notification categories
///
/// Rules are checked in order and matched as case-insensitive substrings.
/// A message no rule matches becomes an `Other` notification carrying the
/// original text unchanged.
#[derive(Debug, Clone)]
pub struct NotificationClassifier {
	rules: Vec<CompiledRule>,
}

#[derive(Debug, Clone)]
struct CompiledRule {
	needle: String,
	rule: NotificationRule,
}

impl NotificationClassifier {
	pub fn new(rules: Vec<NotificationRule>) -> Self {
		let rules = rules
			.into_iter()
			.filter(|rule| !rule.pattern.trim().is_empty())
			.map(|rule| CompiledRule {
				needle: rule.pattern.to_lowercase(),
				rule,
			})
			.collect();
		Self { rules }
	}

	pub fn classify(&self, message: &str) -> Notification {
		let haystack = message.to_lowercase();
		match self
			.rules
			.iter()
			.find(|compiled| haystack.contains(&compiled.needle))
		{
			Some(CompiledRule { rule, .. }) => Notification::new(
				rule.category,
				rule.display_text.as_deref().unwrap_or(message),
			),
			None => Notification::other(message),
		}
	}

	/// Classify the provider's own text of a chain error
	pub fn classify_error(&self, error: &ChainError) -> Notification {
		self.classify(error.raw_message())
	}
}

impl Default for NotificationClassifier {
	fn default() -> Self {
		Self::new(default_notification_rules())
	}
}
