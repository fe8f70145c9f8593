//! Zeroizing string for RPC endpoints that embed provider API keys

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// String whose contents are wiped from memory on drop and never printed
///
/// Node endpoints such as `https://arb-mainnet.example.io/v2/<key>` carry the
/// key in the path, so the whole URL is treated as secret. Use
/// [`SecretString::host_hint`] when something needs to appear in logs.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretString {
	inner: String,
}

impl SecretString {
	pub fn new(secret: String) -> Self {
		Self { inner: secret }
	}

	/// Access the secret value; keep the borrow short
	pub fn expose_secret(&self) -> &str {
		&self.inner
	}

	pub fn is_empty(&self) -> bool {
		self.inner.is_empty()
	}

	/// Scheme and host of a URL-shaped secret, safe to log
	pub fn host_hint(&self) -> String {
		let (scheme, rest) = match self.inner.split_once("://") {
			Some((scheme, rest)) => (scheme, rest),
			None => return "[REDACTED]".to_string(),
		};
		let host = rest
			.split(&['/', '?', '#'][..])
			.next()
			.unwrap_or_default()
			.rsplit('@')
			.next()
			.unwrap_or_default();
		format!("{}://{}/[REDACTED]", scheme, host)
	}
}

impl fmt::Debug for SecretString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("SecretString([REDACTED])")
	}
}

impl fmt::Display for SecretString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("[REDACTED]")
	}
}

impl From<String> for SecretString {
	fn from(secret: String) -> Self {
		Self::new(secret)
	}
}

impl From<&str> for SecretString {
	fn from(secret: &str) -> Self {
		Self::new(secret.to_string())
	}
}

impl Serialize for SecretString {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str("[REDACTED]")
	}
}

impl<'de> Deserialize<'de> for SecretString {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		String::deserialize(deserializer).map(SecretString::new)
	}
}

impl PartialEq for SecretString {
	fn eq(&self, other: &Self) -> bool {
		self.inner == other.inner
	}
}

impl Eq for SecretString {}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_secret_is_never_printed() {
		let secret = SecretString::from("https://arb.example.io/v2/key-123");
		assert!(!format!("{:?}", secret).contains("key-123"));
		assert_eq!(secret.to_string(), "[REDACTED]");
		assert_eq!(
			serde_json::to_string(&secret).unwrap(),
			"\"[REDACTED]\""
		);
	}

	#[test]
	fn test_host_hint() {
		let secret = SecretString::from("https://user:pw@arb.example.io/v2/key-123?x=1");
		assert_eq!(secret.host_hint(), "https://arb.example.io/[REDACTED]");

		let opaque = SecretString::from("not-a-url");
		assert_eq!(opaque.host_hint(), "[REDACTED]");
	}

	#[test]
	fn test_deserialize_keeps_value() {
		let secret: SecretString = serde_json::from_str("\"http://localhost:8545\"").unwrap();
		assert_eq!(secret.expose_secret(), "http://localhost:8545");
		assert!(!secret.is_empty());
	}
}
