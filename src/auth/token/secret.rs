//! Redacting wrapper for credential material.

// self
use crate::_prelude::*;

/// Opaque credential value: an access, refresh, or ID token, or a client secret.
///
/// The broker handles raw credential strings in exactly three places: building
/// outbound provider requests, returning wire payloads to the caller, and client
/// authentication. Everywhere else the value renders as [`TokenSecret::REDACTED`],
/// so a stray `Debug` or log line cannot leak it. Serialization writes the raw
/// value, since wire payloads exist to hand tokens back to the caller.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenSecret {
	value: String,
}
impl TokenSecret {
	/// Placeholder every formatter emits in place of the credential.
	pub const REDACTED: &'static str = "<redacted>";

	/// Wraps a credential value.
	pub fn new(value: impl Into<String>) -> Self {
		Self { value: value.into() }
	}

	/// Returns the raw credential. Callers must keep the result out of logs.
	pub fn expose(&self) -> &str {
		&self.value
	}
}
impl AsRef<str> for TokenSecret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&Self::REDACTED).finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(Self::REDACTED)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn formatters_redact_while_serialization_exposes() {
		let secret = TokenSecret::new("super-secret");

		assert_eq!(format!("{secret:?}"), "TokenSecret(\"<redacted>\")");
		assert_eq!(format!("{secret}"), TokenSecret::REDACTED);
		assert_eq!(
			serde_json::to_string(&secret).expect("Secret should serialize."),
			"\"super-secret\"",
		);
	}
}
