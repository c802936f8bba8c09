// self
use crate::_prelude::*;

/// Remote operations the broker can drive against a provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
	/// Authorization-code exchange at the token endpoint.
	Exchange,
	/// Refresh-token grant at the token endpoint.
	Refresh,
	/// Token introspection at the provider's introspection endpoint.
	Validate,
	/// Token revocation at the provider's revocation endpoint.
	Revoke,
}
impl Operation {
	/// Returns a stable label for the operation.
	pub fn as_str(self) -> &'static str {
		match self {
			Operation::Exchange => "exchange",
			Operation::Refresh => "refresh",
			Operation::Validate => "validate",
			Operation::Revoke => "revoke",
		}
	}

	/// Returns the RFC 6749 grant identifier for token endpoint operations, if any.
	pub fn grant_type(self) -> Option<&'static str> {
		match self {
			Operation::Exchange => Some("authorization_code"),
			Operation::Refresh => Some("refresh_token"),
			Operation::Validate | Operation::Revoke => None,
		}
	}
}
impl Display for Operation {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Per-operation capability flags wired into the descriptor.
///
/// Capability availability is never assumed uniform across providers; flows check the
/// flag and surface an unsupported-capability error instead of calling an endpoint
/// that does not exist.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportedOperations {
	/// Indicates whether authorization-code exchange is available.
	pub exchange: bool,
	/// Indicates whether the refresh grant is available.
	pub refresh: bool,
	/// Indicates whether token introspection is available.
	pub validate: bool,
	/// Indicates whether token revocation is available.
	pub revoke: bool,
}
impl SupportedOperations {
	/// Returns true if the provided operation is supported.
	pub fn supports(self, operation: Operation) -> bool {
		match operation {
			Operation::Exchange => self.exchange,
			Operation::Refresh => self.refresh,
			Operation::Validate => self.validate,
			Operation::Revoke => self.revoke,
		}
	}

	/// Marks an operation as supported.
	pub fn enable(mut self, operation: Operation) -> Self {
		match operation {
			Operation::Exchange => self.exchange = true,
			Operation::Refresh => self.refresh = true,
			Operation::Validate => self.validate = true,
			Operation::Revoke => self.revoke = true,
		}

		self
	}

	/// Returns true when no operations are enabled.
	pub fn is_empty(self) -> bool {
		!self.exchange && !self.refresh && !self.validate && !self.revoke
	}
}
