//! Provider descriptor data structures and helpers shared by all flows.
//!
//! The module exposes validated metadata, supporting builder utilities, and
//! per-operation capability helpers so providers can describe what they offer in a
//! transport-agnostic way.

/// Builder API for assembling provider descriptors.
pub mod builder;
/// Operation and capability helpers wired into provider descriptors.
pub mod capability;
/// Provider-specific quirk toggles.
pub mod quirks;

pub use builder::*;
pub use capability::*;
pub use quirks::*;

// self
use crate::_prelude::*;

/// Identity providers modeled by the broker.
///
/// The adapter contract generalizes to further providers; these are the two the broker
/// ships descriptors for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
	/// Google OAuth 2.0 / OpenID Connect.
	Google,
	/// Microsoft identity platform (v2.0 endpoints).
	Microsoft,
}
impl ProviderKind {
	/// Returns the stable path-segment label for the provider.
	pub const fn as_str(self) -> &'static str {
		match self {
			ProviderKind::Google => "google",
			ProviderKind::Microsoft => "microsoft",
		}
	}
}
impl Display for ProviderKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for ProviderKind {
	type Err = UnknownProviderError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"google" => Ok(ProviderKind::Google),
			"microsoft" => Ok(ProviderKind::Microsoft),
			other => Err(UnknownProviderError { requested: other.to_owned() }),
		}
	}
}

/// Error returned when parsing an unknown provider label.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Unknown provider `{requested}`.")]
pub struct UnknownProviderError {
	/// The label that failed to parse.
	pub requested: String,
}

/// Preferred client authentication modes for token endpoint calls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientAuthMethod {
	#[default]
	/// HTTP Basic with `client_id`/`client_secret`.
	ClientSecretBasic,
	/// Form POST body parameters for `client_id`/`client_secret`.
	ClientSecretPost,
}

/// Endpoint set declared by a provider descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderEndpoints {
	/// Authorization endpoint used to build authorize URLs.
	pub authorization: Url,
	/// Token endpoint used for exchanges and refreshes.
	pub token: Url,
	/// Optional introspection endpoint backing the validate operation.
	pub introspection: Option<Url>,
	/// Optional revocation endpoint backing the revoke operation.
	pub revocation: Option<Url>,
}

/// Immutable provider descriptor consumed by flows.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
	/// Provider this descriptor adapts.
	pub kind: ProviderKind,
	/// Endpoint definitions exposed by the provider.
	pub endpoints: ProviderEndpoints,
	/// Per-operation capability flags.
	pub operations: SupportedOperations,
	/// Preferred client authentication mechanism.
	pub preferred_client_auth_method: ClientAuthMethod,
	/// Provider-specific quirks.
	pub quirks: ProviderQuirks,
	/// Scopes requested when the caller supplies none.
	pub default_scopes: Vec<String>,
}
impl ProviderDescriptor {
	/// Creates a new builder for the provided kind.
	pub fn builder(kind: ProviderKind) -> ProviderDescriptorBuilder {
		ProviderDescriptorBuilder::new(kind)
	}

	/// Checks whether the descriptor supports a given operation.
	pub fn supports(&self, operation: Operation) -> bool {
		self.operations.supports(operation)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn provider_kind_round_trips_path_labels() {
		assert_eq!("google".parse::<ProviderKind>(), Ok(ProviderKind::Google));
		assert_eq!("microsoft".parse::<ProviderKind>(), Ok(ProviderKind::Microsoft));
		assert_eq!(ProviderKind::Google.to_string(), "google");
		assert!("github".parse::<ProviderKind>().is_err());
	}
}
