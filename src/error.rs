//! Broker-level error taxonomy shared across flows, providers, and the API contract.

// self
use crate::{
	_prelude::*,
	provider::{Operation, ProviderErrorKind, ProviderKind},
};

/// Broker-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical broker error exposed by public APIs.
///
/// Input and configuration problems are detected before any outbound provider call;
/// provider rejections and transport failures are classified at the adapter boundary
/// and never leak as raw transport errors.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Caller omitted or malformed a required field.
	#[error(transparent)]
	Input(#[from] InputError),
	/// Local configuration problem (missing client credentials, invalid descriptor).
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Remote provider rejected the call; provider diagnostics preserved verbatim.
	#[error(transparent)]
	Provider(#[from] ProviderRejection),
	/// Token reported invalid or expired at validation time.
	#[error("Token is invalid or expired: {reason}.")]
	InvalidToken {
		/// Provider- or broker-supplied reason string.
		reason: String,
	},
	/// Capability not offered by this provider.
	#[error("Provider `{provider}` does not support the {operation} operation.")]
	NotSupported {
		/// Provider that lacks the capability.
		provider: ProviderKind,
		/// Operation that was requested.
		operation: Operation,
	},
	/// Transport-level failure talking to the provider; safe to retry idempotent calls.
	#[error(transparent)]
	Network(#[from] TransportError),
	/// Provider returned a payload the normalizer could not interpret.
	#[error(transparent)]
	MalformedResponse(#[from] MalformedResponseError),
	/// Unexpected failure, catch-all.
	#[error("Internal broker error: {message}.")]
	Internal {
		/// Human-readable summary of the failure.
		message: String,
	},
}
impl Error {
	/// HTTP status code the canonical API surface maps this error to.
	pub fn http_status(&self) -> u16 {
		match self {
			Self::Input(_) => 400,
			Self::InvalidToken { .. } => 401,
			Self::NotSupported { .. } => 501,
			Self::MalformedResponse(_) => 502,
			Self::Network(_) => 503,
			Self::Config(_) | Self::Provider(_) | Self::Internal { .. } => 500,
		}
	}

	/// Stable machine-readable label for the error category.
	pub fn kind_label(&self) -> &'static str {
		match self {
			Self::Input(_) => "input_error",
			Self::Config(_) => "configuration_error",
			Self::Provider(_) => "provider_error",
			Self::InvalidToken { .. } => "invalid_token",
			Self::NotSupported { .. } => "not_supported",
			Self::Network(_) => "network_error",
			Self::MalformedResponse(_) => "malformed_provider_response",
			Self::Internal { .. } => "internal_error",
		}
	}

	/// Returns `true` when retrying the call may succeed (transport failures and
	/// provider-side transient rejections). Callers should only retry idempotent
	/// operations such as validation and revocation.
	pub fn retryable(&self) -> bool {
		match self {
			Self::Network(_) => true,
			Self::Provider(rejection) => rejection.kind == ProviderErrorKind::Transient,
			_ => false,
		}
	}
}

/// Caller-input validation failures rejected before any outbound call.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum InputError {
	/// A required request field was absent or empty.
	#[error("Missing required field `{field}`.")]
	Missing {
		/// Name of the missing field.
		field: &'static str,
	},
	/// A request field was present but malformed.
	#[error("Field `{field}` is invalid: {reason}.")]
	Invalid {
		/// Name of the offending field.
		field: &'static str,
		/// Why the value was rejected.
		reason: String,
	},
}

/// Configuration and validation failures raised by the broker.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// No client credentials are configured for the provider.
	#[error("Client credentials are not configured for provider `{provider}`.")]
	MissingClientCredentials {
		/// Provider that lacks credentials.
		provider: ProviderKind,
	},
	/// The requested provider was never registered with the broker.
	#[error("Provider `{provider}` is not registered with this broker.")]
	ProviderNotRegistered {
		/// Provider that was requested.
		provider: ProviderKind,
	},
	/// Provider descriptor failed validation.
	#[error(transparent)]
	Descriptor(#[from] crate::provider::ProviderDescriptorError),
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Token record builder validation failed.
	#[error("Unable to build token record.")]
	TokenBuild(#[from] crate::auth::TokenRecordBuilderError),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}

/// Provider-side rejection carrying the provider's own diagnostics.
///
/// The OAuth `error` code and `error_description` are preserved verbatim for operator
/// visibility; they never contain broker-held secrets.
#[derive(Clone, Debug, ThisError)]
#[error(
	"Provider `{provider}` rejected the {operation} call: {} ({}).",
	.code.as_deref().unwrap_or("no error code"),
	.description.as_deref().unwrap_or("no description")
)]
pub struct ProviderRejection {
	/// Provider that rejected the call.
	pub provider: ProviderKind,
	/// Operation that was being performed.
	pub operation: Operation,
	/// Classified rejection category.
	pub kind: ProviderErrorKind,
	/// Provider-supplied OAuth `error` code, verbatim.
	pub code: Option<String>,
	/// Provider-supplied `error_description`, verbatim.
	pub description: Option<String>,
	/// HTTP status code returned by the provider, when available.
	pub http_status: Option<u16>,
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the provider.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// The outbound call exceeded the configured timeout.
	#[error("Provider call timed out.")]
	Timeout,
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the provider.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		if e.is_timeout() { Self::Timeout } else { Self::network(e) }
	}
}

/// Normalization failures for payloads the provider returned with a 2xx status.
#[derive(Debug, ThisError)]
pub enum MalformedResponseError {
	/// Response body was not valid JSON for the expected shape.
	#[error("Provider returned malformed JSON for the {operation} response.")]
	Json {
		/// Operation whose response failed to parse.
		operation: Operation,
		/// Structured parsing failure with the offending path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Response omitted a field the canonical model requires.
	#[error("Provider response is missing the `{field}` field.")]
	MissingField {
		/// Name of the absent field.
		field: &'static str,
	},
	/// Response carried neither an absolute nor a relative expiry.
	#[error("Provider response omitted both `expires_in` and `expiry_date`.")]
	MissingExpiry,
	/// Expiry value could not be represented as an instant.
	#[error("Provider returned an expiry outside the supported range.")]
	ExpiryOutOfRange,
	/// Relative expiry must be positive.
	#[error("Provider returned a non-positive `expires_in` value.")]
	NonPositiveExpiry,
	/// Scope string could not be normalized into a set.
	#[error("Provider returned an invalid scope string.")]
	InvalidScope(#[from] crate::auth::ScopeValidationError),
}
