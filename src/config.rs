//! Process configuration loaded once at startup and treated as immutable thereafter.
//!
//! Credentials come from the environment via [`BrokerConfig::from_env`], or from any
//! key-value lookup via [`BrokerConfig::from_lookup`] so tests never have to mutate
//! process environment variables. Missing client credentials degrade to startup
//! warnings plus a call-time configuration error; they never abort the process.

// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	error::ConfigError,
	provider::{ProviderKind, catalog},
};

/// Environment variable holding the Google client identifier.
pub const GOOGLE_CLIENT_ID: &str = "GOOGLE_CLIENT_ID";
/// Environment variable holding the Google client secret.
pub const GOOGLE_CLIENT_SECRET: &str = "GOOGLE_CLIENT_SECRET";
/// Environment variable holding the Microsoft client identifier.
pub const MICROSOFT_CLIENT_ID: &str = "MICROSOFT_CLIENT_ID";
/// Environment variable holding the Microsoft client secret.
pub const MICROSOFT_CLIENT_SECRET: &str = "MICROSOFT_CLIENT_SECRET";
/// Environment variable holding the Microsoft tenant segment.
pub const MICROSOFT_TENANT_ID: &str = "MICROSOFT_TENANT_ID";
/// Environment variable holding the fallback redirect URI.
pub const DEFAULT_REDIRECT_URI: &str = "DEFAULT_REDIRECT_URI";
/// Environment variable holding the service port.
pub const PORT: &str = "PORT";

/// OAuth client credentials for a single provider.
///
/// The secret is wrapped in [`TokenSecret`] so accidental `Debug`/`Display` output
/// never leaks it.
#[derive(Clone, Debug)]
pub struct ClientCredentials {
	/// OAuth 2.0 client identifier.
	pub client_id: String,
	/// Client secret for confidential authentication methods.
	pub client_secret: Option<TokenSecret>,
}
impl ClientCredentials {
	/// Creates public-client credentials with no secret attached.
	pub fn new(client_id: impl Into<String>) -> Self {
		Self { client_id: client_id.into(), client_secret: None }
	}

	/// Attaches a client secret for confidential client authentication.
	pub fn with_client_secret(mut self, secret: impl Into<String>) -> Self {
		self.client_secret = Some(TokenSecret::new(secret));

		self
	}
}

/// Non-fatal configuration findings reported at load time.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ConfigWarning {
	/// A provider's client id or secret was absent from the environment.
	#[error("Missing client credentials for the {provider} provider; its flows will fail.")]
	MissingClientCredentials {
		/// Provider lacking credentials.
		provider: ProviderKind,
	},
	/// The fallback redirect URI did not parse as a URL.
	#[error("Ignoring unparseable {DEFAULT_REDIRECT_URI} value {value:?}.")]
	InvalidDefaultRedirectUri {
		/// The raw value that failed to parse.
		value: String,
	},
	/// The configured port did not parse as a TCP port number.
	#[error("Ignoring unparseable {PORT} value {value:?}; using {}.", BrokerConfig::DEFAULT_PORT)]
	InvalidPort {
		/// The raw value that failed to parse.
		value: String,
	},
}

/// Immutable broker configuration established once at process start.
#[derive(Clone, Debug)]
pub struct BrokerConfig {
	/// Google client credentials, when configured.
	pub google: Option<ClientCredentials>,
	/// Microsoft client credentials, when configured.
	pub microsoft: Option<ClientCredentials>,
	/// Microsoft tenant segment embedded into its endpoint URLs.
	pub microsoft_tenant: String,
	/// Redirect URI used when callers omit one.
	pub default_redirect_uri: Option<Url>,
	/// Port the surrounding HTTP surface should listen on.
	pub port: u16,
	/// Findings collected while loading; surface these at startup.
	pub warnings: Vec<ConfigWarning>,
}
impl BrokerConfig {
	/// Port used when `PORT` is unset or unparseable.
	pub const DEFAULT_PORT: u16 = 3001;

	/// Loads configuration from process environment variables.
	pub fn from_env() -> Self {
		Self::from_lookup(|key| std::env::var(key).ok())
	}

	/// Loads configuration from an arbitrary key-value lookup.
	pub fn from_lookup<F>(lookup: F) -> Self
	where
		F: Fn(&str) -> Option<String>,
	{
		let mut warnings = Vec::new();
		let google = load_credentials(&lookup, GOOGLE_CLIENT_ID, GOOGLE_CLIENT_SECRET);
		let microsoft = load_credentials(&lookup, MICROSOFT_CLIENT_ID, MICROSOFT_CLIENT_SECRET);

		if google.is_none() {
			warnings.push(ConfigWarning::MissingClientCredentials { provider: ProviderKind::Google });
		}
		if microsoft.is_none() {
			warnings
				.push(ConfigWarning::MissingClientCredentials { provider: ProviderKind::Microsoft });
		}

		let microsoft_tenant = lookup(MICROSOFT_TENANT_ID)
			.filter(|tenant| !tenant.trim().is_empty())
			.unwrap_or_else(|| catalog::DEFAULT_MICROSOFT_TENANT.into());
		let default_redirect_uri = lookup(DEFAULT_REDIRECT_URI).and_then(|raw| {
			Url::parse(&raw)
				.inspect_err(|_| {
					warnings.push(ConfigWarning::InvalidDefaultRedirectUri { value: raw.clone() });
				})
				.ok()
		});
		let port = match lookup(PORT) {
			Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
				warnings.push(ConfigWarning::InvalidPort { value: raw.clone() });

				Self::DEFAULT_PORT
			}),
			None => Self::DEFAULT_PORT,
		};

		Self { google, microsoft, microsoft_tenant, default_redirect_uri, port, warnings }
	}

	/// Returns the credentials for a provider or the call-time configuration error.
	pub fn credentials(&self, provider: ProviderKind) -> Result<&ClientCredentials, ConfigError> {
		let credentials = match provider {
			ProviderKind::Google => self.google.as_ref(),
			ProviderKind::Microsoft => self.microsoft.as_ref(),
		};

		credentials.ok_or(ConfigError::MissingClientCredentials { provider })
	}

	/// Emits each warning through tracing (no-op when the feature is disabled).
	pub fn log_warnings(&self) {
		#[cfg(feature = "tracing")]
		for warning in &self.warnings {
			tracing::warn!(target: "credential_broker::config", "{warning}");
		}
	}
}

fn load_credentials<F>(lookup: &F, id_key: &str, secret_key: &str) -> Option<ClientCredentials>
where
	F: Fn(&str) -> Option<String>,
{
	let client_id = lookup(id_key).filter(|value| !value.trim().is_empty())?;
	let client_secret = lookup(secret_key).filter(|value| !value.trim().is_empty())?;

	Some(ClientCredentials::new(client_id).with_client_secret(client_secret))
}
