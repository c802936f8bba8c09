//! High-level flow orchestrators powered by the broker facade.

pub mod authorize;
pub mod common;
pub mod exchange;
pub mod refresh;
pub mod revoke;
pub mod validate;

pub use authorize::*;
pub use exchange::*;
pub use refresh::*;
pub use revoke::*;
pub use validate::*;

// self
use crate::{
	_prelude::*,
	config::ClientCredentials,
	error::ConfigError,
	http::TokenHttpClient,
	provider::{Operation, ProviderDescriptor, ProviderKind, ProviderStrategy},
};
#[cfg(feature = "reqwest")]
use crate::{
	config::BrokerConfig,
	http::ReqwestHttpClient,
	provider::{DefaultProviderStrategy, catalog},
};

#[cfg(feature = "reqwest")]
/// Broker specialized for the crate's default reqwest transport stack.
pub type ReqwestBroker = Broker<ReqwestHttpClient>;

/// A registered provider: its descriptor, strategy, and immutable credentials.
///
/// Handles are registered once at startup and never mutated afterwards; every
/// request reads from them and builds its own request-scoped values, so no
/// call-specific credential state ever lands on a shared object.
#[derive(Clone)]
pub struct ProviderHandle {
	/// Descriptor defining endpoints, capabilities, and quirks.
	pub descriptor: ProviderDescriptor,
	/// Strategy applied to requests and failure classification.
	pub strategy: Arc<dyn ProviderStrategy>,
	/// Client credentials, absent when the environment lacked them.
	pub credentials: Option<ClientCredentials>,
}
impl Debug for ProviderHandle {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ProviderHandle")
			.field("descriptor", &self.descriptor)
			.field("credentials_set", &self.credentials.is_some())
			.finish()
	}
}

/// Coordinates credential flows across the registered provider adapters.
///
/// The broker owns the HTTP client and a registry of immutable provider handles so
/// individual flow implementations can focus on operation-specific logic (authorize
/// URL assembly, code exchanges, refreshes, introspection, revocation). The broker
/// itself holds no per-request state and is safe to share across concurrent tasks.
#[derive(Clone)]
pub struct Broker<C>
where
	C: ?Sized + TokenHttpClient,
{
	/// HTTP client wrapper used for every outbound provider request.
	pub http_client: Arc<C>,
	providers: HashMap<ProviderKind, ProviderHandle>,
}
impl<C> Broker<C>
where
	C: ?Sized + TokenHttpClient,
{
	/// Creates an empty broker that reuses the caller-provided transport.
	pub fn with_http_client(http_client: impl Into<Arc<C>>) -> Self {
		Self { http_client: http_client.into(), providers: HashMap::new() }
	}

	/// Registers (or replaces) a provider adapter.
	pub fn register(
		mut self,
		descriptor: ProviderDescriptor,
		strategy: Arc<dyn ProviderStrategy>,
		credentials: Option<ClientCredentials>,
	) -> Self {
		self.providers
			.insert(descriptor.kind, ProviderHandle { descriptor, strategy, credentials });

		self
	}

	/// Returns the handle for a provider, or the configuration error for unknown ones.
	pub fn handle(&self, provider: ProviderKind) -> Result<&ProviderHandle> {
		self.providers
			.get(&provider)
			.ok_or_else(|| ConfigError::ProviderNotRegistered { provider }.into())
	}

	/// Lists the registered providers in stable order.
	pub fn configured(&self) -> Vec<ProviderKind> {
		let mut providers = self.providers.keys().copied().collect::<Vec<_>>();

		providers.sort_by_key(|provider| provider.as_str());

		providers
	}

	pub(crate) fn ensure_supported(
		&self,
		handle: &ProviderHandle,
		operation: Operation,
	) -> Result<()> {
		if handle.descriptor.supports(operation) {
			Ok(())
		} else {
			Err(Error::NotSupported { provider: handle.descriptor.kind, operation })
		}
	}
}
#[cfg(feature = "reqwest")]
impl ReqwestBroker {
	/// Creates an empty broker backed by the crate's default reqwest transport.
	pub fn new() -> Result<Self, ConfigError> {
		Ok(Self::with_http_client(ReqwestHttpClient::new()?))
	}

	/// Builds a broker with both built-in providers registered from configuration.
	///
	/// Providers whose credentials are missing are still registered; their flows fail
	/// with a configuration error at call time, mirroring the startup-warning policy.
	pub fn from_config(config: &BrokerConfig) -> Result<Self, ConfigError> {
		let strategy: Arc<dyn ProviderStrategy> = Arc::new(DefaultProviderStrategy);

		Ok(Self::new()?
			.register(catalog::google()?, strategy.clone(), config.google.clone())
			.register(
				catalog::microsoft(&config.microsoft_tenant)?,
				strategy,
				config.microsoft.clone(),
			))
	}
}
impl<C> Debug for Broker<C>
where
	C: ?Sized + TokenHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Broker").field("providers", &self.configured()).finish()
	}
}
