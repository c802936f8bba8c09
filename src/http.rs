//! Transport primitives for outbound provider calls.
//!
//! The module exposes [`TokenHttpClient`], the broker's only seam onto an HTTP stack.
//! Implementations must never follow redirects (token endpoints return results
//! directly) and must enforce a request timeout: a hung provider call may not block
//! the caller indefinitely. Each call is built from explicit parameters; no
//! credential state is ever retained on the client between calls.

// std
use std::ops::Deref;
#[cfg(feature = "reqwest")] use std::time::Duration as StdDuration;
// self
use crate::{_prelude::*, error::TransportError};
#[cfg(feature = "reqwest")] use crate::error::ConfigError;

/// Status code and raw body captured from a provider response.
///
/// Bodies are returned unparsed so the normalizer owns all payload interpretation,
/// including non-2xx error shapes.
#[derive(Clone, Debug)]
pub struct WireResponse {
	/// HTTP status code returned by the provider.
	pub status: u16,
	/// Raw response body bytes.
	pub body: Vec<u8>,
}
impl WireResponse {
	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// Lossy UTF-8 view of the body, for diagnostics.
	pub fn body_text(&self) -> String {
		String::from_utf8_lossy(&self.body).into_owned()
	}
}

/// Boxed future returned by transport implementations.
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<WireResponse, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP transports capable of posting form-encoded provider calls.
///
/// The trait acts as the broker's only dependency on an HTTP stack. Callers provide
/// an implementation (typically behind `Arc<T>` where `T: TokenHttpClient`) and flows
/// submit one form POST per operation. Implementations must be `Send + Sync + 'static`
/// so they can be shared across broker instances, and the returned futures must be
/// `Send` so flow futures stay `Send` too.
pub trait TokenHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Posts a form-encoded request, optionally with extra headers (e.g. a Basic
	/// authorization header), and captures the response regardless of status.
	fn post_form<'a>(
		&'a self,
		url: &'a Url,
		form: &'a [(String, String)],
		headers: &'a [(String, String)],
	) -> TransportFuture<'a>;
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// [`ReqwestHttpClient::new`] configures the timeout and disables redirect following.
/// When wrapping a custom [`ReqwestClient`] via [`ReqwestHttpClient::with_client`],
/// configure those policies on the client yourself.
#[cfg(feature = "reqwest")]
#[derive(Clone)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Timeout applied to every outbound provider call by [`ReqwestHttpClient::new`].
	pub const DEFAULT_TIMEOUT: StdDuration = StdDuration::from_secs(10);

	/// Builds a client with the default timeout and redirects disabled.
	pub fn new() -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder()
			.timeout(Self::DEFAULT_TIMEOUT)
			.redirect(reqwest::redirect::Policy::none())
			.build()
			.map_err(ConfigError::http_client_build)?;

		Ok(Self(client))
	}

	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl TokenHttpClient for ReqwestHttpClient {
	fn post_form<'a>(
		&'a self,
		url: &'a Url,
		form: &'a [(String, String)],
		headers: &'a [(String, String)],
	) -> TransportFuture<'a> {
		Box::pin(async move {
			let mut request = self.0.post(url.clone()).form(form);

			for (name, value) in headers {
				request = request.header(name.as_str(), value.as_str());
			}

			let response = request.send().await.map_err(TransportError::from)?;
			let status = response.status().as_u16();
			let body = response.bytes().await.map_err(TransportError::from)?.to_vec();

			Ok(WireResponse { status, body })
		})
	}
}
