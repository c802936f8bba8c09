//! Authorization URL construction.
//!
//! This flow performs no network I/O: it assembles the provider's authorization
//! endpoint URL with every required query parameter, plus the provider-specific
//! extras declared in the descriptor quirks (e.g. `access_type=offline` and
//! `prompt=consent` for Google, `response_mode=query` for Microsoft). The caller's
//! `state` value is passed through unmodified; the broker never interprets it.

// self
use crate::{
	_prelude::*,
	auth::ScopeSet,
	error::ConfigError,
	flows::{Broker, common},
	http::TokenHttpClient,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	provider::ProviderKind,
};

/// Inputs for building an authorization URL.
#[derive(Clone, Debug)]
pub struct AuthorizationUrlRequest {
	/// Provider to authorize against.
	pub provider: ProviderKind,
	/// Redirect URI the provider sends the user back to.
	pub redirect_uri: Url,
	/// Opaque caller-supplied correlation token, passed through unmodified.
	pub state: String,
	/// Requested scopes; falls back to the provider's defaults when empty.
	pub scope: Option<ScopeSet>,
}
impl AuthorizationUrlRequest {
	/// Creates a request with the provider's default scopes.
	pub fn new(provider: ProviderKind, redirect_uri: Url, state: impl Into<String>) -> Self {
		Self { provider, redirect_uri, state: state.into(), scope: None }
	}

	/// Overrides the requested scopes.
	pub fn with_scope(mut self, scope: ScopeSet) -> Self {
		self.scope = Some(scope);

		self
	}
}

/// A fully qualified authorization endpoint URL plus its echo fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AuthorizationUrl {
	/// Complete authorization URL to redirect the user to.
	pub url: Url,
	/// Redirect URI embedded in the URL, echoed for the caller.
	pub redirect_uri: Url,
	/// Caller's `state` value, echoed verbatim.
	pub state: String,
}

impl<C> Broker<C>
where
	C: ?Sized + TokenHttpClient,
{
	/// Builds the authorization endpoint URL for the provider.
	pub fn authorization_url(&self, request: AuthorizationUrlRequest) -> Result<AuthorizationUrl> {
		const KIND: FlowKind = FlowKind::AuthorizationUrl;

		let span = FlowSpan::new(KIND, request.provider);
		let _guard = span.entered();

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = self.build_authorization_url(request);

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	fn build_authorization_url(
		&self,
		request: AuthorizationUrlRequest,
	) -> Result<AuthorizationUrl> {
		let handle = self.handle(request.provider)?;

		common::require_field("state", &request.state)?;
		common::validate_redirect_uri(&request.redirect_uri)?;

		let credentials =
			handle.credentials.as_ref().ok_or(ConfigError::MissingClientCredentials {
				provider: handle.descriptor.kind,
			})?;
		let scope = common::effective_scope(handle, request.scope)?;
		let mut url = handle.descriptor.endpoints.authorization.clone();

		{
			let mut pairs = url.query_pairs_mut();

			pairs
				.append_pair("client_id", &credentials.client_id)
				.append_pair("response_type", "code")
				.append_pair("redirect_uri", request.redirect_uri.as_str());

			if let Some(formatted) =
				common::format_scope(&scope, handle.descriptor.quirks.scope_delimiter)
			{
				pairs.append_pair("scope", &formatted);
			}

			pairs.append_pair("state", &request.state);

			for (name, value) in &handle.descriptor.quirks.authorize_params {
				pairs.append_pair(name, value);
			}
		}

		Ok(AuthorizationUrl { url, redirect_uri: request.redirect_uri, state: request.state })
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::collections::HashMap;
	// self
	use super::*;
	use crate::{
		config::ClientCredentials,
		error::InputError,
		http::{TransportFuture, WireResponse},
		provider::{DefaultProviderStrategy, ProviderStrategy, catalog},
	};

	struct NoTransport;
	impl TokenHttpClient for NoTransport {
		fn post_form<'a>(
			&'a self,
			_: &'a Url,
			_: &'a [(String, String)],
			_: &'a [(String, String)],
		) -> TransportFuture<'a> {
			Box::pin(async { Ok(WireResponse { status: 500, body: Vec::new() }) })
		}
	}

	fn broker() -> Broker<NoTransport> {
		let strategy: Arc<dyn ProviderStrategy> = Arc::new(DefaultProviderStrategy);
		let google = catalog::google().expect("Google descriptor should build.");
		let microsoft = catalog::microsoft("common").expect("Microsoft descriptor should build.");

		Broker::with_http_client(NoTransport)
			.register(
				google,
				strategy.clone(),
				Some(ClientCredentials::new("gid").with_client_secret("gsecret")),
			)
			.register(
				microsoft,
				strategy,
				Some(ClientCredentials::new("mid").with_client_secret("msecret")),
			)
	}

	fn query_map(url: &Url) -> HashMap<String, String> {
		url.query_pairs().map(|(name, value)| (name.into_owned(), value.into_owned())).collect()
	}

	#[test]
	fn google_url_carries_offline_access_params() {
		let redirect = Url::parse("https://app.example.com/cb").expect("Redirect should parse.");
		let request =
			AuthorizationUrlRequest::new(ProviderKind::Google, redirect.clone(), "xyz");
		let built =
			broker().authorization_url(request).expect("Authorization URL should build.");
		let query = query_map(&built.url);

		assert!(built.url.as_str().starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
		assert_eq!(query.get("client_id").map(String::as_str), Some("gid"));
		assert_eq!(query.get("response_type").map(String::as_str), Some("code"));
		assert_eq!(query.get("redirect_uri").map(String::as_str), Some(redirect.as_str()));
		assert_eq!(query.get("state").map(String::as_str), Some("xyz"));
		assert_eq!(query.get("access_type").map(String::as_str), Some("offline"));
		assert_eq!(query.get("prompt").map(String::as_str), Some("consent"));
		assert_eq!(query.get("scope").map(String::as_str), Some("email openid profile"));
		assert_eq!(built.state, "xyz");
	}

	#[test]
	fn microsoft_url_requests_query_response_mode() {
		let redirect = Url::parse("https://app.example.com/cb").expect("Redirect should parse.");
		let request = AuthorizationUrlRequest::new(ProviderKind::Microsoft, redirect, "abc")
			.with_scope(ScopeSet::new(["User.Read"]).expect("Scope should be valid."));
		let built =
			broker().authorization_url(request).expect("Authorization URL should build.");
		let query = query_map(&built.url);

		assert_eq!(query.get("response_mode").map(String::as_str), Some("query"));
		assert_eq!(query.get("scope").map(String::as_str), Some("User.Read"));
	}

	#[test]
	fn blank_state_is_rejected_as_input_error() {
		let redirect = Url::parse("https://app.example.com/cb").expect("Redirect should parse.");
		let request = AuthorizationUrlRequest::new(ProviderKind::Google, redirect, "  ");
		let err = broker().authorization_url(request).expect_err("Blank state must be rejected.");

		assert!(matches!(err, Error::Input(InputError::Missing { field: "state" })));
		assert_eq!(err.http_status(), 400);
	}

	#[test]
	fn non_http_redirect_uri_is_rejected() {
		let redirect = Url::parse("ftp://app.example.com/cb").expect("Redirect should parse.");
		let request = AuthorizationUrlRequest::new(ProviderKind::Google, redirect, "xyz");
		let err =
			broker().authorization_url(request).expect_err("Non-HTTP redirect must be rejected.");

		assert!(matches!(err, Error::Input(InputError::Invalid { field: "redirectUri", .. })));
	}

	#[test]
	fn missing_credentials_surface_as_configuration_error() {
		let strategy: Arc<dyn ProviderStrategy> = Arc::new(DefaultProviderStrategy);
		let google = catalog::google().expect("Google descriptor should build.");
		let broker = Broker::with_http_client(NoTransport).register(google, strategy, None);
		let redirect = Url::parse("https://app.example.com/cb").expect("Redirect should parse.");
		let request = AuthorizationUrlRequest::new(ProviderKind::Google, redirect, "xyz");
		let err = broker
			.authorization_url(request)
			.expect_err("Missing credentials must be rejected.");

		assert!(matches!(
			err,
			Error::Config(ConfigError::MissingClientCredentials {
				provider: ProviderKind::Google
			}),
		));
		assert_eq!(err.http_status(), 500);
	}
}
