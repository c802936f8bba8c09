//! Authorization-code exchange.
//!
//! Exchanges a one-time authorization code for a canonical [`TokenRecord`]. Input
//! validation happens before any outbound call, and the provider's raw payload is
//! interpreted only by the normalizer. A provider that issues no refresh token is a
//! legitimate outcome (repeat Google consents, Microsoft without `offline_access`),
//! reported as a warning rather than an error.

// self
use crate::{
	_prelude::*,
	auth::TokenRecord,
	flows::{Broker, common},
	http::TokenHttpClient,
	normalize::{self, TokenContext},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	provider::{Operation, ProviderKind},
};

/// Inputs for exchanging an authorization code.
#[derive(Clone, Debug)]
pub struct ExchangeRequest {
	/// Provider that issued the code.
	pub provider: ProviderKind,
	/// One-time authorization code from the provider callback.
	pub code: String,
	/// Redirect URI; must match the one used to obtain the code.
	pub redirect_uri: Url,
	/// Opaque caller correlation token from the provider callback, echoed back
	/// unmodified; the broker never interprets it.
	pub state: Option<String>,
}
impl ExchangeRequest {
	/// Creates an exchange request.
	pub fn new(provider: ProviderKind, code: impl Into<String>, redirect_uri: Url) -> Self {
		Self { provider, code: code.into(), redirect_uri, state: None }
	}

	/// Attaches the caller's `state` value for passthrough.
	pub fn with_state(mut self, state: impl Into<String>) -> Self {
		self.state = Some(state.into());

		self
	}
}

/// Non-fatal findings attached to a successful exchange.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExchangeWarning {
	/// Provider completed the exchange without issuing a refresh token.
	RefreshTokenNotIssued,
}
impl ExchangeWarning {
	/// Returns a stable label for the warning.
	pub const fn as_str(self) -> &'static str {
		match self {
			ExchangeWarning::RefreshTokenNotIssued => "refresh_token_not_issued",
		}
	}
}
impl Display for ExchangeWarning {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// A successful exchange: the canonical record plus any warnings.
#[derive(Clone, Debug)]
pub struct ExchangeOutcome {
	/// Canonical token record produced by the exchange.
	pub record: TokenRecord,
	/// Non-fatal findings the caller should surface.
	pub warnings: Vec<ExchangeWarning>,
	/// Caller's `state` value, echoed verbatim when one was supplied.
	pub state: Option<String>,
}

impl<C> Broker<C>
where
	C: ?Sized + TokenHttpClient,
{
	/// Exchanges an authorization code for tokens.
	pub async fn exchange_code(&self, request: ExchangeRequest) -> Result<ExchangeOutcome> {
		const KIND: FlowKind = FlowKind::Exchange;

		let span = FlowSpan::new(KIND, request.provider);

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let handle = self.handle(request.provider)?;

				common::require_field("code", &request.code)?;
				common::validate_redirect_uri(&request.redirect_uri)?;
				self.ensure_supported(handle, Operation::Exchange)?;

				let observed_at = OffsetDateTime::now_utc();
				let mut form = BTreeMap::new();

				if let Some(grant_type) = Operation::Exchange.grant_type() {
					form.insert("grant_type".into(), grant_type.into());
				}

				form.insert("code".into(), request.code.clone());
				form.insert("redirect_uri".into(), request.redirect_uri.to_string());

				let response = common::call_endpoint(
					self,
					handle,
					Operation::Exchange,
					&handle.descriptor.endpoints.token,
					form,
				)
				.await?;

				if !response.is_success() {
					let (kind, rejection) =
						common::classify_failure(handle, Operation::Exchange, &response);

					return Err(common::failure_error(kind, rejection));
				}

				let raw = normalize::parse_token_payload(Operation::Exchange, &response.body)?;
				let record = normalize::token_record(
					TokenContext {
						provider: handle.descriptor.kind,
						observed_at,
						scope_delimiter: handle.descriptor.quirks.scope_delimiter,
						prior_refresh_token: None,
						fallback_scope: None,
					},
					raw,
				)?;
				let warnings = if record.refresh_token.is_none() {
					vec![ExchangeWarning::RefreshTokenNotIssued]
				} else {
					Vec::new()
				};

				Ok(ExchangeOutcome { record, warnings, state: request.state })
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::sync::atomic::{AtomicUsize, Ordering};
	// self
	use super::*;
	use crate::{
		config::ClientCredentials,
		error::InputError,
		http::{TransportFuture, WireResponse},
		provider::{DefaultProviderStrategy, ProviderStrategy, catalog},
	};

	struct CountingTransport {
		calls: AtomicUsize,
	}
	impl TokenHttpClient for CountingTransport {
		fn post_form<'a>(
			&'a self,
			_: &'a Url,
			_: &'a [(String, String)],
			_: &'a [(String, String)],
		) -> TransportFuture<'a> {
			self.calls.fetch_add(1, Ordering::SeqCst);

			Box::pin(async { Ok(WireResponse { status: 500, body: Vec::new() }) })
		}
	}

	fn broker(transport: CountingTransport) -> (Broker<CountingTransport>, Arc<CountingTransport>) {
		let strategy: Arc<dyn ProviderStrategy> = Arc::new(DefaultProviderStrategy);
		let google = catalog::google().expect("Google descriptor should build.");
		let transport = Arc::new(transport);
		let broker = Broker::with_http_client(transport.clone()).register(
			google,
			strategy,
			Some(ClientCredentials::new("gid").with_client_secret("gsecret")),
		);

		(broker, transport)
	}

	#[tokio::test]
	async fn blank_code_is_rejected_before_any_provider_call() {
		let (broker, transport) = broker(CountingTransport { calls: AtomicUsize::new(0) });
		let redirect = Url::parse("https://app.example.com/cb").expect("Redirect should parse.");
		let request = ExchangeRequest::new(ProviderKind::Google, "  ", redirect);
		let err =
			broker.exchange_code(request).await.expect_err("Blank code must be rejected.");

		assert!(matches!(err, Error::Input(InputError::Missing { field: "code" })));
		assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
	}
}
