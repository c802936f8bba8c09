//! Refresh token flow.
//!
//! Performs a `grant_type=refresh_token` call and returns a fresh canonical record.
//! Providers frequently omit the refresh token from refresh responses; the caller's
//! original refresh token is echoed into the record in that case so it is never
//! silently lost. A provider rejection (expired or revoked refresh token) stays
//! distinguishable from a transient transport failure in the error taxonomy.

// self
use crate::{
	_prelude::*,
	auth::{ScopeSet, TokenRecord},
	flows::{Broker, common},
	http::TokenHttpClient,
	normalize::{self, TokenContext},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	provider::{Operation, ProviderKind},
};

/// Inputs for refreshing an access token.
#[derive(Clone, Debug)]
pub struct RefreshRequest {
	/// Provider that issued the refresh token.
	pub provider: ProviderKind,
	/// Refresh token obtained from a previous exchange.
	pub refresh_token: String,
	/// Optional scope narrowing; omitted means the provider decides.
	pub scope: Option<ScopeSet>,
}
impl RefreshRequest {
	/// Creates a refresh request.
	pub fn new(provider: ProviderKind, refresh_token: impl Into<String>) -> Self {
		Self { provider, refresh_token: refresh_token.into(), scope: None }
	}

	/// Requests a narrowed scope for the refreshed token.
	pub fn with_scope(mut self, scope: ScopeSet) -> Self {
		self.scope = Some(scope);

		self
	}
}

impl<C> Broker<C>
where
	C: ?Sized + TokenHttpClient,
{
	/// Refreshes an access token using a previously issued refresh token.
	pub async fn refresh_token(&self, request: RefreshRequest) -> Result<TokenRecord> {
		const KIND: FlowKind = FlowKind::Refresh;

		let span = FlowSpan::new(KIND, request.provider);

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let handle = self.handle(request.provider)?;

				common::require_field("refreshToken", &request.refresh_token)?;
				self.ensure_supported(handle, Operation::Refresh)?;

				let observed_at = OffsetDateTime::now_utc();
				let mut form = BTreeMap::new();

				if let Some(grant_type) = Operation::Refresh.grant_type() {
					form.insert("grant_type".into(), grant_type.into());
				}

				form.insert("refresh_token".into(), request.refresh_token.clone());

				if let Some(formatted) = request.scope.as_ref().and_then(|scope| {
					common::format_scope(scope, handle.descriptor.quirks.scope_delimiter)
				}) {
					form.insert("scope".into(), formatted);
				}

				let response = common::call_endpoint(
					self,
					handle,
					Operation::Refresh,
					&handle.descriptor.endpoints.token,
					form,
				)
				.await?;

				if !response.is_success() {
					let (kind, rejection) =
						common::classify_failure(handle, Operation::Refresh, &response);

					return Err(common::failure_error(kind, rejection));
				}

				let raw = normalize::parse_token_payload(Operation::Refresh, &response.body)?;
				let record = normalize::token_record(
					TokenContext {
						provider: handle.descriptor.kind,
						observed_at,
						scope_delimiter: handle.descriptor.quirks.scope_delimiter,
						prior_refresh_token: Some(&request.refresh_token),
						fallback_scope: request.scope.as_ref(),
					},
					raw,
				)?;

				Ok(record)
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}
}
