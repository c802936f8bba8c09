//! Token validation through provider introspection.
//!
//! Validation is a per-provider capability: providers without an introspection
//! endpoint yield a typed unsupported-capability error before any outbound call,
//! never a crash or a false success. Successful introspections are normalized into
//! `{scope, expires_in, claims}` regardless of the provider's wire shape.

// self
use crate::{
	_prelude::*,
	flows::{Broker, common},
	http::TokenHttpClient,
	normalize::{self, TokenIntrospection},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	provider::{Operation, ProviderKind},
};

/// Inputs for validating an access token.
#[derive(Clone, Debug)]
pub struct ValidateRequest {
	/// Provider that issued the token.
	pub provider: ProviderKind,
	/// Access token to introspect.
	pub access_token: String,
}
impl ValidateRequest {
	/// Creates a validation request.
	pub fn new(provider: ProviderKind, access_token: impl Into<String>) -> Self {
		Self { provider, access_token: access_token.into() }
	}
}

impl<C> Broker<C>
where
	C: ?Sized + TokenHttpClient,
{
	/// Validates an access token against the provider's introspection endpoint.
	///
	/// Validation is idempotent and safe for callers to retry on
	/// [`Error::retryable`] failures.
	pub async fn validate_token(&self, request: ValidateRequest) -> Result<TokenIntrospection> {
		const KIND: FlowKind = FlowKind::Validate;

		let span = FlowSpan::new(KIND, request.provider);

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let handle = self.handle(request.provider)?;

				common::require_field("accessToken", &request.access_token)?;
				self.ensure_supported(handle, Operation::Validate)?;

				let endpoint = handle.descriptor.endpoints.introspection.as_ref().ok_or(
					Error::NotSupported {
						provider: handle.descriptor.kind,
						operation: Operation::Validate,
					},
				)?;
				let observed_at = OffsetDateTime::now_utc();
				let mut form = BTreeMap::new();

				form.insert("access_token".into(), request.access_token.clone());

				let response =
					common::call_endpoint(self, handle, Operation::Validate, endpoint, form)
						.await?;

				if !response.is_success() {
					let (kind, rejection) =
						common::classify_failure(handle, Operation::Validate, &response);

					return Err(common::failure_error(kind, rejection));
				}

				let raw = normalize::parse_introspection_payload(&response.body)?;

				Ok(normalize::introspection(
					handle.descriptor.kind,
					observed_at,
					handle.descriptor.quirks.scope_delimiter,
					raw,
				)?)
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}
}
