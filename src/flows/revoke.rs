//! Token revocation.
//!
//! Revocation is idempotent from the caller's perspective: a provider response
//! indicating the token was already invalid or unknown maps to a distinct but
//! successful [`RevocationOutcome::AlreadyRevoked`] rather than a hard failure,
//! since providers do not distinguish "not found" from "already revoked".

// self
use crate::{
	_prelude::*,
	flows::{Broker, common},
	http::TokenHttpClient,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	provider::{Operation, ProviderErrorKind, ProviderKind},
};

/// Inputs for revoking a token.
#[derive(Clone, Debug)]
pub struct RevokeRequest {
	/// Provider that issued the token.
	pub provider: ProviderKind,
	/// Access or refresh token to revoke.
	pub token: String,
}
impl RevokeRequest {
	/// Creates a revocation request.
	pub fn new(provider: ProviderKind, token: impl Into<String>) -> Self {
		Self { provider, token: token.into() }
	}
}

/// Successful revocation results.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RevocationOutcome {
	/// Provider acknowledged a first-time revocation.
	Revoked,
	/// Token was already invalid or unknown; treated as success.
	AlreadyRevoked,
}
impl RevocationOutcome {
	/// Returns `true` for both variants; the token is no longer usable either way.
	pub const fn revoked(self) -> bool {
		true
	}
}
impl Display for RevocationOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(match self {
			RevocationOutcome::Revoked => "revoked",
			RevocationOutcome::AlreadyRevoked => "already_revoked",
		})
	}
}

impl<C> Broker<C>
where
	C: ?Sized + TokenHttpClient,
{
	/// Revokes a token at the provider's revocation endpoint.
	///
	/// Revocation is idempotent and safe for callers to retry on
	/// [`Error::retryable`] failures.
	pub async fn revoke_token(&self, request: RevokeRequest) -> Result<RevocationOutcome> {
		const KIND: FlowKind = FlowKind::Revoke;

		let span = FlowSpan::new(KIND, request.provider);

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let handle = self.handle(request.provider)?;

				common::require_field("token", &request.token)?;
				self.ensure_supported(handle, Operation::Revoke)?;

				let endpoint = handle.descriptor.endpoints.revocation.as_ref().ok_or(
					Error::NotSupported {
						provider: handle.descriptor.kind,
						operation: Operation::Revoke,
					},
				)?;
				let mut form = BTreeMap::new();

				form.insert("token".into(), request.token.clone());

				let response =
					common::call_endpoint(self, handle, Operation::Revoke, endpoint, form).await?;

				if response.is_success() {
					return Ok(RevocationOutcome::Revoked);
				}

				let (kind, rejection) =
					common::classify_failure(handle, Operation::Revoke, &response);

				if kind == ProviderErrorKind::AlreadyRevoked {
					return Ok(RevocationOutcome::AlreadyRevoked);
				}

				Err(common::failure_error(kind, rejection))
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}
}
