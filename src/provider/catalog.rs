//! Built-in descriptors for the two providers the broker ships adapters for.
//!
//! Endpoint URLs and quirks follow each provider's published OAuth 2.0 / OpenID
//! Connect documentation. Both descriptors use the default strategy; providers with
//! bespoke error shapes can swap in their own [`ProviderStrategy`] implementation.
//!
//! [`ProviderStrategy`]: crate::provider::ProviderStrategy

// self
use crate::{
	_prelude::*,
	provider::{
		ClientAuthMethod, Operation, ProviderDescriptor, ProviderDescriptorError, ProviderKind,
		ProviderQuirks,
	},
};

/// Tenant segment used when no Microsoft tenant is configured.
pub const DEFAULT_MICROSOFT_TENANT: &str = "common";

/// Google OAuth 2.0 descriptor.
///
/// Google offers the full operation set: token exchange and refresh, `tokeninfo`
/// introspection, and token revocation. The `access_type=offline` and
/// `prompt=consent` authorize parameters are required to guarantee refresh-token
/// issuance; without `prompt=consent`, repeat authorizations return no refresh token.
pub fn google() -> Result<ProviderDescriptor, ProviderDescriptorError> {
	let quirks = ProviderQuirks::default()
		.with_authorize_param("access_type", "offline")
		.with_authorize_param("prompt", "consent");

	ProviderDescriptor::builder(ProviderKind::Google)
		.authorization_endpoint(endpoint_url(
			"authorization",
			"https://accounts.google.com/o/oauth2/v2/auth",
		)?)
		.token_endpoint(endpoint_url("token", "https://oauth2.googleapis.com/token")?)
		.introspection_endpoint(endpoint_url(
			"introspection",
			"https://oauth2.googleapis.com/tokeninfo",
		)?)
		.revocation_endpoint(endpoint_url("revocation", "https://oauth2.googleapis.com/revoke")?)
		.support_operations([
			Operation::Exchange,
			Operation::Refresh,
			Operation::Validate,
			Operation::Revoke,
		])
		.preferred_client_auth_method(ClientAuthMethod::ClientSecretPost)
		.default_scopes(["openid", "email", "profile"])
		.quirks(quirks)
		.build()
}

/// Microsoft identity platform (v2.0) descriptor for the given tenant.
///
/// The v2.0 endpoints expose neither a standard introspection nor a revocation
/// endpoint, so only exchange and refresh are enabled; validation and revocation
/// surface an unsupported-capability result instead of a runtime failure.
/// `offline_access` must be in scope for a refresh token to be issued.
pub fn microsoft(tenant: &str) -> Result<ProviderDescriptor, ProviderDescriptorError> {
	let base = format!("https://login.microsoftonline.com/{tenant}/oauth2/v2.0");
	let quirks = ProviderQuirks::default().with_authorize_param("response_mode", "query");

	ProviderDescriptor::builder(ProviderKind::Microsoft)
		.authorization_endpoint(endpoint_url("authorization", &format!("{base}/authorize"))?)
		.token_endpoint(endpoint_url("token", &format!("{base}/token"))?)
		.support_operations([Operation::Exchange, Operation::Refresh])
		.preferred_client_auth_method(ClientAuthMethod::ClientSecretPost)
		.default_scopes(["openid", "profile", "email", "User.Read", "offline_access"])
		.quirks(quirks)
		.build()
}

fn endpoint_url(name: &'static str, raw: &str) -> Result<Url, ProviderDescriptorError> {
	Url::parse(raw)
		.map_err(|source| ProviderDescriptorError::InvalidEndpointUrl { endpoint: name, source })
}
