//! Shared helpers for flow implementations (scope formatting, client auth, dispatch).

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
// self
use crate::{
	_prelude::*,
	auth::ScopeSet,
	config::ClientCredentials,
	error::{ConfigError, ProviderRejection},
	flows::{Broker, ProviderHandle},
	http::{TokenHttpClient, WireResponse},
	normalize,
	provider::{ClientAuthMethod, Operation, ProviderErrorContext, ProviderErrorKind},
};

/// Joins normalized scopes with the provider's delimiter when building requests.
pub(crate) fn format_scope(scope: &ScopeSet, delimiter: char) -> Option<String> {
	if scope.is_empty() {
		return None;
	}
	if delimiter == ' ' {
		return Some(scope.normalized());
	}

	let mut buf = String::new();

	for (idx, value) in scope.iter().enumerate() {
		if idx > 0 {
			buf.push(delimiter);
		}

		buf.push_str(value);
	}

	Some(buf)
}

/// Resolves the scope to request: caller's choice, or the descriptor's defaults.
pub(crate) fn effective_scope(
	handle: &ProviderHandle,
	requested: Option<ScopeSet>,
) -> Result<ScopeSet> {
	match requested {
		Some(scope) if !scope.is_empty() => Ok(scope),
		_ => ScopeSet::new(handle.descriptor.default_scopes.iter().map(String::as_str)).map_err(
			|err| Error::Internal {
				message: format!(
					"default scopes for provider `{}` failed validation: {err}",
					handle.descriptor.kind
				),
			},
		),
	}
}

/// Applies the descriptor's preferred client authentication to an outgoing request.
pub(crate) fn apply_client_auth(
	method: ClientAuthMethod,
	credentials: &ClientCredentials,
	form: &mut BTreeMap<String, String>,
	headers: &mut Vec<(String, String)>,
) {
	match method {
		ClientAuthMethod::ClientSecretBasic => {
			let secret =
				credentials.client_secret.as_ref().map(|secret| secret.expose()).unwrap_or("");
			let encoded = STANDARD.encode(format!("{}:{secret}", credentials.client_id));

			headers.push(("Authorization".into(), format!("Basic {encoded}")));
		},
		ClientAuthMethod::ClientSecretPost => {
			form.insert("client_id".into(), credentials.client_id.clone());

			if let Some(secret) = credentials.client_secret.as_ref() {
				form.insert("client_secret".into(), secret.expose().to_owned());
			}
		},
	}
}

/// Dispatches one form POST for the operation, with client auth and strategy hooks
/// applied. Credentials are resolved per call; nothing is retained on the client.
pub(crate) async fn call_endpoint<C>(
	broker: &Broker<C>,
	handle: &ProviderHandle,
	operation: Operation,
	url: &Url,
	mut form: BTreeMap<String, String>,
) -> Result<WireResponse>
where
	C: ?Sized + TokenHttpClient,
{
	let credentials = handle.credentials.as_ref().ok_or(ConfigError::MissingClientCredentials {
		provider: handle.descriptor.kind,
	})?;
	let mut headers = Vec::new();

	handle.strategy.augment_token_request(operation, &mut form);
	apply_client_auth(
		handle.descriptor.preferred_client_auth_method,
		credentials,
		&mut form,
		&mut headers,
	);

	let form = form.into_iter().collect::<Vec<_>>();
	let response = broker.http_client.post_form(url, &form, &headers).await?;

	Ok(response)
}

/// Classifies a non-2xx provider response, preserving its diagnostics verbatim.
pub(crate) fn classify_failure(
	handle: &ProviderHandle,
	operation: Operation,
	response: &WireResponse,
) -> (ProviderErrorKind, ProviderRejection) {
	let payload = normalize::parse_error_payload(&response.body).unwrap_or_default();
	let mut ctx = ProviderErrorContext::new(operation).with_http_status(response.status);

	if let Some(error) = payload.error.as_deref() {
		ctx = ctx.with_oauth_error(error);
	}
	if let Some(description) = payload.error_description.as_deref() {
		ctx = ctx.with_error_description(description);
	}
	if payload.error.is_none() && payload.error_description.is_none() {
		ctx = ctx.with_body_preview(response.body_text());
	}

	let kind = handle.strategy.classify_error(&ctx);
	let rejection = ProviderRejection {
		provider: handle.descriptor.kind,
		operation,
		kind,
		code: payload.error,
		description: payload.error_description,
		http_status: Some(response.status),
	};

	(kind, rejection)
}

/// Maps a classified failure into the broker taxonomy for non-revocation flows.
pub(crate) fn failure_error(kind: ProviderErrorKind, rejection: ProviderRejection) -> Error {
	match kind {
		ProviderErrorKind::InvalidToken => Error::InvalidToken { reason: rejection.to_string() },
		_ => Error::Provider(rejection),
	}
}

/// Rejects redirect URIs outside the http(s) schemes before any outbound call.
pub(crate) fn validate_redirect_uri(redirect_uri: &Url) -> Result<()> {
	if matches!(redirect_uri.scheme(), "http" | "https") {
		Ok(())
	} else {
		Err(crate::error::InputError::Invalid {
			field: "redirectUri",
			reason: format!("unsupported scheme `{}`", redirect_uri.scheme()),
		}
		.into())
	}
}

/// Rejects absent or blank string inputs before any outbound call.
pub(crate) fn require_field(field: &'static str, value: &str) -> Result<()> {
	if value.trim().is_empty() {
		Err(crate::error::InputError::Missing { field }.into())
	} else {
		Ok(())
	}
}
