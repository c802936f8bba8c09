//! Canonical response envelope and wire payloads for an HTTP surface.
//!
//! Every response, success or failure, is wrapped in the same
//! `{success, data?, error?, message?}` envelope; the `error` field carries the
//! stable taxonomy label from [`Error::kind_label`] and `message` a human-readable
//! summary. Payloads use camelCase field names on the wire. The HTTP transport
//! itself (routing, body parsing) is out of scope; pair [`Envelope::failure`] with
//! [`Error::http_status`] to produce a full response.

// self
use crate::{
	_prelude::*,
	auth::TokenRecord,
	flows::{AuthorizationUrl, ExchangeOutcome, ExchangeWarning, RevocationOutcome},
	normalize::TokenIntrospection,
	provider::ProviderKind,
};

/// Uniform response envelope for every broker operation.
#[derive(Clone, Debug, Serialize)]
pub struct Envelope<T> {
	/// Whether the operation succeeded.
	pub success: bool,
	/// Operation payload, present on success.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub data: Option<T>,
	/// Stable error-category label, present on failure.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<&'static str>,
	/// Human-readable summary, present on failure.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub message: Option<String>,
}
impl<T> Envelope<T> {
	/// Wraps a successful payload.
	pub fn success(data: T) -> Self {
		Self { success: true, data: Some(data), error: None, message: None }
	}

	/// Wraps a broker error; secrets never appear in the rendered message.
	pub fn failure(err: &Error) -> Self {
		Self {
			success: false,
			data: None,
			error: Some(err.kind_label()),
			message: Some(err.to_string()),
		}
	}
}

/// Wire payload for the authorization URL operation.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationUrlPayload {
	/// Complete authorization URL to redirect the user to.
	pub auth_url: Url,
	/// Redirect URI embedded in the URL.
	pub redirect_uri: Url,
	/// Caller's `state` value, echoed verbatim.
	pub state: String,
}
impl From<AuthorizationUrl> for AuthorizationUrlPayload {
	fn from(value: AuthorizationUrl) -> Self {
		Self { auth_url: value.url, redirect_uri: value.redirect_uri, state: value.state }
	}
}

/// Wire payload for exchange and refresh results.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRecordPayload {
	/// Provider that issued the tokens.
	pub provider: ProviderKind,
	/// Access token, returned to the caller by design.
	pub access_token: String,
	/// Refresh token, when one is held for the caller.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub refresh_token: Option<String>,
	/// Token scheme label.
	pub token_type: String,
	/// Normalized scope list.
	pub scope: Vec<String>,
	/// Instant the tokens were issued, RFC 3339.
	#[serde(with = "time::serde::rfc3339")]
	pub issued_at: OffsetDateTime,
	/// Absolute expiry instant, RFC 3339.
	#[serde(with = "time::serde::rfc3339")]
	pub expires_at: OffsetDateTime,
	/// OpenID Connect ID token, when issued.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub id_token: Option<String>,
	/// Non-fatal findings attached to the operation.
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub warnings: Vec<ExchangeWarning>,
}
impl TokenRecordPayload {
	/// Builds the wire payload from a canonical record plus warnings.
	pub fn new(record: &TokenRecord, warnings: Vec<ExchangeWarning>) -> Self {
		Self {
			provider: record.provider,
			access_token: record.access_token.expose().to_owned(),
			refresh_token: record
				.refresh_token
				.as_ref()
				.map(|secret| secret.expose().to_owned()),
			token_type: record.token_type.clone(),
			scope: record.scope.iter().map(str::to_owned).collect(),
			issued_at: record.issued_at,
			expires_at: record.expires_at,
			id_token: record.id_token.as_ref().map(|secret| secret.expose().to_owned()),
			warnings,
		}
	}
}
impl From<ExchangeOutcome> for TokenRecordPayload {
	fn from(value: ExchangeOutcome) -> Self {
		Self::new(&value.record, value.warnings)
	}
}
impl From<TokenRecord> for TokenRecordPayload {
	fn from(value: TokenRecord) -> Self {
		Self::new(&value, Vec::new())
	}
}

/// Wire payload for the validation operation.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationPayload {
	/// Scopes the token currently covers.
	pub scope: Vec<String>,
	/// Remaining token lifetime in whole seconds.
	pub expires_in_seconds: i64,
	/// Subject claims exposed by the provider's introspection.
	pub subject_claims: SubjectClaimsPayload,
}
impl From<TokenIntrospection> for ValidationPayload {
	fn from(value: TokenIntrospection) -> Self {
		Self {
			scope: value.scope.iter().map(str::to_owned).collect(),
			expires_in_seconds: value.expires_in.whole_seconds(),
			subject_claims: SubjectClaimsPayload {
				subject: value.claims.subject,
				email: value.claims.email,
				email_verified: value.claims.email_verified,
			},
		}
	}
}

/// Subject claims as exposed on the wire.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectClaimsPayload {
	/// Stable subject identifier.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub subject: Option<String>,
	/// Email address, where exposed.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub email: Option<String>,
	/// Whether the provider verified the email address.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub email_verified: Option<bool>,
}

/// Wire payload for the revocation operation.
#[derive(Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevocationPayload {
	/// Whether the token is no longer usable (true for both outcomes).
	pub revoked: bool,
	/// Whether the provider indicated the token was already invalid.
	pub already_revoked: bool,
}
impl From<RevocationOutcome> for RevocationPayload {
	fn from(value: RevocationOutcome) -> Self {
		Self {
			revoked: value.revoked(),
			already_revoked: matches!(value, RevocationOutcome::AlreadyRevoked),
		}
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	use time::macros;
	// self
	use super::*;
	use crate::{auth::ScopeSet, error::InputError};

	#[test]
	fn envelope_failure_carries_label_and_message() {
		let err = Error::from(InputError::Missing { field: "code" });
		let envelope = Envelope::<RevocationPayload>::failure(&err);
		let rendered =
			serde_json::to_value(&envelope).expect("Failure envelope should serialize.");

		assert_eq!(
			rendered,
			json!({
				"success": false,
				"error": "input_error",
				"message": "Missing required field `code`.",
			}),
		);
	}

	#[test]
	fn token_payload_uses_camel_case_and_rfc3339() {
		let record = TokenRecord::builder(
			ProviderKind::Google,
			ScopeSet::new(["openid", "email"]).expect("Scope fixture should be valid."),
		)
		.access_token("at1")
		.refresh_token("rt1")
		.issued_at(macros::datetime!(2025-06-01 12:00 UTC))
		.expires_at(macros::datetime!(2025-06-01 13:00 UTC))
		.build()
		.expect("Record fixture should build.");
		let rendered = serde_json::to_value(Envelope::success(TokenRecordPayload::new(
			&record,
			vec![ExchangeWarning::RefreshTokenNotIssued],
		)))
		.expect("Success envelope should serialize.");

		assert_eq!(rendered["success"], json!(true));
		assert_eq!(rendered["data"]["accessToken"], json!("at1"));
		assert_eq!(rendered["data"]["refreshToken"], json!("rt1"));
		assert_eq!(rendered["data"]["tokenType"], json!("Bearer"));
		assert_eq!(rendered["data"]["scope"], json!(["email", "openid"]));
		assert_eq!(rendered["data"]["issuedAt"], json!("2025-06-01T12:00:00Z"));
		assert_eq!(rendered["data"]["expiresAt"], json!("2025-06-01T13:00:00Z"));
		assert_eq!(rendered["data"]["warnings"], json!(["refresh_token_not_issued"]));
		assert!(rendered["data"].get("idToken").is_none());
	}

	#[test]
	fn revocation_payload_distinguishes_repeat_revocations() {
		let first = serde_json::to_value(RevocationPayload::from(RevocationOutcome::Revoked))
			.expect("First revocation payload should serialize.");
		let repeat =
			serde_json::to_value(RevocationPayload::from(RevocationOutcome::AlreadyRevoked))
				.expect("Repeat revocation payload should serialize.");

		assert_eq!(first, json!({"revoked": true, "alreadyRevoked": false}));
		assert_eq!(repeat, json!({"revoked": true, "alreadyRevoked": true}));
	}
}
