//! Response Normalizer: validated intermediate payload structures and their mapping
//! into the canonical token model.
//!
//! Providers disagree on nearly every detail of a token response: absolute
//! `expiry_date` milliseconds versus relative `expires_in` seconds, optional
//! refresh-token reissue, optional `token_type`, scope strings with varying
//! delimiters, string-typed numbers and booleans on introspection payloads. All of
//! that divergence is resolved here, exactly once, at the provider boundary. Flows
//! never see raw provider JSON.

// self
use crate::{
	_prelude::*,
	auth::{ScopeSet, TokenRecord},
	error::MalformedResponseError,
	provider::{Operation, ProviderKind},
};

/// Integer field that some providers serialize as a JSON string.
///
/// Google's `tokeninfo` endpoint returns `expires_in` as a string; the token
/// endpoint returns it as a number.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum LenientInt {
	/// Plain JSON number.
	Int(i64),
	/// Stringified number.
	Str(String),
}
impl LenientInt {
	/// Returns the numeric value, if it parses.
	pub fn value(&self) -> Option<i64> {
		match self {
			Self::Int(value) => Some(*value),
			Self::Str(value) => value.trim().parse().ok(),
		}
	}
}

/// Boolean field that some providers serialize as a JSON string.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum LenientBool {
	/// Plain JSON boolean.
	Bool(bool),
	/// Stringified boolean.
	Str(String),
}
impl LenientBool {
	/// Returns the boolean value, if it parses.
	pub fn value(&self) -> Option<bool> {
		match self {
			Self::Bool(value) => Some(*value),
			Self::Str(value) => value.trim().parse().ok(),
		}
	}
}

/// Raw token endpoint payload prior to normalization.
///
/// Every field is optional; requiredness is enforced during normalization so missing
/// fields produce a precise diagnostic instead of a parse failure.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawTokenPayload {
	/// Opaque bearer credential.
	pub access_token: Option<String>,
	/// Refresh token, when the provider (re)issued one.
	pub refresh_token: Option<String>,
	/// Token scheme label.
	pub token_type: Option<String>,
	/// Provider-delimited scope string.
	pub scope: Option<String>,
	/// Relative seconds-to-expiry.
	pub expires_in: Option<LenientInt>,
	/// Absolute expiry in Unix milliseconds.
	pub expiry_date: Option<i64>,
	/// OpenID Connect ID token.
	pub id_token: Option<String>,
}

/// Raw OAuth error payload returned with non-2xx statuses.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawErrorPayload {
	/// OAuth `error` code.
	pub error: Option<String>,
	/// OAuth `error_description` text.
	pub error_description: Option<String>,
}

/// Raw introspection payload prior to normalization.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawIntrospectionPayload {
	/// Provider-delimited scope string.
	pub scope: Option<String>,
	/// Relative seconds-to-expiry.
	pub expires_in: Option<LenientInt>,
	/// Absolute expiry as a Unix timestamp in seconds.
	pub exp: Option<LenientInt>,
	/// Subject identifier.
	pub sub: Option<String>,
	/// Email claim, where the provider exposes one.
	pub email: Option<String>,
	/// Email verification claim.
	pub email_verified: Option<LenientBool>,
}

/// Normalized introspection result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TokenIntrospection {
	/// Provider that performed the introspection.
	pub provider: ProviderKind,
	/// Scopes the token currently covers.
	pub scope: ScopeSet,
	/// Remaining lifetime reported by the provider.
	pub expires_in: Duration,
	/// Subject claims limited to what the provider's introspection exposes.
	pub claims: SubjectClaims,
}

/// Subject claims surfaced by introspection.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SubjectClaims {
	/// Stable subject identifier.
	pub subject: Option<String>,
	/// Email address, where exposed.
	pub email: Option<String>,
	/// Whether the provider verified the email address.
	pub email_verified: Option<bool>,
}

/// Inputs the normalizer needs alongside a raw token payload.
#[derive(Clone, Copy, Debug)]
pub struct TokenContext<'a> {
	/// Provider that produced the payload.
	pub provider: ProviderKind,
	/// Instant the broker observed the response; anchors relative expiries.
	pub observed_at: OffsetDateTime,
	/// Delimiter the provider uses inside scope strings.
	pub scope_delimiter: char,
	/// Refresh token the caller supplied, echoed when the provider omits a new one.
	pub prior_refresh_token: Option<&'a str>,
	/// Scope fallback when the provider omits the `scope` field (per RFC 6749 an
	/// omitted scope means "as requested").
	pub fallback_scope: Option<&'a ScopeSet>,
}

/// Parses a token endpoint payload, reporting the offending JSON path on failure.
pub fn parse_token_payload(
	operation: Operation,
	body: &[u8],
) -> Result<RawTokenPayload, MalformedResponseError> {
	parse_json(operation, body)
}

/// Parses an introspection payload, reporting the offending JSON path on failure.
pub fn parse_introspection_payload(
	body: &[u8],
) -> Result<RawIntrospectionPayload, MalformedResponseError> {
	parse_json(Operation::Validate, body)
}

/// Parses an OAuth error payload leniently; malformed bodies yield `None` so callers
/// can fall back to a body preview instead of masking the original failure.
pub fn parse_error_payload(body: &[u8]) -> Option<RawErrorPayload> {
	serde_json::from_slice(body).ok()
}

fn parse_json<T>(operation: Operation, body: &[u8]) -> Result<T, MalformedResponseError>
where
	T: for<'de> Deserialize<'de>,
{
	let mut deserializer = serde_json::Deserializer::from_slice(body);

	serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| MalformedResponseError::Json { operation, source })
}

/// Maps a raw token payload into the canonical [`TokenRecord`].
///
/// This is the single point where relative expiries become absolute instants, where
/// `token_type` defaults to `Bearer`, and where a missing refresh token is replaced
/// by the caller's previous one rather than silently dropped.
pub fn token_record(
	ctx: TokenContext<'_>,
	raw: RawTokenPayload,
) -> Result<TokenRecord, MalformedResponseError> {
	let access_token =
		raw.access_token.ok_or(MalformedResponseError::MissingField { field: "access_token" })?;
	let expires_at = expiry_instant(ctx.observed_at, raw.expiry_date, raw.expires_in.as_ref())?;
	let scope = match raw.scope.as_deref() {
		Some(wire) => ScopeSet::parse_delimited(wire, ctx.scope_delimiter)?,
		None => ctx.fallback_scope.cloned().unwrap_or_default(),
	};
	let mut builder = TokenRecord::builder(ctx.provider, scope)
		.access_token(access_token)
		.token_type(normalize_token_type(raw.token_type.as_deref()))
		.issued_at(ctx.observed_at)
		.expires_at(expires_at);

	match raw.refresh_token {
		Some(refresh) => builder = builder.refresh_token(refresh),
		None =>
			if let Some(prior) = ctx.prior_refresh_token {
				builder = builder.refresh_token(prior);
			},
	}

	if let Some(id_token) = raw.id_token {
		builder = builder.id_token(id_token);
	}

	builder.build().map_err(|err| match err {
		crate::auth::TokenRecordBuilderError::MissingAccessToken =>
			MalformedResponseError::MissingField { field: "access_token" },
		crate::auth::TokenRecordBuilderError::MissingExpiry => MalformedResponseError::MissingExpiry,
		crate::auth::TokenRecordBuilderError::ExpiryOutOfRange =>
			MalformedResponseError::ExpiryOutOfRange,
	})
}

/// Maps a raw introspection payload into the normalized [`TokenIntrospection`].
pub fn introspection(
	provider: ProviderKind,
	observed_at: OffsetDateTime,
	scope_delimiter: char,
	raw: RawIntrospectionPayload,
) -> Result<TokenIntrospection, MalformedResponseError> {
	let scope = match raw.scope.as_deref() {
		Some(wire) => ScopeSet::parse_delimited(wire, scope_delimiter)?,
		None => ScopeSet::default(),
	};
	let expires_in = match raw.expires_in.as_ref() {
		Some(value) =>
			Duration::seconds(value.value().ok_or(MalformedResponseError::ExpiryOutOfRange)?),
		// Fall back to the absolute `exp` claim relative to the observed instant.
		None => match raw.exp.as_ref() {
			Some(exp) => {
				let instant = OffsetDateTime::from_unix_timestamp(
					exp.value().ok_or(MalformedResponseError::ExpiryOutOfRange)?,
				)
				.map_err(|_| MalformedResponseError::ExpiryOutOfRange)?;

				instant - observed_at
			},
			None => return Err(MalformedResponseError::MissingExpiry),
		},
	};

	if !expires_in.is_positive() {
		return Err(MalformedResponseError::NonPositiveExpiry);
	}

	Ok(TokenIntrospection {
		provider,
		scope,
		expires_in,
		claims: SubjectClaims {
			subject: raw.sub,
			email: raw.email,
			email_verified: raw.email_verified.and_then(|value| value.value()),
		},
	})
}

fn expiry_instant(
	observed_at: OffsetDateTime,
	expiry_date: Option<i64>,
	expires_in: Option<&LenientInt>,
) -> Result<OffsetDateTime, MalformedResponseError> {
	// Prefer the absolute form when a provider supplies both.
	if let Some(millis) = expiry_date {
		return OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000)
			.map_err(|_| MalformedResponseError::ExpiryOutOfRange);
	}
	if let Some(value) = expires_in {
		let seconds = value.value().ok_or(MalformedResponseError::ExpiryOutOfRange)?;

		if seconds <= 0 {
			return Err(MalformedResponseError::NonPositiveExpiry);
		}

		return observed_at
			.checked_add(Duration::seconds(seconds))
			.ok_or(MalformedResponseError::ExpiryOutOfRange);
	}

	Err(MalformedResponseError::MissingExpiry)
}

fn normalize_token_type(raw: Option<&str>) -> String {
	match raw {
		None => "Bearer".to_owned(),
		Some(value) if value.eq_ignore_ascii_case("bearer") => "Bearer".to_owned(),
		Some(value) => value.to_owned(),
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	fn ctx(observed_at: OffsetDateTime) -> TokenContext<'static> {
		TokenContext {
			provider: ProviderKind::Google,
			observed_at,
			scope_delimiter: ' ',
			prior_refresh_token: None,
			fallback_scope: None,
		}
	}

	#[test]
	fn relative_expiry_converts_against_observed_instant() {
		let observed = macros::datetime!(2025-06-01 12:00 UTC);
		let raw = RawTokenPayload {
			access_token: Some("at1".into()),
			expires_in: Some(LenientInt::Int(3600)),
			..RawTokenPayload::default()
		};
		let record = token_record(ctx(observed), raw).expect("Relative expiry should normalize.");

		assert_eq!(record.expires_at, macros::datetime!(2025-06-01 13:00 UTC));
		assert_eq!(record.issued_at, observed);
	}

	#[test]
	fn absolute_expiry_millis_wins_over_relative_seconds() {
		let observed = macros::datetime!(2025-06-01 12:00 UTC);
		let expiry = macros::datetime!(2025-06-01 12:30 UTC);
		let raw = RawTokenPayload {
			access_token: Some("at1".into()),
			expires_in: Some(LenientInt::Int(3600)),
			expiry_date: Some(expiry.unix_timestamp() * 1_000),
			..RawTokenPayload::default()
		};
		let record = token_record(ctx(observed), raw).expect("Absolute expiry should normalize.");

		assert_eq!(record.expires_at, expiry);
	}

	#[test]
	fn missing_refresh_token_echoes_the_prior_one() {
		let observed = macros::datetime!(2025-06-01 12:00 UTC);
		let raw = RawTokenPayload {
			access_token: Some("at2".into()),
			expires_in: Some(LenientInt::Int(3600)),
			..RawTokenPayload::default()
		};
		let context = TokenContext { prior_refresh_token: Some("rt1"), ..ctx(observed) };
		let record = token_record(context, raw).expect("Refresh echo should normalize.");

		assert_eq!(record.refresh_token.as_ref().map(|secret| secret.expose()), Some("rt1"));
	}

	#[test]
	fn provider_issued_refresh_token_takes_precedence() {
		let observed = macros::datetime!(2025-06-01 12:00 UTC);
		let raw = RawTokenPayload {
			access_token: Some("at2".into()),
			refresh_token: Some("rt2".into()),
			expires_in: Some(LenientInt::Int(3600)),
			..RawTokenPayload::default()
		};
		let context = TokenContext { prior_refresh_token: Some("rt1"), ..ctx(observed) };
		let record = token_record(context, raw).expect("Rotation should normalize.");

		assert_eq!(record.refresh_token.as_ref().map(|secret| secret.expose()), Some("rt2"));
	}

	#[test]
	fn token_type_defaults_and_normalizes_to_bearer() {
		let observed = macros::datetime!(2025-06-01 12:00 UTC);
		let raw = RawTokenPayload {
			access_token: Some("at1".into()),
			expires_in: Some(LenientInt::Int(60)),
			..RawTokenPayload::default()
		};

		assert_eq!(
			token_record(ctx(observed), raw.clone())
				.expect("Missing token_type should normalize.")
				.token_type,
			"Bearer",
		);

		let lowercase = RawTokenPayload { token_type: Some("bearer".into()), ..raw };

		assert_eq!(
			token_record(ctx(observed), lowercase)
				.expect("Lowercase token_type should normalize.")
				.token_type,
			"Bearer",
		);
	}

	#[test]
	fn expiry_must_be_present_and_positive() {
		let observed = macros::datetime!(2025-06-01 12:00 UTC);
		let missing = RawTokenPayload {
			access_token: Some("at1".into()),
			..RawTokenPayload::default()
		};

		assert!(matches!(
			token_record(ctx(observed), missing),
			Err(MalformedResponseError::MissingExpiry),
		));

		let negative = RawTokenPayload {
			access_token: Some("at1".into()),
			expires_in: Some(LenientInt::Int(-5)),
			..RawTokenPayload::default()
		};

		assert!(matches!(
			token_record(ctx(observed), negative),
			Err(MalformedResponseError::NonPositiveExpiry),
		));
	}

	#[test]
	fn overflowing_relative_expiry_is_rejected_not_propagated() {
		let observed = macros::datetime!(2025-06-01 12:00 UTC);
		let hostile = RawTokenPayload {
			access_token: Some("at1".into()),
			expires_in: Some(LenientInt::Int(i64::MAX)),
			..RawTokenPayload::default()
		};

		assert!(matches!(
			token_record(ctx(observed), hostile),
			Err(MalformedResponseError::ExpiryOutOfRange),
		));
	}

	#[test]
	fn introspection_tolerates_string_typed_fields() {
		let observed = macros::datetime!(2025-06-01 12:00 UTC);
		let raw = RawIntrospectionPayload {
			scope: Some("openid email".into()),
			expires_in: Some(LenientInt::Str("2048".into())),
			email: Some("user@example.com".into()),
			email_verified: Some(LenientBool::Str("true".into())),
			..RawIntrospectionPayload::default()
		};
		let result = introspection(ProviderKind::Google, observed, ' ', raw)
			.expect("String-typed introspection fields should normalize.");

		assert_eq!(result.expires_in, Duration::seconds(2048));
		assert_eq!(result.claims.email.as_deref(), Some("user@example.com"));
		assert_eq!(result.claims.email_verified, Some(true));
	}

	#[test]
	fn introspection_falls_back_to_absolute_exp_claim() {
		let observed = macros::datetime!(2025-06-01 12:00 UTC);
		let raw = RawIntrospectionPayload {
			exp: Some(LenientInt::Int(macros::datetime!(2025-06-01 12:10 UTC).unix_timestamp())),
			..RawIntrospectionPayload::default()
		};
		let result = introspection(ProviderKind::Google, observed, ' ', raw)
			.expect("Absolute exp claim should normalize.");

		assert_eq!(result.expires_in, Duration::minutes(10));
	}

	#[test]
	fn malformed_json_reports_the_offending_path() {
		let err = parse_token_payload(Operation::Exchange, b"{\"expires_in\": {}}")
			.expect_err("Objects are not valid expiry values.");

		assert!(matches!(err, MalformedResponseError::Json { .. }));
	}
}
