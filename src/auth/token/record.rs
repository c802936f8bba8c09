//! Immutable canonical token record and its builder.

// self
use crate::{
	_prelude::*,
	auth::{ScopeSet, token::secret::TokenSecret},
	provider::ProviderKind,
};

/// Current lifecycle status for a token record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenStatus {
	/// Token is currently valid.
	Active,
	/// Token exceeded its expiry instant.
	Expired,
}

/// Errors produced by [`TokenRecordBuilder`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum TokenRecordBuilderError {
	/// Issued when no access token value was provided.
	#[error("Access token is required.")]
	MissingAccessToken,
	/// Issued when no expiry (absolute or relative) was configured.
	#[error("Expiry must be supplied via expires_at or expires_in.")]
	MissingExpiry,
	/// Issued when a relative expiry overflows the representable instant range.
	#[error("Expiry exceeds the representable time range.")]
	ExpiryOutOfRange,
}

/// Provider-agnostic record describing issued OAuth tokens.
///
/// Records are produced by the exchange and refresh flows, handed straight back to the
/// caller, and never persisted by the broker. `expires_at` is always an absolute
/// instant; relative provider expiries are converted exactly once, at normalization.
#[derive(Clone, Serialize, Deserialize)]
pub struct TokenRecord {
	/// Provider adapter that produced this record.
	pub provider: ProviderKind,
	/// Access token secret; callers must avoid logging it.
	pub access_token: TokenSecret,
	/// Refresh token secret. Absence is a preservable state, not an error: after a
	/// refresh the normalizer echoes the caller's previous value here instead.
	pub refresh_token: Option<TokenSecret>,
	/// Normalized token scheme label (`Bearer` when the provider omits one).
	pub token_type: String,
	/// Normalized scopes granted to this record.
	pub scope: ScopeSet,
	/// Instant the broker observed the provider response.
	pub issued_at: OffsetDateTime,
	/// Absolute expiry instant derived from the provider response.
	pub expires_at: OffsetDateTime,
	/// OpenID Connect ID token, when the provider issued one.
	pub id_token: Option<TokenSecret>,
}
impl TokenRecord {
	/// Returns a builder for constructing records.
	pub fn builder(provider: ProviderKind, scope: ScopeSet) -> TokenRecordBuilder {
		TokenRecordBuilder::new(provider, scope)
	}

	/// Computes the lifecycle status at a given instant.
	pub fn status_at(&self, instant: OffsetDateTime) -> TokenStatus {
		if instant >= self.expires_at { TokenStatus::Expired } else { TokenStatus::Active }
	}

	/// Convenience helper that checks the status using the current UTC instant.
	pub fn status(&self) -> TokenStatus {
		self.status_at(OffsetDateTime::now_utc())
	}

	/// Returns `true` if the record has expired at the provided instant.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		matches!(self.status_at(instant), TokenStatus::Expired)
	}

	/// Returns `true` if the record is expired relative to the current clock.
	pub fn is_expired(&self) -> bool {
		matches!(self.status(), TokenStatus::Expired)
	}
}
impl Debug for TokenRecord {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenRecord")
			.field("provider", &self.provider)
			.field("access_token", &TokenSecret::REDACTED)
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| TokenSecret::REDACTED))
			.field("token_type", &self.token_type)
			.field("scope", &self.scope)
			.field("issued_at", &self.issued_at)
			.field("expires_at", &self.expires_at)
			.field("id_token", &self.id_token.as_ref().map(|_| TokenSecret::REDACTED))
			.finish()
	}
}

/// Builder for [`TokenRecord`].
#[derive(Clone, Debug)]
pub struct TokenRecordBuilder {
	provider: ProviderKind,
	scope: ScopeSet,
	access_token: Option<TokenSecret>,
	refresh_token: Option<TokenSecret>,
	token_type: Option<String>,
	id_token: Option<TokenSecret>,
	issued_at: Option<OffsetDateTime>,
	expires_at: Option<OffsetDateTime>,
	expires_in: Option<Duration>,
}
impl TokenRecordBuilder {
	/// Default token scheme label applied when the provider omits `token_type`.
	pub const DEFAULT_TOKEN_TYPE: &'static str = "Bearer";

	fn new(provider: ProviderKind, scope: ScopeSet) -> Self {
		Self {
			provider,
			scope,
			access_token: None,
			refresh_token: None,
			token_type: None,
			id_token: None,
			issued_at: None,
			expires_at: None,
			expires_in: None,
		}
	}

	/// Sets the issued-at instant.
	pub fn issued_at(mut self, instant: OffsetDateTime) -> Self {
		self.issued_at = Some(instant);

		self
	}

	/// Sets an absolute expiry instant.
	pub fn expires_at(mut self, instant: OffsetDateTime) -> Self {
		self.expires_at = Some(instant);

		self
	}

	/// Sets a relative expiry duration from the issued instant.
	pub fn expires_in(mut self, duration: Duration) -> Self {
		self.expires_in = Some(duration);

		self
	}

	/// Provides the access token value.
	pub fn access_token(mut self, token: impl Into<String>) -> Self {
		self.access_token = Some(TokenSecret::new(token));

		self
	}

	/// Provides the refresh token value.
	pub fn refresh_token(mut self, token: impl Into<String>) -> Self {
		self.refresh_token = Some(TokenSecret::new(token));

		self
	}

	/// Provides the token scheme label.
	pub fn token_type(mut self, token_type: impl Into<String>) -> Self {
		self.token_type = Some(token_type.into());

		self
	}

	/// Provides the OpenID Connect ID token.
	pub fn id_token(mut self, token: impl Into<String>) -> Self {
		self.id_token = Some(TokenSecret::new(token));

		self
	}

	/// Consumes the builder and produces a [`TokenRecord`].
	pub fn build(self) -> Result<TokenRecord, TokenRecordBuilderError> {
		let access_token = self.access_token.ok_or(TokenRecordBuilderError::MissingAccessToken)?;
		let issued_at = self.issued_at.unwrap_or_else(OffsetDateTime::now_utc);
		let expires_at = match (self.expires_at, self.expires_in) {
			(Some(instant), _) => instant,
			(None, Some(delta)) =>
				issued_at.checked_add(delta).ok_or(TokenRecordBuilderError::ExpiryOutOfRange)?,
			(None, None) => return Err(TokenRecordBuilderError::MissingExpiry),
		};

		Ok(TokenRecord {
			provider: self.provider,
			access_token,
			refresh_token: self.refresh_token,
			token_type: self.token_type.unwrap_or_else(|| Self::DEFAULT_TOKEN_TYPE.to_owned()),
			scope: self.scope,
			issued_at,
			expires_at,
			id_token: self.id_token,
		})
	}
}
