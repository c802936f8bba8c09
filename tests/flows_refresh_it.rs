#![cfg(all(feature = "reqwest", feature = "test"))]

// crates.io
use httpmock::prelude::*;
// self
use credential_broker::{
	_preludet::*,
	auth::ScopeSet,
	flows::RefreshRequest,
	provider::{ClientAuthMethod, Operation, ProviderDescriptor, ProviderErrorKind, ProviderKind},
};

const CLIENT_ID: &str = "client-refresh";
const CLIENT_SECRET: &str = "secret-refresh";

fn build_descriptor(server: &MockServer) -> ProviderDescriptor {
	ProviderDescriptor::builder(ProviderKind::Google)
		.authorization_endpoint(
			Url::parse(&server.url("/authorize"))
				.expect("Mock authorize endpoint should parse successfully."),
		)
		.token_endpoint(
			Url::parse(&server.url("/token"))
				.expect("Mock token endpoint should parse successfully."),
		)
		.support_operations([Operation::Exchange, Operation::Refresh])
		.preferred_client_auth_method(ClientAuthMethod::ClientSecretPost)
		.build()
		.expect("Provider descriptor should build successfully.")
}

#[tokio::test]
async fn refresh_echoes_prior_refresh_token_when_provider_omits_one() {
	let server = MockServer::start_async().await;
	let broker = build_reqwest_test_broker(build_descriptor(&server), CLIENT_ID, CLIENT_SECRET);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/token")
				.body_includes("grant_type=refresh_token")
				.body_includes("refresh_token=rt1");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"at2\",\"token_type\":\"bearer\",\"expires_in\":3600}");
		})
		.await;
	let record = broker
		.refresh_token(RefreshRequest::new(ProviderKind::Google, "rt1"))
		.await
		.expect("Refresh should succeed.");

	mock.assert_async().await;

	assert_eq!(record.access_token.expose(), "at2");
	// The provider omitted the refresh token; the caller's value is echoed, not lost.
	assert_eq!(record.refresh_token.as_ref().map(|secret| secret.expose()), Some("rt1"));
	assert_eq!(record.expires_at - record.issued_at, Duration::seconds(3600));
}

#[tokio::test]
async fn refresh_prefers_rotated_refresh_token() {
	let server = MockServer::start_async().await;
	let broker = build_reqwest_test_broker(build_descriptor(&server), CLIENT_ID, CLIENT_SECRET);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"at3\",\"refresh_token\":\"rt2\",\"expires_in\":3600,\
				\"scope\":\"openid email\"}",
			);
		})
		.await;
	let record = broker
		.refresh_token(
			RefreshRequest::new(ProviderKind::Google, "rt1").with_scope(
				ScopeSet::new(["openid", "email"]).expect("Scope fixture should be valid."),
			),
		)
		.await
		.expect("Refresh with rotation should succeed.");

	mock.assert_async().await;

	assert_eq!(record.refresh_token.as_ref().map(|secret| secret.expose()), Some("rt2"));
	assert_eq!(record.scope.normalized(), "email openid");
}

#[tokio::test]
async fn refresh_rejection_stays_distinguishable_from_transport_failures() {
	let server = MockServer::start_async().await;
	let broker = build_reqwest_test_broker(build_descriptor(&server), CLIENT_ID, CLIENT_SECRET);
	let rejected = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(400)
				.header("content-type", "application/json")
				.body("{\"error\":\"invalid_grant\",\"error_description\":\"Token revoked.\"}");
		})
		.await;
	let err = broker
		.refresh_token(RefreshRequest::new(ProviderKind::Google, "revoked-rt"))
		.await
		.expect_err("Rejected refreshes should surface a provider error.");

	rejected.assert_async().await;

	match &err {
		Error::Provider(rejection) => {
			assert_eq!(rejection.kind, ProviderErrorKind::InvalidGrant);
			assert_eq!(rejection.code.as_deref(), Some("invalid_grant"));
		},
		other => panic!("Expected a provider rejection, got: {other:?}"),
	}

	// A provider rejection is final; callers must not blindly retry it.
	assert!(!err.retryable());
}

#[tokio::test]
async fn refresh_transient_provider_failures_are_retryable() {
	let server = MockServer::start_async().await;
	let broker = build_reqwest_test_broker(build_descriptor(&server), CLIENT_ID, CLIENT_SECRET);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(503).body("service unavailable, retry later");
		})
		.await;
	let err = broker
		.refresh_token(RefreshRequest::new(ProviderKind::Google, "rt1"))
		.await
		.expect_err("Transient provider failures should surface as errors.");

	mock.assert_async().await;

	match &err {
		Error::Provider(rejection) => {
			assert_eq!(rejection.kind, ProviderErrorKind::Transient);
			assert_eq!(rejection.http_status, Some(503));
		},
		other => panic!("Expected a transient provider rejection, got: {other:?}"),
	}

	assert!(err.retryable());
}
