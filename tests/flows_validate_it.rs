#![cfg(all(feature = "reqwest", feature = "test"))]

// crates.io
use httpmock::prelude::*;
// self
use credential_broker::{
	_preludet::*,
	flows::ValidateRequest,
	provider::{ClientAuthMethod, Operation, ProviderDescriptor, ProviderKind, catalog},
};

const CLIENT_ID: &str = "client-validate";
const CLIENT_SECRET: &str = "secret-validate";

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
		.introspection_endpoint(
			Url::parse(&server.url("/tokeninfo"))
				.expect("Mock introspection endpoint should parse successfully."),
		)
		.support_operations([Operation::Exchange, Operation::Validate])
		.preferred_client_auth_method(ClientAuthMethod::ClientSecretPost)
		.build()
		.expect("Provider descriptor should build successfully.")
}

#[tokio::test]
async fn validate_normalizes_string_typed_introspection_fields() {
	let server = MockServer::start_async().await;
	let broker = build_reqwest_test_broker(build_descriptor(&server), CLIENT_ID, CLIENT_SECRET);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/tokeninfo").body_includes("access_token=at1");
			then.status(200).header("content-type", "application/json").body(
				"{\"scope\":\"openid email\",\"expires_in\":\"2048\",\"sub\":\"user-1\",\
				\"email\":\"user@example.com\",\"email_verified\":\"true\"}",
			);
		})
		.await;
	let introspection = broker
		.validate_token(ValidateRequest::new(ProviderKind::Google, "at1"))
		.await
		.expect("Validation should succeed.");

	mock.assert_async().await;

	assert_eq!(introspection.provider, ProviderKind::Google);
	assert_eq!(introspection.scope.normalized(), "email openid");
	assert_eq!(introspection.expires_in, Duration::seconds(2048));
	assert_eq!(introspection.claims.subject.as_deref(), Some("user-1"));
	assert_eq!(introspection.claims.email.as_deref(), Some("user@example.com"));
	assert_eq!(introspection.claims.email_verified, Some(true));
}

#[tokio::test]
async fn validate_maps_provider_rejections_to_invalid_token() {
	let server = MockServer::start_async().await;
	let broker = build_reqwest_test_broker(build_descriptor(&server), CLIENT_ID, CLIENT_SECRET);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/tokeninfo");
			then.status(400)
				.header("content-type", "application/json")
				.body("{\"error\":\"invalid_token\",\"error_description\":\"Token expired.\"}");
		})
		.await;
	let err = broker
		.validate_token(ValidateRequest::new(ProviderKind::Google, "expired-at"))
		.await
		.expect_err("Expired tokens must be rejected.");

	mock.assert_async().await;

	assert!(matches!(err, Error::InvalidToken { .. }));
	assert_eq!(err.http_status(), 401);
}

#[tokio::test]
async fn validate_against_microsoft_is_rejected_without_a_provider_call() {
	let broker = build_reqwest_test_broker(
		catalog::microsoft("common").expect("Microsoft descriptor should build."),
		CLIENT_ID,
		CLIENT_SECRET,
	);
	let err = broker
		.validate_token(ValidateRequest::new(ProviderKind::Microsoft, "at1"))
		.await
		.expect_err("Microsoft offers no introspection endpoint.");

	assert!(matches!(
		err,
		Error::NotSupported { provider: ProviderKind::Microsoft, operation: Operation::Validate },
	));
	assert_eq!(err.http_status(), 501);
}
