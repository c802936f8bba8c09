// self
use crate::{
	_prelude::*,
	provider::{
		ClientAuthMethod, Operation, ProviderDescriptor, ProviderEndpoints, ProviderKind,
		ProviderQuirks, SupportedOperations,
	},
};

/// Errors raised while constructing or validating descriptors.
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum ProviderDescriptorError {
	/// Authorization endpoint is required for every descriptor.
	#[error("Missing authorization endpoint.")]
	MissingAuthorizationEndpoint,
	/// Token endpoint is mandatory for all flows.
	#[error("Missing token endpoint.")]
	MissingTokenEndpoint,
	/// At least one operation must be supported.
	#[error("Descriptor must enable at least one operation.")]
	NoSupportedOperations,
	/// An operation flag was enabled without the endpoint backing it.
	#[error("The {operation} operation requires a {endpoint} endpoint.")]
	MissingOperationEndpoint {
		/// Operation lacking its endpoint.
		operation: Operation,
		/// Which endpoint is required.
		endpoint: &'static str,
	},
	/// Endpoints must use HTTPS.
	#[error("The {endpoint} endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// Reject scope delimiters that are control characters.
	#[error("Scope delimiter must be a printable character.")]
	InvalidScopeDelimiter {
		/// Invalid delimiter that was supplied.
		delimiter: char,
	},
	/// An endpoint URL literal failed to parse.
	#[error("The {endpoint} endpoint URL is invalid.")]
	InvalidEndpointUrl {
		/// Which endpoint failed to parse.
		endpoint: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
}

/// Builder for [`ProviderDescriptor`] values.
#[derive(Debug)]
pub struct ProviderDescriptorBuilder {
	/// Provider the descriptor adapts.
	pub kind: ProviderKind,
	/// Authorization endpoint used for authorize URLs.
	pub authorization_endpoint: Option<Url>,
	/// Token endpoint used for exchanges and refreshes.
	pub token_endpoint: Option<Url>,
	/// Optional introspection endpoint.
	pub introspection_endpoint: Option<Url>,
	/// Optional revocation endpoint.
	pub revocation_endpoint: Option<Url>,
	/// Operations enabled for the provider.
	pub operations: SupportedOperations,
	/// Preferred client authentication method for the token endpoint.
	pub preferred_client_auth_method: ClientAuthMethod,
	/// Provider-specific quirks.
	pub quirks: ProviderQuirks,
	/// Scopes requested when the caller supplies none.
	pub default_scopes: Vec<String>,
}
impl ProviderDescriptorBuilder {
	/// Creates a new builder seeded with the provided kind.
	pub fn new(kind: ProviderKind) -> Self {
		Self {
			kind,
			authorization_endpoint: None,
			token_endpoint: None,
			introspection_endpoint: None,
			revocation_endpoint: None,
			operations: SupportedOperations::default(),
			preferred_client_auth_method: ClientAuthMethod::default(),
			quirks: ProviderQuirks::default(),
			default_scopes: Vec::new(),
		}
	}

	/// Sets the authorization endpoint.
	pub fn authorization_endpoint(mut self, url: Url) -> Self {
		self.authorization_endpoint = Some(url);

		self
	}

	/// Sets the token endpoint.
	pub fn token_endpoint(mut self, url: Url) -> Self {
		self.token_endpoint = Some(url);

		self
	}

	/// Sets the optional introspection endpoint.
	pub fn introspection_endpoint(mut self, url: Url) -> Self {
		self.introspection_endpoint = Some(url);

		self
	}

	/// Sets the optional revocation endpoint.
	pub fn revocation_endpoint(mut self, url: Url) -> Self {
		self.revocation_endpoint = Some(url);

		self
	}

	/// Marks a single operation as supported.
	pub fn support_operation(mut self, operation: Operation) -> Self {
		self.operations = self.operations.enable(operation);

		self
	}

	/// Marks multiple operations as supported.
	pub fn support_operations<I>(mut self, operations: I) -> Self
	where
		I: IntoIterator<Item = Operation>,
	{
		for operation in operations.into_iter() {
			self.operations = self.operations.enable(operation);
		}

		self
	}

	/// Overrides the preferred client authentication method.
	pub fn preferred_client_auth_method(mut self, method: ClientAuthMethod) -> Self {
		self.preferred_client_auth_method = method;

		self
	}

	/// Overrides the provider quirks.
	pub fn quirks(mut self, quirks: ProviderQuirks) -> Self {
		self.quirks = quirks;

		self
	}

	/// Sets the default scope list used when the caller requests none.
	pub fn default_scopes<I, S>(mut self, scopes: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.default_scopes = scopes.into_iter().map(Into::into).collect();

		self
	}

	/// Consumes the builder and validates the resulting descriptor.
	pub fn build(self) -> Result<ProviderDescriptor, ProviderDescriptorError> {
		let authorization = self
			.authorization_endpoint
			.ok_or(ProviderDescriptorError::MissingAuthorizationEndpoint)?;
		let token = self.token_endpoint.ok_or(ProviderDescriptorError::MissingTokenEndpoint)?;
		let endpoints = ProviderEndpoints {
			authorization,
			token,
			introspection: self.introspection_endpoint,
			revocation: self.revocation_endpoint,
		};
		let descriptor = ProviderDescriptor {
			kind: self.kind,
			endpoints,
			operations: self.operations,
			preferred_client_auth_method: self.preferred_client_auth_method,
			quirks: self.quirks,
			default_scopes: self.default_scopes,
		};

		descriptor.validate()?;

		Ok(descriptor)
	}
}

impl ProviderDescriptor {
	/// Validates invariants for the descriptor.
	fn validate(&self) -> Result<(), ProviderDescriptorError> {
		if self.operations.is_empty() {
			return Err(ProviderDescriptorError::NoSupportedOperations);
		}
		if self.supports(Operation::Validate) && self.endpoints.introspection.is_none() {
			return Err(ProviderDescriptorError::MissingOperationEndpoint {
				operation: Operation::Validate,
				endpoint: "introspection",
			});
		}
		if self.supports(Operation::Revoke) && self.endpoints.revocation.is_none() {
			return Err(ProviderDescriptorError::MissingOperationEndpoint {
				operation: Operation::Revoke,
				endpoint: "revocation",
			});
		}

		validate_endpoint("authorization", &self.endpoints.authorization)?;
		validate_endpoint("token", &self.endpoints.token)?;

		if let Some(introspection) = self.endpoints.introspection.as_ref() {
			validate_endpoint("introspection", introspection)?;
		}
		if let Some(revocation) = self.endpoints.revocation.as_ref() {
			validate_endpoint("revocation", revocation)?;
		}

		validate_scope_delimiter(self.quirks.scope_delimiter)?;

		Ok(())
	}
}

fn validate_endpoint(name: &'static str, url: &Url) -> Result<(), ProviderDescriptorError> {
	if url.scheme() != "https" {
		Err(ProviderDescriptorError::InsecureEndpoint { endpoint: name, url: url.to_string() })
	} else {
		Ok(())
	}
}

fn validate_scope_delimiter(delimiter: char) -> Result<(), ProviderDescriptorError> {
	if delimiter.is_control() {
		Err(ProviderDescriptorError::InvalidScopeDelimiter { delimiter })
	} else {
		Ok(())
	}
}
