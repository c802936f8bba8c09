// self
use crate::_prelude::*;

/// Provider-specific quirks that influence how flows behave.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderQuirks {
	/// Character used to join scopes when constructing `scope` parameters.
	pub scope_delimiter: char,
	/// Extra query parameters appended to every authorize URL (e.g. the
	/// `access_type=offline` + `prompt=consent` pair Google needs to guarantee
	/// refresh-token issuance, or Microsoft's `response_mode=query`).
	pub authorize_params: Vec<(String, String)>,
}
impl Default for ProviderQuirks {
	fn default() -> Self {
		Self { scope_delimiter: ' ', authorize_params: Vec::new() }
	}
}
impl ProviderQuirks {
	/// Appends an extra authorize-URL parameter.
	pub fn with_authorize_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.authorize_params.push((key.into(), value.into()));

		self
	}
}
