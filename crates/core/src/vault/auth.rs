use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::{Deserialize, Deserializer};
use tracing::debug;

use crate::error::{Error, Result};

/// OAuth resource identifier for the vault service.
pub(crate) const VAULT_RESOURCE: &str = "https://vault.azure.net";

/// Instance-metadata token endpoint used for managed-identity auth.
const IMDS_TOKEN_ENDPOINT: &str = "http://169.254.169.254/metadata/identity/oauth2/token";
const IMDS_API_VERSION: &str = "2018-02-01";

/// Tokens are refreshed this long before their reported expiry.
const EXPIRY_MARGIN: Duration = Duration::from_secs(120);
/// Assumed lifetime when the token response omits one.
const FALLBACK_LIFETIME: Duration = Duration::from_secs(300);

/// Credential mode used to authenticate against the secret store.
///
/// Service-principal credentials are the equivalent of a login/password
/// pair: hard-coding them to bootstrap vault access is as good as
/// hard-coding the secrets themselves. Reserve that mode for development
/// environments and use the ambient managed identity in-platform.
#[derive(Debug, Clone)]
pub enum VaultCredentials {
	/// Ambient platform identity, for in-platform use.
	ManagedIdentity,
	/// Application identity (client id/secret/tenant), for out-of-platform use.
	ServicePrincipal {
		client_id: String,
		client_secret: String,
		tenant: String,
	},
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
	access_token: String,
	#[serde(default, deserialize_with = "seconds_maybe_string")]
	expires_in: Option<u64>,
}

/// The instance-metadata service reports `expires_in` as a string; the
/// tenant token endpoint reports a number. Accept both.
fn seconds_maybe_string<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Option<u64>, D::Error> {
	#[derive(Deserialize)]
	#[serde(untagged)]
	enum Raw {
		Num(u64),
		Text(String),
	}

	Ok(match Option::<Raw>::deserialize(deserializer)? {
		None => None,
		Some(Raw::Num(n)) => Some(n),
		Some(Raw::Text(s)) => s.parse().ok(),
	})
}

#[derive(Debug)]
struct CachedToken {
	value: String,
	refresh_after: Instant,
}

/// Bearer-token source caching tokens until shortly before expiry.
#[derive(Debug)]
pub(crate) struct TokenSource {
	credentials: VaultCredentials,
	cached: Mutex<Option<CachedToken>>,
}

impl TokenSource {
	pub(crate) fn new(credentials: VaultCredentials) -> Self {
		Self {
			credentials,
			cached: Mutex::new(None),
		}
	}

	pub(crate) async fn bearer_token(&self, http: &reqwest::Client) -> Result<String> {
		if let Some(token) = self.cached_value() {
			return Ok(token);
		}

		let response = self.request_token(http).await?;
		let lifetime = response.expires_in.map(Duration::from_secs).unwrap_or(FALLBACK_LIFETIME);
		let refresh_after = Instant::now() + lifetime.saturating_sub(EXPIRY_MARGIN);
		*self.cached.lock() = Some(CachedToken {
			value: response.access_token.clone(),
			refresh_after,
		});

		Ok(response.access_token)
	}

	fn cached_value(&self) -> Option<String> {
		let guard = self.cached.lock();
		guard
			.as_ref()
			.filter(|token| Instant::now() < token.refresh_after)
			.map(|token| token.value.clone())
	}

	async fn request_token(&self, http: &reqwest::Client) -> Result<TokenResponse> {
		match &self.credentials {
			VaultCredentials::ManagedIdentity => {
				debug!("requesting vault token via managed identity");
				let context = "managed-identity token request";
				let response = http
					.get(IMDS_TOKEN_ENDPOINT)
					.query(&[("api-version", IMDS_API_VERSION), ("resource", VAULT_RESOURCE)])
					.header("Metadata", "true")
					.send()
					.await
					.map_err(|source| Error::VaultRequest {
						context: context.to_string(),
						source,
					})?;
				parse_token_response(response, context).await
			}
			VaultCredentials::ServicePrincipal {
				client_id,
				client_secret,
				tenant,
			} => {
				debug!(tenant = %tenant, "requesting vault token via service principal");
				let context = "service-principal token request";
				let url = format!("https://login.microsoftonline.com/{tenant}/oauth2/v2.0/token");
				let scope = format!("{VAULT_RESOURCE}/.default");
				let form = [
					("grant_type", "client_credentials"),
					("client_id", client_id.as_str()),
					("client_secret", client_secret.as_str()),
					("scope", scope.as_str()),
				];
				let response = http.post(&url).form(&form).send().await.map_err(|source| Error::VaultRequest {
					context: context.to_string(),
					source,
				})?;
				parse_token_response(response, context).await
			}
		}
	}
}

async fn parse_token_response(response: reqwest::Response, context: &str) -> Result<TokenResponse> {
	let status = response.status();
	if !status.is_success() {
		return Err(Error::VaultStatus {
			context: context.to_string(),
			status: status.as_u16(),
		});
	}
	response.json::<TokenResponse>().await.map_err(|source| Error::VaultRequest {
		context: context.to_string(),
		source,
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn token_response_accepts_numeric_expiry() {
		let parsed: TokenResponse = serde_json::from_str(r#"{"access_token": "tok", "expires_in": 3599}"#).unwrap();
		assert_eq!(parsed.access_token, "tok");
		assert_eq!(parsed.expires_in, Some(3599));
	}

	#[test]
	fn token_response_accepts_string_expiry() {
		let parsed: TokenResponse = serde_json::from_str(r#"{"access_token": "tok", "expires_in": "3599"}"#).unwrap();
		assert_eq!(parsed.expires_in, Some(3599));
	}

	#[test]
	fn token_response_tolerates_missing_expiry() {
		let parsed: TokenResponse = serde_json::from_str(r#"{"access_token": "tok"}"#).unwrap();
		assert_eq!(parsed.expires_in, None);
	}
}
