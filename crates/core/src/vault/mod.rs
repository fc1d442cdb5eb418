//! Secret-store client for an Azure Key Vault.
//!
//! Fully independent of the probe hierarchy: probes never call into the
//! vault, callers use it to retrieve credentials (e.g. form field values)
//! before constructing a probe. Authentication runs through one of two
//! credential modes, see [`VaultCredentials`].

mod auth;

use serde::{Deserialize, Serialize};
use tracing::info;

pub use auth::VaultCredentials;
use auth::TokenSource;

use crate::error::{Error, Result};

const API_VERSION: &str = "7.4";

/// Secret-store client configuration.
///
/// The vault name is mandatory; an empty name is a configuration error
/// raised from [`VaultClient::new`].
#[derive(Debug, Clone)]
pub struct VaultConfig {
	/// Name of the vault to access (`https://{name}.vault.azure.net`).
	pub vault_name: String,
	/// Credential mode used to obtain access tokens.
	pub credentials: VaultCredentials,
}

impl VaultConfig {
	pub fn new(vault_name: impl Into<String>, credentials: VaultCredentials) -> Self {
		Self {
			vault_name: vault_name.into(),
			credentials,
		}
	}
}

/// Secret value with metadata, as returned by the vault.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretBundle {
	/// The secret value itself.
	pub value: String,
	/// Fully qualified secret identifier (vault URI + name + version).
	pub id: String,
	#[serde(rename = "contentType", default, skip_serializing_if = "Option::is_none")]
	pub content_type: Option<String>,
	#[serde(default)]
	pub attributes: SecretAttributes,
}

/// Lifecycle metadata attached to a secret.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SecretAttributes {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub enabled: Option<bool>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub created: Option<i64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub updated: Option<i64>,
}

/// Client for retrieving and updating vault secrets.
#[derive(Debug)]
pub struct VaultClient {
	vault_uri: String,
	http: reqwest::Client,
	tokens: TokenSource,
}

impl VaultClient {
	/// Creates a client for the configured vault.
	///
	/// Returns [`Error::Config`] when the vault name is empty.
	pub fn new(config: VaultConfig) -> Result<Self> {
		if config.vault_name.trim().is_empty() {
			return Err(Error::Config("vault name must not be empty".to_string()));
		}

		Ok(Self {
			vault_uri: format!("https://{}.vault.azure.net", config.vault_name),
			http: reqwest::Client::new(),
			tokens: TokenSource::new(config.credentials),
		})
	}

	/// Retrieves a secret; `None` version addresses the latest one.
	pub async fn get_secret(&self, name: &str, version: Option<&str>) -> Result<SecretBundle> {
		if name.trim().is_empty() {
			return Err(Error::Config("secret name must not be empty".to_string()));
		}

		let url = self.secret_url(name, version);
		info!(secret = name, version = version.unwrap_or("latest"), "requesting secret from vault");

		let token = self.tokens.bearer_token(&self.http).await?;
		let response = self
			.http
			.get(&url)
			.bearer_auth(token)
			.query(&[("api-version", API_VERSION)])
			.send()
			.await
			.map_err(|source| Error::VaultRequest {
				context: format!("get secret '{name}'"),
				source,
			})?;

		parse_bundle(response, name).await
	}

	/// Stores a new version of a secret and returns the resulting bundle.
	pub async fn set_secret(&self, name: &str, value: &str, content_type: &str) -> Result<SecretBundle> {
		if name.trim().is_empty() {
			return Err(Error::Config("secret name must not be empty".to_string()));
		}
		if value.is_empty() {
			return Err(Error::Config("secret value must not be empty".to_string()));
		}

		let url = self.secret_url(name, None);
		info!(secret = name, content_type, "updating secret in vault");

		let token = self.tokens.bearer_token(&self.http).await?;
		let body = serde_json::json!({ "value": value, "contentType": content_type });
		let response = self
			.http
			.put(&url)
			.bearer_auth(token)
			.query(&[("api-version", API_VERSION)])
			.json(&body)
			.send()
			.await
			.map_err(|source| Error::VaultRequest {
				context: format!("set secret '{name}'"),
				source,
			})?;

		parse_bundle(response, name).await
	}

	fn secret_url(&self, name: &str, version: Option<&str>) -> String {
		match version {
			Some(version) if !version.is_empty() => format!("{}/secrets/{}/{}", self.vault_uri, name, version),
			_ => format!("{}/secrets/{}", self.vault_uri, name),
		}
	}
}

async fn parse_bundle(response: reqwest::Response, name: &str) -> Result<SecretBundle> {
	let status = response.status();
	if status == reqwest::StatusCode::NOT_FOUND {
		return Err(Error::SecretNotFound { name: name.to_string() });
	}
	if !status.is_success() {
		return Err(Error::VaultStatus {
			context: format!("secret '{name}'"),
			status: status.as_u16(),
		});
	}
	response.json::<SecretBundle>().await.map_err(|source| Error::VaultRequest {
		context: format!("secret '{name}' response"),
		source,
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	fn client() -> VaultClient {
		VaultClient::new(VaultConfig::new("example-vault", VaultCredentials::ManagedIdentity)).unwrap()
	}

	#[test]
	fn empty_vault_name_is_a_configuration_error() {
		let err = VaultClient::new(VaultConfig::new("", VaultCredentials::ManagedIdentity)).unwrap_err();
		assert!(matches!(err, Error::Config(_)));
	}

	#[test]
	fn secret_url_addresses_latest_version_by_default() {
		let client = client();
		assert_eq!(
			client.secret_url("grid-password", None),
			"https://example-vault.vault.azure.net/secrets/grid-password"
		);
		assert_eq!(
			client.secret_url("grid-password", Some("")),
			"https://example-vault.vault.azure.net/secrets/grid-password"
		);
	}

	#[test]
	fn secret_url_includes_explicit_version() {
		let client = client();
		assert_eq!(
			client.secret_url("grid-password", Some("abc123")),
			"https://example-vault.vault.azure.net/secrets/grid-password/abc123"
		);
	}

	#[tokio::test]
	async fn empty_secret_name_is_rejected_before_any_request() {
		let client = client();
		let err = client.get_secret("", None).await.unwrap_err();
		assert!(matches!(err, Error::Config(_)));

		let err = client.set_secret(" ", "value", "text/plain").await.unwrap_err();
		assert!(matches!(err, Error::Config(_)));

		let err = client.set_secret("name", "", "text/plain").await.unwrap_err();
		assert!(matches!(err, Error::Config(_)));
	}

	#[test]
	fn secret_bundle_parses_vault_payload() {
		let json = r#"{
			"value": "s3cr3t",
			"id": "https://example-vault.vault.azure.net/secrets/grid-password/abc123",
			"contentType": "text/plain",
			"attributes": { "enabled": true, "created": 1690000000, "updated": 1690000000 }
		}"#;
		let bundle: SecretBundle = serde_json::from_str(json).unwrap();
		assert_eq!(bundle.value, "s3cr3t");
		assert_eq!(bundle.content_type.as_deref(), Some("text/plain"));
		assert_eq!(bundle.attributes.enabled, Some(true));
	}
}
