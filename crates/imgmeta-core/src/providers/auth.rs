//! OAuth access tokens for Google Cloud from a service-account key file.
//!
//! Implements the two-legged JWT bearer flow: a self-signed RS256 assertion
//! is exchanged at the key's `token_uri` for a short-lived access token.

use async_trait::async_trait;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use ring::rand::SystemRandom;
use ring::signature::{RsaKeyPair, RSA_PKCS1_SHA256};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;

use crate::error::ProviderError;

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: u64 = 3600;
/// Tokens are refreshed this long before they expire.
const EXPIRY_MARGIN_SECS: u64 = 60;

/// Source of bearer tokens for an authenticated provider.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<String, ProviderError>;
}

/// A fixed bearer token.
pub struct StaticToken(pub String);

#[async_trait]
impl TokenProvider for StaticToken {
    async fn access_token(&self) -> Result<String, ProviderError> {
        Ok(self.0.clone())
    }
}

/// The fields we need from a Google service-account JSON key.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    pub fn from_file(path: &Path) -> Result<Self, ProviderError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ProviderError::Credentials(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self, ProviderError> {
        serde_json::from_str(json)
            .map_err(|e| ProviderError::Credentials(format!("invalid service-account key: {e}")))
    }
}

#[derive(Serialize)]
struct JwtHeader<'a> {
    alg: &'a str,
    typ: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    kid: Option<&'a str>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub(crate) struct JwtClaims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: u64,
    pub exp: u64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    ASSERTION_LIFETIME_SECS
}

struct CachedToken {
    value: String,
    expires_at: SystemTime,
}

/// Exchanges signed assertions for access tokens and reuses them until
/// shortly before expiry.
pub struct ServiceAccountTokens {
    key: ServiceAccountKey,
    scope: String,
    signer: RsaKeyPair,
    rng: SystemRandom,
    client: reqwest::Client,
    cached: Mutex<Option<CachedToken>>,
}

impl ServiceAccountTokens {
    pub fn new(key: ServiceAccountKey, scope: &str) -> Result<Self, ProviderError> {
        let der = pem_to_der(&key.private_key)?;
        let signer = RsaKeyPair::from_pkcs8(&der)
            .map_err(|e| ProviderError::Credentials(format!("rejected private key: {e}")))?;
        Ok(Self {
            key,
            scope: scope.to_string(),
            signer,
            rng: SystemRandom::new(),
            client: reqwest::Client::new(),
            cached: Mutex::new(None),
        })
    }

    /// Load the key file and prepare the signer.
    pub fn from_file(path: &Path, scope: &str) -> Result<Self, ProviderError> {
        Self::new(ServiceAccountKey::from_file(path)?, scope)
    }

    pub(crate) fn claims(&self, now: u64) -> JwtClaims {
        JwtClaims {
            iss: self.key.client_email.clone(),
            scope: self.scope.clone(),
            aud: self.key.token_uri.clone(),
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        }
    }

    /// Build the signed `header.claims.signature` assertion.
    pub(crate) fn assertion(&self, now: u64) -> Result<String, ProviderError> {
        let header = JwtHeader {
            alg: "RS256",
            typ: "JWT",
            kid: self.key.private_key_id.as_deref(),
        };
        let header = serde_json::to_vec(&header)
            .map_err(|e| ProviderError::Credentials(e.to_string()))?;
        let claims = serde_json::to_vec(&self.claims(now))
            .map_err(|e| ProviderError::Credentials(e.to_string()))?;

        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(header),
            URL_SAFE_NO_PAD.encode(claims)
        );

        let mut signature = vec![0u8; self.signer.public().modulus_len()];
        self.signer
            .sign(
                &RSA_PKCS1_SHA256,
                &self.rng,
                signing_input.as_bytes(),
                &mut signature,
            )
            .map_err(|_| ProviderError::Credentials("failed to sign assertion".to_string()))?;

        Ok(format!(
            "{}.{}",
            signing_input,
            URL_SAFE_NO_PAD.encode(signature)
        ))
    }

    async fn fetch(&self) -> Result<CachedToken, ProviderError> {
        let now = SystemTime::now();
        let now_secs = now
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        let assertion = self.assertion(now_secs)?;

        tracing::debug!("Requesting access token for {}", self.key.client_email);

        let resp = self
            .client
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| ProviderError::Credentials(format!("token request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(ProviderError::Credentials(format!(
                "token endpoint HTTP {status}: {text}"
            )));
        }

        let token: TokenResponse = resp.json().await.map_err(|e| {
            ProviderError::Credentials(format!("failed to parse token response: {e}"))
        })?;

        let lifetime = token.expires_in.saturating_sub(EXPIRY_MARGIN_SECS);
        Ok(CachedToken {
            value: token.access_token,
            expires_at: now + Duration::from_secs(lifetime),
        })
    }
}

#[async_trait]
impl TokenProvider for ServiceAccountTokens {
    async fn access_token(&self) -> Result<String, ProviderError> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            if SystemTime::now() < token.expires_at {
                return Ok(token.value.clone());
            }
        }
        let fresh = self.fetch().await?;
        let value = fresh.value.clone();
        *cached = Some(fresh);
        Ok(value)
    }
}

/// Strip PEM armour and decode the base64 body.
fn pem_to_der(pem: &str) -> Result<Vec<u8>, ProviderError> {
    // Keys pasted through shell variables sometimes keep literal "\n" escapes.
    let body: String = pem
        .replace("\\n", "\n")
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with("-----"))
        .collect();
    if body.is_empty() {
        return Err(ProviderError::Credentials("private key is empty".to_string()));
    }
    STANDARD
        .decode(body)
        .map_err(|e| ProviderError::Credentials(format!("private key is not valid PEM: {e}")))
}
