//! API and builder credentials.

use serde::Deserialize;

/// L2 credentials issued by the CLOB for a wallet.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct ApiCredentials {
    #[serde(alias = "apiKey", alias = "key")]
    pub api_key: String,
    /// Base64 (usually URL-safe) HMAC secret.
    #[serde(alias = "secret")]
    pub api_secret: String,
    #[serde(alias = "passphrase")]
    pub api_passphrase: String,
}

impl ApiCredentials {
    pub fn new(
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
        api_passphrase: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            api_passphrase: api_passphrase.into(),
        }
    }
}

impl std::fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiCredentials")
            .field("api_key", &"[REDACTED]")
            .field("api_secret", &"[REDACTED]")
            .field("api_passphrase", &"[REDACTED]")
            .finish()
    }
}

/// Wire shape of `/auth/api-key` and `/auth/derive-api-key` responses.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiKeyResponse {
    #[serde(rename = "apiKey")]
    pub api_key: String,
    pub secret: String,
    pub passphrase: String,
}

impl From<ApiKeyResponse> for ApiCredentials {
    fn from(raw: ApiKeyResponse) -> Self {
        ApiCredentials::new(raw.api_key, raw.secret, raw.passphrase)
    }
}

/// Credentials attributing order flow and relayer submissions to a builder.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct BuilderConfig {
    pub key: String,
    pub secret: String,
    pub passphrase: String,
}

impl BuilderConfig {
    pub fn new(
        key: impl Into<String>,
        secret: impl Into<String>,
        passphrase: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            secret: secret.into(),
            passphrase: passphrase.into(),
        }
    }

    /// All three parts present.
    pub fn is_valid(&self) -> bool {
        !self.key.trim().is_empty()
            && !self.secret.trim().is_empty()
            && !self.passphrase.trim().is_empty()
    }
}

impl std::fmt::Debug for BuilderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuilderConfig")
            .field("key", &"[REDACTED]")
            .field("secret", &"[REDACTED]")
            .field("passphrase", &"[REDACTED]")
            .finish()
    }
}
