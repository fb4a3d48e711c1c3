use thiserror::Error;

/// Error type shared by every service, provider and store in the crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Snapshot files ──────────────────────────────────────────────
    #[error("Not a Whale Watch data file: {0}")]
    InvalidFileFormat(String),

    #[error("Data file version {0} is not supported")]
    UnsupportedVersion(u16),

    #[error("Could not encrypt data file: {0}")]
    Encryption(String),

    #[error("Decryption failed: wrong password or corrupted file")]
    Decryption,

    #[error("Could not encode data: {0}")]
    Serialization(String),

    #[error("Could not decode data: {0}")]
    Deserialization(String),

    #[error("I/O error: {0}")]
    FileIO(String),

    // ── Upstream services ───────────────────────────────────────────
    #[error("{provider} responded with an error: {message}")]
    Api { provider: String, message: String },

    #[error("Rate limited by {0}")]
    RateLimited(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("No source configured for {0}")]
    NoProvider(String),

    #[error("Solana RPC error: {0}")]
    Rpc(String),

    // ── Wallet input ────────────────────────────────────────────────
    #[error("Invalid secret key: {0}")]
    InvalidSecretKey(String),

    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    #[error("Wallet error: {0}")]
    Wallet(String),

    // ── Documents ───────────────────────────────────────────────────
    #[error("Validation failed: {0}")]
    ValidationError(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
}

impl CoreError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// True for errors caused by caller input rather than by the system.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            CoreError::ValidationError(_)
                | CoreError::InvalidSecretKey(_)
                | CoreError::InvalidPublicKey(_)
                | CoreError::InvalidSignature(_)
        )
    }
}

/// Drop everything after the first `?` so query parameters (API keys
/// included) never reach logs or responses.
fn redact_query(message: String) -> String {
    match message.split_once('?') {
        Some((head, _)) => format!("{head}?…"),
        None => message,
    }
}

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::FileIO(e.to_string())
    }
}

impl From<bincode::Error> for CoreError {
    fn from(e: bincode::Error) -> Self {
        CoreError::Serialization(format!("snapshot: {e}"))
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}

impl From<csv::Error> for CoreError {
    fn from(e: csv::Error) -> Self {
        CoreError::Serialization(format!("CSV: {e}"))
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        if e.status() == Some(reqwest::StatusCode::TOO_MANY_REQUESTS) {
            let host = e
                .url()
                .and_then(|u| u.host_str())
                .unwrap_or("upstream")
                .to_string();
            return CoreError::RateLimited(host);
        }
        CoreError::Network(redact_query(e.to_string()))
    }
}

impl From<bs58::decode::Error> for CoreError {
    fn from(e: bs58::decode::Error) -> Self {
        CoreError::ValidationError(format!("invalid base58: {e}"))
    }
}

impl From<aes_gcm::Error> for CoreError {
    fn from(_: aes_gcm::Error) -> Self {
        CoreError::Decryption
    }
}

#[cfg(test)]
mod tests {
    use super::redact_query;

    #[test]
    fn query_is_redacted() {
        assert_eq!(
            redact_query("error sending request for url (https://x.io/p?key=secret)".into()),
            "error sending request for url (https://x.io/p?…"
        );
        assert_eq!(redact_query("timed out".into()), "timed out");
    }
}
