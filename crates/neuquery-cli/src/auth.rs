//! Access token minting for the query service.
//!
//! The server accepts HS256 tokens signed with the shared `appsecret`
//! from its config file; the claims below mirror what its auth layer
//! inspects.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Access level embedded in every minted token.
const ACCESS_LEVEL: &str = "admin";

/// Avatar URL the service UI shows next to the identity.
const IMAGE_URL: &str =
    "https://lh4.googleusercontent.com/-TAI1cI0EqL8/AAAAAAAAAAI/AAAAAAABmdI/NiyORSV-9Mg/photo.jpg?sz=50";

/// Failure modes of token generation.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Malformed invocation input (e.g. an unparsable expiration date).
    #[error("usage error: {0}")]
    Usage(String),

    /// Semantically invalid input (e.g. an expiration in the past).
    #[error("validation failed: {0}")]
    Validation(String),

    /// Secret config file missing, unreadable, or malformed.
    #[error("config error: {0}")]
    Config(String),

    /// The signing library rejected the claims.
    #[error("failed to sign token: {0}")]
    Encode(#[from] jsonwebtoken::errors::Error),
}

/// JWT claims accepted by the query service.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User identity
    pub email: String,
    /// Access level (always "admin" for minted tokens)
    pub level: String,
    /// Avatar URL
    #[serde(rename = "image-url")]
    pub image_url: String,
    /// Expiration time (Unix timestamp, seconds)
    pub exp: u64,
}

/// Shape of the local config file holding the shared secret.
#[derive(Debug, Deserialize)]
struct AppConfig {
    appsecret: String,
}

/// Read the signing secret from a JSON config file.
///
/// The file is read once per invocation and never written back.
pub fn load_app_secret(path: impl AsRef<Path>) -> Result<String, TokenError> {
    let path = path.as_ref();
    let data = fs::read_to_string(path)
        .map_err(|err| TokenError::Config(format!("cannot read {}: {}", path.display(), err)))?;
    let config: AppConfig = serde_json::from_str(&data)
        .map_err(|err| TokenError::Config(format!("cannot parse {}: {}", path.display(), err)))?;
    if config.appsecret.is_empty() {
        return Err(TokenError::Config(format!(
            "{}: appsecret is empty",
            path.display()
        )));
    }
    Ok(config.appsecret)
}

/// Parse an expiration timestamp from the command line.
///
/// Accepts RFC 3339, `YYYY-MM-DDTHH:MM:SS` (assumed UTC), and plain
/// `YYYY-MM-DD` (midnight UTC).
pub fn parse_expiration(text: &str) -> Result<DateTime<Utc>, TokenError> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Ok(parsed.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S") {
        return Ok(Utc.from_utc_datetime(&naive));
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Ok(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)));
    }
    Err(TokenError::Usage(format!(
        "unrecognized expiration date: {}",
        text
    )))
}

/// Mint a signed access token for the given identity.
///
/// The expiration must be strictly in the future; nothing is signed
/// otherwise.
pub fn generate_token(
    email: &str,
    expiration: DateTime<Utc>,
    app_secret: &str,
) -> Result<String, TokenError> {
    if expiration <= Utc::now() {
        return Err(TokenError::Validation(
            "expiration date must be in the future".to_string(),
        ));
    }

    let claims = Claims {
        email: email.to_string(),
        level: ACCESS_LEVEL.to_string(),
        image_url: IMAGE_URL.to_string(),
        exp: expiration.timestamp() as u64,
    };

    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(app_secret.as_bytes()),
    )?)
}
