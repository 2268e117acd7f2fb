//! Configuration model loaded from external sources.

use serde::Deserialize;

fn default_cookie_name() -> String {
    "token".to_string()
}

#[derive(Clone, Debug, Deserialize)]
/// Basic configuration shared across handlers.
pub struct ServerConfig {
    pub address: String,
    pub port: u16,
    pub database_url: String,
    /// HMAC secret used to verify caller tokens.
    pub secret: String,
    /// Name of the cookie carrying the caller token.
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Origin of the single-page client allowed to send credentials.
    pub cors_origin: Option<String>,
}
