use anyhow::{Context, Result};
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub responder: ResponderConfig,
    pub accounts: AccountsConfig,
}

#[derive(Debug, Clone)]
pub struct AccountsConfig {
    /// Password of the seeded `admin` account
    pub admin_password: String,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub instance_id: String,
}

/// Localized literals used by the credential mapping rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponderConfig {
    /// Message the authentication layer raises for a wrong username/password
    pub bad_credentials_marker: String,
    /// User-facing replacement for the marker
    pub bad_credentials_message: String,
}

impl Default for ResponderConfig {
    fn default() -> Self {
        Self {
            bad_credentials_marker: "bad credentials".to_string(),
            bad_credentials_message: "incorrect username or password".to_string(),
        }
    }
}

impl ResponderConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bad_credentials_marker: env::var("BAD_CREDENTIALS_MARKER")
                .unwrap_or(defaults.bad_credentials_marker),
            bad_credentials_message: env::var("BAD_CREDENTIALS_MESSAGE")
                .unwrap_or(defaults.bad_credentials_message),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        Ok(Config {
            server: ServerConfig {
                host: env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("API_PORT")
                    .unwrap_or_else(|_| "8080".to_string())
                    .parse()
                    .context("API_PORT must be a valid port number")?,
                // Used only for debugging/observability. If unset, fall back to HOSTNAME if
                // present (e.g. Docker/Kubernetes), otherwise "unknown".
                instance_id: env::var("INSTANCE_ID")
                    .or_else(|_| env::var("HOSTNAME"))
                    .unwrap_or_else(|_| "unknown".to_string()),
            },
            responder: ResponderConfig::from_env(),
            accounts: AccountsConfig {
                admin_password: env::var("ADMIN_PASSWORD").context("ADMIN_PASSWORD must be set")?,
            },
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
