//! Process Configuration
//! Mission: Collect all environment-driven settings once at startup

use anyhow::{bail, Result};
use tracing::warn;

const DEFAULT_SECRET: &str = "super-secret-key-change-me";

/// Optional admin account created at startup (idempotent).
#[derive(Debug, Clone)]
pub struct AdminBootstrap {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Immutable process configuration, built once and handed to components.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: String,
    pub port: u16,
    pub jwt_secret: String,
    pub token_ttl_secs: u64,
    pub admin_bootstrap: Option<AdminBootstrap>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let database_path =
            std::env::var("SWEETSHOP_DB").unwrap_or_else(|_| "./sweets.db".to_string());

        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .unwrap_or(8080);

        let jwt_secret =
            std::env::var("SWEETSHOP_SECRET_KEY").unwrap_or_else(|_| DEFAULT_SECRET.to_string());
        if jwt_secret == DEFAULT_SECRET {
            warn!("⚠️  Using default signing secret - set SWEETSHOP_SECRET_KEY in production");
        }

        let token_ttl_secs = std::env::var("SWEETSHOP_TOKEN_TTL")
            .unwrap_or_else(|_| "86400".to_string())
            .parse()
            .unwrap_or(86_400);

        let admin_bootstrap = match std::env::var("SWEETSHOP_CREATE_ADMIN") {
            Ok(spec) => Some(Self::parse_admin_spec(&spec)?),
            Err(_) => None,
        };

        Ok(Self {
            database_path,
            port,
            jwt_secret,
            token_ttl_secs,
            admin_bootstrap,
        })
    }

    /// Parse a `username:email:password` bootstrap triple.
    fn parse_admin_spec(spec: &str) -> Result<AdminBootstrap> {
        let mut parts = spec.splitn(3, ':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(username), Some(email), Some(password))
                if !username.is_empty() && !email.is_empty() && !password.is_empty() =>
            {
                Ok(AdminBootstrap {
                    username: username.to_string(),
                    email: email.to_string(),
                    password: password.to_string(),
                })
            }
            _ => bail!("SWEETSHOP_CREATE_ADMIN must be username:email:password"),
        }
    }
}
