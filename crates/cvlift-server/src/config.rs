//! Server Configuration

use std::path::PathBuf;

use anyhow::{Context, Result};

pub const DEFAULT_PORT: u16 = 4242;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub stripe_secret_key: String,
    pub stripe_price_id: String,
    pub stripe_webhook_secret: String,
    /// Public site origin, used to build the provider's redirect URLs
    pub domain: String,
    pub port: u16,
    /// The one file the download gate releases
    pub deliverable_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Config {
            stripe_secret_key: require_env("STRIPE_SECRET_KEY")?,
            stripe_price_id: require_env("STRIPE_PRICE_ID")?,
            stripe_webhook_secret: require_env("STRIPE_WEBHOOK_SECRET")?,
            domain: require_env("DOMAIN")?.trim_end_matches('/').to_string(),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| DEFAULT_PORT.to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            deliverable_path: std::env::var("DELIVERABLE_PATH")
                .unwrap_or_else(|_| "assets/optimized-cv.pdf".to_string())
                .into(),
        })
    }

    /// Success redirect template. `{CHECKOUT_SESSION_ID}` is filled in by
    /// the provider, not by us.
    pub fn success_url(&self) -> String {
        format!("{}/download?session_id={{CHECKOUT_SESSION_ID}}", self.domain)
    }

    pub fn cancel_url(&self) -> String {
        format!("{}/?canceled=true", self.domain)
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            stripe_secret_key: "sk_test_x".into(),
            stripe_price_id: "price_x".into(),
            stripe_webhook_secret: "whsec_x".into(),
            domain: "https://cvlift.example.com".into(),
            port: DEFAULT_PORT,
            deliverable_path: "assets/optimized-cv.pdf".into(),
        }
    }

    #[test]
    fn redirect_urls_keep_the_provider_placeholder() {
        let config = test_config();
        assert_eq!(
            config.success_url(),
            "https://cvlift.example.com/download?session_id={CHECKOUT_SESSION_ID}"
        );
        assert_eq!(config.cancel_url(), "https://cvlift.example.com/?canceled=true");
    }
}
