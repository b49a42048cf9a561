//! Configuration loading and management

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Template for the account verification email
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationEmailConfig {
    /// Subject line
    pub subject: String,

    /// Body template; `{code}` is replaced with the verification code
    pub body: String,
}

impl VerificationEmailConfig {
    /// Render the body template for a concrete code
    pub fn render_body(&self, code: &str) -> String {
        self.body.replace("{code}", code)
    }
}

impl Default for VerificationEmailConfig {
    fn default() -> Self {
        Self {
            subject: "Welcome to the Billing Tracker!".to_string(),
            body: "Use this code to confirm your account: {code}".to_string(),
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Address the HTTP server binds to
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Change-event bus capacity
    ///
    /// Bounds how far a live query can lag before it falls back to a full
    /// re-listing.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,

    /// Verification email template
    #[serde(default)]
    pub verification_email: VerificationEmailConfig,
}

fn default_bind_addr() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_event_capacity() -> usize {
    1024
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            event_capacity: default_event_capacity(),
            verification_email: VerificationEmailConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.bind_addr, "127.0.0.1:3000");
        assert_eq!(config.event_capacity, 1024);
        assert!(config.verification_email.body.contains("{code}"));
    }

    #[test]
    fn test_render_body() {
        let email = VerificationEmailConfig::default();
        let body = email.render_body("123456");
        assert_eq!(body, "Use this code to confirm your account: 123456");
    }

    #[test]
    fn test_from_yaml_str() {
        let yaml = r#"
bind_addr: "0.0.0.0:8080"
event_capacity: 64
verification_email:
  subject: "Confirm your account"
  body: "Your code is {code}"
"#;
        let config = AppConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.event_capacity, 64);
        assert_eq!(
            config.verification_email.render_body("42"),
            "Your code is 42"
        );
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config = AppConfig::from_yaml_str("bind_addr: \"0.0.0.0:9000\"").unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:9000");
        assert_eq!(config.event_capacity, 1024);
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        assert!(AppConfig::from_yaml_str("bind_addr: [not a string").is_err());
    }
}
