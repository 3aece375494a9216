//! Payment configuration

use serde::Deserialize;

use super::error::ValidationError;
use super::server::Environment;

/// Payment configuration (Square)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentConfig {
    /// Square access token
    pub square_access_token: String,

    /// Square webhook signature key from the developer dashboard
    pub square_webhook_signature_key: String,

    /// Notification URL registered for the webhook subscription.
    ///
    /// Square signs webhook payloads against this exact URL.
    pub square_notification_url: String,

    /// Square API base URL override (sandbox testing)
    pub square_api_base_url: Option<String>,
}

impl PaymentConfig {
    /// Check if pointed at the Square sandbox
    pub fn is_sandbox(&self) -> bool {
        self.square_api_base_url
            .as_deref()
            .map(|url| url.contains("squareupsandbox"))
            .unwrap_or(false)
    }

    /// Validate payment configuration
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if self.square_access_token.is_empty() {
            return Err(ValidationError::MissingRequired("SQUARE_ACCESS_TOKEN"));
        }
        if self.square_webhook_signature_key.is_empty() {
            return Err(ValidationError::MissingRequired(
                "SQUARE_WEBHOOK_SIGNATURE_KEY",
            ));
        }
        if self.square_notification_url.is_empty() {
            return Err(ValidationError::MissingRequired("SQUARE_NOTIFICATION_URL"));
        }

        if !self.square_notification_url.starts_with("http://")
            && !self.square_notification_url.starts_with("https://")
        {
            return Err(ValidationError::InvalidNotificationUrl);
        }
        if *environment == Environment::Production
            && !self.square_notification_url.starts_with("https://")
        {
            return Err(ValidationError::NotificationUrlMustBeHttps);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> PaymentConfig {
        PaymentConfig {
            square_access_token: "EAAAl-test-token".to_string(),
            square_webhook_signature_key: "sig-key".to_string(),
            square_notification_url: "https://api.fleetflow.example/webhooks/square".to_string(),
            square_api_base_url: None,
        }
    }

    #[test]
    fn validation_accepts_valid_config() {
        assert!(valid_config().validate(&Environment::Production).is_ok());
    }

    #[test]
    fn validation_rejects_missing_access_token() {
        let config = PaymentConfig {
            square_access_token: String::new(),
            ..valid_config()
        };
        assert!(config.validate(&Environment::Development).is_err());
    }

    #[test]
    fn validation_rejects_missing_signature_key() {
        let config = PaymentConfig {
            square_webhook_signature_key: String::new(),
            ..valid_config()
        };
        assert!(config.validate(&Environment::Development).is_err());
    }

    #[test]
    fn validation_rejects_malformed_notification_url() {
        let config = PaymentConfig {
            square_notification_url: "not-a-url".to_string(),
            ..valid_config()
        };
        assert!(config.validate(&Environment::Development).is_err());
    }

    #[test]
    fn validation_requires_https_in_production() {
        let config = PaymentConfig {
            square_notification_url: "http://api.fleetflow.example/webhooks/square".to_string(),
            ..valid_config()
        };
        assert!(config.validate(&Environment::Development).is_ok());
        assert!(config.validate(&Environment::Production).is_err());
    }

    #[test]
    fn is_sandbox_detects_sandbox_base_url() {
        let config = PaymentConfig {
            square_api_base_url: Some("https://connect.squareupsandbox.com".to_string()),
            ..valid_config()
        };
        assert!(config.is_sandbox());
        assert!(!valid_config().is_sandbox());
    }
}
