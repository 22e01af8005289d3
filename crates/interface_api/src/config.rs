//! API configuration

use serde::Deserialize;

use core_kernel::{Amount, CoreError, Timezone};
use domain_billing::BillingConfig;

/// API configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// JWT secret for authentication
    pub jwt_secret: String,
    /// JWT expiration in seconds
    pub jwt_expiration_secs: u64,
    /// Database URL
    pub database_url: String,
    /// Log level
    pub log_level: String,
    /// Day of month rent falls due
    pub invoice_due_day: u32,
    /// Ceiling on months one payment may walk through
    pub max_months_advance: u32,
    /// Largest single payment accepted
    pub max_payment: Amount,
    pub receipt_sender: String,
    pub currency_label: String,
    /// IANA zone used for "current month" and receipt timestamps
    pub timezone: Timezone,
}

impl Default for ApiConfig {
    fn default() -> Self {
        let billing = BillingConfig::default();
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            jwt_secret: "change-me-in-production".to_string(),
            jwt_expiration_secs: 3600,
            database_url: "postgres://localhost/rent_ledger".to_string(),
            log_level: "info".to_string(),
            invoice_due_day: billing.due_day,
            max_months_advance: billing.max_months_advance,
            max_payment: billing.max_payment,
            receipt_sender: billing.receipt_sender,
            currency_label: billing.currency_label,
            timezone: billing.timezone,
        }
    }
}

impl ApiConfig {
    /// Loads configuration from `API_*` environment variables
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("API"))
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Billing engine settings, validated
    pub fn billing(&self) -> Result<BillingConfig, CoreError> {
        let config = BillingConfig {
            due_day: self.invoice_due_day,
            max_months_advance: self.max_months_advance,
            max_payment: self.max_payment,
            receipt_sender: self.receipt_sender.clone(),
            currency_label: self.currency_label.clone(),
            timezone: self.timezone,
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_billing_config() {
        let billing = ApiConfig::default().billing().unwrap();
        assert_eq!(billing, BillingConfig::default());
    }

    #[test]
    fn test_invalid_due_day_rejected() {
        let config = ApiConfig {
            invoice_due_day: 40,
            ..ApiConfig::default()
        };
        assert!(config.billing().is_err());
    }

    #[test]
    fn test_zero_max_payment_rejected() {
        let config = ApiConfig {
            max_payment: Amount::zero(),
            ..ApiConfig::default()
        };
        assert!(config.billing().is_err());
    }

    #[test]
    fn test_server_addr() {
        assert_eq!(ApiConfig::default().server_addr(), "0.0.0.0:8080");
    }
}
