//! Application settings loading from config.toml
//!
//! Settings cover the company block printed on invoices, payment terms,
//! which invoice features are enabled by default, and default billing rates
//! per process used when a draft leaves a rate out.

use crate::{
    core::session::InvoiceFeatures,
    errors::{Error, Result},
};
use serde::Deserialize;
use std::path::Path;

/// Payment terms used when config.toml does not set any.
pub const DEFAULT_PAYMENT_TERMS_DAYS: u32 = 30;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppSettings {
    /// Company details printed in the invoice header
    pub company: CompanySettings,
    /// Days between invoice date and due date
    pub payment_terms_days: u32,
    /// Features enabled for new invoice sessions
    pub default_features: InvoiceFeatures,
    /// Default billing rate per process
    pub rates: Vec<RateConfig>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            company: CompanySettings::default(),
            payment_terms_days: DEFAULT_PAYMENT_TERMS_DAYS,
            default_features: InvoiceFeatures::default(),
            rates: Vec::new(),
        }
    }
}

impl AppSettings {
    /// Default rate configured for a process, if any.
    #[must_use]
    pub fn rate_for(&self, process: &str) -> Option<f64> {
        self.rates
            .iter()
            .find(|r| r.process == process)
            .map(|r| r.rate)
    }
}

/// Issuing company details
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CompanySettings {
    /// Company name
    pub name: String,
    /// Postal address, one entry per line
    pub address: Vec<String>,
    /// Contact email
    pub contact: String,
}

impl Default for CompanySettings {
    fn default() -> Self {
        Self {
            name: "3Gen".to_string(),
            address: vec!["AMTP".to_string(), "Baner".to_string()],
            contact: "contact@3gen.com".to_string(),
        }
    }
}

/// Default billing rate for one process
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RateConfig {
    /// Process key
    pub process: String,
    /// Rate per FTE
    pub rate: f64,
}

/// Loads settings from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - A default rate is negative
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<AppSettings> {
    let path_ref = path.as_ref();
    tracing::debug!("Attempting to load settings from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    parse_settings(&contents)
}

/// Parses settings from TOML text
pub fn parse_settings(contents: &str) -> Result<AppSettings> {
    let settings: AppSettings = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;

    if let Some(bad) = settings.rates.iter().find(|r| !r.rate.is_finite() || r.rate < 0.0) {
        return Err(Error::Config {
            message: format!("Default rate for '{}' must be non-negative", bad.process),
        });
    }

    Ok(settings)
}

/// Loads settings from the default location (./config.toml), falling back to
/// built-in defaults when the file does not exist.
pub fn load_default_settings() -> Result<AppSettings> {
    let path = Path::new("config.toml");
    if path.exists() {
        load_settings(path)
    } else {
        tracing::info!("No config.toml found, using default settings");
        Ok(AppSettings::default())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;

    #[test]
    fn test_parse_settings() {
        let toml_str = r#"
            payment_terms_days = 45

            [company]
            name = "Spine Services"
            address = ["12 Park Lane", "Pune"]
            contact = "billing@spine.test"

            [default_features]
            discount = false

            [[rates]]
            process = "Billing"
            rate = 100.0

            [[rates]]
            process = "Support"
            rate = 50
        "#;

        let settings = parse_settings(toml_str).unwrap();
        assert_eq!(settings.payment_terms_days, 45);
        assert_eq!(settings.company.name, "Spine Services");
        assert_eq!(settings.company.address.len(), 2);
        assert!(!settings.default_features.discount);
        assert!(settings.default_features.rate_editing);
        assert_eq!(settings.rate_for("Support"), Some(50.0));
        assert_eq!(settings.rate_for("Onboarding"), None);
    }

    #[test]
    fn test_empty_settings_use_defaults() {
        let settings = parse_settings("").unwrap();
        assert_eq!(settings, AppSettings::default());
        assert_eq!(settings.payment_terms_days, DEFAULT_PAYMENT_TERMS_DAYS);
        assert_eq!(settings.company.contact, "contact@3gen.com");
    }

    #[test]
    fn test_negative_rate_is_rejected() {
        let result = parse_settings("[[rates]]\nprocess = \"Billing\"\nrate = -1.0\n");
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_malformed_toml_is_config_error() {
        let result = parse_settings("payment_terms_days = \"soon\"");
        assert!(matches!(result, Err(Error::Config { .. })));
    }
}
