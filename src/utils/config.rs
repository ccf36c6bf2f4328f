use std::env;
use std::time::Duration;

use validator::Validate;

use crate::models::catalog::DEFAULT_GIFT_THRESHOLD;

#[derive(Debug, Clone, Validate)]
pub struct Config {
    #[validate(range(min = 1, message = "CART_GIFT_THRESHOLD must be greater than zero"))]
    pub gift_threshold: u64,
    #[validate(range(min = 1, max = 60, message = "CART_BANNER_SECS must be between 1 and 60"))]
    pub banner_secs: u64,
    #[validate(length(min = 1, max = 8, message = "CART_CURRENCY_SYMBOL must be 1-8 characters"))]
    pub currency_symbol: String,
    pub log_level: String,
    pub environment: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gift_threshold: DEFAULT_GIFT_THRESHOLD,
            banner_secs: 3,
            currency_symbol: "₹".to_string(),
            log_level: "info".to_string(),
            environment: "development".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();
        let defaults = Config::default();
        let config = Config {
            gift_threshold: parse_var("CART_GIFT_THRESHOLD")?.unwrap_or(defaults.gift_threshold),
            banner_secs: parse_var("CART_BANNER_SECS")?.unwrap_or(defaults.banner_secs),
            currency_symbol: env::var("CART_CURRENCY_SYMBOL").unwrap_or(defaults.currency_symbol),
            log_level: env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
            environment: env::var("APP_ENV").unwrap_or(defaults.environment),
        };

        config.check()?;
        tracing::debug!("Config: successfully loaded for {} environment", config.environment);
        Ok(config)
    }

    pub fn check(&self) -> anyhow::Result<()> {
        self.validate()
            .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))
    }

    pub fn banner_delay(&self) -> Duration {
        Duration::from_secs(self.banner_secs)
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

fn parse_var(name: &str) -> anyhow::Result<Option<u64>> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("{} must be a non-negative integer, got '{}': {}", name, raw, e)),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.check().is_ok());
        assert_eq!(config.banner_delay(), Duration::from_secs(3));
        assert!(!config.is_production());
    }

    #[test]
    fn test_zero_threshold_rejected() {
        let config = Config {
            gift_threshold: 0,
            ..Config::default()
        };
        assert!(config.check().is_err());
    }

    #[test]
    fn test_banner_secs_out_of_range() {
        for banner_secs in [0, 61] {
            let config = Config {
                banner_secs,
                ..Config::default()
            };
            assert!(config.check().is_err());
        }
    }

    #[test]
    fn test_empty_currency_symbol_rejected() {
        let config = Config {
            currency_symbol: String::new(),
            ..Config::default()
        };
        assert!(config.check().is_err());
    }
}
