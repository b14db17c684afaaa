//! Service configuration loaded from environment variables

use std::env;

/// Bounds applied to user-supplied quantities before anything is written
#[derive(Debug, Clone, Copy)]
pub struct QuantityLimits {
    /// Smallest accepted ingredient amount
    pub min_amount: i32,
    /// Largest accepted ingredient amount
    pub max_amount: i32,
    /// Smallest accepted cooking time in minutes
    pub min_cooking_time: i32,
}

impl Default for QuantityLimits {
    fn default() -> Self {
        Self {
            min_amount: 1,
            max_amount: 32_000,
            min_cooking_time: 1,
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Address the HTTP server binds to
    pub bind_addr: String,
    /// Public base URL used when building short links
    pub base_url: String,
    /// Default page size for list endpoints
    pub page_size: u32,
    /// Quantity validation bounds
    pub limits: QuantityLimits,
}

impl AppConfig {
    /// Create a new AppConfig from environment variables
    pub fn from_env() -> Self {
        let bind_addr =
            env::var("API_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string());

        let base_url = env::var("API_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:8000".to_string())
            .trim_end_matches('/')
            .to_string();

        let page_size = env::var("API_PAGE_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(6);

        let defaults = QuantityLimits::default();
        let limits = QuantityLimits {
            min_amount: env_or("INGREDIENT_MIN_AMOUNT", defaults.min_amount),
            max_amount: env_or("INGREDIENT_MAX_AMOUNT", defaults.max_amount),
            min_cooking_time: env_or("MIN_COOKING_TIME", defaults.min_cooking_time),
        };

        Self {
            bind_addr,
            base_url,
            page_size,
            limits,
        }
    }
}

fn env_or(key: &str, default: i32) -> i32 {
    env::var(key).ok().and_then(|s| s.parse().ok()).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantity_limit_defaults() {
        let limits = QuantityLimits::default();
        assert_eq!(limits.min_amount, 1);
        assert_eq!(limits.max_amount, 32_000);
        assert_eq!(limits.min_cooking_time, 1);
    }

    #[test]
    fn test_app_config_from_env() {
        let config = AppConfig::from_env();
        if env::var("API_PAGE_SIZE").is_err() {
            assert_eq!(config.page_size, 6);
        }
        assert!(!config.bind_addr.is_empty());
        assert!(!config.base_url.ends_with('/'));
    }
}
