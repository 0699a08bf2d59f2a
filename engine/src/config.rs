//! Engine configuration.
//!
//! Every knob has a default; [`EngineConfig::from_env`] overlays
//! `TIDYBOOK_*` environment variables on top, so deployments tune the
//! engine without a config file. Unparsable overrides are logged and
//! ignored rather than aborting startup.

use std::str::FromStr;
use std::time::Duration;

use tidybook_core::pricing::DEFAULT_TAX_RATE;

/// Tunables for [`crate::Engine`]
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Base URL of the booking service
    pub base_url: String,
    /// Bearer token attached to every request
    pub bearer_token: String,
    /// Tax rate applied to the discounted subtotal
    pub tax_rate: f64,
    /// Quiet period a postal keystroke must survive before a lookup fires
    pub postal_debounce: Duration,
    /// Per-request timeout for backend calls
    pub request_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            bearer_token: String::new(),
            tax_rate: DEFAULT_TAX_RATE,
            postal_debounce: Duration::from_millis(500),
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl EngineConfig {
    /// Defaults overlaid with environment variables:
    /// `TIDYBOOK_BASE_URL`, `TIDYBOOK_API_TOKEN`, `TIDYBOOK_TAX_RATE`,
    /// `TIDYBOOK_POSTAL_DEBOUNCE_MS`, `TIDYBOOK_REQUEST_TIMEOUT_SECS`.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let mut config = defaults.clone();
        if let Ok(url) = std::env::var("TIDYBOOK_BASE_URL") {
            config.base_url = url;
        }
        if let Ok(token) = std::env::var("TIDYBOOK_API_TOKEN") {
            config.bearer_token = token;
        }
        config.tax_rate = parse_var("TIDYBOOK_TAX_RATE", defaults.tax_rate);
        config.postal_debounce = Duration::from_millis(parse_var(
            "TIDYBOOK_POSTAL_DEBOUNCE_MS",
            u64::try_from(defaults.postal_debounce.as_millis()).unwrap_or(500),
        ));
        config.request_timeout = Duration::from_secs(parse_var(
            "TIDYBOOK_REQUEST_TIMEOUT_SECS",
            defaults.request_timeout.as_secs(),
        ));
        config
    }

    /// Set the base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the bearer token
    #[must_use]
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = token.into();
        self
    }

    /// Set the tax rate
    #[must_use]
    pub const fn with_tax_rate(mut self, rate: f64) -> Self {
        self.tax_rate = rate;
        self
    }

    /// Set the postal debounce quiet period
    #[must_use]
    pub const fn with_postal_debounce(mut self, debounce: Duration) -> Self {
        self.postal_debounce = debounce;
        self
    }

    /// Set the per-request timeout
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> T {
    let Ok(raw) = std::env::var(name) else {
        return default;
    };
    match raw.parse() {
        Ok(value) => value,
        Err(_) => {
            tracing::warn!(var = name, value = %raw, "ignoring unparsable environment override");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_knobs() {
        let config = EngineConfig::default();
        assert!((config.tax_rate - 0.10).abs() < f64::EPSILON);
        assert_eq!(config.postal_debounce, Duration::from_millis(500));
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert!(config.bearer_token.is_empty());
    }

    #[test]
    fn builder_methods_override_single_fields() {
        let config = EngineConfig::default()
            .with_base_url("https://api.tidybook.example")
            .with_bearer_token("secret")
            .with_tax_rate(0.19)
            .with_postal_debounce(Duration::from_millis(20));

        assert_eq!(config.base_url, "https://api.tidybook.example");
        assert_eq!(config.bearer_token, "secret");
        assert!((config.tax_rate - 0.19).abs() < f64::EPSILON);
        assert_eq!(config.postal_debounce, Duration::from_millis(20));
        assert_eq!(config.request_timeout, Duration::from_secs(10));
    }
}
