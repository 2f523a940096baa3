//! Day-ahead price source.
//!
//! [`PriceSource`] hides where the hourly rate vector comes from so handlers
//! (and tests) do not depend on the upstream market operator.
//! [`HttpPriceSource`] downloads the published zonal CSV with [`reqwest`] and
//! hands it to [`chargeplan_core::pricing::parse_zone_csv`].

use async_trait::async_trait;
use chargeplan_core::pricing::{
    parse_zone_csv, target_date, zone_csv_url, HourlyRates, PriceCurveError,
};
use chrono::NaiveDate;

/// Default location of the day-ahead LBMP zonal CSV files.
const DEFAULT_BASE_URL: &str = "http://mis.nyiso.com/public/csv/damlbmp";
/// Default pricing zone.
const DEFAULT_ZONE: &str = "N.Y.C.";
/// Local hour after which tomorrow's day-ahead prices are published.
const DEFAULT_RELEASE_HOUR: u32 = 10;

/// Where and what to fetch.
#[derive(Debug, Clone)]
pub struct PricingConfig {
    pub base_url: String,
    pub zone: String,
    pub release_hour: u32,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            zone: DEFAULT_ZONE.to_string(),
            release_hour: DEFAULT_RELEASE_HOUR,
        }
    }
}

impl PricingConfig {
    /// Load pricing configuration from environment variables.
    ///
    /// | Env Var                | Default                                   |
    /// |------------------------|-------------------------------------------|
    /// | `PRICING_BASE_URL`     | `http://mis.nyiso.com/public/csv/damlbmp` |
    /// | `PRICING_ZONE`         | `N.Y.C.`                                  |
    /// | `PRICING_RELEASE_HOUR` | `10`                                      |
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let base_url = std::env::var("PRICING_BASE_URL").unwrap_or(defaults.base_url);
        let zone = std::env::var("PRICING_ZONE").unwrap_or(defaults.zone);

        let release_hour: u32 = std::env::var("PRICING_RELEASE_HOUR")
            .map(|v| v.parse().expect("PRICING_RELEASE_HOUR must be a valid u32"))
            .unwrap_or(defaults.release_hour);
        assert!(release_hour < 24, "PRICING_RELEASE_HOUR must be between 0 and 23");

        Self {
            base_url,
            zone,
            release_hour,
        }
    }
}

/// Errors from fetching or interpreting upstream price data.
#[derive(Debug, thiserror::Error)]
pub enum PricingError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The upstream returned a non-2xx status code.
    #[error("Price source returned {status} for {url}")]
    Upstream { status: u16, url: String },

    /// The CSV did not match the expected schema.
    #[error("Malformed price data: {0}")]
    Parse(#[from] PriceCurveError),
}

/// Supplier of the 24-slot hourly rate vector.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn hourly_rates(&self) -> Result<HourlyRates, PricingError>;
}

/// Fetches the day-ahead zonal CSV over HTTP.
pub struct HttpPriceSource {
    client: reqwest::Client,
    config: PricingConfig,
}

impl HttpPriceSource {
    pub fn new(config: PricingConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Create a source reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, config: PricingConfig) -> Self {
        Self { client, config }
    }
}

impl HttpPriceSource {
    /// Download and parse the zonal curve for a specific delivery day.
    pub async fn rates_for_date(&self, date: NaiveDate) -> Result<HourlyRates, PricingError> {
        let url = zone_csv_url(&self.config.base_url, date);
        tracing::debug!(%url, %date, "Fetching day-ahead prices");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(PricingError::Upstream {
                status: status.as_u16(),
                url,
            });
        }

        let body = response.text().await?;
        let rates = parse_zone_csv(&body, &self.config.zone)?;

        let missing = rates.iter().filter(|r| r.is_none()).count();
        if missing > 0 {
            tracing::warn!(%date, zone = %self.config.zone, missing, "Price curve has missing hours");
        }
        Ok(rates)
    }
}

#[async_trait]
impl PriceSource for HttpPriceSource {
    async fn hourly_rates(&self) -> Result<HourlyRates, PricingError> {
        let date = target_date(chrono::Local::now().naive_local(), self.config.release_hour);
        self.rates_for_date(date).await
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn default_config_targets_nyc_zone() {
        let config = PricingConfig::default();
        assert_eq!(config.zone, "N.Y.C.");
        assert_eq!(config.release_hour, 10);
        assert!(config.base_url.ends_with("/damlbmp"));
    }

    #[test]
    fn malformed_csv_maps_to_parse_error() {
        let err: PricingError = parse_zone_csv("not,a,price,file\n1,2,3,4\n", "N.Y.C.")
            .unwrap_err()
            .into();
        assert_matches!(err, PricingError::Parse(PriceCurveError::MissingColumn(_)));
    }
}
