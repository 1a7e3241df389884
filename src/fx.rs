// FX conversion for offers, pricing and legal fees
// Rates are quoted against a base currency; conversion goes through the base

use async_trait::async_trait;
use moka::future::Cache;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::currency::{normalise_currency, validate_money, Money};

/// Largest minor-unit amount an f64 holds exactly
const MAX_EXACT_MINOR: i64 = 1 << 53;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FxError {
    #[error("Unsupported currency pair {from}->{to}")]
    UnsupportedPair { from: String, to: String },

    #[error("Rate provider failed: {0}")]
    Provider(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Amount out of range for {currency}")]
    AmountOutOfRange { currency: String },
}

/// Rates table: units of each currency per one unit of `base`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FxRates {
    pub base: String,
    pub rates: BTreeMap<String, f64>,
}

impl FxRates {
    /// Deterministic development table, GBP based
    pub fn mock() -> Self {
        let rates = [
            ("GBP", 1.0),
            ("EUR", 1.17),
            ("USD", 1.28),
            ("NGN", 1985.0),
            ("ZAR", 23.9),
            ("AED", 4.7),
            ("CAD", 1.74),
            ("AUD", 1.93),
            ("CHF", 1.13),
            ("SGD", 1.72),
            ("JPY", 191.5),
            ("INR", 106.4),
            ("BRL", 7.1),
            ("MXN", 24.6),
            ("NZD", 2.08),
        ]
        .into_iter()
        .map(|(code, rate)| (code.to_string(), rate))
        .collect();

        Self {
            base: "GBP".to_string(),
            rates,
        }
    }

    /// Convert `value` between two currencies.
    ///
    /// Codes are trimmed and uppercased. Returns `None` for non-finite values
    /// and for currencies missing from the table or quoted at zero.
    pub fn convert(&self, value: f64, from: &str, to: &str) -> Option<f64> {
        let from = normalise_currency(from);
        let to = normalise_currency(to);

        if !value.is_finite() {
            return None;
        }
        if from == to {
            return Some(value);
        }

        let from_rate = self.rate(&from)?;
        let to_rate = self.rate(&to)?;

        let value_in_base = value / from_rate;
        Some(value_in_base * to_rate)
    }

    fn rate(&self, code: &str) -> Option<f64> {
        self.rates
            .get(code)
            .copied()
            .filter(|rate| rate.is_finite() && *rate != 0.0)
    }

    pub fn supported_currencies(&self) -> Vec<String> {
        self.rates.keys().cloned().collect()
    }
}

impl Default for FxRates {
    fn default() -> Self {
        Self::mock()
    }
}

/// Decimal places of the currency's minor unit
pub fn minor_unit_exponent(code: &str) -> i32 {
    match normalise_currency(code).as_str() {
        "JPY" => 0,
        _ => 2,
    }
}

/// Source of rate tables
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait RateProvider: Send + Sync {
    async fn fetch_rates(&self) -> Result<FxRates, FxError>;
}

/// Serves a fixed table
#[derive(Debug, Clone, Default)]
pub struct StaticRateProvider {
    rates: FxRates,
}

impl StaticRateProvider {
    pub fn new(rates: FxRates) -> Self {
        Self { rates }
    }
}

#[async_trait]
impl RateProvider for StaticRateProvider {
    async fn fetch_rates(&self) -> Result<FxRates, FxError> {
        Ok(self.rates.clone())
    }
}

const RATES_CACHE_KEY: &str = "latest";

/// Conversion service with a TTL cache in front of the rate provider
pub struct FxService {
    provider: Arc<dyn RateProvider>,
    cache: Cache<&'static str, Arc<FxRates>>,
}

impl FxService {
    pub fn new(provider: Arc<dyn RateProvider>, ttl: Duration) -> Self {
        Self {
            provider,
            cache: Cache::builder().max_capacity(1).time_to_live(ttl).build(),
        }
    }

    pub fn with_mock_rates() -> Self {
        Self::new(Arc::new(StaticRateProvider::default()), Duration::from_secs(3600))
    }

    pub async fn rates(&self) -> Result<Arc<FxRates>, FxError> {
        let provider = self.provider.clone();
        self.cache
            .try_get_with(RATES_CACHE_KEY, async move {
                debug!("Fetching FX rates from provider");
                let rates = provider.fetch_rates().await?;
                if rates.rate(&rates.base) != Some(1.0) {
                    warn!(base = %rates.base, "Rate table does not quote its base at 1.0");
                    return Err(FxError::Provider(format!(
                        "rate table does not quote its base currency {} at 1.0",
                        rates.base
                    )));
                }
                Ok(Arc::new(rates))
            })
            .await
            .map_err(|e| (*e).clone())
    }

    pub async fn convert(&self, value: f64, from: &str, to: &str) -> Result<f64, FxError> {
        self.rates()
            .await?
            .convert(value, from, to)
            .ok_or_else(|| FxError::UnsupportedPair {
                from: normalise_currency(from),
                to: normalise_currency(to),
            })
    }

    /// Convert an amount in minor units, rounding to the target's minor unit.
    ///
    /// Amounts beyond 2^53 minor units on either side are refused rather than
    /// rounded or saturated.
    pub async fn convert_money(&self, money: &Money, target_currency: &str) -> Result<Money, FxError> {
        validate_money(money)
            .into_result()
            .map_err(|e| FxError::InvalidAmount(e.to_string()))?;
        if money.amount_minor > MAX_EXACT_MINOR {
            return Err(FxError::AmountOutOfRange {
                currency: normalise_currency(&money.currency_code),
            });
        }

        let from_exp = minor_unit_exponent(&money.currency_code);
        let to_exp = minor_unit_exponent(target_currency);

        let major = money.amount_minor as f64 / 10f64.powi(from_exp);
        let converted = self.convert(major, &money.currency_code, target_currency).await?;

        let scaled = (converted * 10f64.powi(to_exp)).round();
        if !scaled.is_finite() || scaled > MAX_EXACT_MINOR as f64 {
            return Err(FxError::AmountOutOfRange {
                currency: normalise_currency(target_currency),
            });
        }

        Ok(Money {
            amount_minor: scaled as i64,
            currency_code: normalise_currency(target_currency),
        })
    }
}
