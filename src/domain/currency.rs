// Currency domain - money in minor units plus ISO-4217 style code checks

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::validation::ValidationReport;

pub type CurrencyCode = String;

static CURRENCY_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{3}$").expect("currency code pattern is valid"));

/// An amount in the currency's minor unit (pence, cents, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    pub amount_minor: i64,
    pub currency_code: CurrencyCode,
}

impl Money {
    pub fn new(amount_minor: i64, currency_code: impl Into<CurrencyCode>) -> Self {
        Self {
            amount_minor,
            currency_code: currency_code.into(),
        }
    }
}

/// Trim and uppercase a currency code as entered by a user
pub fn normalise_currency(code: &str) -> CurrencyCode {
    code.trim().to_uppercase()
}

/// Surrounding whitespace is ignored; case is not
pub fn is_valid_currency_code(code: &str) -> bool {
    CURRENCY_CODE.is_match(code.trim())
}

pub fn validate_currency_code(field: &str, code: &str, report: &mut ValidationReport) {
    if !is_valid_currency_code(code) {
        report.push(
            field,
            format!("'{}' is not a three-letter uppercase currency code", code.trim()),
        );
    }
}

pub fn validate_money(money: &Money) -> ValidationReport {
    let mut report = ValidationReport::new();
    if money.amount_minor < 0 {
        report.push("amount_minor", "must not be negative");
    }
    validate_currency_code("currency_code", &money.currency_code, &mut report);
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_codes_must_be_three_uppercase_letters() {
        assert!(is_valid_currency_code("GBP"));
        assert!(!is_valid_currency_code("gbp"));
        assert!(!is_valid_currency_code("GB"));
        assert!(!is_valid_currency_code("GBPX"));
        assert!(!is_valid_currency_code("G8P"));
    }

    #[test]
    fn currency_codes_are_checked_after_trimming() {
        assert!(is_valid_currency_code(" GBP"));
        assert!(is_valid_currency_code("EUR\n"));
        assert!(!is_valid_currency_code(" gbp "));
        assert!(!is_valid_currency_code("   "));

        let mut report = ValidationReport::new();
        validate_currency_code("currency_code", "  USD ", &mut report);
        assert!(report.success());
    }

    #[test]
    fn normalise_trims_and_uppercases() {
        assert_eq!(normalise_currency("  eur "), "EUR");
    }

    #[test]
    fn negative_money_is_rejected() {
        let report = validate_money(&Money::new(-1, "usd"));
        assert_eq!(report.issues.len(), 2);
        assert!(validate_money(&Money::new(0, "USD")).success());
    }
}
