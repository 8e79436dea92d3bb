//! Currency Formatting
//!
//! The nudge only produces numbers and a currency code; turning them into
//! display strings is the formatter's job.

use rust_decimal::{Decimal, RoundingStrategy};

/// Formats a decimal amount in a currency
pub trait CurrencyFormatter: Send + Sync {
    /// Format `amount` in `currency_code`. `precision` overrides the
    /// currency's default number of decimals.
    fn format(&self, amount: Decimal, currency_code: &str, precision: Option<u32>) -> String;
}

/// Symbol and default precision for a currency
struct CurrencyDefaults {
    symbol: Option<&'static str>,
    precision: u32,
}

fn currency_defaults(code: &str) -> CurrencyDefaults {
    let (symbol, precision) = match code.to_uppercase().as_str() {
        "USD" => (Some("$"), 2),
        "EUR" => (Some("€"), 2),
        "GBP" => (Some("£"), 2),
        "JPY" => (Some("¥"), 0),
        "AUD" => (Some("A$"), 2),
        "CAD" => (Some("C$"), 2),
        "NZD" => (Some("NZ$"), 2),
        "BRL" => (Some("R$"), 2),
        "INR" => (Some("₹"), 2),
        "ILS" => (Some("₪"), 2),
        "KRW" => (Some("₩"), 0),
        "RUB" => (Some("₽"), 2),
        "CHF" => (Some("CHF "), 2),
        _ => (None, 2),
    };
    CurrencyDefaults { symbol, precision }
}

/// Symbol-prefixed, comma-grouped formatter (e.g., `$7,700`, `€40.00`)
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultCurrencyFormatter;

impl CurrencyFormatter for DefaultCurrencyFormatter {
    fn format(&self, amount: Decimal, currency_code: &str, precision: Option<u32>) -> String {
        format_currency(amount, currency_code, precision)
    }
}

/// Format with the default formatter
pub fn format_currency(amount: Decimal, currency_code: &str, precision: Option<u32>) -> String {
    let defaults = currency_defaults(currency_code);
    let precision = precision.unwrap_or(defaults.precision);

    let rounded = amount.round_dp_with_strategy(precision, RoundingStrategy::MidpointAwayFromZero);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    let digits = format!("{:.*}", precision as usize, rounded.abs());

    let (integer, fraction) = match digits.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (digits.as_str(), None),
    };

    let mut number = group_thousands(integer);
    if let Some(fraction) = fraction {
        number.push('.');
        number.push_str(fraction);
    }

    match defaults.symbol {
        Some(symbol) => format!("{sign}{symbol}{number}"),
        None => format!("{sign}{} {number}", currency_code.to_uppercase()),
    }
}

fn group_thousands(integer: &str) -> String {
    let len = integer.len();
    let mut grouped = String::with_capacity(len + len / 3);
    for (i, ch) in integer.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
