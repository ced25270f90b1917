//! Display formatting helpers.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Format an amount for display: `$19.99`.
pub fn currency(amount: Decimal) -> String {
    format!("${amount:.2}")
}

/// Format a timestamp for display: `January 15, 2026`.
pub fn date(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%B %d, %Y").to_string()
}

/// Truncate text to `max` characters, appending an ellipsis when cut.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_owned()
    } else {
        let cut: String = text.chars().take(max).collect();
        format!("{cut}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_pads_cents() {
        assert_eq!(currency(Decimal::new(20, 0)), "$20.00");
        assert_eq!(currency(Decimal::new(1999, 2)), "$19.99");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a longer description", 8), "a longer...");
    }
}
