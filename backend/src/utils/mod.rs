//! # Utilities Module
//!
//! This module contains helper functions and utilities used
//! across the backend service.

/// Number of fen in one yuan.
pub const FEN_PER_YUAN: i64 = 100;

/// Largest price, reward or level threshold a form may carry (¥100,000,000).
pub const MAX_AMOUNT: i64 = 100_000_000 * FEN_PER_YUAN;

/// Format a fen amount as human-readable yuan.
///
/// ## Examples
///
/// ```rust,ignore
/// assert_eq!(format_yuan(1_250), "¥12.50");
/// assert_eq!(format_yuan(123_456_700), "¥1,234,567.00");
/// assert_eq!(format_yuan(-500), "-¥5.00");
/// ```
pub fn format_yuan(amount: i64) -> String {
    let sign = if amount < 0 { "-" } else { "" };
    let abs = amount.unsigned_abs();
    let whole = abs / FEN_PER_YUAN as u64;
    let frac = abs % FEN_PER_YUAN as u64;

    // Add commas
    let whole_str = whole.to_string();
    let mut result = String::new();
    for (i, c) in whole_str.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    let reversed: String = result.chars().rev().collect();

    format!("{}¥{}.{:02}", sign, reversed, frac)
}

/// Amount left for the service provider after the platform fee.
///
/// `fee_percent` of `None` means the product carries no fee.
/// Integer division rounds the provider's share toward zero. The product
/// is taken in `i128`; the result never exceeds `|amount|`.
pub fn net_of_fee(amount: i64, fee_percent: Option<u8>) -> i64 {
    let fee = i128::from(fee_percent.unwrap_or(0).min(100));
    (i128::from(amount) * (100 - fee) / 100) as i64
}

/// Truncate a string to a maximum number of characters.
///
/// Used when logging free-text fields such as bounty descriptions.
pub fn truncate_string(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_yuan() {
        assert_eq!(format_yuan(0), "¥0.00");
        assert_eq!(format_yuan(5), "¥0.05");
        assert_eq!(format_yuan(1_250), "¥12.50");
        assert_eq!(format_yuan(123_456_700), "¥1,234,567.00");
        assert_eq!(format_yuan(-500), "-¥5.00");
    }

    #[test]
    fn test_net_of_fee() {
        assert_eq!(net_of_fee(10_000, Some(5)), 9_500);
        assert_eq!(net_of_fee(10_000, None), 10_000);
        assert_eq!(net_of_fee(999, Some(50)), 499);
    }

    #[test]
    fn test_net_of_fee_at_limits() {
        assert_eq!(net_of_fee(i64::MAX, None), i64::MAX);
        assert_eq!(net_of_fee(i64::MAX, Some(10)), 8_301_034_833_169_298_226);
        assert_eq!(net_of_fee(i64::MAX, Some(100)), 0);
        assert_eq!(net_of_fee(i64::MIN, Some(50)), i64::MIN / 2);
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("abcdefghij", 10), "abcdefghij");
        assert_eq!(truncate_string("abcdefghijklmnop", 10), "abcdefg...");
        assert_eq!(truncate_string("急求大神带过最终BOSS", 5), "急求...");
    }
}
