//! Order number and redemption code generation.
//!
//! Both combine a clock component with a short random base-36 suffix. Order
//! numbers are additionally protected by the `orders.order_id` UNIQUE
//! constraint; redemption codes are display-only and carry no uniqueness
//! guarantee.

use chrono::{DateTime, Utc};
use rand::Rng;

use fgs_core::OrderNumber;

const ORDER_SUFFIX_LEN: usize = 5;
const CODE_SUFFIX_LEN: usize = 4;
const CODE_CLOCK_DIGITS: i64 = 1_000_000;

/// Mint an order number: `FGS-<unix millis>-<5 base-36 chars>`.
#[must_use]
pub fn order_number(now: DateTime<Utc>) -> OrderNumber {
    OrderNumber::new(format!(
        "{}-{}-{}",
        OrderNumber::PREFIX,
        now.timestamp_millis(),
        random_base36(ORDER_SUFFIX_LEN)
    ))
}

/// Build a redemption code: `<label>-<last 6 digits of unix millis>-<4 base-36 chars>`.
///
/// Whitespace is stripped from `label` (usually the subcategory, else the category).
#[must_use]
pub fn redemption_code(label: &str, now: DateTime<Utc>) -> String {
    let prefix: String = label.chars().filter(|c| !c.is_whitespace()).collect();
    format!(
        "{prefix}-{:06}-{}",
        now.timestamp_millis().rem_euclid(CODE_CLOCK_DIGITS),
        random_base36(CODE_SUFFIX_LEN)
    )
}

fn random_base36(len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| {
            char::from_digit(rng.random_range(0..36), 36)
                .map_or('0', |c| c.to_ascii_uppercase())
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashSet;

    use chrono::TimeZone;

    use super::*;

    fn fixed_now() -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_760_601_600_123).unwrap()
    }

    #[test]
    fn test_order_number_shape() {
        let number = order_number(fixed_now());
        let parts: Vec<&str> = number.as_str().split('-').collect();

        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "FGS");
        assert_eq!(parts[1], "1760601600123");
        assert_eq!(parts[2].len(), 5);
        assert!(
            parts[2]
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase())
        );
    }

    #[test]
    fn test_order_numbers_differ_within_same_millisecond() {
        let now = fixed_now();
        let numbers: HashSet<String> = (0..50)
            .map(|_| order_number(now).as_str().to_owned())
            .collect();
        assert!(numbers.len() > 1);
    }

    #[test]
    fn test_redemption_code_uses_label_and_clock_tail() {
        let code = redemption_code("Free Fire", fixed_now());
        assert!(code.starts_with("FreeFire-600123-"), "{code}");
        assert_eq!(code.len(), "FreeFire-600123-".len() + 4);
    }

    #[test]
    fn test_redemption_code_pads_short_clock_tail() {
        let now = Utc.timestamp_millis_opt(1_000_000_000_042).unwrap();
        let code = redemption_code("ROV", now);
        assert!(code.starts_with("ROV-000042-"), "{code}");
    }
}
