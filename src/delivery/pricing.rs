//! Money strings as sent by the API: a currency symbol followed by a decimal.

use std::str::FromStr;

use rust_decimal::Decimal;

const DEFAULT_SYMBOL: char = '$';

/// Sum two amounts such as "$5.00" and "$1.50" into "$6.5".
///
/// Amounts are added exactly. Unparseable amounts count as zero. The result
/// is not padded to two decimals; a whole number keeps one fractional digit
/// ("$6.0"). A sum too large for `Decimal` is treated like an unparseable
/// amount and renders as zero.
pub fn total_price(delivery_fee: &str, surcharge: &str) -> String {
  let total = parse_amount(delivery_fee)
    .checked_add(parse_amount(surcharge))
    .unwrap_or(Decimal::ZERO);
  format!("{}{}", currency_symbol(delivery_fee), format_amount(total))
}

/// Numeric part of an amount, or zero.
pub fn parse_amount(raw: &str) -> Decimal {
  let raw = raw.trim();
  let digits = match raw.chars().next() {
    Some(c) if is_symbol(c) => &raw[c.len_utf8()..],
    _ => raw,
  };
  Decimal::from_str(digits.trim()).unwrap_or(Decimal::ZERO)
}

fn currency_symbol(raw: &str) -> char {
  match raw.trim().chars().next() {
    Some(c) if is_symbol(c) => c,
    _ => DEFAULT_SYMBOL,
  }
}

fn is_symbol(c: char) -> bool {
  !(c.is_ascii_digit() || c == '-' || c == '+' || c == '.')
}

fn format_amount(amount: Decimal) -> String {
  let amount = amount.normalize();
  if amount.scale() == 0 {
    format!("{}.0", amount)
  } else {
    amount.to_string()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_total_is_not_padded() {
    assert_eq!(total_price("$5.00", "$1.50"), "$6.5");
  }

  #[test]
  fn test_total_is_exact() {
    assert_eq!(total_price("$0.10", "$0.20"), "$0.3");
    assert_eq!(total_price("$92.14", "$136.46"), "$228.6");
  }

  #[test]
  fn test_whole_total_keeps_one_digit() {
    assert_eq!(total_price("$5.00", "$1.00"), "$6.0");
  }

  #[test]
  fn test_unparseable_amount_counts_as_zero() {
    assert_eq!(total_price("$abc", "$1.25"), "$1.25");
    assert_eq!(total_price("", ""), "$0.0");
  }

  #[test]
  fn test_overflowing_total_is_zero() {
    let max = format!("${}", Decimal::MAX);
    assert_eq!(total_price(&max, &max), "$0.0");

    // Largest amount on its own still adds
    assert_eq!(total_price(&max, "$0"), format!("${}.0", Decimal::MAX));
  }

  #[test]
  fn test_other_currency_symbol() {
    assert_eq!(total_price("€2.50", "€0.50"), "€3.0");
  }

  #[test]
  fn test_parse_amount_without_symbol() {
    assert_eq!(parse_amount("4.75"), Decimal::new(475, 2));
  }
}
