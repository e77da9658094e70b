//! Serde types matching the delivery list endpoint.

use chrono::DateTime;
use serde::{Deserialize, Serialize};

use super::pricing::total_price;

/// One delivery order as returned by the list endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
  pub id: String,
  pub remarks: String,
  #[serde(rename = "pickupTime")]
  pub pickup_time: String,
  /// URL of the goods picture
  #[serde(rename = "goodsPicture")]
  pub goods_picture: String,
  /// Amount with a leading currency symbol, e.g. "$5.00"
  #[serde(rename = "deliveryFee")]
  pub delivery_fee: String,
  /// Amount with a leading currency symbol
  pub surcharge: String,
  pub route: Route,
  pub sender: Sender,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
  pub start: String,
  pub end: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sender {
  pub phone: String,
  pub name: String,
  pub email: String,
}

impl Record {
  /// Delivery fee plus surcharge, e.g. "$6.5".
  pub fn total(&self) -> String {
    total_price(&self.delivery_fee, &self.surcharge)
  }

  /// Pickup time as "YYYY-MM-DD HH:MM" when it is RFC 3339, otherwise as sent.
  pub fn pretty_pickup_time(&self) -> String {
    pretty_timestamp(&self.pickup_time)
  }
}

/// Reformat an RFC 3339 timestamp for display, keeping its own offset.
pub fn pretty_timestamp(raw: &str) -> String {
  match DateTime::parse_from_rfc3339(raw) {
    Ok(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
    Err(_) => raw.to_string(),
  }
}

#[cfg(test)]
pub(crate) mod tests {
  use super::*;

  pub(crate) const SAMPLE_PAGE: &str = r#"[
    {
      "id": "5ef1f1c6f8b5a8e0b7b4a1c2",
      "remarks": "Handle with care",
      "pickupTime": "2014-10-06T10:45:38-08:00",
      "goodsPicture": "https://loremflickr.com/320/240/cat?lock=9953",
      "deliveryFee": "$92.14",
      "surcharge": "$136.46",
      "route": { "start": "Noble Street", "end": "Montauk Court" },
      "sender": { "phone": "+1 (899) 523-3905", "name": "Harding Welch", "email": "hardingwelch@comdom.com" }
    },
    {
      "id": "5ef1f1c6f8b5a8e0b7b4a1c3",
      "remarks": "",
      "pickupTime": "not a date",
      "goodsPicture": "https://loremflickr.com/320/240/cat?lock=1",
      "deliveryFee": "$5.00",
      "surcharge": "$1.50",
      "route": { "start": "A", "end": "B" },
      "sender": { "phone": "1", "name": "N", "email": "e@x" }
    }
  ]"#;

  #[test]
  fn test_decode_matches_wire_fields() {
    let records: Vec<Record> = serde_json::from_str(SAMPLE_PAGE).unwrap();
    assert_eq!(records.len(), 2);

    let first = &records[0];
    assert_eq!(first.id, "5ef1f1c6f8b5a8e0b7b4a1c2");
    assert_eq!(first.remarks, "Handle with care");
    assert_eq!(first.pickup_time, "2014-10-06T10:45:38-08:00");
    assert_eq!(
      first.goods_picture,
      "https://loremflickr.com/320/240/cat?lock=9953"
    );
    assert_eq!(first.delivery_fee, "$92.14");
    assert_eq!(first.surcharge, "$136.46");
    assert_eq!(first.route.start, "Noble Street");
    assert_eq!(first.route.end, "Montauk Court");
    assert_eq!(first.sender.phone, "+1 (899) 523-3905");
    assert_eq!(first.sender.name, "Harding Welch");
    assert_eq!(first.sender.email, "hardingwelch@comdom.com");
  }

  #[test]
  fn test_missing_field_is_rejected() {
    let json = r#"[{"id": "1", "remarks": ""}]"#;
    assert!(serde_json::from_str::<Vec<Record>>(json).is_err());
  }

  #[test]
  fn test_non_string_field_is_rejected() {
    let json = SAMPLE_PAGE.replace(r#""$5.00""#, "5.0");
    assert!(serde_json::from_str::<Vec<Record>>(&json).is_err());
  }

  #[test]
  fn test_pretty_pickup_time() {
    let records: Vec<Record> = serde_json::from_str(SAMPLE_PAGE).unwrap();
    assert_eq!(records[0].pretty_pickup_time(), "2014-10-06 10:45");
    assert_eq!(records[1].pretty_pickup_time(), "not a date");
  }

  #[test]
  fn test_total() {
    let records: Vec<Record> = serde_json::from_str(SAMPLE_PAGE).unwrap();
    assert_eq!(records[1].total(), "$6.5");
    assert_eq!(records[0].total(), "$228.6");
  }
}
