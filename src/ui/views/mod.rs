mod delivery_list;
mod order_detail;

pub use delivery_list::DeliveryListView;
pub use order_detail::OrderDetailView;

use crate::ui::renderfns::format_bytes;
use deliverable::cache::{ImageAsset, ObjectCache};
use ratatui::prelude::Color;

/// Display text and color for an order picture's cache state.
///
/// Only inspects the cache; requesting the picture is up to the caller.
fn picture_status(images: &ObjectCache<ImageAsset>, url: &str) -> (String, Color) {
  if let Some(asset) = images.peek(url) {
    (
      format!(
        "{} {}x{} {}",
        asset.format,
        asset.width,
        asset.height,
        format_bytes(asset.size())
      ),
      Color::Green,
    )
  } else if images.is_populating(url) {
    ("loading...".to_string(), Color::Yellow)
  } else {
    ("unavailable".to_string(), Color::DarkGray)
  }
}
