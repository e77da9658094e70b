use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crate::ui::views::picture_status;
use crossterm::event::{KeyCode, KeyEvent};
use deliverable::cache::{ImageAsset, ObjectCache};
use deliverable::db::FavoriteStore;
use deliverable::delivery::Record;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use std::sync::Arc;
use tracing::warn;

/// View for a single delivery order
pub struct OrderDetailView {
  record: Record,
  images: ObjectCache<ImageAsset>,
  favorites: Arc<dyn FavoriteStore>,
  favorite: bool,
}

impl OrderDetailView {
  pub fn new(
    record: Record,
    images: ObjectCache<ImageAsset>,
    favorites: Arc<dyn FavoriteStore>,
  ) -> Self {
    let favorite = favorites.is_favorite(&record.id).unwrap_or_else(|e| {
      warn!(order_id = %record.id, error = %e, "favorite lookup failed");
      false
    });

    // Start the picture download if the list has not already
    images.get(&record.goods_picture);

    Self {
      record,
      images,
      favorites,
      favorite,
    }
  }

  fn toggle_favorite(&mut self) {
    let result = if self.favorite {
      self.favorites.remove_favorite(&self.record.id)
    } else {
      self.favorites.set_favorite(&self.record.id)
    };
    match result {
      Ok(()) => self.favorite = !self.favorite,
      Err(e) => warn!(order_id = %self.record.id, error = %e, "favorite toggle failed"),
    }
  }

  fn field<'a>(label: &'a str, value: impl Into<Span<'a>>) -> Line<'a> {
    Line::from(vec![
      Span::styled(format!("{:<10}", label), Style::default().fg(Color::DarkGray)),
      value.into(),
    ])
  }

  fn render_detail(&self, frame: &mut Frame, area: Rect) {
    let record = &self.record;
    let star = if self.favorite { " ★" } else { "" };

    let block = Block::default()
      .title(format!(" Order {}{} ", record.id, star))
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let (picture, picture_color) = picture_status(&self.images, &record.goods_picture);
    let remarks = if record.remarks.is_empty() {
      "-"
    } else {
      record.remarks.as_str()
    };

    let lines = vec![
      Self::field(
        "From",
        Span::styled(record.route.start.as_str(), Style::default().fg(Color::Cyan)),
      ),
      Self::field(
        "To",
        Span::styled(record.route.end.as_str(), Style::default().fg(Color::Cyan)),
      ),
      Self::field("Pickup", Span::raw(record.pretty_pickup_time())),
      Line::default(),
      Self::field("Fee", Span::raw(record.delivery_fee.as_str())),
      Self::field("Surcharge", Span::raw(record.surcharge.as_str())),
      Self::field(
        "Total",
        Span::styled(record.total(), Style::default().fg(Color::Green).bold()),
      ),
      Line::default(),
      Self::field("Sender", Span::raw(record.sender.name.as_str())),
      Self::field("Phone", Span::raw(record.sender.phone.as_str())),
      Self::field("Email", Span::raw(record.sender.email.as_str())),
      Line::default(),
      Self::field("Picture", Span::raw(record.goods_picture.as_str())),
      Self::field("", Span::styled(picture, Style::default().fg(picture_color))),
      Line::default(),
      Self::field("Remarks", Span::raw(remarks)),
    ];

    let paragraph = Paragraph::new(lines)
      .block(block)
      .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
  }
}

impl View for OrderDetailView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('f') => {
        self.toggle_favorite();
        ViewAction::None
      }
      KeyCode::Char('r') => {
        // Retry a picture that failed earlier
        self.images.get(&self.record.goods_picture);
        ViewAction::None
      }
      KeyCode::Char('q') | KeyCode::Esc => ViewAction::Pop,
      _ => ViewAction::None,
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    self.render_detail(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    self.record.id.clone()
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new("f", "favorite").with_priority(10),
      ShortcutInfo::new("r", "reload picture").with_priority(20),
      ShortcutInfo::new("q", "back").with_priority(90),
    ]
  }
}
