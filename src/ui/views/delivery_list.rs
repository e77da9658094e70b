use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::{centered_rect, truncate};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crate::ui::views::{picture_status, OrderDetailView};
use crossterm::event::{KeyCode, KeyEvent};
use deliverable::cache::{ImageAsset, ObjectCache};
use deliverable::db::FavoriteStore;
use deliverable::delivery::Record;
use deliverable::pagination::PaginationController;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph};
use std::sync::Arc;
use tracing::warn;

/// Paginated list of delivery orders
pub struct DeliveryListView {
  pages: PaginationController<Record>,
  images: ObjectCache<ImageAsset>,
  favorites: Arc<dyn FavoriteStore>,
  list_state: ListState,
}

impl DeliveryListView {
  pub fn new(
    pages: PaginationController<Record>,
    images: ObjectCache<ImageAsset>,
    favorites: Arc<dyn FavoriteStore>,
  ) -> Self {
    let mut view = Self {
      pages,
      images,
      favorites,
      list_state: ListState::default(),
    };

    // Start fetching immediately
    view.pages.refresh();
    view
  }

  fn selected_record(&self) -> Option<&Record> {
    self
      .list_state
      .selected()
      .and_then(|idx| self.pages.records().get(idx))
  }

  fn is_favorite(&self, order_id: &str) -> bool {
    self.favorites.is_favorite(order_id).unwrap_or_else(|e| {
      warn!(%order_id, error = %e, "favorite lookup failed");
      false
    })
  }

  fn toggle_favorite(&self) {
    let Some(record) = self.selected_record() else {
      return;
    };
    let result = if self.is_favorite(&record.id) {
      self.favorites.remove_favorite(&record.id)
    } else {
      self.favorites.set_favorite(&record.id)
    };
    if let Err(e) = result {
      warn!(order_id = %record.id, error = %e, "favorite toggle failed");
    }
  }

  /// Ask the cache for every picture on the current page.
  fn request_pictures(&self) {
    for record in self.pages.records() {
      self.images.get(&record.goods_picture);
    }
  }

  fn title(&self) -> String {
    let page = self.pages.page().page_index();
    if self.pages.is_loading() {
      format!(" Deliveries [page {}] (loading...) ", page)
    } else if let Some(e) = self.pages.last_error() {
      format!(" Deliveries [page {}] (error: {}) ", page, e)
    } else {
      format!(" Deliveries [page {}] ({}) ", page, self.pages.records().len())
    }
  }

  fn render_list(&mut self, frame: &mut Frame, area: Rect) {
    let len = self.pages.records().len();
    ensure_valid_selection(&mut self.list_state, len);

    let block = Block::default()
      .title(self.title())
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    if len == 0 {
      let content = if self.pages.is_loading() {
        ""
      } else if self.pages.last_error().is_some() {
        "Failed to load deliveries. Press 'r' to retry."
      } else {
        "No deliveries on this page."
      };
      let paragraph = Paragraph::new(content)
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      return;
    }

    let items: Vec<ListItem> = self
      .pages
      .records()
      .iter()
      .map(|record| {
        let star = if self.is_favorite(&record.id) { "★" } else { " " };
        let (picture, picture_color) = picture_status(&self.images, &record.goods_picture);

        let line = Line::from(vec![
          Span::styled(format!("{} ", star), Style::default().fg(Color::Yellow)),
          Span::styled(
            format!("{:<22}", truncate(&record.route.start, 22)),
            Style::default().fg(Color::Cyan),
          ),
          Span::styled(" → ", Style::default().fg(Color::DarkGray)),
          Span::raw(format!("{:<22}", truncate(&record.route.end, 22))),
          Span::styled(
            format!(" {:>10} ", record.total()),
            Style::default().fg(Color::Green),
          ),
          Span::styled(picture, Style::default().fg(picture_color)),
        ]);
        ListItem::new(line)
      })
      .collect();

    let list = List::new(items)
      .block(block)
      .highlight_style(
        Style::default()
          .bg(Color::DarkGray)
          .add_modifier(Modifier::BOLD),
      )
      .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut self.list_state);
  }

  fn render_loading_overlay(&self, frame: &mut Frame, area: Rect) {
    let overlay_area = centered_rect(32, 3, area);

    // Clear the area behind the overlay
    frame.render_widget(Clear, overlay_area);

    let paragraph = Paragraph::new(format!(
      "Loading page {}...",
      self.pages.page().page_index()
    ))
    .alignment(Alignment::Center)
    .block(
      Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow)),
    );
    frame.render_widget(paragraph, overlay_area);
  }
}

impl View for DeliveryListView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('j') | KeyCode::Down => {
        self.list_state.select_next();
      }
      KeyCode::Char('k') | KeyCode::Up => {
        self.list_state.select_previous();
      }
      // Page changes are ignored while a fetch is outstanding
      KeyCode::Char('n') | KeyCode::Right => {
        self.pages.advance();
      }
      KeyCode::Char('p') | KeyCode::Left => {
        self.pages.retreat();
      }
      KeyCode::Char('r') => {
        self.pages.refresh();
      }
      KeyCode::Char('f') => self.toggle_favorite(),
      KeyCode::Enter => {
        if let Some(record) = self.selected_record() {
          return ViewAction::Push(Box::new(OrderDetailView::new(
            record.clone(),
            self.images.clone(),
            Arc::clone(&self.favorites),
          )));
        }
      }
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    self.render_list(frame, area);
    if self.pages.is_loading() {
      self.render_loading_overlay(frame, area);
    }
  }

  fn breadcrumb_label(&self) -> String {
    "Deliveries".to_string()
  }

  fn context(&self) -> Option<String> {
    Some(format!("page {}", self.pages.page().page_index()))
  }

  fn tick(&mut self) {
    if self.pages.poll() {
      if self.pages.last_error().is_none() {
        self.list_state.select(Some(0));
      }
      self.request_pictures();
    }
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new("n", "next").with_priority(10),
      ShortcutInfo::new("p", "prev").with_priority(20),
      ShortcutInfo::new("r", "refresh").with_priority(30),
      ShortcutInfo::new("f", "favorite").with_priority(40),
      ShortcutInfo::new("enter", "details").with_priority(50),
      ShortcutInfo::new("q", "quit").with_priority(90),
    ]
  }
}
